//! 脚本化的平台生命周期
//!
//! 依次模拟：表盘显示、点击、进入和退出常亮、切换时区、隐藏后再次显示。

use embassy_time::{Duration, Timer};
use simulated_rtc::SimulatedClock;
use sunshine_face_common::*;

enum Step {
    Event(LifecycleEvent),
    SetOffset(i32),
    Wait(u64),
}

const STEPS: &[Step] = &[
    Step::Event(LifecycleEvent::LowBitAmbientDetected(true)),
    Step::Event(LifecycleEvent::InsetsChanged { is_round: true }),
    Step::Event(LifecycleEvent::VisibilityChanged(true)),
    Step::Wait(6),
    Step::Event(LifecycleEvent::Tap(TapKind::Touch)),
    Step::Event(LifecycleEvent::Tap(TapKind::Tap)),
    Step::Wait(6),
    Step::Event(LifecycleEvent::AmbientChanged(true)),
    Step::Wait(2),
    Step::Event(LifecycleEvent::TimeTick),
    Step::Wait(6),
    Step::Event(LifecycleEvent::AmbientChanged(false)),
    Step::SetOffset(8 * 3600),
    Step::Event(LifecycleEvent::TimezoneChanged),
    Step::Wait(6),
    Step::Event(LifecycleEvent::VisibilityChanged(false)),
    Step::Wait(3),
    Step::Event(LifecycleEvent::VisibilityChanged(true)),
    Step::Wait(12),
];

pub async fn lifecycle_task(
    events: FaceChannelSender<'_, FaceEvent>,
    clock: &SimulatedClock,
) -> ! {
    loop {
        for step in STEPS {
            match step {
                Step::Event(event) => {
                    info!("Platform event: {:?}", event);
                    events.send((*event).into()).await;
                }
                Step::SetOffset(offset) => clock.set_utc_offset_seconds(*offset),
                Step::Wait(seconds) => Timer::after(Duration::from_secs(*seconds)).await,
            }
        }
        info!("Lifecycle script finished, restarting");
        Timer::after(Duration::from_secs(3)).await;
    }
}
