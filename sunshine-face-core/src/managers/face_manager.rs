//! 表盘状态机
//!
//! 处理平台生命周期事件，维护显示模式和渲染参数，驱动渲染调度器，
//! 并在可见性变化时通知同步服务建立或拆除连接。

use core::future::pending;

use embassy_futures::select::{Either3, select3};
use embassy_time::{Instant, Timer};
use heapless::Deque;
use sunshine_face_common::*;

use crate::managers::render_scheduler::{RenderScheduler, TimerCommand};
use crate::services::frame_composer::compose_frame;
use crate::services::time_service::TimeService;
use crate::services::weather_store::WeatherReader;

/// 控制队列满时暂存的同步命令上限；可见性交替变化时最多积压两条
const SYNC_BACKLOG: usize = 4;

pub struct FaceManager<'a, C: WallClock, R: FaceRenderer> {
    mode: DisplayMode,
    style: RenderStyle,
    scheduler: RenderScheduler,
    timezone_watch: bool,
    time_service: TimeService<C>,
    weather: WeatherReader<'a>,
    renderer: R,
    sync_control: FaceChannelSender<'a, SyncControl>,
    sync_backlog: Deque<SyncControl, SYNC_BACKLOG>,
    invalidated: bool,
    deadline: Option<Instant>,
}

impl<'a, C: WallClock, R: FaceRenderer> FaceManager<'a, C, R> {
    pub fn new(
        time_service: TimeService<C>,
        weather: WeatherReader<'a>,
        renderer: R,
        sync_control: FaceChannelSender<'a, SyncControl>,
        config: &DisplayConfig,
    ) -> Self {
        Self {
            mode: DisplayMode::default(),
            style: RenderStyle::default(),
            scheduler: RenderScheduler::new(config.interactive_update_rate_ms),
            timezone_watch: false,
            time_service,
            weather,
            renderer,
            sync_control,
            sync_backlog: Deque::new(),
            invalidated: false,
            deadline: None,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn style(&self) -> RenderStyle {
        self.style
    }

    pub fn scheduler(&self) -> &RenderScheduler {
        &self.scheduler
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn timer_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// 尚未送达同步服务的命令数
    pub fn pending_sync_commands(&self) -> usize {
        self.sync_backlog.len()
    }

    /// 事件循环：等待生命周期事件、渲染定时器或积压命令送达，永不返回
    pub async fn run(&mut self, events: FaceChannelReceiver<'a, FaceEvent>) -> ! {
        info!("Face manager started");
        loop {
            let deadline = self.deadline;
            let backlog_head = self.sync_backlog.front().copied();
            let sync_control = &self.sync_control;

            let outcome = select3(
                events.receive(),
                async move {
                    match deadline {
                        Some(at) => Timer::at(at).await,
                        None => pending::<()>().await,
                    }
                },
                async move {
                    match backlog_head {
                        Some(control) => sync_control.send(control).await,
                        None => pending::<()>().await,
                    }
                },
            )
            .await;

            match outcome {
                Either3::First(event) => self.handle_event(event),
                Either3::Second(()) => self.on_timer_fired(),
                Either3::Third(()) => {
                    self.sync_backlog.pop_front();
                    self.flush_sync_backlog();
                }
            }
        }
    }

    pub fn handle_event(&mut self, event: FaceEvent) {
        debug!("Handling event: {:?}", event);

        match event {
            FaceEvent::Lifecycle(event) => match event {
                LifecycleEvent::VisibilityChanged(visible) => self.set_visible(visible),
                LifecycleEvent::AmbientChanged(ambient) => self.set_ambient(ambient),
                LifecycleEvent::LowBitAmbientDetected(low_bit) => {
                    self.set_low_bit_ambient(low_bit)
                }
                LifecycleEvent::TimezoneChanged => self.on_timezone_changed(),
                LifecycleEvent::InsetsChanged { is_round } => self.on_insets_changed(is_round),
                LifecycleEvent::TimeTick => self.on_time_tick(),
                LifecycleEvent::Tap(kind) => self.on_tap(kind),
            },
            FaceEvent::WeatherUpdated => self.on_weather_updated(),
        }

        self.flush_sync_backlog();
        self.draw_if_invalidated();
    }

    pub fn set_visible(&mut self, visible: bool) {
        if visible != self.mode.visible {
            self.mode.visible = visible;
            if visible {
                info!("Face became visible");
                self.request_sync(SyncControl::Connect);
                self.register_timezone_watch();
                self.invalidate();
            } else {
                info!("Face hidden");
                self.unregister_timezone_watch();
                self.request_sync(SyncControl::Disconnect);
            }
        }

        self.update_timer();
    }

    pub fn set_ambient(&mut self, ambient: bool) {
        if ambient != self.mode.ambient {
            self.mode.ambient = ambient;
            info!("Ambient mode: {}", ambient);
            if self.mode.low_bit_ambient {
                self.style.anti_alias = !ambient;
            }
            self.invalidate();
        }

        self.update_timer();
    }

    pub fn set_low_bit_ambient(&mut self, low_bit: bool) {
        if low_bit != self.mode.low_bit_ambient {
            debug!("Low-bit ambient: {}", low_bit);
        }
        self.mode.low_bit_ambient = low_bit;
        self.update_timer();
    }

    pub fn on_timezone_changed(&mut self) {
        if !self.timezone_watch {
            debug!("Timezone change ignored while hidden");
            return;
        }
        self.time_service.refresh_timezone();
        self.invalidate();
    }

    pub fn on_insets_changed(&mut self, is_round: bool) {
        self.style.shape = if is_round {
            ScreenShape::Round
        } else {
            ScreenShape::Square
        };
        self.invalidate();
    }

    pub fn on_time_tick(&mut self) {
        self.invalidate();
    }

    pub fn on_tap(&mut self, kind: TapKind) {
        info!("Tap received: {:?}", kind);
        self.invalidate();
    }

    /// 天气已整体替换：带外重绘并重新评估调度器
    pub fn on_weather_updated(&mut self) {
        self.invalidate();
        self.update_timer();
    }

    /// 定时器到期：先渲染，再按调度器的决定重新排期或停止
    pub fn on_timer_fired(&mut self) {
        self.deadline = None;
        self.invalidate();
        self.draw_if_invalidated();

        let command = self
            .scheduler
            .on_tick(&self.mode, self.time_service.now_millis());
        self.apply_timer(command);
    }

    pub fn invalidate(&mut self) {
        self.invalidated = true;
    }

    pub fn draw_if_invalidated(&mut self) {
        if !self.invalidated {
            return;
        }
        self.invalidated = false;

        if !self.mode.visible {
            debug!("Face hidden, skipping draw");
            return;
        }

        let clock = match self.time_service.clock_state() {
            Ok(clock) => clock,
            Err(e) => {
                warn!("Failed to read clock: {:?}", e);
                return;
            }
        };
        let weather = self.weather.snapshot();
        let plan = compose_frame(&clock, &weather, &self.mode, &self.style);

        if let Err(e) = self.renderer.render(&plan) {
            warn!("Failed to render frame: {:?}", e);
        }
    }

    fn update_timer(&mut self) {
        let command = self.scheduler.reevaluate(&self.mode);
        self.apply_timer(command);
    }

    fn apply_timer(&mut self, command: TimerCommand) {
        self.deadline = match command {
            TimerCommand::Stop => None,
            TimerCommand::FireIn(delay) => Some(Instant::now() + delay),
        };
    }

    fn register_timezone_watch(&mut self) {
        if self.timezone_watch {
            return;
        }
        self.timezone_watch = true;
        self.time_service.refresh_timezone();
    }

    fn unregister_timezone_watch(&mut self) {
        self.timezone_watch = false;
    }

    /// 命令按顺序送达；队列满时先积压，之后重试
    fn request_sync(&mut self, control: SyncControl) {
        // 还没送出的连接遇到断开，两者一起作废
        if control == SyncControl::Disconnect
            && self.sync_backlog.back() == Some(&SyncControl::Connect)
        {
            self.sync_backlog.pop_back();
            debug!("Connect never delivered, dropping it with the disconnect");
            return;
        }
        if self.sync_backlog.push_back(control).is_err() {
            warn!("Sync control backlog full, dropping {:?}", control);
            return;
        }
        self.flush_sync_backlog();
    }

    fn flush_sync_backlog(&mut self) {
        while let Some(&control) = self.sync_backlog.front() {
            if self.sync_control.try_send(control).is_err() {
                debug!(
                    "Sync control queue full, {} commands pending",
                    self.sync_backlog.len()
                );
                return;
            }
            self.sync_backlog.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::weather_store::WeatherStore;
    use alloc::vec::Vec;
    use core::cell::Cell;

    struct StubClock {
        millis: Cell<i64>,
        offset: Cell<i32>,
    }

    impl StubClock {
        fn new(millis: i64) -> Self {
            Self {
                millis: Cell::new(millis),
                offset: Cell::new(0),
            }
        }
    }

    impl WallClock for &StubClock {
        fn now_millis(&self) -> i64 {
            self.millis.get()
        }

        fn utc_offset_seconds(&self) -> i32 {
            self.offset.get()
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        frames: Vec<DrawPlan>,
    }

    impl FaceRenderer for RecordingRenderer {
        fn render(&mut self, plan: &DrawPlan) -> Result<(), RenderError> {
            self.frames.push(plan.clone());
            Ok(())
        }
    }

    fn drain(control: &FaceChannel<SyncControl>) -> Vec<SyncControl> {
        let mut sent = Vec::new();
        while let Ok(command) = control.try_receive() {
            sent.push(command);
        }
        sent
    }

    fn lifecycle(event: LifecycleEvent) -> FaceEvent {
        event.into()
    }

    fn fill(control: &FaceChannel<SyncControl>) {
        while control.try_send(SyncControl::Connect).is_ok() {}
    }

    #[test]
    fn low_bit_ambient_disables_anti_alias_and_stops_timer() {
        let clock = StubClock::new(0);
        let mut store = WeatherStore::new(WeatherState::new("25°", "16°"));
        let (_writer, reader) = store.split();
        let control = FaceChannel::new();
        let mut face = FaceManager::new(
            TimeService::new(&clock),
            reader,
            RecordingRenderer::default(),
            control.sender(),
            &DisplayConfig::default(),
        );

        face.handle_event(lifecycle(LifecycleEvent::LowBitAmbientDetected(true)));
        face.handle_event(lifecycle(LifecycleEvent::VisibilityChanged(true)));
        assert!(face.scheduler().is_running());
        let frames_before = face.renderer().frames.len();

        face.handle_event(lifecycle(LifecycleEvent::AmbientChanged(true)));

        assert!(!face.style().anti_alias);
        assert!(!face.scheduler().is_running());
        assert_eq!(face.timer_deadline(), None);
        assert_eq!(face.renderer().frames.len(), frames_before + 1);
        let frame = face.renderer().frames.last().unwrap();
        assert_eq!(frame.background, Background::Black);
        assert!(!frame.style.anti_alias);
        assert!(!frame.has_seconds());

        face.handle_event(lifecycle(LifecycleEvent::AmbientChanged(false)));
        assert!(face.style().anti_alias);
        assert!(face.scheduler().is_running());
    }

    #[test]
    fn anti_alias_untouched_without_low_bit_ambient() {
        let clock = StubClock::new(0);
        let mut store = WeatherStore::new(WeatherState::default());
        let (_writer, reader) = store.split();
        let control = FaceChannel::new();
        let mut face = FaceManager::new(
            TimeService::new(&clock),
            reader,
            RecordingRenderer::default(),
            control.sender(),
            &DisplayConfig::default(),
        );

        face.handle_event(lifecycle(LifecycleEvent::VisibilityChanged(true)));
        face.handle_event(lifecycle(LifecycleEvent::AmbientChanged(true)));
        assert!(face.style().anti_alias);
    }

    #[test]
    fn show_then_hide_connects_and_disconnects_once() {
        let clock = StubClock::new(0);
        let mut store = WeatherStore::new(WeatherState::default());
        let (_writer, reader) = store.split();
        let control = FaceChannel::new();
        let mut face = FaceManager::new(
            TimeService::new(&clock),
            reader,
            RecordingRenderer::default(),
            control.sender(),
            &DisplayConfig::default(),
        );

        face.handle_event(lifecycle(LifecycleEvent::VisibilityChanged(true)));
        face.handle_event(lifecycle(LifecycleEvent::VisibilityChanged(true)));
        face.handle_event(lifecycle(LifecycleEvent::VisibilityChanged(false)));

        assert_eq!(
            drain(&control),
            [SyncControl::Connect, SyncControl::Disconnect]
        );
        assert!(!face.scheduler().is_running());
        assert_eq!(face.timer_deadline(), None);
    }

    #[test]
    fn becoming_visible_renders_immediately() {
        let clock = StubClock::new(0);
        let mut store = WeatherStore::new(WeatherState::new("25°", "16°"));
        let (_writer, reader) = store.split();
        let control = FaceChannel::new();
        let mut face = FaceManager::new(
            TimeService::new(&clock),
            reader,
            RecordingRenderer::default(),
            control.sender(),
            &DisplayConfig::default(),
        );

        face.handle_event(lifecycle(LifecycleEvent::VisibilityChanged(true)));

        let frames = &face.renderer().frames;
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].background, Background::Interactive);
        assert!(frames[0].has_seconds());
        assert!(face.timer_deadline().is_some());
    }

    #[test]
    fn hidden_face_never_draws() {
        let clock = StubClock::new(0);
        let mut store = WeatherStore::new(WeatherState::default());
        let (_writer, reader) = store.split();
        let control = FaceChannel::new();
        let mut face = FaceManager::new(
            TimeService::new(&clock),
            reader,
            RecordingRenderer::default(),
            control.sender(),
            &DisplayConfig::default(),
        );

        face.handle_event(lifecycle(LifecycleEvent::TimeTick));
        face.handle_event(lifecycle(LifecycleEvent::Tap(TapKind::Tap)));
        face.handle_event(FaceEvent::WeatherUpdated);
        face.handle_event(lifecycle(LifecycleEvent::AmbientChanged(true)));

        assert!(face.renderer().frames.is_empty());
        assert_eq!(face.timer_deadline(), None);
    }

    #[test]
    fn unchanged_ambient_does_not_redraw() {
        let clock = StubClock::new(0);
        let mut store = WeatherStore::new(WeatherState::default());
        let (_writer, reader) = store.split();
        let control = FaceChannel::new();
        let mut face = FaceManager::new(
            TimeService::new(&clock),
            reader,
            RecordingRenderer::default(),
            control.sender(),
            &DisplayConfig::default(),
        );

        face.handle_event(lifecycle(LifecycleEvent::VisibilityChanged(true)));
        face.handle_event(lifecycle(LifecycleEvent::AmbientChanged(false)));

        assert_eq!(face.renderer().frames.len(), 1);
        assert!(face.scheduler().is_running());
    }

    #[test]
    fn timer_tick_renders_then_reschedules() {
        let clock = StubClock::new(12_250);
        let mut store = WeatherStore::new(WeatherState::default());
        let (_writer, reader) = store.split();
        let control = FaceChannel::new();
        let mut face = FaceManager::new(
            TimeService::new(&clock),
            reader,
            RecordingRenderer::default(),
            control.sender(),
            &DisplayConfig::default(),
        );

        face.handle_event(lifecycle(LifecycleEvent::VisibilityChanged(true)));
        face.on_timer_fired();

        assert_eq!(face.renderer().frames.len(), 2);
        let deadline = face.timer_deadline().unwrap();
        assert!(deadline > Instant::now());
        assert!(deadline <= Instant::now() + embassy_time::Duration::from_millis(750));
    }

    #[test]
    fn weather_update_redraws_with_new_temperatures() {
        let clock = StubClock::new(0);
        let mut store = WeatherStore::new(WeatherState::new("20°", "16°"));
        let (mut writer, reader) = store.split();
        let control = FaceChannel::new();
        let mut face = FaceManager::new(
            TimeService::new(&clock),
            reader,
            RecordingRenderer::default(),
            control.sender(),
            &DisplayConfig::default(),
        );

        face.handle_event(lifecycle(LifecycleEvent::VisibilityChanged(true)));
        writer.replace(WeatherState::new("25°", "16°"));
        face.handle_event(FaceEvent::WeatherUpdated);

        let frame = face.renderer().frames.last().unwrap();
        assert!(
            frame
                .items
                .contains(&DrawItem::HighTemperature(Temperature::from("25°")))
        );
    }

    #[test]
    fn timezone_changes_only_apply_while_visible() {
        let clock = StubClock::new(0);
        let mut store = WeatherStore::new(WeatherState::default());
        let (_writer, reader) = store.split();
        let control = FaceChannel::new();
        let mut face = FaceManager::new(
            TimeService::new(&clock),
            reader,
            RecordingRenderer::default(),
            control.sender(),
            &DisplayConfig::default(),
        );

        clock.offset.set(3600);
        face.handle_event(lifecycle(LifecycleEvent::TimezoneChanged));
        face.handle_event(lifecycle(LifecycleEvent::VisibilityChanged(true)));
        // 变为可见时重新读取时区
        assert_eq!(
            face.renderer().frames[0].items[0],
            DrawItem::HourMinute(heapless::String::try_from("1:00").unwrap())
        );

        clock.offset.set(7200);
        face.handle_event(lifecycle(LifecycleEvent::TimezoneChanged));
        assert_eq!(
            face.renderer().frames[1].items[0],
            DrawItem::HourMinute(heapless::String::try_from("2:00").unwrap())
        );
    }

    #[test]
    fn round_insets_select_round_layout() {
        let clock = StubClock::new(0);
        let mut store = WeatherStore::new(WeatherState::default());
        let (_writer, reader) = store.split();
        let control = FaceChannel::new();
        let mut face = FaceManager::new(
            TimeService::new(&clock),
            reader,
            RecordingRenderer::default(),
            control.sender(),
            &DisplayConfig::default(),
        );

        face.handle_event(lifecycle(LifecycleEvent::VisibilityChanged(true)));
        face.handle_event(lifecycle(LifecycleEvent::InsetsChanged { is_round: true }));

        assert_eq!(face.style().shape, ScreenShape::Round);
        assert_eq!(
            face.renderer().frames.last().unwrap().style.shape,
            ScreenShape::Round
        );
    }

    #[test]
    fn hide_before_connect_is_delivered_cancels_both() {
        let clock = StubClock::new(0);
        let mut store = WeatherStore::new(WeatherState::default());
        let (_writer, reader) = store.split();
        let control = FaceChannel::new();
        let mut face = FaceManager::new(
            TimeService::new(&clock),
            reader,
            RecordingRenderer::default(),
            control.sender(),
            &DisplayConfig::default(),
        );

        fill(&control);
        face.handle_event(lifecycle(LifecycleEvent::VisibilityChanged(true)));
        assert_eq!(face.pending_sync_commands(), 1);
        face.handle_event(lifecycle(LifecycleEvent::VisibilityChanged(false)));

        assert_eq!(face.pending_sync_commands(), 0);
        drain(&control);
        face.handle_event(lifecycle(LifecycleEvent::TimeTick));
        assert!(drain(&control).is_empty());
    }

    #[test]
    fn commands_held_back_by_full_queue_arrive_in_order() {
        let clock = StubClock::new(0);
        let mut store = WeatherStore::new(WeatherState::default());
        let (_writer, reader) = store.split();
        let control = FaceChannel::new();
        let mut face = FaceManager::new(
            TimeService::new(&clock),
            reader,
            RecordingRenderer::default(),
            control.sender(),
            &DisplayConfig::default(),
        );

        face.handle_event(lifecycle(LifecycleEvent::VisibilityChanged(true)));
        assert_eq!(drain(&control), [SyncControl::Connect]);

        fill(&control);
        face.handle_event(lifecycle(LifecycleEvent::VisibilityChanged(false)));
        face.handle_event(lifecycle(LifecycleEvent::VisibilityChanged(true)));
        assert_eq!(face.pending_sync_commands(), 2);

        drain(&control);
        face.handle_event(lifecycle(LifecycleEvent::TimeTick));
        assert_eq!(face.pending_sync_commands(), 0);
        assert_eq!(
            drain(&control),
            [SyncControl::Disconnect, SyncControl::Connect]
        );
    }

    #[test]
    fn run_loop_delivers_backlog_once_queue_drains() {
        let clock = StubClock::new(0);
        let mut store = WeatherStore::new(WeatherState::default());
        let (_writer, reader) = store.split();
        let control = FaceChannel::new();
        let events = FaceChannel::new();
        let mut face = FaceManager::new(
            TimeService::new(&clock),
            reader,
            RecordingRenderer::default(),
            control.sender(),
            &DisplayConfig::default(),
        );

        fill(&control);
        face.handle_event(lifecycle(LifecycleEvent::VisibilityChanged(true)));
        face.handle_event(lifecycle(LifecycleEvent::VisibilityChanged(false)));
        face.handle_event(lifecycle(LifecycleEvent::VisibilityChanged(true)));
        assert_eq!(face.pending_sync_commands(), 1);

        let received = embassy_futures::block_on(async {
            let consumer = async {
                let mut seen = Vec::new();
                for _ in 0..=control.capacity() {
                    seen.push(control.receive().await);
                }
                seen
            };
            match embassy_futures::select::select(face.run(events.receiver()), consumer).await {
                embassy_futures::select::Either::First(never) => never,
                embassy_futures::select::Either::Second(seen) => seen,
            }
        });

        assert_eq!(received.len(), control.capacity() + 1);
        assert_eq!(received.last(), Some(&SyncControl::Connect));
        assert!(control.is_empty());
    }
}
