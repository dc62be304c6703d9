//! 渲染调度器
//!
//! 只在可见且处于交互模式时运行周期定时器，每次触发都对齐到下一个整秒。
//! 调度器不持有表盘，由 `FaceManager` 显式启停；真正的定时器由调用方按
//! `TimerCommand` 维护，任何时刻最多一个。

use embassy_time::Duration;
use sunshine_face_common::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    /// 取消已排期的定时器（没有时也安全）
    Stop,
    /// 取消已排期的定时器，并在给定延迟后触发
    FireIn(Duration),
}

/// 距离下一个整周期边界的毫秒数，范围 `[1, rate_ms]`
pub fn next_delay(now_millis: i64, rate_ms: u64) -> u64 {
    let rate = rate_ms.max(1);
    rate - now_millis.rem_euclid(rate as i64) as u64
}

pub struct RenderScheduler {
    update_rate_ms: u64,
    running: bool,
}

impl RenderScheduler {
    pub fn new(update_rate_ms: u32) -> Self {
        Self {
            update_rate_ms: update_rate_ms.max(1) as u64,
            running: false,
        }
    }

    pub fn should_run(mode: &DisplayMode) -> bool {
        mode.timer_should_run()
    }

    pub fn next_delay(&self, now_millis: i64) -> u64 {
        next_delay(now_millis, self.update_rate_ms)
    }

    /// 先取消，再视模式决定是否立即重新启动
    pub fn reevaluate(&mut self, mode: &DisplayMode) -> TimerCommand {
        if Self::should_run(mode) {
            if !self.running {
                debug!("Render timer started");
            }
            self.running = true;
            TimerCommand::FireIn(Duration::from_millis(0))
        } else {
            self.stop()
        }
    }

    /// 定时器触发后调用；调用方先完成渲染，再执行返回的命令
    pub fn on_tick(&mut self, mode: &DisplayMode, now_millis: i64) -> TimerCommand {
        if Self::should_run(mode) {
            self.running = true;
            TimerCommand::FireIn(Duration::from_millis(self.next_delay(now_millis)))
        } else {
            self.stop()
        }
    }

    pub fn stop(&mut self) -> TimerCommand {
        if self.running {
            debug!("Render timer stopped");
        }
        self.running = false;
        TimerCommand::Stop
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn mode(visible: bool, ambient: bool) -> DisplayMode {
        DisplayMode {
            visible,
            ambient,
            low_bit_ambient: false,
        }
    }

    proptest! {
        #[test]
        fn next_delay_lands_on_whole_second(now in 0i64..i64::MAX / 2) {
            let delay = next_delay(now, 1000);
            prop_assert!((1..=1000).contains(&delay));
            prop_assert_eq!((now + delay as i64) % 1000, 0);
        }

        #[test]
        fn next_delay_handles_pre_epoch_clocks(now in i64::MIN / 2..0i64) {
            let delay = next_delay(now, 1000);
            prop_assert!((1..=1000).contains(&delay));
            prop_assert_eq!((now + delay as i64).rem_euclid(1000), 0);
        }
    }

    #[test]
    fn exact_boundary_waits_a_full_period() {
        assert_eq!(next_delay(5000, 1000), 1000);
        assert_eq!(next_delay(5999, 1000), 1);
    }

    #[test]
    fn runs_only_when_visible_and_interactive() {
        for (visible, ambient) in [(false, false), (false, true), (true, false), (true, true)] {
            let mut scheduler = RenderScheduler::new(1000);
            let command = scheduler.reevaluate(&mode(visible, ambient));
            let expected = visible && !ambient;
            assert_eq!(scheduler.is_running(), expected);
            assert_eq!(matches!(command, TimerCommand::FireIn(_)), expected);
        }
    }

    #[test]
    fn tick_reschedules_to_next_boundary() {
        let mut scheduler = RenderScheduler::new(1000);
        let interactive = mode(true, false);
        scheduler.reevaluate(&interactive);

        let command = scheduler.on_tick(&interactive, 12_250);
        assert_eq!(command, TimerCommand::FireIn(Duration::from_millis(750)));
    }

    #[test]
    fn tick_after_entering_ambient_stops() {
        let mut scheduler = RenderScheduler::new(1000);
        scheduler.reevaluate(&mode(true, false));

        let command = scheduler.on_tick(&mode(true, true), 12_250);
        assert_eq!(command, TimerCommand::Stop);
        assert!(!scheduler.is_running());
    }

    #[test]
    fn stopping_twice_is_harmless() {
        let mut scheduler = RenderScheduler::new(1000);
        assert_eq!(scheduler.stop(), TimerCommand::Stop);
        assert_eq!(scheduler.stop(), TimerCommand::Stop);
        assert!(!scheduler.is_running());
    }

    #[test]
    fn restart_while_running_replaces_pending_fire() {
        let mut scheduler = RenderScheduler::new(1000);
        let interactive = mode(true, false);
        let first = scheduler.reevaluate(&interactive);
        let second = scheduler.reevaluate(&interactive);
        assert_eq!(first, second);
        assert!(scheduler.is_running());
    }
}
