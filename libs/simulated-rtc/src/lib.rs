use core::sync::atomic::{AtomicI32, AtomicI64, AtomicU64, Ordering};

use embassy_time::Instant;
use sunshine_face_common::WallClock;

/// 2024-01-01T00:00:00Z
pub const DEFAULT_BASE_MILLIS: i64 = 1_704_067_200_000;

/// 主机上的模拟墙钟：基准时间加上启动以来的单调时间，时区可随时修改
pub struct SimulatedClock {
    base_millis: AtomicI64,
    base_ticks: AtomicU64,
    utc_offset_seconds: AtomicI32,
}

impl SimulatedClock {
    pub fn new(base_millis: i64, utc_offset_seconds: i32) -> Self {
        log::info!(
            "Simulated clock initialized at {} ms, offset {} s",
            base_millis,
            utc_offset_seconds
        );
        Self {
            base_millis: AtomicI64::new(base_millis),
            base_ticks: AtomicU64::new(Instant::now().as_ticks()),
            utc_offset_seconds: AtomicI32::new(utc_offset_seconds),
        }
    }

    pub fn set_time(&self, millis: i64) {
        self.base_millis.store(millis, Ordering::SeqCst);
        self.base_ticks
            .store(Instant::now().as_ticks(), Ordering::SeqCst);
        log::info!("Simulated clock set to {} ms", millis);
    }

    /// 模拟用户在系统设置里切换时区
    pub fn set_utc_offset_seconds(&self, offset: i32) {
        self.utc_offset_seconds.store(offset, Ordering::SeqCst);
        log::info!("Simulated timezone set to UTC{:+}s", offset);
    }

    fn elapsed_millis(&self) -> i64 {
        let base = Instant::from_ticks(self.base_ticks.load(Ordering::SeqCst));
        Instant::now()
            .checked_duration_since(base)
            .map(|elapsed| elapsed.as_millis() as i64)
            .unwrap_or(0)
    }
}

impl Default for SimulatedClock {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_MILLIS, 0)
    }
}

impl WallClock for &SimulatedClock {
    fn now_millis(&self) -> i64 {
        self.base_millis.load(Ordering::SeqCst) + self.elapsed_millis()
    }

    fn utc_offset_seconds(&self) -> i32 {
        self.utc_offset_seconds.load(Ordering::SeqCst)
    }
}
