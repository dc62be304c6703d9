use sunshine_face_common::*;

pub struct TimeService<C: WallClock> {
    clock: C,
    utc_offset_seconds: i32,
}

impl<C: WallClock> TimeService<C> {
    pub fn new(clock: C) -> Self {
        let utc_offset_seconds = clock.utc_offset_seconds();
        Self {
            clock,
            utc_offset_seconds,
        }
    }

    /// 重新读取时区偏移，可见时和时区变化时调用
    pub fn refresh_timezone(&mut self) {
        let offset = self.clock.utc_offset_seconds();
        if offset != self.utc_offset_seconds {
            info!(
                "Timezone offset changed: {}s -> {}s",
                self.utc_offset_seconds, offset
            );
            self.utc_offset_seconds = offset;
        }
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    pub fn utc_offset_seconds(&self) -> i32 {
        self.utc_offset_seconds
    }

    pub fn clock_state(&self) -> FaceResult<ClockState> {
        ClockState::from_unix_millis(self.clock.now_millis(), self.utc_offset_seconds)
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
