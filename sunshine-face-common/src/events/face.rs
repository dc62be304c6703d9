#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaceEvent {
    Lifecycle(LifecycleEvent),
    /// 天气已整体替换，需要带外重绘
    WeatherUpdated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LifecycleEvent {
    VisibilityChanged(bool),
    AmbientChanged(bool),
    LowBitAmbientDetected(bool),
    TimezoneChanged,
    InsetsChanged { is_round: bool },
    /// 平台在常亮模式下每分钟一次的节拍
    TimeTick,
    Tap(TapKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TapKind {
    Touch,
    TouchCancel,
    Tap,
}

impl From<LifecycleEvent> for FaceEvent {
    fn from(event: LifecycleEvent) -> Self {
        FaceEvent::Lifecycle(event)
    }
}
