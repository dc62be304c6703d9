use thiserror::Error;

pub type FaceResult<T> = core::result::Result<T, FaceError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaceError {
    #[error("sync error: {0}")]
    SyncError(#[from] SyncError),
    #[error("payload error: {0}")]
    PayloadError(#[from] PayloadError),
    #[error("asset fetch error: {0}")]
    FetchError(#[from] FetchError),
    #[error("time error: {0}")]
    TimeError(#[from] TimeError),
    #[error("config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("render error: {0}")]
    RenderError(#[from] RenderError),
}

/// 与配套设备之间的连接错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncError {
    #[error("companion did not answer within the connect bound")]
    ConnectTimeout,
    #[error("companion connection failed")]
    ConnectFailed,
    #[error("data listener registration rejected")]
    ListenerRejected,
}

/// 天气数据负载解析错误，对应的事件会被静默丢弃
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PayloadError {
    #[error("payload is not a valid weather map")]
    InvalidFormat,
    #[error("highest temperature missing or empty")]
    MissingHighTemperature,
    #[error("lowest temperature missing or empty")]
    MissingLowTemperature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FetchError {
    #[error("companion unreachable")]
    Unreachable,
    #[error("asset fetch timed out")]
    Timeout,
    #[error("asset bytes are not a valid image")]
    Decode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeError {
    #[error("timestamp out of range")]
    InvalidTimestamp,
    #[error("utc offset out of range")]
    InvalidOffset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    #[error("config is not valid json")]
    InvalidFormat,
    #[error("interactive update rate must be positive")]
    InvalidUpdateRate,
    #[error("connect timeout must be positive")]
    InvalidConnectTimeout,
    #[error("weather path must start with '/'")]
    InvalidWeatherPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderError {
    #[error("draw target rejected the frame")]
    DrawFailed,
}
