use heapless::String;
use serde::{Deserialize, Serialize};

use crate::types::{ConfigError, FaceResult, Temperature};

pub const WEATHER_PATH_DEFAULT: &str = "/sunshine_weather";
pub const CONNECT_TIMEOUT_MS_DEFAULT: u32 = 500;
pub const INTERACTIVE_UPDATE_RATE_MS_DEFAULT: u32 = 1000;
pub const ICON_SIZE_DEFAULT: u16 = 40;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceConfig {
    pub sync: SyncConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// 天气数据在数据层中的固定路径
    pub weather_path: String<64>,
    pub connect_timeout_ms: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            weather_path: String::try_from(WEATHER_PATH_DEFAULT).unwrap_or_default(),
            connect_timeout_ms: CONNECT_TIMEOUT_MS_DEFAULT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub interactive_update_rate_ms: u32,
    pub icon_size: u16,
    /// 首次同步前显示的温度，留空表示未知
    pub initial_high: Temperature,
    pub initial_low: Temperature,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            interactive_update_rate_ms: INTERACTIVE_UPDATE_RATE_MS_DEFAULT,
            icon_size: ICON_SIZE_DEFAULT,
            initial_high: Temperature::new(),
            initial_low: Temperature::new(),
        }
    }
}

impl FaceConfig {
    pub fn from_json(bytes: &[u8]) -> FaceResult<Self> {
        let config: Self =
            serde_json::from_slice(bytes).map_err(|_| ConfigError::InvalidFormat)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> FaceResult<()> {
        if self.display.interactive_update_rate_ms == 0 {
            return Err(ConfigError::InvalidUpdateRate.into());
        }
        if self.sync.connect_timeout_ms == 0 {
            return Err(ConfigError::InvalidConnectTimeout.into());
        }
        if !self.sync.weather_path.starts_with('/') {
            return Err(ConfigError::InvalidWeatherPath.into());
        }
        Ok(())
    }
}
