pub mod payload;

pub use payload::{WeatherMap, WeatherPayload};
