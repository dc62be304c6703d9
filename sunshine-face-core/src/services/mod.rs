pub mod fetch_service;
pub mod frame_composer;
pub mod sync_service;
pub mod time_service;
pub mod weather_store;

pub use fetch_service::FetchService;
pub use frame_composer::compose_frame;
pub use sync_service::{SessionGeneration, SyncEndpoints, SyncService, SyncSession};
pub use time_service::TimeService;
pub use weather_store::{WeatherReader, WeatherStore, WeatherWriter};
