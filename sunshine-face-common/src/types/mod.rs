pub mod async_types;
pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod sync;
pub mod weather;

pub use async_types::*;
pub use clock::*;
pub use config::*;
pub use display::*;
pub use error::*;
pub use sync::*;
pub use weather::*;
