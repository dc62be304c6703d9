pub mod asset;
pub mod wall_clock;
pub mod companion;
pub mod renderer;

pub use asset::*;
pub use wall_clock::*;
pub use companion::*;
pub use renderer::*;
