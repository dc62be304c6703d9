mod assets;
mod companion;
mod display;

pub use assets::SimulatedAssets;
pub use companion::{SimulatedCompanion, broadcast_task};
pub use display::ConsoleDisplay;
