mod face_manager;
mod render_scheduler;

pub use face_manager::FaceManager;
pub use render_scheduler::{RenderScheduler, TimerCommand, next_delay};
