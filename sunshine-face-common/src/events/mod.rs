//! 表盘事件定义模块
//!
//! 渲染侧只消费 `FaceEvent`：
//! - 生命周期事件 (LifecycleEvent)，由平台投递
//! - 天气更新通知，由同步服务在写入新天气后投递

pub mod face;
pub use face::{FaceEvent, LifecycleEvent, TapKind};
