//! 与配套设备的数据层连接
//!
//! 只负责连接和监听器注册；变更通知由传输层推入同步服务的批次通道。

use crate::types::SyncError;

pub trait CompanionLink {
    /// 发起连接，调用方负责限时
    async fn connect(&mut self) -> Result<(), SyncError>;

    /// 注册数据变更监听器，之后传输层开始投递通知批次
    async fn add_listener(&mut self) -> Result<(), SyncError>;

    async fn remove_listener(&mut self);

    async fn disconnect(&mut self);
}

/// 没有配套设备的平台使用，连接总是失败
pub struct NoCompanion;

impl CompanionLink for NoCompanion {
    async fn connect(&mut self) -> Result<(), SyncError> {
        Err(SyncError::ConnectFailed)
    }

    async fn add_listener(&mut self) -> Result<(), SyncError> {
        Err(SyncError::ListenerRejected)
    }

    async fn remove_listener(&mut self) {}

    async fn disconnect(&mut self) {}
}
