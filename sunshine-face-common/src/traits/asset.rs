use crate::types::{AssetRef, DecodedImage, FetchError};

/// 从配套设备取回并解码图标资源
///
/// 内部可以阻塞等待 I/O，只会在取图任务里调用，不会占用通知投递路径。
pub trait AssetFetcher {
    async fn fetch(&mut self, asset: &AssetRef) -> Result<DecodedImage, FetchError>;
}
