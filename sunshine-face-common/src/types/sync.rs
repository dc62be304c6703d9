use alloc::vec::Vec;

use crate::types::{DecodedImage, FetchError};

pub const PATH_CAPACITY: usize = 64;

pub type DataPath = heapless::String<PATH_CAPACITY>;

/// 配套设备上的资源引用，由 `AssetFetcher` 解析
pub type AssetRef = heapless::String<64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataEventKind {
    Changed,
    Deleted,
}

/// 数据层变更通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataEvent {
    pub kind: DataEventKind,
    pub path: DataPath,
    pub payload: Vec<u8>,
}

impl DataEvent {
    pub fn changed(path: &str, payload: &[u8]) -> Self {
        Self {
            kind: DataEventKind::Changed,
            path: DataPath::try_from(path).unwrap_or_default(),
            payload: payload.to_vec(),
        }
    }

    pub fn deleted(path: &str) -> Self {
        Self {
            kind: DataEventKind::Deleted,
            path: DataPath::try_from(path).unwrap_or_default(),
            payload: Vec::new(),
        }
    }
}

pub type DataEventBatch = Vec<DataEvent>;

/// 表盘发给同步服务的控制命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncControl {
    Connect,
    Disconnect,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// 交给取图任务的请求，带会话代号和票据用于丢弃过期结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u32,
    pub ticket: u32,
    pub asset: Option<AssetRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCompletion {
    pub generation: u32,
    pub ticket: u32,
    /// `Ok(None)` 表示负载里没有图标
    pub icon: Result<Option<DecodedImage>, FetchError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FetchOutcome {
    Applied,
    Stale,
    Failed(FetchError),
}
