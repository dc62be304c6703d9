use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};

const CAP: usize = 10;

/// 全局使用的原始互斥锁
pub type FaceRawMutex = CriticalSectionRawMutex;

/// 通道类型
pub type FaceChannel<T> = Channel<FaceRawMutex, T, CAP>;

/// 通道接收者类型
pub type FaceChannelReceiver<'a, T> = Receiver<'a, FaceRawMutex, T, CAP>;

/// 通道发送者类型
pub type FaceChannelSender<'a, T> = Sender<'a, FaceRawMutex, T, CAP>;
