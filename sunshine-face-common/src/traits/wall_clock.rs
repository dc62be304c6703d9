/// 墙上时钟
///
/// 渲染路径同步读取，不得阻塞。
pub trait WallClock {
    /// Unix 毫秒时间戳
    fn now_millis(&self) -> i64;

    /// 当前时区相对 UTC 的偏移（秒）
    fn utc_offset_seconds(&self) -> i32;
}
