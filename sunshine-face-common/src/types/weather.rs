use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::types::FetchError;

/// 温度文本原样显示，长度不设上限
pub type Temperature = String;

/// 解码后的天气图标
///
/// 1bpp 位图，行优先，高位在前，每行按字节补齐。像素数据共享，克隆开销很小。
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedImage {
    width: u16,
    height: u16,
    data: Arc<[u8]>,
}

impl DecodedImage {
    pub fn new(width: u16, height: u16, data: Vec<u8>) -> Result<Self, FetchError> {
        if width == 0 || height == 0 {
            return Err(FetchError::Decode);
        }
        if data.len() != Self::stride_for(width) * height as usize {
            return Err(FetchError::Decode);
        }
        Ok(Self {
            width,
            height,
            data: data.into(),
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// 每行字节数
    pub fn stride(&self) -> usize {
        Self::stride_for(self.width)
    }

    fn stride_for(width: u16) -> usize {
        (width as usize).div_ceil(8)
    }
}

impl fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DecodedImage({}x{})", self.width, self.height)
    }
}

/// 最近一次有效的天气数据
///
/// 只由同步侧整体替换，渲染侧只读。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeatherState {
    pub high: Temperature,
    pub low: Temperature,
    pub icon: Option<DecodedImage>,
}

impl WeatherState {
    pub fn new(high: &str, low: &str) -> Self {
        Self {
            high: Temperature::from(high),
            low: Temperature::from(low),
            icon: None,
        }
    }

    /// 去重规则：两个温度都非空，且至少一个与当前值不同（忽略大小写）
    pub fn accepts(&self, high: &str, low: &str) -> bool {
        if high.is_empty() || low.is_empty() {
            return false;
        }
        !eq_ignore_case(high, &self.high) || !eq_ignore_case(low, &self.low)
    }

    pub fn has_temperatures(&self) -> bool {
        !self.high.is_empty() || !self.low.is_empty()
    }
}

pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}
