use heapless::{String, Vec};

use crate::types::{DecodedImage, Temperature};

/// 显示模式：交互/常亮两态，加上可见性这一正交标志
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayMode {
    pub ambient: bool,
    pub visible: bool,
    pub low_bit_ambient: bool,
}

impl DisplayMode {
    /// 周期定时器只在可见且处于交互模式时运行
    pub fn timer_should_run(&self) -> bool {
        self.visible && !self.ambient
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScreenShape {
    #[default]
    Square,
    Round,
}

/// 传给渲染器的绘制参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RenderStyle {
    pub anti_alias: bool,
    pub shape: ScreenShape,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            anti_alias: true,
            shape: ScreenShape::Square,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Background {
    /// 常亮模式纯黑
    Black,
    Interactive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawItem {
    HourMinute(String<8>),
    Seconds(String<4>),
    Date(String<24>),
    Divider,
    HighTemperature(Temperature),
    LowTemperature(Temperature),
    Icon(DecodedImage),
}

pub const MAX_DRAW_ITEMS: usize = 8;

/// 一帧的绘制计划，不含像素坐标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawPlan {
    pub background: Background,
    pub style: RenderStyle,
    pub items: Vec<DrawItem, MAX_DRAW_ITEMS>,
}

impl DrawPlan {
    pub fn new(background: Background, style: RenderStyle) -> Self {
        Self {
            background,
            style,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, item: DrawItem) {
        let _ = self.items.push(item);
    }

    pub fn has_icon(&self) -> bool {
        self.items.iter().any(|item| matches!(item, DrawItem::Icon(_)))
    }

    pub fn has_seconds(&self) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item, DrawItem::Seconds(_)))
    }
}
