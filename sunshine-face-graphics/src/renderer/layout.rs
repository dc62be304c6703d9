//! 布局参数
//! 圆形和方形表盘使用不同字号，纵向位置都以屏幕中线为基准

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::mono_font::iso_8859_1::{
    FONT_6X10, FONT_6X12, FONT_7X13, FONT_8X13, FONT_9X15_BOLD, FONT_10X20,
};
use embedded_graphics::prelude::*;
use sunshine_face_common::ScreenShape;

/// 分隔线半长
pub const DIVIDER_HALF_WIDTH: i32 = 40;
/// 高低温之间、图标与高温之间的间距
pub const TEMPERATURE_GAP: i32 = 10;
/// 图标顶边相对中线的下移量
pub const ICON_TOP_OFFSET: i32 = 5;

#[derive(Clone, Copy)]
pub struct Layout {
    pub center: Point,
    /// 时间行和温度行相对中线的距离
    pub y_offset: i32,
    pub time_font: &'static MonoFont<'static>,
    pub date_font: &'static MonoFont<'static>,
    pub temperature_font: &'static MonoFont<'static>,
}

impl Layout {
    pub fn new(shape: ScreenShape, size: Size) -> Self {
        let center = Point::new(size.width as i32 / 2, size.height as i32 / 2);
        let y_offset = (size.height as i32 / 8).max(1);

        match shape {
            ScreenShape::Round => Self {
                center,
                y_offset,
                time_font: &FONT_10X20,
                date_font: &FONT_6X12,
                temperature_font: &FONT_8X13,
            },
            ScreenShape::Square => Self {
                center,
                y_offset,
                time_font: &FONT_9X15_BOLD,
                date_font: &FONT_6X10,
                temperature_font: &FONT_7X13,
            },
        }
    }

    /// 时间行基线；交互模式还要给日期行留位置
    pub fn time_baseline(&self, ambient: bool) -> i32 {
        if ambient {
            self.center.y - self.y_offset
        } else {
            self.center.y - self.y_offset - self.y_offset / 2
        }
    }

    pub fn date_baseline(&self) -> i32 {
        self.center.y - self.y_offset / 2
    }

    pub fn temperature_baseline(&self) -> i32 {
        self.center.y + self.y_offset
    }

    pub fn icon_top(&self) -> i32 {
        self.center.y + ICON_TOP_OFFSET
    }
}
