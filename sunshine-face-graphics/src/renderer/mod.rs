//! 渲染引擎模块
//! 把一帧绘制计划画到任意单色 `DrawTarget` 上，位置沿用以屏幕中线为基准的排布

mod framebuffer;
mod layout;

pub use framebuffer::Framebuffer;
pub use layout::Layout;

use embedded_graphics::image::{Image, ImageRaw};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle};
use embedded_graphics::text::renderer::TextRenderer;
use embedded_graphics::text::{Baseline, Text};
use sunshine_face_common::*;

use layout::{DIVIDER_HALF_WIDTH, TEMPERATURE_GAP};

const FOREGROUND: BinaryColor = BinaryColor::On;

/// 单色目标上的表盘渲染器
///
/// 1 bpp 目标没有抗锯齿，`RenderStyle::anti_alias` 在这里不起作用。
pub struct FrameRenderer<D> {
    target: D,
}

impl<D> FrameRenderer<D>
where
    D: DrawTarget<Color = BinaryColor>,
{
    pub fn new(target: D) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut D {
        &mut self.target
    }

    pub fn into_inner(self) -> D {
        self.target
    }

    fn draw_plan(&mut self, plan: &DrawPlan) -> Result<(), RenderError> {
        let ambient = plan.background == Background::Black;
        let layout = Layout::new(plan.style.shape, self.target.bounding_box().size);

        // 两种背景在单色屏上都清成熄灭
        self.target
            .clear(BinaryColor::Off)
            .map_err(|_| RenderError::DrawFailed)?;

        let mut hour_minute = None;
        let mut seconds = None;
        let mut high = None;
        let mut low = None;
        let mut icon = None;

        for item in plan.items.iter() {
            match item {
                DrawItem::HourMinute(text) => hour_minute = Some(text.as_str()),
                DrawItem::Seconds(text) => seconds = Some(text.as_str()),
                DrawItem::Date(text) => {
                    let width = text_width(layout.date_font, text);
                    let x = layout.center.x - width / 2;
                    self.draw_text(text, Point::new(x, layout.date_baseline()), layout.date_font)?;
                }
                DrawItem::Divider => self.draw_divider(&layout)?,
                DrawItem::HighTemperature(text) => high = Some(text.as_str()),
                DrawItem::LowTemperature(text) => low = Some(text.as_str()),
                DrawItem::Icon(image) => icon = Some(image),
            }
        }

        if let Some(hour_minute) = hour_minute {
            let seconds = seconds.unwrap_or("");
            let width = text_width(layout.time_font, hour_minute)
                + text_width(layout.time_font, seconds);
            let start = Point::new(layout.center.x - width / 2, layout.time_baseline(ambient));
            let next = self.draw_text(hour_minute, start, layout.time_font)?;
            if !seconds.is_empty() {
                self.draw_text(seconds, next, layout.time_font)?;
            }
        }

        let high = high.unwrap_or("");
        let low = low.unwrap_or("");
        // 常亮模式高低温整体居中，交互模式只让高温居中
        let centered_width = if ambient {
            text_width(layout.temperature_font, high)
                + TEMPERATURE_GAP
                + text_width(layout.temperature_font, low)
        } else {
            text_width(layout.temperature_font, high)
        };
        let high_x = layout.center.x - centered_width / 2;
        let baseline = layout.temperature_baseline();

        if !high.is_empty() {
            self.draw_text(high, Point::new(high_x, baseline), layout.temperature_font)?;
        }
        if !low.is_empty() {
            let low_x = high_x + text_width(layout.temperature_font, high) + TEMPERATURE_GAP;
            self.draw_text(low, Point::new(low_x, baseline), layout.temperature_font)?;
        }

        if let Some(image) = icon {
            let raw = ImageRaw::<BinaryColor>::new(image.data(), image.width() as u32);
            let x = high_x - image.width() as i32 - TEMPERATURE_GAP;
            Image::new(&raw, Point::new(x, layout.icon_top()))
                .draw(&mut self.target)
                .map_err(|_| RenderError::DrawFailed)?;
        }

        Ok(())
    }

    fn draw_divider(&mut self, layout: &Layout) -> Result<(), RenderError> {
        let y = layout.center.y;
        Line::new(
            Point::new(layout.center.x - DIVIDER_HALF_WIDTH, y),
            Point::new(layout.center.x + DIVIDER_HALF_WIDTH, y),
        )
        .into_styled(PrimitiveStyle::with_stroke(FOREGROUND, 1))
        .draw(&mut self.target)
        .map_err(|_| RenderError::DrawFailed)
    }

    /// 返回下一段文字的起点
    fn draw_text(
        &mut self,
        text: &str,
        position: Point,
        font: &'static MonoFont<'static>,
    ) -> Result<Point, RenderError> {
        let style = MonoTextStyle::new(font, FOREGROUND);
        Text::with_baseline(text, position, style, Baseline::Alphabetic)
            .draw(&mut self.target)
            .map_err(|_| RenderError::DrawFailed)
    }
}

impl<D> FaceRenderer for FrameRenderer<D>
where
    D: DrawTarget<Color = BinaryColor>,
{
    fn render(&mut self, plan: &DrawPlan) -> Result<(), RenderError> {
        self.draw_plan(plan)?;
        trace!("Frame rendered: {} items", plan.items.len());
        Ok(())
    }
}

fn text_width(font: &'static MonoFont<'static>, text: &str) -> i32 {
    let style = MonoTextStyle::new(font, FOREGROUND);
    style
        .measure_string(text, Point::zero(), Baseline::Alphabetic)
        .bounding_box
        .size
        .width as i32
}
