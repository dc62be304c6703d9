//! 控制台显示驱动
//! 在帧缓冲区上渲染，把每帧内容写进日志，trace 级别下输出字符画

use core::fmt::Write;

use embedded_graphics::pixelcolor::BinaryColor;
use sunshine_face_common::*;
use sunshine_face_graphics::{FrameRenderer, Framebuffer};

/// 字符画每个字符对应的像素块边长
const CELL: i32 = 4;

pub struct ConsoleDisplay {
    renderer: FrameRenderer<Framebuffer>,
    frames: u32,
}

impl ConsoleDisplay {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            renderer: FrameRenderer::new(Framebuffer::new(width, height)),
            frames: 0,
        }
    }

    fn ascii(&self) -> String {
        let fb = self.renderer.target();
        let mut art = String::new();
        for cy in (0..fb.height() as i32).step_by(CELL as usize) {
            for cx in (0..fb.width() as i32).step_by(CELL as usize) {
                let lit = (0..CELL)
                    .any(|dy| (0..CELL).any(|dx| fb.pixel(cx + dx, cy + dy) == Some(BinaryColor::On)));
                art.push(if lit { '#' } else { ' ' });
            }
            art.push('\n');
        }
        art
    }
}

fn summary(plan: &DrawPlan) -> String {
    let mut text = String::new();
    for item in plan.items.iter() {
        let _ = match item {
            DrawItem::HourMinute(t) => write!(text, "{}", t.as_str()),
            DrawItem::Seconds(t) => write!(text, "{} ", t.as_str()),
            DrawItem::Date(t) => write!(text, " {} ", t.as_str()),
            DrawItem::Divider => write!(text, "| "),
            DrawItem::HighTemperature(t) => write!(text, "{} ", t.as_str()),
            DrawItem::LowTemperature(t) => write!(text, "{} ", t.as_str()),
            DrawItem::Icon(image) => write!(text, "[icon {}x{}]", image.width(), image.height()),
        };
    }
    text
}

impl FaceRenderer for ConsoleDisplay {
    fn render(&mut self, plan: &DrawPlan) -> Result<(), RenderError> {
        self.renderer.render(plan)?;
        self.frames += 1;

        debug!(
            "Frame {} ({:?}, aa={}): {}",
            self.frames,
            plan.background,
            plan.style.anti_alias,
            summary(plan)
        );
        if log::log_enabled!(log::Level::Trace) {
            trace!("\n{}", self.ascii());
        }
        Ok(())
    }
}
