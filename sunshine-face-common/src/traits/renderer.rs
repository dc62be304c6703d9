use crate::types::{DrawPlan, RenderError};

/// 渲染器边界：把一帧绘制计划画到屏幕上
///
/// 同步调用，不得等待 I/O。
pub trait FaceRenderer {
    fn render(&mut self, plan: &DrawPlan) -> Result<(), RenderError>;
}
