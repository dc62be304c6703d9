//! 渲染缓冲区模块
//! 单色帧缓冲区，每像素一字节，可作为 `embedded-graphics` 的绘制目标

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u16,
    height: u16,
    buffer: Vec<u8>,
}

impl Framebuffer {
    pub fn new(width: u16, height: u16) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            buffer: vec![0x00; size],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// 越界返回 `None`
    pub fn pixel(&self, x: i32, y: i32) -> Option<BinaryColor> {
        let index = self.index(x, y)?;
        Some(BinaryColor::from(self.buffer[index] != 0))
    }

    /// 点亮像素个数
    pub fn lit_pixels(&self) -> usize {
        self.buffer.iter().filter(|&&b| b != 0).count()
    }

    /// 某一行中点亮像素的横坐标
    pub fn lit_in_row(&self, y: i32) -> impl Iterator<Item = i32> + '_ {
        (0..self.width as i32).filter(move |&x| self.pixel(x, y) == Some(BinaryColor::On))
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        // 常见方形手表分辨率
        Self::new(320, 320)
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let Some(index) = self.index(point.x, point.y) {
                self.buffer[index] = if color.is_on() { 0xFF } else { 0x00 };
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.buffer.fill(if color.is_on() { 0xFF } else { 0x00 });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_pixels_are_clipped() {
        let mut fb = Framebuffer::new(4, 4);
        fb.draw_iter([
            Pixel(Point::new(1, 1), BinaryColor::On),
            Pixel(Point::new(-1, 0), BinaryColor::On),
            Pixel(Point::new(4, 0), BinaryColor::On),
        ])
        .unwrap();

        assert_eq!(fb.pixel(1, 1), Some(BinaryColor::On));
        assert_eq!(fb.pixel(4, 0), None);
        assert_eq!(fb.lit_pixels(), 1);
    }

    #[test]
    fn clear_fills_whole_buffer() {
        let mut fb = Framebuffer::new(3, 2);
        fb.clear(BinaryColor::On).unwrap();
        assert_eq!(fb.lit_pixels(), 6);
        assert_eq!(fb.size(), Size::new(3, 2));
    }
}
