//! Live pixel memory shared with the host
//!
//! The framebuffer is a flat raster of RGB565 pixels. Host writers and the
//! flush worker touch it concurrently; pixels are atomics so a write landing
//! in the middle of a diff pass is merely seen or not seen, never torn.

use core::ops::RangeInclusive;
use core::sync::atomic::{AtomicU16, Ordering};

use crate::error::{Error, Result};

/// Pixel layout of the framebuffer and the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 16 bit: red 15..11, green 10..5, blue 4..0
    Rgb565,
}

impl PixelFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb565 => 2,
        }
    }

    pub const fn bits_per_pixel(self) -> u32 {
        match self {
            PixelFormat::Rgb565 => 16,
        }
    }
}

/// Pixel rectangle, `width` x `height` starting at (`x`, `y`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Clip a host-supplied rectangle to a `width` x `height` screen
    pub fn clipped(x: u32, y: u32, w: u32, h: u32, width: u16, height: u16) -> Option<Rect> {
        if x >= u32::from(width) || y >= u32::from(height) {
            return None;
        }
        let w = w.min(u32::from(width) - x);
        let h = h.min(u32::from(height) - y);
        let rect = Rect::new(x as u16, y as u16, w as u16, h as u16);
        (!rect.is_empty()).then_some(rect)
    }

    /// Scanlines covered, `None` when empty
    pub fn rows(&self) -> Option<RangeInclusive<u16>> {
        if self.is_empty() {
            return None;
        }
        Some(self.y..=self.y.saturating_add(self.height - 1))
    }

    pub fn columns(&self) -> core::ops::Range<usize> {
        usize::from(self.x)..usize::from(self.x) + usize::from(self.width)
    }
}

/// Linear RGB565 raster, row-major
pub struct Framebuffer {
    pixels: Vec<AtomicU16>,
    width: u16,
    height: u16,
}

impl Framebuffer {
    /// Allocate a zeroed (black) framebuffer
    pub fn new(width: u16, height: u16) -> Result<Self> {
        let len = usize::from(width) * usize::from(height);
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| Error::Allocation { what: "framebuffer" })?;
        pixels.resize_with(len, || AtomicU16::new(0));

        log::debug!("Framebuffer allocated: {}x{} ({} bytes)", width, height, len * 2);
        Ok(Framebuffer {
            pixels,
            width,
            height,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Number of pixels
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Size of the host-visible region in bytes
    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * PixelFormat::Rgb565.bytes_per_pixel()
    }

    pub fn pixel(&self, index: usize) -> Option<u16> {
        self.pixels.get(index).map(|p| p.load(Ordering::Relaxed))
    }

    pub fn set_pixel(&self, index: usize, value: u16) -> bool {
        match self.pixels.get(index) {
            Some(p) => {
                p.store(value, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, x: u16, y: u16) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixel(self.index_of(x, y))
    }

    pub fn set(&self, x: u16, y: u16, value: u16) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.set_pixel(self.index_of(x, y), value)
    }

    /// One scanline; empty when `y` is off screen
    pub fn row(&self, y: u16) -> &[AtomicU16] {
        if y >= self.height {
            return &[];
        }
        let start = usize::from(y) * usize::from(self.width);
        &self.pixels[start..start + usize::from(self.width)]
    }

    /// Apply `op` to every on-screen pixel of `rect`
    pub fn update_rect(&self, rect: Rect, mut op: impl FnMut(u16) -> u16) {
        let Some(rect) = Rect::clipped(
            u32::from(rect.x),
            u32::from(rect.y),
            u32::from(rect.width),
            u32::from(rect.height),
            self.width,
            self.height,
        ) else {
            return;
        };
        let Some(rows) = rect.rows() else {
            return;
        };
        for y in rows {
            for pixel in &self.row(y)[rect.columns()] {
                pixel.store(op(pixel.load(Ordering::Relaxed)), Ordering::Relaxed);
            }
        }
    }

    /// Copy raw bytes in at `offset`, native byte order; returns bytes written
    pub fn write_bytes(&self, offset: usize, data: &[u8]) -> usize {
        let size = self.size_bytes();
        if offset >= size {
            return 0;
        }
        let count = data.len().min(size - offset);

        for (i, &byte) in data[..count].iter().enumerate() {
            let at = offset + i;
            let pixel = &self.pixels[at / 2];
            let mut bytes = pixel.load(Ordering::Relaxed).to_ne_bytes();
            bytes[at % 2] = byte;
            pixel.store(u16::from_ne_bytes(bytes), Ordering::Relaxed);
        }
        count
    }

    /// Copy raw bytes out from `offset`, native byte order; returns bytes read
    pub fn read_bytes(&self, offset: usize, out: &mut [u8]) -> usize {
        let size = self.size_bytes();
        if offset >= size {
            return 0;
        }
        let count = out.len().min(size - offset);

        for (i, slot) in out[..count].iter_mut().enumerate() {
            let at = offset + i;
            *slot = self.pixels[at / 2].load(Ordering::Relaxed).to_ne_bytes()[at % 2];
        }
        count
    }

    fn index_of(&self, x: u16, y: u16) -> usize {
        usize::from(y) * usize::from(self.width) + usize::from(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clipping_trims_to_screen() {
        assert_eq!(
            Rect::clipped(300, 230, 50, 50, 320, 240),
            Some(Rect::new(300, 230, 20, 10))
        );
        assert_eq!(Rect::clipped(320, 0, 1, 1, 320, 240), None);
        assert_eq!(Rect::clipped(0, 0, 0, 5, 320, 240), None);
    }

    #[test]
    fn rows_are_inclusive() {
        assert_eq!(Rect::new(0, 10, 5, 3).rows(), Some(10..=12));
        assert_eq!(Rect::new(0, 10, 5, 0).rows(), None);
    }

    #[test]
    fn byte_writes_land_in_native_order() {
        let fb = Framebuffer::new(4, 2).unwrap();
        let value: u16 = 0xF81F;
        assert_eq!(fb.write_bytes(2, &value.to_ne_bytes()), 2);
        assert_eq!(fb.get(1, 0), Some(0xF81F));

        let mut out = [0u8; 2];
        assert_eq!(fb.read_bytes(2, &mut out), 2);
        assert_eq!(u16::from_ne_bytes(out), 0xF81F);
    }

    #[test]
    fn byte_writes_clamp_at_end() {
        let fb = Framebuffer::new(2, 1).unwrap();
        assert_eq!(fb.write_bytes(3, &[0xAA, 0xBB, 0xCC]), 1);
        assert_eq!(fb.write_bytes(4, &[0xAA]), 0);
    }

    #[test]
    fn update_rect_touches_only_the_rect() {
        let fb = Framebuffer::new(4, 4).unwrap();
        fb.update_rect(Rect::new(1, 1, 2, 2), |_| 7);
        assert_eq!(fb.get(0, 0), Some(0));
        assert_eq!(fb.get(1, 1), Some(7));
        assert_eq!(fb.get(2, 2), Some(7));
        assert_eq!(fb.get(3, 3), Some(0));
    }

    #[test]
    fn update_rect_ignores_what_falls_off_screen() {
        let fb = Framebuffer::new(4, 4).unwrap();
        fb.update_rect(Rect::new(0, 10, 1, 1), |_| 9);
        fb.update_rect(Rect::new(10, 0, 1, 1), |_| 9);
        assert!((0..4).all(|y| (0..4).all(|x| fb.get(x, y) == Some(0))));

        fb.update_rect(Rect::new(2, 3, 100, 100), |_| 5);
        assert_eq!(fb.get(3, 3), Some(5));
        assert_eq!(fb.get(1, 3), Some(0));
    }
}
