//! Host-facing framebuffer operations
//!
//! These are the entry points a console or windowing layer drives: raw
//! reads and writes of the mapped memory, rectangle fills, image blits,
//! screen copies, palette registration and blanking. Each one changes the
//! framebuffer first, then marks the scanlines it touched and schedules a
//! flush. None of them talks to the panel.
//!
//! [`FbHandle`] also implements [`DrawTarget`], so `embedded-graphics`
//! primitives can be drawn straight into the framebuffer.

pub mod types;

use core::convert::Infallible;
use core::sync::atomic::Ordering;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::device::{FbHandle, PowerRequest};
use crate::error::{Error, Result};
use crate::framebuffer::Rect;
use types::{
    Bitfield, BlankMode, CopyArea, FbType, FillRect, FixScreenInfo, Image, Rop, VarScreenInfo,
    Visual,
};

const RED: Bitfield = Bitfield::new(11, 5);
const GREEN: Bitfield = Bitfield::new(5, 6);
const BLUE: Bitfield = Bitfield::new(0, 5);
const TRANSP: Bitfield = Bitfield::new(0, 0);

/// Scale a 16-bit channel to `width` bits, rounding to nearest
fn to_hw(value: u16, width: u32) -> u32 {
    let v = u32::from(value);
    ((v << width) + 0x7FFF - v) >> 16
}

impl FbHandle {
    pub fn fix_info(&self) -> FixScreenInfo {
        FixScreenInfo {
            id: "ILI9341",
            smem_len: self.size_bytes(),
            fb_type: FbType::PackedPixels,
            visual: Visual::TrueColor,
            line_length: self.config().line_length(),
        }
    }

    pub fn var_info(&self) -> VarScreenInfo {
        let (w, h) = (u32::from(self.width()), u32::from(self.height()));
        VarScreenInfo {
            xres: w,
            yres: h,
            xres_virtual: w,
            yres_virtual: h,
            bits_per_pixel: self.config().format.bits_per_pixel(),
            grayscale: self.shared.grayscale.load(Ordering::Relaxed),
            red: RED,
            green: GREEN,
            blue: BLUE,
            transp: TRANSP,
        }
    }

    /// Convert colors registered afterwards to gray
    pub fn set_grayscale(&self, grayscale: bool) {
        self.shared.grayscale.store(grayscale, Ordering::Relaxed);
    }

    /// Register a 16-bit-per-channel color in pseudo-palette slot `regno`
    pub fn set_color_register(
        &self,
        regno: u32,
        mut red: u16,
        mut green: u16,
        mut blue: u16,
        transp: u16,
    ) -> Result<()> {
        let slot = usize::try_from(regno)
            .ok()
            .and_then(|i| self.shared.palette.get(i))
            .ok_or(Error::PaletteIndex(regno))?;

        if self.shared.grayscale.load(Ordering::Relaxed) {
            let gray = (19595 * u32::from(red) + 38470 * u32::from(green) + 7471 * u32::from(blue))
                >> 16;
            red = gray as u16;
            green = gray as u16;
            blue = gray as u16;
        }

        let value = (to_hw(red, RED.length) << RED.offset)
            | (to_hw(green, GREEN.length) << GREEN.offset)
            | (to_hw(blue, BLUE.length) << BLUE.offset)
            | (to_hw(transp, TRANSP.length) << TRANSP.offset);
        slot.store(value, Ordering::Relaxed);
        Ok(())
    }

    /// Palette entry for `color`; values past the palette are taken as raw RGB565
    pub fn palette_color(&self, color: u32) -> u16 {
        match self.shared.palette.get(color as usize) {
            Some(entry) => entry.load(Ordering::Relaxed) as u16,
            None => color as u16,
        }
    }

    /// Write raw bytes into the mapped memory at `offset`; returns bytes written
    pub fn write(&self, offset: usize, data: &[u8]) -> usize {
        let written = self.shared.fb.write_bytes(offset, data);
        if written > 0 {
            let line = self.config().line_length();
            let first = offset / line;
            let last = (offset + written - 1) / line;
            if self.shared.dirty.mark_rows(first as u16, last as u16) > 0 {
                self.shared.scheduler.schedule();
            }
        }
        written
    }

    /// Read raw bytes from the mapped memory at `offset`; returns bytes read
    pub fn read(&self, offset: usize, out: &mut [u8]) -> usize {
        self.shared.fb.read_bytes(offset, out)
    }

    /// A mapped page was written directly by the host
    pub fn page_written(&self, index: usize) {
        if index < self.shared.dirty.table().len() {
            self.shared.dirty.mark_page(index);
            self.shared.scheduler.schedule();
        }
    }

    /// The mapped byte at `offset` was written directly; marks its page
    pub fn mapped_write(&self, offset: usize) {
        match self.shared.dirty.table().page_of_byte(offset) {
            Some(index) => self.page_written(index),
            None => log::warn!("Mapped write at {} is past the framebuffer", offset),
        }
    }

    pub fn fill_rect(&self, fill: &FillRect) {
        let Some(rect) = self.clip(fill.dx, fill.dy, fill.width, fill.height) else {
            return;
        };
        let color = self.palette_color(fill.color);
        match fill.rop {
            Rop::Copy => self.shared.fb.update_rect(rect, |_| color),
            Rop::Xor => self.shared.fb.update_rect(rect, |old| old ^ color),
        }
        self.shared.touch(rect);
    }

    pub fn image_blit(&self, image: &Image<'_>) {
        let Some(rect) = self.clip(image.dx, image.dy, image.width, image.height) else {
            return;
        };
        let fb = &self.shared.fb;

        match image.depth {
            1 => {
                let fg = self.palette_color(image.fg_color);
                let bg = self.palette_color(image.bg_color);
                let stride = (image.width as usize).div_ceil(8);
                for row in 0..rect.height {
                    for col in 0..rect.width {
                        let at = usize::from(row) * stride + usize::from(col) / 8;
                        let Some(&byte) = image.data.get(at) else {
                            continue;
                        };
                        let set = byte & (0x80 >> (col % 8)) != 0;
                        fb.set(rect.x + col, rect.y + row, if set { fg } else { bg });
                    }
                }
            }
            16 => {
                for row in 0..rect.height {
                    for col in 0..rect.width {
                        let at = (usize::from(row) * image.width as usize + usize::from(col)) * 2;
                        let Some(bytes) = image.data.get(at..at + 2) else {
                            continue;
                        };
                        let value = u16::from_ne_bytes([bytes[0], bytes[1]]);
                        fb.set(rect.x + col, rect.y + row, value);
                    }
                }
            }
            depth => {
                log::warn!("Unsupported image depth {}", depth);
                return;
            }
        }
        self.shared.touch(rect);
    }

    /// Copy a screen area; overlapping source and destination are handled
    pub fn copy_area(&self, area: &CopyArea) {
        let (Some(src), Some(dst)) = (
            self.clip(area.sx, area.sy, area.width, area.height),
            self.clip(area.dx, area.dy, area.width, area.height),
        ) else {
            return;
        };
        let width = src.width.min(dst.width);
        let height = src.height.min(dst.height);
        let fb = &self.shared.fb;

        let mut line = Vec::with_capacity(usize::from(width));
        let copy_row = |row: u16, line: &mut Vec<u16>| {
            line.clear();
            line.extend((0..width).map(|col| fb.get(src.x + col, src.y + row).unwrap_or(0)));
            for (col, &value) in (0..width).zip(line.iter()) {
                fb.set(dst.x + col, dst.y + row, value);
            }
        };

        if dst.y > src.y {
            for row in (0..height).rev() {
                copy_row(row, &mut line);
            }
        } else {
            for row in 0..height {
                copy_row(row, &mut line);
            }
        }
        self.shared.touch(Rect::new(dst.x, dst.y, width, height));
    }

    /// Change the blank level. The whole frame is flushed right away, since
    /// a power change shows only once pixels follow it.
    pub fn blank(&self, mode: BlankMode) {
        let previous = BlankMode::from_u8(self.shared.blank.swap(mode as u8, Ordering::AcqRel));
        log::info!("Blank {:?} -> {:?}", previous, mode);

        if previous.is_powered() != mode.is_powered() {
            self.shared.request_power(if mode.is_powered() {
                PowerRequest::On
            } else {
                PowerRequest::Off
            });
        }
        self.shared.touch_all_now();
    }

    /// Put the panel to sleep on the next worker pass
    pub fn suspend(&self) {
        log::info!("Suspend requested");
        self.shared.request_power(PowerRequest::Suspend);
        self.shared.scheduler.schedule_now();
    }

    /// Resend the whole frame, powering the panel back on unless it is blanked
    pub fn resume(&self) {
        let blank = self.current_blank();
        log::info!("Resume requested ({:?})", blank);
        if blank.is_powered() {
            self.shared.request_power(PowerRequest::Resume);
        }
        self.shared.touch_all_now();
    }

    fn clip(&self, x: u32, y: u32, width: u32, height: u32) -> Option<Rect> {
        Rect::clipped(x, y, width, height, self.width(), self.height())
    }
}

impl OriginDimensions for FbHandle {
    fn size(&self) -> Size {
        Size::new(u32::from(self.width()), u32::from(self.height()))
    }
}

impl DrawTarget for FbHandle {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> core::result::Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let mut rows: Option<(u16, u16)> = None;

        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u16::try_from(point.x), u16::try_from(point.y)) else {
                continue;
            };
            if !self.shared.fb.set(x, y, color.into_storage()) {
                continue;
            }
            rows = Some(match rows {
                Some((top, bottom)) => (top.min(y), bottom.max(y)),
                None => (y, y),
            });
        }

        if let Some((top, bottom)) = rows {
            if self.shared.dirty.mark_rows(top, bottom) > 0 {
                self.shared.scheduler.schedule();
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> core::result::Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        if area.is_zero_sized() {
            return Ok(());
        }
        let rect = Rect::new(
            area.top_left.x as u16,
            area.top_left.y as u16,
            area.size.width as u16,
            area.size.height as u16,
        );
        let value = color.into_storage();
        self.shared.fb.update_rect(rect, |_| value);
        self.shared.touch(rect);
        Ok(())
    }
}
