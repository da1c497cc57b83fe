//! Device configuration
//!
//! Everything that differs between panels or boards lives here. The defaults
//! describe the reference 320x240 module.

use core::time::Duration;

use crate::error::{Error, Result};
use crate::framebuffer::PixelFormat;
use crate::ili9341::{self, flag::Flag};

/// Reset line timings, all in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetTimings {
    /// Line held high before the reset pulse
    pub hold_ms: u32,
    /// Length of the low pulse
    pub trigger_ms: u32,
    /// Settle time after releasing the line
    pub settle_ms: u32,
}

impl Default for ResetTimings {
    fn default() -> Self {
        ResetTimings {
            hold_ms: 50,
            trigger_ms: 50,
            settle_ms: 100,
        }
    }
}

/// Configuration for [`attach`](crate::device::attach)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub width: u16,
    pub height: u16,
    pub format: PixelFormat,
    /// Dirty tracking granularity in bytes, a power of two
    pub page_size: usize,
    /// Delay between the first touch and the flush it schedules
    pub debounce: Duration,
    pub reset: ResetTimings,
    pub sleep_out_ms: u32,
    /// Orientation flags applied after sleep-out
    pub orientation: u8,
    /// Reinitialise the panel when resuming from suspend
    pub deep_suspend: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            width: ili9341::WIDTH,
            height: ili9341::HEIGHT,
            format: PixelFormat::Rgb565,
            page_size: 4096,
            debounce: Duration::from_millis(20),
            reset: ResetTimings::default(),
            sleep_out_ms: 120,
            orientation: Flag::SWITCH_XY | Flag::FLIP_X,
            deep_suspend: false,
        }
    }
}

impl Config {
    pub fn with_resolution(mut self, width: u16, height: u16) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_reset_timings(mut self, reset: ResetTimings) -> Self {
        self.reset = reset;
        self
    }

    pub fn with_orientation(mut self, orientation: u8) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_deep_suspend(mut self, deep_suspend: bool) -> Self {
        self.deep_suspend = deep_suspend;
        self
    }

    /// Number of pixels in the frame
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Size of the frame in bytes
    pub fn frame_size(&self) -> usize {
        self.pixel_count() * self.format.bytes_per_pixel()
    }

    /// Bytes per scanline
    pub fn line_length(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    /// Check the geometry before anything gets allocated
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::Config("resolution must be non-zero"));
        }
        if !self.page_size.is_power_of_two() {
            return Err(Error::Config("page size must be a power of two"));
        }
        if self.page_size < self.format.bytes_per_pixel() {
            return Err(Error::Config("page size must hold at least one pixel"));
        }
        if self.debounce > Duration::from_secs(1) {
            return Err(Error::Config("debounce longer than one second"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_panel() {
        let config = Config::default();
        assert_eq!(config.frame_size(), 320 * 240 * 2);
        assert_eq!(config.line_length(), 640);
        assert_eq!(config.debounce, Duration::from_millis(20));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_page_sizes() {
        assert!(Config::default().with_page_size(3000).validate().is_err());
        assert!(Config::default().with_page_size(1).validate().is_err());
        assert!(Config::default().with_page_size(0).validate().is_err());
        assert!(Config::default().with_page_size(64).validate().is_ok());
    }

    #[test]
    fn rejects_empty_resolution() {
        assert!(Config::default().with_resolution(0, 240).validate().is_err());
    }
}
