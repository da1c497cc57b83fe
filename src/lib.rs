//! Framebuffer for ILI9341 SPI panels
//!
//! The host draws into a plain RGB565 framebuffer. A single flush worker
//! compares it against a shadow of what the panel shows and sends only the
//! changed part of each changed scanline, so a blinking cursor costs a few
//! bytes on the bus instead of a 150 KiB frame.
//!
//! ```text
//!  writers ──► FbHandle ──► framebuffer + dirty pages ──► UpdateScheduler
//!                                                             │ debounce
//!  panel ◄── Transport ◄── Ili9341 ◄── DiffEngine ◄── FlushWorker
//! ```

pub mod config;
pub mod device;
pub mod diff;
pub mod error;
pub mod fbdev;
pub mod framebuffer;
pub mod ili9341;
pub mod pages;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{Config, ResetTimings};
pub use device::{attach, FbHandle, FlushWorker};
pub use diff::FlushReport;
pub use error::{Error, Result};
pub use fbdev::types::{BlankMode, CopyArea, FillRect, Image, Rop};
pub use ili9341::interface::{DisplayInterface, Transport};
