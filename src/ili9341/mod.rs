//! ILI9341 TFT LCD Driver
//!
//! Used in the common 2.8" and 3.2" 320x240 SPI modules.
//!
//! The driver is split the same way the panel is talked to:
//!
//! 1. [`interface`] moves bytes, toggling the data/command line for each one
//! 1. [`driver`] knows the register sequences: reset, init, windows, power
//! 1. [`init_seq`] holds the vendor calibration table sent on init
//!
//! Pixel data is RGB565, sent most significant byte first.

pub mod driver;
pub mod init_seq;
pub mod interface;
pub mod pins;

mod cmd;
pub mod flag;

pub use cmd::Cmd;

/// Panel height in the default landscape orientation, pixels vertically
pub const HEIGHT: u16 = 240;

/// Panel width in the default landscape orientation, pixels horizontally
pub const WIDTH: u16 = 320;
