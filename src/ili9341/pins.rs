//! Pin definitions for the ILI9341 panel on the reference ESP32-S3 board
//!
//! This module contains all GPIO pin assignments used by the board binary.

/// Pin configuration constants for the ILI9341 display
pub struct Pins;

#[allow(dead_code)]
impl Pins {
    // SPI Display pins
    /// Chip Select pin for SPI display
    pub const CS: u8 = 10;
    /// Data/Command control pin (High for data, Low for command)
    pub const DC: u8 = 16;
    /// Reset pin for display
    pub const RST: u8 = 12;
    /// SPI Clock pin
    pub const SCK: u8 = 36;
    /// SPI Master Out Slave In
    pub const MOSI: u8 = 35;
    /// Backlight enable
    pub const BACKLIGHT: u8 = 45;
}
