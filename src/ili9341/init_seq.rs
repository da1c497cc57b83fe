//! Vendor calibration sequence for the ILI9341
//!
//! These register writes come from the panel vendor and are sent in order,
//! byte for byte, before sleep-out. They are not meant to be tweaked
//! individually.

use crate::ili9341::{cmd::Cmd, flag::Flag};

/// One register write: command byte followed by its parameter bytes.
pub type RegisterWrite = (u8, &'static [u8]);

/// Ordered register writes issued by `init_chip` ahead of `SLEEP_OUT`.
pub const INIT_SEQUENCE: &[RegisterWrite] = &[
    (Cmd::VENDOR_EF, &[0x03, 0x80, 0x02]),
    (Cmd::POWER_CONTROL_B, &[0x00, 0xC1, 0x30]),
    (Cmd::POWER_ON_SEQUENCE_CONTROL, &[0x64, 0x03, 0x12, 0x81]),
    (Cmd::DRIVER_TIMING_CONTROL_A, &[0x85, 0x00, 0x78]),
    (Cmd::POWER_CONTROL_A, &[0x39, 0x2C, 0x00, 0x34, 0x02]),
    (Cmd::PUMP_RATIO_CONTROL, &[0x20]),
    (Cmd::DRIVER_TIMING_CONTROL_B, &[0x00, 0x00]),
    (Cmd::POWER_CONTROL_1, &[0x23]),       // VRH[5:0]
    (Cmd::POWER_CONTROL_2, &[0x10]),       // SAP[2:0]; BT[3:0]
    (Cmd::VCOM_CONTROL_1, &[0x3E, 0x28]),  // Contrast
    (Cmd::VCOM_CONTROL_2, &[0x86]),
    (Cmd::MEMORY_ACCESS_CONTROL, &[Flag::MADCTL_BASE]),
    (Cmd::PIXEL_FORMAT_SET, &[Flag::PIXEL_FORMAT_16BIT]),
    (Cmd::FRAME_RATE_CONTROL_NORMAL, &[0x00, 0x18]),
    (Cmd::DISPLAY_FUNCTION_CONTROL, &[0x08, 0x82, 0x27]),
    (Cmd::ENABLE_3GAMMA, &[0x00]),         // 3Gamma function disable
    (Cmd::GAMMA_SET, &[0x01]),             // Gamma curve 1
    (
        Cmd::POSITIVE_GAMMA_CORRECTION,
        &[
            0x0F, 0x31, 0x2B, 0x0C, 0x0E, 0x08, 0x4E, 0xF1, 0x37, 0x07, 0x10, 0x03, 0x0E, 0x09,
            0x00,
        ],
    ),
    (
        Cmd::NEGATIVE_GAMMA_CORRECTION,
        &[
            0x00, 0x0E, 0x14, 0x03, 0x11, 0x07, 0x31, 0xC1, 0x48, 0x08, 0x0F, 0x0C, 0x31, 0x36,
            0x0F,
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gamma_tables_are_full_length() {
        for (reg, payload) in INIT_SEQUENCE {
            if *reg == Cmd::POSITIVE_GAMMA_CORRECTION || *reg == Cmd::NEGATIVE_GAMMA_CORRECTION {
                assert_eq!(payload.len(), 15);
            }
        }
    }

    #[test]
    fn selects_16bit_pixels() {
        assert!(INIT_SEQUENCE
            .iter()
            .any(|(reg, payload)| *reg == Cmd::PIXEL_FORMAT_SET && **payload == [0x55]));
    }
}
