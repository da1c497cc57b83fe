/// Flags and register values used by the ILI9341 driver.
///
/// Orientation flags are combined with `|` and handed to
/// [`Ili9341::set_orientation`](crate::ili9341::driver::Ili9341::set_orientation),
/// which folds them into one `MEMORY_ACCESS_CONTROL` byte.
pub struct Flag;
#[allow(missing_docs)]
impl Flag {
    // Orientation request flags (not register bits)
    pub const FLIP_X: u8 = 0x01;
    pub const FLIP_Y: u8 = 0x02;
    pub const SWITCH_XY: u8 = 0x04;

    // Memory Access Control (0x36) bits
    pub const MADCTL_MY: u8 = 1 << 7; // Row address order
    pub const MADCTL_MX: u8 = 1 << 6; // Column address order
    pub const MADCTL_MV: u8 = 1 << 5; // Row/column exchange
    pub const MADCTL_BGR: u8 = 1 << 3; // BGR colour filter panel

    // Power-on default: MX | BGR
    pub const MADCTL_BASE: u8 = 0x48;

    // Pixel Format Set (0x3A)
    pub const PIXEL_FORMAT_16BIT: u8 = 0x55;

    // Common RGB565 colours
    pub const BLACK: u16 = 0x0000;
    pub const RED: u16 = 0xF800;
    pub const GREEN: u16 = 0x07E0;
    pub const CYAN: u16 = 0x07FF;
    pub const MAGENTA: u16 = 0xF81F;
    pub const YELLOW: u16 = 0xFFE0;
    pub const WHITE: u16 = 0xFFFF;
}

/// Fold orientation flags into a `MEMORY_ACCESS_CONTROL` value.
pub fn madctl_for(flags: u8) -> u8 {
    let mut madctl = Flag::MADCTL_BASE;

    if flags & Flag::FLIP_X != 0 {
        madctl &= !Flag::MADCTL_MX;
    }
    if flags & Flag::FLIP_Y != 0 {
        madctl |= Flag::MADCTL_MY;
    }
    if flags & Flag::SWITCH_XY != 0 {
        madctl |= Flag::MADCTL_MV;
    }

    madctl
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_keeps_base() {
        assert_eq!(madctl_for(0), Flag::MADCTL_BASE);
    }

    #[test]
    fn flip_x_clears_column_order_only() {
        let madctl = madctl_for(Flag::FLIP_X);
        assert_eq!(madctl & Flag::MADCTL_MX, 0);
        assert_eq!(madctl & Flag::MADCTL_MY, Flag::MADCTL_BASE & Flag::MADCTL_MY);
        assert_eq!(madctl & Flag::MADCTL_MV, Flag::MADCTL_BASE & Flag::MADCTL_MV);
        assert_eq!(madctl, 0x08);
    }

    #[test]
    fn flip_x_with_switch_sets_exchange() {
        let madctl = madctl_for(Flag::FLIP_X | Flag::SWITCH_XY);
        assert_eq!(madctl & Flag::MADCTL_MX, 0);
        assert_ne!(madctl & Flag::MADCTL_MV, 0);
        assert_eq!(madctl, 0x28);
    }

    #[test]
    fn flip_y_sets_row_order() {
        assert_eq!(madctl_for(Flag::FLIP_Y), 0xC8);
    }
}
