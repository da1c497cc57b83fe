pub struct Cmd;
#[allow(dead_code)]
impl Cmd {
    // System
    pub const NOP: u8 = 0x00;
    pub const SW_RESET: u8 = 0x01;
    pub const SLEEP_IN: u8 = 0x10;
    pub const SLEEP_OUT: u8 = 0x11;
    pub const NORMAL_MODE_ON: u8 = 0x13;
    pub const INVERSION_OFF: u8 = 0x20;
    pub const INVERSION_ON: u8 = 0x21;
    pub const GAMMA_SET: u8 = 0x26;
    pub const DISPLAY_OFF: u8 = 0x28;
    pub const DISPLAY_ON: u8 = 0x29;

    // Addressing
    pub const COLUMN_ADDRESS_SET: u8 = 0x2A;
    pub const PAGE_ADDRESS_SET: u8 = 0x2B;
    pub const MEMORY_WRITE: u8 = 0x2C;
    pub const MEMORY_ACCESS_CONTROL: u8 = 0x36;
    pub const PIXEL_FORMAT_SET: u8 = 0x3A;

    // Panel control
    pub const FRAME_RATE_CONTROL_NORMAL: u8 = 0xB1;
    pub const DISPLAY_FUNCTION_CONTROL: u8 = 0xB6;
    pub const POWER_CONTROL_1: u8 = 0xC0;
    pub const POWER_CONTROL_2: u8 = 0xC1;
    pub const VCOM_CONTROL_1: u8 = 0xC5;
    pub const VCOM_CONTROL_2: u8 = 0xC7;
    pub const POSITIVE_GAMMA_CORRECTION: u8 = 0xE0;
    pub const NEGATIVE_GAMMA_CORRECTION: u8 = 0xE1;

    // Extended (undocumented in the short datasheet, needed by the vendor init)
    pub const POWER_CONTROL_A: u8 = 0xCB;
    pub const POWER_CONTROL_B: u8 = 0xCF;
    pub const DRIVER_TIMING_CONTROL_A: u8 = 0xE8;
    pub const DRIVER_TIMING_CONTROL_B: u8 = 0xEA;
    pub const POWER_ON_SEQUENCE_CONTROL: u8 = 0xED;
    pub const ENABLE_3GAMMA: u8 = 0xF2;
    pub const PUMP_RATIO_CONTROL: u8 = 0xF7;
    pub const VENDOR_EF: u8 = 0xEF;
}

/*
Vendor init order:
0xEF, 0xCF, 0xED, 0xE8, 0xCB, 0xF7, 0xEA - undocumented power/timing tweaks
0xC0, 0xC1 - Power Control 1/2
0xC5, 0xC7 - VCOM Control 1/2
0x36 - Memory Access Control
0x3A - Pixel Format Set (0x55 = 16 bit)
0xB1 - Frame Rate Control
0xB6 - Display Function Control
0xF2 - 3Gamma disable
0x26 - Gamma curve
0xE0, 0xE1 - Gamma tables
0x11 - Sleep Out (120 ms settle)
*/
