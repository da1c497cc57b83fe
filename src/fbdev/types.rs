//! Mode descriptors and drawing requests exchanged with the host

/// Position and width of one color channel inside a pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bitfield {
    pub offset: u32,
    pub length: u32,
    pub msb_right: bool,
}

impl Bitfield {
    pub const fn new(offset: u32, length: u32) -> Self {
        Bitfield {
            offset,
            length,
            msb_right: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FbType {
    PackedPixels,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visual {
    TrueColor,
}

/// Fixed properties of the mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixScreenInfo {
    pub id: &'static str,
    /// Length of the framebuffer memory in bytes
    pub smem_len: usize,
    pub fb_type: FbType,
    pub visual: Visual,
    /// Bytes per scanline
    pub line_length: usize,
}

/// Variable properties of the mode; fixed for the device's lifetime here
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarScreenInfo {
    pub xres: u32,
    pub yres: u32,
    pub xres_virtual: u32,
    pub yres_virtual: u32,
    pub bits_per_pixel: u32,
    pub grayscale: bool,
    pub red: Bitfield,
    pub green: Bitfield,
    pub blue: Bitfield,
    pub transp: Bitfield,
}

/// Display blanking levels, from on to fully powered down
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum BlankMode {
    Unblank = 0,
    Normal = 1,
    VsyncSuspend = 2,
    HsyncSuspend = 3,
    Powerdown = 4,
}

impl BlankMode {
    /// Panel stays powered at this level
    pub fn is_powered(self) -> bool {
        self <= BlankMode::Normal
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => BlankMode::Unblank,
            1 => BlankMode::Normal,
            2 => BlankMode::VsyncSuspend,
            3 => BlankMode::HsyncSuspend,
            _ => BlankMode::Powerdown,
        }
    }
}

/// Raster operation for [`FillRect`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rop {
    #[default]
    Copy,
    Xor,
}

/// Solid rectangle fill; `color` is a pseudo-palette index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FillRect {
    pub dx: u32,
    pub dy: u32,
    pub width: u32,
    pub height: u32,
    pub color: u32,
    pub rop: Rop,
}

/// Screen to screen copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CopyArea {
    pub dx: u32,
    pub dy: u32,
    pub width: u32,
    pub height: u32,
    pub sx: u32,
    pub sy: u32,
}

/// Image to draw at (`dx`, `dy`).
///
/// With `depth` 1 each row is `ceil(width / 8)` bytes, most significant bit
/// first; set bits draw `fg_color` and clear bits `bg_color`, both palette
/// indices. With `depth` 16 `data` holds native-endian RGB565 pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Image<'a> {
    pub dx: u32,
    pub dy: u32,
    pub width: u32,
    pub height: u32,
    pub fg_color: u32,
    pub bg_color: u32,
    pub depth: u8,
    pub data: &'a [u8],
}
