//! Diff engine
//!
//! Keeps a shadow copy of what the panel is showing and turns a dirty page
//! into the smallest set of transfers that brings the panel up to date:
//! one window plus one block per changed scanline, covering the leftmost to
//! the rightmost changed column.
//!
//! Every scanline a page touches is compared over the full panel width and
//! every differing pixel is copied into the shadow during the scan, so the
//! shadow row equals what was read once the scan is done. A second flush
//! with no write in between finds nothing and sends nothing.
//!
//! Scanlines can be flagged stale. A stale line is sent in full on its next
//! scan no matter what the shadow holds; this covers the first frame after
//! attach, a panel that lost its memory, and a transfer that failed midway.

use core::sync::atomic::Ordering;

use display_interface::DisplayError;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::error::{Error, Result};
use crate::framebuffer::Framebuffer;
use crate::ili9341::driver::Ili9341;
use crate::ili9341::interface::Transport;
use crate::pages::Page;

/// What a flush did on the bus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Dirty pages collected and scanned
    pub pages: usize,
    /// Window + block transfers issued
    pub lines: usize,
    /// Pixels transferred
    pub pixels: usize,
    /// Transfers that failed
    pub errors: usize,
}

impl FlushReport {
    /// Nothing went over the bus
    pub fn is_idle(&self) -> bool {
        self.lines == 0 && self.errors == 0
    }
}

pub struct DiffEngine {
    shadow: Vec<u16>,
    stale: Vec<bool>,
    scratch: Vec<u8>,
    width: u16,
    height: u16,
}

impl DiffEngine {
    /// Allocate a shadow for a `width` x `height` frame; every line starts stale
    pub fn new(width: u16, height: u16) -> Result<Self> {
        let w = usize::from(width);
        let h = usize::from(height);

        let mut shadow = Vec::new();
        shadow
            .try_reserve_exact(w * h)
            .map_err(|_| Error::Allocation { what: "shadow buffer" })?;
        shadow.resize(w * h, 0);

        let mut stale = Vec::new();
        stale
            .try_reserve_exact(h)
            .map_err(|_| Error::Allocation { what: "scanline flags" })?;
        stale.resize(h, true);

        let mut scratch = Vec::new();
        scratch
            .try_reserve_exact(w * 2)
            .map_err(|_| Error::Allocation { what: "transfer buffer" })?;

        Ok(DiffEngine {
            shadow,
            stale,
            scratch,
            width,
            height,
        })
    }

    /// Forget what the panel shows; the next scan of each line sends it whole
    pub fn invalidate(&mut self) {
        self.stale.fill(true);
    }

    pub fn is_stale(&self, y: u16) -> bool {
        self.stale.get(usize::from(y)).copied().unwrap_or(false)
    }

    /// Last value sent for a pixel
    pub fn shadow_pixel(&self, x: u16, y: u16) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.shadow
            .get(usize::from(y) * usize::from(self.width) + usize::from(x))
            .copied()
    }

    /// Scan every scanline `page` touches and send what changed.
    ///
    /// Every line is tried even after a failure. The last transfer error is
    /// returned; failed lines are left stale and the caller should mark the
    /// page dirty again.
    pub fn flush_page<T, RST, DELAY>(
        &mut self,
        panel: &mut Ili9341<T, RST, DELAY>,
        fb: &Framebuffer,
        page: &Page,
        report: &mut FlushReport,
    ) -> core::result::Result<(), DisplayError>
    where
        T: Transport,
        RST: OutputPin,
        DELAY: DelayNs,
    {
        report.pages += 1;
        let mut outcome = Ok(());

        for y in page.rows() {
            match self.flush_line(panel, fb, y) {
                Ok(0) => {}
                Ok(pixels) => {
                    report.lines += 1;
                    report.pixels += pixels;
                }
                Err(e) => {
                    log::warn!("Scanline {} transfer failed: {:?}", y, e);
                    report.errors += 1;
                    outcome = Err(e);
                }
            }
        }
        outcome
    }

    /// Diff one scanline, returning the number of pixels sent
    fn flush_line<T, RST, DELAY>(
        &mut self,
        panel: &mut Ili9341<T, RST, DELAY>,
        fb: &Framebuffer,
        y: u16,
    ) -> core::result::Result<usize, DisplayError>
    where
        T: Transport,
        RST: OutputPin,
        DELAY: DelayNs,
    {
        if y >= self.height {
            return Ok(0);
        }
        let w = usize::from(self.width);
        let start = usize::from(y) * w;
        let shadow = &mut self.shadow[start..start + w];
        let live = fb.row(y);

        let span = if self.stale[usize::from(y)] {
            for (s, p) in shadow.iter_mut().zip(live) {
                *s = p.load(Ordering::Relaxed);
            }
            Some((0, w - 1))
        } else {
            let mut span: Option<(usize, usize)> = None;
            for (x, (s, p)) in shadow.iter_mut().zip(live).enumerate() {
                let value = p.load(Ordering::Relaxed);
                if value != *s {
                    *s = value;
                    span = Some(match span {
                        Some((first, _)) => (first, x),
                        None => (x, x),
                    });
                }
            }
            span
        };

        let Some((first, last)) = span else {
            return Ok(0);
        };

        self.scratch.clear();
        for value in &shadow[first..=last] {
            self.scratch.extend_from_slice(&value.to_be_bytes());
        }

        match panel.write_span(first as u16, last as u16, y, &self.scratch) {
            Ok(()) => {
                self.stale[usize::from(y)] = false;
                Ok(last - first + 1)
            }
            Err(e) => {
                // shadow already holds the new values; only a full resend is safe
                self.stale[usize::from(y)] = true;
                Err(e)
            }
        }
    }
}
