//! Page table and dirty tracking
//!
//! The framebuffer is cut into fixed-size byte pages in raster order, the
//! same way a memory mapping sees it. A page rarely lines up with scanlines:
//! at 320 pixels wide a 4096 byte page holds 2048 pixels, six full rows and
//! a part of a seventh. Each page therefore records where its first pixel
//! sits and which scanlines it touches.
//!
//! Dirty flags are marked from any writer and collected by the flush worker.
//! Marking and collecting share one critical section so a mark arriving
//! while a flush collects is either collected or left set, never dropped.

use core::cell::RefCell;
use core::ops::RangeInclusive;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::error::{Error, Result};
use crate::framebuffer::{PixelFormat, Rect};

/// One page of the framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Column of the first pixel
    pub x: u16,
    /// Scanline of the first pixel
    pub y: u16,
    /// Pixel offset into the framebuffer and the shadow
    pub offset: usize,
    /// Pixels in this page; the last page may be short
    pub len: usize,
    first_row: u16,
    last_row: u16,
}

impl Page {
    /// Scanlines this page touches, inclusive
    pub fn rows(&self) -> RangeInclusive<u16> {
        self.first_row..=self.last_row
    }

    fn intersects(&self, first: u16, last: u16) -> bool {
        self.first_row <= last && first <= self.last_row
    }
}

/// Immutable page layout, built once per device
#[derive(Debug)]
pub struct PageTable {
    pages: Vec<Page>,
    page_size: usize,
    frame_size: usize,
    width: u16,
    height: u16,
}

impl PageTable {
    /// Partition `frame_size` bytes into `page_size` byte pages
    pub fn build(
        frame_size: usize,
        format: PixelFormat,
        width: u16,
        page_size: usize,
    ) -> Result<Self> {
        let bpp = format.bytes_per_pixel();
        if width == 0 || page_size < bpp || frame_size == 0 {
            return Err(Error::Config("page table needs a non-empty frame"));
        }

        let total = frame_size / bpp;
        let height = u16::try_from(total / usize::from(width))
            .map_err(|_| Error::Config("frame taller than the panel can address"))?;
        let count = frame_size.div_ceil(page_size);
        let per_page = page_size / bpp;

        let mut pages = Vec::new();
        pages
            .try_reserve_exact(count)
            .map_err(|_| Error::Allocation { what: "page table" })?;

        let w = usize::from(width);
        let x_step = per_page % w;
        let y_step = per_page / w;
        let (mut x, mut y) = (0usize, 0usize);
        let last_line = usize::from(height.saturating_sub(1));

        for index in 0..count {
            let offset = index * per_page;
            let len = per_page.min(total - offset);
            let last = ((offset + len - 1) / w).min(last_line);

            pages.push(Page {
                x: x as u16,
                y: y as u16,
                offset,
                len,
                first_row: y.min(last_line) as u16,
                last_row: last as u16,
            });

            x += x_step;
            if x >= w {
                y += 1;
                x -= w;
            }
            y += y_step;
        }

        log::info!(
            "Page table: {} pages of {} bytes ({} pixels), last page {} pixels",
            count,
            page_size,
            per_page,
            pages.last().map_or(0, |p| p.len)
        );

        Ok(PageTable {
            pages,
            page_size,
            frame_size: total * bpp,
            width,
            height,
        })
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Page holding the byte at `offset`, `None` past the end of the frame
    pub fn page_of_byte(&self, offset: usize) -> Option<usize> {
        (offset < self.frame_size).then(|| offset / self.page_size)
    }
}

/// Page table plus one dirty flag per page
pub struct DirtyTracker {
    table: PageTable,
    flags: Mutex<CriticalSectionRawMutex, RefCell<Vec<bool>>>,
}

impl DirtyTracker {
    pub fn new(table: PageTable) -> Result<Self> {
        let mut flags = Vec::new();
        flags
            .try_reserve_exact(table.len())
            .map_err(|_| Error::Allocation { what: "dirty map" })?;
        flags.resize(table.len(), false);

        Ok(DirtyTracker {
            table,
            flags: Mutex::new(RefCell::new(flags)),
        })
    }

    pub fn table(&self) -> &PageTable {
        &self.table
    }

    /// Mark every page touching the scanlines of `rect`; horizontal extent
    /// is ignored. Returns the number of pages marked.
    pub fn mark_rect(&self, rect: Rect) -> usize {
        match rect.rows() {
            Some(rows) => self.mark_rows(*rows.start(), *rows.end()),
            None => 0,
        }
    }

    /// Mark every page touching scanlines `first..=last`
    pub fn mark_rows(&self, first: u16, last: u16) -> usize {
        self.flags.lock(|flags| {
            let mut flags = flags.borrow_mut();
            let mut marked = 0;
            for (page, flag) in self.table.pages.iter().zip(flags.iter_mut()) {
                if page.intersects(first, last) {
                    *flag = true;
                    marked += 1;
                }
            }
            marked
        })
    }

    pub fn mark_page(&self, index: usize) {
        self.flags.lock(|flags| {
            if let Some(flag) = flags.borrow_mut().get_mut(index) {
                *flag = true;
            }
        });
    }

    pub fn mark_all(&self) {
        self.flags.lock(|flags| flags.borrow_mut().fill(true));
    }

    /// Take the dirty page indices in ascending order and clear them, in one step
    pub fn collect_and_clear(&self) -> Vec<usize> {
        self.flags.lock(|flags| {
            let mut flags = flags.borrow_mut();
            let dirty: Vec<usize> = flags
                .iter()
                .enumerate()
                .filter_map(|(i, &d)| d.then_some(i))
                .collect();
            for &i in &dirty {
                flags[i] = false;
            }
            dirty
        })
    }

    pub fn is_dirty(&self, index: usize) -> bool {
        self.flags
            .lock(|flags| flags.borrow().get(index).copied().unwrap_or(false))
    }

    pub fn any_dirty(&self) -> bool {
        self.flags.lock(|flags| flags.borrow().iter().any(|&d| d))
    }
}
