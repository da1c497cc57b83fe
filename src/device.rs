//! Device context: attach, the flush worker and the host handle
//!
//! [`attach`] brings a panel up and splits the device in two:
//!
//! - [`FbHandle`], cheap to clone, given to every writer. Writers mutate the
//!   framebuffer, mark pages and schedule flushes. They never touch the bus.
//! - [`FlushWorker`], owning the panel controller and the shadow. It is the
//!   only place bus traffic happens after attach.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs as AsyncDelayNs;

use crate::config::Config;
use crate::diff::{DiffEngine, FlushReport};
use crate::error::{Error, Result};
use crate::fbdev::types::BlankMode;
use crate::framebuffer::{Framebuffer, Rect};
use crate::ili9341::driver::{Ili9341, PanelTimings};
use crate::ili9341::interface::Transport;
use crate::pages::{DirtyTracker, PageTable};
use crate::scheduler::UpdateScheduler;

/// Number of pseudo-palette registers
pub const PALETTE_SIZE: usize = 16;

/// Panel power change for the worker to carry out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum PowerRequest {
    None = 0,
    On = 1,
    Off = 2,
    Suspend = 3,
    Resume = 4,
}

impl PowerRequest {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => PowerRequest::On,
            2 => PowerRequest::Off,
            3 => PowerRequest::Suspend,
            4 => PowerRequest::Resume,
            _ => PowerRequest::None,
        }
    }
}

/// State shared between writers and the worker
pub(crate) struct Shared {
    pub(crate) config: Config,
    pub(crate) fb: Framebuffer,
    pub(crate) dirty: DirtyTracker,
    pub(crate) scheduler: UpdateScheduler,
    pub(crate) palette: [AtomicU32; PALETTE_SIZE],
    pub(crate) grayscale: AtomicBool,
    pub(crate) blank: AtomicU8,
    power: AtomicU8,
}

impl Shared {
    /// Mark the scanlines of `rect` and arm a flush
    pub(crate) fn touch(&self, rect: Rect) {
        if self.dirty.mark_rect(rect) > 0 {
            self.scheduler.schedule();
        }
    }

    /// Mark every page and flush without waiting
    pub(crate) fn touch_all_now(&self) {
        self.dirty.mark_all();
        self.scheduler.schedule_now();
    }

    /// Queue a power change; a later request replaces an earlier one
    pub(crate) fn request_power(&self, request: PowerRequest) {
        self.power.store(request as u8, Ordering::Release);
    }

    fn take_power_request(&self) -> PowerRequest {
        PowerRequest::from_u8(self.power.swap(PowerRequest::None as u8, Ordering::AcqRel))
    }
}

/// Writer side of an attached device
#[derive(Clone)]
pub struct FbHandle {
    pub(crate) shared: Arc<Shared>,
}

impl FbHandle {
    pub fn width(&self) -> u16 {
        self.shared.fb.width()
    }

    pub fn height(&self) -> u16 {
        self.shared.fb.height()
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    /// Size of the framebuffer in bytes
    pub fn size_bytes(&self) -> usize {
        self.shared.fb.size_bytes()
    }

    pub fn pixel(&self, x: u16, y: u16) -> Option<u16> {
        self.shared.fb.get(x, y)
    }

    /// Set one RGB565 pixel and schedule its flush
    pub fn set_pixel(&self, x: u16, y: u16, value: u16) {
        if self.shared.fb.set(x, y, value) {
            self.shared.touch(Rect::new(x, y, 1, 1));
        }
    }

    /// Mark a region changed by some other path and schedule a flush
    pub fn mark_dirty(&self, rect: Rect) {
        self.shared.touch(rect);
    }

    /// Mark every page and flush as soon as the worker can
    pub fn refresh(&self) {
        self.shared.touch_all_now();
    }

    /// A flush is armed and has not started yet
    pub fn flush_pending(&self) -> bool {
        self.shared.scheduler.is_pending()
    }

    pub fn current_blank(&self) -> BlankMode {
        BlankMode::from_u8(self.shared.blank.load(Ordering::Acquire))
    }
}

/// Owns the panel and the shadow; runs every flush
pub struct FlushWorker<T, RST, DELAY> {
    panel: Ili9341<T, RST, DELAY>,
    diff: DiffEngine,
    shared: Arc<Shared>,
}

impl<T, RST, DELAY> FlushWorker<T, RST, DELAY>
where
    T: Transport,
    RST: OutputPin,
    DELAY: DelayNs,
{
    /// Another writer handle for this device
    pub fn handle(&self) -> FbHandle {
        FbHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn panel(&self) -> &Ili9341<T, RST, DELAY> {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut Ili9341<T, RST, DELAY> {
        &mut self.panel
    }

    /// Apply a queued power change, then send every dirty page
    pub fn flush(&mut self) -> FlushReport {
        self.apply_power();

        let mut report = FlushReport::default();
        let dirty = self.shared.dirty.collect_and_clear();
        let mut failed = false;

        for index in dirty {
            let Some(page) = self.shared.dirty.table().get(index).copied() else {
                continue;
            };
            if self
                .diff
                .flush_page(&mut self.panel, &self.shared.fb, &page, &mut report)
                .is_err()
            {
                self.shared.dirty.mark_page(index);
                failed = true;
            }
        }

        if failed {
            log::warn!("{} transfers failed, retrying on the next flush", report.errors);
            self.shared.scheduler.schedule();
        }
        if !report.is_idle() {
            log::debug!(
                "Flushed {} pages: {} scanlines, {} pixels",
                report.pages,
                report.lines,
                report.pixels
            );
        }
        report
    }

    /// Send one page right now, outside the schedule.
    ///
    /// The page's dirty flag is left as it is. On a transfer failure the page
    /// is marked dirty again, a retry is armed and the error is returned.
    pub fn flush_page(&mut self, index: usize) -> Result<FlushReport> {
        let mut report = FlushReport::default();
        let Some(page) = self.shared.dirty.table().get(index).copied() else {
            return Ok(report);
        };

        if let Err(e) = self
            .diff
            .flush_page(&mut self.panel, &self.shared.fb, &page, &mut report)
        {
            self.shared.dirty.mark_page(index);
            self.shared.scheduler.schedule();
            return Err(e.into());
        }
        Ok(report)
    }

    /// Wait for a scheduled flush to fall due, then run it
    pub async fn step<D: AsyncDelayNs>(&mut self, delay: &mut D) -> FlushReport {
        self.shared.scheduler.wait_due(delay).await;
        self.flush()
    }

    /// Flush forever; meant to be the body of the worker task
    pub async fn run<D: AsyncDelayNs>(mut self, mut delay: D) -> ! {
        log::info!("Flush worker running");
        loop {
            self.step(&mut delay).await;
        }
    }

    /// Tear down; buffers go with the last handle, the hardware comes back
    pub fn detach(self) -> (T, RST, DELAY) {
        log::info!("Detaching panel");
        self.panel.release()
    }

    fn apply_power(&mut self) {
        let request = self.shared.take_power_request();
        let result = match request {
            PowerRequest::None => return,
            PowerRequest::On | PowerRequest::Resume => {
                log::info!("Panel power on ({:?})", request);
                self.panel.power_on()
            }
            PowerRequest::Off => {
                log::info!("Panel power off");
                self.panel.power_off()
            }
            PowerRequest::Suspend => {
                log::info!("Panel suspend");
                let result = self.panel.power_off();
                if self.shared.config.deep_suspend {
                    self.panel.mark_uninitialized();
                    self.diff.invalidate();
                }
                result
            }
        };
        if let Err(e) = result {
            log::warn!("Power change {:?} failed: {:?}", request, e);
        }
    }
}

/// Bring up a panel and return the writer handle and the flush worker.
///
/// Allocates the framebuffer, page table and shadow, resets and initialises
/// the panel, then sends the whole (black) frame. Any failure drops what was
/// built so far and returns the error.
pub fn attach<T, RST, DELAY>(
    config: Config,
    transport: T,
    rst: RST,
    delay: DELAY,
) -> Result<(FbHandle, FlushWorker<T, RST, DELAY>)>
where
    T: Transport,
    RST: OutputPin,
    DELAY: DelayNs,
{
    config.validate()?;
    log::info!(
        "Attaching {}x{} panel, {} byte pages, {:?} debounce",
        config.width,
        config.height,
        config.page_size,
        config.debounce
    );

    let fb = Framebuffer::new(config.width, config.height)?;
    let table = PageTable::build(fb.size_bytes(), config.format, config.width, config.page_size)?;
    let dirty = DirtyTracker::new(table)?;
    let diff = DiffEngine::new(config.width, config.height)?;

    let timings = PanelTimings {
        reset: config.reset,
        sleep_out_ms: config.sleep_out_ms,
        orientation: config.orientation,
    };
    let mut panel = Ili9341::new(transport, rst, delay, timings);
    if let Err(e) = panel.init_chip() {
        log::error!("Panel initialization failed: {:?}", e);
        return Err(Error::Initialization(e));
    }

    let shared = Arc::new(Shared {
        scheduler: UpdateScheduler::new(config.debounce),
        config,
        fb,
        dirty,
        palette: core::array::from_fn(|_| AtomicU32::new(0)),
        grayscale: AtomicBool::new(false),
        blank: AtomicU8::new(BlankMode::Unblank as u8),
        power: AtomicU8::new(PowerRequest::None as u8),
    });

    let mut worker = FlushWorker {
        panel,
        diff,
        shared,
    };
    worker.shared.dirty.mark_all();
    let report = worker.flush();
    log::info!(
        "Panel attached, first frame {} scanlines ({} errors)",
        report.lines,
        report.errors
    );

    Ok((worker.handle(), worker))
}
