//! Debounced flush scheduling
//!
//! Writers call [`UpdateScheduler::schedule`] after marking pages. The first
//! call arms a flush `debounce` from now; further calls while it is pending
//! do nothing. [`UpdateScheduler::schedule_now`] pulls a pending flush in to
//! run at once.
//!
//! The pending flag is cleared just before the worker collects dirty pages.
//! A mark made before that point is collected by this flush; a mark made
//! after it arms the next one.

use core::pin::pin;
use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embedded_hal_async::delay::DelayNs;
use futures::future::{select, Either};

pub struct UpdateScheduler {
    pending: AtomicBool,
    request: Signal<CriticalSectionRawMutex, Duration>,
    debounce: Duration,
}

impl UpdateScheduler {
    pub const fn new(debounce: Duration) -> Self {
        UpdateScheduler {
            pending: AtomicBool::new(false),
            request: Signal::new(),
            debounce,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Arm a flush after the debounce delay unless one is already pending.
    /// Returns whether this call armed it.
    pub fn schedule(&self) -> bool {
        if self.pending.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.request.signal(self.debounce);
        true
    }

    /// Run the pending flush, or a new one, without waiting
    pub fn schedule_now(&self) {
        self.pending.store(true, Ordering::Release);
        self.request.signal(Duration::ZERO);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// A request is waiting to be picked up by [`Self::wait_due`]
    pub fn has_request(&self) -> bool {
        self.request.signaled()
    }

    /// Wait until a scheduled flush is due, then clear the pending flag
    pub async fn wait_due<D: DelayNs>(&self, delay: &mut D) {
        let mut due_in = self.request.wait().await;

        while !due_in.is_zero() {
            let sleep = pin!(delay.delay_us(as_micros(due_in)));
            let expedite = pin!(self.request.wait());
            match select(sleep, expedite).await {
                Either::Left(_) => break,
                Either::Right((next, _)) => due_in = next,
            }
        }

        self.pending.store(false, Ordering::Release);
    }
}

fn as_micros(duration: Duration) -> u32 {
    u32::try_from(duration.as_micros()).unwrap_or(u32::MAX)
}
