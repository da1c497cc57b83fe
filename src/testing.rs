//! Hardware doubles for unit tests

use core::convert::Infallible;

use display_interface::DisplayError;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

use crate::ili9341::interface::Transport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    Command(u8),
    Data(u8),
    Block(Vec<u8>),
}

/// Transport that records every call; fails every call after `fail_after`
/// successful ones when set
#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub events: Vec<BusEvent>,
    pub fail_after: Option<usize>,
    calls: usize,
}

impl RecordingTransport {
    fn record(&mut self, event: BusEvent) -> Result<(), DisplayError> {
        if let Some(limit) = self.fail_after {
            if self.calls >= limit {
                return Err(DisplayError::BusWriteError);
            }
        }
        self.calls += 1;
        self.events.push(event);
        Ok(())
    }

    /// Commands only, in order
    pub fn commands(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                BusEvent::Command(c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    /// Payload sizes of the block transfers, in order
    pub fn block_lengths(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|e| match e {
                BusEvent::Block(b) => Some(b.len()),
                _ => None,
            })
            .collect()
    }
}

impl Transport for RecordingTransport {
    fn send_command(&mut self, command: u8) -> Result<(), DisplayError> {
        self.record(BusEvent::Command(command))
    }

    fn send_byte(&mut self, value: u8) -> Result<(), DisplayError> {
        self.record(BusEvent::Data(value))
    }

    fn send_block(&mut self, block: &[u8]) -> Result<(), DisplayError> {
        self.record(BusEvent::Block(block.to_vec()))
    }
}

#[derive(Debug, Default)]
pub struct FakePin {
    pub levels: Vec<bool>,
}

impl ErrorType for FakePin {
    type Error = Infallible;
}

impl OutputPin for FakePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.push(true);
        Ok(())
    }
}

/// Blocking delay that returns at once and remembers millisecond requests
#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub millis: Vec<u32>,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.millis.push(ms);
    }
}

/// Async delay that completes immediately, recording microsecond requests
#[derive(Debug, Default)]
pub struct InstantDelay {
    pub micros: Vec<u32>,
}

impl embedded_hal_async::delay::DelayNs for InstantDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.micros.push(ns / 1_000);
    }

    async fn delay_us(&mut self, us: u32) {
        self.micros.push(us);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.micros.push(ms.saturating_mul(1_000));
    }
}
