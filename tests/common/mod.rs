//! Hardware doubles shared by the integration tests
#![allow(dead_code)]

use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use display_interface::DisplayError;
use ili9341fb::Transport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wire {
    Command(u8),
    Data(u8),
    Block(Vec<u8>),
}

/// Bus recorder; clones share one log so a test can keep a view on the
/// traffic after handing the transport to the device
#[derive(Debug, Clone, Default)]
pub struct Bus {
    log: Arc<Mutex<Vec<Wire>>>,
    broken: Arc<Mutex<bool>>,
}

impl Bus {
    pub fn take(&self) -> Vec<Wire> {
        std::mem::take(&mut *self.log.lock().unwrap())
    }

    pub fn set_broken(&self, broken: bool) {
        *self.broken.lock().unwrap() = broken;
    }

    fn push(&mut self, wire: Wire) -> Result<(), DisplayError> {
        if *self.broken.lock().unwrap() {
            return Err(DisplayError::BusWriteError);
        }
        self.log.lock().unwrap().push(wire);
        Ok(())
    }
}

impl Transport for Bus {
    fn send_command(&mut self, command: u8) -> Result<(), DisplayError> {
        self.push(Wire::Command(command))
    }

    fn send_byte(&mut self, value: u8) -> Result<(), DisplayError> {
        self.push(Wire::Data(value))
    }

    fn send_block(&mut self, block: &[u8]) -> Result<(), DisplayError> {
        self.push(Wire::Block(block.to_vec()))
    }
}

/// Split recorded traffic into (command, parameters) groups, blocks kept apart
pub fn commands(wires: &[Wire]) -> Vec<(u8, Vec<u8>)> {
    let mut out: Vec<(u8, Vec<u8>)> = Vec::new();
    for wire in wires {
        match wire {
            Wire::Command(c) => out.push((*c, Vec::new())),
            Wire::Data(d) => {
                if let Some((_, params)) = out.last_mut() {
                    params.push(*d);
                }
            }
            Wire::Block(_) => {}
        }
    }
    out
}

pub fn blocks(wires: &[Wire]) -> Vec<Vec<u8>> {
    wires
        .iter()
        .filter_map(|w| match w {
            Wire::Block(b) => Some(b.clone()),
            _ => None,
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct NullPin;

impl embedded_hal::digital::ErrorType for NullPin {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for NullPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct NoDelay;

impl embedded_hal::delay::DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// Async delay that finishes at once, remembering what was asked for
#[derive(Debug, Default)]
pub struct Elapsed {
    pub waits_us: Vec<u32>,
}

impl embedded_hal_async::delay::DelayNs for Elapsed {
    async fn delay_ns(&mut self, ns: u32) {
        self.waits_us.push(ns / 1_000);
    }

    async fn delay_us(&mut self, us: u32) {
        self.waits_us.push(us);
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
