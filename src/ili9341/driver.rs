//! ILI9341 Panel Controller
//!
//! Register-level command sequences for the ILI9341: hardware reset, the
//! vendor initialisation table, address windows, orientation and display
//! power. Everything here is blocking and runs on whichever context owns the
//! driver; in this crate that is the flush worker, or the attach path before
//! the worker exists.
//!
//! ## Addressing
//!
//! Pixel data always goes through an address window: `COLUMN_ADDRESS_SET`
//! and `PAGE_ADDRESS_SET` take inclusive start/end coordinates as big-endian
//! 16-bit values, then `MEMORY_WRITE` opens the window for data. The window
//! is re-issued for every transfer; nothing is assumed about what the panel
//! had before.

use display_interface::DisplayError;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::ResetTimings;
use crate::ili9341::init_seq::INIT_SEQUENCE;
use crate::ili9341::interface::Transport;
use crate::ili9341::{cmd::Cmd, flag};

/// Panel-specific timings and the orientation applied after sleep-out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelTimings {
    /// Reset line timings
    pub reset: ResetTimings,
    /// Mandatory settle time after `SLEEP_OUT`
    pub sleep_out_ms: u32,
    /// Orientation flags from [`Flag`](crate::ili9341::flag::Flag)
    pub orientation: u8,
}

/// ILI9341 Display Driver
///
/// ## Type Parameters
///
/// - `T` - byte transport (usually [`DisplayInterface`](crate::ili9341::interface::DisplayInterface))
/// - `RST` - Reset output pin
/// - `DELAY` - Delay provider for timing
pub struct Ili9341<T, RST, DELAY> {
    /// The display transport
    pub interface: T,
    rst: RST,
    delay: DELAY,
    timings: PanelTimings,
    initialized: bool,
}

impl<T, RST, DELAY> Ili9341<T, RST, DELAY>
where
    T: Transport,
    RST: OutputPin,
    DELAY: DelayNs,
{
    /// Wrap the hardware; the panel is not touched until [`Self::init_chip`]
    pub fn new(interface: T, rst: RST, delay: DELAY, timings: PanelTimings) -> Self {
        Ili9341 {
            interface,
            rst,
            delay,
            timings,
            initialized: false,
        }
    }

    /// Whether the init sequence has completed since creation or the last
    /// [`Self::mark_uninitialized`]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Forget that the panel was configured, so the next power-on runs the
    /// whole init sequence again (deep power-down loses register state)
    pub fn mark_uninitialized(&mut self) {
        self.initialized = false;
    }

    /// Drive the reset line high, low, high with the configured delays
    pub fn reset(&mut self) -> Result<(), DisplayError> {
        let ResetTimings {
            hold_ms,
            trigger_ms,
            settle_ms,
        } = self.timings.reset;

        self.rst.set_high().map_err(|_| DisplayError::RSError)?;
        self.delay.delay_ms(hold_ms);
        self.rst.set_low().map_err(|_| DisplayError::RSError)?;
        self.delay.delay_ms(trigger_ms);
        self.rst.set_high().map_err(|_| DisplayError::RSError)?;
        self.delay.delay_ms(settle_ms);
        Ok(())
    }

    /// Basic function for sending a command and the parameter bytes belonging to it
    pub fn command(&mut self, command: u8, params: &[u8]) -> Result<(), DisplayError> {
        self.interface.send_command(command)?;
        for &param in params {
            self.interface.send_byte(param)?;
        }
        Ok(())
    }

    /// Set the inclusive address window and open it for `MEMORY_WRITE`
    pub fn set_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<(), DisplayError> {
        let [x0_hi, x0_lo] = x0.to_be_bytes();
        let [x1_hi, x1_lo] = x1.to_be_bytes();
        self.command(Cmd::COLUMN_ADDRESS_SET, &[x0_hi, x0_lo, x1_hi, x1_lo])?;

        let [y0_hi, y0_lo] = y0.to_be_bytes();
        let [y1_hi, y1_lo] = y1.to_be_bytes();
        self.command(Cmd::PAGE_ADDRESS_SET, &[y0_hi, y0_lo, y1_hi, y1_lo])?;

        self.interface.send_command(Cmd::MEMORY_WRITE)
    }

    /// Stream pixel bytes into the window opened by [`Self::set_window`]
    pub fn write_pixels(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.interface.send_block(bytes)
    }

    /// Write one horizontal span `[x0, x1]` of scanline `y`
    pub fn write_span(&mut self, x0: u16, x1: u16, y: u16, bytes: &[u8]) -> Result<(), DisplayError> {
        self.set_window(x0, y, x1, y)?;
        self.write_pixels(bytes)
    }

    /// Compose the memory access control byte from orientation flags and send it
    pub fn set_orientation(&mut self, flags: u8) -> Result<(), DisplayError> {
        let madctl = flag::madctl_for(flags);
        log::debug!("Orientation flags 0x{:02X} -> MADCTL 0x{:02X}", flags, madctl);
        self.command(Cmd::MEMORY_ACCESS_CONTROL, &[madctl])
    }

    /// Reset the panel and run the vendor init sequence through display-on
    pub fn init_chip(&mut self) -> Result<(), DisplayError> {
        log::info!("Initializing ILI9341 ({} register writes)", INIT_SEQUENCE.len());

        self.reset()?;

        for &(register, payload) in INIT_SEQUENCE {
            self.command(register, payload)?;
        }

        self.interface.send_command(Cmd::SLEEP_OUT)?;
        self.delay.delay_ms(self.timings.sleep_out_ms);

        self.set_orientation(self.timings.orientation)?;
        self.interface.send_command(Cmd::DISPLAY_ON)?;

        self.initialized = true;
        log::info!("ILI9341 initialized");
        Ok(())
    }

    /// Turn the display on, running the init sequence first if needed
    pub fn power_on(&mut self) -> Result<(), DisplayError> {
        if !self.initialized {
            self.init_chip()?;
        }
        self.interface.send_command(Cmd::DISPLAY_ON)
    }

    /// Turn the display off; RAM and registers are kept
    pub fn power_off(&mut self) -> Result<(), DisplayError> {
        self.interface.send_command(Cmd::DISPLAY_OFF)
    }

    /// Give back the transport, reset pin and delay
    pub fn release(self) -> (T, RST, DELAY) {
        (self.interface, self.rst, self.delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ili9341::flag::Flag;
    use crate::testing::{BusEvent, FakePin, RecordingDelay, RecordingTransport};

    fn timings() -> PanelTimings {
        PanelTimings {
            reset: ResetTimings {
                hold_ms: 50,
                trigger_ms: 50,
                settle_ms: 100,
            },
            sleep_out_ms: 120,
            orientation: Flag::SWITCH_XY | Flag::FLIP_X,
        }
    }

    fn panel() -> Ili9341<RecordingTransport, FakePin, RecordingDelay> {
        Ili9341::new(
            RecordingTransport::default(),
            FakePin::default(),
            RecordingDelay::default(),
            timings(),
        )
    }

    #[test]
    fn reset_toggles_line_with_configured_delays() {
        let mut panel = Ili9341::new(
            RecordingTransport::default(),
            FakePin::default(),
            RecordingDelay::default(),
            PanelTimings {
                reset: ResetTimings {
                    hold_ms: 5,
                    trigger_ms: 10,
                    settle_ms: 20,
                },
                ..timings()
            },
        );
        panel.reset().unwrap();

        let (transport, rst, delay) = panel.release();
        assert_eq!(rst.levels, vec![true, false, true]);
        assert_eq!(delay.millis, vec![5, 10, 20]);
        assert!(transport.events.is_empty());
    }

    #[test]
    fn window_is_big_endian_and_inclusive() {
        let mut panel = panel();
        panel.set_window(12, 300, 47, 301).unwrap();

        assert_eq!(
            panel.interface.events,
            vec![
                BusEvent::Command(Cmd::COLUMN_ADDRESS_SET),
                BusEvent::Data(0x00),
                BusEvent::Data(12),
                BusEvent::Data(0x00),
                BusEvent::Data(47),
                BusEvent::Command(Cmd::PAGE_ADDRESS_SET),
                BusEvent::Data(0x01),
                BusEvent::Data(0x2C),
                BusEvent::Data(0x01),
                BusEvent::Data(0x2D),
                BusEvent::Command(Cmd::MEMORY_WRITE),
            ]
        );
    }

    #[test]
    fn init_sends_table_then_sleep_out_and_display_on() {
        let mut panel = panel();
        panel.init_chip().unwrap();
        assert!(panel.is_initialized());

        let mut expected = Vec::new();
        for &(register, payload) in INIT_SEQUENCE {
            expected.push(BusEvent::Command(register));
            expected.extend(payload.iter().map(|&b| BusEvent::Data(b)));
        }
        expected.push(BusEvent::Command(Cmd::SLEEP_OUT));
        expected.push(BusEvent::Command(Cmd::MEMORY_ACCESS_CONTROL));
        expected.push(BusEvent::Data(0x28));
        expected.push(BusEvent::Command(Cmd::DISPLAY_ON));

        let (transport, _, delay) = panel.release();
        assert_eq!(transport.events, expected);
        assert_eq!(delay.millis, vec![50, 50, 100, 120]);
    }

    #[test]
    fn power_on_initializes_lazily_once() {
        let mut panel = panel();
        panel.power_on().unwrap();
        let first = panel.interface.events.len();
        assert!(first > 1);

        panel.interface.events.clear();
        panel.power_on().unwrap();
        assert_eq!(panel.interface.events, vec![BusEvent::Command(Cmd::DISPLAY_ON)]);

        panel.power_off().unwrap();
        assert_eq!(
            panel.interface.events.last(),
            Some(&BusEvent::Command(Cmd::DISPLAY_OFF))
        );
    }

    #[test]
    fn failed_init_leaves_panel_uninitialized() {
        let mut panel = panel();
        panel.interface.fail_after = Some(3);
        assert!(matches!(panel.init_chip(), Err(DisplayError::BusWriteError)));
        assert!(!panel.is_initialized());
    }
}
