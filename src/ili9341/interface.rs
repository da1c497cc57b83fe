//! Display interface using SPI
use display_interface::DisplayError;
use embedded_hal::{digital::OutputPin, spi::SpiDevice};

/// Byte-level link to the panel.
///
/// Every call sets the data/command line before it writes: low for a command,
/// high for data. Nothing is buffered, so each call is one bus transaction.
pub trait Transport {
    /// Send a single command octet.
    fn send_command(&mut self, command: u8) -> Result<(), DisplayError>;

    /// Send a single data octet.
    fn send_byte(&mut self, value: u8) -> Result<(), DisplayError>;

    /// Send a block of data octets as one contiguous transaction.
    fn send_block(&mut self, block: &[u8]) -> Result<(), DisplayError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send_command(&mut self, command: u8) -> Result<(), DisplayError> {
        (**self).send_command(command)
    }

    fn send_byte(&mut self, value: u8) -> Result<(), DisplayError> {
        (**self).send_byte(value)
    }

    fn send_block(&mut self, block: &[u8]) -> Result<(), DisplayError> {
        (**self).send_block(block)
    }
}

/// SPI connection to an ILI9341 (mode 0, data/command on a separate GPIO)
pub struct DisplayInterface<SPI, DC> {
    /// SPI device
    spi: SPI,
    /// Data/Command Control Pin (High for data, Low for command)
    dc: DC,
}

impl<SPI, DC> DisplayInterface<SPI, DC> {
    /// Create the interface; no bus traffic happens here
    pub fn new(spi: SPI, dc: DC) -> Self {
        DisplayInterface { spi, dc }
    }

    /// Give back the SPI device and the data/command pin
    pub fn release(self) -> (SPI, DC) {
        (self.spi, self.dc)
    }
}

impl<SPI, DC> Transport for DisplayInterface<SPI, DC>
where
    SPI: SpiDevice,
    DC: OutputPin,
{
    fn send_command(&mut self, command: u8) -> Result<(), DisplayError> {
        // low for commands
        self.dc.set_low().map_err(|_| DisplayError::DCError)?;

        match self.spi.write(&[command]) {
            Ok(_) => Ok(()),
            Err(e) => {
                log::error!("SPI write error for command 0x{:02X}: {:?}", command, e);
                Err(DisplayError::BusWriteError)
            }
        }
    }

    fn send_byte(&mut self, value: u8) -> Result<(), DisplayError> {
        // high for data
        self.dc.set_high().map_err(|_| DisplayError::DCError)?;
        self.spi
            .write(&[value])
            .map_err(|_| DisplayError::BusWriteError)
    }

    fn send_block(&mut self, block: &[u8]) -> Result<(), DisplayError> {
        if block.is_empty() {
            return Ok(());
        }

        self.dc.set_high().map_err(|_| DisplayError::DCError)?;
        match self.spi.write(block) {
            Ok(_) => Ok(()),
            Err(e) => {
                log::error!("SPI write error for {} byte block: {:?}", block.len(), e);
                Err(DisplayError::BusWriteError)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

    #[test]
    fn command_pulls_dc_low_then_writes() {
        let spi_expectations = [
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0x2Au8]),
            SpiTransaction::transaction_end(),
        ];
        let dc_expectations = [PinTransaction::set(PinState::Low)];

        let mut interface =
            DisplayInterface::new(SpiMock::new(&spi_expectations), PinMock::new(&dc_expectations));
        interface.send_command(0x2A).unwrap();

        let (mut spi, mut dc) = interface.release();
        spi.done();
        dc.done();
    }

    #[test]
    fn block_is_one_transaction_with_dc_high() {
        let payload: Vec<u8> = vec![0x12, 0x34, 0x56, 0x78, 0x9A];
        let spi_expectations = [
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0xABu8]),
            SpiTransaction::transaction_end(),
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(payload.clone()),
            SpiTransaction::transaction_end(),
        ];
        let dc_expectations = [
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::High),
        ];

        let mut interface =
            DisplayInterface::new(SpiMock::new(&spi_expectations), PinMock::new(&dc_expectations));
        interface.send_byte(0xAB).unwrap();
        interface.send_block(&payload).unwrap();

        let (mut spi, mut dc) = interface.release();
        spi.done();
        dc.done();
    }

    #[test]
    fn empty_block_touches_nothing() {
        let mut interface = DisplayInterface::new(SpiMock::<u8>::new(&[]), PinMock::new(&[]));
        interface.send_block(&[]).unwrap();

        let (mut spi, mut dc) = interface.release();
        spi.done();
        dc.done();
    }
}
