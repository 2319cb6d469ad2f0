//! MCP3008 (ADC 10 bits, 8 canais) via `embedded-hal` SPI.
//!
//! Usado só para o potenciômetro de volume do aviso sonoro.

use embedded_hal::spi::SpiDevice;
use thermowatch_core::alerts::{AnalogError, AnalogInput};

pub struct Mcp3008<S> {
    spi: S,
    channel: u8,
}

impl<S: SpiDevice> Mcp3008<S> {
    pub fn new(spi: S, channel: u8) -> Self {
        Self {
            spi,
            channel: channel & 0x07,
        }
    }
}

impl<S: SpiDevice> AnalogInput for Mcp3008<S> {
    fn read(&mut self) -> Result<u16, AnalogError> {
        // Start bit, modo single-ended + canal, byte de clock
        let mut frame = [0x01, (0x08 | self.channel) << 4, 0x00];
        self.spi
            .transfer_in_place(&mut frame)
            .map_err(|e| AnalogError(format!("SPI: {e:?}")))?;
        Ok((((frame[1] & 0x03) as u16) << 8) | frame[2] as u16)
    }
}
