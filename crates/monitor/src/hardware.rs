//! Abertura dos barramentos I2C/SPI do Linux (Raspberry Pi).

use crate::adc::Mcp3008;
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::{I2cdev, SpidevDevice};
use thermowatch_core::config::{AdcConfig, RtcConfig};
use thermowatch_core::rtc::Ds3231;
use tracing::info;

const MCP3008_SPI_HZ: u32 = 1_350_000;

/// Abre o RTC no barramento configurado.
pub fn open_rtc(config: &RtcConfig) -> Result<Ds3231<I2cdev>, String> {
    let i2c = I2cdev::new(&config.i2c_bus).map_err(|e| format!("{}: {e}", config.i2c_bus))?;
    info!("RTC em {} (0x{:02X})", config.i2c_bus, config.address);
    Ok(Ds3231::new(i2c, config.address))
}

/// Abre o MCP3008 no dispositivo SPI configurado.
pub fn open_adc(config: &AdcConfig) -> Result<Mcp3008<SpidevDevice>, String> {
    let mut spi =
        SpidevDevice::open(&config.spi_device).map_err(|e| format!("{}: {e:?}", config.spi_device))?;
    let options = SpidevOptions::new()
        .bits_per_word(8)
        .max_speed_hz(MCP3008_SPI_HZ)
        .mode(SpiModeFlags::SPI_MODE_0)
        .build();
    spi.0
        .configure(&options)
        .map_err(|e| format!("{}: {e}", config.spi_device))?;
    info!("ADC em {} (canal {})", config.spi_device, config.channel);
    Ok(Mcp3008::new(spi, config.channel))
}
