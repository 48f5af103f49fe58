use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use tracing::trace;

use crate::error::{HwError, Result};

/// MCP3208 12-bit, 8-channel SPI ADC (0..=4095 full scale).
pub struct Mcp3208 {
    spi: Spi,
}

impl Mcp3208 {
    pub const MAX_CODE: u16 = 4095;

    pub fn new(bus: Bus, slave: SlaveSelect, clock_hz: u32) -> Result<Self> {
        let spi = Spi::new(bus, slave, clock_hz, Mode::Mode0)
            .map_err(|e| HwError::Spi(format!("open spi: {e}")))?;
        Ok(Self { spi })
    }

    /// Single-ended conversion on `channel` (0..=7).
    pub fn read(&mut self, channel: u8) -> Result<u16> {
        if channel > 7 {
            return Err(HwError::Channel(channel));
        }
        // start bit, single-ended, channel bits D2..D0 straddling the first two bytes
        let tx = [0x06 | (channel >> 2), (channel & 0x03) << 6, 0x00];
        let mut rx = [0u8; 3];
        self.spi
            .transfer(&mut rx, &tx)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        let raw = (u16::from(rx[1] & 0x0F) << 8) | u16::from(rx[2]);
        trace!(channel, raw, "mcp3208 raw read");
        Ok(raw)
    }
}
