//! Raspberry Pi board: MCP3208 over SPI0 for analog channels, rppal GPIO for
//! outputs, and a DHT11 on one GPIO line.

use std::collections::HashMap;
use std::error::Error;

use airmon_traits::{AnalogInput, ClimateSample, ClimateSensor, DigitalOutput, Level};
use rppal::gpio::{Gpio, OutputPin};
use rppal::spi::{Bus, SlaveSelect};

use crate::dht11::Dht11;
use crate::error::{HwError, Result};
use crate::mcp3208::Mcp3208;

const SPI_CLOCK_HZ: u32 = 1_000_000;

pub struct PiBoard {
    adc: Mcp3208,
    gpio: Gpio,
    outputs: HashMap<u8, OutputPin>,
}

impl PiBoard {
    pub fn new() -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(format!("open gpio: {e}")))?;
        let adc = Mcp3208::new(Bus::Spi0, SlaveSelect::Ss0, SPI_CLOCK_HZ)?;
        Ok(Self {
            adc,
            gpio,
            outputs: HashMap::new(),
        })
    }

    /// Shared GPIO handle, for drivers that need their own pins.
    pub fn gpio(&self) -> &Gpio {
        &self.gpio
    }

    fn output(&mut self, pin: u8) -> Result<&mut OutputPin> {
        if !self.outputs.contains_key(&pin) {
            let out = self
                .gpio
                .get(pin)
                .map_err(|e| HwError::Gpio(format!("open output pin {pin}: {e}")))?
                .into_output();
            self.outputs.insert(pin, out);
        }
        self.outputs
            .get_mut(&pin)
            .ok_or_else(|| HwError::Gpio(format!("output pin {pin} unavailable")))
    }
}

impl AnalogInput for PiBoard {
    fn read_analog(&mut self, channel: u8) -> std::result::Result<u16, Box<dyn Error + Send + Sync>> {
        Ok(self.adc.read(channel)?)
    }
}

impl DigitalOutput for PiBoard {
    fn set_digital(
        &mut self,
        pin: u8,
        level: Level,
    ) -> std::result::Result<(), Box<dyn Error + Send + Sync>> {
        let out = self.output(pin)?;
        match level {
            Level::Low => out.set_low(),
            Level::High => out.set_high(),
        }
        Ok(())
    }
}

/// DHT11 with a short retry on timeouts/checksum errors.
pub struct HardwareClimate {
    dht: Dht11,
}

impl HardwareClimate {
    pub fn new(gpio: &Gpio, pin: u8) -> Result<Self> {
        Ok(Self {
            dht: Dht11::new(gpio, pin)?,
        })
    }
}

impl ClimateSensor for HardwareClimate {
    fn read_climate(&mut self) -> std::result::Result<ClimateSample, Box<dyn Error + Send + Sync>> {
        let mut attempts = 0;
        let max_attempts = 2;
        loop {
            match self.dht.read_frame() {
                Ok((temperature_c, humidity_pct)) => {
                    tracing::debug!(temperature_c, humidity_pct, "dht11 sample");
                    return Ok(ClimateSample {
                        temperature_c,
                        humidity_pct,
                    });
                }
                Err(HwError::Timeout | HwError::Checksum) if attempts < max_attempts => {
                    attempts += 1;
                    tracing::warn!(retries = attempts, "dht11 frame lost, retrying");
                    // DHT11 needs ~1 s between frames
                    std::thread::sleep(std::time::Duration::from_millis(1100));
                }
                Err(e) => {
                    tracing::error!("DHT11 read error: {}", e);
                    return Err(Box::new(e));
                }
            }
        }
    }
}
