use std::time::Duration;

use rppal::gpio::{Gpio, IoPin, Mode};
use tracing::trace;

use crate::error::{HwError, Result};
use crate::util::wait_while_with_timeout;

/// Longest any single DHT11 pulse may last before the frame is abandoned.
const PULSE_TIMEOUT: Duration = Duration::from_micros(200);
/// High pulses longer than this encode a 1 bit (0 ≈ 27 µs, 1 ≈ 70 µs).
const ONE_THRESHOLD: Duration = Duration::from_micros(48);

/// Bit-banged DHT11 on a single bidirectional GPIO line.
pub struct Dht11 {
    pin: IoPin,
}

impl Dht11 {
    pub fn new(gpio: &Gpio, pin: u8) -> Result<Self> {
        let mut pin = gpio
            .get(pin)
            .map_err(|e| HwError::Gpio(format!("open dht pin {pin}: {e}")))?
            .into_io(Mode::Output);
        pin.set_high(); // bus idles high
        Ok(Self { pin })
    }

    /// Read one frame, returning (temperature °C, relative humidity %).
    pub fn read_frame(&mut self) -> Result<(f32, f32)> {
        // Host start signal: hold low >= 18 ms, release, hand the line over.
        self.pin.set_mode(Mode::Output);
        self.pin.set_low();
        std::thread::sleep(Duration::from_millis(18));
        self.pin.set_high();
        self.pin.set_mode(Mode::Input);

        let pin = &self.pin;
        // Sensor acknowledge: optional high gap, 80 µs low, 80 µs high.
        wait_while_with_timeout(|| pin.is_high(), PULSE_TIMEOUT, None)?;
        wait_while_with_timeout(|| pin.is_low(), PULSE_TIMEOUT, None)?;
        wait_while_with_timeout(|| pin.is_high(), PULSE_TIMEOUT, None)?;

        let mut bytes = [0u8; 5];
        for bit in 0..40 {
            wait_while_with_timeout(|| pin.is_low(), PULSE_TIMEOUT, None)?;
            let high = wait_while_with_timeout(|| pin.is_high(), PULSE_TIMEOUT, None)?;
            if high > ONE_THRESHOLD {
                bytes[bit / 8] |= 1 << (7 - (bit % 8));
            }
        }
        trace!(?bytes, "dht11 frame");
        decode(bytes)
    }
}

/// Validate the checksum and decode a raw 5-byte DHT11 frame.
pub fn decode(bytes: [u8; 5]) -> Result<(f32, f32)> {
    let sum = bytes[..4]
        .iter()
        .fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != bytes[4] {
        return Err(HwError::Checksum);
    }
    let humidity = f32::from(bytes[0]) + f32::from(bytes[1]) * 0.1;
    let mut temperature = f32::from(bytes[2]) + f32::from(bytes[3] & 0x7F) * 0.1;
    if bytes[3] & 0x80 != 0 {
        temperature = -temperature;
    }
    Ok((temperature, humidity))
}

#[cfg(test)]
mod tests {
    use super::decode;

    #[test]
    fn decodes_valid_frame() {
        let (t, h) = decode([45, 0, 23, 4, 72]).unwrap();
        assert!((t - 23.4).abs() < 1e-4);
        assert!((h - 45.0).abs() < 1e-4);
    }

    #[test]
    fn negative_temperature_flag() {
        let (t, _) = decode([30, 0, 2, 0x85, 30 + 2 + 0x85]).unwrap();
        assert!((t + 2.5).abs() < 1e-4);
    }

    #[test]
    fn rejects_bad_checksum() {
        assert!(decode([45, 0, 23, 4, 0]).is_err());
    }
}
