pub mod error;
pub mod util;

#[cfg(feature = "hardware")]
pub mod dht11;
#[cfg(feature = "hardware")]
pub mod mcp3208;
#[cfg(feature = "hardware")]
pub mod board;

#[cfg(feature = "net")]
pub mod net;

use airmon_traits::{
    AnalogInput, ClimateSample, ClimateSensor, DigitalOutput, HttpGet, HttpResponse, Level,
    MessageBroker, NetworkLink,
};
use std::collections::HashMap;
use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::HwError;

/// Simulated ADC + GPIO board.
///
/// Each analog channel returns a fixed raw code. A channel can be tied to an
/// actuator pin: while the pin sits at its inactive level that channel reads
/// the "dark" code instead, mimicking an optical sensor whose output is only
/// meaningful while its LED is lit.
#[derive(Debug, Default, Clone)]
pub struct SimulatedBoard {
    channels: HashMap<u8, u16>,
    gated: HashMap<u8, (u8, Level, u16)>,
    levels: HashMap<u8, Level>,
    failing: Vec<u8>,
}

impl SimulatedBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(mut self, channel: u8, raw: u16) -> Self {
        self.channels.insert(channel, raw);
        self
    }

    /// Gate `channel` on `pin` being at `active`; otherwise it reads `dark`.
    pub fn with_actuator(mut self, channel: u8, pin: u8, active: Level, dark: u16) -> Self {
        self.gated.insert(channel, (pin, active, dark));
        self
    }

    /// Make every read of `channel` fail.
    pub fn with_failing_channel(mut self, channel: u8) -> Self {
        self.failing.push(channel);
        self
    }

    pub fn set_channel(&mut self, channel: u8, raw: u16) {
        self.channels.insert(channel, raw);
    }

    /// Last level driven on `pin`, if any.
    pub fn level(&self, pin: u8) -> Option<Level> {
        self.levels.get(&pin).copied()
    }
}

impl AnalogInput for SimulatedBoard {
    fn read_analog(&mut self, channel: u8) -> Result<u16, Box<dyn Error + Send + Sync>> {
        if self.failing.contains(&channel) {
            return Err(Box::new(HwError::Spi(format!("simulated fault on channel {channel}"))));
        }
        let raw = *self
            .channels
            .get(&channel)
            .ok_or(HwError::Channel(channel))?;
        if let Some(&(pin, active, dark)) = self.gated.get(&channel) {
            if self.levels.get(&pin) != Some(&active) {
                return Ok(dark);
            }
        }
        tracing::trace!(channel, raw, "simulated adc read");
        Ok(raw)
    }
}

impl DigitalOutput for SimulatedBoard {
    fn set_digital(&mut self, pin: u8, level: Level) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.levels.insert(pin, level);
        Ok(())
    }
}

/// Simulated DHT-style climate sensor.
#[derive(Debug, Clone)]
pub struct SimulatedClimate {
    sample: ClimateSample,
}

impl SimulatedClimate {
    pub fn new(temperature_c: f32, humidity_pct: f32) -> Self {
        Self {
            sample: ClimateSample {
                temperature_c,
                humidity_pct,
            },
        }
    }

    /// A sensor that reports NaN on every read, like a disconnected DHT11.
    pub fn faulty() -> Self {
        Self {
            sample: ClimateSample {
                temperature_c: f32::NAN,
                humidity_pct: f32::NAN,
            },
        }
    }

    pub fn set_sample(&mut self, temperature_c: f32, humidity_pct: f32) {
        self.sample = ClimateSample {
            temperature_c,
            humidity_pct,
        };
    }
}

impl ClimateSensor for SimulatedClimate {
    fn read_climate(&mut self) -> Result<ClimateSample, Box<dyn Error + Send + Sync>> {
        Ok(self.sample)
    }
}

/// Simulated network association that comes up after a number of polls.
///
/// `outage()` hands out a shared switch; while it is set the link reports
/// itself unassociated regardless of polls. `joined()` shares the SSID of
/// the last `begin()`.
#[derive(Debug, Clone)]
pub struct SimulatedLink {
    up_after: Option<u32>,
    polls: u32,
    begun: bool,
    outage: Arc<AtomicBool>,
    joined: Arc<Mutex<Option<String>>>,
}

impl SimulatedLink {
    /// Associates on the `n`-th poll after `begin()` (1 = immediately).
    pub fn up_after(n: u32) -> Self {
        Self {
            up_after: Some(n),
            polls: 0,
            begun: false,
            outage: Arc::new(AtomicBool::new(false)),
            joined: Arc::new(Mutex::new(None)),
        }
    }

    /// Never associates.
    pub fn never() -> Self {
        Self {
            up_after: None,
            polls: 0,
            begun: false,
            outage: Arc::new(AtomicBool::new(false)),
            joined: Arc::new(Mutex::new(None)),
        }
    }

    /// Number of association polls since the last `begin()`.
    pub fn polls(&self) -> u32 {
        self.polls
    }

    /// Shared outage switch.
    pub fn outage(&self) -> Arc<AtomicBool> {
        self.outage.clone()
    }

    /// Shared record of the SSID passed to the last `begin()`.
    pub fn joined(&self) -> Arc<Mutex<Option<String>>> {
        self.joined.clone()
    }
}

impl NetworkLink for SimulatedLink {
    fn begin(
        &mut self,
        ssid: &str,
        _password: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.begun = true;
        self.polls = 0;
        if let Ok(mut joined) = self.joined.lock() {
            *joined = Some(ssid.to_string());
        }
        Ok(())
    }

    fn is_associated(&mut self) -> bool {
        if !self.begun || self.outage.load(Ordering::Relaxed) {
            return false;
        }
        self.polls = self.polls.saturating_add(1);
        self.up_after.is_some_and(|n| self.polls >= n)
    }

    fn address(&self) -> Option<String> {
        Some("10.0.0.42".to_string())
    }
}

/// Simulated HTTP endpoint answering every request with a fixed status.
/// Requests are recorded in a shared log so callers can inspect them.
#[derive(Debug, Clone)]
pub struct SimulatedHttp {
    status: i32,
    requests: Arc<Mutex<Vec<String>>>,
}

impl SimulatedHttp {
    pub fn new(status: i32) -> Self {
        Self {
            status,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the recorded request URLs.
    pub fn requests(&self) -> Arc<Mutex<Vec<String>>> {
        self.requests.clone()
    }
}

impl HttpGet for SimulatedHttp {
    fn get(&mut self, url: &str) -> Result<HttpResponse, Box<dyn Error + Send + Sync>> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(url.to_string());
        }
        tracing::debug!(status = self.status, "simulated http response");
        Ok(HttpResponse {
            status: self.status,
            body: if self.status > 0 { "1".into() } else { String::new() },
        })
    }
}

/// Simulated pub/sub broker. Clones share the connection flag and the
/// message log.
#[derive(Debug, Clone)]
pub struct SimulatedBroker {
    accept: bool,
    connected: Arc<AtomicBool>,
    published: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

impl SimulatedBroker {
    /// `accept == false` makes every connect attempt fail.
    pub fn new(accept: bool) -> Self {
        Self {
            accept,
            connected: Arc::new(AtomicBool::new(false)),
            published: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the recorded `(topic, payload)` messages.
    pub fn published(&self) -> Arc<Mutex<Vec<(String, Vec<u8>)>>> {
        self.published.clone()
    }

    /// Simulate the broker dropping the connection.
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::Relaxed);
    }
}

impl MessageBroker for SimulatedBroker {
    fn connect(&mut self, client_id: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        if !self.accept {
            return Err(Box::new(HwError::Mqtt(format!(
                "connection refused for {client_id}"
            ))));
        }
        self.connected.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn is_connected(&mut self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), Box<dyn Error + Send + Sync>> {
        if !self.is_connected() {
            return Err(Box::new(HwError::NotConnected));
        }
        if let Ok(mut log) = self.published.lock() {
            log.push((topic.to_string(), payload.to_vec()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gated_channel_reads_dark_until_actuator_active() {
        let mut board = SimulatedBoard::new()
            .with_channel(1, 600)
            .with_actuator(1, 5, Level::Low, 40);
        assert_eq!(board.read_analog(1).unwrap(), 40);
        board.set_digital(5, Level::Low).unwrap();
        assert_eq!(board.read_analog(1).unwrap(), 600);
        board.set_digital(5, Level::High).unwrap();
        assert_eq!(board.read_analog(1).unwrap(), 40);
    }

    #[test]
    fn unknown_channel_is_an_error() {
        let mut board = SimulatedBoard::new();
        let err = board.read_analog(7).unwrap_err();
        assert!(err.to_string().contains("channel 7"));
    }

    #[test]
    fn link_requires_begin_and_counts_polls() {
        let mut link = SimulatedLink::up_after(3);
        assert!(!link.is_associated());
        link.begin("lab", "secret").unwrap();
        assert_eq!(link.joined().lock().unwrap().as_deref(), Some("lab"));
        assert!(!link.is_associated());
        assert!(!link.is_associated());
        assert!(link.is_associated());
        assert_eq!(link.polls(), 3);
    }

    #[test]
    fn broker_rejects_publish_while_disconnected() {
        let mut broker = SimulatedBroker::new(true);
        assert!(broker.publish("t", b"x").is_err());
        broker.connect("id").unwrap();
        broker.publish("t", b"x").unwrap();
        assert_eq!(broker.published().lock().unwrap().len(), 1);
    }
}
