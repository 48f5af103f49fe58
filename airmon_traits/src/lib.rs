//! Capability traits shared by the hardware, transport, and core crates.
//!
//! Everything the monitor touches in the outside world goes through one of
//! these narrow interfaces, so the acquisition and dispatch logic can run on a
//! host against fakes. Errors cross the boundary as
//! `Box<dyn Error + Send + Sync>`; the core maps them to its own error type.
pub mod clock;

pub use clock::{Clock, MonotonicClock};

use std::error::Error;

/// Logic level for a digital output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// The opposite level.
    #[inline]
    pub fn inverted(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

/// Single-shot analog-to-digital conversion.
pub trait AnalogInput {
    fn read_analog(&mut self, channel: u8) -> Result<u16, Box<dyn Error + Send + Sync>>;
}

/// Drive a digital output line.
pub trait DigitalOutput {
    fn set_digital(&mut self, pin: u8, level: Level) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// One temperature/humidity reading. Either channel may be NaN when the
/// sensor produced no usable value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateSample {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

impl ClimateSample {
    /// True when both channels carry a number.
    #[inline]
    pub fn is_valid(&self) -> bool {
        !self.temperature_c.is_nan() && !self.humidity_pct.is_nan()
    }
}

pub trait ClimateSensor {
    fn read_climate(&mut self) -> Result<ClimateSample, Box<dyn Error + Send + Sync>>;
}

/// Network association (Wi-Fi station or equivalent).
pub trait NetworkLink {
    /// Start (or restart) association with the given network. Must not
    /// block for long.
    fn begin(&mut self, ssid: &str, password: &str)
        -> Result<(), Box<dyn Error + Send + Sync>>;
    /// Poll whether the link is currently associated.
    fn is_associated(&mut self) -> bool;
    /// Local address, when known.
    fn address(&self) -> Option<String> {
        None
    }
}

/// Response of a request/response upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code; non-positive values signal a client-side failure.
    pub status: i32,
    pub body: String,
}

pub trait HttpGet {
    fn get(&mut self, url: &str) -> Result<HttpResponse, Box<dyn Error + Send + Sync>>;
}

/// Publish/subscribe broker connection.
pub trait MessageBroker {
    fn connect(&mut self, client_id: &str) -> Result<(), Box<dyn Error + Send + Sync>>;
    /// Polls the session, so one the broker has dropped reads as disconnected.
    fn is_connected(&mut self) -> bool;
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), Box<dyn Error + Send + Sync>>;
}

impl<T: AnalogInput + ?Sized> AnalogInput for Box<T> {
    fn read_analog(&mut self, channel: u8) -> Result<u16, Box<dyn Error + Send + Sync>> {
        (**self).read_analog(channel)
    }
}

impl<T: DigitalOutput + ?Sized> DigitalOutput for Box<T> {
    fn set_digital(&mut self, pin: u8, level: Level) -> Result<(), Box<dyn Error + Send + Sync>> {
        (**self).set_digital(pin, level)
    }
}

impl<T: ClimateSensor + ?Sized> ClimateSensor for Box<T> {
    fn read_climate(&mut self) -> Result<ClimateSample, Box<dyn Error + Send + Sync>> {
        (**self).read_climate()
    }
}

impl<T: NetworkLink + ?Sized> NetworkLink for Box<T> {
    fn begin(&mut self, ssid: &str, password: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        (**self).begin(ssid, password)
    }
    fn is_associated(&mut self) -> bool {
        (**self).is_associated()
    }
    fn address(&self) -> Option<String> {
        (**self).address()
    }
}

impl<T: HttpGet + ?Sized> HttpGet for Box<T> {
    fn get(&mut self, url: &str) -> Result<HttpResponse, Box<dyn Error + Send + Sync>> {
        (**self).get(url)
    }
}

impl<T: MessageBroker + ?Sized> MessageBroker for Box<T> {
    fn connect(&mut self, client_id: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        (**self).connect(client_id)
    }
    fn is_connected(&mut self) -> bool {
        (**self).is_connected()
    }
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), Box<dyn Error + Send + Sync>> {
        (**self).publish(topic, payload)
    }
}

/// Board-level access: one object that can both sample and drive lines.
pub trait Board: AnalogInput + DigitalOutput {}

impl<T: AnalogInput + DigitalOutput + ?Sized> Board for T {}
