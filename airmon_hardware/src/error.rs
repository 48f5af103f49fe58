use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("spi error: {0}")]
    Spi(String),
    #[error("adc channel {0} out of range")]
    Channel(u8),
    #[error("sensor timeout")]
    Timeout,
    #[error("dht11 checksum mismatch")]
    Checksum,
    #[error("network link down")]
    LinkDown,
    #[error("http: {0}")]
    Http(String),
    #[error("mqtt: {0}")]
    Mqtt(String),
    #[error("mqtt broker not connected")]
    NotConnected,
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
