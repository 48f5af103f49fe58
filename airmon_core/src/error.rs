use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AirmonError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("sensor returned no reading: {0}")]
    NoReading(&'static str),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("timeout waiting for sensor")]
    Timeout,
    #[error("network link unavailable after {attempts} attempts")]
    LinkUnavailable { attempts: u32 },
    #[error("network link down")]
    LinkDown,
    #[error("upload rejected with status {0}")]
    UploadRejected(i32),
    #[error("upload failed: {0}")]
    Upload(String),
    #[error("broker unavailable: {0}")]
    BrokerUnavailable(String),
    #[error("publish failed: {0}")]
    Publish(String),
    #[error("initialization failed: {0}")]
    Init(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing acquisition controller")]
    MissingAcquisition,
    #[error("missing renderer")]
    MissingRenderer,
    #[error("missing transport")]
    MissingTransport,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
