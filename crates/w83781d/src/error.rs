use crate::Channel;
use regbus::{BusAddress, TransportError};
use thiserror::Error;

pub type Result<T, E = DriverError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("no free client slot (capacity {capacity})")]
    NoCapacity { capacity: usize },
    #[error("client not found")]
    NotFound,
    #[error("a chip is already attached at {0}")]
    AlreadyAttached(BusAddress),
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),
    #[error("chip id 0x{found:02X} does not identify a W83781D")]
    DetectionMismatch { found: u8 },
    #[error("channel {0} is read-only")]
    ReadOnly(Channel),
    #[error("unknown channel: {0}")]
    UnknownChannel(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("metrics init error: {0}")]
    Metrics(String),
}
