use thiserror::Error;

pub type Result<T, E = TransportError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(String),
    #[error("no acknowledge from 0x{addr:02X} (register 0x{reg:02X})")]
    Nack { addr: u8, reg: u8 },
    #[error("operation not supported on this backend: {0}")]
    Unsupported(&'static str),
    #[error("invalid bus address: 0x{0:X}")]
    InvalidAddress(u16),
}
