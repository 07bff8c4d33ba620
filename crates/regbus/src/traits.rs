use crate::{BusAddress, BusKind, Result};

/// Byte-wide register access to one chip.
///
/// Implementations own their locator; callers never pass it per access.
pub trait RegisterBus: Send + Sync {
    /// Read one 8-bit register.
    fn read_register(&self, reg: u8) -> Result<u8>;

    /// Write one 8-bit register.
    fn write_register(&self, reg: u8, value: u8) -> Result<()>;

    /// Which medium this transport drives.
    fn bus_kind(&self) -> BusKind {
        self.address().kind()
    }

    /// The chip's locator on its bus.
    fn address(&self) -> BusAddress;
}

/// Raw port I/O, one byte at a time.
pub trait PortIo: Send + Sync {
    fn inb(&self, port: u16) -> Result<u8>;
    fn outb(&self, port: u16, value: u8) -> Result<()>;
}

/// An SMBus adapter offering byte-data transactions.
///
/// Each call is one complete bus transaction; adapters serialize them internally.
pub trait SmbusAdapter: Send + Sync {
    fn read_byte_data(&self, addr: u8, reg: u8) -> Result<u8>;
    fn write_byte_data(&self, addr: u8, reg: u8, value: u8) -> Result<()>;

    /// Human-readable adapter name for logs.
    fn name(&self) -> &str {
        "smbus"
    }
}
