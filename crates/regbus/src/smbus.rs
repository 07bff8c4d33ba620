use crate::{BusAddress, RegisterBus, Result, SmbusAdapter, TransportError};
use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::trace;

/// Register access through SMBus byte-data transactions.
///
/// The adapter's transactions are atomic, so no extra locking happens here.
pub struct SmbusBus<A: SmbusAdapter + ?Sized> {
    adapter: Arc<A>,
    addr: u8,
}

impl<A: SmbusAdapter + ?Sized> SmbusBus<A> {
    pub fn new(adapter: Arc<A>, addr7: u8) -> Result<Self> {
        BusAddress::smbus(addr7).ok_or(TransportError::InvalidAddress(u16::from(addr7)))?;
        Ok(Self {
            adapter,
            addr: addr7,
        })
    }
}

impl<A: SmbusAdapter + ?Sized> RegisterBus for SmbusBus<A> {
    fn read_register(&self, reg: u8) -> Result<u8> {
        let value = self.adapter.read_byte_data(self.addr, reg)?;
        trace!(adapter = self.adapter.name(), addr = self.addr, reg, value, "smbus read");
        Ok(value)
    }

    fn write_register(&self, reg: u8, value: u8) -> Result<()> {
        self.adapter.write_byte_data(self.addr, reg, value)?;
        trace!(adapter = self.adapter.name(), addr = self.addr, reg, value, "smbus write");
        Ok(())
    }

    fn address(&self) -> BusAddress {
        BusAddress::Smbus { addr: self.addr }
    }
}

/// Wraps any embedded-hal 1.0 I2C bus as an SMBus adapter.
pub struct HalAdapter<B> {
    name: String,
    bus: Mutex<B>,
}

impl<B: I2c + Send> HalAdapter<B> {
    pub fn new(name: &str, bus: B) -> Self {
        Self {
            name: name.to_string(),
            bus: Mutex::new(bus),
        }
    }
}

fn map_hal_error(kind: ErrorKind, addr: u8, reg: u8) -> TransportError {
    match kind {
        ErrorKind::NoAcknowledge(_) => TransportError::Nack { addr, reg },
        other => TransportError::Io(format!("i2c: {other:?}")),
    }
}

impl<B: I2c + Send> SmbusAdapter for HalAdapter<B> {
    fn read_byte_data(&self, addr: u8, reg: u8) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.bus
            .lock()
            .write_read(addr, &[reg], &mut buf)
            .map_err(|e| map_hal_error(e.kind(), addr, reg))?;
        Ok(buf[0])
    }

    fn write_byte_data(&self, addr: u8, reg: u8, value: u8) -> Result<()> {
        self.bus
            .lock()
            .write(addr, &[reg, value])
            .map_err(|e| map_hal_error(e.kind(), addr, reg))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorType, NoAcknowledgeSource, Operation};

    /// Byte-addressed I2C target answering at one address.
    struct FakeTarget {
        addr: u8,
        pointer: u8,
        regs: [u8; 256],
    }

    impl ErrorType for FakeTarget {
        type Error = ErrorKind;
    }

    impl I2c for FakeTarget {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> core::result::Result<(), Self::Error> {
            if address != self.addr {
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
            }
            for op in operations.iter_mut() {
                match op {
                    Operation::Write(bytes) => {
                        if let Some((first, rest)) = bytes.split_first() {
                            self.pointer = *first;
                            for b in rest {
                                self.regs[usize::from(self.pointer)] = *b;
                                self.pointer = self.pointer.wrapping_add(1);
                            }
                        }
                    }
                    Operation::Read(buf) => {
                        for b in buf.iter_mut() {
                            *b = self.regs[usize::from(self.pointer)];
                            self.pointer = self.pointer.wrapping_add(1);
                        }
                    }
                }
            }
            Ok(())
        }
    }

    fn target() -> FakeTarget {
        FakeTarget {
            addr: 0x2D,
            pointer: 0,
            regs: [0u8; 256],
        }
    }

    #[test]
    fn byte_data_through_hal_bus() {
        let adapter = Arc::new(HalAdapter::new("i2c-0", target()));
        let bus = SmbusBus::new(adapter.clone(), 0x2D).unwrap();

        bus.write_register(0x4E, 0x02).unwrap();
        assert_eq!(bus.read_register(0x4E).unwrap(), 0x02);
        assert_eq!(bus.address(), BusAddress::Smbus { addr: 0x2D });
        assert_eq!(adapter.name(), "i2c-0");
    }

    #[test]
    fn missing_target_maps_to_nack() {
        let adapter = Arc::new(HalAdapter::new("i2c-0", target()));
        let bus = SmbusBus::new(adapter, 0x2C).unwrap();
        assert!(matches!(
            bus.read_register(0x58),
            Err(TransportError::Nack { addr: 0x2C, reg: 0x58 })
        ));
    }

    #[test]
    fn rejects_ten_bit_address() {
        let adapter = Arc::new(HalAdapter::new("i2c-0", target()));
        assert!(SmbusBus::new(adapter, 0x80).is_err());
    }
}
