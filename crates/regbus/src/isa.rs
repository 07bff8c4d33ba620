use crate::{BusAddress, PortIo, RegisterBus, Result, TransportError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// Hands out one access lock per ISA base address.
///
/// Selecting a register and transferring its data are two separate port cycles, so
/// every transport talking to the same base must share the same lock.
#[derive(Debug, Default)]
pub struct PortLocks {
    locks: Mutex<HashMap<u16, Arc<Mutex<()>>>>,
}

impl PortLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock_for(&self, base: u16) -> Arc<Mutex<()>> {
        self.locks.lock().entry(base).or_default().clone()
    }
}

/// Register access through the address-select/data port pair at `base + 5`/`base + 6`.
pub struct IsaBus<P: PortIo + ?Sized> {
    io: Arc<P>,
    base: u16,
    lock: Arc<Mutex<()>>,
}

impl<P: PortIo + ?Sized> IsaBus<P> {
    pub fn new(io: Arc<P>, base: u16, locks: &PortLocks) -> Result<Self> {
        BusAddress::isa(base).ok_or(TransportError::InvalidAddress(base))?;
        Ok(Self {
            io,
            base,
            lock: locks.lock_for(base),
        })
    }

    fn addr_port(&self) -> u16 {
        self.base + BusAddress::ADDR_REG_OFFSET
    }

    fn data_port(&self) -> u16 {
        self.base + BusAddress::DATA_REG_OFFSET
    }
}

impl<P: PortIo + ?Sized> RegisterBus for IsaBus<P> {
    fn read_register(&self, reg: u8) -> Result<u8> {
        let _guard = self.lock.lock();
        self.io.outb(self.addr_port(), reg)?;
        let value = self.io.inb(self.data_port())?;
        trace!(base = self.base, reg, value, "isa read");
        Ok(value)
    }

    fn write_register(&self, reg: u8, value: u8) -> Result<()> {
        let _guard = self.lock.lock();
        self.io.outb(self.addr_port(), reg)?;
        self.io.outb(self.data_port(), value)?;
        trace!(base = self.base, reg, value, "isa write");
        Ok(())
    }

    fn address(&self) -> BusAddress {
        BusAddress::Isa { base: self.base }
    }
}
