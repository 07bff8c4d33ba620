use crate::{BusAddress, PortIo, Result, SmbusAdapter, TransportError};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

/// One register access as seen by the mock.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Access {
    Read { reg: u8, value: u8 },
    Write { reg: u8, value: u8 },
}

struct BankWindow {
    select: u8,
    registers: HashSet<u8>,
}

struct State {
    // page 0 holds every unbanked register
    pages: HashMap<u8, [u8; 256]>,
    window: Option<BankWindow>,
    latch: u8,
    log: Vec<Access>,
    fail_reads: HashSet<u8>,
    fail_writes: HashSet<u8>,
}

impl State {
    fn page_for(&self, reg: u8) -> u8 {
        match &self.window {
            Some(w) if w.registers.contains(&reg) => self.page(0)[usize::from(w.select)],
            _ => 0,
        }
    }

    fn page(&self, page: u8) -> [u8; 256] {
        self.pages.get(&page).copied().unwrap_or([0u8; 256])
    }

    fn load(&self, reg: u8) -> u8 {
        self.page(self.page_for(reg))[usize::from(reg)]
    }

    fn store(&mut self, reg: u8, value: u8) {
        let page = self.page_for(reg);
        self.pages.entry(page).or_insert([0u8; 256])[usize::from(reg)] = value;
    }
}

/// An in-process register file answering on ISA ports and/or an SMBus address.
///
/// Registers listed in a bank window are stored per value of the bank-select
/// register; everything else lives in one flat page.
pub struct MockRegisterFile {
    state: Mutex<State>,
    isa_base: Option<u16>,
    smbus_addr: Option<u8>,
}

impl Default for MockRegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRegisterFile {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                pages: HashMap::new(),
                window: None,
                latch: 0,
                log: Vec::new(),
                fail_reads: HashSet::new(),
                fail_writes: HashSet::new(),
            }),
            isa_base: None,
            smbus_addr: None,
        }
    }

    pub fn at_isa(mut self, base: u16) -> Self {
        self.isa_base = Some(base);
        self
    }

    pub fn at_smbus(mut self, addr7: u8) -> Self {
        self.smbus_addr = Some(addr7);
        self
    }

    pub fn with_bank_window(self, select: u8, registers: &[u8]) -> Self {
        self.state.lock().window = Some(BankWindow {
            select,
            registers: registers.iter().copied().collect(),
        });
        self
    }

    pub fn with_register(self, reg: u8, value: u8) -> Self {
        self.set(reg, value);
        self
    }

    /// Set a register as seen through the current bank selection, bypassing the log.
    pub fn set(&self, reg: u8, value: u8) {
        self.state.lock().store(reg, value);
    }

    /// Set a register inside a specific bank page.
    pub fn set_banked(&self, bank: u8, reg: u8, value: u8) {
        self.state.lock().pages.entry(bank).or_insert([0u8; 256])[usize::from(reg)] = value;
    }

    /// Current value of a register through the current bank selection.
    pub fn get(&self, reg: u8) -> u8 {
        self.state.lock().load(reg)
    }

    pub fn get_banked(&self, bank: u8, reg: u8) -> u8 {
        self.state.lock().page(bank)[usize::from(reg)]
    }

    /// Value currently held by the bank-select register, if a window is configured.
    pub fn selected_bank(&self) -> Option<u8> {
        let state = self.state.lock();
        let select = state.window.as_ref()?.select;
        Some(state.page(0)[usize::from(select)])
    }

    pub fn accesses(&self) -> Vec<Access> {
        self.state.lock().log.clone()
    }

    pub fn clear_log(&self) {
        self.state.lock().log.clear();
    }

    pub fn fail_reads_of(&self, reg: u8) {
        self.state.lock().fail_reads.insert(reg);
    }

    pub fn fail_writes_to(&self, reg: u8) {
        self.state.lock().fail_writes.insert(reg);
    }

    pub fn clear_faults(&self) {
        let mut state = self.state.lock();
        state.fail_reads.clear();
        state.fail_writes.clear();
    }

    fn read(&self, reg: u8) -> Result<u8> {
        let mut state = self.state.lock();
        if state.fail_reads.contains(&reg) {
            return Err(TransportError::Io(format!("injected read fault at 0x{reg:02X}")));
        }
        let value = state.load(reg);
        state.log.push(Access::Read { reg, value });
        Ok(value)
    }

    fn write(&self, reg: u8, value: u8) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_writes.contains(&reg) {
            return Err(TransportError::Io(format!("injected write fault at 0x{reg:02X}")));
        }
        state.store(reg, value);
        state.log.push(Access::Write { reg, value });
        Ok(())
    }
}

impl PortIo for MockRegisterFile {
    fn inb(&self, port: u16) -> Result<u8> {
        let base = self.isa_base.ok_or(TransportError::Unsupported("mock has no isa ports"))?;
        if port == base + BusAddress::DATA_REG_OFFSET {
            let reg = self.state.lock().latch;
            self.read(reg)
        } else if port == base + BusAddress::ADDR_REG_OFFSET {
            Ok(self.state.lock().latch)
        } else {
            // undecoded ports float high
            Ok(0xFF)
        }
    }

    fn outb(&self, port: u16, value: u8) -> Result<()> {
        let base = self.isa_base.ok_or(TransportError::Unsupported("mock has no isa ports"))?;
        if port == base + BusAddress::ADDR_REG_OFFSET {
            self.state.lock().latch = value;
            Ok(())
        } else if port == base + BusAddress::DATA_REG_OFFSET {
            let reg = self.state.lock().latch;
            self.write(reg, value)
        } else {
            Ok(())
        }
    }
}

impl SmbusAdapter for MockRegisterFile {
    fn read_byte_data(&self, addr: u8, reg: u8) -> Result<u8> {
        if self.smbus_addr != Some(addr) {
            return Err(TransportError::Nack { addr, reg });
        }
        self.read(reg)
    }

    fn write_byte_data(&self, addr: u8, reg: u8, value: u8) -> Result<()> {
        if self.smbus_addr != Some(addr) {
            return Err(TransportError::Nack { addr, reg });
        }
        self.write(reg, value)
    }

    fn name(&self) -> &str {
        "mock-smbus"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_window_pages_follow_selector() {
        let chip = MockRegisterFile::new()
            .at_smbus(0x2D)
            .with_bank_window(0x4E, &[0x50, 0x53, 0x55]);
        chip.set_banked(2, 0x50, 0x1E);
        chip.set_banked(4, 0x50, 0x28);

        chip.write_byte_data(0x2D, 0x4E, 2).unwrap();
        assert_eq!(chip.read_byte_data(0x2D, 0x50).unwrap(), 0x1E);
        chip.write_byte_data(0x2D, 0x4E, 4).unwrap();
        assert_eq!(chip.read_byte_data(0x2D, 0x50).unwrap(), 0x28);
        assert_eq!(chip.selected_bank(), Some(4));

        // unbanked registers ignore the selector
        chip.write_byte_data(0x2D, 0x40, 0x01).unwrap();
        chip.write_byte_data(0x2D, 0x4E, 0).unwrap();
        assert_eq!(chip.get(0x40), 0x01);
    }

    #[test]
    fn wrong_address_is_nacked() {
        let chip = MockRegisterFile::new().at_smbus(0x2D);
        assert!(matches!(
            chip.read_byte_data(0x2E, 0x58),
            Err(TransportError::Nack { addr: 0x2E, reg: 0x58 })
        ));
    }

    #[test]
    fn undecoded_isa_ports_read_high() {
        let chip = MockRegisterFile::new().at_isa(0x290);
        assert_eq!(chip.inb(0x291).unwrap(), 0xFF);
        assert_eq!(chip.inb(0x297).unwrap(), 0xFF);
    }

    #[test]
    fn injected_faults_surface_and_clear() {
        let chip = MockRegisterFile::new().at_smbus(0x2D);
        chip.fail_reads_of(0x41);
        assert!(chip.read_byte_data(0x2D, 0x41).is_err());
        chip.clear_faults();
        assert!(chip.read_byte_data(0x2D, 0x41).is_ok());
    }
}
