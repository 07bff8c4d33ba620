use core::fmt;

/// Physical medium a chip is reached through.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum BusKind {
    /// Address-select/data port pair on the ISA bus.
    Isa,
    /// SMBus / I2C byte-data transactions.
    Smbus,
}

impl fmt::Display for BusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusKind::Isa => f.write_str("isa"),
            BusKind::Smbus => f.write_str("smbus"),
        }
    }
}

/// Where a chip lives on its bus. Fixed for the lifetime of a device.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum BusAddress {
    Isa { base: u16 },
    Smbus { addr: u8 },
}

impl BusAddress {
    /// Offset of the address-select register from the port base.
    pub const ADDR_REG_OFFSET: u16 = 5;
    /// Offset of the data register from the port base.
    pub const DATA_REG_OFFSET: u16 = 6;
    /// Number of ports a chip decodes at its base.
    pub const ISA_EXTENT: u16 = 8;

    pub fn isa(base: u16) -> Option<Self> {
        // base + extent must stay inside the 16-bit port space
        if base.checked_add(Self::ISA_EXTENT - 1).is_some() {
            Some(Self::Isa { base })
        } else {
            None
        }
    }

    pub fn smbus(addr7: u8) -> Option<Self> {
        if addr7 <= 0x7F {
            Some(Self::Smbus { addr: addr7 })
        } else {
            None
        }
    }

    pub fn kind(&self) -> BusKind {
        match self {
            BusAddress::Isa { .. } => BusKind::Isa,
            BusAddress::Smbus { .. } => BusKind::Smbus,
        }
    }
}

impl fmt::Display for BusAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusAddress::Isa { base } => write!(f, "isa:0x{base:04X}"),
            BusAddress::Smbus { addr } => write!(f, "smbus:0x{addr:02X}"),
        }
    }
}

/// Chip-identification check used by probing code.
///
/// Bit 0 of the W83781D chip-id register carries a VID strap and is masked off.
pub fn chip_id_matches(value: u8) -> bool {
    value & 0xFE == 0x20
}
