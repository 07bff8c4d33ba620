//! W83781D register map.

pub const IN_COUNT: usize = 7;
pub const FAN_COUNT: usize = 3;
pub const TEMP_COUNT: usize = 3;

/// Voltage input `nr` (0-based).
pub const fn in_input(nr: usize) -> u8 {
    0x20 + nr as u8
}

pub const fn in_max(nr: usize) -> u8 {
    0x2B + (nr as u8) * 2
}

pub const fn in_min(nr: usize) -> u8 {
    0x2C + (nr as u8) * 2
}

/// Fan counter `nr` (1-based, like the chip's pin names).
pub const fn fan_input(nr: usize) -> u8 {
    0x27 + nr as u8
}

pub const fn fan_min(nr: usize) -> u8 {
    0x3A + nr as u8
}

pub const TEMP: u8 = 0x27;
pub const TEMP_OVER: u8 = 0x39;
pub const TEMP_HYST: u8 = 0x3A;

// Banked window shared by temp2 and temp3. Each value is the high byte of a
// 9-bit reading; the register after it carries the half-degree bit.
pub const TEMP23: u8 = 0x50;
pub const TEMP_CONFIG23: u8 = 0x52;
pub const TEMP_HYST23: u8 = 0x53;
pub const TEMP_OVER23: u8 = 0x55;

/// Every register aliased by the bank selector.
pub const BANKED: [u8; 7] = [0x50, 0x51, 0x52, 0x53, 0x54, 0x55, 0x56];

pub const CONFIG: u8 = 0x40;
pub const ALARM1: u8 = 0x41;
pub const ALARM2: u8 = 0x42;
pub const VID_FANDIV: u8 = 0x47;
pub const BANK_SELECT: u8 = 0x4E;
pub const CHIP_MANUFACTURER: u8 = 0x4F;
pub const CHIP_ID: u8 = 0x58;

/// CONFIG bits.
pub const CONFIG_START: u8 = 0x01;
pub const CONFIG_INT_CLEAR: u8 = 0x08;
pub const CONFIG_RESET: u8 = 0x80;

/// Value written to the bank selector.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Bank {
    None = 0,
    Bank1 = 1,
    Bank2 = 2,
    Bank3 = 4,
}

impl Bank {
    pub fn value(self) -> u8 {
        self as u8
    }
}
