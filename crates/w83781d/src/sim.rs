//! A populated mock chip for tests and the CLI's mock backend.

use crate::registers::{self, Bank, FAN_COUNT, IN_COUNT};
use regbus::MockRegisterFile;

pub const SMBUS_ADDR: u8 = 0x2D;
pub const ISA_BASE: u16 = 0x290;
/// Bit 0 set: VID4 strap high.
pub const CHIP_ID: u8 = 0x21;
pub const VID_NIBBLE: u8 = 0x00;

/// Roughly 2.80, 2.80, 3.30, 5.00, 12.0, -12.0 and -5.0 V.
pub const IN_INPUT: [u8; IN_COUNT] = [175, 175, 206, 185, 197, 216, 207];
pub const FAN_INPUT: [u8; FAN_COUNT] = [150, 135, 255];
/// 40, 35 and 29 degrees.
pub const TEMP: [u8; 3] = [0x28, 0x23, 0x1D];
pub const ALARMS: u16 = 0x0010;

/// A W83781D answering at `SMBUS_ADDR` and, after `at_isa`, on ISA ports.
pub fn simulated_chip() -> MockRegisterFile {
    let chip = MockRegisterFile::new()
        .at_smbus(SMBUS_ADDR)
        .with_bank_window(registers::BANK_SELECT, &registers::BANKED)
        .with_register(registers::CHIP_ID, CHIP_ID)
        .with_register(registers::CHIP_MANUFACTURER, 0xA3)
        // fan1 div 2, fan2 div 2
        .with_register(registers::VID_FANDIV, 0x50 | VID_NIBBLE)
        .with_register(registers::CONFIG, registers::CONFIG_START)
        .with_register(registers::ALARM1, ALARMS as u8)
        .with_register(registers::ALARM2, (ALARMS >> 8) as u8);

    for (nr, raw) in IN_INPUT.into_iter().enumerate() {
        chip.set(registers::in_input(nr), raw);
    }
    for (i, raw) in FAN_INPUT.into_iter().enumerate() {
        chip.set(registers::fan_input(i + 1), raw);
    }
    chip.set(registers::TEMP, TEMP[0]);
    chip.set_banked(Bank::Bank2.value(), registers::TEMP23, TEMP[1]);
    chip.set_banked(Bank::Bank3.value(), registers::TEMP23, TEMP[2]);
    chip.clear_log();
    chip
}
