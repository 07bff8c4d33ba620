//! Register walks: the periodic refresh pass and the one-shot chip setup done at attach.

use crate::channel::TempChannel;
use crate::codec;
use crate::config::InitLimits;
use crate::device::Device;
use crate::registers::{self, Bank, FAN_COUNT, IN_COUNT};
use crate::state::RegisterFile;
use crate::{DriverError, Result};
use tracing::{debug, info};

/// Nominal rails for in2..in6, in 10 mV.
const FIXED_RAILS: [i64; 5] = [330, 500, 1200, -1200, -500];

impl Device {
    /// Reads every reported register into a fresh file. Caller holds the update lock.
    pub(crate) fn read_register_file(&self) -> Result<RegisterFile> {
        let mut regs = RegisterFile::default();

        for nr in 0..IN_COUNT {
            regs.in_input[nr] = self.read_value(registers::in_input(nr))?;
            regs.in_min[nr] = self.read_value(registers::in_min(nr))?;
            regs.in_max[nr] = self.read_value(registers::in_max(nr))?;
        }

        for nr in 1..=FAN_COUNT {
            regs.fan_input[nr - 1] = self.read_value(registers::fan_input(nr))?;
            regs.fan_min[nr - 1] = self.read_value(registers::fan_min(nr))?;
        }

        for channel in TempChannel::ALL {
            let (input, over, hyst) = channel.registers();
            let (t, o, h) = self.with_bank(channel.bank(), |dev| {
                Ok((
                    dev.read_value(input)?,
                    dev.read_value(over)?,
                    dev.read_value(hyst)?,
                ))
            })?;
            let idx = channel.index();
            regs.temp[idx] = t;
            regs.temp_over[idx] = o;
            regs.temp_hyst[idx] = h;
        }

        let vid_fandiv = self.read_value(registers::VID_FANDIV)?;
        let chip_id = self.read_value(registers::CHIP_ID)?;
        regs.vid = codec::vid_code(vid_fandiv, chip_id);
        regs.fan_div = codec::fan_divs(vid_fandiv);

        let alarm1 = self.read_value(registers::ALARM1)?;
        let alarm2 = self.read_value(registers::ALARM2)?;
        regs.alarms = codec::combine_alarms(alarm1, alarm2);

        Ok(regs)
    }

    /// Resets the chip, programs default limits and starts monitoring.
    pub(crate) fn init_chip(&self, limits: &InitLimits) -> Result<()> {
        let _guard = self.update_lock().lock();

        self.write_value(registers::CONFIG, registers::CONFIG_RESET)?;

        let vid_fandiv = self.read_value(registers::VID_FANDIV)?;
        let chip_id = self.read_value(registers::CHIP_ID)?;
        let vid = codec::vid_from_reg(codec::vid_code(vid_fandiv, chip_id));
        let core = codec::core_nominal(vid);
        debug!(addr = %self.address(), vid, core, "core rail nominal");

        let mut rails = [0i64; IN_COUNT];
        rails[0] = core;
        rails[1] = core;
        rails[2..].copy_from_slice(&FIXED_RAILS);
        for (nr, nominal) in rails.into_iter().enumerate() {
            let (low, high) = codec::limit_band(nominal, limits.in_margin_percent);
            let encode = |val| {
                codec::in_to_reg(val, nr).ok_or_else(|| DriverError::UnknownChannel(format!("in{nr}")))
            };
            self.write_value(registers::in_min(nr), encode(low)?)?;
            self.write_value(registers::in_max(nr), encode(high)?)?;
        }

        let fan_min = codec::fan_to_reg(limits.fan_min_rpm);
        for nr in 1..=FAN_COUNT {
            self.write_value(registers::fan_min(nr), fan_min)?;
        }

        let over = codec::temp_to_reg(limits.temp_over);
        let hyst = codec::temp_to_reg(limits.temp_hyst);
        self.write_value(registers::TEMP_OVER, over)?;
        self.write_value(registers::TEMP_HYST, hyst)?;

        for channel in [TempChannel::Temp2, TempChannel::Temp3] {
            self.with_bank(channel.bank(), |dev| {
                dev.write_value(registers::TEMP_OVER23, over)?;
                dev.write_value(registers::TEMP_OVER23 + 1, 0)?;
                dev.write_value(registers::TEMP_HYST23, hyst)?;
                dev.write_value(registers::TEMP_HYST23 + 1, 0)?;
                dev.write_value(registers::TEMP_CONFIG23, 0)
            })?;
        }
        self.write_value(registers::BANK_SELECT, Bank::None.value())?;

        let config = self.read_value(registers::CONFIG)?;
        self.write_value(
            registers::CONFIG,
            (config & !registers::CONFIG_INT_CLEAR) | registers::CONFIG_START,
        )?;

        info!(addr = %self.address(), "chip initialized");
        Ok(())
    }
}
