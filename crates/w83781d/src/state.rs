use crate::channel::Channel;
use crate::codec;
use crate::{DriverError, Result};
use crate::registers::{FAN_COUNT, IN_COUNT, TEMP_COUNT};
use std::time::Duration;

/// Raw copy of every register the driver reports.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RegisterFile {
    pub in_input: [u8; IN_COUNT],
    pub in_min: [u8; IN_COUNT],
    pub in_max: [u8; IN_COUNT],
    pub fan_input: [u8; FAN_COUNT],
    pub fan_min: [u8; FAN_COUNT],
    pub temp: [u8; TEMP_COUNT],
    pub temp_over: [u8; TEMP_COUNT],
    pub temp_hyst: [u8; TEMP_COUNT],
    /// Divisor codes for fan1 and fan2; fan3 is fixed at 2.
    pub fan_div: [u8; 2],
    /// 5-bit VID code.
    pub vid: u8,
    pub alarms: u16,
}

impl RegisterFile {
    /// Physical values of one channel, in the order `Channel::fields` names them.
    pub fn values(&self, channel: Channel) -> Result<Vec<i64>> {
        let unknown = || DriverError::UnknownChannel(channel.to_string());
        let values = match channel {
            Channel::In(nr) => {
                let nr = usize::from(nr);
                let volts = |raws: &[u8; IN_COUNT]| {
                    raws.get(nr)
                        .and_then(|&raw| codec::in_from_reg(raw, nr))
                        .ok_or_else(unknown)
                };
                vec![volts(&self.in_min)?, volts(&self.in_max)?, volts(&self.in_input)?]
            }
            Channel::Fan(nr) => {
                let idx = usize::from(nr)
                    .checked_sub(1)
                    .filter(|&i| i < FAN_COUNT)
                    .ok_or_else(unknown)?;
                vec![
                    codec::fan_from_reg(self.fan_min[idx]),
                    codec::fan_from_reg(self.fan_input[idx]),
                ]
            }
            Channel::Temp(t) => {
                let idx = t.index();
                vec![
                    codec::temp_from_reg(self.temp_over[idx]),
                    codec::temp_from_reg(self.temp_hyst[idx]),
                    codec::temp_from_reg(self.temp[idx]),
                ]
            }
            Channel::Vid => vec![codec::vid_from_reg(self.vid)],
            Channel::FanDiv => vec![
                codec::div_from_reg(self.fan_div[0]),
                codec::div_from_reg(self.fan_div[1]),
                2,
            ],
            Channel::Alarms => vec![codec::alarms_from_reg(self.alarms)],
        };
        Ok(values)
    }
}

/// Cache validity relative to the sampling window.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Freshness {
    /// No successful refresh yet.
    Invalid,
    Fresh,
    Stale,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CachedState {
    pub registers: RegisterFile,
    pub valid: bool,
    pub last_refreshed: Duration,
}

impl CachedState {
    pub fn freshness(&self, now: Duration, interval: Duration) -> Freshness {
        if !self.valid {
            Freshness::Invalid
        } else if now < self.last_refreshed {
            // time went backwards; the stamp cannot be trusted
            Freshness::Stale
        } else if now - self.last_refreshed > interval {
            Freshness::Stale
        } else {
            Freshness::Fresh
        }
    }

    pub fn needs_refresh(&self, now: Duration, interval: Duration) -> bool {
        self.freshness(now, interval) != Freshness::Fresh
    }
}
