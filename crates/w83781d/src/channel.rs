use crate::registers::{self, Bank, FAN_COUNT, IN_COUNT};
use crate::DriverError;
use core::fmt;
use core::str::FromStr;

/// The three temperature inputs. `Temp1` has dedicated registers, the other two
/// share the banked window.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TempChannel {
    Temp1,
    Temp2,
    Temp3,
}

impl TempChannel {
    pub const ALL: [TempChannel; 3] = [TempChannel::Temp1, TempChannel::Temp2, TempChannel::Temp3];

    pub fn index(self) -> usize {
        match self {
            TempChannel::Temp1 => 0,
            TempChannel::Temp2 => 1,
            TempChannel::Temp3 => 2,
        }
    }

    pub fn is_banked(self) -> bool {
        !matches!(self, TempChannel::Temp1)
    }

    /// Bank that maps this channel into the shared window.
    pub fn bank(self) -> Bank {
        match self {
            TempChannel::Temp1 => Bank::None,
            TempChannel::Temp2 => Bank::Bank2,
            TempChannel::Temp3 => Bank::Bank3,
        }
    }

    /// (input, over, hyst) register addresses as seen with `bank()` selected.
    pub fn registers(self) -> (u8, u8, u8) {
        if self.is_banked() {
            (registers::TEMP23, registers::TEMP_OVER23, registers::TEMP_HYST23)
        } else {
            (registers::TEMP, registers::TEMP_OVER, registers::TEMP_HYST)
        }
    }
}

/// One accessor of the chip, named like its sensor file.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Channel {
    /// Voltage input, 0..=6.
    In(u8),
    /// Fan input, 1..=3.
    Fan(u8),
    Temp(TempChannel),
    Vid,
    FanDiv,
    Alarms,
}

impl Channel {
    pub fn voltage(nr: u8) -> Option<Self> {
        (usize::from(nr) < IN_COUNT).then_some(Channel::In(nr))
    }

    pub fn fan(nr: u8) -> Option<Self> {
        (1..=FAN_COUNT).contains(&usize::from(nr)).then_some(Channel::Fan(nr))
    }

    /// Every channel in sensor-file order.
    pub fn all() -> Vec<Channel> {
        let mut out = Vec::with_capacity(IN_COUNT + FAN_COUNT + 6);
        out.extend((0..IN_COUNT as u8).map(Channel::In));
        out.extend((1..=FAN_COUNT as u8).map(Channel::Fan));
        out.extend(TempChannel::ALL.into_iter().map(Channel::Temp));
        out.extend([Channel::Vid, Channel::FanDiv, Channel::Alarms]);
        out
    }

    /// Rejects out-of-range indices built directly from the enum variants.
    pub fn validate(self) -> Result<Self, DriverError> {
        match self {
            Channel::In(nr) if usize::from(nr) >= IN_COUNT => {
                Err(DriverError::UnknownChannel(format!("in{nr}")))
            }
            Channel::Fan(nr) if nr == 0 || usize::from(nr) > FAN_COUNT => {
                Err(DriverError::UnknownChannel(format!("fan{nr}")))
            }
            ok => Ok(ok),
        }
    }

    /// Power of ten the reported integers are scaled by.
    pub fn magnitude(self) -> u32 {
        match self {
            Channel::In(_) | Channel::Vid => 2,
            Channel::Temp(_) => 1,
            Channel::Fan(_) | Channel::FanDiv | Channel::Alarms => 0,
        }
    }

    /// Names of the values `read` returns, in order.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Channel::In(_) => &["min", "max", "input"],
            Channel::Fan(_) => &["min", "input"],
            Channel::Temp(_) => &["over", "hyst", "input"],
            Channel::Vid => &["vid"],
            Channel::FanDiv => &["fan1_div", "fan2_div", "fan3_div"],
            Channel::Alarms => &["alarms"],
        }
    }

    /// How many leading fields `write` accepts.
    pub fn writable_fields(self) -> usize {
        match self {
            Channel::In(_) | Channel::Temp(_) | Channel::FanDiv => 2,
            Channel::Fan(_) => 1,
            Channel::Vid | Channel::Alarms => 0,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::In(nr) => write!(f, "in{nr}"),
            Channel::Fan(nr) => write!(f, "fan{nr}"),
            Channel::Temp(TempChannel::Temp1) => f.write_str("temp"),
            Channel::Temp(TempChannel::Temp2) => f.write_str("temp2"),
            Channel::Temp(TempChannel::Temp3) => f.write_str("temp3"),
            Channel::Vid => f.write_str("vid"),
            Channel::FanDiv => f.write_str("fan_div"),
            Channel::Alarms => f.write_str("alarms"),
        }
    }
}

impl FromStr for Channel {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        let unknown = || DriverError::UnknownChannel(t.to_string());
        match t {
            "temp" | "temp1" => return Ok(Channel::Temp(TempChannel::Temp1)),
            "temp2" => return Ok(Channel::Temp(TempChannel::Temp2)),
            "temp3" => return Ok(Channel::Temp(TempChannel::Temp3)),
            "vid" => return Ok(Channel::Vid),
            "fan_div" => return Ok(Channel::FanDiv),
            "alarms" => return Ok(Channel::Alarms),
            _ => {}
        }
        if let Some(n) = t.strip_prefix("in") {
            let nr = n.parse::<u8>().map_err(|_| unknown())?;
            return Channel::voltage(nr).ok_or_else(unknown);
        }
        if let Some(n) = t.strip_prefix("fan") {
            let nr = n.parse::<u8>().map_err(|_| unknown())?;
            return Channel::fan(nr).ok_or_else(unknown);
        }
        Err(unknown())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for ch in Channel::all() {
            let parsed: Channel = ch.to_string().parse().unwrap();
            assert_eq!(parsed, ch);
        }
        assert_eq!(Channel::all().len(), 16);
    }

    #[test]
    fn temp1_alias() {
        assert_eq!(
            "temp1".parse::<Channel>().unwrap(),
            Channel::Temp(TempChannel::Temp1)
        );
    }

    #[test]
    fn rejects_unknown_names() {
        for bad in ["in7", "fan0", "fan4", "temp4", "volts", "in", "fan-1"] {
            assert!(matches!(
                bad.parse::<Channel>(),
                Err(DriverError::UnknownChannel(_))
            ));
        }
    }

    #[test]
    fn validate_catches_raw_variants() {
        assert!(Channel::In(7).validate().is_err());
        assert!(Channel::Fan(0).validate().is_err());
        assert!(Channel::Fan(3).validate().is_ok());
    }

    #[test]
    fn magnitudes() {
        assert_eq!(Channel::In(0).magnitude(), 2);
        assert_eq!(Channel::Fan(1).magnitude(), 0);
        assert_eq!(Channel::Temp(TempChannel::Temp2).magnitude(), 1);
        assert_eq!(Channel::Vid.magnitude(), 2);
        assert_eq!(Channel::FanDiv.magnitude(), 0);
        assert_eq!(Channel::Alarms.magnitude(), 0);
    }
}
