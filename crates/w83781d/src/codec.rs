//! Conversions between W83781D register encodings and physical units.
//!
//! Physical values are plain integers scaled by the channel's magnitude: voltages and
//! VID in 10 mV steps, temperatures in tenths of a degree Celsius, fans in RPM.
//! Only the `*_to_reg` directions round.

use crate::registers::IN_COUNT;

/// Per-input scale factors of the voltage dividers. Inputs 5 and 6 sit behind
/// inverting amplifiers.
pub const IN_SCALE: [i64; IN_COUNT] = [10000, 10000, 10000, 16892, 38000, -34768, -15050];

const FAN_CLOCK: i64 = 1_350_000;

/// `None` when `nr` is not one of the seven voltage inputs.
pub fn in_from_reg(raw: u8, nr: usize) -> Option<i64> {
    let scale = *IN_SCALE.get(nr)?;
    Some(i64::from(raw) * 16 * scale / 100_000)
}

pub fn in_to_reg(val: i64, nr: usize) -> Option<u8> {
    let scale = *IN_SCALE.get(nr)?;
    let steps = (val.saturating_mul(100_000) / scale + 8) / 16;
    Some(steps.clamp(0, 255) as u8)
}

/// `-1` means the counter has no reading yet; `0` means the fan is stopped or too slow.
pub fn fan_from_reg(raw: u8) -> i64 {
    match raw {
        0 => -1,
        255 => 0,
        count => FAN_CLOCK / (i64::from(count) * 2),
    }
}

pub fn fan_to_reg(rpm: i64) -> u8 {
    if rpm <= 0 {
        return 255;
    }
    let count = FAN_CLOCK.saturating_add(rpm) / rpm.saturating_mul(2);
    count.clamp(1, 255) as u8
}

pub fn temp_from_reg(raw: u8) -> i64 {
    let deg = i64::from(raw);
    let deg = if deg > 0x80 { deg - 0x100 } else { deg };
    deg * 10
}

pub fn temp_to_reg(tenths: i64) -> u8 {
    let deg = if tenths < 0 {
        tenths.saturating_sub(5) / 10
    } else {
        tenths.saturating_add(5) / 10
    };
    (deg & 0xFF) as u8
}

/// Decode a 5-bit VRM 8.x code into 10 mV steps. `0` means no CPU or a reserved code.
pub fn vid_from_reg(code: u8) -> i64 {
    let code = i64::from(code & 0x1F);
    match code {
        0x1F => 0,
        0x10..=0x1E => 510 - code * 10,
        0x06..=0x0F => 0,
        _ => 205 - code * 5,
    }
}

pub fn div_from_reg(raw: u8) -> i64 {
    1 << (raw & 0x03)
}

pub fn div_to_reg(div: i64) -> u8 {
    match div {
        8 => 3,
        4 => 2,
        1 => 0,
        _ => 1,
    }
}

pub fn alarms_from_reg(raw: u16) -> i64 {
    i64::from(raw)
}

/// Low nibble of VID_FANDIV plus the VID4 strap from bit 0 of the chip-id register.
pub fn vid_code(vid_fandiv: u8, chip_id: u8) -> u8 {
    (vid_fandiv & 0x0F) | ((chip_id & 0x01) << 4)
}

pub fn fan_divs(vid_fandiv: u8) -> [u8; 2] {
    [(vid_fandiv >> 4) & 0x03, vid_fandiv >> 6]
}

/// Replace fan divisor field `index` (0 or 1) of a VID_FANDIV value.
pub fn with_fan_div(vid_fandiv: u8, index: usize, code: u8) -> u8 {
    let code = code & 0x03;
    if index == 0 {
        (vid_fandiv & 0xCF) | (code << 4)
    } else {
        (vid_fandiv & 0x3F) | (code << 6)
    }
}

pub fn combine_alarms(alarm1: u8, alarm2: u8) -> u16 {
    u16::from(alarm1) | (u16::from(alarm2) << 8)
}

/// Symmetric `nominal ± percent` band, truncating like the rest of the codec.
pub fn limit_band(nominal: i64, percent: i64) -> (i64, i64) {
    let margin = nominal.saturating_mul(percent) / 100;
    (nominal.saturating_sub(margin), nominal.saturating_add(margin))
}

/// Nominal core rail for in0/in1. A 3.50 V VID is the strap default on boards
/// that do not drive the pins, so those fall back to 2.80 V.
pub fn core_nominal(vid: i64) -> i64 {
    if vid == 350 {
        280
    } else {
        vid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voltage_rounds_to_nearest_step() {
        // 2.80 V on in0 is 175 steps of 16 mV
        assert_eq!(in_to_reg(280, 0), Some(175));
        assert_eq!(in_from_reg(175, 0), Some(280));
        // halfway between steps rounds up
        assert_eq!(in_to_reg(281, 0), Some(176));
    }

    #[test]
    fn voltage_clamps_to_byte() {
        assert_eq!(in_to_reg(10_000, 0), Some(255));
        assert_eq!(in_to_reg(-10_000, 0), Some(0));
        assert_eq!(in_to_reg(i64::MAX, 0), Some(255));
        // a positive value on an inverted input has no encoding
        assert_eq!(in_to_reg(500, 5), Some(0));
    }

    #[test]
    fn negative_rails_decode_negative() {
        assert!(in_from_reg(200, 5).unwrap() < 0);
        assert!(in_from_reg(200, 6).unwrap() < 0);
        assert_eq!(in_to_reg(in_from_reg(200, 5).unwrap(), 5), Some(200));
    }

    #[test]
    fn fan_sentinels() {
        assert_eq!(fan_from_reg(0), -1);
        assert_eq!(fan_from_reg(255), 0);
        assert_eq!(fan_to_reg(0), 255);
        assert_eq!(fan_to_reg(-20), 255);
        assert_eq!(fan_from_reg(225), 3000);
        assert_eq!(fan_to_reg(3000), 225);
    }

    #[test]
    fn fan_extremes_clamp() {
        assert_eq!(fan_to_reg(1), 255);
        assert_eq!(fan_to_reg(10_000_000), 1);
        assert_eq!(fan_to_reg(i64::MAX), 1);
    }

    #[test]
    fn temperature_sign_and_rounding() {
        assert_eq!(temp_from_reg(0x3C), 600);
        assert_eq!(temp_from_reg(0xFF), -10);
        assert_eq!(temp_from_reg(0x80), 1280);
        assert_eq!(temp_to_reg(600), 0x3C);
        assert_eq!(temp_to_reg(604), 0x3C);
        assert_eq!(temp_to_reg(605), 0x3D);
        assert_eq!(temp_to_reg(-15), 0xFE);
        assert_eq!(temp_to_reg(-14), 0xFF);
    }

    #[test]
    fn vid_table() {
        assert_eq!(vid_from_reg(0x1F), 0);
        assert_eq!(vid_from_reg(0x10), 350);
        assert_eq!(vid_from_reg(0x1E), 210);
        assert_eq!(vid_from_reg(0x06), 0);
        assert_eq!(vid_from_reg(0x0F), 0);
        assert_eq!(vid_from_reg(0x00), 205);
        assert_eq!(vid_from_reg(0x05), 180);
    }

    #[test]
    fn divisor_codes() {
        assert_eq!(div_from_reg(div_to_reg(8)), 8);
        assert_eq!(div_from_reg(div_to_reg(4)), 4);
        assert_eq!(div_from_reg(div_to_reg(1)), 1);
        assert_eq!(div_from_reg(div_to_reg(2)), 2);
        assert_eq!(div_to_reg(3), 1);
        assert_eq!(div_to_reg(0), 1);
    }

    #[test]
    fn packed_vid_fandiv() {
        // div1 code 2, div2 code 3, vid nibble 0x5, strap bit set
        let reg = 0b1110_0101;
        assert_eq!(vid_code(reg, 0x21), 0x15);
        assert_eq!(vid_code(reg, 0x20), 0x05);
        assert_eq!(fan_divs(reg), [2, 3]);
        assert_eq!(with_fan_div(reg, 0, 0), 0b1100_0101);
        assert_eq!(with_fan_div(reg, 1, 1), 0b0110_0101);
    }

    #[test]
    fn alarms_are_little_endian() {
        assert_eq!(combine_alarms(0x01, 0x80), 0x8001);
        assert_eq!(alarms_from_reg(0x8001), 0x8001);
    }

    #[test]
    fn init_bands() {
        assert_eq!(limit_band(330, 10), (297, 363));
        assert_eq!(limit_band(-1200, 10), (-1080, -1320));
        assert_eq!(core_nominal(350), 280);
        assert_eq!(core_nominal(205), 205);
    }

    #[test]
    fn unknown_voltage_input_has_no_encoding() {
        assert_eq!(in_from_reg(100, IN_COUNT), None);
        assert_eq!(in_to_reg(100, usize::MAX), None);
    }

    #[test]
    fn huge_margin_saturates() {
        let m = i64::MAX / 100;
        assert_eq!(limit_band(330, i64::MAX), (330 - m, 330 + m));
        let (low, high) = limit_band(-1200, i64::MAX);
        assert!(low > 0 && high < 0);
    }
}
