//! Property tests for the register codec.

use proptest::prelude::*;
use w83781d::codec::*;
use w83781d::registers::IN_COUNT;

proptest! {
    #[test]
    fn temp_byte_round_trips(raw in any::<u8>()) {
        prop_assert_eq!(temp_to_reg(temp_from_reg(raw)), raw);
    }

    #[test]
    fn voltage_byte_round_trips(raw in any::<u8>(), nr in 0..IN_COUNT) {
        let volts = in_from_reg(raw, nr).unwrap();
        prop_assert_eq!(in_to_reg(volts, nr), Some(raw));
    }

    /// Any physical value encodes without overflow, and encoding follows the sign
    /// of the divider scale.
    #[test]
    fn voltage_encode_is_monotone(a in any::<i64>(), b in any::<i64>(), nr in 0..IN_COUNT) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        if IN_SCALE[nr] > 0 {
            prop_assert!(in_to_reg(lo, nr).unwrap() <= in_to_reg(hi, nr).unwrap());
        } else {
            prop_assert!(in_to_reg(lo, nr).unwrap() >= in_to_reg(hi, nr).unwrap());
        }
    }

    #[test]
    fn fan_count_survives_decode_encode(raw in 1u8..=254) {
        prop_assert_eq!(fan_to_reg(fan_from_reg(raw)), raw);
    }

    #[test]
    fn fan_encode_never_yields_zero(rpm in any::<i64>()) {
        prop_assert!(fan_to_reg(rpm) >= 1);
    }

    #[test]
    fn fan_divisor_fields_are_independent(reg in any::<u8>(), index in 0usize..2, code in 0u8..4) {
        let updated = with_fan_div(reg, index, code);
        let before = fan_divs(reg);
        let after = fan_divs(updated);
        prop_assert_eq!(after[index], code);
        prop_assert_eq!(after[1 - index], before[1 - index]);
        prop_assert_eq!(updated & 0x0F, reg & 0x0F);
    }

    #[test]
    fn vid_decode_is_bounded(code in any::<u8>()) {
        let vid = vid_from_reg(code);
        prop_assert!((0..=350).contains(&vid));
    }
}

#[test]
fn known_points() {
    assert_eq!(in_to_reg(280, 0), Some(175));
    assert_eq!(in_from_reg(175, 0), Some(280));
    assert_eq!(in_to_reg(280, IN_COUNT), None);
    assert_eq!(fan_from_reg(0), -1);
    assert_eq!(fan_from_reg(255), 0);
    assert_eq!(fan_to_reg(0), 255);
    assert_eq!(temp_from_reg(0xFF), -10);
    assert_eq!(vid_from_reg(0x10), 350);
    assert_eq!(vid_from_reg(0x1F), 0);
    assert_eq!(vid_from_reg(0x00), 205);
    assert_eq!(div_to_reg(8), 3);
    assert_eq!(div_to_reg(3), 1);
    assert_eq!(div_from_reg(0x07), 8);
}
