use common::*;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum AluError {
    #[error("shift left and shift right asserted together")]
    ConflictingShift,
}

/// Combinational ALU: the selected operation, then carry-in, then at most one
/// single-bit shift. Everything wraps at 16 bits.
pub fn evaluate(
    a: u16,
    b: u16,
    op: AluOpcode,
    shift_left: bool,
    shift_right: bool,
    carry_in: bool,
) -> Result<u16, AluError> {
    if shift_left && shift_right {
        return Err(AluError::ConflictingShift);
    }

    let out = match op {
        AluOpcode::Zero => 0,
        AluOpcode::AddNotB => a.wrapping_add(!b),
        AluOpcode::AddNotA => (!a).wrapping_add(b),
        AluOpcode::Add => a.wrapping_add(b),
        AluOpcode::Xor => a ^ b,
        AluOpcode::Or => a | b,
        AluOpcode::And => a & b,
        AluOpcode::Ones => 0xFFFF,
    };

    let out = out.wrapping_add(carry_in as u16);

    Ok(if shift_left {
        out << 1
    } else if shift_right {
        out >> 1
    } else {
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use strum::IntoEnumIterator;

    fn plain(a: u16, b: u16, op: AluOpcode) -> u16 {
        evaluate(a, b, op, false, false, false).unwrap()
    }

    #[test]
    fn table() {
        assert_eq!(0x0000, plain(0x1234, 0x5678, AluOpcode::Zero));
        assert_eq!(0x1234u16.wrapping_add(!0x5678), plain(0x1234, 0x5678, AluOpcode::AddNotB));
        assert_eq!((!0x1234u16).wrapping_add(0x5678), plain(0x1234, 0x5678, AluOpcode::AddNotA));
        assert_eq!(0x68AC, plain(0x1234, 0x5678, AluOpcode::Add));
        assert_eq!(0x444C, plain(0x1234, 0x5678, AluOpcode::Xor));
        assert_eq!(0x567C, plain(0x1234, 0x5678, AluOpcode::Or));
        assert_eq!(0x1230, plain(0x1234, 0x5678, AluOpcode::And));
        assert_eq!(0xFFFF, plain(0x1234, 0x5678, AluOpcode::Ones));
    }

    #[test]
    fn add_wraps() {
        assert_eq!(0x0001, plain(0xFFFF, 0x0002, AluOpcode::Add));
        assert_eq!(0x0000, evaluate(0xFFFF, 0x0000, AluOpcode::Add, false, false, true).unwrap());
    }

    #[test]
    fn subtract_with_carry() {
        // a + !b + 1 == a - b
        assert_eq!(0x0002, evaluate(0x0005, 0x0003, AluOpcode::AddNotB, false, false, true).unwrap());
        assert_eq!(0xFFFE, evaluate(0x0003, 0x0005, AluOpcode::AddNotB, false, false, true).unwrap());
        // !a + b + 1 == b - a
        assert_eq!(0x0002, evaluate(0x0003, 0x0005, AluOpcode::AddNotA, false, false, true).unwrap());
    }

    #[test]
    fn carry_before_shift() {
        assert_eq!(0x0012, evaluate(0x0005, 0x0003, AluOpcode::Add, true, false, true).unwrap());
        assert_eq!(0x0004, evaluate(0x0005, 0x0003, AluOpcode::Add, false, true, true).unwrap());
        assert_eq!(0xFFFE, evaluate(0, 0, AluOpcode::Ones, true, false, false).unwrap());
        assert_eq!(0x7FFF, evaluate(0, 0, AluOpcode::Ones, false, true, false).unwrap());
        assert_eq!(0x0000, evaluate(0, 0, AluOpcode::Ones, true, false, true).unwrap());
    }

    #[test]
    fn conflicting_shift() {
        for op in AluOpcode::iter() {
            assert_eq!(Err(AluError::ConflictingShift), evaluate(1, 2, op, true, true, false));
            assert_eq!(Err(AluError::ConflictingShift), evaluate(1, 2, op, true, true, true));
        }
    }

    fn reference(a: u16, b: u16, op: u8) -> u16 {
        let (a, b) = (a as u32, b as u32);
        let out = match op {
            0 => 0,
            1 => a + (b ^ 0xFFFF),
            2 => (a ^ 0xFFFF) + b,
            3 => a + b,
            4 => a ^ b,
            5 => a | b,
            6 => a & b,
            _ => 0xFFFF,
        };
        (out % 0x1_0000) as u16
    }

    proptest! {
        #[test]
        fn matches_reference(a: u16, b: u16, op in 0u8..8) {
            prop_assert_eq!(reference(a, b, op), plain(a, b, AluOpcode::from_bits(op)));
        }

        #[test]
        fn shift_exclusive(a: u16, b: u16, op in 0u8..8, carry_in: bool) {
            prop_assert_eq!(
                Err(AluError::ConflictingShift),
                evaluate(a, b, AluOpcode::from_bits(op), true, true, carry_in));
        }
    }
}
