extern crate strum;
#[macro_use]
extern crate strum_macros;

extern crate packed_struct;
extern crate packed_struct_codegen;

use packed_struct::prelude::*;

#[macro_use]
extern crate bitflags;

pub const REGISTER_COUNT: usize = 8;
pub const SEGMENT_COUNT: usize = 4;

pub const MEMORY_BITS: u32 = 16;
pub const MEMORY_WORDS: usize = 1 << MEMORY_BITS;

pub const UPC_BITS: u32 = 7;
pub const UPC_MASK: u8 = (1 << UPC_BITS) - 1;
pub const UIR_BITS: u32 = 6;
pub const UIR_MASK: u8 = (1 << UIR_BITS) - 1;

pub const MICRO_ADDRESS_BITS: u32 = UIR_BITS + UPC_BITS;
pub const CONTROL_STORE_WORDS: usize = 1 << MICRO_ADDRESS_BITS;

pub const CONTROL_WORD_BITS: u32 = 40;
pub const CONTROL_WORD_BYTES: usize = 5;
pub const CONTROL_WORD_MASK: u64 = (1 << CONTROL_WORD_BITS) - 1;

/// Shift applied to the instruction register by the micro-instruction load line.
pub const MICRO_INSTRUCTION_LOAD_SHIFT: u32 = 10;
/// Shift applied to the instruction register by the decode line.
pub const DECODE_SHIFT: u32 = 11;

#[derive(Clone, Copy, Display, Debug, PartialEq, Eq, Hash)]
#[derive(EnumCount, EnumIter, EnumString)]
#[derive(PrimitiveEnum_u8)]
pub enum AluOpcode {
    Zero = 0,
    AddNotB = 1,
    AddNotA = 2,
    Add = 3,
    Xor = 4,
    Or = 5,
    And = 6,
    Ones = 7,
}

impl AluOpcode {
    pub fn from_bits(bits: u8) -> AluOpcode {
        match bits & 0b111 {
            0 => AluOpcode::Zero,
            1 => AluOpcode::AddNotB,
            2 => AluOpcode::AddNotA,
            3 => AluOpcode::Add,
            4 => AluOpcode::Xor,
            5 => AluOpcode::Or,
            6 => AluOpcode::And,
            _ => AluOpcode::Ones,
        }
    }
}

bitflags! {
    /// Control lines that exist in the word layout but have no behaviour yet.
    pub struct ReservedLines: u16 {
        const OUTPUT_WRITE = 1 << 0;
        const FLAG_WRITE = 1 << 1;
        const FLAG_SELECT_BUS = 1 << 2;
        const FLAG_READ = 1 << 3;
        const ADDRESS_MODE = 1 << 4;
        const JUMP_READ = 1 << 5;
        const INTERRUPT_ACK = 1 << 6;
        const INTERRUPT_READ = 1 << 7;
        const JUMP_SELECT = 1 << 8;
    }
}

/// Which instruction register field picks the general register.
#[derive(Clone, Copy, Display, Debug, PartialEq, Eq, Hash)]
#[derive(EnumCount, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum RegisterField {
    Destination = 0,
    Source = 1,
}

impl RegisterField {
    pub fn select(self, instruction_register: u16) -> usize {
        match self {
            RegisterField::Source => source_field(instruction_register),
            RegisterField::Destination => destination_field(instruction_register),
        }
    }
}

/// Bits 5..=7 of the instruction register.
pub fn source_field(instruction_register: u16) -> usize {
    ((instruction_register >> 5) & 0b111) as usize
}

/// Bits 8..=10 of the instruction register.
pub fn destination_field(instruction_register: u16) -> usize {
    ((instruction_register >> 8) & 0b111) as usize
}

pub fn micro_address(micro_instruction: u8, micro_pc: u8) -> u16 {
    (((micro_instruction & UIR_MASK) as u16) << UPC_BITS) | (micro_pc & UPC_MASK) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::{EnumCount, IntoEnumIterator};

    #[test]
    fn alu_opcode_bits() {
        assert_eq!(8, AluOpcode::COUNT);
        for op in AluOpcode::iter() {
            assert_eq!(op, AluOpcode::from_bits(op as u8));
            assert_eq!(op, AluOpcode::from_primitive(op as u8).unwrap());
        }
        assert_eq!(AluOpcode::Add, AluOpcode::from_bits(0b1011));
    }

    #[test]
    fn instruction_fields() {
        let ir = 0b1111_1101_0110_0000u16;
        assert_eq!(0b011, source_field(ir));
        assert_eq!(0b101, destination_field(ir));
        assert_eq!(0b011, RegisterField::Source.select(ir));
        assert_eq!(0b101, RegisterField::Destination.select(ir));
    }

    #[test]
    fn micro_address_layout() {
        assert_eq!(0, micro_address(0, 0));
        assert_eq!(0x1FFF, micro_address(63, 127));
        assert_eq!((5 << 7) | 9, micro_address(5, 9));
        assert_eq!(CONTROL_STORE_WORDS, 8192);
    }
}
