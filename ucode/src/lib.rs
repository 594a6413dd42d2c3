extern crate strum;
#[macro_use]
extern crate strum_macros;

extern crate packed_struct;
extern crate packed_struct_codegen;
use packed_struct::prelude::*;
use packed_struct::PackingResult;

use std::fmt;

use common::*;

pub mod image;
pub mod program;

pub use image::*;
pub use program::*;

/// One 40-bit word of the control store.
///
/// Fields prefixed with `n_` are active-low: the line is asserted when the
/// bit is 0. Use the accessor methods rather than the raw fields to ask
/// whether a line is asserted.
#[derive(Clone, Copy, Debug)]
#[derive(PackedStruct)]
#[packed_struct(size_bytes = "5", endian = "lsb", bit_numbering = "lsb0")]
pub struct ControlWord {
    #[packed_field(bits = "0")]
    pub n_micro_instruction_write: bool,
    #[packed_field(bits = "1")]
    pub n_output_write: bool,
    #[packed_field(bits = "2")]
    pub n_memory_read: bool,
    #[packed_field(bits = "3")]
    pub n_memory_write: bool,
    #[packed_field(bits = "4")]
    pub n_mar_write: bool,
    #[packed_field(bits = "6")]
    pub n_segment_enable: bool,
    #[packed_field(bits = "7")]
    pub segment_write: bool,
    #[packed_field(bits = "8")]
    pub n_register_enable: bool,
    #[packed_field(bits = "9")]
    pub register_write: bool,
    #[packed_field(bits = "10")]
    pub n_flag_write: bool,
    #[packed_field(bits = "11")]
    pub flag_select_bus: bool,
    #[packed_field(bits = "12")]
    pub n_flag_read: bool,
    #[packed_field(bits = "13")]
    pub n_alu_b_write: bool,
    #[packed_field(bits = "14")]
    pub n_alu_a_write: bool,
    #[packed_field(bits = "15")]
    pub shift_right: bool,
    #[packed_field(bits = "16")]
    pub shift_left: bool,
    #[packed_field(bits = "17..=19", ty = "enum")]
    pub alu_opcode: AluOpcode,
    #[packed_field(bits = "20")]
    pub n_alu_result_enable: bool,
    #[packed_field(bits = "21")]
    pub carry_in: bool,
    #[packed_field(bits = "22..=23")]
    pub address_mode: Integer<u8, packed_bits::Bits::<2>>,
    #[packed_field(bits = "24")]
    pub register_select_source: bool,
    #[packed_field(bits = "25")]
    pub n_jump_read: bool,
    #[packed_field(bits = "26")]
    pub interrupt_ack: bool,
    #[packed_field(bits = "27")]
    pub n_interrupt_read: bool,
    #[packed_field(bits = "28")]
    pub halt: bool,
    #[packed_field(bits = "29")]
    pub n_decode_read: bool,
    #[packed_field(bits = "31")]
    pub n_micro_pc_clear: bool,
    #[packed_field(bits = "32..=35")]
    pub jump_select: Integer<u8, packed_bits::Bits::<4>>,
    #[packed_field(bits = "36..=37")]
    pub segment_select: Integer<u8, packed_bits::Bits::<2>>,
    #[packed_field(bits = "38")]
    pub instruction_register_write: bool,
}

/// Raw value of a word that asserts nothing.
pub const IDLE_WORD: u64 = 0xAA10_755F;

/// Whether an enabled register or segment bank drives the bus or latches from it.
#[derive(Clone, Copy, Display, Debug, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Drive,
    Latch,
}

/// The component a word puts on the bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Output {
    Memory,
    Segment(u8),
    Register(RegisterField),
    Alu(AluOpcode),
}

/// A component that latches the bus at the end of the cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Load {
    Mar,
    Memory,
    Segment(u8),
    Register(RegisterField),
    AluA,
    AluB,
    InstructionRegister,
}

impl ControlWord {
    pub fn idle() -> ControlWord {
        ControlWord {
            n_micro_instruction_write: true,
            n_output_write: true,
            n_memory_read: true,
            n_memory_write: true,
            n_mar_write: true,
            n_segment_enable: true,
            segment_write: false,
            n_register_enable: true,
            register_write: false,
            n_flag_write: true,
            flag_select_bus: false,
            n_flag_read: true,
            n_alu_b_write: true,
            n_alu_a_write: true,
            shift_right: false,
            shift_left: false,
            alu_opcode: AluOpcode::Zero,
            n_alu_result_enable: true,
            carry_in: false,
            address_mode: 0.into(),
            register_select_source: false,
            n_jump_read: true,
            interrupt_ack: false,
            n_interrupt_read: true,
            halt: false,
            n_decode_read: true,
            n_micro_pc_clear: true,
            jump_select: 0.into(),
            segment_select: 0.into(),
            instruction_register_write: false,
        }
    }

    /// Builds a word with one bus driver and any number of loads.
    ///
    /// Panics on combinations the data path cannot express, such as a
    /// segment register driving and latching in the same word.
    pub fn create(out: Option<Output>, loads: &[Load]) -> ControlWord {
        let mut word = ControlWord::idle();

        match out {
            Some(Output::Memory) => word.n_memory_read = false,
            Some(Output::Segment(index)) => {
                word.n_segment_enable = false;
                word.segment_write = false;
                word.segment_select = (index & 0b11).into();
            }
            Some(Output::Register(field)) => {
                word.n_register_enable = false;
                word.register_write = false;
                word.register_select_source = field == RegisterField::Source;
            }
            Some(Output::Alu(op)) => {
                word.n_alu_result_enable = false;
                word.alu_opcode = op;
            }
            None => {}
        }

        for load in loads {
            match *load {
                Load::Mar => word.n_mar_write = false,
                Load::Memory => {
                    assert_ne!(out, Some(Output::Memory), "memory cannot drive and latch the bus at once");
                    word.n_memory_write = false;
                }
                Load::Segment(index) => {
                    assert!(
                        word.n_segment_enable,
                        "segment bank is already in use by this word");
                    word.n_segment_enable = false;
                    word.segment_write = true;
                    word.segment_select = (index & 0b11).into();
                }
                Load::Register(field) => {
                    assert!(
                        word.n_register_enable,
                        "register bank is already in use by this word");
                    word.n_register_enable = false;
                    word.register_write = true;
                    word.register_select_source = field == RegisterField::Source;
                }
                Load::AluA => word.n_alu_a_write = false,
                Load::AluB => word.n_alu_b_write = false,
                Load::InstructionRegister => word.instruction_register_write = true,
            }
        }

        word
    }

    pub fn with_carry(mut self) -> ControlWord {
        self.carry_in = true;
        self
    }

    pub fn with_shift_left(mut self) -> ControlWord {
        self.shift_left = true;
        self
    }

    pub fn with_shift_right(mut self) -> ControlWord {
        self.shift_right = true;
        self
    }

    pub fn with_halt(mut self) -> ControlWord {
        self.halt = true;
        self
    }

    pub fn with_micro_instruction_load(mut self) -> ControlWord {
        self.n_micro_instruction_write = false;
        self
    }

    pub fn with_decode(mut self) -> ControlWord {
        self.n_decode_read = false;
        self
    }

    pub fn with_micro_pc_clear(mut self) -> ControlWord {
        self.n_micro_pc_clear = false;
        self
    }

    pub fn from_raw(raw: u64) -> PackingResult<ControlWord> {
        let b = raw.to_le_bytes();
        ControlWord::unpack(&[b[4], b[3], b[2], b[1], b[0]])
    }

    pub fn to_raw(&self) -> PackingResult<u64> {
        let b = self.pack()?;
        Ok(u64::from_le_bytes([b[4], b[3], b[2], b[1], b[0], 0, 0, 0]))
    }

    pub fn micro_instruction_load(&self) -> bool {
        !self.n_micro_instruction_write
    }

    pub fn memory_read(&self) -> bool {
        !self.n_memory_read
    }

    pub fn memory_write(&self) -> bool {
        !self.n_memory_write
    }

    pub fn mar_write(&self) -> bool {
        !self.n_mar_write
    }

    pub fn segment(&self) -> Option<(usize, Direction)> {
        if self.n_segment_enable {
            None
        } else {
            let direction = if self.segment_write { Direction::Latch } else { Direction::Drive };
            Some((*self.segment_select as usize, direction))
        }
    }

    pub fn register(&self) -> Option<(RegisterField, Direction)> {
        if self.n_register_enable {
            None
        } else {
            let direction = if self.register_write { Direction::Latch } else { Direction::Drive };
            Some((self.register_field(), direction))
        }
    }

    pub fn register_field(&self) -> RegisterField {
        if self.register_select_source {
            RegisterField::Source
        } else {
            RegisterField::Destination
        }
    }

    pub fn alu_a_write(&self) -> bool {
        !self.n_alu_a_write
    }

    pub fn alu_b_write(&self) -> bool {
        !self.n_alu_b_write
    }

    pub fn alu_result_enabled(&self) -> bool {
        !self.n_alu_result_enable
    }

    pub fn decode_read(&self) -> bool {
        !self.n_decode_read
    }

    pub fn micro_pc_clear(&self) -> bool {
        !self.n_micro_pc_clear
    }

    /// Reserved lines this word asserts. None of them have behaviour.
    pub fn reserved_lines(&self) -> ReservedLines {
        let mut lines = ReservedLines::empty();
        lines.set(ReservedLines::OUTPUT_WRITE, !self.n_output_write);
        lines.set(ReservedLines::FLAG_WRITE, !self.n_flag_write);
        lines.set(ReservedLines::FLAG_SELECT_BUS, self.flag_select_bus);
        lines.set(ReservedLines::FLAG_READ, !self.n_flag_read);
        lines.set(ReservedLines::ADDRESS_MODE, *self.address_mode != 0);
        lines.set(ReservedLines::JUMP_READ, !self.n_jump_read);
        lines.set(ReservedLines::INTERRUPT_ACK, self.interrupt_ack);
        lines.set(ReservedLines::INTERRUPT_READ, !self.n_interrupt_read);
        lines.set(ReservedLines::JUMP_SELECT, *self.jump_select != 0);
        lines
    }
}

impl Default for ControlWord {
    fn default() -> Self {
        ControlWord::idle()
    }
}

/// Listing of the lines a word asserts, e.g. `seg1->bus bus->mar`.
pub struct Disassembly<'a>(&'a ControlWord);

impl ControlWord {
    pub fn disassemble(&self) -> Disassembly<'_> {
        Disassembly(self)
    }
}

impl<'a> fmt::Display for Disassembly<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = self.0;
        let mut parts = Vec::new();

        if word.memory_read() {
            parts.push("mem->bus".to_string());
        }
        match word.segment() {
            Some((index, Direction::Drive)) => parts.push(format!("seg{}->bus", index)),
            Some((index, Direction::Latch)) => parts.push(format!("bus->seg{}", index)),
            None => {}
        }
        match word.register() {
            Some((field, Direction::Drive)) => parts.push(format!("reg[{}]->bus", field)),
            Some((field, Direction::Latch)) => parts.push(format!("bus->reg[{}]", field)),
            None => {}
        }
        if word.alu_result_enabled() {
            parts.push(format!("alu:{}->bus", word.alu_opcode));
        }
        if word.mar_write() {
            parts.push("bus->mar".to_string());
        }
        if word.memory_write() {
            parts.push("bus->mem".to_string());
        }
        if word.alu_a_write() {
            parts.push("bus->alu_a".to_string());
        }
        if word.alu_b_write() {
            parts.push("bus->alu_b".to_string());
        }
        if word.instruction_register_write {
            parts.push("bus->ir".to_string());
        }
        if word.carry_in {
            parts.push("cin".to_string());
        }
        if word.shift_left {
            parts.push("shl".to_string());
        }
        if word.shift_right {
            parts.push("shr".to_string());
        }
        if word.micro_instruction_load() {
            parts.push(format!("uir<-ir>>{}", MICRO_INSTRUCTION_LOAD_SHIFT));
        }
        if word.decode_read() {
            parts.push(format!("uir<-ir>>{}", DECODE_SHIFT));
        }
        if word.micro_pc_clear() {
            parts.push("upc<-0".to_string());
        }
        if word.halt {
            parts.push("halt".to_string());
        }
        let reserved = word.reserved_lines();
        if !reserved.is_empty() {
            parts.push(format!("reserved[{:?}]", reserved));
        }

        if parts.is_empty() {
            write!(f, "idle")
        } else {
            write!(f, "{}", parts.join(" "))
        }
    }
}
