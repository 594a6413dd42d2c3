use std::fmt;

use itertools::Itertools;

use common::*;
use ucode::ControlWord;

/// Read-only copy of the visible machine state, taken between cycles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub registers: [u16; REGISTER_COUNT],
    pub segments: [u16; SEGMENT_COUNT],
    pub bus: u16,
    pub bus_floating: bool,
    pub micro_pc: u8,
    pub micro_instruction: u8,
    pub micro_address: u16,
    pub instruction_register: u16,
    pub alu_a: u16,
    pub alu_b: u16,
    pub mar: u16,
    /// Raw word at `micro_address`, i.e. the one the next cycle executes.
    pub control_word: u64,
    pub halted: bool,
    pub cycles: u64,
    /// Reserved lines asserted by the last executed word.
    pub reserved: ReservedLines,
}

impl Snapshot {
    pub fn decoded_word(&self) -> Option<ControlWord> {
        ControlWord::from_raw(self.control_word).ok()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "cycle {:>8}  {}",
            self.cycles,
            if self.halted { "HALTED" } else { "running" })?;
        writeln!(
            f,
            "regs  {}",
            self.registers.iter().enumerate().map(|(i, r)| format!("r{}:{:04x}", i, r)).join(" "))?;
        writeln!(
            f,
            "segs  {}",
            self.segments.iter().enumerate().map(|(i, s)| format!("s{}:{:04x}", i, s)).join(" "))?;
        if self.bus_floating {
            write!(f, "bus   ----")?;
        } else {
            write!(f, "bus   {:04x}", self.bus)?;
        }
        writeln!(
            f,
            "  alu_a:{:04x} alu_b:{:04x} mar:{:04x} ir:{:04x}",
            self.alu_a, self.alu_b, self.mar, self.instruction_register)?;
        write!(
            f,
            "uir:{:02x} upc:{:02x} uaddr:{:04x} word:{:010x}",
            self.micro_instruction, self.micro_pc, self.micro_address, self.control_word)?;
        match self.decoded_word() {
            Some(word) => write!(f, " [{}]", word.disassemble()),
            None => write!(f, " [undecodable]"),
        }
    }
}
