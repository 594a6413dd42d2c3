use packed_struct::prelude::*;
use packed_struct::PackingResult;

use common::*;

use crate::*;

/// Authors a control store one microroutine at a time.
pub struct Microprogram {
    words: Vec<u64>,
}

/// First step a routine runs after a micro-PC clear. The clear zeroes the
/// counter at the write edge and the end-of-cycle increment still follows.
pub const ROUTINE_ENTRY_STEP: u8 = 1;

/// Appends words to consecutive micro-PC steps of one opcode, starting at
/// [`ROUTINE_ENTRY_STEP`].
pub struct Routine<'a> {
    program: &'a mut Microprogram,
    opcode: u8,
    step: u8,
}

impl Microprogram {
    pub fn new() -> Microprogram {
        Microprogram {
            words: vec![IDLE_WORD; CONTROL_STORE_WORDS],
        }
    }

    pub fn set(&mut self, opcode: u8, step: u8, word: &ControlWord) -> PackingResult<()> {
        assert!(opcode <= UIR_MASK, "opcode {:#x} does not fit the micro-instruction register", opcode);
        assert!(step <= UPC_MASK, "step {} overflows the micro-program counter", step);

        let address = micro_address(opcode, step);
        log::trace!("uaddr:{:04x} opcode:{:02x} step:{:02} {}", address, opcode, step, word.disassemble());
        self.words[address as usize] = word.to_raw()?;
        Ok(())
    }

    pub fn routine(&mut self, opcode: u8) -> Routine<'_> {
        Routine {
            program: self,
            opcode,
            step: ROUTINE_ENTRY_STEP,
        }
    }

    pub fn build(self) -> ControlStore {
        ControlStore::from_words(self.words)
    }
}

impl Default for Microprogram {
    fn default() -> Self {
        Microprogram::new()
    }
}

impl<'a> Routine<'a> {
    pub fn push(&mut self, word: ControlWord) -> PackingResult<&mut Self> {
        self.program.set(self.opcode, self.step, &word)?;
        self.step += 1;
        Ok(self)
    }

    pub fn len(&self) -> u8 {
        self.step - ROUTINE_ENTRY_STEP
    }

    pub fn is_empty(&self) -> bool {
        self.step == ROUTINE_ENTRY_STEP
    }
}

/// Opcodes understood by [`demo`].
#[derive(Clone, Copy, Display, Debug, PartialEq, Eq)]
#[derive(EnumCount, EnumIter, EnumString)]
#[derive(PrimitiveEnum_u8)]
#[strum(serialize_all = "lowercase")]
pub enum DemoOpcode {
    Fetch = 0,
    Add = 1,
    Halt = 0x3F,
}

/// Segment slot used as the instruction pointer by [`demo`].
pub const DEMO_IP_SEGMENT: u8 = 1;

impl DemoOpcode {
    /// Encodes an instruction word. The destination field shares bit 10 with
    /// the opcode, so `Add` needs a destination in r4..=r7.
    pub fn encode(self, destination: u8, source: u8) -> u16 {
        ((self as u16) << MICRO_INSTRUCTION_LOAD_SHIFT)
            | (((destination & 0b111) as u16) << 8)
            | (((source & 0b111) as u16) << 5)
    }
}

/// A small microprogram: fetch, register add and halt. Power-on starts at
/// micro-address 0, which is idle and falls through into the fetch routine.
pub fn demo() -> PackingResult<ControlStore> {
    let mut program = Microprogram::new();

    program
        .routine(DemoOpcode::Fetch as u8)
        .push(ControlWord::create(
            Some(Output::Segment(DEMO_IP_SEGMENT)),
            &[Load::Mar, Load::AluA]))?
        .push(ControlWord::create(Some(Output::Memory), &[Load::InstructionRegister]))?
        .push(ControlWord::create(Some(Output::Alu(AluOpcode::Zero)), &[Load::AluB]).with_carry())?
        .push(ControlWord::create(
            Some(Output::Alu(AluOpcode::Add)),
            &[Load::Segment(DEMO_IP_SEGMENT)]))?
        .push(ControlWord::create(None, &[]).with_micro_instruction_load().with_micro_pc_clear())?;

    program
        .routine(DemoOpcode::Add as u8)
        .push(ControlWord::create(Some(Output::Register(RegisterField::Destination)), &[Load::AluA]))?
        .push(ControlWord::create(Some(Output::Register(RegisterField::Source)), &[Load::AluB]))?
        .push(ControlWord::create(
            Some(Output::Alu(AluOpcode::Add)),
            &[Load::Register(RegisterField::Destination)]))?
        .push(ControlWord::create(Some(Output::Alu(AluOpcode::Zero)), &[Load::InstructionRegister]))?
        .push(ControlWord::create(None, &[]).with_micro_instruction_load().with_micro_pc_clear())?;

    program
        .routine(DemoOpcode::Halt as u8)
        .push(ControlWord::create(None, &[]).with_halt())?;

    Ok(program.build())
}
