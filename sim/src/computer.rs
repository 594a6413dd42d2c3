use std::fmt::Debug;

use rand::Rng;

use common::*;
use ucode::*;

use crate::bank::*;
use crate::bus::*;
use crate::error::SimulationError;
use crate::memory::Memory;
use crate::sequencer::Sequencer;
use crate::snapshot::Snapshot;

#[derive(Clone, Copy, Display, Debug, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    Read,
    Write,
}

#[derive(Clone, Copy, Display, Debug, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    Running,
    Halted,
}

/// The whole machine. Each call to [`Computer::step`] runs one clock cycle
/// against the borrowed control store.
pub struct Computer<'a> {
    store: &'a ControlStore,
    pub bus: Bus,
    pub registers: RegisterFile,
    pub segments: SegmentFile,
    pub alu_a: u16,
    pub alu_b: u16,
    pub mar: u16,
    pub memory: Memory,
    sequencer: Sequencer,
    halted: bool,
    fault: Option<SimulationError>,
    reserved: ReservedLines,
    cycles: u64,
}

impl<'a> Debug for Computer<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "uaddr:{:04x}", self.sequencer.address())?;
        write!(f, " ir:{:04x}", self.sequencer.instruction_register())?;
        write!(f, " mar:{:04x}", self.mar)?;
        write!(f, " alu_a:{:04x} alu_b:{:04x}", self.alu_a, self.alu_b)?;
        write!(f, " regs:{:04x?}", self.registers.cells())?;
        write!(f, " segs:{:04x?}", self.segments.cells())?;
        write!(f, " halted:{}", self.halted)?;
        Ok(())
    }
}

impl<'a> Computer<'a> {
    pub fn new(store: &'a ControlStore) -> Computer<'a> {
        Computer {
            store,
            bus: Bus::new(),
            registers: RegisterFile::new(),
            segments: SegmentFile::new(),
            alu_a: 0,
            alu_b: 0,
            mar: 0,
            memory: Memory::new(),
            sequencer: Sequencer::new(),
            halted: false,
            fault: None,
            reserved: ReservedLines::empty(),
            cycles: 0,
        }
    }

    /// Power-on garbage in every data register. The micro-instruction
    /// register and micro-PC stay at zero so execution starts at address 0.
    pub fn randomize<R: Rng>(&mut self, rng: &mut R) {
        self.registers.randomize(rng);
        self.segments.randomize(rng);
        self.alu_a = rng.gen();
        self.alu_b = rng.gen();
        self.mar = rng.gen();
        self.sequencer.load_instruction(rng.gen());
    }

    pub fn set_instruction_register(&mut self, value: u16) {
        self.sequencer.load_instruction(value);
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn fault(&self) -> Option<&SimulationError> {
        self.fault.as_ref()
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Raw word the next cycle will execute.
    pub fn current_word(&self) -> u64 {
        self.store.word(self.sequencer.address())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            registers: *self.registers.cells(),
            segments: *self.segments.cells(),
            bus: self.bus.sample(),
            bus_floating: self.bus.is_floating(),
            micro_pc: self.sequencer.micro_pc(),
            micro_instruction: self.sequencer.micro_instruction(),
            micro_address: self.sequencer.address(),
            instruction_register: self.sequencer.instruction_register(),
            alu_a: self.alu_a,
            alu_b: self.alu_b,
            mar: self.mar,
            control_word: self.current_word(),
            halted: self.halted,
            cycles: self.cycles,
            reserved: self.reserved,
        }
    }

    /// Runs one clock cycle. A halted machine runs nothing and keeps
    /// reporting `Halted`; a faulted one keeps returning its fault.
    pub fn step(&mut self) -> Result<Status, SimulationError> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }
        if self.halted {
            return Ok(Status::Halted);
        }

        match self.cycle() {
            Ok(status) => Ok(status),
            Err(fault) => {
                log::error!("{}", fault);
                self.fault = Some(fault.clone());
                Err(fault)
            }
        }
    }

    fn cycle(&mut self) -> Result<Status, SimulationError> {
        let address = self.sequencer.address();
        let raw = self.store.word(address);
        let word = ControlWord::from_raw(raw).map_err(|_| SimulationError::Decode { address, raw })?;
        log::trace!("cycle:{} uaddr:{:04x} word:{:010x} {}", self.cycles, address, raw, word.disassemble());

        self.bus.reset();
        self.read_phase(address, &word)?;

        self.reserved = word.reserved_lines();
        if !self.reserved.is_empty() {
            log::debug!("uaddr:{:04x} ignoring reserved lines {:?}", address, self.reserved);
        }

        self.write_phase(&word);
        self.sequencer.advance();
        self.cycles += 1;

        if self.halted {
            log::warn!("halted at micro-address {:04x} after {} cycles", address, self.cycles);
            Ok(Status::Halted)
        } else {
            Ok(Status::Running)
        }
    }

    fn drive(&mut self, address: u16, driver: Driver, value: u16) -> Result<(), SimulationError> {
        log::trace!("bus <- {:04x} ({})", value, driver);
        self.bus
            .drive(driver, value)
            .map_err(|conflict| SimulationError::ProtocolViolation {
                address,
                phase: Phase::Read,
                conflict,
            })
    }

    /// Everything that puts a value on the bus, then the decode load.
    fn read_phase(&mut self, address: u16, word: &ControlWord) -> Result<(), SimulationError> {
        let ir = self.sequencer.instruction_register();

        if word.memory_read() {
            let value = self.memory.read(self.mar);
            self.drive(address, Driver::Memory, value)?;
        }

        if let Some((index, Direction::Drive)) = word.segment() {
            let value = self.segments.read(index);
            self.drive(address, Driver::Segment, value)?;
        }

        if let Some((field, Direction::Drive)) = word.register() {
            let value = self.registers.read(field.select(ir));
            self.drive(address, Driver::Register, value)?;
        }

        if word.alu_result_enabled() {
            let value = alu::evaluate(
                self.alu_a,
                self.alu_b,
                word.alu_opcode,
                word.shift_left,
                word.shift_right,
                word.carry_in,
            )
            .map_err(|source| SimulationError::Configuration { address, source })?;
            self.drive(address, Driver::Alu, value)?;
        }

        if word.decode_read() {
            self.sequencer.latch_micro_instruction(ir, DECODE_SHIFT);
        }

        Ok(())
    }

    /// Every latch samples the bus and the register values from before the edge.
    fn write_phase(&mut self, word: &ControlWord) {
        let bus = self.bus.sample();
        let ir = self.sequencer.instruction_register();
        let mar = self.mar;

        if word.mar_write() {
            self.mar = bus;
        }

        if word.memory_write() {
            self.memory.write(mar, bus);
        }

        if let Some((index, Direction::Latch)) = word.segment() {
            self.segments.write(index, bus);
        }

        if let Some((field, Direction::Latch)) = word.register() {
            self.registers.write(field.select(ir), bus);
        }

        if word.alu_a_write() {
            self.alu_a = bus;
        }

        if word.alu_b_write() {
            self.alu_b = bus;
        }

        if word.instruction_register_write {
            self.sequencer.load_instruction(bus);
        }

        if word.micro_instruction_load() {
            self.sequencer.latch_micro_instruction(ir, MICRO_INSTRUCTION_LOAD_SHIFT);
        }

        if word.micro_pc_clear() {
            self.sequencer.clear_micro_pc();
        }

        if word.halt {
            self.halted = true;
        }
    }
}
