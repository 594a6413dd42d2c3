use common::*;

/// Instruction register, micro-instruction register and micro-program counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sequencer {
    instruction_register: u16,
    micro_instruction: u8,
    micro_pc: u8,
}

impl Sequencer {
    pub fn new() -> Sequencer {
        Sequencer::default()
    }

    /// Control store address for the coming cycle.
    pub fn address(&self) -> u16 {
        micro_address(self.micro_instruction, self.micro_pc)
    }

    pub fn instruction_register(&self) -> u16 {
        self.instruction_register
    }

    pub fn micro_instruction(&self) -> u8 {
        self.micro_instruction
    }

    pub fn micro_pc(&self) -> u8 {
        self.micro_pc
    }

    pub fn load_instruction(&mut self, value: u16) {
        self.instruction_register = value;
    }

    /// Derives the micro-instruction register from an instruction register value.
    pub fn latch_micro_instruction(&mut self, instruction_register: u16, shift: u32) {
        self.micro_instruction = (instruction_register >> shift) as u8 & UIR_MASK;
    }

    pub fn clear_micro_pc(&mut self) {
        self.micro_pc = 0;
    }

    /// End-of-cycle increment. Runs every cycle, after any clear.
    pub fn advance(&mut self) {
        self.micro_pc = self.micro_pc.wrapping_add(1) & UPC_MASK;
    }
}
