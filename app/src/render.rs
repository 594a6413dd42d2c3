use std::fmt::Write;

use common::*;
use sim::{Mode, Snapshot};

use crate::console::History;

pub const SEGMENT_LABELS: [&str; SEGMENT_COUNT] = ["CS", "IP", "SS", "DS"];

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

pub fn render(snapshot: &Snapshot, mode: Mode, history: &History) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_frame(&mut out, snapshot, mode, history);
    out
}

fn write_frame(out: &mut String, s: &Snapshot, mode: Mode, history: &History) -> std::fmt::Result {
    out.push_str(CLEAR_SCREEN);
    writeln!(
        out,
        "cycle {:<10} mode {:<10} {}",
        s.cycles,
        mode,
        if s.halted { "HALTED" } else { "" })?;

    for (i, value) in s.registers.iter().enumerate() {
        write!(out, "R{}={:04X} ", i, value)?;
    }
    writeln!(out)?;

    for (label, value) in SEGMENT_LABELS.iter().zip(s.segments.iter()) {
        write!(out, "{}={:04X} ", label, value)?;
    }
    writeln!(out)?;

    if s.bus_floating {
        write!(out, "BUS=---- ")?;
    } else {
        write!(out, "BUS={:04X} ", s.bus)?;
    }
    writeln!(out, "A={:04X} B={:04X} MAR={:04X} IR={:04X}", s.alu_a, s.alu_b, s.mar, s.instruction_register)?;

    write!(
        out,
        "uIR={:02X} uPC={:02X} WORD={:010X} ",
        s.micro_instruction, s.micro_pc, s.control_word)?;
    match s.decoded_word() {
        Some(word) => writeln!(out, "{}", word.disassemble())?,
        None => writeln!(out, "<undecodable>")?,
    }
    if !s.reserved.is_empty() {
        writeln!(out, "reserved lines ignored: {:?}", s.reserved)?;
    }

    writeln!(out, "----")?;
    for line in history.lines() {
        writeln!(out, "> {}", line)?;
    }
    Ok(())
}
