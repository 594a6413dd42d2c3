mod config;
mod console;
mod logging;
mod render;

use std::process::ExitCode;
use std::thread;
use std::time::Instant;

use anyhow::{anyhow, Context};
use pico_args::Arguments;
use rand::{rngs::StdRng, SeedableRng};

use common::*;
use sim::*;
use ucode::*;

use config::{Config, DumpConfig, Invocation, RunConfig, USAGE};
use console::History;

const EXIT_FAILURE: u8 = 1;
const EXIT_FAULT: u8 = 2;

fn main() -> ExitCode {
    let config = match config::parse(Arguments::from_env()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}\n\n{}", e, USAGE);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    if let Err(e) = logging::setup_logging(config.verbosity, config.log_file.as_deref()) {
        eprintln!("error: could not set up logging: {}", e);
        return ExitCode::from(EXIT_FAILURE);
    }

    match dispatch(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            if e.downcast_ref::<SimulationError>().is_some() {
                ExitCode::from(EXIT_FAULT)
            } else {
                ExitCode::from(EXIT_FAILURE)
            }
        }
    }
}

fn dispatch(config: &Config) -> anyhow::Result<()> {
    match &config.invocation {
        Invocation::Run(run_config) => run(run_config),
        Invocation::DemoImage { out } => {
            let store = demo().map_err(|e| anyhow!("could not build demo microprogram: {:?}", e))?;
            store
                .save(out)
                .with_context(|| format!("could not write {}", out.display()))?;
            log::info!("wrote demo control store to {}", out.display());
            Ok(())
        }
        Invocation::Dump(dump_config) => dump(dump_config),
    }
}

fn dump(config: &DumpConfig) -> anyhow::Result<()> {
    let store = ControlStore::open(&config.image)
        .with_context(|| format!("could not load {}", config.image.display()))?;

    let end = (config.from as usize + config.count as usize).min(CONTROL_STORE_WORDS);
    for address in config.from as usize..end {
        let raw = store.word(address as u16);
        let uir = address >> UPC_BITS;
        let upc = address & UPC_MASK as usize;
        match ControlWord::from_raw(raw) {
            Ok(word) => println!("{:04x} {:02x}:{:02x} {:010x} {}", address, uir, upc, raw, word.disassemble()),
            Err(_) => println!("{:04x} {:02x}:{:02x} {:010x} <undecodable>", address, uir, upc, raw),
        }
    }
    Ok(())
}

fn power_on<'a>(store: &'a ControlStore, config: &RunConfig) -> anyhow::Result<Computer<'a>> {
    let mut computer = Computer::new(store);

    if !config.zeroed {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        computer.randomize(&mut rng);
    }

    if let Some(path) = &config.memory {
        let bytes = std::fs::read(path).with_context(|| format!("could not read {}", path.display()))?;
        let words = Memory::words_from_le_bytes(&bytes)?;
        computer.memory.load(0, &words)?;
        log::info!("loaded {} memory words from {}", words.len(), path.display());
    }

    Ok(computer)
}

fn run(config: &RunConfig) -> anyhow::Result<()> {
    let store = ControlStore::open(&config.image)
        .with_context(|| format!("could not load {}", config.image.display()))?;
    let mut computer = power_on(&store, config)?;

    let mode = if config.continuous { Mode::Continuous } else { Mode::Paused };
    let mut controller = Controller::with_mode(mode);
    let mut history = History::new();

    let mut dirty = true;
    loop {
        let started = Instant::now();

        while let Some(line) = console::poll_line() {
            history.push(&line);
            dirty = true;
            match controller.submit(&line, &mut computer)? {
                Request::Continue => {}
                Request::ClearHistory => history.clear(),
                Request::Exit => return Ok(()),
            }
        }

        if controller.tick(&mut computer)?.is_some() {
            dirty = true;
        }

        if dirty {
            print!("{}", render::render(&computer.snapshot(), controller.mode(), &history));
            dirty = false;
        }

        if let Some(max_cycles) = config.max_cycles {
            if computer.cycles() >= max_cycles || computer.is_halted() {
                log::info!("stopping after {} cycles", computer.cycles());
                return Ok(());
            }
        }

        if let Some(rest) = config.period.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }
}
