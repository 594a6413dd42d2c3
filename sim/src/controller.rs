use std::str::FromStr;

use crate::computer::{Computer, Status};
use crate::error::SimulationError;

/// Interactive commands, one per input line. Matching is exact and case-sensitive.
#[derive(Clone, Copy, Display, Debug, PartialEq, Eq, Hash)]
#[derive(EnumCount, EnumIter, EnumString)]
pub enum Command {
    #[strum(to_string = "run", serialize = "r")]
    Run,
    #[strum(to_string = "pause", serialize = "p")]
    Pause,
    #[strum(to_string = "step", serialize = "s")]
    Step,
    #[strum(to_string = "exit", serialize = "quit")]
    Exit,
    #[strum(to_string = "clear", serialize = "clr")]
    Clear,
}

#[derive(Clone, Copy, Display, Debug, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    Paused,
    Continuous,
}

/// What the outer loop should do after a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Request {
    Continue,
    Exit,
    ClearHistory,
}

/// Decides, per tick of the outer loop, whether the engine runs a cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Controller {
    mode: Mode,
    last: Option<Command>,
}

impl Controller {
    pub fn new() -> Controller {
        Controller::with_mode(Mode::Paused)
    }

    pub fn with_mode(mode: Mode) -> Controller {
        Controller { mode, last: None }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn last(&self) -> Option<Command> {
        self.last
    }

    /// Parses and applies one input line. An empty line repeats the last
    /// recognized command; anything unrecognized changes nothing.
    pub fn submit(&mut self, line: &str, computer: &mut Computer) -> Result<Request, SimulationError> {
        let line = line.trim();
        let command = if line.is_empty() {
            match self.last {
                Some(command) => command,
                None => return Ok(Request::Continue),
            }
        } else {
            match Command::from_str(line) {
                Ok(command) => command,
                Err(_) => {
                    log::info!("ignoring unrecognized command {:?}", line);
                    return Ok(Request::Continue);
                }
            }
        };

        self.last = Some(command);
        self.apply(command, computer)
    }

    pub fn apply(&mut self, command: Command, computer: &mut Computer) -> Result<Request, SimulationError> {
        match command {
            Command::Run => self.set_mode(Mode::Continuous),
            Command::Pause => self.set_mode(Mode::Paused),
            Command::Step => {
                self.fire(computer)?;
            }
            Command::Exit => return Ok(Request::Exit),
            Command::Clear => return Ok(Request::ClearHistory),
        }
        Ok(Request::Continue)
    }

    /// One beat of the driver clock. Returns `None` when paused.
    pub fn tick(&mut self, computer: &mut Computer) -> Result<Option<Status>, SimulationError> {
        match self.mode {
            Mode::Paused => Ok(None),
            Mode::Continuous => self.fire(computer).map(Some),
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            log::debug!("controller {} -> {}", self.mode, mode);
            self.mode = mode;
        }
    }

    fn fire(&mut self, computer: &mut Computer) -> Result<Status, SimulationError> {
        let status = computer.step()?;
        if status == Status::Halted {
            self.set_mode(Mode::Paused);
        }
        Ok(status)
    }
}

impl Default for Controller {
    fn default() -> Self {
        Controller::new()
    }
}
