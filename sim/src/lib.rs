extern crate strum;
#[macro_use]
extern crate strum_macros;

pub mod bank;
pub mod bus;
pub mod computer;
pub mod controller;
pub mod error;
pub mod memory;
pub mod sequencer;
pub mod snapshot;

pub use bank::{Bank, RegisterFile, SegmentFile};
pub use bus::{Bus, BusConflict, Driver};
pub use computer::{Computer, Phase, Status};
pub use controller::{Command, Controller, Mode, Request};
pub use error::SimulationError;
pub use memory::{Memory, MemoryError};
pub use sequencer::Sequencer;
pub use snapshot::Snapshot;
