use thiserror::Error;

use alu::AluError;

use crate::bus::BusConflict;
use crate::computer::Phase;

/// Faults raised while running a cycle. All of them point at a bad control
/// word in the loaded microcode, so none are retried.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error("bus protocol violation at micro-address {address:#06x} in {phase} phase: {conflict}")]
    ProtocolViolation {
        address: u16,
        phase: Phase,
        conflict: BusConflict,
    },
    #[error("ALU configuration error at micro-address {address:#06x}: {source}")]
    Configuration {
        address: u16,
        #[source]
        source: AluError,
    },
    /// Every 40-bit pattern decodes under the current layout. Kept for layouts
    /// that add enum fields with unused encodings.
    #[error("control word {raw:#012x} at micro-address {address:#06x} could not be decoded")]
    Decode { address: u16, raw: u64 },
}
