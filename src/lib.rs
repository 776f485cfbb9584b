//! Find the shortest straight-line program, over a chosen set of 32-bit
//! instructions, that computes a target function.
//!
//! For a candidate length the search is encoded as a satisfiability problem:
//! every instruction slot gets symbolic opcode, operand, and immediate
//! variables, shared across several randomly sampled input/output examples
//! ("chains"). A model from z3 is decoded back into a [`Program`], which is
//! then checked against fresh random inputs with the concrete interpreter.

#![deny(missing_debug_implementations)]

mod builder;
pub mod component;
pub mod config;
mod encoder;
mod interp;
mod mux;
mod operator;
mod program;
pub mod search;
mod subset;
pub mod target;

pub use builder::ProgramBuilder;
pub use component::Operands;
pub use config::SearchConfig;
pub use encoder::{Encoder, Verdict};
pub use interp::{validate, Mismatch, Validation};
pub use operator::{Kind, Layout, Opcode};
pub use program::{Instruction, Program};
pub use search::{find_solution, search, Outcome, Solution};
pub use subset::IsaSubset;
pub use target::Target;

use std::fmt::{self, Display};

/// The machine word every instruction operates on.
pub type Value = i32;

pub const VALUE_BITS: u32 = Value::BITS;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown opcode name: {0}")]
    UnknownOpcode(String),

    #[error("unknown target function: {0}")]
    UnknownTarget(String),

    #[error("instruction subset is empty")]
    EmptySubset,

    #[error("at least one chain is required")]
    NoChains,

    #[error("program length {length} leaves no room for an instruction after {num_inputs} inputs")]
    LengthTooShort { length: usize, num_inputs: usize },

    #[error("expected {expected} inputs, got {actual}")]
    InputCountMismatch { expected: usize, actual: usize },

    #[error("instruction at {result} reads {operand}, which is not an earlier register")]
    OperandOutOfRange { result: Reg, operand: Reg },

    #[error("instruction at {actual} should define {expected}")]
    MisplacedInstruction { expected: Reg, actual: Reg },

    #[error("model has no value for {var} of slot {slot}")]
    MissingAssignment { slot: usize, var: &'static str },

    #[error("model chose local opcode {local}, outside the {len}-opcode subset")]
    OpcodeOutOfRange { local: usize, len: usize },
}

impl Error {
    /// Errors that only sink one length attempt; the search moves on to the
    /// next length after logging them.
    pub fn is_attempt_failure(&self) -> bool {
        matches!(
            self,
            Error::MissingAssignment { .. } | Error::OpcodeOutOfRange { .. }
        )
    }
}

/// A register: the result of slot `n`, or input `n` for the leading slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reg(pub usize);

impl Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}
