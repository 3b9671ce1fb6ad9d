//! Error types shared by the parser, interpreter, and JIT/AOT code paths.

use std::process::ExitCode;

use thiserror::Error;

/// Failure kinds that can occur while folding a source buffer into [`crate::ir::Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A `]` was found without a matching, still-open `[`.
    #[error("unmatched closing bracket ']' at byte {pos}")]
    UnmatchedClose {
        /// Byte offset of the offending `]` in the source buffer.
        pos: usize,
    },
    /// A `[` was never closed by a matching `]` before the end of input.
    #[error("unmatched opening bracket '[' at byte {pos}")]
    UnmatchedOpen {
        /// Byte offset of the offending `[`.
        pos: usize,
    },
    /// Bracket nesting exceeded the parser's bracket-stack capacity.
    #[error("bracket nesting too deep at byte {pos} (limit is {limit})")]
    NestingTooDeep {
        /// Byte offset of the `[` that tipped the stack over its capacity.
        pos: usize,
        /// The configured nesting limit.
        limit: usize,
    },
    /// The source buffer exceeded the configured maximum size.
    #[error("source exceeds maximum size of {limit} bytes (got {len})")]
    SourceTooLarge {
        /// Actual source length in bytes.
        len: usize,
        /// The configured maximum.
        limit: usize,
    },
}

/// A strict-mode runtime trap: a condition that canonical (wrapping)
/// Brainfuck semantics would silently allow, but that strict mode turns
/// into a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RuntimeTrap {
    /// The data pointer moved outside `[0, TAPE_SIZE)`.
    #[error("data pointer {ptr} out of bounds (tape size is {tape_size})")]
    PointerOutOfBounds {
        /// The pointer value that was about to be used.
        ptr: i64,
        /// The tape's cell count.
        tape_size: usize,
    },
    /// A cell increment would cross the 8 bit upper bound.
    #[error("cell overflow at pointer {ptr}")]
    CellOverflow {
        /// The data pointer at the time of the trap.
        ptr: usize,
    },
    /// A cell decrement would cross the 8 bit lower bound.
    #[error("cell underflow at pointer {ptr}")]
    CellUnderflow {
        /// The data pointer at the time of the trap.
        ptr: usize,
    },
}

/// Top level error type unifying every fallible stage of the pipeline.
#[derive(Debug, Error)]
pub enum BfError {
    /// Failure while parsing source into IR.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// A strict-mode trap raised during interpretation or JIT execution.
    #[error(transparent)]
    Trap(#[from] RuntimeTrap),
    /// Failure reading the source file or writing program output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Failure while emitting an ahead-of-time object file or linking it.
    #[error("codegen error: {0}")]
    Codegen(String),
}

impl BfError {
    /// Map this error to the process exit code the CLI binaries report.
    ///
    /// `0` is reserved for success, so every variant here is non-zero;
    /// the exact values are otherwise not part of any contract.
    pub fn exit_code(&self) -> ExitCode {
        let code: u8 = match self {
            BfError::Parse(_) => 1,
            BfError::Trap(_) => 2,
            BfError::Io(_) => 3,
            BfError::Codegen(_) => 4,
        };
        ExitCode::from(code)
    }
}
