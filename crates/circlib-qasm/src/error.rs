//! Error types for remote-gate encoding and program assembly.

use thiserror::Error;

/// Errors that can occur while encoding, decoding or assembling programs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QasmError {
    /// A pragma block could not be decoded.
    #[error("Malformed remote-circuit pragma at line {line}: {reason}")]
    MalformedPragma { line: usize, reason: String },

    /// A remote gate cannot be encoded losslessly.
    #[error("Invalid remote gate '{name}': {reason}")]
    InvalidGate { name: String, reason: String },

    /// Wrong number of qubit operands.
    #[error("Gate '{gate}' expects {expected} qubits, got {got}")]
    WrongQubitCount {
        gate: String,
        expected: usize,
        got: usize,
    },

    /// Index out of bounds.
    #[error("Index {index} out of bounds for register '{register}' of size {size}")]
    IndexOutOfBounds {
        register: String,
        index: u32,
        size: u32,
    },

    /// Nothing to submit.
    #[error("Submission contains no programs")]
    EmptySubmission,
}

/// Result type for QASM operations.
pub type QasmResult<T> = Result<T, QasmError>;
