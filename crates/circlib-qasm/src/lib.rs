//! circlib QASM support
//!
//! Text-level handling of OpenQASM 2 programs that reference remote
//! circuit templates:
//!
//! - [`RemoteGate`]: a placeholder instruction encoded as a pragma block
//!   (`to_pragma`/`from_pragma`), and [`remote_gates`] to scan a program
//! - [`ProgramBuilder`]/[`Program`]: building programs that embed remote gates
//! - [`SubmissionAssembler`]: per-program opaque-declaration deduplication
//!   and version-header substitution before submission
//!
//! # Example
//!
//! ```ignore
//! use circlib_qasm::{ProgramBuilder, RemoteGate, SubmissionAssembler};
//!
//! let qft = RemoteGate::new("QFT", 2, ["num_qubits=2"])?;
//! let program = ProgramBuilder::new(2, 2)
//!     .remote_gate(&qft, &[0, 1])?
//!     .remote_gate(&qft, &[1, 0])?
//!     .measure_all()
//!     .build();
//!
//! let payload = SubmissionAssembler::new().assemble(&[program])?;
//! ```

pub mod assembler;
pub mod error;
pub mod program;
pub mod remote_gate;

pub use assembler::{
    SubmissionAssembler, SubmissionPayload, dedup_opaque_declarations, substitute_version,
};
pub use error::{QasmError, QasmResult};
pub use program::{Program, ProgramBuilder, QASM2_HEADER, QELIB_INCLUDE};
pub use remote_gate::{OPAQUE_KEYWORD, PRAGMA_MARKER, RESERVED_NAMES, RemoteGate, remote_gates};
