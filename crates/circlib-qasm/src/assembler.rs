//! Merging programs into one submission.
//!
//! Several programs built independently may each declare the same remote
//! gate. OpenQASM 2 forbids a second `opaque` declaration of a name, so
//! before submission every program is rewritten to keep only the first
//! declaration of each gate. Usage lines are never touched: each one is
//! an instruction occurrence.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{QasmError, QasmResult};
use crate::program::{Program, version_of};
use crate::remote_gate::{PRAGMA_MARKER, is_declaration};

/// Drop repeated remote-gate declarations from one program.
///
/// A line is a remote-gate declaration when it starts with `opaque` and the
/// line before it starts with the pragma marker. The first declaration of
/// each gate name is kept; later ones are removed. Every other line is kept
/// byte for byte, including line endings.
pub fn dedup_opaque_declarations(text: &str) -> String {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut out: Vec<&str> = Vec::new();
    let mut previous: Option<&str> = None;

    for line in text.split('\n') {
        let after_marker =
            previous.is_some_and(|prev| prev.trim_start().starts_with(PRAGMA_MARKER));
        previous = Some(line);

        if after_marker && is_declaration(line) {
            if let Some(name) = line.split_whitespace().nth(1) {
                if !seen.insert(name) {
                    debug!("Dropping repeated opaque declaration of '{}'", name);
                    continue;
                }
            }
        }
        out.push(line);
    }

    out.join("\n")
}

/// Replace every `OPENQASM x.y;` header line with `marker`.
pub fn substitute_version(text: &str, marker: &str) -> String {
    text.split('\n')
        .map(|line| {
            if version_of(line.trim_end_matches('\r')).is_some() {
                marker
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// What gets sent to the server for execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    /// Rewritten programs, in submission order.
    pub programs: Vec<Program>,
    /// Distinct remote gate names referenced by any program, in order of
    /// first appearance.
    pub remote_gates: Vec<String>,
}

/// Rewrites programs for submission.
#[derive(Debug, Clone, Default)]
pub struct SubmissionAssembler {
    version_marker: Option<String>,
}

impl SubmissionAssembler {
    /// Create an assembler that leaves version headers alone.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every version header line with `marker` before deduplication.
    #[must_use]
    pub fn with_version_marker(mut self, marker: impl Into<String>) -> Self {
        self.version_marker = Some(marker.into());
        self
    }

    /// Configured version marker.
    pub fn version_marker(&self) -> Option<&str> {
        self.version_marker.as_deref()
    }

    /// Rewrite one program: version substitution, then declaration dedup.
    pub fn prepare(&self, program: &Program) -> Program {
        let text = match &self.version_marker {
            Some(marker) => substitute_version(program.as_str(), marker),
            None => program.as_str().to_string(),
        };
        Program::new(dedup_opaque_declarations(&text))
    }

    /// Rewrite every program and collect the remote gates they use.
    ///
    /// Deduplication is scoped to each program; a gate declared in two
    /// programs stays declared in both.
    pub fn assemble(&self, programs: &[Program]) -> QasmResult<SubmissionPayload> {
        if programs.is_empty() {
            return Err(QasmError::EmptySubmission);
        }

        let mut prepared = Vec::with_capacity(programs.len());
        let mut names: Vec<String> = Vec::new();

        for program in programs {
            let program = self.prepare(program);
            for gate in program.remote_gates()? {
                if !names.iter().any(|n| n == gate.name()) {
                    names.push(gate.name().to_string());
                }
            }
            prepared.push(program);
        }

        debug!(
            "Assembled {} program(s) using {} remote gate(s)",
            prepared.len(),
            names.len()
        );

        Ok(SubmissionPayload {
            programs: prepared,
            remote_gates: names,
        })
    }
}
