//! OpenQASM 2 program text with embedded remote gates.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{QasmError, QasmResult};
use crate::remote_gate::{PRAGMA_MARKER, RemoteGate, remote_gates};

/// Version header written by [`ProgramBuilder`].
pub const QASM2_HEADER: &str = "OPENQASM 2.0;";

/// Standard include written by [`ProgramBuilder`].
pub const QELIB_INCLUDE: &str = "include \"qelib1.inc\";";

/// A textual program, as produced locally or returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Program {
    text: String,
}

impl Program {
    /// Wrap existing program text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Program text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consume into the program text.
    pub fn into_string(self) -> String {
        self.text
    }

    /// Program lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }

    /// Version from the `OPENQASM x.y;` header, if present.
    pub fn version(&self) -> Option<&str> {
        self.lines().find_map(version_of)
    }

    /// Remote gates embedded in this program, in order of appearance.
    pub fn remote_gates(&self) -> QasmResult<Vec<RemoteGate>> {
        remote_gates(&self.text)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<String> for Program {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for Program {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Version number of an `OPENQASM x.y;` header line.
pub(crate) fn version_of(line: &str) -> Option<&str> {
    let version = line
        .trim()
        .strip_prefix("OPENQASM")?
        .strip_suffix(';')?
        .trim();
    (!version.is_empty()).then_some(version)
}

/// Builder for OpenQASM 2 programs over one `q` and one `c` register.
#[derive(Debug, Clone)]
pub struct ProgramBuilder {
    num_qubits: u32,
    num_clbits: u32,
    body: Vec<String>,
}

impl ProgramBuilder {
    /// Start a program with `num_qubits` qubits and `num_clbits` bits.
    pub fn new(num_qubits: u32, num_clbits: u32) -> Self {
        Self {
            num_qubits,
            num_clbits,
            body: Vec::new(),
        }
    }

    /// Append a standard gate application such as `h q[0];`.
    pub fn gate(&mut self, name: &str, qubits: &[u32]) -> QasmResult<&mut Self> {
        let operands = self.operands(qubits)?;
        self.body.push(format!("{name} {operands};"));
        Ok(self)
    }

    /// Append a remote gate block applied to `qubits`.
    ///
    /// The block is the gate's pragma with the bare usage line replaced by
    /// an application on the given qubits.
    pub fn remote_gate(&mut self, gate: &RemoteGate, qubits: &[u32]) -> QasmResult<&mut Self> {
        let expected = gate.num_qubits() as usize;
        if qubits.len() != expected {
            return Err(QasmError::WrongQubitCount {
                gate: gate.qasm_name(),
                expected,
                got: qubits.len(),
            });
        }
        let operands = self.operands(qubits)?;

        self.body.push(gate.header_line());
        self.body.push(gate.declaration_line());
        self.body.push(PRAGMA_MARKER.to_string());
        self.body.push(format!("{} {operands};", gate.qasm_name()));
        Ok(self)
    }

    /// Measure `q[i] -> c[i]` for every qubit that has a matching bit.
    pub fn measure_all(&mut self) -> &mut Self {
        for i in 0..self.num_qubits.min(self.num_clbits) {
            self.body.push(format!("measure q[{i}] -> c[{i}];"));
        }
        self
    }

    /// Render the program.
    pub fn build(&self) -> Program {
        let mut lines = vec![QASM2_HEADER.to_string(), QELIB_INCLUDE.to_string()];
        if self.num_qubits > 0 {
            lines.push(format!("qreg q[{}];", self.num_qubits));
        }
        if self.num_clbits > 0 {
            lines.push(format!("creg c[{}];", self.num_clbits));
        }
        lines.extend(self.body.iter().cloned());

        let mut text = lines.join("\n");
        text.push('\n');
        Program::new(text)
    }

    fn operands(&self, qubits: &[u32]) -> QasmResult<String> {
        let mut operands = Vec::with_capacity(qubits.len());
        for &q in qubits {
            if q >= self.num_qubits {
                return Err(QasmError::IndexOutOfBounds {
                    register: "q".into(),
                    index: q,
                    size: self.num_qubits,
                });
            }
            operands.push(format!("q[{q}]"));
        }
        Ok(operands.join(","))
    }
}
