//! Remote gates and their pragma encoding.
//!
//! A remote gate is an instruction whose body is only known to the circuit
//! service. It is written into a program as a four-line block that any
//! OpenQASM 2 parser accepts:
//!
//! ```text
//! // PRAGMA remote-circuit QFT(num_qubits=3)
//! opaque qft q0,q1,q2;
//! // PRAGMA remote-circuit
//! qft
//! ```
//!
//! Inside a program built with [`ProgramBuilder`](crate::ProgramBuilder) the
//! last line carries operands (`qft q[0],q[1],q[2];`).

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{QasmError, QasmResult};

/// Comment prefix that opens and closes a remote-gate block.
pub const PRAGMA_MARKER: &str = "// PRAGMA remote-circuit";

/// Keyword of the declaration line inside a block.
pub const OPAQUE_KEYWORD: &str = "opaque";

/// OpenQASM 2 statement keywords. A gate whose lowercase name is one of
/// these would turn its usage line into a different statement.
pub const RESERVED_NAMES: [&str; 9] = [
    "opaque", "gate", "qreg", "creg", "measure", "reset", "barrier", "if", "include",
];

/// An un-decomposed instruction resolved by the server at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteGate {
    name: String,
    num_qubits: u32,
    params: Vec<String>,
    label: String,
}

impl RemoteGate {
    /// Create a remote gate.
    ///
    /// `params` are pre-rendered `name=value` strings, kept in call order.
    /// Fails if the gate could not be decoded back from its own pragma.
    pub fn new(
        name: impl Into<String>,
        num_qubits: u32,
        params: impl IntoIterator<Item = impl Into<String>>,
    ) -> QasmResult<Self> {
        let name = name.into();
        let params: Vec<String> = params.into_iter().map(Into::into).collect();

        let invalid = |reason: String| QasmError::InvalidGate {
            name: name.clone(),
            reason,
        };

        if name.is_empty() {
            return Err(invalid("name is empty".into()));
        }
        if let Some(c) = name
            .chars()
            .find(|c| c.is_whitespace() || matches!(c, '(' | ')' | ',' | ';'))
        {
            return Err(invalid(format!("name contains {c:?}")));
        }
        let lowercase = name.to_lowercase();
        if RESERVED_NAMES.contains(&lowercase.as_str()) {
            return Err(invalid(format!("'{lowercase}' is an OpenQASM keyword")));
        }
        if num_qubits == 0 {
            return Err(invalid("a remote gate acts on at least one qubit".into()));
        }
        for param in &params {
            if param.is_empty() || param.contains(['\n', '\r']) {
                return Err(invalid(format!("argument {param:?} cannot be encoded")));
            }
            if split_top_level(param).len() != 1 {
                return Err(invalid(format!(
                    "argument {param:?} contains an unbracketed comma or unbalanced delimiter"
                )));
            }
        }

        let label = format!("remote_{name}");
        Ok(Self {
            name,
            num_qubits,
            params,
            label,
        })
    }

    /// Template name, original case.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of qubits the gate acts on.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Bound arguments as `name=value` strings.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Display label, `remote_<name>`.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Identifier used in the opaque declaration and usage line.
    pub fn qasm_name(&self) -> String {
        self.name.to_lowercase()
    }

    /// The `// PRAGMA remote-circuit Name(args)` header line.
    pub(crate) fn header_line(&self) -> String {
        format!("{PRAGMA_MARKER} {}({})", self.name, self.params.join(","))
    }

    /// The `opaque name q0,...;` declaration line.
    pub(crate) fn declaration_line(&self) -> String {
        let qubits: Vec<String> = (0..self.num_qubits).map(|i| format!("q{i}")).collect();
        format!("{OPAQUE_KEYWORD} {} {};", self.qasm_name(), qubits.join(","))
    }

    /// Encode as the four-line pragma block, without a trailing newline.
    pub fn to_pragma(&self) -> String {
        [
            self.header_line(),
            self.declaration_line(),
            PRAGMA_MARKER.to_string(),
            self.qasm_name(),
        ]
        .join("\n")
    }

    /// Decode a four-line pragma block produced by [`RemoteGate::to_pragma`].
    ///
    /// A single trailing newline is accepted; usage lines with operands
    /// (`qft q[0],q[1];`) are accepted as the fourth line.
    pub fn from_pragma(block: &str) -> QasmResult<Self> {
        let lines: Vec<&str> = block.lines().collect();
        if lines.len() != 4 {
            return Err(QasmError::MalformedPragma {
                line: 1,
                reason: format!("expected 4 lines, found {}", lines.len()),
            });
        }

        let (name, params) = parse_header(lines[0], 1)?;
        let qasm_name = name.to_lowercase();
        let num_qubits = parse_declaration(lines[1], 2, &qasm_name)?;
        expect_closing_marker(lines[2], 3)?;
        expect_usage(lines[3], 4, &qasm_name)?;

        Self::new(name, num_qubits, params).map_err(|e| QasmError::MalformedPragma {
            line: 1,
            reason: e.to_string(),
        })
    }
}

impl fmt::Display for RemoteGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) on {} qubit(s)",
            self.name,
            self.params.join(","),
            self.num_qubits
        )
    }
}

/// Decode every remote-gate block in a program, in order of appearance.
///
/// Blocks whose declaration line was removed by
/// [`dedup_opaque_declarations`](crate::dedup_opaque_declarations) take
/// their arity from the operands of the usage line, or from an earlier
/// declaration of the same gate when the usage line is bare.
///
/// A marker comment whose payload is not a `Name(args)` header is not a
/// block opening and is skipped with a warning.
pub fn remote_gates(text: &str) -> QasmResult<Vec<RemoteGate>> {
    let lines: Vec<&str> = text.lines().collect();
    let mut declared: FxHashMap<String, u32> = FxHashMap::default();
    let mut gates = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        if header_payload(lines[i]).is_none() {
            i += 1;
            continue;
        }

        let (name, params) = match parse_header(lines[i], i + 1) {
            Ok(header) => header,
            Err(e) => {
                warn!("Skipping pragma comment: {}", e);
                i += 1;
                continue;
            }
        };
        let qasm_name = name.to_lowercase();
        let mut j = i + 1;

        let mut num_qubits = None;
        if lines.get(j).is_some_and(|l| is_declaration(l)) {
            let n = parse_declaration(lines[j], j + 1, &qasm_name)?;
            declared.insert(qasm_name.clone(), n);
            num_qubits = Some(n);
            j += 1;
        }

        let closing = lines.get(j).copied().unwrap_or_default();
        expect_closing_marker(closing, j + 1)?;
        let usage = lines.get(j + 1).copied().unwrap_or_default();
        let operands = expect_usage(usage, j + 2, &qasm_name)?;

        let num_qubits = num_qubits
            .or((operands > 0).then_some(operands))
            .or_else(|| declared.get(&qasm_name).copied())
            .ok_or_else(|| QasmError::MalformedPragma {
                line: i + 1,
                reason: format!("cannot determine the qubit count of '{name}'"),
            })?;

        let gate = RemoteGate::new(name, num_qubits, params).map_err(|e| {
            QasmError::MalformedPragma {
                line: i + 1,
                reason: e.to_string(),
            }
        })?;
        gates.push(gate);
        i = j + 2;
    }

    Ok(gates)
}

/// Text after the marker on a block's opening line.
fn header_payload(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix(PRAGMA_MARKER)?;
    let rest = rest.strip_prefix(' ')?.trim();
    (!rest.is_empty()).then_some(rest)
}

/// Whether a line is an `opaque` declaration.
pub(crate) fn is_declaration(line: &str) -> bool {
    line.split_whitespace().next() == Some(OPAQUE_KEYWORD)
}

fn parse_header(line: &str, lineno: usize) -> QasmResult<(String, Vec<String>)> {
    let malformed = |reason: &str| QasmError::MalformedPragma {
        line: lineno,
        reason: reason.to_string(),
    };

    let payload = header_payload(line).ok_or_else(|| malformed("missing gate header"))?;
    let open = payload
        .find('(')
        .ok_or_else(|| malformed("missing '(' after gate name"))?;
    let args = payload[open + 1..]
        .strip_suffix(')')
        .ok_or_else(|| malformed("missing closing ')'"))?;
    let name = &payload[..open];
    if name.is_empty() {
        return Err(malformed("missing gate name"));
    }

    let params = if args.is_empty() {
        Vec::new()
    } else {
        split_top_level(args)
            .into_iter()
            .map(str::to_string)
            .collect()
    };

    Ok((name.to_string(), params))
}

fn parse_declaration(line: &str, lineno: usize, qasm_name: &str) -> QasmResult<u32> {
    let malformed = |reason: String| QasmError::MalformedPragma {
        line: lineno,
        reason,
    };

    let body = line
        .trim()
        .strip_suffix(';')
        .ok_or_else(|| malformed("declaration must end with ';'".into()))?;
    let tokens: Vec<&str> = body.split_whitespace().collect();
    if tokens.len() != 3 || tokens[0] != OPAQUE_KEYWORD {
        return Err(malformed(format!(
            "expected '{OPAQUE_KEYWORD} {qasm_name} q0,...;'"
        )));
    }
    if tokens[1] != qasm_name {
        return Err(malformed(format!(
            "declaration names '{}', header names '{qasm_name}'",
            tokens[1]
        )));
    }

    let mut count = 0u32;
    for (i, qubit) in tokens[2].split(',').enumerate() {
        if qubit != format!("q{i}") {
            return Err(malformed(format!("expected qubit q{i}, found '{qubit}'")));
        }
        count += 1;
    }
    Ok(count)
}

fn expect_closing_marker(line: &str, lineno: usize) -> QasmResult<()> {
    if line.trim() == PRAGMA_MARKER {
        Ok(())
    } else {
        Err(QasmError::MalformedPragma {
            line: lineno,
            reason: format!("expected closing '{PRAGMA_MARKER}'"),
        })
    }
}

/// Check the usage line and return its operand count.
fn expect_usage(line: &str, lineno: usize, qasm_name: &str) -> QasmResult<u32> {
    let line = line.trim().trim_end_matches(';');
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some(qasm_name) {
        return Err(QasmError::MalformedPragma {
            line: lineno,
            reason: format!("expected usage of '{qasm_name}'"),
        });
    }
    let operands = tokens
        .next()
        .map_or(0, |ops| ops.split(',').filter(|op| !op.is_empty()).count());
    Ok(u32::try_from(operands).unwrap_or(u32::MAX))
}

/// Split at commas that are not nested in brackets, parentheses or quotes.
///
/// Returns the whole input as one part when an opener is left unclosed, so
/// callers can reject it.
pub(crate) fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[' | '(' | '{') => depth += 1,
            (None, ']' | ')' | '}') => depth -= 1,
            (None, ',') if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        if depth < 0 {
            return vec![text, ""];
        }
    }

    if depth != 0 || quote.is_some() {
        return vec![text, ""];
    }
    parts.push(&text[start..]);
    parts
}
