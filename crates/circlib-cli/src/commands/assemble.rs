//! Assemble command implementation.

use anyhow::Result;
use console::style;

use circlib_qasm::SubmissionAssembler;

use super::common::{load_program, write_output};

/// Execute the assemble command.
pub fn execute(
    files: &[String],
    version_marker: Option<&str>,
    output: Option<&str>,
) -> Result<()> {
    eprintln!(
        "{} Assembling {} program(s)",
        style("→").cyan().bold(),
        files.len()
    );

    let programs = files
        .iter()
        .map(|f| load_program(f))
        .collect::<Result<Vec<_>>>()?;

    let assembler = match version_marker {
        Some(marker) => SubmissionAssembler::new().with_version_marker(marker),
        None => SubmissionAssembler::new(),
    };
    let payload = assembler.assemble(&programs)?;

    eprintln!(
        "{} {} remote gate(s): {}",
        style("✓").green().bold(),
        payload.remote_gates.len(),
        payload.remote_gates.join(", ")
    );

    write_output(&serde_json::to_string_pretty(&payload)?, output)
}
