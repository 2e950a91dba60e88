//! Instantiate command implementation.

use anyhow::Result;
use console::style;

use circlib_catalog::{CatalogOptions, Instantiation, TemplateCatalog};

use super::common::{Connection, parse_arguments, spinner, write_output};

/// Execute the instantiate command.
pub async fn execute(
    connection: &Connection,
    name: &str,
    assignments: &[String],
    remote: bool,
    qubits: Option<u32>,
    strict: bool,
    output: Option<&str>,
) -> Result<()> {
    let mut args = parse_arguments(assignments)?;
    if let Some(n) = qubits {
        args.insert("num_qubits", n);
    }

    eprintln!(
        "{} Instantiating {} with {} argument(s)",
        style("→").cyan().bold(),
        style(name).green(),
        args.len()
    );

    let options = CatalogOptions::default().with_strict_types(strict);
    let mut catalog = TemplateCatalog::with_options(connection.api()?, options);
    let template = catalog.template(name).await?;

    let result = if remote {
        Instantiation::Remote(template.instantiate_remote(&args)?)
    } else {
        let progress = spinner("Waiting for the circuit service...");
        let result = template.instantiate(&args).await;
        progress.finish_and_clear();
        result?
    };

    let text = match &result {
        Instantiation::Program(program) => {
            eprintln!("{} Program materialized", style("✓").green().bold());
            program.as_str().to_string()
        }
        Instantiation::Remote(gate) => {
            eprintln!(
                "{} Remote gate {} on {} qubit(s)",
                style("✓").green().bold(),
                style(gate.label()).yellow(),
                gate.num_qubits()
            );
            gate.to_pragma()
        }
    };

    write_output(&text, output)
}
