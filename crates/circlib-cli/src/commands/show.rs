//! Show command implementation.

use anyhow::Result;
use console::style;

use circlib_catalog::TemplateCatalog;

use super::common::Connection;

/// Execute the show command.
pub async fn execute(connection: &Connection, name: &str) -> Result<()> {
    let mut catalog = TemplateCatalog::new(connection.api()?);
    let template = catalog.template(name).await?;

    println!(
        "{} {}",
        style("→").cyan().bold(),
        style(template.name()).green()
    );
    println!("{}", template.describe());
    if let Some(n) = template.num_qubits() {
        println!("  Qubits: {}", style(n).yellow());
    }

    Ok(())
}
