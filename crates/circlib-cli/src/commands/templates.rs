//! Templates command implementation.

use anyhow::Result;
use console::style;

use circlib_catalog::TemplateCatalog;

use super::common::{Connection, check_discovery, spinner};

/// Execute the templates command.
pub async fn execute(connection: &Connection, family: Option<&str>) -> Result<()> {
    let mut catalog = TemplateCatalog::new(connection.api()?);

    let progress = spinner("Discovering templates...");
    let outcome = catalog.discover().await;
    progress.finish_and_clear();
    check_discovery(&outcome)?;

    let identifiers = catalog.identifiers().await;
    let templates = catalog.templates().await;

    let listed: Vec<_> = identifiers
        .iter()
        .zip(&templates)
        .filter(|(_, t)| family.is_none_or(|f| t.families().contains(f)))
        .collect();

    match family {
        Some(f) => println!(
            "{} Templates in family {}:\n",
            style("circlib").cyan().bold(),
            style(f).yellow()
        ),
        None => println!("{} Available templates:\n", style("circlib").cyan().bold()),
    }

    if listed.is_empty() {
        println!("  (none)");
        return Ok(());
    }

    for (identifier, template) in listed {
        let marker = if template.is_remote() {
            style("◆").magenta()
        } else {
            style("●").green()
        };
        println!("  {} {}", marker, style(identifier).bold());
        println!("    {template}");
    }

    Ok(())
}
