//! Families command implementation.

use anyhow::Result;
use console::style;

use circlib_catalog::FamilyCatalog;

use super::common::{Connection, check_discovery, spinner};

/// Execute the families command.
pub async fn execute(connection: &Connection) -> Result<()> {
    let mut catalog = FamilyCatalog::new(connection.api()?);

    let progress = spinner("Discovering families...");
    let outcome = catalog.discover().await;
    progress.finish_and_clear();
    check_discovery(&outcome)?;

    println!("{} Template families:\n", style("circlib").cyan().bold());

    let families = catalog.families().await;
    if families.is_empty() {
        println!("  (none)");
    }
    for family in families {
        println!("  {} {}", style("●").green(), style(&family.name).bold());
        if !family.description.is_empty() {
            println!("    {}", family.description);
        }
        println!("    Members: {}", family.members.join(", "));
    }

    Ok(())
}
