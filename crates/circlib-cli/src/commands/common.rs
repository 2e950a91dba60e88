//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use circlib_adapter_http::{CircuitClient, ClientConfig};
use circlib_catalog::{Arguments, CircuitApi, DiscoveryOutcome, InMemoryApi};
use circlib_qasm::Program;

/// Where templates come from: a local catalog file or the remote service.
pub struct Connection {
    /// Client config file; `None` uses the default location.
    pub config: Option<String>,
    /// Local JSON catalog; takes precedence over the remote service.
    pub catalog: Option<String>,
}

impl Connection {
    /// Open the circuit service.
    pub fn api(&self) -> Result<Arc<dyn CircuitApi>> {
        if let Some(path) = &self.catalog {
            debug!("Using local catalog {path}");
            return Ok(Arc::new(load_catalog(path)?));
        }

        let config = ClientConfig::load(self.config.as_deref().map(Path::new))
            .context("Failed to load client config")?;
        let client = CircuitClient::new(&config)?;
        debug!("Using circuit service at {}", client.base_url());
        Ok(Arc::new(client))
    }
}

/// Load an in-memory catalog from a JSON file.
pub fn load_catalog(path: &str) -> Result<InMemoryApi> {
    if !Path::new(path).exists() {
        anyhow::bail!("Catalog file not found: {path}");
    }
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read catalog: {path}"))?;
    InMemoryApi::from_json(&text).with_context(|| format!("Invalid catalog file: {path}"))
}

/// Load a program file.
pub fn load_program(path: &str) -> Result<Program> {
    if !Path::new(path).exists() {
        anyhow::bail!("File not found: {path}");
    }
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;
    Ok(Program::new(text))
}

/// Parse `name=value` assignments into arguments.
pub fn parse_arguments(assignments: &[String]) -> Result<Arguments> {
    let mut args = Arguments::new();
    for text in assignments {
        let (name, value) = Arguments::parse_assignment(text)
            .ok_or_else(|| anyhow::anyhow!("Invalid argument '{text}', expected NAME=VALUE"))?;
        args.insert(name, value);
    }
    Ok(args)
}

/// Write to `output`, or print to stdout.
pub fn write_output(text: &str, output: Option<&str>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write file: {path}"))?;
            eprintln!("  Output: {}", style(path).green());
        }
        None => println!("{text}"),
    }
    Ok(())
}

/// Spinner shown on stderr while waiting on the service.
pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Fail if discovery could not reach the service.
pub fn check_discovery(outcome: &DiscoveryOutcome) -> Result<()> {
    if let Some(err) = outcome.failure() {
        anyhow::bail!("Could not reach the circuit service: {err}");
    }
    Ok(())
}
