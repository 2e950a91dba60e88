//! circlib Command-Line Interface
//!
//! Browse a remote circuit-template library, instantiate templates and
//! assemble programs for submission.
//!
//! ```text
//! circlib templates --family textbook
//! circlib show QFT
//! circlib instantiate QFT --arg num_qubits=3
//! circlib assemble a.qasm b.qasm --version-marker "OPENQASM 2.0;"
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::common::Connection;
use commands::{assemble, families, instantiate, show, templates, version};

/// circlib - client for remote circuit-template libraries
#[derive(Parser)]
#[command(name = "circlib")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Client config file (YAML); defaults to ~/.circlib/config.yaml
    #[arg(long, global = true)]
    config: Option<String>,

    /// Serve templates from a local JSON catalog instead of the remote service
    #[arg(long, global = true, env = "CIRCLIB_CATALOG")]
    catalog: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available templates
    Templates {
        /// Only templates in this family
        #[arg(short, long)]
        family: Option<String>,
    },

    /// Show a template's parameters
    Show {
        /// Template name
        name: String,
    },

    /// List template families
    Families,

    /// Instantiate a template
    Instantiate {
        /// Template name
        name: String,

        /// Argument as name=value (repeatable)
        #[arg(short, long = "arg", value_name = "NAME=VALUE")]
        args: Vec<String>,

        /// Build a remote gate locally instead of asking the server
        #[arg(long)]
        remote: bool,

        /// Shorthand for --arg num_qubits=N
        #[arg(short, long)]
        qubits: Option<u32>,

        /// Check argument values against parameter types
        #[arg(long)]
        strict: bool,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Assemble program files into one submission payload
    Assemble {
        /// Program files
        #[arg(required = true)]
        files: Vec<String>,

        /// Replace every OPENQASM version line with this text
        #[arg(long)]
        version_marker: Option<String>,

        /// Output file for the JSON payload (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let connection = Connection {
        config: cli.config,
        catalog: cli.catalog,
    };

    // Execute command
    let result = match cli.command {
        Commands::Templates { family } => {
            templates::execute(&connection, family.as_deref()).await
        }

        Commands::Show { name } => show::execute(&connection, &name).await,

        Commands::Families => families::execute(&connection).await,

        Commands::Instantiate {
            name,
            args,
            remote,
            qubits,
            strict,
            output,
        } => {
            instantiate::execute(
                &connection,
                &name,
                &args,
                remote,
                qubits,
                strict,
                output.as_deref(),
            )
            .await
        }

        Commands::Assemble {
            files,
            version_marker,
            output,
        } => assemble::execute(&files, version_marker.as_deref(), output.as_deref()),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
