//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - client for remote circuit-template libraries",
        style("circlib").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  circlib-registry      Lazy service-instance registry");
    println!("  circlib-qasm          Remote-gate pragmas and submission assembly");
    println!("  circlib-catalog       Template catalog and instantiation");
    println!("  circlib-adapter-http  REST client for the circuit service");
    println!("  circlib-cli           Command-line interface");
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}
