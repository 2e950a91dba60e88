//! circlib HTTP adapter
//!
//! Connects the template catalog to a remote circuit service over REST.
//!
//! # Configuration
//!
//! Set the service URL and, if the service requires one, a bearer token:
//!
//! ```bash
//! export CIRCLIB_URL="https://circuits.example.com/api"
//! export CIRCLIB_TOKEN="your-token"
//! ```
//!
//! or write them to `~/.circlib/config.yaml`:
//!
//! ```yaml
//! endpoint: https://circuits.example.com/api
//! token: your-token
//! timeout_secs: 60
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use circlib_adapter_http::{CircuitClient, ClientConfig};
//! use circlib_catalog::TemplateCatalog;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = CircuitClient::new(&ClientConfig::load(None)?)?;
//!     let mut catalog = TemplateCatalog::new(Arc::new(client));
//!
//!     for template in catalog.templates().await {
//!         println!("{template}");
//!     }
//!     Ok(())
//! }
//! ```

mod api;
mod config;
mod error;
mod service;

pub use api::CircuitClient;
pub use config::{
    ClientConfig, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS, LEGACY_URL_ENV, TOKEN_ENV,
    URL_ENV,
};
pub use error::{ClientError, ClientResult};
