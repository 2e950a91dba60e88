//! circlib template catalog
//!
//! Client-side view of a remote library of parameterized circuit templates.
//!
//! # Overview
//!
//! - [`CircuitApi`]: the operations this crate needs from the circuit service
//! - [`TemplateCatalog`]: lazily discovered [`TemplateDefinition`]s, looked up
//!   by name or by local identifier
//! - [`TemplateDefinition`]: argument validation and instantiation, either
//!   server-materialized ([`Program`](circlib_qasm::Program)) or local
//!   ([`RemoteGate`](circlib_qasm::RemoteGate))
//! - [`FamilyCatalog`]: named groups of templates
//! - [`CircuitService`]: both catalogs plus submission assembly
//! - [`InMemoryApi`]: a fixed, in-process catalog
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use circlib_catalog::{Arguments, CircuitService, InMemoryApi};
//!
//! let api = Arc::new(InMemoryApi::from_json(&std::fs::read_to_string("catalog.json")?)?);
//! let mut service = CircuitService::new(api);
//!
//! for template in service.templates.templates().await {
//!     println!("{template}");
//! }
//!
//! let qft = service
//!     .instantiate("QFT", &Arguments::new().with("num_qubits", 3))
//!     .await?;
//! ```
//!
//! # Sharing
//!
//! Catalogs discover through `&mut self`. To share one between tasks, wrap
//! it in a `tokio::sync::Mutex`.

pub mod api;
pub mod catalog;
pub mod error;
pub mod family;
pub mod memory;
pub mod parameter;
pub mod service;
pub mod template;

pub use api::{CircuitApi, MaterializedProgram, OUTPUT_FORMAT_QASM};
pub use catalog::{TEMPLATE_SERVICE, TemplateCatalog, TemplateSource};
pub use error::{CatalogError, CatalogResult};
pub use family::{FAMILY_SERVICE, FamilyCatalog, FamilySource, TemplateFamily};
pub use memory::InMemoryApi;
pub use parameter::{Arguments, ParameterSchema, TypeTag, render_value};
pub use service::CircuitService;
pub use template::{CatalogOptions, Instantiation, TemplateDefinition};

// Re-exported so callers need only this crate.
pub use circlib_qasm::{Program, RemoteGate, SubmissionAssembler, SubmissionPayload};
pub use circlib_registry::{DiscoveryOutcome, RegistryState, TransportError};
