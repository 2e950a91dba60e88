//! circlib service registry
//!
//! Generic lazy-discovery cache for named instances listed by a remote
//! service. A registry is parameterized by a [`ServiceSource`], which lists
//! raw records and classifies each one; the registry handles caching,
//! identifier assignment and the discovery state machine.
//!
//! # Example
//!
//! ```ignore
//! use circlib_registry::{ServiceRegistry, ServiceSource};
//!
//! let mut registry = ServiceRegistry::new(my_source);
//!
//! // First read triggers discovery.
//! for instance in registry.instances().await {
//!     println!("{}", instance.name());
//! }
//!
//! // Attribute-style access by derived identifier.
//! let qv = registry.get("quantum_volume").await?;
//!
//! // Lookup by remote name.
//! let qft = registry.get_by_name("QFT").await?;
//! ```

pub mod error;
pub mod identifier;
pub mod record;
pub mod registry;

pub use error::{RegistryError, RegistryResult, TransportError};
pub use identifier::{is_identifier, to_identifier};
pub use record::{Named, RawRecord, RecordParse, ServiceSource, as_record};
pub use registry::{DiscoveryOutcome, RegistryState, ServiceRegistry};
