//! Lazily discovered, cached registry of remote service instances.
//!
//! A [`ServiceRegistry`] starts out uninitialized. The first read runs
//! discovery against its [`ServiceSource`]; a successful listing moves it to
//! initialized and every later read is served from the cache until
//! [`ServiceRegistry::refresh`] or [`ServiceRegistry::invalidate`].
//!
//! ```text
//!   Uninitialized ──read──→ discover() ──ok──→ Initialized
//!         ↑                     │                  │
//!         └──────transport err──┘                  │
//!         └──────────────invalidate()/refresh()────┘
//! ```
//!
//! Registries are single-owner: every method that can discover takes
//! `&mut self`. Share one across tasks behind a `tokio::sync::Mutex`.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use crate::error::{RegistryError, RegistryResult, TransportError};
use crate::identifier::to_identifier;
use crate::record::{Named, RecordParse, ServiceSource};

/// Discovery state of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryState {
    /// The cache is empty or stale; the next read runs discovery.
    Uninitialized,
    /// The cache holds the result of the last successful discovery.
    Initialized,
}

/// What a call to [`ServiceRegistry::discover`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    /// The registry was already initialized; nothing was fetched.
    Cached,
    /// A listing was fetched and cached.
    Discovered {
        /// Number of instances now cached.
        instances: usize,
        /// Number of malformed items that were skipped.
        skipped: usize,
    },
    /// The listing call failed; the registry stays uninitialized.
    Failed(TransportError),
}

impl DiscoveryOutcome {
    /// The transport failure, if discovery failed.
    pub fn failure(&self) -> Option<&TransportError> {
        match self {
            DiscoveryOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// One cached instance and the identifier it is stored under.
struct Entry<I> {
    id: String,
    instance: Arc<I>,
}

/// Registry of instances discovered from one remote listing.
pub struct ServiceRegistry<S: ServiceSource> {
    source: S,
    state: RegistryState,
    /// Cached instances in listing order.
    entries: Vec<Entry<S::Instance>>,
    /// Identifier to position in `entries`.
    index: FxHashMap<String, usize>,
}

impl<S: ServiceSource> ServiceRegistry<S> {
    /// Create an uninitialized registry over `source`.
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: RegistryState::Uninitialized,
            entries: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// The source backing this registry.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Current discovery state.
    pub fn state(&self) -> RegistryState {
        self.state
    }

    /// Whether the last discovery completed and has not been invalidated.
    pub fn is_initialized(&self) -> bool {
        self.state == RegistryState::Initialized
    }

    /// Number of cached instances, without triggering discovery.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty, without triggering discovery.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Discover instances from the source unless already initialized.
    ///
    /// The cache is cleared before the listing call, so a failed discovery
    /// leaves an empty, uninitialized registry. The new collection is built
    /// aside and only installed once every item has been classified.
    /// Malformed items are skipped with a warning. A transport failure is
    /// logged and returned as [`DiscoveryOutcome::Failed`] rather than
    /// raised; the next read retries.
    pub async fn discover(&mut self) -> DiscoveryOutcome {
        if self.is_initialized() {
            return DiscoveryOutcome::Cached;
        }

        self.clear();
        let service = self.source.service_name().to_string();

        let items = match self.source.list_raw().await {
            Ok(items) => items,
            Err(err) => {
                warn!(
                    "Unable to retrieve {} information. Please try again later. Error: {}",
                    service, err
                );
                return DiscoveryOutcome::Failed(err);
            }
        };

        let mut entries = Vec::with_capacity(items.len());
        let mut index = FxHashMap::default();
        let mut skipped = 0;

        for item in &items {
            match self.source.parse(item) {
                RecordParse::Valid(instance) => {
                    let id = resolve_collision(to_identifier(instance.name()), &index);
                    debug!("Discovered {} '{}' as '{}'", service, instance.name(), id);
                    index.insert(id.clone(), entries.len());
                    entries.push(Entry {
                        id,
                        instance: Arc::new(instance),
                    });
                }
                RecordParse::Malformed { reason } => {
                    warn!(
                        "An error occurred when retrieving {} information. \
                         Some {} instances might not be available: {}",
                        service, service, reason
                    );
                    skipped += 1;
                }
            }
        }

        self.entries = entries;
        self.index = index;
        self.state = RegistryState::Initialized;

        info!(
            "Discovered {} {} instances ({} skipped)",
            self.entries.len(),
            service,
            skipped
        );

        DiscoveryOutcome::Discovered {
            instances: self.entries.len(),
            skipped,
        }
    }

    /// Mark the cache stale so the next read rediscovers.
    pub fn invalidate(&mut self) {
        self.state = RegistryState::Uninitialized;
    }

    /// Invalidate and rediscover immediately.
    pub async fn refresh(&mut self) -> DiscoveryOutcome {
        self.invalidate();
        self.discover().await
    }

    /// Insert or overwrite one cached instance under `id`.
    ///
    /// Used when a single item is fetched outside full discovery. The state
    /// is left unchanged, so the entry is dropped by the next discovery if
    /// the remote listing does not contain it.
    pub fn add(&mut self, id: impl Into<String>, instance: S::Instance) -> Arc<S::Instance> {
        let id = id.into();
        let instance = Arc::new(instance);
        match self.index.get(&id) {
            Some(&pos) => self.entries[pos].instance = Arc::clone(&instance),
            None => {
                self.index.insert(id.clone(), self.entries.len());
                self.entries.push(Entry {
                    id,
                    instance: Arc::clone(&instance),
                });
            }
        }
        instance
    }

    /// Identifier `name` would receive if added now.
    pub fn unique_identifier(&self, name: &str) -> String {
        resolve_collision(to_identifier(name), &self.index)
    }

    /// All cached instances, discovering first if needed.
    ///
    /// Returns an empty list when discovery fails; the failure has already
    /// been logged.
    pub async fn instances(&mut self) -> Vec<Arc<S::Instance>> {
        self.discover().await;
        self.entries
            .iter()
            .map(|entry| Arc::clone(&entry.instance))
            .collect()
    }

    /// All identifiers in listing order, discovering first if needed.
    pub async fn identifiers(&mut self) -> Vec<String> {
        self.discover().await;
        self.entries.iter().map(|entry| entry.id.clone()).collect()
    }

    /// Attribute-style lookup by local identifier.
    pub async fn get(&mut self, identifier: &str) -> RegistryResult<Arc<S::Instance>> {
        self.ensure_initialized().await?;
        self.index
            .get(identifier)
            .map(|&pos| Arc::clone(&self.entries[pos].instance))
            .ok_or_else(|| RegistryError::AttributeNotFound {
                service: self.source.service_name().to_string(),
                identifier: identifier.to_string(),
            })
    }

    /// Look up an instance by its domain name.
    ///
    /// Scans cached instances in listing order and returns the first match.
    pub async fn get_by_name(&mut self, name: &str) -> RegistryResult<Arc<S::Instance>> {
        self.ensure_initialized().await?;
        self.cached_by_name(name)
            .ok_or_else(|| RegistryError::NotFound {
                service: self.source.service_name().to_string(),
                name: name.to_string(),
            })
    }

    /// Look up a cached instance by domain name without discovering.
    pub fn cached_by_name(&self, name: &str) -> Option<Arc<S::Instance>> {
        self.entries
            .iter()
            .find(|entry| entry.instance.name() == name)
            .map(|entry| Arc::clone(&entry.instance))
    }

    /// Run discovery if needed and report a transport failure as an error.
    async fn ensure_initialized(&mut self) -> RegistryResult<()> {
        match self.discover().await {
            DiscoveryOutcome::Failed(err) => Err(RegistryError::Transport(err)),
            _ => Ok(()),
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

/// Append `_` until `id` is not taken.
fn resolve_collision<V>(mut id: String, taken: &FxHashMap<String, V>) -> String {
    while taken.contains_key(&id) {
        id.push('_');
    }
    id
}

impl<S: ServiceSource> std::fmt::Debug for ServiceRegistry<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("service", &self.source.service_name())
            .field("state", &self.state)
            .field(
                "identifiers",
                &self.entries.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
