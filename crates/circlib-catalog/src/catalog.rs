//! The template catalog: a registry of [`TemplateDefinition`]s.

use std::sync::Arc;

use async_trait::async_trait;
use circlib_registry::{
    DiscoveryOutcome, RecordParse, ServiceRegistry, ServiceSource, TransportError,
};
use serde_json::Value;
use tracing::debug;

use crate::api::CircuitApi;
use crate::error::{CatalogError, CatalogResult};
use crate::parameter::Arguments;
use crate::template::{CatalogOptions, Instantiation, TemplateDefinition};

/// Service kind used in logs and errors.
pub const TEMPLATE_SERVICE: &str = "template";

/// Lists template records and turns them into definitions.
pub struct TemplateSource {
    api: Arc<dyn CircuitApi>,
    options: CatalogOptions,
}

#[async_trait]
impl ServiceSource for TemplateSource {
    type Instance = TemplateDefinition;

    fn service_name(&self) -> &str {
        TEMPLATE_SERVICE
    }

    async fn list_raw(&self) -> Result<Vec<Value>, TransportError> {
        self.api.list_templates().await
    }

    fn parse(&self, item: &Value) -> RecordParse<TemplateDefinition> {
        TemplateDefinition::from_record(Arc::clone(&self.api), self.options.clone(), item).into()
    }
}

/// Lazily discovered catalog of circuit templates.
///
/// Reads discover on first use; see [`ServiceRegistry`] for the caching
/// rules. Lookups by name before discovery fetch only that template.
#[derive(Debug)]
pub struct TemplateCatalog {
    registry: ServiceRegistry<TemplateSource>,
}

impl TemplateCatalog {
    /// Create a catalog with default options.
    pub fn new(api: Arc<dyn CircuitApi>) -> Self {
        Self::with_options(api, CatalogOptions::default())
    }

    pub fn with_options(api: Arc<dyn CircuitApi>, options: CatalogOptions) -> Self {
        Self {
            registry: ServiceRegistry::new(TemplateSource { api, options }),
        }
    }

    pub fn api(&self) -> &Arc<dyn CircuitApi> {
        &self.registry.source().api
    }

    pub fn options(&self) -> &CatalogOptions {
        &self.registry.source().options
    }

    /// The underlying registry.
    pub fn registry(&self) -> &ServiceRegistry<TemplateSource> {
        &self.registry
    }

    pub async fn discover(&mut self) -> DiscoveryOutcome {
        self.registry.discover().await
    }

    /// Drop the cache and rediscover.
    pub async fn refresh(&mut self) -> DiscoveryOutcome {
        self.registry.refresh().await
    }

    pub fn invalidate(&mut self) {
        self.registry.invalidate();
    }

    /// All templates. Empty if the catalog is unreachable.
    pub async fn templates(&mut self) -> Vec<Arc<TemplateDefinition>> {
        self.registry.instances().await
    }

    /// Templates tagged with every family in `families`.
    pub async fn templates_in_families<S: AsRef<str>>(
        &mut self,
        families: &[S],
    ) -> Vec<Arc<TemplateDefinition>> {
        self.templates()
            .await
            .into_iter()
            .filter(|t| families.iter().all(|f| t.families().contains(f.as_ref())))
            .collect()
    }

    /// Local identifiers of all templates.
    pub async fn identifiers(&mut self) -> Vec<String> {
        self.registry.identifiers().await
    }

    /// Look up a template by local identifier (`quantum_volume`).
    pub async fn get(&mut self, identifier: &str) -> CatalogResult<Arc<TemplateDefinition>> {
        Ok(self.registry.get(identifier).await?)
    }

    /// Look up a template by name.
    ///
    /// Once the catalog is discovered this is a cache scan. Before that, only
    /// the named record is fetched and cached. A missing template is always
    /// [`CatalogError::NotFound`]; an unreachable service is
    /// [`CatalogError::Transport`].
    pub async fn template(&mut self, name: &str) -> CatalogResult<Arc<TemplateDefinition>> {
        if self.registry.is_initialized() {
            return Ok(self.registry.get_by_name(name).await?);
        }
        if let Some(cached) = self.registry.cached_by_name(name) {
            return Ok(cached);
        }

        debug!("Fetching template '{}' ahead of discovery", name);
        let source = self.registry.source();
        let raw = source.api.get_template(name).await.map_err(|e| {
            if e.is_not_found() {
                CatalogError::NotFound {
                    service: TEMPLATE_SERVICE.to_string(),
                    name: name.to_string(),
                }
            } else {
                CatalogError::Transport(e)
            }
        })?;

        let definition =
            TemplateDefinition::from_record(Arc::clone(&source.api), source.options.clone(), &raw)
                .map_err(|reason| {
                    CatalogError::Protocol(format!(
                        "Malformed template record for {name}: {reason}"
                    ))
                })?;

        Ok(self.add(definition))
    }

    /// Cache a definition under a fresh identifier.
    pub fn add(&mut self, definition: TemplateDefinition) -> Arc<TemplateDefinition> {
        let id = self.registry.unique_identifier(definition.name());
        self.registry.add(id, definition)
    }

    /// Look up a template by name and instantiate it.
    pub async fn instantiate(
        &mut self,
        name: &str,
        args: &Arguments,
    ) -> CatalogResult<Instantiation> {
        self.template(name).await?.instantiate(args).await
    }
}
