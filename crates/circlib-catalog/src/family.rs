//! Template families: named groups of templates.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use circlib_registry::{
    DiscoveryOutcome, Named, RecordParse, ServiceRegistry, ServiceSource, TransportError,
    as_record,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::CircuitApi;
use crate::error::CatalogResult;

/// Service kind used in logs and errors.
pub const FAMILY_SERVICE: &str = "family";

/// A named group of templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateFamily {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Template names in this family.
    #[serde(default)]
    pub members: Vec<String>,
}

impl Named for TemplateFamily {
    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TemplateFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({} templates)",
            self.name,
            self.description,
            self.members.len()
        )
    }
}

/// Lists family records.
pub struct FamilySource {
    api: Arc<dyn CircuitApi>,
}

#[async_trait]
impl ServiceSource for FamilySource {
    type Instance = TemplateFamily;

    fn service_name(&self) -> &str {
        FAMILY_SERVICE
    }

    async fn list_raw(&self) -> Result<Vec<Value>, TransportError> {
        self.api.list_groups().await
    }

    fn parse(&self, item: &Value) -> RecordParse<TemplateFamily> {
        match as_record(item) {
            Ok(record) => {
                serde_json::from_value::<TemplateFamily>(Value::Object(record.clone())).into()
            }
            Err(reason) => RecordParse::malformed(reason),
        }
    }
}

/// Lazily discovered catalog of template families.
#[derive(Debug)]
pub struct FamilyCatalog {
    registry: ServiceRegistry<FamilySource>,
}

impl FamilyCatalog {
    pub fn new(api: Arc<dyn CircuitApi>) -> Self {
        Self {
            registry: ServiceRegistry::new(FamilySource { api }),
        }
    }

    pub fn registry(&self) -> &ServiceRegistry<FamilySource> {
        &self.registry
    }

    pub async fn discover(&mut self) -> DiscoveryOutcome {
        self.registry.discover().await
    }

    pub async fn refresh(&mut self) -> DiscoveryOutcome {
        self.registry.refresh().await
    }

    /// All families. Empty if the service is unreachable.
    pub async fn families(&mut self) -> Vec<Arc<TemplateFamily>> {
        self.registry.instances().await
    }

    pub async fn identifiers(&mut self) -> Vec<String> {
        self.registry.identifiers().await
    }

    /// Look up a family by local identifier.
    pub async fn get(&mut self, identifier: &str) -> CatalogResult<Arc<TemplateFamily>> {
        Ok(self.registry.get(identifier).await?)
    }

    /// Look up a family by name.
    pub async fn family(&mut self, name: &str) -> CatalogResult<Arc<TemplateFamily>> {
        Ok(self.registry.get_by_name(name).await?)
    }
}
