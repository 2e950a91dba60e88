//! Templates, families and submission assembly behind one handle.

use std::sync::Arc;

use circlib_qasm::{Program, SubmissionAssembler, SubmissionPayload};
use tracing::warn;

use crate::api::CircuitApi;
use crate::catalog::TemplateCatalog;
use crate::error::CatalogResult;
use crate::family::FamilyCatalog;
use crate::parameter::Arguments;
use crate::template::{CatalogOptions, Instantiation, TemplateDefinition};

/// Entry point to one circuit service.
///
/// Both catalogs are separate registries over the same service and are
/// discovered independently.
#[derive(Debug)]
pub struct CircuitService {
    pub templates: TemplateCatalog,
    pub families: FamilyCatalog,
    assembler: SubmissionAssembler,
}

impl CircuitService {
    pub fn new(api: Arc<dyn CircuitApi>) -> Self {
        Self::with_options(api, CatalogOptions::default())
    }

    pub fn with_options(api: Arc<dyn CircuitApi>, options: CatalogOptions) -> Self {
        Self {
            templates: TemplateCatalog::with_options(Arc::clone(&api), options),
            families: FamilyCatalog::new(api),
            assembler: SubmissionAssembler::new(),
        }
    }

    #[must_use]
    pub fn with_assembler(mut self, assembler: SubmissionAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    /// Rediscover templates and families.
    pub async fn refresh(&mut self) {
        self.templates.refresh().await;
        self.families.refresh().await;
    }

    /// Instantiate a template by name.
    pub async fn instantiate(
        &mut self,
        name: &str,
        args: &Arguments,
    ) -> CatalogResult<Instantiation> {
        self.templates.instantiate(name, args).await
    }

    /// Templates listed as members of the named family.
    ///
    /// Members missing from the template catalog are skipped with a warning.
    pub async fn family_templates(
        &mut self,
        family: &str,
    ) -> CatalogResult<Vec<Arc<TemplateDefinition>>> {
        let family = self.families.family(family).await?;
        let mut templates = Vec::with_capacity(family.members.len());
        for member in &family.members {
            match self.templates.template(member).await {
                Ok(template) => templates.push(template),
                Err(e) => warn!(
                    "Family '{}' lists template '{}' which is not available: {}",
                    family.name, member, e
                ),
            }
        }
        Ok(templates)
    }

    /// Rewrite programs into one submission.
    pub fn assemble(&self, programs: &[Program]) -> CatalogResult<SubmissionPayload> {
        Ok(self.assembler.assemble(programs)?)
    }
}
