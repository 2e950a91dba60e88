//! In-process circuit service.
//!
//! Serves a fixed catalog from memory. Used as the test double for the
//! remote service and by the CLI's `--catalog FILE` mode.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use circlib_qasm::{ProgramBuilder, RemoteGate};
use circlib_registry::TransportError;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::api::CircuitApi;
use crate::parameter::Arguments;

/// Catalog file layout accepted by [`InMemoryApi::from_json`].
#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    templates: Vec<Value>,
    #[serde(default, alias = "groups")]
    families: Vec<Value>,
    #[serde(default)]
    programs: FxHashMap<String, String>,
}

/// A [`CircuitApi`] backed by in-memory records.
///
/// Without a canned program, materialization embeds the template as a
/// remote gate in a fresh program.
#[derive(Debug, Default)]
pub struct InMemoryApi {
    templates: Vec<Value>,
    groups: Vec<Value>,
    programs: FxHashMap<String, String>,
    response_format: Option<String>,
    unreachable: AtomicBool,
    list_calls: AtomicUsize,
    group_list_calls: AtomicUsize,
    get_calls: AtomicUsize,
    materialize_calls: AtomicUsize,
}

impl InMemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `{"templates": [...], "families": [...], "programs": {...}}`.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let file: CatalogFile = serde_json::from_str(text)?;
        Ok(Self {
            templates: file.templates,
            groups: file.families,
            programs: file.programs,
            ..Self::default()
        })
    }

    #[must_use]
    pub fn with_template(mut self, record: Value) -> Self {
        self.templates.push(record);
        self
    }

    #[must_use]
    pub fn with_group(mut self, record: Value) -> Self {
        self.groups.push(record);
        self
    }

    /// Serve `text` when `name` is materialized.
    #[must_use]
    pub fn with_program(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.programs.insert(name.into(), text.into());
        self
    }

    /// Declare `format` in every materialization response.
    #[must_use]
    pub fn with_response_format(mut self, format: impl Into<String>) -> Self {
        self.response_format = Some(format.into());
        self
    }

    /// Make every call fail as if the service were down.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn group_list_calls(&self) -> usize {
        self.group_list_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn materialize_calls(&self) -> usize {
        self.materialize_calls.load(Ordering::SeqCst)
    }

    fn check_reachable(&self) -> Result<(), TransportError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(TransportError::new("circuit service is unreachable"));
        }
        Ok(())
    }

    fn find_template(&self, name: &str) -> Result<&Value, TransportError> {
        self.templates
            .iter()
            .find(|t| t.get("name").and_then(Value::as_str) == Some(name))
            .ok_or_else(|| TransportError::with_status(404, format!("Circuit {name} not found")))
    }

    fn default_program(
        template: &Value,
        name: &str,
        arguments: &Arguments,
    ) -> Result<String, TransportError> {
        let num_qubits = template
            .get("num_qubits")
            .or_else(|| arguments.get("num_qubits"))
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(1);

        let bad_request =
            |e: circlib_qasm::QasmError| TransportError::with_status(400, e.to_string());
        let gate =
            RemoteGate::new(name, num_qubits, arguments.bound_strings()).map_err(bad_request)?;
        let qubits: Vec<u32> = (0..num_qubits).collect();
        let program = ProgramBuilder::new(num_qubits, num_qubits)
            .remote_gate(&gate, &qubits)
            .map_err(bad_request)?
            .measure_all()
            .build();
        Ok(program.into_string())
    }
}

#[async_trait]
impl CircuitApi for InMemoryApi {
    async fn list_templates(&self) -> Result<Vec<Value>, TransportError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reachable()?;
        Ok(self.templates.clone())
    }

    async fn get_template(&self, name: &str) -> Result<Value, TransportError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reachable()?;
        self.find_template(name).cloned()
    }

    async fn materialize(
        &self,
        name: &str,
        output_format: &str,
        arguments: &Arguments,
    ) -> Result<Value, TransportError> {
        self.materialize_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reachable()?;
        let template = self.find_template(name)?;

        let text = match self.programs.get(name) {
            Some(text) => text.clone(),
            None => Self::default_program(template, name, arguments)?,
        };
        let format = self.response_format.as_deref().unwrap_or(output_format);

        Ok(json!({ "format": format, "circuit": text }))
    }

    async fn list_groups(&self) -> Result<Vec<Value>, TransportError> {
        self.group_list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reachable()?;
        Ok(self.groups.clone())
    }
}
