//! Template definitions: validation and instantiation.
//!
//! A template is instantiated in one of two ways. Server-side templates are
//! materialized by the circuit service, which returns finished program
//! text. Remote templates stay un-decomposed: they become a [`RemoteGate`]
//! that the service resolves at submission time.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use circlib_qasm::{Program, RemoteGate};
use circlib_registry::{Named, as_record};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::api::{CircuitApi, MaterializedProgram, OUTPUT_FORMAT_QASM};
use crate::error::{CatalogError, CatalogResult};
use crate::parameter::{Arguments, ParameterSchema, value_kind};

/// Catalog-wide instantiation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogOptions {
    /// Output format requested from the server; responses must match it.
    pub output_format: String,
    /// Check argument values against parameter types.
    pub strict_types: bool,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            output_format: OUTPUT_FORMAT_QASM.to_string(),
            strict_types: false,
        }
    }
}

impl CatalogOptions {
    #[must_use]
    pub fn with_output_format(mut self, format: impl Into<String>) -> Self {
        self.output_format = format.into();
        self
    }

    #[must_use]
    pub fn with_strict_types(mut self, strict: bool) -> Self {
        self.strict_types = strict;
        self
    }
}

/// Result of instantiating a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instantiation {
    /// Program text materialized by the server.
    Program(Program),
    /// A placeholder resolved by the server at submission time.
    Remote(RemoteGate),
}

impl Instantiation {
    pub fn program(&self) -> Option<&Program> {
        match self {
            Instantiation::Program(p) => Some(p),
            Instantiation::Remote(_) => None,
        }
    }

    pub fn remote_gate(&self) -> Option<&RemoteGate> {
        match self {
            Instantiation::Remote(g) => Some(g),
            Instantiation::Program(_) => None,
        }
    }
}

/// Template record as listed by the service.
#[derive(Debug, Deserialize)]
struct RawTemplate {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default, alias = "parameters")]
    arguments: Vec<ParameterSchema>,
    #[serde(default)]
    families: Vec<String>,
    #[serde(default)]
    remote: bool,
    #[serde(default)]
    num_qubits: Option<u32>,
}

/// A named, parameterized circuit template.
#[derive(Clone)]
pub struct TemplateDefinition {
    api: Arc<dyn CircuitApi>,
    options: CatalogOptions,
    name: String,
    description: String,
    parameters: Vec<ParameterSchema>,
    families: BTreeSet<String>,
    remote: bool,
    num_qubits: Option<u32>,
}

impl TemplateDefinition {
    /// Build a definition from one raw template record.
    ///
    /// Returns the reason when the record is malformed.
    pub fn from_record(
        api: Arc<dyn CircuitApi>,
        options: CatalogOptions,
        record: &Value,
    ) -> Result<Self, String> {
        let record = as_record(record)?;
        let raw: RawTemplate =
            serde_json::from_value(Value::Object(record.clone())).map_err(|e| e.to_string())?;

        if raw.name.is_empty() {
            return Err("template name is empty".into());
        }

        Ok(Self {
            api,
            options,
            name: raw.name,
            description: raw.description,
            parameters: raw.arguments,
            families: raw.families.into_iter().collect(),
            remote: raw.remote,
            num_qubits: raw.num_qubits,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Parameters in declaration order.
    pub fn parameters(&self) -> &[ParameterSchema] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSchema> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn families(&self) -> &BTreeSet<String> {
        &self.families
    }

    /// Whether instantiation yields a [`RemoteGate`] instead of asking the
    /// server for a program.
    pub fn is_remote(&self) -> bool {
        self.remote
    }

    /// Fixed qubit count declared by the record, if any.
    pub fn num_qubits(&self) -> Option<u32> {
        self.num_qubits
    }

    pub fn options(&self) -> &CatalogOptions {
        &self.options
    }

    /// Check arguments against the parameters.
    ///
    /// Unknown and missing names are reported together in one
    /// [`CatalogError::BadArguments`]. Value types are only checked when
    /// the names are valid and strict types are enabled.
    pub fn validate(&self, args: &Arguments) -> CatalogResult<()> {
        let extras: Vec<&str> = args
            .names()
            .filter(|n| self.parameter(n).is_none())
            .collect();
        let missing: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required && !args.contains(&p.name))
            .map(|p| p.name.as_str())
            .collect();

        if !extras.is_empty() || !missing.is_empty() {
            let mut message = Vec::new();
            if !extras.is_empty() {
                message.push(format!(
                    "{} are not valid parameters for {}",
                    extras.join(","),
                    self.name
                ));
            }
            if !missing.is_empty() {
                message.push(format!(
                    "Required parameters {} are missing.",
                    missing.join(",")
                ));
            }
            return Err(CatalogError::BadArguments {
                template: self.name.clone(),
                names: extras.iter().chain(&missing).map(|n| n.to_string()).collect(),
                message: message.join("; "),
            });
        }

        if self.options.strict_types {
            self.check_types(args)?;
        }
        Ok(())
    }

    fn check_types(&self, args: &Arguments) -> CatalogResult<()> {
        let mut names = Vec::new();
        let mut problems = Vec::new();

        for (name, value) in args.iter() {
            let Some(schema) = self.parameter(name) else {
                continue;
            };
            if !schema.type_tag.accepts(value) {
                names.push(name.to_string());
                problems.push(format!(
                    "{name} expects {}, got {}",
                    schema.type_tag,
                    value_kind(value)
                ));
            }
        }

        if problems.is_empty() {
            return Ok(());
        }
        Err(CatalogError::BadArguments {
            template: self.name.clone(),
            names,
            message: format!(
                "Invalid argument types for {}: {}",
                self.name,
                problems.join("; ")
            ),
        })
    }

    /// Validate and instantiate.
    ///
    /// Remote templates produce a [`RemoteGate`] without contacting the
    /// server; all others are materialized by the server.
    pub async fn instantiate(&self, args: &Arguments) -> CatalogResult<Instantiation> {
        if self.remote {
            self.instantiate_remote(args).map(Instantiation::Remote)
        } else {
            self.materialize(args).await.map(Instantiation::Program)
        }
    }

    /// Validate and have the server materialize the program.
    ///
    /// Fails with [`CatalogError::Protocol`] if the response declares a
    /// format other than the requested one.
    pub async fn materialize(&self, args: &Arguments) -> CatalogResult<Program> {
        self.validate(args)?;

        let expected = self.options.output_format.as_str();
        let raw = self.api.materialize(&self.name, expected, args).await?;
        let response = MaterializedProgram::from_value(raw)?;
        if response.format != expected {
            return Err(CatalogError::Protocol(format!(
                "Invalid output format {} received from the server.",
                response.format
            )));
        }

        debug!("Materialized template '{}' as {}", self.name, expected);
        Ok(Program::new(response.program_text))
    }

    /// Validate and build a remote gate locally.
    ///
    /// The qubit count is the record's `num_qubits`, else an integer
    /// `num_qubits` argument.
    pub fn instantiate_remote(&self, args: &Arguments) -> CatalogResult<RemoteGate> {
        self.validate(args)?;

        let num_qubits = self
            .num_qubits
            .or_else(|| {
                args.get("num_qubits")
                    .and_then(Value::as_u64)
                    .and_then(|n| u32::try_from(n).ok())
            })
            .ok_or_else(|| CatalogError::BadArguments {
                template: self.name.clone(),
                names: vec!["num_qubits".into()],
                message: format!(
                    "Cannot determine the qubit count of {}; pass num_qubits.",
                    self.name
                ),
            })?;

        Ok(RemoteGate::new(
            self.name.clone(),
            num_qubits,
            args.bound_strings(),
        )?)
    }

    /// Multi-line description with parameters and families.
    pub fn describe(&self) -> String {
        let mut out = format!("{}: {}", self.name, self.description);
        if self.remote {
            out.push_str("\n  Remote: yes");
        }
        if !self.families.is_empty() {
            let families: Vec<&str> = self.families.iter().map(String::as_str).collect();
            out.push_str(&format!("\n  Families: {}", families.join(", ")));
        }
        if !self.parameters.is_empty() {
            out.push_str("\n  Parameters:");
            for p in &self.parameters {
                let required = if p.required { " Required." } else { "" };
                out.push_str(&format!(
                    "\n    {} ({}): {}.{}",
                    p.name, p.type_tag, p.description, required
                ));
            }
        }
        out
    }
}

impl Named for TemplateDefinition {
    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TemplateDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.parameters.iter().map(|p| p.name.as_str()).collect();
        write!(
            f,
            "{}: {}. Parameters: {}",
            self.name,
            self.description,
            names.join(", ")
        )
    }
}

impl fmt::Debug for TemplateDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateDefinition")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("families", &self.families)
            .field("remote", &self.remote)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryApi;
    use serde_json::json;

    fn qft_record() -> Value {
        json!({
            "name": "QFT",
            "description": "Quantum Fourier transform",
            "arguments": [
                {"name": "num_qubits", "description": "Width", "type": "int", "required": true},
                {"name": "inverse", "description": "Invert", "type": "bool", "required": false}
            ]
        })
    }

    fn definition(record: Value, options: CatalogOptions) -> TemplateDefinition {
        let api = Arc::new(InMemoryApi::new().with_template(record.clone()));
        TemplateDefinition::from_record(api, options, &record).unwrap()
    }

    #[test]
    fn test_from_record() {
        let qft = definition(qft_record(), CatalogOptions::default());
        assert_eq!(qft.name(), "QFT");
        assert_eq!(qft.parameters().len(), 2);
        assert!(!qft.is_remote());
        assert!(qft.families().is_empty());
    }

    #[test]
    fn test_malformed_records() {
        let api: Arc<dyn CircuitApi> = Arc::new(InMemoryApi::new());
        let options = CatalogOptions::default();
        for record in [
            json!("QFT"),
            json!({"description": "no name"}),
            json!({"name": "QFT", "arguments": [{"name": "n"}]}),
            json!({"name": ""}),
        ] {
            assert!(
                TemplateDefinition::from_record(Arc::clone(&api), options.clone(), &record)
                    .is_err(),
                "{record} should be rejected"
            );
        }
    }

    #[test]
    fn test_validation_reports_every_offending_name() {
        let qft = definition(qft_record(), CatalogOptions::default());
        let args = Arguments::new().with("width", 3).with("depth", 2);

        let err = qft.validate(&args).unwrap_err();
        assert_eq!(err.bad_argument_names(), ["width", "depth", "num_qubits"]);
        assert_eq!(
            err.to_string(),
            "width,depth are not valid parameters for QFT; \
             Required parameters num_qubits are missing."
        );
    }

    #[test]
    fn test_strict_types() {
        let args = Arguments::new().with("num_qubits", "three");

        let lenient = definition(qft_record(), CatalogOptions::default());
        assert!(lenient.validate(&args).is_ok());

        let strict = definition(qft_record(), CatalogOptions::default().with_strict_types(true));
        let err = strict.validate(&args).unwrap_err();
        assert_eq!(err.bad_argument_names(), ["num_qubits"]);
        assert!(err.to_string().contains("num_qubits expects int, got string"));
    }

    #[test]
    fn test_instantiate_remote() {
        let qft = definition(qft_record(), CatalogOptions::default());
        let gate = qft
            .instantiate_remote(&Arguments::new().with("num_qubits", 3))
            .unwrap();
        assert_eq!(gate.name(), "QFT");
        assert_eq!(gate.num_qubits(), 3);
        assert_eq!(gate.params(), ["num_qubits=3"]);
    }

    #[test]
    fn test_remote_without_qubit_count() {
        let bell = definition(json!({"name": "Bell"}), CatalogOptions::default());
        let err = bell.instantiate_remote(&Arguments::new()).unwrap_err();
        assert_eq!(err.bad_argument_names(), ["num_qubits"]);

        let bell = definition(
            json!({"name": "Bell", "num_qubits": 2, "remote": true}),
            CatalogOptions::default(),
        );
        assert_eq!(bell.instantiate_remote(&Arguments::new()).unwrap().num_qubits(), 2);
    }

    #[test]
    fn test_describe_and_display() {
        let qft = definition(qft_record(), CatalogOptions::default());
        assert_eq!(
            qft.to_string(),
            "QFT: Quantum Fourier transform. Parameters: num_qubits, inverse"
        );
        let text = qft.describe();
        assert!(text.contains("\n    num_qubits (int): Width. Required."));
        assert!(text.contains("\n    inverse (bool): Invert."));
    }
}
