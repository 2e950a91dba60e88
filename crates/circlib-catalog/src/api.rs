//! The remote circuit service as seen by the catalog.

use async_trait::async_trait;
use circlib_registry::TransportError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CatalogError, CatalogResult};
use crate::parameter::Arguments;

/// Output format identifier for OpenQASM 2 program text.
pub const OUTPUT_FORMAT_QASM: &str = "QASM";

/// Operations the catalog needs from the circuit service.
///
/// Responses are raw JSON; shape checks belong to the catalog. Failures are
/// reported as [`TransportError`] and passed to callers unchanged.
#[async_trait]
pub trait CircuitApi: Send + Sync {
    /// List every template record.
    async fn list_templates(&self) -> Result<Vec<Value>, TransportError>;

    /// Fetch one template record by name.
    ///
    /// A missing template is reported with status 404.
    async fn get_template(&self, name: &str) -> Result<Value, TransportError>;

    /// Ask the server to materialize a template into program text.
    async fn materialize(
        &self,
        name: &str,
        output_format: &str,
        arguments: &Arguments,
    ) -> Result<Value, TransportError>;

    /// List every template family record.
    async fn list_groups(&self) -> Result<Vec<Value>, TransportError>;
}

/// A materialization response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializedProgram {
    /// Declared output format.
    pub format: String,
    /// Program text in that format.
    #[serde(alias = "circuit")]
    pub program_text: String,
}

impl MaterializedProgram {
    /// Parse a raw response.
    pub fn from_value(value: Value) -> CatalogResult<Self> {
        serde_json::from_value(value).map_err(|e| {
            CatalogError::Protocol(format!("Invalid materialization response: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accepts_circuit_alias() {
        let program = MaterializedProgram::from_value(json!({
            "format": "QASM",
            "circuit": "OPENQASM 2.0;\n"
        }))
        .unwrap();
        assert_eq!(program.program_text, "OPENQASM 2.0;\n");
    }

    #[test]
    fn test_missing_fields_are_protocol_errors() {
        let err = MaterializedProgram::from_value(json!({"format": "QASM"})).unwrap_err();
        assert!(matches!(err, CatalogError::Protocol(_)));
    }
}
