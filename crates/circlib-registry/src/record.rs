//! Raw listing records and the parse step that classifies them.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;

/// A raw record as returned by a remote listing.
pub type RawRecord = serde_json::Map<String, Value>;

/// Outcome of parsing one raw listing item.
#[derive(Debug)]
pub enum RecordParse<T> {
    /// The item was a well-formed record and converted to an instance.
    Valid(T),
    /// The item was skipped.
    Malformed {
        /// Why the item was rejected.
        reason: String,
    },
}

impl<T> RecordParse<T> {
    /// Reject an item with a reason.
    pub fn malformed(reason: impl Into<String>) -> Self {
        RecordParse::Malformed {
            reason: reason.into(),
        }
    }

    /// Whether this outcome holds an instance.
    pub fn is_valid(&self) -> bool {
        matches!(self, RecordParse::Valid(_))
    }

    /// Convert into a `Result`, turning the rejection reason into the error.
    pub fn into_result(self) -> Result<T, String> {
        match self {
            RecordParse::Valid(instance) => Ok(instance),
            RecordParse::Malformed { reason } => Err(reason),
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for RecordParse<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(instance) => RecordParse::Valid(instance),
            Err(e) => RecordParse::malformed(e.to_string()),
        }
    }
}

/// Borrow an item as a record, or explain why it is not one.
pub fn as_record(item: &Value) -> Result<&RawRecord, String> {
    match item {
        Value::Object(map) => Ok(map),
        Value::Null => Err("expected a record, found null".into()),
        Value::Bool(_) => Err("expected a record, found a boolean".into()),
        Value::Number(_) => Err("expected a record, found a number".into()),
        Value::String(_) => Err("expected a record, found a string".into()),
        Value::Array(_) => Err("expected a record, found an array".into()),
    }
}

/// Anything a registry can look up by its domain name.
pub trait Named {
    /// The natural (remote) name of this instance.
    fn name(&self) -> &str;
}

/// The catalog-specific half of a registry.
///
/// A source knows how to list raw items from the remote collaborator and
/// how to turn one raw item into a domain instance. The registry owns
/// everything else: caching, identifiers, and the discovery state.
#[async_trait]
pub trait ServiceSource: Send + Sync {
    /// Domain type produced by this source.
    type Instance: Named + Send + Sync;

    /// Service kind used in log lines and error messages (e.g. `"circuit"`).
    fn service_name(&self) -> &str;

    /// Fetch the raw listing from the remote collaborator.
    async fn list_raw(&self) -> Result<Vec<Value>, TransportError>;

    /// Classify one raw item.
    fn parse(&self, item: &Value) -> RecordParse<Self::Instance>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_as_record() {
        assert!(as_record(&json!({"name": "QFT"})).is_ok());
        let err = as_record(&json!("QFT")).unwrap_err();
        assert!(err.contains("string"));
    }

    #[test]
    fn test_record_parse_from_result() {
        let ok: RecordParse<u32> = Ok::<_, String>(3).into();
        assert!(ok.is_valid());

        let bad: RecordParse<u32> = Err::<u32, _>("missing field `name`").into();
        assert_eq!(bad.into_result().unwrap_err(), "missing field `name`");
    }
}
