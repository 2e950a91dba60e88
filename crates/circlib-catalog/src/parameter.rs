//! Template parameters and caller-supplied arguments.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Declared type of a template parameter.
///
/// Type names come from server data. Unknown names are kept verbatim and
/// accept any value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TypeTag {
    String,
    Integer,
    Float,
    Boolean,
    IntegerArray,
    Other(String),
}

impl TypeTag {
    /// Whether `value` is acceptable for this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            TypeTag::String => value.is_string(),
            TypeTag::Integer => value.is_i64() || value.is_u64(),
            TypeTag::Float => value.is_number(),
            TypeTag::Boolean => value.is_boolean(),
            TypeTag::IntegerArray => value
                .as_array()
                .is_some_and(|items| items.iter().all(|v| v.is_i64() || v.is_u64())),
            TypeTag::Other(_) => true,
        }
    }
}

impl From<&str> for TypeTag {
    fn from(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "str" | "string" => TypeTag::String,
            "int" | "integer" => TypeTag::Integer,
            "float" | "double" | "number" | "real" => TypeTag::Float,
            "bool" | "boolean" => TypeTag::Boolean,
            "int_array" | "integer_array" | "array_of_integer" | "array-of-integer"
            | "list[int]" | "list[integer]" | "array<int>" | "array<integer>" | "int[]"
            | "integer[]" => TypeTag::IntegerArray,
            _ => TypeTag::Other(name.to_string()),
        }
    }
}

impl From<String> for TypeTag {
    fn from(name: String) -> Self {
        TypeTag::from(name.as_str())
    }
}

impl From<TypeTag> for String {
    fn from(tag: TypeTag) -> Self {
        tag.to_string()
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::String => write!(f, "string"),
            TypeTag::Integer => write!(f, "int"),
            TypeTag::Float => write!(f, "float"),
            TypeTag::Boolean => write!(f, "bool"),
            TypeTag::IntegerArray => write!(f, "int_array"),
            TypeTag::Other(name) => write!(f, "{name}"),
        }
    }
}

/// JSON kind of a value, for error messages.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One named parameter of a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSchema {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub type_tag: TypeTag,
    #[serde(default)]
    pub required: bool,
}

impl fmt::Display for ParameterSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}. Type={}, Required={}",
            self.name, self.description, self.type_tag, self.required
        )
    }
}

/// Render an argument value the way it appears in `name=value` strings.
///
/// Strings are written raw; everything else uses compact JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Named arguments in call order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Vec<(String, Value)>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert an argument; an existing name keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.values.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `name=value` strings in call order.
    pub fn bound_strings(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|(n, v)| format!("{n}={}", render_value(v)))
            .collect()
    }

    /// Parse a `name=value` assignment.
    ///
    /// The value is read as JSON when it parses (`3`, `true`, `[1,2]`) and
    /// kept as a string otherwise.
    pub fn parse_assignment(text: &str) -> Option<(String, Value)> {
        let (name, raw) = text.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let raw = raw.trim();
        let value =
            serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        Some((name.to_string(), value))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = Arguments::new();
        for (name, value) in iter {
            args.insert(name, value);
        }
        args
    }
}

impl Serialize for Arguments {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
