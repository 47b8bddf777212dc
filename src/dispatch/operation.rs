use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Hierarchical resource address, e.g. `/host=primary/server=backend-1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    segments: Vec<(String, String)>,
}

impl Address {
    /// The management root, `/`.
    pub fn root() -> Self {
        Self::default()
    }

    /// Appends one `type=value` segment.
    pub fn and(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.segments.push((key.into(), value.into()));
        self
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = (&str, &str)> {
        self.segments
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub(crate) fn as_json(&self) -> Value {
        Value::Array(
            self.segments
                .iter()
                .map(|(key, value)| {
                    let mut segment = Map::new();
                    segment.insert(key.clone(), Value::String(value.clone()));
                    Value::Object(segment)
                })
                .collect(),
        )
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for (key, value) in &self.segments {
            write!(f, "/{key}={value}")?;
        }
        Ok(())
    }
}

/// A single management action: address, action name and parameters.
/// Immutable once built; use [`Operation::builder`] to attach parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    address: Address,
    name: String,
    params: Map<String, Value>,
}

impl Operation {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            address,
            name: name.into(),
            params: Map::new(),
        }
    }

    pub fn builder(name: impl Into<String>, address: Address) -> OperationBuilder {
        OperationBuilder {
            operation: Self::new(name, address),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// CLI notation used in logs and failure messages, e.g.
    /// `/host=primary:read-resource(recursive=true)`.
    pub fn as_cli(&self) -> String {
        let address = if self.address.is_root() {
            String::new()
        } else {
            self.address.to_string()
        };
        if self.params.is_empty() {
            format!("{address}:{}", self.name)
        } else {
            let params = self
                .params
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect::<Vec<_>>()
                .join(",");
            format!("{address}:{}({params})", self.name)
        }
    }

    pub(crate) fn as_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("operation".to_string(), Value::String(self.name.clone()));
        body.insert("address".to_string(), self.address.as_json());
        for (key, value) in &self.params {
            body.insert(key.clone(), value.clone());
        }
        Value::Object(body)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_cli())
    }
}

pub struct OperationBuilder {
    operation: Operation,
}

impl OperationBuilder {
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.operation.params.insert(name.into(), value.into());
        self
    }

    pub fn build(self) -> Operation {
        self.operation
    }
}

/// An ordered batch of operations submitted as one network exchange.
/// The result of a composite is positionally ordered: step *k* of the
/// response belongs to operation *k* of the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composite {
    steps: Vec<Operation>,
}

impl Composite {
    pub fn new(steps: Vec<Operation>) -> Self {
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.steps.iter()
    }

    pub fn as_cli(&self) -> String {
        let steps = self
            .steps
            .iter()
            .map(Operation::as_cli)
            .collect::<Vec<_>>()
            .join(", ");
        format!("composite[{steps}]")
    }

    pub(crate) fn as_json(&self) -> Value {
        json!({
            "operation": "composite",
            "address": [],
            "steps": self.steps.iter().map(Operation::as_json).collect::<Vec<_>>(),
        })
    }
}

impl FromIterator<Operation> for Composite {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for Composite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_cli())
    }
}
