//! Generic per-resource state exchanged with the host.
//!
//! `ResourceData` is the loosely-typed side of the bridge: an id string plus
//! a JSON attribute map, checked against the resource's `Block` on every
//! write. An empty id means the resource does not exist (yet, or anymore).

use serde_json::{Map, Value};

use crate::schema::{Block, SchemaError};

#[derive(Debug, Clone)]
pub struct ResourceData {
    schema: Block,
    id: String,
    attributes: Map<String, Value>,
}

impl ResourceData {
    pub fn new(schema: Block) -> Self {
        Self {
            schema,
            id: String::new(),
            attributes: Map::new(),
        }
    }

    /// Build from user configuration, enforcing required attributes.
    pub fn from_config(schema: Block, config: Value) -> Result<Self, SchemaError> {
        let Value::Object(attributes) = config else {
            return Err(SchemaError::NotAnObject);
        };
        schema.validate_config(&attributes)?;
        Ok(Self {
            schema,
            id: String::new(),
            attributes,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Store `value` under `key` after type-checking it against the schema.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), SchemaError> {
        self.schema.validate_attribute(key, &value)?;
        self.attributes.insert(key.to_string(), value);
        Ok(())
    }

    /// Objects of the `items` list; empty when the list is absent.
    pub fn items(&self) -> Vec<Map<String, Value>> {
        self.get("items")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(|i| i.as_object().cloned()).collect())
            .unwrap_or_default()
    }

    /// Attributes plus the id, as one JSON object. A schema that declares its
    /// own `id` attribute keeps that value.
    pub fn state(&self) -> Value {
        let mut state = self.attributes.clone();
        if self.schema.get("id").is_none() {
            state.insert("id".to_string(), Value::String(self.id.clone()));
        }
        Value::Object(state)
    }
}
