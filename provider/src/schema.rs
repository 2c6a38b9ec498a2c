//! Attribute schemas for the provider, the task resource and the task data source.
//!
//! # Design
//! A `Block` is an ordered map of attribute names to `Attribute`s. Nested
//! blocks appear as `AttributeType::List(Block)`, which is how the task
//! `items` list is described. `ResourceData` validates every value it stores
//! against its block, so a flattened task with a wrong field type is caught
//! before it reaches the host.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeType {
    String,
    Int,
    Bool,
    List(Block),
}

impl AttributeType {
    fn name(&self) -> &'static str {
        match self {
            AttributeType::String => "string",
            AttributeType::Int => "int",
            AttributeType::Bool => "bool",
            AttributeType::List(_) => "list",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub ty: AttributeType,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub max_items: Option<usize>,
}

impl Attribute {
    pub fn required(ty: AttributeType) -> Self {
        Self {
            ty,
            required: true,
            optional: false,
            computed: false,
            max_items: None,
        }
    }

    pub fn optional(ty: AttributeType) -> Self {
        Self {
            ty,
            required: false,
            optional: true,
            computed: false,
            max_items: None,
        }
    }

    /// Optional in configuration, filled by the service when absent.
    pub fn optional_computed(ty: AttributeType) -> Self {
        Self {
            computed: true,
            ..Self::optional(ty)
        }
    }

    /// Set only by the provider.
    pub fn computed(ty: AttributeType) -> Self {
        Self {
            ty,
            required: false,
            optional: false,
            computed: true,
            max_items: None,
        }
    }

    pub fn with_max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("unknown attribute '{0}'")]
    UnknownAttribute(String),

    #[error("attribute '{path}' must be of type {expected}")]
    TypeMismatch { path: String, expected: &'static str },

    #[error("attribute '{path}' allows at most {max} item(s), got {actual}")]
    TooManyItems { path: String, max: usize, actual: usize },

    #[error("attribute '{0}' is required")]
    MissingRequired(String),

    #[error("configuration must be an object")]
    NotAnObject,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    attributes: BTreeMap<&'static str, Attribute>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, attribute: Attribute) -> Self {
        self.attributes.insert(name, attribute);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.attributes.keys().copied()
    }

    /// Type-check one attribute value. `null` is accepted for every type.
    pub fn validate_attribute(&self, name: &str, value: &Value) -> Result<(), SchemaError> {
        let attribute = self
            .get(name)
            .ok_or_else(|| SchemaError::UnknownAttribute(name.to_string()))?;
        check_value(name, attribute, value, false)
    }

    /// Type-check every entry of `values`.
    pub fn validate(&self, values: &Map<String, Value>) -> Result<(), SchemaError> {
        self.check_object("", values, false)
    }

    /// Like `validate`, and additionally require every required attribute,
    /// including those of nested blocks.
    pub fn validate_config(&self, values: &Map<String, Value>) -> Result<(), SchemaError> {
        self.check_object("", values, true)
    }

    fn check_object(&self, prefix: &str, values: &Map<String, Value>, config: bool) -> Result<(), SchemaError> {
        for (name, value) in values {
            let path = join(prefix, name);
            let attribute = self.get(name).ok_or(SchemaError::UnknownAttribute(path.clone()))?;
            check_value(&path, attribute, value, config)?;
        }
        if config {
            for (name, attribute) in &self.attributes {
                let present = values.get(*name).is_some_and(|v| !v.is_null());
                if attribute.required && !present {
                    return Err(SchemaError::MissingRequired(join(prefix, name)));
                }
            }
        }
        Ok(())
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn check_value(path: &str, attribute: &Attribute, value: &Value, config: bool) -> Result<(), SchemaError> {
    if value.is_null() {
        return Ok(());
    }
    let mismatch = || SchemaError::TypeMismatch {
        path: path.to_string(),
        expected: attribute.ty.name(),
    };
    match &attribute.ty {
        AttributeType::String => value.is_string().then_some(()).ok_or_else(mismatch),
        AttributeType::Int => value.is_i64().then_some(()).ok_or_else(mismatch),
        AttributeType::Bool => value.is_boolean().then_some(()).ok_or_else(mismatch),
        AttributeType::List(block) => {
            let items = value.as_array().ok_or_else(mismatch)?;
            if let Some(max) = attribute.max_items {
                if items.len() > max {
                    return Err(SchemaError::TooManyItems {
                        path: path.to_string(),
                        max,
                        actual: items.len(),
                    });
                }
            }
            for (index, item) in items.iter().enumerate() {
                let object = item.as_object().ok_or_else(mismatch)?;
                block.check_object(&format!("{path}.{index}"), object, config)?;
            }
            Ok(())
        }
    }
}

/// Fields of one task inside an `items` list.
pub fn task_item_block() -> Block {
    Block::new()
        .with("id", Attribute::optional_computed(AttributeType::Int))
        .with("title", Attribute::required(AttributeType::String))
        .with("description", Attribute::optional_computed(AttributeType::String))
        .with("priority", Attribute::optional_computed(AttributeType::Int))
        .with("completed", Attribute::optional_computed(AttributeType::Bool))
        .with("start_date", Attribute::optional_computed(AttributeType::String))
        .with("due_date", Attribute::optional_computed(AttributeType::String))
        .with("time_updated", Attribute::optional_computed(AttributeType::String))
        .with("time_created", Attribute::optional_computed(AttributeType::String))
}

/// Managed task resource: exactly one task in `items`.
pub fn task_resource_schema() -> Block {
    Block::new()
        .with("last_updated", Attribute::optional_computed(AttributeType::String))
        .with(
            "items",
            Attribute::required(AttributeType::List(task_item_block())).with_max_items(1),
        )
}

/// Read-only task lookup keyed by `id`.
pub fn task_data_source_schema() -> Block {
    Block::new()
        .with("id", Attribute::required(AttributeType::Int))
        .with("items", Attribute::computed(AttributeType::List(task_item_block())))
}

/// Provider-level settings. `host` falls back to the environment when unset.
pub fn provider_schema() -> Block {
    Block::new()
        .with("host", Attribute::optional(AttributeType::String))
        .with("timeout_secs", Attribute::optional(AttributeType::Int))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn resource_config_requires_items_and_title() {
        let schema = task_resource_schema();
        assert_eq!(
            schema.validate_config(&object(json!({}))),
            Err(SchemaError::MissingRequired("items".to_string()))
        );
        assert_eq!(
            schema.validate_config(&object(json!({"items": [{"priority": 1}]}))),
            Err(SchemaError::MissingRequired("items.0.title".to_string()))
        );
        assert!(schema
            .validate_config(&object(json!({"items": [{"title": "ok", "priority": 1}]})))
            .is_ok());
    }

    #[test]
    fn items_allow_a_single_task() {
        let err = task_resource_schema()
            .validate(&object(json!({"items": [{"title": "a"}, {"title": "b"}]})))
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::TooManyItems {
                path: "items".to_string(),
                max: 1,
                actual: 2
            }
        );
    }

    #[test]
    fn nested_type_mismatch_reports_path() {
        let err = task_resource_schema()
            .validate(&object(json!({"items": [{"title": "a", "priority": "high"}]})))
            .unwrap_err();
        assert_eq!(err.to_string(), "attribute 'items.0.priority' must be of type int");
    }

    #[test]
    fn nulls_are_accepted() {
        assert!(task_item_block().validate(&object(json!({"title": null, "id": null}))).is_ok());
    }

    #[test]
    fn unknown_attributes_are_rejected() {
        let err = task_data_source_schema().validate_attribute("owner", &json!("me")).unwrap_err();
        assert_eq!(err, SchemaError::UnknownAttribute("owner".to_string()));
    }

    #[test]
    fn data_source_requires_id() {
        let schema = task_data_source_schema();
        assert!(schema.get("id").unwrap().required);
        assert!(schema.get("items").unwrap().computed);
        assert!(schema.validate_config(&object(json!({"id": 3}))).is_ok());
    }

    #[test]
    fn item_block_lists_every_task_field() {
        let names: Vec<_> = task_item_block().names().collect();
        assert_eq!(
            names,
            vec![
                "completed",
                "description",
                "due_date",
                "id",
                "priority",
                "start_date",
                "time_created",
                "time_updated",
                "title"
            ]
        );
    }
}
