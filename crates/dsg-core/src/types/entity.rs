//! Declarative entity model consumed by generation stages.

use serde::{Deserialize, Serialize};

/// Data type of an entity field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnumDataType {
    SingleLineText,
    MultiLineText,
    Email,
    WholeNumber,
    DateTime,
    DecimalNumber,
    Lookup,
    MultiSelectOptionSet,
    OptionSet,
    Boolean,
    Id,
    CreatedAt,
    UpdatedAt,
    GeographicLocation,
    Roles,
    Username,
    Password,
    Json,
}

/// A single field of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityField {
    /// Field identifier.
    pub id: String,
    /// Identifier stable across renames.
    pub permanent_id: String,
    /// Code name of the field.
    pub name: String,
    /// Human-readable name.
    pub display_name: String,
    /// Data type.
    pub data_type: EnumDataType,
    /// Whether a value is required.
    #[serde(default)]
    pub required: bool,
    /// Whether values must be unique.
    #[serde(default)]
    pub unique: bool,
    /// Whether the field is searchable.
    #[serde(default)]
    pub searchable: bool,
    /// Type-specific properties (related entity, option set values, ...).
    #[serde(default)]
    pub properties: serde_json::Value,
}

impl EntityField {
    /// Creates a field with the given name and data type.
    pub fn new(name: impl Into<String>, data_type: EnumDataType) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            permanent_id: name.clone(),
            display_name: name.clone(),
            name,
            data_type,
            required: false,
            unique: false,
            searchable: false,
            properties: serde_json::Value::Null,
        }
    }

    /// Marks the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// An entity of the generated application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Entity identifier.
    pub id: String,
    /// Code name of the entity.
    pub name: String,
    /// Human-readable name.
    pub display_name: String,
    /// Human-readable plural name.
    pub plural_display_name: String,
    /// Fields, in declaration order.
    #[serde(default)]
    pub fields: Vec<EntityField>,
}

impl Entity {
    /// Creates an entity without fields.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            display_name: name.clone(),
            plural_display_name: format!("{name}s"),
            name,
            fields: Vec::new(),
        }
    }

    /// Appends a field.
    pub fn with_field(mut self, field: EntityField) -> Self {
        self.fields.push(field);
        self
    }

    /// Returns the fields holding secrets that must be hashed by services.
    pub fn password_fields(&self) -> Vec<EntityField> {
        self.fields
            .iter()
            .filter(|f| f.data_type == EnumDataType::Password)
            .cloned()
            .collect()
    }

    /// Returns a field by name.
    pub fn field(&self, name: &str) -> Option<&EntityField> {
        self.fields.iter().find(|f| f.name == name)
    }
}
