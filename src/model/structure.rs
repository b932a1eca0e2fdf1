//! Entity structure: declared fields, key and relations of one entity.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared type of a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Integer,
    Float,
    Bool,
    #[default]
    String,
}

impl FieldType {
    /// Map a declared type name (`int`, `float`, `bool`, ...) to a field type.
    ///
    /// Unrecognised names fall back to [`FieldType::String`].
    pub fn from_declared(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" => FieldType::Integer,
            "float" | "double" => FieldType::Float,
            "bool" | "boolean" => FieldType::Bool,
            _ => FieldType::String,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Integer => write!(f, "integer"),
            FieldType::Float => write!(f, "float"),
            FieldType::Bool => write!(f, "bool"),
            FieldType::String => write!(f, "string"),
        }
    }
}

/// Cardinality of a relation, seen from the owning entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// One-to-one relationship
    OneToOne,
    /// One-to-many relationship
    OneToMany,
    /// Many-to-one relationship
    ManyToOne,
}

impl Cardinality {
    /// Reverse the cardinality (swap owner/target sides).
    pub fn reverse(self) -> Self {
        match self {
            Cardinality::OneToMany => Cardinality::ManyToOne,
            Cardinality::ManyToOne => Cardinality::OneToMany,
            Cardinality::OneToOne => Cardinality::OneToOne,
        }
    }

    /// True if the owner holds a collection of targets.
    pub fn is_collection(&self) -> bool {
        matches!(self, Cardinality::OneToMany)
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::OneToOne => write!(f, "1:1"),
            Cardinality::OneToMany => write!(f, "1:N"),
            Cardinality::ManyToOne => write!(f, "N:1"),
        }
    }
}

/// A declared relation from an owning entity to a target entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    #[serde(rename = "target")]
    pub target_entity_id: String,
    pub cardinality: Cardinality,
    /// Join field on the owning entity.
    #[serde(default)]
    pub owner_field: String,
    /// Join field on the target entity.
    #[serde(default)]
    pub target_field: String,
}

impl Relation {
    pub fn new(cardinality: Cardinality, target_entity_id: impl Into<String>) -> Self {
        Self {
            target_entity_id: target_entity_id.into(),
            cardinality,
            owner_field: String::new(),
            target_field: String::new(),
        }
    }

    /// Set the join fields (`owner.owner_field = target.target_field`).
    pub fn on(mut self, owner_field: impl Into<String>, target_field: impl Into<String>) -> Self {
        self.owner_field = owner_field.into();
        self.target_field = target_field.into();
        self
    }
}

/// A declared scalar field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
}

/// Fields, key and relations of one entity. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityStructure {
    #[serde(rename = "id")]
    pub entity_id: String,
    /// Scalar fields in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    /// Key field names; more than one means a composite key.
    #[serde(default)]
    pub key: Vec<String>,
    #[serde(default)]
    pub relations: BTreeMap<String, Relation>,
}

impl EntityStructure {
    pub fn builder(entity_id: impl Into<String>) -> EntityStructureBuilder {
        EntityStructureBuilder {
            structure: EntityStructure {
                entity_id: entity_id.into(),
                fields: Vec::new(),
                key: Vec::new(),
                relations: BTreeMap::new(),
            },
        }
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.field_type)
    }

    /// The single key field, if the key is not composite.
    pub fn key_field_name(&self) -> Option<&str> {
        match self.key.as_slice() {
            [single] => Some(single),
            _ => None,
        }
    }

    pub fn key_field_names(&self) -> &[String] {
        &self.key
    }

    pub fn has_composite_key(&self) -> bool {
        self.key.len() > 1
    }

    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations.get(name)
    }

    pub fn relation_names(&self) -> impl Iterator<Item = &str> {
        self.relations.keys().map(String::as_str)
    }
}

/// Builder for [`EntityStructure`].
#[derive(Debug, Clone)]
pub struct EntityStructureBuilder {
    structure: EntityStructure,
}

impl EntityStructureBuilder {
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.structure.fields.push(FieldDef {
            name: name.into(),
            field_type,
        });
        self
    }

    /// Add a field that is also part of the key.
    pub fn key_field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        self.structure.key.push(name.clone());
        self.field(name, field_type)
    }

    pub fn relation(mut self, name: impl Into<String>, relation: Relation) -> Self {
        self.structure.relations.insert(name.into(), relation);
        self
    }

    pub fn build(self) -> EntityStructure {
        self.structure
    }
}
