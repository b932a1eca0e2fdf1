//! Entity structure providers.
//!
//! The hydration engine never inspects entity types itself; it asks an
//! [`EntityStructureProvider`] for fields, keys and relations by entity id.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 EntityStructureProvider                   │
//! │  ┌──────────────────────────┐  ┌───────────────────────┐ │
//! │  │ SchemaRegistry           │  │ AnnotatedStructure-   │ │
//! │  │ (explicit registration,  │  │ Provider (@var, @key, │ │
//! │  │  TOML schema files)      │  │ @relation doc tags)   │ │
//! │  └──────────────────────────┘  └───────────────────────┘ │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod annotated;

pub use annotated::{parse_relation, AnnotatedStructureProvider};

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::config::SettingsError;
use crate::error::{HydrateError, HydrateResult};
use crate::model::EntityStructure;

/// Source of entity metadata. Must be deterministic per entity id for the
/// lifetime of a session.
pub trait EntityStructureProvider {
    fn entity_structure(&self, entity_id: &str) -> HydrateResult<Arc<EntityStructure>>;
}

impl<P: EntityStructureProvider + ?Sized> EntityStructureProvider for &P {
    fn entity_structure(&self, entity_id: &str) -> HydrateResult<Arc<EntityStructure>> {
        (**self).entity_structure(entity_id)
    }
}

impl<P: EntityStructureProvider + ?Sized> EntityStructureProvider for Box<P> {
    fn entity_structure(&self, entity_id: &str) -> HydrateResult<Arc<EntityStructure>> {
        (**self).entity_structure(entity_id)
    }
}

/// Explicitly registered entity structures.
///
/// Schema files list entities as TOML tables:
///
/// ```toml
/// [[entity]]
/// id = "shop::Order"
/// key = ["id"]
/// fields = [
///     { name = "id", type = "integer" },
///     { name = "total", type = "float" },
/// ]
///
/// [entity.relations.customer]
/// target = "shop::Customer"
/// cardinality = "many_to_one"
/// owner_field = "customer_id"
/// target_field = "id"
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    structures: HashMap<String, Arc<EntityStructure>>,
}

#[derive(Debug, Deserialize)]
struct SchemaFile {
    #[serde(default)]
    entity: Vec<EntityStructure>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, structure: EntityStructure) {
        self.structures
            .insert(structure.entity_id.clone(), Arc::new(structure));
    }

    pub fn with(mut self, structure: EntityStructure) -> Self {
        self.register(structure);
        self
    }

    pub fn len(&self) -> usize {
        self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    /// Parse a TOML schema document.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let file: SchemaFile = toml::from_str(content)?;
        let mut registry = Self::new();
        for structure in file.entity {
            if registry.structures.contains_key(&structure.entity_id) {
                return Err(SettingsError::InvalidConfig(format!(
                    "entity '{}' declared twice",
                    structure.entity_id
                )));
            }
            registry.register(structure);
        }
        Ok(registry)
    }

    /// Load a TOML schema file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

impl EntityStructureProvider for SchemaRegistry {
    fn entity_structure(&self, entity_id: &str) -> HydrateResult<Arc<EntityStructure>> {
        self.structures
            .get(entity_id)
            .cloned()
            .ok_or_else(|| HydrateError::UnknownEntity(entity_id.to_string()))
    }
}
