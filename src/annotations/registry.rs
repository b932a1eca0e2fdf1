//! Declared entities and their memoized annotations.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{MemberAnnotations, Namespaces};
use crate::config::SettingsError;
use crate::error::{HydrateError, HydrateResult};

/// A declared member of an entity together with its doc comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDeclaration {
    pub name: String,
    #[serde(default)]
    pub doc: String,
}

/// The declaration an annotated entity is scanned from.
///
/// `namespace` is the module path relative target names resolve against,
/// e.g. `shop` turns `@var Customer` into `shop::Customer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDeclaration {
    pub entity_id: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub doc: String,
    #[serde(default)]
    pub properties: Vec<PropertyDeclaration>,
}

impl EntityDeclaration {
    /// Declare `name` in `namespace`; the entity id is `namespace::name`.
    pub fn new(namespace: impl Into<String>, name: &str) -> Self {
        let namespace = namespace.into();
        let entity_id = if namespace.is_empty() {
            name.to_string()
        } else {
            format!("{}::{}", namespace, name)
        };
        Self {
            entity_id,
            namespace,
            doc: String::new(),
            properties: Vec::new(),
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn property(mut self, name: impl Into<String>, doc: impl Into<String>) -> Self {
        self.properties.push(PropertyDeclaration {
            name: name.into(),
            doc: doc.into(),
        });
        self
    }
}

/// Entity declarations plus a per-member annotation cache.
///
/// Cache keys follow `cls:<entity>` and `prop:<entity>;<property>`.
#[derive(Debug, Default)]
pub struct AnnotationRegistry {
    namespaces: Arc<Namespaces>,
    declarations: HashMap<String, EntityDeclaration>,
    parsed: RefCell<HashMap<String, Arc<MemberAnnotations>>>,
}

impl AnnotationRegistry {
    pub fn new(namespaces: Namespaces) -> Self {
        Self {
            namespaces: Arc::new(namespaces),
            declarations: HashMap::new(),
            parsed: RefCell::new(HashMap::new()),
        }
    }

    /// Replace the lookup rules, dropping annotations parsed under the old ones.
    pub fn with_namespaces(mut self, namespaces: Namespaces) -> Self {
        self.namespaces = Arc::new(namespaces);
        self.parsed.get_mut().clear();
        self
    }

    /// Parse declarations from TOML:
    ///
    /// ```toml
    /// [[entity]]
    /// entity_id = "shop::Order"
    /// namespace = "shop"
    /// properties = [
    ///     { name = "id", doc = "@minor:key\n@var int" },
    /// ]
    /// ```
    pub fn from_toml_str(content: &str, namespaces: Namespaces) -> Result<Self, SettingsError> {
        let file: DeclarationFile = toml::from_str(content)?;
        let mut registry = Self::new(namespaces);
        for declaration in file.entity {
            if registry.declarations.contains_key(&declaration.entity_id) {
                return Err(SettingsError::InvalidConfig(format!(
                    "entity '{}' declared twice",
                    declaration.entity_id
                )));
            }
            registry.declare(declaration);
        }
        Ok(registry)
    }

    /// Load a TOML declaration file.
    pub fn from_file<P: AsRef<Path>>(path: P, namespaces: Namespaces) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content, namespaces)
    }

    pub fn declare(&mut self, declaration: EntityDeclaration) {
        self.parsed
            .borrow_mut()
            .retain(|key, _| !belongs_to(key, &declaration.entity_id));
        self.declarations
            .insert(declaration.entity_id.clone(), declaration);
    }

    pub fn with(mut self, declaration: EntityDeclaration) -> Self {
        self.declare(declaration);
        self
    }

    pub fn declaration(&self, entity_id: &str) -> HydrateResult<&EntityDeclaration> {
        self.declarations
            .get(entity_id)
            .ok_or_else(|| HydrateError::UnknownEntity(entity_id.to_string()))
    }

    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    /// Annotations of the entity's own doc comment.
    pub fn for_class(&self, entity_id: &str) -> HydrateResult<Arc<MemberAnnotations>> {
        let key = format!("cls:{}", entity_id);
        if let Some(hit) = self.parsed.borrow().get(&key) {
            return Ok(hit.clone());
        }

        let declaration = self.declaration(entity_id)?;
        Ok(self.remember(key, &declaration.doc))
    }

    /// Annotations of one property's doc comment.
    pub fn for_property(
        &self,
        entity_id: &str,
        property: &str,
    ) -> HydrateResult<Arc<MemberAnnotations>> {
        let key = format!("prop:{};{}", entity_id, property);
        if let Some(hit) = self.parsed.borrow().get(&key) {
            return Ok(hit.clone());
        }

        let declaration = self.declaration(entity_id)?;
        let doc = declaration
            .properties
            .iter()
            .find(|p| p.name == property)
            .map(|p| p.doc.as_str())
            .ok_or_else(|| HydrateError::UnknownField {
                entity: entity_id.to_string(),
                field: property.to_string(),
            })?;
        Ok(self.remember(key, doc))
    }

    fn remember(&self, key: String, doc: &str) -> Arc<MemberAnnotations> {
        let parsed = Arc::new(MemberAnnotations::parse(doc, self.namespaces.clone()));
        self.parsed.borrow_mut().insert(key, parsed.clone());
        parsed
    }
}

#[derive(Debug, Deserialize)]
struct DeclarationFile {
    #[serde(default)]
    entity: Vec<EntityDeclaration>,
}

fn belongs_to(cache_key: &str, entity_id: &str) -> bool {
    cache_key == format!("cls:{}", entity_id)
        || cache_key.starts_with(&format!("prop:{};", entity_id))
}
