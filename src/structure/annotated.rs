//! Structure discovery from doc-comment annotations.
//!
//! Every declared property is either a relation or a scalar field:
//!
//! ```text
//! @minor:relation this.customer_id -> target.id    relation (needs @var)
//! @var Customer                                     relation target
//! @var int                                          field type
//! @minor:key                                        key membership
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use super::EntityStructureProvider;
use crate::annotations::{AnnotationRegistry, AnnotationStore, GLOBAL_NAMESPACE};
use crate::cache::{compute_hash, CacheKey, CacheStore, CacheStoreExt, MetadataCache};
use crate::config::{AnnotationSettings, CacheSettings};
use crate::error::{HydrateError, HydrateResult};
use crate::model::{Cardinality, EntityStructure, FieldType, Relation};

/// Relation operators, checked in this order. Cardinality is as seen from
/// `this` when `this` is the left-hand side.
const OPERATORS: [(&str, Cardinality); 3] = [
    ("<->", Cardinality::OneToOne),
    ("->", Cardinality::ManyToOne),
    ("<-", Cardinality::OneToMany),
];

/// Parse a relation definition such as `this.customer_id -> target.id`.
///
/// Sides are `this.<field>`, `target.<field>` (any qualifier other than
/// `this` names the target) or a bare field. A bare left side is `this`;
/// a bare right side is `target`, or `this` when the left side was the
/// target. With the target on the left, directional operators swap.
pub fn parse_relation(value: &str, target_entity_id: &str) -> Option<Relation> {
    let (lhs, rhs, cardinality) = OPERATORS.iter().find_map(|(op, cardinality)| {
        value
            .split_once(op)
            .map(|(lhs, rhs)| (lhs, rhs, *cardinality))
    })?;

    let mut this_field = None;
    let mut target_field = None;
    let mut target_side = None;

    for (side, raw) in [lhs, rhs].into_iter().enumerate() {
        let raw = raw.trim();
        let (qualifier, field) = match raw.split_once('.') {
            Some((qualifier, field)) => (qualifier.trim(), field.trim()),
            None if side == 0 || target_side == Some(0) => ("this", raw),
            None => ("target", raw),
        };
        if field.is_empty() {
            return None;
        }
        if qualifier == "this" {
            this_field = Some(field);
        } else {
            target_field = Some(field);
            target_side = Some(side);
        }
    }

    let cardinality = if target_side == Some(0) {
        cardinality.reverse()
    } else {
        cardinality
    };

    Some(Relation::new(cardinality, target_entity_id).on(this_field?, target_field?))
}

/// [`EntityStructureProvider`] scanning annotated entity declarations.
///
/// Structures are scanned once per entity and memoized; an optional
/// [`CacheStore`] persists them keyed by a hash of the declaration.
pub struct AnnotatedStructureProvider {
    registry: AnnotationRegistry,
    namespace: String,
    scanned: RefCell<HashMap<String, Arc<EntityStructure>>>,
    cache: Option<Box<dyn CacheStore>>,
}

impl AnnotatedStructureProvider {
    /// Scan tags in `namespace` (e.g. `minor`), falling back per the
    /// registry's namespace rules.
    pub fn new(registry: AnnotationRegistry, namespace: impl Into<String>) -> Self {
        Self {
            registry,
            namespace: namespace.into(),
            scanned: RefCell::new(HashMap::new()),
            cache: None,
        }
    }

    /// Provider configured by the `[annotations]` and `[cache]` settings.
    ///
    /// The registry's lookup rules are replaced by the configured aliases
    /// and strictness; the SQLite cache is opened when enabled.
    pub fn from_settings(
        registry: AnnotationRegistry,
        annotations: &AnnotationSettings,
        cache: &CacheSettings,
    ) -> HydrateResult<Self> {
        let registry = registry.with_namespaces(annotations.namespaces());
        let provider = Self::new(registry, annotations.namespace.clone());
        Ok(match MetadataCache::from_settings(cache)? {
            Some(store) => {
                tracing::debug!(namespace = %annotations.namespace, "structure cache enabled");
                provider.with_cache(Box::new(store))
            }
            None => provider,
        })
    }

    pub fn with_cache(mut self, cache: Box<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn registry(&self) -> &AnnotationRegistry {
        &self.registry
    }

    fn cached_scan(&self, entity_id: &str, cache: &dyn CacheStore) -> HydrateResult<EntityStructure> {
        let declaration = self.registry.declaration(entity_id)?;
        let fingerprint = compute_hash(&(&self.namespace, self.registry.namespaces(), declaration))?;
        cache.get_or_compute(CacheKey::STRUCTURE, &fingerprint, || self.scan(entity_id))
    }

    fn scan(&self, entity_id: &str) -> HydrateResult<EntityStructure> {
        let declaration = self.registry.declaration(entity_id)?;
        let ns = self.namespace.as_str();
        let mut builder = EntityStructure::builder(entity_id);

        for property in &declaration.properties {
            let tags = self.registry.for_property(entity_id, &property.name)?;
            let var = tags
                .get_text(ns, "var")
                .or_else(|| tags.get_text(GLOBAL_NAMESPACE, "var"));

            if tags.has_annotation(ns, "relation") {
                let target = match var.map(str::trim) {
                    Some(t) if !t.is_empty() => resolve_target(&declaration.namespace, t),
                    _ => {
                        return Err(HydrateError::MissingVarDeclaration {
                            entity: entity_id.to_string(),
                            property: property.name.clone(),
                        })
                    }
                };
                let value = tags.get_text(ns, "relation").unwrap_or_default();
                let relation = parse_relation(value, &target).ok_or_else(|| {
                    HydrateError::InvalidRelationSyntax {
                        entity: entity_id.to_string(),
                        property: property.name.clone(),
                        value: value.to_string(),
                    }
                })?;
                builder = builder.relation(property.name.clone(), relation);
                continue;
            }

            let field_type = var.map(FieldType::from_declared).unwrap_or_default();
            let is_key = tags.get_value(ns, "key").is_some_and(|v| v.is_truthy());
            builder = if is_key {
                builder.key_field(property.name.clone(), field_type)
            } else {
                builder.field(property.name.clone(), field_type)
            };
        }

        let structure = builder.build();
        tracing::debug!(
            entity = entity_id,
            fields = structure.fields.len(),
            relations = structure.relations.len(),
            "scanned entity structure"
        );
        Ok(structure)
    }
}

impl EntityStructureProvider for AnnotatedStructureProvider {
    fn entity_structure(&self, entity_id: &str) -> HydrateResult<Arc<EntityStructure>> {
        if let Some(hit) = self.scanned.borrow().get(entity_id) {
            return Ok(hit.clone());
        }

        let structure = match &self.cache {
            Some(cache) => self.cached_scan(entity_id, cache.as_ref())?,
            None => self.scan(entity_id)?,
        };
        let structure = Arc::new(structure);
        self.scanned
            .borrow_mut()
            .insert(entity_id.to_string(), structure.clone());
        Ok(structure)
    }
}

/// `::billing::Invoice` is absolute; `Customer` is relative to `namespace`.
fn resolve_target(namespace: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix("::") {
        absolute.to_string()
    } else if namespace.is_empty() {
        target.to_string()
    } else {
        format!("{}::{}", namespace, target)
    }
}
