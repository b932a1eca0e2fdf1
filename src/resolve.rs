//! Relation path resolution.
//!
//! Turns the dotted relation paths required by a column set into the
//! topology of one hydrated graph: which entity lives at each path, the
//! object slot its instances occupy, and the relation wiring it to its
//! parent.
//!
//! Resolution is top-down and memoized: a path's parent is always resolved
//! (and assigned a lower slot) before the path itself. The root `"."` is
//! pre-seeded at slot 0.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{HydrateError, HydrateResult};
use crate::mapper::{local_name, parent_path, ROOT_PATH};
use crate::model::Cardinality;
use crate::structure::EntityStructureProvider;

/// Slot of the hydration root.
pub const ROOT_SLOT: usize = 0;

/// A resolved node of the graph topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationPath {
    /// Dotted path, `"."` for the root.
    pub path: String,
    pub entity_id: String,
    /// Object slot index; unique and assigned in first-resolved order.
    pub slot: usize,
    /// Slot of the parent path; `None` for the root.
    pub parent_slot: Option<usize>,
    /// Relation name on the parent entity; `None` for the root.
    pub relation: Option<String>,
    pub cardinality: Option<Cardinality>,
}

impl RelationPath {
    pub fn is_root(&self) -> bool {
        self.parent_slot.is_none()
    }
}

/// All resolved paths, indexed by slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPaths {
    paths: Vec<RelationPath>,
    #[serde(skip)]
    by_path: HashMap<String, usize>,
}

impl ResolvedPaths {
    fn seeded(root_entity_id: &str) -> Self {
        let root = RelationPath {
            path: ROOT_PATH.to_string(),
            entity_id: root_entity_id.to_string(),
            slot: ROOT_SLOT,
            parent_slot: None,
            relation: None,
            cardinality: None,
        };
        Self {
            by_path: HashMap::from([(root.path.clone(), ROOT_SLOT)]),
            paths: vec![root],
        }
    }

    pub fn root(&self) -> &RelationPath {
        &self.paths[ROOT_SLOT]
    }

    pub fn get(&self, path: &str) -> Option<&RelationPath> {
        self.slot_of(path).map(|slot| &self.paths[slot])
    }

    pub fn slot_of(&self, path: &str) -> Option<usize> {
        self.by_path.get(path).copied()
    }

    pub fn by_slot(&self, slot: usize) -> Option<&RelationPath> {
        self.paths.get(slot)
    }

    /// Paths in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &RelationPath> {
        self.paths.iter()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Memoizing resolver over an [`EntityStructureProvider`].
pub struct PathResolver<'a, P: EntityStructureProvider + ?Sized> {
    provider: &'a P,
    resolved: ResolvedPaths,
}

impl<'a, P: EntityStructureProvider + ?Sized> PathResolver<'a, P> {
    /// Seed the resolver with the root entity, which must be known to the
    /// provider.
    pub fn new(provider: &'a P, root_entity_id: &str) -> HydrateResult<Self> {
        provider.entity_structure(root_entity_id)?;
        Ok(Self {
            provider,
            resolved: ResolvedPaths::seeded(root_entity_id),
        })
    }

    /// Resolve `path` (and its ancestors), returning its slot.
    pub fn resolve_path(&mut self, path: &str) -> HydrateResult<usize> {
        if let Some(slot) = self.resolved.slot_of(path) {
            return Ok(slot);
        }

        let parent_slot = self.resolve_path(parent_path(path))?;
        let parent_entity = self.resolved.paths[parent_slot].entity_id.clone();
        let structure = self.provider.entity_structure(&parent_entity)?;

        let relation_name = local_name(path);
        let relation = structure
            .relation(relation_name)
            .ok_or_else(|| HydrateError::UnknownRelation {
                entity: parent_entity.clone(),
                relation: relation_name.to_string(),
                path: path.to_string(),
            })?;

        let slot = self.resolved.paths.len();
        tracing::debug!(
            path,
            slot,
            parent = parent_slot,
            entity = %relation.target_entity_id,
            "resolved relation path"
        );

        self.resolved.paths.push(RelationPath {
            path: path.to_string(),
            entity_id: relation.target_entity_id.clone(),
            slot,
            parent_slot: Some(parent_slot),
            relation: Some(relation_name.to_string()),
            cardinality: Some(relation.cardinality),
        });
        self.resolved.by_path.insert(path.to_string(), slot);
        Ok(slot)
    }

    pub fn finish(self) -> ResolvedPaths {
        self.resolved
    }
}

/// Resolve every required path for a hydration rooted at `root_entity_id`.
///
/// Slots follow the iteration order of `required`; only slot 0 (the root)
/// is guaranteed.
pub fn resolve<I, S, P>(required: I, root_entity_id: &str, provider: &P) -> HydrateResult<ResolvedPaths>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    P: EntityStructureProvider + ?Sized,
{
    let mut resolver = PathResolver::new(provider, root_entity_id)?;
    for path in required {
        resolver.resolve_path(path.as_ref())?;
    }
    Ok(resolver.finish())
}
