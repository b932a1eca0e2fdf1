//! Entity activation and object graph allocation.
//!
//! For a batch of `count` rows, every resolved path gets `count` fresh
//! instances from a single activator call. Slot `s` row `i` is the
//! instance for path `s` in the graph of row `i`; graphs of different rows
//! share nothing.
//!
//! Once values are assigned, [`ObjectGraph::link`] wires each child into
//! its parent's relation, deepest slots first, and returns the roots.

use std::collections::HashMap;

use crate::error::{HydrateError, HydrateResult};
use crate::model::{Instance, Record};
use crate::resolve::{ResolvedPaths, ROOT_SLOT};

/// Allocates blank instances of an entity.
pub trait EntityActivator {
    /// Return exactly `count` fresh, independent instances of `entity_id`.
    fn create_instances(&self, entity_id: &str, count: usize) -> HydrateResult<Vec<Box<dyn Instance>>>;
}

impl<A: EntityActivator + ?Sized> EntityActivator for &A {
    fn create_instances(&self, entity_id: &str, count: usize) -> HydrateResult<Vec<Box<dyn Instance>>> {
        (**self).create_instances(entity_id, count)
    }
}

impl<A: EntityActivator + ?Sized> EntityActivator for Box<A> {
    fn create_instances(&self, entity_id: &str, count: usize) -> HydrateResult<Vec<Box<dyn Instance>>> {
        (**self).create_instances(entity_id, count)
    }
}

/// Activates every entity as a dynamic [`Record`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordActivator;

impl EntityActivator for RecordActivator {
    fn create_instances(&self, entity_id: &str, count: usize) -> HydrateResult<Vec<Box<dyn Instance>>> {
        Ok((0..count)
            .map(|_| Box::new(Record::new(entity_id)) as Box<dyn Instance>)
            .collect())
    }
}

type Factory = Box<dyn Fn() -> Box<dyn Instance>>;

/// Activator for typed entities, keyed by entity id.
#[derive(Default)]
pub struct ActivatorRegistry {
    factories: HashMap<String, Factory>,
    record_fallback: bool,
}

impl ActivatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate `entity_id` as `T::default()`.
    pub fn register_default<T: Instance + Default>(mut self, entity_id: impl Into<String>) -> Self {
        self.factories.insert(
            entity_id.into(),
            Box::new(|| Box::new(T::default()) as Box<dyn Instance>),
        );
        self
    }

    pub fn register_with<F>(mut self, entity_id: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Instance> + 'static,
    {
        self.factories.insert(entity_id.into(), Box::new(factory));
        self
    }

    /// Activate unregistered entities as [`Record`]s instead of failing.
    pub fn with_record_fallback(mut self) -> Self {
        self.record_fallback = true;
        self
    }
}

impl EntityActivator for ActivatorRegistry {
    fn create_instances(&self, entity_id: &str, count: usize) -> HydrateResult<Vec<Box<dyn Instance>>> {
        match self.factories.get(entity_id) {
            Some(factory) => Ok((0..count).map(|_| factory()).collect()),
            None if self.record_fallback => RecordActivator.create_instances(entity_id, count),
            None => Err(HydrateError::activator(
                entity_id,
                count,
                "no factory registered",
            )),
        }
    }
}

/// Instances of one batch, grouped by object slot.
#[derive(Debug)]
pub struct ObjectGraph {
    count: usize,
    slots: Vec<Vec<Box<dyn Instance>>>,
}

impl ObjectGraph {
    /// Allocate `count` instances for every resolved path.
    ///
    /// Any activator failure aborts the whole batch.
    pub fn allocate<A: EntityActivator + ?Sized>(
        paths: &ResolvedPaths,
        count: usize,
        activator: &A,
    ) -> HydrateResult<Self> {
        let mut slots = Vec::with_capacity(paths.len());

        for path in paths.iter() {
            let instances = activator.create_instances(&path.entity_id, count)?;
            if instances.len() != count {
                return Err(HydrateError::activator(
                    path.entity_id.clone(),
                    count,
                    format!("activator returned {} instance(s)", instances.len()),
                ));
            }
            slots.push(instances);
        }

        Ok(Self { count, slots })
    }

    /// Number of rows (independent graphs) in the batch.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn instance(&self, slot: usize, row: usize) -> Option<&dyn Instance> {
        self.slots.get(slot)?.get(row).map(|b| b.as_ref())
    }

    pub fn instance_mut(&mut self, slot: usize, row: usize) -> Option<&mut (dyn Instance + 'static)> {
        self.slots.get_mut(slot)?.get_mut(row).map(|b| b.as_mut())
    }

    /// Wire `parent[i].relation = child[i]` for every non-root path and
    /// return the root instances in row order.
    pub fn link(mut self, paths: &ResolvedPaths) -> HydrateResult<Vec<Box<dyn Instance>>> {
        // children always sit in higher slots than their parents
        for slot in (ROOT_SLOT + 1..self.slots.len()).rev() {
            let Some(path) = paths.by_slot(slot) else {
                continue;
            };
            let (Some(parent), Some(relation), Some(cardinality)) =
                (path.parent_slot, path.relation.as_deref(), path.cardinality)
            else {
                continue;
            };

            let children = std::mem::take(&mut self.slots[slot]);
            for (row, child) in children.into_iter().enumerate() {
                self.slots[parent][row].attach(relation, cardinality, child)?;
            }
        }

        Ok(self.slots.into_iter().next().unwrap_or_default())
    }
}
