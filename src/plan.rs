//! Hydration plans.
//!
//! A plan is computed once per column set and applied to every row: it
//! fixes the graph topology ([`ResolvedPaths`]) and one [`MapInstruction`]
//! per source column. All structural errors surface here, before any row
//! is fetched.

use serde::Serialize;

use crate::error::{HydrateError, HydrateResult};
use crate::mapper::{DottedFieldMapper, FieldMapper};
use crate::model::ValueConversion;
use crate::resolve::{resolve, ResolvedPaths};
use crate::structure::EntityStructureProvider;

/// Where one source column goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapInstruction {
    /// Position of the column in each row.
    pub source_column: usize,
    pub column_key: String,
    /// Object slot of the target instances.
    pub slot: usize,
    pub field: String,
    pub conversion: ValueConversion,
}

/// Immutable topology and column instructions for one hydration.
#[derive(Debug, Clone, Serialize)]
pub struct HydrationPlan {
    root_entity_id: String,
    columns: Vec<String>,
    paths: ResolvedPaths,
    instructions: Vec<MapInstruction>,
}

impl HydrationPlan {
    pub fn builder(root_entity_id: impl Into<String>) -> PlanBuilder {
        PlanBuilder {
            root_entity_id: root_entity_id.into(),
            columns: Vec::new(),
            mapper: Box::new(DottedFieldMapper),
        }
    }

    pub fn root_entity_id(&self) -> &str {
        &self.root_entity_id
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn paths(&self) -> &ResolvedPaths {
        &self.paths
    }

    pub fn instructions(&self) -> &[MapInstruction] {
        &self.instructions
    }

    pub fn instruction(&self, column_key: &str) -> Option<&MapInstruction> {
        self.instructions.iter().find(|i| i.column_key == column_key)
    }
}

struct PlanColumn {
    key: String,
    conversion: Option<ValueConversion>,
}

/// Builder for [`HydrationPlan`].
///
/// Column conversions default to the declared type of the target field;
/// [`PlanBuilder::column_as`] overrides it.
pub struct PlanBuilder {
    root_entity_id: String,
    columns: Vec<PlanColumn>,
    mapper: Box<dyn FieldMapper>,
}

impl PlanBuilder {
    pub fn column(mut self, key: impl Into<String>) -> Self {
        self.columns.push(PlanColumn {
            key: key.into(),
            conversion: None,
        });
        self
    }

    pub fn columns<I, S>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        keys.into_iter().fold(self, |builder, key| builder.column(key))
    }

    pub fn column_as(mut self, key: impl Into<String>, conversion: ValueConversion) -> Self {
        self.columns.push(PlanColumn {
            key: key.into(),
            conversion: Some(conversion),
        });
        self
    }

    pub fn mapper(mut self, mapper: impl FieldMapper + 'static) -> Self {
        self.mapper = Box::new(mapper);
        self
    }

    pub fn build<P: EntityStructureProvider + ?Sized>(self, provider: &P) -> HydrateResult<HydrationPlan> {
        let mapped: Vec<(String, String)> = self
            .columns
            .iter()
            .map(|c| self.mapper.map(&c.key))
            .collect();

        let paths = resolve(
            mapped.iter().map(|(path, _)| path.as_str()),
            &self.root_entity_id,
            provider,
        )?;

        let mut instructions = Vec::with_capacity(self.columns.len());
        for (source_column, (column, (path, field))) in self.columns.iter().zip(mapped).enumerate() {
            let target = paths.get(&path).ok_or_else(|| HydrateError::UnknownRelation {
                entity: self.root_entity_id.clone(),
                relation: path.clone(),
                path: path.clone(),
            })?;
            let structure = provider.entity_structure(&target.entity_id)?;
            let field_type = structure
                .field_type(&field)
                .ok_or_else(|| HydrateError::UnknownField {
                    entity: target.entity_id.clone(),
                    field: field.clone(),
                })?;

            instructions.push(MapInstruction {
                source_column,
                column_key: column.key.clone(),
                slot: target.slot,
                field,
                conversion: column
                    .conversion
                    .unwrap_or_else(|| ValueConversion::for_field_type(field_type)),
            });
        }

        tracing::debug!(
            root = %self.root_entity_id,
            columns = instructions.len(),
            paths = paths.len(),
            "built hydration plan"
        );

        Ok(HydrationPlan {
            root_entity_id: self.root_entity_id,
            columns: self.columns.into_iter().map(|c| c.key).collect(),
            paths,
            instructions,
        })
    }
}
