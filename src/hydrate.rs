//! Value hydration.
//!
//! Map instructions are grouped by conversion and converted as four passes
//! per row (none, int, float, bool). Each source column feeds exactly one
//! instruction, so raw values are moved out of the row rather than cloned.
//! Converted values are then assigned in declared column order.

use crate::allocate::{EntityActivator, ObjectGraph};
use crate::error::{HydrateError, HydrateResult};
use crate::model::{Instance, Row, Value, ValueConversion};
use crate::plan::{HydrationPlan, MapInstruction};

#[derive(Debug, Clone)]
struct FieldAssignment {
    slot: usize,
    field: String,
}

/// One conversion step: read `source_column`, store at `order`.
#[derive(Debug, Clone, Copy)]
struct PassEntry {
    order: usize,
    source_column: usize,
}

/// Assigns converted column values into allocated instances.
#[derive(Debug, Clone)]
pub struct ValueHydrator {
    passes: [Vec<PassEntry>; 4],
    assignments: Vec<FieldAssignment>,
}

impl ValueHydrator {
    pub fn new(instructions: &[MapInstruction]) -> Self {
        let mut passes: [Vec<PassEntry>; 4] = Default::default();
        let mut assignments = Vec::with_capacity(instructions.len());
        for (order, instruction) in instructions.iter().enumerate() {
            passes[instruction.conversion.index()].push(PassEntry {
                order,
                source_column: instruction.source_column,
            });
            assignments.push(FieldAssignment {
                slot: instruction.slot,
                field: instruction.field.clone(),
            });
        }
        Self {
            passes,
            assignments,
        }
    }

    /// Number of assignments performed per row under `conversion`.
    pub fn pass_len(&self, conversion: ValueConversion) -> usize {
        self.passes[conversion.index()].len()
    }

    /// Assign `rows[i]` into the row-`i` instances of `graph`.
    ///
    /// Missing trailing columns hydrate as [`Value::Null`] (then converted).
    pub fn apply(&self, rows: Vec<Row>, graph: &mut ObjectGraph) -> HydrateResult<()> {
        if rows.len() > graph.count() {
            return Err(HydrateError::Source(format!(
                "{} rows for a batch of {} graphs",
                rows.len(),
                graph.count()
            )));
        }

        let mut converted = vec![Value::Null; self.assignments.len()];
        for (index, mut row) in rows.into_iter().enumerate() {
            for conversion in ValueConversion::ALL {
                for entry in &self.passes[conversion.index()] {
                    let raw = row
                        .get_mut(entry.source_column)
                        .map(std::mem::take)
                        .unwrap_or(Value::Null);
                    converted[entry.order] = match conversion {
                        ValueConversion::None => raw,
                        other => other.apply(&raw),
                    };
                }
            }

            for (assignment, value) in self.assignments.iter().zip(converted.iter_mut()) {
                let Some(target) = graph.instance_mut(assignment.slot, index) else {
                    return Err(HydrateError::Source(format!(
                        "no instance at slot {} row {}",
                        assignment.slot, index
                    )));
                };
                target.set_field(&assignment.field, std::mem::take(value))?;
            }
        }

        Ok(())
    }
}

/// Allocates, fills and links one batch of rows per a fixed plan.
#[derive(Debug, Clone)]
pub struct Hydrator {
    plan: HydrationPlan,
    values: ValueHydrator,
}

impl Hydrator {
    pub fn new(plan: HydrationPlan) -> Self {
        let values = ValueHydrator::new(plan.instructions());
        Self { plan, values }
    }

    pub fn plan(&self) -> &HydrationPlan {
        &self.plan
    }

    /// Hydrate a batch into root entities, one per row.
    pub fn hydrate<A: EntityActivator + ?Sized>(
        &self,
        rows: Vec<Row>,
        activator: &A,
    ) -> HydrateResult<Vec<Box<dyn Instance>>> {
        let count = rows.len();
        let mut graph = ObjectGraph::allocate(self.plan.paths(), count, activator)?;
        self.values.apply(rows, &mut graph)?;
        let roots = graph.link(self.plan.paths())?;

        tracing::trace!(rows = count, root = self.plan.root_entity_id(), "hydrated batch");
        Ok(roots)
    }
}
