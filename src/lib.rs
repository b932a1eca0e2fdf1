//! # rowgraph
//!
//! Hydrates flat, dotted-column result sets into connected graphs of
//! entity instances.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        Entity structures (schema / annotations)          │
//! │   fields, declared types, keys, relations by name        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [mapper + resolve]
//! ┌─────────────────────────────────────────────────────────┐
//! │                  HydrationPlan (once)                    │
//! │   relation paths -> object slots, column instructions    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [cursor, per segment]
//! ┌─────────────────────────────────────────────────────────┐
//! │   allocate N instances per slot -> assign values ->      │
//! │   link children into parents -> N root entities          │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use rowgraph::prelude::*;
//!
//! let schema = SchemaRegistry::new()
//!     .with(
//!         EntityStructure::builder("Customer")
//!             .key_field("id", FieldType::Integer)
//!             .field("name", FieldType::String)
//!             .relation("order", Relation::new(Cardinality::OneToOne, "Order"))
//!             .build(),
//!     )
//!     .with(EntityStructure::builder("Order").field("total", FieldType::Float).build());
//!
//! let plan = HydrationPlan::builder("Customer")
//!     .columns(["id", "name", "order.total"])
//!     .build(&schema)?;
//!
//! let rows = vec![vec![Value::from("1"), Value::from("Alice"), Value::from("10.5")]];
//! let cursor = HydrationCursor::new(plan, RecordActivator, VecRowSource::new(rows), HydrationOptions::default())?;
//!
//! for customer in cursor.into_entities() {
//!     let customer = customer?;
//!     assert_eq!(customer.to_json()["order"]["total"], 10.5);
//! }
//! # Ok::<(), rowgraph::HydrateError>(())
//! ```

pub mod allocate;
pub mod annotations;
pub mod cache;
pub mod config;
pub mod cursor;
pub mod error;
pub mod hydrate;
pub mod logging;
pub mod mapper;
pub mod model;
pub mod plan;
pub mod resolve;
pub mod source;
pub mod structure;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::allocate::{ActivatorRegistry, EntityActivator, RecordActivator};
    pub use crate::cursor::{CursorState, HydrationCursor, HydrationOptions};
    pub use crate::error::{HydrateError, HydrateResult};
    pub use crate::mapper::{AliasedFieldMapper, DottedFieldMapper, FieldMapper};
    pub use crate::model::{
        downcast, Cardinality, EntityStructure, FieldType, Instance, InstanceError, Record,
        Relation, Row, Value, ValueConversion,
    };
    pub use crate::plan::HydrationPlan;
    pub use crate::source::{IterRowSource, RowSource, VecRowSource};
    pub use crate::structure::{AnnotatedStructureProvider, EntityStructureProvider, SchemaRegistry};
}

// Also export at crate root for convenience
pub use cursor::{HydrationCursor, HydrationOptions};
pub use error::{HydrateError, HydrateResult};
pub use hydrate::Hydrator;
pub use plan::HydrationPlan;
