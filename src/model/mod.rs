//! Core data model: values, entity structures and hydration targets.

pub mod instance;
pub mod structure;
pub mod value;

pub use instance::{downcast, expect_child, Instance, InstanceError, Record, Related};
pub use structure::{Cardinality, EntityStructure, EntityStructureBuilder, FieldDef, FieldType, Relation};
pub use value::{Row, Value, ValueConversion};
