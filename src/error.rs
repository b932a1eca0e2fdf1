//! Unified error type for planning and hydration.
//!
//! Structural errors (missing `@var`, bad relation syntax, unknown
//! relations or fields) surface while a plan is built, before the row
//! source is touched. Activator and row-source errors abort the batch
//! being fetched; segments hydrated earlier stay valid.

use thiserror::Error;

use crate::cache::CacheError;
use crate::config::SettingsError;
use crate::model::InstanceError;

/// Result type for hydration operations.
pub type HydrateResult<T> = Result<T, HydrateError>;

/// Errors raised while building a hydration plan or hydrating rows.
#[derive(Error, Debug)]
pub enum HydrateError {
    /// A relation property carries no `@var` tag naming its target.
    #[error("invalid relation declaration for entity '{entity}' property '{property}': missing @var tag")]
    MissingVarDeclaration { entity: String, property: String },

    /// A `@relation` value matches none of the directional operators,
    /// or lacks a `this`/`target` side.
    #[error("invalid relation definition ({value}) for entity '{entity}' property '{property}'")]
    InvalidRelationSyntax {
        entity: String,
        property: String,
        value: String,
    },

    /// A required path names a relation its parent entity does not declare.
    #[error("undefined relation '{relation}' for entity '{entity}' (path '{path}')")]
    UnknownRelation {
        entity: String,
        relation: String,
        path: String,
    },

    /// No structure is known for the entity id.
    #[error("unknown entity: '{0}'")]
    UnknownEntity(String),

    /// A mapped column targets a field the entity does not declare.
    #[error("unknown field '{field}' on entity '{entity}'")]
    UnknownField { entity: String, field: String },

    /// The activator could not allocate instances for an entity.
    #[error("failed to activate {count} instance(s) of '{entity}': {message}")]
    ActivatorFailure {
        entity: String,
        count: usize,
        message: String,
    },

    /// An instance rejected a field value or relation.
    #[error(transparent)]
    Instance(#[from] InstanceError),

    /// The row source returned fewer rows than it announced.
    #[error("row source truncated: expected {expected} rows, fetched {fetched}")]
    SourceTruncated { expected: usize, fetched: usize },

    /// Rewind requested on a consumed forward-only source.
    #[error("row source cannot be rewound after rows were fetched")]
    SourceNotRewindable,

    /// Any other row-source failure.
    #[error("row source error: {0}")]
    Source(String),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
}

impl HydrateError {
    /// Create an activator failure.
    pub fn activator(entity: impl Into<String>, count: usize, message: impl Into<String>) -> Self {
        Self::ActivatorFailure {
            entity: entity.into(),
            count,
            message: message.into(),
        }
    }

    /// True for errors detected before any row is fetched.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            HydrateError::MissingVarDeclaration { .. }
                | HydrateError::InvalidRelationSyntax { .. }
                | HydrateError::UnknownRelation { .. }
                | HydrateError::UnknownEntity(_)
                | HydrateError::UnknownField { .. }
        )
    }
}
