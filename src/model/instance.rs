//! Hydration targets.
//!
//! [`Instance`] is the name -> setter table the hydrator writes through.
//! [`Record`] is the dynamic implementation; typed entities implement
//! the trait by hand and are retrieved with [`downcast`].

use std::any::Any;
use std::fmt;

use thiserror::Error;

use super::structure::Cardinality;
use super::value::Value;

/// Errors raised by an instance rejecting an assignment.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InstanceError {
    #[error("entity '{entity}' has no field '{field}'")]
    UnknownField { entity: String, field: String },

    #[error("entity '{entity}' field '{field}' cannot hold value '{value}'")]
    InvalidValue {
        entity: String,
        field: String,
        value: String,
    },

    #[error("entity '{entity}' has no relation '{relation}'")]
    UnknownRelation { entity: String, relation: String },

    #[error("relation '{relation}' on entity '{entity}' expects '{expected}', got '{found}'")]
    ChildType {
        entity: String,
        relation: String,
        expected: String,
        found: String,
    },
}

impl InstanceError {
    pub fn unknown_field(entity: &str, field: &str) -> Self {
        Self::UnknownField {
            entity: entity.to_string(),
            field: field.to_string(),
        }
    }

    pub fn invalid_value(entity: &str, field: &str, value: &Value) -> Self {
        Self::InvalidValue {
            entity: entity.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn unknown_relation(entity: &str, relation: &str) -> Self {
        Self::UnknownRelation {
            entity: entity.to_string(),
            relation: relation.to_string(),
        }
    }
}

/// A blank entity instance the hydrator can fill in.
pub trait Instance: Any + fmt::Debug {
    /// Entity id this instance was activated for.
    fn entity_id(&self) -> &str;

    /// Assign a (converted) column value to a scalar field.
    fn set_field(&mut self, name: &str, value: Value) -> Result<(), InstanceError>;

    /// Wire a child instance into the named relation.
    ///
    /// Collection cardinalities append; single cardinalities replace.
    fn attach(
        &mut self,
        relation: &str,
        cardinality: Cardinality,
        child: Box<dyn Instance>,
    ) -> Result<(), InstanceError>;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// JSON rendering of the instance and everything attached to it.
    fn to_json(&self) -> serde_json::Value;
}

/// Recover a concrete instance type.
pub fn downcast<T: Instance>(instance: Box<dyn Instance>) -> Option<Box<T>> {
    instance.into_any().downcast::<T>().ok()
}

/// Downcast a child handed to [`Instance::attach`], reporting a
/// [`InstanceError::ChildType`] on mismatch.
pub fn expect_child<T: Instance>(
    owner: &str,
    relation: &str,
    child: Box<dyn Instance>,
) -> Result<T, InstanceError> {
    if !child.as_any().is::<T>() {
        return Err(InstanceError::ChildType {
            entity: owner.to_string(),
            relation: relation.to_string(),
            expected: std::any::type_name::<T>().to_string(),
            found: child.entity_id().to_string(),
        });
    }
    downcast::<T>(child).map(|boxed| *boxed).ok_or_else(|| {
        InstanceError::unknown_relation(owner, relation)
    })
}

/// Children attached under one relation of a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum Related {
    One(Box<Record>),
    Many(Vec<Record>),
}

impl Related {
    fn to_json(&self) -> serde_json::Value {
        match self {
            Related::One(record) => record.to_json(),
            Related::Many(records) => {
                serde_json::Value::Array(records.iter().map(Record::to_json).collect())
            }
        }
    }
}

/// Dynamic entity instance: any field name, any relation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entity_id: String,
    fields: Vec<(String, Value)>,
    relations: Vec<(String, Related)>,
}

impl Record {
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            fields: Vec::new(),
            relations: Vec::new(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn related(&self, relation: &str) -> Option<&Related> {
        self.relations
            .iter()
            .find(|(name, _)| name == relation)
            .map(|(_, related)| related)
    }

    /// The single child under `relation`, if it holds exactly one.
    pub fn one(&self, relation: &str) -> Option<&Record> {
        match self.related(relation)? {
            Related::One(record) => Some(record),
            Related::Many(_) => None,
        }
    }

    /// Children under a collection relation; empty if absent.
    pub fn many(&self, relation: &str) -> &[Record] {
        match self.related(relation) {
            Some(Related::Many(records)) => records,
            _ => &[],
        }
    }
}

impl Instance for Record {
    fn entity_id(&self) -> &str {
        &self.entity_id
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), InstanceError> {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name.to_string(), value)),
        }
        Ok(())
    }

    fn attach(
        &mut self,
        relation: &str,
        cardinality: Cardinality,
        child: Box<dyn Instance>,
    ) -> Result<(), InstanceError> {
        let child: Record = expect_child(&self.entity_id, relation, child)?;
        let existing = self.relations.iter_mut().find(|(n, _)| n == relation);

        match (existing, cardinality.is_collection()) {
            (Some((_, Related::Many(children))), true) => children.push(child),
            (Some((_, slot)), true) => *slot = Related::Many(vec![child]),
            (Some((_, slot)), false) => *slot = Related::One(Box::new(child)),
            (None, true) => self
                .relations
                .push((relation.to_string(), Related::Many(vec![child]))),
            (None, false) => self
                .relations
                .push((relation.to_string(), Related::One(Box::new(child)))),
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (name, value) in &self.fields {
            map.insert(
                name.clone(),
                serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
            );
        }
        for (name, related) in &self.relations {
            map.insert(name.clone(), related.to_json());
        }
        serde_json::Value::Object(map)
    }
}
