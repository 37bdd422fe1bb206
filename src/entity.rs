//! # Entities
//!
//! Hydrated records and the capability used to build them. The hydration
//! engine never resolves entity types at runtime: every table carries an
//! `EntityFactory` that is resolved once while the plan is assembled.

use crate::error::{HydrationError, Result};
use crate::value::{fields_to_json, Fields, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Debug;

/// Construction options passed to an `EntityFactory`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityOptions {
    /// Alias (or registry alias) the record was loaded from.
    pub source: String,
    pub mark_clean: bool,
    pub mark_new: bool,
}

impl EntityOptions {
    /// Options used for every record produced from a fetched row.
    pub fn hydrated(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            mark_clean: true,
            mark_new: false,
        }
    }
}

/// A typed record with dirty tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    class: String,
    source: String,
    fields: Fields,
    dirty: BTreeSet<String>,
    new: bool,
}

impl Entity {
    pub fn new(class: impl Into<String>, fields: Fields, options: &EntityOptions) -> Self {
        let dirty = if options.mark_clean {
            BTreeSet::new()
        } else {
            fields.keys().cloned().collect()
        };

        Self {
            class: class.into(),
            source: options.source.clone(),
            fields,
            dirty,
            new: options.mark_new,
        }
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.get(field).is_some_and(|v| !v.is_null())
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub(crate) fn fields_mut(&mut self) -> &mut Fields {
        &mut self.fields
    }

    pub fn into_fields(self) -> Fields {
        self.fields
    }

    /// Set a field and mark it dirty.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        self.dirty.insert(field.clone());
        self.fields.insert(field, value.into());
    }

    pub fn is_dirty(&self, field: &str) -> bool {
        self.dirty.contains(field)
    }

    pub fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn is_new(&self) -> bool {
        self.new
    }

    /// Forget all dirty fields.
    pub fn clean(&mut self) {
        self.dirty.clear();
    }

    pub fn to_json(&self) -> serde_json::Value {
        fields_to_json(&self.fields)
    }
}

/// Builds records of one entity class from typed fields.
pub trait EntityFactory: Debug + Send + Sync {
    fn class_name(&self) -> &str;

    fn build(&self, fields: Fields, options: &EntityOptions) -> Result<Entity>;
}

/// Factory producing plain `Entity` records tagged with a class name.
#[derive(Debug, Clone)]
pub struct GenericEntityFactory {
    class: String,
}

impl GenericEntityFactory {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
        }
    }
}

impl EntityFactory for GenericEntityFactory {
    fn class_name(&self) -> &str {
        &self.class
    }

    fn build(&self, fields: Fields, options: &EntityOptions) -> Result<Entity> {
        Ok(Entity::new(self.class.clone(), fields, options))
    }
}

/// Factory that refuses records missing any of the listed fields.
#[derive(Debug, Clone)]
pub struct RequiredFieldsEntityFactory {
    class: String,
    required: Vec<String>,
}

impl RequiredFieldsEntityFactory {
    pub fn new(class: impl Into<String>, required: &[&str]) -> Self {
        Self {
            class: class.into(),
            required: required.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl EntityFactory for RequiredFieldsEntityFactory {
    fn class_name(&self) -> &str {
        &self.class
    }

    fn build(&self, fields: Fields, options: &EntityOptions) -> Result<Entity> {
        if let Some(missing) = self.required.iter().find(|f| !fields.contains_key(*f)) {
            return Err(HydrationError::EntityHydration {
                entity: self.class.clone(),
                alias: options.source.clone(),
                message: format!("missing required field '{missing}'"),
            });
        }

        Ok(Entity::new(self.class.clone(), fields, options))
    }
}
