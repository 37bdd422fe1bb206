//! # Associations
//!
//! Eager-loaded relations as seen by the hydration engine. An association
//! knows its target table and decides where its nested value lands in the
//! partially grouped row tree.
//!
//! The row tree handed to the hooks is keyed by alias: the default alias and
//! every joined alias own one bucket each, and separately fetched data sits
//! under its nest key until `transform_row` relocates it.

use crate::error::Result;
use crate::schema::Table;
use crate::value::{Fields, Value};
use std::fmt::Debug;

/// Hooks the row grouper calls for every eager-loaded association.
pub trait Association: Debug + Send + Sync {
    fn name(&self) -> &str;

    fn target(&self) -> &Table;

    /// Splice a placeholder into the tree when a separately fetched
    /// association brought no data for this row.
    fn default_row_value(&self, tree: Fields, joined: bool) -> Result<Fields>;

    /// Move (or merge) the value found at `nest_key` to its final place.
    fn transform_row(&self, tree: Fields, nest_key: &str, joined: bool) -> Result<Fields>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationKind {
    BelongsTo,
    HasOne,
    HasMany,
    BelongsToMany,
}

impl AssociationKind {
    pub fn is_to_many(self) -> bool {
        matches!(self, AssociationKind::HasMany | AssociationKind::BelongsToMany)
    }

    /// To-one associations arrive through a join; to-many ones need a
    /// follow-up query.
    pub fn can_be_joined(self) -> bool {
        !self.is_to_many()
    }
}

/// The standard association shapes.
#[derive(Debug, Clone)]
pub struct AssociationDef {
    name: String,
    kind: AssociationKind,
    source_alias: String,
    property: String,
    target: Table,
    merge_into_parent: bool,
}

impl AssociationDef {
    pub fn new(kind: AssociationKind, name: &str, source_alias: &str, target: Table) -> Self {
        Self {
            name: name.to_string(),
            kind,
            source_alias: source_alias.to_string(),
            property: default_property(name, kind),
            target,
            merge_into_parent: false,
        }
    }

    pub fn belongs_to(name: &str, source_alias: &str, target: Table) -> Self {
        Self::new(AssociationKind::BelongsTo, name, source_alias, target)
    }

    pub fn has_one(name: &str, source_alias: &str, target: Table) -> Self {
        Self::new(AssociationKind::HasOne, name, source_alias, target)
    }

    pub fn has_many(name: &str, source_alias: &str, target: Table) -> Self {
        Self::new(AssociationKind::HasMany, name, source_alias, target)
    }

    pub fn belongs_to_many(name: &str, source_alias: &str, target: Table) -> Self {
        Self::new(AssociationKind::BelongsToMany, name, source_alias, target)
    }

    pub fn with_property(mut self, property: &str) -> Self {
        self.property = property.to_string();
        self
    }

    /// Merge the related record's fields flatly into the parent instead of
    /// nesting them. Only meaningful for one-to-one shapes; keys already on
    /// the parent win.
    pub fn merged(mut self) -> Self {
        self.merge_into_parent = true;
        self
    }

    pub fn kind(&self) -> AssociationKind {
        self.kind
    }

    pub fn source_alias(&self) -> &str {
        &self.source_alias
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    fn empty_value(&self, joined: bool) -> Value {
        if self.kind.is_to_many() && !joined {
            Value::List(Vec::new())
        } else {
            Value::Absent
        }
    }
}

impl Association for AssociationDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn target(&self) -> &Table {
        &self.target
    }

    fn default_row_value(&self, mut tree: Fields, joined: bool) -> Result<Fields> {
        let placeholder = self.empty_value(joined);
        if let Some(source) = tree.get_mut(&self.source_alias).and_then(Value::fields_mut) {
            source.insert(self.property.clone(), placeholder);
        }
        Ok(tree)
    }

    fn transform_row(&self, mut tree: Fields, nest_key: &str, _joined: bool) -> Result<Fields> {
        if !tree.contains_key(&self.source_alias) {
            return Ok(tree);
        }

        let nested = tree.remove(nest_key).unwrap_or(Value::Absent);
        let Some(source) = tree.get_mut(&self.source_alias).and_then(Value::fields_mut) else {
            return Ok(tree);
        };

        if self.merge_into_parent {
            if let Some(related) = nested.fields() {
                for (field, value) in related {
                    source.entry(field.clone()).or_insert_with(|| value.clone());
                }
            }
        } else {
            source.insert(self.property.clone(), nested);
        }

        Ok(tree)
    }
}

/// Property name an association nests under: snake_cased, singular for
/// to-one kinds.
///
/// Singularization covers `-ies`, sibilant `-es` and plain `-s` endings.
/// Irregular names such as `People` or `Statuses` need an explicit
/// [`AssociationDef::with_property`].
fn default_property(name: &str, kind: AssociationKind) -> String {
    let mut property = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                property.push('_');
            }
            property.extend(ch.to_lowercase());
        } else {
            property.push(ch);
        }
    }

    if !kind.is_to_many() {
        singularize(&mut property);
    }
    property
}

fn singularize(word: &mut String) {
    if word.ends_with("ies") {
        word.truncate(word.len() - 3);
        word.push('y');
    } else if ["sses", "shes", "ches", "xes", "zzes"]
        .iter()
        .any(|suffix| word.ends_with(suffix))
    {
        word.truncate(word.len() - 2);
    } else if word.ends_with('s') && !word.ends_with("ss") {
        word.pop();
    }
}
