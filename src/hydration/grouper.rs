//! Row Grouper: one flat row in, one nested typed record out.

use super::association_map::LoadStrategy;
use super::column_map::extract_bucket;
use super::plan::HydrationPlan;
use crate::entity::EntityOptions;
use crate::error::Result;
use crate::value::{Fields, Row, Value};
use std::collections::BTreeSet;
use tracing::debug;

/// Reserved key under which matching associations surface.
pub const MATCHING_DATA_KEY: &str = "_matchingData";

/// Groups rows against a fixed plan. Holds no state of its own, so the
/// same row always produces the same record.
#[derive(Debug, Clone, Copy)]
pub struct RowGrouper<'a> {
    plan: &'a HydrationPlan,
}

impl<'a> RowGrouper<'a> {
    pub fn new(plan: &'a HydrationPlan) -> Self {
        Self { plan }
    }

    /// Correctly nest one row, including data of eager-loaded associations.
    pub fn group(&self, mut row: Row) -> Result<Value> {
        let plan = self.plan;
        let default_alias = plan.default_alias();
        let matching_data = self.group_matching(&row)?;

        let mut tree = Fields::new();
        let mut present: BTreeSet<String> = BTreeSet::new();
        for (alias, bucket) in plan.columns().iter() {
            tree.insert(alias.to_string(), Value::Map(extract_bucket(bucket, &row)));
            present.insert(alias.to_string());
        }

        let root = take_fields(&mut tree, default_alias);
        tree.insert(
            default_alias.to_string(),
            Value::Map(plan.cast(default_alias, root)?),
        );
        present.remove(default_alias);

        for descriptor in plan.contain() {
            let slot = descriptor.nest_key.as_str();
            let joined = descriptor.can_be_joined();
            let association = &descriptor.association;

            if descriptor.strategy == LoadStrategy::Separate {
                match row.remove(slot) {
                    Some(value) if !value.is_null() => {
                        tree.insert(slot.to_string(), value);
                    }
                    _ => {
                        tree = association.default_row_value(tree, joined)?;
                        continue;
                    }
                }
            } else {
                let values = plan.cast(&descriptor.target_alias, take_fields(&mut tree, slot))?;
                let nested = if !values.values().any(Value::has_data) {
                    Value::Absent
                } else if plan.hydrates() {
                    let options = EntityOptions::hydrated(descriptor.target_alias.as_str());
                    Value::from(descriptor.entity.build(values, &options)?)
                } else {
                    Value::Map(values)
                };
                tree.insert(slot.to_string(), nested);
            }

            present.remove(slot);
            tree = association.transform_row(tree, slot, joined)?;
        }

        let mut root = match tree.remove(default_alias) {
            Some(value) if value.fields().is_some() => value,
            _ => Value::Map(Fields::new()),
        };
        if let Some(root_fields) = root.fields_mut() {
            for alias in present {
                let Some(value) = tree.remove(&alias) else {
                    continue;
                };
                if root_fields.contains_key(&alias) {
                    debug!(
                        alias = %alias,
                        default_alias = %default_alias,
                        "Skipping unclaimed alias bucket that collides with an existing field"
                    );
                    continue;
                }
                root_fields.insert(alias, value);
            }

            if let Some(matching_data) = matching_data {
                root_fields.insert(MATCHING_DATA_KEY.to_string(), Value::Map(matching_data));
            }
        }

        match root {
            Value::Map(fields) if plan.hydrates() => {
                let options = EntityOptions::hydrated(plan.registry_alias());
                Ok(Value::from(plan.root_entity().build(fields, &options)?))
            }
            other => Ok(other),
        }
    }

    fn group_matching(&self, row: &Row) -> Result<Option<Fields>> {
        let plan = self.plan;
        if plan.matching().is_empty() {
            return Ok(None);
        }

        let mut matching_data = Fields::new();
        for descriptor in plan.matching() {
            let values = plan
                .matching_columns()
                .get(&descriptor.alias)
                .map(|bucket| extract_bucket(bucket, row))
                .unwrap_or_default();
            let values = plan.cast(&descriptor.target_alias, values)?;

            let value = if plan.hydrates() {
                let options = EntityOptions::hydrated(descriptor.alias.as_str());
                Value::from(descriptor.entity.build(values, &options)?)
            } else {
                Value::Map(values)
            };
            matching_data.insert(descriptor.alias.clone(), value);
        }

        Ok(Some(matching_data))
    }
}

/// Remove a bucket from the tree as plain fields; missing or non-record
/// values yield an empty bucket.
fn take_fields(tree: &mut Fields, key: &str) -> Fields {
    match tree.remove(key) {
        Some(Value::Map(fields)) => fields,
        Some(Value::Entity(entity)) => entity.into_fields(),
        _ => Fields::new(),
    }
}
