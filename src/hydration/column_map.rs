//! Column Map Builder.
//!
//! Splits the flat column names of a select clause into per-alias buckets.
//! `Authors__name` belongs to the `Authors` bucket as field `name`; a name
//! without the separator belongs to the default alias unchanged.

use crate::query::SelectColumn;
use crate::value::{Fields, Row};
use std::collections::BTreeMap;

/// Separator between an alias and a field in a flat column name.
pub const ALIAS_SEPARATOR: &str = "__";

const IDENTIFIER_QUOTES: &[char] = &['"', '`', '[', ']'];

/// Split one flat column name into `(alias, field)`.
///
/// Identifier quoting is stripped first. Names that do not carry the
/// separator after a non-empty alias fall back to the default alias.
pub fn split_column_name(name: &str, default_alias: &str) -> (String, String) {
    let name = name.trim_matches(IDENTIFIER_QUOTES);
    match name.split_once(ALIAS_SEPARATOR) {
        Some((alias, field)) if !alias.is_empty() => (alias.to_string(), field.to_string()),
        _ => (default_alias.to_string(), name.to_string()),
    }
}

/// Flat column name -> field name, for one alias.
pub type ColumnBucket = BTreeMap<String, String>;

/// Per-alias column buckets of one result shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    buckets: BTreeMap<String, ColumnBucket>,
}

impl ColumnMap {
    pub fn build(select: &[SelectColumn], default_alias: &str) -> Self {
        let mut buckets: BTreeMap<String, ColumnBucket> = BTreeMap::new();
        for column in select {
            let (alias, field) = split_column_name(&column.name, default_alias);
            let flat = column.name.trim_matches(IDENTIFIER_QUOTES).to_string();
            buckets.entry(alias).or_default().insert(flat, field);
        }

        Self { buckets }
    }

    /// Remove an alias bucket, returning its columns (empty when the alias
    /// selected nothing).
    pub fn take(&mut self, alias: &str) -> ColumnBucket {
        self.buckets.remove(alias).unwrap_or_default()
    }

    pub fn insert(&mut self, alias: &str, bucket: ColumnBucket) {
        self.buckets.insert(alias.to_string(), bucket);
    }

    pub fn get(&self, alias: &str) -> Option<&ColumnBucket> {
        self.buckets.get(alias)
    }

    pub fn contains_alias(&self, alias: &str) -> bool {
        self.buckets.contains_key(alias)
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnBucket)> {
        self.buckets.iter().map(|(alias, bucket)| (alias.as_str(), bucket))
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of columns across all buckets.
    pub fn column_count(&self) -> usize {
        self.buckets.values().map(BTreeMap::len).sum()
    }
}

/// Pull the columns of one bucket out of a flat row, renamed to their
/// field names. Columns the row does not carry are skipped.
pub fn extract_bucket(bucket: &ColumnBucket, row: &Row) -> Fields {
    bucket
        .iter()
        .filter_map(|(flat, field)| row.get(flat).map(|value| (field.clone(), value.clone())))
        .collect()
}

/// Build the general column map and the matching-columns map.
///
/// Aliases listed in `matching_aliases` are moved out of the general map.
pub fn build_column_maps<'a>(
    select: &[SelectColumn],
    default_alias: &str,
    matching_aliases: impl IntoIterator<Item = &'a str>,
) -> (ColumnMap, ColumnMap) {
    let mut general = ColumnMap::build(select, default_alias);
    let mut matching = ColumnMap::default();

    for alias in matching_aliases {
        let bucket = general.take(alias);
        matching.insert(alias, bucket);
    }

    (general, matching)
}
