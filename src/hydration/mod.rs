//! # Hydration
//!
//! Turns flat statement rows into nested, typed record trees.
//!
//! ## Key Components
//!
//! - [`column_map`] - splits `alias__field` column names into per-alias buckets
//! - [`association_map`] - matching and contain maps from the eager-load plan
//! - [`plan`] - the immutable [`HydrationPlan`] built once per result set
//! - [`grouper`] - the [`RowGrouper`], a pure function over (row, plan)
//!
//! ## Grouping Rules
//!
//! - Matching associations surface under `_matchingData[alias]`, never under
//!   their alias on the root record.
//! - A joined association whose fields are all null (or empty) becomes
//!   [`Value::Absent`](crate::value::Value::Absent) rather than a record of nulls.
//! - Separately fetched associations with no data for a row get whatever
//!   placeholder their `default_row_value` hook provides.
//! - Alias buckets no association claimed are attached to the root record;
//!   on a key collision the root's existing field wins.

pub mod association_map;
pub mod column_map;
pub mod grouper;
pub mod plan;

pub use association_map::{AssociationDescriptor, LoadStrategy};
pub use column_map::{build_column_maps, split_column_name, ColumnMap, ALIAS_SEPARATOR};
pub use grouper::{RowGrouper, MATCHING_DATA_KEY};
pub use plan::HydrationPlan;
