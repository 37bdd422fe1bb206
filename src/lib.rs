#![allow(clippy::doc_markdown)] // Allow technical terms like ResultSet, TOML in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Hydrator Core Rust
//!
//! Result hydration engine for an ORM query layer.
//!
//! ## Overview
//!
//! A query that joins several tables comes back as flat rows whose columns
//! are named `Alias__field`. This crate turns each of those rows into one
//! nested, typed record: root fields at the top, joined associations nested
//! under their property names, separately fetched associations spliced in,
//! and filter-only (matching) associations under `_matchingData`.
//!
//! ## Module Organization
//!
//! - [`value`] - storage and application values, rows and field maps
//! - [`entity`] - hydrated entity records and the factories that build them
//! - [`types`] - type cast registry and built-in converters
//! - [`schema`] - table schemas and aliased tables
//! - [`association`] - association hooks and the built-in kinds
//! - [`query`] - the static shape of an executed query
//! - [`hydration`] - column maps, association maps, the plan and the row grouper
//! - [`result_set`] - the cursor over a statement, with buffering and snapshots
//! - [`config`] - configuration profiles and layered loading
//! - [`logging`] - structured logging setup
//! - [`error`] - structured error handling
//!
//! ## Quick Start
//!
//! ```rust
//! use hydrator_core::association::AssociationDef;
//! use hydrator_core::query::{EagerLoad, QueryShape};
//! use hydrator_core::result_set::{MemoryStatement, ResultSet};
//! use hydrator_core::schema::{Table, TableSchema};
//! use hydrator_core::types::TypeRegistry;
//! use hydrator_core::value::{fields, Value};
//! use std::sync::Arc;
//!
//! # fn main() -> hydrator_core::Result<()> {
//! let articles = Table::new("Articles", TableSchema::new("articles").column("id", "integer"));
//! let authors = Table::new("Authors", TableSchema::new("authors").column("name", "string"));
//!
//! let shape = QueryShape::new(articles)
//!     .select(&["id"])
//!     .select_table(&authors)
//!     .contain(EagerLoad::joined(Arc::new(AssociationDef::belongs_to(
//!         "Authors", "Articles", authors,
//!     ))));
//!
//! let statement = MemoryStatement::new(vec![fields([
//!     ("id", Value::from(1)),
//!     ("Authors__name", Value::from("Ann")),
//! ])]);
//!
//! let mut result_set = ResultSet::new(&shape, statement, &TypeRegistry::with_defaults())?;
//! let article = result_set.first()?.expect("one row");
//! let author = article.get("author").expect("nested author");
//! assert_eq!(author.get("name"), Some(&Value::from("Ann")));
//! # Ok(())
//! # }
//! ```

pub mod association;
pub mod config;
pub mod entity;
pub mod error;
pub mod hydration;
pub mod logging;
pub mod query;
pub mod result_set;
pub mod schema;
pub mod types;
pub mod value;

pub use association::{Association, AssociationDef, AssociationKind};
pub use crate::config::{ConfigLoader, HydrationConfig, LoggingConfig, SnapshotConfig};
pub use entity::{Entity, EntityFactory, EntityOptions, GenericEntityFactory};
pub use error::{HydrationError, Result};
pub use hydration::{HydrationPlan, RowGrouper};
pub use query::{EagerLoad, QueryShape, SelectColumn};
pub use result_set::{MemoryStatement, ResultSet, Snapshot, Statement, StatementStats};
pub use schema::{ColumnSchema, Table, TableSchema};
pub use types::{TypeConverter, TypeRegistry};
pub use value::{Fields, Row, Value};
