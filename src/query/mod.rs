//! # Query Shape
//!
//! The static shape of an executed query, as far as hydration is concerned:
//! which columns were selected (and under which flat names), which table is
//! the root, whether results are hydrated into entities and buffered, and the
//! eager-load plan.
//!
//! The shape is consumed once, when a result set is constructed. Building and
//! compiling SQL is the job of the query layer in front of this crate.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use hydrator_core::query::{EagerLoad, QueryShape};
//!
//! let shape = QueryShape::new(articles)
//!     .select(&["id", "title"])
//!     .select_table(&authors)
//!     .contain(EagerLoad::joined(Arc::new(authors_assoc)))
//!     .buffer_results(false);
//! ```

pub mod shape;

pub use shape::{EagerLoad, QueryShape, SelectColumn};
