//! # Result Set
//!
//! Cursor over an executed statement that yields one grouped record per
//! row. Buffered result sets cache each record the first time its row is
//! visited, which makes them rewindable and randomly addressable; unbuffered
//! result sets are strictly forward-only.
//!
//! ## Lifecycle
//!
//! ```text
//! create -> (valid -> current -> advance)* -> invalid (statement closed)
//!                  ^                |
//!                  +---- rewind ----+   buffered only
//! ```
//!
//! The statement is closed exactly once: on the first invalid position, or
//! when `first()` is called on an unbuffered cursor.

pub mod cursor;
pub mod snapshot;
pub mod statement;

pub use cursor::{Records, ResultSet};
pub use snapshot::Snapshot;
pub use statement::{MemoryStatement, Statement, StatementStats};
