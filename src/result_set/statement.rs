//! Statement resource the result set pulls rows from.

use crate::error::Result;
use crate::value::Row;
use std::collections::VecDeque;
use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// An executed statement yielding flat rows.
///
/// `fetch_row` is the only call that may block. `close` must be idempotent.
pub trait Statement: Debug + Send {
    fn fetch_row(&mut self) -> Result<Option<Row>>;

    /// Number of rows the driver reports for the statement.
    fn row_count(&self) -> usize;

    fn close(&mut self);
}

/// Shared counters describing how a statement was used.
#[derive(Debug, Clone, Default)]
pub struct StatementStats {
    inner: Arc<StatsInner>,
}

#[derive(Debug, Default)]
struct StatsInner {
    fetches: AtomicUsize,
    closes: AtomicUsize,
}

impl StatementStats {
    /// Number of `fetch_row` calls made.
    pub fn fetches(&self) -> usize {
        self.inner.fetches.load(Ordering::Relaxed)
    }

    /// Number of times the statement was actually closed.
    pub fn closes(&self) -> usize {
        self.inner.closes.load(Ordering::Relaxed)
    }

    pub fn record_fetch(&self) {
        self.inner.fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_close(&self) {
        self.inner.closes.fetch_add(1, Ordering::Relaxed);
    }
}

/// Statement over rows already held in memory.
#[derive(Debug)]
pub struct MemoryStatement {
    rows: VecDeque<Row>,
    row_count: usize,
    closed: bool,
    stats: StatementStats,
}

impl MemoryStatement {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            row_count: rows.len(),
            rows: rows.into(),
            closed: false,
            stats: StatementStats::default(),
        }
    }

    /// Report a row count that differs from the rows held, as some drivers do.
    pub fn with_reported_row_count(mut self, row_count: usize) -> Self {
        self.row_count = row_count;
        self
    }

    /// Handle to the usage counters; stays valid after the statement is
    /// moved into a result set.
    pub fn stats(&self) -> StatementStats {
        self.stats.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Statement for MemoryStatement {
    fn fetch_row(&mut self) -> Result<Option<Row>> {
        self.stats.record_fetch();
        if self.closed {
            return Ok(None);
        }
        Ok(self.rows.pop_front())
    }

    fn row_count(&self) -> usize {
        self.row_count
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.rows.clear();
        self.stats.record_close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::fields;

    #[test]
    fn test_memory_statement_yields_rows_in_order() {
        let mut statement = MemoryStatement::new(vec![fields([("id", 1)]), fields([("id", 2)])]);
        let stats = statement.stats();

        assert_eq!(statement.row_count(), 2);
        assert_eq!(statement.fetch_row().unwrap(), Some(fields([("id", 1)])));
        assert_eq!(statement.fetch_row().unwrap(), Some(fields([("id", 2)])));
        assert_eq!(statement.fetch_row().unwrap(), None);
        assert_eq!(stats.fetches(), 3);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut statement = MemoryStatement::new(vec![fields([("id", 1)])]);
        let stats = statement.stats();

        statement.close();
        statement.close();
        assert!(statement.is_closed());
        assert_eq!(stats.closes(), 1);
        assert_eq!(statement.fetch_row().unwrap(), None);
    }
}
