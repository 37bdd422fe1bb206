//! The result set cursor over an executed statement.

use super::snapshot::Snapshot;
use super::statement::Statement;
use crate::config::SnapshotConfig;
use crate::error::{HydrationError, Result};
use crate::hydration::{HydrationPlan, RowGrouper};
use crate::logging::{log_error, log_result_set_operation};
use crate::query::QueryShape;
use crate::types::TypeRegistry;
use crate::value::Value;
use std::cell::OnceCell;
use std::fmt;
use tracing::{debug, trace};

/// Forward cursor over grouped records.
///
/// In buffered mode every record is kept in a slot addressed by its row
/// index, so revisiting a row never touches the statement again and the
/// cursor can be rewound. Unbuffered cursors hold only the current record.
pub struct ResultSet {
    plan: Option<HydrationPlan>,
    statement: Option<Box<dyn Statement>>,
    statement_closed: bool,
    index: usize,
    current: Option<Value>,
    results: Vec<Option<Value>>,
    /// Rows pulled from the statement so far; slots below it are filled.
    fetched: usize,
    use_buffering: bool,
    count: OnceCell<usize>,
}

impl ResultSet {
    /// Create a result set for `statement`, resolving the hydration plan
    /// from the query shape.
    pub fn new(
        shape: &QueryShape,
        statement: impl Statement + 'static,
        registry: &TypeRegistry,
    ) -> Result<Self> {
        let plan = HydrationPlan::build(shape, registry)?;
        Ok(Self::from_plan(
            plan,
            Box::new(statement),
            shape.buffers_results(),
        ))
    }

    /// Create a result set from an already built plan.
    pub fn from_plan(
        plan: HydrationPlan,
        statement: Box<dyn Statement>,
        use_buffering: bool,
    ) -> Self {
        let mut result_set = Self {
            plan: Some(plan),
            statement: Some(statement),
            statement_closed: false,
            index: 0,
            current: None,
            results: Vec::new(),
            fetched: 0,
            use_buffering,
            count: OnceCell::new(),
        };

        if use_buffering {
            let count = result_set.count();
            result_set.results = vec![None; count];
        }

        debug!(
            buffered = use_buffering,
            count = ?result_set.count.get(),
            "Result set created"
        );
        result_set
    }

    /// Restore a buffered result set from a snapshot. No statement is
    /// attached and no regrouping happens.
    ///
    /// Slots past the captured records stay empty, so an over-reported
    /// count survives the round trip.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let count = snapshot.row_count();
        let fetched = snapshot.records.len();
        let mut results: Vec<Option<Value>> = snapshot.records.into_iter().map(Some).collect();
        results.resize(count, None);

        debug!(count = count, records = fetched, "Result set restored from snapshot");
        Self {
            plan: None,
            statement: None,
            statement_closed: true,
            index: 0,
            current: None,
            results,
            fetched,
            use_buffering: true,
            count: OnceCell::from(count),
        }
    }

    pub fn deserialize(encoded: &str) -> Result<Self> {
        Ok(Self::from_snapshot(Snapshot::parse(encoded)?))
    }

    /// The record at the current position, if the last `valid` call
    /// produced one.
    pub fn current(&self) -> Option<&Value> {
        if self.use_buffering {
            self.results.get(self.index).and_then(Option::as_ref)
        } else {
            self.current.as_ref()
        }
    }

    /// The current row index.
    pub fn key(&self) -> usize {
        self.index
    }

    /// Move to the next row index.
    pub fn advance(&mut self) {
        self.index += 1;
    }

    /// Rewind to the first row.
    ///
    /// Rewinding a cursor that has not moved is always allowed; otherwise
    /// only buffered cursors can go back.
    pub fn rewind(&mut self) -> Result<()> {
        if self.index == 0 {
            return Ok(());
        }

        if !self.use_buffering {
            let error = HydrationError::unbuffered_rewind();
            log_error(
                "result_set",
                "rewind",
                &error.to_string(),
                Some(&format!("index={}", self.index)),
            );
            return Err(error);
        }

        self.index = 0;
        Ok(())
    }

    /// Whether the current position holds a record, fetching and grouping
    /// the next row when needed.
    pub fn valid(&mut self) -> Result<bool> {
        if self.use_buffering {
            if self.index >= self.count() {
                self.close_statement();
                return Ok(false);
            }
            let filled = self.fill_to(self.index)?;
            if !filled {
                self.close_statement();
            }
            return Ok(filled);
        }

        self.current = self.fetch_result()?;
        if self.current.is_none() {
            self.close_statement();
            return Ok(false);
        }
        Ok(true)
    }

    /// Total number of rows. Computed once; buffered cursors trust the
    /// count the statement reported when the cursor was created.
    pub fn count(&self) -> usize {
        *self.count.get_or_init(|| match &self.statement {
            Some(statement) => statement.row_count(),
            None => self.results.len(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn is_buffered(&self) -> bool {
        self.use_buffering
    }

    /// The first record, if any. Unbuffered cursors release the statement
    /// right away since the remaining rows can never be reached.
    pub fn first(&mut self) -> Result<Option<Value>> {
        self.rewind()?;

        let record = if self.valid()? {
            self.current().cloned()
        } else {
            None
        };

        if !self.use_buffering {
            self.close_statement();
        }
        Ok(record)
    }

    /// An already fetched record by index. Never touches the statement.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.results.get(index).and_then(Option::as_ref)
    }

    /// A record by index, fetching up to it when needed. Buffered only.
    pub fn fetch_at(&mut self, index: usize) -> Result<Option<&Value>> {
        if !self.use_buffering {
            return Err(HydrationError::UnsupportedOperation(
                "random access requires a buffered result set".to_string(),
            ));
        }
        if index >= self.count() || !self.fill_to(index)? {
            return Ok(None);
        }
        Ok(self.get(index))
    }

    /// Iterate the records from the first row.
    pub fn records(&mut self) -> Records<'_> {
        Records {
            result_set: self,
            started: false,
            done: false,
        }
    }

    pub fn to_vec(&mut self) -> Result<Vec<Value>> {
        self.records().collect()
    }

    pub fn to_json(&mut self) -> Result<serde_json::Value> {
        let records = self.to_vec()?;
        Ok(serde_json::Value::Array(
            records.iter().map(Value::to_json).collect(),
        ))
    }

    /// Drain the cursor and capture every record.
    ///
    /// A fresh unbuffered cursor is drained into the snapshot directly; one
    /// that already handed out rows cannot produce a complete snapshot.
    pub fn snapshot(&mut self) -> Result<Snapshot> {
        if !self.use_buffering {
            if self.index > 0 {
                return Err(HydrationError::UnsupportedOperation(
                    "cannot snapshot an unbuffered result set after iteration started".to_string(),
                ));
            }
            let mut records = Vec::new();
            while self.valid()? {
                if let Some(record) = self.current.take() {
                    records.push(record);
                }
                self.advance();
            }
            return Ok(Snapshot::new(records));
        }

        while self.valid()? {
            self.advance();
        }
        let records = self.results.iter().flatten().cloned().collect();
        Ok(Snapshot::new(records).with_count(self.count()))
    }

    pub fn serialize(&mut self) -> Result<String> {
        self.serialize_with(&SnapshotConfig::default())
    }

    pub fn serialize_with(&mut self, config: &SnapshotConfig) -> Result<String> {
        let snapshot = self.snapshot()?;
        debug!(records = snapshot.len(), pretty = config.pretty, "Serializing result set");
        snapshot.encode(config)
    }

    /// Fill slots in row order until `index` is filled. Returns false when
    /// the statement ran out first.
    fn fill_to(&mut self, index: usize) -> Result<bool> {
        while self.fetched <= index {
            let Some(record) = self.fetch_result()? else {
                return Ok(false);
            };
            if let Some(slot) = self.results.get_mut(self.fetched) {
                *slot = Some(record);
            }
            self.fetched += 1;
        }
        Ok(self.results.get(index).is_some_and(Option::is_some))
    }

    fn fetch_result(&mut self) -> Result<Option<Value>> {
        if self.statement_closed {
            return Ok(None);
        }
        let (Some(statement), Some(plan)) = (self.statement.as_mut(), self.plan.as_ref()) else {
            return Ok(None);
        };

        trace!(index = self.index, fetched = self.fetched, "Fetching row");
        match statement.fetch_row()? {
            Some(row) => RowGrouper::new(plan).group(row).map(Some),
            None => Ok(None),
        }
    }

    fn close_statement(&mut self) {
        if self.statement_closed {
            return;
        }
        if let Some(statement) = self.statement.as_mut() {
            statement.close();
            let details = format!("fetched={} buffered={}", self.fetched, self.use_buffering);
            log_result_set_operation(
                "close",
                self.plan.as_ref().map(HydrationPlan::default_alias),
                Some(self.index),
                "closed",
                Some(&details),
            );
        }
        self.statement_closed = true;
    }
}

impl fmt::Debug for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultSet")
            .field("index", &self.index)
            .field("count", &self.count.get())
            .field("buffered", &self.use_buffering)
            .field("fetched", &self.fetched)
            .field("statement_closed", &self.statement_closed)
            .field("items", &self.results.iter().flatten().collect::<Vec<_>>())
            .finish()
    }
}

/// Iterator over a result set's records, starting from a rewind.
pub struct Records<'a> {
    result_set: &'a mut ResultSet,
    started: bool,
    done: bool,
}

impl Iterator for Records<'_> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if self.started {
            self.result_set.advance();
        } else {
            self.started = true;
            if let Err(error) = self.result_set.rewind() {
                self.done = true;
                return Some(Err(error));
            }
        }

        match self.result_set.valid() {
            Ok(true) => self.result_set.current().cloned().map(Ok),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result_set::MemoryStatement;
    use crate::schema::{Table, TableSchema};
    use crate::value::{fields, Row};
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    /// Collects formatted log output in memory.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn shape(buffered: bool) -> QueryShape {
        let articles = Table::new(
            "Articles",
            TableSchema::new("articles")
                .column("id", "integer")
                .column("title", "string"),
        );
        QueryShape::new(articles)
            .select(&["id", "title"])
            .hydrate(false)
            .buffer_results(buffered)
    }

    fn rows() -> Vec<Row> {
        vec![
            fields([("id", Value::from(1)), ("title", Value::from("one"))]),
            fields([("id", Value::from(2)), ("title", Value::from("two"))]),
            fields([("id", Value::from(3)), ("title", Value::from("three"))]),
        ]
    }

    fn ids(records: &[Value]) -> Vec<i64> {
        records
            .iter()
            .filter_map(|r| r.get("id").and_then(Value::as_i64))
            .collect()
    }

    #[test]
    fn test_buffered_iteration_and_replay() {
        let statement = MemoryStatement::new(rows());
        let stats = statement.stats();
        let mut result_set =
            ResultSet::new(&shape(true), statement, &TypeRegistry::with_defaults()).unwrap();

        let first_pass = result_set.to_vec().unwrap();
        let second_pass = result_set.to_vec().unwrap();

        assert_eq!(ids(&first_pass), vec![1, 2, 3]);
        assert_eq!(first_pass, second_pass);
        assert_eq!(stats.fetches(), 3);
        assert_eq!(stats.closes(), 1);
    }

    #[test]
    fn test_valid_is_idempotent_when_buffered() {
        let statement = MemoryStatement::new(rows());
        let stats = statement.stats();
        let mut result_set =
            ResultSet::new(&shape(true), statement, &TypeRegistry::with_defaults()).unwrap();

        assert!(result_set.valid().unwrap());
        assert!(result_set.valid().unwrap());
        assert_eq!(stats.fetches(), 1);
        assert_eq!(result_set.current().unwrap().get("id"), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_unbuffered_rewind_fails_after_moving() {
        let mut result_set =
            ResultSet::new(&shape(false), MemoryStatement::new(rows()), &TypeRegistry::with_defaults())
                .unwrap();

        assert!(result_set.rewind().is_ok());
        assert!(result_set.valid().unwrap());
        result_set.advance();

        let error = result_set.rewind().unwrap_err();
        assert!(error.is_unsupported_operation());
        assert_eq!(result_set.key(), 1);
    }

    #[test]
    fn test_first_closes_unbuffered_statement() {
        let statement = MemoryStatement::new(rows());
        let stats = statement.stats();
        let mut result_set =
            ResultSet::new(&shape(false), statement, &TypeRegistry::with_defaults()).unwrap();

        let first = result_set.first().unwrap().unwrap();
        assert_eq!(first.get("id"), Some(&Value::Integer(1)));
        assert_eq!(stats.closes(), 1);
        assert!(!result_set.valid().unwrap());
        assert_eq!(stats.closes(), 1);
    }

    #[test]
    fn test_fetch_at_fills_slots_in_order() {
        let mut result_set =
            ResultSet::new(&shape(true), MemoryStatement::new(rows()), &TypeRegistry::with_defaults())
                .unwrap();

        assert!(result_set.get(2).is_none());
        let third = result_set.fetch_at(2).unwrap().cloned().unwrap();
        assert_eq!(third.get("id"), Some(&Value::Integer(3)));
        assert_eq!(result_set.get(0).unwrap().get("id"), Some(&Value::Integer(1)));
        assert!(result_set.fetch_at(5).unwrap().is_none());
    }

    #[test]
    fn test_over_reported_count_stops_at_real_end() {
        let statement = MemoryStatement::new(rows()).with_reported_row_count(5);
        let stats = statement.stats();
        let mut result_set =
            ResultSet::new(&shape(true), statement, &TypeRegistry::with_defaults()).unwrap();

        assert_eq!(result_set.count(), 5);
        assert_eq!(result_set.to_vec().unwrap().len(), 3);
        assert_eq!(result_set.count(), 5);
        assert_eq!(stats.closes(), 1);
    }

    #[test]
    fn test_close_and_rejected_rewind_are_logged() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut result_set = ResultSet::new(
                &shape(false),
                MemoryStatement::new(rows()),
                &TypeRegistry::with_defaults(),
            )
            .unwrap();
            assert!(result_set.valid().unwrap());
            result_set.advance();
            assert!(result_set.rewind().is_err());
            while result_set.valid().unwrap() {
                result_set.advance();
            }
        });

        let output = logs.contents();
        assert!(output.contains("RESULT_SET_OPERATION"));
        assert!(output.contains("operation=close"));
        assert!(output.contains("alias=\"Articles\""));
        assert!(output.contains("operation=rewind"));
        assert!(output.contains("un-buffered"));
    }

    #[test]
    fn test_debug_lists_cached_items() {
        let mut result_set =
            ResultSet::new(&shape(true), MemoryStatement::new(rows()), &TypeRegistry::with_defaults())
                .unwrap();
        result_set.first().unwrap();

        let debug = format!("{result_set:?}");
        assert!(debug.contains("ResultSet"));
        assert!(debug.contains("count: Some(3)"));
        assert!(debug.contains("fetched: 1"));
    }
}
