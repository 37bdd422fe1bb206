//! Serialized form of a fully materialized result set.

use crate::config::SnapshotConfig;
use crate::error::Result;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Already grouped, typed records in result order. Restoring a snapshot
/// never re-groups anything.
///
/// `count` is the row count the result set reported, which can exceed the
/// number of records when the statement over-reported its rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub records: Vec<Value>,
    #[serde(default)]
    pub count: usize,
}

impl Snapshot {
    pub fn new(records: Vec<Value>) -> Self {
        let count = records.len();
        Self { records, count }
    }

    /// Keep a reported row count larger than the captured records.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Rows the restored result set reports; never fewer than the records.
    pub fn row_count(&self) -> usize {
        self.count.max(self.records.len())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn encode(&self, config: &SnapshotConfig) -> Result<String> {
        let encoded = if config.pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(encoded)
    }

    pub fn parse(encoded: &str) -> Result<Self> {
        Ok(serde_json::from_str(encoded)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HydrationError;

    #[test]
    fn test_malformed_snapshot_is_a_snapshot_error() {
        let error = Snapshot::parse("{\"records\": 3}").unwrap_err();
        assert!(matches!(error, HydrationError::Snapshot(_)));
    }

    #[test]
    fn test_pretty_output_is_multiline() {
        let snapshot = Snapshot::new(vec![Value::Integer(1)]);
        let pretty = snapshot.encode(&SnapshotConfig { pretty: true }).unwrap();
        let compact = snapshot.encode(&SnapshotConfig { pretty: false }).unwrap();

        assert!(pretty.contains('\n'));
        assert!(!compact.contains('\n'));
        assert_eq!(Snapshot::parse(&pretty).unwrap(), snapshot);
    }

    #[test]
    fn test_row_count_defaults_to_records() {
        let parsed = Snapshot::parse(r#"{"records": [{"Integer": 1}]}"#).unwrap();
        assert_eq!(parsed.count, 0);
        assert_eq!(parsed.row_count(), 1);

        let over_reported = Snapshot::new(vec![Value::Integer(1)]).with_count(4);
        assert_eq!(over_reported.row_count(), 4);
        assert_eq!(over_reported.len(), 1);
    }
}
