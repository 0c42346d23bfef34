//! Ingestion glue: turning tabular exports into `(identifier, record)` pairs.
//!
//! - [`Record`] - One flat row
//! - [`load_records`] (JSON or CSV) / [`filter_eq`] / [`join_on`] / [`collapse_symptoms`] - Table operations
//! - [`load_into`] - Feed records into a [`BPlusTree`] under a [`DedupPolicy`]
//!
//! The index itself accumulates duplicate keys; whether a reload should skip
//! identifiers that are already present is decided here.

mod delimited;
mod record;
mod table;

pub use delimited::read_csv_records;

pub use record::Record;
pub use table::{
    collapse_symptoms, filter_eq, join_on, load_records, read_records, SYMPTOM_SLOTS,
};

use std::fmt;

use tracing::info;

use crate::common::Result;
use crate::index::BPlusTree;

/// Default identifier column.
pub const DEFAULT_KEY_FIELD: &str = "VAERS_ID";

/// What to do with a record whose identifier is already indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupPolicy {
    /// Insert anyway; the value joins the key's bucket.
    #[default]
    Always,
    /// Insert only identifiers that `search` does not find.
    SkipExisting,
}

/// Outcome of a [`load_into`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    pub inserted: usize,
    pub skipped: usize,
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "inserted {}, skipped {}", self.inserted, self.skipped)
    }
}

/// Insert each record under the integer identifier in `field`.
///
/// # Errors
/// - `Error::MissingKey` / `Error::InvalidKey` for a record without a usable
///   identifier. Records before it stay inserted.
pub fn load_into<I>(
    tree: &mut BPlusTree<i64, Record>,
    records: I,
    field: &str,
    policy: DedupPolicy,
) -> Result<LoadReport>
where
    I: IntoIterator<Item = Record>,
{
    let mut report = LoadReport::default();
    for record in records {
        let key = record.key(field)?;
        if policy == DedupPolicy::SkipExisting && tree.search(&key).is_some() {
            report.skipped += 1;
            continue;
        }
        tree.insert(key, record);
        report.inserted += 1;
    }

    info!(?policy, %report, keys = tree.len(), "loaded records into index");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;
    use serde_json::json;

    fn records(value: serde_json::Value) -> Vec<Record> {
        read_records(value.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn test_load_always_accumulates() {
        let mut tree = BPlusTree::new(3).unwrap();
        let rows = records(json!([
            {"ID": 1, "N": "a"},
            {"ID": 2, "N": "b"},
            {"ID": 1, "N": "c"},
        ]));

        let report = load_into(&mut tree, rows, "ID", DedupPolicy::Always).unwrap();

        assert_eq!(report, LoadReport { inserted: 3, skipped: 0 });
        assert_eq!(tree.search(&1).map(<[Record]>::len), Some(2));
    }

    #[test]
    fn test_load_skip_existing() {
        let mut tree = BPlusTree::new(3).unwrap();
        load_into(
            &mut tree,
            records(json!([{"ID": 1, "N": "old"}])),
            "ID",
            DedupPolicy::Always,
        )
        .unwrap();

        let report = load_into(
            &mut tree,
            records(json!([{"ID": 1, "N": "new"}, {"ID": 5, "N": "fresh"}])),
            "ID",
            DedupPolicy::SkipExisting,
        )
        .unwrap();

        assert_eq!(report, LoadReport { inserted: 1, skipped: 1 });
        let bucket = tree.search(&1).unwrap();
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].get("N"), Some(&json!("old")));
        assert!(tree.search(&5).is_some());
    }

    #[test]
    fn test_load_stops_at_bad_identifier() {
        let mut tree = BPlusTree::new(3).unwrap();
        let rows = records(json!([{"ID": 1}, {"ID": "x"}, {"ID": 3}]));

        let err = load_into(&mut tree, rows, "ID", DedupPolicy::Always).unwrap_err();

        assert!(matches!(err, Error::InvalidKey { .. }));
        assert_eq!(tree.len(), 1);
    }
}
