//! Table-level operations: loading, filtering, joining and collapsing rows.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::common::{Error, Result};
use crate::ingest::delimited::read_csv_records;
use crate::ingest::record::{kind_of, Record};

/// Number of `SYMPTOMn` / `SYMPTOMVERSIONn` column pairs in one source row.
pub const SYMPTOM_SLOTS: usize = 5;

/// Load a table from a file.
///
/// Files ending in `.csv` (any case) are read as CSV with a header row, see
/// [`read_csv_records`]. Anything else must be a JSON array of objects.
///
/// # Errors
/// - I/O errors opening or reading `path`
/// - `Error::Json` / `Error::Csv` if the file does not parse
/// - `Error::InvalidRecord` if it is not a table of records
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    let records = if is_csv {
        read_csv_records(reader)?
    } else {
        read_records(reader)?
    };
    info!(path = %path.display(), rows = records.len(), csv = is_csv, "loaded table");
    Ok(records)
}

/// Parse a JSON table from any reader. See [`load_records`].
pub fn read_records<R: Read>(reader: R) -> Result<Vec<Record>> {
    match serde_json::from_reader(reader)? {
        Value::Array(rows) => rows.into_iter().map(Record::try_from).collect(),
        other => Err(Error::InvalidRecord(format!(
            "expected an array of records, found {}",
            kind_of(&other)
        ))),
    }
}

/// Keep only rows whose `field` is the string `value`.
pub fn filter_eq(records: Vec<Record>, field: &str, value: &str) -> Vec<Record> {
    let before = records.len();
    let kept: Vec<Record> = records
        .into_iter()
        .filter(|record| record.get(field).and_then(Value::as_str) == Some(value))
        .collect();
    debug!(field, value, before, after = kept.len(), "filtered rows");
    kept
}

/// Full outer join of several tables on the identifier in `field`.
///
/// Identifiers come out in first-seen order (scanning the tables in order).
/// For each identifier the output holds every combination of one matching
/// row from each table that has any; tables without a match are skipped
/// rather than dropping the identifier. Fields of later tables overwrite
/// same-named fields of earlier ones.
///
/// # Errors
/// - `Error::MissingKey` / `Error::InvalidKey` if a row has no usable identifier
pub fn join_on(field: &str, tables: &[Vec<Record>]) -> Result<Vec<Record>> {
    let mut order: Vec<i64> = Vec::new();
    let mut by_table: Vec<HashMap<i64, Vec<&Record>>> = Vec::with_capacity(tables.len());

    for table in tables {
        let mut rows: HashMap<i64, Vec<&Record>> = HashMap::new();
        for record in table {
            let key = record.key(field)?;
            if !by_table.iter().any(|seen| seen.contains_key(&key)) && !rows.contains_key(&key) {
                order.push(key);
            }
            rows.entry(key).or_default().push(record);
        }
        by_table.push(rows);
    }

    let mut joined = Vec::new();
    for key in &order {
        let mut combos = vec![Record::new()];
        for rows in by_table.iter().filter_map(|table| table.get(key)) {
            combos = combos
                .iter()
                .flat_map(|combo| {
                    rows.iter().map(move |row| {
                        let mut merged = combo.clone();
                        merged.merge_from(row);
                        merged
                    })
                })
                .collect();
        }
        joined.extend(combos);
    }

    info!(
        tables = tables.len(),
        identifiers = order.len(),
        rows = joined.len(),
        "joined tables"
    );
    Ok(joined)
}

/// Collapse joined rows to one record per identifier.
///
/// Every non-null `SYMPTOMn` (with its `SYMPTOMVERSIONn`) from all rows of an
/// identifier is gathered in order and renumbered from 1, so a record can end
/// up with more than [`SYMPTOM_SLOTS`] symptoms. All other fields come from the
/// identifier's first row.
///
/// # Errors
/// - `Error::MissingKey` / `Error::InvalidKey` if a row has no usable identifier
pub fn collapse_symptoms(rows: Vec<Record>, field: &str) -> Result<Vec<Record>> {
    struct Group {
        base: Record,
        symptoms: Vec<(Value, Value)>,
    }

    let mut order: Vec<i64> = Vec::new();
    let mut groups: HashMap<i64, Group> = HashMap::new();

    for mut row in rows {
        let key = row.key(field)?;
        let mut symptoms = Vec::new();
        for slot in 1..=SYMPTOM_SLOTS {
            let name = row.remove(&symptom_field(slot));
            let version = row.remove(&version_field(slot)).unwrap_or(Value::Null);
            if let Some(name) = name.filter(|name| !name.is_null()) {
                symptoms.push((name, version));
            }
        }

        groups
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Group {
                    base: row,
                    symptoms: Vec::new(),
                }
            })
            .symptoms
            .extend(symptoms);
    }

    let collapsed: Vec<Record> = order
        .iter()
        .filter_map(|key| groups.remove(key))
        .map(|Group { mut base, symptoms }| {
            for (i, (name, version)) in symptoms.into_iter().enumerate() {
                base.insert(symptom_field(i + 1), name);
                base.insert(version_field(i + 1), version);
            }
            base
        })
        .collect();

    debug!(records = collapsed.len(), "collapsed symptom rows");
    Ok(collapsed)
}

fn symptom_field(slot: usize) -> String {
    format!("SYMPTOM{slot}")
}

fn version_field(slot: usize) -> String {
    format!("SYMPTOMVERSION{slot}")
}
