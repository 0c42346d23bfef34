//! CSV tables, as exported by reporting systems that still write Latin-1.

use std::borrow::Cow;
use std::io::Read;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use serde_json::{Number, Value};
use tracing::debug;

use crate::common::{Error, Result};
use crate::ingest::record::Record;

/// Parse a CSV table with a header row into records.
///
/// Input is decoded as UTF-8 when it is valid UTF-8 (or starts with a byte
/// order mark), and as Latin-1 otherwise. Cells become JSON values: empty
/// cells are `null`, integers and finite decimals are numbers, everything
/// else is a string. Short rows are padded with `null`.
///
/// # Errors
/// - I/O errors from `reader`
/// - `Error::Csv` on malformed CSV
/// - `Error::InvalidRecord` if a row has more cells than the header
pub fn read_csv_records<R: Read>(mut reader: R) -> Result<Vec<Record>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let text = decode(&bytes);

    let mut table = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = table.headers()?.clone();

    let mut records = Vec::new();
    for (line, row) in table.records().enumerate() {
        let row = row?;
        if row.len() > headers.len() {
            return Err(Error::InvalidRecord(format!(
                "row {} has {} cells but the header names {}",
                line + 1,
                row.len(),
                headers.len()
            )));
        }
        let mut record = Record::new();
        for (i, header) in headers.iter().enumerate() {
            record.insert(header, infer_cell(row.get(i).unwrap_or("")));
        }
        records.push(record);
    }
    Ok(records)
}

fn decode(bytes: &[u8]) -> Cow<'_, str> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return encoding.decode_without_bom_handling(&bytes[bom_len..]).0;
    }
    match UTF_8.decode_without_bom_handling_and_without_replacement(bytes) {
        Some(text) => text,
        None => {
            debug!("input is not UTF-8, decoding as Latin-1");
            WINDOWS_1252.decode_without_bom_handling(bytes).0
        }
    }
}

fn infer_cell(cell: &str) -> Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Value::from(n);
    }
    if let Some(n) = trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
    {
        return Value::Number(n);
    }
    Value::String(cell.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_cell() {
        assert_eq!(infer_cell(""), Value::Null);
        assert_eq!(infer_cell("  "), Value::Null);
        assert_eq!(infer_cell("902465"), Value::from(902465));
        assert_eq!(infer_cell("-3"), Value::from(-3));
        assert_eq!(infer_cell("51.5"), Value::from(51.5));
        assert_eq!(infer_cell("COVID19"), Value::from("COVID19"));
        assert_eq!(infer_cell("NaN"), Value::from("NaN"));
        assert_eq!(infer_cell("inf"), Value::from("inf"));
    }

    #[test]
    fn test_reads_header_and_rows() {
        let input = "VAERS_ID,STATE,AGE_YRS\n902465,TX,51.0\n902418,,\n";
        let records = read_csv_records(input.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].key("VAERS_ID").unwrap(), 902465);
        assert_eq!(records[0].get("STATE"), Some(&Value::from("TX")));
        assert_eq!(records[0].get("AGE_YRS"), Some(&Value::from(51.0)));
        assert_eq!(records[1].get("STATE"), Some(&Value::Null));
        assert_eq!(records[1].get("AGE_YRS"), Some(&Value::Null));
    }

    #[test]
    fn test_quoted_cells() {
        let input = "VAERS_ID,SYMPTOM_TEXT\n1,\"fever, chills\"\n";
        let records = read_csv_records(input.as_bytes()).unwrap();
        assert_eq!(
            records[0].get("SYMPTOM_TEXT"),
            Some(&Value::from("fever, chills"))
        );
    }

    #[test]
    fn test_latin1_decoded() {
        let mut input = b"VAERS_ID,SYMPTOM1\n7,Caf".to_vec();
        input.push(0xE9);
        input.push(b'\n');

        let records = read_csv_records(&input[..]).unwrap();
        assert_eq!(records[0].get("SYMPTOM1"), Some(&Value::from("Café")));
    }

    #[test]
    fn test_utf8_kept() {
        let input = "\u{feff}VAERS_ID,SYMPTOM1\n7,Café\n";
        let records = read_csv_records(input.as_bytes()).unwrap();
        assert_eq!(records[0].key("VAERS_ID").unwrap(), 7);
        assert_eq!(records[0].get("SYMPTOM1"), Some(&Value::from("Café")));
    }

    #[test]
    fn test_short_row_padded_long_row_rejected() {
        let records = read_csv_records("A,B,C\n1,2\n".as_bytes()).unwrap();
        assert_eq!(records[0].get("C"), Some(&Value::Null));

        assert!(matches!(
            read_csv_records("A,B\n1,2,3\n".as_bytes()),
            Err(Error::InvalidRecord(_))
        ));
    }
}
