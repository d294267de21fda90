use std::io::Cursor;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use arrow::util::display::array_value_to_string;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Row, Table};
use crate::error::LoadError;

/// Extensions offered by the upload dialog, per format.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];
pub const CSV_EXTENSIONS: &[&str] = &["csv"];
pub const JSON_EXTENSIONS: &[&str] = &["json"];
pub const PARQUET_EXTENSIONS: &[&str] = &["parquet", "pq"];

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const PARQUET_MAGIC: &[u8] = b"PAR1";

// ---------------------------------------------------------------------------
// Format detection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Spreadsheet,
    Csv,
    Json,
    Parquet,
}

impl UploadFormat {
    /// Pick a format from the file name's extension, falling back to the
    /// leading bytes of the content.
    pub fn detect(name: Option<&str>, bytes: &[u8]) -> Result<Self, LoadError> {
        let ext = name
            .and_then(|n| Path::new(n).extension())
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        let ext = ext.as_str();
        if SPREADSHEET_EXTENSIONS.contains(&ext) {
            return Ok(UploadFormat::Spreadsheet);
        }
        if CSV_EXTENSIONS.contains(&ext) {
            return Ok(UploadFormat::Csv);
        }
        if JSON_EXTENSIONS.contains(&ext) {
            return Ok(UploadFormat::Json);
        }
        if PARQUET_EXTENSIONS.contains(&ext) {
            return Ok(UploadFormat::Parquet);
        }

        Self::sniff(bytes)
    }

    fn sniff(bytes: &[u8]) -> Result<Self, LoadError> {
        if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
            return Ok(UploadFormat::Spreadsheet);
        }
        if bytes.starts_with(PARQUET_MAGIC) {
            return Ok(UploadFormat::Parquet);
        }
        match std::str::from_utf8(bytes) {
            Ok(text) if text.trim_start().starts_with('[') => Ok(UploadFormat::Json),
            Ok(text) if looks_like_csv(text) => Ok(UploadFormat::Csv),
            Ok(_) => Err(LoadError::UnsupportedFormat(
                "text that is neither CSV nor JSON records".to_string(),
            )),
            Err(_) => Err(LoadError::UnsupportedFormat(
                "binary content that is not a spreadsheet".to_string(),
            )),
        }
    }
}

/// Unnamed text is taken as CSV only if its header has a delimiter or a data
/// row follows it.
fn looks_like_csv(text: &str) -> bool {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());
    match lines.next() {
        Some(header) => header.contains(',') || lines.next().is_some(),
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Parse an uploaded byte stream into a [`Table`].
///
/// `name` is the upload's file name, used only to pick the format.
pub fn load_bytes(name: Option<&str>, bytes: &[u8]) -> Result<Table, LoadError> {
    if bytes.is_empty() {
        return Err(LoadError::Empty);
    }

    let format = UploadFormat::detect(name, bytes)?;
    let table = match format {
        UploadFormat::Spreadsheet => load_spreadsheet(bytes)?,
        UploadFormat::Csv => load_csv(bytes)?,
        UploadFormat::Json => load_json(bytes)?,
        UploadFormat::Parquet => load_parquet(bytes)?,
    };

    log::info!(
        "Loaded {format:?} upload: {} rows, columns {:?}",
        table.len(),
        table.column_names().collect::<Vec<_>>()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// Read the first worksheet. Its first row is the header; fully blank rows
/// below it are skipped.
fn load_spreadsheet(bytes: &[u8]) -> Result<Table, LoadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| anyhow!("opening spreadsheet: {e}"))?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook contains no sheets")?
        .map_err(|e| anyhow!("reading first worksheet: {e}"))?;

    let mut lines = range.rows();
    let header: Vec<String> = lines
        .next()
        .ok_or(LoadError::MissingHeader)?
        .iter()
        .map(|cell| match spreadsheet_cell(cell) {
            CellValue::Null => String::new(),
            other => other.to_string(),
        })
        .collect();

    let rows: Vec<Row> = lines
        .map(|line| line.iter().map(spreadsheet_cell).collect::<Row>())
        .filter(|row| !row.iter().all(CellValue::is_null))
        .collect();

    Ok(Table::from_records(header, rows))
}

fn spreadsheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => integral_float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(d) => {
                let text = d.format("%Y-%m-%d %H:%M:%S").to_string();
                CellValue::Date(text.trim_end_matches(" 00:00:00").to_string())
            }
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) => CellValue::Date(s.clone()),
        Data::DurationIso(s) => CellValue::String(s.clone()),
    }
}

/// Spreadsheets store every number as a float; whole numbers come back as
/// integers so `1` and `1.0` are the same category.
fn integral_float(f: f64) -> CellValue {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        CellValue::Integer(f as i64)
    } else {
        CellValue::Float(f)
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line.
fn load_csv(bytes: &[u8]) -> Result<Table, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);
    let header: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if header.is_empty() {
        return Err(LoadError::MissingHeader);
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(Table::from_records(header, rows))
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    match s {
        "true" | "True" | "TRUE" => CellValue::Bool(true),
        "false" | "False" | "FALSE" => CellValue::Bool(false),
        _ => CellValue::String(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Name": "Asha", "Gender": "F", "Category": "A", "Age": 14 },
///   ...
/// ]
/// ```
///
/// Columns are the union of keys, in first-seen order.
fn load_json(bytes: &[u8]) -> Result<Table, LoadError> {
    let root: JsonValue = serde_json::from_slice(bytes).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut header: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !header.contains(key) {
                header.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            header
                .iter()
                .map(|col| obj.get(col).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Ok(Table::from_records(header, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file; every column of the schema becomes a table column.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(bytes: &[u8]) -> Result<Table, LoadError> {
    let data = ::bytes::Bytes::copy_from_slice(bytes);
    let builder = ParquetRecordBatchReaderBuilder::try_new(data)
        .context("reading parquet metadata")?;
    let header: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| arrow_cell(col, row))
                    .collect(),
            );
        }
    }

    Ok(Table::from_records(header, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn arrow_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => CellValue::Integer(col.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => CellValue::Integer(col.as_primitive::<UInt8Type>().value(row) as i64),
        DataType::UInt16 => CellValue::Integer(col.as_primitive::<UInt16Type>().value(row) as i64),
        DataType::UInt32 => CellValue::Integer(col.as_primitive::<UInt32Type>().value(row) as i64),
        DataType::UInt64 => match i64::try_from(col.as_primitive::<UInt64Type>().value(row)) {
            Ok(i) => CellValue::Integer(i),
            Err(_) => CellValue::Float(col.as_primitive::<UInt64Type>().value(row) as f64),
        },
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            CellValue::Date(display_cell(col, row))
        }
        // Dictionary-encoded strings (pandas categoricals) and anything else
        _ => CellValue::String(display_cell(col, row)),
    }
}

fn display_cell(col: &ArrayRef, row: usize) -> String {
    array_value_to_string(col, row).unwrap_or_else(|_| format!("{:?}", col.data_type()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ColumnKind;
    use rust_xlsxwriter::Workbook;

    fn students_workbook() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (c, h) in ["Name", "Gender", "Category", "Age", "Scholarship"]
            .iter()
            .enumerate()
        {
            sheet.write_string(0, c as u16, *h).unwrap();
        }
        let rows = [
            ("Asha", "F", "A", 14.0, true),
            ("Ravi", "M", "A", 15.0, false),
            ("Meera", "F", "B", 14.0, true),
        ];
        for (r, (name, gender, cat, age, sch)) in rows.iter().enumerate() {
            let r = r as u32 + 1;
            sheet.write_string(r, 0, *name).unwrap();
            sheet.write_string(r, 1, *gender).unwrap();
            sheet.write_string(r, 2, *cat).unwrap();
            sheet.write_number(r, 3, *age).unwrap();
            sheet.write_boolean(r, 4, *sch).unwrap();
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn loads_xlsx_with_inferred_kinds() {
        let table = load_bytes(Some("students.xlsx"), &students_workbook()).unwrap();
        assert_eq!(table.len(), 3);
        let kinds: Vec<_> = table.columns().iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ColumnKind::Categorical,
                ColumnKind::Categorical,
                ColumnKind::Categorical,
                ColumnKind::Numeric,
                ColumnKind::Boolean,
            ]
        );
        // whole-number floats come back as integers
        assert_eq!(table.value(0, "Age"), Some(&CellValue::Integer(14)));
        assert_eq!(table.value(2, "Gender"), Some(&CellValue::from("F")));
    }

    #[test]
    fn sniffs_xlsx_without_a_name() {
        let table = load_bytes(None, &students_workbook()).unwrap();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn skips_blank_spreadsheet_rows() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Gender").unwrap();
        sheet.write_string(1, 0, "F").unwrap();
        sheet.write_string(3, 0, "M").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let table = load_bytes(Some("gaps.xlsx"), &bytes).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn empty_upload_is_a_load_error() {
        assert!(matches!(
            load_bytes(Some("students.xlsx"), b""),
            Err(LoadError::Empty)
        ));
    }

    #[test]
    fn corrupt_spreadsheet_is_a_load_error() {
        let err = load_bytes(Some("students.xlsx"), b"definitely not a workbook");
        assert!(matches!(err, Err(LoadError::Malformed(_))));
    }

    #[test]
    fn binary_garbage_is_unsupported() {
        let err = load_bytes(None, &[0xff, 0xfe, 0x00, 0x81]);
        assert!(matches!(err, Err(LoadError::UnsupportedFormat(_))));
    }

    #[test]
    fn unnamed_text_must_look_like_csv() {
        for text in [&b"hello"[..], b"hello\n\n", b"   \n"] {
            assert!(matches!(
                load_bytes(None, text),
                Err(LoadError::UnsupportedFormat(_))
            ));
        }
        assert_eq!(load_bytes(None, b"Gender\nF\n").unwrap().len(), 1);
        assert!(load_bytes(None, b"Gender,Category\n").unwrap().is_empty());
        // a .csv name skips sniffing
        assert!(load_bytes(Some("one.csv"), b"hello").unwrap().is_empty());
    }

    #[test]
    fn loads_csv_with_guessed_types() {
        let csv = b"Name,Gender,Age,Active\nAsha,F,14,true\nRavi,M,,False\n";
        let table = load_bytes(Some("students.csv"), csv).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(1, "Age"), Some(&CellValue::Null));
        assert_eq!(table.value(1, "Active"), Some(&CellValue::Bool(false)));
        assert_eq!(table.columns()[2].kind, ColumnKind::Numeric);
        assert_eq!(table.columns()[1].kind, ColumnKind::Categorical);
    }

    #[test]
    fn ragged_csv_rows_are_padded() {
        let csv = b"Gender,Category\nF\nM,B\n";
        let table = load_bytes(Some("ragged.csv"), csv).unwrap();
        assert_eq!(table.value(0, "Category"), Some(&CellValue::Null));
    }

    #[test]
    fn loads_json_records() {
        let json = br#"[{"Gender": "F", "Age": 14}, {"Gender": "M", "Club": "Chess"}]"#;
        let table = load_bytes(None, json).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.has_column("Club"));
        assert_eq!(table.value(0, "Club"), Some(&CellValue::Null));
        assert_eq!(table.value(1, "Age"), Some(&CellValue::Null));
    }

    #[test]
    fn json_must_be_an_array_of_objects() {
        assert!(load_bytes(Some("x.json"), br#"{"a": 1}"#).is_err());
        assert!(load_bytes(Some("x.json"), b"[1, 2]").is_err());
    }

    #[test]
    fn loads_parquet() {
        use arrow::array::{Int64Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;
        use std::sync::Arc;

        let schema = Arc::new(Schema::new(vec![
            Field::new("Gender", DataType::Utf8, true),
            Field::new("Age", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("F"), None])),
                Arc::new(Int64Array::from(vec![14, 15])),
            ],
        )
        .unwrap();
        let mut buf = Vec::new();
        let mut writer = ArrowWriter::try_new(&mut buf, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_bytes(Some("students.parquet"), &buf).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(1, "Gender"), Some(&CellValue::Null));
        assert_eq!(table.value(1, "Age"), Some(&CellValue::Integer(15)));
    }
}
