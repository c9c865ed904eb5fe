//! Spreadsheet import and export.

use std::io::Cursor;

use calamine::{Data, Reader as _, open_workbook_auto_from_rs};
use rust_xlsxwriter::Workbook;
use serde_json::{Map, Number, Value};
use tridharma_core::activity::ExportRow;

use crate::{Error, Result};

/// Name of the single sheet written by [`write_workbook`].
pub const EXPORT_SHEET: &str = "kegiatan";

/// Read the first sheet of an xlsx/xls/ods workbook into row objects.
///
/// The first row supplies the keys. Empty cells are omitted from their row
/// and rows with no values at all are skipped. Whole-number cells become JSON
/// integers; dates are kept as their spreadsheet serial number.
pub fn read_rows(bytes: &[u8]) -> Result<Vec<Map<String, Value>>> {
  let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
  let sheet = workbook.sheet_names().first().cloned().ok_or(Error::NoSheet)?;
  let range = workbook.worksheet_range(&sheet)?;

  let mut rows = range.rows();
  let Some(header) = rows.next() else {
    return Ok(Vec::new());
  };
  let keys: Vec<String> = header.iter().map(|c| c.to_string().trim().to_owned()).collect();

  let parsed = rows
    .filter_map(|cells| {
      let row: Map<String, Value> = keys
        .iter()
        .zip(cells)
        .filter(|(key, _)| !key.is_empty())
        .filter_map(|(key, cell)| cell_value(cell).map(|v| (key.clone(), v)))
        .collect();
      (!row.is_empty()).then_some(row)
    })
    .collect::<Vec<_>>();

  tracing::debug!(sheet = %sheet, rows = parsed.len(), "workbook parsed");
  Ok(parsed)
}

fn cell_value(cell: &Data) -> Option<Value> {
  match cell {
    Data::Empty => None,
    Data::String(s) => Some(Value::String(s.clone())),
    Data::Bool(b) => Some(Value::Bool(*b)),
    Data::Int(i) => Some(Value::from(*i)),
    Data::Float(f) => Some(number(*f)),
    Data::DateTime(dt) => Some(number(dt.as_f64())),
    Data::DateTimeIso(s) | Data::DurationIso(s) => Some(Value::String(s.clone())),
    Data::Error(e) => Some(Value::String(e.to_string())),
  }
}

fn number(f: f64) -> Value {
  if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
    Value::from(f as i64)
  } else {
    Number::from_f64(f).map_or(Value::Null, Value::Number)
  }
}

/// Write `rows` to an in-memory `.xlsx` file with a header row.
pub fn write_workbook(rows: &[ExportRow]) -> Result<Vec<u8>> {
  let mut workbook = Workbook::new();
  let sheet = workbook.add_worksheet();
  sheet.set_name(EXPORT_SHEET)?;

  for (col, header) in ExportRow::HEADERS.iter().enumerate() {
    sheet.write_string(0, col as u16, *header)?;
  }

  for (i, row) in rows.iter().enumerate() {
    let r = i as u32 + 1;
    sheet.write_number(r, 0, row.id as f64)?;
    sheet.write_string(r, 1, &row.kind)?;
    if let Some(prodi) = &row.department {
      sheet.write_string(r, 2, prodi)?;
    }
    sheet.write_string(r, 3, &row.owner_name)?;
    sheet.write_string(r, 4, &row.created_at)?;
    if let Some(data) = &row.data {
      sheet.write_string(r, 5, data)?;
    }
  }

  Ok(workbook.save_to_buffer()?)
}
