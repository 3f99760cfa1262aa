use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use rust_xlsxwriter::{TableColumn, Workbook, Worksheet};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::steel::ingest::error::Result;
use crate::steel::ingest::merge::Report;

pub const ORDER_INFO_SHEET: &str = "OrderInfo";
pub const METADATA_SHEET: &str = "Metadata";
pub const MERGED_SHEET: &str = "Merged";

/// Columns written first, in this order, whenever a table carries them.
const LEADING_COLUMNS: [&str; 2] = ["material_id", "supplier"];

/// A table that will be materialised as an Excel sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl SheetTable {
    /// Builds a table whose columns are the union of the keys of all rows.
    pub fn from_rows(sheet_name: &str, records: Vec<BTreeMap<String, Value>>) -> Self {
        let keys: BTreeSet<&str> = records
            .iter()
            .flat_map(|record| record.keys().map(String::as_str))
            .collect();

        let mut columns: Vec<String> = LEADING_COLUMNS
            .iter()
            .filter(|column| keys.contains(*column))
            .map(|column| column.to_string())
            .collect();
        columns.extend(
            keys.iter()
                .filter(|key| !LEADING_COLUMNS.contains(*key))
                .map(|key| key.to_string()),
        );

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| record.get(column).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self {
            sheet_name: sheet_name.to_string(),
            columns,
            rows,
        }
    }
}

/// Lays the report out as the three export tables.
pub fn report_tables(report: &Report) -> Result<Vec<SheetTable>> {
    let merged = report
        .merged
        .iter()
        .map(|record| record.to_row())
        .collect::<Result<Vec<_>>>()?;

    Ok(vec![
        SheetTable::from_rows(ORDER_INFO_SHEET, record_rows(&report.order_info)?),
        SheetTable::from_rows(METADATA_SHEET, record_rows(&report.metadata)?),
        SheetTable::from_rows(MERGED_SHEET, merged),
    ])
}

fn record_rows<T: Serialize>(records: &[T]) -> Result<Vec<BTreeMap<String, Value>>> {
    records
        .iter()
        .map(|record| -> Result<BTreeMap<String, Value>> {
            Ok(match serde_json::to_value(record)? {
                Value::Object(fields) => fields.into_iter().collect(),
                other => BTreeMap::from([("value".to_string(), other)]),
            })
        })
        .collect()
}

/// Writes the report's order-info, metadata, and merged tables to one workbook.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn write_report(path: &Path, report: &Report) -> Result<()> {
    let mut workbook_writer = Workbook::new();

    for table in report_tables(report)? {
        let worksheet = workbook_writer.add_worksheet();
        write_table(worksheet, &table)?;
    }

    workbook_writer.save(path)?;
    Ok(())
}

fn write_table(worksheet: &mut Worksheet, table: &SheetTable) -> Result<()> {
    worksheet.set_name(&table.sheet_name)?;

    for (col_idx, header) in table.columns.iter().enumerate() {
        worksheet.write_string(0, col_idx as u16, header)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let sheet_row = (row_idx + 1) as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            let col_idx = col_idx as u16;
            match cell {
                Value::Null => {}
                Value::String(value) => {
                    worksheet.write_string(sheet_row, col_idx, value)?;
                }
                Value::Number(value) => {
                    if let Some(number) = value.as_f64() {
                        worksheet.write_number(sheet_row, col_idx, number)?;
                    }
                }
                Value::Bool(value) => {
                    worksheet.write_boolean(sheet_row, col_idx, *value)?;
                }
                nested => {
                    worksheet.write_string(sheet_row, col_idx, &serde_json::to_string(nested)?)?;
                }
            }
        }
    }

    if !table.rows.is_empty() && !table.columns.is_empty() {
        let headers: Vec<TableColumn> = table
            .columns
            .iter()
            .map(|column| TableColumn::new().set_header(column))
            .collect();
        let mut excel_table = rust_xlsxwriter::Table::new();
        excel_table.set_autofilter(true).set_columns(&headers);
        let col_end = (table.columns.len() as u16).saturating_sub(1);
        worksheet.add_table(0, 0, table.rows.len() as u32, col_end, &excel_table)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn key_columns_lead_and_missing_cells_are_null() {
        let table = SheetTable::from_rows(
            MERGED_SHEET,
            vec![
                BTreeMap::from([
                    ("weight".to_string(), json!(10.0)),
                    ("supplier".to_string(), json!("source1")),
                    ("material_id".to_string(), json!("a")),
                ]),
                BTreeMap::from([
                    ("grade".to_string(), json!("X")),
                    ("material_id".to_string(), json!("b")),
                ]),
            ],
        );

        assert_eq!(table.columns, vec!["material_id", "supplier", "grade", "weight"]);
        assert_eq!(table.rows[0], vec![json!("a"), json!("source1"), Value::Null, json!(10.0)]);
        assert_eq!(table.rows[1], vec![json!("b"), Value::Null, json!("X"), Value::Null]);
    }
}
