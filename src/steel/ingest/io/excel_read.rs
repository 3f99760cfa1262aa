use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx, open_workbook};
use tracing::{debug, instrument};

use crate::steel::ingest::error::{IngestError, Result};
use crate::steel::ingest::model::{Cell, ScalarValue, Sheet};

/// Reads every worksheet of an `.xlsx` workbook as a raw cell grid.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn read_workbook(path: &Path) -> Result<Vec<Sheet>> {
    if !path.exists() {
        return Err(IngestError::MissingInput(path.to_path_buf()));
    }
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names().to_vec() {
        let range = read_required_sheet(&mut workbook, &name)?;
        let sheet = range_to_sheet(&name, &range);
        debug!(sheet = %name, rows = sheet.row_count(), "sheet loaded");
        sheets.push(sheet);
    }
    Ok(sheets)
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| IngestError::MissingSheet(name.to_string()))?;
    let range = range_result.map_err(IngestError::from)?;
    Ok(range)
}

/// Converts a calamine range into a grid anchored at cell A1. Calamine trims
/// leading blank rows and columns, so they are padded back in.
fn range_to_sheet(name: &str, range: &Range<DataType>) -> Sheet {
    let (row_offset, column_offset) = range
        .start()
        .map(|(row, column)| (row as usize, column as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_offset];
    for source_row in range.rows() {
        let mut cells = vec![Cell::Empty; column_offset];
        cells.extend(source_row.iter().map(data_to_cell));
        rows.push(cells);
    }

    Sheet::new(name, rows)
}

fn data_to_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::String(value) => Cell::Value(ScalarValue::String(value.clone())),
        DataType::Float(value) => Cell::Value(ScalarValue::Number(*value)),
        DataType::Int(value) => Cell::Value(ScalarValue::Number(*value as f64)),
        DataType::Bool(value) => Cell::Value(ScalarValue::Boolean(*value)),
        DataType::Empty | DataType::Error(_) => Cell::Empty,
        other => Cell::Value(ScalarValue::String(other.to_string())),
    }
}
