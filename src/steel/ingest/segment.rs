//! Splits a raw sheet grid into the independent tables stacked inside it.
//!
//! Boundaries are found from the number of non-empty cells per row: a jump in
//! density by more than the threshold opens a table, a drop closes one.

use tracing::debug;

use crate::steel::ingest::error::{IngestError, Result};
use crate::steel::ingest::model::{Cell, Sheet, Table};

/// Density change a row must exceed to count as a table boundary.
pub const DEFAULT_DENSITY_THRESHOLD: usize = 2;

/// Table start and end row indices detected for one sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundaries {
    pub starts: Vec<usize>,
    pub ends: Vec<usize>,
}

/// Segments `sheet` into its tables, in top-to-bottom order.
pub fn segment(sheet: &Sheet, density_threshold: usize) -> Result<Vec<Table>> {
    let boundaries = detect_boundaries(sheet, density_threshold)?;
    debug!(
        sheet = %sheet.name,
        starts = ?boundaries.starts,
        ends = ?boundaries.ends,
        "detected table boundaries"
    );

    Ok(boundaries
        .starts
        .iter()
        .zip(&boundaries.ends)
        .map(|(&start, &end)| {
            let row_count = if start == 0 { end } else { end.saturating_sub(start) };
            slice_table(sheet, start, row_count)
        })
        .collect())
}

/// Locates and reconciles table boundaries without building the tables.
pub fn detect_boundaries(sheet: &Sheet, density_threshold: usize) -> Result<Boundaries> {
    let row_count = sheet.row_count();
    let threshold = density_threshold as i64;
    let densities: Vec<i64> = (0..row_count).map(|row| sheet.density(row) as i64).collect();

    let mut starts = Vec::new();
    let mut ends = Vec::new();
    for (row, pair) in densities.windows(2).enumerate() {
        let delta = pair[1] - pair[0];
        if delta > threshold {
            starts.push(row + 1);
        } else if delta < -threshold {
            ends.push(row);
        }
    }

    match starts.first() {
        None => starts.push(0),
        Some(&first) if first > 1 => starts.insert(0, 0),
        Some(_) => {}
    }

    let last_row = row_count.saturating_sub(1);
    match ends.last() {
        None => ends.push(row_count),
        Some(&last) if last + 2 < row_count => ends.push(last_row),
        Some(_) => {}
    }

    if starts.len() != ends.len() {
        return Err(IngestError::Segmentation {
            sheet: sheet.name.clone(),
            starts,
            ends,
        });
    }

    Ok(Boundaries { starts, ends })
}

/// Reads `row_count` data rows below the header at `header_row` and drops the
/// columns that hold no value in any of them.
fn slice_table(sheet: &Sheet, header_row: usize, row_count: usize) -> Table {
    let width = sheet.column_count();
    let first_data_row = header_row + 1;
    let last_data_row = (first_data_row + row_count).min(sheet.row_count());

    let rows: Vec<Vec<Cell>> = (first_data_row..last_data_row)
        .map(|row| (0..width).map(|column| sheet.cell(row, column).clone()).collect())
        .collect();

    let kept: Vec<usize> = (0..width)
        .filter(|&column| rows.iter().any(|cells| !cells[column].is_empty()))
        .collect();

    let columns = kept
        .iter()
        .map(|&column| {
            sheet
                .cell(header_row, column)
                .text()
                .unwrap_or_else(|| format!("Unnamed: {column}"))
        })
        .collect();

    let rows = rows
        .into_iter()
        .map(|mut cells| {
            kept.iter()
                .map(|&column| std::mem::take(&mut cells[column]))
                .collect()
        })
        .collect();

    Table {
        sheet_name: sheet.name.clone(),
        header_row,
        columns,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense_row(width: usize, label: &str) -> Vec<Cell> {
        (0..width)
            .map(|column| Cell::string(format!("{label}{column}")))
            .collect()
    }

    fn sheet_from_densities(densities: &[usize]) -> Sheet {
        let width = densities.iter().copied().max().unwrap_or(0);
        let rows = densities
            .iter()
            .enumerate()
            .map(|(row, &density)| {
                let mut cells = dense_row(density, &format!("r{row}c"));
                cells.resize(width, Cell::Empty);
                cells
            })
            .collect();
        Sheet::new("Sheet1", rows)
    }

    #[test]
    fn sheet_without_density_breaks_is_one_table() {
        let sheet = sheet_from_densities(&[4, 4, 4, 4, 4]);
        let tables = segment(&sheet, DEFAULT_DENSITY_THRESHOLD).unwrap();

        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].header_row, 0);
        assert_eq!(tables[0].row_count(), 4);
        assert_eq!(tables[0].columns, vec!["r0c0", "r0c1", "r0c2", "r0c3"]);
    }

    #[test]
    fn blank_separator_row_splits_two_tables() {
        let sheet = sheet_from_densities(&[5, 5, 5, 5, 5, 0, 5, 5, 5, 5]);
        let boundaries = detect_boundaries(&sheet, 2).unwrap();
        assert_eq!(boundaries.starts, vec![0, 6]);
        assert_eq!(boundaries.ends, vec![4, 9]);

        let tables = segment(&sheet, 2).unwrap();
        assert_eq!(tables.len(), 2);
        // Rows [0, 5): header plus four data rows.
        assert_eq!(tables[0].header_row, 0);
        assert_eq!(tables[0].row_count(), 4);
        // Rows [6, 10): header plus three data rows.
        assert_eq!(tables[1].header_row, 6);
        assert_eq!(tables[1].row_count(), 3);
        assert_eq!(tables[1].columns[0], "r6c0");
    }

    #[test]
    fn title_row_above_table_is_skipped() {
        let sheet = sheet_from_densities(&[1, 6, 6, 6]);
        let tables = segment(&sheet, 2).unwrap();

        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].header_row, 1);
        assert_eq!(tables[0].row_count(), 2);
    }

    #[test]
    fn empty_columns_are_dropped_and_unnamed_headers_labelled() {
        let rows = vec![
            vec![Cell::string("Grade"), Cell::string("Unused"), Cell::Empty],
            vec![Cell::string("DX51D"), Cell::Empty, Cell::number(2.0)],
            vec![Cell::string("S235JR"), Cell::Empty, Cell::number(3.0)],
        ];
        let tables = segment(&Sheet::new("Sheet1", rows), 2).unwrap();

        assert_eq!(tables[0].columns, vec!["Grade", "Unnamed: 2"]);
        assert_eq!(tables[0].rows[1], vec![Cell::string("S235JR"), Cell::number(3.0)]);
    }

    #[test]
    fn threshold_controls_sensitivity() {
        let sheet = sheet_from_densities(&[6, 6, 3, 3, 6, 6]);
        assert_eq!(segment(&sheet, 2).unwrap().len(), 2);
        assert_eq!(segment(&sheet, 3).unwrap().len(), 1);
    }

    #[test]
    fn unpaired_boundaries_are_reported() {
        // The second table stops well above the last row, so an implicit end
        // is appended that no start pairs with.
        let sheet = sheet_from_densities(&[5, 5, 5, 0, 0, 5, 5, 0, 0, 0]);
        let error = detect_boundaries(&sheet, 2).unwrap_err();

        match error {
            IngestError::Segmentation { sheet, starts, ends } => {
                assert_eq!(sheet, "Sheet1");
                assert_eq!(starts, vec![0, 5]);
                assert_eq!(ends, vec![2, 6, 9]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
