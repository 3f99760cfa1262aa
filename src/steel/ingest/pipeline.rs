use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::steel::ingest::error::Result;
use crate::steel::ingest::io::{excel_read, excel_write};
use crate::steel::ingest::merge::{self, Report};
use crate::steel::ingest::model::{Extraction, Supplier, Table};
use crate::steel::ingest::segment;
use crate::steel::ingest::sources;

/// Segmentation outcome of one named sheet. A sheet whose boundaries cannot
/// be reconciled carries its error without affecting the other sheets.
#[derive(Debug)]
pub struct SegmentedSheet {
    pub name: String,
    pub tables: Result<Vec<Table>>,
}

/// Table counts of one sheet, as reported by `summarize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetSummary {
    pub sheet: String,
    /// Data row count of each table, top to bottom.
    pub table_rows: Vec<usize>,
    /// Segmentation failure of the sheet, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reads a workbook and segments each of its sheets independently.
#[instrument(level = "info", skip_all, fields(input = %input.display(), density_threshold = density_threshold))]
pub fn segment_workbook(input: &Path, density_threshold: usize) -> Result<Vec<SegmentedSheet>> {
    let sheets = excel_read::read_workbook(input)?;
    Ok(sheets
        .iter()
        .map(|sheet| {
            let tables = segment::segment(sheet, density_threshold);
            match &tables {
                Ok(tables) => {
                    debug!(sheet = %sheet.name, table_count = tables.len(), "sheet segmented")
                }
                Err(error) => warn!(sheet = %sheet.name, %error, "sheet segmentation failed"),
            }
            SegmentedSheet {
                name: sheet.name.clone(),
                tables,
            }
        })
        .collect())
}

/// Runs one supplier workbook through segmentation and extraction.
///
/// Stops at the first sheet that fails to segment or extract; use
/// [`segment_workbook`] and [`sources::extract`] to handle sheets one by one.
#[instrument(level = "info", skip_all, fields(supplier = %supplier, input = %input.display()))]
pub fn extract_workbook(
    supplier: Supplier,
    input: &Path,
    density_threshold: usize,
) -> Result<Extraction> {
    let mut extraction = Extraction::default();
    for sheet in segment_workbook(input, density_threshold)? {
        extraction.extend(sources::extract(supplier, &sheet.tables?)?);
    }
    info!(records = extraction.len(), "supplier workbook extracted");
    Ok(extraction)
}

/// Extracts every supplier workbook and joins the results.
pub fn run(inputs: &[(Supplier, PathBuf)], density_threshold: usize) -> Result<Report> {
    let extractions = inputs
        .iter()
        .map(|(supplier, input)| extract_workbook(*supplier, input, density_threshold))
        .collect::<Result<Vec<_>>>()?;
    Ok(merge::merge(extractions))
}

/// Writes the report as a workbook and, optionally, as a JSON document.
#[instrument(level = "info", skip(report))]
pub fn export(report: &Report, output: &Path, json_output: Option<&Path>) -> Result<()> {
    excel_write::write_report(output, report)?;
    if let Some(json_output) = json_output {
        let json_string = serde_json::to_string_pretty(report)?;
        fs::write(json_output, json_string)?;
    }
    Ok(())
}

/// Counts tables and rows per sheet without extracting records. Sheets that
/// fail to segment are reported with their error.
pub fn summarize(input: &Path, density_threshold: usize) -> Result<Vec<SheetSummary>> {
    Ok(segment_workbook(input, density_threshold)?
        .into_iter()
        .map(|sheet| match sheet.tables {
            Ok(tables) => SheetSummary {
                sheet: sheet.name,
                table_rows: tables.iter().map(Table::row_count).collect(),
                error: None,
            },
            Err(error) => SheetSummary {
                sheet: sheet.name,
                table_rows: Vec::new(),
                error: Some(error.to_string()),
            },
        })
        .collect())
}
