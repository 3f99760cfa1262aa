use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::steel::ingest::error::{IngestError, Result};

/// Language code → text mapping used by multi-language fields.
pub type I18nText = BTreeMap<String, String>;

/// Represents a scalar value copied verbatim out of a spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    /// Plain string literal.
    String(String),
    /// Floating point number literal. Excel stores every number as a double.
    Number(f64),
    /// Boolean literal.
    Boolean(bool),
}

impl ScalarValue {
    /// Returns the value as a number, reading strings with a comma decimal
    /// separator the way European suppliers write them.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScalarValue::Number(value) => value.is_finite().then_some(*value),
            ScalarValue::String(value) => parse_decimal(value),
            ScalarValue::Boolean(_) => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::String(value) => f.write_str(value),
            ScalarValue::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                write!(f, "{}", *value as i64)
            }
            ScalarValue::Number(value) => write!(f, "{value}"),
            ScalarValue::Boolean(value) => write!(f, "{value}"),
        }
    }
}

/// Plain decimal: optional sign, digits, at most one `.` or `,` decimal point.
static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(?:\d+(?:[.,]\d*)?|[.,]\d+)$").expect("decimal pattern compiles"));

/// Parses a decimal number written with either a comma or a period as the
/// decimal point. Exponents, `nan` and `inf` are not numbers here.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let text = text.trim();
    if !DECIMAL.is_match(text) {
        return None;
    }
    text.replace(',', ".").parse::<f64>().ok()
}

/// One cell of a raw sheet grid.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Value(ScalarValue),
}

impl Cell {
    pub fn string(value: impl Into<String>) -> Self {
        Cell::Value(ScalarValue::String(value.into()))
    }

    pub fn number(value: f64) -> Self {
        Cell::Value(ScalarValue::Number(value))
    }

    /// A cell is empty when it holds nothing or only whitespace.
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Value(ScalarValue::String(value)) => value.trim().is_empty(),
            Cell::Value(_) => false,
        }
    }

    /// Returns the scalar held by the cell, or `None` for empty cells.
    pub fn value(&self) -> Option<&ScalarValue> {
        match self {
            Cell::Value(value) if !self.is_empty() => Some(value),
            _ => None,
        }
    }

    /// Renders the cell as text, trimming strings. Empty cells render as `None`.
    pub fn text(&self) -> Option<String> {
        self.value().map(|value| value.to_string().trim().to_string())
    }
}

/// A worksheet's raw cell grid. Row and column indices match the physical
/// sheet, with row 0 being the first sheet row.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&EMPTY)
    }

    /// Number of non-empty cells in the given row.
    pub fn density(&self, row: usize) -> usize {
        self.rows
            .get(row)
            .map(|cells| cells.iter().filter(|cell| !cell.is_empty()).count())
            .unwrap_or(0)
    }
}

/// A logically distinct table segmented out of a [`Sheet`]: the first row of
/// the slice becomes the header, fully empty columns are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub sheet_name: String,
    /// Sheet row index holding the header.
    pub header_row: usize,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == header)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn records(&self) -> impl Iterator<Item = TableRow<'_>> {
        self.rows
            .iter()
            .enumerate()
            .map(move |(index, cells)| TableRow {
                table: self,
                index,
                cells,
            })
    }
}

/// Borrowed view over one data row of a [`Table`], addressed by header text.
#[derive(Debug, Clone, Copy)]
pub struct TableRow<'a> {
    table: &'a Table,
    index: usize,
    cells: &'a [Cell],
}

impl<'a> TableRow<'a> {
    /// Returns the scalar under the given header, `None` when the column is
    /// missing or the cell is empty.
    pub fn get(&self, header: &str) -> Option<&'a ScalarValue> {
        let column = self.table.column_index(header)?;
        self.cells.get(column).and_then(Cell::value)
    }

    pub fn text(&self, header: &str) -> Option<String> {
        let column = self.table.column_index(header)?;
        self.cells.get(column).and_then(Cell::text)
    }

    /// Reads a numeric column, accepting comma decimals in text cells.
    pub fn number(&self, header: &str) -> Result<Option<f64>> {
        match self.get(header) {
            None => Ok(None),
            Some(value) => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| IngestError::NumericFormat {
                    value: value.to_string(),
                }),
        }
    }

    /// True when no cell of the row holds a value.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }

    /// Zero-based position of the row inside the physical sheet.
    pub fn sheet_row(&self) -> usize {
        self.table.header_row + 1 + self.index
    }

    /// One-based row number as shown by spreadsheet applications.
    pub fn row_number(&self) -> usize {
        self.sheet_row() + 1
    }

    pub fn sheet_name(&self) -> &'a str {
        &self.table.sheet_name
    }
}

/// Identifies the supplier a workbook originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Supplier {
    Source1,
    Source2,
    Source3,
}

impl Supplier {
    pub const ALL: [Supplier; 3] = [Supplier::Source1, Supplier::Source2, Supplier::Source3];

    pub fn as_str(&self) -> &'static str {
        match self {
            Supplier::Source1 => "source1",
            Supplier::Source2 => "source2",
            Supplier::Source3 => "source3",
        }
    }
}

impl fmt::Display for Supplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Supplier {
    type Err = IngestError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        Supplier::ALL
            .into_iter()
            .find(|supplier| supplier.as_str() == value.trim())
            .ok_or_else(|| IngestError::UnknownSupplier(value.to_string()))
    }
}

/// Content-hashed description of a physical material. Absent source fields
/// stay absent so that they never leak into the identity hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coating: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub finish_i18n: I18nText,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub description_i18n: I18nText,
    #[serde(default)]
    pub composition: BTreeMap<String, ScalarValue>,
    pub supplier: Supplier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness_mm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_mm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_mm: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_info: BTreeMap<String, ScalarValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_id: Option<String>,
}

impl MetadataRecord {
    pub fn new(supplier: Supplier) -> Self {
        Self {
            grade: None,
            quality: None,
            coating: None,
            finish_i18n: I18nText::new(),
            description_i18n: I18nText::new(),
            composition: BTreeMap::new(),
            supplier,
            thickness_mm: None,
            width_mm: None,
            length_mm: None,
            additional_info: BTreeMap::new(),
            material_id: None,
        }
    }
}

/// One transactional order line referencing a [`MetadataRecord`] through
/// `(material_id, supplier)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderInfoRecord {
    pub material_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_unit: Option<f64>,
    pub supplier: Supplier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness_mm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_mm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_mm: Option<f64>,
}

impl OrderInfoRecord {
    pub fn new(material_id: impl Into<String>, supplier: Supplier) -> Self {
        Self {
            material_id: material_id.into(),
            material_name: None,
            quantity: None,
            unit: None,
            price_per_unit: None,
            supplier,
            weight: None,
            thickness_mm: None,
            width_mm: None,
            length_mm: None,
        }
    }
}

/// Parallel record sequences produced by one supplier extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub order_info: Vec<OrderInfoRecord>,
    pub metadata: Vec<MetadataRecord>,
}

impl Extraction {
    pub fn push(&mut self, order_info: OrderInfoRecord, metadata: MetadataRecord) {
        self.order_info.push(order_info);
        self.metadata.push(metadata);
    }

    pub fn extend(&mut self, other: Extraction) {
        self.order_info.extend(other.order_info);
        self.metadata.extend(other.metadata);
    }

    pub fn len(&self) -> usize {
        self.order_info.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order_info.is_empty()
    }
}
