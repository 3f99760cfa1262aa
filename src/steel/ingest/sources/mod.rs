//! Supplier-specific field mappings and row extraction.
//!
//! Every supplier declares a static [`FieldMap`] from its header text to the
//! canonical record fields. Extraction walks each table row, fills a
//! [`MetadataRecord`], hashes it, and builds the matching [`OrderInfoRecord`].

pub mod source1;
pub mod source2;
pub mod source3;

use tracing::{debug, instrument};

use crate::steel::ingest::error::{IngestError, Result};
use crate::steel::ingest::model::{
    Extraction, MetadataRecord, OrderInfoRecord, Supplier, Table, TableRow,
};

/// Canonical order-info fields a supplier column can feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    MaterialName,
    Quantity,
    Unit,
    PricePerUnit,
    Weight,
    ThicknessMm,
    WidthMm,
    LengthMm,
}

/// Canonical metadata fields a supplier column can feed. Language and key
/// payloads name the sub-mapping entry that receives the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    Grade,
    Quality,
    Coating,
    Finish(&'static str),
    Description(&'static str),
    ThicknessMm,
    WidthMm,
    LengthMm,
    AdditionalInfo(&'static str),
}

/// Hook for supplier rules that cannot be expressed as a plain column mapping.
pub type Refinement = fn(&TableRow<'_>, &mut MetadataRecord) -> Result<()>;

/// Static description of one supplier's spreadsheet layout.
#[derive(Debug, Clone, Copy)]
pub struct FieldMap {
    pub order_info: &'static [(&'static str, OrderField)],
    pub metadata: &'static [(&'static str, MetadataField)],
    /// Element columns copied verbatim into `composition`.
    pub composition: &'static [&'static str],
    /// Unit used when the row does not carry one.
    pub default_unit: Option<&'static str>,
    pub refine: Option<Refinement>,
}

impl Supplier {
    pub fn field_map(&self) -> &'static FieldMap {
        match self {
            Supplier::Source1 => &source1::FIELDS,
            Supplier::Source2 => &source2::FIELDS,
            Supplier::Source3 => &source3::FIELDS,
        }
    }
}

/// Extracts one order-info and one metadata record per non-blank row of every
/// table.
#[instrument(level = "info", skip(tables), fields(table_count = tables.len()))]
pub fn extract(supplier: Supplier, tables: &[Table]) -> Result<Extraction> {
    let mut extraction = Extraction::default();

    for table in tables {
        for row in table.records() {
            if row.is_blank() {
                continue;
            }
            let (order_info, metadata) =
                extract_row(supplier, &row).map_err(|source| IngestError::Row {
                    supplier: supplier.to_string(),
                    sheet: row.sheet_name().to_string(),
                    row: row.row_number(),
                    source: Box::new(source),
                })?;
            extraction.push(order_info, metadata);
        }
        debug!(sheet = %table.sheet_name, header_row = table.header_row, "table extracted");
    }

    Ok(extraction)
}

/// Builds the record pair for a single row.
pub fn extract_row(
    supplier: Supplier,
    row: &TableRow<'_>,
) -> Result<(OrderInfoRecord, MetadataRecord)> {
    let fields = supplier.field_map();

    let mut metadata = MetadataRecord::new(supplier);
    apply_metadata_fields(row, fields.metadata, &mut metadata)?;
    for &element in fields.composition {
        if let Some(value) = row.get(element) {
            metadata.composition.insert(element.to_string(), value.clone());
        }
    }
    if let Some(refine) = fields.refine {
        refine(row, &mut metadata)?;
    }
    let material_id = metadata.assign_material_id()?.to_string();

    let mut order_info = OrderInfoRecord::new(material_id, supplier);
    apply_order_fields(row, fields.order_info, &mut order_info)?;
    if order_info.unit.is_none() {
        order_info.unit = fields.default_unit.map(str::to_string);
    }

    Ok((order_info, metadata))
}

fn apply_metadata_fields(
    row: &TableRow<'_>,
    mapping: &[(&str, MetadataField)],
    record: &mut MetadataRecord,
) -> Result<()> {
    for &(header, field) in mapping {
        match field {
            MetadataField::Grade => record.grade = row.text(header),
            MetadataField::Quality => record.quality = row.text(header),
            MetadataField::Coating => record.coating = row.text(header),
            MetadataField::Finish(language) => {
                if let Some(text) = row.text(header) {
                    record.finish_i18n.insert(language.to_string(), text);
                }
            }
            MetadataField::Description(language) => {
                if let Some(text) = row.text(header) {
                    record.description_i18n.insert(language.to_string(), text);
                }
            }
            MetadataField::ThicknessMm => record.thickness_mm = row.number(header)?,
            MetadataField::WidthMm => record.width_mm = row.number(header)?,
            MetadataField::LengthMm => record.length_mm = row.number(header)?,
            MetadataField::AdditionalInfo(key) => {
                if let Some(value) = row.get(header) {
                    record.additional_info.insert(key.to_string(), value.clone());
                }
            }
        }
    }
    Ok(())
}

fn apply_order_fields(
    row: &TableRow<'_>,
    mapping: &[(&str, OrderField)],
    record: &mut OrderInfoRecord,
) -> Result<()> {
    for &(header, field) in mapping {
        match field {
            OrderField::MaterialName => record.material_name = row.text(header),
            OrderField::Quantity => record.quantity = row.number(header)?,
            OrderField::Unit => record.unit = row.text(header),
            OrderField::PricePerUnit => record.price_per_unit = row.number(header)?,
            OrderField::Weight => record.weight = row.number(header)?,
            OrderField::ThicknessMm => record.thickness_mm = row.number(header)?,
            OrderField::WidthMm => record.width_mm = row.number(header)?,
            OrderField::LengthMm => record.length_mm = row.number(header)?,
        }
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::test_support::table;
    use super::*;
    use crate::steel::ingest::model::Cell;

    #[test]
    fn blank_rows_are_skipped() {
        let table = table(
            &["Grade", "Quantity"],
            vec![
                vec![Cell::string("S235JR"), Cell::number(2.0)],
                vec![Cell::Empty, Cell::string(" ")],
            ],
        );
        let extraction = extract(Supplier::Source3, &[table]).unwrap();
        assert_eq!(extraction.len(), 1);
    }

    #[test]
    fn row_failures_carry_their_position() {
        let table = table(
            &["Grade", "Weight"],
            vec![
                vec![Cell::string("S235JR"), Cell::number(900.0)],
                vec![Cell::string("S355J2"), Cell::string("heavy")],
            ],
        );
        let error = extract(Supplier::Source3, &[table]).unwrap_err();

        match error {
            IngestError::Row {
                supplier,
                sheet,
                row,
                source,
            } => {
                assert_eq!(supplier, "source3");
                assert_eq!(sheet, "Sheet1");
                // header on sheet row 1, failing cell on sheet row 3
                assert_eq!(row, 3);
                assert!(matches!(*source, IngestError::NumericFormat { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn order_info_carries_metadata_identifier() {
        let table = table(
            &["Grade", "Quantity"],
            vec![vec![Cell::string("S235JR"), Cell::number(2.0)]],
        );
        let extraction = extract(Supplier::Source3, &[table]).unwrap();

        assert_eq!(
            extraction.metadata[0].material_id.as_deref(),
            Some(extraction.order_info[0].material_id.as_str())
        );
        assert_eq!(extraction.order_info[0].supplier, Supplier::Source3);
        assert_eq!(extraction.metadata[0].supplier, Supplier::Source3);
    }

    #[test]
    fn identical_rows_share_one_material() {
        let row = vec![Cell::string("S235JR"), Cell::number(2.0)];
        let table = table(&["Grade", "Quantity"], vec![row.clone(), row]);
        let extraction = extract(Supplier::Source3, &[table]).unwrap();

        assert_eq!(
            extraction.order_info[0].material_id,
            extraction.order_info[1].material_id
        );
    }
}
