//! Supplier listing coils under a single German free-text designation such as
//! `DX51D +Z140 Ma-C 1,50 x 1350,00 x 2850,00`.

use tracing::debug;

use super::{FieldMap, MetadataField, OrderField};
use crate::steel::ingest::descriptor;
use crate::steel::ingest::error::Result;
use crate::steel::ingest::model::{MetadataRecord, ScalarValue, TableRow};

pub const DESIGNATION_HEADER: &str = "Materialbezeichnung";

pub const ORDER_INFO_FIELDS: &[(&str, OrderField)] = &[
    ("Artikel", OrderField::MaterialName),
    ("Menge", OrderField::Quantity),
    ("Einheit", OrderField::Unit),
    ("Gewicht (kg)", OrderField::Weight),
    ("Preis", OrderField::PricePerUnit),
];

pub const METADATA_FIELDS: &[(&str, MetadataField)] =
    &[(DESIGNATION_HEADER, MetadataField::Description("de"))];

pub const FIELDS: FieldMap = FieldMap {
    order_info: ORDER_INFO_FIELDS,
    metadata: METADATA_FIELDS,
    composition: &[],
    default_unit: None,
    refine: Some(apply_designation),
};

/// Folds the parsed designation into the record. Fields the designation does
/// not carry stay absent.
fn apply_designation(row: &TableRow<'_>, record: &mut MetadataRecord) -> Result<()> {
    let Some(text) = row.text(DESIGNATION_HEADER) else {
        return Ok(());
    };
    let parsed = descriptor::parse(&text)?;
    if parsed.is_empty() {
        debug!(row = row.row_number(), designation = %text, "designation not recognised");
        return Ok(());
    }

    record.grade = parsed.grade;
    record.coating = parsed.coating;
    if let Some(finish) = parsed.finish {
        record.finish_i18n.insert("de".to_string(), finish);
    }
    if let Some(tag) = parsed.tag {
        record
            .additional_info
            .insert("tag".to_string(), ScalarValue::String(tag));
    }
    record.thickness_mm = parsed.dimensions.height;
    record.width_mm = parsed.dimensions.width;
    record.length_mm = parsed.dimensions.length;
    Ok(())
}
