//! Supplier of defect lots. The defect description carries German and English
//! text separated by `/`.

use super::{FieldMap, MetadataField, OrderField};
use crate::steel::ingest::error::Result;
use crate::steel::ingest::model::{MetadataRecord, TableRow};

pub const DEFECT_HEADER: &str = "Defect description";

pub const ORDER_INFO_FIELDS: &[(&str, OrderField)] = &[
    ("Quantity", OrderField::Quantity),
    ("Weight", OrderField::Weight),
];

pub const METADATA_FIELDS: &[(&str, MetadataField)] = &[
    ("Grade", MetadataField::Grade),
    ("Coating", MetadataField::Coating),
    ("Finish", MetadataField::Finish("en")),
    ("Thickness", MetadataField::ThicknessMm),
    ("Width", MetadataField::WidthMm),
    ("Length", MetadataField::LengthMm),
];

pub const FIELDS: FieldMap = FieldMap {
    order_info: ORDER_INFO_FIELDS,
    metadata: METADATA_FIELDS,
    composition: &[],
    default_unit: Some("kg"),
    refine: Some(apply_defect_description),
};

fn apply_defect_description(row: &TableRow<'_>, record: &mut MetadataRecord) -> Result<()> {
    if let Some(text) = row.text(DEFECT_HEADER) {
        for (language, value) in split_languages(&text) {
            record
                .description_i18n
                .insert(language.to_string(), value.to_string());
        }
    }
    Ok(())
}

/// Splits `"de / en"` positionally; text without `/` is German only.
pub fn split_languages(text: &str) -> Vec<(&'static str, &str)> {
    let parts: Vec<(&'static str, &str)> = match text.split_once('/') {
        Some((german, english)) => vec![("de", german.trim()), ("en", english.trim())],
        None => vec![("de", text.trim())],
    };
    parts
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .collect()
}
