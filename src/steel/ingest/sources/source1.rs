//! Supplier with one row per coil, chemical analysis columns, and English
//! headers over a German description.

use super::{FieldMap, MetadataField, OrderField};

pub const ORDER_INFO_FIELDS: &[(&str, OrderField)] = &[
    ("Gross weight (kg)", OrderField::Weight),
    ("Width (mm)", OrderField::WidthMm),
    ("Thickness (mm)", OrderField::ThicknessMm),
];

pub const METADATA_FIELDS: &[(&str, MetadataField)] = &[
    ("Description", MetadataField::Description("de")),
    ("Quality/Choice", MetadataField::Quality),
    ("Grade", MetadataField::Grade),
    ("Finish", MetadataField::Finish("en")),
    ("RP02", MetadataField::AdditionalInfo("RP02")),
    ("RM", MetadataField::AdditionalInfo("RM")),
];

pub const COMPOSITION_KEYS: &[&str] = &[
    "AG", "Al", "Ars", "B", "C", "Ca", "Cr", "S", "Cu", "Mn", "Mo", "N", "Nb", "Ni", "P", "Si",
    "Sn", "STA", "Ti", "V", "Zr",
];

pub const FIELDS: FieldMap = FieldMap {
    order_info: ORDER_INFO_FIELDS,
    metadata: METADATA_FIELDS,
    composition: COMPOSITION_KEYS,
    default_unit: Some("count"),
    refine: None,
};

#[cfg(test)]
mod tests {
    use super::super::extract;
    use super::super::test_support::table;
    use crate::steel::ingest::model::{Cell, ScalarValue, Supplier};

    #[test]
    fn maps_columns_composition_and_mechanical_values() {
        let table = table(
            &[
                "Description",
                "Quality/Choice",
                "Grade",
                "Finish",
                "Gross weight (kg)",
                "Width (mm)",
                "Thickness (mm)",
                "C",
                "Mn",
                "RP02",
                "RM",
            ],
            vec![vec![
                Cell::string("Warmband gebeizt"),
                Cell::string("2nd"),
                Cell::string("S355MC"),
                Cell::string("pickled and oiled"),
                Cell::number(7840.0),
                Cell::number(1500.0),
                Cell::number(3.0),
                Cell::number(0.07),
                Cell::number(1.35),
                Cell::number(420.0),
                Cell::Empty,
            ]],
        );

        let extraction = extract(Supplier::Source1, &[table]).unwrap();
        let metadata = &extraction.metadata[0];
        let order_info = &extraction.order_info[0];

        assert_eq!(metadata.grade.as_deref(), Some("S355MC"));
        assert_eq!(metadata.quality.as_deref(), Some("2nd"));
        assert_eq!(metadata.description_i18n["de"], "Warmband gebeizt");
        assert_eq!(metadata.finish_i18n["en"], "pickled and oiled");
        assert_eq!(metadata.composition["C"], ScalarValue::Number(0.07));
        assert_eq!(metadata.composition.len(), 2);
        assert_eq!(metadata.additional_info["RP02"], ScalarValue::Number(420.0));
        assert!(!metadata.additional_info.contains_key("RM"));

        assert_eq!(order_info.weight, Some(7840.0));
        assert_eq!(order_info.width_mm, Some(1500.0));
        assert_eq!(order_info.thickness_mm, Some(3.0));
        assert_eq!(order_info.unit.as_deref(), Some("count"));
        assert_eq!(order_info.quantity, None);
    }
}
