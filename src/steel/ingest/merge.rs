use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::steel::ingest::error::Result;
use crate::steel::ingest::model::{Extraction, MetadataRecord, OrderInfoRecord, Supplier};

/// Fields carried by both record families. They are suffixed in the joined
/// view so neither side shadows the other.
const OVERLAPPING_FIELDS: [&str; 3] = ["thickness_mm", "width_mm", "length_mm"];
const ORDER_SUFFIX: &str = "_order";
const METADATA_SUFFIX: &str = "_metadata";

/// Join key shared by both record families.
pub type MaterialKey = (String, Supplier);

/// One row of the full outer join between order lines and materials.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedRecord {
    pub material_id: String,
    pub supplier: Supplier,
    pub order_info: Option<OrderInfoRecord>,
    pub metadata: Option<MetadataRecord>,
}

impl MergedRecord {
    /// Flat column → value view of the joined row. Columns of the missing side
    /// are absent.
    pub fn to_row(&self) -> Result<BTreeMap<String, Value>> {
        let mut row = BTreeMap::new();
        row.insert("material_id".to_string(), Value::String(self.material_id.clone()));
        row.insert("supplier".to_string(), Value::String(self.supplier.to_string()));

        if let Some(order_info) = &self.order_info {
            insert_side(&mut row, serde_json::to_value(order_info)?, ORDER_SUFFIX);
        }
        if let Some(metadata) = &self.metadata {
            insert_side(&mut row, serde_json::to_value(metadata)?, METADATA_SUFFIX);
        }
        Ok(row)
    }
}

fn insert_side(row: &mut BTreeMap<String, Value>, side: Value, suffix: &str) {
    let Value::Object(fields) = side else {
        return;
    };
    for (key, value) in fields {
        if key == "material_id" || key == "supplier" {
            continue;
        }
        let column = if OVERLAPPING_FIELDS.contains(&key.as_str()) {
            format!("{key}{suffix}")
        } else {
            key
        };
        row.insert(column, value);
    }
}

/// Unioned record sets of every supplier plus their joined view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub order_info: Vec<OrderInfoRecord>,
    /// One entry per `(material_id, supplier)`.
    pub metadata: Vec<MetadataRecord>,
    pub merged: Vec<MergedRecord>,
}

/// Unions the extractions and full-outer-joins order lines with materials on
/// `(material_id, supplier)`.
#[instrument(level = "info", skip_all)]
pub fn merge(extractions: impl IntoIterator<Item = Extraction>) -> Report {
    let mut order_info = Vec::new();
    let mut metadata: Vec<MetadataRecord> = Vec::new();
    let mut metadata_index: HashMap<MaterialKey, usize> = HashMap::new();

    for extraction in extractions {
        order_info.extend(extraction.order_info);
        for record in extraction.metadata {
            let key = (record.material_id.clone().unwrap_or_default(), record.supplier);
            metadata_index.entry(key).or_insert_with(|| {
                metadata.push(record);
                metadata.len() - 1
            });
        }
    }

    let mut matched = vec![false; metadata.len()];
    let mut merged = Vec::with_capacity(order_info.len());

    for order in &order_info {
        let key = (order.material_id.clone(), order.supplier);
        let material = metadata_index.get(&key).map(|&position| {
            matched[position] = true;
            metadata[position].clone()
        });
        merged.push(MergedRecord {
            material_id: order.material_id.clone(),
            supplier: order.supplier,
            order_info: Some(order.clone()),
            metadata: material,
        });
    }

    for (record, _) in metadata.iter().zip(&matched).filter(|(_, matched)| !**matched) {
        merged.push(MergedRecord {
            material_id: record.material_id.clone().unwrap_or_default(),
            supplier: record.supplier,
            order_info: None,
            metadata: Some(record.clone()),
        });
    }

    info!(
        order_info = order_info.len(),
        metadata = metadata.len(),
        merged = merged.len(),
        "record sets merged"
    );

    Report {
        order_info,
        metadata,
        merged,
    }
}
