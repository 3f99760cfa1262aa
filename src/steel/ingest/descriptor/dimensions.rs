use crate::steel::ingest::error::{IngestError, Result};
use crate::steel::ingest::model::parse_decimal;

/// Decomposed dimensions of a coil or sheet, in millimetres.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Dimensions {
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl Dimensions {
    pub fn is_empty(&self) -> bool {
        self.length.is_none() && self.width.is_none() && self.height.is_none()
    }
}

/// Splits a dimension string such as `"1,50 x 1350,00 x 2850,00"` on `x`.
///
/// Three parts read as height, width, length; two parts as height and width
/// with no length. Any other part count yields empty dimensions.
pub fn decompose(text: &str) -> Result<Dimensions> {
    let parts: Vec<&str> = text.split('x').map(str::trim).collect();

    match parts.as_slice() {
        [height, width, length] => Ok(Dimensions {
            length: Some(parse_part(length)?),
            width: Some(parse_part(width)?),
            height: Some(parse_part(height)?),
        }),
        [height, width] => Ok(Dimensions {
            length: None,
            width: Some(parse_part(width)?),
            height: Some(parse_part(height)?),
        }),
        _ => Ok(Dimensions::default()),
    }
}

fn parse_part(part: &str) -> Result<f64> {
    parse_decimal(part).ok_or_else(|| IngestError::NumericFormat {
        value: part.to_string(),
    })
}
