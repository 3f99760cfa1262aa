//! Parser for free-text steel product descriptions.
//!
//! Suppliers phrase descriptions in a handful of fixed layouts. Each layout is
//! one pattern; patterns are tried in priority order and the first match wins.
//! A description no pattern recognises yields an empty descriptor.

pub mod dimensions;

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use crate::steel::ingest::error::Result;

pub use dimensions::{Dimensions, decompose};

/// Number group shared by the dimension sub-patterns: `1,50`, `1350.00`, `2850`.
const NUMBER: &str = r"\d[\d.,]*";

/// Supported layouts in priority order.
static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let dims = format!(r"(?P<dimensions>{NUMBER}\s*x\s*{NUMBER}(?:\s*x\s*{NUMBER})?)(?:\s*mm)?");
    [
        // DX51D +Z140 Ma-C 1,50 x 1350,00 x 2850,00 [mm] [tag]
        format!(r"^(?P<grade>\S+)\s+\+(?P<coating>\S+)\s+(?P<finish>\S+)\s+{dims}(?:\s+(?P<tag>.+?))?\s*$"),
        // S350GD 2,00x1250 Z275 MA-O [tag]
        format!(r"^(?P<grade>\S+)\s+{dims}\s+\+?(?P<coating>[A-Za-z]+\d\S*)\s+(?P<finish>\S+)(?:\s+(?P<tag>.+?))?\s*$"),
        // S235JR 3,00 x 1500 x 3000 [tag]
        format!(r"^(?P<grade>\S+)\s+{dims}(?:\s+(?P<tag>.+?))?\s*$"),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("descriptor pattern compiles"))
    .collect()
});

/// Structured fields recognised in a material description.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialDescriptor {
    pub grade: Option<String>,
    pub coating: Option<String>,
    pub finish: Option<String>,
    pub tag: Option<String>,
    pub dimensions: Dimensions,
}

impl MaterialDescriptor {
    pub fn is_empty(&self) -> bool {
        self.grade.is_none()
            && self.coating.is_none()
            && self.finish.is_none()
            && self.tag.is_none()
            && self.dimensions.is_empty()
    }
}

/// Parses `text` with the first matching layout.
///
/// A miss is not an error. Only a dimension group that fails numeric parsing
/// is reported.
pub fn parse(text: &str) -> Result<MaterialDescriptor> {
    let text = text.trim();
    let Some(captures) = PATTERNS.iter().find_map(|pattern| pattern.captures(text)) else {
        debug!(text, "no descriptor layout matched");
        return Ok(MaterialDescriptor::default());
    };

    let dimensions = match captures.name("dimensions") {
        Some(group) => decompose(group.as_str())?,
        None => Dimensions::default(),
    };

    Ok(MaterialDescriptor {
        grade: group(&captures, "grade"),
        coating: group(&captures, "coating"),
        finish: group(&captures, "finish"),
        tag: group(&captures, "tag"),
        dimensions,
    })
}

fn group(captures: &Captures<'_>, name: &str) -> Option<String> {
    captures
        .name(name)
        .map(|value| value.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}
