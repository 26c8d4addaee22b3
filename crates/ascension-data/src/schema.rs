//! Serde data file structs for economy content definitions.
//!
//! These structs define the on-disk format for unlock trees and prestige
//! layers. They are deserialized from RON, JSON, or TOML data files and then
//! resolved into runtime types by [`crate::economy`].

use ascension_core::ScaledNumber;
use serde::Deserialize;
use std::path::Path;

use crate::loader::DataLoadError;

// ===========================================================================
// Numbers
// ===========================================================================

/// A number in a data file.
///
/// Plain numbers cover most content. Values beyond `f64` range are written
/// as strings (`"2.5e400"`) or as explicit mantissa/exponent pairs.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberData {
    /// `1500`, `2.5e30`.
    Plain(f64),
    /// `"2.5e400"`.
    Text(String),
    /// `{ mantissa = 2.5, exponent = 400 }`.
    Parts { mantissa: f64, exponent: i64 },
}

impl NumberData {
    /// Resolve into a [`ScaledNumber`], reporting unparsable text as a
    /// parse error in `file`.
    pub fn resolve(&self, file: &Path) -> Result<ScaledNumber, DataLoadError> {
        match self {
            NumberData::Plain(v) => Ok(ScaledNumber::from_f64(*v)),
            NumberData::Text(text) => text.parse().map_err(|e| DataLoadError::Parse {
                file: file.to_path_buf(),
                detail: format!("{e}"),
            }),
            NumberData::Parts { mantissa, exponent } => {
                Ok(ScaledNumber::from_parts(*mantissa, *exponent))
            }
        }
    }
}

// ===========================================================================
// Unlock tree
// ===========================================================================

/// An unlock node definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct UnlockNodeData {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    pub cost: NumberData,
    #[serde(default)]
    pub tier: i32,
    /// Ids of nodes that must be unlocked first.
    #[serde(default)]
    pub requires: Vec<String>,
}

// ===========================================================================
// Prestige
// ===========================================================================

/// A prestige layer definition in a data file. Omitted fields take the
/// engine defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrestigeLayerData {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub threshold: Option<NumberData>,
    #[serde(default)]
    pub scaling_exponent: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_data_variants() {
        let file = Path::new("test.json");

        let plain: NumberData = serde_json::from_str("1500").unwrap();
        assert_eq!(plain.resolve(file).unwrap(), ScaledNumber::from_f64(1500.0));

        let text: NumberData = serde_json::from_str(r#""2.5e400""#).unwrap();
        let n = text.resolve(file).unwrap();
        assert_eq!(n.exponent(), 400);

        let parts: NumberData =
            serde_json::from_str(r#"{"mantissa": 25.0, "exponent": 99}"#).unwrap();
        assert_eq!(parts.resolve(file).unwrap().exponent(), 100);
    }

    #[test]
    fn number_data_bad_text() {
        let bad: NumberData = serde_json::from_str(r#""lots""#).unwrap();
        assert!(matches!(
            bad.resolve(Path::new("x.json")),
            Err(DataLoadError::Parse { .. })
        ));
    }

    #[test]
    fn unlock_node_defaults() {
        let node: UnlockNodeData =
            serde_json::from_str(r#"{"id": "a", "name": "A", "cost": 10}"#).unwrap();
        assert_eq!(node.tier, 0);
        assert!(node.requires.is_empty());
        assert!(node.description.is_none());
    }
}
