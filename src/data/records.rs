use std::collections::HashMap;

use serde::Deserialize;

use crate::foundation::core::CodePoint;

/// Per-code-point record from the names table. Every list field defaults to
/// empty so sparse records deserialize cleanly.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CharacterRecord {
    /// Character name, when the source assigns one.
    #[serde(default)]
    pub name: Option<String>,
    /// Informal aliases.
    #[serde(default)]
    pub alias: Vec<String>,
    /// Formal (corrective) aliases.
    #[serde(default, rename = "formal alias")]
    pub formal_alias: Vec<String>,
    /// Free-form comments.
    #[serde(default)]
    pub comment: Vec<String>,
    /// Cross references to related code points.
    #[serde(default, rename = "cross references")]
    pub cross_references: Vec<String>,
    /// Standardized variation sequences.
    #[serde(default)]
    pub variation: Vec<String>,
    /// Decomposition sequence (bare hex entries).
    #[serde(default)]
    pub decomposition: Vec<String>,
    /// Compatibility mappings.
    #[serde(default, rename = "compat mapping")]
    pub compat_mapping: Vec<String>,
}

/// All explicit character records, keyed by code point.
#[derive(Debug, Default)]
pub struct NamesTable {
    records: HashMap<u32, CharacterRecord>,
}

impl NamesTable {
    /// Wrap a deserialized record map.
    pub fn new(records: HashMap<u32, CharacterRecord>) -> Self {
        Self { records }
    }

    /// The record for `code`, if one exists.
    pub fn get(&self, code: CodePoint) -> Option<&CharacterRecord> {
        self.records.get(&code.value())
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Return `true` when no records are loaded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_record_deserializes_with_defaults() {
        let rec: CharacterRecord =
            serde_json::from_str(r#"{"name": "LATIN CAPITAL LETTER A"}"#).unwrap();
        assert_eq!(rec.name.as_deref(), Some("LATIN CAPITAL LETTER A"));
        assert!(rec.alias.is_empty());
        assert!(rec.compat_mapping.is_empty());
    }

    #[test]
    fn renamed_fields_round_trip() {
        let rec: CharacterRecord = serde_json::from_str(
            r#"{"formal alias": ["X"], "cross references": ["U+0041"], "compat mapping": ["U+0020"]}"#,
        )
        .unwrap();
        assert_eq!(rec.formal_alias, vec!["X"]);
        assert_eq!(rec.cross_references, vec!["U+0041"]);
        assert_eq!(rec.compat_mapping, vec!["U+0020"]);
    }

    #[test]
    fn table_lookup_by_code() {
        let mut m = HashMap::new();
        m.insert(
            0x41,
            CharacterRecord {
                name: Some("LATIN CAPITAL LETTER A".to_owned()),
                ..Default::default()
            },
        );
        let t = NamesTable::new(m);
        assert!(t.get(CodePoint::new(0x41).unwrap()).is_some());
        assert!(t.get(CodePoint::new(0x42).unwrap()).is_none());
    }
}
