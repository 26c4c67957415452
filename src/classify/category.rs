use crate::data::bundle::UnicodeBundle;
use crate::data::controls;
use crate::foundation::core::CodePoint;

/// Display category of a code point. Derived on demand, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// Permanently not a character (per-plane FFFE/FFFF, FDD0..FDEF).
    Noncharacter,
    /// UTF-16 surrogate code point.
    Surrogate,
    /// Control/format code with a visual substitute.
    Control,
    /// Private-use area member.
    PrivateUse,
    /// Unassigned code whose resolved name carries the reserved marker.
    Reserved,
    /// Assigned character (excluding private use).
    Defined,
    /// None of the above.
    Undefined,
}

/// Pure classification and metadata accessors over a [`UnicodeBundle`].
///
/// Cheap to construct; borrows the bundle, so one classifier per worker is
/// fine.
#[derive(Clone, Copy)]
pub struct Classifier<'a> {
    bundle: &'a UnicodeBundle,
}

impl<'a> Classifier<'a> {
    /// Wrap a bundle.
    pub fn new(bundle: &'a UnicodeBundle) -> Self {
        Self { bundle }
    }

    /// The bundle this classifier reads from.
    pub fn bundle(&self) -> &'a UnicodeBundle {
        self.bundle
    }

    /// Classify `code`. Fixed precedence, first match wins; exactly one
    /// category applies to every code point.
    pub fn category(&self, code: CodePoint) -> Category {
        if controls::is_noncharacter(code) {
            Category::Noncharacter
        } else if is_surrogate(code) {
            Category::Surrogate
        } else if self.bundle.controls().contains(code) {
            Category::Control
        } else if is_private_use(code) {
            Category::PrivateUse
        } else if self.is_reserved(code) {
            Category::Reserved
        } else if self.bundle.is_in_defined_set(code) {
            Category::Defined
        } else {
            Category::Undefined
        }
    }

    /// Loose "has meaning" predicate used for fallback eligibility: member of
    /// the defined set, or private use.
    pub fn is_defined(&self, code: CodePoint) -> bool {
        self.bundle.is_in_defined_set(code) || is_private_use(code)
    }

    /// Control-category membership.
    pub fn is_control(&self, code: CodePoint) -> bool {
        self.bundle.controls().contains(code)
    }

    /// Reserved test: the resolved display name carries the `<reserved`
    /// marker. Deliberately name-derived, not "absent record".
    pub fn is_reserved(&self, code: CodePoint) -> bool {
        self.char_name(code).starts_with("<reserved")
    }

    /// Resolved display name for `code`.
    ///
    /// Noncharacters and surrogates get synthesized labels that bypass the
    /// record lookup; otherwise the explicit record name wins, then the
    /// common-name range table, then a synthesized undefined label.
    pub fn char_name(&self, code: CodePoint) -> String {
        if controls::is_noncharacter(code) {
            return format!("<not a character-{}>", code.hex_digits());
        }
        if is_surrogate(code) {
            return format!("SURROGATE-{}", code.hex_digits());
        }
        if let Some(name) = self.bundle.record_of(code).and_then(|r| r.name.clone()) {
            return name;
        }
        if let Some(name) = self.bundle.common_name_of(code) {
            return name;
        }
        format!("<undefined character-{}>", code.hex_digits())
    }

    /// Assignment version label (`"unassigned"` on a miss).
    pub fn version_of(&self, code: CodePoint) -> &'a str {
        self.bundle.version_of(code)
    }

    /// Block table index and entry containing `code`, if any.
    pub fn block_of(
        &self,
        code: CodePoint,
    ) -> Option<(usize, &'a crate::data::tables::BlockRange)> {
        self.bundle.blocks().lookup(code)
    }

    /// The plane containing `code`.
    pub fn plane_of(&self, code: CodePoint) -> &'a crate::data::tables::PlaneRange {
        self.bundle.planes().lookup(code)
    }
}

/// Surrogate range test.
pub fn is_surrogate(code: CodePoint) -> bool {
    (0xD800..=0xDFFF).contains(&code.value())
}

/// Private-use test: BMP PUA plus planes 15/16 (excluding their trailing
/// noncharacters).
pub fn is_private_use(code: CodePoint) -> bool {
    let v = code.value();
    (0xE000..=0xF8FF).contains(&v)
        || (0xF0000..=0xFFFFD).contains(&v)
        || (0x100000..=0x10FFFD).contains(&v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::records::{CharacterRecord, NamesTable};
    use crate::data::set::CodePointSet;
    use crate::data::tables::{BlockRange, BlockTable, CommonNameRange, CommonNameTable, VersionTable};
    use std::collections::HashMap;

    fn cp(v: u32) -> CodePoint {
        CodePoint::new(v).unwrap()
    }

    fn test_bundle() -> UnicodeBundle {
        let mut records = HashMap::new();
        records.insert(
            0x41,
            CharacterRecord {
                name: Some("LATIN CAPITAL LETTER A".to_owned()),
                ..Default::default()
            },
        );
        records.insert(
            0x378,
            CharacterRecord {
                name: Some("<reserved-0378, cross references: U+0374>".to_owned()),
                ..Default::default()
            },
        );
        let mut defined = CodePointSet::new();
        defined.insert(cp(0x41));
        UnicodeBundle::from_parts(
            NamesTable::new(records),
            CommonNameTable::new(vec![CommonNameRange {
                start: 0xE000,
                end: 0xF8FF,
                name: "PRIVATE USE-#".to_owned(),
            }])
            .unwrap(),
            VersionTable::default(),
            BlockTable::new(vec![BlockRange {
                start: 0,
                end: 0x7F,
                name: "Basic Latin".to_owned(),
                local_name: "基本拉丁文".to_owned(),
            }])
            .unwrap(),
            defined,
            Vec::new(),
        )
    }

    #[test]
    fn category_precedence_examples() {
        let bundle = test_bundle();
        let c = Classifier::new(&bundle);
        assert_eq!(c.category(cp(0x41)), Category::Defined);
        assert_eq!(c.category(cp(0xE000)), Category::PrivateUse);
        assert_eq!(c.category(cp(0xFFFE)), Category::Noncharacter);
        assert_eq!(c.category(cp(0xD800)), Category::Surrogate);
        assert_eq!(c.category(cp(0x00)), Category::Control);
        assert_eq!(c.category(cp(0x378)), Category::Reserved);
        assert_eq!(c.category(cp(0x2FE0)), Category::Undefined);
    }

    #[test]
    fn fdd0_block_outranks_control_and_private() {
        let bundle = test_bundle();
        let c = Classifier::new(&bundle);
        // FDD0..FDEF sits inside Arabic Presentation Forms-A; still a
        // noncharacter first.
        assert_eq!(c.category(cp(0xFDD0)), Category::Noncharacter);
        // Plane-15 trailing noncharacters beat private use.
        assert_eq!(c.category(cp(0xFFFFE)), Category::Noncharacter);
    }

    #[test]
    fn loose_is_defined_includes_private_use() {
        let bundle = test_bundle();
        let c = Classifier::new(&bundle);
        assert!(c.is_defined(cp(0x41)));
        assert!(c.is_defined(cp(0xE000)));
        assert!(c.is_defined(cp(0x100000)));
        assert!(!c.is_defined(cp(0x2FE0)));
    }

    #[test]
    fn name_resolution_order() {
        let bundle = test_bundle();
        let c = Classifier::new(&bundle);
        assert_eq!(c.char_name(cp(0x41)), "LATIN CAPITAL LETTER A");
        assert_eq!(c.char_name(cp(0xE000)), "PRIVATE USE-E000");
        assert_eq!(c.char_name(cp(0x2FE0)), "<undefined character-2FE0>");
        assert_eq!(c.char_name(cp(0xFFFE)), "<not a character-FFFE>");
        assert_eq!(c.char_name(cp(0xD800)), "SURROGATE-D800");
        assert_eq!(c.char_name(cp(0x10FFFF)), "<not a character-10FFFF>");
    }

    #[test]
    fn reserved_is_name_derived() {
        let bundle = test_bundle();
        let c = Classifier::new(&bundle);
        assert!(c.is_reserved(cp(0x378)));
        // An absent record alone is not reserved.
        assert!(!c.is_reserved(cp(0x2FE0)));
    }
}
