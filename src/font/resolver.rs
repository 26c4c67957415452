use crate::classify::{Category, Classifier, is_private_use, is_surrogate};
use crate::config::{LastResortPolicy, ShowFlags};
use crate::data::controls;
use crate::font::resource::FontResource;
use crate::foundation::core::CodePoint;
use crate::foundation::error::{UniflashError, UniflashResult};

/// First slot of the per-block last-resort glyph range.
const BLOCK_SLOT_BASE: u32 = 0x100000;
/// First slot of the per-plane undefined last-resort glyph range.
const PLANE_SLOT_BASE: u32 = 0x10A000;
/// First slot of the noncharacter last-resort glyph range.
const NONCHAR_SLOT_BASE: u32 = 0x10B000;

/// Coverage view the resolver scans. Implemented by [`FontResource`] and by
/// test stubs.
pub trait GlyphCoverage {
    /// Display name of the font.
    fn font_name(&self) -> &str;
    /// Whether the font can render `code`.
    fn covers(&self, code: CodePoint) -> bool;
}

impl GlyphCoverage for FontResource {
    fn font_name(&self) -> &str {
        self.name()
    }

    fn covers(&self, code: CodePoint) -> bool {
        FontResource::covers(self, code)
    }
}

/// Which font list produced the glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolvedSource {
    /// Index into the custom font list.
    Custom(usize),
    /// Index into the builtin fallback list.
    Builtin(usize),
    /// The policy's dedicated last-resort font.
    LastResort,
    /// Nothing can render the code.
    None,
}

/// What the frame should show in the glyph area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayOutcome {
    /// Draw this character with the resolved font.
    Glyph(char),
    /// Draw the category placeholder label with the UI font.
    Placeholder,
}

/// Full resolution result for one code point.
#[derive(Clone, Debug)]
pub struct Resolution {
    /// Where the glyph came from.
    pub source: ResolvedSource,
    /// Glyph or placeholder decision.
    pub display: DisplayOutcome,
    /// Font name for the annotation panel. Falls back to the UI font's name
    /// when nothing resolved.
    pub font_name: String,
}

/// Resolver inputs that stay fixed for a run.
#[derive(Clone, Copy, Debug)]
pub struct ResolverOpts<'a> {
    /// Category display toggles.
    pub flags: ShowFlags,
    /// Last-resort policy.
    pub policy: LastResortPolicy,
    /// Name of the active last-resort font, when the policy needs one.
    pub policy_font_name: Option<&'a str>,
    /// Name of the UI font (reported when nothing resolves).
    pub ui_font_name: &'a str,
}

/// Resolve the glyph source and display text for `code`.
///
/// Custom fonts are scanned first in list order for every code point; the
/// builtin chain is gated on default-rendering eligibility; the last-resort
/// policy catches the rest. First match wins at each step.
pub fn resolve<C, B>(
    classifier: &Classifier<'_>,
    code: CodePoint,
    custom: &[C],
    builtin: &[B],
    opts: &ResolverOpts<'_>,
) -> UniflashResult<Resolution>
where
    C: GlyphCoverage,
    B: GlyphCoverage,
{
    let private = is_private_use(code);
    let control = classifier.is_control(code);
    let defined = classifier.is_defined(code);

    let mut source = ResolvedSource::None;
    let mut font_name: Option<String> = None;

    for (i, f) in custom.iter().enumerate() {
        if f.covers(code) {
            source = ResolvedSource::Custom(i);
            font_name = Some(f.font_name().to_owned());
            break;
        }
    }

    let default_eligible = defined && !private
        || opts.flags.show_private && private
        || opts.flags.show_control && control
        || opts.flags.show_reserved && classifier.is_reserved(code);
    if source == ResolvedSource::None && default_eligible {
        for (i, f) in builtin.iter().enumerate() {
            if f.covers(code) {
                source = ResolvedSource::Builtin(i);
                font_name = Some(f.font_name().to_owned());
                break;
            }
        }
    }

    let shown = show_gate(
        classifier,
        code,
        opts.flags,
        source != ResolvedSource::None,
        private,
        control,
        defined,
    );
    if source != ResolvedSource::None
        && shown
        && let Some(ch) = controls::display_char(classifier.bundle().controls(), code)
    {
        return Ok(Resolution {
            source,
            display: DisplayOutcome::Glyph(ch),
            font_name: font_name.unwrap_or_else(|| opts.ui_font_name.to_owned()),
        });
    }

    // Ineligible or uncovered codes fall through to the policy: with a policy
    // active the glyph area always gets a glyph, never the placeholder.
    match opts.policy {
        LastResortPolicy::None => Ok(Resolution {
            source,
            display: DisplayOutcome::Placeholder,
            // A resolved-but-hidden font still names itself in the panel.
            font_name: font_name.unwrap_or_else(|| opts.ui_font_name.to_owned()),
        }),
        LastResortPolicy::LastResort => {
            let slot = last_resort_slot(classifier, code)?;
            let ch = char::from_u32(slot).ok_or_else(|| {
                UniflashError::data(format!("last-resort slot {slot:#X} is not a scalar"))
            })?;
            Ok(Resolution {
                source: ResolvedSource::LastResort,
                display: DisplayOutcome::Glyph(ch),
                font_name: policy_name(opts)?,
            })
        }
        LastResortPolicy::MonuLast => {
            // That font encodes control pictures at the literal control
            // codes, so controls display themselves.
            let ch = if control {
                code.as_char().unwrap_or('\u{FFFD}')
            } else {
                controls::display_char(classifier.bundle().controls(), code).unwrap_or('\u{FFFD}')
            };
            Ok(Resolution {
                source: ResolvedSource::LastResort,
                display: DisplayOutcome::Glyph(ch),
                font_name: policy_name(opts)?,
            })
        }
    }
}

fn policy_name(opts: &ResolverOpts<'_>) -> UniflashResult<String> {
    opts.policy_font_name
        .map(str::to_owned)
        .ok_or_else(|| UniflashError::config("last-resort policy set but no policy font loaded"))
}

fn show_gate(
    classifier: &Classifier<'_>,
    code: CodePoint,
    flags: ShowFlags,
    has_font: bool,
    private: bool,
    control: bool,
    defined: bool,
) -> bool {
    defined && !private
        || flags.show_private && has_font && private
        || flags.show_control && has_font && control
        || flags.show_reserved && has_font && classifier.is_reserved(code)
        || flags.show_undefined && has_font && !defined
}

/// Total last-resort glyph mapping over the whole code-point space.
///
/// Falling through every arm means the range tables fail to partition the
/// space, which is a table-construction bug reported as fatal data corruption.
pub fn last_resort_slot(classifier: &Classifier<'_>, code: CodePoint) -> UniflashResult<u32> {
    if let Some(i) = controls::noncharacter_index(code) {
        return Ok(NONCHAR_SLOT_BASE + i as u32);
    }
    if code.plane() < 0xF
        && !is_surrogate(code)
        && !classifier.bundle().is_in_defined_set(code)
        && !classifier.is_control(code)
    {
        return Ok(PLANE_SLOT_BASE + code.plane());
    }
    if let Some((i, _)) = classifier.block_of(code) {
        return Ok(BLOCK_SLOT_BASE + i as u32);
    }
    Err(UniflashError::data(format!(
        "no last-resort mapping for {code}; block table does not partition the space"
    )))
}

/// Chinese placeholder label for an unrendered code point, chosen by the
/// category precedence (surrogates split into high/high-private/low bands).
pub fn placeholder_label(classifier: &Classifier<'_>, code: CodePoint) -> String {
    let v = code.value();
    let kind = match classifier.category(code) {
        Category::Noncharacter => "非字符",
        Category::Surrogate if v <= 0xDB7F => "高位替代字符",
        Category::Surrogate if v <= 0xDBFF => "高位私用替代字符",
        Category::Surrogate => "低位替代字符",
        Category::PrivateUse => "私用区字符",
        Category::Control => "控制字符",
        Category::Reserved => "保留字符",
        // Assigned characters only land here when no font at all covers them.
        Category::Defined => "无可用字体",
        Category::Undefined => "未定义字符",
    };
    format!("{kind} {}", code.u_label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::bundle::UnicodeBundle;
    use crate::data::records::NamesTable;
    use crate::data::set::CodePointSet;
    use crate::data::tables::{BlockRange, BlockTable, CommonNameTable, VersionTable};

    struct StubFont {
        name: &'static str,
        codes: Vec<u32>,
    }

    impl GlyphCoverage for StubFont {
        fn font_name(&self) -> &str {
            self.name
        }

        fn covers(&self, code: CodePoint) -> bool {
            self.codes.contains(&code.value())
        }
    }

    fn cp(v: u32) -> CodePoint {
        CodePoint::new(v).unwrap()
    }

    fn block(start: u32, end: u32, name: &str) -> BlockRange {
        BlockRange {
            start,
            end,
            name: name.to_owned(),
            local_name: name.to_owned(),
        }
    }

    fn test_bundle() -> UnicodeBundle {
        let mut defined = CodePointSet::new();
        defined.insert(cp(0x41));
        defined.insert(cp(0x42));
        UnicodeBundle::from_parts(
            NamesTable::default(),
            CommonNameTable::default(),
            VersionTable::default(),
            BlockTable::new(vec![
                block(0x0, 0x7F, "Basic Latin"),
                block(0xD800, 0xDB7F, "High Surrogates"),
                block(0xDB80, 0xDBFF, "High Private Use Surrogates"),
                block(0xDC00, 0xDFFF, "Low Surrogates"),
                block(0xE000, 0xF8FF, "Private Use Area"),
                block(0xF0000, 0xFFFFF, "Supplementary Private Use Area-A"),
                block(0x100000, 0x10FFFF, "Supplementary Private Use Area-B"),
            ])
            .unwrap(),
            defined,
            Vec::new(),
        )
    }

    fn opts(flags: ShowFlags, policy: LastResortPolicy) -> ResolverOpts<'static> {
        ResolverOpts {
            flags,
            policy,
            policy_font_name: match policy {
                LastResortPolicy::None => None,
                LastResortPolicy::LastResort => Some("LastResort-Regular"),
                LastResortPolicy::MonuLast => Some("Monu-Last"),
            },
            ui_font_name: "Sarasa-Mono-SC-Regular",
        }
    }

    #[test]
    fn custom_priority_first_match_wins() {
        let bundle = test_bundle();
        let c = Classifier::new(&bundle);
        let custom = [
            StubFont { name: "A", codes: vec![0x41] },
            StubFont { name: "B", codes: vec![0x41] },
        ];
        let builtin: [StubFont; 0] = [];
        let r = resolve(&c, cp(0x41), &custom, &builtin, &opts(ShowFlags::default(), LastResortPolicy::None)).unwrap();
        assert_eq!(r.source, ResolvedSource::Custom(0));
        assert_eq!(r.font_name, "A");
        assert_eq!(r.display, DisplayOutcome::Glyph('A'));
    }

    #[test]
    fn builtin_scan_requires_eligibility() {
        let bundle = test_bundle();
        let c = Classifier::new(&bundle);
        let custom: [StubFont; 0] = [];
        let builtin = [StubFont { name: "Fallback", codes: vec![0x41, 0xE000] }];
        let o = opts(ShowFlags::default(), LastResortPolicy::None);

        // Defined, non-private: eligible.
        let r = resolve(&c, cp(0x41), &custom, &builtin, &o).unwrap();
        assert_eq!(r.source, ResolvedSource::Builtin(0));

        // Private use without show_private: not eligible, placeholder.
        let r = resolve(&c, cp(0xE000), &custom, &builtin, &o).unwrap();
        assert_eq!(r.source, ResolvedSource::None);
        assert_eq!(r.display, DisplayOutcome::Placeholder);
        assert_eq!(r.font_name, "Sarasa-Mono-SC-Regular");

        // With the toggle the same code renders.
        let r = resolve(
            &c,
            cp(0xE000),
            &custom,
            &builtin,
            &opts(
                ShowFlags { show_private: true, ..Default::default() },
                LastResortPolicy::None,
            ),
        )
        .unwrap();
        assert_eq!(r.source, ResolvedSource::Builtin(0));
        assert_eq!(r.display, DisplayOutcome::Glyph('\u{E000}'));
    }

    #[test]
    fn custom_match_with_toggle_off_reports_name_but_shows_placeholder() {
        let bundle = test_bundle();
        let c = Classifier::new(&bundle);
        // NUL is Control; the custom font covers it but show_control is off.
        let custom = [StubFont { name: "Ctrl", codes: vec![0x00] }];
        let builtin: [StubFont; 0] = [];
        let r = resolve(&c, cp(0x00), &custom, &builtin, &opts(ShowFlags::default(), LastResortPolicy::None)).unwrap();
        assert_eq!(r.source, ResolvedSource::Custom(0));
        assert_eq!(r.display, DisplayOutcome::Placeholder);
        assert_eq!(r.font_name, "Ctrl");
    }

    #[test]
    fn control_glyph_uses_substitute_char() {
        let bundle = test_bundle();
        let c = Classifier::new(&bundle);
        let custom = [StubFont { name: "Ctrl", codes: vec![0x00] }];
        let builtin: [StubFont; 0] = [];
        let r = resolve(
            &c,
            cp(0x00),
            &custom,
            &builtin,
            &opts(
                ShowFlags { show_control: true, ..Default::default() },
                LastResortPolicy::None,
            ),
        )
        .unwrap();
        assert_eq!(r.display, DisplayOutcome::Glyph('\u{2400}'));
    }

    #[test]
    fn last_resort_policy_maps_synthetic_slot() {
        let bundle = test_bundle();
        let c = Classifier::new(&bundle);
        let custom: [StubFont; 0] = [];
        let builtin: [StubFont; 0] = [];
        let r = resolve(&c, cp(0xFFFE), &custom, &builtin, &opts(ShowFlags::default(), LastResortPolicy::LastResort)).unwrap();
        assert_eq!(r.source, ResolvedSource::LastResort);
        assert_eq!(r.display, DisplayOutcome::Glyph('\u{10B000}'));
        assert_eq!(r.font_name, "LastResort-Regular");
    }

    #[test]
    fn monu_last_policy_controls_display_their_own_code() {
        let bundle = test_bundle();
        let c = Classifier::new(&bundle);
        let custom: [StubFont; 0] = [];
        let builtin: [StubFont; 0] = [];
        let o = opts(ShowFlags::default(), LastResortPolicy::MonuLast);
        let r = resolve(&c, cp(0x1B), &custom, &builtin, &o).unwrap();
        assert_eq!(r.display, DisplayOutcome::Glyph('\u{1B}'));
        // Non-controls keep the substituted/literal display character.
        let r = resolve(&c, cp(0x2FE0), &custom, &builtin, &o).unwrap();
        assert_eq!(r.display, DisplayOutcome::Glyph('\u{2FE0}'));
    }

    #[test]
    fn hidden_category_falls_through_to_active_policy() {
        let bundle = test_bundle();
        let c = Classifier::new(&bundle);
        // Covered by a custom font, but controls are hidden: with a policy
        // active the glyph area still gets the synthetic slot glyph.
        let custom = [StubFont { name: "Ctrl", codes: vec![0x00] }];
        let builtin: [StubFont; 0] = [];
        let r = resolve(
            &c,
            cp(0x00),
            &custom,
            &builtin,
            &opts(ShowFlags::default(), LastResortPolicy::LastResort),
        )
        .unwrap();
        assert_eq!(r.source, ResolvedSource::LastResort);
        assert_eq!(r.display, DisplayOutcome::Glyph('\u{100000}'));
        assert_eq!(r.font_name, "LastResort-Regular");
    }

    #[test]
    fn last_resort_slot_concrete_cases() {
        let bundle = test_bundle();
        let c = Classifier::new(&bundle);
        // First noncharacter slot (plane-0 FFFE/FFFF pair).
        assert_eq!(last_resort_slot(&c, cp(0xFFFE)).unwrap(), 0x10B000);
        assert_eq!(last_resort_slot(&c, cp(0xFDD0)).unwrap(), 0x10B011);
        // Plane-indexed undefined slot for a low-plane undefined code.
        assert_eq!(last_resort_slot(&c, cp(0x2FE0)).unwrap(), 0x10A000);
        assert_eq!(last_resort_slot(&c, cp(0x2FFFD)).unwrap(), 0x10A002);
        // Plane 15 is outside the plane rule: block slot instead.
        assert_eq!(last_resort_slot(&c, cp(0xFFFFF)).unwrap(), 0x10B00F);
        assert_eq!(last_resort_slot(&c, cp(0xF0000)).unwrap(), 0x100005);
        // Plane 16 trailing noncharacter and its block-mapped neighbor.
        assert_eq!(last_resort_slot(&c, cp(0x10FFFF)).unwrap(), 0x10B010);
        assert_eq!(last_resort_slot(&c, cp(0x10FFFD)).unwrap(), 0x100006);
        // Surrogates skip the plane rule and land in their blocks.
        assert_eq!(last_resort_slot(&c, cp(0xD800)).unwrap(), 0x100001);
    }

    #[test]
    fn placeholder_labels_follow_precedence() {
        let bundle = test_bundle();
        let c = Classifier::new(&bundle);
        assert_eq!(placeholder_label(&c, cp(0xFFFE)), "非字符 U+FFFE");
        assert_eq!(placeholder_label(&c, cp(0xD800)), "高位替代字符 U+D800");
        assert_eq!(placeholder_label(&c, cp(0xDB80)), "高位私用替代字符 U+DB80");
        assert_eq!(placeholder_label(&c, cp(0xDC00)), "低位替代字符 U+DC00");
        assert_eq!(placeholder_label(&c, cp(0xE000)), "私用区字符 U+E000");
        assert_eq!(placeholder_label(&c, cp(0x1B)), "控制字符 U+001B");
        assert_eq!(placeholder_label(&c, cp(0x2FE0)), "未定义字符 U+2FE0");
    }
}
