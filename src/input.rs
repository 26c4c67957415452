use std::path::{Path, PathBuf};

use tracing::info;

use crate::classify::Classifier;
use crate::data::set::CodePointSet;
use crate::font::resource::FontResource;
use crate::foundation::core::CodePoint;
use crate::foundation::error::{UniflashError, UniflashResult};

/// Range dropped by `skip_long` (inclusive).
const LONG_RANGE: (u32, u32) = (0x3347A, 0xDFFFF);

/// Where the input code-point sequence comes from.
#[derive(Clone, Debug)]
pub enum CodeSource {
    /// Inclusive numeric range.
    Range {
        /// First code point.
        start: u32,
        /// Last code point (inclusive).
        end: u32,
    },
    /// Comma-delimited hex-code list file.
    CodeFile(PathBuf),
    /// Plain text file, one code point per character.
    TextFile(PathBuf),
    /// Union of the custom fonts' coverage sets, ascending.
    FromFonts,
}

/// Sequence filters applied after collection.
#[derive(Clone, Copy, Debug, Default)]
pub struct SkipFlags {
    /// Drop U+3347A..=U+DFFFF.
    pub skip_long: bool,
    /// Drop codes outside the loose defined predicate.
    pub skip_undefined: bool,
    /// Drop codes no custom font covers. Deliberately ignores builtin
    /// fallback coverage (see DESIGN.md).
    pub skip_no_glyph: bool,
}

/// Collect the input sequence from `source`.
pub fn collect_codes(
    source: &CodeSource,
    custom_fonts: &[FontResource],
) -> UniflashResult<Vec<CodePoint>> {
    let codes = match source {
        CodeSource::Range { start, end } => {
            if start > end {
                return Err(UniflashError::config(format!(
                    "range start {start:#X} exceeds end {end:#X}"
                )));
            }
            (*start..=*end)
                .map(CodePoint::new)
                .collect::<UniflashResult<Vec<_>>>()?
        }
        CodeSource::CodeFile(path) => parse_code_file(path)?,
        CodeSource::TextFile(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| {
                UniflashError::config(format!(
                    "failed to read text file '{}': {e}",
                    path.display()
                ))
            })?;
            text.chars()
                .map(|ch| CodePoint::new(ch as u32))
                .collect::<UniflashResult<Vec<_>>>()?
        }
        CodeSource::FromFonts => {
            let mut union = CodePointSet::new();
            for font in custom_fonts {
                union.union_with(font.coverage());
            }
            union.iter().collect()
        }
    };
    info!(count = codes.len(), "collected input code points");
    Ok(codes)
}

/// Apply the skip filters; the surviving order is the input order.
pub fn apply_filters(
    mut codes: Vec<CodePoint>,
    flags: SkipFlags,
    classifier: &Classifier<'_>,
    custom_fonts: &[FontResource],
) -> Vec<CodePoint> {
    if flags.skip_long || flags.skip_undefined {
        codes.retain(|&code| {
            let v = code.value();
            let long = flags.skip_long && (LONG_RANGE.0..=LONG_RANGE.1).contains(&v);
            let undefined = flags.skip_undefined && !classifier.is_defined(code);
            !(long || undefined)
        });
    }
    if flags.skip_no_glyph {
        let mut union = CodePointSet::new();
        for font in custom_fonts {
            union.union_with(font.coverage());
        }
        codes.retain(|&code| union.contains(code));
    }
    codes
}

fn parse_code_file(path: &Path) -> UniflashResult<Vec<CodePoint>> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        UniflashError::config(format!(
            "failed to read code file '{}': {e}",
            path.display()
        ))
    })?;
    text.split(',')
        .map(str::trim)
        .filter(|tok| !tok.is_empty())
        .map(|tok| {
            let v = u32::from_str_radix(tok, 16).map_err(|_| {
                UniflashError::config(format!("invalid code point '{tok}' in '{}'", path.display()))
            })?;
            CodePoint::new(v)
                .map_err(|_| UniflashError::config(format!("code point '{tok}' out of range")))
        })
        .collect()
}
