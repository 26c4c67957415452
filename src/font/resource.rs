use std::path::Path;

use crate::data::set::CodePointSet;
use crate::foundation::core::CodePoint;
use crate::foundation::error::{UniflashError, UniflashResult};

/// A loaded font plus its immutable glyph coverage set.
///
/// Coverage is either the font's full cmap (custom fonts) or an externally
/// built claimed set (builtin fallback fonts). Frozen after construction and
/// shared across workers without locking.
pub struct FontResource {
    name: String,
    font: fontdue::Font,
    coverage: CodePointSet,
}

impl FontResource {
    /// Load a font file; coverage defaults to the full cmap. The display
    /// name defaults to the file stem.
    pub fn load(path: &Path) -> UniflashResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            UniflashError::font(format!("failed to read font file '{}': {e}", path.display()))
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_owned());
        Self::from_bytes(name, &bytes)
    }

    /// Parse font bytes; coverage defaults to the full cmap.
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> UniflashResult<Self> {
        let name = name.into();
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| UniflashError::font(format!("failed to parse font '{name}': {e}")))?;
        let coverage = font
            .chars()
            .keys()
            .filter_map(|&ch| CodePoint::new(ch as u32).ok())
            .collect();
        Ok(Self {
            name,
            font,
            coverage,
        })
    }

    /// Replace the coverage set with an externally built claimed set.
    pub fn restrict_coverage(mut self, codes: &[u32]) -> UniflashResult<Self> {
        let mut coverage = CodePointSet::new();
        for &v in codes {
            coverage.insert(CodePoint::new(v).map_err(|_| {
                UniflashError::data(format!(
                    "claimed code {v:#X} for font '{}' out of range",
                    self.name
                ))
            })?);
        }
        self.coverage = coverage;
        Ok(self)
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Coverage membership.
    pub fn covers(&self, code: CodePoint) -> bool {
        self.coverage.contains(code)
    }

    /// Borrow the coverage set.
    pub fn coverage(&self) -> &CodePointSet {
        &self.coverage
    }

    /// The underlying fontdue font.
    pub fn font(&self) -> &fontdue::Font {
        &self.font
    }

    /// Advance width of `ch` at `px`.
    pub fn advance(&self, ch: char, px: f32) -> f32 {
        self.font.metrics(ch, px).advance_width
    }

    /// Summed advance width of `text` at `px`.
    pub fn text_width(&self, text: &str, px: f32) -> f32 {
        text.chars().map(|ch| self.advance(ch, px)).sum()
    }

    /// Baseline-to-baseline line height at `px`.
    pub fn line_height(&self, px: f32) -> f32 {
        self.font
            .horizontal_line_metrics(px)
            .map(|m| m.new_line_size)
            .unwrap_or(px * 1.2)
    }

    /// Ascent above the baseline at `px`.
    pub fn ascent(&self, px: f32) -> f32 {
        self.font
            .horizontal_line_metrics(px)
            .map(|m| m.ascent)
            .unwrap_or(px)
    }

    /// Rasterize one glyph: metrics plus an alpha bitmap.
    pub fn rasterize(&self, ch: char, px: f32) -> (fontdue::Metrics, Vec<u8>) {
        self.font.rasterize(ch, px)
    }
}

impl std::fmt::Debug for FontResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontResource")
            .field("name", &self.name)
            .field("coverage", &self.coverage.len())
            .finish()
    }
}
