use serde::Deserialize;

use crate::foundation::core::CodePoint;
use crate::foundation::error::{UniflashError, UniflashResult};

/// One named block: a contiguous, non-overlapping sub-range of the space.
#[derive(Clone, Debug, Deserialize)]
pub struct BlockRange {
    /// First code point of the block.
    pub start: u32,
    /// Last code point of the block (inclusive).
    pub end: u32,
    /// English block name.
    pub name: String,
    /// Localized block name.
    pub local_name: String,
}

impl BlockRange {
    /// `U+XXXX-U+XXXX` range label.
    pub fn range_label(&self) -> String {
        format!("U+{:04X}-U+{:04X}", self.start, self.end)
    }
}

/// Sorted block table with binary-search lookup. Gaps are allowed.
#[derive(Debug)]
pub struct BlockTable {
    entries: Vec<BlockRange>,
}

impl BlockTable {
    /// Validate ordering/overlap and build the table.
    pub fn new(entries: Vec<BlockRange>) -> UniflashResult<Self> {
        validate_ranges("block", entries.iter().map(|b| (b.start, b.end)))?;
        Ok(Self { entries })
    }

    /// Index and entry of the block containing `code`, or `None`.
    pub fn lookup(&self, code: CodePoint) -> Option<(usize, &BlockRange)> {
        range_search(&self.entries, code.value(), |b| (b.start, b.end))
    }

    /// All entries in start order.
    pub fn entries(&self) -> &[BlockRange] {
        &self.entries
    }
}

/// One of the 17 fixed planes.
#[derive(Clone, Debug)]
pub struct PlaneRange {
    /// First code point of the plane.
    pub start: u32,
    /// Last code point of the plane (inclusive).
    pub end: u32,
    /// Number label, e.g. `0 (BMP)`.
    pub label: &'static str,
    /// English plane name.
    pub name: &'static str,
    /// Chinese plane name.
    pub local_name: &'static str,
}

impl PlaneRange {
    /// `U+XXXX-U+XXXX` range label.
    pub fn range_label(&self) -> String {
        format!("U+{:04X}-U+{:04X}", self.start, self.end)
    }
}

/// The fixed plane table; covers the whole space with no gaps.
#[derive(Debug)]
pub struct PlaneTable {
    entries: Vec<PlaneRange>,
}

const PLANE_NAMES: [(&str, &str, &str); 17] = [
    ("0 (BMP)", "Basic Multilingual Plane", "基本多文种平面"),
    ("1 (SMP)", "Supplementary Multilingual Plane", "多文种补充平面"),
    ("2 (SIP)", "Supplementary Ideographic Plane", "表意文字补充平面"),
    ("3 (TIP)", "Tertiary Ideographic Plane", "第三表意文字平面"),
    ("4", "Unassigned Plane", "未指配平面"),
    ("5", "Unassigned Plane", "未指配平面"),
    ("6", "Unassigned Plane", "未指配平面"),
    ("7", "Unassigned Plane", "未指配平面"),
    ("8", "Unassigned Plane", "未指配平面"),
    ("9", "Unassigned Plane", "未指配平面"),
    ("10", "Unassigned Plane", "未指配平面"),
    ("11", "Unassigned Plane", "未指配平面"),
    ("12", "Unassigned Plane", "未指配平面"),
    ("13", "Unassigned Plane", "未指配平面"),
    ("14 (SSP)", "Supplementary Special-purpose Plane", "特别用途补充平面"),
    ("15 (SPUA-A)", "Supplementary Private Use Area-A", "补充私人使用区A平面"),
    ("16 (SPUA-B)", "Supplementary Private Use Area-B", "补充私人使用区B平面"),
];

impl PlaneTable {
    /// The standard 17-plane table.
    pub fn standard() -> Self {
        let entries = PLANE_NAMES
            .iter()
            .enumerate()
            .map(|(i, &(label, name, local_name))| {
                let start = (i as u32) << 16;
                PlaneRange {
                    start,
                    end: start + 0xFFFF,
                    label,
                    name,
                    local_name,
                }
            })
            .collect();
        Self { entries }
    }

    /// The plane containing `code`; total over the scalar space.
    pub fn lookup(&self, code: CodePoint) -> &PlaneRange {
        &self.entries[code.plane() as usize]
    }
}

/// Version range entry mapping `[start, end]` to an assignment version.
#[derive(Clone, Debug, Deserialize)]
pub struct VersionRange {
    /// First code point of the range.
    pub start: u32,
    /// Last code point of the range (inclusive).
    pub end: u32,
    /// Assignment-version label, e.g. `1.1`.
    pub version: String,
}

/// Assignment-version table: point entries take precedence over ranges.
#[derive(Debug, Default, Deserialize)]
pub struct VersionTable {
    /// Per-code-point version entries.
    #[serde(default)]
    pub single: std::collections::HashMap<u32, String>,
    /// Disjoint range entries.
    #[serde(default)]
    pub range: Vec<VersionRange>,
}

impl VersionTable {
    /// Sort and validate the range list.
    pub fn build(mut self) -> UniflashResult<Self> {
        self.range.sort_by_key(|r| r.start);
        validate_ranges("version", self.range.iter().map(|r| (r.start, r.end)))?;
        Ok(self)
    }

    /// Version label for `code`: point entry, else range entry, else
    /// `"unassigned"`.
    pub fn lookup(&self, code: CodePoint) -> &str {
        if let Some(v) = self.single.get(&code.value()) {
            return v;
        }
        range_search(&self.range, code.value(), |r| (r.start, r.end))
            .map(|(_, r)| r.version.as_str())
            .unwrap_or("unassigned")
    }
}

/// Common-name range entry; `#` in the name stands for the code's hex digits.
#[derive(Clone, Debug, Deserialize)]
pub struct CommonNameRange {
    /// First code point of the range.
    pub start: u32,
    /// Last code point of the range (inclusive).
    pub end: u32,
    /// Name template.
    pub name: String,
}

/// Common-name range table for codes with no explicit record.
#[derive(Debug, Default)]
pub struct CommonNameTable {
    entries: Vec<CommonNameRange>,
}

impl CommonNameTable {
    /// Sort, validate and build the table.
    pub fn new(mut entries: Vec<CommonNameRange>) -> UniflashResult<Self> {
        entries.sort_by_key(|r| r.start);
        validate_ranges("common-name", entries.iter().map(|r| (r.start, r.end)))?;
        Ok(Self { entries })
    }

    /// Resolved name for `code` with the `#` placeholder substituted, or
    /// `None` when no range matches.
    pub fn lookup(&self, code: CodePoint) -> Option<String> {
        range_search(&self.entries, code.value(), |r| (r.start, r.end))
            .map(|(_, r)| r.name.replace('#', &code.hex_digits()))
    }
}

/// Sorted-start binary search: greatest start <= value, then end check.
fn range_search<'a, T>(
    entries: &'a [T],
    value: u32,
    bounds: impl Fn(&T) -> (u32, u32),
) -> Option<(usize, &'a T)> {
    let idx = entries.partition_point(|e| bounds(e).0 <= value);
    if idx == 0 {
        return None;
    }
    let entry = &entries[idx - 1];
    (value <= bounds(entry).1).then_some((idx - 1, entry))
}

fn validate_ranges(
    what: &str,
    ranges: impl Iterator<Item = (u32, u32)>,
) -> UniflashResult<()> {
    let mut prev_end: Option<u32> = None;
    for (start, end) in ranges {
        if end < start {
            return Err(UniflashError::data(format!(
                "{what} range {start:#X}..{end:#X} is inverted"
            )));
        }
        if end > CodePoint::MAX_SCALAR {
            return Err(UniflashError::data(format!(
                "{what} range end {end:#X} outside the code-point space"
            )));
        }
        if let Some(p) = prev_end
            && start <= p
        {
            return Err(UniflashError::data(format!(
                "{what} table is unsorted or overlapping at {start:#X}"
            )));
        }
        prev_end = Some(end);
    }
    Ok(())
}
