use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use tracing::info;

use crate::data::controls::ControlTable;
use crate::data::records::{CharacterRecord, NamesTable};
use crate::data::set::CodePointSet;
use crate::data::tables::{
    BlockRange, BlockTable, CommonNameRange, CommonNameTable, PlaneTable, VersionTable,
};
use crate::foundation::core::CodePoint;
use crate::foundation::error::{UniflashError, UniflashResult};

/// One builtin-fallback font entry: the font's name (resolved to
/// `fonts/<name>.ttf` under the data directory) and its claimed coverage:
/// the subset of its cmap not already claimed by a higher-priority entry.
/// List order is priority order.
#[derive(Clone, Debug, Deserialize)]
pub struct FontFallbackEntry {
    /// Font name / file stem.
    pub name: String,
    /// Claimed code points.
    pub codes: Vec<u32>,
}

/// Immutable reference-data bundle.
///
/// Constructed once before the pipeline starts and shared by reference across
/// all workers; no lookup mutates state.
#[derive(Debug)]
pub struct UnicodeBundle {
    names: NamesTable,
    common_names: CommonNameTable,
    versions: VersionTable,
    blocks: BlockTable,
    planes: PlaneTable,
    controls: ControlTable,
    /// Defined-character set with the control set subtracted.
    defined: CodePointSet,
    fallback_entries: Vec<FontFallbackEntry>,
    data_dir: Option<PathBuf>,
}

impl UnicodeBundle {
    /// Load all prebuilt JSON tables from `dir`.
    ///
    /// Expected files: `defined.json`, `names.json`, `common_names.json`,
    /// `versions.json`, `blocks.json`, `font_fallback.json`, plus a `fonts/`
    /// directory holding the builtin and special font files.
    pub fn load(dir: &Path) -> UniflashResult<Self> {
        let defined_codes: Vec<u32> = read_json(&dir.join("defined.json"))?;
        let records: HashMap<u32, CharacterRecord> = read_json(&dir.join("names.json"))?;
        let common_names: Vec<CommonNameRange> = read_json(&dir.join("common_names.json"))?;
        let versions: VersionTable = read_json(&dir.join("versions.json"))?;
        let blocks: Vec<BlockRange> = read_json(&dir.join("blocks.json"))?;
        let fallback_entries: Vec<FontFallbackEntry> = read_json(&dir.join("font_fallback.json"))?;

        let controls = ControlTable::new();
        let mut defined = CodePointSet::new();
        for v in defined_codes {
            defined.insert(
                CodePoint::new(v)
                    .map_err(|_| UniflashError::data(format!("defined.json entry {v:#X} out of range")))?,
            );
        }
        defined.subtract(controls.members());

        let bundle = Self {
            names: NamesTable::new(records),
            common_names: CommonNameTable::new(common_names)?,
            versions: versions.build()?,
            blocks: BlockTable::new(blocks)?,
            planes: PlaneTable::standard(),
            controls,
            defined,
            fallback_entries,
            data_dir: Some(dir.to_path_buf()),
        };
        info!(
            defined = bundle.defined.len(),
            records = bundle.names.len(),
            blocks = bundle.blocks.entries().len(),
            fallback_fonts = bundle.fallback_entries.len(),
            "loaded reference data bundle"
        );
        Ok(bundle)
    }

    /// Assemble a bundle from already-built parts (tests, embedding callers).
    /// The control set is subtracted from `defined` here, mirroring `load`.
    pub fn from_parts(
        names: NamesTable,
        common_names: CommonNameTable,
        versions: VersionTable,
        blocks: BlockTable,
        mut defined: CodePointSet,
        fallback_entries: Vec<FontFallbackEntry>,
    ) -> Self {
        let controls = ControlTable::new();
        defined.subtract(controls.members());
        Self {
            names,
            common_names,
            versions,
            blocks,
            planes: PlaneTable::standard(),
            controls,
            defined,
            fallback_entries,
            data_dir: None,
        }
    }

    /// The record for `code`, if one exists.
    pub fn record_of(&self, code: CodePoint) -> Option<&CharacterRecord> {
        self.names.get(code)
    }

    /// Common-name range lookup with `#` substitution.
    pub fn common_name_of(&self, code: CodePoint) -> Option<String> {
        self.common_names.lookup(code)
    }

    /// Assignment version for `code` (point entry wins over range).
    pub fn version_of(&self, code: CodePoint) -> &str {
        self.versions.lookup(code)
    }

    /// Block table.
    pub fn blocks(&self) -> &BlockTable {
        &self.blocks
    }

    /// Plane table.
    pub fn planes(&self) -> &PlaneTable {
        &self.planes
    }

    /// Control/format table.
    pub fn controls(&self) -> &ControlTable {
        &self.controls
    }

    /// Membership in the (control-subtracted) defined-character set.
    pub fn is_in_defined_set(&self, code: CodePoint) -> bool {
        self.defined.contains(code)
    }

    /// Builtin-fallback entries in priority order.
    pub fn fallback_entries(&self) -> &[FontFallbackEntry] {
        &self.fallback_entries
    }

    /// Directory the bundle was loaded from (absent for `from_parts`).
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Path of a bundled font file by name.
    pub fn font_path(&self, name: &str) -> UniflashResult<PathBuf> {
        let dir = self.data_dir.as_deref().ok_or_else(|| {
            UniflashError::data("bundle has no data directory to resolve fonts from")
        })?;
        Ok(dir.join("fonts").join(format!("{name}.ttf")))
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> UniflashResult<T> {
    let file = File::open(path)
        .with_context(|| format!("failed to open reference table '{}'", path.display()))
        .map_err(UniflashError::Other)?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        UniflashError::data(format!("failed to parse '{}': {e}", path.display()))
    })
}
