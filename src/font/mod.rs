//! Font resources and the multi-tier fallback resolver.

/// Fallback resolution and the last-resort mapping.
pub mod resolver;
/// Loaded fonts with immutable coverage sets.
pub mod resource;

use std::path::Path;

use tracing::info;

use crate::config::LastResortPolicy;
use crate::data::bundle::UnicodeBundle;
use crate::foundation::error::{UniflashError, UniflashResult};
use resource::FontResource;

/// UI font file stem expected under the bundle's `fonts/` directory.
pub const UI_FONT_NAME: &str = "Sarasa-Mono-SC-Regular";
/// LastResort-policy font file stem.
pub const LAST_RESORT_FONT_FILE: &str = "LastResort-PUA";
/// Display name reported for the LastResort-policy font.
pub const LAST_RESORT_FONT_NAME: &str = "LastResort-Regular";
/// MonuLast-policy font file stem and display name.
pub const MONU_LAST_FONT_NAME: &str = "Monu-Last";

/// All fonts of a run: custom chain, builtin fallback chain, the optional
/// policy font and the UI font. Frozen after loading.
pub struct FontSet {
    /// User-supplied fonts, priority = list order. Coverage is the full cmap.
    pub custom: Vec<FontResource>,
    /// Builtin fallback fonts in fixed priority order. Coverage is the
    /// externally built claimed set.
    pub builtin: Vec<FontResource>,
    /// The dedicated policy font, when a last-resort policy is active.
    pub policy_font: Option<FontResource>,
    /// Annotation/placeholder font.
    pub ui: FontResource,
}

impl FontSet {
    /// Load every font a run needs. Fails fast on unreadable files.
    pub fn load(
        bundle: &UnicodeBundle,
        custom_paths: &[impl AsRef<Path>],
        policy: LastResortPolicy,
    ) -> UniflashResult<Self> {
        let custom = custom_paths
            .iter()
            .map(|p| FontResource::load(p.as_ref()))
            .collect::<UniflashResult<Vec<_>>>()?;

        let mut builtin = Vec::with_capacity(bundle.fallback_entries().len());
        for entry in bundle.fallback_entries() {
            let font = FontResource::load(&bundle.font_path(&entry.name)?)?
                .restrict_coverage(&entry.codes)?;
            builtin.push(font);
        }

        let policy_font = match policy {
            LastResortPolicy::None => None,
            LastResortPolicy::LastResort => {
                let path = bundle.font_path(LAST_RESORT_FONT_FILE)?;
                let bytes = std::fs::read(&path).map_err(|e| {
                    UniflashError::font(format!(
                        "failed to read font file '{}': {e}",
                        path.display()
                    ))
                })?;
                Some(FontResource::from_bytes(LAST_RESORT_FONT_NAME, &bytes)?)
            }
            LastResortPolicy::MonuLast => {
                Some(FontResource::load(&bundle.font_path(MONU_LAST_FONT_NAME)?)?)
            }
        };

        let ui = FontResource::load(&bundle.font_path(UI_FONT_NAME)?)?;

        info!(
            custom = custom.len(),
            builtin = builtin.len(),
            policy = ?policy,
            "loaded font set"
        );
        Ok(Self {
            custom,
            builtin,
            policy_font,
            ui,
        })
    }

    /// Assemble a set from already-loaded resources (tests, embedders).
    pub fn from_parts(
        custom: Vec<FontResource>,
        builtin: Vec<FontResource>,
        policy_font: Option<FontResource>,
        ui: FontResource,
    ) -> Self {
        Self {
            custom,
            builtin,
            policy_font,
            ui,
        }
    }

    /// Display name of the active policy font, if one is loaded.
    pub fn policy_font_name(&self) -> Option<&str> {
        self.policy_font.as_ref().map(|f| f.name())
    }
}
