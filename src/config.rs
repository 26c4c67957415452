use crate::foundation::error::{UniflashError, UniflashResult};

/// Frame margins and progress-bar geometry, in pixels.
#[derive(Clone, Copy, Debug)]
pub struct Dimensions {
    /// Progress-bar height at the top of the frame.
    pub bar_height: u32,
    /// Top margin (below the progress bar).
    pub margin_top: u32,
    /// Bottom margin.
    pub margin_bottom: u32,
    /// Left margin.
    pub margin_left: u32,
    /// Right margin.
    pub margin_right: u32,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            bar_height: 36,
            margin_top: 15,
            margin_bottom: 15,
            margin_left: 30,
            margin_right: 30,
        }
    }
}

/// Output video properties.
#[derive(Clone, Copy, Debug)]
pub struct VideoProps {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second; fractional rates are allowed.
    pub fps: f64,
}

impl VideoProps {
    /// Validate dimensions and rate.
    pub fn validate(&self) -> UniflashResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(UniflashError::config("frame width/height must be non-zero"));
        }
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(UniflashError::config(format!(
                "fps must be a positive finite number, got {}",
                self.fps
            )));
        }
        Ok(())
    }
}

impl Default for VideoProps {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: 15.0,
        }
    }
}

/// Category display toggles. Each gates whether a code point of that category
/// renders its glyph (when a font covers it) instead of the placeholder.
#[derive(Clone, Copy, Debug, Default)]
pub struct ShowFlags {
    /// Show private-use characters that have a glyph.
    pub show_private: bool,
    /// Show control characters.
    pub show_control: bool,
    /// Show reserved characters.
    pub show_reserved: bool,
    /// Show undefined/noncharacter/surrogate codes that have a glyph in a
    /// custom font.
    pub show_undefined: bool,
}

/// What to do when no custom or builtin font covers a code point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LastResortPolicy {
    /// No last-resort font: render the category placeholder.
    #[default]
    None,
    /// Use the LastResort-style font with synthetic per-category glyph slots.
    LastResort,
    /// Use the MonuLast-style font keyed by literal code points.
    MonuLast,
}

/// Options for a full flash-video run.
#[derive(Clone, Debug, Default)]
pub struct FlashOptions {
    /// Margin/bar geometry.
    pub dimensions: Dimensions,
    /// Output video properties.
    pub video: VideoProps,
    /// Category display toggles.
    pub flags: ShowFlags,
    /// Last-resort policy.
    pub last_resort: LastResortPolicy,
}

impl FlashOptions {
    /// Validate the combination.
    pub fn validate(&self) -> UniflashResult<()> {
        self.video.validate()?;
        let d = &self.dimensions;
        if d.bar_height + d.margin_top >= self.video.height
            || d.margin_bottom >= self.video.height
            || d.margin_left + d.margin_right >= self.video.width
        {
            return Err(UniflashError::config(
                "margins and bar height leave no drawable area",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        FlashOptions::default().validate().unwrap();
    }

    #[test]
    fn zero_fps_rejected() {
        let mut o = FlashOptions::default();
        o.video.fps = 0.0;
        assert!(o.validate().is_err());
    }

    #[test]
    fn oversized_margins_rejected() {
        let mut o = FlashOptions::default();
        o.dimensions.margin_left = 1000;
        o.dimensions.margin_right = 1000;
        assert!(o.validate().is_err());
    }
}
