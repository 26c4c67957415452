use crate::classify::Classifier;
use crate::classify::encoding::{gap, utf8_hex, utf16be_hex, utf16le_hex};
use crate::compose::draw::{AnchorH, AnchorV, FrameRGBA, draw_text, fill_rect, measure_block};
use crate::compose::wrap::auto_width;
use crate::config::FlashOptions;
use crate::font::FontSet;
use crate::font::resolver::{self, DisplayOutcome, ResolvedSource, ResolverOpts};
use crate::font::resource::FontResource;
use crate::foundation::core::CodePoint;
use crate::foundation::error::{UniflashError, UniflashResult};

/// Background gray level.
const BG_GRAY: u8 = 20;
/// Foreground gray level.
const TEXT_GRAY: u8 = 235;

/// Glyph point size in the frame center.
const GLYPH_PX: f32 = 220.0;
/// Annotation-field text size (top-left panel).
const TOP_PX: f32 = 12.0;
/// Plane panel text size (middle-right).
const RIGHT_MIDDLE_PX: f32 = 25.0;
/// Name/block panel text size (bottom-left).
const LEFT_BOTTOM_PX: f32 = 25.0;
/// Encoding panel text size (bottom-center).
const MIDDLE_BOTTOM_PX: f32 = 20.0;
/// Font-name/code panel text size (bottom-right).
const RIGHT_BOTTOM_PX: f32 = 40.0;
/// Placeholder label text size.
const PLACEHOLDER_PX: f32 = 40.0;
/// Percentage readout text size.
const PERCENT_PX: f32 = 20.0;
/// Gutter between neighboring panels.
const GUTTER: f32 = 15.0;

/// Composes one annotated raster frame per code point.
///
/// Holds only shared references; safe to use from any worker.
#[derive(Clone, Copy)]
pub struct FrameComposer<'a> {
    classifier: Classifier<'a>,
    fonts: &'a FontSet,
    opts: &'a FlashOptions,
}

impl<'a> FrameComposer<'a> {
    /// Build a composer over shared run state.
    pub fn new(classifier: Classifier<'a>, fonts: &'a FontSet, opts: &'a FlashOptions) -> Self {
        Self {
            classifier,
            fonts,
            opts,
        }
    }

    /// Compose the frame for `code`, the `run_pos`-th member (0-based) of a
    /// same-block run of length `run_len`.
    pub fn compose(
        &self,
        code: CodePoint,
        run_pos: usize,
        run_len: usize,
    ) -> UniflashResult<FrameRGBA> {
        if run_len == 0 || run_pos >= run_len {
            return Err(UniflashError::render(format!(
                "invalid run coordinates {run_pos}/{run_len} for {code}"
            )));
        }

        let resolver_opts = ResolverOpts {
            flags: self.opts.flags,
            policy: self.opts.last_resort,
            policy_font_name: self.fonts.policy_font_name(),
            ui_font_name: self.fonts.ui.name(),
        };
        let resolution = resolver::resolve(
            &self.classifier,
            code,
            &self.fonts.custom,
            &self.fonts.builtin,
            &resolver_opts,
        )?;

        let w = self.opts.video.width as f32;
        let h = self.opts.video.height as f32;
        let d = self.opts.dimensions;
        let ui = &self.fonts.ui;
        let mut frame = FrameRGBA::new_gray(self.opts.video.width, self.opts.video.height, BG_GRAY);

        // Bottom-center: the three encoding forms.
        let mb_text = format!(
            "UTF-16BE: {}\nUTF-16LE: {}\nUTF-8: {}",
            gap(&utf16be_hex(code)),
            gap(&utf16le_hex(code)),
            gap(&utf8_hex(code))
        );
        let (mb_w, _) = measure_block(ui, MIDDLE_BOTTOM_PX, &mb_text);
        let mb_left = w / 2.0 - mb_w / 2.0;
        let mb_right = w / 2.0 + mb_w / 2.0;
        draw_text(
            &mut frame,
            ui,
            MIDDLE_BOTTOM_PX,
            w / 2.0,
            h - d.margin_bottom as f32,
            &mb_text,
            AnchorH::Center,
            AnchorV::Bottom,
            AnchorH::Center,
            TEXT_GRAY,
        );

        // Bottom-right: resolved font name and the code label.
        let font_line = auto_width(
            &format!("字体：{}", resolution.font_name),
            ui,
            RIGHT_BOTTOM_PX,
            w - mb_right - GUTTER,
        );
        let rb_text = format!("{font_line}\n{}", code.u_label());
        draw_text(
            &mut frame,
            ui,
            RIGHT_BOTTOM_PX,
            w - d.margin_right as f32,
            h - d.margin_bottom as f32,
            &rb_text,
            AnchorH::Right,
            AnchorV::Bottom,
            AnchorH::Right,
            TEXT_GRAY,
        );

        // Bottom-left: name and block identifiers.
        let (block_local, block_en, block_range) = match self.classifier.block_of(code) {
            Some((_, b)) => (b.local_name.clone(), b.name.clone(), b.range_label()),
            None => ("未定义".to_owned(), "Undefined".to_owned(), "U+?~U+?".to_owned()),
        };
        let lb_budget = mb_left - GUTTER - d.margin_left as f32;
        let name = auto_width(&self.classifier.char_name(code), ui, LEFT_BOTTOM_PX, lb_budget);
        let block_en = auto_width(&block_en, ui, LEFT_BOTTOM_PX, lb_budget);
        let lb_text = format!("{name}\n{block_range}\n{block_local}\n{block_en}");
        draw_text(
            &mut frame,
            ui,
            LEFT_BOTTOM_PX,
            d.margin_left as f32,
            h - d.margin_bottom as f32,
            &lb_text,
            AnchorH::Left,
            AnchorV::Bottom,
            AnchorH::Left,
            TEXT_GRAY,
        );

        // Middle-right: plane identifiers.
        let plane = self.classifier.plane_of(code);
        let rm_text = format!("{}\n{}\n{}", plane.local_name, plane.name, plane.label);
        draw_text(
            &mut frame,
            ui,
            RIGHT_MIDDLE_PX,
            w - d.margin_right as f32,
            h / 2.0,
            &rm_text,
            AnchorH::Right,
            AnchorV::Middle,
            AnchorH::Right,
            TEXT_GRAY,
        );

        // Top: progress bar over the current same-block run.
        let progress = (run_pos + 1) as f32 / run_len as f32;
        fill_rect(
            &mut frame,
            0,
            0,
            (progress * w).round() as i32,
            d.bar_height as i32,
            TEXT_GRAY,
        );
        let percent = format!("{:.2}%", progress as f64 * 100.0);
        let percent_left = w - d.margin_right as f32 - ui.text_width(&percent, PERCENT_PX);
        draw_text(
            &mut frame,
            ui,
            PERCENT_PX,
            w - d.margin_right as f32,
            (d.bar_height + d.margin_top) as f32,
            &percent,
            AnchorH::Right,
            AnchorV::Top,
            AnchorH::Right,
            TEXT_GRAY,
        );

        // Top-left: annotation fields, empty ones omitted.
        let t_text = self.annotation_text(code, percent_left - GUTTER - d.margin_left as f32);
        draw_text(
            &mut frame,
            ui,
            TOP_PX,
            d.margin_left as f32,
            (d.bar_height + d.margin_top) as f32,
            &t_text,
            AnchorH::Left,
            AnchorV::Top,
            AnchorH::Left,
            TEXT_GRAY,
        );

        // Center: glyph or placeholder.
        match resolution.display {
            DisplayOutcome::Glyph(ch) => {
                let font = self.glyph_font(resolution.source)?;
                draw_text(
                    &mut frame,
                    font,
                    GLYPH_PX,
                    w / 2.0,
                    h / 2.0,
                    &ch.to_string(),
                    AnchorH::Center,
                    AnchorV::Middle,
                    AnchorH::Center,
                    TEXT_GRAY,
                );
            }
            DisplayOutcome::Placeholder => {
                let label = resolver::placeholder_label(&self.classifier, code);
                draw_text(
                    &mut frame,
                    ui,
                    PLACEHOLDER_PX,
                    w / 2.0,
                    h / 2.0,
                    &label,
                    AnchorH::Center,
                    AnchorV::Middle,
                    AnchorH::Center,
                    TEXT_GRAY,
                );
            }
        }

        Ok(frame)
    }

    fn glyph_font(&self, source: ResolvedSource) -> UniflashResult<&'a FontResource> {
        match source {
            ResolvedSource::Custom(i) => self.fonts.custom.get(i).ok_or_else(|| {
                UniflashError::render(format!("resolved custom font index {i} out of range"))
            }),
            ResolvedSource::Builtin(i) => self.fonts.builtin.get(i).ok_or_else(|| {
                UniflashError::render(format!("resolved builtin font index {i} out of range"))
            }),
            ResolvedSource::LastResort => self
                .fonts
                .policy_font
                .as_ref()
                .ok_or_else(|| UniflashError::render("policy font missing for last-resort glyph")),
            ResolvedSource::None => {
                Err(UniflashError::render("glyph display without a resolved font"))
            }
        }
    }

    /// Build the stacked annotation block: compat mapping, decomposition,
    /// variation, cross references, comment, formal alias, alias, version,
    /// each wrapped to `budget` and omitted when empty.
    fn annotation_text(&self, code: CodePoint, budget: f32) -> String {
        let ui = &self.fonts.ui;
        let record = self.classifier.bundle().record_of(code);
        let join = |items: Option<&Vec<String>>, sep: &str| -> String {
            items.map(|v| v.join(sep)).unwrap_or_default()
        };

        let alias = join(record.map(|r| &r.alias), ", ");
        let formal_alias = join(record.map(|r| &r.formal_alias), ", ");
        let comment = join(record.map(|r| &r.comment), "; ");
        let cross_refs = join(record.map(|r| &r.cross_references), ", ");
        let variation = join(record.map(|r| &r.variation), ", ");
        let decomposition = record
            .map(|r| {
                r.decomposition
                    .iter()
                    .map(|c| format!("U+{c}"))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();
        let compat = join(record.map(|r| &r.compat_mapping), ", ");
        let version = format!("版本：{}", self.classifier.version_of(code));

        let mut fields = Vec::new();
        for (label, value) in [
            ("兼容性映射：", compat),
            ("拆解：", decomposition),
            ("变体：", variation),
            ("交叉参考：", cross_refs),
            ("说明：", comment),
            ("正式别名：", formal_alias),
            ("别名：", alias),
        ] {
            if !value.is_empty() {
                fields.push(auto_width(&format!("{label}{value}"), ui, TOP_PX, budget));
            }
        }
        fields.push(version);
        fields.join("\n")
    }
}
