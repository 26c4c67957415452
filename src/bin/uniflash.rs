use std::path::PathBuf;

use anyhow::Context as _;
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};

use uniflash::input::{CodeSource, SkipFlags, apply_filters, collect_codes};
use uniflash::{
    Classifier, Dimensions, FfmpegSink, FfmpegSinkOpts, FlashOptions, FlashSession, FontSet,
    LastResortPolicy, PipelineOpts, ShowFlags, UnicodeBundle, VideoProps,
};

#[derive(Parser, Debug)]
#[command(name = "uniflash", version, about = "Annotated Unicode code-point flash videos")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a code-point sequence to an MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render a single code point as a PNG.
    Frame(FrameArgs),
}

#[derive(clap::Args, Debug)]
struct CommonArgs {
    /// Reference-data directory (tables + fonts/).
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Custom font file; repeat to build the priority chain (list order).
    #[arg(long = "font", value_name = "PATH")]
    fonts: Vec<PathBuf>,

    /// Frame width in pixels.
    #[arg(long, default_value_t = 1920)]
    width: u32,
    /// Frame height in pixels.
    #[arg(long, default_value_t = 1080)]
    height: u32,
    /// Progress-bar height in pixels.
    #[arg(long, default_value_t = 36)]
    bar_height: u32,
    /// Top margin in pixels.
    #[arg(long, default_value_t = 15)]
    margin_top: u32,
    /// Bottom margin in pixels.
    #[arg(long, default_value_t = 15)]
    margin_bottom: u32,
    /// Left margin in pixels.
    #[arg(long, default_value_t = 30)]
    margin_left: u32,
    /// Right margin in pixels.
    #[arg(long, default_value_t = 30)]
    margin_right: u32,

    /// Show private-use characters that have a glyph.
    #[arg(long)]
    show_private: bool,
    /// Show control characters.
    #[arg(long)]
    show_control: bool,
    /// Show reserved characters.
    #[arg(long)]
    show_reserved: bool,

    /// Last-resort policy when no font covers a code point.
    #[arg(long, value_enum, default_value = "none")]
    last_resort: LastResortArg,
}

#[derive(Parser, Debug)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["range", "code_file", "text_file", "from_fonts"])
))]
struct RenderArgs {
    /// Frame rate; fractional rates are allowed.
    #[arg(long, default_value_t = 15.0)]
    fps: f64,

    /// Output MP4 path.
    #[arg(long, default_value = "res.mp4")]
    out: PathBuf,

    /// Inclusive code-point range, bare hex (e.g. `--range 0 10FFFF`).
    #[arg(long, num_args = 2, value_parser = parse_hex, value_names = ["START", "END"])]
    range: Option<Vec<u32>>,
    /// File of comma-delimited bare-hex code points.
    #[arg(long, value_name = "PATH")]
    code_file: Option<PathBuf>,
    /// Plain text file; one code point per character.
    #[arg(long, value_name = "PATH")]
    text_file: Option<PathBuf>,
    /// Use the union of the custom fonts' coverage sets.
    #[arg(long)]
    from_fonts: bool,

    /// Show undefined/noncharacter/surrogate codes that have a glyph in a
    /// custom font.
    #[arg(long, conflicts_with = "skip_undefined")]
    show_undefined: bool,
    /// Skip undefined characters, noncharacters, surrogates and the like.
    #[arg(long)]
    skip_undefined: bool,
    /// Skip U+3347A..=U+DFFFF.
    #[arg(long)]
    skip_long: bool,
    /// Skip code points no custom font covers.
    #[arg(long)]
    skip_no_glyph: bool,

    /// Override worker thread count.
    #[arg(long)]
    threads: Option<usize>,
    /// Task submission chunk size.
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Code point to render, bare hex (e.g. `1F600`).
    #[arg(long, value_parser = parse_hex)]
    code: u32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Show undefined codes that have a glyph in a custom font.
    #[arg(long)]
    show_undefined: bool,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LastResortArg {
    /// Render the category placeholder.
    None,
    /// Use the LastResort-style font with synthetic glyph slots.
    LastResort,
    /// Use the MonuLast-style font keyed by literal code points.
    MonuLast,
}

impl From<LastResortArg> for LastResortPolicy {
    fn from(v: LastResortArg) -> Self {
        match v {
            LastResortArg::None => LastResortPolicy::None,
            LastResortArg::LastResort => LastResortPolicy::LastResort,
            LastResortArg::MonuLast => LastResortPolicy::MonuLast,
        }
    }
}

fn parse_hex(s: &str) -> Result<u32, String> {
    let t = s
        .trim()
        .trim_start_matches("U+")
        .trim_start_matches("u+")
        .trim_start_matches("0x")
        .trim_start_matches("0X");
    let v = u32::from_str_radix(t, 16).map_err(|_| format!("invalid hex code point '{s}'"))?;
    if v > 0x10FFFF {
        return Err(format!("code point '{s}' outside [0, 10FFFF]"));
    }
    Ok(v)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn build_options(common: &CommonArgs, fps: f64, show_undefined: bool) -> FlashOptions {
    FlashOptions {
        dimensions: Dimensions {
            bar_height: common.bar_height,
            margin_top: common.margin_top,
            margin_bottom: common.margin_bottom,
            margin_left: common.margin_left,
            margin_right: common.margin_right,
        },
        video: VideoProps {
            width: common.width,
            height: common.height,
            fps,
        },
        flags: ShowFlags {
            show_private: common.show_private,
            show_control: common.show_control,
            show_reserved: common.show_reserved,
            show_undefined,
        },
        last_resort: common.last_resort.into(),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let bundle = UnicodeBundle::load(&args.common.data_dir)?;
    let fonts = FontSet::load(&bundle, &args.common.fonts, args.common.last_resort.into())?;

    let source = if let Some(range) = &args.range {
        CodeSource::Range {
            start: range[0],
            end: range[1],
        }
    } else if let Some(path) = &args.code_file {
        CodeSource::CodeFile(path.clone())
    } else if let Some(path) = &args.text_file {
        CodeSource::TextFile(path.clone())
    } else {
        CodeSource::FromFonts
    };

    let classifier = Classifier::new(&bundle);
    let codes = collect_codes(&source, &fonts.custom)?;
    let codes = apply_filters(
        codes,
        SkipFlags {
            skip_long: args.skip_long,
            skip_undefined: args.skip_undefined,
            skip_no_glyph: args.skip_no_glyph,
        },
        &classifier,
        &fonts.custom,
    );
    if codes.is_empty() {
        anyhow::bail!("no code points left to render after filtering");
    }

    let opts = build_options(&args.common, args.fps, args.show_undefined);
    let session = FlashSession::new(&bundle, &fonts, &opts)?;

    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(args.out.clone()));
    let pipeline_opts = PipelineOpts {
        threads: args.threads,
        chunk_size: args.chunk_size,
        ..Default::default()
    };
    let stats = session.render_to_sink(&codes, &pipeline_opts, &mut sink)?;

    eprintln!("wrote {} ({} frames)", args.out.display(), stats.frames_encoded);
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let bundle = UnicodeBundle::load(&args.common.data_dir)?;
    let fonts = FontSet::load(&bundle, &args.common.fonts, args.common.last_resort.into())?;

    let opts = build_options(&args.common, 15.0, args.show_undefined);
    let session = FlashSession::new(&bundle, &fonts, &opts)?;
    let frame = session.render_single(uniflash::CodePoint::new(args.code)?)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
