use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

use playoff::{
    BracketLayout, BracketPainter, DirSink, FrameClock, FrameSink, Fps, MemorySink, RasterSurface,
    RunStamp, Sequencer, SleepPacer, Storyboard, Surface, SvgSurface, ZipSink, demo_storyboard,
    encode_png,
};

#[derive(Parser, Debug)]
#[command(name = "playoff", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one still of the fully revealed bracket.
    Frame(FrameArgs),
    /// Run the animation script and capture every photo frame.
    Render(RenderArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// Vector backend; rasterized for PNG output.
    Svg,
    /// CPU raster backend (needs --font).
    Raster,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input storyboard JSON. Defaults to the built-in demo.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// Output path: PNG, or the SVG document when it ends in `.svg`.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, value_enum, default_value_t = Backend::Svg)]
    backend: Backend,

    /// TTF/OTF font file for the raster backend.
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input storyboard JSON. Defaults to the built-in demo.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// Output destination: a zip archive when it ends in `.zip`,
    /// otherwise a directory of loose PNG frames.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, value_enum, default_value_t = Backend::Svg)]
    backend: Backend,

    /// TTF/OTF font file for the raster backend.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Frames per second of the capture clock.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Real-time pacing factor; 0 renders as fast as possible, 1 paces
    /// to the voiceover timeline, larger values slow playback down.
    #[arg(long, default_value_t = 0.0)]
    slowness: f64,

    /// Run the script without writing any frames (timing dry run).
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn load_storyboard(in_path: Option<&PathBuf>) -> anyhow::Result<Storyboard> {
    let storyboard = match in_path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read storyboard '{}'", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parse storyboard '{}'", path.display()))?
        }
        None => demo_storyboard(),
    };
    storyboard.validate()?;
    Ok(storyboard)
}

fn make_surface(
    backend: Backend,
    storyboard: &Storyboard,
    font: Option<&PathBuf>,
) -> anyhow::Result<Box<dyn Surface>> {
    let canvas = storyboard.layout.canvas;
    let background = storyboard.theme.background;
    match backend {
        Backend::Svg => Ok(Box::new(SvgSurface::new(canvas, background))),
        Backend::Raster => {
            let font = font.context("--backend raster requires --font")?;
            let bytes = std::fs::read(font)
                .with_context(|| format!("read font '{}'", font.display()))?;
            Ok(Box::new(RasterSurface::new(canvas, background, bytes)?))
        }
    }
}

/// The finished diagram: connectors, every column of letters, and the
/// winner call-out.
fn draw_revealed(painter: &BracketPainter<'_>, storyboard: &Storyboard, surface: &mut dyn Surface) {
    let columns = storyboard.bracket.column_count();
    painter.draw_bracket(surface);
    for column in 0..columns {
        painter.draw_initial_letters(surface, column);
    }
    painter.draw_final_result(
        surface,
        &storyboard.bracket.columns[columns - 1][0],
        0,
        storyboard.theme.initial_letter,
    );
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let storyboard = load_storyboard(args.in_path.as_ref())?;
    let layout = BracketLayout::new(&storyboard.bracket, storyboard.layout);
    let painter = BracketPainter::new(&storyboard.bracket, &layout, storyboard.theme);

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    if args.out.extension().is_some_and(|e| e == "svg") {
        anyhow::ensure!(
            args.backend == Backend::Svg,
            "an .svg output needs --backend svg"
        );
        let mut svg = SvgSurface::new(storyboard.layout.canvas, storyboard.theme.background);
        draw_revealed(&painter, &storyboard, &mut svg);
        std::fs::write(&args.out, svg.document())
            .with_context(|| format!("write svg '{}'", args.out.display()))?;
    } else {
        let mut surface = make_surface(args.backend, &storyboard, args.font.as_ref())?;
        draw_revealed(&painter, &storyboard, surface.as_mut());
        let pixels = surface.capture()?;
        let png = encode_png(&pixels)?;
        std::fs::write(&args.out, png)
            .with_context(|| format!("write png '{}'", args.out.display()))?;
    }

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let storyboard = load_storyboard(args.in_path.as_ref())?;
    let mut surface = make_surface(args.backend, &storyboard, args.font.as_ref())?;

    let wants_zip = args.out.extension().is_some_and(|e| e == "zip");
    let mut sink: Box<dyn FrameSink> = if args.dry_run {
        Box::new(MemorySink::new())
    } else if wants_zip {
        Box::new(ZipSink::create(&args.out)?)
    } else {
        Box::new(DirSink::create(&args.out)?)
    };

    let mut clock = FrameClock::new(Fps::new(args.fps, 1)?);
    if args.slowness > 0.0 {
        clock = clock.with_pacer(Box::new(SleepPacer::new(args.slowness)));
    }

    let mut seq = Sequencer::new(&storyboard, clock, !args.dry_run, sink.as_mut())?;
    seq.arm()?;
    seq.start(RunStamp::now())?;
    seq.run(surface.as_mut(), &storyboard.script)?;

    eprintln!(
        "captured {} frames of timeline into {}",
        seq.frame(),
        args.out.display()
    );
    Ok(())
}
