use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "driftcam", version)]
struct Cli {
    /// Log at DEBUG instead of INFO.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute a camera path from a snapshot archive.
    Path(PathArgs),
    /// Summarize a camera path, or print one frame.
    Inspect(InspectArgs),
    /// Print a configuration as JSON (a starting point for `--config`).
    Config(ConfigArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Preset {
    /// Library defaults.
    Default,
    /// 1000 Ma to today with era guidance and supercontinent holds.
    BillionYear,
}

impl Preset {
    fn config(self) -> driftcam::PipelineConfig {
        match self {
            Self::Default => driftcam::PipelineConfig::default(),
            Self::BillionYear => driftcam::PipelineConfig::billion_year_preset(),
        }
    }
}

#[derive(Parser, Debug)]
struct PathArgs {
    /// Snapshot archive JSON (`{ "snapshots": [...] }`).
    #[arg(long)]
    snapshots: PathBuf,

    /// Pipeline config JSON; overrides `--preset`.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Preset::Default)]
    preset: Preset,

    /// Output camera path JSON.
    #[arg(long)]
    out: PathBuf,

    /// Fetch and cluster snapshots in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Camera path JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Print this frame (0-based) instead of the summary.
    #[arg(long)]
    frame: Option<u64>,
}

#[derive(Parser, Debug)]
struct ConfigArgs {
    #[arg(long, value_enum, default_value_t = Preset::Default)]
    preset: Preset,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Path(args) => cmd_path(args),
        Command::Inspect(args) => cmd_inspect(args),
        Command::Config(args) => cmd_config(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn cmd_path(args: PathArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(p) => driftcam::PipelineConfig::from_path(p)
            .with_context(|| format!("load config '{}'", p.display()))?,
        None => args.preset.config(),
    };
    if args.parallel {
        config.threading.parallel = true;
    }
    if args.threads.is_some() {
        config.threading.threads = args.threads;
    }

    let source = driftcam::ArchiveSource::open(&args.snapshots)
        .with_context(|| format!("open snapshot archive '{}'", args.snapshots.display()))?;
    let path = driftcam::compute_camera_path(&source, &config)?;
    path.write_to_path(&args.out)
        .with_context(|| format!("write camera path '{}'", args.out.display()))?;

    eprintln!("wrote {} ({} frames)", args.out.display(), path.len());
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let path = driftcam::CameraPath::from_path(&args.in_path)?;

    if let Some(idx) = args.frame {
        let frame = path
            .frame(driftcam::FrameIndex(idx))
            .with_context(|| format!("frame {idx} out of range (path has {})", path.len()))?;
        println!("{}", serde_json::to_string_pretty(frame)?);
        if let Some(blend) = path.crossfade(driftcam::FrameIndex(idx)) {
            println!("{}", serde_json::to_string_pretty(blend)?);
        }
        return Ok(());
    }

    let m = &path.metadata;
    println!("frames:       {}", path.len());
    println!(
        "duration:     {} s @ {}/{} fps",
        m.duration_secs, m.fps.num, m.fps.den
    );
    println!(
        "time range:   {} -> {} Ma, step {} Ma ({} steps)",
        m.oldest_ma, m.newest_ma, m.step_ma, m.steps
    );
    println!(
        "smoothing:    window {}, sigma {:.2}",
        m.smoothing_window, m.smoothing_sigma
    );
    println!("pacing:       {}", m.pacing);
    println!("breaks:       {}", m.continuity_breaks);
    println!("gap steps:    {:?}", m.gap_steps);
    println!("crossfades:   {}", path.crossfades.len());
    if let (Some(first), Some(last)) = (path.frames.first(), path.frames.last()) {
        println!(
            "first frame:  {:.1} Ma at ({:.2}, {:.2})",
            first.time_ma, first.target.lon, first.target.lat
        );
        println!(
            "last frame:   {:.1} Ma at ({:.2}, {:.2})",
            last.time_ma, last.target.lon, last.target.lat
        );
    }
    Ok(())
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<()> {
    println!("{}", args.preset.config().to_json_string()?);
    Ok(())
}
