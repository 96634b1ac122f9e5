use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "storyreel", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a storyboard into a WebM video (requires `ffmpeg` on PATH).
    Export(ExportArgs),
    /// Report which scenes are renderable.
    Check(CheckArgs),
    /// Turn a planner JSON response into a storyboard file.
    PlanImport(PlanImportArgs),
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input storyboard JSON.
    #[arg(long)]
    storyboard: PathBuf,

    /// Export settings TOML.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save here instead of the downloads directory.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Never prompt for a destination.
    #[arg(long, default_value_t = false)]
    no_picker: bool,

    /// Pace frames in wall-clock time.
    #[arg(long, default_value_t = false)]
    realtime: bool,

    /// Override the gap between scenes, in milliseconds.
    #[arg(long)]
    gap_ms: Option<u64>,

    /// Override the suggested output file name.
    #[arg(long)]
    file_name: Option<String>,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input storyboard JSON.
    #[arg(long)]
    storyboard: PathBuf,
}

#[derive(Parser, Debug)]
struct PlanImportArgs {
    /// Planner response JSON.
    #[arg(long)]
    response: PathBuf,

    /// Output storyboard JSON.
    #[arg(long)]
    out: PathBuf,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "storyreel=info",
        1 => "storyreel=debug",
        _ => "storyreel=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Export(args) => cmd_export(args).await,
        Command::Check(args) => cmd_check(args),
        Command::PlanImport(args) => cmd_plan_import(args),
    }
}

fn load_config(args: &ExportArgs) -> anyhow::Result<storyreel::ExportConfig> {
    let mut cfg = match &args.config {
        Some(p) => storyreel::ExportConfig::from_path(p)?,
        None => storyreel::ExportConfig {
            assets_root: storyboard_dir(&args.storyboard),
            ..storyreel::ExportConfig::default()
        },
    };
    if args.realtime {
        cfg.pacing = storyreel::Pacing::Realtime;
    }
    if let Some(gap) = args.gap_ms {
        cfg.scene_gap_ms = gap;
    }
    if let Some(name) = &args.file_name {
        cfg.file_name = name.clone();
    }
    cfg.validate()?;
    Ok(cfg)
}

fn storyboard_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

async fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let board = storyreel::Storyboard::from_path(&args.storyboard)?;
    let cfg = load_config(&args)?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received; stopping after the current scene");
            on_signal.cancel();
        }
    });

    let fallback = match &args.out_dir {
        Some(dir) => storyreel::AutoDownload::new(dir),
        None => storyreel::AutoDownload::to_downloads(),
    };
    let picker_dir = fallback.dir().to_path_buf();
    let picker: Box<dyn storyreel::PersistenceBackend> = if args.no_picker {
        Box::new(fallback)
    } else {
        Box::new(storyreel::PreferredPersistence::new(
            storyreel::InteractivePicker::new(picker_dir),
            fallback,
        ))
    };

    let total = board.len();
    let observer = Arc::new(move |e: &storyreel::ExportEvent| {
        if let storyreel::ExportEvent::SceneStarted { index, id } = e {
            tracing::info!("scene {}/{} ({id})", index + 1, total);
        }
    });

    let backend = storyreel::MediaBackend::ffmpeg(&cfg);
    let report = storyreel::export_video(
        &board.scenes,
        cfg,
        backend,
        picker.as_ref(),
        cancel,
        observer,
    )
    .await
    .context("export failed")?;

    eprintln!(
        "rendered {} of {} scenes, audio {:.3}s, video {} frames ({:.3}s)",
        report.rendered_count(),
        report.scenes.len(),
        report.audio_duration().as_secs_f64(),
        report.video_frames,
        report.video_duration().as_secs_f64(),
    );
    match report.outcome {
        storyreel::ExportOutcome::Saved(path) => println!("{}", path.display()),
        storyreel::ExportOutcome::Dismissed => eprintln!("save dismissed; nothing written"),
        storyreel::ExportOutcome::Cancelled => eprintln!("export cancelled; nothing written"),
    }
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let board = storyreel::Storyboard::from_path(&args.storyboard)?;
    let mut renderable = 0usize;
    for scene in &board.scenes {
        let missing = storyreel::missing_assets(scene);
        if missing.is_empty() {
            renderable += 1;
            println!("{:>3}  {}  ok  {}", scene.frame_number, scene.id, scene.visual_type);
        } else {
            let names: Vec<String> = missing.iter().map(ToString::to_string).collect();
            println!(
                "{:>3}  {}  missing {}",
                scene.frame_number,
                scene.id,
                names.join(", ")
            );
        }
        if let Some(err) = &scene.error {
            println!("     last error: {err}");
        }
    }
    println!("{renderable} of {} scenes renderable", board.len());
    if renderable == 0 {
        anyhow::bail!("no renderable scenes in '{}'", args.storyboard.display());
    }
    Ok(())
}

fn cmd_plan_import(args: PlanImportArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.response)
        .with_context(|| format!("read planner response '{}'", args.response.display()))?;
    let items = storyreel::parse_plan_response(&text)?;
    let board = storyreel::Storyboard::from_plan(items);
    board.save(&args.out)?;
    println!("{} scenes written to {}", board.len(), args.out.display());
    Ok(())
}
