use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "scrollreel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a gesture script and write canvas captures plus a JSON trace.
    Replay(ReplayArgs),
    /// Print resolved trigger ranges for a page.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    /// Page config JSON (must include a layout).
    #[arg(long)]
    page: PathBuf,

    /// Replay script JSON.
    #[arg(long)]
    script: PathBuf,

    /// Output directory for PNGs and `trace.json`.
    #[arg(long)]
    out: PathBuf,

    /// Frame image root; defaults to the page file's directory.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Override the script's frame rate.
    #[arg(long)]
    fps: Option<f64>,

    /// Override rayon worker threads for frame decoding.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Page config JSON (must include a layout).
    #[arg(long)]
    page: PathBuf,

    /// Also report trigger progress at this scroll offset.
    #[arg(long)]
    at: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Replay(args) => cmd_replay(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn page_dir(page: &Path) -> &Path {
    page.parent().unwrap_or_else(|| Path::new("."))
}

fn cmd_replay(args: ReplayArgs) -> anyhow::Result<()> {
    let config = scrollreel::PageConfig::from_path(&args.page)?;
    let mut script = scrollreel::ReplayScript::from_path(&args.script)?;
    if let Some(fps) = args.fps {
        script.fps = fps;
    }
    let assets = args
        .assets
        .clone()
        .unwrap_or_else(|| page_dir(&args.page).to_path_buf());

    let mut stage = scrollreel::stage_from_config(&config, &assets, args.threads)?;
    let trace = scrollreel::replay(&mut stage, &script)?;

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;

    for capture in &trace.captures {
        for captured in &capture.surfaces {
            let surface = &captured.surface;
            if surface.width() == 0 || surface.height() == 0 {
                continue;
            }
            let path = args
                .out
                .join(format!("{}_{}.png", capture.name, captured.effect));
            surface.save_png(&path)?;
            eprintln!("wrote {}", path.display());
        }
    }

    let trace_path = args.out.join("trace.json");
    let json = serde_json::to_string_pretty(&trace).context("serialize trace")?;
    std::fs::write(&trace_path, json)
        .with_context(|| format!("write trace '{}'", trace_path.display()))?;
    eprintln!("wrote {}", trace_path.display());
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let config = scrollreel::PageConfig::from_path(&args.page)?;
    let mut stage = scrollreel::stage_from_config(&config, page_dir(&args.page), Some(1))?;
    let mut now = std::time::Duration::ZERO;
    stage.frame(now);
    if let Some(at) = args.at {
        stage.scroll_to(at, true);
        now += std::time::Duration::from_millis(16);
        stage.frame(now);
    }

    let snap = stage.snapshot();
    println!(
        "boot: {:?}  offset: {:.1}  scroll height: {:.1}",
        snap.boot, snap.offset, snap.scroll_height
    );
    for t in &snap.triggers {
        match (args.at, t.raw_progress) {
            (Some(_), Some(p)) => println!(
                "{:<12} #{:<3} {:>9.1} .. {:<9.1} progress {:.3}{}",
                t.owner,
                t.id.0,
                t.start,
                t.end,
                p,
                if t.active { " (active)" } else { "" }
            ),
            _ => println!("{:<12} #{:<3} {:>9.1} .. {:<9.1}", t.owner, t.id.0, t.start, t.end),
        }
    }
    Ok(())
}
