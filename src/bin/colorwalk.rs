use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "colorwalk", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose a 3x3 collage and write it to disk.
    Compose(ComposeArgs),
    /// Print the built-in layout presets as JSON.
    Presets,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PresetArg {
    Classic,
    Framed,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Png,
    Jpeg,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Output image path.
    #[arg(long)]
    out: PathBuf,

    /// Slot assignment `N=PATH` (0-based, row-major). Repeatable; overrides `--grid`.
    #[arg(long = "slot", value_parser = parse_slot)]
    slots: Vec<(usize, PathBuf)>,

    /// Grid JSON `{ "slots": [...] }`; paths are relative to the JSON file.
    #[arg(long)]
    grid: Option<PathBuf>,

    /// Built-in layout preset.
    #[arg(long, value_enum, default_value_t = PresetArg::Classic)]
    preset: PresetArg,

    /// Layout JSON; replaces the preset.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format. Defaults to the `--out` extension, then PNG.
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = 90)]
    quality: u8,

    /// Decode all slots ahead of drawing on a rayon pool.
    #[arg(long, default_value_t = false)]
    parallel_decode: bool,

    /// Override rayon worker threads (parallel decode only).
    #[arg(long)]
    threads: Option<usize>,
}

fn parse_slot(s: &str) -> Result<(usize, PathBuf), String> {
    let (idx, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected N=PATH, got '{s}'"))?;
    let idx: usize = idx
        .trim()
        .parse()
        .map_err(|e| format!("invalid slot index '{idx}': {e}"))?;
    if idx >= colorwalk::GRID_CELLS {
        return Err(format!(
            "slot index {idx} out of range (0..{})",
            colorwalk::GRID_CELLS
        ));
    }
    if path.is_empty() {
        return Err("slot path is empty".to_string());
    }
    Ok((idx, PathBuf::from(path)))
}

fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::Presets => cmd_presets(),
    }
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let layout = match &args.config {
        Some(path) => colorwalk::LayoutConfig::from_path(path)
            .with_context(|| format!("load layout '{}'", path.display()))?,
        None => match args.preset {
            PresetArg::Classic => colorwalk::LayoutPreset::Classic,
            PresetArg::Framed => colorwalk::LayoutPreset::Framed,
        }
        .config(),
    };

    let mut grid = match &args.grid {
        Some(path) => colorwalk::load_grid(path)
            .with_context(|| format!("load grid '{}'", path.display()))?,
        None => colorwalk::Grid::new(),
    };
    for (idx, path) in &args.slots {
        let src = colorwalk::ImageSource::from_path(path)
            .with_context(|| format!("read slot {idx} image '{}'", path.display()))?;
        grid = grid.with_slot(*idx, src)?;
    }

    let format = match args.format {
        Some(FormatArg::Png) => colorwalk::ExportFormat::Png,
        Some(FormatArg::Jpeg) => colorwalk::ExportFormat::Jpeg,
        None => colorwalk::ExportFormat::from_path(&args.out).unwrap_or_default(),
    };
    let settings = colorwalk::ExportSettings {
        format,
        quality: args.quality,
    };
    settings.validate()?;

    let compositor = colorwalk::Compositor::new().with_opts(colorwalk::ComposeOpts {
        parallel_decode: args.parallel_decode,
        threads: args.threads,
        cancel: None,
    });
    let mut report = |u: &colorwalk::ProgressUpdate| {
        eprintln!("[{:>3}%] cell {}: {}", u.percent, u.cell, u.outcome);
    };
    let out = compositor.compose(&grid, &layout, &mut report)?;
    let failed = out.failed_cells();
    if !failed.is_empty() {
        eprintln!("warning: cells {failed:?} could not be drawn");
    }

    let image = colorwalk::export(&out.frame, &settings)?;
    write_output(&image, &args.out)?;
    eprintln!(
        "wrote {} ({}x{}, {} bytes)",
        args.out.display(),
        image.width,
        image.height,
        image.bytes.len()
    );
    Ok(())
}

fn write_output(image: &colorwalk::ExportedImage, out: &Path) -> anyhow::Result<()> {
    image
        .write_to(out)
        .with_context(|| format!("write output '{}'", out.display()))
}

fn cmd_presets() -> anyhow::Result<()> {
    let presets: serde_json::Map<String, serde_json::Value> = colorwalk::LayoutPreset::ALL
        .iter()
        .map(|p| {
            let cfg = p.config();
            let value = serde_json::json!({
                "canvas_extent": cfg.canvas_extent(),
                "layout": cfg,
            });
            (p.name().to_string(), value)
        })
        .collect();
    let text = serde_json::to_string_pretty(&presets).context("serialize presets")?;
    println!("{text}");
    Ok(())
}
