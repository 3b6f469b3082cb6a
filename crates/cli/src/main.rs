use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use salesmap_core::color::ColorOrder;
use salesmap_core::config::load_config;
use salesmap_core::{export, run, DataSource};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "salesmap-cli", about = "Video game sales treemap generator")]
struct Args {
    /// Dataset URL or local JSON file (defaults to the configured data URL)
    source: Option<String>,
    /// Output HTML page path
    #[arg(short, long, default_value = "treemap.html")]
    out: PathBuf,
    /// JSON render config
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Write the computed layout as JSON
    #[arg(long)]
    json: Option<PathBuf>,
    /// Write one CSV row per tile
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Write a PDF sales report
    #[arg(long)]
    pdf: Option<PathBuf>,
    #[arg(long)]
    width: Option<f64>,
    #[arg(long)]
    height: Option<f64>,
    /// Viewport width the legend is centred against
    #[arg(long)]
    viewport_width: Option<f64>,
    /// Assign colors in sorted category order instead of first-seen order
    #[arg(long)]
    sorted_colors: bool,
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = generate(args) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn generate(args: Args) -> anyhow::Result<()> {
    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(w) = args.width {
        cfg.width = w;
    }
    if let Some(h) = args.height {
        cfg.height = h;
    }
    if let Some(v) = args.viewport_width {
        cfg.viewport_width = v;
    }
    if args.sorted_colors {
        cfg.color_order = ColorOrder::Sorted;
    }

    let source = DataSource::parse(args.source.as_deref().unwrap_or(&cfg.data_url));
    let rendered = run(&source, &cfg);
    if let Some(d) = rendered.diagnostics.first() {
        anyhow::bail!("{d}");
    }

    std::fs::write(&args.out, rendered.page.to_html())
        .with_context(|| format!("writing {}", args.out.display()))?;

    if let (Some(tree), Some(lay)) = (&rendered.hierarchy, &rendered.layout) {
        if let Some(path) = args.json {
            let json = export::to_json(tree, lay);
            std::fs::write(&path, serde_json::to_string_pretty(&json)?)
                .with_context(|| format!("writing {}", path.display()))?;
        }
        if let Some(path) = args.csv {
            let file = std::fs::File::create(&path)
                .with_context(|| format!("creating {}", path.display()))?;
            export::to_csv(tree, lay, file)?;
        }
        if let Some(path) = args.pdf {
            export::to_pdf(tree, &cfg.title, &path)?;
        }
        println!(
            "Rendered {} tiles in {} groups, total {} -> {}",
            lay.leaves().len(),
            tree.top_level().count(),
            salesmap_core::human::format_value(tree.total()),
            args.out.display()
        );
    }
    Ok(())
}
