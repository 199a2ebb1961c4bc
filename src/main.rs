//! corr_heatmap - command-line entry point
//!
//! Loads a CSV file, computes the correlation matrix of its numeric columns
//! and renders it as an annotated heatmap (saved to `corr_mat.png` by default).

use anyhow::Context;
use clap::Parser;
use corr_heatmap::heatmap::{HeadlessViewer, HeatmapRenderer, SystemViewer, Viewer};
use corr_heatmap::palettes::palette_registry;
use corr_heatmap::pipeline::{self, PipelineOptions};
use corr_heatmap::properties::PropertyReader;
use corr_heatmap::{render_or_log, DatasetSource, HeatmapConfig};
use std::path::PathBuf;

#[cfg(feature = "jemalloc")]
use tikv_jemallocator::Jemalloc;

#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "corr_heatmap", version, about = "Render a correlation heatmap from a CSV file")]
struct Args {
    /// CSV file to read
    #[arg(required_unless_present = "list_properties")]
    input: Option<String>,

    /// Columns to use, comma separated (names the columns when --no-header is set)
    #[arg(short, long, value_delimiter = ',')]
    columns: Vec<String>,

    /// The file has no header row
    #[arg(long)]
    no_header: bool,

    /// Correlation coefficient: pearson, spearman or kendall
    #[arg(short, long)]
    method: Option<String>,

    /// Output image (format from extension)
    #[arg(short, long, default_value = pipeline::DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Don't write an image file
    #[arg(long, conflicts_with = "output")]
    no_save: bool,

    /// JSON object of property values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Property override, name=value (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE")]
    overrides: Vec<String>,

    /// Don't open the image after rendering
    #[arg(long)]
    no_display: bool,

    /// Log rendering failures and exit successfully
    #[arg(long)]
    lenient: bool,

    /// Print the available properties and their defaults, then exit
    #[arg(long)]
    list_properties: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(args: Args) -> anyhow::Result<()> {
    if args.list_properties {
        print_properties();
        return Ok(());
    }

    let input = args.input.clone().context("missing INPUT")?;
    log::info!("corr_heatmap v{}", env!("CARGO_PKG_VERSION"));

    let props = load_properties(&args)?;
    let config = HeatmapConfig::from_properties(&props);

    let source = DatasetSource::new(input.clone())
        .columns(args.columns.iter().map(|c| c.trim().to_string()))
        .has_header(!args.no_header);

    let options = PipelineOptions {
        source,
        output: (!args.no_save).then(|| args.output.clone()),
        config,
    };

    let viewer: Box<dyn Viewer> = if args.no_display {
        Box::new(HeadlessViewer)
    } else {
        Box::new(SystemViewer::new())
    };

    if args.lenient {
        // Data problems still fail; only rendering is log-and-continue
        let request = pipeline::build_request(&options)?;
        let renderer = HeatmapRenderer::new(options.config.clone())?;
        render_or_log(&renderer, &request, viewer.as_ref());
        return Ok(());
    }

    let outcome = pipeline::run(&options, viewer.as_ref())
        .with_context(|| format!("could not build heatmap for '{}'", input))?;

    match &outcome.saved_to {
        Some(path) => log::info!("✓ Heatmap written to {}", path.display()),
        None => log::info!("✓ Heatmap rendered (not saved)"),
    }
    Ok(())
}

/// Properties from --config, then --set and --method on top
fn load_properties(args: &Args) -> anyhow::Result<PropertyReader> {
    let mut props = match &args.config {
        Some(path) => PropertyReader::from_json_file(path)
            .with_context(|| format!("could not load config '{}'", path.display()))?,
        None => PropertyReader::new(),
    };

    let mut overrides = PropertyReader::new();
    for assignment in &args.overrides {
        let (name, value) = PropertyReader::parse_assignment(assignment)?;
        overrides.set(name, value);
    }
    if let Some(method) = &args.method {
        overrides.set("correlation.method", method.clone());
    }

    props.merge(overrides);
    Ok(props)
}

fn print_properties() {
    for def in corr_heatmap::properties::registry().definitions() {
        let values = def
            .valid_values
            .as_ref()
            .map(|v| format!(" [{}]", v.join(", ")))
            .unwrap_or_default();
        println!(
            "{:<22} default: {:<10}{}  {}",
            def.name,
            format!("'{}'", def.default_value),
            values,
            def.description
        );
    }

    let palettes = palette_registry();
    println!();
    println!("Diverging palettes:  {}", palettes.diverging_palettes().join(", "));
    println!("Sequential palettes: {}", palettes.sequential_palettes().join(", "));
}
