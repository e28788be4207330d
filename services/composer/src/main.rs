//! Composite batch runner.
//!
//! Reads one ABI scene (an L2 MCMIP file, or a synthetic scene), produces
//! the configured false-color composites and writes each as a PNG with a
//! JSON georeference sidecar.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use abi_reader::{synthetic_scene, AbiFileName, BandSource, MemorySource};
use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser};
use compositor::{preset, CompositeRecipe};
use pipeline::{resolve_recipes, Pipeline, PipelineConfig};
use renderer::{file_stem, PngSink};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_OUTPUT_DIR: &str = "./composites";

#[derive(Parser, Debug)]
#[command(name = "composer")]
#[command(about = "Produce GOES ABI false-color composites")]
#[command(group(ArgGroup::new("scene").required(true).args(["input", "synthetic"])))]
struct Args {
    /// ABI L2 MCMIP (or single-band CMIP) NetCDF file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Use a synthetic GOES-16 CONUS scene of the given size, e.g. 300x500
    #[arg(long, value_name = "ROWSxCOLS", value_parser = parse_dimensions)]
    synthetic: Option<(usize, usize)>,

    /// Recipe configuration file
    #[arg(short, long, env = "COMPOSER_CONFIG")]
    config: Option<PathBuf>,

    /// Only produce these recipes (preset or configured names); repeatable
    #[arg(short, long = "recipe", value_name = "NAME")]
    recipes: Vec<String>,

    /// Output directory (overrides config and COMPOSER_OUTPUT_DIR)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Evaluate recipes one at a time
    #[arg(long)]
    sequential: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting composer");

    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("Failed to load recipe config from {:?}", path))?,
        None => PipelineConfig::default(),
    }
    .with_env_overrides()
    .context("Invalid environment override")?;

    if args.sequential {
        config.parallel = false;
    }
    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

    let configured = resolve_recipes(&config)?;
    let recipes = select_recipes(configured, &args.recipes)?;
    check_output_names(&recipes)?;
    info!(
        recipes = ?recipes.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
        parallel = config.parallel,
        output_dir = %output_dir.display(),
        "Loaded configuration"
    );

    let source = match (&args.input, args.synthetic) {
        (Some(path), _) => open_input(path)?,
        (None, Some((rows, cols))) => synthetic_scene(rows, cols)
            .with_context(|| format!("Failed to build {}x{} synthetic scene", rows, cols))?,
        (None, None) => bail!("either --input or --synthetic is required"),
    };
    info!(bands = ?source.available_bands(), "Scene ready");

    let sink = PngSink::new(&output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", output_dir))?;
    let report = Pipeline::from_config(&config)
        .run(&source, &recipes, &sink)
        .context("Composite batch aborted")?;

    for (recipe, err) in report.failures() {
        error!(recipe = %recipe, error = %err, "Composite failed");
    }
    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        "Done"
    );

    Ok(if report.is_complete_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn open_input(path: &Path) -> Result<MemorySource> {
    let file_name = path.file_name().and_then(|s| s.to_str()).unwrap_or_default();
    match AbiFileName::parse(file_name) {
        Ok(name) => info!(
            product = %name.product,
            scene = %name.scene,
            platform = %name.platform,
            start = %name.start,
            "Opening ABI file"
        ),
        Err(e) => warn!(error = %e, "File name does not follow ABI naming"),
    }
    read_scene(path)
}

#[cfg(feature = "netcdf")]
fn read_scene(path: &Path) -> Result<MemorySource> {
    abi_reader::native::open_mcmip(path).with_context(|| format!("Failed to read {:?}", path))
}

#[cfg(not(feature = "netcdf"))]
fn read_scene(path: &Path) -> Result<MemorySource> {
    bail!(
        "cannot read {:?}: composer was built without NetCDF support (rebuild with --features netcdf)",
        path
    )
}

/// Parse `ROWSxCOLS`.
fn parse_dimensions(s: &str) -> Result<(usize, usize), String> {
    let (rows, cols) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected ROWSxCOLS, got '{}'", s))?;
    let rows: usize = rows.trim().parse().map_err(|_| format!("invalid rows '{}'", rows))?;
    let cols: usize = cols.trim().parse().map_err(|_| format!("invalid cols '{}'", cols))?;
    if rows == 0 || cols == 0 {
        return Err("dimensions must be positive".to_string());
    }
    Ok((rows, cols))
}

/// Restrict configured recipes to the requested names, in request order.
///
/// Names not in the configuration fall back to the built-in presets.
fn select_recipes(
    configured: Vec<CompositeRecipe>,
    requested: &[String],
) -> Result<Vec<CompositeRecipe>> {
    if requested.is_empty() {
        return Ok(configured);
    }

    requested
        .iter()
        .map(|name| {
            configured
                .iter()
                .find(|r| r.name == *name)
                .cloned()
                .or_else(|| preset(name))
                .with_context(|| format!("Unknown recipe '{}'", name))
        })
        .collect()
}

/// Fail when two recipes would write the same output files.
fn check_output_names(recipes: &[CompositeRecipe]) -> Result<()> {
    let mut stems = HashMap::new();
    for recipe in recipes {
        if let Some(previous) = stems.insert(file_stem(&recipe.name), recipe.name.as_str()) {
            bail!(
                "recipes '{}' and '{}' would write the same output files",
                previous,
                recipe.name
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use compositor::presets::{airmass, dust};

    #[test]
    fn test_parse_dimensions() {
        assert_eq!(parse_dimensions("300x500"), Ok((300, 500)));
        assert_eq!(parse_dimensions("2X3"), Ok((2, 3)));
        assert!(parse_dimensions("300").is_err());
        assert!(parse_dimensions("0x5").is_err());
        assert!(parse_dimensions("ax5").is_err());
    }

    #[test]
    fn test_select_recipes() {
        let configured = vec![dust(), airmass()];

        let all = select_recipes(configured.clone(), &[]).unwrap();
        assert_eq!(all.len(), 2);

        let picked =
            select_recipes(configured.clone(), &["airmass".to_string(), "true-color".to_string()])
                .unwrap();
        assert_eq!(picked[0].name, "airmass");
        assert_eq!(picked[1].name, "true_color");

        assert!(select_recipes(configured, &["sandwich".to_string()]).is_err());
    }

    #[test]
    fn test_check_output_names() {
        assert!(check_output_names(&[dust(), airmass()]).is_ok());

        let mut spaced = dust();
        spaced.name = "dust rgb".to_string();
        let mut underscored = airmass();
        underscored.name = "dust_rgb".to_string();
        assert!(check_output_names(&[spaced, underscored]).is_err());

        assert!(check_output_names(&[dust(), dust()]).is_err());
    }

    #[test]
    fn test_args_require_a_scene() {
        assert!(Args::try_parse_from(["composer"]).is_err());
        assert!(Args::try_parse_from(["composer", "--input", "a.nc", "--synthetic", "2x2"]).is_err());

        let args = Args::try_parse_from([
            "composer",
            "--synthetic",
            "20x30",
            "-r",
            "dust",
            "-r",
            "airmass",
            "--sequential",
        ])
        .unwrap();
        assert_eq!(args.synthetic, Some((20, 30)));
        assert_eq!(args.recipes, vec!["dust", "airmass"]);
        assert!(args.sequential);
    }
}
