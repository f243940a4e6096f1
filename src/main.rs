// include-walker - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading and logging initialisation (debug mode support)
// 3. Building the include forest from the build log
// 4. Rendering the cycle report and tree, optional JSON export

use include_walker::{app, core, platform, ui, util};

use clap::Parser;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use platform::config::{AppConfig, ColorMode};
use util::error::{ConfigError, IncludeWalkerError, Result};

/// include-walker - include dependency trees from MSVC /showIncludes logs.
///
/// Reconstructs per-project, per-translation-unit include trees from a
/// Visual Studio build log, reports cyclic includes and optionally
/// highlights headers matching a search string.
#[derive(Parser, Debug)]
#[command(name = "include-walker", version, about)]
struct Cli {
    /// Build log captured with /showIncludes.
    input: PathBuf,

    /// Hide standard library and Windows SDK headers.
    #[arg(long = "no-std")]
    no_std: bool,

    /// Expand only the branches that lead to cycles or search matches.
    #[arg(long = "auto-expand")]
    auto_expand: bool,

    /// Strip the common path prefix of each translation unit (default).
    #[arg(long, overrides_with = "no_simplify")]
    simplify: bool,

    /// Print header paths exactly as they appear in the log.
    #[arg(long = "no-simplify", overrides_with = "simplify")]
    no_simplify: bool,

    /// Highlight headers whose path contains this substring.
    #[arg(long, value_name = "SUBSTRING")]
    find: Option<String>,

    /// Also write the forest as JSON to this file.
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// When to colour the output.
    #[arg(long, value_enum, value_name = "WHEN")]
    color: Option<ColorMode>,

    /// Read settings from this config file instead of the platform default.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

impl Cli {
    /// CLI flag > config file > built-in default.
    fn simplify_paths(&self, config: &AppConfig) -> bool {
        if self.no_simplify {
            false
        } else if self.simplify {
            true
        } else {
            config.simplify_paths
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    // Config first: it may set the log level.
    let config_path = match cli.config {
        Some(ref path) => {
            if let Err(e) = std::fs::metadata(path) {
                return Err(ConfigError::Io {
                    path: path.clone(),
                    source: e,
                }
                .into());
            }
            path.clone()
        }
        None => platform::config::PlatformPaths::resolve().config_file(),
    };
    let (config, config_warnings) = platform::config::load_config(&config_path);

    util::logging::init(cli.debug, config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        config = %config_path.display(),
        "include-walker starting"
    );
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    let normalizer = core::normalize::NameNormalizer::from_case_insensitive(
        config.case_insensitive_paths,
    );
    let forest_options = core::model::ForestOptions::new(normalizer)
        .with_simplify_paths(cli.simplify_paths(&config))
        .with_search(cli.find.as_deref().unwrap_or_default());
    let scan_options = app::scan::ScanOptions {
        ignore_std: cli.no_std || config.ignore_std,
        std_filter: core::classifier::StdIncludeFilter::new(&config.std_include_patterns)?,
    };

    let (forest, summary) = app::scan::build_forest(&cli.input, forest_options, &scan_options)?;
    tracing::debug!(?summary, "Scan summary");

    let render_options = ui::tree_view::RenderOptions {
        auto_expand: cli.auto_expand || config.auto_expand,
        color: cli.color.unwrap_or(config.color).enabled(),
    };
    let cycles = core::report::collect_cycles(&forest);

    write_report(&forest, &cycles, &render_options).map_err(|e| IncludeWalkerError::Io {
        path: PathBuf::from("<stdout>"),
        operation: "write report",
        source: e,
    })?;

    if let Some(ref json_path) = cli.json {
        let file = std::fs::File::create(json_path).map_err(|e| IncludeWalkerError::Io {
            path: json_path.clone(),
            operation: "create JSON export",
            source: e,
        })?;
        core::export::export_json(&forest, BufWriter::new(file), json_path)?;
    }

    Ok(())
}

/// Cycle report first, then the tree, both on stdout.
fn write_report(
    forest: &core::model::DependencyForest,
    cycles: &[core::report::CycleReport],
    options: &ui::tree_view::RenderOptions,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    ui::tree_view::render_cycle_report(cycles, options, &mut out)?;
    ui::tree_view::render_forest(forest, options, &mut out)?;
    out.flush()
}
