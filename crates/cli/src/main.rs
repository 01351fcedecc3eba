mod config;
mod pretty;
mod render;

use config::Config;

use std::fmt::Display;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use colored::{control::set_override, Colorize};
use evaldash_core::{
    DashboardCache, DashboardError, DashboardSource, EnrichedResult, FileSource, FilterState,
    HttpSource, LoadState, ModelType,
};
use is_terminal::IsTerminal;
use serde::Serialize;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

use crate::render::{RenderConfig, View};

const LONG_ABOUT: &str = r##"
evaldash shows pre-computed evaluation results for the structure, discount
and rules extraction models next to the labeled test cases they were run on.

VIEWS:
  pm    Labeled cards built from each output (default)
  dev   Expected and actual output as raw, colored JSON

EXAMPLES:
  evaldash                                  Rules results, summary table
  evaldash --model discount --status FAIL   Failing discount results
  evaldash --category ADVERSARIAL --expand-all --view dev
  evaldash --all-models --json              Every row as JSON
  evaldash --metrics --specs                Backend metrics and LLM specs
  evaldash --run                            Latest evaluation run
  evaldash --file saved.json                Read a saved dashboard response

CONFIGURATION:
  Settings come from CLI flags, then environment, then the config file
  (see --config-path), then defaults.

  EVALDASH_API_BASE_URL / API_BASE_URL   API base URL
  EVALDASH_TIMEOUT                       Request timeout in seconds
  EVALDASH_VIEW                          Default view (pm or dev)
  NO_COLOR / EVALDASH_NO_COLOR           Disable colored output
"##;

#[derive(Parser)]
#[command(name = "evaldash")]
#[command(version, about = "Inspect LLM extraction evaluation results", long_about = LONG_ABOUT)]
struct Cli {
    /// Result set to show
    #[arg(long, short = 'm', value_name = "MODEL", default_value = "rules")]
    model: ModelType,

    /// Show results of every model type (structure, discount, rules)
    #[arg(long, conflicts_with = "model")]
    all_models: bool,

    /// How expanded rows present model outputs
    #[arg(long, value_enum)]
    view: Option<View>,

    /// Only show test cases of this category (e.g. ADVERSARIAL)
    #[arg(long, value_name = "CATEGORY")]
    category: Option<String>,

    /// Only show test cases written in this style (e.g. CASUAL)
    #[arg(long, value_name = "STYLE")]
    style: Option<String>,

    /// Only show results with this status (PASS or FAIL)
    #[arg(long, value_name = "STATUS")]
    status: Option<String>,

    /// Print the detail card of a row below the table (repeatable)
    ///
    /// Matches a result id or a test case id.
    #[arg(long, short = 'e', value_name = "ID")]
    expand: Vec<String>,

    /// Print detail cards for every shown row
    #[arg(long, short = 'E')]
    expand_all: bool,

    /// Show backend metrics per model type
    #[arg(long)]
    metrics: bool,

    /// Show which LLM produced each model type's outputs
    #[arg(long)]
    specs: bool,

    /// Show the latest evaluation run instead of the dashboard
    #[arg(long, conflicts_with_all = ["metrics", "specs", "all_models"])]
    run: bool,

    /// Output rows as JSON (for scripting/piping)
    #[arg(long, short = 'j')]
    json: bool,

    /// Read a saved response from a file instead of the API
    #[arg(long, short = 'f', value_name = "PATH")]
    file: Option<PathBuf>,

    /// API base URL
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Disable colored output
    #[arg(long, short = 'C')]
    no_color: bool,

    /// Enable verbose logging (use multiple times for more detail)
    ///
    /// -v shows debug messages, -vv shows trace messages.
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Show config file path
    #[arg(long)]
    config_path: bool,

    /// Generate default config file (see --config-path for location)
    #[arg(long)]
    config_init: bool,
}

/// Report an error and exit with status 1.
fn fail(message: impl Display) -> ! {
    eprintln!("{}: {}", "error".red().bold(), message);
    std::process::exit(1);
}

fn main() {
    let cli = Cli::parse();

    if cli.config_path {
        match Config::path() {
            Some(path) => println!("{}", path.display()),
            None => fail("Cannot determine config directory"),
        }
        return;
    }

    if cli.config_init {
        match config::init_config() {
            Ok(path) => println!("Created config file: {}", path.display()),
            Err(e) => fail(e),
        }
        return;
    }

    let level = match cli.verbose {
        0 => LevelFilter::OFF,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    if level != LevelFilter::OFF {
        let filter = EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy();
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    // Precedence: CLI args > Environment vars > Config file > Defaults
    let file_config = Config::load();

    if let Some(path) = Config::path() {
        if path.exists() {
            tracing::debug!("Loaded config from: {}", path.display());
        } else {
            tracing::trace!("No config file at: {}", path.display());
        }
    }

    let api_base_url = if let Some(url) = cli.api_url.clone() {
        tracing::debug!("api_base_url = {} (from CLI)", url);
        url
    } else {
        let url = file_config.api_base_url();
        let source = match Config::api_base_url_env() {
            Some(name) => format!("env {}", name),
            None if file_config.api_base_url.is_some() => "config file".to_string(),
            None => "default".to_string(),
        };
        tracing::debug!("api_base_url = {} (from {})", url, source);
        url
    };

    let timeout = if let Some(t) = cli.timeout {
        tracing::debug!("timeout = {}s (from CLI)", t);
        t
    } else {
        let t = file_config.timeout();
        let source = if std::env::var("EVALDASH_TIMEOUT").is_ok() {
            "env EVALDASH_TIMEOUT"
        } else if file_config.timeout.is_some() {
            "config file"
        } else {
            "default"
        };
        tracing::debug!("timeout = {}s (from {})", t, source);
        t
    };

    let view = if let Some(v) = cli.view {
        tracing::debug!("view = {} (from CLI)", v);
        v
    } else {
        let v = file_config.view();
        tracing::debug!("view = {} (from env or config)", v);
        v
    };

    let no_color = if cli.no_color {
        tracing::debug!("no_color = true (from CLI)");
        true
    } else if file_config.no_color() {
        tracing::debug!("no_color = true (from env or config)");
        true
    } else {
        !std::io::stdout().is_terminal()
    };

    if no_color {
        set_override(false);
    }

    let render_config = RenderConfig {
        color: !no_color,
        view,
        ..RenderConfig::default()
    };

    let filter = FilterState::from_params(
        cli.category.as_deref().unwrap_or_default(),
        cli.style.as_deref().unwrap_or_default(),
        cli.status.as_deref().unwrap_or_default(),
    )
    .unwrap_or_else(|e| fail(e));
    tracing::debug!("filter: {}", filter);

    match &cli.file {
        Some(path) => show(&cli, &DashboardCache::new(FileSource::new(path)), &filter, &render_config),
        None => {
            let source = HttpSource::with_timeout(api_base_url, Duration::from_secs(timeout));
            show(&cli, &DashboardCache::new(source), &filter, &render_config)
        }
    }
}

/// Unwrap a fetch outcome or exit with its user-facing message.
fn loaded<T>(result: Result<T, DashboardError>) -> T {
    match LoadState::from_result(result) {
        LoadState::Ready(value) => value,
        LoadState::Failed(message) => fail(message),
        LoadState::Loading => fail("evaluation data did not load"),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(format!("cannot encode output: {}", e)),
    }
}

fn show<S: DashboardSource>(
    cli: &Cli,
    cache: &DashboardCache<S>,
    filter: &FilterState,
    render_config: &RenderConfig,
) {
    if cli.run {
        show_run(cli, cache, filter, render_config);
        return;
    }

    let data = loaded(cache.get_or_load());

    if cli.metrics || cli.specs {
        if cli.json {
            print_json(&serde_json::json!({
                "metrics": cli.metrics.then_some(&data.metrics),
                "llmSpecs": cli.specs.then_some(&data.llm_specs),
            }));
            return;
        }
        if cli.metrics {
            print!("{}", render::metrics_table(&data.metrics, render_config));
        }
        if cli.metrics && cli.specs {
            println!();
        }
        if cli.specs {
            print!("{}", render::specs_table(&data.llm_specs, render_config));
        }
        return;
    }

    let (title, rows) = if cli.all_models {
        ("All models", data.enrich_all())
    } else {
        (cli.model.label(), data.enrich_results(cli.model))
    };
    let rows: Vec<EnrichedResult<'_>> = filter.apply(rows);

    if cli.json {
        print_json(&rows);
        return;
    }

    println!("{}", render::summary_line(title, &rows, filter, render_config));
    println!();
    print!("{}", render::summary_table(&rows, render_config));

    let mut unmatched: Vec<&str> = cli
        .expand
        .iter()
        .map(String::as_str)
        .filter(|id| !rows.iter().any(|row| is_expanded(row, &[*id])))
        .collect();
    unmatched.dedup();
    for id in unmatched {
        eprintln!(
            "{}: no shown row has id {}",
            "warning".yellow().bold(),
            id.yellow()
        );
    }

    let expand: Vec<&str> = cli.expand.iter().map(String::as_str).collect();
    for row in &rows {
        if cli.expand_all || is_expanded(row, &expand) {
            println!();
            print!("{}", render::detail(row, render_config));
        }
    }
}

fn is_expanded(row: &EnrichedResult<'_>, ids: &[&str]) -> bool {
    ids.iter()
        .any(|id| *id == row.result.id || *id == row.test_case.id)
}

fn show_run<S: DashboardSource>(
    cli: &Cli,
    cache: &DashboardCache<S>,
    filter: &FilterState,
    render_config: &RenderConfig,
) {
    let run = loaded(cache.latest_run());
    let results = filter.apply(&run.results);

    if cli.json {
        print_json(&serde_json::json!({
            "runId": run.run_id,
            "startedAt": run.started_at,
            "accuracy": evaldash_core::Accuracy::tally(&results),
            "byCategory": evaldash_core::by_category(&results),
            "results": results,
        }));
        return;
    }

    print!("{}", render::run_view(&run, &results, render_config));
}
