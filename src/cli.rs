//! CLI definition and dispatch.

use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvMarketDataAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::symbol_list_writer::SymbolListWriter;
use crate::adapters::throttled_adapter::ThrottledMarketData;
use crate::adapters::yaml_result_store::YamlResultStore;
use crate::domain::config_validation::validate_screener_config;
use crate::domain::error::ScreenerError;
use crate::domain::projector::{OverlapSummary, ScreenKind, detailed_symbol_list, symbol_list};
use crate::domain::rule_set::{MomentumParams, RuleSet, ValueParams};
use crate::domain::screen_result::ScreenRun;
use crate::domain::screening::{OverrideSet, ScreenOutcome, ScreeningEngine, custom_symbols_only};
use crate::domain::statistics::{SampleStatistics, ValueObservations};
use crate::domain::validator::{
    DEFAULT_INDEX, DEFAULT_LOOKBACK_DAYS, SymbolUniverse, UniverseConfig, ValidationCriteria,
    build_symbol_universe,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::report_port::ReportPort;
use crate::ports::result_store_port::ResultStorePort;

pub const DEFAULT_DATA_DIR: &str = "./market_data";
pub const DEFAULT_OUTPUT_DIR: &str = "./data";
pub const DEFAULT_VALIDATION_DELAY_MS: i64 = 100;
pub const DEFAULT_SCREENING_DELAY_MS: i64 = 50;
pub const CUSTOM_SCREEN_NAME: &str = "custom_symbols";

#[derive(Parser, Debug)]
#[command(name = "stock-screener", about = "Equity symbol validation and screening")]
pub struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate the configured symbols and save the universe
    Validate {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Screen the validated universe
    Screen {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long, value_enum, default_value_t = ScreenSelection::All)]
        screen: ScreenSelection,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Write symbol lists and overlap from the latest screen runs
    Lists {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Export validated symbols to SQLite
    ExportDb {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScreenSelection {
    Momentum,
    Value,
    RealisticValue,
    Custom,
    All,
}

/// A screen requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlannedScreen {
    Rules(RuleSet),
    CustomOnly,
}

impl PlannedScreen {
    pub fn screen_name(&self) -> &'static str {
        match self {
            PlannedScreen::Rules(rule_set) => rule_set.screen_name(),
            PlannedScreen::CustomOnly => CUSTOM_SCREEN_NAME,
        }
    }
}

pub fn plan_screens(
    selection: ScreenSelection,
    momentum: MomentumParams,
    value: ValueParams,
) -> Vec<PlannedScreen> {
    match selection {
        ScreenSelection::Momentum => vec![PlannedScreen::Rules(RuleSet::Momentum(momentum))],
        ScreenSelection::Value => vec![PlannedScreen::Rules(RuleSet::Value(value))],
        ScreenSelection::RealisticValue => vec![PlannedScreen::Rules(RuleSet::RealisticValue)],
        ScreenSelection::Custom => vec![PlannedScreen::CustomOnly],
        ScreenSelection::All => vec![
            PlannedScreen::Rules(RuleSet::Momentum(momentum)),
            PlannedScreen::Rules(RuleSet::RealisticValue),
            PlannedScreen::Rules(RuleSet::Value(value)),
        ],
    }
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Validate {
            config,
            data_dir,
            output_dir,
        } => run_validate(&config, data_dir, output_dir),
        Command::Screen {
            config,
            screen,
            data_dir,
            output_dir,
        } => run_screen(&config, screen, data_dir, output_dir),
        Command::Lists { config, output_dir } => run_lists(&config, output_dir),
        Command::ExportDb { config, output_dir } => run_export_db(&config, output_dir),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Load and validate the config in one step.
fn load_validated_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    eprintln!("Loading config from {}", path.display());
    let adapter = load_config(path)?;
    if let Err(e) = validate_screener_config(&adapter) {
        eprintln!("error: {e}");
        return Err((&e).into());
    }
    Ok(adapter)
}

/// Command-line override, then `[section] dir`, then the default.
pub fn resolve_dir(
    cli_override: Option<PathBuf>,
    config: &dyn ConfigPort,
    section: &str,
    default: &str,
) -> PathBuf {
    cli_override
        .or_else(|| config.get_string(section, "dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(default))
}

pub fn build_universe_config(config: &dyn ConfigPort) -> UniverseConfig {
    let min_price = config.get_double("validation", "min_price_threshold", 0.0);
    UniverseConfig {
        include_index: config.get_bool("symbol_sources", "sp500", false),
        index: config
            .get_string("symbol_sources", "index")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_INDEX.to_string()),
        custom_symbols: config.get_list("symbol_sources", "custom_symbols"),
        criteria: ValidationCriteria {
            min_market_cap: config.get_double("validation", "min_market_cap", 0.0).max(0.0) as u64,
            min_avg_volume: config.get_double("validation", "min_avg_volume", 0.0),
            min_price: (min_price > 0.0).then_some(min_price),
            required_fields: config.get_list("data_requirements", "required_fields"),
            lookback_days: config.get_int("validation", "lookback_days", DEFAULT_LOOKBACK_DAYS),
        },
    }
}

pub fn build_momentum_params(config: &dyn ConfigPort) -> MomentumParams {
    let defaults = MomentumParams::default();
    MomentumParams {
        min_return_3m: config.get_double("momentum", "min_return_3m", defaults.min_return_3m),
        min_volume_ratio: config.get_double(
            "momentum",
            "min_volume_ratio",
            defaults.min_volume_ratio,
        ),
    }
}

pub fn build_value_params(config: &dyn ConfigPort) -> ValueParams {
    let defaults = ValueParams::default();
    ValueParams {
        max_pe: config.get_double("value", "max_pe", defaults.max_pe),
        min_dividend_yield: config.get_double(
            "value",
            "min_dividend_yield",
            defaults.min_dividend_yield,
        ),
    }
}

pub fn build_overrides(config: &dyn ConfigPort) -> OverrideSet {
    OverrideSet::new(config.get_list("symbol_sources", "custom_symbols"))
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn run_validate(
    config_path: &Path,
    data_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
) -> ExitCode {
    let adapter = match load_validated_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let universe_config = build_universe_config(&adapter);
    let data_dir = resolve_dir(data_dir, &adapter, "data", DEFAULT_DATA_DIR);
    let output_dir = resolve_dir(output_dir, &adapter, "output", DEFAULT_OUTPUT_DIR);
    let delay = adapter.get_int("validation", "request_delay_ms", DEFAULT_VALIDATION_DELAY_MS);

    eprintln!("Reading market data from {}", data_dir.display());
    let source = ThrottledMarketData::from_millis(CsvMarketDataAdapter::new(data_dir), delay);
    let store = YamlResultStore::new(output_dir);

    run_validate_pipeline(&source, &store, &universe_config, now())
}

pub fn run_validate_pipeline(
    source: &dyn MarketDataPort,
    store: &dyn ResultStorePort,
    universe_config: &UniverseConfig,
    validated_at: NaiveDateTime,
) -> ExitCode {
    let universe = build_symbol_universe(source, universe_config, validated_at);

    let path = match store.save_universe(&universe) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    print_universe_summary(&universe);
    eprintln!("\nValidated symbols written to: {}", path.display());
    ExitCode::SUCCESS
}

fn print_universe_summary(universe: &SymbolUniverse) {
    let summary = &universe.summary;
    eprintln!("\n=== Validation Summary ===");
    eprintln!("Total tested:     {}", summary.total_tested);
    eprintln!("Valid:            {}", summary.valid_count);
    eprintln!("Invalid:          {}", summary.invalid_count);

    let distribution = universe.sector_distribution();
    if !distribution.is_empty() {
        eprintln!("\n=== Sector Distribution ===");
        for (sector, count) in &distribution {
            eprintln!("  {}: {}", sector, count);
        }
    }
}

fn run_screen(
    config_path: &Path,
    selection: ScreenSelection,
    data_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
) -> ExitCode {
    let adapter = match load_validated_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let screens = plan_screens(
        selection,
        build_momentum_params(&adapter),
        build_value_params(&adapter),
    );
    let overrides = build_overrides(&adapter);
    let data_dir = resolve_dir(data_dir, &adapter, "data", DEFAULT_DATA_DIR);
    let output_dir = resolve_dir(output_dir, &adapter, "output", DEFAULT_OUTPUT_DIR);
    let delay = adapter.get_int("screening", "request_delay_ms", DEFAULT_SCREENING_DELAY_MS);

    let source = ThrottledMarketData::from_millis(CsvMarketDataAdapter::new(data_dir), delay);
    let store = YamlResultStore::new(output_dir);

    run_screen_pipeline(&source, &store, &screens, &overrides, config_path, now())
}

/// Load the stored universe, or explain how to create it.
pub fn load_universe_or_report(
    store: &dyn ResultStorePort,
    config_path: &Path,
) -> Result<SymbolUniverse, ExitCode> {
    match store.load_universe() {
        Ok(Some(universe)) => Ok(universe),
        Ok(None) => {
            let location = store.universe_location();
            eprintln!(
                "error: validated symbols file not found at {}",
                location.display()
            );
            eprintln!(
                "Please run symbol validation first: stock-screener validate -c {}",
                config_path.display()
            );
            Err((&ScreenerError::MissingArtifact {
                path: location.display().to_string(),
            })
                .into())
        }
        Err(e) => {
            eprintln!("error: {e}");
            Err((&e).into())
        }
    }
}

pub fn run_screen_pipeline(
    source: &dyn MarketDataPort,
    store: &dyn ResultStorePort,
    screens: &[PlannedScreen],
    overrides: &OverrideSet,
    config_path: &Path,
    screen_date: NaiveDateTime,
) -> ExitCode {
    let universe = match load_universe_or_report(store, config_path) {
        Ok(u) => u,
        Err(code) => return code,
    };
    eprintln!(
        "Loaded {} validated symbols",
        universe.valid_symbols.len()
    );
    if universe.valid_symbols.is_empty() {
        eprintln!("warning: validated universe is empty");
    }

    let engine = ScreeningEngine::new(source);
    let date = screen_date.date();

    for (i, screen) in screens.iter().enumerate() {
        eprintln!("\n{}. Running {}...", i + 1, screen.screen_name());

        let outcome = match screen {
            PlannedScreen::Rules(rule_set) => {
                engine.screen(&universe.valid_symbols, rule_set, overrides, date)
            }
            PlannedScreen::CustomOnly => ScreenOutcome {
                results: custom_symbols_only(&universe.valid_symbols, overrides, date),
                ..ScreenOutcome::default()
            },
        };

        let run = ScreenRun::new(screen.screen_name(), screen_date, outcome.results.clone());
        let path = match store.save_run(&run) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };

        eprintln!(
            "Found {} symbols ({} passed, {} custom, {} skipped)",
            run.total_results,
            outcome.passed_count(),
            outcome.custom_count(),
            outcome.skipped.len()
        );
        if matches!(screen, PlannedScreen::Rules(rule_set) if rule_set.is_value()) {
            print_value_diagnostics(&outcome.observations);
        }
        eprintln!("Results saved to: {}", path.display());
    }

    eprintln!("\nScreening complete: {} screens run", screens.len());
    ExitCode::SUCCESS
}

fn print_statistics(label: &str, stats: Option<SampleStatistics>, scale: f64, unit: &str) {
    match stats {
        Some(s) => {
            eprintln!("  {} ({} values):", label, s.count);
            eprintln!(
                "    mean {:.2}{unit}  median {:.2}{unit}  min {:.2}{unit}  max {:.2}{unit}",
                s.mean * scale,
                s.median * scale,
                s.min * scale,
                s.max * scale
            );
            eprintln!(
                "    25th pct {:.2}{unit}  75th pct {:.2}{unit}",
                s.p25 * scale,
                s.p75 * scale
            );
        }
        None => eprintln!("  {}: no values", label),
    }
}

pub fn print_value_diagnostics(observations: &ValueObservations) {
    if observations.is_empty() {
        return;
    }
    eprintln!("\n=== Value Diagnostics ===");
    print_statistics("P/E ratio", observations.pe_statistics(), 1.0, "");
    print_statistics("Dividend yield", observations.dividend_statistics(), 100.0, "%");
    eprintln!(
        "  Without valid P/E: {}  Without dividend: {}",
        observations.without_pe, observations.without_dividend
    );
    eprintln!(
        "  P/E <= 15: {}  <= 20: {}  <= 25: {}",
        observations.pe_at_most(15.0),
        observations.pe_at_most(20.0),
        observations.pe_at_most(25.0)
    );
    eprintln!(
        "  Yield >= 1%: {}  >= 2%: {}  >= 3%: {}",
        observations.dividend_at_least(0.01),
        observations.dividend_at_least(0.02),
        observations.dividend_at_least(0.03)
    );
}

fn run_lists(config_path: &Path, output_dir: Option<PathBuf>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let output_dir = resolve_dir(output_dir, &adapter, "output", DEFAULT_OUTPUT_DIR);

    let store = YamlResultStore::new(output_dir.clone());
    let writer = SymbolListWriter::new(output_dir);
    run_lists_pipeline(&store, &writer, now())
}

pub fn run_lists_pipeline(
    store: &dyn ResultStorePort,
    writer: &dyn ReportPort,
    generated_at: NaiveDateTime,
) -> ExitCode {
    let screens = match write_screen_lists(store, writer, generated_at) {
        Ok(screens) => screens,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match OverlapSummary::compute(&screens) {
        Some(summary) => print_overlap(&summary),
        None => eprintln!("\nFewer than two screens loaded; no overlap to report"),
    }
    ExitCode::SUCCESS
}

/// Writes symbol lists for every screen with a persisted run and returns the
/// loaded symbol sets, empty ones included, so an empty screen empties the
/// all-screens overlap.
pub fn write_screen_lists(
    store: &dyn ResultStorePort,
    writer: &dyn ReportPort,
    generated_at: NaiveDateTime,
) -> Result<Vec<(String, Vec<String>)>, ScreenerError> {
    let mut screens = Vec::new();

    for kind in ScreenKind::ALL {
        let Some(run) = store.load_latest(kind.screen_type())? else {
            eprintln!("No {} results found", kind.screen_type());
            continue;
        };

        let symbols = symbol_list(&run);
        let detailed = detailed_symbol_list(&run, kind.display_name(), generated_at);
        let paths = writer.write_symbol_lists(kind.screen_type(), &symbols, &detailed, generated_at)?;
        eprintln!("{}: {} symbols", kind.display_name(), symbols.len());
        for path in &paths {
            eprintln!("  wrote {}", path.display());
        }

        screens.push((kind.screen_type().to_string(), symbols));
    }

    Ok(screens)
}

fn print_overlap(summary: &OverlapSummary) {
    eprintln!("\n=== Screen Overlap ===");
    for (screen, count) in &summary.counts {
        eprintln!("  {}: {} symbols", screen, count);
    }
    for pair in &summary.pairs {
        let symbols: Vec<&str> = pair.symbols.iter().map(String::as_str).collect();
        eprintln!(
            "  {} & {}: {} [{}]",
            pair.left,
            pair.right,
            symbols.len(),
            symbols.join(", ")
        );
    }
    eprintln!("\nIn every screen: {}", summary.common.len());
    for symbol in &summary.common {
        println!("{}", symbol);
    }
}

fn run_export_db(config_path: &Path, output_dir: Option<PathBuf>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let output_dir = resolve_dir(output_dir, &adapter, "output", DEFAULT_OUTPUT_DIR);
    let store = YamlResultStore::new(output_dir);

    let universe = match load_universe_or_report(&store, config_path) {
        Ok(u) => u,
        Err(code) => return code,
    };

    #[cfg(feature = "sqlite")]
    {
        use crate::adapters::sqlite_adapter::SqliteSymbolStore;

        let db = match SqliteSymbolStore::from_config(&adapter) {
            Ok(db) => db,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };

        let exported = db
            .initialize_schema()
            .and_then(|_| db.upsert_symbols(&universe.valid_symbols));
        match exported {
            Ok(n) => {
                eprintln!("Exported {} symbols to the symbols table", n);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                (&e).into()
            }
        }
    }

    #[cfg(not(feature = "sqlite"))]
    {
        let _ = (adapter, universe);
        eprintln!("error: sqlite feature is required for export-db");
        ExitCode::from(1)
    }
}
