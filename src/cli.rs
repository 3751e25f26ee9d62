//! CLI definition and dispatch.

use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::cryptocompare_adapter::CryptoCompareAdapter;
use crate::adapters::csv_price_adapter::CsvPriceAdapter;
use crate::adapters::dataset_adapter::DatasetAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_output_adapter::JsonOutputAdapter;
use crate::adapters::rules_file_adapter::RulesFileAdapter;
use crate::domain::config_validation::validate_run_config;
use crate::domain::error::TradesigError;
use crate::domain::price::{self, MIN_PRICE_SAMPLES};
use crate::domain::report::{FailureReport, RunReport};
use crate::domain::rule::NormalizedRule;
use crate::domain::rule_eval::evaluate;
use crate::domain::rule_parser;
use crate::domain::run::{RunConfig, DEFAULT_OUTPUT_DIR};
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::result_sink_port::ResultSinkPort;
use crate::ports::rule_source_port::RuleSourcePort;

#[derive(Parser, Debug)]
#[command(name = "tradesig", about = "Rule-driven BTC trading signal evaluator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate rules against market data and write result files
    Run {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Rules file overriding the protected dataset
        #[arg(long)]
        rules: Option<PathBuf>,
        /// CSV price file overriding the HTTP market feed
        #[arg(long)]
        prices_csv: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        max_position_percent: Option<f64>,
    },
    /// Evaluate offline and print the result record to stdout
    Evaluate {
        #[arg(long)]
        rules: PathBuf,
        #[arg(long)]
        prices_csv: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        max_position_percent: Option<f64>,
    },
    /// Parse a rules file and print each normalized rule
    ValidateRules {
        #[arg(long)]
        rules: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            rules,
            prices_csv,
            output,
            max_position_percent,
        } => run_run(
            config.as_ref(),
            rules,
            prices_csv,
            output,
            max_position_percent,
        ),
        Command::Evaluate {
            rules,
            prices_csv,
            config,
            max_position_percent,
        } => run_evaluate(rules, prices_csv, config.as_ref(), max_position_percent),
        Command::ValidateRules { rules } => run_validate_rules(rules),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, TradesigError> {
    FileConfigAdapter::from_file(path).map_err(|e| TradesigError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Builds the run configuration: defaults, then INI values, then environment
/// overrides (`MAX_POSITION_PERCENT`, `IEXEC_OUT`).
pub fn build_run_config(
    adapter: Option<&dyn ConfigPort>,
) -> Result<RunConfig, TradesigError> {
    let mut config = RunConfig::default();

    if let Some(adapter) = adapter {
        config.max_position_percent =
            adapter.get_double("run", "max_position_percent", config.max_position_percent);
        if let Some(market) = adapter.get_string("run", "market") {
            config.market = market;
        }
        if let Some(endpoint) = adapter.get_string("market", "endpoint") {
            config.endpoint = endpoint;
        }
        if let Some(label) = adapter.get_string("market", "data_source") {
            config.data_source = label;
        }
        let timeout = adapter.get_int("market", "timeout_secs", config.timeout_secs as i64);
        config.timeout_secs = timeout.max(0) as u64;
        let lookback = adapter.get_int("market", "lookback_hours", config.lookback_hours as i64);
        config.lookback_hours = lookback.max(0) as usize;
        if let Some(dir) = adapter.get_string("output", "dir") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(path) = adapter.get_string("dataset", "path") {
            config.dataset_path = Some(PathBuf::from(path));
        }
    }

    if let Ok(raw) = std::env::var("MAX_POSITION_PERCENT") {
        config.max_position_percent =
            raw.trim()
                .parse()
                .map_err(|_| TradesigError::ConfigInvalid {
                    section: "env".to_string(),
                    key: "MAX_POSITION_PERCENT".to_string(),
                    reason: format!("not a number: {raw}"),
                })?;
    }
    if let Ok(dir) = std::env::var("IEXEC_OUT") {
        if !dir.trim().is_empty() {
            config.output_dir = PathBuf::from(dir);
        }
    }

    Ok(config)
}

/// Parses every rule string, in order, as a unit. The first failure aborts:
/// evaluating a partial rule set would silently change its semantics.
pub fn parse_rules(rule_strings: &[String]) -> Result<Vec<NormalizedRule>, TradesigError> {
    let mut rules = Vec::with_capacity(rule_strings.len());
    for text in rule_strings {
        rules.push(rule_parser::parse(text)?);
    }
    Ok(rules)
}

fn prepare_config(
    config_path: Option<&PathBuf>,
    output_override: Option<PathBuf>,
    max_override: Option<f64>,
) -> Result<RunConfig, TradesigError> {
    let adapter = match config_path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            Some(load_config(path)?)
        }
        None => None,
    };

    let mut config = build_run_config(adapter.as_ref().map(|a| a as &dyn ConfigPort))?;
    if let Some(output) = output_override {
        config.output_dir = output;
    }
    if let Some(max) = max_override {
        config.max_position_percent = max;
    }

    validate_run_config(&config)?;
    Ok(config)
}

fn load_rule_strings(
    rules_path: Option<PathBuf>,
    config: &RunConfig,
) -> Result<Vec<String>, TradesigError> {
    match rules_path {
        Some(path) => {
            eprintln!("Loading rules from {}", path.display());
            RulesFileAdapter::new(path).load_rules()
        }
        None => {
            let adapter = match &config.dataset_path {
                Some(path) => DatasetAdapter::new(path.clone()),
                None => DatasetAdapter::from_env()?,
            };
            eprintln!("Loading rules from protected dataset");
            adapter.load_rules()
        }
    }
}

fn fetch_prices(
    prices_csv: Option<PathBuf>,
    config: &RunConfig,
) -> Result<Vec<price::PriceSample>, TradesigError> {
    let prices = match prices_csv {
        Some(path) => {
            eprintln!("Reading prices from {}", path.display());
            CsvPriceAdapter::new(path).fetch_hourly()?
        }
        None => {
            eprintln!("Fetching hourly prices from {}", config.endpoint);
            CryptoCompareAdapter::from_config(config)?.fetch_hourly()?
        }
    };
    price::validate_series(&prices)?;
    Ok(prices)
}

fn build_report(
    config: &RunConfig,
    rules_path: Option<PathBuf>,
    prices_csv: Option<PathBuf>,
) -> Result<RunReport, TradesigError> {
    // Stage 1: rule strings, in author order
    let rule_strings = load_rule_strings(rules_path, config)?;
    eprintln!("  {} rule(s) loaded", rule_strings.len());

    // Stage 2: parse as a unit
    let rules = parse_rules(&rule_strings)?;

    // Stage 3: immutable market snapshot
    let prices = fetch_prices(prices_csv, config)?;
    eprintln!("  {} hourly samples", prices.len());

    // Stage 4: decide
    let decision = evaluate(&prices, &rules, config.max_position_percent);
    eprintln!("Decision: {} {:.2}%", decision.action, decision.percent);

    let latest = price::latest(&prices).ok_or(TradesigError::InsufficientData {
        samples: 0,
        minimum: MIN_PRICE_SAMPLES,
    })?;
    Ok(RunReport::build(
        decision,
        latest.price,
        prices.len(),
        rules.len(),
        config,
        Utc::now(),
    ))
}

fn persist_failure(sink: &JsonOutputAdapter, err: &TradesigError) {
    let failure = FailureReport::from_error(err, Utc::now());
    match sink.write_failure(&failure) {
        Ok(path) => eprintln!("Failure record written to: {}", path.display()),
        Err(write_err) => eprintln!("error: failed to write failure record: {write_err}"),
    }
}

fn fallback_output_dir(output_override: Option<&PathBuf>) -> PathBuf {
    output_override
        .cloned()
        .or_else(|| {
            std::env::var("IEXEC_OUT")
                .ok()
                .filter(|d| !d.trim().is_empty())
                .map(PathBuf::from)
        })
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
}

fn run_run(
    config_path: Option<&PathBuf>,
    rules_path: Option<PathBuf>,
    prices_csv: Option<PathBuf>,
    output_override: Option<PathBuf>,
    max_override: Option<f64>,
) -> ExitCode {
    let config = match prepare_config(config_path, output_override.clone(), max_override) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            let sink = JsonOutputAdapter::new(fallback_output_dir(output_override.as_ref()));
            persist_failure(&sink, &e);
            return (&e).into();
        }
    };

    let sink = JsonOutputAdapter::new(config.output_dir.clone());
    match build_report(&config, rules_path, prices_csv)
        .and_then(|report| sink.write_report(&report))
    {
        Ok(path) => {
            eprintln!("\nResult written to: {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            persist_failure(&sink, &e);
            (&e).into()
        }
    }
}

fn run_evaluate(
    rules_path: PathBuf,
    prices_csv: PathBuf,
    config_path: Option<&PathBuf>,
    max_override: Option<f64>,
) -> ExitCode {
    let config = match prepare_config(config_path, None, max_override) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match build_report(&config, Some(rules_path), Some(prices_csv)) {
        Ok(report) => match serde_json::to_string_pretty(&report) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: failed to serialize result: {e}");
                ExitCode::from(1)
            }
        },
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_validate_rules(rules_path: PathBuf) -> ExitCode {
    eprintln!("Validating rules from {}", rules_path.display());
    let rule_strings = match RulesFileAdapter::new(rules_path).load_rules() {
        Ok(strings) => strings,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    for (index, text) in rule_strings.iter().enumerate() {
        match rule_parser::parse(text) {
            Ok(rule) => {
                eprintln!("  {}: {}", index + 1, rule);
            }
            Err(e) => {
                let err = TradesigError::from(e);
                eprintln!("error: rule {}: {}", index + 1, err);
                return (&err).into();
            }
        }
    }

    eprintln!("\nAll {} rule(s) are valid.", rule_strings.len());
    ExitCode::SUCCESS
}
