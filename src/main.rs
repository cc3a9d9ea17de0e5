//! fx-change-monitor CLI
//!
//! Detect significant FX rate moves from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Detect changes for every currency in a rate file
//! fx-change-monitor detect --input rates.json
//!
//! # One currency, custom threshold, alerts appended to a log
//! fx-change-monitor detect --input rates.json --currency EUR --threshold 1.5 --alerts alerts.jsonl
//!
//! # Query stored alerts
//! fx-change-monitor alerts --alerts alerts.jsonl --currency EUR --from 2024-01-01
//!
//! # Generate a synthetic series for testing
//! fx-change-monitor generate --currency EUR --days 730 --output rates.json
//! ```

use chrono::{NaiveDate, Utc};
use fx_change_monitor::core::change_point::ChangePoint;
use fx_change_monitor::core::currency::CurrencyCode;
use fx_change_monitor::pipeline::{AlertPipeline, AnalysisOutcome, BatchStatus, PipelineConfig};
use fx_change_monitor::simulation::random_walk::{
    generate_rate_series, generate_rate_series_with, SeriesConfig, MAX_SERIES_DAYS,
};
use fx_change_monitor::storage::{AlertRepository, InMemoryStore, JsonAlertLog, JsonRateFile};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use std::process;
use std::str::FromStr;

fn print_usage() {
    eprintln!(
        r#"fx-change-monitor — significant-change detection for daily FX rates

USAGE:
    fx-change-monitor <COMMAND> [OPTIONS]

COMMANDS:
    detect      Detect significant rate moves and record alerts
    alerts      List stored alerts
    generate    Generate a synthetic rate series (for testing)
    help        Show this message

OPTIONS (detect):
    --input <FILE>        Path to JSON rates file
    --currency <CODE>     Currency to analyze (default: every currency in the file)
    --threshold <PCT>     Minimum absolute change in percent (default: 2.0)
    --max-days <N>        Longest window in days (default: 60)
    --source <NAME>       Preferred provider when a date has several rows
    --alerts <FILE>       Append alerts to this JSON-lines log
    --format <FORMAT>     Output format: text (default) or json

OPTIONS (alerts):
    --alerts <FILE>       JSON-lines alert log
    --currency <CODE>     Currency to list
    --from <DATE>         Only alerts starting on or after DATE (YYYY-MM-DD)
    --to <DATE>           Only alerts ending on or before DATE (YYYY-MM-DD)
    --format <FORMAT>     Output format: text (default) or json

OPTIONS (generate):
    --currency <CODE>     Currency code (default: EUR)
    --days <N>            Calendar days to cover, at most 36600 (default: 365)
    --start-date <DATE>   First date (default: 2020-01-01)
    --start-rate <RATE>   Initial rate (default: 4.9750)
    --volatility <PCT>    Largest daily move in percent (default: 0.4)
    --seed <N>            Seed for a reproducible series
    --output <FILE>       Write to file instead of stdout

ENVIRONMENT:
    RATE_CHANGE_THRESHOLD_PERCENT, RATE_CHANGE_MAX_DURATION_DAYS,
    RATE_CANONICAL_SOURCE set detection defaults; flags override them.
    RUST_LOG controls log output.

EXIT STATUS:
    0    Every currency was analyzed. Alerts that could not be saved are
         reported in the Failed count and logged, but do not change the status.
    1    Bad arguments, unreadable input, or a currency that could not be
         analyzed.

EXAMPLES:
    fx-change-monitor detect --input rates.json --currency EUR
    fx-change-monitor detect --input rates.json --format json --alerts alerts.jsonl
    fx-change-monitor alerts --alerts alerts.jsonl --currency EUR
    fx-change-monitor generate --days 730 --seed 7 --output rates.json"#
    );
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

/// JSON output schema for a detection run.
#[derive(serde::Serialize)]
struct DetectionOutput {
    currency: String,
    detected: usize,
    persisted: usize,
    failed: usize,
    changes: Vec<ChangeOutput>,
}

#[derive(serde::Serialize)]
struct ChangeOutput {
    start_date: String,
    end_date: String,
    start_rate: String,
    end_rate: String,
    change_percent: f64,
    duration_days: i64,
    direction: String,
    severity: String,
}

impl From<&ChangePoint> for ChangeOutput {
    fn from(change: &ChangePoint) -> Self {
        Self {
            start_date: change.start_date.to_string(),
            end_date: change.end_date.to_string(),
            start_rate: change.start_rate.to_string(),
            end_rate: change.end_rate.to_string(),
            change_percent: change.change_percent_f64(),
            duration_days: change.duration_days,
            direction: change.direction.to_string(),
            severity: change.severity.to_string(),
        }
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Collect `--flag value` pairs, rejecting anything not in `allowed`.
fn parse_options(args: &[String], allowed: &[&str]) -> Vec<(String, String)> {
    let mut options = Vec::new();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        if !allowed.contains(&flag) {
            eprintln!("Unknown option: {}", flag);
            process::exit(1);
        }
        i += 1;
        let value = args.get(i).cloned().unwrap_or_else(|| fail(format!("{} requires a value", flag)));
        options.push((flag.to_string(), value));
        i += 1;
    }
    options
}

fn parse_or_exit<T: std::str::FromStr>(flag: &str, value: &str) -> T {
    value
        .parse()
        .unwrap_or_else(|_| fail(format!("invalid value '{}' for {}", value, flag)))
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| fail(e))
}

fn print_outcome(outcome: &AnalysisOutcome) {
    println!("=== {} ===", outcome.currency);
    if outcome.changes.is_empty() {
        println!("No significant changes detected.");
    }
    for (i, change) in outcome.changes.iter().enumerate() {
        println!("{:>3}. {}", i + 1, change);
    }
    println!(
        "Detected: {}  Saved: {}  Failed: {}\n",
        outcome.detected_count(),
        outcome.persisted_count,
        outcome.failed_count
    );
}

fn run_detect<A: AlertRepository>(
    pipeline: &mut AlertPipeline<JsonRateFile, A>,
    currencies: &[CurrencyCode],
    format: OutputFormat,
) -> BatchStatus {
    let results = pipeline.analyze_currencies(currencies, Utc::now());
    let status = BatchStatus::of(&results);
    let mut outputs = Vec::new();

    for (currency, result) in results {
        match result {
            Ok(outcome) => {
                if format == OutputFormat::Json {
                    outputs.push(DetectionOutput {
                        currency: currency.to_string(),
                        detected: outcome.detected_count(),
                        persisted: outcome.persisted_count,
                        failed: outcome.failed_count,
                        changes: outcome.changes.iter().map(ChangeOutput::from).collect(),
                    });
                } else {
                    print_outcome(&outcome);
                }
            }
            Err(e) => eprintln!("{}: {}", currency, e),
        }
    }

    if format == OutputFormat::Json {
        println!("{}", to_json(&outputs));
    }
    if status == BatchStatus::Partial {
        eprintln!("Warning: some alerts could not be saved");
    }
    status
}

fn cmd_detect(args: &[String]) {
    let mut config = PipelineConfig::from_env().unwrap_or_else(|e| fail(e));
    let mut input_path = None;
    let mut currency = None;
    let mut alerts_path = None;
    let mut format = OutputFormat::Text;

    let allowed = [
        "--input", "--currency", "--threshold", "--max-days", "--source", "--alerts", "--format",
    ];
    for (flag, value) in parse_options(args, &allowed) {
        match flag.as_str() {
            "--input" => input_path = Some(value),
            "--currency" => currency = Some(parse_or_exit::<CurrencyCode>(&flag, &value)),
            "--threshold" => config.detector.threshold_percent = parse_or_exit::<Decimal>(&flag, &value),
            "--max-days" => config.detector.max_duration_days = parse_or_exit::<i64>(&flag, &value),
            "--source" => config.canonical_source = Some(value),
            "--alerts" => alerts_path = Some(value),
            "--format" => format = parse_or_exit(&flag, &value),
            other => fail(format!("Unknown option: {}", other)),
        }
    }

    let path = input_path.unwrap_or_else(|| fail("--input <FILE> is required"));
    let rates = JsonRateFile::open(&path).unwrap_or_else(|e| fail(format!("reading '{}': {}", path, e)));
    let currencies = match currency {
        Some(c) => vec![c],
        None => rates.currencies(),
    };

    let status = match alerts_path {
        Some(alerts) => {
            let mut pipeline = AlertPipeline::new(config, rates, JsonAlertLog::new(alerts))
                .unwrap_or_else(|e| fail(e));
            run_detect(&mut pipeline, &currencies, format)
        }
        None => {
            let mut pipeline =
                AlertPipeline::new(config, rates, InMemoryStore::new()).unwrap_or_else(|e| fail(e));
            run_detect(&mut pipeline, &currencies, format)
        }
    };

    if status == BatchStatus::Failed {
        process::exit(1);
    }
}

fn cmd_alerts(args: &[String]) {
    let mut alerts_path = None;
    let mut currency = None;
    let mut from = None;
    let mut to = None;
    let mut format = OutputFormat::Text;

    let allowed = ["--alerts", "--currency", "--from", "--to", "--format"];
    for (flag, value) in parse_options(args, &allowed) {
        match flag.as_str() {
            "--alerts" => alerts_path = Some(value),
            "--currency" => currency = Some(parse_or_exit::<CurrencyCode>(&flag, &value)),
            "--from" => from = Some(parse_or_exit::<NaiveDate>(&flag, &value)),
            "--to" => to = Some(parse_or_exit::<NaiveDate>(&flag, &value)),
            "--format" => format = parse_or_exit(&flag, &value),
            other => fail(format!("Unknown option: {}", other)),
        }
    }

    let path = alerts_path.unwrap_or_else(|| fail("--alerts <FILE> is required"));
    let currency = currency.unwrap_or_else(|| fail("--currency <CODE> is required"));
    let log = JsonAlertLog::new(&path);
    let alerts = log
        .alerts_for_currency(&currency, from, to)
        .unwrap_or_else(|e| fail(format!("reading '{}': {}", path, e)));

    if format == OutputFormat::Json {
        println!("{}", to_json(&alerts));
    } else if alerts.is_empty() {
        println!("No alerts stored for {}.", currency);
    } else {
        for alert in &alerts {
            println!("{}  (detected {})", alert.change_point(), alert.detected_at.format("%Y-%m-%d %H:%M"));
        }
        println!("\nTotal alerts: {}", alerts.len());
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = SeriesConfig::default();
    let mut seed: Option<u64> = None;
    let mut output_path: Option<String> = None;

    let allowed = [
        "--currency", "--days", "--start-date", "--start-rate", "--volatility", "--seed", "--output",
    ];
    for (flag, value) in parse_options(args, &allowed) {
        match flag.as_str() {
            "--currency" => config.currency = parse_or_exit(&flag, &value),
            "--days" => config.days = parse_or_exit(&flag, &value),
            "--start-date" => config.start_date = parse_or_exit(&flag, &value),
            "--start-rate" => config.start_rate = parse_or_exit(&flag, &value),
            "--volatility" => config.daily_volatility_percent = parse_or_exit(&flag, &value),
            "--seed" => seed = Some(parse_or_exit(&flag, &value)),
            "--output" => output_path = Some(value),
            other => fail(format!("Unknown option: {}", other)),
        }
    }
    if config.days > MAX_SERIES_DAYS {
        fail(format!("--days must be at most {}", MAX_SERIES_DAYS));
    }

    let rates = match seed {
        Some(seed) => generate_rate_series_with(&config, &mut StdRng::seed_from_u64(seed)),
        None => generate_rate_series(&config),
    };
    let count = rates.len();

    match output_path {
        Some(path) => {
            JsonRateFile::write(&path, rates)
                .unwrap_or_else(|e| fail(format!("writing '{}': {}", path, e)));
            eprintln!("Generated {} {} observations → {}", count, config.currency, path);
        }
        None => {
            let file = fx_change_monitor::storage::json_file::RatesFile { rates };
            println!("{}", to_json(&file));
        }
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "detect" => cmd_detect(rest),
        "alerts" => cmd_alerts(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parses_known_values() {
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
    }

    #[test]
    fn test_output_format_rejects_unknown_values() {
        assert!("xml".parse::<OutputFormat>().is_err());
        assert!("JSON".parse::<OutputFormat>().is_err());
        assert!("".parse::<OutputFormat>().is_err());
    }
}
