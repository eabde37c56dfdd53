//! perflog - inspect and append to a log directory from the shell
//!
//! # Usage
//! ```sh
//! perflog --log-path runs/exp1 record epoch loss=0.5 acc=0.9
//! perflog --log-path runs/exp1 show epoch
//! PERFLOG_PATH=runs/exp1 perflog message --level warning "lr decayed"
//! ```
//!
//! # Environment Variables
//! - `PERFLOG_PATH` - Log directory when `--log-path` is not given
//! - `PERFLOG_LEVEL` - Minimum message level (default: info)
//! - `PERFLOG_COMPACT_JSON` - Write logs.json without indentation (default: true)

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use perflog::config::{LoggerConfig, PATH_VAR};
use perflog::domain::performance::describe_lines;
use perflog::{DictOptions, Level, LoggerSlot, Record};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{Level as TraceLevel, info};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "perflog", version, about = "Leveled logs and performance memory")]
struct Cli {
    /// Directory holding logs.txt and logs.json
    #[arg(long, short = 'p')]
    log_path: Option<PathBuf>,

    /// Minimum message level (info, summary, warning, error, system)
    #[arg(long)]
    min_level: Option<Level>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List groups, or print the latest recording of one group
    Show { group: Option<String> },

    /// Append one recording (KEY=VALUE, values parsed as JSON) and flush
    Record {
        group: String,
        #[arg(required = true)]
        fields: Vec<String>,
        /// Print the recording with this description
        #[arg(long, short = 'd')]
        description: Option<String>,
    },

    /// Write one message to the message log
    Message {
        #[arg(long, default_value = "info")]
        level: Level,
        text: String,
    },

    /// Rewrite logs.json without indentation
    Compact,

    /// Rewrite logs.json with four-space indentation
    Pretty,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(TraceLevel::INFO.into()),
        )
        .with(stderr_layer)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    let mut slot = LoggerSlot::new();
    let logger = slot
        .initialize(Some(&config))
        .with_context(|| format!("Failed to open log directory {:?}", config.log_path))?;

    match cli.command {
        Command::Show { group: None } => {
            if logger.store().is_empty() {
                println!("No performance data in {:?}", logger.json_path());
            }
            for (name, series) in logger.store().groups() {
                let keys: Vec<&str> = series.keys().collect();
                println!(
                    "{name}: {} recording(s) [{}]",
                    series.recordings(),
                    keys.join(", ")
                );
            }
        }
        Command::Show { group: Some(name) } => {
            let series = logger
                .store()
                .group(&name)
                .with_context(|| format!("Unknown group '{name}'"))?;
            let latest = series.latest().unwrap_or_default();
            let description = format!("latest of {} recording(s)", series.recordings());
            for line in describe_lines(&name, &description, &latest) {
                println!("{line}");
            }
        }
        Command::Record {
            group,
            fields,
            description,
        } => {
            let record = parse_fields(&fields)?;
            let options = match description {
                Some(text) => DictOptions::rendered(text),
                None => DictOptions::default(),
            };
            let count = logger.log_dict(&group, record, &options)?;
            logger.flush()?;
            info!("Group '{}' now holds {} recording(s)", group, count);
        }
        Command::Message { level, text } => {
            logger.message(&text, level)?;
        }
        Command::Compact => {
            logger.set_json_compact(true);
            logger.flush()?;
        }
        Command::Pretty => {
            logger.set_json_compact(false);
            logger.flush()?;
        }
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<LoggerConfig> {
    let cli_path = cli
        .log_path
        .as_ref()
        .map(|p| p.to_string_lossy().into_owned());
    let mut config = LoggerConfig::from_lookup(|key| match (key, &cli_path) {
        (PATH_VAR, Some(path)) => Some(path.clone()),
        _ => std::env::var(key).ok(),
    })?;

    if let Some(level) = cli.min_level {
        config.min_level = level;
    }
    Ok(config)
}

/// `KEY=VALUE` pairs; values that are not valid JSON are kept as strings
fn parse_fields(fields: &[String]) -> Result<Record> {
    let mut record = Record::new();
    for field in fields {
        let Some((key, raw)) = field.split_once('=') else {
            bail!("Expected KEY=VALUE, got '{}'", field);
        };
        if key.is_empty() {
            bail!("Empty key in '{}'", field);
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        if record.insert(key.to_string(), value).is_some() {
            bail!("Duplicate key '{}'", key);
        }
    }
    Ok(record)
}
