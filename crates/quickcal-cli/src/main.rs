mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use quickcal_engine::{parse_duration, resolve, EventSpan, RecurrenceSeries};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "quickcal")]
#[command(about = "Resolve shorthand dates, times and recurrences into calendar event times")]
struct Cli {
    /// Log resolution steps to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: <config dir>/quickcal/config.toml)
    #[arg(long, env = "QUICKCAL_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a start (with optional recurrence) and an optional end
    Resolve {
        /// Start, e.g. "today 2pm", "817", "monday 9am mwf d 0515"
        #[arg(required = true, num_args = 1..)]
        input: Vec<String>,

        /// End date/time, applied at the same offset to every occurrence
        #[arg(long, conflicts_with = "duration")]
        end: Option<String>,

        /// End as a duration after the start, e.g. "1.5 hrs" or "30 min"
        #[arg(long)]
        duration: Option<String>,

        /// Use the Nth configured quick time when the start has no time of day
        #[arg(long)]
        quick: Option<usize>,

        /// IANA timezone (default: config file, then UTC)
        #[arg(long, env = "DEFAULT_TIMEZONE")]
        tz: Option<String>,

        /// Reference instant in RFC 3339 (default: the current time)
        #[arg(long)]
        now: Option<String>,

        /// Print a JSON array of {start, end} objects
        #[arg(long)]
        json: bool,
    },
    /// Parse a duration and print it in minutes
    Duration {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Resolve {
            input,
            end,
            duration,
            quick,
            tz,
            now,
            json,
        } => {
            let config = Config::load(cli.config.as_deref())?;
            let request = ResolveRequest {
                input: input.join(" "),
                end,
                duration,
                quick,
                timezone: config.timezone(tz.as_deref()).to_string(),
                now: parse_now(now.as_deref())?,
            };
            let spans = run_resolve(&request, &config)?;
            print_spans(&spans, request.end.is_some() || request.duration.is_some(), json)
        }
        Commands::Duration { text } => {
            let text = text.join(" ");
            let duration = parse_duration(&text)
                .ok_or_else(|| anyhow::anyhow!("no duration recognised in '{}'", text))?;
            println!("{}", duration.minutes());
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

struct ResolveRequest {
    input: String,
    end: Option<String>,
    duration: Option<String>,
    quick: Option<usize>,
    timezone: String,
    now: DateTime<Utc>,
}

fn parse_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    match now {
        Some(s) => Ok(DateTime::parse_from_rfc3339(s)
            .with_context(|| format!("Invalid --now '{}', expected RFC 3339", s))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

/// One span per occurrence of the start series.
fn run_resolve(request: &ResolveRequest, config: &Config) -> Result<Vec<EventSpan>> {
    let mut series = resolve(&request.input, &request.timezone, request.now)?;

    if let Some(n) = request.quick {
        if series.first().is_all_day() {
            series = series.with_time(config.quick_time(n)?);
        } else {
            tracing::warn!("start already has a time of day, ignoring --quick");
        }
    }

    let template = span_template(&series, request)?;
    Ok(series
        .iter()
        .map(|occurrence| template.for_occurrence(occurrence))
        .collect())
}

/// The span of the first occurrence. Without an end it is zero-length.
fn span_template(series: &RecurrenceSeries, request: &ResolveRequest) -> Result<EventSpan> {
    let start = *series.first();

    if let Some(end) = &request.end {
        let end = resolve(end, &request.timezone, request.now)
            .with_context(|| format!("Invalid end '{}'", end))?;
        return Ok(EventSpan::pair(start, *end.first())?);
    }

    if let Some(text) = &request.duration {
        let duration = parse_duration(text)
            .ok_or_else(|| anyhow::anyhow!("no duration recognised in '{}'", text))?;
        let end = duration
            .end_for(&start)
            .ok_or_else(|| anyhow::anyhow!("--duration needs a start with a time of day"))?;
        return Ok(EventSpan::pair(start, end)?);
    }

    Ok(EventSpan::pair(start, start)?)
}

fn print_spans(spans: &[EventSpan], with_end: bool, json: bool) -> Result<()> {
    if json {
        let calendar: Vec<_> = spans.iter().map(EventSpan::to_calendar).collect();
        println!("{}", serde_json::to_string_pretty(&calendar)?);
        return Ok(());
    }

    for span in spans {
        if with_end {
            println!("{}\t{}", span.start(), span.end());
        } else {
            println!("{}", span.start());
        }
    }
    Ok(())
}
