//! Summarize text, or a stream of JSON events, to a target length.
//!
//! # Examples
//!
//! ```sh
//! # One text, at most 30% of its length
//! precis --text "$(cat article.txt)"
//!
//! # Three sentences, text from stdin
//! cat article.txt | precis --stdin-text --mode sentences --length 3
//!
//! # JSON-lines events: summarize each event's `body` field into `tldr`
//! precis --input events.jsonl --data '{{ body }}' --result-key tldr
//!
//! # Options from a file, four events in flight
//! precis --options agent.json --concurrency 4 < events.jsonl
//!
//! # Print the options JSON Schema
//! precis --schema
//! ```

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{ArgAction, Parser};
use precis::agent::{Event, LoggingHandler, TextSummaryAgent, receive_concurrently};
use precis::options::AgentOptions;
use precis::{LexRankEngine, Summarizer, SummaryError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Exit status when some events failed but the rest were processed.
const EXIT_EVENT_FAILURES: i32 = 2;

/// Summarize text, or a stream of JSON events, to a target length.
///
/// Events are read as JSON lines (one payload object per line) from --input
/// or stdin and written to stdout the same way.
#[derive(Parser)]
#[command(name = "precis", version)]
struct Cli {
    // ── Agent options ──────────────────────────────────────────
    /// JSON file with agent options; flags below override its fields
    #[arg(long)]
    options: Option<PathBuf>,

    /// Summary mode: percentage or sentences
    #[arg(long)]
    mode: Option<String>,

    /// Ratio of the original length (percentage) or sentence count (sentences)
    #[arg(long)]
    length: Option<String>,

    /// Relevance threshold, 0.1 to 0.3
    #[arg(long)]
    threshold: Option<String>,

    /// Template for the text to summarize, e.g. '{{ body }}'
    #[arg(long)]
    data: Option<String>,

    /// Keep the incoming payload ("true") or emit only the summary ("false")
    #[arg(long)]
    merge: Option<String>,

    /// Payload key receiving the summary
    #[arg(long)]
    result_key: Option<String>,

    // ── Input ──────────────────────────────────────────────────
    /// Summarize this text and print the result
    #[arg(long, conflicts_with = "stdin_text")]
    text: Option<String>,

    /// Summarize text read from stdin and print the result
    #[arg(long)]
    stdin_text: bool,

    /// JSON-lines event file (default: stdin)
    #[arg(long)]
    input: Option<PathBuf>,

    // ── Processing ─────────────────────────────────────────────
    /// Process events without recording agent status
    #[arg(long)]
    dry_run: bool,

    /// Events summarized in parallel
    #[arg(long, default_value_t = 1)]
    concurrency: usize,

    // ── Output ─────────────────────────────────────────────────
    /// Write full events (payload and created_at) instead of bare payloads
    #[arg(long)]
    envelope: bool,

    /// Print the options JSON Schema and exit
    #[arg(long)]
    schema: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

// ── Helpers ────────────────────────────────────────────────────────

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("precis=info")),
        1 => EnvFilter::new("precis=debug"),
        _ => EnvFilter::new("precis=trace"),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn read_stdin_content() -> Result<String, SummaryError> {
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn build_options(cli: &Cli) -> Result<AgentOptions, SummaryError> {
    let mut options = match &cli.options {
        Some(path) => AgentOptions::from_path(path)?,
        None => AgentOptions::default(),
    };

    let overrides = [
        (&cli.mode, &mut options.mode),
        (&cli.length, &mut options.length),
        (&cli.threshold, &mut options.threshold),
        (&cli.data, &mut options.data),
        (&cli.merge, &mut options.merge),
        (&cli.result_key, &mut options.result_key),
    ];
    for (flag, field) in overrides {
        if let Some(value) = flag {
            *field = value.clone();
        }
    }
    Ok(options)
}

/// Parse JSON lines, skipping blank ones. Returns events with their line
/// numbers and the number of lines that failed to parse.
fn parse_events(input: &str) -> (Vec<Event>, usize) {
    let mut events = Vec::new();
    let mut invalid = 0;
    for (number, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match Event::from_json_line(line) {
            Ok(event) => events.push(event),
            Err(e) => {
                warn!("line {}: skipping invalid event: {e}", number + 1);
                invalid += 1;
            }
        }
    }
    (events, invalid)
}

fn write_events<'a>(
    events: impl IntoIterator<Item = &'a Event>,
    envelope: bool,
) -> Result<(), SummaryError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for event in events {
        if envelope {
            serde_json::to_writer(&mut out, event)?;
        } else {
            serde_json::to_writer(&mut out, &event.payload)?;
        }
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

fn summarize_text(cli: &Cli, options: &AgentOptions) -> Result<String, SummaryError> {
    options.validate()?;
    let text = match &cli.text {
        Some(text) => text.clone(),
        None => read_stdin_content()?,
    };
    Summarizer::new(LexRankEngine::default()).summarize(
        &text,
        &options.mode,
        &options.length,
        &options.threshold,
    )
}

async fn run_events(cli: &Cli, options: AgentOptions) -> Result<i32, SummaryError> {
    let input = match &cli.input {
        Some(path) => std::fs::read_to_string(path)?,
        None => read_stdin_content()?,
    };
    let (events, invalid) = parse_events(&input);

    let agent = TextSummaryAgent::new(options, LexRankEngine::default())?
        .with_event_handler(LoggingHandler);
    info!("Processing {} event(s)", events.len());

    let report = if cli.dry_run {
        agent.dry_run_batch(&events)
    } else if cli.concurrency > 1 {
        receive_concurrently(Arc::new(agent), events, cli.concurrency).await
    } else {
        agent.receive(&events)
    };

    write_events(&report.emitted, cli.envelope)?;

    if report.is_success() && invalid == 0 {
        Ok(0)
    } else {
        Ok(EXIT_EVENT_FAILURES)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.schema {
        match serde_json::to_string_pretty(&AgentOptions::schema()) {
            Ok(schema) => println!("{schema}"),
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
        return;
    }

    let options = match build_options(&cli) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    if cli.text.is_some() || cli.stdin_text {
        match summarize_text(&cli, &options) {
            Ok(summary) => println!("{summary}"),
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
        return;
    }

    match run_events(&cli, options).await {
        Ok(0) => {}
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
