//! CLI that classifies one stored landing page and prints the record as JSON.
//!
//! Reads the page from a file or stdin. Exits with status 2 when the page is
//! too complex to parse and 1 on any other failure.

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use landing_parse::{classify, Namespace, NoStrategyPolicy, Options};
use tracing::{debug, error};

#[derive(Debug, Parser)]
#[command(name = "parse_page", about = "Extract authors, full-text links and license from a landing page")]
struct Args {
    /// HTML file to read; stdin when omitted.
    input: Option<PathBuf>,

    /// Namespace the page was reached through: "doi" or "pmh".
    #[arg(long)]
    namespace: Option<Namespace>,

    /// URL the identifier resolved to; used for relative links and host rules.
    #[arg(long)]
    resolved_url: Option<String>,

    /// Return an empty author list instead of failing on unrecognised pages.
    #[arg(long)]
    lenient: bool,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn read_input(path: Option<&PathBuf>) -> io::Result<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path),
        None => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let markup = match read_input(args.input.as_ref()) {
        Ok(markup) => markup,
        Err(err) => {
            error!(error = %err, "failed to read input");
            return ExitCode::FAILURE;
        }
    };

    let mut options = Options::default();
    if args.lenient {
        options.doi_policy = NoStrategyPolicy::EmptyAuthors;
    }

    let record = match classify(&markup, args.namespace, args.resolved_url.as_deref(), &options) {
        Ok(record) => record,
        Err(err) => {
            error!(kind = err.kind(), error = %err, "classification failed");
            return if err.is_client_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            };
        }
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&record)
    } else {
        serde_json::to_string(&record)
    };
    match json {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "failed to serialize record");
            ExitCode::FAILURE
        }
    }
}
