//! Export catalogue metadata for an SRU query.
//!
//! # Usage
//!
//! ```sh
//! sru-export "pica.ppn=157142477"
//! sru-export --format csv --output books.csv "pica.tit=rust"
//! RUST_LOG=sru_export=debug sru-export
//! ```

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sru_export::config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use sru_export::{
    fetch_records, map_records, map_records_strict, FetchStatus, OutputFormat, ResultTable,
    SruConfig, TracingObserver,
};

#[derive(Parser, Debug)]
#[clap(version, about)]
struct Cli {
    /// SRU query in the catalogue's query grammar
    #[clap(env = "SRU_QUERY", default_value = "pica.ppn=157142477")]
    query: String,

    /// SRU endpoint of the catalogue database
    #[clap(long, env = "SRU_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request timeout in seconds
    #[clap(long, env = "SRU_TIMEOUT", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout: u64,

    /// Output format: table, csv or json
    #[clap(short, long, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Write output to this file instead of stdout
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Abort on the first record that fails to parse
    #[clap(long)]
    strict: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sru_export=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let config = SruConfig::new()
        .with_base_url(cli.base_url)
        .with_timeout(Duration::from_secs(cli.timeout));
    config.validate()?;

    let outcome = fetch_records(&config, &cli.query, &mut TracingObserver)
        .with_context(|| format!("fetching records for '{}'", cli.query))?;

    if let FetchStatus::Truncated { status } = outcome.status {
        tracing::warn!(
            status,
            records = outcome.records.len(),
            "result set truncated by HTTP error; showing partial results"
        );
    }

    let entries = if cli.strict {
        map_records_strict(&outcome.records).context("parsing MARC record")?
    } else {
        let mapped = map_records(&outcome.records);
        if !mapped.failures.is_empty() {
            tracing::warn!(
                failed = mapped.failures.len(),
                parsed = mapped.entries.len(),
                "some records could not be parsed and were skipped"
            );
        }
        mapped.entries
    };

    let table = ResultTable::from_entries(entries);

    match cli.output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("creating output file '{}'", path.display()))?;
            table.write_to(cli.format, BufWriter::new(file))?;
            tracing::info!("Wrote {} rows to {}", table.len(), path.display());
        }
        None => table.write_to(cli.format, io::stdout().lock())?,
    }

    Ok(())
}
