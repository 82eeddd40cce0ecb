//! PetClause command-line front end.
//!
//! Usage:
//!     petclause scan "No pit bulls. $500 pet fee." --city Denver
//!     petclause scan --file listing.txt --city Austin --report --full-access
//!     petclause render --result scan.json --listing-file listing.txt --city Austin
//!     petclause cities
//!     petclause health

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use petclause_analyzer::{Analyzer, AnalyzerConfig};
use petclause_engine::{EngineConfig, OpenAiEngine, ReasoningEngine};
use petclause_explain::{summarize, FixedListingView, Grounding, DISCLAIMER};
use petclause_model::{AnalysisResult, ListingText};
use petclause_ordinance::{OrdinanceFile, OrdinanceSource, OrdinanceTable};
use petclause_report::{default_file_name, write_report, ReportInput};
use petclause_scan::{ScanReport, Scanner};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "petclause")]
#[command(about = "Check rental listings for illegal pet clauses")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Reasoning engine base URL (overrides PETCLAUSE_LLM_ENDPOINT)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Model name (overrides PETCLAUSE_LLM_MODEL)
    #[arg(long, global = true)]
    model: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a listing against a city's pet ordinance
    Scan {
        /// Listing text
        listing: Option<String>,

        /// Read the listing from a file ("-" for stdin)
        #[arg(short, long, conflicts_with = "listing")]
        file: Option<PathBuf>,

        /// City to check against
        #[arg(short, long)]
        city: String,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: Format,

        /// Show the complete rewrite and citations
        #[arg(long)]
        full_access: bool,

        /// Write a PDF compliance report
        #[arg(long)]
        report: bool,

        /// Report path (defaults to a generated name in the current directory)
        #[arg(short, long, requires = "report")]
        out: Option<PathBuf>,

        /// JSON ordinance table to use instead of the built-in one
        #[arg(long)]
        ordinances: Option<PathBuf>,

        /// Seconds to wait for each engine call
        #[arg(long, default_value = "60")]
        timeout: u64,

        /// Retries after a transient engine failure
        #[arg(long, default_value = "2")]
        retries: u32,
    },

    /// Render a PDF report from a saved scan result
    Render {
        /// Result JSON (output of `scan --format json`, or a bare result object)
        #[arg(short, long)]
        result: PathBuf,

        /// The listing the result belongs to
        #[arg(short, long)]
        listing_file: PathBuf,

        /// Jurisdiction label for the report
        #[arg(short, long)]
        city: Option<String>,

        /// Report path
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// List supported cities
    Cities {
        /// JSON ordinance table to use instead of the built-in one
        #[arg(long)]
        ordinances: Option<PathBuf>,
    },

    /// Check reasoning engine health
    Health,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("petclause=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let mut engine_config = EngineConfig::default();
    if let Some(endpoint) = &cli.endpoint {
        engine_config = engine_config.with_endpoint(endpoint);
    }
    if let Some(model) = &cli.model {
        engine_config = engine_config.with_model(model);
    }

    match cli.command {
        Commands::Scan {
            listing,
            file,
            city,
            format,
            full_access,
            report,
            out,
            ordinances,
            timeout,
            retries,
        } => {
            let listing = read_listing(listing, file.as_deref())?;
            let analyzer = Analyzer::new(
                OpenAiEngine::new(engine_config)?,
                AnalyzerConfig {
                    timeout: Duration::from_secs(timeout),
                    max_retries: retries,
                    ..AnalyzerConfig::default()
                },
            );
            let options = ScanOptions {
                format,
                full_access,
                report: report.then_some(out),
            };
            match ordinances {
                Some(path) => {
                    let scanner = Scanner::new(OrdinanceFile::new(path), analyzer);
                    run_scan(&scanner, &listing, &city, &options).await?;
                }
                None => {
                    let scanner = Scanner::new(OrdinanceTable::builtin(), analyzer);
                    run_scan(&scanner, &listing, &city, &options).await?;
                }
            }
        }
        Commands::Render {
            result,
            listing_file,
            city,
            out,
        } => {
            run_render(&result, &listing_file, city.as_deref(), out)?;
        }
        Commands::Cities { ordinances } => match ordinances {
            Some(path) => run_cities(&OrdinanceFile::new(path))?,
            None => run_cities(&OrdinanceTable::builtin())?,
        },
        Commands::Health => {
            run_health(&OpenAiEngine::new(engine_config)?).await?;
        }
    }

    Ok(())
}

struct ScanOptions {
    format: Format,
    full_access: bool,
    /// `Some` when a report was requested, with its optional path
    report: Option<Option<PathBuf>>,
}

fn read_listing(listing: Option<String>, file: Option<&Path>) -> Result<String> {
    match (listing, file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) if path == Path::new("-") => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("reading listing from {}", path.display())),
        (None, None) => bail!("provide the listing text or --file"),
    }
}

async fn run_scan<S, E>(
    scanner: &Scanner<S, E>,
    listing: &str,
    city: &str,
    options: &ScanOptions,
) -> Result<()>
where
    S: OrdinanceSource,
    E: ReasoningEngine,
{
    let cancel = async {
        // If the handler cannot be installed, never cancel
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let scan = match scanner.scan_with_cancel(listing, city, cancel).await {
        Ok(scan) => scan,
        Err(e) => {
            eprintln!("{}", e.user_message());
            info!(error = %e, retryable = e.is_retryable(), "Scan did not complete");
            std::process::exit(if e.is_retryable() { 1 } else { 2 });
        }
    };

    match options.format {
        Format::Json => {
            let output = serde_json::json!({
                "listing": &scan.listing,
                "jurisdiction": &scan.jurisdiction,
                "result": &scan.result,
                "view": scan.view(options.full_access),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Format::Text => print_scan(&scan, options.full_access),
    }

    if let Some(out) = &options.report {
        let generated_at = Utc::now();
        let path = out.clone().unwrap_or_else(|| {
            PathBuf::from(default_file_name(Some(scan.jurisdiction.name()), generated_at))
        });
        let input = ReportInput::from_result(
            &scan.listing,
            &scan.result,
            Some(scan.jurisdiction.name()),
            generated_at,
        );
        write_report(&path, &input)?;
        eprintln!("Report written to {}", path.display());
    }

    Ok(())
}

fn print_scan(scan: &ScanReport, full_access: bool) {
    let view = scan.view(full_access);

    println!("City: {}", scan.jurisdiction);
    println!("---");
    println!("{}", summarize(&scan.result));
    println!(
        "Compliance Score: {}% ({}) | Risk Count: {}",
        view.score,
        view.band.label(),
        view.risk_count
    );

    if !view.risky_phrases.is_empty() {
        println!("\nRisky phrases:");
        for phrase in &view.risky_phrases {
            match phrase.grounding {
                Grounding::Ungrounded => println!("  - {} (not found in listing)", phrase.text),
                _ => println!("  - {}", phrase.text),
            }
        }
    }

    match &view.fixed_listing {
        FixedListingView::Full(text) => println!("\nCompliant version:\n{}", text),
        FixedListingView::Teaser(text) => {
            println!("\nCompliant version (preview):\n{}", text);
            println!("\nRun with --full-access for the complete rewrite and citations.");
        }
    }

    if let Some(citations) = &view.citations {
        if !citations.is_empty() {
            println!("\nLegal sources:");
            for citation in citations {
                println!("  - {}", citation);
            }
        }
    }

    println!("\n---");
    if view.risk_count > 0 {
        println!("Share: {}", view.share_text);
    }
    println!("{}", DISCLAIMER);
}

/// Accepts `scan --format json` output or a bare result object.
fn parse_saved_result(json: &str) -> Result<AnalysisResult> {
    let mut value: serde_json::Value = serde_json::from_str(json)?;
    if let Some(inner) = value.get_mut("result") {
        value = inner.take();
    }
    Ok(serde_json::from_value(value)?)
}

fn run_render(
    result_path: &Path,
    listing_path: &Path,
    city: Option<&str>,
    out: Option<PathBuf>,
) -> Result<()> {
    let json = std::fs::read_to_string(result_path)
        .with_context(|| format!("reading result from {}", result_path.display()))?;
    let result = parse_saved_result(&json)?;

    let text = std::fs::read_to_string(listing_path)
        .with_context(|| format!("reading listing from {}", listing_path.display()))?;
    let listing = ListingText::new(text)?;

    let generated_at = Utc::now();
    let path = out.unwrap_or_else(|| PathBuf::from(default_file_name(city, generated_at)));
    write_report(&path, &ReportInput::from_result(&listing, &result, city, generated_at))?;
    println!("Report written to {}", path.display());
    Ok(())
}

fn run_cities<S: OrdinanceSource>(source: &S) -> Result<()> {
    let cities = source.jurisdictions()?;
    for city in &cities {
        println!("{}", city);
    }
    println!("---");
    println!("Total: {} cities ({} source)", cities.len(), source.name());
    Ok(())
}

async fn run_health(engine: &OpenAiEngine) -> Result<()> {
    print!("Checking {} engine at {}... ", engine.name(), engine.config().endpoint);

    match engine.health_check().await {
        Ok(()) => {
            println!("OK");
            Ok(())
        }
        Err(e) => {
            println!("FAILED: {}", e);
            std::process::exit(1);
        }
    }
}
