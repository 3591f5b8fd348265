//! histfetch CLI: HistData download and catalog commands.
//!
//! Commands:
//! - `download histdata`: fetch monthly tick archives and unpack the CSVs
//!   into the staging directory
//! - `show-available histdata`: list instruments and the months HistData has

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use histfetch_core::histdata::fetch_catalog;
use histfetch_core::{ensure_staging_dir, logging, Downloader, RunReport, Session, Settings};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "histfetch",
    version,
    about = "histfetch CLI: HistData tick archive downloader"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download market data from providers.
    Download {
        #[command(subcommand)]
        provider: DownloadProvider,
    },
    /// List instruments and date ranges.
    ShowAvailable {
        #[command(subcommand)]
        provider: CatalogProvider,
    },
}

#[derive(Subcommand)]
enum DownloadProvider {
    /// Tick data from HistData.com.
    Histdata {
        /// Market symbol, e.g. EURUSD.
        #[arg(long)]
        symbol: String,

        /// First month (YYYY-MM).
        #[arg(long = "from", value_parser = parse_month)]
        date_from: NaiveDate,

        /// Last month (YYYY-MM), inclusive.
        #[arg(long = "to", value_parser = parse_month)]
        date_to: NaiveDate,

        /// Destination directory. Defaults to $DATA_DIR/tmp.
        #[arg(long)]
        dest: Option<PathBuf>,

        /// Answer yes to every prompt.
        #[arg(long, short = 'y', default_value_t = false)]
        yes: bool,

        /// Write a per-month JSON report to this file.
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum CatalogProvider {
    /// Show available ticks from HistData.com.
    Histdata,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_env();
    logging::init(settings.log_level);

    match cli.command {
        Commands::Download {
            provider:
                DownloadProvider::Histdata {
                    symbol,
                    date_from,
                    date_to,
                    dest,
                    yes,
                    report,
                },
        } => run_download(&settings, &symbol, date_from, date_to, dest, yes, report),
        Commands::ShowAvailable {
            provider: CatalogProvider::Histdata,
        } => run_show_available(&settings),
    }
}

fn parse_month(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d")
        .map_err(|_| format!("'{value}' is not a YYYY-MM month"))
}

fn run_download(
    settings: &Settings,
    symbol: &str,
    date_from: NaiveDate,
    date_to: NaiveDate,
    dest: Option<PathBuf>,
    yes: bool,
    report_path: Option<PathBuf>,
) -> Result<()> {
    if date_to < date_from {
        bail!("'--to' must be >= '--from'");
    }

    let dest = dest.unwrap_or_else(|| settings.tmp_dir());
    let confirm = |prompt: &str| yes || prompt_yes_no(prompt, false);
    let dest = ensure_staging_dir(&dest, &confirm)?;

    let symbol = symbol.to_uppercase();
    if !yes && !prompt_yes_no(&format!("Proceed with {symbol}?"), true) {
        println!("Aborted.");
        return Ok(());
    }

    let downloader = Downloader::new(settings)?;
    let report = downloader.run(&symbol, date_from, date_to, &dest);

    print_summary(&report);
    println!("Done - files in {}", dest.display());

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(&path, json)
            .with_context(|| format!("writing report to {}", path.display()))?;
        println!("Report saved to: {}", path.display());
    }

    Ok(())
}

fn run_show_available(settings: &Settings) -> Result<()> {
    eprintln!("Fetching metadata from HistData.com...");
    let session = Session::new()?;
    let today = chrono::Local::now().date_naive();
    let infos = fetch_catalog(&session, &settings.histdata_base, today)?;

    if infos.is_empty() {
        eprintln!("No instruments found.");
        std::process::exit(1);
    }

    println!("{:<12} {:<8} {:<8} {:<8}", "instrument", "from", "to", "interval");
    println!("{}", "-".repeat(39));
    for info in &infos {
        println!(
            "{:<12} {:<8} {:<8} {:<8}",
            info.symbol,
            info.first.to_string(),
            info.last.to_string(),
            info.interval
        );
    }

    Ok(())
}

fn print_summary(report: &RunReport) {
    println!();
    println!(
        "{}: {}/{} months extracted",
        report.symbol,
        report.extracted_count(),
        report.periods.len()
    );
    let missing = report.missing_periods();
    if !missing.is_empty() {
        let months: Vec<String> = missing.iter().map(|p| p.to_string()).collect();
        println!("Missing: {}", months.join(", "));
    }
}

/// Ask a yes/no question on stdin. An empty answer picks `default`.
fn prompt_yes_no(prompt: &str, default: bool) -> bool {
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    print!("{prompt} {hint} ");
    let _ = io::stdout().flush();

    read_answer(io::stdin().lock(), default)
}

/// Closed or unreadable input declines, whatever the default.
fn read_answer(mut input: impl BufRead, default: bool) -> bool {
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => false,
        Ok(_) => parse_answer(&line, default),
    }
}

fn parse_answer(line: &str, default: bool) -> bool {
    match line.trim().to_ascii_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    }
}
