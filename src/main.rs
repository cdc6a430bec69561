mod analysis;
mod cleaner;
mod config;
mod enrich;
mod error;
mod loader;
mod models;
mod pipeline;
mod utils;

use anyhow::{bail, Result};
use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::analysis::{
    band_breakdown, discount_pcts, discount_values, histogram, prices, Summary,
};
use crate::config::AppConfig;
use crate::models::{Dataset, DiscountUnit, Listing, LoadReport, PriceBand};
use crate::pipeline::load_dataset;

#[derive(Parser)]
#[command(name = "shein-dashboard", about = "Shein product listings dashboard", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Load a listings CSV and print the cleaning report
    Load {
        /// Path to the listings CSV (semicolon-separated by default)
        file: PathBuf,
    },

    /// Descriptive statistics for the price and discount columns
    Summary {
        file: PathBuf,

        #[command(flatten)]
        range: RangeArgs,

        /// Emit JSON instead of the text block
        #[arg(long)]
        json: bool,
    },

    /// Listing counts and discount percentages per price band
    Bands {
        file: PathBuf,

        #[command(flatten)]
        range: RangeArgs,

        #[arg(long)]
        json: bool,
    },

    /// Price histogram bin counts
    Hist {
        file: PathBuf,

        /// Number of equal-width bins
        #[arg(long, default_value_t = 20)]
        bins: usize,

        #[command(flatten)]
        range: RangeArgs,

        #[arg(long)]
        json: bool,
    },

    /// Dump the cleaned dataset (bands, listings, report) as JSON
    Export {
        file: PathBuf,

        #[command(flatten)]
        range: RangeArgs,
    },
}

/// Inclusive price window; unset bounds fall back to the dataset's own range.
#[derive(Args)]
struct RangeArgs {
    /// Lower price bound
    #[arg(long)]
    min: Option<f64>,

    /// Upper price bound
    #[arg(long)]
    max: Option<f64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "shein_dashboard=info,warn",
        1 => "shein_dashboard=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;

    match cli.command {
        Command::Load { file } => {
            let _t = utils::Timer::start("Listings load");
            let (dataset, report) = load_dataset(&file, &config)?;
            print_load_report(&dataset, &report);
        }

        Command::Summary { file, range, json } => {
            let (dataset, _) = load_dataset(&file, &config)?;
            let listings = select(&dataset, &range)?;
            print_summary(&listings, json)?;
        }

        Command::Bands { file, range, json } => {
            let (dataset, _) = load_dataset(&file, &config)?;
            let listings = select(&dataset, &range)?;
            print_bands(&dataset, &listings, json)?;
        }

        Command::Hist {
            file,
            bins,
            range,
            json,
        } => {
            let (dataset, _) = load_dataset(&file, &config)?;
            let listings = select(&dataset, &range)?;
            print_hist(&listings, bins, json)?;
        }

        Command::Export { file, range } => {
            let (dataset, report) = load_dataset(&file, &config)?;
            let listings = select(&dataset, &range)?;
            print_export(&dataset, &report, &listings)?;
        }
    }

    Ok(())
}

/// Resolve the requested price window against the dataset and filter.
fn select(dataset: &Dataset, range: &RangeArgs) -> Result<Vec<Listing>> {
    let Some((ds_min, ds_max)) = dataset.price_range else {
        return Ok(Vec::new());
    };
    let lo = range.min.unwrap_or(ds_min);
    let hi = range.max.unwrap_or(ds_max);
    if lo > hi {
        bail!("empty price window: --min {} is above --max {}", lo, hi);
    }
    Ok(enrich::filter_by_price(&dataset.listings, lo, hi))
}

fn print_load_report(dataset: &Dataset, report: &LoadReport) {
    println!("─────────────────────────────────────────");
    println!("  Shein Listings — Load Report");
    println!("─────────────────────────────────────────");
    println!("  Rows read     : {}", utils::fmt_number(report.rows_read as i64));
    println!("  Rows kept     : {}", utils::fmt_number(report.rows_kept as i64));
    println!("  Rows dropped  : {}", utils::fmt_number(report.rows_dropped as i64));
    println!("  Discount unit : {}", report.discount_unit);
    match dataset.price_range {
        Some((min, max)) => println!("  Price range   : {:.2} - {:.2}", min, max),
        None => println!("  Price range   : —"),
    }
    if report.mixed_discount_encodings {
        println!("  NOTE: discount column mixes '%' and 'R$' encodings");
    }
    if dataset.bands.is_empty() {
        println!("  No usable listings — check delimiter and columns in config/.");
    } else {
        println!("  Price bands   :");
        for band in &dataset.bands {
            println!("    {}", band.label);
        }
    }
    println!("─────────────────────────────────────────");
}

#[derive(Serialize)]
struct SummaryDoc {
    listings: usize,
    price: Option<Summary>,
    discount_value: Option<Summary>,
    discount_pct: Option<Summary>,
}

fn print_summary(listings: &[Listing], json: bool) -> Result<()> {
    let doc = SummaryDoc {
        listings: listings.len(),
        price: Summary::from_values(&prices(listings)),
        discount_value: Summary::from_values(&discount_values(listings)),
        discount_pct: Summary::from_values(&discount_pcts(listings)),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("{} listings selected", doc.listings);
    print_summary_block("price (R$)", doc.price.as_ref());
    print_summary_block("discount value", doc.discount_value.as_ref());
    print_summary_block("discount %", doc.discount_pct.as_ref());
    println!("─────────────────────────────────");
    Ok(())
}

fn print_summary_block(title: &str, summary: Option<&Summary>) {
    println!("─────────────────────────────────");
    match summary {
        None => println!("  {} : no data", title),
        Some(s) => {
            println!("  {}", title);
            println!("  count  : {}", s.count);
            println!("  mean   : {:.2}", s.mean);
            println!("  std    : {}", utils::fmt_opt(s.std));
            println!("  min    : {:.2}", s.min);
            println!("  25%    : {:.2}", s.q25);
            println!("  50%    : {:.2}", s.median);
            println!("  75%    : {:.2}", s.q75);
            println!("  max    : {:.2}", s.max);
        }
    }
}

fn print_bands(dataset: &Dataset, listings: &[Listing], json: bool) -> Result<()> {
    let breakdown = band_breakdown(dataset, listings);

    if json {
        println!("{}", serde_json::to_string_pretty(&breakdown)?);
        return Ok(());
    }

    if breakdown.is_empty() {
        println!("No price bands — the dataset is empty.");
        return Ok(());
    }

    println!("──────────────────────────────────────────────────");
    println!(
        "  {:<16} {:>6} {:>9} {:>9}",
        "Band", "Count", "Mean %", "Median %"
    );
    println!("──────────────────────────────────────────────────");
    for b in &breakdown {
        let (mean, median) = match &b.discount_pct {
            Some(s) => (Some(s.mean), Some(s.median)),
            None => (None, None),
        };
        println!(
            "  {:<16} {:>6} {:>9} {:>9}",
            b.label,
            b.count,
            utils::fmt_opt(mean),
            utils::fmt_opt(median)
        );
    }
    println!("──────────────────────────────────────────────────");
    Ok(())
}

fn print_hist(listings: &[Listing], bins: usize, json: bool) -> Result<()> {
    let values = prices(listings);
    let hist = histogram(&values, bins);

    if json {
        println!("{}", serde_json::to_string_pretty(&hist)?);
        return Ok(());
    }

    if hist.is_empty() {
        println!("Nothing to bin — no listings in the selected window.");
        return Ok(());
    }

    for bin in &hist {
        println!("  {:>10.2} - {:<10.2} {:>6}", bin.lower, bin.upper, bin.count);
    }
    Ok(())
}

#[derive(Serialize)]
struct ExportDoc<'a> {
    loaded_at: NaiveDateTime,
    discount_unit: DiscountUnit,
    price_range: Option<(f64, f64)>,
    report: &'a LoadReport,
    bands: &'a [PriceBand],
    listings: &'a [Listing],
}

fn print_export(dataset: &Dataset, report: &LoadReport, listings: &[Listing]) -> Result<()> {
    let doc = ExportDoc {
        loaded_at: dataset.loaded_at,
        discount_unit: dataset.discount_unit,
        price_range: dataset.price_range,
        report,
        bands: &dataset.bands,
        listings,
    };
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
