use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rust_decimal::Decimal;
use taxpay_core::calculations::common::format_amount;
use taxpay_core::{TaxCalculator, TaxType};
use taxpay_data::TaxScheduleLoader;

/// Validate a tax schedule CSV file and optionally assess an income with it.
///
/// The CSV file should have the following columns:
/// - tax_type: PAYE, PIT, CIT, CGT or VAT
/// - min_income: lower bound of the band
/// - max_income: upper bound of the band (empty for unlimited)
/// - rate: marginal rate as a decimal (e.g. 0.075)
#[derive(Parser, Debug)]
#[command(name = "taxpay-schedule-check")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing the schedules
    #[arg(short, long)]
    file: PathBuf,

    /// Income to assess against every loaded schedule
    #[arg(short, long)]
    income: Option<Decimal>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Loading tax schedules from: {}", args.file.display());

    let book = TaxScheduleLoader::load_path(&args.file)
        .with_context(|| format!("Failed to load schedules: {}", args.file.display()))?;

    for tax_type in book.tax_types() {
        let bands = book.get(tax_type).map_or(0, <[_]>::len);
        println!("{tax_type:<5} {bands} band(s)  {}", tax_type.label());
    }

    if let Some(income) = args.income {
        println!();
        let calculator = TaxCalculator::new(&book);
        for tax_type in TaxType::all() {
            let computation = calculator
                .calculate(income, *tax_type)
                .with_context(|| format!("Failed to assess {tax_type}"))?;
            println!(
                "{tax_type:<5} NGN {}",
                format_amount(computation.tax_amount)
            );
            for line in computation.breakdown() {
                println!("      {line}");
            }
        }
    }

    Ok(())
}
