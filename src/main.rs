use chrono::{Datelike, Local, Months, NaiveDate};
use clap::{Parser, ValueEnum};
use log::{info, LevelFilter};
use miette::{miette, IntoDiagnostic, Result};
use mortgage::loan::{build_schedule, LoanTerms};
use mortgage::{report, series};
use rust_decimal::Decimal;
use simple_logger::SimpleLogger;
use std::io;

#[derive(Clone, Copy, PartialEq, Debug, ValueEnum)]
enum Format {
    /// Yearly and monthly breakdown as text
    Report,
    /// Per-month series as CSV, for plotting
    Csv,
    /// One summary line per payment
    Lines,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None, allow_negative_numbers = true)]
struct Cli {
    /// Total principal borrowed
    principal: Decimal,

    /// Loan term in years
    years: u32,

    /// Nominal annual interest rate in percent, e.g. 5.635
    rate: Decimal,

    /// Date of the first payment (YYYY-MM-DD). Defaults to the first of next month.
    #[arg(long)]
    first_payment: Option<NaiveDate>,

    #[arg(long, value_enum, default_value_t = Format::Report)]
    format: Format,
}

fn next_month_start() -> Result<NaiveDate> {
    Local::now()
        .date_naive()
        .with_day(1)
        .and_then(|d| d.checked_add_months(Months::new(1)))
        .ok_or_else(|| miette!("cannot determine the first payment date"))
}

fn main() -> Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .env()
        .init()
        .into_diagnostic()?;

    let cli = Cli::parse();

    let first_payment = match cli.first_payment {
        Some(date) => date,
        None => next_month_start()?,
    };
    let terms = LoanTerms::from_years(cli.principal, cli.years, cli.rate, first_payment)
        .into_diagnostic()?;
    info!("loan terms: {:?}", terms);

    let schedule = build_schedule(&terms).into_diagnostic()?;

    let stdout = io::stdout();
    match cli.format {
        Format::Report => report::write_report(&schedule, stdout.lock()),
        Format::Csv => series::write_csv(&schedule, stdout.lock()),
        Format::Lines => schedule.show_amortization(stdout.lock()),
    }
    .into_diagnostic()?;

    Ok(())
}

// verifies that types can implement the gated traits below
#[cfg(test)]
fn is_normal<T: Sized + Send + Sync + Unpin>() {}

#[test]
fn normal_types() {
    is_normal::<LoanTerms>();
    is_normal::<mortgage::Schedule>();
    is_normal::<mortgage::MonthlyRecord>();
}
