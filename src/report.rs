use crate::error::Result;
use crate::loan::{round_money, MonthlyRecord, Schedule, YearlyRecord};
use log::debug;
use std::io::Write;

const RULE: &str = "-----------------------------------";

/// Writes a plain-text report of `schedule`: loan totals, then each year's
/// sums followed by its months.
pub fn write_report<W: Write>(schedule: &Schedule, mut out: W) -> Result<()> {
    writeln!(out, "{}", RULE)?;
    writeln!(out, "Monthly payment: {:.2}", round_money(schedule.pmt_amount()))?;
    writeln!(out, "Total payment: {:.2}", round_money(schedule.total_payment()))?;
    writeln!(out, "Total interest: {:.2}", round_money(schedule.total_interest()))?;

    for year in schedule.years() {
        write_year(&mut out, year)?;
    }
    out.flush()?;

    debug!("report written for {} payments", schedule.pmt_count());
    Ok(())
}

fn write_year<W: Write>(out: &mut W, year: &YearlyRecord) -> Result<()> {
    writeln!(out, "{}", RULE)?;
    writeln!(out, "{}:", year.year)?;
    writeln!(out, "Payment this year: {:.2}", round_money(year.pmt_amount))?;
    writeln!(out, "Principal this year: {:.2}", round_money(year.principal_amount))?;
    writeln!(out, "Interest this year: {:.2}", round_money(year.interest_amount))?;
    writeln!(out, "{}", RULE)?;
    for month in &year.months {
        write_month(out, month)?;
    }
    Ok(())
}

fn write_month<W: Write>(out: &mut W, month: &MonthlyRecord) -> Result<()> {
    let lines = [
        ("Payment", month.pmt_amount),
        ("Principal", month.principal),
        ("Interest", month.interest),
    ];
    writeln!(out, "Payment number: {}", month.pmt_number)?;
    writeln!(out, "Month: {}", month.month_name())?;
    for (label, amount) in lines {
        writeln!(out, "{}: {:.2}", label, round_money(amount))?;
    }
    writeln!(
        out,
        "Interest share: {:.2}%",
        round_money(month.interest_percentage)
    )?;

    let balances = [
        ("Remaining payment", month.remaining_payment),
        ("Remaining principal", month.remaining_principal),
        ("Remaining interest", month.remaining_interest),
        ("Paid to date", month.paid_payment),
        ("Principal paid to date", month.paid_principal),
        ("Interest paid to date", month.paid_interest),
    ];
    for (label, amount) in balances {
        writeln!(out, "{}: {:.2}", label, round_money(amount))?;
    }
    Ok(())
}
