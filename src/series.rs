//! Flat per-month series for plotting, one value per payment in order.

use crate::error::Result;
use crate::loan::{MonthlyRecord, Schedule};
use log::debug;
use rust_decimal::Decimal;
use std::{fmt, io::Write};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Metric {
    Principal,
    Interest,
    InterestPercentage,
    RemainingPayment,
    RemainingPrincipal,
    RemainingInterest,
    PaidPayment,
    PaidPrincipal,
    PaidInterest,
}

impl Metric {
    pub const ALL: [Metric; 9] = [
        Metric::Principal,
        Metric::Interest,
        Metric::InterestPercentage,
        Metric::RemainingPayment,
        Metric::RemainingPrincipal,
        Metric::RemainingInterest,
        Metric::PaidPayment,
        Metric::PaidPrincipal,
        Metric::PaidInterest,
    ];

    /// Column name used in CSV output.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Principal => "principal",
            Metric::Interest => "interest",
            Metric::InterestPercentage => "interest_percentage",
            Metric::RemainingPayment => "remaining_payment",
            Metric::RemainingPrincipal => "remaining_principal",
            Metric::RemainingInterest => "remaining_interest",
            Metric::PaidPayment => "paid_payment",
            Metric::PaidPrincipal => "paid_principal",
            Metric::PaidInterest => "paid_interest",
        }
    }

    pub fn value(&self, month: &MonthlyRecord) -> Decimal {
        match self {
            Metric::Principal => month.principal,
            Metric::Interest => month.interest,
            Metric::InterestPercentage => month.interest_percentage,
            Metric::RemainingPayment => month.remaining_payment,
            Metric::RemainingPrincipal => month.remaining_principal,
            Metric::RemainingInterest => month.remaining_interest,
            Metric::PaidPayment => month.paid_payment,
            Metric::PaidPrincipal => month.paid_principal,
            Metric::PaidInterest => month.paid_interest,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Schedule {
    /// Values of `metric` for payments 1..=N.
    pub fn series(&self, metric: Metric) -> Vec<Decimal> {
        self.months().map(|m| metric.value(m)).collect()
    }
}

/// Writes every metric as a CSV column, one row per payment.
pub fn write_csv<W: Write>(schedule: &Schedule, out: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(out);

    let mut header = vec!["month"];
    header.extend(Metric::ALL.iter().map(Metric::name));
    wtr.write_record(&header)?;

    for month in schedule.months() {
        let mut row = vec![month.pmt_number.to_string()];
        row.extend(Metric::ALL.iter().map(|m| m.value(month).to_string()));
        wtr.write_record(&row)?;
    }
    wtr.flush()?;

    debug!("wrote {} series rows", schedule.pmt_count());
    Ok(())
}
