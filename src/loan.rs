use crate::error::{MortgageError, Result};
use chrono::{Datelike, Months, NaiveDate};
use log::{info, trace, warn};
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use std::{fmt, io::Write, mem};

const MONTHS_PER_YEAR: u32 = 12;
/// Longest accepted term, 100 years.
pub const MAX_TERM_MONTHS: u32 = 100 * MONTHS_PER_YEAR;

/// Rounds a monetary amount to cents, half away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Parameters of a fixed-rate, equal-installment loan.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoanTerms {
    pub principal: Decimal,
    pub term_months: u32,
    /// Nominal annual rate as a percentage, e.g. `5.635`.
    pub annual_rate: Decimal,
    pub first_pmt_date: NaiveDate,
}

impl LoanTerms {
    /// Validated terms for a loan of `term_months` monthly payments.
    pub fn new(
        principal: Decimal,
        term_months: u32,
        annual_rate: Decimal,
        first_pmt_date: NaiveDate,
    ) -> Result<Self> {
        let terms = Self {
            principal,
            term_months,
            annual_rate,
            first_pmt_date,
        };
        terms.validate()?;
        Ok(terms)
    }

    /// Validated terms for a loan quoted in years, `years * 12` payments.
    pub fn from_years(
        principal: Decimal,
        years: u32,
        annual_rate: Decimal,
        first_pmt_date: NaiveDate,
    ) -> Result<Self> {
        let term_months = years.checked_mul(MONTHS_PER_YEAR).ok_or_else(|| {
            MortgageError::InvalidInput(format!("term of {} years is too long", years))
        })?;
        Self::new(principal, term_months, annual_rate, first_pmt_date)
    }

    /// Annual percentage converted to a monthly fraction (`annual_rate / 1200`).
    pub fn monthly_rate(&self) -> Decimal {
        self.annual_rate / Decimal::from(MONTHS_PER_YEAR * 100)
    }

    /// Checks the terms; the fields are public, so the engine calls this again.
    pub fn validate(&self) -> Result<()> {
        validate_inputs(self.principal, self.annual_rate, self.term_months)
    }
}

fn validate_inputs(principal: Decimal, rate: Decimal, term_months: u32) -> Result<()> {
    if principal <= Decimal::ZERO {
        return Err(MortgageError::InvalidInput(format!(
            "principal must be positive, got {}",
            principal
        )));
    }
    if term_months == 0 {
        return Err(MortgageError::InvalidInput(
            "term must be at least one month".to_string(),
        ));
    }
    if term_months > MAX_TERM_MONTHS {
        return Err(MortgageError::InvalidInput(format!(
            "term of {} months exceeds the maximum of {}",
            term_months, MAX_TERM_MONTHS
        )));
    }
    if rate < Decimal::ZERO {
        return Err(MortgageError::InvalidInput(format!(
            "interest rate must not be negative, got {}",
            rate
        )));
    }
    Ok(())
}

/// One month of the amortization schedule.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonthlyRecord {
    pub pmt_number: u32,
    pub pmt_date: NaiveDate,
    pub pmt_amount: Decimal,
    pub principal: Decimal,
    pub interest: Decimal,
    pub interest_percentage: Decimal,
    pub remaining_payment: Decimal,
    pub remaining_principal: Decimal,
    pub remaining_interest: Decimal,
    pub paid_payment: Decimal,
    pub paid_principal: Decimal,
    pub paid_interest: Decimal,
}

impl MonthlyRecord {
    /// Calendar month, 1 to 12.
    pub fn month(&self) -> u32 {
        self.pmt_date.month()
    }

    pub fn year(&self) -> i32 {
        self.pmt_date.year()
    }

    /// Three-letter month abbreviation, `Jan` to `Dec`.
    pub fn month_name(&self) -> String {
        self.pmt_date.format("%b").to_string()
    }
}

impl fmt::Display for MonthlyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pmt number {}, date {}, payment ${:.2}, principal ${:.2}, interest ${:.2}, remaining principal ${:.2}",
            self.pmt_number,
            self.pmt_date,
            round_money(self.pmt_amount),
            round_money(self.principal),
            round_money(self.interest),
            round_money(self.remaining_principal)
        )
    }
}

/// Payments falling in one calendar year.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct YearlyRecord {
    pub year: i32,
    pub months: Vec<MonthlyRecord>,
    pub pmt_amount: Decimal,
    pub principal_amount: Decimal,
    pub interest_amount: Decimal,
}

impl YearlyRecord {
    fn new(year: i32, months: Vec<MonthlyRecord>) -> Self {
        let pmt_amount = months.iter().map(|m| m.pmt_amount).sum();
        let principal_amount = months.iter().map(|m| m.principal).sum();
        let interest_amount = months.iter().map(|m| m.interest).sum();
        Self {
            year,
            months,
            pmt_amount,
            principal_amount,
            interest_amount,
        }
    }
}

/// Full equal-installment schedule for a set of [`LoanTerms`].
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Schedule {
    terms: LoanTerms,
    pmt_amount: Decimal,
    total_payment: Decimal,
    total_interest: Decimal,
    years: Vec<YearlyRecord>,
}

impl Schedule {
    pub fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    /// The constant monthly installment.
    pub fn pmt_amount(&self) -> Decimal {
        self.pmt_amount
    }

    /// Sum of all installments, `pmt_amount * term_months`.
    pub fn total_payment(&self) -> Decimal {
        self.total_payment
    }

    /// Interest paid over the whole term, `total_payment - principal`.
    pub fn total_interest(&self) -> Decimal {
        self.total_interest
    }

    pub fn years(&self) -> &[YearlyRecord] {
        &self.years
    }

    /// Every month in chronological order.
    pub fn months(&self) -> impl Iterator<Item = &MonthlyRecord> {
        self.years.iter().flat_map(|y| y.months.iter())
    }

    pub fn pmt_count(&self) -> usize {
        self.years.iter().map(|y| y.months.len()).sum()
    }

    /// Looks up a month by its 1-based payment number.
    pub fn pmt_detail(&self, pmt_number: usize) -> Option<&MonthlyRecord> {
        self.months().nth(pmt_number.checked_sub(1)?)
    }

    /// Writes one [`MonthlyRecord`] line per payment.
    pub fn show_amortization<W: Write>(&self, mut out: W) -> Result<()> {
        for pmt in self.months() {
            writeln!(out, "{}", pmt)?;
        }
        out.flush()?;
        Ok(())
    }
}

/// Constant monthly payment of an equal-installment loan.
///
/// `principal * r * (1 + r)^n / ((1 + r)^n - 1)`, or `principal / n` when the
/// rate is zero.
pub fn compute_monthly_payment(
    principal: Decimal,
    monthly_rate: Decimal,
    term_months: u32,
) -> Result<Decimal> {
    validate_inputs(principal, monthly_rate, term_months)?;

    if monthly_rate.is_zero() {
        warn!("zero interest rate, repaying principal linearly");
        return Ok(principal / Decimal::from(term_months));
    }

    let factor = growth_factor(monthly_rate, term_months)?;
    principal
        .checked_mul(monthly_rate)
        .and_then(|x| x.checked_mul(factor))
        .and_then(|x| x.checked_div(factor - Decimal::ONE))
        .ok_or_else(|| overflow("monthly payment"))
}

/// Principal and interest portions of month `pmt_number`, from the closed-form
/// annuity expressions instead of the running balance.
pub fn closed_form_portions(terms: &LoanTerms, pmt_number: u32) -> Result<(Decimal, Decimal)> {
    terms.validate()?;
    if pmt_number == 0 || pmt_number > terms.term_months {
        return Err(MortgageError::InvalidInput(format!(
            "payment number {} outside 1..={}",
            pmt_number, terms.term_months
        )));
    }

    let r = terms.monthly_rate();
    if r.is_zero() {
        return Ok((
            terms.principal / Decimal::from(terms.term_months),
            Decimal::ZERO,
        ));
    }

    let factor = growth_factor(r, terms.term_months)?;
    let grown = growth_factor(r, pmt_number - 1)?;
    let base = terms
        .principal
        .checked_mul(r)
        .and_then(|x| x.checked_div(factor - Decimal::ONE))
        .ok_or_else(|| overflow("closed-form base"))?;
    let principal = base.checked_mul(grown).ok_or_else(|| overflow("principal portion"))?;
    let interest = base
        .checked_mul(factor - grown)
        .ok_or_else(|| overflow("interest portion"))?;
    Ok((principal, interest))
}

fn overflow(what: &str) -> MortgageError {
    MortgageError::Overflow(format!("{} is out of range", what))
}

fn checked(value: Option<Decimal>, what: &str) -> Result<Decimal> {
    value.ok_or_else(|| overflow(what))
}

fn growth_factor(monthly_rate: Decimal, periods: u32) -> Result<Decimal> {
    (Decimal::ONE + monthly_rate)
        .checked_powu(u64::from(periods))
        .ok_or_else(|| {
            MortgageError::Overflow(format!(
                "(1 + {})^{} is out of range",
                monthly_rate, periods
            ))
        })
}

/// Running totals carried from one month to the next.
#[derive(Clone, Copy, PartialEq, Debug)]
struct Balances {
    remaining_payment: Decimal,
    remaining_principal: Decimal,
    remaining_interest: Decimal,
    paid_payment: Decimal,
    paid_principal: Decimal,
    paid_interest: Decimal,
}

impl Balances {
    fn opening(total_payment: Decimal, principal: Decimal, total_interest: Decimal) -> Self {
        Self {
            remaining_payment: total_payment,
            remaining_principal: principal,
            remaining_interest: total_interest,
            paid_payment: Decimal::ZERO,
            paid_principal: Decimal::ZERO,
            paid_interest: Decimal::ZERO,
        }
    }

    /// Applies one payment, returning the new balances and the month it produced.
    fn pay(
        self,
        pmt_number: u32,
        pmt_date: NaiveDate,
        pmt_amount: Decimal,
        monthly_rate: Decimal,
    ) -> Result<(Self, MonthlyRecord)> {
        let interest = checked(
            self.remaining_principal.checked_mul(monthly_rate),
            "monthly interest",
        )?;
        let principal = checked(pmt_amount.checked_sub(interest), "monthly principal")?;
        let next = Self {
            remaining_payment: checked(
                self.remaining_payment.checked_sub(pmt_amount),
                "remaining payment",
            )?,
            remaining_principal: checked(
                self.remaining_principal.checked_sub(principal),
                "remaining principal",
            )?,
            remaining_interest: checked(
                self.remaining_interest.checked_sub(interest),
                "remaining interest",
            )?,
            paid_payment: checked(self.paid_payment.checked_add(pmt_amount), "paid payment")?,
            paid_principal: checked(self.paid_principal.checked_add(principal), "paid principal")?,
            paid_interest: checked(self.paid_interest.checked_add(interest), "paid interest")?,
        };
        let record = MonthlyRecord {
            pmt_number,
            pmt_date,
            pmt_amount,
            principal,
            interest,
            interest_percentage: checked(
                interest
                    .checked_div(pmt_amount)
                    .and_then(|x| x.checked_mul(Decimal::ONE_HUNDRED)),
                "interest percentage",
            )?,
            remaining_payment: next.remaining_payment,
            remaining_principal: next.remaining_principal,
            remaining_interest: next.remaining_interest,
            paid_payment: next.paid_payment,
            paid_principal: next.paid_principal,
            paid_interest: next.paid_interest,
        };
        Ok((next, record))
    }
}

// month n falls n-1 calendar months after the first payment, clamped to month end
fn get_pmt_date(first_pmt_date: NaiveDate, pmt_number: u32) -> Result<NaiveDate> {
    first_pmt_date
        .checked_add_months(Months::new(pmt_number - 1))
        .ok_or_else(|| {
            MortgageError::Overflow(format!(
                "payment {} after {} is out of the calendar range",
                pmt_number, first_pmt_date
            ))
        })
}

fn build_months(
    terms: &LoanTerms,
    pmt_amount: Decimal,
    total_payment: Decimal,
    total_interest: Decimal,
) -> Result<Vec<MonthlyRecord>> {
    let monthly_rate = terms.monthly_rate();
    let opening = Balances::opening(total_payment, terms.principal, total_interest);

    let (months, _) = (1..=terms.term_months).try_fold(
        (Vec::with_capacity(terms.term_months as usize), opening),
        |(mut months, balances), pmt_number| {
            let pmt_date = get_pmt_date(terms.first_pmt_date, pmt_number)?;
            let (next, record) = balances.pay(pmt_number, pmt_date, pmt_amount, monthly_rate)?;
            trace!(
                "pmt # {}, date {}, interest {}, remaining principal {}",
                pmt_number,
                pmt_date,
                record.interest,
                record.remaining_principal
            );
            months.push(record);
            Ok::<_, MortgageError>((months, next))
        },
    )?;
    Ok(months)
}

/// Splits a chronological run of months into calendar years.
///
/// A year closes after its December payment; whatever is left after the last
/// month forms a trailing partial year.
pub fn group_by_year(months: Vec<MonthlyRecord>) -> Vec<YearlyRecord> {
    let mut years = Vec::new();
    let mut current: Vec<MonthlyRecord> = Vec::new();

    for month in months {
        let closes_year = month.month() == MONTHS_PER_YEAR;
        let year = month.year();
        current.push(month);
        if closes_year {
            years.push(YearlyRecord::new(year, mem::take(&mut current)));
        }
    }
    if let Some(last) = current.first() {
        let year = last.year();
        years.push(YearlyRecord::new(year, current));
    }
    years
}

/// Builds the complete amortization schedule for `terms`.
pub fn build_schedule(terms: &LoanTerms) -> Result<Schedule> {
    terms.validate()?;

    let pmt_amount = compute_monthly_payment(terms.principal, terms.monthly_rate(), terms.term_months)?;
    let total_payment = pmt_amount
        .checked_mul(Decimal::from(terms.term_months))
        .ok_or_else(|| overflow("total payment"))?;
    let total_interest = total_payment
        .checked_sub(terms.principal)
        .ok_or_else(|| overflow("total interest"))?;

    let months = build_months(terms, pmt_amount, total_payment, total_interest)?;
    let years = group_by_year(months);

    info!(
        "built schedule: {} payments of {} over {} years, total interest {}",
        terms.term_months,
        round_money(pmt_amount),
        years.len(),
        round_money(total_interest)
    );

    Ok(Schedule {
        terms: *terms,
        pmt_amount,
        total_payment,
        total_interest,
        years,
    })
}
