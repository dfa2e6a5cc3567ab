//! Equal-installment mortgage amortization.
//!
//! [`loan::build_schedule`] turns a set of [`loan::LoanTerms`] into a
//! [`loan::Schedule`]; [`report`] and [`series`] render it.

pub mod error;
pub mod loan;
pub mod report;
pub mod series;

pub use error::{MortgageError, Result};
pub use loan::{
    build_schedule, compute_monthly_payment, LoanTerms, MonthlyRecord, Schedule, YearlyRecord,
};
