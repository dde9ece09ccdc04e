//! Loan amortization: annuity payment, period-by-period schedule and
//! summary totals, plus a validated analysis layer on top.
//!
//! The engine functions ([`payment::compute_monthly_payment`],
//! [`schedule::build_schedule`], [`summary::summarize`]) never fail: degenerate
//! input yields an empty or capped schedule. [`analysis::analyze_loan`] is the
//! strict entry point that validates first and reports warnings.

pub mod analysis;
pub mod payment;
pub mod schedule;
pub mod summary;
pub mod terms;
pub mod validation;

pub use analysis::{analyze_loan, LoanAnalysis, LoanRequest};
pub use payment::{compute_monthly_payment, monthly_rate};
pub use schedule::{build_schedule, schedule_status, AmortizationRow, ScheduleStatus};
pub use summary::{summarize, LoanSummary};
pub use terms::{ExtraPayments, LoanTerms, PaymentMode};
pub use validation::validate_loan_terms;
