//! Strict checks for loan terms before analysis.
//!
//! [`build_schedule`](super::schedule::build_schedule) tolerates incomplete
//! input by returning an empty schedule. Callers that want to know *why*
//! nothing was produced run these checks first.

use chrono::Months;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use super::payment::monthly_rate;
use super::terms::{ExtraPayments, LoanTerms, PaymentMode};
use crate::error::AmortizationError;
use crate::AmortizationResult;

const MAX_PRINCIPAL: Decimal = dec!(1_000_000_000);
const MAX_ANNUAL_RATE_PERCENT: Decimal = dec!(1000);
const MAX_TERM_MONTHS: u32 = 600;

/// Largest `(1+r)^n` whose annuity still resolves a principal share within
/// decimal precision.
const MAX_COMPOUND_GROWTH: Decimal = dec!(1_000_000_000_000_000_000);

fn invalid(field: &str, reason: impl Into<String>) -> AmortizationError {
    AmortizationError::InvalidInput {
        field: field.into(),
        reason: reason.into(),
    }
}

pub fn validate_loan_terms(terms: &LoanTerms, extras: &ExtraPayments) -> AmortizationResult<()> {
    if terms.principal <= Decimal::ZERO {
        return Err(invalid("principal", "Principal must be positive"));
    }
    if terms.principal > MAX_PRINCIPAL {
        return Err(invalid(
            "principal",
            format!("Principal must not exceed {MAX_PRINCIPAL}"),
        ));
    }
    if terms.annual_rate_percent < Decimal::ZERO {
        return Err(invalid("annual_rate_percent", "Rate cannot be negative"));
    }
    if terms.annual_rate_percent > MAX_ANNUAL_RATE_PERCENT {
        return Err(invalid(
            "annual_rate_percent",
            format!("Rate above {MAX_ANNUAL_RATE_PERCENT}% is not plausible"),
        ));
    }
    if terms.term_months == 0 {
        return Err(invalid("term_months", "Term must be greater than zero"));
    }
    if terms.term_months > MAX_TERM_MONTHS {
        return Err(invalid(
            "term_months",
            format!("Term cannot exceed {MAX_TERM_MONTHS} months (50 years)"),
        ));
    }
    let growth = (Decimal::ONE + monthly_rate(terms.annual_rate_percent))
        .checked_powu(u64::from(terms.term_months));
    if growth.map_or(true, |g| g > MAX_COMPOUND_GROWTH) {
        return Err(invalid(
            "annual_rate_percent",
            format!(
                "Rate of {}% compounds beyond decimal precision over {} months",
                terms.annual_rate_percent, terms.term_months
            ),
        ));
    }
    let last_period = Months::new(terms.period_cap() - 1);
    if terms.start_date.checked_add_months(last_period).is_none() {
        return Err(AmortizationError::DateError(format!(
            "Payment dates from {} run past the supported calendar",
            terms.start_date
        )));
    }
    if terms.insurance_per_period < Decimal::ZERO {
        return Err(invalid("insurance_per_period", "Insurance cannot be negative"));
    }
    if terms.fees_per_period < Decimal::ZERO {
        return Err(invalid("fees_per_period", "Fees cannot be negative"));
    }
    if let PaymentMode::Fixed(amount) = terms.payment_mode {
        if amount <= Decimal::ZERO {
            return Err(invalid("payment_mode", "Fixed payment must be positive"));
        }
    }
    for (period, amount) in extras.iter() {
        if period == 0 {
            return Err(invalid("extra_payments", "Periods are numbered from 1"));
        }
        if amount < Decimal::ZERO {
            return Err(invalid(
                "extra_payments",
                format!("Extra payment for period {period} cannot be negative"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn valid_terms() -> LoanTerms {
        LoanTerms::new(
            dec!(250_000),
            dec!(6.5),
            360,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        )
    }

    fn field_of(err: AmortizationError) -> String {
        match err {
            AmortizationError::InvalidInput { field, .. } => field,
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_terms_pass() {
        let extras: ExtraPayments = [(12, dec!(5_000))].into_iter().collect();
        assert!(validate_loan_terms(&valid_terms(), &extras).is_ok());
    }

    #[test]
    fn test_rejects_non_positive_principal() {
        let mut terms = valid_terms();
        terms.principal = Decimal::ZERO;
        let err = validate_loan_terms(&terms, &ExtraPayments::new()).unwrap_err();
        assert_eq!(field_of(err), "principal");
    }

    #[test]
    fn test_rejects_term_beyond_fifty_years() {
        let mut terms = valid_terms();
        terms.term_months = 601;
        let err = validate_loan_terms(&terms, &ExtraPayments::new()).unwrap_err();
        assert_eq!(field_of(err), "term_months");
    }

    #[test]
    fn test_rejects_implausible_rate() {
        let mut terms = valid_terms();
        terms.annual_rate_percent = dec!(1000.01);
        let err = validate_loan_terms(&terms, &ExtraPayments::new()).unwrap_err();
        assert_eq!(field_of(err), "annual_rate_percent");
    }

    #[test]
    fn test_rejects_zero_fixed_payment() {
        let terms = valid_terms().with_payment_mode(PaymentMode::Fixed(Decimal::ZERO));
        let err = validate_loan_terms(&terms, &ExtraPayments::new()).unwrap_err();
        assert_eq!(field_of(err), "payment_mode");
    }

    #[test]
    fn test_rejects_negative_charges() {
        let terms = valid_terms().with_charges(dec!(-1), Decimal::ZERO);
        let err = validate_loan_terms(&terms, &ExtraPayments::new()).unwrap_err();
        assert_eq!(field_of(err), "insurance_per_period");
    }

    #[test]
    fn test_rejects_period_zero_and_negative_extras() {
        let zero_period: ExtraPayments = [(0, dec!(100))].into_iter().collect();
        let err = validate_loan_terms(&valid_terms(), &zero_period).unwrap_err();
        assert_eq!(field_of(err), "extra_payments");

        let negative: ExtraPayments = [(4, dec!(-100))].into_iter().collect();
        let err = validate_loan_terms(&valid_terms(), &negative).unwrap_err();
        assert_eq!(field_of(err), "extra_payments");
    }

    #[test]
    fn test_rejects_rate_compounding_past_precision() {
        let mut terms = valid_terms();
        terms.annual_rate_percent = dec!(1000);
        let err = validate_loan_terms(&terms, &ExtraPayments::new()).unwrap_err();
        assert_eq!(field_of(err), "annual_rate_percent");
    }

    #[test]
    fn test_accepts_high_rate_within_precision() {
        let mut terms = valid_terms();
        terms.annual_rate_percent = dec!(99.9);
        assert!(validate_loan_terms(&terms, &ExtraPayments::new()).is_ok());
    }

    #[test]
    fn test_rejects_dates_past_calendar_end() {
        let mut terms = valid_terms();
        terms.start_date = NaiveDate::MAX;
        terms.term_months = 12;
        let err = validate_loan_terms(&terms, &ExtraPayments::new()).unwrap_err();
        assert!(matches!(err, AmortizationError::DateError(_)));
    }
}
