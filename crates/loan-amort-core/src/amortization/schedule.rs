//! Period-by-period amortization schedule.
//!
//! Each period charges simple interest on the opening balance, then applies
//! the regular principal share plus any scheduled extra. The regular share
//! comes from the annuity payment ([`PaymentMode::Calculated`]) or from what
//! is left of a fixed payment after insurance, interest and fees
//! ([`PaymentMode::Fixed`]).
//!
//! The loop stops as soon as the balance reaches zero, or after
//! `2 * term_months` periods if a fixed payment never covers the interest.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::payment::{compute_monthly_payment, monthly_rate};
use super::terms::{ExtraPayments, LoanTerms, PaymentMode};
use crate::types::{Money, Rate};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Remaining balance at or below which the period is treated as the payoff.
const PAYOFF_TOLERANCE: Decimal = dec!(0.01);

/// Upper bound on the up-front row allocation.
const MAX_PREALLOCATED_ROWS: u32 = 1200;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One payment period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// 1-based, contiguous.
    pub period: u32,
    pub payment_date: NaiveDate,
    /// Cash disbursed this period: principal, extra, interest, insurance, fees.
    pub total_payment: Money,
    pub interest_component: Money,
    /// Regular principal share, excluding the extra.
    pub principal_component: Money,
    pub extra_component: Money,
    pub balance_after: Money,
    /// Running total of interest, insurance and fees.
    pub cumulative_sunk_cost: Money,
}

/// How a schedule ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    /// Balance reached exactly zero.
    PaidOff,
    /// Period cap hit with a balance still outstanding.
    SafetyCapReached,
    /// No rows: the terms were incomplete, or the first period's amounts
    /// exceed the decimal range.
    Empty,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the full schedule for `terms`, applying `extras` by period.
///
/// Returns an empty vector when the principal is not positive, the rate is
/// negative or the term is zero. Stops early, with a warning, when a payment
/// date or a period amount falls outside the representable range.
pub fn build_schedule(terms: &LoanTerms, extras: &ExtraPayments) -> Vec<AmortizationRow> {
    if terms.principal <= Decimal::ZERO
        || terms.annual_rate_percent < Decimal::ZERO
        || terms.term_months == 0
    {
        return Vec::new();
    }

    let rate = monthly_rate(terms.annual_rate_percent);
    let annuity = compute_monthly_payment(
        terms.principal,
        terms.annual_rate_percent,
        terms.term_months,
    );
    let cap = terms.period_cap();

    let mut rows = Vec::with_capacity(terms.term_months.min(MAX_PREALLOCATED_ROWS) as usize);
    let mut balance = terms.principal;
    let mut sunk_cost = Decimal::ZERO;
    let mut period: u32 = 1;

    while balance > Decimal::ZERO && period <= cap {
        let payment_date = match terms.start_date.checked_add_months(Months::new(period - 1)) {
            Some(d) => d,
            None => {
                tracing::warn!(period, "payment date out of calendar range; schedule truncated");
                break;
            }
        };

        let opening = Opening {
            period,
            payment_date,
            balance,
            sunk_cost,
            extra: extras.get(period).max(Decimal::ZERO),
        };
        let row = match period_row(terms, rate, annuity, opening) {
            Some(row) => row,
            None => {
                tracing::warn!(period, "period amounts exceed decimal range; schedule truncated");
                break;
            }
        };

        balance = row.balance_after;
        sunk_cost = row.cumulative_sunk_cost;
        rows.push(row);
        period += 1;
    }

    tracing::debug!(
        mode = ?terms.payment_mode,
        rows = rows.len(),
        final_balance = %balance,
        "amortization schedule built"
    );
    if balance > Decimal::ZERO && period > cap {
        tracing::warn!(
            cap,
            outstanding = %balance,
            "schedule reached period cap without paying off the loan"
        );
    }

    rows
}

/// State carried into a period.
struct Opening {
    period: u32,
    payment_date: NaiveDate,
    balance: Money,
    sunk_cost: Money,
    extra: Money,
}

/// Split one period's payment. `None` if any amount leaves the decimal range.
fn period_row(
    terms: &LoanTerms,
    rate: Rate,
    annuity: Money,
    open: Opening,
) -> Option<AmortizationRow> {
    let insurance = terms.insurance_per_period;
    let fees = terms.fees_per_period;

    let interest = open.balance.checked_mul(rate)?;
    let charges = interest.checked_add(insurance)?.checked_add(fees)?;

    let (base_principal, regular_payment) = match terms.payment_mode {
        PaymentMode::Calculated => (
            annuity.checked_sub(interest)?.max(Decimal::ZERO),
            annuity.checked_add(insurance)?.checked_add(fees)?,
        ),
        PaymentMode::Fixed(amount) => (amount.checked_sub(charges)?.max(Decimal::ZERO), amount),
    };

    let desired = base_principal.checked_add(open.extra)?;
    let remaining = open.balance.checked_sub(desired)?;
    let cumulative_sunk_cost = open.sunk_cost.checked_add(charges)?;

    if remaining <= PAYOFF_TOLERANCE {
        // Payoff: clear the exact balance; any extra is absorbed into it.
        Some(AmortizationRow {
            period: open.period,
            payment_date: open.payment_date,
            total_payment: open.balance.checked_add(charges)?,
            interest_component: interest,
            principal_component: open.balance,
            extra_component: Decimal::ZERO,
            balance_after: Decimal::ZERO,
            cumulative_sunk_cost,
        })
    } else {
        // Not clamped, so the full extra lands on top of the regular share.
        Some(AmortizationRow {
            period: open.period,
            payment_date: open.payment_date,
            total_payment: regular_payment.checked_add(open.extra)?,
            interest_component: interest,
            principal_component: base_principal,
            extra_component: open.extra,
            balance_after: remaining,
            cumulative_sunk_cost,
        })
    }
}

/// Classify how `rows` (as returned by [`build_schedule`]) ended.
pub fn schedule_status(rows: &[AmortizationRow]) -> ScheduleStatus {
    match rows.last() {
        None => ScheduleStatus::Empty,
        Some(last) if last.balance_after.is_zero() => ScheduleStatus::PaidOff,
        Some(_) => ScheduleStatus::SafetyCapReached,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
    }

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, msg: &str) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tol,
            "{}: expected ~{}, got {} (diff = {})",
            msg,
            expected,
            actual,
            diff
        );
    }

    #[test]
    fn test_guard_clauses_return_empty() {
        let none = ExtraPayments::new();
        let zero_principal = LoanTerms::new(Decimal::ZERO, dec!(5), 12, start());
        let negative_rate = LoanTerms::new(dec!(1000), dec!(-1), 12, start());
        let zero_term = LoanTerms::new(dec!(1000), dec!(5), 0, start());

        assert!(build_schedule(&zero_principal, &none).is_empty());
        assert!(build_schedule(&negative_rate, &none).is_empty());
        assert!(build_schedule(&zero_term, &none).is_empty());
        assert_eq!(schedule_status(&[]), ScheduleStatus::Empty);
    }

    #[test]
    fn test_first_period_split_at_twelve_percent() {
        let terms = LoanTerms::new(dec!(100_000), dec!(12), 360, start());
        let rows = build_schedule(&terms, &ExtraPayments::new());

        assert_eq!(rows.len(), 360);
        assert_eq!(rows[0].interest_component, dec!(1000));
        assert_close(rows[0].principal_component, dec!(28.61), dec!(0.01), "period 1 principal");
        assert_eq!(rows.last().unwrap().balance_after, Decimal::ZERO);
        assert_eq!(schedule_status(&rows), ScheduleStatus::PaidOff);
    }

    #[test]
    fn test_zero_rate_pays_equal_instalments() {
        let terms = LoanTerms::new(dec!(12_000), Decimal::ZERO, 12, start());
        let rows = build_schedule(&terms, &ExtraPayments::new());

        assert_eq!(rows.len(), 12);
        for row in &rows {
            assert_eq!(row.total_payment, dec!(1000));
            assert_eq!(row.interest_component, Decimal::ZERO);
        }
        assert_eq!(rows[11].balance_after, Decimal::ZERO);
    }

    #[test]
    fn test_payment_dates_follow_calendar_months() {
        let terms = LoanTerms::new(dec!(3_000), Decimal::ZERO, 3, start());
        let rows = build_schedule(&terms, &ExtraPayments::new());
        let dates: Vec<NaiveDate> = rows.iter().map(|r| r.payment_date).collect();

        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
                NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(),
                NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
            ]
        );
    }

    #[test]
    fn test_leap_year_february() {
        let terms = LoanTerms::new(
            dec!(2_000),
            Decimal::ZERO,
            2,
            NaiveDate::from_ymd_opt(2024, 1, 30).unwrap(),
        );
        let rows = build_schedule(&terms, &ExtraPayments::new());
        assert_eq!(rows[1].payment_date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_insurance_and_fees_are_sunk_cost() {
        let terms = LoanTerms::new(dec!(12_000), Decimal::ZERO, 12, start())
            .with_charges(dec!(15), dec!(5));
        let rows = build_schedule(&terms, &ExtraPayments::new());

        assert_eq!(rows[0].total_payment, dec!(1020));
        assert_eq!(rows[0].cumulative_sunk_cost, dec!(20));
        assert_eq!(rows[11].cumulative_sunk_cost, dec!(240));
        assert_eq!(rows[11].total_payment, dec!(1020));
    }

    #[test]
    fn test_extra_payment_reported_separately() {
        let terms = LoanTerms::new(dec!(12_000), Decimal::ZERO, 12, start());
        let extras: ExtraPayments = [(2, dec!(500))].into_iter().collect();
        let rows = build_schedule(&terms, &extras);

        assert_eq!(rows[1].principal_component, dec!(1000));
        assert_eq!(rows[1].extra_component, dec!(500));
        assert_eq!(rows[1].total_payment, dec!(1500));
        assert_eq!(rows[1].balance_after, dec!(9_500));
        // 500 ahead of plan: the last instalment is only 500.
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[11].principal_component, dec!(500));
    }

    #[test]
    fn test_oversized_extra_clamps_to_balance() {
        let terms = LoanTerms::new(dec!(12_000), Decimal::ZERO, 12, start());
        let extras: ExtraPayments = [(3, dec!(1_000_000))].into_iter().collect();
        let rows = build_schedule(&terms, &extras);

        assert_eq!(rows.len(), 3);
        let last = &rows[2];
        assert_eq!(last.principal_component, dec!(10_000));
        assert_eq!(last.extra_component, Decimal::ZERO);
        assert_eq!(last.total_payment, dec!(10_000));
        assert_eq!(last.balance_after, Decimal::ZERO);
        assert!(rows.iter().all(|r| r.balance_after >= Decimal::ZERO));
    }

    #[test]
    fn test_fixed_payment_recomputes_split() {
        let terms = LoanTerms::new(dec!(10_000), dec!(12), 24, start())
            .with_charges(dec!(10), dec!(5))
            .with_payment_mode(PaymentMode::Fixed(dec!(600)));
        let rows = build_schedule(&terms, &ExtraPayments::new());

        // 600 - 10 insurance - 100 interest - 5 fees
        assert_eq!(rows[0].principal_component, dec!(485));
        assert_eq!(rows[0].total_payment, dec!(600));
        assert_eq!(rows[1].interest_component, dec!(95.15));
        assert_eq!(rows.last().unwrap().balance_after, Decimal::ZERO);
        assert!(rows.len() < 24);
    }

    #[test]
    fn test_fixed_payment_too_low_hits_cap() {
        // Period 1 interest is 200; 150 never reaches principal.
        let terms = LoanTerms::new(dec!(10_000), dec!(24), 12, start())
            .with_payment_mode(PaymentMode::Fixed(dec!(150)));
        let rows = build_schedule(&terms, &ExtraPayments::new());

        assert_eq!(rows.len(), 24);
        assert_eq!(rows.last().unwrap().balance_after, dec!(10_000));
        assert_eq!(schedule_status(&rows), ScheduleStatus::SafetyCapReached);
    }

    #[test]
    fn test_final_period_snaps_to_exact_zero() {
        let terms = LoanTerms::new(dec!(50_000), dec!(7.25), 84, start());
        let rows = build_schedule(&terms, &ExtraPayments::new());
        let last = rows.last().unwrap();

        assert_eq!(last.balance_after, Decimal::ZERO);
        let opening = rows[rows.len() - 2].balance_after;
        assert_eq!(last.principal_component, opening);
        assert_eq!(last.total_payment, opening + last.interest_component);
    }

    #[test]
    fn test_extra_on_final_period_is_absorbed() {
        let terms = LoanTerms::new(dec!(12_000), Decimal::ZERO, 12, start());
        let extras: ExtraPayments = [(12, dec!(300))].into_iter().collect();
        let rows = build_schedule(&terms, &extras);

        assert_eq!(rows.len(), 12);
        assert_eq!(rows[11].extra_component, Decimal::ZERO);
        assert_eq!(rows[11].total_payment, dec!(1000));
    }

    #[test]
    fn test_extreme_rate_runs_to_cap_without_overflow() {
        // r * (1+r)^n overflows; the annuity falls back to interest only.
        let terms = LoanTerms::new(dec!(1_000), dec!(2400), 60, start());
        let rows = build_schedule(&terms, &ExtraPayments::new());

        assert_eq!(rows.len(), 120);
        assert_eq!(rows[0].interest_component, dec!(2_000));
        assert_eq!(rows.last().unwrap().balance_after, dec!(1_000));
        assert_eq!(schedule_status(&rows), ScheduleStatus::SafetyCapReached);
    }

    #[test]
    fn test_unrepresentable_interest_truncates_schedule() {
        let terms = LoanTerms::new(
            dec!(1_000_000_000_000),
            dec!(100_000_000_000_000_000_000),
            12,
            start(),
        );
        let rows = build_schedule(&terms, &ExtraPayments::new());

        assert!(rows.is_empty());
        assert_eq!(schedule_status(&rows), ScheduleStatus::Empty);
    }

    #[test]
    fn test_high_representable_rate_converges_on_term() {
        let terms = LoanTerms::new(dec!(10_000), dec!(200), 120, start());
        let rows = build_schedule(&terms, &ExtraPayments::new());

        assert_eq!(rows.len(), 120);
        assert_eq!(rows.last().unwrap().balance_after, Decimal::ZERO);
    }
}
