//! Validated loan analysis: schedule, summary, payoff status and the effect
//! of extra payments against a no-extras baseline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::payment::{compute_monthly_payment, monthly_rate};
use super::schedule::{build_schedule, schedule_status, AmortizationRow, ScheduleStatus};
use super::summary::{summarize, LoanSummary};
use super::terms::{ExtraPayments, LoanTerms, PaymentMode};
use super::validation::validate_loan_terms;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::AmortizationResult;

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRequest {
    pub terms: LoanTerms,
    #[serde(default)]
    pub extra_payments: ExtraPayments,
}

/// Effect of the extra payments relative to the same loan without them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraPaymentImpact {
    pub baseline: LoanSummary,
    pub interest_saved: Money,
    pub sunk_cost_saved: Money,
    pub months_saved: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanAnalysis {
    /// Regular monthly payment: the annuity, or the fixed amount.
    pub monthly_payment: Money,
    pub status: ScheduleStatus,
    pub schedule: Vec<AmortizationRow>,
    pub summary: LoanSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_payment_impact: Option<ExtraPaymentImpact>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Validate `request`, build its schedule and collect warnings about
/// non-convergence and ignored extra payments.
pub fn analyze_loan(request: &LoanRequest) -> AmortizationResult<ComputationOutput<LoanAnalysis>> {
    let start = Instant::now();
    let terms = &request.terms;
    let extras = &request.extra_payments;

    validate_loan_terms(terms, extras)?;

    let mut warnings: Vec<String> = Vec::new();

    let (monthly_payment, methodology) = match terms.payment_mode {
        PaymentMode::Calculated => (
            compute_monthly_payment(terms.principal, terms.annual_rate_percent, terms.term_months),
            "Level annuity amortization with extra principal payments",
        ),
        PaymentMode::Fixed(amount) => {
            let first_interest = terms.principal * monthly_rate(terms.annual_rate_percent);
            let floor = first_interest + terms.recurring_charges();
            if amount <= floor {
                warnings.push(format!(
                    "Fixed payment {amount} does not exceed first-period interest and charges ({floor}); \
                     no principal is repaid"
                ));
            }
            (
                amount,
                "Fixed-payment amortization with extra principal payments",
            )
        }
    };

    let schedule = build_schedule(terms, extras);
    let summary = summarize(&schedule);
    let status = schedule_status(&schedule);

    if status == ScheduleStatus::SafetyCapReached {
        let outstanding = schedule
            .last()
            .map(|r| r.balance_after)
            .unwrap_or(Decimal::ZERO);
        warnings.push(format!(
            "Loan not repaid within {} periods; {} still outstanding",
            terms.period_cap(),
            outstanding
        ));
    }

    collect_extra_payment_warnings(&schedule, extras, status, &mut warnings);

    let extra_payment_impact = if extras.is_empty() {
        None
    } else {
        let baseline = summarize(&build_schedule(terms, &ExtraPayments::new()));
        Some(ExtraPaymentImpact {
            interest_saved: baseline.total_interest - summary.total_interest,
            sunk_cost_saved: baseline.total_sunk_cost - summary.total_sunk_cost,
            months_saved: baseline
                .actual_term_months
                .saturating_sub(summary.actual_term_months),
            baseline,
        })
    };

    let output = LoanAnalysis {
        monthly_payment,
        status,
        schedule,
        summary,
        extra_payment_impact,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, request, warnings, elapsed, output))
}

fn collect_extra_payment_warnings(
    schedule: &[AmortizationRow],
    extras: &ExtraPayments,
    status: ScheduleStatus,
    warnings: &mut Vec<String>,
) {
    let Some(last) = schedule.last() else {
        return;
    };

    if status == ScheduleStatus::PaidOff {
        let absorbed = extras.get(last.period);
        if absorbed > Decimal::ZERO {
            warnings.push(format!(
                "Extra payment of {absorbed} in period {} falls on the payoff period and is \
                 absorbed into the final payment",
                last.period
            ));
        }
    }

    let ignored: Vec<String> = extras
        .iter()
        .filter(|(period, amount)| *period > last.period && *amount > Decimal::ZERO)
        .map(|(period, _)| period.to_string())
        .collect();
    if !ignored.is_empty() {
        warnings.push(format!(
            "Extra payments scheduled after the final period are ignored (periods {})",
            ignored.join(", ")
        ));
    }
}
