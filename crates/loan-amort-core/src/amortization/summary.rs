use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::schedule::AmortizationRow;
use crate::types::Money;

/// Totals over a schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub total_paid: Money,
    pub total_interest: Money,
    /// Regular principal only; extras are in `total_extra`.
    pub total_principal: Money,
    pub total_extra: Money,
    /// Interest, insurance and fees over the life of the loan.
    pub total_sunk_cost: Money,
    pub actual_term_months: u32,
}

/// Reduce `rows` to totals. An empty schedule gives an all-zero summary.
pub fn summarize(rows: &[AmortizationRow]) -> LoanSummary {
    let Some(last) = rows.last() else {
        return LoanSummary::default();
    };

    let mut summary = LoanSummary {
        total_sunk_cost: last.cumulative_sunk_cost,
        actual_term_months: rows.len() as u32,
        ..LoanSummary::default()
    };
    for row in rows {
        summary.total_paid += row.total_payment;
        summary.total_interest += row.interest_component;
        summary.total_principal += row.principal_component;
        summary.total_extra += row.extra_component;
    }
    summary
}

impl LoanSummary {
    /// Principal actually returned, regular plus extra.
    pub fn principal_repaid(&self) -> Money {
        self.total_principal + self.total_extra
    }

    /// Sunk cost per unit of principal repaid; zero for an empty schedule.
    pub fn cost_ratio(&self) -> Decimal {
        let repaid = self.principal_repaid();
        if repaid.is_zero() {
            Decimal::ZERO
        } else {
            self.total_sunk_cost / repaid
        }
    }
}
