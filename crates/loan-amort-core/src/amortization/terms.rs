//! Loan terms and the sparse extra-payment map.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Percent};

// ---------------------------------------------------------------------------
// Payment mode
// ---------------------------------------------------------------------------

/// How the regular monthly payment is determined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    /// Level annuity payment derived from principal, rate and term.
    #[default]
    Calculated,
    /// Borrower pays exactly this amount per month, insurance and fees included.
    Fixed(Money),
}

// ---------------------------------------------------------------------------
// Loan terms
// ---------------------------------------------------------------------------

/// Immutable description of a loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount borrowed.
    pub principal: Money,
    /// Nominal annual rate as a percentage (e.g., 12.5 = 12.5%).
    pub annual_rate_percent: Percent,
    /// Nominal term in months. Only drives the annuity payment; the schedule
    /// may end earlier (extras) or run longer (fixed payment).
    pub term_months: u32,
    /// Date of the first payment.
    pub start_date: NaiveDate,
    /// Constant insurance charge added to every payment.
    #[serde(default)]
    pub insurance_per_period: Money,
    /// Constant fee charge added to every payment.
    #[serde(default)]
    pub fees_per_period: Money,
    #[serde(default)]
    pub payment_mode: PaymentMode,
}

impl LoanTerms {
    /// Calculated-mode terms with no insurance or fees.
    pub fn new(
        principal: Money,
        annual_rate_percent: Percent,
        term_months: u32,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            principal,
            annual_rate_percent,
            term_months,
            start_date,
            insurance_per_period: Decimal::ZERO,
            fees_per_period: Decimal::ZERO,
            payment_mode: PaymentMode::Calculated,
        }
    }

    pub fn with_charges(mut self, insurance: Money, fees: Money) -> Self {
        self.insurance_per_period = insurance;
        self.fees_per_period = fees;
        self
    }

    pub fn with_payment_mode(mut self, mode: PaymentMode) -> Self {
        self.payment_mode = mode;
        self
    }

    /// Insurance plus fees charged every period.
    pub fn recurring_charges(&self) -> Money {
        self.insurance_per_period + self.fees_per_period
    }

    /// Hard upper bound on the number of schedule rows.
    pub fn period_cap(&self) -> u32 {
        self.term_months.saturating_mul(2)
    }
}

// ---------------------------------------------------------------------------
// Extra payments
// ---------------------------------------------------------------------------

/// Extra principal payments keyed by 1-based period. Absent periods are zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtraPayments(BTreeMap<u32, Money>);

impl ExtraPayments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extra amount scheduled for `period`, zero when none.
    pub fn get(&self, period: u32) -> Money {
        self.0.get(&period).copied().unwrap_or(Decimal::ZERO)
    }

    /// Schedule `amount` at `period`, replacing any previous entry. A zero
    /// amount clears the period.
    pub fn insert(&mut self, period: u32, amount: Money) {
        if amount.is_zero() {
            self.0.remove(&period);
        } else {
            self.0.insert(period, amount);
        }
    }

    pub fn remove(&mut self, period: u32) -> Option<Money> {
        self.0.remove(&period)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Entries in ascending period order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, Money)> + '_ {
        self.0.iter().map(|(p, a)| (*p, *a))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all scheduled extras.
    pub fn total(&self) -> Money {
        self.0.values().copied().sum()
    }
}

impl FromIterator<(u32, Money)> for ExtraPayments {
    fn from_iter<I: IntoIterator<Item = (u32, Money)>>(iter: I) -> Self {
        let mut extras = ExtraPayments::new();
        for (period, amount) in iter {
            extras.insert(period, amount);
        }
        extras
    }
}
