//! Level annuity payment.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::types::{Money, Percent, Rate};

/// Monthly rate from an annual percentage: `annual / 100 / 12`.
pub fn monthly_rate(annual_rate_percent: Percent) -> Rate {
    annual_rate_percent / dec!(100) / dec!(12)
}

/// Standard fixed-rate payment: P * r(1+r)^n / ((1+r)^n - 1)
///
/// Returns zero for a zero term and the straight-line `P / n` for a zero rate.
/// When `(1+r)^n` or any intermediate product exceeds the decimal range the
/// payment converges to the interest-only limit `P * r`, saturating at
/// [`Decimal::MAX`].
pub fn compute_monthly_payment(
    principal: Money,
    annual_rate_percent: Percent,
    term_months: u32,
) -> Money {
    if term_months == 0 {
        return Decimal::ZERO;
    }

    let r = monthly_rate(annual_rate_percent);
    let n = Decimal::from(term_months);

    if r.is_zero() {
        return principal / n;
    }

    let compound = match (Decimal::ONE + r).checked_powu(u64::from(term_months)) {
        Some(c) => c,
        None => return interest_only(principal, r),
    };
    let denominator = compound - Decimal::ONE;

    // Rate too small to register over the term.
    if denominator.is_zero() {
        return principal / n;
    }

    r.checked_mul(compound)
        .and_then(|scaled| scaled.checked_div(denominator))
        .and_then(|factor| principal.checked_mul(factor))
        .unwrap_or_else(|| interest_only(principal, r))
}

fn interest_only(principal: Money, r: Rate) -> Money {
    principal.checked_mul(r).unwrap_or(Decimal::MAX)
}
