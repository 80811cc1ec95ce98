use tracing::debug;

use crate::types::{Money, Rate};
use crate::{LoanEngineError, LoanEngineResult};

/// Payment periods per year for a monthly-amortizing loan.
pub const PERIODS_PER_YEAR: u32 = 12;

/// Annual rates above this fraction (100% APR) are almost certainly a
/// percentage passed where a fraction was expected.
const RATE_SANITY_CEILING: Rate = 1.0;

/// Periodic (monthly) rate for a nominal annual rate. No rounding.
pub fn monthly_rate(annual_rate: Rate) -> Rate {
    annual_rate / PERIODS_PER_YEAR as f64
}

/// Convert a user-entered percentage (4.5) into a fraction (0.045).
pub fn percent_to_fraction(percent: f64) -> Rate {
    percent / 100.0
}

/// Convert a term entered in years into payment periods.
pub fn years_to_months(years: u32) -> LoanEngineResult<u32> {
    years
        .checked_mul(PERIODS_PER_YEAR)
        .ok_or_else(|| LoanEngineError::InvalidInput {
            field: "term_months".into(),
            reason: format!("{years} years is too long a term."),
        })
}

/// Fixed payment that retires `principal` over `periods` at `rate` per period.
///
/// `principal * r * (1+r)^n / ((1+r)^n - 1)`, rewritten as
/// `principal * r / (1 - (1+r)^-n)` and evaluated in log space, so tiny
/// rates do not cancel and 1200-period terms stay finite.
pub fn annuity_payment(rate: Rate, periods: u32, principal: Money) -> Money {
    if rate == 0.0 {
        return principal / periods as f64;
    }
    principal * rate / discounted_fraction(rate, periods)
}

/// Present value of `periods` equal payments at `rate` per period.
pub fn present_value(rate: Rate, periods: u32, payment: Money) -> Money {
    if rate == 0.0 {
        return payment * periods as f64;
    }
    payment * discounted_fraction(rate, periods) / rate
}

fn log_growth(rate: Rate, periods: u32) -> f64 {
    periods as f64 * rate.ln_1p()
}

/// 1 - (1 + rate)^-periods
fn discounted_fraction(rate: Rate, periods: u32) -> f64 {
    -(-log_growth(rate, periods)).exp_m1()
}

/// Warn when an annual rate looks like a percentage rather than a fraction.
///
/// Only ever produces advice; callers decide whether to re-prompt.
pub fn rate_sanity_warning(annual_rate: Rate) -> Option<String> {
    if annual_rate > RATE_SANITY_CEILING {
        debug!(annual_rate, "annual rate above sanity ceiling");
        Some(format!(
            "Interest rate seems high ({:.2}%). Did you mean {:.2}%?",
            annual_rate * 100.0,
            annual_rate
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_rate() {
        assert_eq!(monthly_rate(0.12), 0.01);
        assert_eq!(monthly_rate(0.0), 0.0);
    }

    #[test]
    fn test_ui_conversions() {
        assert!((percent_to_fraction(4.5) - 0.045).abs() < 1e-15);
        assert_eq!(years_to_months(30).unwrap(), 360);
        assert!(years_to_months(u32::MAX).is_err());
    }

    #[test]
    fn test_hundred_year_term_is_finite() {
        let r = monthly_rate(0.25);
        let payment = annuity_payment(r, 1200, 100_000.0);
        assert!(payment.is_finite());
        // Barely above interest-only at this horizon
        assert!(payment > 100_000.0 * r);
    }

    #[test]
    fn test_annuity_payment_matches_textbook_formula() {
        let r = monthly_rate(0.045);
        let f = (1.0 + r).powi(360);
        let textbook = 250_000.0 * r * f / (f - 1.0);
        assert!((annuity_payment(r, 360, 250_000.0) - textbook).abs() < 1e-8);
    }

    #[test]
    fn test_annuity_payment_tiny_rate() {
        // Approaches straight-line repayment without cancellation error.
        let payment = annuity_payment(1e-13, 360, 360_000.0);
        assert!((payment - 1_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_annuity_payment_zero_rate() {
        assert_eq!(annuity_payment(0.0, 10, 1_000.0), 100.0);
    }

    #[test]
    fn test_present_value_inverts_payment() {
        let r = monthly_rate(0.06);
        let payment = annuity_payment(r, 120, 50_000.0);
        let pv = present_value(r, 120, payment);
        assert!((pv - 50_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_rate_sanity_warning() {
        assert!(rate_sanity_warning(0.045).is_none());
        assert!(rate_sanity_warning(1.0).is_none());
        let warning = rate_sanity_warning(4.5).unwrap();
        assert!(warning.contains("450.00%"));
        assert!(warning.contains("4.50%"));
    }
}
