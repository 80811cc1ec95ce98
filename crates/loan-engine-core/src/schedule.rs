use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::payment::compute;
use crate::time_value::{monthly_rate, present_value, rate_sanity_warning};
use crate::{types::*, LoanEngineResult};

/// Balances below this many currency units are floating drift, not debt.
pub const BALANCE_CLAMP_THRESHOLD: Money = 0.01;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub inputs: LoanInputs,
    pub summary: LoanResult,
    pub rows: Vec<AmortizationRow>,
    /// Sum of principal portions across all rows.
    pub total_principal: Money,
    /// Sum of interest portions across all rows.
    pub total_interest: Money,
}

/// Period-by-period breakdown of a fixed-rate loan.
///
/// The result is a pure function of the inputs: calling this twice with the
/// same arguments yields bit-identical rows, and the last row always carries
/// a remaining balance of exactly zero.
pub fn generate_schedule(
    principal: Money,
    annual_rate: Rate,
    term_months: u32,
) -> LoanEngineResult<Vec<AmortizationRow>> {
    let inputs = LoanInputs::new(principal, annual_rate, term_months)?;
    Ok(amortize(&inputs, compute(&inputs).monthly_payment))
}

/// Full schedule with the loan summary and row totals.
pub fn build_schedule(
    inputs: &LoanInputs,
) -> LoanEngineResult<ComputationOutput<AmortizationSchedule>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    inputs.validate()?;
    if let Some(w) = rate_sanity_warning(inputs.annual_rate) {
        warnings.push(w);
    }

    let summary = compute(inputs);
    let rows = amortize(inputs, summary.monthly_payment);
    let total_principal: Money = rows.iter().map(|r| r.principal_portion).sum();
    let total_interest: Money = rows.iter().map(|r| r.interest_portion).sum();

    let output = AmortizationSchedule {
        inputs: *inputs,
        summary,
        rows,
        total_principal,
        total_interest,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "payment_frequency": "monthly",
        "balance_clamp_threshold": BALANCE_CLAMP_THRESHOLD,
    });

    Ok(with_metadata(
        "Fixed-payment amortization schedule",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// Each closing balance is the present value of the payments still owed, so
/// rounding error does not compound over long terms and the last balance is
/// zero by construction.
fn amortize(inputs: &LoanInputs, monthly_payment: Money) -> Vec<AmortizationRow> {
    let r = monthly_rate(inputs.annual_rate);
    let mut balance = inputs.principal;
    let mut rows = Vec::with_capacity(inputs.term_months as usize);

    for index in 1..=inputs.term_months {
        let interest_portion = balance * r;
        let mut closing = present_value(r, inputs.term_months - index, monthly_payment);
        if closing < BALANCE_CLAMP_THRESHOLD {
            if closing != 0.0 {
                debug!(index, drift = closing, "clamping remaining balance to zero");
            }
            closing = 0.0;
        }
        let principal_portion = balance - closing;
        balance = closing;
        rows.push(AmortizationRow {
            index,
            payment_amount: monthly_payment,
            principal_portion,
            interest_portion,
            remaining_balance: balance,
        });
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_matches_term() {
        let rows = generate_schedule(250_000.0, 0.045, 360).unwrap();
        assert_eq!(rows.len(), 360);
        assert_eq!(rows[0].index, 1);
        assert_eq!(rows[359].index, 360);
    }

    #[test]
    fn test_first_period_split() {
        let rows = generate_schedule(250_000.0, 0.045, 360).unwrap();
        // interest = 250k * 0.045 / 12 = 937.50
        assert!((rows[0].interest_portion - 937.50).abs() < 1e-9);
        assert!((rows[0].principal_portion - (rows[0].payment_amount - 937.50)).abs() < 1e-9);
    }

    #[test]
    fn test_final_balance_exactly_zero() {
        let rows = generate_schedule(250_000.0, 0.045, 360).unwrap();
        assert_eq!(rows.last().unwrap().remaining_balance, 0.0);
    }

    #[test]
    fn test_single_period() {
        let rows = generate_schedule(5_000.0, 0.07, 1).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].remaining_balance, 0.0);
        assert!((rows[0].principal_portion - 5_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_rate_schedule_has_no_interest() {
        let rows = generate_schedule(1_200.0, 0.0, 12).unwrap();
        assert!(rows.iter().all(|r| r.interest_portion == 0.0));
        assert!(rows.iter().all(|r| r.principal_portion == 100.0));
        assert_eq!(rows[11].remaining_balance, 0.0);
    }

    #[test]
    fn test_balance_is_monotonic() {
        let rows = generate_schedule(80_000.0, 0.065, 180).unwrap();
        for pair in rows.windows(2) {
            assert!(pair[1].remaining_balance <= pair[0].remaining_balance);
        }
    }

    #[test]
    fn test_century_term_at_high_rates_fully_amortizes() {
        for (principal, rate) in [(2e6, 0.25), (1e8, 0.3), (1e10, 0.2), (500_000.0, 0.5)] {
            let rows = generate_schedule(principal, rate, 1200).unwrap();
            assert_eq!(rows.last().unwrap().remaining_balance, 0.0);
            let repaid: f64 = rows.iter().map(|r| r.principal_portion).sum();
            assert!(
                (repaid - principal).abs() <= 1e-2_f64.max(principal * 1e-12),
                "principal {principal} at {rate}: repaid {repaid}"
            );
        }
    }

    #[test]
    fn test_portions_add_up_to_payment() {
        let rows = generate_schedule(2e6, 0.25, 1200).unwrap();
        for row in &rows {
            let split = row.principal_portion + row.interest_portion;
            assert!((split - row.payment_amount).abs() <= 1e-6 * row.payment_amount);
        }
    }

    #[test]
    fn test_build_schedule_totals() {
        let inputs = LoanInputs::new(250_000.0, 0.045, 360).unwrap();
        let out = build_schedule(&inputs).unwrap();
        let s = &out.result;
        assert!((s.total_principal - 250_000.0).abs() < 1e-2);
        assert!((s.total_interest - s.summary.total_interest).abs() < 1e-2);
        assert_eq!(s.rows.len(), 360);
    }

    #[test]
    fn test_build_schedule_rejects_invalid_inputs() {
        let inputs = LoanInputs {
            principal: 0.0,
            annual_rate: 0.05,
            term_months: 12,
        };
        assert!(build_schedule(&inputs).is_err());
    }
}
