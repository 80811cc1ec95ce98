use serde::{Deserialize, Serialize};

use crate::{LoanEngineError, LoanEngineResult};

/// All monetary values, in currency units.
pub type Money = f64;

/// Rates expressed as fractions (0.045 = 4.5%). Never as percentages.
pub type Rate = f64;

/// Principal, annual rate and term of a single fixed-rate loan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanInputs {
    pub principal: Money,
    pub annual_rate: Rate,
    pub term_months: u32,
}

impl LoanInputs {
    /// Build a validated set of loan inputs.
    pub fn new(principal: Money, annual_rate: Rate, term_months: u32) -> LoanEngineResult<Self> {
        let inputs = Self {
            principal,
            annual_rate,
            term_months,
        };
        inputs.validate()?;
        Ok(inputs)
    }

    /// Check the invariants for values that did not come through `new`,
    /// e.g. inputs deserialised from JSON.
    pub fn validate(&self) -> LoanEngineResult<()> {
        if !self.principal.is_finite() || self.principal <= 0.0 {
            return Err(LoanEngineError::InvalidInput {
                field: "principal".into(),
                reason: "Loan amount must be a finite number greater than 0.".into(),
            });
        }
        if !self.annual_rate.is_finite() || self.annual_rate < 0.0 {
            return Err(LoanEngineError::InvalidInput {
                field: "annual_rate".into(),
                reason: "Annual rate must be a finite fraction of at least 0.".into(),
            });
        }
        if self.term_months == 0 {
            return Err(LoanEngineError::InvalidInput {
                field: "term_months".into(),
                reason: "Term must be at least one month.".into(),
            });
        }
        Ok(())
    }
}

/// Payment and totals for a fixed-rate loan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanResult {
    pub monthly_payment: Money,
    pub total_payment: Money,
    pub total_interest: Money,
    /// Total interest as a fraction of principal.
    pub effective_rate: Rate,
}

/// A single period of an amortization schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// 1-based period number.
    pub index: u32,
    pub payment_amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub remaining_balance: Money,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "f64_ieee754".to_string(),
        },
    }
}
