//! Boundary to whatever persists a user's calculation history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::payment::calculate;
use crate::types::{LoanInputs, LoanResult};
use crate::LoanEngineResult;

pub type UserId = u64;
pub type CalculationId = u64;

static LAST_ID: AtomicU64 = AtomicU64::new(0);

/// A fully computed calculation, ready to hand to a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedCalculation {
    /// Unique per calculation; records written before ids existed read as 0.
    #[serde(default)]
    pub id: CalculationId,
    pub user_id: UserId,
    pub inputs: LoanInputs,
    pub result: LoanResult,
    pub calculated_at: DateTime<Utc>,
}

impl SavedCalculation {
    /// Compute the result for `inputs` and stamp it with the current time.
    pub fn new(user_id: UserId, inputs: LoanInputs) -> LoanEngineResult<Self> {
        let result = calculate(&inputs)?;
        let calculated_at = Utc::now();
        Ok(Self {
            id: next_id(calculated_at),
            user_id,
            inputs,
            result,
            calculated_at,
        })
    }
}

/// Microsecond timestamp, bumped past the last id handed out in this process
/// so ids stay unique and increasing.
fn next_id(at: DateTime<Utc>) -> CalculationId {
    let micros = u64::try_from(at.timestamp_micros()).unwrap_or(0);
    let bump = |last: u64| if micros > last { micros } else { last + 1 };
    let previous = LAST_ID
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(bump(last)))
        .unwrap_or_else(|last| last);
    bump(previous)
}

/// Storage for saved calculations. `save` reports success as a flag; the
/// engine never retries.
pub trait CalculationStore {
    fn save(&mut self, calculation: &SavedCalculation) -> bool;

    /// Calculations for `user_id`, most recent first.
    fn history(&self, user_id: UserId) -> Vec<SavedCalculation>;

    /// Remove one of `user_id`'s calculations. `false` when nothing matched
    /// or the store could not be updated.
    fn delete(&mut self, user_id: UserId, id: CalculationId) -> bool;
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: Vec<SavedCalculation>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl CalculationStore for InMemoryStore {
    fn save(&mut self, calculation: &SavedCalculation) -> bool {
        self.records.push(calculation.clone());
        true
    }

    fn history(&self, user_id: UserId) -> Vec<SavedCalculation> {
        let mut records: Vec<SavedCalculation> = self
            .records
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.calculated_at.cmp(&a.calculated_at));
        records
    }

    fn delete(&mut self, user_id: UserId, id: CalculationId) -> bool {
        let before = self.records.len();
        self.records.retain(|r| !(r.user_id == user_id && r.id == id));
        self.records.len() < before
    }
}
