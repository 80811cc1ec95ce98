pub mod affordability;
pub mod comparison;
pub mod error;
pub mod format;
pub mod history;
pub mod payment;
pub mod schedule;
pub mod time_value;
pub mod types;

pub use error::{ErrorKind, LoanEngineError};
pub use types::*;

/// Standard result type for all loan-engine operations
pub type LoanEngineResult<T> = Result<T, LoanEngineError>;
