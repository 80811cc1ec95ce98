pub mod afford;
pub mod compare;
pub mod history;
pub mod loan;
