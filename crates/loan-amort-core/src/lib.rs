pub mod amortization;
pub mod error;
pub mod types;

pub use error::AmortizationError;
pub use types::*;

/// Standard result type for all loan-amort operations
pub type AmortizationResult<T> = Result<T, AmortizationError>;
