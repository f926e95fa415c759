pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "valuation")]
pub mod valuation;

#[cfg(feature = "scenarios")]
pub mod scenarios;

#[cfg(feature = "pe")]
pub mod pe;

pub use error::LboModelError;
pub use types::*;

/// Standard result type for all LBO model operations
pub type LboModelResult<T> = Result<T, LboModelError>;
