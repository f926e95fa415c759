use thiserror::Error;

#[derive(Debug, Error)]
pub enum LboModelError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Undefined result in {function}: {reason}")]
    DomainError { function: String, reason: String },
}
