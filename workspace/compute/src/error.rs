use thiserror::Error;

/// Error types for the compute module
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputeError {
    /// The table has no category with this name
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Month indices run from 0 (January) to 11 (December)
    #[error("Month index out of range: {0}")]
    MonthOutOfRange(usize),

    /// A derived value fell outside the representable range
    #[error("Amount out of range while computing {0}")]
    Overflow(String),

    /// The submission collaborator rejected or failed to deliver a payload
    #[error("Submission error: {0}")]
    Submission(String),
}

/// Type alias for Result with ComputeError
pub type Result<T> = std::result::Result<T, ComputeError>;
