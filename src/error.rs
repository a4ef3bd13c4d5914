use std::fmt;

/// Error types for finite-difference scheme derivation
#[derive(Debug, Clone, PartialEq)]
pub enum FiniteDifferenceError {
    /// Order of accuracy is below the derivative degree
    InvalidOrder { order: usize, derivative: usize },
    /// Number of offsets does not match `order + derivative`
    StencilSizeMismatch { expected: usize, actual: usize },
    /// Coefficient matrix cannot be inverted for the given offsets
    SingularMatrix { size: usize },
    /// Solution was read before the scheme was solved
    NotComputed,
    /// Sample data is malformed or does not match the request
    InvalidInput(String),
    /// Reading or writing sample data failed
    Io(String),
}

impl fmt::Display for FiniteDifferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FiniteDifferenceError::InvalidOrder { order, derivative } => {
                write!(
                    f,
                    "Invalid order of accuracy: {}. Must be at least the derivative degree ({})",
                    order, derivative
                )
            }
            FiniteDifferenceError::StencilSizeMismatch { expected, actual } => {
                write!(
                    f,
                    "Incorrect number of points: {}. Order and derivative require {} points",
                    actual, expected
                )
            }
            FiniteDifferenceError::SingularMatrix { size } => {
                write!(f, "Coefficient matrix ({}x{}) is not invertible", size, size)
            }
            FiniteDifferenceError::NotComputed => write!(f, "Scheme not yet computed"),
            FiniteDifferenceError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            FiniteDifferenceError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for FiniteDifferenceError {}

impl From<std::io::Error> for FiniteDifferenceError {
    fn from(err: std::io::Error) -> Self {
        FiniteDifferenceError::Io(err.to_string())
    }
}

impl From<csv::Error> for FiniteDifferenceError {
    fn from(err: csv::Error) -> Self {
        FiniteDifferenceError::Io(err.to_string())
    }
}

/// Result type for finite-difference operations
pub type Result<T> = std::result::Result<T, FiniteDifferenceError>;
