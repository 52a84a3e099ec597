//! Error types for the automatic differentiation crate.

use thiserror::Error;

use crate::identifier::Identifier;
use crate::parameters::TapeParameter;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Error variants for tape and driver operations.
pub enum ADError {
    #[error("Identifier is passive and has no gradient")]
    /// A gradient was requested or seeded for the passive identifier.
    PassiveIdentifier,
    #[error("Identifier {0} was not issued by this tape")]
    /// The identifier is larger than anything the tape has handed out.
    UnknownIdentifier(Identifier),
    #[error("Tape parameter {0} is not supported by this tape")]
    /// The tape does not track the requested capacity.
    UnsupportedParameter(TapeParameter),
    #[error("Tape parameter {0} is read-only")]
    /// The capacity can be reported but not changed.
    ReadOnlyParameter(TapeParameter),
    #[error("Dimension mismatch: expected {expected:?}, got {received:?}")]
    /// A Jacobian of the wrong shape was handed to the driver.
    DimensionMismatch {
        expected: (usize, usize),
        received: (usize, usize),
    },
}

/// Convenience alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, ADError>;
