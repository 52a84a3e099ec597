//! Capacity categories shared by all tapes.
//!
//! Tapes report and accept their sizes through [`TapeParameter`] instead of
//! one accessor per resource, so sizing code such as [`preallocate`] is
//! written once for every tape.

use std::fmt;

use crate::errors::Result;

/// A named capacity of a tape.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TapeParameter {
    /// Length of the adjoint vector.
    AdjointSize,
    /// Number of constant values stored for statements.
    ConstantValuesSize,
    /// Number of external function records.
    ExternalFunctionsSize,
    /// Number of recorded jacobian entries.
    JacobianSize,
    /// Largest identifier issued so far.
    LargestIdentifier,
    /// Number of passive values stored for statements.
    PassiveValuesSize,
    /// Length of the primal value vector.
    PrimalSize,
    /// Number of recorded argument identifiers.
    RhsIdentifiersSize,
    /// Number of recorded statements.
    StatementSize,
}

impl TapeParameter {
    pub const ALL: [TapeParameter; 9] = [
        TapeParameter::AdjointSize,
        TapeParameter::ConstantValuesSize,
        TapeParameter::ExternalFunctionsSize,
        TapeParameter::JacobianSize,
        TapeParameter::LargestIdentifier,
        TapeParameter::PassiveValuesSize,
        TapeParameter::PrimalSize,
        TapeParameter::RhsIdentifiersSize,
        TapeParameter::StatementSize,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TapeParameter::AdjointSize => "adjoint size",
            TapeParameter::ConstantValuesSize => "constant values",
            TapeParameter::ExternalFunctionsSize => "external functions",
            TapeParameter::JacobianSize => "jacobian entries",
            TapeParameter::LargestIdentifier => "largest identifier",
            TapeParameter::PassiveValuesSize => "passive values",
            TapeParameter::PrimalSize => "primal size",
            TapeParameter::RhsIdentifiersSize => "rhs identifiers",
            TapeParameter::StatementSize => "statements",
        }
    }
}

impl fmt::Display for TapeParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Uniform size reporting and configuration of a tape.
pub trait TapeSizing {
    /// True if the tape tracks `parameter`.
    fn has_parameter(&self, parameter: TapeParameter) -> bool;

    /// Current value of `parameter`; zero for parameters the tape does not
    /// track.
    fn parameter(&self, parameter: TapeParameter) -> usize;

    /// Resizes or reserves the resource behind `parameter`.
    fn set_parameter(&mut self, parameter: TapeParameter, value: usize) -> Result<()>;
}

/// Applies every `(parameter, value)` request to `tape`, stopping at the
/// first one it rejects.
pub fn preallocate<T, I>(tape: &mut T, requests: I) -> Result<()>
where
    T: TapeSizing + ?Sized,
    I: IntoIterator<Item = (TapeParameter, usize)>,
{
    for (parameter, value) in requests {
        log::debug!("preallocating {parameter}: {value}");
        tape.set_parameter(parameter, value)?;
    }
    Ok(())
}

/// All parameters tracked by `tape` with their current values.
pub fn sizing_report<T: TapeSizing + ?Sized>(tape: &T) -> Vec<(TapeParameter, usize)> {
    TapeParameter::ALL
        .iter()
        .copied()
        .filter(|&p| tape.has_parameter(p))
        .map(|p| (p, tape.parameter(p)))
        .collect()
}
