//! Tape configuration.

use crate::parameters::TapeParameter;

/// How a tape hands out identifiers to statement outputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IdentifierPolicy {
    /// Every statement gets a fresh identifier.
    #[default]
    Linear,
    /// An output that already holds an identifier keeps it, so a statement
    /// like `x = x * y` reads and writes the same identifier.
    Reuse,
}

/// Options for [`crate::tape::JacobianTape::with_config`].
#[derive(Clone, Debug, Default)]
pub struct TapeConfig {
    pub identifiers: IdentifierPolicy,
    /// Drop jacobian entries that are exactly zero while recording.
    pub skip_zero_jacobians: bool,
    /// Keep the primal value of every identifier next to its adjoint.
    pub track_primals: bool,
    /// Capacities applied when the tape is built.
    pub capacities: Vec<(TapeParameter, usize)>,
}

impl TapeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identifiers(mut self, policy: IdentifierPolicy) -> Self {
        self.identifiers = policy;
        self
    }

    pub fn skip_zero_jacobians(mut self, skip: bool) -> Self {
        self.skip_zero_jacobians = skip;
        self
    }

    pub fn track_primals(mut self, track: bool) -> Self {
        self.track_primals = track;
        self
    }

    /// Requests `value` for `parameter` when the tape is built. A later
    /// request for the same parameter replaces the earlier one.
    pub fn capacity(mut self, parameter: TapeParameter, value: usize) -> Self {
        self.capacities.retain(|(p, _)| *p != parameter);
        self.capacities.push((parameter, value));
        self
    }
}
