//! Tape-issued handles into derivative storage.

use std::fmt;

/// Index of a value in the adjoint/tangent storage of a tape.
///
/// Identifiers are issued by a tape. `Identifier::PASSIVE` marks a value that
/// does not take part in differentiation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier(u32);

impl Identifier {
    /// The identifier of values that are not tracked.
    pub const PASSIVE: Identifier = Identifier(0);

    #[inline]
    pub const fn new(raw: u32) -> Self {
        Identifier(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Position of this identifier in a storage slice.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_active(self) -> bool {
        self.0 != 0
    }
}

impl From<u32> for Identifier {
    fn from(raw: u32) -> Self {
        Identifier(raw)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
