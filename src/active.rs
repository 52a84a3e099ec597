//! The active number type users write their algorithms with.

use core::fmt;
use std::cmp::Ordering;

use num_traits::Float;

use crate::identifier::Identifier;
use crate::node::Node;
use crate::traversal::{leaf_term, CompileTimeLogic, StaticTraversal, TraversalLogic};

/// A scalar value tracked by a tape.
///
/// Arithmetic on `ActiveReal` does not compute derivatives; it builds an
/// expression tree that a tape turns into a statement, see
/// [`crate::tape::JacobianTape::store`].
#[derive(Clone, Copy, Default)]
pub struct ActiveReal<R = f64> {
    value: R,
    identifier: Identifier,
}

impl<R: Float> ActiveReal<R> {
    /// A value that is not tracked by any tape.
    #[inline]
    pub fn passive(value: R) -> Self {
        Self {
            value,
            identifier: Identifier::PASSIVE,
        }
    }

    /// Pairs a primal value with an identifier issued by a tape.
    #[inline]
    pub fn with_identifier(value: R, identifier: Identifier) -> Self {
        Self { value, identifier }
    }

    #[inline]
    /// Returns the stored primal value.
    pub fn value(&self) -> R {
        self.value
    }

    #[inline]
    pub fn identifier(&self) -> Identifier {
        self.identifier
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.identifier.is_active()
    }
}

impl<R: fmt::Debug> fmt::Debug for ActiveReal<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActiveReal({:?}, {})", self.value, self.identifier)
    }
}

impl<R: fmt::Display> fmt::Display for ActiveReal<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl From<f64> for ActiveReal<f64> {
    fn from(v: f64) -> Self {
        ActiveReal::passive(v)
    }
}

impl From<f32> for ActiveReal<f32> {
    fn from(v: f32) -> Self {
        ActiveReal::passive(v)
    }
}

impl<R: PartialEq> PartialEq for ActiveReal<R> {
    fn eq(&self, o: &Self) -> bool {
        self.value == o.value
    }
}

impl<R: PartialOrd> PartialOrd for ActiveReal<R> {
    fn partial_cmp(&self, o: &Self) -> Option<Ordering> {
        self.value.partial_cmp(&o.value)
    }
}

impl<R: Float> Node for ActiveReal<R> {
    type Real = R;
    const END_POINT: bool = true;
    const LINK_COUNT: usize = 0;
    const IS_LHS: bool = true;

    #[inline]
    fn value(&self) -> R {
        self.value
    }

    #[inline]
    fn visit_end_point<L: TraversalLogic<Self::Real>>(&self, logic: &mut L, context: L::Context) {
        logic.leaf(self.identifier, self.value, context);
    }
}

impl<R: Float, L: CompileTimeLogic> StaticTraversal<L> for ActiveReal<R> {
    const VALUE: usize = leaf_term::<Self, L>();
}
