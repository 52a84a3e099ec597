//! The node interface shared by every expression in a statement.
//!
//! A statement such as `y = a * b + sin(a)` is evaluated into a tree of
//! nodes whose shape is fixed by its type. Leaves (`END_POINT == true`) are
//! active values or constants; interior nodes own their operands by value and
//! expose them as numbered links. A node only describes its immediate
//! children, the recursion lives in [`crate::traversal`].

use num_traits::Float;

use crate::traversal::TraversalLogic;

/// An expression node of one statement.
pub trait Node {
    /// Primal type carried through the expression.
    type Real: Float;

    /// True for leaves, false for operations.
    const END_POINT: bool;
    /// Number of operand links, zero for leaves.
    const LINK_COUNT: usize;

    /// True for leaves that carry a tape identifier.
    const IS_LHS: bool = false;
    /// True for leaves that only carry a primal value.
    const IS_CONSTANT: bool = false;

    /// The primal value of this node.
    fn value(&self) -> Self::Real;

    /// Calls `logic.link` once for every operand, in link order.
    #[inline]
    fn for_each_link<L: TraversalLogic<Self::Real>>(&self, logic: &mut L, context: L::Context) {
        let _ = (logic, context);
    }

    /// Dispatches a terminal node to the matching handler of `logic`.
    ///
    /// Leaves override this to announce what they carry; anything else is
    /// reported as a bare terminal.
    #[inline]
    fn visit_end_point<L: TraversalLogic<Self::Real>>(&self, logic: &mut L, context: L::Context) {
        logic.end_point(context);
    }
}

/// An interior node that knows the local partial derivatives of its result.
pub trait Operation: Node {
    /// Partial derivative of this node with respect to operand `link`.
    fn partial(&self, link: usize) -> Self::Real;
}
