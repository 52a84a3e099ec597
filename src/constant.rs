//! Constant leaves.

use num_traits::Float;

use crate::node::Node;
use crate::traversal::{leaf_term, CompileTimeLogic, StaticTraversal, TraversalLogic};

/// A passive value inside an expression. Contributes no derivative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantExpression<R>(R);

impl<R: Float> ConstantExpression<R> {
    #[inline]
    pub fn new(value: R) -> Self {
        ConstantExpression(value)
    }
}

impl<R: Float> From<R> for ConstantExpression<R> {
    #[inline]
    fn from(value: R) -> Self {
        ConstantExpression(value)
    }
}

impl<R: Float> Node for ConstantExpression<R> {
    type Real = R;
    const END_POINT: bool = true;
    const LINK_COUNT: usize = 0;
    const IS_CONSTANT: bool = true;

    #[inline]
    fn value(&self) -> R {
        self.0
    }

    #[inline]
    fn visit_end_point<L: TraversalLogic<Self::Real>>(&self, logic: &mut L, context: L::Context) {
        logic.constant(self.0, context);
    }
}

impl<R: Float, L: CompileTimeLogic> StaticTraversal<L> for ConstantExpression<R> {
    const VALUE: usize = leaf_term::<Self, L>();
}
