//! Interior expression nodes and the free functions that build them.

use std::marker::PhantomData;

use crate::node::{Node, Operation};
use crate::operations::{
    AbsOp, BinaryOperation, CosOp, ExpOp, LnOp, MaxOp, MinOp, PowOp, SinOp, SqrtOp, TanOp,
    UnaryOperation,
};
use crate::traversal::{CompileTimeLogic, StaticTraversal, TraversalLogic};

/// A binary operation over two operand expressions.
///
/// Both operands must share one primal type; mixing them is a type error.
#[derive(Clone)]
pub struct BinaryExpression<A: Node, B, O> {
    a: A,
    b: B,
    result: A::Real,
    _op: PhantomData<O>,
}

impl<A, B, O> BinaryExpression<A, B, O>
where
    A: Node,
    B: Node<Real = A::Real>,
    O: BinaryOperation<A::Real>,
{
    /// Builds the node and evaluates its primal value.
    #[inline]
    pub fn new(a: A, b: B) -> Self {
        let result = O::primal(a.value(), b.value());
        Self {
            a,
            b,
            result,
            _op: PhantomData,
        }
    }
}

impl<A, B, O> Node for BinaryExpression<A, B, O>
where
    A: Node,
    B: Node<Real = A::Real>,
    O: BinaryOperation<A::Real>,
{
    type Real = A::Real;
    const END_POINT: bool = false;
    const LINK_COUNT: usize = 2;

    #[inline]
    fn value(&self) -> A::Real {
        self.result
    }

    #[inline]
    fn for_each_link<L: TraversalLogic<Self::Real>>(&self, logic: &mut L, context: L::Context) {
        logic.link(&self.a, self, 0, context);
        logic.link(&self.b, self, 1, context);
    }
}

impl<A, B, O> Operation for BinaryExpression<A, B, O>
where
    A: Node,
    B: Node<Real = A::Real>,
    O: BinaryOperation<A::Real>,
{
    #[inline]
    fn partial(&self, link: usize) -> A::Real {
        debug_assert!(link < Self::LINK_COUNT);
        if link == 0 {
            O::gradient_a(self.a.value(), self.b.value(), self.result)
        } else {
            O::gradient_b(self.a.value(), self.b.value(), self.result)
        }
    }
}

impl<L, A, B, O> StaticTraversal<L> for BinaryExpression<A, B, O>
where
    L: CompileTimeLogic,
    A: StaticTraversal<L>,
    B: StaticTraversal<L> + Node<Real = A::Real>,
    O: BinaryOperation<A::Real>,
{
    const VALUE: usize = <A as StaticTraversal<L>>::VALUE + <B as StaticTraversal<L>>::VALUE;
}

/// A unary operation over one operand expression.
#[derive(Clone)]
pub struct UnaryExpression<A: Node, O> {
    a: A,
    result: A::Real,
    _op: PhantomData<O>,
}

impl<A, O> UnaryExpression<A, O>
where
    A: Node,
    O: UnaryOperation<A::Real>,
{
    /// Builds the node and evaluates its primal value.
    #[inline]
    pub fn new(a: A) -> Self {
        let result = O::primal(a.value());
        Self {
            a,
            result,
            _op: PhantomData,
        }
    }
}

impl<A, O> Node for UnaryExpression<A, O>
where
    A: Node,
    O: UnaryOperation<A::Real>,
{
    type Real = A::Real;
    const END_POINT: bool = false;
    const LINK_COUNT: usize = 1;

    #[inline]
    fn value(&self) -> A::Real {
        self.result
    }

    #[inline]
    fn for_each_link<L: TraversalLogic<Self::Real>>(&self, logic: &mut L, context: L::Context) {
        logic.link(&self.a, self, 0, context);
    }
}

impl<A, O> Operation for UnaryExpression<A, O>
where
    A: Node,
    O: UnaryOperation<A::Real>,
{
    #[inline]
    fn partial(&self, link: usize) -> A::Real {
        debug_assert_eq!(link, 0);
        O::gradient(self.a.value(), self.result)
    }
}

impl<L, A, O> StaticTraversal<L> for UnaryExpression<A, O>
where
    L: CompileTimeLogic,
    A: StaticTraversal<L>,
    O: UnaryOperation<A::Real>,
{
    const VALUE: usize = <A as StaticTraversal<L>>::VALUE;
}

#[inline]
/// Returns the exponential of an expression.
pub fn exp<A: Node>(a: A) -> UnaryExpression<A, ExpOp> {
    UnaryExpression::new(a)
}
#[inline]
/// Returns the natural logarithm of an expression.
pub fn ln<A: Node>(a: A) -> UnaryExpression<A, LnOp> {
    UnaryExpression::new(a)
}
#[inline]
/// Returns the square root of an expression.
pub fn sqrt<A: Node>(a: A) -> UnaryExpression<A, SqrtOp> {
    UnaryExpression::new(a)
}
#[inline]
/// Returns the sine of an expression.
pub fn sin<A: Node>(a: A) -> UnaryExpression<A, SinOp> {
    UnaryExpression::new(a)
}
#[inline]
/// Returns the cosine of an expression.
pub fn cos<A: Node>(a: A) -> UnaryExpression<A, CosOp> {
    UnaryExpression::new(a)
}
#[inline]
/// Returns the tangent of an expression.
pub fn tan<A: Node>(a: A) -> UnaryExpression<A, TanOp> {
    UnaryExpression::new(a)
}
#[inline]
/// Returns the absolute value of an expression.
pub fn abs<A: Node>(a: A) -> UnaryExpression<A, AbsOp> {
    UnaryExpression::new(a)
}

#[inline]
/// Raises one expression to the power of another.
pub fn pow<A: Node, B: Node<Real = A::Real>>(a: A, b: B) -> BinaryExpression<A, B, PowOp> {
    BinaryExpression::new(a, b)
}
#[inline]
/// Returns the maximum of two expressions.
pub fn max<A: Node, B: Node<Real = A::Real>>(a: A, b: B) -> BinaryExpression<A, B, MaxOp> {
    BinaryExpression::new(a, b)
}
#[inline]
/// Returns the minimum of two expressions.
pub fn min<A: Node, B: Node<Real = A::Real>>(a: A, b: B) -> BinaryExpression<A, B, MinOp> {
    BinaryExpression::new(a, b)
}
