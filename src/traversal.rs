//! One recursion skeleton for every analysis over an expression tree.
//!
//! A [`TraversalLogic`] only decides what happens at the leaves and how the
//! context changes along a link; [`TraversalLogic::eval`] does the walking.
//! Purely structural analyses use the compile-time variant
//! ([`StaticTraversal`]) and are folded into constants.

use num_traits::Float;

use crate::identifier::Identifier;
use crate::node::{Node, Operation};

/// A runtime analysis over expression trees with primal type `R`.
pub trait TraversalLogic<R: Float>: Sized {
    /// Value threaded from the root towards the leaves.
    type Context: Copy;

    /// Walks `node`: terminals go to their leaf handler, operations recurse
    /// through their links.
    #[inline]
    fn eval<N: Node<Real = R>>(&mut self, node: &N, context: Self::Context) {
        if N::END_POINT {
            node.visit_end_point(self, context);
        } else {
            node.for_each_link(self, context);
        }
    }

    /// Called by `parent` for its operand `child`. Recurses unchanged by
    /// default.
    #[inline]
    fn link<C, P>(&mut self, child: &C, parent: &P, link: usize, context: Self::Context)
    where
        C: Node<Real = R>,
        P: Operation<Real = R>,
    {
        let _ = (parent, link);
        self.eval(child, context);
    }

    /// An active leaf.
    #[inline]
    fn leaf(&mut self, identifier: Identifier, primal: R, context: Self::Context) {
        let _ = (identifier, primal, context);
    }

    /// A constant leaf.
    #[inline]
    fn constant(&mut self, primal: R, context: Self::Context) {
        let _ = (primal, context);
    }

    /// Any other terminal.
    #[inline]
    fn end_point(&mut self, context: Self::Context) {
        let _ = context;
    }
}

/// Counts leaves that carry an active identifier.
#[derive(Debug, Default)]
pub struct ActiveLeafCounter {
    pub count: usize,
}

impl<R: Float> TraversalLogic<R> for ActiveLeafCounter {
    type Context = ();

    #[inline]
    fn leaf(&mut self, identifier: Identifier, _: R, _: ()) {
        if identifier.is_active() {
            self.count += 1;
        }
    }
}

/// Counts constant leaves.
#[derive(Debug, Default)]
pub struct ConstantLeafCounter {
    pub count: usize,
}

impl<R: Float> TraversalLogic<R> for ConstantLeafCounter {
    type Context = ();

    #[inline]
    fn constant(&mut self, _: R, _: ()) {
        self.count += 1;
    }
}

/// Number of leaves of `expr` that are active at runtime.
///
/// Active-typed leaves holding the passive identifier are not counted; see
/// [`crate::expression_traits::number_of_active_type_arguments`] for the
/// static count.
pub fn count_active_leaves<E: Node>(expr: &E) -> usize {
    let mut counter = ActiveLeafCounter::default();
    TraversalLogic::<E::Real>::eval(&mut counter, expr, ());
    counter.count
}

/// Number of constant leaves of `expr`.
pub fn count_constant_leaves<E: Node>(expr: &E) -> usize {
    let mut counter = ConstantLeafCounter::default();
    TraversalLogic::<E::Real>::eval(&mut counter, expr, ());
    counter.count
}

/// Chain rule from the root of a statement to its leaves.
///
/// The context is the product of the local partials along the path from the
/// root; every active leaf is handed to `on_leaf` together with that product.
/// A leaf that appears twice is reported twice.
pub struct JacobianLogic<F> {
    on_leaf: F,
}

impl<F> JacobianLogic<F> {
    pub fn new(on_leaf: F) -> Self {
        Self { on_leaf }
    }
}

impl<R, F> TraversalLogic<R> for JacobianLogic<F>
where
    R: Float,
    F: FnMut(Identifier, R),
{
    type Context = R;

    #[inline]
    fn link<C, P>(&mut self, child: &C, parent: &P, link: usize, jacobian: R)
    where
        C: Node<Real = R>,
        P: Operation<Real = R>,
    {
        self.eval(child, jacobian * parent.partial(link));
    }

    #[inline]
    fn leaf(&mut self, identifier: Identifier, _: R, jacobian: R) {
        (self.on_leaf)(identifier, jacobian);
    }
}

/// Calls `on_leaf(identifier, seed * d expr / d leaf)` for every active-typed
/// leaf of `expr`, in link order.
pub fn for_each_jacobian<E, F>(expr: &E, seed: E::Real, on_leaf: F)
where
    E: Node,
    F: FnMut(Identifier, E::Real),
{
    let mut logic = JacobianLogic::new(on_leaf);
    TraversalLogic::<E::Real>::eval(&mut logic, expr, seed);
}

/// A structural analysis evaluated during compilation.
///
/// Each leaf role contributes a constant and interior nodes add up the
/// contributions of their operands.
pub trait CompileTimeLogic {
    const ACTIVE_LEAF: usize = 0;
    const CONSTANT_LEAF: usize = 0;
    const END_POINT: usize = 0;
}

/// The contribution of leaf type `N` under logic `L`.
pub const fn leaf_term<N: Node, L: CompileTimeLogic>() -> usize {
    if N::IS_LHS {
        L::ACTIVE_LEAF
    } else if N::IS_CONSTANT {
        L::CONSTANT_LEAF
    } else {
        L::END_POINT
    }
}

/// The compile-time result of logic `L` over the expression type.
///
/// Leaves implement it with `leaf_term::<Self, L>()`, operations with the
/// sum over their operands.
pub trait StaticTraversal<L: CompileTimeLogic>: Node {
    const VALUE: usize;
}

/// Counts active-typed leaves.
pub struct ActiveArguments;

impl CompileTimeLogic for ActiveArguments {
    const ACTIVE_LEAF: usize = 1;
}

/// Counts constant leaves.
pub struct ConstantArguments;

impl CompileTimeLogic for ConstantArguments {
    const CONSTANT_LEAF: usize = 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::active::ActiveReal;
    use crate::constant::ConstantExpression;
    use crate::expressions::{sin, BinaryExpression};
    use crate::operations::MulOp;

    fn active(raw: u32, value: f64) -> ActiveReal<f64> {
        ActiveReal::with_identifier(value, Identifier::new(raw))
    }

    /// A leaf kind unknown to the engine that still reports an identifier.
    #[derive(Clone, Copy)]
    struct Tagged {
        identifier: Identifier,
        value: f64,
    }

    impl Node for Tagged {
        type Real = f64;
        const END_POINT: bool = true;
        const LINK_COUNT: usize = 0;
        const IS_LHS: bool = true;

        fn value(&self) -> f64 {
            self.value
        }

        fn visit_end_point<L: TraversalLogic<Self::Real>>(
            &self,
            logic: &mut L,
            context: L::Context,
        ) {
            logic.leaf(self.identifier, self.value, context);
        }
    }

    /// A terminal without identifier or constant capability.
    #[derive(Clone, Copy)]
    struct Marker;

    impl Node for Marker {
        type Real = f64;
        const END_POINT: bool = true;
        const LINK_COUNT: usize = 0;

        fn value(&self) -> f64 {
            0.0
        }
    }

    #[derive(Default)]
    struct EndPointCounter(usize);

    impl TraversalLogic<f64> for EndPointCounter {
        type Context = ();
        fn end_point(&mut self, _: ()) {
            self.0 += 1;
        }
    }

    #[test]
    fn counts_leaves_of_mixed_expression() {
        let a = active(1, 2.0);
        let b = active(2, 3.0);
        let expr = a * b + sin(a) * 2.0;
        assert_eq!(count_active_leaves(&expr), 3);
        assert_eq!(count_constant_leaves(&expr), 1);
    }

    #[test]
    fn passive_leaves_are_not_counted_at_runtime() {
        let a = active(1, 2.0);
        let p = ActiveReal::passive(5.0);
        assert_eq!(count_active_leaves(&(a * p)), 1);
    }

    #[test]
    fn all_constant_expression_reports_no_leaf() {
        let expr = ConstantExpression::new(2.0) * ConstantExpression::new(4.0) + 1.0;
        let mut calls = 0;
        for_each_jacobian(&expr, 1.0, |_, _| calls += 1);
        assert_eq!(calls, 0);
        assert_eq!(count_constant_leaves(&expr), 3);
    }

    #[test]
    fn jacobians_follow_the_chain_rule() {
        let a = active(1, 0.5);
        let b = active(2, 3.0);
        let expr = a * b + sin(a);
        let mut seen = Vec::new();
        for_each_jacobian(&expr, 1.0, |id, jac| seen.push((id.raw(), jac)));
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], (1, 3.0));
        assert_eq!(seen[1], (2, 0.5));
        assert_eq!(seen[2], (1, 0.5f64.cos()));
    }

    #[test]
    fn seed_scales_every_jacobian() {
        let a = active(1, 2.0);
        let mut seen = Vec::new();
        for_each_jacobian(&(a * 3.0), 2.0, |_, jac| seen.push(jac));
        assert_eq!(seen, vec![6.0]);
    }

    #[test]
    fn custom_leaf_kinds_need_no_engine_change() {
        let t = Tagged {
            identifier: Identifier::new(7),
            value: 4.0,
        };
        let expr = BinaryExpression::<_, _, MulOp>::new(t, active(1, 2.0));
        assert_eq!(count_active_leaves(&expr), 2);
        let mut seen = Vec::new();
        for_each_jacobian(&expr, 1.0, |id, jac| seen.push((id.raw(), jac)));
        assert_eq!(seen, vec![(7, 2.0), (1, 4.0)]);
    }

    #[test]
    fn bare_terminals_use_the_default_handler() {
        let mut counter = EndPointCounter::default();
        counter.eval(&Marker, ());
        assert_eq!(counter.0, 1);
        assert_eq!(count_active_leaves(&Marker), 0);
        assert_eq!(count_constant_leaves(&Marker), 0);
    }
}
