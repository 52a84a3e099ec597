use std::ops::*;

use crate::active::ActiveReal;
use crate::constant::ConstantExpression;
use crate::expressions::{BinaryExpression, UnaryExpression};
use crate::node::Node;
use crate::operations::{AddOp, DivOp, MulOp, NegOp, SubOp};

macro_rules! impl_bin_op {
    ([$($gen:tt)*] $Self:ty, $Trait:ident, $func:ident, $Op:ident) => {
        impl<$($gen)* Rhs> $Trait<Rhs> for $Self
        where
            Self: Node,
            Rhs: Node<Real = <Self as Node>::Real>,
        {
            type Output = BinaryExpression<Self, Rhs, $Op>;
            #[inline]
            fn $func(self, rhs: Rhs) -> Self::Output {
                BinaryExpression::new(self, rhs)
            }
        }
        impl_bin_op!(@scalar [$($gen)*] $Self, $Trait, $func, $Op, f64);
        impl_bin_op!(@scalar [$($gen)*] $Self, $Trait, $func, $Op, f32);
    };
    (@scalar [$($gen:tt)*] $Self:ty, $Trait:ident, $func:ident, $Op:ident, $t:ty) => {
        impl<$($gen)*> $Trait<$t> for $Self
        where
            Self: Node<Real = $t>,
        {
            type Output = BinaryExpression<Self, ConstantExpression<$t>, $Op>;
            #[inline]
            fn $func(self, rhs: $t) -> Self::Output {
                BinaryExpression::new(self, rhs.into())
            }
        }
        impl<$($gen)*> $Trait<$Self> for $t
        where
            $Self: Node<Real = $t>,
        {
            type Output = BinaryExpression<ConstantExpression<$t>, $Self, $Op>;
            #[inline]
            fn $func(self, rhs: $Self) -> Self::Output {
                BinaryExpression::new(self.into(), rhs)
            }
        }
    };
}

macro_rules! impl_ops {
    ([$($gen:tt)*] $Self:ty) => {
        impl_bin_op!([$($gen)*] $Self, Add, add, AddOp);
        impl_bin_op!([$($gen)*] $Self, Sub, sub, SubOp);
        impl_bin_op!([$($gen)*] $Self, Mul, mul, MulOp);
        impl_bin_op!([$($gen)*] $Self, Div, div, DivOp);

        impl<$($gen)*> Neg for $Self
        where
            Self: Node,
        {
            type Output = UnaryExpression<Self, NegOp>;
            #[inline]
            fn neg(self) -> Self::Output {
                UnaryExpression::new(self)
            }
        }
    };
}

impl_ops!([R,] ActiveReal<R>);
impl_ops!([R,] ConstantExpression<R>);
impl_ops!([A: Node, B, O,] BinaryExpression<A, B, O>);
impl_ops!([A: Node, O,] UnaryExpression<A, O>);
