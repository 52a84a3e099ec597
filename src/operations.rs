//! Elementary operations: primal evaluation and local partial derivatives.

use num_traits::Float;

/// A binary operation definition for the expression system.
pub trait BinaryOperation<R: Float> {
    /// Evaluates the operation.
    fn primal(a: R, b: R) -> R;
    /// Derivative with respect to the first operand.
    fn gradient_a(a: R, b: R, result: R) -> R;
    /// Derivative with respect to the second operand.
    fn gradient_b(a: R, b: R, result: R) -> R;
}

/// A unary operation definition for the expression system.
pub trait UnaryOperation<R: Float> {
    /// Evaluates the operation.
    fn primal(a: R) -> R;
    /// Derivative with respect to the operand.
    fn gradient(a: R, result: R) -> R;
}

#[derive(Clone, Copy, Debug)]
/// Binary addition.
pub struct AddOp;
impl<R: Float> BinaryOperation<R> for AddOp {
    #[inline]
    fn primal(a: R, b: R) -> R {
        a + b
    }
    #[inline]
    fn gradient_a(_: R, _: R, _: R) -> R {
        R::one()
    }
    #[inline]
    fn gradient_b(_: R, _: R, _: R) -> R {
        R::one()
    }
}

#[derive(Clone, Copy, Debug)]
/// Binary subtraction.
pub struct SubOp;
impl<R: Float> BinaryOperation<R> for SubOp {
    #[inline]
    fn primal(a: R, b: R) -> R {
        a - b
    }
    #[inline]
    fn gradient_a(_: R, _: R, _: R) -> R {
        R::one()
    }
    #[inline]
    fn gradient_b(_: R, _: R, _: R) -> R {
        -R::one()
    }
}

#[derive(Clone, Copy, Debug)]
/// Binary multiplication.
pub struct MulOp;
impl<R: Float> BinaryOperation<R> for MulOp {
    #[inline]
    fn primal(a: R, b: R) -> R {
        a * b
    }
    #[inline]
    fn gradient_a(_: R, b: R, _: R) -> R {
        b
    }
    #[inline]
    fn gradient_b(a: R, _: R, _: R) -> R {
        a
    }
}

#[derive(Clone, Copy, Debug)]
/// Binary division.
pub struct DivOp;
impl<R: Float> BinaryOperation<R> for DivOp {
    #[inline]
    fn primal(a: R, b: R) -> R {
        a / b
    }
    #[inline]
    fn gradient_a(_: R, b: R, _: R) -> R {
        R::one() / b
    }
    #[inline]
    fn gradient_b(_: R, b: R, result: R) -> R {
        -result / b
    }
}

#[derive(Clone, Copy, Debug)]
/// `a` raised to the power `b`.
pub struct PowOp;
impl<R: Float> BinaryOperation<R> for PowOp {
    #[inline]
    fn primal(a: R, b: R) -> R {
        a.powf(b)
    }
    #[inline]
    fn gradient_a(a: R, b: R, _: R) -> R {
        b * a.powf(b - R::one())
    }
    #[inline]
    fn gradient_b(a: R, _: R, result: R) -> R {
        // ln is undefined for non-positive bases
        if a > R::zero() {
            result * a.ln()
        } else {
            R::zero()
        }
    }
}

#[derive(Clone, Copy, Debug)]
/// Binary maximum.
pub struct MaxOp;
impl<R: Float> BinaryOperation<R> for MaxOp {
    #[inline]
    fn primal(a: R, b: R) -> R {
        a.max(b)
    }
    #[inline]
    fn gradient_a(a: R, b: R, _: R) -> R {
        if a > b {
            R::one()
        } else {
            R::zero()
        }
    }
    #[inline]
    fn gradient_b(a: R, b: R, _: R) -> R {
        if a > b {
            R::zero()
        } else {
            R::one()
        }
    }
}

#[derive(Clone, Copy, Debug)]
/// Binary minimum.
pub struct MinOp;
impl<R: Float> BinaryOperation<R> for MinOp {
    #[inline]
    fn primal(a: R, b: R) -> R {
        a.min(b)
    }
    #[inline]
    fn gradient_a(a: R, b: R, _: R) -> R {
        if a < b {
            R::one()
        } else {
            R::zero()
        }
    }
    #[inline]
    fn gradient_b(a: R, b: R, _: R) -> R {
        if a < b {
            R::zero()
        } else {
            R::one()
        }
    }
}

macro_rules! unary_operation {
    ($name:ident, $doc:expr, |$x:ident| $primal:expr, |$a:ident, $r:ident| $grad:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug)]
        pub struct $name;
        impl<R: Float> UnaryOperation<R> for $name {
            #[inline]
            fn primal($x: R) -> R {
                $primal
            }
            #[inline]
            #[allow(unused_variables)]
            fn gradient($a: R, $r: R) -> R {
                $grad
            }
        }
    };
}

unary_operation!(NegOp, "Unary negation.", |x| -x, |a, r| -R::one());
unary_operation!(ExpOp, "Exponential.", |x| x.exp(), |a, r| r);
unary_operation!(LnOp, "Natural logarithm.", |x| x.ln(), |a, r| R::one() / a);
unary_operation!(
    SqrtOp,
    "Square root.",
    |x| x.sqrt(),
    |a, r| R::one() / (r + r)
);
unary_operation!(SinOp, "Sine.", |x| x.sin(), |a, r| a.cos());
unary_operation!(CosOp, "Cosine.", |x| x.cos(), |a, r| -a.sin());
unary_operation!(TanOp, "Tangent.", |x| x.tan(), |a, r| R::one() + r * r);
unary_operation!(
    AbsOp,
    "Absolute value.",
    |x| x.abs(),
    |a, r| if a >= R::zero() { R::one() } else { -R::one() }
);
