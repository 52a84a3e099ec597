//! Gradient types: scalar derivatives and fixed-size direction vectors.

use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut, Mul, Sub};

use num_traits::{Float, Zero};

/// Storage type for the derivative of one identifier.
///
/// The number of directions is a compile-time constant; scalar gradients
/// have exactly one.
pub trait Gradient: Copy + Default + PartialEq + fmt::Debug {
    /// Type of one gradient component.
    type Real: Float + fmt::Debug;
    /// Number of directions held by one gradient.
    const DIM: usize;

    /// Returns component `dim`.
    fn at(&self, dim: usize) -> Self::Real;
    /// Returns a mutable reference to component `dim`.
    fn at_mut(&mut self, dim: usize) -> &mut Self::Real;

    /// True if every component is exactly zero.
    #[inline]
    fn is_total_zero(&self) -> bool {
        (0..Self::DIM).all(|d| self.at(d) == Self::Real::zero())
    }

    /// Returns `factor * self`.
    #[inline]
    fn scaled(&self, factor: Self::Real) -> Self {
        let mut out = *self;
        for d in 0..Self::DIM {
            *out.at_mut(d) = factor * self.at(d);
        }
        out
    }

    /// Computes `self += factor * other`.
    #[inline]
    fn add_scaled(&mut self, factor: Self::Real, other: &Self) {
        for d in 0..Self::DIM {
            let v = self.at(d) + factor * other.at(d);
            *self.at_mut(d) = v;
        }
    }
}

/// Number of directions of the gradient type `G`.
pub const fn dim<G: Gradient>() -> usize {
    G::DIM
}

macro_rules! scalar_gradient {
    ($t:ty) => {
        impl Gradient for $t {
            type Real = $t;
            const DIM: usize = 1;

            #[inline]
            fn at(&self, dim: usize) -> $t {
                debug_assert_eq!(dim, 0);
                *self
            }
            #[inline]
            fn at_mut(&mut self, dim: usize) -> &mut $t {
                debug_assert_eq!(dim, 0);
                self
            }
            #[inline]
            fn is_total_zero(&self) -> bool {
                *self == 0.0
            }
            #[inline]
            fn scaled(&self, factor: $t) -> $t {
                factor * *self
            }
            #[inline]
            fn add_scaled(&mut self, factor: $t, other: &$t) {
                *self += factor * *other;
            }
        }
    };
}

scalar_gradient!(f64);
scalar_gradient!(f32);

/// A gradient holding `N` directional derivatives, used for vector mode.
#[derive(Clone, Copy, PartialEq)]
pub struct Direction<R, const N: usize>([R; N]);

impl<R: Float, const N: usize> Direction<R, N> {
    pub fn new(components: [R; N]) -> Self {
        Direction(components)
    }

    /// The unit vector along direction `dim`.
    pub fn unit(dim: usize) -> Self {
        let mut out = Self::default();
        out.0[dim] = R::one();
        out
    }

    pub fn components(&self) -> &[R; N] {
        &self.0
    }
}

impl<R: Float, const N: usize> Default for Direction<R, N> {
    fn default() -> Self {
        Direction([R::zero(); N])
    }
}

impl<R: fmt::Debug, const N: usize> fmt::Debug for Direction<R, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl<R: Float, const N: usize> From<[R; N]> for Direction<R, N> {
    fn from(components: [R; N]) -> Self {
        Direction(components)
    }
}

impl<R: Float + fmt::Debug, const N: usize> Gradient for Direction<R, N> {
    type Real = R;
    const DIM: usize = N;

    #[inline]
    fn at(&self, dim: usize) -> R {
        self.0[dim]
    }
    #[inline]
    fn at_mut(&mut self, dim: usize) -> &mut R {
        &mut self.0[dim]
    }
}

impl<R: Float, const N: usize> Index<usize> for Direction<R, N> {
    type Output = R;
    fn index(&self, dim: usize) -> &R {
        &self.0[dim]
    }
}

impl<R: Float, const N: usize> IndexMut<usize> for Direction<R, N> {
    fn index_mut(&mut self, dim: usize) -> &mut R {
        &mut self.0[dim]
    }
}

impl<R: Float, const N: usize> Add for Direction<R, N> {
    type Output = Self;
    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl<R: Float, const N: usize> AddAssign for Direction<R, N> {
    fn add_assign(&mut self, rhs: Self) {
        for (l, r) in self.0.iter_mut().zip(rhs.0) {
            *l = *l + r;
        }
    }
}

impl<R: Float, const N: usize> Sub for Direction<R, N> {
    type Output = Self;
    fn sub(mut self, rhs: Self) -> Self {
        for (l, r) in self.0.iter_mut().zip(rhs.0) {
            *l = *l - r;
        }
        self
    }
}

impl<R: Float, const N: usize> Mul<R> for Direction<R, N> {
    type Output = Self;
    fn mul(mut self, factor: R) -> Self {
        for c in self.0.iter_mut() {
            *c = *c * factor;
        }
        self
    }
}
