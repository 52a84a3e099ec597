//! Per-identifier access to adjoint and tangent storage during a sweep.
//!
//! A tape does not touch its derivative vector directly while it replays a
//! statement. It goes through a [`VectorAccess`], which hides how the
//! storage is laid out and provides the indirect protocol for statements
//! whose output identifier is also one of their inputs:
//!
//! * reverse: `set_lhs_adjoint(lhs)` moves the output adjoint into a scratch
//!   register and zeroes the storage, then `update_adjoint_with_lhs(arg, jac)`
//!   distributes the register over the inputs. Reading the output before any
//!   input is written keeps `x = x * y` correct.
//! * forward: `update_tangent_with_lhs(arg, jac)` accumulates the input
//!   tangents into the register, then `set_lhs_tangent(lhs)` writes it to the
//!   output and clears the register. Forward mode accumulates first and
//!   writes last, the reverse of the adjoint order.
//!
//! Each `set_lhs_adjoint` must be followed by its distribution before the
//! next one. [`VectorAccess::begin_adjoint`] and
//! [`VectorAccess::begin_tangent`] return guards that make the borrow
//! checker enforce that order.
//!
//! Identifiers are used as slice indices without further checks.

use num_traits::{Float, Zero};

use crate::gradient::Gradient;
use crate::identifier::Identifier;

/// Storage-agnostic adjoint/tangent access used by tape sweeps.
pub trait VectorAccess {
    /// Type of one derivative component.
    type Real: Float;

    /// Number of directions per identifier.
    fn vector_size(&self) -> usize;

    /// True if every component of the scratch register is exactly zero.
    fn is_lhs_zero(&self) -> bool;

    /// Moves the adjoint of `identifier` into the scratch register and zeroes
    /// it in storage.
    fn set_lhs_adjoint(&mut self, identifier: Identifier);
    /// Adds `jacobian * register` to the adjoint of `identifier`.
    fn update_adjoint_with_lhs(&mut self, identifier: Identifier, jacobian: Self::Real);

    /// Writes the scratch register to the tangent of `identifier` and clears
    /// the register.
    fn set_lhs_tangent(&mut self, identifier: Identifier);
    /// Adds `jacobian * tangent(identifier)` to the scratch register.
    fn update_tangent_with_lhs(&mut self, identifier: Identifier, jacobian: Self::Real);

    /// Sets component `dim` of `identifier` to zero.
    fn reset_adjoint(&mut self, identifier: Identifier, dim: usize);
    /// Sets all components of `identifier` to zero.
    fn reset_adjoint_vec(&mut self, identifier: Identifier);

    /// Component `dim` of `identifier`.
    fn get_adjoint(&self, identifier: Identifier, dim: usize) -> Self::Real;
    /// Copies all components of `identifier` into `out`.
    fn get_adjoint_vec(&self, identifier: Identifier, out: &mut [Self::Real]);

    /// Adds `adjoint` to component `dim` of `identifier`.
    fn update_adjoint(&mut self, identifier: Identifier, dim: usize, adjoint: Self::Real);
    /// Adds `vec` componentwise to `identifier`.
    fn update_adjoint_vec(&mut self, identifier: Identifier, vec: &[Self::Real]);

    fn set_primal(&mut self, identifier: Identifier, primal: Self::Real);
    fn get_primal(&self, identifier: Identifier) -> Self::Real;
    fn has_primals(&self) -> bool;

    /// Starts the reverse update of one statement with output `lhs`.
    #[inline]
    fn begin_adjoint(&mut self, lhs: Identifier) -> LhsAdjoint<'_, Self>
    where
        Self: Sized,
    {
        self.set_lhs_adjoint(lhs);
        LhsAdjoint { access: self }
    }

    /// Starts the forward update of one statement with output `lhs`.
    #[inline]
    fn begin_tangent(&mut self, lhs: Identifier) -> LhsTangent<'_, Self>
    where
        Self: Sized,
    {
        LhsTangent { access: self, lhs }
    }
}

/// A staged output adjoint. Lives until the inputs have been updated.
#[must_use]
pub struct LhsAdjoint<'s, A: VectorAccess> {
    access: &'s mut A,
}

impl<A: VectorAccess> LhsAdjoint<'_, A> {
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.access.is_lhs_zero()
    }

    /// Adds `jacobian` times the staged adjoint to `identifier`.
    #[inline]
    pub fn distribute(&mut self, identifier: Identifier, jacobian: A::Real) {
        self.access.update_adjoint_with_lhs(identifier, jacobian);
    }
}

/// A staged output tangent. Written to storage on [`LhsTangent::commit`] or
/// when dropped.
#[must_use]
pub struct LhsTangent<'s, A: VectorAccess> {
    access: &'s mut A,
    lhs: Identifier,
}

impl<A: VectorAccess> LhsTangent<'_, A> {
    /// Adds `jacobian` times the tangent of `identifier`.
    #[inline]
    pub fn accumulate(&mut self, identifier: Identifier, jacobian: A::Real) {
        self.access.update_tangent_with_lhs(identifier, jacobian);
    }

    #[inline]
    pub fn commit(self) {}
}

impl<A: VectorAccess> Drop for LhsTangent<'_, A> {
    fn drop(&mut self) {
        self.access.set_lhs_tangent(self.lhs);
    }
}

/// [`VectorAccess`] over a borrowed slice of gradients.
///
/// Primal values are optional; without them `get_primal` returns zero and
/// `set_primal` does nothing.
pub struct AdjointVectorAccess<'a, G: Gradient> {
    adjoints: &'a mut [G],
    primals: Option<&'a mut [G::Real]>,
    lhs: G,
}

impl<'a, G: Gradient> AdjointVectorAccess<'a, G> {
    pub fn new(adjoints: &'a mut [G]) -> Self {
        Self {
            adjoints,
            primals: None,
            lhs: G::default(),
        }
    }

    pub fn with_primals(adjoints: &'a mut [G], primals: &'a mut [G::Real]) -> Self {
        Self {
            adjoints,
            primals: Some(primals),
            lhs: G::default(),
        }
    }

    /// The full gradient stored for `identifier`.
    #[inline]
    pub fn gradient(&self, identifier: Identifier) -> G {
        self.adjoints[identifier.index()]
    }
}

impl<G: Gradient> VectorAccess for AdjointVectorAccess<'_, G> {
    type Real = G::Real;

    #[inline]
    fn vector_size(&self) -> usize {
        G::DIM
    }

    #[inline]
    fn is_lhs_zero(&self) -> bool {
        self.lhs.is_total_zero()
    }

    #[inline]
    fn set_lhs_adjoint(&mut self, identifier: Identifier) {
        let slot = &mut self.adjoints[identifier.index()];
        self.lhs = *slot;
        *slot = G::default();
    }

    #[inline]
    fn update_adjoint_with_lhs(&mut self, identifier: Identifier, jacobian: G::Real) {
        self.adjoints[identifier.index()].add_scaled(jacobian, &self.lhs);
    }

    #[inline]
    fn set_lhs_tangent(&mut self, identifier: Identifier) {
        self.adjoints[identifier.index()] = self.lhs;
        self.lhs = G::default();
    }

    #[inline]
    fn update_tangent_with_lhs(&mut self, identifier: Identifier, jacobian: G::Real) {
        let tangent = self.adjoints[identifier.index()];
        self.lhs.add_scaled(jacobian, &tangent);
    }

    #[inline]
    fn reset_adjoint(&mut self, identifier: Identifier, dim: usize) {
        *self.adjoints[identifier.index()].at_mut(dim) = G::Real::zero();
    }

    #[inline]
    fn reset_adjoint_vec(&mut self, identifier: Identifier) {
        self.adjoints[identifier.index()] = G::default();
    }

    #[inline]
    fn get_adjoint(&self, identifier: Identifier, dim: usize) -> G::Real {
        self.adjoints[identifier.index()].at(dim)
    }

    fn get_adjoint_vec(&self, identifier: Identifier, out: &mut [G::Real]) {
        let g = &self.adjoints[identifier.index()];
        for (d, slot) in out.iter_mut().enumerate().take(G::DIM) {
            *slot = g.at(d);
        }
    }

    #[inline]
    fn update_adjoint(&mut self, identifier: Identifier, dim: usize, adjoint: G::Real) {
        let c = self.adjoints[identifier.index()].at_mut(dim);
        *c = *c + adjoint;
    }

    fn update_adjoint_vec(&mut self, identifier: Identifier, vec: &[G::Real]) {
        let g = &mut self.adjoints[identifier.index()];
        for (d, &v) in vec.iter().enumerate().take(G::DIM) {
            let c = g.at_mut(d);
            *c = *c + v;
        }
    }

    #[inline]
    fn set_primal(&mut self, identifier: Identifier, primal: G::Real) {
        if let Some(primals) = self.primals.as_deref_mut() {
            primals[identifier.index()] = primal;
        }
    }

    #[inline]
    fn get_primal(&self, identifier: Identifier) -> G::Real {
        match self.primals.as_deref() {
            Some(primals) => primals[identifier.index()],
            None => G::Real::zero(),
        }
    }

    #[inline]
    fn has_primals(&self) -> bool {
        self.primals.is_some()
    }
}
