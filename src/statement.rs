//! Derivative propagation for a single statement `lhs = expr`, straight from
//! the expression tree.

use num_traits::One;

use crate::access::VectorAccess;
use crate::identifier::Identifier;
use crate::node::Node;
use crate::traversal::for_each_jacobian;

/// Reverse update of `lhs = expr`: the adjoint of `lhs` is moved out of
/// storage and distributed to every active leaf of `expr`.
///
/// `lhs` may appear among the leaves.
pub fn reverse_statement<E, A>(expr: &E, lhs: Identifier, access: &mut A)
where
    E: Node,
    A: VectorAccess<Real = E::Real>,
{
    let mut staged = access.begin_adjoint(lhs);
    if staged.is_zero() {
        return;
    }
    for_each_jacobian(expr, E::Real::one(), |identifier, jacobian| {
        if identifier.is_active() {
            staged.distribute(identifier, jacobian);
        }
    });
}

/// Forward update of `lhs = expr`: the tangent of `lhs` becomes the
/// jacobian-weighted sum of the tangents of the active leaves.
pub fn forward_statement<E, A>(expr: &E, lhs: Identifier, access: &mut A)
where
    E: Node,
    A: VectorAccess<Real = E::Real>,
{
    let mut staged = access.begin_tangent(lhs);
    for_each_jacobian(expr, E::Real::one(), |identifier, jacobian| {
        if identifier.is_active() {
            staged.accumulate(identifier, jacobian);
        }
    });
    staged.commit();
}
