//! Compile-time classification of expression types.
//!
//! All functions here are `const fn`, so they can size buffers or drive
//! `const` assertions.

use crate::node::Node;
use crate::traversal::{ActiveArguments, ConstantArguments, StaticTraversal};

/// True if `E` is an assignable active leaf.
pub const fn is_lhs_expression<E: Node>() -> bool {
    E::IS_LHS
}

/// True if `E` is a constant leaf. Operations over constants are not
/// constant leaves themselves.
pub const fn is_constant_expression<E: Node>() -> bool {
    E::IS_CONSTANT
}

/// Number of active-typed leaves in `E`, counting repeated leaves and
/// leaves that turn out to be passive at runtime.
pub const fn number_of_active_type_arguments<E: StaticTraversal<ActiveArguments>>() -> usize {
    <E as StaticTraversal<ActiveArguments>>::VALUE
}

/// Number of constant leaves in `E`.
pub const fn number_of_constant_type_arguments<E: StaticTraversal<ConstantArguments>>() -> usize
{
    <E as StaticTraversal<ConstantArguments>>::VALUE
}
