//! Expression-template automatic differentiation.
//!
//! Arithmetic on [`active::ActiveReal`] builds a typed expression tree for
//! each statement. The tree is walked by [`traversal::TraversalLogic`]
//! analyses to count leaves or apply the chain rule, and the results are
//! written to tape-owned adjoint or tangent storage through
//! [`access::VectorAccess`]. [`tape::JacobianTape`] records one jacobian entry
//! per statement argument and evaluates the recording in reverse or forward
//! mode.
//!
//! ```
//! use exprtape::prelude::*;
//!
//! let mut tape = JacobianTape::<f64>::new();
//! tape.set_active();
//! let a = tape.register_input(2.0);
//! let b = tape.register_input(3.0);
//! let y = tape.record(&(a * b + sin(a)));
//!
//! tape.seed(y.identifier(), 1.0).unwrap();
//! tape.evaluate();
//! assert_eq!(tape.gradient_of(&b).unwrap(), 2.0);
//! ```

pub mod access;
pub mod active;
pub mod config;
pub mod constant;
pub mod errors;
pub mod expression_traits;
pub mod expressions;
pub mod gradient;
pub mod identifier;
pub mod jacobian;
pub mod node;
pub mod operations;
pub mod parameters;
pub mod prelude;
pub mod statement;
pub mod tape;
pub mod traversal;
mod overloads;
