//! Common imports.

pub use crate::access::{AdjointVectorAccess, VectorAccess};
pub use crate::active::ActiveReal;
pub use crate::config::{IdentifierPolicy, TapeConfig};
pub use crate::constant::ConstantExpression;
pub use crate::errors::{ADError, Result};
pub use crate::expressions::{abs, cos, exp, ln, max, min, pow, sin, sqrt, tan};
pub use crate::gradient::{Direction, Gradient};
pub use crate::identifier::Identifier;
pub use crate::jacobian::{compute_jacobian, Jacobian};
pub use crate::node::Node;
pub use crate::parameters::{TapeParameter, TapeSizing};
pub use crate::tape::JacobianTape;
