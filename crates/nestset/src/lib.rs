//! Sets whose members may themselves be sets, and three ways of building their powersets.

pub mod algebra;
pub mod atom;
pub mod display;
pub mod error;
pub mod nesting;
pub mod node;
pub mod parse;
pub mod powerset;

pub use atom::Atom;
pub use error::{SetError, SetOp, SetResult};
pub use node::Node;
pub use powerset::PowersetAlgorithm;
