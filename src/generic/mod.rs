//! Generic AVL tree types.
//!
//! Types defined in this module are independant of the actual storage type.
pub mod key;
pub mod node;
pub mod tree;

pub use key::{Arrangement, Direction, RangeKey, TreeKey};
pub use node::Node;
pub use tree::{AvlExt, AvlTree, Chain, DuplicatePolicy, InsertError, IntoIter, Iter, Reject};
