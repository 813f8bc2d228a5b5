//! AVL trees whose nodes live in an external slab.
//!
//! One generic core ([`generic::AvlTree`]) is specialized over a key
//! representation (scalar or interval), a node store and a duplicate-key
//! policy. Child links are stable slab ids rather than pointers, so the
//! backing storage can be moved, cloned or shared without any fix-up pass.
#[cfg(feature = "std-slab")]
use slab::Slab;

pub mod store;
pub mod generic;
pub mod cache;
pub mod sync;

pub use store::{Store, StoreMut};
pub use generic::{
	AvlExt,
	AvlTree,
	Chain,
	Direction,
	InsertError,
	Node,
	RangeKey,
	Reject,
	TreeKey
};

/// AVL map based on `Slab`, rejecting duplicate keys.
#[cfg(feature = "std-slab")]
pub type AvlMap<K, V> = generic::AvlTree<K, V, Slab<Node<K, V>>, Reject>;

/// AVL map based on `Slab`, chaining duplicate keys under the in-tree node.
#[cfg(feature = "std-slab")]
pub type AvlMultiMap<K, V> = generic::AvlTree<K, V, Slab<Node<K, V>>, Chain>;

/// AVL map over disjoint interval keys based on `Slab`, probed by point.
#[cfg(feature = "std-slab")]
pub type AvlRangeMap<K, V> = generic::AvlTree<RangeKey<K>, V, Slab<Node<RangeKey<K>, V>>, Reject>;

/// Reader/writer locked AVL map based on `Slab`.
#[cfg(feature = "std-slab")]
pub type RwAvlMap<K, V> = sync::RwTree<K, V, Slab<Node<K, V>>, Reject>;
