use std::cmp::Ordering;
use std::hash::Hash;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Search direction for best-fit queries.
///
/// The best fitting node is always located on the search path: `Above` is
/// the node where the search last turned left, `Below` the node where it
/// last turned right. An exact match short-circuits either direction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum Direction {
	/// Closest key greater than or equal to the probe.
	Above,
	/// Closest key less than or equal to the probe.
	Below
}

/// Placement of one key relative to another at insertion time.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Arrangement {
	/// `self` orders strictly before the other key.
	Before,
	/// The keys are identical.
	Equal,
	/// `self` orders strictly after the other key.
	After,
	/// The keys overlap without being identical (interval keys only).
	Conflict
}

/// Key capability bound by the tree core.
///
/// A key compares against two different shapes: a [`Probe`](TreeKey::Probe)
/// during lookups, and another key during insertion. For scalar keys the two
/// coincide; an interval key is probed by a single point and compares
/// [`Equal`](Ordering::Equal) to any point it contains.
pub trait TreeKey: Copy {
	/// The value lookups search by.
	type Probe: Copy + Hash;

	/// Order of `self` relative to `probe`.
	fn compare(&self, probe: &Self::Probe) -> Ordering;

	/// Placement of `self` relative to `other` for insertion.
	fn arrange(&self, other: &Self) -> Arrangement;

	/// A probe guaranteed to match `self` exactly.
	fn probe(&self) -> Self::Probe;

	/// Boundary well-formedness check.
	///
	/// Keys failing this are rejected by `insert` before any mutation.
	fn well_formed(&self) -> bool {
		true
	}
}

macro_rules! scalar_key {
	($($ty:ty),*) => {
		$(
			impl TreeKey for $ty {
				type Probe = $ty;

				#[inline]
				fn compare(&self, probe: &$ty) -> Ordering {
					Ord::cmp(self, probe)
				}

				#[inline]
				fn arrange(&self, other: &$ty) -> Arrangement {
					match Ord::cmp(self, other) {
						Ordering::Less => Arrangement::Before,
						Ordering::Equal => Arrangement::Equal,
						Ordering::Greater => Arrangement::After
					}
				}

				#[inline]
				fn probe(&self) -> $ty {
					*self
				}
			}
		)*
	}
}

scalar_key!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

/// An interval key `[start, last]`, both bounds inclusive.
///
/// Lookups probe by a single point: the key compares equal to every point it
/// contains. Two interval keys only coexist in a tree when disjoint, so
/// in-order enumeration yields ascending `start` values; inserting an
/// intersecting interval is rejected with
/// [`InsertError::Overlap`](crate::InsertError::Overlap).
///
/// # Example
///
/// ```
/// use avl_slab::AvlRangeMap;
///
/// let mut map: AvlRangeMap<u32, &str> = AvlRangeMap::new();
/// map.insert((0x1000, 0x1fff).into(), "text").unwrap();
/// map.insert((0x3000, 0x3fff).into(), "data").unwrap();
///
/// assert_eq!(map.get(&0x1234), Some(&"text"));
/// assert_eq!(map.get(&0x2000), None);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct RangeKey<K> {
	/// First value covered by the interval.
	pub start: K,
	/// Last value covered by the interval.
	pub last: K
}

impl<K: Ord + Copy> RangeKey<K> {
	/// Create an interval key covering `start..=last`.
	#[inline]
	pub fn new(start: K, last: K) -> RangeKey<K> {
		RangeKey { start, last }
	}

	/// Whether the interval contains `point`.
	#[inline]
	pub fn contains(&self, point: &K) -> bool {
		self.start <= *point && *point <= self.last
	}
}

impl<K> From<(K, K)> for RangeKey<K> {
	#[inline]
	fn from((start, last): (K, K)) -> RangeKey<K> {
		RangeKey { start, last }
	}
}

impl<K: Ord + Copy + Hash> TreeKey for RangeKey<K> {
	type Probe = K;

	#[inline]
	fn compare(&self, probe: &K) -> Ordering {
		if self.last < *probe {
			Ordering::Less
		} else if self.start > *probe {
			Ordering::Greater
		} else {
			Ordering::Equal
		}
	}

	fn arrange(&self, other: &RangeKey<K>) -> Arrangement {
		if self.last < other.start {
			Arrangement::Before
		} else if self.start > other.last {
			Arrangement::After
		} else if self.start == other.start && self.last == other.last {
			Arrangement::Equal
		} else {
			Arrangement::Conflict
		}
	}

	#[inline]
	fn probe(&self) -> K {
		self.start
	}

	#[inline]
	fn well_formed(&self) -> bool {
		self.start <= self.last
	}
}
