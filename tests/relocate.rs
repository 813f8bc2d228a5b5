use rand::{rngs::SmallRng, seq::SliceRandom, SeedableRng};
use avl_slab::{AvlExt, AvlMap, AvlRangeMap, Direction, RangeKey};

const SEED: u64 = 0x0ff5e7;

/// Rebuilding a handle over a cloned store (fresh allocations, new
/// addresses) must leave every lookup result identical: links are store
/// ids, not pointers, so relocation needs no fix-up pass.
#[test]
fn handoff_to_cloned_store() {
	let mut rng = SmallRng::seed_from_u64(SEED);
	let mut keys: Vec<u32> = (0..150).map(|i| i * 11 + 5).collect();
	keys.shuffle(&mut rng);

	let mut original: AvlMap<u32, u32> = AvlMap::new();
	for key in &keys {
		original.insert(*key, *key ^ 0xffff).unwrap();
	}

	let (store, root, len) = original.into_raw_parts();
	let relocated: AvlMap<u32, u32> = AvlMap::from_raw_parts(store.clone(), root, len);
	let original: AvlMap<u32, u32> = AvlMap::from_raw_parts(store, root, len);
	relocated.validate();

	assert_eq!(relocated.len(), original.len());
	for probe in 0..2000 {
		assert_eq!(relocated.get(&probe), original.get(&probe));
		assert_eq!(
			relocated.get_best_fit(&probe, Direction::Above),
			original.get_best_fit(&probe, Direction::Above)
		);
		assert_eq!(
			relocated.get_best_fit(&probe, Direction::Below),
			original.get_best_fit(&probe, Direction::Below)
		);
	}
}

/// Moving the whole tree value around (and onto the heap) never invalidates
/// links.
#[test]
fn moves_are_free() {
	let mut map: AvlMap<u32, u32> = AvlMap::new();
	for key in 0..100u32 {
		map.insert(key, key).unwrap();
	}

	let moved = map;
	let boxed = Box::new(moved);
	boxed.validate();
	assert_eq!(boxed.get(&42), Some(&42));
	assert_eq!(boxed.len(), 100);
}

/// A relocated interval tree answers exactly like a freshly built one.
#[test]
fn relocated_range_map() {
	let mut built: AvlRangeMap<u32, u32> = AvlRangeMap::new();
	for i in 0..50u32 {
		let start = i * 100;
		built.insert(RangeKey::new(start, start + 60), i).unwrap();
	}

	let (store, root, len) = built.into_raw_parts();
	let relocated: AvlRangeMap<u32, u32> = AvlRangeMap::from_raw_parts(store.clone(), root, len);
	let built: AvlRangeMap<u32, u32> = AvlRangeMap::from_raw_parts(store, root, len);

	for probe in (0..5000).step_by(7) {
		assert_eq!(relocated.get(&probe), built.get(&probe));
	}
	relocated.validate();
}

/// A rebuilt handle keeps mutating correctly.
#[test]
fn mutate_after_handoff() {
	let mut map: AvlMap<u32, u32> = AvlMap::new();
	for key in [50, 30, 70, 20, 40, 60, 80].iter() {
		map.insert(*key, *key).unwrap();
	}

	let (store, root, len) = map.into_raw_parts();
	let mut map: AvlMap<u32, u32> = AvlMap::from_raw_parts(store, root, len);

	map.insert(45, 45).unwrap();
	assert_eq!(map.remove(&70), Some(70));
	map.validate();
	let collected: Vec<u32> = map.iter().map(|(k, _)| *k).collect();
	assert_eq!(collected, vec![20, 30, 40, 45, 50, 60, 80]);
}
