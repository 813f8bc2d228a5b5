use rand::{rngs::SmallRng, seq::SliceRandom, Rng, SeedableRng};
use avl_slab::{AvlExt, AvlMap, AvlMultiMap, Direction};

const SEED: u64 = 0xbe57_f17;

#[test]
fn empty_tree() {
	let map: AvlMap<u32, ()> = AvlMap::new();
	assert_eq!(map.get_best_fit(&0, Direction::Above), None);
	assert_eq!(map.get_best_fit(&0, Direction::Below), None);
}

#[test]
fn three_keys() {
	let mut map: AvlMap<u32, ()> = AvlMap::new();
	for key in [10, 20, 30].iter() {
		map.insert(*key, ()).unwrap();
	}

	let above = |map: &AvlMap<u32, ()>, probe| {
		map.get_best_fit(&probe, Direction::Above).map(|(k, _)| *k)
	};
	let below = |map: &AvlMap<u32, ()>, probe| {
		map.get_best_fit(&probe, Direction::Below).map(|(k, _)| *k)
	};

	assert_eq!(above(&map, 15), Some(20));
	assert_eq!(below(&map, 15), Some(10));
	// An exact match wins in either direction.
	assert_eq!(above(&map, 20), Some(20));
	assert_eq!(below(&map, 20), Some(20));
	assert_eq!(above(&map, 35), None);
	assert_eq!(below(&map, 5), None);
	assert_eq!(above(&map, 10), Some(10));
	assert_eq!(below(&map, 30), Some(30));
}

#[test]
fn matches_linear_scan() {
	let mut rng = SmallRng::seed_from_u64(SEED);
	let mut keys: Vec<u32> = (0..200).map(|i| i * 5 + 2).collect();
	keys.shuffle(&mut rng);

	let mut map: AvlMap<u32, u32> = AvlMap::new();
	for key in &keys {
		map.insert(*key, *key).unwrap();
	}
	keys.sort_unstable();

	for _ in 0..500 {
		let probe = rng.gen_range(0..1100);
		let above = keys.iter().copied().find(|k| *k >= probe);
		let below = keys.iter().copied().rev().find(|k| *k <= probe);
		assert_eq!(
			map.get_best_fit(&probe, Direction::Above).map(|(k, _)| *k),
			above
		);
		assert_eq!(
			map.get_best_fit(&probe, Direction::Below).map(|(k, _)| *k),
			below
		);
	}
}

#[test]
fn remove_best_fit_equals_get_then_remove() {
	let mut rng = SmallRng::seed_from_u64(SEED);
	let mut keys: Vec<u32> = (0..100).map(|i| i * 7 + 3).collect();
	keys.shuffle(&mut rng);

	let mut map: AvlMap<u32, u32> = AvlMap::new();
	for key in &keys {
		map.insert(*key, *key * 2).unwrap();
	}

	for _ in 0..200 {
		let probe = rng.gen_range(0..800);
		let direction = if rng.gen_bool(0.5) {
			Direction::Above
		} else {
			Direction::Below
		};

		let mut reference = map.clone();
		let expected = reference
			.get_best_fit(&probe, direction)
			.map(|(k, _)| *k);
		let expected = expected.map(|k| (k, reference.remove(&k).unwrap()));

		assert_eq!(map.remove_best_fit(&probe, direction), expected);
		map.validate();
		assert_eq!(map, reference);

		if map.is_empty() {
			break;
		}
	}
}

#[test]
fn remove_best_fit_pops_chain_first() {
	let mut map: AvlMultiMap<u32, &str> = AvlMultiMap::new();
	map.insert(10, "ten").unwrap();
	map.insert(20, "twenty").unwrap();
	map.insert(20, "chained").unwrap();
	let shape_before = (map.root_id(), map.height());

	// The chained value goes first, without any relinking.
	assert_eq!(map.remove_best_fit(&15, Direction::Above), Some((20, "chained")));
	assert_eq!((map.root_id(), map.height()), shape_before);
	map.validate();

	// The in-tree node goes next.
	assert_eq!(map.remove_best_fit(&15, Direction::Above), Some((20, "twenty")));
	map.validate();
	assert_eq!(map.remove_best_fit(&15, Direction::Above), None);
	assert_eq!(map.len(), 1);
}

#[test]
fn drain_by_best_fit() {
	let mut map: AvlMap<u32, u32> = AvlMap::new();
	for key in [40, 10, 30, 20, 50].iter() {
		map.insert(*key, *key).unwrap();
	}

	let mut drained = Vec::new();
	while let Some((key, _)) = map.remove_best_fit(&0, Direction::Above) {
		map.validate();
		drained.push(key);
	}
	assert_eq!(drained, vec![10, 20, 30, 40, 50]);
	assert!(map.is_empty());
}
