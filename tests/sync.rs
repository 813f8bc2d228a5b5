use std::sync::Arc;
use std::thread;
use avl_slab::{AvlExt, Direction, RwAvlMap};

#[test]
fn basic_operations() {
	let map: RwAvlMap<u32, String> = RwAvlMap::new();
	map.insert(10, "ten".to_string()).unwrap();
	map.insert(20, "twenty".to_string()).unwrap();

	assert_eq!(map.len(), 2);
	assert!(map.contains(&10));
	assert_eq!(map.get(&10), Some("ten".to_string()));
	assert_eq!(map.get(&15), None);
	assert_eq!(
		map.get_best_fit(&15, Direction::Above),
		Some((20, "twenty".to_string()))
	);

	let (hit, last) = map.get_with_parent(&15);
	assert_eq!(hit, None);
	assert!(last.is_some());

	assert_eq!(map.remove(&10), Some("ten".to_string()));
	assert_eq!(map.remove(&10), None);
	assert_eq!(map.len(), 1);

	map.clear();
	assert!(map.is_empty());
}

#[test]
fn enumeration_under_shared_lock() {
	let map: RwAvlMap<u32, u32> = RwAvlMap::new();
	for key in [3, 1, 2].iter() {
		map.insert(*key, *key * 10).unwrap();
	}

	let collected = map.read(|tree| {
		tree.iter().map(|(k, v)| (*k, *v)).collect::<Vec<_>>()
	});
	assert_eq!(collected, vec![(1, 10), (2, 20), (3, 30)]);
}

#[test]
fn concurrent_writers_and_readers() {
	let map: Arc<RwAvlMap<u32, u32>> = Arc::new(RwAvlMap::with_cache(64));
	let writers = 4;
	let per_writer = 250u32;

	let mut handles = Vec::new();
	for w in 0..writers {
		let map = Arc::clone(&map);
		handles.push(thread::spawn(move || {
			// Disjoint key spans per writer.
			let base = w as u32 * 1000;
			for i in 0..per_writer {
				map.insert(base + i, base + i).unwrap();
			}
		}));
	}
	for _ in 0..4 {
		let map = Arc::clone(&map);
		handles.push(thread::spawn(move || {
			for probe in 0..1000u32 {
				// Results may or may not be present mid-run; they must be
				// consistent when they are.
				if let Some(value) = map.get(&probe) {
					assert_eq!(value, probe);
				}
				if let Some((key, value)) = map.get_best_fit(&probe, Direction::Below) {
					assert_eq!(key, value);
					assert!(key <= probe);
				}
			}
		}));
	}
	for handle in handles {
		handle.join().unwrap();
	}

	assert_eq!(map.len(), writers as usize * per_writer as usize);
	map.read(|tree| tree.validate());
	for w in 0..writers {
		let base = w as u32 * 1000;
		assert_eq!(map.get(&(base + 17)), Some(base + 17));
	}
}

#[test]
fn lock_released_on_miss_paths() {
	let map: RwAvlMap<u32, u32> = RwAvlMap::new();
	// Each call takes and releases the lock; a retained guard would
	// deadlock the exclusive call that follows.
	assert_eq!(map.get(&1), None);
	assert_eq!(map.get_best_fit(&1, Direction::Above), None);
	assert_eq!(map.remove(&1), None);
	map.insert(1, 1).unwrap();
	assert_eq!(map.get(&1), Some(1));
}
