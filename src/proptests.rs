use super::*;

use alloc::{collections::BTreeMap, vec, vec::Vec};
use core::ops::Bound;
use proptest::prelude::*;

fn validate_map<K: Ord, V>(map: &OrderedMap<K, V>) {
    let tree = map.tree();
    assert!(tree.verify_rb_invariants(), "red-black invariants broken");
    assert_eq!(
        tree.iter().count(),
        map.size(),
        "in-order walk must visit every live node"
    );
}

#[derive(Clone, Debug)]
enum Op {
    Insert(u16, u32),
    Remove(u16),
    Search(u16),
    Neighbours(u16),
}

fn key_strategy() -> impl Strategy<Value = u16> + Clone {
    // a narrow key space so that overwrites and removals of live keys are common
    0u16..512
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = key_strategy();
    let op = prop_oneof![
        50 => (key.clone(), any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        30 => key.clone().prop_map(Op::Remove),
        15 => key.clone().prop_map(Op::Search),
        5 => key.clone().prop_map(Op::Neighbours),
    ];
    prop::collection::vec(op, 0..=1000)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        max_shrink_iters: 10_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_with_btreemap(ops in ops_strategy()) {
        let mut map: OrderedMap<u16, u32> = OrderedMap::new();
        let mut model: BTreeMap<u16, u32> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    prop_assert_eq!(map.insert(key, value), model.insert(key, value));
                }
                Op::Remove(key) => {
                    prop_assert_eq!(map.remove(&key), model.remove(&key));
                }
                Op::Search(key) => {
                    prop_assert_eq!(map.search(&key), model.get(&key));
                    prop_assert_eq!(map.contains_key(&key), model.contains_key(&key));
                }
                Op::Neighbours(key) => {
                    let (expected_prev, expected_next) = if model.contains_key(&key) {
                        (
                            model.range(..key).next_back(),
                            model.range((Bound::Excluded(key), Bound::Unbounded)).next(),
                        )
                    } else {
                        (None, None)
                    };
                    prop_assert_eq!(map.predecessor(&key), expected_prev);
                    prop_assert_eq!(map.successor(&key), expected_next);
                }
            }

            prop_assert_eq!(map.size(), model.len());
        }

        validate_map(&map);
        prop_assert_eq!(map.min(), model.iter().next());
        prop_assert_eq!(map.max(), model.iter().next_back());
        let got: Vec<(u16, u32)> = map.tree().iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(u16, u32)> = model.into_iter().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_insert_then_drain(keys in prop::collection::vec(any::<i32>(), 0..=600)) {
        let mut map = OrderedMap::new();
        for (i, &key) in keys.iter().enumerate() {
            map.insert(key, i);
            prop_assert_eq!(map.search(&key), Some(&i));
        }
        validate_map(&map);

        let mut sorted = keys.clone();
        sorted.sort_unstable();
        sorted.dedup();
        prop_assert_eq!(map.size(), sorted.len());

        for key in &keys {
            map.remove(key);
            prop_assert_eq!(map.search(key), None);
        }
        prop_assert!(map.is_empty());
        validate_map(&map);
    }

    #[test]
    fn prop_overwrite_preserves_order(
        keys in prop::collection::vec(0i64..1000, 1..=300),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut map: OrderedMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
        let before: Vec<i64> = map.tree().iter().map(|(k, _)| *k).collect();
        let size = map.size();

        let key = keys[pick.index(keys.len())];
        prop_assert_eq!(map.insert(key, -1), Some(key));

        let after: Vec<i64> = map.tree().iter().map(|(k, _)| *k).collect();
        prop_assert_eq!(map.size(), size);
        prop_assert_eq!(before, after);
        prop_assert_eq!(map.search(&key), Some(&-1));
        validate_map(&map);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for (i, item) in items.iter().enumerate() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(item.clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys = [1, 2, 3, 4, 5, 6, 7];

    for_each_permutation(&keys, |perm| {
        let mut map = OrderedMap::new();
        for (i, key) in perm.into_iter().enumerate() {
            assert_eq!(map.insert(key, i), None);
        }

        validate_map(&map);
        let got: Vec<i32> = map.tree().iter().map(|(k, _)| *k).collect();
        assert_eq!(got, keys);
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let keys = [10, 20, 30, 40, 50, 60, 70];

    // Insert in a fixed order, then remove in all permutations.
    let base: OrderedMap<i32, i32> = keys.iter().map(|&k| (k, k * 2)).collect();

    for_each_permutation(&keys, |perm| {
        let mut map = base.clone();
        let mut model: BTreeMap<i32, i32> = keys.iter().map(|&k| (k, k * 2)).collect();

        for key in perm {
            assert_eq!(map.remove(&key), model.remove(&key));
            assert_eq!(map.size(), model.len());
            validate_map(&map);
        }
        assert!(map.is_empty());
        assert_eq!(map.min(), None);
    });
}
