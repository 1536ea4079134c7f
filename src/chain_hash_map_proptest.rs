#![cfg(test)]

// Property tests for ChainHashMap kept inside the crate so they can
// inspect bucket chains directly.

use crate::chain_hash_map::ChainHashMap;
use crate::config::{GrowthPolicy, TableConfig};
use crate::error::TableError;
use crate::hashing::bucket_index;
use core::hash::BuildHasher;
use proptest::prelude::*;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, u32),
    Remove(usize),
    Get(usize),
    Contains(String),
    Traverse,
    Cursor,
}

fn arb_scenario() -> impl Strategy<Value = (usize, Vec<String>, Vec<OpI>)> {
    (0usize..12, proptest::collection::vec("[a-z]{0,4}", 1..=10)).prop_flat_map(|(cap, pool)| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            (idx.clone(), any::<u32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            idx.clone().prop_map(OpI::Remove),
            idx.clone().prop_map(OpI::Get),
            prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,4}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            Just(OpI::Traverse),
            Just(OpI::Cursor),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (cap, pool.clone(), ops))
    })
}

fn cursor_keys(t: &ChainHashMap<u32>) -> Result<Vec<String>, TableError> {
    let mut c = t.cursor();
    let mut out = Vec::new();
    while c.has_next() {
        if let Some(k) = c.next_key(t)? {
            out.push(k.to_owned());
        }
    }
    Ok(out)
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - Overwrite-on-duplicate: len unchanged, old element released once.
// - `get`/`contains` parity with the model; remove on absent key is NotFound.
// - Every released element reaches the destructor exactly once, including at drop.
// - `for_each_key` and the cursor each yield every live key exactly once.
// - `len` equals the sum of chain lengths after every op.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((cap, pool, ops) in arb_scenario()) {
        let released = Rc::new(RefCell::new(Vec::<u32>::new()));
        let sink = released.clone();
        let mut sut = ChainHashMap::with_destructor(cap, move |v| sink.borrow_mut().push(v)).unwrap();
        let mut model: HashMap<String, u32> = HashMap::new();
        let mut expect_released: Vec<u32> = Vec::new();
        prop_assert_eq!(sut.capacity(), cap.max(3));

        for op in ops {
            match op {
                OpI::Insert(i, v) => {
                    let k = &pool[i];
                    sut.insert(k, v).unwrap();
                    if let Some(old) = model.insert(k.clone(), v) {
                        expect_released.push(old);
                    }
                }
                OpI::Remove(i) => {
                    let k = &pool[i];
                    match model.remove(k) {
                        Some(old) => {
                            prop_assert!(sut.remove(k).is_ok());
                            expect_released.push(old);
                        }
                        None => {
                            prop_assert_eq!(sut.remove(k), Err(TableError::not_found(k)));
                        }
                    }
                }
                OpI::Get(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.get(k), model.get(k));
                }
                OpI::Contains(k) => {
                    prop_assert_eq!(sut.contains(&k), model.contains_key(&k));
                }
                OpI::Traverse => {
                    let mut seen = Vec::new();
                    let n = sut.for_each_key(|_, k| { seen.push(k.to_owned()); false });
                    prop_assert_eq!(n, model.len());
                    let set: BTreeSet<String> = seen.into_iter().collect();
                    prop_assert_eq!(set.len(), n);
                    let model_keys: BTreeSet<String> = model.keys().cloned().collect();
                    prop_assert_eq!(set, model_keys);
                }
                OpI::Cursor => {
                    let keys = cursor_keys(&sut).unwrap();
                    let mut visited = Vec::new();
                    sut.for_each_key(|_, k| { visited.push(k.to_owned()); false });
                    prop_assert_eq!(keys, visited, "cursor and traversal share an order");
                }
            }
            let got = released.borrow().clone();
            prop_assert_eq!(got, expect_released.clone());
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            let chained: usize = sut.buckets().iter().flatten().map(|c| c.len()).sum();
            prop_assert_eq!(chained, sut.len());
        }

        let mut remaining: Vec<u32> = model.values().copied().collect();
        drop(sut);
        let mut at_drop = released.borrow()[expect_released.len()..].to_vec();
        remaining.sort_unstable();
        at_drop.sort_unstable();
        prop_assert_eq!(at_drop, remaining);
    }
}

// Property: with a load-factor policy the table grows yet every key stays
// reachable and sits in the bucket its content hashes to.
proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]
    #[test]
    fn prop_growth_preserves_entries(keys in proptest::collection::btree_set("[a-z0-9]{1,6}", 0..120)) {
        let cfg = TableConfig::new(3).with_growth(GrowthPolicy::MaxLoadFactor(0.75));
        let mut t = ChainHashMap::from_config(cfg, None).unwrap();
        for (i, k) in keys.iter().enumerate() {
            t.insert(k, i).unwrap();
        }
        prop_assert!(t.load_factor() <= 0.75);
        for (i, k) in keys.iter().enumerate() {
            prop_assert_eq!(t.get(k), Some(&i));
        }
        let build = crate::hashing::BuildPolyHasher::default();
        for (b, chain) in t.buckets().iter().enumerate() {
            for e in chain.iter().flatten() {
                prop_assert_eq!(bucket_index(build.hash_one(e.key.as_str()), t.capacity()), b);
            }
        }
    }
}
