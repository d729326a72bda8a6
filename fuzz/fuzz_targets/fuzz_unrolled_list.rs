#![no_main]

use kvlist::{FileUnrolledList, ListOptions};
use libfuzzer_sys::arbitrary;
use libfuzzer_sys::fuzz_target;
use std::collections::BTreeMap;

#[derive(arbitrary::Arbitrary, Debug)]
enum ListMethod {
    Insert { key: i16, value: u32 },
    Erase { key: i16 },
    Modify { key: i16, value: u32 },
    Get { key: i16 },
    Range { start: i16, end: i16 },
    Clear,
}

fuzz_target!(|methods: Vec<ListMethod>| {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut list = FileUnrolledList::<i16, u32>::open(
        temp_dir.path().join("fuzz.list"),
        ListOptions::default().target_fill(2),
    )
    .unwrap();
    let mut model = BTreeMap::new();

    use ListMethod::*;
    for method in methods {
        match method {
            Insert { key, value } => {
                let inserted = list.insert(key, value).unwrap();
                assert_eq!(inserted, !model.contains_key(&key));
                model.entry(key).or_insert(value);
            }
            Erase { key } => {
                assert_eq!(list.erase(&key).unwrap(), model.remove(&key).is_some());
            }
            Modify { key, value } => {
                assert_eq!(list.modify(&key, value).unwrap(), model.contains_key(&key));
                if let Some(v) = model.get_mut(&key) {
                    *v = value;
                }
            }
            Get { key } => {
                assert_eq!(list.get(&key).unwrap(), model.get(&key).copied());
            }
            Range { start, end } => {
                let kvs = list.range(&start, &end).unwrap();
                if start < end {
                    let expected: Vec<(i16, u32)> =
                        model.range(start..end).map(|(k, v)| (*k, *v)).collect();
                    assert_eq!(kvs, expected);
                } else {
                    assert!(kvs.is_empty());
                }
            }
            Clear => {
                list.clear().unwrap();
                model.clear();
            }
        }
    }
    let expected: Vec<(i16, u32)> = model.into_iter().collect();
    assert_eq!(list.traverse().unwrap(), expected);
});
