#![feature(test)]
extern crate kvlist;
extern crate test;

use kvlist::{CompositeKey, FileDoubleUnrolledList, FileUnrolledList, ListOptions};
use tempfile::TempDir;
use test::Bencher;

const NUM_KVS: i32 = 5000;

#[bench]
fn bench_unrolled_list_insert(b: &mut Bencher) {
    b.iter(|| {
        let temp_dir = TempDir::new().unwrap();
        let mut list: FileUnrolledList<i32, i32> =
            FileUnrolledList::open(temp_dir.path().join("list"), ListOptions::default()).unwrap();
        for _ in 0..NUM_KVS {
            list.insert(rand::random::<i32>() % NUM_KVS, 0).unwrap();
        }
    })
}

#[bench]
fn bench_unrolled_list_small_blocks_insert(b: &mut Bencher) {
    b.iter(|| {
        let temp_dir = TempDir::new().unwrap();
        let mut list: FileUnrolledList<i32, i32> = FileUnrolledList::open(
            temp_dir.path().join("list"),
            ListOptions::default().target_fill(16),
        )
        .unwrap();
        for _ in 0..NUM_KVS {
            list.insert(rand::random::<i32>() % NUM_KVS, 0).unwrap();
        }
    })
}

#[bench]
fn bench_unrolled_list_get(b: &mut Bencher) {
    let temp_dir = TempDir::new().unwrap();
    let mut list: FileUnrolledList<i32, i32> =
        FileUnrolledList::open(temp_dir.path().join("list"), ListOptions::default()).unwrap();
    for i in 0..NUM_KVS {
        list.insert(i, i).unwrap();
    }
    b.iter(|| {
        for _ in 0..1000 {
            let key = rand::random::<i32>().rem_euclid(NUM_KVS);
            assert_eq!(list.get(&key).unwrap(), Some(key));
        }
    })
}

#[bench]
fn bench_double_unrolled_list_traverse_primary(b: &mut Bencher) {
    let temp_dir = TempDir::new().unwrap();
    let mut list: FileDoubleUnrolledList<i32, i32, i32> = FileDoubleUnrolledList::open(
        temp_dir.path().join("list"),
        ListOptions::default().target_fill(32),
    )
    .unwrap();
    for i in 0..NUM_KVS {
        list.insert(CompositeKey::new(i % 50, i), i).unwrap();
    }
    b.iter(|| {
        let primary = rand::random::<i32>().rem_euclid(50);
        assert_eq!(list.traverse_primary(&primary).unwrap().len(), 100);
    })
}
