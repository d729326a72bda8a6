use kvlist::{FileUnrolledList, ListOptions};

const NUM_KVS: i32 = 100000;

fn main() {
    let path = tempfile::tempdir().unwrap();
    let mut list =
        FileUnrolledList::<i32, i64>::open(path.path().join("insert.list"), ListOptions::default())
            .unwrap();
    let start = std::time::Instant::now();
    for i in 0..NUM_KVS {
        list.insert(i, i as i64 * 2).unwrap();
    }
    let end = std::time::Instant::now();
    println!("{:?}", end - start);

    let start = std::time::Instant::now();
    for i in 0..NUM_KVS {
        list.get(&i).unwrap();
    }

    let end = std::time::Instant::now();
    println!("{:?}", end - start);

    list.flush().unwrap();
    drop(list);
}
