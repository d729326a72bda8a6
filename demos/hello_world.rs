use kvlist::{CompositeKey, FileDoubleUnrolledList, FixedStr};
use std::convert::TryFrom;
use tempfile::TempDir;

fn main() {
    let temp_dir = TempDir::new().unwrap();
    let mut list =
        FileDoubleUnrolledList::<FixedStr<16>, u32, u64>::open_default(temp_dir.path().join("hello"))
            .unwrap();
    let hello = FixedStr::try_from("hello").unwrap();
    list.insert(CompositeKey::new(hello, 1), 100).unwrap();
    list.insert(CompositeKey::new(hello, 2), 200).unwrap();

    println!("{:?}", list.get(&CompositeKey::new(hello, 1)).unwrap()); // Some(100)
    println!("{:?}", list.values_of(&hello).unwrap()); // [100, 200]
}
