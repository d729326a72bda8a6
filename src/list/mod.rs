//! File-resident unrolled linked list.
//!
//! # List File
//!
//! ```text
//! +----------------------------------+ (offset 0)
//! | Root Page                        |--+--+
//! +----------------------------------+  |  |
//! | Block Header 1                   |<-+  |
//! | Payload: max fill slots          |     |
//! +----------------------------------+     |
//! | Block Header 2                   |     |
//! | Payload: max fill slots          |     |
//! +----------------------------------+     |
//! | ...                              |     |
//! +----------------------------------+     |
//! | Block Header n                   |<----+
//! | Payload: max fill slots          |
//! +----------------------------------+
//! ```
//!
//! Blocks form a doubly linked chain ordered by key; the file order of
//! blocks means nothing. Walking the chain and emitting each block's head
//! followed by its `fill` trailing slots yields every entry in strictly
//! ascending key order.
//!
//! A block whose trailing array reaches `max fill` is split, keeping
//! `target fill` slots. A block whose last entry is erased goes to the free
//! list and is reused, payload included, by the next allocation. Blocks are
//! never merged.
//!
//! See [`record`](crate::record) for the byte layout of each record.

mod block;
mod iter;
mod search;

pub use iter::Iter;

use crate::cache::EntryCache;
use crate::codec::FixedCodec;
use crate::error::KVListError;
use crate::ioutils::RecordFile;
use crate::key::{CompositeKey, ListKey, PrimaryKey};
use crate::options::ListOptions;
use crate::record::{BlockHeader, RecordId, RootPage, Slot};
use crate::Result;
use search::{Located, Position};
use std::path::{Path, PathBuf};

/// List keyed by a single component.
pub type FileUnrolledList<K, V> = UnrolledList<K, V>;

/// List keyed by `(primary, secondary)`.
pub type FileDoubleUnrolledList<P, S, V> = UnrolledList<CompositeKey<P, S>, V>;

/// Persistent ordered map stored as an unrolled linked list in one file.
///
/// Single reader/writer. Every operation finishes its writes before it
/// returns; [`flush`](Self::flush) is the durability barrier.
pub struct UnrolledList<K: ListKey, V: FixedCodec + Clone> {
    path: PathBuf,
    file: RecordFile,
    root: RootPage,
    options: ListOptions,
    cache: EntryCache<K, V>,
}

impl<K: ListKey, V: FixedCodec + Clone> UnrolledList<K, V> {
    /// Open the list stored at `path`, creating it if the file is missing
    /// or empty.
    ///
    /// The sizing constants of an existing list are read from its root page
    /// and take precedence over `options`.
    pub fn open(path: impl AsRef<Path>, mut options: ListOptions) -> Result<Self> {
        options.validate()?;
        let path = path.as_ref().to_path_buf();
        let mut file = RecordFile::open(&path)?;

        let root = if file.is_empty() {
            let root = RootPage::new(options.target_fill, options.max_fill);
            file.write_record(RecordId::NONE, &root)?;
            info!(
                "create list {:?}: target fill {}, max fill {}",
                path, root.target_fill, root.max_fill
            );
            root
        } else {
            if file.len() < RootPage::ENCODED_LEN as u64 {
                return Err(KVListError::Corrupted(format!(
                    "file of {} bytes has no root page",
                    file.len()
                )));
            }
            let root: RootPage = file.read_record(RecordId::NONE)?;
            if root.target_fill == 0 || root.max_fill <= root.target_fill {
                return Err(KVListError::Corrupted(format!(
                    "root page has target fill {} and max fill {}",
                    root.target_fill, root.max_fill
                )));
            }
            if root.target_fill != options.target_fill || root.max_fill != options.max_fill {
                warn!(
                    "list {:?} was created with target fill {} and max fill {}, ignoring {} and {}",
                    path, root.target_fill, root.max_fill, options.target_fill, options.max_fill
                );
                options.target_fill = root.target_fill;
                options.max_fill = root.max_fill;
            }
            info!("open list {:?}: {} bytes", path, file.len());
            root
        };

        Ok(UnrolledList {
            path,
            file,
            root,
            options,
            cache: EntryCache::default(),
        })
    }

    pub fn open_default(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(path, ListOptions::default())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Options in effect, with the sizing constants of the root page.
    pub fn options(&self) -> &ListOptions {
        &self.options
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.first.is_none()
    }

    /// Current size of the list file in bytes.
    #[inline]
    pub fn file_len(&self) -> u64 {
        self.file.len()
    }

    fn write_root(&mut self) -> Result<()> {
        self.file.write_record(RecordId::NONE, &self.root)
    }

    /// Insert a new entry. Returns `false` without touching the list if
    /// `key` already exists.
    pub fn insert(&mut self, key: K, value: V) -> Result<bool> {
        match self.locate(&key)? {
            Some(located) if located.position.is_exact() => Ok(false),
            located => {
                self.insert_at(located, key, value)?;
                Ok(true)
            }
        }
    }

    /// Overwrite the value of an existing entry. Returns `false` if `key`
    /// does not exist.
    pub fn modify(&mut self, key: &K, value: V) -> Result<bool> {
        match self.locate_exact(key)? {
            Some(located) => {
                self.assign_at(located, key, value)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Insert `key` or overwrite its value. Returns `true` if the entry is
    /// new.
    pub fn insert_or_assign(&mut self, key: K, value: V) -> Result<bool> {
        match self.locate(&key)? {
            Some(located) if located.position.is_exact() => {
                self.assign_at(located, &key, value)?;
                Ok(false)
            }
            located => {
                self.insert_at(located, key, value)?;
                Ok(true)
            }
        }
    }

    /// Remove an entry. Returns `false` if `key` does not exist.
    pub fn erase(&mut self, key: &K) -> Result<bool> {
        let Located {
            id,
            mut header,
            position,
        } = match self.locate_exact(key)? {
            Some(located) => located,
            None => return Ok(false),
        };
        self.cache.erase(key);

        match position {
            Position::Head if header.fill == 0 => self.release_block(id, header)?,
            Position::Head => {
                header.head = self.read_slot(&header, 0)?;
                self.shift_slots_left(&header, 1)?;
                header.fill -= 1;
                self.file.write_record(id, &header)?;
            }
            Position::Slot(index) => {
                self.shift_slots_left(&header, index + 1)?;
                header.fill -= 1;
                self.file.write_record(id, &header)?;
            }
            Position::BeforeHead | Position::InsertAt(_) => unreachable!(),
        }
        Ok(true)
    }

    pub fn get(&mut self, key: &K) -> Result<Option<V>> {
        if let Some(value) = self.cache.look_up(key) {
            return Ok(Some(value.clone()));
        }
        let located = match self.locate_exact(key)? {
            Some(located) => located,
            None => return Ok(None),
        };
        let value = match located.position {
            Position::Slot(index) => self.read_slot(&located.header, index)?.value,
            _ => located.header.head.value,
        };
        self.cache.insert(key.clone(), value.clone());
        Ok(Some(value))
    }

    pub fn exist(&mut self, key: &K) -> Result<bool> {
        if self.cache.look_up(key).is_some() {
            return Ok(true);
        }
        Ok(self.get(key)?.is_some())
    }

    /// Ascending iterator over all entries.
    pub fn iter(&mut self) -> Iter<'_, K, V> {
        Iter::new(&mut self.file, self.root.first)
    }

    /// All entries in ascending key order.
    pub fn traverse(&mut self) -> Result<Vec<(K, V)>> {
        self.iter().collect()
    }

    /// All values in ascending key order.
    pub fn values(&mut self) -> Result<Vec<V>> {
        self.iter().map(|entry| entry.map(|(_, v)| v)).collect()
    }

    /// Entries with `start <= key < end`, ascending.
    pub fn range(&mut self, start: &K, end: &K) -> Result<Vec<(K, V)>> {
        let mut kvs = Vec::new();
        if start >= end {
            return Ok(kvs);
        }
        let block = match self.locate(start)? {
            Some(located) => located.id,
            None => return Ok(kvs),
        };
        for entry in Iter::<K, V>::new(&mut self.file, block) {
            let (k, v) = entry?;
            if k >= *end {
                break;
            }
            if k >= *start {
                kvs.push((k, v));
            }
        }
        Ok(kvs)
    }

    pub fn first(&mut self) -> Result<Option<(K, V)>> {
        self.iter().next().transpose()
    }

    pub fn last(&mut self) -> Result<Option<(K, V)>> {
        if self.root.last.is_none() {
            return Ok(None);
        }
        let header: BlockHeader<K, V> = self.file.read_record(self.root.last)?;
        let slot = if header.fill == 0 {
            header.head
        } else {
            self.read_slot(&header, header.fill - 1)?
        };
        Ok(Some((slot.key, slot.value)))
    }

    /// Number of entries, counted by walking the chain.
    pub fn len(&mut self) -> Result<usize> {
        let mut len = 0;
        let mut id = self.root.first;
        while id.is_some() {
            let header: BlockHeader<K, V> = self.file.read_record(id)?;
            len += 1 + header.fill as usize;
            id = header.next;
        }
        Ok(len)
    }

    /// Number of blocks in the chain.
    pub fn block_count(&mut self) -> Result<usize> {
        self.count_linked(self.root.first)
    }

    /// Number of blocks on the free list.
    pub fn free_block_count(&mut self) -> Result<usize> {
        self.count_linked(self.root.free_head)
    }

    fn count_linked(&mut self, mut id: RecordId) -> Result<usize> {
        let mut count = 0;
        while id.is_some() {
            let header: BlockHeader<K, V> = self.file.read_record(id)?;
            count += 1;
            id = header.next;
        }
        Ok(count)
    }

    /// Remove every entry. The whole chain moves onto the free list.
    pub fn clear(&mut self) -> Result<()> {
        self.cache.clear();
        if self.root.first.is_none() {
            return Ok(());
        }
        let mut blocks = 0usize;
        let mut id = self.root.first;
        while id.is_some() {
            let mut header: BlockHeader<K, V> = self.file.read_record(id)?;
            let next = header.next;
            header.fill = 0;
            header.prev = RecordId::NONE;
            if next.is_none() {
                header.next = self.root.free_head;
            }
            self.file.write_record(id, &header)?;
            blocks += 1;
            id = next;
        }
        self.root.free_head = self.root.first;
        self.root.first = RecordId::NONE;
        self.root.last = RecordId::NONE;
        debug!("clear list {:?}: {} blocks freed", self.path, blocks);
        self.write_root()
    }

    /// Force written records out to the file, and to the disk if
    /// [`ListOptions::sync`] is set.
    pub fn flush(&mut self) -> Result<()> {
        self.file.flush(self.options.sync)
    }

    fn insert_at(&mut self, located: Option<Located<K, V>>, key: K, value: V) -> Result<()> {
        let Located {
            id,
            mut header,
            position,
        } = match located {
            Some(located) => located,
            None => {
                let head = Slot {
                    key: key.clone(),
                    value: value.clone(),
                };
                self.allocate_block(RecordId::NONE, head, 0)?;
                self.cache.insert(key, value);
                return Ok(());
            }
        };

        match position {
            Position::BeforeHead => {
                self.shift_slots_right(&header, 0)?;
                let old_head = std::mem::replace(
                    &mut header.head,
                    Slot {
                        key: key.clone(),
                        value: value.clone(),
                    },
                );
                self.write_slot(&header, 0, &old_head)?;
            }
            Position::InsertAt(index) => {
                self.shift_slots_right(&header, index)?;
                let slot = Slot {
                    key: key.clone(),
                    value: value.clone(),
                };
                self.write_slot(&header, index, &slot)?;
            }
            Position::Head | Position::Slot(_) => unreachable!(),
        }
        header.fill += 1;
        self.file.write_record(id, &header)?;

        if header.fill >= self.root.max_fill {
            self.split_block(id, header)?;
        }
        self.cache.insert(key, value);
        Ok(())
    }

    fn assign_at(&mut self, located: Located<K, V>, key: &K, value: V) -> Result<()> {
        let Located {
            id,
            mut header,
            position,
        } = located;
        match position {
            Position::Head => {
                header.head.value = value.clone();
                self.file.write_record(id, &header)?;
            }
            Position::Slot(index) => {
                let slot = Slot {
                    key: key.clone(),
                    value: value.clone(),
                };
                self.write_slot(&header, index, &slot)?;
            }
            Position::BeforeHead | Position::InsertAt(_) => unreachable!(),
        }
        self.cache.insert(key.clone(), value);
        Ok(())
    }
}

impl<K: PrimaryKey, V: FixedCodec + Clone> UnrolledList<K, V> {
    /// Entries whose primary component equals `primary`, ascending.
    pub fn traverse_primary(&mut self, primary: &K::Primary) -> Result<Vec<(K, V)>> {
        let mut kvs = Vec::new();
        let block = match self.locate_primary(primary)? {
            Some(block) => block,
            None => return Ok(kvs),
        };
        for entry in Iter::<K, V>::new(&mut self.file, block) {
            let (k, v) = entry?;
            match k.primary().cmp(primary) {
                std::cmp::Ordering::Less => continue,
                std::cmp::Ordering::Equal => kvs.push((k, v)),
                std::cmp::Ordering::Greater => break,
            }
        }
        Ok(kvs)
    }

    /// Values of the entries whose primary component equals `primary`.
    pub fn values_of(&mut self, primary: &K::Primary) -> Result<Vec<V>> {
        Ok(self
            .traverse_primary(primary)?
            .into_iter()
            .map(|(_, v)| v)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::list::UnrolledList;
    use crate::options::ListOptions;
    use crate::record::{BlockHeader, RecordId};
    use tempfile::TempDir;

    fn open_list(temp_dir: &TempDir, target_fill: u32) -> UnrolledList<u32, u64> {
        let _ = env_logger::try_init();
        UnrolledList::open(
            temp_dir.path().join("list"),
            ListOptions::default().target_fill(target_fill),
        )
        .unwrap()
    }

    fn header(list: &mut UnrolledList<u32, u64>, id: RecordId) -> BlockHeader<u32, u64> {
        list.file.read_record(id).unwrap()
    }

    #[test]
    fn test_split() {
        let temp_dir = TempDir::new().unwrap();
        let mut list = open_list(&temp_dir, 2);
        for i in 0..4 {
            assert!(list.insert(i, i as u64 * 10).unwrap());
        }
        assert_eq!(list.block_count().unwrap(), 1);

        // head + 4 trailing slots reaches max fill
        assert!(list.insert(4, 40).unwrap());
        assert_eq!(list.block_count().unwrap(), 2);

        let (first_id, last_id) = (list.root.first, list.root.last);
        let first = header(&mut list, first_id);
        assert_eq!(first.head.key, 0);
        assert_eq!(first.fill, 2);
        assert_eq!(first.next, last_id);
        let second = header(&mut list, last_id);
        assert_eq!(second.head.key, 3);
        assert_eq!(second.fill, 1);
        assert_eq!(second.prev, first_id);
        assert_eq!(list.read_slot(&second, 0).unwrap().key, 4);

        let keys: Vec<u32> = list.traverse().unwrap().into_iter().map(|kv| kv.0).collect();
        assert_eq!(keys, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_insert_before_head() {
        let temp_dir = TempDir::new().unwrap();
        let mut list = open_list(&temp_dir, 4);
        list.insert(10, 100).unwrap();
        list.insert(20, 200).unwrap();
        list.insert(5, 50).unwrap();

        let first_id = list.root.first;
        let first = header(&mut list, first_id);
        assert_eq!(first.head.key, 5);
        assert_eq!(first.fill, 2);
        assert_eq!(list.read_slot(&first, 0).unwrap().key, 10);
        assert_eq!(list.read_slot(&first, 1).unwrap().key, 20);
    }

    #[test]
    fn test_released_block_is_reused() {
        let temp_dir = TempDir::new().unwrap();
        let mut list = open_list(&temp_dir, 1);
        for i in 0..6 {
            list.insert(i, 0).unwrap();
        }
        let blocks = list.block_count().unwrap();
        assert!(blocks > 1);

        let last = list.root.last;
        let last_header = header(&mut list, last);
        let keys: Vec<u32> = list.traverse().unwrap().into_iter().map(|kv| kv.0).collect();
        for key in keys.iter().filter(|k| **k >= last_header.head.key) {
            assert!(list.erase(key).unwrap());
        }
        assert_eq!(list.root.free_head, last);
        assert_eq!(list.free_block_count().unwrap(), 1);
        assert_eq!(header(&mut list, last).fill, 0);

        let file_len = list.file_len();
        // splits the last chained block, popping the free block
        list.insert(100, 1).unwrap();
        list.insert(101, 1).unwrap();
        assert_eq!(list.root.free_head, RecordId::NONE);
        assert_eq!(list.file_len(), file_len);
        let reused = header(&mut list, last);
        assert_eq!(reused.payload, last_header.payload);
    }

    #[test]
    fn test_clear_moves_chain_to_free_list() {
        let temp_dir = TempDir::new().unwrap();
        let mut list = open_list(&temp_dir, 2);
        for i in 0..20 {
            list.insert(i, i as u64).unwrap();
        }
        let blocks = list.block_count().unwrap();
        let file_len = list.file_len();

        list.clear().unwrap();
        assert!(list.is_empty());
        assert_eq!(list.len().unwrap(), 0);
        assert_eq!(list.free_block_count().unwrap(), blocks);
        assert_eq!(list.get(&3).unwrap(), None);

        for i in 0..20 {
            list.insert(i, i as u64).unwrap();
        }
        assert_eq!(list.file_len(), file_len);
        assert_eq!(list.free_block_count().unwrap(), 0);
    }

    #[test]
    fn test_get_after_exist_returns_value() {
        let temp_dir = TempDir::new().unwrap();
        let mut list = open_list(&temp_dir, 2);
        for i in 0..10 {
            list.insert(i, i as u64 + 1000).unwrap();
        }
        // resolve from disk, then from cache
        list.cache.clear();
        assert!(list.exist(&7).unwrap());
        assert_eq!(list.cache.look_up(&7), Some(&1007));
        assert_eq!(list.get(&7).unwrap(), Some(1007));
    }
}
