use crate::codec::FixedCodec;
use crate::key::{ListKey, PrimaryKey};
use crate::list::UnrolledList;
use crate::record::{BlockHeader, RecordId};
use crate::Result;
use std::cmp::Ordering;

/// Where a key sits relative to the block it was routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Position {
    /// Equal to the block head.
    Head,
    /// Equal to the key of trailing slot `i`.
    Slot(u32),
    /// Smaller than every key of the block. Only happens for the first block.
    BeforeHead,
    /// Absent; belongs in trailing slot `i`, shifting `[i, fill)` right.
    InsertAt(u32),
}

impl Position {
    #[inline]
    pub(super) fn is_exact(self) -> bool {
        matches!(self, Position::Head | Position::Slot(_))
    }
}

/// A block resolved by a search, with the header that was read on the way.
pub(super) struct Located<K, V> {
    pub id: RecordId,
    pub header: BlockHeader<K, V>,
    pub position: Position,
}

impl<K: ListKey, V: FixedCodec + Clone> UnrolledList<K, V> {
    /// Route `key` to its block, walking back from the last block, then
    /// binary search the block's trailing slots.
    ///
    /// Returns `None` only when the list is empty.
    pub(super) fn locate(&mut self, key: &K) -> Result<Option<Located<K, V>>> {
        if self.root.last.is_none() {
            return Ok(None);
        }
        let mut id = self.root.last;
        let mut header: BlockHeader<K, V> = self.file.read_record(id)?;
        let mut hops = 0usize;
        while *key < header.head.key && header.prev.is_some() {
            id = header.prev;
            header = self.file.read_record(id)?;
            hops += 1;
        }
        trace!("locate: block {:?} after {} hops", id, hops);

        let position = match key.cmp(&header.head.key) {
            Ordering::Less => Position::BeforeHead,
            Ordering::Equal => Position::Head,
            Ordering::Greater => self.search_slots(&header, key)?,
        };
        Ok(Some(Located {
            id,
            header,
            position,
        }))
    }

    /// Like [`locate`](Self::locate), but only returns exact matches.
    pub(super) fn locate_exact(&mut self, key: &K) -> Result<Option<Located<K, V>>> {
        Ok(self
            .locate(key)?
            .filter(|located| located.position.is_exact()))
    }

    /// Binary search `[0, fill)` for `key`, which is greater than the head.
    fn search_slots(&mut self, header: &BlockHeader<K, V>, key: &K) -> Result<Position> {
        let (mut left, mut right) = (0u32, header.fill);
        while left < right {
            let mid = left + (right - left) / 2;
            let slot_key = self.read_slot_key(header, mid)?;
            match slot_key.cmp(key) {
                Ordering::Less => left = mid + 1,
                Ordering::Equal => return Ok(Position::Slot(mid)),
                Ordering::Greater => right = mid,
            }
        }
        Ok(Position::InsertAt(left))
    }
}

impl<K: PrimaryKey, V: FixedCodec + Clone> UnrolledList<K, V> {
    /// Find the block from which entries with primary component `primary`
    /// may start: the last block whose head primary is smaller than
    /// `primary`, or the first block.
    pub(super) fn locate_primary(&mut self, primary: &K::Primary) -> Result<Option<RecordId>> {
        if self.root.last.is_none() {
            return Ok(None);
        }
        let mut id = self.root.last;
        let mut header: BlockHeader<K, V> = self.file.read_record(id)?;
        while *primary <= *header.head.key.primary() && header.prev.is_some() {
            id = header.prev;
            header = self.file.read_record(id)?;
        }
        if *primary < *header.head.key.primary() {
            // only possible at the first block
            return Ok(None);
        }
        Ok(Some(id))
    }
}
