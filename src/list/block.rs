//! Block allocation, release, split and trailing slot movement.

use crate::codec::FixedCodec;
use crate::error::KVListError;
use crate::key::ListKey;
use crate::list::UnrolledList;
use crate::record::{BlockHeader, RecordId, Slot};
use crate::Result;

impl<K: ListKey, V: FixedCodec + Clone> UnrolledList<K, V> {
    pub(super) const HEADER_LEN: u64 = BlockHeader::<K, V>::ENCODED_LEN as u64;
    pub(super) const SLOT_LEN: u64 = Slot::<K, V>::ENCODED_LEN as u64;

    #[inline]
    fn slot_id(header: &BlockHeader<K, V>, index: u32) -> RecordId {
        header.payload.advance(index as u64 * Self::SLOT_LEN)
    }

    pub(super) fn read_slot(&mut self, header: &BlockHeader<K, V>, index: u32) -> Result<Slot<K, V>> {
        debug_assert!(index < self.root.max_fill);
        self.file.read_record(Self::slot_id(header, index))
    }

    pub(super) fn read_slot_key(&mut self, header: &BlockHeader<K, V>, index: u32) -> Result<K> {
        debug_assert!(index < self.root.max_fill);
        self.file.read_record(Self::slot_id(header, index))
    }

    pub(super) fn write_slot(
        &mut self,
        header: &BlockHeader<K, V>,
        index: u32,
        slot: &Slot<K, V>,
    ) -> Result<()> {
        debug_assert!(index < self.root.max_fill);
        self.file.write_record(Self::slot_id(header, index), slot)
    }

    /// Move slots `[from, fill)` one position to the right.
    pub(super) fn shift_slots_right(&mut self, header: &BlockHeader<K, V>, from: u32) -> Result<()> {
        debug_assert!(header.fill < self.root.max_fill);
        let count = header.fill - from;
        self.file.copy_within(
            Self::slot_id(header, from),
            Self::slot_id(header, from + 1),
            (count as u64 * Self::SLOT_LEN) as usize,
        )
    }

    /// Move slots `[from, fill)` one position to the left, overwriting
    /// slot `from - 1`.
    pub(super) fn shift_slots_left(&mut self, header: &BlockHeader<K, V>, from: u32) -> Result<()> {
        debug_assert!(from >= 1 && from <= header.fill);
        let count = header.fill - from;
        self.file.copy_within(
            Self::slot_id(header, from),
            Self::slot_id(header, from - 1),
            (count as u64 * Self::SLOT_LEN) as usize,
        )
    }

    /// Create a block holding `head` and link it right after `after`, or at
    /// the front of the chain if `after` is none.
    ///
    /// A block from the free list is reused before the file is grown. The
    /// caller fills the first `fill` trailing slots.
    pub(super) fn allocate_block(
        &mut self,
        after: RecordId,
        head: Slot<K, V>,
        fill: u32,
    ) -> Result<(RecordId, BlockHeader<K, V>)> {
        let (id, payload) = if self.root.free_head.is_some() {
            let id = self.root.free_head;
            let free: BlockHeader<K, V> = self.file.read_record(id)?;
            debug_assert_eq!(free.fill, 0);
            self.root.free_head = free.next;
            debug!("reuse free block {:?}", id);
            (id, free.payload)
        } else {
            let id = self
                .file
                .reserve(Self::HEADER_LEN + self.root.max_fill as u64 * Self::SLOT_LEN)?;
            debug!("append block {:?}, file length {}", id, self.file.len());
            (id, id.advance(Self::HEADER_LEN))
        };

        let next = if after.is_some() {
            let mut prev: BlockHeader<K, V> = self.file.read_record(after)?;
            let next = prev.next;
            prev.next = id;
            self.file.write_record(after, &prev)?;
            next
        } else {
            let next = self.root.first;
            self.root.first = id;
            next
        };

        if next.is_some() {
            let mut next_header: BlockHeader<K, V> = self.file.read_record(next)?;
            next_header.prev = id;
            self.file.write_record(next, &next_header)?;
        } else {
            self.root.last = id;
        }

        let header = BlockHeader {
            head,
            payload,
            fill,
            next,
            prev: after,
        };
        self.file.write_record(id, &header)?;
        self.write_root()?;
        Ok((id, header))
    }

    /// Unlink an emptied block from the chain and push it on the free list.
    pub(super) fn release_block(&mut self, id: RecordId, mut header: BlockHeader<K, V>) -> Result<()> {
        if header.prev.is_some() {
            let mut prev: BlockHeader<K, V> = self.file.read_record(header.prev)?;
            prev.next = header.next;
            self.file.write_record(header.prev, &prev)?;
        } else {
            self.root.first = header.next;
        }
        if header.next.is_some() {
            let mut next: BlockHeader<K, V> = self.file.read_record(header.next)?;
            next.prev = header.prev;
            self.file.write_record(header.next, &next)?;
        } else {
            self.root.last = header.prev;
        }

        header.fill = 0;
        header.prev = RecordId::NONE;
        header.next = self.root.free_head;
        self.file.write_record(id, &header)?;
        self.root.free_head = id;
        debug!("release block {:?}", id);
        self.write_root()
    }

    /// Split a block whose trailing array is full. Slots
    /// `[target_fill, max_fill)` move to a new block linked right after it.
    pub(super) fn split_block(&mut self, id: RecordId, mut header: BlockHeader<K, V>) -> Result<()> {
        let target_fill = self.root.target_fill;
        debug_assert_eq!(header.fill, self.root.max_fill);
        let excess_count = (header.fill - target_fill) as usize;
        let mut rest: Vec<Slot<K, V>> = self
            .file
            .read_records(Self::slot_id(&header, target_fill), excess_count)?;
        if rest.is_empty() {
            return Err(KVListError::Custom(
                "split of a block without excess entries".into(),
            ));
        }
        let head = rest.remove(0);

        header.fill = target_fill;
        self.file.write_record(id, &header)?;

        let (new_id, new_header) = self.allocate_block(id, head, rest.len() as u32)?;
        if !rest.is_empty() {
            self.file.write_records(new_header.payload, &rest)?;
        }
        debug!(
            "split block {:?}: {} entries moved to {:?}",
            id, excess_count, new_id
        );
        Ok(())
    }
}
