use crate::codec::FixedCodec;
use crate::ioutils::RecordFile;
use crate::record::{BlockHeader, RecordId, Slot};
use crate::Result;

/// Ascending iterator over the entries of a list, loading one block at a
/// time. Stops after the first I/O error.
pub struct Iter<'a, K, V> {
    file: &'a mut RecordFile,
    next_block: RecordId,
    entries: std::vec::IntoIter<Slot<K, V>>,
}

impl<'a, K: FixedCodec, V: FixedCodec> Iter<'a, K, V> {
    /// Iterate from the head of block `start` to the end of the chain.
    pub(crate) fn new(file: &'a mut RecordFile, start: RecordId) -> Iter<'a, K, V> {
        Iter {
            file,
            next_block: start,
            entries: Vec::new().into_iter(),
        }
    }

    fn load_block(&mut self) -> Result<()> {
        let header: BlockHeader<K, V> = self.file.read_record(self.next_block)?;
        let mut entries = Vec::with_capacity(header.fill as usize + 1);
        entries.push(header.head);
        if header.fill > 0 {
            entries.extend(
                self.file
                    .read_records::<Slot<K, V>>(header.payload, header.fill as usize)?,
            );
        }
        self.entries = entries.into_iter();
        self.next_block = header.next;
        Ok(())
    }
}

impl<'a, K: FixedCodec, V: FixedCodec> Iterator for Iter<'a, K, V> {
    type Item = Result<(K, V)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(slot) = self.entries.next() {
                return Some(Ok((slot.key, slot.value)));
            }
            if self.next_block.is_none() {
                return None;
            }
            if let Err(e) = self.load_block() {
                self.next_block = RecordId::NONE;
                return Some(Err(e));
            }
        }
    }
}
