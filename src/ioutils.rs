use crate::codec::FixedCodec;
use crate::error::KVListError;
use crate::record::RecordId;
use crate::Result;
use std::fs::{File, OpenOptions};
use std::io;
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Random-access file of fixed-size records.
///
/// Writes go through a `BufWriter`, so back-to-back records (a block header
/// followed by its slots) reach the OS in one call. The buffer is drained
/// before every read, seek, resize and [`flush`](RecordFile::flush).
/// Tracks the cursor position so that consecutive accesses skip the seek.
pub struct RecordFile {
    writer: BufWriter<File>,
    pos: u64,
    len: u64,
}

impl RecordFile {
    pub(crate) fn open(path: &Path) -> Result<RecordFile> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(path)?;
        let len = file.metadata()?.len();
        Ok(RecordFile {
            writer: BufWriter::new(file),
            pos: 0,
            len,
        })
    }

    /// Current end of file, counting buffered writes.
    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        if self.pos != offset {
            // position is unknown until the seek succeeds
            self.pos = u64::MAX;
            // BufWriter drains its buffer before seeking
            self.writer.seek(SeekFrom::Start(offset))?;
            self.pos = offset;
        }
        Ok(())
    }

    pub fn read_at(&mut self, id: RecordId, buf: &mut [u8]) -> Result<()> {
        let offset = id.offset();
        debug_assert!(
            offset + buf.len() as u64 <= self.len,
            "{}, {}, {}",
            offset,
            buf.len(),
            self.len
        );
        self.writer.flush()?;
        self.seek_to(offset)?;
        match self.writer.get_mut().read_exact(buf) {
            Ok(()) => {
                self.pos += buf.len() as u64;
                Ok(())
            }
            Err(e) => {
                self.pos = u64::MAX;
                if e.kind() == io::ErrorKind::UnexpectedEof {
                    Err(KVListError::Corrupted(format!(
                        "short read of {} bytes at offset {}",
                        buf.len(),
                        offset
                    )))
                } else {
                    Err(e.into())
                }
            }
        }
    }

    pub fn write_at(&mut self, id: RecordId, buf: &[u8]) -> Result<()> {
        let offset = id.offset();
        self.seek_to(offset)?;
        if let Err(e) = self.writer.write_all(buf) {
            self.pos = u64::MAX;
            return Err(e.into());
        }
        self.pos += buf.len() as u64;
        self.len = self.len.max(self.pos);
        Ok(())
    }

    pub fn read_record<T: FixedCodec>(&mut self, id: RecordId) -> Result<T> {
        let mut buf = vec![0u8; T::ENCODED_LEN];
        self.read_at(id, &mut buf)?;
        Ok(T::decode_from(&buf))
    }

    pub fn write_record<T: FixedCodec>(&mut self, id: RecordId, record: &T) -> Result<()> {
        let mut buf = vec![0u8; T::ENCODED_LEN];
        record.encode_to(&mut buf);
        self.write_at(id, &buf)
    }

    /// Read `count` consecutive records starting at `id`.
    pub fn read_records<T: FixedCodec>(&mut self, id: RecordId, count: usize) -> Result<Vec<T>> {
        let mut buf = vec![0u8; T::ENCODED_LEN * count];
        self.read_at(id, &mut buf)?;
        Ok(buf.chunks_exact(T::ENCODED_LEN).map(T::decode_from).collect())
    }

    /// Write `records` back to back starting at `id`.
    pub fn write_records<T: FixedCodec>(&mut self, id: RecordId, records: &[T]) -> Result<()> {
        let mut buf = vec![0u8; T::ENCODED_LEN * records.len()];
        for (record, chunk) in records.iter().zip(buf.chunks_exact_mut(T::ENCODED_LEN)) {
            record.encode_to(chunk);
        }
        self.write_at(id, &buf)
    }

    /// Move `len` bytes from `from` to `to` in the file. The ranges may overlap.
    pub fn copy_within(&mut self, from: RecordId, to: RecordId, len: usize) -> Result<()> {
        if len == 0 || from == to {
            return Ok(());
        }
        let mut buf = vec![0u8; len];
        self.read_at(from, &mut buf)?;
        self.write_at(to, &buf)
    }

    /// Grow the file by `len` zeroed bytes and return the offset of the
    /// first of them.
    pub fn reserve(&mut self, len: u64) -> Result<RecordId> {
        let id = RecordId::new(self.len);
        self.writer.flush()?;
        self.writer.get_ref().set_len(self.len + len)?;
        self.len += len;
        Ok(id)
    }

    /// Hand buffered writes to the OS, then to the device if `sync` is set.
    pub fn flush(&mut self, sync: bool) -> Result<()> {
        self.writer.flush()?;
        if sync {
            self.writer.get_mut().sync_data()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reserve_and_rw() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("records");
        let mut file = RecordFile::open(&path).unwrap();
        assert!(file.is_empty());

        let id = file.reserve(16).unwrap();
        assert_eq!(id, RecordId::new(0));
        let id = file.reserve(24).unwrap();
        assert_eq!(id.offset(), 16);
        assert_eq!(file.len(), 40);

        file.write_records(id, &[1u64, 2, 3]).unwrap();
        assert_eq!(file.read_records::<u64>(id, 3).unwrap(), vec![1, 2, 3]);

        // shift right by one record, overlapping
        file.copy_within(id, id.advance(8), 16).unwrap();
        assert_eq!(file.read_records::<u64>(id, 3).unwrap(), vec![1, 1, 2]);
        assert_eq!(file.read_record::<u64>(RecordId::new(0)).unwrap(), 0);

        file.write_record(RecordId::new(40), &7u32).unwrap();
        assert_eq!(file.len(), 44);
        file.flush(true).unwrap();

        let mut reopened = RecordFile::open(&path).unwrap();
        assert_eq!(reopened.len(), 44);
        assert_eq!(reopened.read_record::<u32>(RecordId::new(40)).unwrap(), 7);
    }

    #[test]
    fn test_short_read() {
        let temp_dir = TempDir::new().unwrap();
        let mut file = RecordFile::open(&temp_dir.path().join("short")).unwrap();
        file.reserve(4).unwrap();
        // pretend the file is longer than it is
        file.len = 100;
        let err = file.read_record::<u64>(RecordId::new(0)).unwrap_err();
        assert!(matches!(err, KVListError::Corrupted(_)));
    }

    #[test]
    fn test_buffered_writes_drain_on_flush() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("buffered");
        let mut file = RecordFile::open(&path).unwrap();
        let id = file.reserve(24).unwrap();

        file.write_records(id, &[5u64, 6]).unwrap();
        file.write_record(id.advance(16), &7u64).unwrap();
        // still in the write buffer
        let on_disk = std::fs::read(&path).unwrap();
        assert_eq!(on_disk, vec![0u8; 24]);
        // reads see buffered data
        assert_eq!(file.read_records::<u64>(id, 3).unwrap(), vec![5, 6, 7]);

        file.write_record(id, &9u64).unwrap();
        file.flush(false).unwrap();
        let on_disk = std::fs::read(&path).unwrap();
        assert_eq!(&on_disk[..8], &9u64.to_le_bytes());
        assert_eq!(&on_disk[16..], &7u64.to_le_bytes());
    }

    #[test]
    fn test_reserve_after_buffered_append() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("append");
        let mut file = RecordFile::open(&path).unwrap();
        // extends the file through the buffer only
        file.write_record(RecordId::new(0), &1u32).unwrap();
        assert_eq!(file.len(), 4);
        let id = file.reserve(8).unwrap();
        assert_eq!(id.offset(), 4);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 12);
        assert_eq!(file.read_record::<u32>(RecordId::new(0)).unwrap(), 1);
        assert_eq!(file.read_record::<u64>(id).unwrap(), 0);
    }
}
