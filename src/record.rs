//! Records of a list file.
//!
//! ```text
//! Root Page (offset 0, 32 bytes)
//! +-------------+------------+-----------------+-------------+----------+
//! | first block | last block | free block head | target fill | max fill |
//! +-------------+------------+-----------------+-------------+----------+
//! \------------/\-----------/\----------------/\------------/\---------/
//!      u64           u64            u64              u32          u32
//!
//! Block Header
//! +----------+------------+---------+-------+------+------+
//! | head key | head value | payload | fill  | next | prev |
//! +----------+------------+---------+-------+------+------+
//! \---------/\-----------/\--------/\------/\-----/\-----/
//!   K bytes     V bytes      u64      u32     u64    u64
//!
//! Slot
//! +-----+-------+
//! | key | value |
//! +-----+-------+
//! ```
//!
//! A block header is immediately followed by its payload: `max fill` slots.
//! NOTE: All fixed-length integer are little-endian.

use crate::byteutils::{put_u32, put_u64, u32_from_le_bytes, u64_from_le_bytes};
use crate::codec::FixedCodec;
use std::fmt;

/// Byte offset of a record in the list file. Offset 0 belongs to the root
/// page, so `RecordId(0)` doubles as "none".
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RecordId(u64);

impl RecordId {
    pub const NONE: RecordId = RecordId(0);

    #[inline]
    pub fn new(offset: u64) -> RecordId {
        RecordId(offset)
    }

    #[inline]
    pub fn offset(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn is_some(self) -> bool {
        self.0 != 0
    }

    /// Id of the record `bytes` bytes after this one.
    #[inline]
    pub fn advance(self, bytes: u64) -> RecordId {
        RecordId(self.0 + bytes)
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            f.write_str("RecordId(none)")
        } else {
            write!(f, "RecordId({})", self.0)
        }
    }
}

impl FixedCodec for RecordId {
    const ENCODED_LEN: usize = 8;

    fn encode_to(&self, buf: &mut [u8]) {
        put_u64(buf, self.0);
    }

    fn decode_from(buf: &[u8]) -> Self {
        RecordId(u64_from_le_bytes(buf))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootPage {
    pub first: RecordId,
    pub last: RecordId,
    pub free_head: RecordId,
    pub target_fill: u32,
    pub max_fill: u32,
}

impl RootPage {
    pub fn new(target_fill: u32, max_fill: u32) -> RootPage {
        RootPage {
            first: RecordId::NONE,
            last: RecordId::NONE,
            free_head: RecordId::NONE,
            target_fill,
            max_fill,
        }
    }
}

impl FixedCodec for RootPage {
    const ENCODED_LEN: usize = 32;

    fn encode_to(&self, buf: &mut [u8]) {
        self.first.encode_to(&mut buf[0..8]);
        self.last.encode_to(&mut buf[8..16]);
        self.free_head.encode_to(&mut buf[16..24]);
        put_u32(&mut buf[24..28], self.target_fill);
        put_u32(&mut buf[28..32], self.max_fill);
    }

    fn decode_from(buf: &[u8]) -> Self {
        RootPage {
            first: RecordId::decode_from(&buf[0..8]),
            last: RecordId::decode_from(&buf[8..16]),
            free_head: RecordId::decode_from(&buf[16..24]),
            target_fill: u32_from_le_bytes(&buf[24..28]),
            max_fill: u32_from_le_bytes(&buf[28..32]),
        }
    }
}

/// One key-value pair of a block's payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot<K, V> {
    pub key: K,
    pub value: V,
}

impl<K: FixedCodec, V: FixedCodec> FixedCodec for Slot<K, V> {
    const ENCODED_LEN: usize = K::ENCODED_LEN + V::ENCODED_LEN;

    fn encode_to(&self, buf: &mut [u8]) {
        let (k, v) = buf.split_at_mut(K::ENCODED_LEN);
        self.key.encode_to(k);
        self.value.encode_to(v);
    }

    fn decode_from(buf: &[u8]) -> Self {
        let (k, v) = buf.split_at(K::ENCODED_LEN);
        Slot {
            key: K::decode_from(k),
            value: V::decode_from(v),
        }
    }
}

/// Header of a block. `head` is the smallest entry the block owns, the
/// `fill` slots at `payload` hold the rest in ascending key order.
///
/// A block on the free list has `fill == 0` and is linked through `next`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader<K, V> {
    pub head: Slot<K, V>,
    pub payload: RecordId,
    pub fill: u32,
    pub next: RecordId,
    pub prev: RecordId,
}

const LINKS_LEN: usize = 8 + 4 + 8 + 8;

impl<K: FixedCodec, V: FixedCodec> FixedCodec for BlockHeader<K, V> {
    const ENCODED_LEN: usize = Slot::<K, V>::ENCODED_LEN + LINKS_LEN;

    fn encode_to(&self, buf: &mut [u8]) {
        let (head, links) = buf.split_at_mut(Slot::<K, V>::ENCODED_LEN);
        self.head.encode_to(head);
        self.payload.encode_to(&mut links[0..8]);
        put_u32(&mut links[8..12], self.fill);
        self.next.encode_to(&mut links[12..20]);
        self.prev.encode_to(&mut links[20..28]);
    }

    fn decode_from(buf: &[u8]) -> Self {
        let (head, links) = buf.split_at(Slot::<K, V>::ENCODED_LEN);
        BlockHeader {
            head: Slot::decode_from(head),
            payload: RecordId::decode_from(&links[0..8]),
            fill: u32_from_le_bytes(&links[8..12]),
            next: RecordId::decode_from(&links[12..20]),
            prev: RecordId::decode_from(&links[20..28]),
        }
    }
}
