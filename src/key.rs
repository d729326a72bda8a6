use crate::codec::FixedCodec;
use std::cmp::Ordering;

/// Key stored in an [`UnrolledList`](crate::UnrolledList).
pub trait ListKey: Ord + Clone + FixedCodec {}

impl<T: Ord + Clone + FixedCodec> ListKey for T {}

/// Key made of two components, ordered by `primary` then `secondary`.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default, Hash)]
pub struct CompositeKey<P, S> {
    pub primary: P,
    pub secondary: S,
}

impl<P, S> CompositeKey<P, S> {
    pub fn new(primary: P, secondary: S) -> CompositeKey<P, S> {
        CompositeKey { primary, secondary }
    }
}

impl<P: Ord, S: Ord> PartialOrd for CompositeKey<P, S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P: Ord, S: Ord> Ord for CompositeKey<P, S> {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.primary.cmp(&other.primary) {
            Ordering::Equal => self.secondary.cmp(&other.secondary),
            o => o,
        }
    }
}

impl<P: FixedCodec, S: FixedCodec> FixedCodec for CompositeKey<P, S> {
    const ENCODED_LEN: usize = P::ENCODED_LEN + S::ENCODED_LEN;

    fn encode_to(&self, buf: &mut [u8]) {
        let (p, s) = buf.split_at_mut(P::ENCODED_LEN);
        self.primary.encode_to(p);
        self.secondary.encode_to(s);
    }

    fn decode_from(buf: &[u8]) -> Self {
        let (p, s) = buf.split_at(P::ENCODED_LEN);
        CompositeKey {
            primary: P::decode_from(p),
            secondary: S::decode_from(s),
        }
    }
}

impl<P, S> From<(P, S)> for CompositeKey<P, S> {
    fn from((primary, secondary): (P, S)) -> Self {
        CompositeKey { primary, secondary }
    }
}

/// Keys whose order is led by a primary component, so that all entries
/// sharing a primary are contiguous in the list.
pub trait PrimaryKey: ListKey {
    type Primary: Ord;

    fn primary(&self) -> &Self::Primary;
}

impl<P, S> PrimaryKey for CompositeKey<P, S>
where
    P: Ord + Clone + FixedCodec,
    S: Ord + Clone + FixedCodec,
{
    type Primary = P;

    #[inline]
    fn primary(&self) -> &P {
        &self.primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_to_vec;

    #[test]
    fn test_lexicographic_order() {
        let a = CompositeKey::new(1u32, 9i64);
        let b = CompositeKey::new(2u32, -5i64);
        let c = CompositeKey::new(2u32, 3i64);
        assert!(a < b);
        assert!(b < c);
        assert_eq!(b.cmp(&CompositeKey::new(2, -5)), Ordering::Equal);
    }

    #[test]
    fn test_composite_codec() {
        let key = CompositeKey::new(7u16, -42i32);
        let buf = encode_to_vec(&key);
        assert_eq!(buf.len(), 6);
        assert_eq!(&buf[..2], &7u16.to_le_bytes());
        assert_eq!(CompositeKey::<u16, i32>::decode_from(&buf), key);
    }
}
