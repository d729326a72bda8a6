//! Fixed-size binary encoding of keys and values.
//!
//! Every key and value stored in a list has the same encoded length, which
//! is what makes a slot addressable as `payload + index * slot_len`.
//! Integers are little-endian. Ordering is always done on decoded values.

use crate::error::KVListError;
use std::cmp::Ordering;
use std::convert::TryFrom;
use std::fmt;

pub trait FixedCodec: Sized {
    /// Number of bytes `encode_to` writes and `decode_from` reads.
    const ENCODED_LEN: usize;

    /// `buf.len()` is exactly `ENCODED_LEN`.
    fn encode_to(&self, buf: &mut [u8]);

    /// `buf.len()` is exactly `ENCODED_LEN`.
    fn decode_from(buf: &[u8]) -> Self;
}

macro_rules! impl_int_codec {
    ($($t:ty),*) => {
        $(
            impl FixedCodec for $t {
                const ENCODED_LEN: usize = std::mem::size_of::<$t>();

                #[inline]
                fn encode_to(&self, buf: &mut [u8]) {
                    buf.copy_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn decode_from(buf: &[u8]) -> Self {
                    let mut bytes = [0u8; std::mem::size_of::<$t>()];
                    bytes.copy_from_slice(buf);
                    <$t>::from_le_bytes(bytes)
                }
            }
        )*
    };
}

impl_int_codec!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128);

impl FixedCodec for bool {
    const ENCODED_LEN: usize = 1;

    fn encode_to(&self, buf: &mut [u8]) {
        buf[0] = *self as u8;
    }

    fn decode_from(buf: &[u8]) -> Self {
        buf[0] != 0
    }
}

impl<const N: usize> FixedCodec for [u8; N] {
    const ENCODED_LEN: usize = N;

    fn encode_to(&self, buf: &mut [u8]) {
        buf.copy_from_slice(self);
    }

    fn decode_from(buf: &[u8]) -> Self {
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(buf);
        bytes
    }
}

/// UTF-8 string of at most `N` bytes, zero padded on disk.
///
/// Strings must not contain `'\0'`; with that restriction the byte order of
/// the padded buffer equals the order of the strings themselves.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedStr<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> FixedStr<N> {
    pub fn as_str(&self) -> &str {
        let len = self.bytes.iter().position(|b| *b == 0).unwrap_or(N);
        match std::str::from_utf8(&self.bytes[..len]) {
            Ok(s) => s,
            Err(e) => std::str::from_utf8(&self.bytes[..e.valid_up_to()]).unwrap_or(""),
        }
    }

    pub fn is_empty(&self) -> bool {
        N == 0 || self.bytes[0] == 0
    }
}

impl<const N: usize> Default for FixedStr<N> {
    fn default() -> Self {
        FixedStr { bytes: [0u8; N] }
    }
}

impl<const N: usize> TryFrom<&str> for FixedStr<N> {
    type Error = KVListError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        if s.len() > N {
            return Err(KVListError::Custom(format!(
                "string of {} bytes does not fit in FixedStr<{}>",
                s.len(),
                N
            )));
        }
        if s.as_bytes().contains(&0) {
            return Err(KVListError::Custom("FixedStr cannot hold '\\0'".into()));
        }
        let mut bytes = [0u8; N];
        bytes[..s.len()].copy_from_slice(s.as_bytes());
        Ok(FixedStr { bytes })
    }
}

impl<const N: usize> PartialOrd for FixedStr<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<const N: usize> Ord for FixedStr<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bytes.cmp(&other.bytes)
    }
}

impl<const N: usize> fmt::Debug for FixedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl<const N: usize> fmt::Display for FixedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<const N: usize> FixedCodec for FixedStr<N> {
    const ENCODED_LEN: usize = N;

    fn encode_to(&self, buf: &mut [u8]) {
        buf.copy_from_slice(&self.bytes);
    }

    fn decode_from(buf: &[u8]) -> Self {
        FixedStr {
            bytes: <[u8; N]>::decode_from(buf),
        }
    }
}

/// Encode `value` into a freshly allocated buffer.
pub fn encode_to_vec<T: FixedCodec>(value: &T) -> Vec<u8> {
    let mut buf = vec![0u8; T::ENCODED_LEN];
    value.encode_to(&mut buf);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_integers_keep_order_after_decode() {
        let mut values = vec![-300i32, 5, -1, 0, i32::MIN, i32::MAX];
        let decoded: Vec<i32> = values
            .iter()
            .map(|v| i32::decode_from(&encode_to_vec(v)))
            .collect();
        assert_eq!(decoded, values);
        values.sort();
        assert_eq!(values.first(), Some(&i32::MIN));
    }

    #[test]
    fn test_fixed_str() {
        let a = FixedStr::<8>::try_from("ab").unwrap();
        let b = FixedStr::<8>::try_from("abc").unwrap();
        let c = FixedStr::<8>::try_from("b").unwrap();
        assert!(a < b);
        assert!(b < c);
        assert_eq!(a.as_str(), "ab");
        assert_eq!(FixedStr::<8>::decode_from(&encode_to_vec(&b)), b);
        assert!(FixedStr::<8>::default().is_empty());

        assert!(FixedStr::<2>::try_from("abc").is_err());
        assert!(FixedStr::<4>::try_from("a\0b").is_err());
    }

    #[test]
    fn test_multibyte_str() {
        let s = FixedStr::<6>::try_from("日本").unwrap();
        assert_eq!(s.as_str(), "日本");
        assert_eq!(s.to_string(), "日本");
    }
}
