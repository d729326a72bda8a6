pub fn u32_from_le_bytes(bytes: &[u8]) -> u32 {
    debug_assert_eq!(bytes.len(), 4);
    let mut buf = [0u8; 4];
    buf.clone_from_slice(bytes);
    u32::from_le_bytes(buf)
}

pub fn u64_from_le_bytes(bytes: &[u8]) -> u64 {
    debug_assert_eq!(bytes.len(), 8);
    let mut buf = [0u8; 8];
    buf.clone_from_slice(bytes);
    u64::from_le_bytes(buf)
}

/// Write `value` into the first 4 bytes of `buf`.
#[inline]
pub fn put_u32(buf: &mut [u8], value: u32) {
    buf[..4].copy_from_slice(&value.to_le_bytes());
}

/// Write `value` into the first 8 bytes of `buf`.
#[inline]
pub fn put_u64(buf: &mut [u8], value: u64) {
    buf[..8].copy_from_slice(&value.to_le_bytes());
}
