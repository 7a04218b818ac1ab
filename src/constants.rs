/// Header size in bytes.
pub const HEADER_LEN: usize = MAGIC_LEN + 13 * FIELD_LEN;
pub const MAGIC_LEN: usize = 6;
pub const FIELD_LEN: usize = 8;
pub const NEWC_ALIGN: u32 = 4;
/// `newc` magic number.
pub const NEWC_MAGIC: [u8; MAGIC_LEN] = *b"070701";
/// Name of the last entry.
pub const TRAILER: &[u8] = b"TRAILER!!!";
/// Unix time zero.
pub const EPOCH: u32 = 0;
/// [`EPOCH`] as it is stored in the mtime field.
pub const EPOCH_MTIME: [u8; FIELD_LEN] = encode_hex_8(EPOCH);

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

const fn encode_hex_8(value: u32) -> [u8; FIELD_LEN] {
    let mut buf = [0_u8; FIELD_LEN];
    let mut i = 0;
    while i < FIELD_LEN {
        let shift = (FIELD_LEN - 1 - i) * 4;
        buf[i] = HEX_DIGITS[((value >> shift) & 0xf) as usize];
        i += 1;
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_mtime_is_eight_zeros() {
        assert_eq!(b"00000000", &EPOCH_MTIME);
        assert_eq!(b"deadbeef", &encode_hex_8(0xdead_beef));
        assert_eq!(110, HEADER_LEN);
    }
}
