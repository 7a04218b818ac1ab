//! Alignment rules of the newc format.
//!
//! The header is 110 bytes long, so the name ends on a 4-byte boundary
//! when the name length plus padding is congruent to 2 modulo 4.

use crate::constants::NEWC_ALIGN;

/// Number of NUL bytes after a name of `name_len` bytes (trailing NUL included).
pub const fn name_padding(name_len: u32) -> u32 {
    2_u32.wrapping_sub(name_len) & (NEWC_ALIGN - 1)
}

/// Number of NUL bytes after `file_size` bytes of data.
pub const fn data_padding(file_size: u32) -> u32 {
    file_size.wrapping_neg() & (NEWC_ALIGN - 1)
}

#[cfg(test)]
mod tests {
    use arbtest::arbtest;

    use super::*;
    use crate::constants::HEADER_LEN;

    #[test]
    fn name_padding_law() {
        arbtest(|u| {
            let n: u32 = u.arbitrary()?;
            let padding = name_padding(n);
            assert!(padding < 4);
            assert_eq!(2, (n as u64 + padding as u64) % 4);
            assert_eq!(0, (HEADER_LEN as u64 + n as u64 + padding as u64) % 4);
            Ok(())
        });
    }

    #[test]
    fn data_padding_law() {
        arbtest(|u| {
            let d: u32 = u.arbitrary()?;
            let padding = data_padding(d);
            assert!(padding < 4);
            assert_eq!(0, (d as u64 + padding as u64) % 4);
            Ok(())
        });
    }

    #[test]
    fn known_values() {
        // "TRAILER!!!" + NUL
        assert_eq!(3, name_padding(11));
        // "hello.txt" + NUL
        assert_eq!(0, name_padding(10));
        assert_eq!(1, name_padding(1));
        assert_eq!(3, name_padding(3));
        assert_eq!(2, name_padding(4));
        assert_eq!(0, data_padding(0));
        assert_eq!(3, data_padding(5));
        assert_eq!(0, data_padding(8));
        assert_eq!(1, data_padding(u32::MAX));
    }
}
