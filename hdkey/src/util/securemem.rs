//! zeroing of memory holding secret material

use std::ptr;

/// zero the given buffer with volatile writes, so the compiler cannot
/// elide the stores even though the buffer is about to be released.
pub fn zero(to_zero: &mut [u8]) {
    for byte in to_zero.iter_mut() {
        unsafe { ptr::write_volatile(byte, 0) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroes_every_byte() {
        let mut buf = [0xffu8; 96];
        zero(&mut buf);
        assert!(buf.iter().all(|b| *b == 0));
    }
}
