//! hexadecimal encoding and decoding

use std::{error, fmt, result};

const ALPHABET: &[u8] = b"0123456789abcdef";

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub enum Error {
    /// the input contains a character outside of the hexadecimal
    /// alphabet. The parameter is the offset of the offending byte.
    UnknownSymbol(usize),
    /// the input has an odd number of characters
    UnevenLength(usize),
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UnknownSymbol(idx) => write!(f, "Unknown symbol at byte index {}", idx),
            Error::UnevenLength(len) => write!(f, "Uneven hexadecimal length {}", len),
        }
    }
}
impl error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;

pub fn encode(input: &[u8]) -> String {
    let mut v = Vec::with_capacity(input.len() * 2);
    for &byte in input.iter() {
        v.push(ALPHABET[(byte >> 4) as usize]);
        v.push(ALPHABET[(byte & 0xf) as usize]);
    }
    unsafe { String::from_utf8_unchecked(v) }
}

pub fn decode(input: &str) -> Result<Vec<u8>> {
    if input.len() % 2 != 0 {
        return Err(Error::UnevenLength(input.len()));
    }
    let mut b = Vec::with_capacity(input.len() / 2);
    let mut modulus = 0;
    let mut buf = 0;

    for (idx, byte) in input.bytes().enumerate() {
        buf <<= 4;

        match byte {
            b'A'..=b'F' => buf |= byte - b'A' + 10,
            b'a'..=b'f' => buf |= byte - b'a' + 10,
            b'0'..=b'9' => buf |= byte - b'0',
            _ => return Err(Error::UnknownSymbol(idx)),
        }

        modulus += 1;
        if modulus == 2 {
            modulus = 0;
            b.push(buf);
        }
    }

    Ok(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode() {
        let bytes = [0x00u8, 0x01, 0x7f, 0x80, 0xff];
        let encoded = encode(&bytes);
        assert_eq!(encoded, "00017f80ff");
        assert_eq!(decode(&encoded).unwrap(), bytes.to_vec());
    }

    #[test]
    fn decode_rejects_unknown_symbol() {
        assert_eq!(decode("00zz"), Err(Error::UnknownSymbol(2)));
    }

    #[test]
    fn decode_rejects_uneven_length() {
        assert_eq!(decode("abc"), Err(Error::UnevenLength(3)));
    }
}
