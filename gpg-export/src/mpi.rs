//! OpenPGP MPI encoding of secret scalars
//!
//! An MPI (multi-precision integer) is the big integer serialization
//! used throughout the OpenPGP packet format: a 2 bytes big-endian bit
//! length followed by the minimal big-endian magnitude. Secret key
//! material additionally carries a 2 bytes additive checksum, computed
//! over the MPI bytes modulo 65536.

use std::fmt;

use hdkey::util::securemem;

/// encode a big-endian integer as an OpenPGP MPI: 2 bytes big-endian bit
/// length, then the magnitude with leading zero bytes stripped. The zero
/// integer encodes as the bare `00 00` header.
pub fn encode(bytes: &[u8]) -> Vec<u8> {
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    let magnitude = &bytes[skip..];

    let bits = match magnitude.first() {
        None => 0,
        Some(first) => (magnitude.len() - 1) * 8 + (8 - first.leading_zeros() as usize),
    };

    let mut out = Vec::with_capacity(2 + magnitude.len());
    out.extend_from_slice(&(bits as u16).to_be_bytes());
    out.extend_from_slice(magnitude);
    out
}

/// a private scalar packed for embedding in a secret key packet:
/// a reserved `0x00` byte (unprotected secret material), the MPI
/// encoding of the scalar, and the 2 bytes big-endian additive checksum
/// of the MPI bytes.
///
/// Packing is a pure, total function of the input scalar; recomputing
/// the checksum from the stored MPI always matches the stored trailer.
///
/// The buffer holds secret material and is zeroed on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct PackedSecret(Vec<u8>);

impl PackedSecret {
    /// pack a private scalar (big-endian bytes)
    ///
    /// ```
    /// use gpg_export::mpi::PackedSecret;
    ///
    /// let mut scalar = [0u8; 32];
    /// scalar[31] = 0x01;
    /// let packed = PackedSecret::pack(&scalar);
    /// assert_eq!(packed.as_bytes(), &[0x00, 0x00, 0x01, 0x01, 0x00, 0x02]);
    /// ```
    pub fn pack(scalar: &[u8]) -> Self {
        let mpi = encode(scalar);
        let checksum = checksum(&mpi);

        let mut out = Vec::with_capacity(1 + mpi.len() + 2);
        out.push(0x00);
        out.extend_from_slice(&mpi);
        out.extend_from_slice(&checksum.to_be_bytes());
        PackedSecret(out)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// the MPI bytes between the reserved byte and the checksum trailer
    pub fn mpi_bytes(&self) -> &[u8] {
        &self.0[1..self.0.len() - 2]
    }

    /// the checksum trailer as stored
    pub fn stored_checksum(&self) -> u16 {
        let len = self.0.len();
        u16::from_be_bytes([self.0[len - 2], self.0[len - 1]])
    }

    /// recompute the checksum from the stored MPI bytes
    pub fn compute_checksum(&self) -> u16 {
        checksum(self.mpi_bytes())
    }
}
impl AsRef<[u8]> for PackedSecret {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
impl fmt::Debug for PackedSecret {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PackedSecret(<{} secret bytes>)", self.0.len())
    }
}
impl Drop for PackedSecret {
    fn drop(&mut self) {
        securemem::zero(&mut self.0);
    }
}

fn checksum(bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(0u16, |acc, b| acc.wrapping_add(*b as u16))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdkey::util::hex;

    #[test]
    fn zero_scalar() {
        let packed = PackedSecret::pack(&[0u8; 32]);
        assert_eq!(packed.as_bytes(), &[0x00, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(packed.stored_checksum(), 0);
        assert_eq!(packed.mpi_bytes(), &[0x00, 0x00]);
    }

    #[test]
    fn leading_zero_bytes_are_stripped() {
        let mut scalar = [0u8; 32];
        scalar[1] = 0x80;
        let mpi = encode(&scalar);
        // 31 magnitude bytes, 248 bits
        assert_eq!(mpi.len(), 2 + 31);
        assert_eq!(&mpi[0..2], &[0x00, 0xf8]);
        assert_eq!(mpi[2], 0x80);
    }

    #[test]
    fn bit_length_counts_the_top_byte() {
        assert_eq!(encode(&[0x01]), vec![0x00, 0x01, 0x01]);
        assert_eq!(encode(&[0xff]), vec![0x00, 0x08, 0xff]);
        assert_eq!(encode(&[0x01, 0x00]), vec![0x00, 0x09, 0x01, 0x00]);
    }

    #[test]
    fn golden_leaf_scalar() {
        // leaf scalar of the all-`all` mnemonic test hierarchy
        let scalar = hex::decode(
            "556dfe633ce735012085b94fcc6c7d353e31c3836d4cd5f616554025c450a2fd",
        )
        .unwrap();
        let packed = PackedSecret::pack(&scalar);
        assert_eq!(
            hex::encode(packed.as_bytes()),
            "0000ff556dfe633ce735012085b94fcc6c7d353e31c3836d4cd5f616554025c450a2fd0fce"
        );
        assert_eq!(packed.stored_checksum(), 0x0fce);
    }

    quickcheck! {
        fn checksum_round_trips(scalar: Vec<u8>) -> bool {
            let mut s = [0u8; 32];
            for (i, b) in scalar.iter().take(32).enumerate() { s[i] = *b; }
            let packed = PackedSecret::pack(&s);
            packed.stored_checksum() == packed.compute_checksum()
        }

        fn encoding_is_minimal(scalar: Vec<u8>) -> bool {
            let mut s = [0u8; 32];
            for (i, b) in scalar.iter().take(32).enumerate() { s[i] = *b; }
            let mpi = encode(&s);
            match mpi.get(2) {
                // no magnitude: must be the zero integer
                None => mpi == vec![0x00, 0x00],
                Some(first) => *first != 0x00,
            }
        }

        fn packed_layout(scalar: Vec<u8>) -> bool {
            let mut s = [0u8; 32];
            for (i, b) in scalar.iter().take(32).enumerate() { s[i] = *b; }
            let packed = PackedSecret::pack(&s);
            let bytes = packed.as_bytes();
            bytes[0] == 0x00 && bytes.len() == 1 + packed.mpi_bytes().len() + 2
        }
    }
}
