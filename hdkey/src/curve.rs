//! Curve parameter provider
//!
//! Every curve-specific operation of the derivation scheme goes through
//! the [`Curve`] enum: the HMAC personalization string used to turn a
//! seed into a master key, the canonical range check on derived scalars,
//! the addition modulo the curve order, and the construction of public
//! keys and deterministic-ECDSA signers. Supporting an additional curve
//! means adding a variant here and nothing anywhere else.

use p256::ecdsa::signature::hazmat::PrehashSigner;
use p256::ecdsa::{Signature, SigningKey};
use p256::elliptic_curve::bigint::U256;
use p256::elliptic_curve::ops::Reduce;
use p256::elliptic_curve::PrimeField;
use p256::{FieldBytes, Scalar};

use std::{error, fmt, result};

use crate::util::hex;

pub const SCALAR_SIZE: usize = 32;

/// Curve errors
#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(
    feature = "generic-serialization",
    derive(Serialize, Deserialize)
)]
pub enum Error {
    /// the given curve identifier is not part of the compiled-in set
    UnsupportedCurve(String),
    /// the secret scalar is zero or not canonical for the curve order,
    /// it cannot be turned into a signing key
    InvalidSecretScalar,
    /// the deterministic signature computation failed
    SigningFailed,
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UnsupportedCurve(name) => write!(f, "Unsupported curve: {}", name),
            Error::InvalidSecretScalar => write!(f, "Invalid secret scalar for the curve"),
            Error::SigningFailed => write!(f, "Deterministic signature computation failed"),
        }
    }
}
impl error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;

/// a compiled-in curve parameter set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "generic-serialization",
    derive(Serialize, Deserialize)
)]
pub enum Curve {
    /// NIST P-256 (aka secp256r1), the curve named `nist256p1` by the
    /// SLIP-0010 scheme this derivation follows
    Nist256p1,
}

impl Curve {
    /// resolve a curve identifier string to its parameter set
    ///
    /// ```
    /// use hdkey::curve::Curve;
    ///
    /// assert_eq!(Curve::lookup("nist256p1"), Ok(Curve::Nist256p1));
    /// assert!(Curve::lookup("brainpoolP256r1").is_err());
    /// ```
    pub fn lookup(name: &str) -> Result<Self> {
        match name {
            "nist256p1" => Ok(Curve::Nist256p1),
            _ => Err(Error::UnsupportedCurve(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Curve::Nist256p1 => "nist256p1",
        }
    }

    /// the curve-specific HMAC-SHA512 key used to generate the master
    /// key from a seed
    pub fn personalization(&self) -> &'static [u8] {
        match self {
            Curve::Nist256p1 => b"Nist256p1 seed",
        }
    }

    /// size in bytes of a serialized private scalar
    pub fn scalar_size(&self) -> usize {
        match self {
            Curve::Nist256p1 => SCALAR_SIZE,
        }
    }

    /// whether the big-endian value is a canonical scalar, i.e. strictly
    /// below the curve order
    pub fn scalar_in_range(&self, bytes: &[u8; SCALAR_SIZE]) -> bool {
        match self {
            Curve::Nist256p1 => {
                let repr = FieldBytes::clone_from_slice(bytes);
                Option::<Scalar>::from(Scalar::from_repr(repr)).is_some()
            }
        }
    }

    /// addition modulo the curve order, both operands big-endian. The
    /// operands are reduced first, so a non-canonical value (such as an
    /// unvalidated master scalar) still combines the way arbitrary
    /// precision arithmetic would.
    pub fn scalar_add(
        &self,
        x: &[u8; SCALAR_SIZE],
        y: &[u8; SCALAR_SIZE],
    ) -> [u8; SCALAR_SIZE] {
        match self {
            Curve::Nist256p1 => {
                let a = <Scalar as Reduce<U256>>::reduce(U256::from_be_slice(&x[..]));
                let b = <Scalar as Reduce<U256>>::reduce(U256::from_be_slice(&y[..]));
                let sum = a + b;
                let mut out = [0u8; SCALAR_SIZE];
                out.copy_from_slice(sum.to_repr().as_slice());
                out
            }
        }
    }

    /// build the signing capability for the given secret scalar. Fails
    /// with `InvalidSecretScalar` if the scalar is zero or out of range.
    pub fn signer(&self, scalar: &[u8; SCALAR_SIZE]) -> Result<Signer> {
        match self {
            Curve::Nist256p1 => {
                let key = SigningKey::from_bytes(&FieldBytes::clone_from_slice(scalar))
                    .map_err(|_| Error::InvalidSecretScalar)?;
                Ok(Signer { curve: *self, key })
            }
        }
    }

    /// compute the public point `scalar · G`
    pub fn public_key(&self, scalar: &[u8; SCALAR_SIZE]) -> Result<PublicKey> {
        Ok(self.signer(scalar)?.public_key())
    }
}

/// a public curve point in SEC1 uncompressed encoding
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    curve: Curve,
    point: Vec<u8>,
}
impl PublicKey {
    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// SEC1 uncompressed point bytes (`0x04 ‖ x ‖ y`, 65 bytes for P-256)
    pub fn as_bytes(&self) -> &[u8] {
        &self.point
    }
}
impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.point))
    }
}
impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.point))
    }
}
impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.point
    }
}

/// signing capability of one derived key: a function from a 32 bytes
/// message digest to a deterministic (RFC 6979) ECDSA signature. Built
/// once per derived key and passed by reference to the packet encoder.
pub struct Signer {
    curve: Curve,
    key: SigningKey,
}
impl Signer {
    pub fn curve(&self) -> Curve {
        self.curve
    }

    pub fn public_key(&self) -> PublicKey {
        match self.curve {
            Curve::Nist256p1 => {
                let point = self.key.verifying_key().to_encoded_point(false);
                PublicKey {
                    curve: self.curve,
                    point: point.as_bytes().to_vec(),
                }
            }
        }
    }

    /// sign a message digest, returning the `(r, s)` pair as big-endian
    /// scalars. Deterministic: the same digest always produces the same
    /// signature.
    pub fn sign_digest(
        &self,
        digest: &[u8; 32],
    ) -> Result<([u8; SCALAR_SIZE], [u8; SCALAR_SIZE])> {
        match self.curve {
            Curve::Nist256p1 => {
                let signature: Signature = self
                    .key
                    .sign_prehash(&digest[..])
                    .map_err(|_| Error::SigningFailed)?;
                let (r_bytes, s_bytes) = signature.split_bytes();
                let mut r = [0u8; SCALAR_SIZE];
                let mut s = [0u8; SCALAR_SIZE];
                r.copy_from_slice(r_bytes.as_slice());
                s.copy_from_slice(s_bytes.as_slice());
                Ok((r, s))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::hex;

    // order of the P-256 group
    const N: &str = "ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551";
    const N_MINUS_1: &str = "ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632550";

    fn scalar(hex_str: &str) -> [u8; SCALAR_SIZE] {
        let bytes = hex::decode(hex_str).unwrap();
        let mut out = [0u8; SCALAR_SIZE];
        out.copy_from_slice(&bytes);
        out
    }

    #[test]
    fn lookup() {
        assert_eq!(Curve::lookup("nist256p1"), Ok(Curve::Nist256p1));
        assert_eq!(
            Curve::lookup("ed25519"),
            Err(Error::UnsupportedCurve("ed25519".to_string()))
        );
    }

    #[test]
    fn range_check_is_strict() {
        let curve = Curve::Nist256p1;
        assert!(curve.scalar_in_range(&scalar(N_MINUS_1)));
        assert!(!curve.scalar_in_range(&scalar(N)));
        assert!(curve.scalar_in_range(&[0u8; SCALAR_SIZE]));
    }

    #[test]
    fn addition_wraps_at_order() {
        let curve = Curve::Nist256p1;
        let mut one = [0u8; SCALAR_SIZE];
        one[31] = 1;
        let sum = curve.scalar_add(&one, &scalar(N_MINUS_1));
        assert_eq!(sum, [0u8; SCALAR_SIZE]);
    }

    #[test]
    fn addition_reduces_noncanonical_operand() {
        let curve = Curve::Nist256p1;
        let mut one = [0u8; SCALAR_SIZE];
        one[31] = 1;
        // N reduces to 0, so 1 + N == 1 mod N
        let sum = curve.scalar_add(&one, &scalar(N));
        assert_eq!(sum, one);
    }

    #[test]
    fn signer_rejects_zero_scalar() {
        let curve = Curve::Nist256p1;
        assert!(curve.signer(&[0u8; SCALAR_SIZE]).is_err());
    }

    #[test]
    fn signatures_are_deterministic() {
        let curve = Curve::Nist256p1;
        let mut secret = [0u8; SCALAR_SIZE];
        secret[31] = 0x2a;
        let signer = curve.signer(&secret).unwrap();
        let digest = [0x5au8; 32];
        let first = signer.sign_digest(&digest).unwrap();
        let second = signer.sign_digest(&digest).unwrap();
        assert_eq!(first, second);
        assert_ne!(first.0, [0u8; SCALAR_SIZE]);
        assert_ne!(first.1, [0u8; SCALAR_SIZE]);
    }

    #[test]
    fn public_key_is_uncompressed_sec1() {
        let curve = Curve::Nist256p1;
        let mut secret = [0u8; SCALAR_SIZE];
        secret[31] = 1;
        let pk = curve.public_key(&secret).unwrap();
        assert_eq!(pk.as_bytes().len(), 65);
        assert_eq!(pk.as_bytes()[0], 0x04);
        // scalar 1 gives back the generator
        assert_eq!(
            hex::encode(&pk.as_bytes()[1..33]),
            "6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296"
        );
    }
}
