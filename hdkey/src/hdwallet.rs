//! Hardened-only Hierarchical Deterministic key derivation
//!
//! Follows the private-key half of the SLIP-0010 scheme for
//! short-Weierstrass curves:
//!
//! * Transform a seed to a master private scalar and chain code
//! * Hardened derivation using 32 bits indices
//! * Sequential walk over a path of indices, earlier indices first
//!
//! Soft derivation is rejected outright: every index must carry the
//! hardened marker bit, so the scheme never mixes public points into the
//! derivation input and parent/child key relationships stay private.
//!
//! Every step is a pure function of its inputs. The same seed, curve and
//! path always produce byte-identical results.

use cryptoxide::hmac::Hmac;
use cryptoxide::mac::Mac;
use cryptoxide::sha2::Sha512;
use cryptoxide::util::fixed_time_eq;

use std::{error, fmt, result};

use crate::curve::{self, Curve, PublicKey, Signer, SCALAR_SIZE};
use crate::util::{hex, securemem};

pub const SEED_SIZE: usize = 64;
pub const CHAIN_CODE_SIZE: usize = 32;

/// the top bit of a derivation index, marking the index as hardened
pub const HARDENED_INDEX: u32 = 0x8000_0000;

pub type DerivationIndex = u32;

/// derivation errors
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Error {
    /// the given seed is of invalid size, the parameter is the given size
    ///
    /// See `SEED_SIZE` for details about the expected size.
    InvalidSeedSize(usize),
    /// the derivation index is missing the hardened marker bit. Only
    /// hardened derivation is supported; this is a programming or
    /// configuration error on the caller side, never retried.
    NonHardenedIndex(DerivationIndex),
    /// the HMAC output interpreted as a big integer fell on or above the
    /// curve order while deriving the given index. The probability is
    /// negligible (~2^-128 for P-256) but the whole path must fail:
    /// substituting another index would silently change the hierarchy.
    DerivedScalarOutOfRange(DerivationIndex),
    HexadecimalError(hex::Error),
    CurveError(curve::Error),
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidSeedSize(sz) => write!(
                f,
                "Invalid Seed Size, expected {} bytes, but received {} bytes.",
                SEED_SIZE, sz
            ),
            Error::NonHardenedIndex(idx) => {
                write!(f, "Derivation index {} is not hardened", idx)
            }
            Error::DerivedScalarOutOfRange(idx) => {
                write!(f, "Derived scalar out of range at index {}", idx)
            }
            Error::HexadecimalError(err) => write!(f, "Invalid hexadecimal: {}.", err),
            Error::CurveError(err) => write!(f, "Curve error: {}", err),
        }
    }
}
impl error::Error for Error {}
impl From<hex::Error> for Error {
    fn from(e: hex::Error) -> Error {
        Error::HexadecimalError(e)
    }
}
impl From<curve::Error> for Error {
    fn from(e: curve::Error) -> Error {
        Error::CurveError(e)
    }
}

pub type Result<T> = result::Result<T, Error>;

/// Seed used to generate the master key of the hierarchy.
///
/// 64 bytes of root entropy, supplied once per export operation. The
/// buffer is zeroed on drop and is never persisted or logged by this
/// crate.
pub struct Seed([u8; SEED_SIZE]);
impl Seed {
    /// create a Seed by taking ownership of the given array
    ///
    /// ```
    /// use hdkey::hdwallet::{Seed, SEED_SIZE};
    ///
    /// let bytes = [0u8; SEED_SIZE];
    /// let seed = Seed::from_bytes(bytes);
    ///
    /// assert!(seed.as_ref().len() == SEED_SIZE);
    /// ```
    pub fn from_bytes(buf: [u8; SEED_SIZE]) -> Self {
        Seed(buf)
    }

    /// create a Seed by copying the given slice into a new array
    ///
    /// ```
    /// use hdkey::hdwallet::{Seed, SEED_SIZE};
    ///
    /// let bytes = [0u8; SEED_SIZE];
    /// let wrong = [0u8; 31];
    ///
    /// assert!(Seed::from_slice(&wrong[..]).is_err());
    /// assert!(Seed::from_slice(&bytes[..]).is_ok());
    /// ```
    pub fn from_slice(buf: &[u8]) -> Result<Self> {
        if buf.len() != SEED_SIZE {
            return Err(Error::InvalidSeedSize(buf.len()));
        }
        let mut v = [0u8; SEED_SIZE];
        v[..].clone_from_slice(buf);
        Ok(Seed::from_bytes(v))
    }

    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str)?;
        Self::from_slice(&bytes)
    }
}
impl AsRef<[u8]> for Seed {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
impl Drop for Seed {
    fn drop(&mut self) {
        securemem::zero(&mut self.0);
    }
}
impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Seed(<{} secret bytes>)", SEED_SIZE)
    }
}

/// extended private key: a private scalar (32 bytes, big-endian) and the
/// chain code (32 bytes) feeding the next derivation step.
///
/// Values are immutable: deriving a child returns a new `XPrv`, the
/// parent is left untouched and may be dropped by the caller. Both
/// buffers are zeroed on drop.
pub struct XPrv {
    secret: [u8; SCALAR_SIZE],
    chain_code: [u8; CHAIN_CODE_SIZE],
}
impl XPrv {
    /// rebuild an extended private key from its raw parts
    pub fn from_parts(secret: [u8; SCALAR_SIZE], chain_code: [u8; CHAIN_CODE_SIZE]) -> Self {
        XPrv { secret, chain_code }
    }

    /// create the master `XPrv` associated to this `Seed`
    ///
    /// HMAC-SHA512 keyed by the curve personalization string over the
    /// seed bytes; the first 32 bytes of the output become the private
    /// scalar, the last 32 the chain code.
    ///
    /// The master scalar is deliberately NOT validated against the curve
    /// order here, mirroring the source scheme. An out-of-range master
    /// still derives children correctly; it only fails later if used
    /// directly as a signing key.
    ///
    /// ```
    /// use hdkey::curve::Curve;
    /// use hdkey::hdwallet::{Seed, XPrv, SEED_SIZE};
    ///
    /// let seed = Seed::from_bytes([0u8; SEED_SIZE]);
    /// let master = XPrv::generate_from_seed(Curve::Nist256p1, &seed);
    /// ```
    pub fn generate_from_seed(curve: Curve, seed: &Seed) -> Self {
        let mut mac = Hmac::new(Sha512::new(), curve.personalization());
        mac.input(seed.as_ref());

        let mut out = [0u8; 64];
        mac.raw_result(&mut out);

        let mut secret = [0u8; SCALAR_SIZE];
        let mut chain_code = [0u8; CHAIN_CODE_SIZE];
        secret.clone_from_slice(&out[0..32]);
        chain_code.clone_from_slice(&out[32..64]);
        securemem::zero(&mut out);

        trace_secret!("master scalar: {}", hex::encode(&secret));
        trace_secret!("master chain code: {}", hex::encode(&chain_code));

        XPrv { secret, chain_code }
    }

    /// derive the hardened child at the given index
    ///
    /// The index MUST have its top bit set (see `HARDENED_INDEX`),
    /// otherwise the derivation fails with `NonHardenedIndex`.
    pub fn derive(&self, curve: Curve, index: DerivationIndex) -> Result<Self> {
        if index & HARDENED_INDEX == 0 {
            return Err(Error::NonHardenedIndex(index));
        }

        let mut mac = Hmac::new(Sha512::new(), &self.chain_code);
        mac.input(&[0x0]);
        mac.input(&self.secret);
        mac.input(&index.to_be_bytes());

        let mut out = [0u8; 64];
        mac.raw_result(&mut out);

        let mut il = [0u8; SCALAR_SIZE];
        il.clone_from_slice(&out[0..32]);
        if !curve.scalar_in_range(&il) {
            securemem::zero(&mut il);
            securemem::zero(&mut out);
            return Err(Error::DerivedScalarOutOfRange(index));
        }

        let secret = curve.scalar_add(&il, &self.secret);
        let mut chain_code = [0u8; CHAIN_CODE_SIZE];
        chain_code.clone_from_slice(&out[32..64]);
        securemem::zero(&mut il);
        securemem::zero(&mut out);

        trace_secret!(
            "ckd: {} -> {} {}",
            index,
            hex::encode(&secret),
            hex::encode(&chain_code)
        );

        Ok(XPrv { secret, chain_code })
    }

    /// apply `derive` once per index, in path order. An empty path
    /// returns a copy of `self`.
    pub fn derive_path(&self, curve: Curve, path: &[DerivationIndex]) -> Result<Self> {
        let mut state = XPrv::from_parts(self.secret, self.chain_code);
        for index in path {
            state = state.derive(curve, *index)?;
        }
        Ok(state)
    }

    /// the private scalar, 32 bytes big-endian
    pub fn secret_scalar(&self) -> &[u8; SCALAR_SIZE] {
        &self.secret
    }

    /// the chain code feeding the next derivation step
    pub fn chain_code(&self) -> &[u8; CHAIN_CODE_SIZE] {
        &self.chain_code
    }

    /// the public point `scalar · G` on the given curve
    pub fn public(&self, curve: Curve) -> Result<PublicKey> {
        Ok(curve.public_key(&self.secret)?)
    }

    /// build the deterministic-ECDSA signing capability for this key
    pub fn signer(&self, curve: Curve) -> Result<Signer> {
        Ok(curve.signer(&self.secret)?)
    }
}
impl PartialEq for XPrv {
    fn eq(&self, rhs: &XPrv) -> bool {
        fixed_time_eq(&self.secret, &rhs.secret) && fixed_time_eq(&self.chain_code, &rhs.chain_code)
    }
}
impl Eq for XPrv {}
impl Clone for XPrv {
    fn clone(&self) -> Self {
        XPrv::from_parts(self.secret, self.chain_code)
    }
}
impl fmt::Debug for XPrv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // secret material, only the chain code side would be safe to
        // print and half a dump helps nobody
        write!(f, "XPrv(<secret material>)")
    }
}
impl Drop for XPrv {
    fn drop(&mut self) {
        securemem::zero(&mut self.secret);
        securemem::zero(&mut self.chain_code);
    }
}

/// walk the whole path from the seed: master key generation followed by
/// one hardened derivation per index, threading each output into the
/// next step. `walk(seed, &[], curve)` is the master key itself.
pub fn walk(curve: Curve, seed: &Seed, path: &[DerivationIndex]) -> Result<XPrv> {
    debug!(
        "walking {} derivation indices on {}",
        path.len(),
        curve.name()
    );
    XPrv::generate_from_seed(curve, seed).derive_path(curve, path)
}
