//! Export orchestration
//!
//! Derives two keys from one seed — a primary signing key and a
//! key-exchange subkey, each along its own hardened path — and hands
//! them to an external key-packet encoder. The encoder (OpenPGP packet
//! grammar, armoring, fingerprinting) is a black box behind the
//! [`KeyPacketEncoder`] trait; this module only guarantees what it is
//! given: the SEC1 public point, the creation timestamp, the role flag,
//! optionally the packed secret material, and a deterministic signing
//! capability.
//!
//! Every export is stateless and deterministic: identical inputs produce
//! byte-identical bundles.

use std::{error, fmt, result};

use hdkey::bip39;
use hdkey::curve::{self, Curve, PublicKey, Signer};
use hdkey::hdwallet::{self, walk, DerivationIndex, Seed};

use crate::mpi::PackedSecret;

/// export errors
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Error {
    /// curve lookup or scalar-to-key conversion failed
    Curve(curve::Error),
    /// a derivation step failed; never retried, the derived identity
    /// must not silently change
    Derivation(hdwallet::Error),
    /// the external packet encoder reported a failure
    Encoder(String),
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Curve(err) => write!(f, "Curve error: {}", err),
            Error::Derivation(err) => write!(f, "Derivation error: {}", err),
            Error::Encoder(err) => write!(f, "Packet encoder error: {}", err),
        }
    }
}
impl error::Error for Error {}
impl From<curve::Error> for Error {
    fn from(e: curve::Error) -> Error {
        Error::Curve(e)
    }
}
impl From<hdwallet::Error> for Error {
    fn from(e: hdwallet::Error) -> Error {
        Error::Derivation(e)
    }
}

pub type Result<T> = result::Result<T, Error>;

/// the role a derived key plays in the exported bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    /// primary key, certifies and signs
    Sign,
    /// subordinate key, used for key exchange (ECDH)
    KeyExchange,
}

/// an opaque caller-supplied token resolving to one hardened derivation
/// path per key role. How the mapping works (in GPG's case, hashing the
/// user identity string) is outside this crate.
pub trait Identity {
    fn derivation_path(&self, role: KeyRole) -> Vec<DerivationIndex>;
}

/// root entropy for one export operation: either the 64 bytes seed
/// itself or a mnemonic sentence stretched on the fly
pub enum SeedSource<'a> {
    Seed(&'a Seed),
    Mnemonic(&'a str),
}

/// the public half of one derived key, as handed to the packet encoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyPacket {
    pub public_key: PublicKey,
    pub created: u32,
    pub role: KeyRole,
}
impl PublicKeyPacket {
    pub fn curve_name(&self) -> &'static str {
        self.public_key.curve().name()
    }
}

/// the external key-packet encoder. Implementations receive everything
/// needed to emit an OpenPGP key block: the public packet, an optional
/// [`PackedSecret`], and the signing capability for self-signatures.
pub trait KeyPacketEncoder {
    /// emit the primary key packets, establishing the identity
    fn create_primary(
        &self,
        user_id: &str,
        key: &PublicKeyPacket,
        signer: &Signer,
        secret: Option<&PackedSecret>,
    ) -> Result<Vec<u8>>;

    /// append a subordinate key to an already encoded primary bundle
    fn create_subkey(
        &self,
        primary: &[u8],
        key: &PublicKeyPacket,
        signer: &Signer,
        secret: Option<&PackedSecret>,
    ) -> Result<Vec<u8>>;
}

/// derive and export one key bundle
///
/// Walks the identity's signing path and key-exchange path over the same
/// seed, then calls the encoder twice: once to establish the primary
/// signing key, once to attach the key-exchange subkey. The subkey's
/// binding signature is made with the PRIMARY key's signer, as the
/// OpenPGP trust model requires. Secret scalars only ever live in
/// zero-on-drop buffers scoped to this call; they are packed into the
/// output only when `include_private` is set.
pub fn export<I, E>(
    encoder: &E,
    identity: &I,
    seed: SeedSource,
    include_private: bool,
    curve_name: &str,
    user_id: &str,
    timestamp: u32,
) -> Result<Vec<u8>>
where
    I: Identity,
    E: KeyPacketEncoder,
{
    let curve = Curve::lookup(curve_name)?;

    let stretched;
    let seed = match seed {
        SeedSource::Seed(seed) => seed,
        SeedSource::Mnemonic(mnemonic) => {
            stretched = bip39::seed_from_mnemonic(mnemonic, b"");
            &stretched
        }
    };

    debug!(
        "exporting {} bundle ({} material)",
        curve.name(),
        if include_private { "secret" } else { "public" }
    );

    let primary = walk(curve, seed, &identity.derivation_path(KeyRole::Sign))?;
    let signer = primary.signer(curve)?;
    let primary_secret = if include_private {
        Some(PackedSecret::pack(primary.secret_scalar()))
    } else {
        None
    };
    drop(primary);

    let primary_packet = PublicKeyPacket {
        public_key: signer.public_key(),
        created: timestamp,
        role: KeyRole::Sign,
    };
    let bundle = encoder.create_primary(
        user_id,
        &primary_packet,
        &signer,
        primary_secret.as_ref(),
    )?;

    let subkey = walk(
        curve,
        seed,
        &identity.derivation_path(KeyRole::KeyExchange),
    )?;
    let subkey_packet = PublicKeyPacket {
        public_key: subkey.public(curve)?,
        created: timestamp,
        role: KeyRole::KeyExchange,
    };
    let subkey_secret = if include_private {
        Some(PackedSecret::pack(subkey.secret_scalar()))
    } else {
        None
    };
    drop(subkey);

    encoder.create_subkey(&bundle, &subkey_packet, &signer, subkey_secret.as_ref())
}
