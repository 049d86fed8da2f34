//! Hardened-only hierarchical deterministic key derivation
//!
//! Implements a restricted BIP32-style scheme over a compiled-in set of
//! short-Weierstrass curves (currently `nist256p1` only):
//!
//! * Transform a 64 bytes seed into a master private scalar and chain code
//! * Hardened derivation using 32 bits indices (top bit required)
//! * Sequential path walking from the seed to a leaf key
//!
//! Soft (public) derivation is intentionally not supported: every index of
//! a path must have its hardened bit set, so child keys can never be
//! computed from public information alone.

#[macro_use]
extern crate log;

#[cfg(feature = "generic-serialization")]
#[macro_use]
extern crate serde_derive;

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

/// opt-in hex tracing of derived secret material, clearly labeled under
/// the `secrets` log target. Expands to nothing unless the
/// `trace-secrets` feature is enabled; never enable that feature in a
/// build handling real seeds.
#[cfg(feature = "trace-secrets")]
macro_rules! trace_secret {
    ($($arg:tt)*) => { debug!(target: "secrets", $($arg)*) };
}
#[cfg(not(feature = "trace-secrets"))]
macro_rules! trace_secret {
    ($($arg:tt)*) => {};
}

pub mod bip39;
pub mod curve;
pub mod hdwallet;
pub mod util;
