//! GPG export of hierarchically derived keys
//!
//! Two concerns live here, both downstream of the `hdkey` derivation
//! core:
//!
//! * [`mpi`] packs a derived private scalar into the OpenPGP
//!   big-integer convention, with the additive checksum trailer secret
//!   key packets carry.
//! * [`export`] walks two derivation paths from one seed (a primary
//!   signing key and a key-exchange subkey) and hands the results to an
//!   external key-packet encoder, treated as a black box.

#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

pub mod export;
pub mod mpi;
