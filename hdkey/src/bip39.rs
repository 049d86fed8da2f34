//! BIP39 mnemonic to seed conversion
//!
//! Only the seed-stretching half of BIP39 lives here: PBKDF2-HMAC-SHA512
//! over the mnemonic sentence, salted with `"mnemonic" ‖ passphrase`,
//! 2048 iterations, 64 bytes of output. Validating the sentence against
//! a word list (and computing its checksum) is the caller's concern.

use cryptoxide::hmac::Hmac;
use cryptoxide::pbkdf2::pbkdf2;
use cryptoxide::sha2::Sha512;

use crate::hdwallet::{Seed, SEED_SIZE};

const ITERATIONS: u32 = 2048;

/// stretch a mnemonic sentence into the 64 bytes root seed
///
/// ```
/// use hdkey::bip39;
///
/// let seed = bip39::seed_from_mnemonic("legal winner thank year wave sausage worth useful legal winner thank yellow", b"");
/// assert_eq!(seed.as_ref().len(), 64);
/// ```
pub fn seed_from_mnemonic(mnemonic: &str, passphrase: &[u8]) -> Seed {
    let mut salt = Vec::from("mnemonic".as_bytes());
    salt.extend_from_slice(passphrase);
    let mut mac = Hmac::new(Sha512::new(), mnemonic.as_bytes());
    let mut result = [0; SEED_SIZE];
    pbkdf2(&mut mac, &salt, ITERATIONS, &mut result);
    Seed::from_bytes(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::hex;

    #[test]
    fn passphrase_changes_the_seed() {
        let mnemonic = "all all all all all all all all all all all all";
        let plain = seed_from_mnemonic(mnemonic, b"");
        let protected = seed_from_mnemonic(mnemonic, b"TREZOR");
        assert_ne!(hex::encode(plain.as_ref()), hex::encode(protected.as_ref()));
    }
}
