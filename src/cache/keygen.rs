//! Key Generator Module
//!
//! Synthetic primary keys for edit envelopes.

use rand::Rng;

/// Number of random characters appended to each generated key
pub const KEY_FRAGMENT_LENGTH: usize = 6;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

// == Key Generator ==
/// Produces the primary key of a new edit envelope.
pub trait KeyGenerator: Send + Sync {
    fn generate(&self, timestamp: i64) -> String;
}

// == Random Key Generator ==
/// Generates keys of the form `<timestamp>_<fragment>`, where the fragment is
/// [`KEY_FRAGMENT_LENGTH`] base-36 characters drawn fresh on every call.
///
/// Keys are not guaranteed unique: two edits with the same timestamp collide
/// with probability 36^-6 per pair, and a collision makes the later insert
/// overwrite the earlier envelope. This is accepted for the small number of
/// edits held between syncs.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomKeyGenerator;

impl KeyGenerator for RandomKeyGenerator {
    fn generate(&self, timestamp: i64) -> String {
        let mut rng = rand::rng();
        let fragment: String = (0..KEY_FRAGMENT_LENGTH)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        format!("{timestamp}_{fragment}")
    }
}
