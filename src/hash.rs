use fastmurmur3::murmur3_x64_128;
use uuid::Uuid;

/// Murmur3 digest of a search-tree dump.
///
/// `SearchTree::fingerprint` writes every node's child count, playouts, wins,
/// frontier size and state into one string; this condenses it to 128 bits so two
/// seeded searches can be compared with a single `assert_eq!`.
pub struct MurMurHasher;

impl MurMurHasher {
    /// Digests `dump` into 32 lowercase hex characters.
    pub fn digest(dump: &str) -> String {
        let bits = murmur3_x64_128(dump.as_bytes(), 0);
        Uuid::from_bytes(bits.to_le_bytes()).simple().to_string()
    }
}
