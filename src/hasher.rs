//! Seeded byte hashing.
//!
//! The table never hashes through a global: each table owns a [`KeyHasher`]
//! value carrying its own seed, so two tables built with the same seed lay
//! out the same keys identically.

use core::hash::Hasher;

use siphasher::sip::SipHasher13;

/// Seed used by the `Default` implementations of the bundled hashers.
pub const DEFAULT_SEED: u64 = 0x2d35_8dcc_aa6c_78a5;

/// A pure function from a byte string to a 64-bit hash.
///
/// Implementations must be deterministic for a given value of `self`. Any
/// `Fn(&[u8]) -> u64` closure is a `KeyHasher`, which is handy for forcing
/// collisions in tests.
pub trait KeyHasher {
    /// Hashes `bytes`.
    fn hash_bytes(&self, bytes: &[u8]) -> u64;
}

impl<F> KeyHasher for F
where
    F: Fn(&[u8]) -> u64,
{
    #[inline]
    fn hash_bytes(&self, bytes: &[u8]) -> u64 {
        self(bytes)
    }
}

/// SipHash-1-3 keyed from a seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SipKeyHasher {
    k0: u64,
    k1: u64,
}

impl SipKeyHasher {
    /// Builds a hasher from a single 64-bit seed.
    pub const fn with_seed(seed: u64) -> Self {
        Self::with_keys(seed, seed.rotate_left(32) ^ DEFAULT_SEED)
    }

    /// Builds a hasher from both SipHash keys.
    pub const fn with_keys(k0: u64, k1: u64) -> Self {
        SipKeyHasher { k0, k1 }
    }
}

impl Default for SipKeyHasher {
    fn default() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }
}

impl KeyHasher for SipKeyHasher {
    #[inline]
    fn hash_bytes(&self, bytes: &[u8]) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(self.k0, self.k1);
        hasher.write(bytes);
        hasher.finish()
    }
}

/// foldhash's fast hasher with a fixed per-table seed.
#[cfg(feature = "foldhash")]
#[derive(Clone)]
pub struct FoldKeyHasher {
    seed: u64,
    state: foldhash::fast::FixedState,
}

#[cfg(feature = "foldhash")]
impl FoldKeyHasher {
    /// Builds a hasher from a 64-bit seed.
    pub const fn with_seed(seed: u64) -> Self {
        FoldKeyHasher {
            seed,
            state: foldhash::fast::FixedState::with_seed(seed),
        }
    }
}

#[cfg(feature = "foldhash")]
impl Default for FoldKeyHasher {
    fn default() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }
}

#[cfg(feature = "foldhash")]
impl core::fmt::Debug for FoldKeyHasher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FoldKeyHasher")
            .field("seed", &format_args!("{:#018x}", self.seed))
            .finish()
    }
}

#[cfg(feature = "foldhash")]
impl KeyHasher for FoldKeyHasher {
    #[inline]
    fn hash_bytes(&self, bytes: &[u8]) -> u64 {
        use core::hash::BuildHasher;

        let mut hasher = self.state.build_hasher();
        hasher.write(bytes);
        hasher.finish()
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher used when none is specified: foldhash.
        pub type DefaultKeyHasher = FoldKeyHasher;
    } else {
        /// The hasher used when none is specified: SipHash-1-3.
        pub type DefaultKeyHasher = SipKeyHasher;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sip_is_deterministic_per_seed() {
        let a = SipKeyHasher::with_seed(7);
        let b = SipKeyHasher::with_seed(7);
        let c = SipKeyHasher::with_seed(8);

        assert_eq!(a.hash_bytes(b"apple"), b.hash_bytes(b"apple"));
        assert_ne!(a.hash_bytes(b"apple"), c.hash_bytes(b"apple"));
        assert_ne!(a.hash_bytes(b"apple"), a.hash_bytes(b"apples"));
    }

    #[test]
    fn sip_matches_reference_keys() {
        let hasher = SipKeyHasher::with_keys(1, 2);
        let mut reference = SipHasher13::new_with_keys(1, 2);
        reference.write(b"banana");
        assert_eq!(hasher.hash_bytes(b"banana"), reference.finish());
    }

    #[cfg(feature = "foldhash")]
    #[test]
    fn fold_is_deterministic_per_seed() {
        let a = FoldKeyHasher::with_seed(DEFAULT_SEED);
        let b = FoldKeyHasher::default();
        assert_eq!(a.hash_bytes(b"cherry"), b.hash_bytes(b"cherry"));
        assert_ne!(a.hash_bytes(b"cherry"), a.hash_bytes(b"cherries"));
    }

    #[test]
    fn closures_are_hashers() {
        let constant = |_: &[u8]| 42u64;
        assert_eq!(constant.hash_bytes(b"anything"), 42);

        let length = |bytes: &[u8]| bytes.len() as u64;
        assert_eq!(length.hash_bytes(b"four"), 4);
    }
}
