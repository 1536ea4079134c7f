//! Content hashing for string keys.
//!
//! `PolyHasher` is FNV-1a over the bytes it is fed. Hashing a `&str`
//! through `core::hash::Hash` writes the string bytes followed by a fixed
//! terminator byte, so the result depends on the key content only, never
//! on where the string lives.

use core::hash::{BuildHasherDefault, Hasher};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Deterministic FNV-1a hasher.
#[derive(Copy, Clone, Debug)]
pub struct PolyHasher {
    state: u64,
}

impl Default for PolyHasher {
    fn default() -> Self {
        Self {
            state: FNV_OFFSET_BASIS,
        }
    }
}

impl Hasher for PolyHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= u64::from(b);
            self.state = self.state.wrapping_mul(FNV_PRIME);
        }
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.state
    }
}

/// Default `BuildHasher` for `ChainHashMap`.
pub type BuildPolyHasher = BuildHasherDefault<PolyHasher>;

/// Reduce a full hash to a bucket index in `[0, capacity)`.
///
/// `capacity` must be non-zero; tables never have fewer than
/// `MIN_CAPACITY` buckets.
#[inline]
pub fn bucket_index(hash: u64, capacity: usize) -> usize {
    debug_assert!(capacity > 0);
    // The remainder is below `capacity`, so it fits back into usize.
    (hash % capacity as u64) as usize
}
