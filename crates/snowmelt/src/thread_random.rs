use crate::RandSource;
use rand::{Rng, rng};

/// A `RandSource` that uses the thread-local RNG (`rand::rng()`).
///
/// This RNG is fast, cryptographically secure (ChaCha-based), and
/// automatically reseeded periodically. Forged uniqueness bits must come
/// from a CSPRNG so that round-trip tests exercise genuinely unpredictable
/// low bits; never swap in a seeded generator here.
///
/// Each OS thread has its own RNG instance, so calls from multiple threads
/// are contention-free and safe. This type does **not** store the RNG
/// itself; it simply accesses the thread-local generator on each call.
#[derive(Default, Clone, Debug)]
pub struct ThreadRandom;

impl RandSource<u32> for ThreadRandom {
    fn rand(&self) -> u32 {
        rng().random()
    }
}

impl RandSource<u64> for ThreadRandom {
    fn rand(&self) -> u64 {
        rng().random()
    }
}
