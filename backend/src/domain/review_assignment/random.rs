//! Injected randomness for reviewer tie-breaks.
//!
//! Every selection asks the source for a fresh generator, so no random state
//! is shared between requests. Production draws from OS entropy; tests use a
//! fixed seed to get reproducible picks.

use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Supplies generators for tie-breaking between equally loaded candidates.
pub trait RandomSource: Send + Sync {
    /// Return a generator for one selection decision.
    fn rng(&self) -> SmallRng;
}

/// Entropy-seeded generators for production use.
#[derive(Debug, Default, Clone, Copy)]
pub struct EntropyRandom;

impl RandomSource for EntropyRandom {
    fn rng(&self) -> SmallRng {
        SmallRng::from_entropy()
    }
}

/// Generators that always start from the same seed.
///
/// # Examples
/// ```
/// use rand::Rng;
/// use reviewer_service::domain::review_assignment::{RandomSource, SeededRandom};
///
/// let source = SeededRandom::new(7);
/// let first: u32 = source.rng().r#gen();
/// let second: u32 = source.rng().r#gen();
/// assert_eq!(first, second);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SeededRandom {
    seed: u64,
}

impl SeededRandom {
    /// Create a source replaying `seed` on every call.
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl RandomSource for SeededRandom {
    fn rng(&self) -> SmallRng {
        SmallRng::seed_from_u64(self.seed)
    }
}
