//! Random patterns with signatures not yet handed out.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{RngExt, SeedableRng};

use gridsig_types::{Canonicalizer, Pattern, SEGMENT_COUNT, Signature};

use crate::errors::{SessionError, SettingsError};

/// Validated sampling parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorSettings {
    seed: u64,
    sizes: RangeInclusive<usize>,
    max_attempts: u32,
}

impl GeneratorSettings {
    pub fn new(
        seed: u64,
        min_size: usize,
        max_size: usize,
        max_attempts: u32,
    ) -> Result<Self, SettingsError> {
        if min_size > max_size {
            return Err(SettingsError::InvertedSizeRange {
                min: min_size,
                max: max_size,
            });
        }
        if max_size > SEGMENT_COUNT {
            return Err(SettingsError::SizeTooLarge(max_size));
        }
        if max_attempts == 0 {
            return Err(SettingsError::ZeroAttempts);
        }
        Ok(Self {
            seed,
            sizes: min_size..=max_size,
            max_attempts,
        })
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn sizes(&self) -> &RangeInclusive<usize> {
        &self.sizes
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

/// Samples patterns from a seeded PRNG, rejecting any whose rotation class
/// was already used.
#[derive(Debug)]
pub struct PatternGenerator {
    rng: StdRng,
    settings: GeneratorSettings,
    used: HashSet<Signature>,
}

impl PatternGenerator {
    #[must_use]
    pub fn new(settings: GeneratorSettings) -> Self {
        Self {
            rng: StdRng::seed_from_u64(settings.seed),
            settings,
            used: HashSet::new(),
        }
    }

    /// Draw a pattern: a random size in the configured range, then that many
    /// distinct segments.
    pub fn sample(&mut self, canon: &Canonicalizer) -> Pattern {
        let size = self.rng.random_range(self.settings.sizes.clone());
        let segments = canon.grid().segments();
        index::sample(&mut self.rng, segments.len(), size)
            .into_iter()
            .map(|i| segments[i])
            .collect()
    }

    /// Draw until a pattern lands in an unused rotation class, then mark the
    /// class used.
    pub fn next_unique(
        &mut self,
        canon: &Canonicalizer,
    ) -> Result<(Pattern, Signature), SessionError> {
        for attempt in 1..=self.settings.max_attempts {
            let pattern = self.sample(canon);
            let signature = canon.signature(&pattern);
            if self.used.insert(signature) {
                if attempt > 1 {
                    tracing::debug!(attempt, %signature, "Resampled after signature collision");
                }
                return Ok((pattern, signature));
            }
        }
        Err(SessionError::GeneratorExhausted {
            attempts: self.settings.max_attempts,
        })
    }

    /// Reserve a signature so it is never generated. Returns `false` if it
    /// was already reserved.
    pub fn mark_used(&mut self, signature: Signature) -> bool {
        self.used.insert(signature)
    }

    #[must_use]
    pub fn is_used(&self, signature: Signature) -> bool {
        self.used.contains(&signature)
    }

    #[must_use]
    pub fn used_count(&self) -> usize {
        self.used.len()
    }
}
