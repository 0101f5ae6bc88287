//! Deterministic RNG utilities for reproducible tests.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use scuttle_core::types::TickInput;

/// Create a deterministic `ChaCha8Rng` from a seed.
///
/// All test randomization should go through this to ensure reproducibility.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// A scripted input sequence of `ticks` entries.
///
/// Input is held for random stretches of 10..60 ticks: walking in a random
/// stick direction, turning in place, or standing idle, so every step
/// trigger gets exercised.
pub fn random_input_script(ticks: usize, seed: u64) -> Vec<TickInput> {
    let mut rng = seeded_rng(seed);
    let mut script = Vec::with_capacity(ticks);
    while script.len() < ticks {
        let hold = rng.random_range(10..60);
        let input = match rng.random_range(0..3) {
            0 => TickInput::moving(rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0)),
            1 => TickInput::idle().with_yaw(rng.random_range(-0.05..=0.05)),
            _ => TickInput::idle(),
        };
        script.extend(std::iter::repeat_n(input, hold));
    }
    script.truncate(ticks);
    script
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
