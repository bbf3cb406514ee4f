//! RNG oracle used for turn-order shuffling.
//!
//! All implementations must be deterministic: the same seed always yields the
//! same value, so a combat seeded identically reproduces its faction order.

/// Deterministic random number source.
pub trait RngOracle {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Uniform index in `0..bound`. Returns 0 for an empty bound.
    ///
    /// Draws that fall in the short tail of the `u32` range are rejected and
    /// redrawn from a derived seed, so `% bound` carries no modulo bias.
    fn index(&self, seed: u64, bound: usize) -> usize {
        if bound <= 1 {
            return 0;
        }
        let bound = bound as u64;
        let threshold = (1u64 << 32) % bound;

        let mut draw_seed = seed;
        loop {
            let value = u64::from(self.next_u32(draw_seed));
            if value >= threshold {
                return (value % bound) as usize;
            }
            draw_seed = compute_seed(draw_seed, 1);
        }
    }
}

/// PCG-XSH-RR generator: 64-bit LCG state, 32-bit permuted output.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Mixes a base seed with a draw counter into an independent per-draw seed.
pub fn compute_seed(base_seed: u64, draw: u64) -> u64 {
    let mut hash = base_seed ^ draw.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}

/// Fisher–Yates shuffle driven by an [`RngOracle`].
///
/// Walks from the last index down, swapping each slot with a uniformly
/// chosen slot at or below it.
pub fn shuffle<T>(items: &mut [T], rng: &dyn RngOracle, seed: u64) {
    for i in (1..items.len()).rev() {
        let j = rng.index(compute_seed(seed, i as u64), i + 1);
        items.swap(i, j);
    }
}
