//! Injectable pseudo-random source threaded through every stochastic operator.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Uniform random numbers over half-open ranges.
///
/// Every operator takes its generator by `&mut R`, so two runs with equally
/// seeded sources produce bit-identical grids.
pub trait RandomSource {
    /// Uniform `f32` in `[lo, hi)`. Returns `lo` when the range is empty.
    fn range_f32(&mut self, lo: f32, hi: f32) -> f32;

    /// Uniform `i32` in `[lo, hi)`. Returns `lo` when the range is empty.
    fn range_i32(&mut self, lo: i32, hi: i32) -> i32;

    /// Uniform index in `[0, len)`.
    fn index(&mut self, len: usize) -> usize {
        let upper = i32::try_from(len).unwrap_or(i32::MAX);
        self.range_i32(0, upper).max(0) as usize
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn range_f32(&mut self, lo: f32, hi: f32) -> f32 {
        (**self).range_f32(lo, hi)
    }

    fn range_i32(&mut self, lo: i32, hi: i32) -> i32 {
        (**self).range_i32(lo, hi)
    }
}

macro_rules! impl_random_source {
    ($rng:ty) => {
        impl RandomSource for $rng {
            fn range_f32(&mut self, lo: f32, hi: f32) -> f32 {
                // Also rejects NaN bounds.
                if !(hi > lo) || !lo.is_finite() || !hi.is_finite() {
                    return lo;
                }
                self.random_range(lo..hi)
            }

            fn range_i32(&mut self, lo: i32, hi: i32) -> i32 {
                if hi <= lo {
                    return lo;
                }
                self.random_range(lo..hi)
            }
        }
    };
}

impl_random_source!(ChaCha8Rng);
impl_random_source!(StdRng);

/// Returns the crate's default deterministic generator for `seed`.
pub fn seeded(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Fisher-Yates shuffle driven by `rng`.
pub fn shuffle<T, R: RandomSource + ?Sized>(rng: &mut R, items: &mut [T]) {
    let mut n = items.len();
    while n > 1 {
        n -= 1;
        let k = rng.index(n + 1);
        items.swap(k, n);
    }
}
