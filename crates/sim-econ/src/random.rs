//! Random-source capability injected into the rules.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Source of randomness used by session setup, turn evolution and crises.
///
/// Production code uses [`ChaCha8Rng`]; tests substitute scripted sources to
/// pin exact draws.
pub trait RandomSource {
    /// Uniform float in `[lo, hi]`.
    fn uniform(&mut self, lo: f64, hi: f64) -> f64;
    /// Uniform integer in `[lo, hi]`, both ends inclusive.
    fn int_inclusive(&mut self, lo: i64, hi: i64) -> i64;
    /// `true` with probability `p`.
    fn chance(&mut self, p: f64) -> bool;
    /// Uniform index in `[0, len)`. `len` must be non-zero.
    fn pick(&mut self, len: usize) -> usize;
}

impl RandomSource for ChaCha8Rng {
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        if hi <= lo {
            return lo;
        }
        self.gen_range(lo..=hi)
    }

    fn int_inclusive(&mut self, lo: i64, hi: i64) -> i64 {
        if hi <= lo {
            return lo;
        }
        self.gen_range(lo..=hi)
    }

    fn chance(&mut self, p: f64) -> bool {
        self.gen::<f64>() < p
    }

    fn pick(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        (**self).uniform(lo, hi)
    }

    fn int_inclusive(&mut self, lo: i64, hi: i64) -> i64 {
        (**self).int_inclusive(lo, hi)
    }

    fn chance(&mut self, p: f64) -> bool {
        (**self).chance(p)
    }

    fn pick(&mut self, len: usize) -> usize {
        (**self).pick(len)
    }
}
