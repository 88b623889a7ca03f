//! # Allele emission model
//!
//! Models how a single true allele (a repeat of `a` units) is expected to be
//! reported by the molecules that come from it, given the saturation ceiling
//! `S_max` on what a single read can reveal and a base error rate.
//!
//! The true size is always saturated to `min(a, S_max)` before building the
//! kernel: reads cannot report sizes larger than what a read can span, so an
//! allele larger than `S_max` is statistically indistinguishable, from the
//! emission model's point of view, from one that is exactly `S_max`.
use ndarray::Array1;

use crate::constants::ERROR_KERNEL_DECAY_RATE;

/// Probability table `P(observed size = k | true size = a)` for a single
/// allele, over the full support `[0, S_max]`.
///
/// The kernel is a truncated, renormalized, two-sided geometric decay
/// centered at the saturated true size: the correct size gets probability
/// `p`, and the remaining `1 - p` mass is distributed over every other size
/// in `[0, S_max]` proportionally to `ERROR_KERNEL_DECAY_RATE.powi(distance)`.
#[derive(Debug, Clone)]
pub struct AlleleEmissionModel {
    /// `probs[k]` is `P(observed size = k | true size = saturated_true_size)`.
    probs: Array1<f64>,
    saturated_true_size: i32,
    s_max: i32,
}

impl AlleleEmissionModel {
    /// Build the emission model for a true allele size `true_size`, given
    /// the per-read saturation ceiling `s_max` and `prop_correct`, the
    /// probability that a molecule correctly reports its true size.
    pub fn new(true_size: i32, s_max: i32, prop_correct: f64) -> Self {
        debug_assert!(s_max >= 0, "s_max must be non-negative");
        debug_assert!(
            (0.0..=1.0).contains(&prop_correct),
            "prop_correct must be a probability"
        );

        let saturated = true_size.clamp(0, s_max);

        if s_max == 0 {
            return Self {
                probs: Array1::from_elem(1, 1.0),
                saturated_true_size: 0,
                s_max: 0,
            };
        }

        let n = (s_max + 1) as usize;
        let mut probs = Array1::zeros(n);

        let weight = |k: i32| ERROR_KERNEL_DECAY_RATE.powi((k - saturated).abs());
        let total_weight: f64 = (0..=s_max).filter(|&k| k != saturated).map(weight).sum();
        let scale = if total_weight > 0.0 {
            (1.0 - prop_correct) / total_weight
        } else {
            0.0
        };

        for k in 0..=s_max {
            probs[k as usize] = if k == saturated {
                prop_correct
            } else {
                scale * weight(k)
            };
        }

        Self {
            probs,
            saturated_true_size: saturated,
            s_max,
        }
    }

    pub fn saturated_true_size(&self) -> i32 {
        self.saturated_true_size
    }

    /// The saturation ceiling `S_max` this model was built with.
    pub fn s_max(&self) -> i32 {
        self.s_max
    }

    /// `P(observed size = k | true size)`. Zero for any `k` outside
    /// `[0, S_max]`.
    pub fn prop_of_given_size(&self, k: i32) -> f64 {
        if k < 0 || k > self.s_max {
            0.0
        } else {
            self.probs[k as usize]
        }
    }

    /// `P(observed size < k | true size)`.
    pub fn prop_shorter_than(&self, k: i32) -> f64 {
        if k <= 0 {
            0.0
        } else {
            let upper = k.min(self.s_max + 1);
            self.probs.slice(ndarray::s![0..upper as usize]).sum()
        }
    }

    /// `P(observed size >= k | true size)`.
    pub fn prop_at_least(&self, k: i32) -> f64 {
        1.0 - self.prop_shorter_than(k)
    }
}
