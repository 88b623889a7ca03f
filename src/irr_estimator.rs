//! # In-repeat-read (IRR) allele estimator
//!
//! Estimates an allele size too large to be fully spanned by any read, by
//! extrapolating from the number of reads that are fully contained within
//! the repeat (in-repeat reads, IRRs) and the expected per-haplotype read
//! depth. Used by the dispatcher whenever an allele's true size exceeds
//! `S_max`, the largest size a single read could confirm directly.
use statrs::distribution::{Discrete, Poisson};

use crate::constants::IRR_CI_CHI2_THRESHOLD;
use crate::genotype::{AlleleType, RepeatAllele};
use crate::params::GenotypingParameters;

pub struct IRRAlleleEstimator<'a> {
    params: &'a GenotypingParameters,
}

impl<'a> IRRAlleleEstimator<'a> {
    pub fn new(params: &'a GenotypingParameters) -> Self {
        Self { params }
    }

    /// Expected number of IRRs for an allele of size `a >= S_max`: an allele
    /// of `a` units offers `a - S_max + 1` start offsets from which a fully
    /// in-repeat read of `S_max` units can be drawn, each contributing
    /// `haplotypeDepth / S_max` expected reads.
    fn mean_irr_count(&self, allele_size: i32) -> f64 {
        let s_max = f64::from(self.params.max_num_units_in_read);
        self.params.haplotype_depth * (f64::from(allele_size) - s_max + 1.0) / s_max
    }

    fn loglik(&self, observed_irr: u32, allele_size: i32) -> f64 {
        let mean = self.mean_irr_count(allele_size);
        if mean <= 0.0 {
            return if observed_irr == 0 {
                0.0
            } else {
                f64::NEG_INFINITY
            };
        }
        match Poisson::new(mean) {
            Ok(dist) => dist.ln_pmf(u64::from(observed_irr)),
            Err(_) => f64::NEG_INFINITY,
        }
    }

    /// Closed-form MLE inversion of the mean model, clamped to the valid
    /// `[S_max, infinity)` range an IRR-supported allele must occupy.
    fn point_estimate(&self, observed_irr: u32) -> i32 {
        let s_max = self.params.max_num_units_in_read;
        if self.params.haplotype_depth <= 0.0 {
            return s_max;
        }
        let s_max_f = f64::from(s_max);
        let a_hat = (f64::from(observed_irr) * s_max_f / self.params.haplotype_depth + s_max_f
            - 1.0)
            .round() as i32;
        a_hat.max(s_max)
    }

    /// The log-likelihood surface is concave in allele size (Poisson
    /// log-likelihood is concave in its mean, and the mean model is linear
    /// in allele size), so the rounded point estimate may be off the true
    /// integer argmax by a step or two; check a small neighborhood.
    fn refine_argmax(&self, observed_irr: u32, a_hat: i32) -> i32 {
        let s_max = self.params.max_num_units_in_read;
        let mut best_a = a_hat.max(s_max);
        let mut best_ll = self.loglik(observed_irr, best_a);
        for candidate in (a_hat - 2)..=(a_hat + 2) {
            let candidate = candidate.max(s_max);
            let ll = self.loglik(observed_irr, candidate);
            if ll > best_ll {
                best_ll = ll;
                best_a = candidate;
            }
        }
        best_a
    }

    /// Widen outward from the argmax while the log-likelihood stays within
    /// [`IRR_CI_CHI2_THRESHOLD`] of the maximum. Terminates because the
    /// surface is concave and tends to `-infinity` as the allele size grows
    /// without bound.
    fn confidence_interval(&self, observed_irr: u32, peak: i32, peak_ll: f64) -> (i32, i32) {
        let s_max = self.params.max_num_units_in_read;

        let mut lo = peak;
        while lo > s_max && peak_ll - self.loglik(observed_irr, lo - 1) <= IRR_CI_CHI2_THRESHOLD {
            lo -= 1;
        }

        let mut hi = peak;
        let safety_cap = peak + s_max.max(100) * 1000;
        while hi < safety_cap
            && peak_ll - self.loglik(observed_irr, hi + 1) <= IRR_CI_CHI2_THRESHOLD
        {
            hi += 1;
        }

        (lo, hi)
    }

    /// Estimate the allele size supported by `observed_irr` in-repeat reads.
    pub fn estimate(&self, observed_irr: u32) -> RepeatAllele {
        let a_hat = self.point_estimate(observed_irr);
        let peak = self.refine_argmax(observed_irr, a_hat);
        let peak_ll = self.loglik(observed_irr, peak);
        let ci = self.confidence_interval(observed_irr, peak, peak_ll);
        RepeatAllele::new(peak, AlleleType::InRepeat, ci)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> GenotypingParameters {
        GenotypingParameters::new(
            30.0,
            crate::params::AlleleCount::Diploid,
            3,
            25,
            0.97,
        )
        .unwrap()
    }

    #[test]
    fn more_irr_reads_implies_larger_allele() {
        let p = params();
        let est = IRRAlleleEstimator::new(&p);
        let small = est.estimate(30);
        let large = est.estimate(90);
        assert!(large.size > small.size);
    }

    #[test]
    fn estimate_never_falls_below_s_max() {
        let p = params();
        let est = IRRAlleleEstimator::new(&p);
        let allele = est.estimate(0);
        assert!(allele.size >= p.max_num_units_in_read);
    }

    #[test]
    fn ci_contains_point_estimate_and_widens_with_uncertainty() {
        let p = params();
        let est = IRRAlleleEstimator::new(&p);
        let allele = est.estimate(60);
        assert!(allele.ci.0 <= allele.size && allele.size <= allele.ci.1);
        assert!(allele.ci.1 > allele.ci.0);
    }

    #[test]
    fn allele_type_is_in_repeat() {
        let p = params();
        let est = IRRAlleleEstimator::new(&p);
        let allele = est.estimate(45);
        assert_eq!(allele.allele_type, AlleleType::InRepeat);
    }
}
