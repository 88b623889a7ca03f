//! # Short-repeat genotyper
//!
//! Exhaustive discrete search over candidate allele sizes `[0, S_max]` for
//! the genotype (one or two allele sizes) that maximizes
//! [`ShortRepeatLikelihood`]. Used when every allele at a locus is fully
//! observable by at least one read (the "short repeat" regime); the
//! IRR/depth-extrapolation regime is handled separately by
//! [`crate::irr_estimator::IRRAlleleEstimator`].
use rayon::prelude::*;

use crate::constants::{LOGLIK_CI_THRESHOLD, TIE_BREAK_TOLERANCE};
use crate::count_table::CountTable;
use crate::genotype::{size_tie_break, AlleleType, RepeatAllele, RepeatGenotype};
use crate::likelihood::ShortRepeatLikelihood;
use crate::params::GenotypingParameters;

pub struct ShortRepeatGenotyper<'a> {
    params: &'a GenotypingParameters,
}

impl<'a> ShortRepeatGenotyper<'a> {
    pub fn new(params: &'a GenotypingParameters) -> Self {
        Self { params }
    }

    fn allele_type_for(&self, size: i32, spanning: &CountTable) -> AlleleType {
        if spanning.count_at(size) > 0 {
            AlleleType::Spanning
        } else {
            AlleleType::Flanking
        }
    }

    /// Search for the single allele size, among `candidates`, maximizing the
    /// likelihood of the observed evidence, with a confidence interval
    /// derived from sizes within [`LOGLIK_CI_THRESHOLD`] log-likelihood units
    /// of the maximum. `None` if `candidates` is empty or every candidate's
    /// log-likelihood is `-infinity` (no candidate explains the evidence at
    /// all).
    pub fn genotype_haploid(
        &self,
        spanning: &CountTable,
        flanking: &CountTable,
        candidates: &[i32],
    ) -> Option<RepeatAllele> {
        if candidates.is_empty() {
            return None;
        }
        let ll = ShortRepeatLikelihood::new(self.params);
        let logliks: Vec<(i32, f64)> = candidates
            .iter()
            .map(|&a| (a, ll.calc_log_lik(&[a], spanning, flanking)))
            .collect();

        let best_loglik = logliks
            .iter()
            .map(|(_, l)| *l)
            .fold(f64::NEG_INFINITY, f64::max);
        if best_loglik == f64::NEG_INFINITY {
            return None;
        }

        let best_size = logliks
            .iter()
            .filter(|(_, l)| (*l - best_loglik).abs() <= TIE_BREAK_TOLERANCE)
            .map(|(a, _)| *a)
            .min_by(|a, b| size_tie_break(&[*a], &[*b]))
            .expect("a finite best_loglik implies at least one candidate attains it");

        let ci = ci_from_logliks(&logliks, best_loglik);
        Some(RepeatAllele::new(
            best_size,
            self.allele_type_for(best_size, spanning),
            ci,
        ))
    }

    /// Search over all `(a1, a2)` pairs with `a1 <= a2` drawn from
    /// `candidates` for the diploid genotype maximizing the combined
    /// likelihood. `O(|candidates|^2)`, parallelized across the outer
    /// candidate via rayon. `None` under the same empty/degenerate
    /// conditions as [`Self::genotype_haploid`].
    pub fn genotype_diploid(
        &self,
        spanning: &CountTable,
        flanking: &CountTable,
        candidates: &[i32],
    ) -> Option<RepeatGenotype> {
        if candidates.is_empty() {
            return None;
        }
        let ll = ShortRepeatLikelihood::new(self.params);

        let rows: Vec<Vec<(i32, i32, f64)>> = (0..candidates.len())
            .into_par_iter()
            .map(|i| {
                let a1 = candidates[i];
                candidates[i..]
                    .iter()
                    .map(|&a2| {
                        let loglik = ll.calc_log_lik(&[a1, a2], spanning, flanking);
                        (a1, a2, loglik)
                    })
                    .collect()
            })
            .collect();

        let all: Vec<(i32, i32, f64)> = rows.into_iter().flatten().collect();

        let best_loglik = all
            .iter()
            .map(|(_, _, l)| *l)
            .fold(f64::NEG_INFINITY, f64::max);
        if best_loglik == f64::NEG_INFINITY {
            return None;
        }

        let (best_a1, best_a2) = all
            .iter()
            .filter(|(_, _, l)| (*l - best_loglik).abs() <= TIE_BREAK_TOLERANCE)
            .map(|(a1, a2, _)| (*a1, *a2))
            .min_by(|a, b| size_tie_break(&[a.0, a.1], &[b.0, b.1]))
            .expect("a finite best_loglik implies at least one pair attains it");

        let ci1 = profile_ci(&ll, spanning, flanking, candidates, best_a2, true, best_loglik);
        let ci2 = profile_ci(&ll, spanning, flanking, candidates, best_a1, false, best_loglik);

        let allele1 = RepeatAllele::new(best_a1, self.allele_type_for(best_a1, spanning), ci1);
        let allele2 = RepeatAllele::new(best_a2, self.allele_type_for(best_a2, spanning), ci2);
        Some(RepeatGenotype::diploid(allele1, allele2))
    }
}

/// Confidence interval as the smallest/largest candidate size whose
/// log-likelihood is within [`LOGLIK_CI_THRESHOLD`] of the maximum.
fn ci_from_logliks(logliks: &[(i32, f64)], best_loglik: f64) -> (i32, i32) {
    let within: Vec<i32> = logliks
        .iter()
        .filter(|(_, l)| best_loglik - *l <= LOGLIK_CI_THRESHOLD)
        .map(|(a, _)| *a)
        .collect();
    let lo = *within.iter().min().expect("best candidate is always within its own CI");
    let hi = *within.iter().max().expect("best candidate is always within its own CI");
    (lo, hi)
}

/// Profile-likelihood CI for one diploid allele: hold the other allele fixed
/// at its maximum-likelihood size and vary this one across `candidates`,
/// relative to the genotype's overall maximum log-likelihood.
fn profile_ci(
    ll: &ShortRepeatLikelihood,
    spanning: &CountTable,
    flanking: &CountTable,
    candidates: &[i32],
    other_fixed: i32,
    varying_is_first: bool,
    overall_best_loglik: f64,
) -> (i32, i32) {
    let logliks: Vec<(i32, f64)> = candidates
        .iter()
        .map(|&a| {
            let sizes = if varying_is_first {
                [a, other_fixed]
            } else {
                [other_fixed, a]
            };
            (a, ll.calc_log_lik(&sizes, spanning, flanking))
        })
        .collect();
    ci_from_logliks(&logliks, overall_best_loglik)
}
