//! # Flanking-allele estimator
//!
//! Estimates an allele size from flanking reads alone: reads anchored on one
//! side of the repeat whose apparent size is a lower bound (never an exact
//! measurement) on the true allele size. Used by the dispatcher when no
//! spanning read confirms a size directly.
use statrs::distribution::{Binomial, ContinuousCDF};

use crate::constants::FLANKING_CI_ALPHA;
use crate::count_table::CountTable;
use crate::genotype::{AlleleType, RepeatAllele};
use crate::params::GenotypingParameters;

pub struct FlankingAlleleEstimator<'a> {
    params: &'a GenotypingParameters,
}

impl<'a> FlankingAlleleEstimator<'a> {
    pub fn new(params: &'a GenotypingParameters) -> Self {
        Self { params }
    }

    /// Smallest `m` such that, under a fair binomial split of
    /// `round(haplotypeDepth)` reads across two haplotypes, observing `m` or
    /// more reads supporting the same size by chance has probability at most
    /// [`FLANKING_CI_ALPHA`]. A flanking size backed by at least this many
    /// reads is unlikely to be sequencing noise.
    fn binomial_tail_threshold(&self) -> u64 {
        let n = self.params.haplotype_depth.round().max(0.0) as u64;
        if n == 0 {
            return 0;
        }
        let dist = match Binomial::new(0.5, n) {
            Ok(dist) => dist,
            Err(_) => return n,
        };
        for m in 0..=n {
            let p_at_least = if m == 0 {
                1.0
            } else {
                1.0 - dist.cdf((m - 1) as f64)
            };
            if p_at_least <= FLANKING_CI_ALPHA {
                return m;
            }
        }
        n
    }

    /// Estimate a single allele size from flanking evidence, or `None` if
    /// `flanking` carries no reads at all.
    pub fn estimate(&self, flanking: &CountTable) -> Option<RepeatAllele> {
        if flanking.is_empty() {
            return None;
        }
        let s_max = self.params.max_num_units_in_read;

        let point = flanking
            .iter()
            .map(|(size, _)| size)
            .filter(|&size| flanking.cumulative_at_least(size) > 1)
            .max()
            .unwrap_or_else(|| flanking.max_size().expect("checked non-empty above"));

        let threshold = self.binomial_tail_threshold();
        let lo = flanking
            .iter()
            .map(|(size, _)| size)
            .filter(|&size| u64::from(flanking.cumulative_at_least(size)) >= threshold)
            .max()
            .unwrap_or(point)
            .min(point);

        let ci = (lo, s_max.max(point));
        Some(RepeatAllele::new(point, AlleleType::Flanking, ci))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

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

    fn table(entries: &[(i32, u32)]) -> CountTable {
        let mut raw = BTreeMap::new();
        for &(size, count) in entries {
            raw.insert(size, count);
        }
        CountTable::from_map(raw).unwrap()
    }

    #[test]
    fn no_evidence_yields_no_estimate() {
        let p = params();
        let est = FlankingAlleleEstimator::new(&p);
        assert!(est.estimate(&CountTable::empty()).is_none());
    }

    #[test]
    fn point_estimate_is_largest_well_supported_size() {
        let p = params();
        let est = FlankingAlleleEstimator::new(&p);
        let flanking = table(&[(10, 5), (15, 20), (16, 1)]);
        let allele = est.estimate(&flanking).unwrap();
        assert_eq!(allele.size, 15);
        assert_eq!(allele.allele_type, AlleleType::Flanking);
    }

    #[test]
    fn single_lone_read_falls_back_to_its_own_size() {
        let p = params();
        let est = FlankingAlleleEstimator::new(&p);
        let flanking = table(&[(5, 1)]);
        let allele = est.estimate(&flanking).unwrap();
        assert_eq!(allele.size, 5);
    }

    #[test]
    fn ci_upper_bound_is_always_s_max() {
        let p = params();
        let est = FlankingAlleleEstimator::new(&p);
        let flanking = table(&[(10, 30)]);
        let allele = est.estimate(&flanking).unwrap();
        assert_eq!(allele.ci.1, p.max_num_units_in_read);
    }

    #[test]
    fn ci_contains_point_estimate() {
        let p = params();
        let est = FlankingAlleleEstimator::new(&p);
        let flanking = table(&[(8, 2), (12, 25)]);
        let allele = est.estimate(&flanking).unwrap();
        assert!(allele.ci.0 <= allele.size && allele.size <= allele.ci.1);
    }
}
