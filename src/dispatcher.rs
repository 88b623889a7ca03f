//! # Repeat genotyper dispatcher
//!
//! The top-level entry point: given the three count tables of evidence at a
//! locus (spanning, flanking, in-repeat) and [`GenotypingParameters`],
//! classifies the evidence and routes it to the short-repeat genotyper, the
//! IRR estimator, the flanking estimator, or a combination of them.
use log::{debug, trace};

use crate::constants::DEPTH_THRESHOLD_DIVISOR;
use crate::count_table::CountTable;
use crate::flanking_estimator::FlankingAlleleEstimator;
use crate::genotype::RepeatGenotype;
use crate::irr_estimator::IRRAlleleEstimator;
use crate::params::{AlleleCount, GenotypingParameters};
use crate::short_repeat_genotyper::ShortRepeatGenotyper;

/// Which evidence regime applies to a diploid locus, decided once from the
/// read counts before any of the per-regime estimators run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Classification {
    /// Enough full-length repeat-spanning reads to support two IRR-typed
    /// alleles.
    BothInRepeat,
    /// Enough full-length reads to support one IRR-typed allele, with the
    /// other short enough to resolve from spanning/flanking evidence.
    OneInRepeatOneShort,
    /// No spanning evidence at all; only flanking reads are available.
    BothFlanking,
    /// Neither allele needs IRR evidence. Resolved from spanning/flanking
    /// evidence alone, which further splits at runtime into either two
    /// short alleles or one short allele plus a residual-flanking-supported
    /// second allele.
    ShortRegime,
}

/// Owns the evidence for a single locus and dispatches it to the right
/// genotyping regime.
pub struct RepeatGenotyper<'a> {
    params: &'a GenotypingParameters,
    spanning: CountTable,
    flanking: CountTable,
    irr: CountTable,
}

impl<'a> RepeatGenotyper<'a> {
    pub fn new(
        params: &'a GenotypingParameters,
        spanning: CountTable,
        flanking: CountTable,
        irr: CountTable,
    ) -> Self {
        Self {
            params,
            spanning,
            flanking,
            irr,
        }
    }

    /// Minimum number of full-length repeat reads required before an allele
    /// is considered IRR-supported rather than short.
    fn depth_threshold(&self) -> u32 {
        (self.params.haplotype_depth / DEPTH_THRESHOLD_DIVISOR).ceil() as u32
    }

    /// Full-length repeat read count, folding in flanking reads pinned at
    /// `S_max`: a flanking read whose apparent size already saturates the
    /// read length carries the same evidentiary weight as an in-repeat
    /// read.
    fn full_length_repeat_reads(&self) -> u32 {
        self.irr.total() + self.flanking.count_at(self.params.max_num_units_in_read)
    }

    /// Flanking evidence below the saturation ceiling: this is the evidence
    /// that actually informs a *short* allele's size, since a flanking read
    /// pinned at `S_max` has already been folded into the in-repeat count.
    fn sub_saturation_flanking(&self) -> CountTable {
        self.flanking
            .filter_sizes(|size| size < self.params.max_num_units_in_read)
    }

    /// Genotype the locus against `candidate_sizes`, or `None` if no
    /// evidence of any kind was observed, `candidate_sizes` is empty, or
    /// every sub-genotyper dispatched to turned out to be degenerate (no
    /// candidate explains the observed evidence at all).
    pub fn genotype_repeat(&self, candidate_sizes: &[i32]) -> Option<RepeatGenotype> {
        if self.spanning.is_empty() && self.flanking.is_empty() && self.irr.is_empty() {
            debug!("no spanning, flanking, or in-repeat evidence; declining to genotype");
            return None;
        }
        if candidate_sizes.is_empty() {
            debug!("no candidate allele sizes supplied; declining to genotype");
            return None;
        }

        let threshold = self.depth_threshold();
        let full_length_reads = self.full_length_repeat_reads();
        let sub_flanking = self.sub_saturation_flanking();

        match self.params.expected_allele_count {
            AlleleCount::Haploid => {
                self.genotype_haploid_locus(full_length_reads, threshold, &sub_flanking, candidate_sizes)
            }
            AlleleCount::Diploid => {
                self.genotype_diploid_locus(full_length_reads, threshold, &sub_flanking, candidate_sizes)
            }
        }
    }

    fn genotype_haploid_locus(
        &self,
        full_length_reads: u32,
        threshold: u32,
        sub_flanking: &CountTable,
        candidate_sizes: &[i32],
    ) -> Option<RepeatGenotype> {
        if full_length_reads >= threshold {
            trace!(
                "haploid locus: {full_length_reads} full-length reads >= threshold {threshold}, \
                 dispatching to IRR estimator"
            );
            let estimator = IRRAlleleEstimator::new(self.params);
            Some(RepeatGenotype::haploid(estimator.estimate(full_length_reads)))
        } else {
            trace!("haploid locus: dispatching to short-repeat genotyper");
            let genotyper = ShortRepeatGenotyper::new(self.params);
            let allele =
                genotyper.genotype_haploid(&self.spanning, sub_flanking, candidate_sizes)?;
            Some(RepeatGenotype::haploid(allele))
        }
    }

    /// Both alleles are in-repeat only when there is *no spanning evidence
    /// for a distinct short allele* — not merely "twice the depth
    /// threshold" worth of full-length reads. A locus with abundant IRRs but
    /// a real spanning cluster still has a short allele to resolve (one
    /// allele in-repeat, one short).
    fn classify_diploid(&self, full_length_reads: u32, threshold: u32) -> Classification {
        if full_length_reads >= threshold && self.spanning.is_empty() {
            Classification::BothInRepeat
        } else if full_length_reads >= threshold {
            Classification::OneInRepeatOneShort
        } else if self.spanning.is_empty() {
            Classification::BothFlanking
        } else {
            Classification::ShortRegime
        }
    }

    fn genotype_diploid_locus(
        &self,
        full_length_reads: u32,
        threshold: u32,
        sub_flanking: &CountTable,
        candidate_sizes: &[i32],
    ) -> Option<RepeatGenotype> {
        match self.classify_diploid(full_length_reads, threshold) {
            Classification::BothInRepeat => {
                debug!(
                    "diploid locus: {full_length_reads} full-length reads >= threshold \
                     {threshold} and no spanning evidence; both alleles in-repeat"
                );
                let estimator = IRRAlleleEstimator::new(self.params);
                let allele = estimator.estimate(full_length_reads);
                Some(RepeatGenotype::diploid(allele, allele))
            }
            Classification::OneInRepeatOneShort => {
                debug!(
                    "diploid locus: {full_length_reads} full-length reads >= threshold \
                     {threshold}, one allele in-repeat, one short"
                );
                let irr_estimator = IRRAlleleEstimator::new(self.params);
                let irr_allele = irr_estimator.estimate(full_length_reads);

                let short_genotyper = ShortRepeatGenotyper::new(self.params);
                match short_genotyper.genotype_haploid(&self.spanning, sub_flanking, candidate_sizes)
                {
                    Some(short_allele) => Some(RepeatGenotype::diploid(short_allele, irr_allele)),
                    None => {
                        trace!(
                            "diploid locus: short half of one-in-repeat-one-short was \
                             degenerate, falling back to both-in-repeat"
                        );
                        Some(RepeatGenotype::diploid(irr_allele, irr_allele))
                    }
                }
            }
            Classification::BothFlanking => {
                debug!("diploid locus: no spanning evidence, both alleles flanking-typed");
                let estimator = FlankingAlleleEstimator::new(self.params);
                match estimator.estimate(&self.flanking) {
                    Some(allele) => Some(RepeatGenotype::diploid(allele, allele)),
                    None => {
                        // Only flanking-at-S_max reads were present; they were
                        // folded into `full_length_reads` above, which fell
                        // short of even the single-allele threshold. Nothing
                        // left to resolve a size from.
                        let estimator = IRRAlleleEstimator::new(self.params);
                        let allele = estimator.estimate(full_length_reads);
                        Some(RepeatGenotype::diploid(allele, allele))
                    }
                }
            }
            Classification::ShortRegime => {
                let short_genotyper = ShortRepeatGenotyper::new(self.params);
                let short_allele = match short_genotyper.genotype_haploid(
                    &self.spanning,
                    sub_flanking,
                    candidate_sizes,
                ) {
                    Some(allele) => allele,
                    None => {
                        trace!(
                            "diploid locus: single-allele short search was degenerate, \
                             falling back to full diploid search"
                        );
                        return short_genotyper.genotype_diploid(
                            &self.spanning,
                            sub_flanking,
                            candidate_sizes,
                        );
                    }
                };

                // A single stray flanking read above the short allele's size is
                // noise, not evidence of a second, larger allele (the same
                // "not a single outlier" bar `FlankingAlleleEstimator` applies
                // to its own point estimate). Only a residual with more than
                // one supporting read trips the one-short-one-flanking branch;
                // otherwise this falls through to a full two-allele search.
                let residual = sub_flanking.filter_sizes(|size| size >= short_allele.size);
                if residual.total() > 1 {
                    trace!(
                        "diploid locus: one short allele resolved, residual flanking evidence \
                         implies a second, larger allele"
                    );
                    let flanking_estimator = FlankingAlleleEstimator::new(self.params);
                    let second_allele = flanking_estimator
                        .estimate(&residual)
                        .unwrap_or(short_allele);
                    Some(RepeatGenotype::diploid(short_allele, second_allele))
                } else {
                    trace!("diploid locus: both alleles short, running full diploid search");
                    short_genotyper.genotype_diploid(&self.spanning, sub_flanking, candidate_sizes)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn params(haplotype_depth: f64, allele_count: AlleleCount) -> GenotypingParameters {
        GenotypingParameters::new(haplotype_depth, allele_count, 3, 25, 0.97).unwrap()
    }

    fn table(entries: &[(i32, u32)]) -> CountTable {
        let mut raw = BTreeMap::new();
        for &(size, count) in entries {
            raw.insert(size, count);
        }
        CountTable::from_map(raw).unwrap()
    }

    fn candidates(p: &GenotypingParameters) -> Vec<i32> {
        (0..=p.max_num_units_in_read).collect()
    }

    #[test]
    fn no_evidence_declines_to_genotype() {
        let p = params(30.0, AlleleCount::Diploid);
        let genotyper = RepeatGenotyper::new(
            &p,
            CountTable::empty(),
            CountTable::empty(),
            CountTable::empty(),
        );
        assert!(genotyper.genotype_repeat(&candidates(&p)).is_none());
    }

    #[test]
    fn empty_candidates_declines_to_genotype() {
        let p = params(30.0, AlleleCount::Diploid);
        let spanning = table(&[(3, 20), (8, 20)]);
        let genotyper = RepeatGenotyper::new(&p, spanning, CountTable::empty(), CountTable::empty());
        assert!(genotyper.genotype_repeat(&[]).is_none());
    }

    #[test]
    fn clean_diploid_spanning_evidence_resolves_both_short() {
        let p = params(30.0, AlleleCount::Diploid);
        let spanning = table(&[(3, 20), (8, 20)]);
        let genotyper = RepeatGenotyper::new(&p, spanning, CountTable::empty(), CountTable::empty());
        let genotype = genotyper.genotype_repeat(&candidates(&p)).unwrap();
        assert_eq!(genotype.sizes(), vec![3, 8]);
    }

    #[test]
    fn heavy_irr_evidence_resolves_both_in_repeat() {
        let p = params(30.0, AlleleCount::Diploid);
        let irr = table(&[(25, 60)]);
        let genotyper = RepeatGenotyper::new(&p, CountTable::empty(), CountTable::empty(), irr);
        let genotype = genotyper.genotype_repeat(&candidates(&p)).unwrap();
        for allele in genotype.alleles() {
            assert_eq!(allele.allele_type, crate::genotype::AlleleType::InRepeat);
            assert!(allele.size >= p.max_num_units_in_read);
        }
    }

    #[test]
    fn mixed_short_and_saturated_genotype_has_finite_likelihood() {
        let p = params(30.0, AlleleCount::Diploid);
        let spanning = table(&[(5, 15)]);
        let irr = table(&[(25, 60)]);
        let genotyper = RepeatGenotyper::new(&p, spanning, CountTable::empty(), irr);
        let genotype = genotyper.genotype_repeat(&candidates(&p)).unwrap();
        let sizes = genotype.sizes();
        assert_eq!(sizes[0], 5);
        assert!(sizes[1] >= p.max_num_units_in_read);
    }

    #[test]
    fn haploid_locus_uses_single_allele_path() {
        let p = params(30.0, AlleleCount::Haploid);
        let spanning = table(&[(6, 25)]);
        let genotyper = RepeatGenotyper::new(&p, spanning, CountTable::empty(), CountTable::empty());
        let genotype = genotyper.genotype_repeat(&candidates(&p)).unwrap();
        assert_eq!(genotype.sizes(), vec![6]);
    }

    #[test]
    fn flanking_only_evidence_reports_homozygous_flanking_genotype() {
        let p = params(30.0, AlleleCount::Diploid);
        let flanking = table(&[(10, 5), (15, 20)]);
        let genotyper = RepeatGenotyper::new(&p, CountTable::empty(), flanking, CountTable::empty());
        let genotype = genotyper.genotype_repeat(&candidates(&p)).unwrap();
        let sizes = genotype.sizes();
        assert_eq!(sizes[0], sizes[1]);
        for allele in genotype.alleles() {
            assert_eq!(allele.allele_type, crate::genotype::AlleleType::Flanking);
        }
    }

    #[test]
    fn mixed_evidence_matching_reference_scenario_resolves_short_and_flanking_alleles() {
        // Mirrors the retrieved original test suite's mixed short+flanking
        // scenario: the diploid locus first resolves its stronger single
        // short allele, then treats the substantial residual flanking
        // evidence above it as support for a second, bigger allele.
        let p = params(30.0, AlleleCount::Diploid);
        let spanning = table(&[(3, 4), (5, 5)]);
        let flanking = table(&[(1, 2), (2, 3), (10, 3)]);
        let genotyper = RepeatGenotyper::new(&p, spanning, flanking, CountTable::empty());
        let genotype = genotyper.genotype_repeat(&candidates(&p)).unwrap();
        let sizes = genotype.sizes();
        assert_eq!(sizes[0], 5);
        assert!(sizes[1] >= 5);
    }
}
