//! # Genotyping parameters
//!
//! Process-wide, immutable-per-call parameters that configure every other
//! component in this crate: a small, serde-friendly struct the caller builds
//! once per locus (or once per sample, for the depth/ploidy fields) and
//! passes down.
use anyhow::{bail, Result};

/// Expected ploidy at a locus. `Haploid` for e.g. chrX/chrY in males,
/// `Diploid` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AlleleCount {
    Haploid,
    Diploid,
}

/// Parameters shared by every component in this crate for a single
/// genotyping call.
///
/// Constructed via [`GenotypingParameters::new`], which validates that all
/// fields are physically sensible; malformed parameters are a programmer
/// error (bad config, not bad sequencing data) and are rejected at
/// construction rather than deep inside a likelihood calculation.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GenotypingParameters {
    /// Expected read depth per haplotype at this locus.
    pub haplotype_depth: f64,
    /// Whether this locus is expected to carry one or two alleles.
    pub expected_allele_count: AlleleCount,
    /// Length, in bases, of the repeat unit (motif).
    pub repeat_unit_len: i32,
    /// Saturation ceiling on observable allele sizes: `floor(read_len /
    /// repeat_unit_len)`.
    pub max_num_units_in_read: i32,
    /// Probability that a molecule correctly reports its true size.
    pub prop_correct_molecules: f64,
}

impl GenotypingParameters {
    pub fn new(
        haplotype_depth: f64,
        expected_allele_count: AlleleCount,
        repeat_unit_len: i32,
        max_num_units_in_read: i32,
        prop_correct_molecules: f64,
    ) -> Result<Self> {
        if haplotype_depth < 0.0 {
            bail!("haplotype_depth must be non-negative, got {haplotype_depth}");
        }
        if repeat_unit_len < 1 {
            bail!("repeat_unit_len must be at least 1, got {repeat_unit_len}");
        }
        if max_num_units_in_read <= 0 {
            bail!(
                "max_num_units_in_read must be positive, got {max_num_units_in_read}"
            );
        }
        if !(prop_correct_molecules > 0.0 && prop_correct_molecules <= 1.0) {
            bail!(
                "prop_correct_molecules must be in (0, 1], got {prop_correct_molecules}"
            );
        }

        Ok(Self {
            haplotype_depth,
            expected_allele_count,
            repeat_unit_len,
            max_num_units_in_read,
            prop_correct_molecules,
        })
    }

    /// Saturate an allele size to the `[0, S_max]` range the emission model
    /// operates over.
    pub fn saturate(&self, allele_size: i32) -> i32 {
        allele_size.clamp(0, self.max_num_units_in_read)
    }
}
