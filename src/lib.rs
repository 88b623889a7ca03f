//! # strcore
//!
//! Statistical repeat genotyping core for short tandem repeat (STR) analysis
//! from short-read sequencing evidence. Given tabulated counts of spanning,
//! flanking, and in-repeat reads at a candidate locus, infers a haploid or
//! diploid genotype — one or two repeat-unit allele sizes, each with a
//! confidence interval.
//!
//! This crate is a pure function from count evidence to an optional
//! genotype: it does not read alignment files, classify reads, or emit
//! VCF/JSON. Those concerns belong to external collaborators; see
//! [`RepeatGenotyper`] for the single entry point this crate exposes.
pub mod constants;
pub mod count_table;
pub mod dispatcher;
pub mod emission;
pub mod flanking_estimator;
pub mod genotype;
pub mod irr_estimator;
pub mod likelihood;
pub mod params;
pub mod short_repeat_genotyper;

pub use count_table::CountTable;
pub use dispatcher::RepeatGenotyper;
pub use emission::AlleleEmissionModel;
pub use genotype::{AlleleType, RepeatAllele, RepeatGenotype};
pub use params::{AlleleCount, GenotypingParameters};
