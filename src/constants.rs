//! # Design constants
//!
//! Calibration constants referenced throughout the genotyping core. Each one
//! corresponds to a "design constant" called out explicitly in the
//! statistical contracts this crate implements; see DESIGN.md for where each
//! value comes from.

/// Decay rate of the two-sided geometric error kernel used by
/// [`crate::emission::AlleleEmissionModel`]. See DESIGN.md §4.1.
pub const ERROR_KERNEL_DECAY_RATE: f64 = 0.5;

/// Log-likelihood drop (relative to the maximum) within which a candidate
/// short-repeat allele size is still included in a confidence interval.
/// `-ln(0.05)`.
pub const LOGLIK_CI_THRESHOLD: f64 = 2.995_732_273_553_991;

/// Log-likelihood drop within which a candidate IRR allele size is still
/// included in a confidence interval: half of the chi-squared(df=1) 0.05
/// critical value (3.841...), i.e. a likelihood-ratio-test threshold.
pub const IRR_CI_CHI2_THRESHOLD: f64 = 1.92;

/// Significance level for the binomial-tail flanking-allele confidence
/// interval.
pub const FLANKING_CI_ALPHA: f64 = 0.05;

/// Absolute tolerance within which two candidate log-likelihoods are
/// considered tied during genotype search.
pub const TIE_BREAK_TOLERANCE: f64 = 1e-9;

/// `haplotypeDepth / DEPTH_THRESHOLD_DIVISOR`, rounded up, is the minimum
/// number of full-length repeat reads required before the dispatcher
/// considers an allele to be in-repeat (IRR-supported) rather than short.
pub const DEPTH_THRESHOLD_DIVISOR: f64 = 4.0;
