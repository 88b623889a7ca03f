//! # Genotype and allele types
//!
//! The output data model: a `RepeatGenotype` is one or two `RepeatAllele`s,
//! each carrying the evidence type that supported it and a confidence
//! interval on its size.
use std::cmp::Ordering;
use std::fmt;

/// How an allele's size was supported by the read evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum AlleleType {
    /// Size determined from reads that span the whole repeat.
    Spanning,
    /// Size determined from reads anchored on one side of the repeat only;
    /// the true size is a lower bound on the apparent size.
    Flanking,
    /// Size determined by extrapolating read depth of fully-in-repeat reads.
    InRepeat,
}

impl fmt::Display for AlleleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlleleType::Spanning => "SPANNING",
            AlleleType::Flanking => "FLANKING",
            AlleleType::InRepeat => "INREPEAT",
        };
        write!(f, "{s}")
    }
}

/// One called allele: a size in repeat units, the evidence type that
/// produced it, and an inclusive confidence interval `[lo, hi]` on the size.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RepeatAllele {
    pub size: i32,
    pub allele_type: AlleleType,
    pub ci: (i32, i32),
}

impl RepeatAllele {
    pub fn new(size: i32, allele_type: AlleleType, ci: (i32, i32)) -> Self {
        debug_assert!(ci.0 <= size && size <= ci.1, "size must lie within its own CI");
        Self {
            size,
            allele_type,
            ci,
        }
    }
}

impl fmt::Display for RepeatAllele {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}-{}]", self.size, self.ci.0, self.ci.1)
    }
}

/// A called genotype: either one allele (haploid loci) or two (diploid loci,
/// always stored in ascending order of size so that structural equality is
/// order-independent).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum RepeatGenotype {
    Haploid(RepeatAllele),
    Diploid(RepeatAllele, RepeatAllele),
}

impl RepeatGenotype {
    /// Build a diploid genotype, sorting the two alleles ascending by size
    /// so that `diploid(a, b) == diploid(b, a)`.
    pub fn diploid(a: RepeatAllele, b: RepeatAllele) -> Self {
        if a.size <= b.size {
            RepeatGenotype::Diploid(a, b)
        } else {
            RepeatGenotype::Diploid(b, a)
        }
    }

    pub fn haploid(a: RepeatAllele) -> Self {
        RepeatGenotype::Haploid(a)
    }

    /// The allele sizes, ascending, as a slice-friendly vector.
    pub fn sizes(&self) -> Vec<i32> {
        match self {
            RepeatGenotype::Haploid(a) => vec![a.size],
            RepeatGenotype::Diploid(a, b) => vec![a.size, b.size],
        }
    }

    pub fn alleles(&self) -> Vec<&RepeatAllele> {
        match self {
            RepeatGenotype::Haploid(a) => vec![a],
            RepeatGenotype::Diploid(a, b) => vec![a, b],
        }
    }
}

impl fmt::Display for RepeatGenotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepeatGenotype::Haploid(a) => write!(f, "{a}"),
            RepeatGenotype::Diploid(a, b) => write!(f, "{a}/{b}"),
        }
    }
}

/// Tie-breaking comparator for candidate genotype sizes: prefer the smaller
/// single size, then lexicographically smaller pair. Used by the
/// short-repeat genotyper's search.
pub fn size_tie_break(a: &[i32], b: &[i32]) -> Ordering {
    a.cmp(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allele(size: i32) -> RepeatAllele {
        RepeatAllele::new(size, AlleleType::Spanning, (size, size))
    }

    #[test]
    fn diploid_sorts_ascending_regardless_of_input_order() {
        let g1 = RepeatGenotype::diploid(allele(7), allele(3));
        let g2 = RepeatGenotype::diploid(allele(3), allele(7));
        assert_eq!(g1, g2);
        assert_eq!(g1.sizes(), vec![3, 7]);
    }

    #[test]
    fn display_formats_diploid_as_slash_pair() {
        let g = RepeatGenotype::diploid(allele(3), allele(7));
        assert_eq!(format!("{g}"), "3[3-3]/7[7-7]");
    }

    #[test]
    fn display_formats_haploid_single() {
        let g = RepeatGenotype::haploid(allele(5));
        assert_eq!(format!("{g}"), "5[5-5]");
    }

    #[test]
    fn tie_break_prefers_lexicographically_smaller() {
        assert_eq!(size_tie_break(&[3, 7], &[3, 8]), Ordering::Less);
        assert_eq!(size_tie_break(&[2, 9], &[3, 1]), Ordering::Less);
    }

    proptest::proptest! {
        #[test]
        fn diploid_is_order_independent_for_any_pair(a in 0i32..60, b in 0i32..60) {
            let g1 = RepeatGenotype::diploid(allele(a), allele(b));
            let g2 = RepeatGenotype::diploid(allele(b), allele(a));
            proptest::prop_assert_eq!(g1, g2);
        }

        #[test]
        fn diploid_sizes_are_always_ascending(a in 0i32..60, b in 0i32..60) {
            let g = RepeatGenotype::diploid(allele(a), allele(b));
            let sizes = g.sizes();
            proptest::prop_assert!(sizes[0] <= sizes[1]);
        }
    }
}
