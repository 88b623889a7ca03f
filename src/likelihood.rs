//! # Short-repeat likelihood
//!
//! Combines per-allele [`AlleleEmissionModel`]s into a log-likelihood for a
//! candidate genotype (one or two allele sizes) against observed spanning
//! and flanking read evidence. All calculations stay in log-space; a
//! genotype that cannot explain any observed read at all gets `-infinity`
//! rather than panicking or silently dropping evidence.
use crate::count_table::CountTable;
use crate::emission::AlleleEmissionModel;
use crate::params::GenotypingParameters;

/// Computes spanning- and flanking-read log-likelihoods for candidate
/// genotypes at a single locus, given fixed [`GenotypingParameters`].
pub struct ShortRepeatLikelihood<'a> {
    params: &'a GenotypingParameters,
}

impl<'a> ShortRepeatLikelihood<'a> {
    pub fn new(params: &'a GenotypingParameters) -> Self {
        Self { params }
    }

    fn emission_models(&self, genotype_sizes: &[i32]) -> Vec<AlleleEmissionModel> {
        genotype_sizes
            .iter()
            .map(|&a| {
                AlleleEmissionModel::new(
                    self.params.saturate(a),
                    self.params.max_num_units_in_read,
                    self.params.prop_correct_molecules,
                )
            })
            .collect()
    }

    /// Log-likelihood of `table`'s spanning-read observations under a
    /// genotype with the given allele sizes. A spanning read of size `k`
    /// comes, with equal probability, from either haplotype; its probability
    /// under the genotype is the average of each allele's emission
    /// probability for `k`.
    pub fn calc_spanning_loglik(&self, genotype_sizes: &[i32], table: &CountTable) -> f64 {
        let models = self.emission_models(genotype_sizes);
        Self::table_loglik(table, &models, Self::spanning_prob)
    }

    /// Log-likelihood of `table`'s flanking-read observations under a
    /// genotype with the given allele sizes. A flanking read of apparent
    /// size `k` extends into, but not through, the repeat: it is consistent
    /// with any true allele size `>= k + 1`, so its per-allele probability is
    /// that allele's `prop_at_least(k + 1)`. One exception: a flanking read
    /// pinned at `S_max` couldn't have reported anything larger even if the
    /// true allele is bigger, so nothing beyond `S_max` is representable and
    /// `prop_at_least(k + 1)` degenerates to `prop_at_least(S_max)` for every
    /// allele, saturated or not.
    pub fn calc_flanking_loglik(&self, genotype_sizes: &[i32], table: &CountTable) -> f64 {
        let models = self.emission_models(genotype_sizes);
        Self::table_loglik(table, &models, Self::flanking_prob)
    }

    /// Combined spanning + flanking log-likelihood for a genotype. `-inf` if
    /// either component is `-inf`.
    pub fn calc_log_lik(
        &self,
        genotype_sizes: &[i32],
        spanning: &CountTable,
        flanking: &CountTable,
    ) -> f64 {
        let models = self.emission_models(genotype_sizes);
        let spanning_ll = Self::table_loglik(spanning, &models, Self::spanning_prob);
        if spanning_ll == f64::NEG_INFINITY {
            return f64::NEG_INFINITY;
        }
        let flanking_ll = Self::table_loglik(flanking, &models, Self::flanking_prob);
        spanning_ll + flanking_ll
    }

    fn table_loglik(
        table: &CountTable,
        models: &[AlleleEmissionModel],
        prob_fn: impl Fn(&AlleleEmissionModel, i32) -> f64,
    ) -> f64 {
        let n = models.len() as f64;
        let mut loglik = 0.0;
        for (size, count) in table.iter() {
            let p = models.iter().map(|m| prob_fn(m, size)).sum::<f64>() / n;
            if p <= 0.0 {
                return f64::NEG_INFINITY;
            }
            loglik += f64::from(count) * p.ln();
        }
        loglik
    }

    fn spanning_prob(model: &AlleleEmissionModel, k: i32) -> f64 {
        model.prop_of_given_size(k)
    }

    fn flanking_prob(model: &AlleleEmissionModel, k: i32) -> f64 {
        let s_max = model.s_max();
        if k == s_max {
            model.prop_at_least(s_max)
        } else {
            model.prop_at_least(k + 1)
        }
    }
}
