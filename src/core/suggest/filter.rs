//! Confidence Filter
//!
//! Keeps only candidates whose score is an upper outlier: at least
//! `mean + k * stddev` over the whole result set. A query that names an
//! author tends to produce one or two phrases scoring far above the rest.

use super::types::Candidate;

/// Default outlier multiplier.
pub const DEFAULT_K: f64 = 2.0;

/// Summary statistics over a candidate set's scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreStats {
    pub len: usize,
    pub max: f64,
    pub min: f64,
    pub mean: f64,
    pub median: f64,
    /// Population variance
    pub variance: f64,
    pub stddev: f64,
    pub cutoff: f64,
}

impl ScoreStats {
    /// `None` for an empty slice.
    pub fn compute(scores: &[f64], k: f64) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }

        let len = scores.len();
        let n = len as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        let stddev = variance.sqrt();

        let mut sorted = scores.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Some(Self {
            len,
            max: sorted[len - 1],
            min: sorted[0],
            mean,
            median: sorted[(len - 1) / 2],
            variance,
            stddev,
            cutoff: mean + k * stddev,
        })
    }
}

impl std::fmt::Display for ScoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "len={} max={:.4} min={:.4} mean={:.4} median={:.4} variance={:.4} stddev={:.4} cutoff={:.4}",
            self.len, self.max, self.min, self.mean, self.median, self.variance, self.stddev, self.cutoff
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceFilter {
    k: f64,
}

impl Default for ConfidenceFilter {
    fn default() -> Self {
        Self { k: DEFAULT_K }
    }
}

impl ConfidenceFilter {
    pub fn new(k: f64) -> Self {
        Self { k }
    }

    pub fn k(&self) -> f64 {
        self.k
    }

    /// Confident candidates in retrieval order, at most `max_count`.
    ///
    /// Candidates are expected best first, as the backend sorts by score.
    /// The walk stops at the first one below the cutoff.
    pub fn filter(&self, candidates: &[Candidate], max_count: usize) -> Vec<Candidate> {
        self.filter_with_stats(candidates, max_count).0
    }

    /// Like [`filter`](Self::filter), also returning the statistics the
    /// cutoff was derived from. Non-finite scores are ignored.
    pub fn filter_with_stats(
        &self,
        candidates: &[Candidate],
        max_count: usize,
    ) -> (Vec<Candidate>, Option<ScoreStats>) {
        let scored: Vec<&Candidate> = candidates.iter().filter(|c| c.score.is_finite()).collect();
        if scored.len() < candidates.len() {
            log::debug!(
                "ignoring {} candidate(s) with non-finite scores",
                candidates.len() - scored.len()
            );
        }

        let scores: Vec<f64> = scored.iter().map(|c| c.score).collect();
        let Some(stats) = ScoreStats::compute(&scores, self.k) else {
            return (Vec::new(), None);
        };

        let confident = scored
            .into_iter()
            .take_while(|c| c.score >= stats.cutoff)
            .take(max_count)
            .cloned()
            .collect();

        (confident, Some(stats))
    }
}
