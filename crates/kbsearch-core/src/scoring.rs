//! Aggregation of per-clause scores into one document score.

/// Combines the scores a document earned from each top-level query clause.
///
/// `clause_scores[i]` is `None` when the document did not match clause `i`.
pub trait ScoringPolicy: Send + Sync {
    fn combine(&self, clause_scores: &[Option<f32>]) -> f32;
}

/// OR-group coordination: the summed score is scaled by
/// `(1 - c) + c * matched / total`, so a document matching few of the
/// clauses keeps only a small share of its raw score.
#[derive(Debug, Clone, Copy)]
pub struct Coordination {
    coefficient: f32,
}

impl Coordination {
    pub fn new(coefficient: f32) -> Self {
        Self { coefficient: coefficient.clamp(0.0, 1.0) }
    }

    pub fn coefficient(&self) -> f32 {
        self.coefficient
    }
}

impl Default for Coordination {
    fn default() -> Self {
        Self::new(0.99)
    }
}

impl ScoringPolicy for Coordination {
    fn combine(&self, clause_scores: &[Option<f32>]) -> f32 {
        if clause_scores.is_empty() {
            return 0.0;
        }
        let matched = clause_scores.iter().flatten().count();
        let sum: f32 = clause_scores.iter().flatten().sum();
        let fraction = matched as f32 / clause_scores.len() as f32;
        sum * ((1.0 - self.coefficient) + self.coefficient * fraction)
    }
}

/// Round a raw engine score to the 4 decimals exposed to callers.
pub fn round_score(score: f32) -> f64 {
    (f64::from(score) * 10_000.0).round() / 10_000.0
}
