//! Query placement: lane-parallel scoring of every (query, edge) pair and
//! full-precision re-alignment to the best edge.

mod driver;
mod extract;
mod kernel;
mod types;

pub use driver::{calc_scores, check_score_range};
pub use extract::{
    align_best_scores, align_to_edge, AlignedQuery, ColumnQuality, ExtendedAlignment,
    INSERT_QUALITY, PAD_QUALITY,
};
pub use types::{Candidate, CandidateList, ScoreParams, ScoringResult, ScoringResults};

#[cfg(test)]
mod tests;
