use crate::error::{PaparaError, PaparaResult};
use std::fmt;
use std::str::FromStr;

/// Affine gap scoring for query placement.
///
/// A gap of length `L` costs `gap_open + (L - 1) * gap_extend`; a match
/// (intersecting state sets) scores `match_score`, a mismatch 0. Gapping the
/// query at a consensus-gap column scores `match_cgap` instead of a gap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoreParams {
    pub gap_open: i32,
    pub gap_extend: i32,
    pub match_score: i32,
    pub match_cgap: i32,
}

impl Default for ScoreParams {
    fn default() -> Self {
        Self {
            gap_open: -3,
            gap_extend: -1,
            match_score: 2,
            match_cgap: -3,
        }
    }
}

/// Largest |weight| accepted at all; keeps every weight representable in
/// 16-bit lanes.
const MAX_WEIGHT: i32 = 10_000;

impl ScoreParams {
    pub fn new(gap_open: i32, gap_extend: i32, match_score: i32, match_cgap: i32) -> Self {
        Self {
            gap_open,
            gap_extend,
            match_score,
            match_cgap,
        }
    }

    pub fn validate(&self) -> PaparaResult<()> {
        if self.max_abs_weight() > MAX_WEIGHT {
            return Err(PaparaError::InvalidScoring {
                msg: format!("weights must lie within +-{MAX_WEIGHT}, got {self}"),
            });
        }
        Ok(())
    }

    pub fn max_abs_weight(&self) -> i32 {
        [
            self.gap_open,
            self.gap_extend,
            self.match_score,
            self.match_cgap,
        ]
        .iter()
        .map(|w| w.abs())
        .max()
        .unwrap_or(0)
    }

    /// True when the 8-bit tier can score with these weights: every weight
    /// fits in `i8` and nothing but a match raises a score.
    pub fn fits_fast_tier(&self) -> bool {
        let fits = |w: i32| (i8::MIN as i32..=i8::MAX as i32).contains(&w);
        self.gap_open <= 0
            && self.gap_extend <= 0
            && self.match_cgap <= 0
            && self.match_score >= 0
            && fits(self.gap_open)
            && fits(self.gap_extend)
            && fits(self.match_score)
            && fits(self.match_cgap)
    }

    /// Cost of a gap of `len` positions.
    pub fn gap_cost(&self, len: usize) -> i32 {
        if len == 0 {
            0
        } else {
            self.gap_open + (len as i32 - 1) * self.gap_extend
        }
    }
}

impl fmt::Display for ScoreParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.gap_open, self.gap_extend, self.match_score, self.match_cgap
        )
    }
}

/// Parses `open:extend:match:match_cgap`.
impl FromStr for ScoreParams {
    type Err = PaparaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.trim().split(':').collect();
        if fields.len() != 4 {
            return Err(PaparaError::InvalidScoring {
                msg: format!("expected open:extend:match:match_cgap, got '{s}'"),
            });
        }
        let mut vals = [0i32; 4];
        for (slot, field) in vals.iter_mut().zip(&fields) {
            *slot = field
                .trim()
                .parse()
                .map_err(|_| PaparaError::InvalidScoring {
                    msg: format!("'{field}' is not an integer weight"),
                })?;
        }
        let params = Self::new(vals[0], vals[1], vals[2], vals[3]);
        params.validate()?;
        Ok(params)
    }
}

/// One scored placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub edge: usize,
    pub score: i32,
}

/// Best `capacity` placements of one query, best first.
///
/// Equal scores keep the order in which they were inserted; when full, the
/// last entry is evicted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CandidateList {
    capacity: usize,
    entries: Vec<Candidate>,
}

impl CandidateList {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, edge: usize, score: i32) {
        if self.capacity == 0 {
            return;
        }
        // first slot holding a strictly lower score
        let pos = self.entries.partition_point(|c| c.score >= score);
        if pos >= self.capacity {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop();
        }
        self.entries.insert(pos, Candidate { edge, score });
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Candidate] {
        &self.entries
    }
}

/// Placement result of one query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoringResult {
    pub best_score: i32,
    /// Lowest edge id among the edges reaching `best_score`.
    pub best_edge: usize,
    pub candidates: CandidateList,
}

impl ScoringResult {
    pub fn new(num_candidates: usize) -> Self {
        Self {
            best_score: i32::MIN,
            best_edge: usize::MAX,
            candidates: CandidateList::new(num_candidates),
        }
    }

    pub fn is_placed(&self) -> bool {
        self.best_edge != usize::MAX
    }

    /// Records the score of `edge`. Edges must arrive in increasing order.
    pub fn offer(&mut self, edge: usize, score: i32) {
        if score > self.best_score {
            self.best_score = score;
            self.best_edge = edge;
        }
        self.candidates.insert(edge, score);
    }
}

/// Per-query results in query order, plus driver counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScoringResults {
    pub results: Vec<ScoringResult>,
    /// Lanes scored by the 8-bit tier and accepted.
    pub fast_lanes: usize,
    /// Lanes recomputed in 16-bit after saturating, or that skipped the
    /// 8-bit tier.
    pub wide_lanes: usize,
}

impl ScoringResults {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, query: usize) -> &ScoringResult {
        &self.results[query]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoringResult> {
        self.results.iter()
    }
}
