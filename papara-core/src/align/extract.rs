//! Full-precision DP with traceback for the chosen edge of every query.
//!
//! Profile columns are indexed by `i`, query residues by `j`. In the
//! traceback, `Q` is a query gap (a reference column with no residue) and
//! `I` a query residue inserted between reference columns.

use super::types::{ScoreParams, ScoringResults};
use crate::alphabets::StateSet;
use crate::config::PaparaConfig;
use crate::error::{PaparaError, PaparaResult};
use crate::queries::Queries;
use crate::refs::{EdgeProfile, References};
use crate::runlog::RunLog;
use std::time::Instant;

// Bits 0-1: H direction
const DIR_DIAG: u8 = 0;
const DIR_INS: u8 = 1; // I, query residue inserted
const DIR_DEL: u8 = 2; // Q, reference column gapped in the query

// I/Q traceback: set when the state was extended rather than opened.
const TRACE_I_EXT: u8 = 1 << 2;
const TRACE_Q_EXT: u8 = 1 << 3;

/// Placement state of one output column for one query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnQuality {
    Match,
    Mismatch,
    Gap,
    /// Gap in a consensus-gap column.
    CgapGap,
}

impl ColumnQuality {
    pub fn as_char(self) -> u8 {
        match self {
            ColumnQuality::Match => b'M',
            ColumnQuality::Mismatch => b'x',
            ColumnQuality::Gap => b'-',
            ColumnQuality::CgapGap => b'c',
        }
    }
}

/// Quality character of an inserted residue.
pub const INSERT_QUALITY: u8 = b'I';
/// Quality character of padding in an insertion slot.
pub const PAD_QUALITY: u8 = b'.';

/// One query aligned to the reference columns of its best edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlignedQuery {
    pub query: usize,
    pub edge: usize,
    pub score: i32,
    /// Residue or `-` for every reference column.
    pub columns: Vec<u8>,
    /// `insertions[s]`: residues placed before reference column `s`
    /// (`s == columns.len()` is after the last column).
    pub insertions: Vec<Vec<u8>>,
    pub quality: Vec<ColumnQuality>,
}

impl AlignedQuery {
    pub fn num_inserted(&self) -> usize {
        self.insertions.iter().map(Vec::len).sum()
    }
}

/// Result of [`dp_traceback`] before rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ScalarDp {
    pub score: i32,
    /// Operations from the first column to the last.
    pub ops: Vec<AlignOp>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AlignOp {
    /// Column `col` holds query residue `res`.
    Pair { col: usize, res: usize },
    /// Column `col` has no query residue.
    Gap { col: usize },
    /// Query residue `res` sits in slot `slot`.
    Insert { slot: usize, res: usize },
}

/// Scalar affine-gap DP of `query` against `profile`, keeping the full
/// traceback. Scores match the lane kernel cell for cell.
pub(crate) fn dp_traceback(
    query: &[StateSet],
    profile: &EdgeProfile,
    params: &ScoreParams,
) -> ScalarDp {
    let m = query.len();
    let n = profile.len();
    let open = params.gap_open;
    let ext = params.gap_extend;
    let width = m + 1;

    let mut h_row: Vec<i32> = (0..=m).map(|j| params.gap_cost(j)).collect();
    let mut q_row: Vec<i32> = (0..=m).map(|j| params.gap_cost(j) + open - ext).collect();
    let mut trace = vec![0u8; (n + 1) * width];

    let mut best = i32::MIN;
    let mut end_col = 0;

    for i in 1..=n {
        let col = i - 1;
        let states = profile.states()[col];
        let is_cgap = profile.is_cgap(col);
        let mut h_diag = h_row[0];
        let mut h_left = 0;
        let mut i_val = open - ext;
        h_row[0] = 0;

        for j in 1..=m {
            let h_up = h_row[j];
            let mut bits = 0u8;

            let (q_val, q_ext) = if is_cgap {
                (h_up + params.match_cgap, false)
            } else {
                let q_open = h_up + open;
                let q_more = q_row[j] + ext;
                if q_more > q_open {
                    (q_more, true)
                } else {
                    (q_open, false)
                }
            };
            let i_open = h_left + open;
            let i_more = i_val + ext;
            let i_ext = i_more > i_open;
            i_val = if i_ext { i_more } else { i_open };

            let s = if query[j - 1] & states != 0 {
                params.match_score
            } else {
                0
            };
            // M > I > Q on ties
            let mut h = h_diag + s;
            let mut d = DIR_DIAG;
            if i_val > h {
                h = i_val;
                d = DIR_INS;
            }
            if q_val > h {
                h = q_val;
                d = DIR_DEL;
            }
            bits |= d;
            if i_ext {
                bits |= TRACE_I_EXT;
            }
            if q_ext {
                bits |= TRACE_Q_EXT;
            }
            trace[i * width + j] = bits;

            q_row[j] = q_val;
            h_row[j] = h;
            h_left = h;
            h_diag = h_up;
        }

        let last = if m == 0 { 0 } else { h_left };
        if last > best {
            best = last;
            end_col = i;
        }
    }

    let mut ops = Vec::with_capacity(n + m);
    for col in (end_col..n).rev() {
        ops.push(AlignOp::Gap { col });
    }

    enum State {
        H,
        I,
        Q,
    }
    let (mut i, mut j) = (end_col, m);
    let mut state = State::H;
    while j > 0 {
        if i == 0 {
            // leading query gap: everything left goes before the first column
            ops.push(AlignOp::Insert { slot: 0, res: j - 1 });
            j -= 1;
            continue;
        }
        let bits = trace[i * width + j];
        match state {
            State::H => match bits & 0b11 {
                DIR_DIAG => {
                    ops.push(AlignOp::Pair { col: i - 1, res: j - 1 });
                    i -= 1;
                    j -= 1;
                }
                DIR_INS => state = State::I,
                _ => state = State::Q,
            },
            State::I => {
                ops.push(AlignOp::Insert { slot: i, res: j - 1 });
                j -= 1;
                if bits & TRACE_I_EXT == 0 {
                    state = State::H;
                }
            }
            State::Q => {
                ops.push(AlignOp::Gap { col: i - 1 });
                i -= 1;
                if bits & TRACE_Q_EXT == 0 {
                    state = State::H;
                }
            }
        }
    }
    for col in (0..i).rev() {
        ops.push(AlignOp::Gap { col });
    }
    ops.reverse();

    ScalarDp { score: best, ops }
}

/// Aligns query `query` to `edge` and renders columns, insertions and quality.
pub fn align_to_edge(
    refs: &References,
    queries: &Queries,
    params: &ScoreParams,
    query: usize,
    edge: usize,
) -> AlignedQuery {
    let codes = queries.codes(query);
    let residues = queries.residues(query);
    let profile = refs.edge_profile(edge);
    let n = profile.len();
    let dp = dp_traceback(codes, profile, params);

    let mut columns = vec![b'-'; n];
    let mut quality = vec![ColumnQuality::Gap; n];
    let mut insertions = vec![Vec::new(); n + 1];
    for op in dp.ops {
        match op {
            AlignOp::Pair { col, res } => {
                columns[col] = residues[res];
                quality[col] = if codes[res] & profile.states()[col] != 0 {
                    ColumnQuality::Match
                } else {
                    ColumnQuality::Mismatch
                };
            }
            AlignOp::Gap { col } => {
                if profile.is_cgap(col) {
                    quality[col] = ColumnQuality::CgapGap;
                }
            }
            AlignOp::Insert { slot, res } => insertions[slot].push(residues[res]),
        }
    }

    AlignedQuery {
        query,
        edge,
        score: dp.score,
        columns,
        insertions,
        quality,
    }
}

/// Re-aligns every query to its best edge, in query order.
pub fn align_best_scores(
    config: &PaparaConfig,
    refs: &References,
    queries: &Queries,
    scores: &ScoringResults,
    log: &RunLog,
) -> PaparaResult<Vec<AlignedQuery>> {
    if scores.len() != queries.len() {
        return Err(PaparaError::InvalidConfig {
            msg: format!(
                "{} scoring results for {} queries",
                scores.len(),
                queries.len()
            ),
        });
    }
    let start = Instant::now();
    let params = &config.params;
    let idx: Vec<usize> = (0..queries.len()).collect();

    let aligned: Vec<AlignedQuery> = with_workers!(config.threads, || par_map!(idx, |&q| {
        let res = scores.get(q);
        align_to_edge(refs, queries, params, q, res.best_edge)
    }));

    for a in &aligned {
        let expected = scores.get(a.query).best_score;
        if a.score != expected {
            log.warn(format_args!(
                "query {}: traceback score {} differs from placement score {}",
                queries.name(a.query),
                a.score,
                expected
            ));
        }
        log.debug(format_args!(
            "{} -> {} score {} inserted {}",
            queries.name(a.query),
            refs.edge_name(a.edge),
            a.score,
            a.num_inserted()
        ));
    }
    log.info(format_args!(
        "aligned {} queries in {:.3}s",
        aligned.len(),
        start.elapsed().as_secs_f64()
    ));
    Ok(aligned)
}

/// Reference rows and aligned queries laid out on a common set of columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedAlignment {
    pub names: Vec<String>,
    pub rows: Vec<Vec<u8>>,
    /// Quality row of every query, parallel to the query rows.
    pub quality: Vec<Vec<u8>>,
    pub num_refs: usize,
}

impl ExtendedAlignment {
    /// With `ref_gaps`, every insertion slot is widened to its longest
    /// insertion and references are gapped there. Without it, insertions are
    /// dropped and the reference columns are kept as they are.
    pub fn build(
        refs: &References,
        queries: &Queries,
        aligned: &[AlignedQuery],
        ref_gaps: bool,
    ) -> Self {
        let n = refs.num_columns();
        let widths: Vec<usize> = (0..=n)
            .map(|slot| {
                if ref_gaps {
                    aligned
                        .iter()
                        .map(|a| a.insertions[slot].len())
                        .max()
                        .unwrap_or(0)
                } else {
                    0
                }
            })
            .collect();
        let total = n + widths.iter().sum::<usize>();

        let mut names = Vec::with_capacity(refs.names().len() + aligned.len());
        let mut rows = Vec::with_capacity(names.capacity());

        for (name, row) in refs.names().iter().zip(refs.rows()) {
            let mut out = Vec::with_capacity(total);
            for (slot, &w) in widths.iter().enumerate() {
                out.extend(std::iter::repeat(b'-').take(w));
                if slot < n {
                    out.push(row[slot]);
                }
            }
            names.push(name.to_string());
            rows.push(out);
        }

        let mut quality = Vec::with_capacity(aligned.len());
        for a in aligned {
            let mut out = Vec::with_capacity(total);
            let mut qual = Vec::with_capacity(total);
            for (slot, &w) in widths.iter().enumerate() {
                let ins = &a.insertions[slot][..a.insertions[slot].len().min(w)];
                out.extend_from_slice(ins);
                qual.extend(std::iter::repeat(INSERT_QUALITY).take(ins.len()));
                out.extend(std::iter::repeat(b'-').take(w - ins.len()));
                qual.extend(std::iter::repeat(PAD_QUALITY).take(w - ins.len()));
                if slot < n {
                    out.push(a.columns[slot]);
                    qual.push(a.quality[slot].as_char());
                }
            }
            names.push(queries.name(a.query).to_string());
            rows.push(out);
            quality.push(qual);
        }

        Self {
            names,
            rows,
            quality,
            num_refs: refs.names().len(),
        }
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn query_names(&self) -> &[String] {
        &self.names[self.num_refs..]
    }

    pub fn query_rows(&self) -> &[Vec<u8>] {
        &self.rows[self.num_refs..]
    }

    pub fn max_name_length(&self) -> usize {
        self.names.iter().map(String::len).max().unwrap_or(0)
    }
}
