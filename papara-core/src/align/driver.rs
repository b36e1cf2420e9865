//! Scores every query against every edge and keeps the best placements.
//!
//! Work is split into tasks of one query and a run of consecutive edges.
//! Tasks are scored in a worker pool and their outputs collected in task
//! order, so the per-query reduction is single-threaded and its result does
//! not depend on the number of workers.

use super::kernel::score_lanes;
use super::types::{ScoreParams, ScoringResult, ScoringResults};
use crate::config::{Backend, PaparaConfig};
use crate::error::{PaparaError, PaparaResult};
use crate::queries::Queries;
use crate::refs::{EdgeProfile, References};
use crate::runlog::RunLog;
#[cfg(feature = "simd")]
use crate::vu::{I16x16, I16x16Split, I16x8, I8x16};
use crate::vu::{Scalar16, VectorUnit};
use std::ops::Range;
use std::time::Instant;

/// Edges per task; a multiple of every lane count.
const EDGES_PER_TASK: usize = 64;

/// Bound on `|score|` the 16-bit tier must stay within.
const WIDE_SAFE_SCORE: i64 = 30_000;

struct Task {
    query: usize,
    edges: Range<usize>,
}

struct TaskOutput {
    query: usize,
    edges: Range<usize>,
    scores: Vec<i32>,
    fast_lanes: usize,
    wide_lanes: usize,
}

#[derive(Clone, Copy)]
struct Ctx<'a> {
    refs: &'a References,
    queries: &'a Queries,
    params: &'a ScoreParams,
    fast: bool,
}

/// Rejects inputs whose scores could leave the 16-bit range.
pub fn check_score_range(
    params: &ScoreParams,
    refs: &References,
    queries: &Queries,
) -> PaparaResult<()> {
    let columns = refs.num_columns();
    let max_w = params.max_abs_weight() as i64;
    for q in 0..queries.len() {
        let query_len = queries.seq_len(q);
        let bound = (query_len + columns + 1) as i64 * max_w;
        if bound > WIDE_SAFE_SCORE {
            return Err(PaparaError::ScoreRange {
                name: queries.name(q).to_string(),
                query_len,
                columns,
                bound,
            });
        }
    }
    Ok(())
}

fn check_inputs(config: &PaparaConfig, refs: &References, queries: &Queries) -> PaparaResult<()> {
    if queries.is_empty() {
        return Err(PaparaError::NoQueries);
    }
    if !queries.is_preprocessed() {
        return Err(PaparaError::InvalidConfig {
            msg: "queries must be preprocessed before scoring".into(),
        });
    }
    if queries.kind() != refs.kind() {
        return Err(PaparaError::AlphabetMismatch {
            msg: format!(
                "queries are {} but references are {}",
                queries.kind(),
                refs.kind()
            ),
        });
    }
    if refs.num_edges() == 0 || refs.num_columns() == 0 {
        return Err(PaparaError::DegenerateTree {
            msg: "no edge profiles to score against".into(),
        });
    }
    config.params.validate()?;
    check_score_range(&config.params, refs, queries)
}

/// 8-bit lanes can only be exact while a perfect score fits below the ceiling.
#[cfg(feature = "simd")]
fn fast_tier_useful(params: &ScoreParams, query_len: usize) -> bool {
    (params.match_score as i64) * (query_len as i64) < 255
}

fn profiles_of<'a>(
    refs: &'a References,
    edges: impl Iterator<Item = usize>,
) -> Vec<&'a EdgeProfile> {
    edges.map(|e| refs.edge_profile(e)).collect()
}

fn score_task<V16: VectorUnit<Elem = i16>>(task: &Task, ctx: Ctx<'_>) -> TaskOutput {
    let query = ctx.queries.codes(task.query);
    let edges: Vec<usize> = task.edges.clone().collect();
    let mut scores: Vec<Option<i32>> = vec![None; edges.len()];
    #[cfg_attr(not(feature = "simd"), allow(unused_mut))]
    let mut fast_lanes = 0;

    #[cfg(feature = "simd")]
    if ctx.fast && fast_tier_useful(ctx.params, query.len()) {
        for (group, chunk) in edges.chunks(I8x16::W).enumerate() {
            let profiles = profiles_of(ctx.refs, chunk.iter().copied());
            let lanes = score_lanes::<I8x16>(query, &profiles, ctx.params);
            for (idx, lane) in lanes.into_iter().enumerate() {
                if lane.exact {
                    scores[group * I8x16::W + idx] = Some(lane.score);
                    fast_lanes += 1;
                }
            }
        }
    }

    let pending: Vec<usize> = (0..edges.len()).filter(|&i| scores[i].is_none()).collect();
    for chunk in pending.chunks(V16::W) {
        let profiles = profiles_of(ctx.refs, chunk.iter().map(|&i| edges[i]));
        let lanes = score_lanes::<V16>(query, &profiles, ctx.params);
        for (&i, lane) in chunk.iter().zip(lanes) {
            scores[i] = Some(lane.score);
        }
    }

    TaskOutput {
        query: task.query,
        edges: task.edges.clone(),
        scores: scores.into_iter().flatten().collect(),
        fast_lanes,
        wide_lanes: pending.len(),
    }
}

fn run_task(task: &Task, ctx: Ctx<'_>, backend: Backend) -> TaskOutput {
    match backend {
        #[cfg(feature = "simd")]
        Backend::Sse => score_task::<I16x8>(task, ctx),
        #[cfg(feature = "simd")]
        Backend::Avx => score_task::<I16x16>(task, ctx),
        #[cfg(feature = "simd")]
        Backend::AvxSplit => score_task::<I16x16Split>(task, ctx),
        Backend::Scalar => score_task::<Scalar16>(task, ctx),
        #[cfg(not(feature = "simd"))]
        _ => score_task::<Scalar16>(task, ctx),
    }
}

/// Best edge and score of every query, plus the top candidates when
/// `config.num_candidates > 0`.
pub fn calc_scores(
    config: &PaparaConfig,
    refs: &References,
    queries: &Queries,
    log: &RunLog,
) -> PaparaResult<ScoringResults> {
    check_inputs(config, refs, queries)?;

    let ctx = Ctx {
        refs,
        queries,
        params: &config.params,
        fast: config.uses_fast_tier(),
    };
    let backend = config.backend;

    let num_edges = refs.num_edges();
    let tasks: Vec<Task> = (0..queries.len())
        .flat_map(|query| {
            (0..num_edges)
                .step_by(EDGES_PER_TASK)
                .map(move |start| Task {
                    query,
                    edges: start..(start + EDGES_PER_TASK).min(num_edges),
                })
        })
        .collect();

    log.info(format_args!(
        "scoring {} queries x {} edges: scores {}, backend {}, 8-bit tier {}, {} threads, {} tasks",
        queries.len(),
        num_edges,
        config.params,
        backend,
        if ctx.fast { "on" } else { "off" },
        config.threads,
        tasks.len()
    ));
    let start = Instant::now();

    let outputs: Vec<TaskOutput> =
        with_workers!(config.threads, || par_map!(tasks, |t| run_task(t, ctx, backend)));

    let mut results = ScoringResults {
        results: (0..queries.len())
            .map(|_| ScoringResult::new(config.num_candidates))
            .collect(),
        fast_lanes: 0,
        wide_lanes: 0,
    };
    for out in outputs {
        let slot = &mut results.results[out.query];
        for (edge, score) in out.edges.zip(out.scores) {
            slot.offer(edge, score);
        }
        results.fast_lanes += out.fast_lanes;
        results.wide_lanes += out.wide_lanes;
    }

    log.info(format_args!(
        "scoring done in {:.3}s: {} lanes exact in 8 bit, {} lanes in 16 bit",
        start.elapsed().as_secs_f64(),
        results.fast_lanes,
        results.wide_lanes
    ));
    Ok(results)
}
