use super::extract::{dp_traceback, AlignOp};
use super::kernel::score_lanes;
use super::*;
use crate::alphabets::{SeqKind, StateSet};
use crate::config::{Backend, PaparaConfig};
use crate::error::PaparaError;
use crate::io::Alignment;
use crate::phylo::parse_newick;
use crate::queries::Queries;
use crate::refs::{EdgeProfile, GapPolicy, References};
use crate::runlog::RunLog;
#[cfg(feature = "simd")]
use crate::vu::{I16x16, I16x16Split, I16x8, I8x16};
use crate::vu::{Scalar16, VectorUnit};
use bit_set::BitSet;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

fn setup(
    newick: &str,
    rows: &[(&str, &[u8])],
    queries: &[(&str, &[u8])],
    policy: GapPolicy,
) -> (References, Queries) {
    let mut q = Queries::new(SeqKind::Dna);
    for &(name, seq) in queries {
        q.push(name, seq).unwrap();
    }
    q.preprocess().unwrap();
    let mut aln = Alignment::new();
    for &(name, row) in rows {
        aln.push(name, row);
    }
    let log = RunLog::new();
    let mut refs = References::new(parse_newick(newick).unwrap(), aln, &q, policy, &log).unwrap();
    refs.remove_full_gaps(&log).unwrap();
    (refs, q)
}

fn three_leaves(query: &[u8]) -> (References, Queries) {
    setup(
        "(A,B,C);",
        &[("A", b"AAAAA"), ("B", b"CCCCC"), ("C", b"CCCCC")],
        &[("query", query)],
        GapPolicy::Plain,
    )
}

fn edge_named(refs: &References, name: &str) -> usize {
    (0..refs.num_edges())
        .find(|&e| refs.edge_name(e) == name)
        .unwrap()
}

fn place(config: &PaparaConfig, refs: &References, queries: &Queries) -> ScoringResults {
    calc_scores(config, refs, queries, &RunLog::new()).unwrap()
}

/// Deterministic nucleotide stream.
fn lcg_seq(seed: u64, len: usize) -> Vec<u8> {
    let mut x = seed;
    (0..len)
        .map(|_| {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            b"ACGT"[(x >> 33) as usize % 4]
        })
        .collect()
}

fn mutate(row: &[u8], every: usize, offset: usize) -> Vec<u8> {
    row.iter()
        .enumerate()
        .map(|(i, &b)| {
            if i % every == offset {
                match b {
                    b'A' => b'C',
                    b'C' => b'G',
                    b'G' => b'T',
                    _ => b'A',
                }
            } else {
                b
            }
        })
        .collect()
}

/// Five leaves over 160 columns, queries of lengths that land in both tiers.
fn mixed_workload() -> (References, Queries) {
    let base = lcg_seq(7, 160);
    let rows: Vec<(String, Vec<u8>)> = (0..5)
        .map(|k| (format!("T{k}"), mutate(&base, 5 + k, k)))
        .collect();
    let rows_ref: Vec<(&str, &[u8])> = rows
        .iter()
        .map(|(n, r)| (n.as_str(), r.as_slice()))
        .collect();
    let mut queries: Vec<(String, Vec<u8>)> = vec![
        ("short".into(), rows[1].1[20..30].to_vec()),
        ("mid".into(), rows[2].1[40..80].to_vec()),
        ("near_ceiling".into(), rows[3].1[30..130].to_vec()),
        ("long".into(), rows[4].1[5..155].to_vec()),
        ("noise".into(), lcg_seq(99, 60)),
    ];
    let mut gapped = rows[0].1[10..50].to_vec();
    gapped.splice(15..15, b"TTTT".iter().copied());
    queries.push(("inserted".into(), gapped));
    let queries_ref: Vec<(&str, &[u8])> = queries
        .iter()
        .map(|(n, s)| (n.as_str(), s.as_slice()))
        .collect();
    setup(
        "((T0,T1),(T2,(T3,T4)));",
        &rows_ref,
        &queries_ref,
        GapPolicy::Plain,
    )
}

#[test]
fn three_leaf_scenario() {
    let (refs, queries) = three_leaves(b"AAAAA");
    let config = PaparaConfig::default();
    let scores = place(&config, &refs, &queries);
    let res = scores.get(0);
    assert_eq!(res.best_score, 5 * config.params.match_score);
    assert_eq!(res.best_edge, edge_named(&refs, "A"));

    let aligned = align_best_scores(&config, &refs, &queries, &scores, &RunLog::new()).unwrap();
    assert_eq!(aligned[0].columns, b"AAAAA");
    assert_eq!(aligned[0].num_inserted(), 0);
    assert!(aligned[0].quality.iter().all(|&q| q == ColumnQuality::Match));

    let ext = ExtendedAlignment::build(&refs, &queries, &aligned, true);
    assert_eq!(ext.width(), 5);
    assert_eq!(ext.query_rows()[0], b"AAAAA");
    assert_eq!(ext.rows[0], b"AAAAA");
    assert_eq!(ext.quality[0], b"MMMMM");
}

#[cfg(feature = "simd")]
#[test]
fn short_queries_stay_in_fast_tier() {
    let (refs, queries) = three_leaves(b"AAAAA");
    let scores = place(&PaparaConfig::default(), &refs, &queries);
    assert_eq!((scores.fast_lanes, scores.wide_lanes), (3, 0));

    let scalar = place(
        &PaparaConfig::default().with_backend(Backend::Scalar),
        &refs,
        &queries,
    );
    assert_eq!((scalar.fast_lanes, scalar.wide_lanes), (0, 3));
    assert_eq!(scalar.results, scores.results);
}

#[test]
fn candidates_keep_edge_order_on_ties() {
    let (refs, queries) = three_leaves(b"AAAAA");
    let scores = place(&PaparaConfig::default().with_candidates(2), &refs, &queries);
    let cands: Vec<(String, i32)> = scores
        .get(0)
        .candidates
        .iter()
        .map(|c| (refs.edge_name(c.edge), c.score))
        .collect();
    assert_eq!(cands, vec![("A".to_string(), 10), ("B".to_string(), 0)]);
}

#[test]
fn subsequence_scores_full_matches() {
    let row = lcg_seq(3, 30);
    let other = mutate(&row, 3, 1);
    let (refs, queries) = setup(
        "(A,B,C);",
        &[
            ("A", row.as_slice()),
            ("B", other.as_slice()),
            ("C", other.as_slice()),
        ],
        &[("sub", &row[8..20])],
        GapPolicy::Plain,
    );
    let config = PaparaConfig::default();
    let scores = place(&config, &refs, &queries);
    assert_eq!(scores.get(0).best_score, 12 * config.params.match_score);

    let aligned = align_best_scores(&config, &refs, &queries, &scores, &RunLog::new()).unwrap();
    assert_eq!(aligned[0].num_inserted(), 0);
    let placed: Vec<u8> = aligned[0]
        .columns
        .iter()
        .copied()
        .filter(|&b| b != b'-')
        .collect();
    assert_eq!(placed, &row[8..20]);
}

#[test]
fn consensus_gap_column_scores_match_cgap() {
    let rows: &[(&str, &[u8])] = &[
        ("A", b"AC-GT"),
        ("B", b"AC-GT"),
        ("C", b"AC-GT"),
        ("D", b"ACTGT"),
    ];
    let params = ScoreParams::new(-3, -1, 2, 0);
    let (refs, queries) = setup(
        "((A,B),(C,D));",
        rows,
        &[("q", b"ACGT")],
        GapPolicy::ConsensusGap,
    );
    let edge = edge_named(&refs, "A");
    assert!(refs.edge_profile(edge).is_cgap(2));

    let aligned = align_to_edge(&refs, &queries, &params, 0, edge);
    assert_eq!(aligned.score, 4 * 2 + params.match_cgap);
    assert_eq!(aligned.columns, b"AC-GT");
    assert_eq!(aligned.quality[2], ColumnQuality::CgapGap);

    let config = PaparaConfig::default().with_params(params);
    let scores = place(&config, &refs, &queries);
    assert_eq!(scores.get(0).best_score, 8);
}

#[test]
fn all_gap_query_scores_zero() {
    let (refs, queries) = three_leaves(b"-----");
    let scores = place(&PaparaConfig::default(), &refs, &queries);
    assert_eq!(scores.get(0).best_score, 0);
    let aligned = align_to_edge(&refs, &queries, &ScoreParams::default(), 0, 0);
    assert_eq!(aligned.columns, b"-----");
    assert!(aligned
        .quality
        .iter()
        .all(|&q| q != ColumnQuality::Match && q != ColumnQuality::Mismatch));
}

#[test]
fn insertion_costs_one_gap() {
    let (refs, queries) = setup(
        "(A,B,C);",
        &[("A", b"ACGTACGT"), ("B", b"ACGTACGT"), ("C", b"ACGTACGT")],
        &[("ins", b"ACGTGGACGT"), ("plain", b"ACGTACGT")],
        GapPolicy::Plain,
    );
    let params = ScoreParams::default();
    let with_ins = align_to_edge(&refs, &queries, &params, 0, 0);
    assert_eq!(with_ins.score, 8 * params.match_score + params.gap_cost(2));
    assert_eq!(with_ins.insertions[4], b"GG");
    assert_eq!(with_ins.num_inserted(), 2);

    let plain = align_to_edge(&refs, &queries, &params, 1, 0);
    let aligned = vec![with_ins, plain];

    let ext = ExtendedAlignment::build(&refs, &queries, &aligned, true);
    assert_eq!(ext.width(), 10);
    assert_eq!(ext.rows[0], b"ACGT--ACGT");
    assert_eq!(ext.query_rows()[0], b"ACGTGGACGT");
    assert_eq!(ext.query_rows()[1], b"ACGT--ACGT");
    assert_eq!(ext.quality[0], b"MMMMIIMMMM");
    assert_eq!(ext.quality[1], b"MMMM..MMMM");

    let collapsed = ExtendedAlignment::build(&refs, &queries, &aligned, false);
    assert_eq!(collapsed.width(), 8);
    assert_eq!(collapsed.query_rows()[0], b"ACGTACGT");
    assert_eq!(collapsed.rows[0], b"ACGTACGT");
}

#[test]
fn leading_insertion_goes_to_first_slot() {
    let profile = EdgeProfile::new(
        b"ACGT".iter().map(|&b| SeqKind::Dna.encode(b).unwrap()).collect(),
        BitSet::new(),
    );
    let query: Vec<StateSet> = b"TTACGT"
        .iter()
        .map(|&b| SeqKind::Dna.encode(b).unwrap())
        .collect();
    let params = ScoreParams::default();
    let dp = dp_traceback(&query, &profile, &params);
    assert_eq!(dp.score, 8 + params.gap_cost(2));
    assert_eq!(
        &dp.ops[..3],
        &[
            AlignOp::Insert { slot: 0, res: 0 },
            AlignOp::Insert { slot: 0, res: 1 },
            AlignOp::Pair { col: 0, res: 2 },
        ]
    );
}

#[test]
fn fast_tier_matches_wide_tier() {
    let (refs, queries) = mixed_workload();
    let config = PaparaConfig::default().with_candidates(4);
    let fast = place(&config, &refs, &queries);
    let wide = place(&config.clone().with_fast_path(false), &refs, &queries);
    assert_eq!(fast.results, wide.results);
    assert_eq!(wide.fast_lanes, 0);
    assert_eq!(
        fast.fast_lanes + fast.wide_lanes,
        queries.len() * refs.num_edges()
    );
    #[cfg(feature = "simd")]
    {
        assert!(fast.fast_lanes > 0);
        assert!(fast.wide_lanes > 0);
    }
}

#[test]
fn every_backend_agrees() {
    let (refs, queries) = mixed_workload();
    let base = place(
        &PaparaConfig::default().with_backend(Backend::Scalar),
        &refs,
        &queries,
    );
    for backend in [Backend::Sse, Backend::Avx, Backend::AvxSplit] {
        let got = place(
            &PaparaConfig::default().with_backend(backend),
            &refs,
            &queries,
        );
        assert_eq!(got.results, base.results, "backend {backend}");
    }
}

#[test]
fn thread_count_does_not_change_results() {
    let (refs, queries) = mixed_workload();
    let config = PaparaConfig::default().with_candidates(3);
    let one = place(&config, &refs, &queries);
    let many = place(&config.clone().with_threads(4), &refs, &queries);
    assert_eq!(one.results, many.results);

    let log = RunLog::new();
    let a1 = align_best_scores(&config, &refs, &queries, &one, &log).unwrap();
    let a4 = align_best_scores(
        &config.clone().with_threads(4),
        &refs,
        &queries,
        &many,
        &log,
    )
    .unwrap();
    assert_eq!(a1, a4);
    for a in &a1 {
        assert_eq!(a.score, one.get(a.query).best_score);
    }
}

#[test]
fn negative_match_places_like_traceback() {
    let (refs, queries) = mixed_workload();
    let params = ScoreParams::new(-3, -1, -1, -3);
    for backend in [Backend::Sse, Backend::Avx, Backend::AvxSplit, Backend::Scalar] {
        let config = PaparaConfig::default()
            .with_params(params)
            .with_backend(backend);
        let scores = place(&config, &refs, &queries);
        assert_eq!(scores.fast_lanes, 0);
        for q in 0..queries.len() {
            let (best_edge, best_score) = (0..refs.num_edges())
                .map(|e| {
                    let dp = dp_traceback(queries.codes(q), refs.edge_profile(e), &params);
                    (e, dp.score)
                })
                .fold((usize::MAX, i32::MIN), |best, cur| {
                    if cur.1 > best.1 {
                        cur
                    } else {
                        best
                    }
                });
            let res = scores.get(q);
            assert_eq!(res.best_score, best_score, "backend {backend}");
            assert_eq!(res.best_edge, best_edge, "backend {backend}");
        }
    }
}

#[test]
fn inserted_query_is_placed_with_insertion() {
    let (refs, queries) = mixed_workload();
    let config = PaparaConfig::default();
    let scores = place(&config, &refs, &queries);
    let aligned = align_best_scores(&config, &refs, &queries, &scores, &RunLog::new()).unwrap();
    let ins = aligned
        .iter()
        .find(|a| queries.name(a.query) == "inserted")
        .unwrap();
    assert_eq!(ins.num_inserted(), 4);
}

#[test]
fn score_range_is_checked() {
    let (refs, queries) = three_leaves(b"AAAAA");
    let config = PaparaConfig::default().with_params(ScoreParams::new(-3000, -1000, 2000, -3000));
    match calc_scores(&config, &refs, &queries, &RunLog::new()) {
        Err(PaparaError::ScoreRange { name, bound, .. }) => {
            assert_eq!(name, "query");
            assert_eq!(bound, 11 * 3000);
        }
        other => panic!("expected score range error, got {other:?}"),
    }
}

#[test]
fn empty_query_set_is_rejected() {
    let (refs, _) = three_leaves(b"A");
    let mut empty = Queries::new(SeqKind::Dna);
    empty.preprocess().unwrap();
    assert!(matches!(
        calc_scores(&PaparaConfig::default(), &refs, &empty, &RunLog::new()),
        Err(PaparaError::NoQueries)
    ));
}

#[test]
fn protein_queries_against_dna_refs_rejected() {
    let (refs, _) = three_leaves(b"A");
    let mut prot = Queries::new(SeqKind::Protein);
    prot.push("p", b"MKV".to_vec()).unwrap();
    prot.preprocess().unwrap();
    assert!(matches!(
        calc_scores(&PaparaConfig::default(), &refs, &prot, &RunLog::new()),
        Err(PaparaError::AlphabetMismatch { .. })
    ));
}

#[test]
fn candidate_list_evicts_lowest() {
    let mut list = CandidateList::new(3);
    list.insert(0, 5);
    list.insert(1, 7);
    list.insert(2, 5);
    list.insert(3, 6);
    let got: Vec<(usize, i32)> = list.iter().map(|c| (c.edge, c.score)).collect();
    assert_eq!(got, vec![(1, 7), (3, 6), (0, 5)]);
    list.insert(4, 5);
    assert_eq!(list.as_slice()[2].edge, 0);
    list.insert(5, 9);
    assert_eq!(list.as_slice()[0].edge, 5);
    assert_eq!(list.len(), 3);

    let mut off = CandidateList::new(0);
    off.insert(0, 1);
    assert!(off.is_empty());
}

#[test]
fn score_params_parse() {
    let p: ScoreParams = "-4:-2:3:1".parse().unwrap();
    assert_eq!(p, ScoreParams::new(-4, -2, 3, 1));
    assert_eq!(p.to_string(), "-4:-2:3:1");
    assert!("-4:-2:3".parse::<ScoreParams>().is_err());
    assert!("-4:x:3:1".parse::<ScoreParams>().is_err());
    assert!("-4:-2:20000:1".parse::<ScoreParams>().is_err());
    let negative: ScoreParams = "-3:-1:-1:-3".parse().unwrap();
    assert_eq!(negative.match_score, -1);
    assert!(!negative.fits_fast_tier());
    assert_eq!(ScoreParams::default().gap_cost(3), -5);
    assert_eq!(ScoreParams::default().gap_cost(0), 0);
    assert!(ScoreParams::default().fits_fast_tier());
    assert!(!p.fits_fast_tier());
}

fn arb_profile(n: usize) -> impl Strategy<Value = EdgeProfile> {
    (
        prop::collection::vec(1u32..16, n),
        prop::collection::vec(prop::bool::weighted(0.15), n),
    )
        .prop_map(|(mut states, flags)| {
            let mut cgap = BitSet::new();
            for (col, &f) in flags.iter().enumerate() {
                if f {
                    cgap.insert(col);
                    states[col] = 0;
                }
            }
            EdgeProfile::new(states, cgap)
        })
}

fn arb_case() -> impl Strategy<Value = (Vec<StateSet>, Vec<EdgeProfile>)> {
    (1usize..24).prop_flat_map(|n| {
        (
            prop::collection::vec(1u32..16, 0..30),
            prop::collection::vec(arb_profile(n), 1..=20),
        )
    })
}

fn arb_params() -> impl Strategy<Value = ScoreParams> {
    prop_oneof![
        Just(ScoreParams::default()),
        Just(ScoreParams::new(-3, -1, 2, 0)),
        Just(ScoreParams::new(-5, -2, 3, -1)),
        Just(ScoreParams::new(-2, -2, 1, -4)),
        Just(ScoreParams::new(-1, 0, 4, -2)),
        Just(ScoreParams::new(-3, -1, -1, -3)),
    ]
}

/// Every lane of `V` against the traceback DP. Lanes not marked exact are
/// only compared when `all_lanes` is set.
fn check_unit<V: VectorUnit>(
    query: &[StateSet],
    profiles: &[EdgeProfile],
    params: &ScoreParams,
    all_lanes: bool,
) -> Result<(), TestCaseError> {
    for chunk in profiles.chunks(V::W) {
        let group: Vec<&EdgeProfile> = chunk.iter().collect();
        let lanes = score_lanes::<V>(query, &group, params);
        prop_assert_eq!(lanes.len(), chunk.len());
        for (p, lane) in chunk.iter().zip(lanes) {
            if all_lanes || lane.exact {
                let want = dp_traceback(query, p, params).score;
                prop_assert_eq!(lane.score, want, "unit {}", V::NAME);
            }
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn scalar_unit_matches_traceback((query, profiles) in arb_case(), params in arb_params()) {
        check_unit::<Scalar16>(&query, &profiles, &params, true)?;
    }
}

#[cfg(feature = "simd")]
proptest! {
    #[test]
    fn wide_units_match_traceback((query, profiles) in arb_case(), params in arb_params()) {
        check_unit::<I16x8>(&query, &profiles, &params, true)?;
        check_unit::<I16x16>(&query, &profiles, &params, true)?;
        check_unit::<I16x16Split>(&query, &profiles, &params, true)?;
    }

    #[test]
    fn exact_fast_lanes_match_traceback((query, profiles) in arb_case(), params in arb_params()) {
        prop_assume!(params.fits_fast_tier());
        check_unit::<I8x16>(&query, &profiles, &params, false)?;
    }

    #[test]
    fn short_queries_are_exact_in_8_bit(
        (query, profiles) in (1usize..12).prop_flat_map(|n| (
            prop::collection::vec(1u32..16, 0..8),
            prop::collection::vec(arb_profile(n), 1..=16),
        )),
    ) {
        let params = ScoreParams::default();
        let group: Vec<&EdgeProfile> = profiles.iter().collect();
        for lane in score_lanes::<I8x16>(&query, &group, &params) {
            prop_assert!(lane.exact);
        }
    }
}
