//! Lane-group DP kernel: one query against up to `W` edge profiles.
//!
//! Columns run over the profile (`i`), rows over the query (`j`). Row storage
//! holds `H` and `Q` of the previous column for every query position; `I`
//! and the diagonal travel along the column in registers.

use super::types::ScoreParams;
use crate::alphabets::StateSet;
use crate::refs::EdgeProfile;
use crate::vu::{AlignedBuffer, Lane, VectorUnit};
use vector_map::VecMap;

/// Score of one lane, shifted back out of the unit's bias.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct LaneScore {
    pub score: i32,
    /// No saturated cell can have reached the final score.
    pub exact: bool,
}

/// Distinct query symbols and the symbol index of every query position.
fn symbol_table(query: &[StateSet]) -> (Vec<StateSet>, Vec<usize>) {
    let mut index: VecMap<StateSet, usize> = VecMap::new();
    let mut sets = Vec::new();
    let positions = query
        .iter()
        .map(|&set| match index.get(&set) {
            Some(&idx) => idx,
            None => {
                let idx = sets.len();
                index.insert(set, idx);
                sets.push(set);
                idx
            }
        })
        .collect();
    (sets, positions)
}

/// Scores `query` against every profile in `profiles` (at most `V::W`, all of
/// the same length). Lanes past `profiles.len()` are padding and are not
/// reported.
pub(crate) fn score_lanes<V: VectorUnit>(
    query: &[StateSet],
    profiles: &[&EdgeProfile],
    params: &ScoreParams,
) -> Vec<LaneScore> {
    let w = V::W;
    debug_assert!(!profiles.is_empty() && profiles.len() <= w);
    let n = profiles[0].len();
    debug_assert!(profiles.iter().all(|p| p.len() == n));
    let m = query.len();

    let elem = V::Elem::from_i32_sat;
    let bias = V::BIAS.to_i32();
    let on = elem(-1);
    let off = elem(0);

    let (sym_sets, sym_of) = symbol_table(query);
    let k = sym_sets.len();

    let mut masks = AlignedBuffer::<V::Elem>::for_unit::<V>(n * k * w);
    for col in 0..n {
        for (s, &set) in sym_sets.iter().enumerate() {
            let lanes = masks.group_mut::<V>(col * k + s);
            for (lane, slot) in lanes.iter_mut().enumerate() {
                *slot = match profiles.get(lane) {
                    Some(p) if p.states()[col] & set != 0 => on,
                    _ => off,
                };
            }
        }
    }

    let mut cgap = AlignedBuffer::<V::Elem>::for_unit::<V>(n * w);
    for col in 0..n {
        let lanes = cgap.group_mut::<V>(col);
        for (lane, slot) in lanes.iter_mut().enumerate() {
            *slot = match profiles.get(lane) {
                Some(p) if p.is_cgap(col) => on,
                _ => off,
            };
        }
    }

    let mut h_prev = AlignedBuffer::<V::Elem>::for_unit::<V>((m + 1) * w);
    let mut h = AlignedBuffer::<V::Elem>::for_unit::<V>((m + 1) * w);
    let mut q_row = AlignedBuffer::<V::Elem>::for_unit::<V>((m + 1) * w);

    let open = params.gap_open;
    let ext = params.gap_extend;

    // column 0: leading query gap; Q starts one extension short of an open
    V::store(V::broadcast(V::BIAS), h_prev.group_mut::<V>(0));
    for j in 1..=m {
        let gap = bias + params.gap_cost(j);
        V::store(V::broadcast(elem(gap)), h_prev.group_mut::<V>(j));
        V::store(V::broadcast(elem(gap + open - ext)), q_row.group_mut::<V>(j));
    }

    let v_bias = V::broadcast(V::BIAS);
    let v_gap_o = V::broadcast(elem(open));
    let v_gap_e = V::broadcast(elem(ext));
    let v_match = V::broadcast(elem(params.match_score));
    let v_cgap = V::broadcast(elem(params.match_cgap));
    let v_i_start = V::broadcast(elem(bias + open - ext));

    let mut v_best = V::broadcast(V::Elem::MIN);
    let mut v_hmax = V::broadcast(V::Elem::MIN);

    for col in 0..n {
        let v_is_cgap = V::load(cgap.group::<V>(col));
        let mask_base = col * k;

        V::store(v_bias, h.group_mut::<V>(0));
        let mut v_h_left = v_bias;
        let mut v_h_diag = V::load(h_prev.group::<V>(0));
        let mut v_i = v_i_start;

        for j in 1..=m {
            let v_mask = V::load(masks.group::<V>(mask_base + sym_of[j - 1]));
            let v_h_up = V::load(h_prev.group::<V>(j));
            let v_q_up = V::load(q_row.group::<V>(j));

            let v_m = V::add(v_h_diag, V::bit_and(v_mask, v_match));

            let v_q_gap = V::max(V::add(v_h_up, v_gap_o), V::add(v_q_up, v_gap_e));
            let v_q = V::select(v_is_cgap, V::add(v_h_up, v_cgap), v_q_gap);

            v_i = V::max(V::add(v_h_left, v_gap_o), V::add(v_i, v_gap_e));

            let v_h = V::max(v_m, V::max(v_q, v_i));
            V::store(v_q, q_row.group_mut::<V>(j));
            V::store(v_h, h.group_mut::<V>(j));
            v_hmax = V::max(v_hmax, v_h);

            v_h_left = v_h;
            v_h_diag = v_h_up;
        }

        v_best = V::max(v_best, v_h_left);
        std::mem::swap(&mut h_prev, &mut h);
    }

    let mut best = AlignedBuffer::<V::Elem>::for_unit::<V>(w);
    let mut hmax = AlignedBuffer::<V::Elem>::for_unit::<V>(w);
    V::store(v_best, best.as_mut_slice());
    V::store(v_hmax, hmax.as_mut_slice());

    // anything a floor clamp produced stays at or below this after gaining
    // at most one match per remaining query residue
    let floor = V::Elem::MIN
        .to_i32()
        .saturating_add(params.match_score.saturating_mul(m as i32));

    (0..profiles.len())
        .map(|lane| {
            let stored = best.as_slice()[lane].to_i32();
            LaneScore {
                score: stored - bias,
                exact: hmax.as_slice()[lane] < V::Elem::MAX && stored > floor,
            }
        })
        .collect()
}
