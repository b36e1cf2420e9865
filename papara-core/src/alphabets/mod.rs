//! Residue alphabets.
//!
//! Residues are encoded as *state sets*: bit `k` is set when canonical state
//! `k` is compatible with the residue, so ambiguity codes are plain unions and
//! two residues match when their sets intersect. The gap has no residue
//! states.

pub mod dna;
pub mod protein;

use std::sync::LazyLock;
use vector_map::VecMap;

pub type StateSet = u32;

/// Residue alphabet of a run, fixed at configuration time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SeqKind {
    #[default]
    Dna,
    Protein,
}

struct Tables {
    encode: [Option<StateSet>; 256],
    decode: VecMap<StateSet, u8>,
}

static DNA_TABLES: LazyLock<Tables> = LazyLock::new(|| build_tables(dna::CODES));
static PROTEIN_TABLES: LazyLock<Tables> = LazyLock::new(|| build_tables(protein::CODES));

fn build_tables(codes: &[(u8, StateSet)]) -> Tables {
    let mut encode = [None; 256];
    let mut decode = VecMap::new();
    for &(ch, set) in codes {
        encode[ch as usize] = Some(set);
        encode[ch.to_ascii_lowercase() as usize] = Some(set);
        // first code listed for a set wins (U never shadows T)
        if decode.get(&set).is_none() {
            decode.insert(set, ch);
        }
    }
    Tables { encode, decode }
}

#[inline]
pub fn is_gap(b: u8) -> bool {
    matches!(b, b'-' | b'.' | b'?')
}

impl SeqKind {
    fn tables(self) -> &'static Tables {
        match self {
            SeqKind::Dna => &DNA_TABLES,
            SeqKind::Protein => &PROTEIN_TABLES,
        }
    }

    pub fn num_states(self) -> usize {
        match self {
            SeqKind::Dna => dna::STATES.len(),
            SeqKind::Protein => protein::STATES.len(),
        }
    }

    /// Set holding every canonical state.
    pub fn all_states(self) -> StateSet {
        (1 << self.num_states()) - 1
    }

    /// State set of a residue; `None` for gaps and unknown characters.
    #[inline]
    pub fn encode(self, b: u8) -> Option<StateSet> {
        self.tables().encode[b as usize]
    }

    /// Character for a state set: the residue or ambiguity code naming it,
    /// `-` for the empty set, `X`/`N` for sets without a code.
    pub fn decode(self, set: StateSet) -> u8 {
        if set == 0 {
            return b'-';
        }
        match self.tables().decode.get(&set) {
            Some(&ch) => ch,
            None => match self {
                SeqKind::Dna => b'N',
                SeqKind::Protein => b'X',
            },
        }
    }

    /// True when `b` is a residue of this alphabet or a gap.
    pub fn is_valid(self, b: u8) -> bool {
        is_gap(b) || self.encode(b).is_some()
    }
}

impl std::fmt::Display for SeqKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeqKind::Dna => f.write_str("nucleotide"),
            SeqKind::Protein => f.write_str("amino acid"),
        }
    }
}
