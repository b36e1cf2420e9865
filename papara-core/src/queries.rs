//! Query sequences to be placed.

use crate::alphabets::{is_gap, SeqKind, StateSet};
use crate::error::{PaparaError, PaparaResult};
use crate::io::FastaRecord;
use std::collections::HashSet;

#[derive(Clone, Debug)]
struct Query {
    name: Box<str>,
    raw: Vec<u8>,
    residues: Vec<u8>,
    codes: Vec<StateSet>,
}

/// Query sequences of one run, in input order.
///
/// Sequences are stored as read. [`Queries::preprocess`] strips gap
/// characters and encodes the remaining residues to state sets; the scoring
/// and extraction stages only look at the preprocessed form.
#[derive(Clone, Debug)]
pub struct Queries {
    kind: SeqKind,
    seqs: Vec<Query>,
    seen: HashSet<Box<str>>,
    preprocessed: bool,
}

impl Queries {
    pub fn new(kind: SeqKind) -> Self {
        Self {
            kind,
            seqs: Vec::new(),
            seen: HashSet::new(),
            preprocessed: false,
        }
    }

    /// Builds and preprocesses a query set from FASTA records.
    pub fn from_records(
        kind: SeqKind,
        records: impl IntoIterator<Item = FastaRecord>,
    ) -> PaparaResult<Self> {
        let mut queries = Self::new(kind);
        for rec in records {
            queries.push(rec.id, rec.seq)?;
        }
        queries.preprocess()?;
        Ok(queries)
    }

    pub fn push(&mut self, name: impl Into<Box<str>>, seq: impl Into<Vec<u8>>) -> PaparaResult<()> {
        let name = name.into();
        if !self.seen.insert(name.clone()) {
            return Err(PaparaError::DuplicateName {
                name: name.into_string(),
            });
        }
        self.seqs.push(Query {
            name,
            raw: seq.into(),
            residues: Vec::new(),
            codes: Vec::new(),
        });
        self.preprocessed = false;
        Ok(())
    }

    /// Strips gaps and encodes every query. Safe to call more than once.
    pub fn preprocess(&mut self) -> PaparaResult<()> {
        if self.preprocessed {
            return Ok(());
        }
        let kind = self.kind;
        for q in &mut self.seqs {
            q.residues.clear();
            q.codes.clear();
            for (pos, &b) in q.raw.iter().enumerate() {
                if is_gap(b) {
                    continue;
                }
                let set = kind.encode(b).ok_or_else(|| PaparaError::InvalidSymbol {
                    name: q.name.to_string(),
                    ch: b as char,
                    pos,
                })?;
                q.residues.push(b.to_ascii_uppercase());
                q.codes.push(set);
            }
        }
        self.preprocessed = true;
        Ok(())
    }

    pub fn is_preprocessed(&self) -> bool {
        self.preprocessed
    }

    pub fn kind(&self) -> SeqKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    pub fn name(&self, idx: usize) -> &str {
        &self.seqs[idx].name
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.seqs.iter().map(|q| &*q.name)
    }

    /// Sequence as read, gaps included.
    pub fn raw(&self, idx: usize) -> &[u8] {
        &self.seqs[idx].raw
    }

    /// Residues without gaps, upper-cased.
    pub fn residues(&self, idx: usize) -> &[u8] {
        &self.seqs[idx].residues
    }

    pub fn codes(&self, idx: usize) -> &[StateSet] {
        &self.seqs[idx].codes
    }

    /// Number of residues after gap removal.
    pub fn seq_len(&self, idx: usize) -> usize {
        self.seqs[idx].codes.len()
    }

    pub fn max_seq_len(&self) -> usize {
        self.seqs.iter().map(|q| q.codes.len()).max().unwrap_or(0)
    }

    pub fn max_name_length(&self) -> usize {
        self.seqs.iter().map(|q| q.name.len()).max().unwrap_or(0)
    }
}
