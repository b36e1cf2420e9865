//! Relaxed sequential PHYLIP.
//!
//! The first non-blank line holds `ntaxa ncols`. Every following non-blank
//! line is one taxon: a name, whitespace, then the aligned sequence, which
//! may itself contain spaces. Names are not limited to ten characters.
//! Interleaved files are not supported.

use crate::error::{PaparaError, PaparaResult};
use memchr::memchr2;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;

/// Reference alignment: one aligned row per taxon, all of equal width.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Alignment {
    pub names: Vec<Box<str>>,
    pub rows: Vec<Vec<u8>>,
}

impl Alignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<Box<str>>, row: impl Into<Vec<u8>>) {
        self.names.push(name.into());
        self.rows.push(row.into());
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Width of the first row, `0` when empty.
    pub fn num_columns(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn row_by_name(&self, name: &str) -> Option<&[u8]> {
        self.names
            .iter()
            .position(|n| &**n == name)
            .map(|idx| self.rows[idx].as_slice())
    }
}

fn format_err(msg: impl Into<String>, line: usize) -> PaparaError {
    PaparaError::PhylipFormat {
        msg: msg.into(),
        line,
    }
}

fn parse_dims(line: &str, line_no: usize) -> PaparaResult<(usize, usize)> {
    let mut fields = line.split_ascii_whitespace();
    let mut next = |what: &str| -> PaparaResult<usize> {
        fields
            .next()
            .and_then(|f| f.parse().ok())
            .ok_or_else(|| format_err(format!("expected {what} in header"), line_no))
    };
    let ntaxa = next("taxon count")?;
    let ncols = next("column count")?;
    Ok((ntaxa, ncols))
}

pub fn read_phylip_from_reader<R: BufRead>(reader: R) -> PaparaResult<Alignment> {
    let mut dims = None;
    let mut aln = Alignment::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let Some((ntaxa, ncols)) = dims else {
            dims = Some(parse_dims(trimmed, line_no)?);
            continue;
        };

        if aln.len() == ntaxa {
            return Err(format_err(format!("more than {ntaxa} sequences"), line_no));
        }

        let bytes = trimmed.as_bytes();
        let split = memchr2(b' ', b'\t', bytes)
            .ok_or_else(|| format_err("expected name and sequence", line_no))?;
        let name = &trimmed[..split];
        let row = super::normalize_seq_bytes(&trimmed[split..]);

        if row.len() != ncols {
            return Err(PaparaError::RaggedAlignment {
                name: name.to_string(),
                len: row.len(),
                expected: ncols,
            });
        }
        if !seen.insert(name.to_string()) {
            return Err(PaparaError::DuplicateName {
                name: name.to_string(),
            });
        }
        aln.push(name, row);
    }

    let Some((ntaxa, _)) = dims else {
        return Err(format_err("missing header", 0));
    };
    if aln.len() != ntaxa {
        return Err(format_err(
            format!("header announces {ntaxa} sequences, found {}", aln.len()),
            0,
        ));
    }
    Ok(aln)
}

pub fn read_phylip_from_path(path: impl AsRef<Path>) -> PaparaResult<Alignment> {
    let file = File::open(path)?;
    read_phylip_from_reader(BufReader::new(file))
}

pub fn read_phylip_from_bytes(data: &[u8]) -> PaparaResult<Alignment> {
    read_phylip_from_reader(BufReader::new(Cursor::new(data)))
}
