use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaparaError {
    #[error("invalid character '{ch}' in sequence '{name}' at position {pos}")]
    InvalidSymbol { name: String, ch: char, pos: usize },

    #[error("alphabet mismatch: {msg}")]
    AlphabetMismatch { msg: String },

    #[error("invalid scoring parameters: {msg}")]
    InvalidScoring { msg: String },

    #[error("invalid configuration: {msg}")]
    InvalidConfig { msg: String },

    #[error("no query sequences to place")]
    NoQueries,

    #[error("degenerate reference tree: {msg}")]
    DegenerateTree { msg: String },

    #[error("newick format error at byte {pos}: {msg}")]
    NewickFormat { msg: &'static str, pos: usize },

    #[error("phylip format error at line {line}: {msg}")]
    PhylipFormat { msg: String, line: usize },

    #[error("fasta format error at line {line}: {msg}")]
    FastaFormat { msg: &'static str, line: usize },

    #[error("tree taxon '{name}' has no row in the reference alignment")]
    MissingTaxon { name: String },

    #[error("alignment row '{name}' is not a leaf of the reference tree")]
    UnknownTaxon { name: String },

    #[error("duplicate sequence name '{name}'")]
    DuplicateName { name: String },

    #[error("reference row '{name}' has {len} columns, expected {expected}")]
    RaggedAlignment {
        name: String,
        len: usize,
        expected: usize,
    },

    #[error(
        "scores for query '{name}' (len {query_len}) against {columns} columns exceed 16-bit range (bound {bound})"
    )]
    ScoreRange {
        name: String,
        query_len: usize,
        columns: usize,
        bound: i64,
    },

    #[error("log file for run '{run}' already exists")]
    RunExists { run: String },

    #[error("thread pool error: {0}")]
    ThreadPool(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("report write error: {0}")]
    Report(#[from] csv::Error),
}

pub type PaparaResult<T> = Result<T, PaparaError>;
