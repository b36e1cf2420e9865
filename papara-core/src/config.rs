//! Run configuration.

use crate::align::ScoreParams;
use crate::alphabets::SeqKind;
use crate::error::PaparaError;
use crate::refs::GapPolicy;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Vector unit used by the 16-bit scoring tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Backend {
    /// 8 lanes of 16 bit.
    #[default]
    Sse,
    /// 16 lanes of 16 bit in one register.
    Avx,
    /// 16 lanes of 16 bit as two 8-lane halves.
    AvxSplit,
    /// One lane; never uses the 8-bit tier.
    Scalar,
}

impl Backend {
    pub fn name(self) -> &'static str {
        match self {
            Backend::Sse => "sse",
            Backend::Avx => "avx",
            Backend::AvxSplit => "avx-split",
            Backend::Scalar => "scalar",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = PaparaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sse" => Ok(Backend::Sse),
            "avx" => Ok(Backend::Avx),
            "avx-split" | "avx_split" => Ok(Backend::AvxSplit),
            "scalar" => Ok(Backend::Scalar),
            _ => Err(PaparaError::InvalidConfig {
                msg: format!("unknown vector backend '{s}'"),
            }),
        }
    }
}

/// Output file kinds of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputKind {
    Alignment,
    Quality,
    Candidates,
    Log,
}

impl OutputKind {
    fn stem(self) -> &'static str {
        match self {
            OutputKind::Alignment => "alignment",
            OutputKind::Quality => "quality",
            OutputKind::Candidates => "cands",
            OutputKind::Log => "log",
        }
    }
}

/// `papara_<kind>.<run>`
pub fn filename(run_name: &str, kind: OutputKind) -> String {
    format!("papara_{}.{}", kind.stem(), run_name)
}

pub const DEFAULT_RUN_NAME: &str = "default";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaparaConfig {
    pub run_name: String,
    pub out_dir: PathBuf,
    pub threads: usize,
    pub params: ScoreParams,
    /// Emit columns for residues inserted between reference columns.
    pub ref_gaps: bool,
    pub gap_policy: GapPolicy,
    pub seq_kind: SeqKind,
    /// Length of the per-query candidate list; 0 disables the report.
    pub num_candidates: usize,
    pub backend: Backend,
    /// Try the 8-bit tier before the 16-bit one.
    pub fast_path: bool,
    /// Replace the outputs of an earlier run with the same name.
    pub force_overwrite: bool,
}

impl Default for PaparaConfig {
    fn default() -> Self {
        Self {
            run_name: DEFAULT_RUN_NAME.to_string(),
            out_dir: PathBuf::from("."),
            threads: 1,
            params: ScoreParams::default(),
            ref_gaps: true,
            gap_policy: GapPolicy::Plain,
            seq_kind: SeqKind::Dna,
            num_candidates: 0,
            backend: Backend::default(),
            fast_path: true,
            force_overwrite: false,
        }
    }
}

impl PaparaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_run_name(mut self, run_name: impl Into<String>) -> Self {
        self.run_name = run_name.into();
        self
    }

    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = dir.into();
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn with_params(mut self, params: ScoreParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_ref_gaps(mut self, ref_gaps: bool) -> Self {
        self.ref_gaps = ref_gaps;
        self
    }

    pub fn with_gap_policy(mut self, policy: GapPolicy) -> Self {
        self.gap_policy = policy;
        self
    }

    pub fn with_seq_kind(mut self, kind: SeqKind) -> Self {
        self.seq_kind = kind;
        self
    }

    pub fn with_candidates(mut self, n: usize) -> Self {
        self.num_candidates = n;
        self
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_fast_path(mut self, fast_path: bool) -> Self {
        self.fast_path = fast_path;
        self
    }

    pub fn with_force_overwrite(mut self, force: bool) -> Self {
        self.force_overwrite = force;
        self
    }

    /// Existing output files may be replaced. Always true for the
    /// `default` run.
    pub fn may_overwrite(&self) -> bool {
        self.force_overwrite || self.run_name == DEFAULT_RUN_NAME
    }

    /// 8-bit tier in use for this configuration.
    pub fn uses_fast_tier(&self) -> bool {
        self.fast_path
            && self.backend != Backend::Scalar
            && cfg!(feature = "simd")
            && self.params.fits_fast_tier()
    }

    pub fn output_path(&self, kind: OutputKind) -> PathBuf {
        self.out_dir.join(filename(&self.run_name, kind))
    }
}
