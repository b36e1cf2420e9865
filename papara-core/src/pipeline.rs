//! End-to-end run: references and queries in, extended alignment out.

use crate::align::{
    align_best_scores, calc_scores, AlignedQuery, ExtendedAlignment, ScoringResults,
};
use crate::config::{OutputKind, PaparaConfig};
use crate::error::{PaparaError, PaparaResult};
use crate::io::fasta::read_fasta_records_from_path;
use crate::io::phylip::read_phylip_from_path;
use crate::io::report::{write_candidates, write_phylip, write_quality};
use crate::io::Alignment;
use crate::phylo::{parse_newick, PhyloTree};
use crate::queries::Queries;
use crate::refs::References;
use crate::runlog::RunLog;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use std::time::Instant;

/// Parsed inputs of a run.
#[derive(Debug)]
pub struct RunInputs {
    pub tree: PhyloTree,
    pub alignment: Alignment,
    pub queries: Queries,
}

#[derive(Debug)]
pub struct RunOutput {
    pub refs: References,
    pub queries: Queries,
    pub scores: ScoringResults,
    pub aligned: Vec<AlignedQuery>,
    pub extended: ExtendedAlignment,
}

pub fn run(config: &PaparaConfig, inputs: RunInputs, log: &RunLog) -> PaparaResult<RunOutput> {
    let RunInputs {
        tree,
        alignment,
        mut queries,
    } = inputs;
    if queries.kind() != config.seq_kind {
        return Err(PaparaError::AlphabetMismatch {
            msg: format!(
                "queries are {} but the run expects {}",
                queries.kind(),
                config.seq_kind
            ),
        });
    }
    queries.preprocess()?;

    let start = Instant::now();
    log.info(format_args!(
        "run '{}': {} references, {} queries, {} alignment columns",
        config.run_name,
        alignment.len(),
        queries.len(),
        alignment.num_columns()
    ));

    let mut refs = References::new(tree, alignment, &queries, config.gap_policy, log)?;
    refs.remove_full_gaps(log)?;

    let scores = calc_scores(config, &refs, &queries, log)?;
    let aligned = align_best_scores(config, &refs, &queries, &scores, log)?;
    let extended = ExtendedAlignment::build(&refs, &queries, &aligned, config.ref_gaps);

    log.info(format_args!(
        "run '{}' done in {:.3}s: extended alignment {} x {}",
        config.run_name,
        start.elapsed().as_secs_f64(),
        extended.num_rows(),
        extended.width()
    ));
    Ok(RunOutput {
        refs,
        queries,
        scores,
        aligned,
        extended,
    })
}

fn create_output(config: &PaparaConfig, kind: OutputKind) -> PaparaResult<BufWriter<File>> {
    Ok(BufWriter::new(File::create(config.output_path(kind))?))
}

/// Reads the inputs from disk, runs, and writes the output files named
/// after `config.run_name` into `config.out_dir`. Refuses to start when the
/// run's log file already exists, unless [`PaparaConfig::may_overwrite`].
pub fn run_files(
    config: &PaparaConfig,
    tree_path: impl AsRef<Path>,
    alignment_path: impl AsRef<Path>,
    query_path: impl AsRef<Path>,
) -> PaparaResult<RunOutput> {
    let log = RunLog::create(
        &config.output_path(OutputKind::Log),
        &config.run_name,
        config.may_overwrite(),
    )?;

    let tree = parse_newick(&fs::read_to_string(tree_path)?)?;
    let alignment = read_phylip_from_path(alignment_path)?;
    let records = read_fasta_records_from_path(query_path)?;
    let queries = Queries::from_records(config.seq_kind, records)?;

    let output = run(
        config,
        RunInputs {
            tree,
            alignment,
            queries,
        },
        &log,
    )?;

    write_phylip(create_output(config, OutputKind::Alignment)?, &output.extended)?;
    write_quality(create_output(config, OutputKind::Quality)?, &output.extended)?;
    if config.num_candidates > 0 {
        write_candidates(
            create_output(config, OutputKind::Candidates)?,
            &output.refs,
            &output.queries,
            &output.scores,
        )?;
    }
    log.flush()?;
    Ok(output)
}
