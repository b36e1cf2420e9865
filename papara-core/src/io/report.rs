//! Output writers: extended alignment, per-column quality and candidate
//! placements.

use crate::align::{ExtendedAlignment, ScoringResults};
use crate::error::PaparaResult;
use crate::queries::Queries;
use crate::refs::References;
use csv::WriterBuilder;
use std::io::Write;

fn write_row<W: Write>(out: &mut W, name: &str, pad: usize, row: &[u8]) -> PaparaResult<()> {
    write!(out, "{name:<pad$}")?;
    out.write_all(row)?;
    out.write_all(b"\n")?;
    Ok(())
}

/// Relaxed phylip: `rows width` header, then every reference and query row
/// with its name padded to one past the longest name.
pub fn write_phylip<W: Write>(mut out: W, aln: &ExtendedAlignment) -> PaparaResult<()> {
    let pad = aln.max_name_length() + 1;
    writeln!(out, "{} {}", aln.num_rows(), aln.width())?;
    for (name, row) in aln.names.iter().zip(&aln.rows) {
        write_row(&mut out, name, pad, row)?;
    }
    out.flush()?;
    Ok(())
}

/// Quality rows of the queries, in the same layout as [`write_phylip`].
pub fn write_quality<W: Write>(mut out: W, aln: &ExtendedAlignment) -> PaparaResult<()> {
    let pad = aln.max_name_length() + 1;
    writeln!(out, "{} {}", aln.quality.len(), aln.width())?;
    for (name, row) in aln.query_names().iter().zip(&aln.quality) {
        write_row(&mut out, name, pad, row)?;
    }
    out.flush()?;
    Ok(())
}

/// Tab-separated `query edge rank score`, ranks starting at 1.
pub fn write_candidates<W: Write>(
    out: W,
    refs: &References,
    queries: &Queries,
    scores: &ScoringResults,
) -> PaparaResult<()> {
    let mut writer = WriterBuilder::new().delimiter(b'\t').from_writer(out);
    writer.write_record(["query", "edge", "rank", "score"])?;
    for (q, res) in scores.iter().enumerate() {
        for (rank, cand) in res.candidates.iter().enumerate() {
            writer.write_record([
                queries.name(q).to_string(),
                refs.edge_name(cand.edge),
                (rank + 1).to_string(),
                cand.score.to_string(),
            ])?;
        }
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::calc_scores;
    use crate::alphabets::SeqKind;
    use crate::config::PaparaConfig;
    use crate::io::Alignment;
    use crate::phylo::parse_newick;
    use crate::refs::GapPolicy;
    use crate::runlog::RunLog;

    fn small() -> ExtendedAlignment {
        ExtendedAlignment {
            names: vec!["ref_a".into(), "b".into(), "query1".into()],
            rows: vec![b"AC--GT".to_vec(), b"AA--GT".to_vec(), b"ACTTGT".to_vec()],
            quality: vec![b"MMIIMM".to_vec()],
            num_refs: 2,
        }
    }

    #[test]
    fn phylip_pads_names() {
        let mut out = Vec::new();
        write_phylip(&mut out, &small()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "3 6\nref_a  AC--GT\nb      AA--GT\nquery1 ACTTGT\n"
        );
    }

    #[test]
    fn quality_only_lists_queries() {
        let mut out = Vec::new();
        write_quality(&mut out, &small()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1 6\nquery1 MMIIMM\n");
    }

    #[test]
    fn candidates_are_ranked() {
        let mut queries = Queries::new(SeqKind::Dna);
        queries.push("q", b"AAAA".to_vec()).unwrap();
        queries.preprocess().unwrap();
        let mut aln = Alignment::new();
        aln.push("A", b"AAAA".to_vec());
        aln.push("B", b"CCCC".to_vec());
        aln.push("C", b"CCCC".to_vec());
        let log = RunLog::new();
        let tree = parse_newick("(A,B,C);").unwrap();
        let refs = References::new(tree, aln, &queries, GapPolicy::Plain, &log).unwrap();
        let scores = calc_scores(
            &PaparaConfig::default().with_candidates(2),
            &refs,
            &queries,
            &log,
        )
        .unwrap();

        let mut out = Vec::new();
        write_candidates(&mut out, &refs, &queries, &scores).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "query\tedge\trank\tscore\nq\tA\t1\t8\nq\tB\t2\t0\n"
        );
    }
}
