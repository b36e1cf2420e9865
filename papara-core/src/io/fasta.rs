use crate::error::{PaparaError, PaparaResult};
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FastaRecord {
    pub id: Box<str>,
    pub desc: Option<Box<str>>,
    pub seq: Vec<u8>,
}

impl FastaRecord {
    pub fn new(id: impl Into<Box<str>>, seq: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            desc: None,
            seq: seq.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn desc(&self) -> Option<&str> {
        self.desc.as_deref()
    }

    pub fn seq(&self) -> &[u8] {
        &self.seq
    }
}

/// Streaming reader over the records of a FASTA file. Blank lines before
/// the first header are skipped; sequence lines lose their whitespace but
/// keep gap characters.
pub struct FastaRecords<R> {
    reader: R,
    line: String,
    line_no: usize,
    /// Header of the following record, met while reading the current one.
    next_header: Option<(Box<str>, Option<Box<str>>)>,
}

impl<R: BufRead> FastaRecords<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_no: 0,
            next_header: None,
        }
    }

    /// `false` at end of input.
    fn read_line(&mut self) -> PaparaResult<bool> {
        self.line.clear();
        let n = self.reader.read_line(&mut self.line)?;
        if n > 0 {
            self.line_no += 1;
        }
        Ok(n > 0)
    }

    fn read_record(&mut self) -> PaparaResult<Option<FastaRecord>> {
        let (id, desc) = match self.next_header.take() {
            Some(header) => header,
            None => loop {
                if !self.read_line()? {
                    return Ok(None);
                }
                if self.line.trim().is_empty() {
                    continue;
                }
                break parse_header(&self.line, self.line_no)?;
            },
        };

        let mut seq = Vec::new();
        while self.read_line()? {
            if self.line.starts_with('>') {
                self.next_header = Some(parse_header(&self.line, self.line_no)?);
                break;
            }
            seq.extend(self.line.bytes().filter(|b| !b.is_ascii_whitespace()));
        }
        Ok(Some(FastaRecord { id, desc, seq }))
    }
}

impl<R: BufRead> Iterator for FastaRecords<R> {
    type Item = PaparaResult<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}

pub fn read_fasta_records_from_reader<R: BufRead>(reader: R) -> PaparaResult<Vec<FastaRecord>> {
    FastaRecords::new(reader).collect()
}

pub fn read_fasta_records_from_path(path: impl AsRef<Path>) -> PaparaResult<Vec<FastaRecord>> {
    read_fasta_records_from_reader(BufReader::new(File::open(path)?))
}

pub fn read_fasta_records_from_bytes(data: &[u8]) -> PaparaResult<Vec<FastaRecord>> {
    read_fasta_records_from_reader(Cursor::new(data))
}

fn parse_header(line: &str, line_no: usize) -> PaparaResult<(Box<str>, Option<Box<str>>)> {
    let body = line
        .strip_prefix('>')
        .ok_or(PaparaError::FastaFormat {
            msg: "expected header line starting with '>'",
            line: line_no,
        })?
        .trim();
    if body.is_empty() {
        return Err(PaparaError::FastaFormat {
            msg: "empty header",
            line: line_no,
        });
    }
    Ok(match body.split_once(char::is_whitespace) {
        Some((id, rest)) => {
            let desc = rest.trim();
            (id.into(), (!desc.is_empty()).then(|| desc.into()))
        }
        None => (body.into(), None),
    })
}
