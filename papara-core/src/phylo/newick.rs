use super::tree::{PhyloNode, PhyloTree};
use crate::error::{PaparaError, PaparaResult};

/// Parses a single newick tree.
///
/// Accepts quoted (`'a b'`, `''` escapes) and unquoted labels, `:length`
/// suffixes, `[...]` comments and whitespace between tokens.
pub fn parse_newick(text: &str) -> PaparaResult<PhyloTree> {
    let mut parser = Parser {
        bytes: text.as_bytes(),
        pos: 0,
        nodes: Vec::new(),
    };
    let root = parser.subtree(None)?;
    parser.skip_space()?;
    if parser.peek() != Some(b';') {
        return Err(parser.error("expected ';' after tree"));
    }
    parser.pos += 1;
    parser.skip_space()?;
    if parser.pos != parser.bytes.len() {
        return Err(parser.error("trailing characters after ';'"));
    }
    PhyloTree::from_nodes(parser.nodes, root)
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
    nodes: Vec<PhyloNode>,
}

impl Parser<'_> {
    fn error(&self, msg: &'static str) -> PaparaError {
        PaparaError::NewickFormat { msg, pos: self.pos }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_space(&mut self) -> PaparaResult<()> {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else if b == b'[' {
                match memchr::memchr(b']', &self.bytes[self.pos..]) {
                    Some(len) => self.pos += len + 1,
                    None => return Err(self.error("unterminated comment")),
                }
            } else {
                break;
            }
        }
        Ok(())
    }

    fn subtree(&mut self, parent: Option<usize>) -> PaparaResult<usize> {
        self.skip_space()?;
        let idx = self.nodes.len();
        self.nodes.push(PhyloNode {
            label: None,
            branch_length: None,
            parent,
            children: Vec::new(),
        });

        if self.peek() == Some(b'(') {
            self.pos += 1;
            loop {
                let child = self.subtree(Some(idx))?;
                self.nodes[idx].children.push(child);
                self.skip_space()?;
                match self.peek() {
                    Some(b',') => self.pos += 1,
                    Some(b')') => {
                        self.pos += 1;
                        break;
                    }
                    _ => return Err(self.error("expected ',' or ')'")),
                }
            }
        }

        self.skip_space()?;
        let label = self.label()?;
        if self.nodes[idx].children.is_empty() && label.is_none() {
            return Err(self.error("leaf without a label"));
        }
        self.nodes[idx].label = label;

        self.skip_space()?;
        if self.peek() == Some(b':') {
            self.pos += 1;
            self.skip_space()?;
            self.nodes[idx].branch_length = Some(self.number()?);
        }
        Ok(idx)
    }

    fn label(&mut self) -> PaparaResult<Option<Box<str>>> {
        if self.peek() == Some(b'\'') {
            self.pos += 1;
            let mut out = Vec::new();
            loop {
                match self.peek() {
                    None => return Err(self.error("unterminated quoted label")),
                    Some(b'\'') if self.bytes.get(self.pos + 1) == Some(&b'\'') => {
                        out.push(b'\'');
                        self.pos += 2;
                    }
                    Some(b'\'') => {
                        self.pos += 1;
                        break;
                    }
                    Some(b) => {
                        out.push(b);
                        self.pos += 1;
                    }
                }
            }
            let label = String::from_utf8(out).map_err(|_| self.error("label is not utf-8"))?;
            return Ok(Some(label.into_boxed_str()));
        }

        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() || matches!(b, b'(' | b')' | b',' | b':' | b';' | b'[') {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Ok(None);
        }
        let label = std::str::from_utf8(&self.bytes[start..self.pos])
            .map_err(|_| self.error("label is not utf-8"))?;
        Ok(Some(label.into()))
    }

    fn number(&mut self) -> PaparaResult<f64> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E') {
                self.pos += 1;
            } else {
                break;
            }
        }
        std::str::from_utf8(&self.bytes[start..self.pos])
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .ok_or(PaparaError::NewickFormat {
                msg: "invalid branch length",
                pos: start,
            })
    }
}
