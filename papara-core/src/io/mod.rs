pub mod fasta;
pub mod phylip;
pub mod report;

pub use fasta::FastaRecord;
pub use phylip::Alignment;

pub fn normalize_seq_bytes(input: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    for b in input.bytes() {
        if !b.is_ascii_whitespace() {
            out.push(b);
        }
    }
    out
}
