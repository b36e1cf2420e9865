use super::StateSet;

/// Canonical amino-acid states, in bit order.
pub const STATES: &[u8] = b"ARNDCQEGHILKMFPSTWYV";

const fn bit(aa: u8) -> StateSet {
    let mut i = 0;
    while i < STATES.len() {
        if STATES[i] == aa {
            return 1 << i;
        }
        i += 1;
    }
    panic!("not a canonical amino acid")
}

pub(super) const CODES: &[(u8, StateSet)] = &[
    (b'A', bit(b'A')),
    (b'R', bit(b'R')),
    (b'N', bit(b'N')),
    (b'D', bit(b'D')),
    (b'C', bit(b'C')),
    (b'Q', bit(b'Q')),
    (b'E', bit(b'E')),
    (b'G', bit(b'G')),
    (b'H', bit(b'H')),
    (b'I', bit(b'I')),
    (b'L', bit(b'L')),
    (b'K', bit(b'K')),
    (b'M', bit(b'M')),
    (b'F', bit(b'F')),
    (b'P', bit(b'P')),
    (b'S', bit(b'S')),
    (b'T', bit(b'T')),
    (b'W', bit(b'W')),
    (b'Y', bit(b'Y')),
    (b'V', bit(b'V')),
    (b'B', bit(b'D') | bit(b'N')),
    (b'Z', bit(b'E') | bit(b'Q')),
    (b'J', bit(b'I') | bit(b'L')),
    (b'X', (1 << 20) - 1),
];
