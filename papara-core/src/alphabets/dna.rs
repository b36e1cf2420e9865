use super::StateSet;

/// Canonical nucleotide states, in bit order.
pub const STATES: &[u8] = b"ACGT";

const A: StateSet = 1;
const C: StateSet = 1 << 1;
const G: StateSet = 1 << 2;
const T: StateSet = 1 << 3;

pub(super) const CODES: &[(u8, StateSet)] = &[
    (b'A', A),
    (b'C', C),
    (b'G', G),
    (b'T', T),
    (b'U', T),
    (b'R', A | G),
    (b'Y', C | T),
    (b'S', C | G),
    (b'W', A | T),
    (b'K', G | T),
    (b'M', A | C),
    (b'B', C | G | T),
    (b'D', A | G | T),
    (b'H', A | C | T),
    (b'V', A | C | G),
    (b'N', A | C | G | T),
];
