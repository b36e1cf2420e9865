use super::{check_access, VectorUnit};

/// Single 16-bit lane. Reference backend, and the only one available
/// without the `simd` feature.
#[derive(Clone, Copy, Debug, Default)]
pub struct Scalar16;

#[inline]
fn mask(b: bool) -> i16 {
    if b {
        -1
    } else {
        0
    }
}

impl VectorUnit for Scalar16 {
    type Elem = i16;
    type Vector = i16;

    const W: usize = 1;
    const ALIGN: usize = std::mem::align_of::<i16>();
    const BIAS: i16 = 0;
    const SMALL_VALUE: i16 = -32000;
    const NAME: &'static str = "scalar";

    #[inline]
    fn setzero() -> i16 {
        0
    }

    #[inline]
    fn broadcast(v: i16) -> i16 {
        v
    }

    #[inline]
    fn load(src: &[i16]) -> i16 {
        check_access(src, Self::ALIGN, Self::W);
        src[0]
    }

    #[inline]
    fn store(v: i16, dst: &mut [i16]) {
        check_access(dst, Self::ALIGN, Self::W);
        dst[0] = v;
    }

    #[inline]
    fn bit_and(a: i16, b: i16) -> i16 {
        a & b
    }

    #[inline]
    fn bit_andnot(a: i16, b: i16) -> i16 {
        !a & b
    }

    #[inline]
    fn add(a: i16, b: i16) -> i16 {
        a.saturating_add(b)
    }

    #[inline]
    fn sub(a: i16, b: i16) -> i16 {
        a.saturating_sub(b)
    }

    #[inline]
    fn compare_zero(a: i16) -> i16 {
        mask(a == 0)
    }

    #[inline]
    fn compare_equal(a: i16, b: i16) -> i16 {
        mask(a == b)
    }

    #[inline]
    fn compare_less_than(a: i16, b: i16) -> i16 {
        mask(a < b)
    }

    #[inline]
    fn min(a: i16, b: i16) -> i16 {
        a.min(b)
    }

    #[inline]
    fn max(a: i16, b: i16) -> i16 {
        a.max(b)
    }
}
