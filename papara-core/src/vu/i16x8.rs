use super::{check_access, VectorUnit};
use wide::{i16x8, CmpEq, CmpGt};

/// 8 saturating 16-bit lanes (SSE-width register), no bias.
#[derive(Clone, Copy, Debug, Default)]
pub struct I16x8;

impl VectorUnit for I16x8 {
    type Elem = i16;
    type Vector = i16x8;

    const W: usize = 8;
    const ALIGN: usize = 16;
    const BIAS: i16 = 0;
    const SMALL_VALUE: i16 = -32000;
    const NAME: &'static str = "i16x8";

    #[inline]
    fn setzero() -> i16x8 {
        i16x8::splat(0)
    }

    #[inline]
    fn broadcast(v: i16) -> i16x8 {
        i16x8::splat(v)
    }

    #[inline]
    fn load(src: &[i16]) -> i16x8 {
        check_access(src, Self::ALIGN, Self::W);
        let mut arr = [0i16; 8];
        arr.copy_from_slice(&src[..8]);
        i16x8::from(arr)
    }

    #[inline]
    fn store(v: i16x8, dst: &mut [i16]) {
        check_access(dst, Self::ALIGN, Self::W);
        dst[..8].copy_from_slice(&v.to_array());
    }

    #[inline]
    fn bit_and(a: i16x8, b: i16x8) -> i16x8 {
        a & b
    }

    #[inline]
    fn bit_andnot(a: i16x8, b: i16x8) -> i16x8 {
        (a ^ i16x8::splat(-1)) & b
    }

    #[inline]
    fn add(a: i16x8, b: i16x8) -> i16x8 {
        a.saturating_add(b)
    }

    #[inline]
    fn sub(a: i16x8, b: i16x8) -> i16x8 {
        a.saturating_sub(b)
    }

    #[inline]
    fn compare_zero(a: i16x8) -> i16x8 {
        a.cmp_eq(i16x8::splat(0))
    }

    #[inline]
    fn compare_equal(a: i16x8, b: i16x8) -> i16x8 {
        a.cmp_eq(b)
    }

    #[inline]
    fn compare_less_than(a: i16x8, b: i16x8) -> i16x8 {
        b.cmp_gt(a)
    }

    #[inline]
    fn min(a: i16x8, b: i16x8) -> i16x8 {
        a.min(b)
    }

    #[inline]
    fn max(a: i16x8, b: i16x8) -> i16x8 {
        a.max(b)
    }
}
