use super::{check_access, VectorUnit};
use wide::{i16x16, CmpEq, CmpGt};

/// 16 saturating 16-bit lanes (AVX-width register), no bias.
#[derive(Clone, Copy, Debug, Default)]
pub struct I16x16;

impl VectorUnit for I16x16 {
    type Elem = i16;
    type Vector = i16x16;

    const W: usize = 16;
    const ALIGN: usize = 32;
    const BIAS: i16 = 0;
    const SMALL_VALUE: i16 = -32000;
    const NAME: &'static str = "i16x16";

    #[inline]
    fn setzero() -> i16x16 {
        i16x16::splat(0)
    }

    #[inline]
    fn broadcast(v: i16) -> i16x16 {
        i16x16::splat(v)
    }

    #[inline]
    fn load(src: &[i16]) -> i16x16 {
        check_access(src, Self::ALIGN, Self::W);
        let mut arr = [0i16; 16];
        arr.copy_from_slice(&src[..16]);
        i16x16::from(arr)
    }

    #[inline]
    fn store(v: i16x16, dst: &mut [i16]) {
        check_access(dst, Self::ALIGN, Self::W);
        dst[..16].copy_from_slice(&v.to_array());
    }

    #[inline]
    fn bit_and(a: i16x16, b: i16x16) -> i16x16 {
        a & b
    }

    #[inline]
    fn bit_andnot(a: i16x16, b: i16x16) -> i16x16 {
        (a ^ i16x16::splat(-1)) & b
    }

    #[inline]
    fn add(a: i16x16, b: i16x16) -> i16x16 {
        a.saturating_add(b)
    }

    #[inline]
    fn sub(a: i16x16, b: i16x16) -> i16x16 {
        a.saturating_sub(b)
    }

    #[inline]
    fn compare_zero(a: i16x16) -> i16x16 {
        a.cmp_eq(i16x16::splat(0))
    }

    #[inline]
    fn compare_equal(a: i16x16, b: i16x16) -> i16x16 {
        a.cmp_eq(b)
    }

    #[inline]
    fn compare_less_than(a: i16x16, b: i16x16) -> i16x16 {
        b.cmp_gt(a)
    }

    #[inline]
    fn min(a: i16x16, b: i16x16) -> i16x16 {
        a.min(b)
    }

    #[inline]
    fn max(a: i16x16, b: i16x16) -> i16x16 {
        a.max(b)
    }
}
