use super::{check_access, VectorUnit};
use wide::{i8x16, CmpEq, CmpGt};

/// 16 saturating 8-bit lanes. Scores are stored shifted by `BIAS`.
#[derive(Clone, Copy, Debug, Default)]
pub struct I8x16;

impl VectorUnit for I8x16 {
    type Elem = i8;
    type Vector = i8x16;

    const W: usize = 16;
    const ALIGN: usize = 16;
    // Placement scores skew positive, so the window is shifted up.
    const BIAS: i8 = -64;
    const SMALL_VALUE: i8 = i8::MIN;
    const NAME: &'static str = "i8x16";

    #[inline]
    fn setzero() -> i8x16 {
        i8x16::splat(0)
    }

    #[inline]
    fn broadcast(v: i8) -> i8x16 {
        i8x16::splat(v)
    }

    #[inline]
    fn load(src: &[i8]) -> i8x16 {
        check_access(src, Self::ALIGN, Self::W);
        let mut arr = [0i8; 16];
        arr.copy_from_slice(&src[..16]);
        i8x16::from(arr)
    }

    #[inline]
    fn store(v: i8x16, dst: &mut [i8]) {
        check_access(dst, Self::ALIGN, Self::W);
        dst[..16].copy_from_slice(&v.to_array());
    }

    #[inline]
    fn bit_and(a: i8x16, b: i8x16) -> i8x16 {
        a & b
    }

    #[inline]
    fn bit_andnot(a: i8x16, b: i8x16) -> i8x16 {
        (a ^ i8x16::splat(-1)) & b
    }

    #[inline]
    fn add(a: i8x16, b: i8x16) -> i8x16 {
        a.saturating_add(b)
    }

    #[inline]
    fn sub(a: i8x16, b: i8x16) -> i8x16 {
        a.saturating_sub(b)
    }

    #[inline]
    fn compare_zero(a: i8x16) -> i8x16 {
        a.cmp_eq(i8x16::splat(0))
    }

    #[inline]
    fn compare_equal(a: i8x16, b: i8x16) -> i8x16 {
        a.cmp_eq(b)
    }

    #[inline]
    fn compare_less_than(a: i8x16, b: i8x16) -> i8x16 {
        b.cmp_gt(a)
    }

    #[inline]
    fn min(a: i8x16, b: i8x16) -> i8x16 {
        a.min(b)
    }

    #[inline]
    fn max(a: i8x16, b: i8x16) -> i8x16 {
        a.max(b)
    }
}
