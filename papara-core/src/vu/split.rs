use super::{check_access, I16x8, VectorUnit};
use wide::i16x8;

/// A 16-lane register made of two 8-lane halves; every primitive runs once
/// per half. Results are bit-identical to [`I16x16`](super::I16x16).
#[derive(Clone, Copy, Debug, Default)]
pub struct I16x16Split;

#[derive(Clone, Copy, Debug)]
pub struct SplitVector {
    lo: i16x8,
    hi: i16x8,
}

impl SplitVector {
    #[inline]
    fn map2(a: Self, b: Self, f: impl Fn(i16x8, i16x8) -> i16x8) -> Self {
        Self {
            lo: f(a.lo, b.lo),
            hi: f(a.hi, b.hi),
        }
    }
}

impl VectorUnit for I16x16Split {
    type Elem = i16;
    type Vector = SplitVector;

    const W: usize = 16;
    const ALIGN: usize = 32;
    const BIAS: i16 = I16x8::BIAS;
    const SMALL_VALUE: i16 = I16x8::SMALL_VALUE;
    const NAME: &'static str = "i16x16-split";

    #[inline]
    fn setzero() -> SplitVector {
        let z = I16x8::setzero();
        SplitVector { lo: z, hi: z }
    }

    #[inline]
    fn broadcast(v: i16) -> SplitVector {
        let b = I16x8::broadcast(v);
        SplitVector { lo: b, hi: b }
    }

    #[inline]
    fn load(src: &[i16]) -> SplitVector {
        check_access(src, Self::ALIGN, Self::W);
        SplitVector {
            lo: I16x8::load(&src[..I16x8::W]),
            hi: I16x8::load(&src[I16x8::W..]),
        }
    }

    #[inline]
    fn store(v: SplitVector, dst: &mut [i16]) {
        check_access(dst, Self::ALIGN, Self::W);
        let (lo, hi) = dst.split_at_mut(I16x8::W);
        I16x8::store(v.lo, lo);
        I16x8::store(v.hi, hi);
    }

    #[inline]
    fn bit_and(a: SplitVector, b: SplitVector) -> SplitVector {
        SplitVector::map2(a, b, I16x8::bit_and)
    }

    #[inline]
    fn bit_andnot(a: SplitVector, b: SplitVector) -> SplitVector {
        SplitVector::map2(a, b, I16x8::bit_andnot)
    }

    #[inline]
    fn add(a: SplitVector, b: SplitVector) -> SplitVector {
        SplitVector::map2(a, b, I16x8::add)
    }

    #[inline]
    fn sub(a: SplitVector, b: SplitVector) -> SplitVector {
        SplitVector::map2(a, b, I16x8::sub)
    }

    #[inline]
    fn compare_zero(a: SplitVector) -> SplitVector {
        SplitVector {
            lo: I16x8::compare_zero(a.lo),
            hi: I16x8::compare_zero(a.hi),
        }
    }

    #[inline]
    fn compare_equal(a: SplitVector, b: SplitVector) -> SplitVector {
        SplitVector::map2(a, b, I16x8::compare_equal)
    }

    #[inline]
    fn compare_less_than(a: SplitVector, b: SplitVector) -> SplitVector {
        SplitVector::map2(a, b, I16x8::compare_less_than)
    }

    #[inline]
    fn min(a: SplitVector, b: SplitVector) -> SplitVector {
        SplitVector::map2(a, b, I16x8::min)
    }

    #[inline]
    fn max(a: SplitVector, b: SplitVector) -> SplitVector {
        SplitVector::map2(a, b, I16x8::max)
    }
}
