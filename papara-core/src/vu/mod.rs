//! Fixed-width vector units.
//!
//! Every backend is a zero-sized marker type implementing [`VectorUnit`]; the
//! scoring kernels are generic over the unit and are monomorphised once per
//! backend, so choosing a backend costs nothing inside the DP loop.
//!
//! All arithmetic saturates at the element bounds. Comparisons yield all-ones
//! lanes (`-1`) for true and zero lanes for false, so their results can be fed
//! straight into [`VectorUnit::bit_and`] / [`VectorUnit::bit_andnot`].

mod aligned;
#[cfg(feature = "simd")]
mod i16x16;
#[cfg(feature = "simd")]
mod i16x8;
#[cfg(feature = "simd")]
mod i8x16;
mod scalar;
#[cfg(feature = "simd")]
mod split;

pub use aligned::AlignedBuffer;
#[cfg(feature = "simd")]
pub use i16x16::I16x16;
#[cfg(feature = "simd")]
pub use i16x8::I16x8;
#[cfg(feature = "simd")]
pub use i8x16::I8x16;
pub use scalar::Scalar16;
#[cfg(feature = "simd")]
pub use split::{I16x16Split, SplitVector};

use std::fmt::Debug;


/// Scalar type held in one lane.
pub trait Lane: Copy + Ord + Default + Debug + Send + Sync + 'static {
    const MIN: Self;
    const MAX: Self;

    /// Converts with clamping to the lane range.
    fn from_i32_sat(v: i32) -> Self;

    fn to_i32(self) -> i32;
}

impl Lane for i8 {
    const MIN: Self = i8::MIN;
    const MAX: Self = i8::MAX;

    #[inline]
    fn from_i32_sat(v: i32) -> Self {
        v.clamp(i8::MIN as i32, i8::MAX as i32) as i8
    }

    #[inline]
    fn to_i32(self) -> i32 {
        self as i32
    }
}

impl Lane for i16 {
    const MIN: Self = i16::MIN;
    const MAX: Self = i16::MAX;

    #[inline]
    fn from_i32_sat(v: i32) -> Self {
        v.clamp(i16::MIN as i32, i16::MAX as i32) as i16
    }

    #[inline]
    fn to_i32(self) -> i32 {
        self as i32
    }
}

/// Operation contract shared by every backend.
pub trait VectorUnit: Copy + Send + Sync + 'static {
    type Elem: Lane;
    type Vector: Copy + Send + Sync;

    /// Number of lanes.
    const W: usize;
    /// Byte alignment required by [`load`](Self::load) and [`store`](Self::store).
    const ALIGN: usize;
    /// Offset added to every stored score.
    const BIAS: Self::Elem;
    /// Marks unreachable cells; adding non-positive weights keeps it below
    /// every reachable score.
    const SMALL_VALUE: Self::Elem;
    const NAME: &'static str;

    fn setzero() -> Self::Vector;
    fn broadcast(v: Self::Elem) -> Self::Vector;

    /// Loads `W` lanes from the front of `src`.
    ///
    /// # Panics
    /// If `src` is not aligned to `ALIGN` bytes or holds fewer than `W` lanes.
    fn load(src: &[Self::Elem]) -> Self::Vector;

    /// Stores `W` lanes to the front of `dst`.
    ///
    /// # Panics
    /// If `dst` is not aligned to `ALIGN` bytes or holds fewer than `W` lanes.
    fn store(v: Self::Vector, dst: &mut [Self::Elem]);

    fn bit_and(a: Self::Vector, b: Self::Vector) -> Self::Vector;
    /// `!a & b`
    fn bit_andnot(a: Self::Vector, b: Self::Vector) -> Self::Vector;
    fn add(a: Self::Vector, b: Self::Vector) -> Self::Vector;
    fn sub(a: Self::Vector, b: Self::Vector) -> Self::Vector;
    fn compare_zero(a: Self::Vector) -> Self::Vector;
    fn compare_equal(a: Self::Vector, b: Self::Vector) -> Self::Vector;
    fn compare_less_than(a: Self::Vector, b: Self::Vector) -> Self::Vector;
    fn min(a: Self::Vector, b: Self::Vector) -> Self::Vector;
    fn max(a: Self::Vector, b: Self::Vector) -> Self::Vector;

    /// Lane-wise `mask ? a : b` for masks produced by the comparisons.
    #[inline]
    fn select(mask: Self::Vector, a: Self::Vector, b: Self::Vector) -> Self::Vector {
        // Exactly one side is zero in every lane, so the add cannot saturate.
        Self::add(Self::bit_and(mask, a), Self::bit_andnot(mask, b))
    }
}

#[inline]
#[track_caller]
pub(crate) fn check_access<T>(lanes: &[T], align: usize, w: usize) {
    assert!(
        lanes.len() >= w,
        "vector access needs {} lanes, slice holds {}",
        w,
        lanes.len()
    );
    assert!(
        (lanes.as_ptr() as usize) % align == 0,
        "vector access at {:p} is not {}-byte aligned",
        lanes.as_ptr(),
        align
    );
}
