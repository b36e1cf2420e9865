use super::VectorUnit;

/// Lane storage whose visible slice starts on a vector-aligned address and
/// whose length is a multiple of the lane count.
///
/// The backing `Vec` is over-allocated by one alignment unit and never
/// reallocated, so the aligned window stays valid for the buffer's lifetime.
#[derive(Debug)]
pub struct AlignedBuffer<T> {
    data: Vec<T>,
    offset: usize,
    len: usize,
}

impl<T: Copy> AlignedBuffer<T> {
    /// `len` is rounded up to a multiple of `lanes`; every cell starts as `fill`.
    pub fn new(len: usize, lanes: usize, align: usize, fill: T) -> Self {
        let elem = std::mem::size_of::<T>().max(1);
        assert!(
            align.is_power_of_two() && align % elem == 0,
            "alignment {align} incompatible with element size {elem}"
        );
        let len = len.div_ceil(lanes.max(1)) * lanes.max(1);
        let data = vec![fill; len + align / elem];
        let addr = data.as_ptr() as usize;
        let offset = ((align - addr % align) % align) / elem;
        Self { data, offset, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data[self.offset..self.offset + self.len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data[self.offset..self.offset + self.len]
    }

    pub fn fill(&mut self, value: T) {
        self.as_mut_slice().fill(value);
    }
}

impl<T: super::Lane> AlignedBuffer<T> {
    /// Buffer laid out for unit `V`, padding cells set to its sentinel.
    pub fn for_unit<V: VectorUnit<Elem = T>>(len: usize) -> Self {
        Self::new(len, V::W, V::ALIGN, V::SMALL_VALUE)
    }

    /// Lanes `[idx * W, (idx + 1) * W)` of the buffer.
    #[inline]
    pub fn group<V: VectorUnit<Elem = T>>(&self, idx: usize) -> &[T] {
        &self.as_slice()[idx * V::W..(idx + 1) * V::W]
    }

    #[inline]
    pub fn group_mut<V: VectorUnit<Elem = T>>(&mut self, idx: usize) -> &mut [T] {
        &mut self.as_mut_slice()[idx * V::W..(idx + 1) * V::W]
    }
}
