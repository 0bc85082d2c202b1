//! Strided views over flat float buffers.

use h3d_core::{H3dError, Result};

/// One vertex attribute inside a flat `f32` buffer.
///
/// Value `i` occupies `count_per_value` consecutive floats starting at
/// `offset + i * stride`. Interleaved layouts share one buffer between
/// several accessors with the same stride and different offsets.
///
/// The storage is never resized; producing more values means building a new
/// accessor (see [`BufferAccessor::make_blank`] and [`BufferAccessor::merge`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferAccessor<S = Vec<f32>> {
    buffer: S,
    offset: usize,
    count_per_value: usize,
    stride: usize,
}

/// Borrowed accessor.
pub type BufferView<'a> = BufferAccessor<&'a [f32]>;

impl<S: AsRef<[f32]>> BufferAccessor<S> {
    /// Wrap `buffer` with an explicit layout.
    ///
    /// # Errors
    /// Fails if `count_per_value` or `stride` is zero, or `offset` lies
    /// past the end of the buffer.
    pub fn new(buffer: S, offset: usize, count_per_value: usize, stride: usize) -> Result<Self> {
        if count_per_value == 0 {
            return Err(H3dError::InvalidParameter("count per value must be at least 1".into()));
        }
        if stride == 0 {
            return Err(H3dError::InvalidParameter("stride must be at least 1".into()));
        }
        let len = buffer.as_ref().len();
        if offset > len {
            return Err(H3dError::InvalidParameter(format!(
                "offset {offset} exceeds buffer length {len}"
            )));
        }
        Ok(Self {
            buffer,
            offset,
            count_per_value,
            stride,
        })
    }

    /// Wrap tightly packed values (`stride == count_per_value`, no offset).
    pub fn packed(buffer: S, count_per_value: usize) -> Result<Self> {
        Self::new(buffer, 0, count_per_value, count_per_value)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn count_per_value(&self) -> usize {
        self.count_per_value
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn buffer(&self) -> &[f32] {
        self.buffer.as_ref()
    }

    /// Number of complete values between `offset` and the end of the buffer.
    /// The last value needs only `count_per_value` floats, not a full stride,
    /// and values may overlap when `stride < count_per_value`.
    pub fn count(&self) -> usize {
        let avail = self.buffer.as_ref().len() - self.offset;
        if avail < self.count_per_value {
            0
        } else {
            (avail - self.count_per_value) / self.stride + 1
        }
    }

    fn start(&self, index: usize) -> usize {
        self.offset + index * self.stride
    }

    /// First component of value `index`.
    ///
    /// # Panics
    /// Panics if the value lies outside the buffer.
    pub fn get(&self, index: usize) -> f32 {
        self.buffer.as_ref()[self.start(index)]
    }

    /// Copy value `index` into `out`, up to `min(out.len(), count_per_value)`
    /// components. Remaining entries of `out` are untouched.
    ///
    /// # Panics
    /// Panics if the value lies outside the buffer.
    pub fn get_vec(&self, index: usize, out: &mut [f32]) {
        let n = out.len().min(self.count_per_value);
        let start = self.start(index);
        out[..n].copy_from_slice(&self.buffer.as_ref()[start..start + n]);
    }

    /// All components of value `index`.
    ///
    /// # Panics
    /// Panics if the value lies outside the buffer.
    pub fn value(&self, index: usize) -> &[f32] {
        let start = self.start(index);
        &self.buffer.as_ref()[start..start + self.count_per_value]
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f32]> + '_ {
        (0..self.count()).map(move |i| self.value(i))
    }

    pub fn view(&self) -> BufferView<'_> {
        BufferAccessor {
            buffer: self.buffer.as_ref(),
            offset: self.offset,
            count_per_value: self.count_per_value,
            stride: self.stride,
        }
    }

    /// Independent, tightly packed copy of the logical values.
    pub fn copy(&self) -> BufferAccessor {
        let mut data = Vec::with_capacity(self.count() * self.count_per_value);
        for value in self.iter() {
            data.extend_from_slice(value);
        }
        BufferAccessor {
            buffer: data,
            offset: 0,
            count_per_value: self.count_per_value,
            stride: self.count_per_value,
        }
    }
}

impl<S: AsRef<[f32]> + AsMut<[f32]>> BufferAccessor<S> {
    /// Set the first component of value `index`.
    ///
    /// # Panics
    /// Panics if the value lies outside the buffer.
    pub fn set(&mut self, index: usize, value: f32) {
        let start = self.start(index);
        self.buffer.as_mut()[start] = value;
    }

    /// Write `min(value.len(), count_per_value)` components of value `index`.
    /// Excess source components are ignored; a short source leaves the
    /// trailing components unchanged.
    ///
    /// # Panics
    /// Panics if the value lies outside the buffer.
    pub fn set_vec(&mut self, index: usize, value: &[f32]) {
        let n = value.len().min(self.count_per_value);
        let start = self.start(index);
        self.buffer.as_mut()[start..start + n].copy_from_slice(&value[..n]);
    }
}

impl BufferAccessor {
    /// Zero-filled, tightly packed storage for `count` values.
    ///
    /// # Errors
    /// Fails if `count_per_value` is zero.
    pub fn make_blank(count: usize, count_per_value: usize) -> Result<Self> {
        Self::packed(vec![0.0; count * count_per_value], count_per_value)
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.buffer
    }

    /// Gather two indexed attribute streams into one.
    ///
    /// The result holds `attr1[indices1[i]]` for every `i`, followed by
    /// `attr2[indices2[j]]` for every `j`. Its width is the larger of the two
    /// inputs' widths; narrower values are zero-padded. A missing attribute
    /// contributes zero values for each of its indices.
    ///
    /// # Errors
    /// Fails if both attributes are missing or an index is out of range.
    pub fn merge(
        attr1: Option<BufferView<'_>>,
        indices1: &[u32],
        attr2: Option<BufferView<'_>>,
        indices2: &[u32],
    ) -> Result<Self> {
        let width = match (&attr1, &attr2) {
            (None, None) => {
                return Err(H3dError::InvalidParameter(
                    "merge needs at least one attribute".into(),
                ))
            }
            (Some(a), None) => a.count_per_value,
            (None, Some(b)) => b.count_per_value,
            (Some(a), Some(b)) => a.count_per_value.max(b.count_per_value),
        };

        let mut merged = Self::make_blank(indices1.len() + indices2.len(), width)?;
        let streams = [(attr1, indices1, 0), (attr2, indices2, indices1.len())];
        for (attr, indices, base) in streams {
            let Some(attr) = attr else { continue };
            let count = attr.count();
            for (i, &index) in indices.iter().enumerate() {
                let index = index as usize;
                if index >= count {
                    return Err(H3dError::InvalidParameter(format!(
                        "index {index} out of range for attribute with {count} values"
                    )));
                }
                merged.set_vec(base + i, attr.value(index));
            }
        }
        Ok(merged)
    }
}
