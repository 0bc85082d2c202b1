use serde::{Deserialize, Serialize};

/// Index data stored at the narrowest width that addresses every vertex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexBuffer {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl Default for IndexBuffer {
    fn default() -> Self {
        IndexBuffer::U16(Vec::new())
    }
}

impl IndexBuffer {
    /// Pack `indices` for a mesh of `vertex_count` vertices: 8-bit up to 256
    /// vertices, 16-bit up to 65536, 32-bit beyond.
    ///
    /// Every index must be below `vertex_count`.
    pub fn for_vertex_count(indices: &[u32], vertex_count: usize) -> Self {
        debug_assert!(indices.iter().all(|&i| (i as usize) < vertex_count.max(1)));
        if vertex_count <= 1 << 8 {
            IndexBuffer::U8(indices.iter().map(|&i| i as u8).collect())
        } else if vertex_count <= 1 << 16 {
            IndexBuffer::U16(indices.iter().map(|&i| i as u16).collect())
        } else {
            IndexBuffer::U32(indices.to_vec())
        }
    }

    pub fn len(&self) -> usize {
        match self {
            IndexBuffer::U8(v) => v.len(),
            IndexBuffer::U16(v) => v.len(),
            IndexBuffer::U32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes per index.
    pub fn width(&self) -> usize {
        match self {
            IndexBuffer::U8(_) => 1,
            IndexBuffer::U16(_) => 2,
            IndexBuffer::U32(_) => 4,
        }
    }

    /// # Panics
    /// Panics if `i >= self.len()`.
    pub fn get(&self, i: usize) -> u32 {
        match self {
            IndexBuffer::U8(v) => v[i] as u32,
            IndexBuffer::U16(v) => v[i] as u32,
            IndexBuffer::U32(v) => v[i],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    pub fn to_u32(&self) -> Vec<u32> {
        self.iter().collect()
    }
}

/// Sequential indices `0..n`, 16-bit when `n < 65536`.
pub fn make_indices(n: usize) -> IndexBuffer {
    if n < 1 << 16 {
        IndexBuffer::U16((0..n).map(|i| i as u16).collect())
    } else {
        IndexBuffer::U32((0..n).map(|i| i as u32).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_indices_sequential() {
        let idx = make_indices(5);
        assert_eq!(idx, IndexBuffer::U16(vec![0, 1, 2, 3, 4]));
        assert!(make_indices(0).is_empty());
    }

    #[test]
    fn test_make_indices_width_boundary() {
        let below = make_indices(65535);
        assert_eq!(below.width(), 2);
        assert_eq!(below.get(65534), 65534);

        let at = make_indices(65536);
        assert_eq!(at.width(), 4);
        assert_eq!(at.get(65535), 65535);
        assert!(at.iter().zip(at.iter().skip(1)).all(|(a, b)| b == a + 1));
    }

    #[test]
    fn test_for_vertex_count_widths() {
        assert_eq!(IndexBuffer::for_vertex_count(&[0, 255], 256).width(), 1);
        assert_eq!(IndexBuffer::for_vertex_count(&[0, 256], 257).width(), 2);
        let wide = IndexBuffer::for_vertex_count(&[0, 65536], 65537);
        assert_eq!(wide.width(), 4);
        assert_eq!(wide.to_u32(), vec![0, 65536]);
        let narrow = IndexBuffer::for_vertex_count(&[255, 0], 256);
        assert_eq!(narrow.to_u32(), vec![255, 0]);
    }
}
