//! Instance buffer - a growable array of `#[repr(C)]` instances with slot
//! reuse, ready to upload as raw bytes.

use bytemuck::Pod;

/// Fixed-capacity storage that doubles on demand.
///
/// Freed slots are zeroed and reused before the buffer grows. Compaction is
/// done by the owning group on the frame pass.
#[derive(Debug, Clone)]
pub struct InstanceBuffer<T: Pod> {
    data: Vec<T>,
    live: Vec<bool>,
    free: Vec<usize>,
    count: usize,
}

impl<T: Pod> Default for InstanceBuffer<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<T: Pod> InstanceBuffer<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![T::zeroed(); capacity],
            live: vec![false; capacity],
            free: (0..capacity).rev().collect(),
            count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Live instances.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Store `value` in a free slot, growing the buffer if there is none.
    pub fn allocate(&mut self, value: T) -> usize {
        if self.free.is_empty() {
            self.grow();
        }
        let Some(slot) = self.free.pop() else {
            unreachable!("instance buffer grew without free slots");
        };
        self.data[slot] = value;
        self.live[slot] = true;
        self.count += 1;
        slot
    }

    fn grow(&mut self) {
        let old = self.capacity();
        let new = (old * 2).max(1);
        self.data.resize(new, T::zeroed());
        self.live.resize(new, false);
        self.free.extend((old..new).rev());
    }

    pub fn get(&self, slot: usize) -> Option<&T> {
        self.live.get(slot).copied().unwrap_or(false).then(|| &self.data[slot])
    }

    pub fn set(&mut self, slot: usize, value: T) {
        if self.live.get(slot).copied().unwrap_or(false) {
            self.data[slot] = value;
        }
    }

    pub fn release(&mut self, slot: usize) {
        if !self.live.get(slot).copied().unwrap_or(false) {
            return;
        }
        self.data[slot] = T::zeroed();
        self.live[slot] = false;
        self.free.push(slot);
        self.count -= 1;
    }

    /// Rewrite the buffer so `values` occupy slots `0..n` in order.
    ///
    /// Capacity halves while at most a quarter of it would be used.
    pub fn rewrite(&mut self, values: impl IntoIterator<Item = T>) {
        let values: Vec<T> = values.into_iter().collect();
        let mut capacity = self.capacity().max(values.len());
        while capacity > 1 && values.len() * 4 <= capacity {
            capacity /= 2;
        }
        let capacity = capacity.max(values.len());

        self.count = values.len();
        self.data = values;
        self.data.resize(capacity, T::zeroed());
        self.live = (0..capacity).map(|i| i < self.count).collect();
        self.free = (self.count..capacity).rev().collect();
    }

    /// Whether live instances are packed at the front.
    pub fn is_compact(&self) -> bool {
        self.live.iter().take(self.count).all(|l| *l)
    }

    /// All slots, including free (zeroed) ones.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Raw bytes for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grows_by_doubling() {
        let mut buffer = InstanceBuffer::<[f32; 4]>::default();
        let caps: Vec<_> = (0..5)
            .map(|i| {
                buffer.allocate([i as f32; 4]);
                buffer.capacity()
            })
            .collect();
        assert_eq!(caps, vec![1, 2, 4, 4, 8]);
        assert_eq!(buffer.len(), 5);
        assert_eq!(buffer.as_bytes().len(), 8 * 16);
    }

    #[test]
    fn test_reuses_freed_slot() {
        let mut buffer = InstanceBuffer::<[f32; 4]>::with_capacity(4);
        let a = buffer.allocate([1.0; 4]);
        let b = buffer.allocate([2.0; 4]);
        buffer.release(a);
        assert_eq!(buffer.get(a), None);
        assert_eq!(buffer.as_slice()[a], [0.0; 4]);

        let c = buffer.allocate([3.0; 4]);
        assert_eq!(c, a);
        assert_eq!(buffer.get(b), Some(&[2.0; 4]));
        assert_eq!(buffer.capacity(), 4);
    }

    #[test]
    fn test_rewrite_compacts_and_shrinks() {
        let mut buffer = InstanceBuffer::<[f32; 4]>::with_capacity(16);
        buffer.allocate([1.0; 4]);
        buffer.rewrite([[5.0; 4], [6.0; 4]]);

        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.capacity(), 4);
        assert!(buffer.is_compact());
        assert_eq!(buffer.get(1), Some(&[6.0; 4]));
        assert_eq!(buffer.allocate([7.0; 4]), 2);
    }
}
