//! Fixed-Size Circular Buffer
//!
//! ## Overview
//!
//! Ring buffer whose capacity is fixed at compile time. The calibrator keeps
//! its 60-slot window of rest means here and reads the oldest entry after
//! every write to detect drift. Nothing is allocated after construction.
//!
//! ### Properties
//!
//! - O(1) insertion (overwrites oldest when full)
//! - O(1) access to the newest and the oldest entry
//! - Zero heap allocations
//!
//! ### Memory Layout
//!
//! ```text
//! CircularBuffer<T, 5>:
//! ┌─────┬─────┬─────┬─────┬─────┐
//! │  0  │  1  │  2  │  3  │  4  │  ← Array indices
//! └─────┴─────┴─────┴─────┴─────┘
//!    ↑                       ↑
//!    └── write_pos = 0      └── After 5 writes, wraps here
//!
//! Total size = N * size_of::<Option<T>>() + 2 * usize
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use axisguard_core::buffer::CircularBuffer;
//!
//! let mut history: CircularBuffer<f32, 3> = CircularBuffer::new();
//! history.push(1.0);
//! history.push(2.0);
//! history.push(3.0);
//! history.push(4.0); // overwrites 1.0
//!
//! assert_eq!(history.oldest(), Some(&2.0));
//! assert_eq!(history.last(), Some(&4.0));
//! ```

/// Fixed-size circular buffer
///
/// ## Internal Invariants
///
/// - `write_pos < N` (next write position is always valid)
/// - `len <= N`
/// - Iteration yields items oldest first
///
/// ## Thread Safety
///
/// Not synchronized. Each pipeline instance owns its buffers.
#[derive(Clone)]
pub struct CircularBuffer<T: Copy, const N: usize> {
    /// Storage; `None` marks slots never written
    data: [Option<T>; N],
    /// Index where the next write will occur
    write_pos: usize,
    /// Current number of valid entries
    len: usize,
}

impl<T: Copy, const N: usize> CircularBuffer<T, N> {
    /// Creates a new empty buffer
    pub const fn new() -> Self {
        Self {
            data: [None; N],
            write_pos: 0,
            len: 0,
        }
    }

    /// Adds an entry, overwriting the oldest one when full
    pub fn push(&mut self, item: T) {
        if N == 0 {
            return;
        }

        self.data[self.write_pos] = Some(item);
        self.write_pos = (self.write_pos + 1) % N;

        if self.len < N {
            self.len += 1;
        }
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.len
    }

    /// Capacity fixed at compile time
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Most recent entry
    pub fn last(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }

        let idx = if self.write_pos == 0 { N - 1 } else { self.write_pos - 1 };
        self.data[idx].as_ref()
    }

    /// Oldest entry still held
    ///
    /// Once full, this is the slot the next `push` overwrites.
    pub fn oldest(&self) -> Option<&T> {
        self.get(0)
    }

    /// Iterate over entries from oldest to newest
    pub fn iter(&self) -> CircularBufferIter<'_, T, N> {
        CircularBufferIter {
            buffer: self,
            index: 0,
        }
    }

    /// Drop all entries
    pub fn clear(&mut self) {
        self.data = [None; N];
        self.write_pos = 0;
        self.len = 0;
    }

    /// Entry by logical index (0 = oldest, len-1 = newest)
    ///
    /// ```text
    /// Physical array:  [D, E, A, B, C]  (write_pos = 2)
    /// Logical view:    [A, B, C, D, E]
    /// logical[i] = physical[(write_pos + i) % N]
    /// ```
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }

        let actual_index = if self.len < N {
            index
        } else {
            (self.write_pos + index) % N
        };

        self.data[actual_index].as_ref()
    }
}

/// Iterator over circular buffer contents, oldest first
pub struct CircularBufferIter<'a, T: Copy, const N: usize> {
    buffer: &'a CircularBuffer<T, N>,
    index: usize,
}

impl<'a, T: Copy, const N: usize> Iterator for CircularBufferIter<'a, T, N> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.buffer.get(self.index)?;
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.buffer.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<T: Copy, const N: usize> Default for CircularBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer() {
        let buffer: CircularBuffer<u32, 5> = CircularBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);
        assert!(buffer.last().is_none());
        assert!(buffer.oldest().is_none());
    }

    #[test]
    fn oldest_tracks_overwrite_slot() {
        let mut buffer = CircularBuffer::<u32, 3>::new();
        buffer.push(1);
        assert_eq!(buffer.oldest(), Some(&1));

        for i in 2..=5 {
            buffer.push(i);
        }

        // Holds 3, 4, 5
        assert!(buffer.is_full());
        assert_eq!(buffer.oldest(), Some(&3));
        assert_eq!(buffer.last(), Some(&5));
    }

    #[test]
    fn iterator_order() {
        let mut buffer = CircularBuffer::<u32, 4>::new();
        for i in 0..6 {
            buffer.push(i);
        }

        let values: Vec<u32> = buffer.iter().copied().collect();
        assert_eq!(values, vec![2, 3, 4, 5]);
    }

    #[test]
    fn clear_resets() {
        let mut buffer = CircularBuffer::<u32, 2>::new();
        buffer.push(7);
        buffer.push(8);
        buffer.clear();

        assert!(buffer.is_empty());
        assert_eq!(buffer.iter().count(), 0);
        assert_eq!(buffer.capacity(), 2);
    }
}
