//! Experience replay storage
//!
//! Every inference is recorded as a (features, output) pair in a fixed ring
//! of the most recent 480 frames (8 s at 60 Hz). Nothing in the pipeline
//! reads it back; it exists so an offline trainer can pull recent experience
//! from a live processor.

use axisguard_core::{constants::buffers::REPLAY_BUFFER_SIZE, Vector6};
use heapless::HistoryBuffer;

use crate::features::FeatureVector;

/// One recorded inference
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Experience {
    /// Network input
    pub features: FeatureVector,
    /// Network output for that input
    pub target: Vector6,
}

/// Ring of recent experiences, oldest overwritten first
#[derive(Clone, Default)]
pub struct ReplayBuffer {
    entries: HistoryBuffer<Experience, REPLAY_BUFFER_SIZE>,
}

impl ReplayBuffer {
    /// Empty buffer
    pub const fn new() -> Self {
        Self {
            entries: HistoryBuffer::new(),
        }
    }

    /// Record one inference
    pub fn record(&mut self, features: FeatureVector, target: Vector6) {
        self.entries.write(Experience { features, target });
    }

    /// Stored experiences
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No experiences yet
    pub fn is_empty(&self) -> bool {
        self.entries.len() == 0
    }

    /// Maximum number of experiences kept
    pub const fn capacity(&self) -> usize {
        REPLAY_BUFFER_SIZE
    }

    /// Most recent experience
    pub fn latest(&self) -> Option<&Experience> {
        self.entries.recent()
    }

    /// Experiences, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Experience> + '_ {
        self.entries.oldest_ordered()
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
