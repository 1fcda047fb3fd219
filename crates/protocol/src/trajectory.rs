use crate::telemetry::Position;

pub const DEFAULT_TRAJECTORY_CAPACITY: usize = 200;

/// Bounded history of rover positions, oldest first.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "bevy", derive(bevy_ecs::prelude::Resource))]
pub struct TrajectoryBuffer {
    points: Vec<Position>,
    capacity: usize,
    revision: u64,
}

impl Default for TrajectoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_TRAJECTORY_CAPACITY)
    }
}

impl TrajectoryBuffer {
    /// Create an empty buffer. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: Vec::with_capacity(capacity),
            capacity,
            revision: 0,
        }
    }

    /// Push a position, dropping the oldest ones once over capacity.
    pub fn append(&mut self, position: Position) {
        self.points.push(position);
        if self.points.len() > self.capacity {
            let excess = self.points.len() - self.capacity;
            self.points.drain(..excess);
        }
        self.revision = self.revision.wrapping_add(1);
    }

    pub fn reset(&mut self) {
        self.points.clear();
        self.revision = self.revision.wrapping_add(1);
    }

    /// Ordered view of the retained positions.
    pub fn snapshot(&self) -> &[Position] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&Position> {
        self.points.last()
    }

    /// Bumped on every mutation; lets renderers skip unchanged frames.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
