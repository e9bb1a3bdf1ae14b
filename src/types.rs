//! Common types shared across the animation core

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Index of a segment inside a [`SegmentTree`](crate::segment::SegmentTree) arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentId(pub(crate) usize);

impl SegmentId {
    /// Raw arena index (useful for debugging)
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for SegmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Segment({})", self.0)
    }
}

/// Parent of a segment: either the creature root or another segment.
///
/// Child→parent edges are non-owning indices; ownership lives in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParentLink {
    /// Attached directly to the creature's root pose
    Root,
    /// Attached to another segment in the same arena
    Segment(SegmentId),
}

/// A 2D position plus an absolute orientation (radians, canvas convention:
/// y-down, counter-clockwise-positive)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec2,
    pub angle: f32,
}

impl Pose {
    pub fn new(position: Vec2, angle: f32) -> Self {
        Self { position, angle }
    }
}

/// Per-frame input snapshot, populated by the host before each tick.
///
/// The engine only reads it; a stale value from a racing input source is
/// acceptable for an interactive visual system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputSnapshot {
    /// Target point in the creature's coordinate space (device pixels)
    pub target: Vec2,
}

impl InputSnapshot {
    pub fn new(target: Vec2) -> Self {
        Self { target }
    }
}
