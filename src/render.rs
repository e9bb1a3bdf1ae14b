//! Drawing sink for the pose traversal
//!
//! The engine never renders pixels itself; it describes strokes through the
//! [`Canvas`] trait using the usual path verbs (y-down, radians,
//! counter-clockwise-positive). [`PathRecorder`] captures those strokes as
//! plain data for tests, headless runs, or a real renderer to replay.

use glam::Vec2;

/// Stateful path-based vector drawing surface.
///
/// Implementations are best-effort sinks: they must not fail in ways the
/// caller has to handle, and the engine only drives them from read-only
/// traversals, so a broken renderer can never corrupt pose state.
pub trait Canvas {
    fn begin_path(&mut self);
    fn move_to(&mut self, point: Vec2);
    fn line_to(&mut self, point: Vec2);
    fn arc(&mut self, center: Vec2, radius: f32, start_angle: f32, end_angle: f32);
    fn stroke(&mut self);
}

/// One recorded path verb
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Vec2),
    LineTo(Vec2),
    Arc {
        center: Vec2,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
    },
}

/// A completed (stroked) path
#[derive(Debug, Clone, Default)]
pub struct StrokedPath {
    pub commands: Vec<PathCommand>,
}

impl StrokedPath {
    /// Number of line segments in this path
    pub fn line_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, PathCommand::LineTo(_)))
            .count()
    }
}

/// Canvas implementation that records strokes instead of rasterizing
#[derive(Debug, Clone, Default)]
pub struct PathRecorder {
    current: Vec<PathCommand>,
    strokes: Vec<StrokedPath>,
}

impl PathRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strokes(&self) -> &[StrokedPath] {
        &self.strokes
    }

    /// Total line segments across all strokes this frame
    pub fn line_count(&self) -> usize {
        self.strokes.iter().map(StrokedPath::line_count).sum()
    }

    /// Drop everything recorded so far (start of a new frame)
    pub fn clear(&mut self) {
        self.current.clear();
        self.strokes.clear();
    }
}

impl Canvas for PathRecorder {
    fn begin_path(&mut self) {
        self.current.clear();
    }

    fn move_to(&mut self, point: Vec2) {
        self.current.push(PathCommand::MoveTo(point));
    }

    fn line_to(&mut self, point: Vec2) {
        self.current.push(PathCommand::LineTo(point));
    }

    fn arc(&mut self, center: Vec2, radius: f32, start_angle: f32, end_angle: f32) {
        self.current.push(PathCommand::Arc {
            center,
            radius,
            start_angle,
            end_angle,
        });
    }

    fn stroke(&mut self) {
        self.strokes.push(StrokedPath {
            commands: std::mem::take(&mut self.current),
        });
    }
}
