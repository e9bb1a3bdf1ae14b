//! Fluid-emission collaborator interface
//!
//! The creature's root displacement drives splats into an external fluid
//! solver. The solver is a capability the host may or may not provide;
//! emission failures are logged and dropped so the next frame is never
//! blocked. [`SplatTracker`] owns the cadence: it accumulates displacement
//! and converts it into normalized splat positions and forces.

use glam::{vec2, Vec2};
use thiserror::Error;

/// RGB color in [0, 1], the fluid solver's dye space
pub type DyeColor = [f32; 3];

/// Fallback dye when the solver offers no palette
pub const DEFAULT_DYE: DyeColor = [0.15, 0.15, 0.15];

/// Accumulated displacement required between splats, in device pixels
pub const MIN_PIXEL_STEP: f32 = 8.0;

/// Displacement-to-force conversion factor
pub const FORCE_SCALE: f32 = 1200.0;

/// Why a splat was not applied
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("fluid surface unavailable")]
    Unavailable,
    #[error("fluid backend rejected splat: {0}")]
    Backend(String),
}

/// External fluid solver capability.
///
/// `splat` takes a normalized position (x right, y up, both in [0, 1]) and
/// a normalized force. The contract is non-throwing: failures come back as
/// values so callers and tests can observe them.
pub trait FluidEmitter {
    fn splat(&mut self, position: Vec2, force: Vec2, color: DyeColor) -> Result<(), EmitError>;

    /// Next trail color; solvers with a palette override this
    fn pick_color(&mut self) -> DyeColor {
        DEFAULT_DYE
    }
}

/// Emitter that accepts and discards everything (headless runs, tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEmitter;

impl FluidEmitter for NullEmitter {
    fn splat(&mut self, _position: Vec2, _force: Vec2, _color: DyeColor) -> Result<(), EmitError> {
        Ok(())
    }
}

/// Converts the creature's root displacement into splats.
///
/// One splat per [`MIN_PIXEL_STEP`] of accumulated travel; the trail color
/// rotates after a burst of four steps' worth of distance.
#[derive(Debug, Clone)]
pub struct SplatTracker {
    /// Fluid surface size in device pixels (normalization basis)
    surface: Vec2,
    prev: Vec2,
    accumulated: f32,
    trail_color: Option<DyeColor>,
}

impl SplatTracker {
    pub fn new(surface: Vec2, start: Vec2) -> Self {
        Self {
            surface,
            prev: start,
            accumulated: 0.0,
            trail_color: None,
        }
    }

    /// Feed the creature's current root position; emits at most one splat.
    pub fn track(&mut self, position: Vec2, emitter: &mut dyn FluidEmitter) {
        let delta = position - self.prev;
        self.accumulated += delta.length();

        if self.accumulated >= MIN_PIXEL_STEP {
            let normalized = vec2(
                if self.surface.x > 0.0 {
                    position.x / self.surface.x
                } else {
                    0.5
                },
                if self.surface.y > 0.0 {
                    1.0 - position.y / self.surface.y
                } else {
                    0.5
                },
            );
            let force = vec2(
                if self.surface.x > 0.0 {
                    delta.x / self.surface.x
                } else {
                    0.0
                },
                if self.surface.y > 0.0 {
                    -delta.y / self.surface.y
                } else {
                    0.0
                },
            ) * FORCE_SCALE;

            let color = *self.trail_color.get_or_insert_with(|| emitter.pick_color());
            if let Err(err) = emitter.splat(normalized, force, color) {
                log::warn!("fluid splat dropped: {err}");
            }
            if self.accumulated > MIN_PIXEL_STEP * 4.0 {
                self.trail_color = Some(emitter.pick_color());
            }
            self.accumulated = 0.0;
        }

        self.prev = position;
    }
}
