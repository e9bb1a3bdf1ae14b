//! Per-frame driver
//!
//! Glues the pieces into the original loop contract: one synchronous pose
//! update, one draw traversal, one emission check per tick. The host calls
//! `tick` once per display refresh with a fresh input snapshot.

use glam::Vec2;

use crate::creature::Creature;
use crate::emitter::{FluidEmitter, SplatTracker};
use crate::render::Canvas;
use crate::types::InputSnapshot;

/// Owns a creature and its emission state; drives one frame at a time
pub struct Animator {
    pub creature: Creature,
    splats: SplatTracker,
    frame: u64,
}

impl Animator {
    /// `fluid_surface` is the fluid solver's surface size in device pixels
    pub fn new(creature: Creature, fluid_surface: Vec2) -> Self {
        let start = creature.position;
        Self {
            creature,
            splats: SplatTracker::new(fluid_surface, start),
            frame: 0,
        }
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// One animation frame: follow the target, draw, report displacement.
    ///
    /// The pose update completes before either collaborator runs, so a
    /// failing canvas or emitter can only ever lose output, never state.
    pub fn tick(
        &mut self,
        input: &InputSnapshot,
        canvas: &mut dyn Canvas,
        emitter: &mut dyn FluidEmitter,
    ) {
        self.creature.follow(input);
        self.creature.draw(canvas);
        self.splats.track(self.creature.position, emitter);
        self.frame += 1;
    }
}
