//! Procedural segmented-creature animation
//!
//! A spring-jointed, tree-structured creature (spine, limbs, tail) that
//! follows a moving target point in real time:
//! - Segment arena with spring-constrained relative angles and joint limits
//! - Single-pass drag-chain IK limbs with an emergent two-phase walking gait
//! - Whole-body locomotion coupling forward speed to planted-leg fraction
//! - Path-sink rendering and optional fluid-solver impulse emission
//!
//! The engine is frame-driven and single-threaded: the host calls
//! [`Animator::tick`] (or [`Creature::follow`] directly) once per display
//! refresh with an [`InputSnapshot`].

pub mod angles;
pub mod animator;
pub mod body_plan;
pub mod creature;
pub mod emitter;
pub mod limb;
pub mod render;
pub mod segment;
pub mod types;

// Re-export main types for convenience
pub use animator::Animator;
pub use body_plan::BodyPlan;
pub use creature::{Creature, MotionParams};
pub use emitter::{DyeColor, EmitError, FluidEmitter, NullEmitter, SplatTracker};
pub use limb::{GaitPhase, LegState, LimbKind, LimbSystem};
pub use render::{Canvas, PathCommand, PathRecorder, StrokedPath};
pub use segment::{Segment, SegmentTree};
pub use types::{InputSnapshot, ParentLink, Pose, SegmentId};
