//! Whole-body locomotion controller
//!
//! The creature owns the segment arena, the limb systems, and the root
//! pose. `follow` converts "chase this target" into one synchronous pose
//! update: integrate forward and rotational speed, move the root, relax
//! every descendant, then let each limb system override its chain.
//!
//! Forward acceleration is gated by ground contact: the body only surges
//! when planted legs outnumber swinging ones, which couples the gait to
//! translation without any explicit synchronization.

use glam::Vec2;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_4, PI, SQRT_2};

use crate::angles::wrap;
use crate::limb::LimbSystem;
use crate::render::Canvas;
use crate::segment::SegmentTree;
use crate::types::{InputSnapshot, Pose};

/// Forward and rotational motion constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionParams {
    /// Forward acceleration per frame at full ground contact
    pub f_accel: f32,
    /// Forward friction, subtracted per frame (floored at zero speed)
    pub f_fric: f32,
    /// Forward resistance, multiplicative decay per frame
    pub f_res: f32,
    /// Distance under which the creature stops chasing
    pub f_thresh: f32,
    /// Rotational acceleration per frame
    pub r_accel: f32,
    /// Rotational friction (clamped at zero-cross, never overshoots)
    pub r_fric: f32,
    /// Rotational resistance, multiplicative decay per frame
    pub r_res: f32,
    /// Heading error below which no turning torque is applied
    pub r_thresh: f32,
}

/// The animated creature: root pose, body tree, and limb systems
#[derive(Debug)]
pub struct Creature {
    pub position: Vec2,
    /// Absolute heading, kept wrapped to [-π, π)
    pub angle: f32,
    pub motion: MotionParams,
    pub tree: SegmentTree,
    pub limbs: Vec<LimbSystem>,
    f_speed: f32,
    r_speed: f32,
    /// Post-friction translational speed of the last frame (always ≥ 0)
    speed: f32,
    rng: Xoshiro256PlusPlus,
}

impl Creature {
    pub fn new(position: Vec2, angle: f32, motion: MotionParams, seed: u64) -> Self {
        Self {
            position,
            angle,
            motion,
            tree: SegmentTree::new(),
            limbs: Vec::new(),
            f_speed: 0.0,
            r_speed: 0.0,
            speed: 0.0,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    /// Root pose as seen by the outside world
    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.angle)
    }

    /// Translational speed actually applied last frame (post-friction)
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Fraction of limb systems currently planted. Grab limbs never count
    /// as planted, so they always damp forward acceleration.
    pub fn planted_fraction(&self) -> f32 {
        if self.limbs.is_empty() {
            return 1.0;
        }
        let planted = self.limbs.iter().filter(|l| l.is_planted()).count();
        planted as f32 / self.limbs.len() as f32
    }

    /// One whole-body locomotion step toward the input target.
    ///
    /// Pose-only: drawing and emission are separate read-only consumers, so
    /// a failing collaborator can never corrupt the body state.
    pub fn follow(&mut self, input: &InputSnapshot) {
        let target = input.target;
        let dist = self.position.distance(target);
        let bearing = (target.y - self.position.y).atan2(target.x - self.position.x);

        let mut accel = self.motion.f_accel;
        if !self.limbs.is_empty() {
            accel *= self.planted_fraction();
        }
        if dist > self.motion.f_thresh {
            self.f_speed += accel;
        }
        self.f_speed *= 1.0 - self.motion.f_res;
        self.speed = (self.f_speed - self.motion.f_fric).max(0.0);

        let error = wrap(self.angle - bearing);
        if error.abs() > self.motion.r_thresh && dist > self.motion.f_thresh {
            self.r_speed -= self.motion.r_accel * if error > 0.0 { 1.0 } else { -1.0 };
        }
        self.r_speed *= 1.0 - self.motion.r_res;
        if self.r_speed.abs() > self.motion.r_fric {
            self.r_speed -= self.motion.r_fric * if self.r_speed > 0.0 { 1.0 } else { -1.0 };
        } else {
            self.r_speed = 0.0;
        }

        self.angle = wrap(self.angle + self.r_speed);
        self.position += self.speed * Vec2::from_angle(self.angle);

        // Descendant rest angles assume the body faces angle + π; hand them
        // the flipped pose, raw (positions are identical either way).
        let body = Pose::new(self.position, self.angle + PI);
        for i in 0..self.tree.root_children().len() {
            let child = self.tree.root_children()[i];
            self.tree.follow(child, true, body);
        }
        for limb in &mut self.limbs {
            limb.update(&mut self.tree, input, body, &mut self.rng);
        }
    }

    /// Draw the head wedge, then every segment. Read-only traversal.
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        const R: f32 = 4.0;
        let mouth = 7.0 * FRAC_PI_4 + self.angle;
        canvas.begin_path();
        canvas.arc(self.position, R, FRAC_PI_4 + self.angle, mouth);
        canvas.move_to(self.position + R * Vec2::from_angle(mouth));
        canvas.line_to(self.position + R * SQRT_2 * Vec2::from_angle(self.angle));
        canvas.line_to(self.position + R * Vec2::from_angle(FRAC_PI_4 + self.angle));
        canvas.stroke();

        let pose = self.pose();
        for &child in self.tree.root_children() {
            self.tree.draw(child, true, canvas, pose);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limb::{GaitPhase, LegState, LimbKind};
    use crate::render::PathRecorder;
    use crate::types::ParentLink;
    use glam::vec2;
    use std::f32::consts::TAU;

    fn params() -> MotionParams {
        MotionParams {
            f_accel: 8.0,
            f_fric: 1.6,
            f_res: 0.5,
            f_thresh: 16.0,
            r_accel: 0.5,
            r_fric: 0.085,
            r_res: 0.5,
            r_thresh: 0.3,
        }
    }

    fn bare_creature() -> Creature {
        Creature::new(vec2(100.0, 100.0), 0.0, params(), 1)
    }

    #[test]
    fn test_straight_chase_moves_forward() {
        let mut creature = bare_creature();
        let input = InputSnapshot::new(vec2(200.0, 100.0));
        creature.follow(&input);

        assert!(creature.position.x > 100.0, "x did not increase");
        assert!((creature.position.y - 100.0).abs() < 1.0, "y drifted");
        assert!(creature.angle.abs() <= params().r_thresh + 1e-5);
    }

    #[test]
    fn test_speed_never_negative() {
        let mut creature = bare_creature();
        // Alternate far and near targets so acceleration starts and stops
        for i in 0..300 {
            let target = if i % 7 < 3 {
                vec2(500.0, -200.0)
            } else {
                creature.position
            };
            creature.follow(&InputSnapshot::new(target));
            assert!(creature.speed() >= 0.0, "speed went negative on frame {i}");
        }
    }

    #[test]
    fn test_heading_stays_wrapped() {
        let mut creature = bare_creature();
        // Orbiting target forces continuous turning
        for i in 0..400 {
            let theta = i as f32 * 0.11;
            let target = creature.position + 300.0 * Vec2::from_angle(theta);
            creature.follow(&InputSnapshot::new(target));
            assert!(
                creature.angle.abs() <= std::f32::consts::PI + 1e-4,
                "heading unwrapped: {}",
                creature.angle
            );
        }
    }

    #[test]
    fn test_within_threshold_creature_coasts_to_rest() {
        let mut creature = bare_creature();
        let input = InputSnapshot::new(vec2(105.0, 100.0)); // inside f_thresh
        for _ in 0..20 {
            creature.follow(&input);
        }
        assert_eq!(creature.speed(), 0.0);
    }

    #[test]
    fn test_swinging_legs_damp_acceleration() {
        let mut planted = bare_creature();
        let mut swinging = bare_creature();
        for creature in [&mut planted, &mut swinging] {
            let end = creature
                .tree
                .attach(ParentLink::Root, 10.0, 0.0, TAU, 1.0, creature.pose());
            let limb = LimbSystem::new_leg(&creature.tree, end, 1, 4.0, 0.0, creature.pose());
            creature.limbs.push(limb);
        }
        // Put the second creature's only leg mid-swing, so its planted
        // fraction is 0 when acceleration is gated this frame
        if let LimbKind::Leg(LegState {
            phase,
            goal,
            forwardness,
            ..
        }) = &mut swinging.limbs[0].kind
        {
            *phase = GaitPhase::Swinging;
            *goal += vec2(50.0, 50.0);
            *forwardness = 1000.0;
        }

        let input = InputSnapshot::new(vec2(400.0, 100.0));
        planted.follow(&input);
        swinging.follow(&input);
        assert!(planted.position.x > swinging.position.x);
    }

    #[test]
    fn test_descendants_track_root_after_follow() {
        let mut creature = bare_creature();
        let mut parent = ParentLink::Root;
        for _ in 0..5 {
            let id = creature
                .tree
                .attach(parent, 8.0, 0.0, 1.0, 1.5, creature.pose());
            parent = ParentLink::Segment(id);
        }

        let input = InputSnapshot::new(vec2(400.0, 160.0));
        for _ in 0..10 {
            creature.follow(&input);
        }

        // Round-trip: every segment position reconstructs from its parent
        let body = Pose::new(creature.position, creature.angle + PI);
        for i in 0..creature.tree.len() {
            let seg = creature.tree.segment(crate::types::SegmentId(i)).clone();
            let parent_pose = creature.tree.parent_pose(seg.parent, body);
            let expect = parent_pose.position + seg.size * Vec2::from_angle(seg.abs_angle);
            assert!(
                (seg.position - expect).length() < 1e-3,
                "segment {i} drifted from its parent"
            );
        }
    }

    #[test]
    fn test_draw_emits_head_wedge_and_segments() {
        let mut creature = bare_creature();
        let a = creature
            .tree
            .attach(ParentLink::Root, 8.0, 0.0, 1.0, 1.5, creature.pose());
        creature
            .tree
            .attach(ParentLink::Segment(a), 8.0, 0.0, 1.0, 1.5, creature.pose());

        let mut canvas = PathRecorder::new();
        let pose_before = creature.pose();
        creature.draw(&mut canvas);

        // head wedge + one stroke per segment
        assert_eq!(canvas.strokes().len(), 3);
        assert!(canvas.strokes()[0]
            .commands
            .iter()
            .any(|c| matches!(c, crate::render::PathCommand::Arc { .. })));
        // drawing never mutates pose state
        assert_eq!(creature.pose(), pose_before);
    }
}
