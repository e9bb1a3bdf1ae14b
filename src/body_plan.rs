//! Randomized lizard body assembly
//!
//! A body plan is three numbers: overall scale, leg-pair count, and tail
//! length. `build` grows the full segment tree from them: a whiskered neck,
//! a ribbed torso with one stepping leg pair per section, and a tapering
//! tail. All proportions and joint constants come from the plan's scale;
//! smaller creatures are proportionally faster and springier.

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::creature::{Creature, MotionParams};
use crate::limb::LimbSystem;
use crate::types::ParentLink;

/// Sides of the spine, used for mirrored attachments
const SIDES: [f32; 2] = [-1.0, 1.0];

/// Body-plan configuration. Serializable so hosts can pin or replay plans.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyPlan {
    /// Global size factor; everything in the body is a multiple of it
    pub scale: f32,
    /// Number of torso sections, each carrying one leg pair
    pub legs: u32,
    /// Number of tail vertebrae
    pub tail: u32,
}

impl BodyPlan {
    /// Draw a random plan: scale shrinks with a size die of 1..=12, leg
    /// pairs are 1..=12, and longer-legged bodies grow longer tails.
    pub fn random(rng: &mut impl Rng) -> Self {
        let die = (1.0 + rng.random::<f32>() * 12.0).floor().max(1.0);
        let scale = 8.0 / die.sqrt();
        let legs = (1.0 + rng.random::<f32>() * 12.0) as u32;
        let tail = (4.0 + rng.random::<f32>() * (legs * 8) as f32) as u32;
        Self { scale, legs, tail }
    }

    /// Motion constants scaled to this body
    pub fn motion(&self) -> MotionParams {
        let s = self.scale;
        MotionParams {
            f_accel: s * 10.0,
            f_fric: s * 2.0,
            f_res: 0.5,
            f_thresh: 16.0,
            r_accel: 0.5,
            r_fric: 0.085,
            r_res: 0.5,
            r_thresh: 0.3,
        }
    }

    /// Assemble a full creature at `origin`, heading 0. `seed` drives the
    /// creature's stride jitter; the same plan and seed always produce the
    /// same animation.
    pub fn build(&self, origin: Vec2, seed: u64) -> Creature {
        let s = self.scale;
        let legs = self.legs.max(1);
        let tail = self.tail.max(1);
        let mut creature = Creature::new(origin, 0.0, self.motion(), seed);
        let root = creature.pose();

        // Neck: six free vertebrae, each with a pair of short whiskers
        let mut spinal = ParentLink::Root;
        for _ in 0..6 {
            let vertebra = creature
                .tree
                .attach(spinal, s * 4.0, 0.0, TAU / 3.0, 1.1, root);
            spinal = ParentLink::Segment(vertebra);
            for side in SIDES {
                let mut node = creature.tree.attach(spinal, s * 3.0, side, 0.1, 2.0, root);
                for _ in 0..3 {
                    node = creature.tree.attach(
                        ParentLink::Segment(node),
                        s * 0.1,
                        -side * 0.1,
                        0.1,
                        2.0,
                        root,
                    );
                }
            }
        }

        // Torso: one section per leg pair; sections after the first get six
        // stiffer vertebrae with rib fans between them
        for section in 0..legs {
            if section > 0 {
                for _ in 0..6 {
                    let vertebra = creature.tree.attach(spinal, s * 4.0, 0.0, 1.571, 1.5, root);
                    spinal = ParentLink::Segment(vertebra);
                    for side in SIDES {
                        let mut node = creature
                            .tree
                            .attach(spinal, s * 3.0, side * 1.571, 0.1, 1.5, root);
                        for _ in 0..3 {
                            node = creature.tree.attach(
                                ParentLink::Segment(node),
                                s * 3.0,
                                -side * 0.3,
                                0.1,
                                2.0,
                                root,
                            );
                        }
                    }
                }
            }
            // Leg pair: thigh, shin, foot, four toes, one gait controller
            for side in SIDES {
                let thigh = creature
                    .tree
                    .attach(spinal, s * 12.0, side * 0.785, 0.0, 8.0, root);
                let shin = creature.tree.attach(
                    ParentLink::Segment(thigh),
                    s * 16.0,
                    -side * 0.785,
                    6.28,
                    1.0,
                    root,
                );
                let foot = creature.tree.attach(
                    ParentLink::Segment(shin),
                    s * 16.0,
                    side * 1.571,
                    3.1415,
                    2.0,
                    root,
                );
                for toe in 0..4 {
                    creature.tree.attach(
                        ParentLink::Segment(foot),
                        s * 4.0,
                        (toe as f32 / 3.0 - 0.5) * 1.571,
                        0.1,
                        4.0,
                        root,
                    );
                }
                let leg =
                    LimbSystem::new_leg(&creature.tree, foot, 3, s * 12.0, creature.angle, root);
                creature.limbs.push(leg);
            }
        }

        // Tail: like the neck, but the side fronds taper toward the tip
        for vertebra in 0..tail {
            let spine_seg = creature
                .tree
                .attach(spinal, s * 4.0, 0.0, TAU / 3.0, 1.1, root);
            spinal = ParentLink::Segment(spine_seg);
            let frond = s * 3.0 * (tail - vertebra) as f32 / tail as f32;
            for side in SIDES {
                let mut node = creature.tree.attach(spinal, s * 3.0, side, 0.1, 2.0, root);
                for _ in 0..3 {
                    node = creature.tree.attach(
                        ParentLink::Segment(node),
                        frond,
                        -side * 0.1,
                        0.1,
                        2.0,
                        root,
                    );
                }
            }
        }

        creature
    }

    /// Draw a random plan from `seed` and build it in one call
    pub fn spawn(origin: Vec2, seed: u64) -> Creature {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let plan = Self::random(&mut rng);
        log::info!(
            "Spawned body plan: scale {:.2}, {} leg pairs, {} tail vertebrae",
            plan.scale,
            plan.legs,
            plan.tail
        );
        plan.build(origin, seed)
    }
}
