//! Limb chains: single-pass drag IK plus the leg gait state machine
//!
//! A limb is a contiguous run of ancestor segments from a body attachment
//! point (the hip) down to an end effector (the foot). `move_to` drags the
//! whole chain toward a goal point in one backward pass, then re-derives
//! joint angles going forward so decorative side-branches tag along.
//!
//! Legs layer a two-phase gait on top: a PLANTED foot holds its ground goal
//! until the hip has walked away from it, then SWINGS to a fresh foothold
//! and plants again once its forward progress stalls. No explicit timing;
//! each leg decides locally, and randomized stride jitter desynchronizes
//! them into a believable walk.

use glam::{vec2, Vec2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::angles::wrap;
use crate::segment::SegmentTree;
use crate::types::{InputSnapshot, ParentLink, Pose, SegmentId};

/// Gait phase of a stepping leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GaitPhase {
    /// Foot anchored at its goal, waiting for the hip to walk away
    Planted,
    /// Foot moving toward a newly chosen foothold
    Swinging,
}

/// Stepping state carried by a leg limb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegState {
    pub phase: GaitPhase,
    /// Current foothold target (world space)
    pub goal: Vec2,
    /// Forward-projected hip→foot offset from the previous frame,
    /// used to detect stride completion
    pub forwardness: f32,
    /// Max stride radius
    pub reach: f32,
    /// Preferred swing bearing relative to the hip orientation
    pub swing: f32,
    /// Correction between body heading and hip orientation at assembly time
    pub swing_offset: f32,
}

/// What drives a limb each frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LimbKind {
    /// Drag the end effector straight toward the input target
    Grab,
    /// Step autonomously using the gait state machine
    Leg(LegState),
}

/// An IK chain over a run of segments.
///
/// The chain does not own its segments; it repositions them through the
/// arena. `nodes` runs nearest-hip-first to end-effector-last.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimbSystem {
    pub end: SegmentId,
    pub nodes: Vec<SegmentId>,
    /// Attachment point of the chain: parent of the first node. May be the
    /// creature root when construction shortened the chain all the way up.
    pub hip: ParentLink,
    /// Max reach step of the end effector per frame
    pub speed: f32,
    pub kind: LimbKind,
}

impl LimbSystem {
    /// Walk up from `end` collecting at most `length` ancestors,
    /// shortening gracefully if the tree root is reached first.
    fn collect_chain(tree: &SegmentTree, end: SegmentId, length: usize) -> Vec<SegmentId> {
        let mut nodes = Vec::with_capacity(length.max(1));
        let mut node = end;
        for _ in 0..length.max(1) {
            nodes.insert(0, node);
            match tree.segment(node).parent {
                ParentLink::Segment(parent) => node = parent,
                ParentLink::Root => break,
            }
        }
        nodes
    }

    /// A limb that drags its end effector toward the input target
    pub fn new_grab(tree: &SegmentTree, end: SegmentId, length: usize, speed: f32) -> Self {
        let nodes = Self::collect_chain(tree, end, length);
        let hip = tree.segment(nodes[0]).parent;
        Self {
            end,
            nodes,
            hip,
            speed,
            kind: LimbKind::Grab,
        }
    }

    /// A stepping leg. `body_angle` is the creature's heading at assembly
    /// time; the swing direction is the foot's rest bearing reflected a
    /// quarter turn outward from the body axis.
    pub fn new_leg(
        tree: &SegmentTree,
        end: SegmentId,
        length: usize,
        speed: f32,
        body_angle: f32,
        root: Pose,
    ) -> Self {
        let nodes = Self::collect_chain(tree, end, length);
        let hip = tree.segment(nodes[0]).parent;
        let hip_pose = tree.parent_pose(hip, root);
        let end_pos = tree.segment(end).position;

        let offset = end_pos - hip_pose.position;
        let reach = 0.9 * offset.length();
        let rest_bearing = wrap(body_angle - offset.y.atan2(offset.x));
        let half_turn = if rest_bearing < 0.0 {
            -std::f32::consts::FRAC_PI_2
        } else {
            std::f32::consts::FRAC_PI_2
        };

        Self {
            end,
            nodes,
            hip,
            speed,
            kind: LimbKind::Leg(LegState {
                phase: GaitPhase::Planted,
                goal: end_pos,
                forwardness: 0.0,
                reach,
                swing: -rest_bearing + half_turn,
                swing_offset: body_angle - hip_pose.angle,
            }),
        }
    }

    /// Is this limb a leg with its foot on the ground?
    pub fn is_planted(&self) -> bool {
        matches!(
            self.kind,
            LimbKind::Leg(LegState {
                phase: GaitPhase::Planted,
                ..
            })
        )
    }

    /// Chain length actually in use (may be shorter than requested)
    pub fn length(&self) -> usize {
        self.nodes.len()
    }

    /// Drag the chain so the end effector closes on `goal`.
    ///
    /// First relaxes the chain's subtree from the hip-adjacent node, then
    /// runs the backward drag pass (each node placed at the link length of
    /// the node ahead, along the direction toward it), then re-derives each
    /// chain node's angles from its forced position. Non-chain children of
    /// chain nodes follow passively without re-clamping their ranges.
    pub fn move_to(&self, tree: &mut SegmentTree, goal: Vec2, root: Pose) {
        tree.update_relative(self.nodes[0], true, true, root);

        let end_pos = tree.segment(self.end).position;
        let mut len = (end_pos.distance(goal) - self.speed).max(0.0);
        let mut ahead = goal;
        for &node in self.nodes.iter().rev() {
            let away = tree.segment(node).position - ahead;
            let dist = away.length();
            if dist > f32::EPSILON {
                tree.segment_mut(node).position = ahead + away * (len / dist);
            }
            ahead = tree.segment(node).position;
            len = tree.segment(node).size;
        }

        for &node in &self.nodes {
            let parent_pose = tree.parent_pose(tree.segment(node).parent, root);
            let offset = tree.segment(node).position - parent_pose.position;
            if offset.length() > f32::EPSILON {
                let seg = tree.segment_mut(node);
                seg.abs_angle = offset.y.atan2(offset.x);
                seg.rel_angle = seg.abs_angle - parent_pose.angle;
            }
            for i in 0..tree.segment(node).children.len() {
                let child = tree.segment(node).children[i];
                if !self.nodes.contains(&child) {
                    tree.update_relative(child, true, false, root);
                }
            }
        }
    }

    /// Per-frame update. Grab limbs chase the input target; legs chase
    /// their current foothold goal and run the gait transitions afterward.
    pub fn update(
        &mut self,
        tree: &mut SegmentTree,
        input: &InputSnapshot,
        root: Pose,
        rng: &mut impl Rng,
    ) {
        let goal = match &self.kind {
            LimbKind::Grab => input.target,
            LimbKind::Leg(state) => state.goal,
        };
        self.move_to(tree, goal, root);

        let hip = self.hip;
        let end = self.end;
        if let LimbKind::Leg(state) = &mut self.kind {
            let hip_pose = tree.parent_pose(hip, root);
            let end_pos = tree.segment(end).position;
            match state.phase {
                GaitPhase::Planted => {
                    // The hip has dragged the foot off its plant: pick a new
                    // foothold in a jittered cone around the swing direction
                    if end_pos.distance(state.goal) > 1.0 {
                        state.phase = GaitPhase::Swinging;
                        let bearing = state.swing + hip_pose.angle + state.swing_offset;
                        let jitter = vec2(
                            rng.random::<f32>() * 2.0 - 1.0,
                            rng.random::<f32>() * 2.0 - 1.0,
                        ) * (state.reach / 2.0);
                        state.goal =
                            hip_pose.position + state.reach * Vec2::from_angle(bearing) + jitter;
                    }
                }
                GaitPhase::Swinging => {
                    let offset = end_pos - hip_pose.position;
                    let theta = offset.y.atan2(offset.x) - hip_pose.angle;
                    let forwardness = offset.length() * theta.cos();
                    let delta = state.forwardness - forwardness;
                    state.forwardness = forwardness;
                    // Foot has caught up with the body: freeze the plant
                    if delta * delta < 1.0 {
                        state.phase = GaitPhase::Planted;
                        state.goal = end_pos;
                    }
                }
            }
        }
    }
}
