//! Segment tree: the creature's jointed body
//!
//! Segments are rigid links stored in an index-addressed arena. Each link
//! owns a spring-constrained angle relative to its parent; absolute poses
//! are always derived parent-first, never mutated independently.
//!
//! Two positioning modes exist:
//! - `update_relative`: spring relaxation toward the rest angle, clamped to
//!   the joint's range of motion (normal per-frame pass).
//! - `follow`: drag mode, used when a limb chain forces a position directly;
//!   the link re-projects itself to its own length from the parent and
//!   derives its angles from the forced position.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::angles::wrap_about;
use crate::render::Canvas;
use crate::types::{ParentLink, Pose, SegmentId};

/// One rigid link in the body tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    /// Non-owning back-reference for traversal
    pub parent: ParentLink,
    /// Children in insertion order
    pub children: Vec<SegmentId>,
    /// Rest length, fixed at construction
    pub size: f32,
    /// Current angle relative to the parent
    pub rel_angle: f32,
    /// Rest angle the joint spring pulls back toward
    pub def_angle: f32,
    /// Max allowed deviation from the rest angle (free-play window)
    pub range: f32,
    /// Relaxation divisor: 1 = neutral, larger = snappier return to rest
    pub stiffness: f32,
    /// Derived: `parent.abs_angle + rel_angle`
    pub abs_angle: f32,
    /// Derived: parent position + size along `abs_angle`
    pub position: Vec2,
}

/// Arena owning every segment of one creature.
///
/// Parent/child edges are plain indices, so the parent back-reference never
/// fights the ownership graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentTree {
    segments: Vec<Segment>,
    root_children: Vec<SegmentId>,
}

impl SegmentTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segment(&self, id: SegmentId) -> &Segment {
        &self.segments[id.0]
    }

    pub fn segment_mut(&mut self, id: SegmentId) -> &mut Segment {
        &mut self.segments[id.0]
    }

    /// Segments attached directly to the creature root, in insertion order
    pub fn root_children(&self) -> &[SegmentId] {
        &self.root_children
    }

    /// Resolve the pose a child hangs from (`root` stands in for the
    /// creature's own pose)
    pub fn parent_pose(&self, link: ParentLink, root: Pose) -> Pose {
        match link {
            ParentLink::Root => root,
            ParentLink::Segment(id) => {
                let seg = self.segment(id);
                Pose::new(seg.position, seg.abs_angle)
            }
        }
    }

    /// Append a new segment under `parent` and seed its pose.
    ///
    /// The parent must already be posed (the root, or an earlier-attached
    /// segment), so assembly runs parent-first.
    pub fn attach(
        &mut self,
        parent: ParentLink,
        size: f32,
        angle: f32,
        range: f32,
        stiffness: f32,
        root: Pose,
    ) -> SegmentId {
        let parent_pose = self.parent_pose(parent, root);
        let id = SegmentId(self.segments.len());
        self.segments.push(Segment {
            parent,
            children: Vec::new(),
            size,
            rel_angle: angle,
            def_angle: angle,
            range,
            stiffness,
            abs_angle: parent_pose.angle + angle,
            position: parent_pose.position,
        });
        match parent {
            ParentLink::Root => self.root_children.push(id),
            ParentLink::Segment(p) => self.segments[p.0].children.push(id),
        }
        self.update_relative(id, false, true, root);
        id
    }

    /// Spring-relaxation step.
    ///
    /// Wraps the relative angle onto the branch nearest the rest angle,
    /// optionally flexes it toward rest (divided by stiffness, clamped to
    /// the joint range), then recomputes the absolute pose from the parent.
    /// Recurses through the subtree when `iterate` is set.
    pub fn update_relative(&mut self, id: SegmentId, iterate: bool, flex: bool, root: Pose) {
        let parent_pose = self.parent_pose(self.segments[id.0].parent, root);
        let seg = &mut self.segments[id.0];
        seg.rel_angle = wrap_about(seg.rel_angle, seg.def_angle);
        if flex {
            let relaxed = seg.def_angle + (seg.rel_angle - seg.def_angle) / seg.stiffness;
            seg.rel_angle = relaxed.clamp(
                seg.def_angle - seg.range / 2.0,
                seg.def_angle + seg.range / 2.0,
            );
        }
        seg.abs_angle = parent_pose.angle + seg.rel_angle;
        seg.position = parent_pose.position + seg.size * Vec2::from_angle(seg.abs_angle);
        if iterate {
            for i in 0..self.segments[id.0].children.len() {
                let child = self.segments[id.0].children[i];
                self.update_relative(child, true, flex, root);
            }
        }
    }

    /// Drag step: keep the current world position but re-project it to
    /// exactly `size` from the parent, then derive angles from the forced
    /// position and run one flexed relaxation.
    ///
    /// Coincident parent/child positions leave the link where it is (the
    /// direction is undefined, so the step has zero length).
    pub fn follow(&mut self, id: SegmentId, iterate: bool, root: Pose) {
        let parent_pose = self.parent_pose(self.segments[id.0].parent, root);
        let seg = &mut self.segments[id.0];
        let offset = seg.position - parent_pose.position;
        let dist = offset.length();
        if dist > f32::EPSILON {
            seg.position = parent_pose.position + offset * (seg.size / dist);
            seg.abs_angle = offset.y.atan2(offset.x);
            seg.rel_angle = seg.abs_angle - parent_pose.angle;
        }
        self.update_relative(id, false, true, root);
        if iterate {
            for i in 0..self.segments[id.0].children.len() {
                let child = self.segments[id.0].children[i];
                self.follow(child, true, root);
            }
        }
    }

    /// Emit one stroked line from the parent position to this segment,
    /// recursing through the subtree when `iterate` is set. Read-only.
    pub fn draw(&self, id: SegmentId, iterate: bool, canvas: &mut dyn Canvas, root: Pose) {
        let seg = self.segment(id);
        let parent_pose = self.parent_pose(seg.parent, root);
        canvas.begin_path();
        canvas.move_to(parent_pose.position);
        canvas.line_to(seg.position);
        canvas.stroke();
        if iterate {
            for &child in &seg.children {
                self.draw(child, true, canvas, root);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec2;
    use std::f32::consts::{FRAC_PI_2, PI, TAU};

    fn root() -> Pose {
        Pose::new(Vec2::ZERO, 0.0)
    }

    #[test]
    fn test_attach_seeds_position() {
        let mut tree = SegmentTree::new();
        let id = tree.attach(ParentLink::Root, 10.0, 0.0, PI, 2.0, root());
        let seg = tree.segment(id);
        assert!((seg.position - vec2(10.0, 0.0)).length() < 1e-5);
        assert_eq!(tree.root_children(), &[id]);

        let child = tree.attach(ParentLink::Segment(id), 5.0, FRAC_PI_2, PI, 2.0, root());
        let seg = tree.segment(child);
        // straight out, then a quarter turn down (y-down canvas space)
        assert!((seg.position - vec2(10.0, 5.0)).length() < 1e-5);
        assert_eq!(tree.segment(id).children, vec![child]);
    }

    #[test]
    fn test_relaxation_honors_range() {
        let mut tree = SegmentTree::new();
        let id = tree.attach(ParentLink::Root, 10.0, 0.3, 0.4, 2.0, root());

        tree.segment_mut(id).rel_angle = 3.0;
        tree.update_relative(id, false, true, root());
        let seg = tree.segment(id);
        assert!(
            (seg.rel_angle - seg.def_angle).abs() <= seg.range / 2.0 + 1e-5,
            "rel {} strayed past range around def {}",
            seg.rel_angle,
            seg.def_angle
        );
    }

    #[test]
    fn test_relaxation_pulls_toward_rest() {
        let mut tree = SegmentTree::new();
        let id = tree.attach(ParentLink::Root, 10.0, 0.0, 2.0, 2.0, root());

        tree.segment_mut(id).rel_angle = 0.8;
        tree.update_relative(id, false, true, root());
        // deviation halves with stiffness 2
        assert!((tree.segment(id).rel_angle - 0.4).abs() < 1e-5);

        // stiffness 1 is neutral inside the range
        let neutral = tree.attach(ParentLink::Root, 10.0, 0.0, 2.0, 1.0, root());
        tree.segment_mut(neutral).rel_angle = 0.8;
        tree.update_relative(neutral, false, true, root());
        assert!((tree.segment(neutral).rel_angle - 0.8).abs() < 1e-5);
    }

    #[test]
    fn test_rel_angle_wraps_to_branch_nearest_rest() {
        let mut tree = SegmentTree::new();
        let id = tree.attach(ParentLink::Root, 10.0, 0.0, TAU, 1.0, root());

        // Many turns out of range: comes back to the same effective angle
        tree.segment_mut(id).rel_angle = 0.5 + 3.0 * TAU;
        tree.update_relative(id, false, false, root());
        assert!((tree.segment(id).rel_angle - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_positions_reconstructible_from_parents() {
        let mut tree = SegmentTree::new();
        let mut spinal = ParentLink::Root;
        for i in 0..8 {
            let id = tree.attach(spinal, 6.0, 0.1 * i as f32, 1.0, 1.5, root());
            spinal = ParentLink::Segment(id);
        }

        // Perturb every joint, then run a full flexed pass from the first child
        for i in 0..tree.len() {
            tree.segment_mut(SegmentId(i)).rel_angle += 0.37 * (i as f32 - 3.0);
        }
        let first = tree.root_children()[0];
        tree.update_relative(first, true, true, root());

        for i in 0..tree.len() {
            let seg = tree.segment(SegmentId(i)).clone();
            let parent_pose = tree.parent_pose(seg.parent, root());
            let expect_abs = parent_pose.angle + seg.rel_angle;
            let expect_pos = parent_pose.position + seg.size * Vec2::from_angle(expect_abs);
            assert!((seg.abs_angle - expect_abs).abs() < 1e-5);
            assert!((seg.position - expect_pos).length() < 1e-4);
        }
    }

    #[test]
    fn test_follow_projects_to_link_length() {
        let mut tree = SegmentTree::new();
        let id = tree.attach(ParentLink::Root, 10.0, 0.0, TAU, 1.0, root());

        // Drag the link somewhere off-length; follow restores the length
        tree.segment_mut(id).position = vec2(3.0, 4.0);
        tree.follow(id, false, root());
        let seg = tree.segment(id);
        assert!((seg.position.length() - 10.0).abs() < 1e-4);
        // direction preserved (3-4-5 triangle)
        assert!((seg.position - vec2(6.0, 8.0)).length() < 1e-4);
    }

    #[test]
    fn test_follow_coincident_parent_is_safe() {
        let mut tree = SegmentTree::new();
        let id = tree.attach(ParentLink::Root, 10.0, 0.0, TAU, 1.0, root());

        tree.segment_mut(id).position = Vec2::ZERO;
        tree.follow(id, false, root());
        let seg = tree.segment(id);
        assert!(seg.position.is_finite());
        assert!(seg.abs_angle.is_finite());
    }

    #[test]
    fn test_draw_emits_one_stroke_per_segment() {
        use crate::render::PathRecorder;

        let mut tree = SegmentTree::new();
        let a = tree.attach(ParentLink::Root, 10.0, 0.0, PI, 2.0, root());
        let _b = tree.attach(ParentLink::Segment(a), 5.0, 0.5, PI, 2.0, root());

        let mut canvas = PathRecorder::new();
        tree.draw(a, true, &mut canvas, root());
        assert_eq!(canvas.strokes().len(), 2);
    }
}
