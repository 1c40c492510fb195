// src/pose/angle.rs

use crate::types::{JointId, Keypoint, KeypointSet};

/// Three joints forming an angle, with the vertex in the middle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointTriple {
    pub first: JointId,
    pub vertex: JointId,
    pub last: JointId,
}

impl JointTriple {
    pub const fn new(first: JointId, vertex: JointId, last: JointId) -> Self {
        Self {
            first,
            vertex,
            last,
        }
    }

    /// Angle at the vertex, or `None` when a joint is missing or below `floor`.
    pub fn angle(&self, keypoints: &KeypointSet, floor: f32) -> Option<f64> {
        let a = confident(keypoints, self.first, floor)?;
        let b = confident(keypoints, self.vertex, floor)?;
        let c = confident(keypoints, self.last, floor)?;

        let angle = joint_angle(a, b, c);
        angle.is_finite().then_some(angle)
    }
}

fn confident(keypoints: &KeypointSet, joint: JointId, floor: f32) -> Option<&Keypoint> {
    keypoints.get(joint).filter(|kp| kp.is_confident(floor))
}

/// Interior angle at `b` in degrees, planar (x, y only), folded into [0, 180].
pub fn joint_angle(a: &Keypoint, b: &Keypoint, c: &Keypoint) -> f64 {
    planar_angle(
        (a.x as f64, a.y as f64),
        (b.x as f64, b.y as f64),
        (c.x as f64, c.y as f64),
    )
}

pub(crate) fn planar_angle(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    let radians = (c.1 - b.1).atan2(c.0 - b.0) - (a.1 - b.1).atan2(a.0 - b.0);
    let angle = radians.to_degrees().abs();

    if angle > 180.0 {
        360.0 - angle
    } else {
        angle
    }
}

/// Average of a left/right joint pair. Falls back to whichever side is usable.
pub fn paired_joint_angle(
    keypoints: &KeypointSet,
    left: JointTriple,
    right: JointTriple,
    floor: f32,
) -> Option<f64> {
    match (left.angle(keypoints, floor), right.angle(keypoints, floor)) {
        (Some(l), Some(r)) => Some((l + r) / 2.0),
        (Some(side), None) | (None, Some(side)) => Some(side),
        (None, None) => None,
    }
}
