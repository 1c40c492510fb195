// src/pose/mod.rs
//
// Per-frame geometry on top of the external pose estimator's landmarks.

pub mod angle;
pub mod keypoints;

pub use angle::{joint_angle, paired_joint_angle, JointTriple};
pub use keypoints::extract_keypoints;
