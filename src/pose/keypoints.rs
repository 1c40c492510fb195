// src/pose/keypoints.rs

use crate::types::{JointId, Keypoint, KeypointSet, Landmark};

/// Keep the tracked joints from one frame of estimator output.
///
/// `None` (no body detected) and an empty list both give an empty set.
/// A truncated list keeps whichever tracked indices it still covers.
pub fn extract_keypoints(landmarks: Option<&[Landmark]>) -> KeypointSet {
    let mut keypoints = KeypointSet::new();

    let Some(landmarks) = landmarks else {
        return keypoints;
    };

    for joint in JointId::ALL {
        if let Some(lm) = landmarks.get(joint.landmark_index()) {
            keypoints.insert(Keypoint {
                joint,
                x: lm.x,
                y: lm.y,
                z: lm.z,
                visibility: lm.visibility,
            });
        }
    }

    keypoints
}
