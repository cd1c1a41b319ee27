//! Gesture classifiers
//!
//! Pure per-frame predicates mapping a landmark array to an "activated"
//! state for each exercise family. Every classifier returns `None` when the
//! frame lacks the landmarks it needs, so a partial detection never counts
//! as an observation.

use crate::geometry::distance;
use crate::types::{face_index, hand_index, pose_index, BodySide, FrameInput, HandStates, Landmark};
use serde::{Deserialize, Serialize};

/// Classifier thresholds, in normalized coordinate units.
///
/// The defaults are tuned for a subject roughly filling a 640x480 frame at
/// typical webcam distance. Camera framing varies per deployment, so these
/// are configuration rather than constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Fingertip-to-wrist distance above which a hand counts as open
    pub hand_open_distance: f64,
    /// Inner-lip gap above which the mouth counts as open
    pub mouth_open_distance: f64,
    /// Eyelid gap below which an eye counts as closed
    pub eye_closed_distance: f64,
    /// Hip-to-ankle lateral offset above which a leg counts as abducted
    pub leg_abduction_offset: f64,
    /// How far above the shoulder (in y) the wrist must be for a raised arm
    pub arm_raise_margin: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            hand_open_distance: 0.24,
            mouth_open_distance: 0.03,
            eye_closed_distance: 0.015,
            leg_abduction_offset: 0.15,
            arm_raise_margin: 0.10,
        }
    }
}

/// Whether a hand is open: index fingertip far from the wrist.
pub fn hand_open(landmarks: &[Landmark], thresholds: &Thresholds) -> Option<bool> {
    let wrist = landmarks.get(hand_index::WRIST)?;
    let tip = landmarks.get(hand_index::INDEX_FINGERTIP)?;
    Some(distance(*tip, *wrist) > thresholds.hand_open_distance)
}

/// Whether the mouth is open: inner lips apart.
pub fn mouth_open(face: &[Landmark], thresholds: &Thresholds) -> Option<bool> {
    let upper = face.get(face_index::UPPER_INNER_LIP)?;
    let lower = face.get(face_index::LOWER_INNER_LIP)?;
    Some(distance(*upper, *lower) > thresholds.mouth_open_distance)
}

/// Whether the given eye is closed: eyelids nearly touching.
///
/// The face mesh labels eyes by the subject's anatomy, so no mirror
/// correction applies here.
pub fn eye_closed(face: &[Landmark], side: BodySide, thresholds: &Thresholds) -> Option<bool> {
    let (upper_idx, lower_idx) = match side {
        BodySide::Right => (face_index::RIGHT_EYE_UPPER, face_index::RIGHT_EYE_LOWER),
        BodySide::Left => (face_index::LEFT_EYE_UPPER, face_index::LEFT_EYE_LOWER),
    };
    let upper = face.get(upper_idx)?;
    let lower = face.get(lower_idx)?;
    Some(distance(*upper, *lower) < thresholds.eye_closed_distance)
}

/// Whether the given leg is abducted: ankle laterally offset from the hip.
pub fn leg_abducted(pose: &[Landmark], side: BodySide, thresholds: &Thresholds) -> Option<bool> {
    let (hip_idx, ankle_idx) = match side {
        BodySide::Right => (pose_index::RIGHT_HIP, pose_index::RIGHT_ANKLE),
        BodySide::Left => (pose_index::LEFT_HIP, pose_index::LEFT_ANKLE),
    };
    let hip = pose.get(hip_idx)?;
    let ankle = pose.get(ankle_idx)?;
    Some((ankle.x - hip.x).abs() > thresholds.leg_abduction_offset)
}

/// Whether the given arm is raised: wrist well above the shoulder.
/// Smaller y is higher on screen.
pub fn arm_raised(pose: &[Landmark], side: BodySide, thresholds: &Thresholds) -> Option<bool> {
    let (shoulder_idx, wrist_idx) = match side {
        BodySide::Right => (pose_index::RIGHT_SHOULDER, pose_index::RIGHT_WRIST),
        BodySide::Left => (pose_index::LEFT_SHOULDER, pose_index::LEFT_WRIST),
    };
    let shoulder = pose.get(shoulder_idx)?;
    let wrist = pose.get(wrist_idx)?;
    Some(wrist.y < shoulder.y - thresholds.arm_raise_margin)
}

/// Instantaneous mirror-corrected open/closed state of each of the user's
/// hands, for live presentation. Independent of the active exercise.
pub fn hand_states(frame: &FrameInput, thresholds: &Thresholds) -> HandStates {
    let mut states = HandStates::default();
    for hand in &frame.hands {
        let Some(open) = hand_open(&hand.landmarks, thresholds) else {
            continue;
        };
        match hand.handedness.user_side() {
            BodySide::Left => states.left_open = Some(open),
            BodySide::Right => states.right_open = Some(open),
        }
    }
    states
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HandFrame, Handedness};

    fn hand_landmarks(tip_distance: f64) -> Vec<Landmark> {
        let mut lm = vec![Landmark::new(0.5, 0.5); 21];
        lm[hand_index::INDEX_FINGERTIP] = Landmark::new(0.5, 0.5 - tip_distance);
        lm
    }

    fn face_landmarks(lip_gap: f64, right_eye_gap: f64, left_eye_gap: f64) -> Vec<Landmark> {
        let mut lm = vec![Landmark::new(0.5, 0.5); 468];
        lm[face_index::UPPER_INNER_LIP] = Landmark::new(0.5, 0.5);
        lm[face_index::LOWER_INNER_LIP] = Landmark::new(0.5, 0.5 + lip_gap);
        lm[face_index::RIGHT_EYE_UPPER] = Landmark::new(0.4, 0.4);
        lm[face_index::RIGHT_EYE_LOWER] = Landmark::new(0.4, 0.4 + right_eye_gap);
        lm[face_index::LEFT_EYE_UPPER] = Landmark::new(0.6, 0.4);
        lm[face_index::LEFT_EYE_LOWER] = Landmark::new(0.6, 0.4 + left_eye_gap);
        lm
    }

    fn pose_landmarks() -> Vec<Landmark> {
        vec![Landmark::new(0.5, 0.5); 33]
    }

    #[test]
    fn test_hand_open_threshold() {
        let t = Thresholds::default();
        assert_eq!(hand_open(&hand_landmarks(0.30), &t), Some(true));
        assert_eq!(hand_open(&hand_landmarks(0.10), &t), Some(false));
    }

    #[test]
    fn test_hand_open_missing_landmarks() {
        let t = Thresholds::default();
        assert_eq!(hand_open(&[], &t), None);
        assert_eq!(hand_open(&[Landmark::new(0.5, 0.5)], &t), None);
    }

    #[test]
    fn test_mouth_open_threshold() {
        let t = Thresholds::default();
        assert_eq!(mouth_open(&face_landmarks(0.05, 0.03, 0.03), &t), Some(true));
        assert_eq!(mouth_open(&face_landmarks(0.01, 0.03, 0.03), &t), Some(false));
    }

    #[test]
    fn test_eye_closed_per_side() {
        let t = Thresholds::default();
        let face = face_landmarks(0.0, 0.005, 0.03);
        assert_eq!(eye_closed(&face, BodySide::Right, &t), Some(true));
        assert_eq!(eye_closed(&face, BodySide::Left, &t), Some(false));
    }

    #[test]
    fn test_leg_abducted() {
        let t = Thresholds::default();
        let mut pose = pose_landmarks();
        pose[pose_index::RIGHT_HIP] = Landmark::new(0.5, 0.5);
        pose[pose_index::RIGHT_ANKLE] = Landmark::new(0.7, 0.9);
        assert_eq!(leg_abducted(&pose, BodySide::Right, &t), Some(true));
        // left leg stays under the hip
        assert_eq!(leg_abducted(&pose, BodySide::Left, &t), Some(false));
    }

    #[test]
    fn test_arm_raised_y_margin() {
        let t = Thresholds::default();
        let mut pose = pose_landmarks();
        pose[pose_index::LEFT_SHOULDER] = Landmark::new(0.4, 0.4);
        pose[pose_index::LEFT_WRIST] = Landmark::new(0.4, 0.25);
        assert_eq!(arm_raised(&pose, BodySide::Left, &t), Some(true));

        // wrist above the shoulder but inside the margin
        pose[pose_index::LEFT_WRIST] = Landmark::new(0.4, 0.35);
        assert_eq!(arm_raised(&pose, BodySide::Left, &t), Some(false));
    }

    #[test]
    fn test_hand_states_mirror_corrected() {
        let t = Thresholds::default();
        let frame = FrameInput {
            hands: vec![HandFrame {
                handedness: Handedness::Right,
                landmarks: hand_landmarks(0.30),
            }],
            ..Default::default()
        };

        let states = hand_states(&frame, &t);
        // detected "Right" is the user's left hand on an unmirrored feed
        assert_eq!(states.left_open, Some(true));
        assert_eq!(states.right_open, None);
    }
}
