//! Core types for the Neuromotion engine
//!
//! This module defines the data structures that flow through the per-frame
//! pipeline: landmark frames from the perception provider, the exercise plan
//! configuration, and the reports the engine exposes to the presentation
//! layer after each frame.

use serde::{Deserialize, Serialize};

/// A normalized anatomical point produced by the perception provider.
///
/// Coordinates are in [0, 1] with the origin at the top-left of the frame;
/// `y` increases downward. `z` is depth relative to the frame center and is
/// not used by any classifier, but is preserved when the provider sends it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }
}

/// Handedness label attached to a detected hand instance.
///
/// This is the label as reported by the perception provider for the raw,
/// unmirrored camera feed. Use [`Handedness::user_side`] to map it to the
/// user's anatomical side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Handedness::Left => "Left",
            Handedness::Right => "Right",
        }
    }

    /// Map the detected label to the user's anatomical side.
    ///
    /// The camera feed is not mirrored before landmark extraction, so a hand
    /// the provider labels "Right" is the user's left hand and vice versa.
    pub fn user_side(&self) -> BodySide {
        match self {
            Handedness::Left => BodySide::Right,
            Handedness::Right => BodySide::Left,
        }
    }
}

/// Anatomical side of the user's body, as declared by an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodySide {
    Left,
    Right,
}

impl BodySide {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodySide::Left => "left",
            BodySide::Right => "right",
        }
    }
}

/// Hand landmark indices (21-point hand schema)
pub mod hand_index {
    pub const WRIST: usize = 0;
    pub const INDEX_FINGERTIP: usize = 8;
}

/// Face mesh landmark indices (468-point face schema)
pub mod face_index {
    pub const UPPER_INNER_LIP: usize = 13;
    pub const LOWER_INNER_LIP: usize = 14;
    pub const RIGHT_EYE_UPPER: usize = 159;
    pub const RIGHT_EYE_LOWER: usize = 145;
    pub const LEFT_EYE_UPPER: usize = 386;
    pub const LEFT_EYE_LOWER: usize = 374;
}

/// Pose landmark indices (33-point body schema)
pub mod pose_index {
    pub const NOSE: usize = 0;
    pub const LEFT_SHOULDER: usize = 11;
    pub const RIGHT_SHOULDER: usize = 12;
    pub const LEFT_WRIST: usize = 15;
    pub const RIGHT_WRIST: usize = 16;
    pub const LEFT_HIP: usize = 23;
    pub const RIGHT_HIP: usize = 24;
    pub const LEFT_KNEE: usize = 25;
    pub const RIGHT_KNEE: usize = 26;
    pub const LEFT_ANKLE: usize = 27;
    pub const RIGHT_ANKLE: usize = 28;
}

/// One detected hand: its handedness label plus its landmark array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandFrame {
    pub handedness: Handedness,
    pub landmarks: Vec<Landmark>,
}

/// The per-frame bundle delivered by the perception provider.
///
/// Any modality may be absent on a given frame (no hand in view, face not
/// detected, ...). Absence is normal operation, never an error: the engine
/// simply skips classification for that modality.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameInput {
    /// Zero or more detected hands, each tagged with a handedness label
    #[serde(default)]
    pub hands: Vec<HandFrame>,
    /// Face mesh landmarks, if a face was detected
    #[serde(default)]
    pub face: Option<Vec<Landmark>>,
    /// Body pose landmarks, if a body was detected
    #[serde(default)]
    pub pose: Option<Vec<Landmark>>,
}

/// The gesture family an exercise belongs to, with its anatomical side
/// where the family is side-specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "family", content = "side", rename_all = "snake_case")]
pub enum ExerciseKind {
    /// Full open-then-close cycle of one hand
    HandOpenClose(BodySide),
    /// Full open-then-close cycle of the mouth
    MouthOpenClose,
    /// Full close-then-open cycle of one eye
    EyeBlink(BodySide),
    /// Lateral leg abduction and return, per side
    LegExtension(BodySide),
    /// Raising the wrist well above the shoulder and lowering it, per side
    ArmRaise(BodySide),
    /// One sit-down-then-stand-up cycle, with baseline calibration
    SitToStand,
}

/// One exercise in the plan: display name, gesture family, and rep target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseSpec {
    pub name: String,
    pub kind: ExerciseKind,
    pub target_repetitions: u32,
}

impl ExerciseSpec {
    pub fn new(name: impl Into<String>, kind: ExerciseKind, target_repetitions: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            target_repetitions,
        }
    }
}

/// Progress of the sit-to-stand calibration phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationProgress {
    pub frames_observed: u32,
    pub frames_required: u32,
}

/// Instantaneous open/closed state of each of the user's hands,
/// mirror-corrected. `None` when that hand was not detected this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandStates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_open: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_open: Option<bool>,
}

/// What the engine exposes to the presentation layer after each frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameReport {
    /// Display name of the active exercise (last exercise once complete)
    pub exercise_name: String,
    /// Index of the active exercise within the plan
    pub exercise_index: usize,
    /// Total number of exercises in the plan
    pub exercise_count: usize,
    /// Repetitions counted so far for the active exercise
    pub reps: u32,
    /// Repetition target of the active exercise
    pub target: u32,
    /// Whether a repetition was accepted on this frame
    pub rep_accepted: bool,
    /// Whether the whole plan has been completed
    pub plan_complete: bool,
    /// Sit-to-stand calibration progress, while calibration is running
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calibration: Option<CalibrationProgress>,
    /// Live mirror-corrected hand open/closed indicators
    pub hand_states: HandStates,
}

/// Producer metadata embedded in session summaries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Per-exercise row of a session summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionExercise {
    pub name: String,
    pub target: u32,
    pub completed: u32,
}

/// End-of-session summary payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub producer: SessionProducer,
    pub started_at_utc: String,
    pub ended_at_utc: String,
    pub exercises: Vec<SessionExercise>,
    pub plan_complete: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handedness_mirror_correction() {
        assert_eq!(Handedness::Right.user_side(), BodySide::Left);
        assert_eq!(Handedness::Left.user_side(), BodySide::Right);
    }

    #[test]
    fn test_exercise_kind_serde_round_trip() {
        let kind = ExerciseKind::HandOpenClose(BodySide::Left);
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, r#"{"family":"hand_open_close","side":"left"}"#);

        let parsed: ExerciseKind = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, kind);

        let unit: ExerciseKind = serde_json::from_str(r#"{"family":"sit_to_stand"}"#).unwrap();
        assert_eq!(unit, ExerciseKind::SitToStand);
    }

    #[test]
    fn test_frame_input_tolerates_missing_modalities() {
        let frame: FrameInput = serde_json::from_str("{}").unwrap();
        assert!(frame.hands.is_empty());
        assert!(frame.face.is_none());
        assert!(frame.pose.is_none());
    }

    #[test]
    fn test_landmark_z_defaults_to_zero() {
        let lm: Landmark = serde_json::from_str(r#"{"x":0.5,"y":0.25}"#).unwrap();
        assert_eq!(lm.z, 0.0);
    }
}
