//! Engine orchestration
//!
//! This module provides the public per-frame API. [`RepEngine`] owns all
//! mutable session state: the plan runner, the active exercise's detector,
//! and the debounce gate. One call to [`RepEngine::observe`] processes one
//! landmark frame and returns the report the presentation layer renders.
//!
//! Per-frame flow: classifiers/sit-stand (selected by the active exercise)
//! -> toggle/state machine -> debounce gate -> plan counter update.

use crate::classifiers::{self, Thresholds};
use crate::debounce::{DebounceGate, DEFAULT_DEBOUNCE_FRAMES};
use crate::detector::{detector_for, MotionDetector};
use crate::error::EngineError;
use crate::plan::{ExercisePlan, PlanRunner, PlanStep};
use crate::sit_stand::SitStandConfig;
use crate::summary::SummaryEncoder;
use crate::types::{FrameInput, FrameReport, HandStates, SessionSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Engine tuning: classifier thresholds, sit-to-stand parameters, and the
/// debounce window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub thresholds: Thresholds,
    pub sit_stand: SitStandConfig,
    /// Minimum frames between accepted repetitions, across all detectors
    pub debounce_frames: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            sit_stand: SitStandConfig::default(),
            debounce_frames: DEFAULT_DEBOUNCE_FRAMES,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Stateful repetition detection engine for one session.
///
/// Single-threaded and frame-driven: the caller invokes [`observe`] once
/// per delivered landmark frame, in arrival order. The engine never blocks
/// and holds the only cross-frame mutable state of the system.
///
/// [`observe`]: RepEngine::observe
pub struct RepEngine {
    config: EngineConfig,
    runner: PlanRunner,
    detector: Box<dyn MotionDetector>,
    gate: DebounceGate,
    encoder: SummaryEncoder,
    started_at: DateTime<Utc>,
}

impl RepEngine {
    /// Create an engine with default tuning.
    pub fn new(plan: ExercisePlan) -> Self {
        Self::with_config(plan, EngineConfig::default())
    }

    /// Create an engine with explicit tuning.
    pub fn with_config(plan: ExercisePlan, config: EngineConfig) -> Self {
        let runner = PlanRunner::new(plan);
        let detector = detector_for(
            runner.current().kind,
            config.thresholds,
            config.sit_stand,
        );
        Self {
            config,
            runner,
            detector,
            gate: DebounceGate::new(config.debounce_frames),
            encoder: SummaryEncoder::new(),
            started_at: Utc::now(),
        }
    }

    /// Process one landmark frame and report the resulting state.
    pub fn observe(&mut self, frame: &FrameInput) -> FrameReport {
        let hand_states = classifiers::hand_states(frame, &self.config.thresholds);

        let mut rep_accepted = false;
        if !self.runner.is_complete() {
            let candidate = self.detector.observe(frame);
            rep_accepted = self.gate.observe(candidate);

            if rep_accepted {
                match self.runner.record_repetition() {
                    PlanStep::Counted => {}
                    PlanStep::Advanced => self.begin_exercise(),
                    PlanStep::PlanComplete => {}
                }
            }
        }

        self.report(rep_accepted, hand_states)
    }

    /// Clear all detector, calibration, and progression state and return to
    /// the first exercise. The plan configuration is untouched.
    pub fn reset(&mut self) {
        self.runner.reset();
        self.begin_exercise();
    }

    /// Current engine state as a report, without consuming a frame.
    pub fn status(&self) -> FrameReport {
        self.report(false, HandStates::default())
    }

    pub fn is_complete(&self) -> bool {
        self.runner.is_complete()
    }

    pub fn plan(&self) -> &ExercisePlan {
        self.runner.plan()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Session summary for the caller: per-exercise totals and timestamps.
    pub fn summary(&self) -> SessionSummary {
        self.encoder.encode(&self.runner, self.started_at)
    }

    /// Session summary as a JSON string.
    pub fn summary_json(&self) -> Result<String, EngineError> {
        self.encoder.encode_to_json(&self.runner, self.started_at)
    }

    /// Fresh detector and debounce state for the active exercise. No
    /// residual armed flags or stale baselines survive into it.
    fn begin_exercise(&mut self) {
        self.detector = detector_for(
            self.runner.current().kind,
            self.config.thresholds,
            self.config.sit_stand,
        );
        self.gate.reset();
    }

    fn report(&self, rep_accepted: bool, hand_states: HandStates) -> FrameReport {
        let spec = self.runner.current();
        FrameReport {
            exercise_name: spec.name.clone(),
            exercise_index: self.runner.current_index(),
            exercise_count: self.runner.plan().len(),
            reps: self.runner.reps(),
            target: spec.target_repetitions,
            rep_accepted,
            plan_complete: self.runner.is_complete(),
            calibration: self.detector.calibration(),
            hand_states,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        hand_index, pose_index, BodySide, ExerciseKind, ExerciseSpec, HandFrame, Handedness,
        Landmark,
    };

    fn hand_frame(handedness: Handedness, open: bool) -> FrameInput {
        let tip_distance = if open { 0.30 } else { 0.05 };
        let mut landmarks = vec![Landmark::new(0.5, 0.5); 21];
        landmarks[hand_index::INDEX_FINGERTIP] = Landmark::new(0.5, 0.5 - tip_distance);
        FrameInput {
            hands: vec![HandFrame {
                handedness,
                landmarks,
            }],
            ..Default::default()
        }
    }

    fn standing_frame() -> FrameInput {
        let mut lm = vec![Landmark::new(0.5, 0.5); 33];
        lm[pose_index::NOSE] = Landmark::new(0.5, 0.1);
        for (h, k, a) in [
            (pose_index::LEFT_HIP, pose_index::LEFT_KNEE, pose_index::LEFT_ANKLE),
            (pose_index::RIGHT_HIP, pose_index::RIGHT_KNEE, pose_index::RIGHT_ANKLE),
        ] {
            lm[h] = Landmark::new(0.5, 0.2);
            lm[k] = Landmark::new(0.5, 0.3);
            lm[a] = Landmark::new(0.5, 0.4);
        }
        FrameInput {
            pose: Some(lm),
            ..Default::default()
        }
    }

    fn left_hand_plan(target: u32) -> ExercisePlan {
        ExercisePlan::new(vec![ExerciseSpec::new(
            "Left Hand Open - Close",
            ExerciseKind::HandOpenClose(BodySide::Left),
            target,
        )])
        .unwrap()
    }

    #[test]
    fn test_counts_mirror_corrected_hand_cycles() {
        let mut engine = RepEngine::new(left_hand_plan(2));

        // the user's left hand carries the provider label "Right"
        let report = engine.observe(&hand_frame(Handedness::Right, true));
        assert!(!report.rep_accepted);
        assert_eq!(report.reps, 0);

        let report = engine.observe(&hand_frame(Handedness::Right, false));
        assert!(report.rep_accepted);
        assert_eq!(report.reps, 1);
    }

    #[test]
    fn test_wrong_side_hand_never_counts() {
        let mut engine = RepEngine::new(left_hand_plan(2));

        engine.observe(&hand_frame(Handedness::Left, true));
        let report = engine.observe(&hand_frame(Handedness::Left, false));
        assert!(!report.rep_accepted);
        assert_eq!(report.reps, 0);
    }

    #[test]
    fn test_debounce_drops_rapid_cycles() {
        let mut engine = RepEngine::new(left_hand_plan(10));

        engine.observe(&hand_frame(Handedness::Right, true));
        assert!(engine.observe(&hand_frame(Handedness::Right, false)).rep_accepted);

        // a second full cycle right away falls inside the cooldown
        engine.observe(&hand_frame(Handedness::Right, true));
        let report = engine.observe(&hand_frame(Handedness::Right, false));
        assert!(!report.rep_accepted);
        assert_eq!(report.reps, 1);

        // after the window has elapsed, cycles count again
        for _ in 0..10 {
            engine.observe(&FrameInput::default());
        }
        engine.observe(&hand_frame(Handedness::Right, true));
        assert!(engine.observe(&hand_frame(Handedness::Right, false)).rep_accepted);
    }

    #[test]
    fn test_advance_and_completion() {
        let plan = ExercisePlan::new(vec![
            ExerciseSpec::new(
                "Left Hand Open - Close",
                ExerciseKind::HandOpenClose(BodySide::Left),
                1,
            ),
            ExerciseSpec::new("Mouth Open - Close", ExerciseKind::MouthOpenClose, 1),
        ])
        .unwrap();
        let mut engine = RepEngine::new(plan);

        engine.observe(&hand_frame(Handedness::Right, true));
        let report = engine.observe(&hand_frame(Handedness::Right, false));
        assert!(report.rep_accepted);
        assert_eq!(report.exercise_index, 1);
        assert_eq!(report.exercise_name, "Mouth Open - Close");
        assert_eq!(report.reps, 0);
        assert!(!report.plan_complete);

        // mouth cycle: the debounce gate was reset on advance, so the next
        // exercise's first repetition is immediately eligible
        let mut face = vec![Landmark::new(0.5, 0.5); 468];
        face[crate::types::face_index::LOWER_INNER_LIP] = Landmark::new(0.5, 0.55);
        let open_frame = FrameInput {
            face: Some(face.clone()),
            ..Default::default()
        };
        let mut closed_face = face;
        closed_face[crate::types::face_index::LOWER_INNER_LIP] = Landmark::new(0.5, 0.5);
        let closed_frame = FrameInput {
            face: Some(closed_face),
            ..Default::default()
        };

        engine.observe(&open_frame);
        let report = engine.observe(&closed_frame);
        assert!(report.rep_accepted);
        assert!(report.plan_complete);
        assert!(engine.is_complete());

        // no further counting after completion
        engine.observe(&open_frame);
        let report = engine.observe(&closed_frame);
        assert!(!report.rep_accepted);
        assert!(report.plan_complete);
    }

    #[test]
    fn test_sit_stand_reports_calibration() {
        let plan = ExercisePlan::new(vec![ExerciseSpec::new(
            "Sit Down, Stand Up",
            ExerciseKind::SitToStand,
            8,
        )])
        .unwrap();
        let mut engine = RepEngine::new(plan);

        let report = engine.observe(&standing_frame());
        let calibration = report.calibration.expect("calibration in progress");
        assert_eq!(calibration.frames_observed, 1);
        assert_eq!(calibration.frames_required, 60);

        for _ in 0..59 {
            engine.observe(&standing_frame());
        }
        assert!(engine.status().calibration.is_none());
    }

    #[test]
    fn test_missing_modality_frames_are_tolerated() {
        let mut engine = RepEngine::new(left_hand_plan(5));
        for _ in 0..20 {
            let report = engine.observe(&FrameInput::default());
            assert!(!report.rep_accepted);
        }
        assert_eq!(engine.status().reps, 0);
    }

    #[test]
    fn test_reset_clears_everything_and_is_idempotent() {
        let mut engine = RepEngine::new(left_hand_plan(5));

        engine.observe(&hand_frame(Handedness::Right, true));
        engine.observe(&hand_frame(Handedness::Right, false));
        assert_eq!(engine.status().reps, 1);

        engine.reset();
        let once = engine.status();
        engine.reset();
        let twice = engine.status();

        assert_eq!(once.reps, 0);
        assert_eq!(once.exercise_index, 0);
        assert_eq!(twice.reps, 0);
        assert_eq!(twice.exercise_index, 0);

        // a close after reset is not a completed cycle
        let report = engine.observe(&hand_frame(Handedness::Right, false));
        assert!(!report.rep_accepted);
    }

    #[test]
    fn test_live_hand_states_any_exercise() {
        let plan = ExercisePlan::new(vec![ExerciseSpec::new(
            "Mouth Open - Close",
            ExerciseKind::MouthOpenClose,
            5,
        )])
        .unwrap();
        let mut engine = RepEngine::new(plan);

        let report = engine.observe(&hand_frame(Handedness::Right, true));
        assert_eq!(report.hand_states.left_open, Some(true));
        assert_eq!(report.hand_states.right_open, None);
    }

    #[test]
    fn test_config_json_partial_overrides() {
        let config = EngineConfig::from_json(r#"{"debounce_frames": 4}"#).unwrap();
        assert_eq!(config.debounce_frames, 4);
        assert_eq!(config.thresholds, Thresholds::default());
        assert_eq!(config.sit_stand, SitStandConfig::default());
    }
}
