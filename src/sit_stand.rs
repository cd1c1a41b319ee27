//! Sit-to-stand detection
//!
//! The only exercise with a learned baseline and temporal smoothing. The
//! detector smooths a per-frame body-height measurement, learns a standing
//! reference height over a fixed calibration window, then runs a
//! hysteresis state machine over height and knee angle. One full
//! sit-then-stand cycle counts as one repetition.

use crate::geometry::angle_at_deg;
use crate::types::{pose_index, CalibrationProgress, Landmark};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Sit-to-stand tuning parameters.
///
/// Ratios are relative to the calibrated standing reference height; the
/// two distinct sit/stand cutoff pairs provide the hysteresis that keeps
/// the state machine from oscillating near a single boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SitStandConfig {
    /// Frames observed before the standing reference is fixed
    pub calibration_frames: u32,
    /// Capacity of the height smoothing buffer
    pub smoothing_window: usize,
    /// Fraction of the reference height below which sitting is entered
    pub sit_height_ratio: f64,
    /// Fraction of the reference height above which standing is re-entered
    pub stand_height_ratio: f64,
    /// Knee angle below which the knees count as bent (degrees)
    pub knee_sit_angle_deg: f64,
    /// Knee angle above which the legs count as straightened (degrees)
    pub knee_stand_angle_deg: f64,
    /// Floor applied to the learned reference height, guarding against a
    /// degenerate near-zero baseline from a poor first detection
    pub min_reference_height: f64,
}

impl Default for SitStandConfig {
    fn default() -> Self {
        Self {
            calibration_frames: 60,
            smoothing_window: 5,
            sit_height_ratio: 0.75,
            stand_height_ratio: 0.92,
            knee_sit_angle_deg: 110.0,
            knee_stand_angle_deg: 150.0,
            min_reference_height: 0.25,
        }
    }
}

/// Posture state of the hysteresis machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SitStandState {
    Standing,
    Sitting,
}

/// Calibrating, smoothing sit/stand repetition detector.
#[derive(Debug, Clone)]
pub struct SitStandDetector {
    config: SitStandConfig,
    heights: VecDeque<f64>,
    reference_height: Option<f64>,
    frames_observed: u32,
    state: SitStandState,
}

impl Default for SitStandDetector {
    fn default() -> Self {
        Self::new(SitStandConfig::default())
    }
}

impl SitStandDetector {
    pub fn new(config: SitStandConfig) -> Self {
        Self {
            config,
            heights: VecDeque::with_capacity(config.smoothing_window),
            reference_height: None,
            frames_observed: 0,
            state: SitStandState::Standing,
        }
    }

    /// Observe one pose frame. Returns `true` when a full sit-then-stand
    /// cycle completes, i.e. on the sitting-to-standing transition.
    ///
    /// Frames missing the nose or either ankle do not advance calibration
    /// or detection.
    pub fn observe(&mut self, pose: &[Landmark]) -> bool {
        let (Some(nose), Some(left_ankle), Some(right_ankle)) = (
            pose.get(pose_index::NOSE),
            pose.get(pose_index::LEFT_ANKLE),
            pose.get(pose_index::RIGHT_ANKLE),
        ) else {
            return false;
        };

        let ankle_mid_y = (left_ankle.y + right_ankle.y) / 2.0;
        let height = (nose.y - ankle_mid_y).abs();

        self.heights.push_back(height);
        while self.heights.len() > self.config.smoothing_window {
            self.heights.pop_front();
        }
        let smoothed = self.heights.iter().sum::<f64>() / self.heights.len() as f64;

        // Calibration phase: learn the standing reference, emit nothing.
        if self.reference_height.is_none() && self.frames_observed < self.config.calibration_frames
        {
            self.frames_observed += 1;
            if self.frames_observed == self.config.calibration_frames {
                let reference = median(&self.heights).max(self.config.min_reference_height);
                self.reference_height = Some(reference);
            }
            return false;
        }

        let Some(reference) = self.reference_height else {
            return false;
        };

        let sit_threshold = reference * self.config.sit_height_ratio;
        let stand_threshold = reference * self.config.stand_height_ratio;

        // Minimum knee angle across both legs; one bent knee is enough to
        // corroborate sitting.
        let right_knee = knee_angle(
            pose,
            pose_index::RIGHT_HIP,
            pose_index::RIGHT_KNEE,
            pose_index::RIGHT_ANKLE,
        );
        let left_knee = knee_angle(
            pose,
            pose_index::LEFT_HIP,
            pose_index::LEFT_KNEE,
            pose_index::LEFT_ANKLE,
        );
        let min_knee = right_knee.min(left_knee);

        match self.state {
            SitStandState::Standing
                if smoothed < sit_threshold || min_knee < self.config.knee_sit_angle_deg =>
            {
                self.state = SitStandState::Sitting;
                false
            }
            SitStandState::Sitting
                if smoothed > stand_threshold && min_knee > self.config.knee_stand_angle_deg =>
            {
                self.state = SitStandState::Standing;
                true
            }
            _ => false,
        }
    }

    /// Whether the reference height is still being learned.
    pub fn is_calibrating(&self) -> bool {
        self.reference_height.is_none()
    }

    /// Calibration progress, while calibration is running.
    pub fn calibration_progress(&self) -> Option<CalibrationProgress> {
        if self.is_calibrating() {
            Some(CalibrationProgress {
                frames_observed: self.frames_observed,
                frames_required: self.config.calibration_frames,
            })
        } else {
            None
        }
    }

    /// The learned standing reference height, once calibration completes.
    pub fn reference_height(&self) -> Option<f64> {
        self.reference_height
    }

    pub fn state(&self) -> SitStandState {
        self.state
    }

    /// Clear all learned and smoothed state, restarting calibration.
    pub fn reset(&mut self) {
        self.heights.clear();
        self.reference_height = None;
        self.frames_observed = 0;
        self.state = SitStandState::Standing;
    }
}

/// Knee angle at the knee vertex from a hip-knee-ankle triple. A missing
/// landmark defaults the angle to 180.0 (fully extended).
fn knee_angle(pose: &[Landmark], hip: usize, knee: usize, ankle: usize) -> f64 {
    match (pose.get(hip), pose.get(knee), pose.get(ankle)) {
        (Some(hip), Some(knee), Some(ankle)) => angle_at_deg(*hip, *knee, *ankle),
        _ => 180.0,
    }
}

fn median(values: &VecDeque<f64>) -> f64 {
    let mut sorted: Vec<f64> = values.iter().copied().collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}
