//! Per-exercise motion detectors
//!
//! One detector capability, `observe(frame) -> emitted repetition?`, with a
//! variant per gesture family. The engine selects the variant from the
//! active exercise's [`ExerciseKind`], so no per-frame dispatch on exercise
//! names exists anywhere.

use crate::classifiers::{self, Thresholds};
use crate::sit_stand::{SitStandConfig, SitStandDetector};
use crate::toggle::ToggleDetector;
use crate::types::{BodySide, CalibrationProgress, ExerciseKind, FrameInput};

/// A per-exercise repetition detector.
///
/// Implementations own all cross-frame state for their exercise and emit
/// `true` from [`MotionDetector::observe`] exactly once per completed
/// repetition cycle. A frame missing the detector's modality is a no-op.
pub trait MotionDetector {
    /// Observe one frame; `true` means a candidate repetition completed.
    fn observe(&mut self, frame: &FrameInput) -> bool;

    /// Clear all cross-frame state, including any learned baseline.
    fn reset(&mut self);

    /// Calibration progress, for detectors with a calibration phase.
    fn calibration(&self) -> Option<CalibrationProgress> {
        None
    }
}

/// Build the detector for an exercise kind.
pub fn detector_for(
    kind: ExerciseKind,
    thresholds: Thresholds,
    sit_stand: SitStandConfig,
) -> Box<dyn MotionDetector> {
    match kind {
        ExerciseKind::HandOpenClose(side) => Box::new(HandOpenCloseDetector::new(side, thresholds)),
        ExerciseKind::MouthOpenClose => Box::new(MouthOpenCloseDetector::new(thresholds)),
        ExerciseKind::EyeBlink(side) => Box::new(EyeBlinkDetector::new(side, thresholds)),
        ExerciseKind::LegExtension(side) => Box::new(LegExtensionDetector::new(side, thresholds)),
        ExerciseKind::ArmRaise(side) => Box::new(ArmRaiseDetector::new(side, thresholds)),
        ExerciseKind::SitToStand => Box::new(SitToStandDetector::new(sit_stand)),
    }
}

/// Open-then-close cycles of one of the user's hands.
///
/// Hands are matched by mirror-corrected handedness: the provider labels
/// hands on the unmirrored feed, so a detected "Right" hand belongs to the
/// user's left side.
pub struct HandOpenCloseDetector {
    side: BodySide,
    thresholds: Thresholds,
    toggle: ToggleDetector,
}

impl HandOpenCloseDetector {
    pub fn new(side: BodySide, thresholds: Thresholds) -> Self {
        Self {
            side,
            thresholds,
            toggle: ToggleDetector::new(),
        }
    }
}

impl MotionDetector for HandOpenCloseDetector {
    fn observe(&mut self, frame: &FrameInput) -> bool {
        let mut emitted = false;
        for hand in &frame.hands {
            if hand.handedness.user_side() != self.side {
                continue;
            }
            if let Some(open) = classifiers::hand_open(&hand.landmarks, &self.thresholds) {
                emitted |= self.toggle.observe(open);
            }
        }
        emitted
    }

    fn reset(&mut self) {
        self.toggle.reset();
    }
}

/// Open-then-close cycles of the mouth.
pub struct MouthOpenCloseDetector {
    thresholds: Thresholds,
    toggle: ToggleDetector,
}

impl MouthOpenCloseDetector {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            toggle: ToggleDetector::new(),
        }
    }
}

impl MotionDetector for MouthOpenCloseDetector {
    fn observe(&mut self, frame: &FrameInput) -> bool {
        let Some(face) = frame.face.as_deref() else {
            return false;
        };
        match classifiers::mouth_open(face, &self.thresholds) {
            Some(open) => self.toggle.observe(open),
            None => false,
        }
    }

    fn reset(&mut self) {
        self.toggle.reset();
    }
}

/// Close-then-open cycles of one eye. Face mesh sides are anatomical, so
/// the exercise side maps directly.
pub struct EyeBlinkDetector {
    side: BodySide,
    thresholds: Thresholds,
    toggle: ToggleDetector,
}

impl EyeBlinkDetector {
    pub fn new(side: BodySide, thresholds: Thresholds) -> Self {
        Self {
            side,
            thresholds,
            toggle: ToggleDetector::new(),
        }
    }
}

impl MotionDetector for EyeBlinkDetector {
    fn observe(&mut self, frame: &FrameInput) -> bool {
        let Some(face) = frame.face.as_deref() else {
            return false;
        };
        match classifiers::eye_closed(face, self.side, &self.thresholds) {
            Some(closed) => self.toggle.observe(closed),
            None => false,
        }
    }

    fn reset(&mut self) {
        self.toggle.reset();
    }
}

/// Abduct-then-return cycles of one leg.
pub struct LegExtensionDetector {
    side: BodySide,
    thresholds: Thresholds,
    toggle: ToggleDetector,
}

impl LegExtensionDetector {
    pub fn new(side: BodySide, thresholds: Thresholds) -> Self {
        Self {
            side,
            thresholds,
            toggle: ToggleDetector::new(),
        }
    }
}

impl MotionDetector for LegExtensionDetector {
    fn observe(&mut self, frame: &FrameInput) -> bool {
        let Some(pose) = frame.pose.as_deref() else {
            return false;
        };
        match classifiers::leg_abducted(pose, self.side, &self.thresholds) {
            Some(abducted) => self.toggle.observe(abducted),
            None => false,
        }
    }

    fn reset(&mut self) {
        self.toggle.reset();
    }
}

/// Raise-then-lower cycles of one arm.
pub struct ArmRaiseDetector {
    side: BodySide,
    thresholds: Thresholds,
    toggle: ToggleDetector,
}

impl ArmRaiseDetector {
    pub fn new(side: BodySide, thresholds: Thresholds) -> Self {
        Self {
            side,
            thresholds,
            toggle: ToggleDetector::new(),
        }
    }
}

impl MotionDetector for ArmRaiseDetector {
    fn observe(&mut self, frame: &FrameInput) -> bool {
        let Some(pose) = frame.pose.as_deref() else {
            return false;
        };
        match classifiers::arm_raised(pose, self.side, &self.thresholds) {
            Some(raised) => self.toggle.observe(raised),
            None => false,
        }
    }

    fn reset(&mut self) {
        self.toggle.reset();
    }
}

/// Sit-then-stand cycles, with calibration and smoothing.
pub struct SitToStandDetector {
    inner: SitStandDetector,
}

impl SitToStandDetector {
    pub fn new(config: SitStandConfig) -> Self {
        Self {
            inner: SitStandDetector::new(config),
        }
    }
}

impl MotionDetector for SitToStandDetector {
    fn observe(&mut self, frame: &FrameInput) -> bool {
        let Some(pose) = frame.pose.as_deref() else {
            return false;
        };
        self.inner.observe(pose)
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn calibration(&self) -> Option<CalibrationProgress> {
        self.inner.calibration_progress()
    }
}
