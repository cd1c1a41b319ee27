//! Exercise plans and plan progression
//!
//! An [`ExercisePlan`] is the validated, immutable ordered configuration of
//! a session. The [`PlanRunner`] tracks progression through it: reps
//! counted against the current exercise's target, advancement, and
//! completion.

use crate::error::EngineError;
use crate::types::{BodySide, ExerciseKind, ExerciseSpec};
use serde::Serialize;

/// Validated ordered exercise sequence. Immutable for the session.
#[derive(Debug, Clone, Serialize)]
pub struct ExercisePlan {
    exercises: Vec<ExerciseSpec>,
}

impl ExercisePlan {
    /// Build a plan, rejecting configurations that could never advance.
    ///
    /// A zero repetition target is a fatal configuration error: the
    /// exercise would either never complete or complete instantly.
    pub fn new(exercises: Vec<ExerciseSpec>) -> Result<Self, EngineError> {
        if exercises.is_empty() {
            return Err(EngineError::InvalidPlan(
                "plan contains no exercises".to_string(),
            ));
        }
        for spec in &exercises {
            if spec.target_repetitions == 0 {
                return Err(EngineError::InvalidPlan(format!(
                    "exercise '{}' has a zero repetition target",
                    spec.name
                )));
            }
        }
        Ok(Self { exercises })
    }

    /// Parse and validate a plan from a JSON array of exercise specs.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let exercises: Vec<ExerciseSpec> = serde_json::from_str(json)?;
        Self::new(exercises)
    }

    /// The built-in guided rehabilitation sequence.
    pub fn default_rehab() -> Self {
        let exercises = vec![
            ExerciseSpec::new(
                "Left Hand Open - Close",
                ExerciseKind::HandOpenClose(BodySide::Left),
                10,
            ),
            ExerciseSpec::new(
                "Right Hand Open - Close",
                ExerciseKind::HandOpenClose(BodySide::Right),
                10,
            ),
            ExerciseSpec::new("Mouth Open - Close", ExerciseKind::MouthOpenClose, 5),
            ExerciseSpec::new("Right Eye Blink", ExerciseKind::EyeBlink(BodySide::Right), 5),
            ExerciseSpec::new("Left Eye Blink", ExerciseKind::EyeBlink(BodySide::Left), 5),
            ExerciseSpec::new(
                "Right Leg Extension",
                ExerciseKind::LegExtension(BodySide::Right),
                8,
            ),
            ExerciseSpec::new(
                "Left Leg Extension",
                ExerciseKind::LegExtension(BodySide::Left),
                8,
            ),
            ExerciseSpec::new("Right Arm Raise", ExerciseKind::ArmRaise(BodySide::Right), 5),
            ExerciseSpec::new("Left Arm Raise", ExerciseKind::ArmRaise(BodySide::Left), 5),
            ExerciseSpec::new("Sit Down, Stand Up", ExerciseKind::SitToStand, 8),
        ];
        Self { exercises }
    }

    pub fn exercises(&self) -> &[ExerciseSpec] {
        &self.exercises
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }
}

/// Outcome of recording one accepted repetition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStep {
    /// The repetition counted toward the current exercise
    Counted,
    /// The current exercise reached its target; the plan advanced
    Advanced,
    /// The last exercise reached its target; the plan is complete
    PlanComplete,
}

/// Progression state over an [`ExercisePlan`].
///
/// Mutated only in response to accepted repetition events; advances
/// deterministically.
#[derive(Debug, Clone)]
pub struct PlanRunner {
    plan: ExercisePlan,
    current_index: usize,
    reps: u32,
    completed: Vec<u32>,
    complete: bool,
}

impl PlanRunner {
    pub fn new(plan: ExercisePlan) -> Self {
        let completed = vec![0; plan.len()];
        Self {
            plan,
            current_index: 0,
            reps: 0,
            completed,
            complete: false,
        }
    }

    /// The active exercise; the last exercise once the plan is complete.
    pub fn current(&self) -> &ExerciseSpec {
        &self.plan.exercises()[self.current_index]
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Repetitions counted so far for the active exercise.
    pub fn reps(&self) -> u32 {
        self.reps
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn plan(&self) -> &ExercisePlan {
        &self.plan
    }

    /// Total repetitions recorded against each exercise over the session.
    pub fn completed_reps(&self) -> &[u32] {
        &self.completed
    }

    /// Record one accepted repetition against the active exercise.
    pub fn record_repetition(&mut self) -> PlanStep {
        if self.complete {
            return PlanStep::PlanComplete;
        }

        self.reps += 1;
        self.completed[self.current_index] += 1;

        if self.reps >= self.current().target_repetitions {
            self.reps = 0;
            if self.current_index + 1 < self.plan.len() {
                self.current_index += 1;
                PlanStep::Advanced
            } else {
                self.complete = true;
                PlanStep::PlanComplete
            }
        } else {
            PlanStep::Counted
        }
    }

    /// Return to the start of the plan with all counters cleared. The plan
    /// configuration itself is untouched.
    pub fn reset(&mut self) {
        self.current_index = 0;
        self.reps = 0;
        self.complete = false;
        self.completed.iter_mut().for_each(|c| *c = 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn two_exercise_plan() -> ExercisePlan {
        ExercisePlan::new(vec![
            ExerciseSpec::new("Mouth Open - Close", ExerciseKind::MouthOpenClose, 5),
            ExerciseSpec::new("Sit Down, Stand Up", ExerciseKind::SitToStand, 2),
        ])
        .unwrap()
    }

    #[test]
    fn test_zero_target_rejected() {
        let result = ExercisePlan::new(vec![ExerciseSpec::new(
            "Mouth Open - Close",
            ExerciseKind::MouthOpenClose,
            0,
        )]);
        assert!(matches!(result, Err(EngineError::InvalidPlan(_))));
    }

    #[test]
    fn test_empty_plan_rejected() {
        assert!(matches!(
            ExercisePlan::new(vec![]),
            Err(EngineError::InvalidPlan(_))
        ));
    }

    #[test]
    fn test_negative_target_rejected_by_parser() {
        let json = r#"[{"name":"Mouth Open - Close","kind":{"family":"mouth_open_close"},"target_repetitions":-3}]"#;
        assert!(ExercisePlan::from_json(json).is_err());
    }

    #[test]
    fn test_plan_from_json() {
        let json = r#"[
            {"name":"Left Hand Open - Close","kind":{"family":"hand_open_close","side":"left"},"target_repetitions":10},
            {"name":"Sit Down, Stand Up","kind":{"family":"sit_to_stand"},"target_repetitions":8}
        ]"#;
        let plan = ExercisePlan::from_json(json).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(
            plan.exercises()[0].kind,
            ExerciseKind::HandOpenClose(BodySide::Left)
        );
    }

    #[test]
    fn test_default_rehab_plan_shape() {
        let plan = ExercisePlan::default_rehab();
        assert_eq!(plan.len(), 10);
        assert_eq!(plan.exercises()[0].name, "Left Hand Open - Close");
        assert_eq!(plan.exercises()[9].kind, ExerciseKind::SitToStand);
        assert_eq!(plan.exercises()[9].target_repetitions, 8);
    }

    #[test]
    fn test_advances_exactly_on_target() {
        let mut runner = PlanRunner::new(two_exercise_plan());

        for rep in 1..=4 {
            assert_eq!(runner.record_repetition(), PlanStep::Counted);
            assert_eq!(runner.reps(), rep);
            assert_eq!(runner.current_index(), 0);
        }

        // fifth repetition advances and clears the counter
        assert_eq!(runner.record_repetition(), PlanStep::Advanced);
        assert_eq!(runner.current_index(), 1);
        assert_eq!(runner.reps(), 0);
    }

    #[test]
    fn test_plan_completes_on_last_exercise() {
        let mut runner = PlanRunner::new(two_exercise_plan());
        for _ in 0..5 {
            runner.record_repetition();
        }
        assert_eq!(runner.record_repetition(), PlanStep::Counted);
        assert_eq!(runner.record_repetition(), PlanStep::PlanComplete);
        assert!(runner.is_complete());

        // does not wrap around
        assert_eq!(runner.current_index(), 1);
        assert_eq!(runner.record_repetition(), PlanStep::PlanComplete);
    }

    #[test]
    fn test_completed_reps_tracked_per_exercise() {
        let mut runner = PlanRunner::new(two_exercise_plan());
        for _ in 0..6 {
            runner.record_repetition();
        }
        assert_eq!(runner.completed_reps(), &[5, 1]);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut runner = PlanRunner::new(two_exercise_plan());
        for _ in 0..7 {
            runner.record_repetition();
        }
        assert!(runner.is_complete());

        runner.reset();
        let once = (runner.current_index(), runner.reps(), runner.is_complete());
        runner.reset();
        let twice = (runner.current_index(), runner.reps(), runner.is_complete());
        assert_eq!(once, twice);
        assert_eq!(once, (0, 0, false));
        assert_eq!(runner.completed_reps(), &[0, 0]);
    }
}
