//! Neuromotion - On-device repetition detection engine for camera-guided
//! rehabilitation exercises
//!
//! The engine turns a per-frame stream of normalized body landmarks (hands,
//! face, pose) from an external perception provider into counted exercise
//! repetitions and plan progression: gesture classification -> toggle/state
//! machine -> debounce -> plan counter update.
//!
//! ## Modules
//!
//! - **Classifiers**: pure per-frame gesture predicates with configurable
//!   thresholds
//! - **Detectors**: per-exercise repetition detectors (toggle cycles and
//!   the calibrating sit-to-stand state machine)
//! - **Engine**: the stateful per-frame orchestrator and its reports

pub mod classifiers;
pub mod debounce;
pub mod detector;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod plan;
pub mod sit_stand;
pub mod summary;
pub mod toggle;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use engine::{EngineConfig, RepEngine};
pub use error::EngineError;
pub use plan::{ExercisePlan, PlanRunner, PlanStep};
pub use types::{
    BodySide, ExerciseKind, ExerciseSpec, FrameInput, FrameReport, Handedness, SessionSummary,
};

/// Engine version embedded in session summaries
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for session summaries
pub const PRODUCER_NAME: &str = "neuromotion";
