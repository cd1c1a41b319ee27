//! Session summary encoding
//!
//! Assembles the end-of-session payload the caller hands to reporting or
//! sync layers: producer metadata, session timestamps, and per-exercise
//! completion totals.

use crate::error::EngineError;
use crate::plan::PlanRunner;
use crate::types::{SessionExercise, SessionProducer, SessionSummary};
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Summary encoder with a stable per-session instance ID.
pub struct SummaryEncoder {
    instance_id: String,
}

impl Default for SummaryEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SummaryEncoder {
    /// Create an encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Encode the session state into a summary payload.
    pub fn encode(&self, runner: &PlanRunner, started_at: DateTime<Utc>) -> SessionSummary {
        let ended_at = Utc::now();

        let exercises = runner
            .plan()
            .exercises()
            .iter()
            .zip(runner.completed_reps())
            .map(|(spec, &completed)| SessionExercise {
                name: spec.name.clone(),
                target: spec.target_repetitions,
                completed,
            })
            .collect();

        SessionSummary {
            producer: SessionProducer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            started_at_utc: started_at.to_rfc3339(),
            ended_at_utc: ended_at.to_rfc3339(),
            exercises,
            plan_complete: runner.is_complete(),
        }
    }

    /// Encode to a pretty JSON string.
    pub fn encode_to_json(
        &self,
        runner: &PlanRunner,
        started_at: DateTime<Utc>,
    ) -> Result<String, EngineError> {
        let summary = self.encode(runner, started_at);
        serde_json::to_string_pretty(&summary).map_err(EngineError::JsonError)
    }
}
