//! Active liveness check driven by recognition-service observations.
//!
//! A printed photograph cannot blink and cannot turn its head on request.
//! The client therefore walks the subject through two micro-actions before
//! it accepts a recognition result:
//!
//! 1. **Blink**: the service reports `blink = true` for a frame.
//! 2. **Turn**: the service reports a head yaw beyond the threshold.
//! 3. **Done**: recognition results are accepted from here on.
//!
//! The step only ever moves forward. Contradictory or repeated signals
//! (a blink while waiting for a turn, a frontal face after the turn) are
//! ignored rather than resetting the check.
//!
//! # Threat Coverage
//!
//! - **Blocks:** Printed photographs, static images held in front of camera.
//! - **Does not block:** Video replay of a subject performing both actions.

use serde::Serialize;

/// Default head yaw (degrees, either direction) the subject must exceed to
/// complete the turn step.
pub const DEFAULT_YAW_THRESHOLD_DEG: f32 = 15.0;

/// Position in the liveness sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LivenessStep {
    Blink,
    Turn,
    Done,
}

impl LivenessStep {
    fn next(self) -> Self {
        match self {
            LivenessStep::Blink => LivenessStep::Turn,
            LivenessStep::Turn | LivenessStep::Done => LivenessStep::Done,
        }
    }
}

/// Result of feeding one observation into the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    /// The step that was active when the observation arrived.
    pub handled_by: LivenessStep,
    /// Whether the observation moved the check to the next step.
    pub advanced: bool,
}

/// Whether a yaw reading counts as a deliberate head turn.
///
/// The comparison is strict: a yaw of exactly `threshold_deg` does not pass.
/// NaN never passes.
pub fn is_head_turned(yaw_deg: f32, threshold_deg: f32) -> bool {
    yaw_deg.abs() > threshold_deg
}

/// Forward-only blink → turn → done sequence.
#[derive(Debug, Clone)]
pub struct LivenessCheck {
    step: LivenessStep,
    yaw_threshold_deg: f32,
}

impl Default for LivenessCheck {
    fn default() -> Self {
        Self::new(DEFAULT_YAW_THRESHOLD_DEG)
    }
}

impl LivenessCheck {
    pub fn new(yaw_threshold_deg: f32) -> Self {
        Self {
            step: LivenessStep::Blink,
            yaw_threshold_deg,
        }
    }

    pub fn step(&self) -> LivenessStep {
        self.step
    }

    pub fn is_done(&self) -> bool {
        self.step == LivenessStep::Done
    }

    /// Feed one frame's liveness signals.
    ///
    /// At most one transition happens per observation: a frame that both
    /// blinks and turns while in [`LivenessStep::Blink`] only completes the
    /// blink step.
    pub fn observe(&mut self, blink: bool, yaw_deg: f32) -> Observation {
        let handled_by = self.step;
        let advanced = match handled_by {
            LivenessStep::Blink => blink,
            LivenessStep::Turn => is_head_turned(yaw_deg, self.yaw_threshold_deg),
            LivenessStep::Done => false,
        };

        if advanced {
            self.step = handled_by.next();
        }

        Observation {
            handled_by,
            advanced,
        }
    }
}
