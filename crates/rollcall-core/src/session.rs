use std::collections::HashSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::liveness::{LivenessCheck, LivenessStep};
use crate::types::{RecognitionEvent, RecognitionResponse};

/// What one service response did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// Waiting for a blink; `advanced` is true when this response supplied it.
    Blink { advanced: bool },
    /// Waiting for a head turn; `advanced` is true when this response supplied it.
    Turn { advanced: bool },
    /// Liveness passed but the service did not recognize anyone.
    AwaitingRecognition,
    /// Service claimed a recognition without a subject id.
    Unidentified,
    /// A subject was recognized. The session is complete.
    Recognized(Recognition),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub subject_id: String,
    pub display_name: String,
    pub confidence: f32,
    /// Set only the first time this subject is seen in the session.
    pub event: Option<RecognitionEvent>,
}

/// State of one start → stop session.
///
/// A fresh value is created on every start, which is what clears the
/// seen-subject set between sessions.
#[derive(Debug, Clone)]
pub struct SessionState {
    id: Uuid,
    liveness: LivenessCheck,
    seen: HashSet<String>,
    complete: bool,
}

impl SessionState {
    pub fn new(yaw_threshold_deg: f32) -> Self {
        Self {
            id: Uuid::new_v4(),
            liveness: LivenessCheck::new(yaw_threshold_deg),
            seen: HashSet::new(),
            complete: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn step(&self) -> LivenessStep {
        self.liveness.step()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Number of distinct subjects announced in this session.
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    pub fn has_seen(&self, subject_id: &str) -> bool {
        self.seen.contains(subject_id)
    }

    /// Apply one service response.
    ///
    /// Recognition fields are only looked at once liveness is done, and
    /// only on a response that arrives after the one completing the turn.
    pub fn evaluate(&mut self, resp: &RecognitionResponse, now: DateTime<Utc>) -> Evaluation {
        let obs = self.liveness.observe(resp.blink, resp.yaw);
        match obs.handled_by {
            LivenessStep::Blink => Evaluation::Blink {
                advanced: obs.advanced,
            },
            LivenessStep::Turn => Evaluation::Turn {
                advanced: obs.advanced,
            },
            LivenessStep::Done => self.evaluate_recognition(resp, now),
        }
    }

    fn evaluate_recognition(&mut self, resp: &RecognitionResponse, now: DateTime<Utc>) -> Evaluation {
        if !resp.recognized {
            return Evaluation::AwaitingRecognition;
        }
        let Some(subject_id) = resp.subject_id.as_deref().filter(|id| !id.is_empty()) else {
            return Evaluation::Unidentified;
        };

        let display_name = resp.display_name_or_unknown().to_string();
        let event = self.seen.insert(subject_id.to_string()).then(|| {
            RecognitionEvent::new(subject_id, display_name.clone(), resp.confidence, now)
        });
        self.complete = true;

        Evaluation::Recognized(Recognition {
            subject_id: subject_id.to_string(),
            display_name,
            confidence: resp.confidence,
            event,
        })
    }
}
