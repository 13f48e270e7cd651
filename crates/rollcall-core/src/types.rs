use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Display name used when the service recognizes a subject without naming it.
pub const UNKNOWN_DISPLAY_NAME: &str = "Unknown";

/// One frame's verdict from the recognition service.
///
/// The service omits identity fields when nothing was recognized, so every
/// field falls back to a default. The legacy `student_id` / `name` keys are
/// accepted alongside `subjectId` / `displayName`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionResponse {
    #[serde(default)]
    pub blink: bool,
    /// Horizontal head rotation in degrees.
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub recognized: bool,
    #[serde(
        default,
        alias = "student_id",
        deserialize_with = "deserialize_subject_id"
    )]
    pub subject_id: Option<String>,
    #[serde(default, alias = "name")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub confidence: f32,
}

impl RecognitionResponse {
    /// Name to show for this response, falling back to [`UNKNOWN_DISPLAY_NAME`].
    pub fn display_name_or_unknown(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(UNKNOWN_DISPLAY_NAME)
    }
}

/// Subject ids arrive as strings or as integer database keys.
fn deserialize_subject_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Text(s) => s,
        RawId::Unsigned(n) => n.to_string(),
        RawId::Signed(n) => n.to_string(),
    }))
}

/// A subject announced for the first time in a session. Never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionEvent {
    pub subject_id: String,
    pub display_name: String,
    /// Service confidence clamped to `0.0..=1.0`.
    pub confidence: f32,
    pub timestamp: DateTime<Utc>,
}

impl RecognitionEvent {
    pub fn new(
        subject_id: impl Into<String>,
        display_name: impl Into<String>,
        confidence: f32,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            display_name: display_name.into(),
            confidence: clamp_confidence(confidence),
            timestamp,
        }
    }

    /// `"<name> - <local time>"`, the form shown in the recognition log.
    pub fn log_line(&self) -> String {
        format!(
            "{} - {}",
            self.display_name,
            self.timestamp.with_timezone(&Local).format("%H:%M:%S")
        )
    }
}

/// Confidence as a whole percentage, rounded half away from zero.
pub fn confidence_percent(confidence: f32) -> u32 {
    (clamp_confidence(confidence) * 100.0).round() as u32
}

fn clamp_confidence(confidence: f32) -> f32 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}
