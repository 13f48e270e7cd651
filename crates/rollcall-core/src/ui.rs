//! UI surface the session controller reports to.
//!
//! The controller never renders anything itself; a front end implements
//! [`UiSurface`] and the controller pushes status, progress and log updates
//! through it.

use std::fmt;

use crate::types::{confidence_percent, RecognitionEvent};

pub const STATUS_BLINK: &str = "Blink your eyes";
pub const STATUS_TURN: &str = "Turn your head";
pub const STATUS_VERIFIED: &str = "Verified";
pub const STATUS_STOPPED: &str = "Stopped";
pub const MARK_SCANNING: &str = "Scanning...";

/// Elements a front end exposes to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiElement {
    VideoPreview,
    StatusText,
    ProgressBar,
    MarkStatus,
    RecognizedList,
    StartControl,
    StopControl,
}

/// The controller refuses to initialize without these.
pub const REQUIRED_ELEMENTS: &[UiElement] = &[
    UiElement::VideoPreview,
    UiElement::StatusText,
    UiElement::ProgressBar,
];

impl fmt::Display for UiElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UiElement::VideoPreview => "video preview",
            UiElement::StatusText => "status text",
            UiElement::ProgressBar => "progress bar",
            UiElement::MarkStatus => "mark status",
            UiElement::RecognizedList => "recognized list",
            UiElement::StartControl => "start control",
            UiElement::StopControl => "stop control",
        };
        f.write_str(name)
    }
}

/// Progress indicator milestones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Idle,
    Started,
    Blink,
    Turn,
    Verified,
}

impl Progress {
    pub fn percent(self) -> u8 {
        match self {
            Progress::Idle => 0,
            Progress::Started => 20,
            Progress::Blink => 30,
            Progress::Turn => 60,
            Progress::Verified => 100,
        }
    }
}

/// Sink for everything the controller shows the user.
pub trait UiSurface: Send {
    /// Required elements this surface cannot provide. Empty when complete.
    fn missing_elements(&self) -> Vec<UiElement> {
        Vec::new()
    }

    fn set_status(&mut self, text: &str);

    fn set_progress(&mut self, progress: Progress);

    fn set_mark_status(&mut self, text: &str);

    /// Enable stop / disable start while `running`, the reverse otherwise.
    fn set_controls(&mut self, running: bool);

    /// Put a newly recognized subject at the top of the log.
    fn prepend_recognition(&mut self, event: &RecognitionEvent);

    /// Surface an error the user must see immediately.
    fn notify_error(&mut self, message: &str);
}

/// `"Recognized: <name> (<pct>%)"`
pub fn recognized_line(display_name: &str, confidence: f32) -> String {
    format!(
        "Recognized: {display_name} ({}%)",
        confidence_percent(confidence)
    )
}
