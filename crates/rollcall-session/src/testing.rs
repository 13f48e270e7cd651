//! Scripted camera, service and UI doubles shared by the controller and
//! runner tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use image::RgbImage;
use rollcall_client::{RecognitionService, ServiceError};
use rollcall_core::{Progress, RecognitionEvent, RecognitionResponse, UiElement, UiSurface};
use rollcall_hw::{Camera, CameraError};

#[derive(Default)]
pub struct FakeCamera {
    pub acquired: bool,
    pub acquire_calls: usize,
    pub release_calls: usize,
    pub captures: usize,
    pub deny_access: bool,
    pub fail_capture: bool,
}

impl Camera for FakeCamera {
    fn acquire(&mut self) -> Result<(), CameraError> {
        self.acquire_calls += 1;
        if self.deny_access {
            return Err(CameraError::PermissionDenied("test".into()));
        }
        self.acquired = true;
        Ok(())
    }

    fn capture_frame(&mut self) -> Result<Option<RgbImage>, CameraError> {
        if !self.acquired {
            return Err(CameraError::NotAcquired);
        }
        if self.fail_capture {
            return Err(CameraError::NoDevice("unplugged".into()));
        }
        self.captures += 1;
        Ok(Some(RgbImage::new(16, 16)))
    }

    fn release(&mut self) {
        self.release_calls += 1;
        self.acquired = false;
    }

    fn is_acquired(&self) -> bool {
        self.acquired
    }
}

#[derive(Default)]
pub struct RecordingUi {
    pub missing: Vec<UiElement>,
    pub status: String,
    pub progress: Option<Progress>,
    pub mark_status: String,
    pub running: bool,
    pub log: Vec<RecognitionEvent>,
    pub errors: Vec<String>,
}

impl UiSurface for RecordingUi {
    fn missing_elements(&self) -> Vec<UiElement> {
        self.missing.clone()
    }

    fn set_status(&mut self, text: &str) {
        self.status = text.to_string();
    }

    fn set_progress(&mut self, progress: Progress) {
        self.progress = Some(progress);
    }

    fn set_mark_status(&mut self, text: &str) {
        self.mark_status = text.to_string();
    }

    fn set_controls(&mut self, running: bool) {
        self.running = running;
    }

    fn prepend_recognition(&mut self, event: &RecognitionEvent) {
        self.log.insert(0, event.clone());
    }

    fn notify_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}

/// Replays queued verdicts, then answers "nothing seen" forever.
#[derive(Default)]
pub struct ScriptedService {
    script: Mutex<VecDeque<Result<RecognitionResponse, ServiceError>>>,
    calls: Mutex<usize>,
}

impl ScriptedService {
    pub fn new(script: Vec<Result<RecognitionResponse, ServiceError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl RecognitionService for ScriptedService {
    fn recognize(&self, jpeg: &[u8]) -> Result<RecognitionResponse, ServiceError> {
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "payload must be a jpeg");
        *self.calls.lock().unwrap() += 1;
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(RecognitionResponse::default()))
    }
}

pub fn blink() -> RecognitionResponse {
    RecognitionResponse {
        blink: true,
        ..Default::default()
    }
}

pub fn yaw(deg: f32) -> RecognitionResponse {
    RecognitionResponse {
        yaw: deg,
        ..Default::default()
    }
}

pub fn recognized(id: &str, name: &str, confidence: f32) -> RecognitionResponse {
    RecognitionResponse {
        recognized: true,
        subject_id: Some(id.to_string()),
        display_name: Some(name.to_string()),
        confidence,
        ..Default::default()
    }
}
