use chrono::Utc;
use rollcall_client::{RecognitionService, ServiceError};
use rollcall_core::frame::encode_jpeg;
use rollcall_core::ui::{self, REQUIRED_ELEMENTS};
use rollcall_core::{
    Evaluation, LivenessStep, Progress, Recognition, RecognitionEvent, RecognitionResponse,
    SessionState, UiElement, UiSurface,
};
use rollcall_hw::{Camera, CameraError};
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("missing required UI elements: {0:?}")]
    MissingUiElements(Vec<UiElement>),
    #[error("session already running")]
    AlreadyRunning,
    #[error("camera error: {0}")]
    Camera(#[from] CameraError),
}

/// One captured frame, tagged with the session it was taken in.
#[derive(Debug, Clone)]
pub struct Sample {
    pub session_id: Uuid,
    pub jpeg: Vec<u8>,
}

/// What a tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No session is running.
    Idle,
    /// The response belongs to a session that has since ended.
    Stale,
    /// Capture or the service failed; nothing changed.
    Skipped,
    /// The response was applied and sampling continues at `step`.
    Progressed { step: LivenessStep },
    /// A subject was recognized; the session is over.
    Completed(Recognition),
}

/// Drives one camera through blink → turn → recognized sessions and
/// mirrors progress onto a UI surface.
///
/// All methods are synchronous. The async runner splits a tick into
/// [`capture_sample`](Self::capture_sample) and
/// [`apply_response`](Self::apply_response) so no lock is held across the
/// network call.
pub struct SessionController<C, U> {
    camera: C,
    ui: U,
    session: Option<SessionState>,
    /// Every announced recognition, newest first. Survives restarts.
    log: Vec<RecognitionEvent>,
    jpeg_quality: u8,
    yaw_threshold_deg: f32,
}

impl<C: Camera, U: UiSurface> SessionController<C, U> {
    /// Fails if the UI lacks any element in [`REQUIRED_ELEMENTS`].
    pub fn new(camera: C, mut ui: U, config: &Config) -> Result<Self, ControllerError> {
        let missing: Vec<UiElement> = ui
            .missing_elements()
            .into_iter()
            .filter(|e| REQUIRED_ELEMENTS.contains(e))
            .collect();
        if !missing.is_empty() {
            tracing::error!(?missing, "required UI elements missing, refusing to initialize");
            return Err(ControllerError::MissingUiElements(missing));
        }

        ui.set_controls(false);

        Ok(Self {
            camera,
            ui,
            session: None,
            log: Vec::new(),
            jpeg_quality: config.jpeg_quality,
            yaw_threshold_deg: config.yaw_threshold_deg,
        })
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session.as_ref().map(SessionState::id)
    }

    pub fn step(&self) -> Option<LivenessStep> {
        self.session.as_ref().map(SessionState::step)
    }

    pub fn recognition_log(&self) -> &[RecognitionEvent] {
        &self.log
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    /// Begin a session: reset liveness, clear seen subjects, open the camera.
    ///
    /// Rejected while a session runs; the camera is never acquired twice.
    pub fn start(&mut self) -> Result<Uuid, ControllerError> {
        if let Some(current) = &self.session {
            tracing::warn!(session_id = %current.id(), "start ignored, session already running");
            return Err(ControllerError::AlreadyRunning);
        }

        let session = SessionState::new(self.yaw_threshold_deg);
        let session_id = session.id();

        self.ui.set_controls(true);
        self.ui.set_status(ui::STATUS_BLINK);
        self.ui.set_progress(Progress::Started);

        if let Err(e) = self.camera.acquire() {
            tracing::error!(session_id = %session_id, error = %e, "camera acquisition failed");
            self.ui.notify_error(&format!("Camera error: {e}"));
            self.ui.set_controls(false);
            return Err(e.into());
        }

        self.ui.set_mark_status(ui::MARK_SCANNING);
        self.session = Some(session);

        tracing::info!(session_id = %session_id, "session started");
        Ok(session_id)
    }

    /// End the session, release the camera and reset the indicators.
    /// Safe to call at any time.
    pub fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::info!(session_id = %session.id(), step = ?session.step(), "session stopped");
        }
        self.camera.release();

        self.ui.set_controls(false);
        self.ui.set_status(ui::STATUS_STOPPED);
        self.ui.set_progress(Progress::Idle);
        self.ui.set_mark_status(ui::STATUS_STOPPED);
    }

    /// Grab and encode the current frame. `None` when idle or when the
    /// frame could not be captured (the tick is skipped).
    pub fn capture_sample(&mut self) -> Option<Sample> {
        let session_id = self.session.as_ref()?.id();

        let frame = match self.camera.capture_frame() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "frame capture failed, skipping tick");
                return None;
            }
        };

        match encode_jpeg(frame.as_ref(), self.jpeg_quality) {
            Ok(jpeg) => Some(Sample { session_id, jpeg }),
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "frame encoding failed, skipping tick");
                None
            }
        }
    }

    /// Apply the service's verdict for a sample taken in `session_id`.
    pub fn apply_response(
        &mut self,
        session_id: Uuid,
        result: Result<RecognitionResponse, ServiceError>,
    ) -> TickOutcome {
        let Some(session) = self.session.as_mut() else {
            tracing::debug!(session_id = %session_id, "response arrived after stop, ignored");
            return TickOutcome::Stale;
        };
        if session.id() != session_id {
            tracing::debug!(
                session_id = %session_id,
                current = %session.id(),
                "response from an earlier session, ignored"
            );
            return TickOutcome::Stale;
        }

        let resp = match result {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "recognition request failed, skipping tick");
                return TickOutcome::Skipped;
            }
        };

        let evaluation = session.evaluate(&resp, Utc::now());
        let step = session.step();

        match evaluation {
            Evaluation::Blink { advanced } => {
                self.ui.set_status(ui::STATUS_BLINK);
                self.ui.set_progress(Progress::Blink);
                if advanced {
                    tracing::info!(session_id = %session_id, "blink detected");
                }
            }
            Evaluation::Turn { advanced } => {
                self.ui.set_status(ui::STATUS_TURN);
                self.ui.set_progress(Progress::Turn);
                if advanced {
                    tracing::info!(session_id = %session_id, yaw = resp.yaw, "head turn detected");
                }
            }
            Evaluation::AwaitingRecognition => {}
            Evaluation::Unidentified => {
                tracing::warn!(session_id = %session_id, "service reported a match without a subject id");
            }
            Evaluation::Recognized(rec) => {
                self.announce(&rec);
                self.finish(session_id);
                return TickOutcome::Completed(rec);
            }
        }

        TickOutcome::Progressed { step }
    }

    /// Capture, submit and apply in one blocking call.
    pub fn sample_and_evaluate<S>(&mut self, service: &S) -> TickOutcome
    where
        S: RecognitionService + ?Sized,
    {
        if !self.is_running() {
            return TickOutcome::Idle;
        }
        let Some(sample) = self.capture_sample() else {
            return TickOutcome::Skipped;
        };
        let result = service.recognize(&sample.jpeg);
        self.apply_response(sample.session_id, result)
    }

    fn announce(&mut self, rec: &Recognition) {
        self.ui.set_status(ui::STATUS_VERIFIED);
        self.ui.set_progress(Progress::Verified);
        self.ui
            .set_mark_status(&ui::recognized_line(&rec.display_name, rec.confidence));

        if let Some(event) = &rec.event {
            tracing::info!(
                subject_id = %event.subject_id,
                name = %event.display_name,
                confidence = event.confidence,
                "subject recognized"
            );
            self.ui.prepend_recognition(event);
            self.log.insert(0, event.clone());
        }
    }

    /// Completion path: sampling ends and the camera is released, but the
    /// verified indicators stay up.
    fn finish(&mut self, session_id: Uuid) {
        self.session = None;
        self.camera.release();
        self.ui.set_controls(false);
        tracing::info!(session_id = %session_id, "session complete");
    }
}
