use std::sync::Arc;
use std::time::Duration;

use rollcall_client::RecognitionService;
use rollcall_core::UiSurface;
use rollcall_hw::Camera;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use uuid::Uuid;

use crate::controller::{ControllerError, Sample, SessionController, TickOutcome};

/// Timer-driven sampler around a [`SessionController`].
///
/// One capture/evaluate cycle is in flight at a time: the ticker awaits each
/// recognition call before taking the next tick. The controller lock is
/// released while the blocking service call runs.
pub struct SessionRunner<C, U, S> {
    controller: Arc<Mutex<SessionController<C, U>>>,
    service: Arc<S>,
    interval: Duration,
    ticker: Mutex<Option<JoinHandle<()>>>,
    /// True while a ticker task is sampling.
    active: Arc<watch::Sender<bool>>,
}

impl<C, U, S> SessionRunner<C, U, S>
where
    C: Camera + 'static,
    U: UiSurface + 'static,
    S: RecognitionService + 'static,
{
    pub fn new(controller: SessionController<C, U>, service: Arc<S>, interval: Duration) -> Self {
        let (active, _) = watch::channel(false);
        Self {
            controller: Arc::new(Mutex::new(controller)),
            service,
            interval,
            ticker: Mutex::new(None),
            active: Arc::new(active),
        }
    }

    /// Shared handle to the controller, for reading state between ticks.
    pub fn controller(&self) -> Arc<Mutex<SessionController<C, U>>> {
        self.controller.clone()
    }

    /// Start a session and begin sampling.
    pub async fn start(&self) -> Result<Uuid, ControllerError> {
        let session_id = self.controller.lock().await.start()?;
        self.spawn_ticker().await;
        Ok(session_id)
    }

    /// Stop sampling and end the session. Idempotent.
    pub async fn stop(&self) {
        self.cancel_ticker().await;
        self.controller.lock().await.stop();
    }

    /// Resolve once sampling has ended, by completion or by [`stop`](Self::stop).
    pub async fn wait(&self) {
        let mut rx = self.active.subscribe();
        let _ = rx.wait_for(|active| !*active).await;
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let controller = self.controller.clone();
        let service = self.service.clone();
        let active = self.active.clone();
        let period = self.interval;

        active.send_replace(true);
        let handle = tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately; sampling starts one period in
            interval.tick().await;

            loop {
                interval.tick().await;

                let sample = {
                    let mut guard = controller.lock().await;
                    if !guard.is_running() {
                        break;
                    }
                    guard.capture_sample()
                };
                let Some(Sample { session_id, jpeg }) = sample else {
                    continue;
                };

                let svc = service.clone();
                let result = match tokio::task::spawn_blocking(move || svc.recognize(&jpeg)).await
                {
                    Ok(result) => result,
                    Err(e) => {
                        tracing::error!(session_id = %session_id, error = %e, "recognition task failed");
                        continue;
                    }
                };

                let outcome = controller.lock().await.apply_response(session_id, result);
                match outcome {
                    TickOutcome::Completed(_) | TickOutcome::Idle | TickOutcome::Stale => break,
                    TickOutcome::Skipped | TickOutcome::Progressed { .. } => {}
                }
            }

            active.send_replace(false);
            tracing::debug!("sampler exited");
        });

        *ticker_guard = Some(handle);
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
        self.active.send_replace(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::testing::{blink, recognized, yaw, FakeCamera, RecordingUi, ScriptedService};
    use rollcall_client::ServiceError;
    use rollcall_core::LivenessStep;

    const TICK: Duration = Duration::from_millis(5);
    const DEADLINE: Duration = Duration::from_secs(5);

    fn runner(
        script: Vec<Result<rollcall_core::RecognitionResponse, ServiceError>>,
    ) -> (
        SessionRunner<FakeCamera, RecordingUi, ScriptedService>,
        Arc<ScriptedService>,
    ) {
        let controller =
            SessionController::new(FakeCamera::default(), RecordingUi::default(), &Config::default())
                .unwrap();
        let service = Arc::new(ScriptedService::new(script));
        (SessionRunner::new(controller, service.clone(), TICK), service)
    }

    #[tokio::test]
    async fn test_runs_to_completion() {
        let (runner, service) = runner(vec![
            Ok(blink()),
            Ok(yaw(20.0)),
            Ok(recognized("42", "Ada", 0.9)),
        ]);
        runner.start().await.unwrap();
        time::timeout(DEADLINE, runner.wait()).await.unwrap();

        let controller = runner.controller();
        let c = controller.lock().await;
        assert!(!c.is_running());
        assert!(!c.camera().acquired);
        assert_eq!(c.recognition_log().len(), 1);
        assert_eq!(c.recognition_log()[0].subject_id, "42");
        assert_eq!(service.calls(), 3);
    }

    #[tokio::test]
    async fn test_transport_errors_do_not_stop_sampling() {
        let (runner, service) = runner(vec![
            Err(ServiceError::Status(502)),
            Ok(blink()),
            Err(ServiceError::Status(504)),
            Ok(yaw(-30.0)),
            Ok(recognized("7", "Grace", 0.7)),
        ]);
        runner.start().await.unwrap();
        time::timeout(DEADLINE, runner.wait()).await.unwrap();

        let controller = runner.controller();
        let c = controller.lock().await;
        assert_eq!(c.recognition_log().len(), 1);
        assert_eq!(service.calls(), 5);
    }

    #[tokio::test]
    async fn test_stop_halts_sampling() {
        // Nobody ever blinks, so the session would run forever
        let (runner, service) = runner(Vec::new());
        runner.start().await.unwrap();
        time::sleep(TICK * 4).await;

        runner.stop().await;
        time::timeout(DEADLINE, runner.wait()).await.unwrap();

        let calls = service.calls();
        time::sleep(TICK * 6).await;
        assert!(service.calls() <= calls + 1);

        let controller = runner.controller();
        let c = controller.lock().await;
        assert!(!c.is_running());
        assert!(!c.camera().acquired);
        assert_eq!(c.step(), None);
    }

    #[tokio::test]
    async fn test_start_twice_is_rejected() {
        let (runner, _service) = runner(Vec::new());
        runner.start().await.unwrap();
        assert!(matches!(
            runner.start().await,
            Err(ControllerError::AlreadyRunning)
        ));
        {
            let controller = runner.controller();
            let c = controller.lock().await;
            assert_eq!(c.camera().acquire_calls, 1);
            assert_eq!(c.step(), Some(LivenessStep::Blink));
        }
        runner.stop().await;
    }

    #[tokio::test]
    async fn test_stop_before_start_is_noop() {
        let (runner, _service) = runner(Vec::new());
        runner.stop().await;
        runner.stop().await;
        time::timeout(DEADLINE, runner.wait()).await.unwrap();
    }
}
