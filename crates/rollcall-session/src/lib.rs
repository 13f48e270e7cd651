//! rollcall-session: the liveness/recognition session controller.
//!
//! [`SessionController`] owns the camera and the UI surface and applies
//! recognition verdicts. [`SessionRunner`] drives it from a tokio interval.

pub mod config;
pub mod controller;
pub mod runner;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use controller::{ControllerError, Sample, SessionController, TickOutcome};
pub use runner::SessionRunner;
