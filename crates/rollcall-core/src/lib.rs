//! rollcall-core: liveness sequencing and recognition bookkeeping.
//!
//! Nothing here touches a camera or the network. The session crate feeds
//! recognition-service responses in and pushes the results to a UI surface.

pub mod frame;
pub mod liveness;
pub mod session;
pub mod types;
pub mod ui;

pub use liveness::{LivenessCheck, LivenessStep, DEFAULT_YAW_THRESHOLD_DEG};
pub use session::{Evaluation, Recognition, SessionState};
pub use types::{RecognitionEvent, RecognitionResponse};
pub use ui::{Progress, UiElement, UiSurface};
