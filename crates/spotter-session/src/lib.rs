//! Spotter Session crate - recording lifecycle and session ownership.
//!
//! The `SessionController` owns every piece of per-session state: the keyword
//! set, the annotated transcript and its counters, the definition cache, the
//! tooltip, and the `RecordingStateMachine` that in turn owns the capture
//! engine. All mutation goes through `&mut self`, one event at a time:
//! Ready -> Recording -> (Stopped | Error), with Stopped and Error able to
//! start again.

pub mod controller;
pub mod engine;
pub mod error;
pub mod events;
pub mod state;
pub mod tooltip;

pub use controller::{SessionController, SessionSnapshot};
pub use engine::{CaptureEngine, CaptureEvent, RemoteCaptureEngine};
pub use error::SessionError;
pub use events::SessionEvent;
pub use state::{CaptureOutcome, RecordingStateMachine, RestartPolicy, SessionState};
pub use tooltip::{BoundingBox, TooltipController, TooltipState};
