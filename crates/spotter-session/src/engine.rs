//! Capture engine seam.
//!
//! The speech capture engine is provided by the host. The session only needs
//! to acquire and release it, and to receive its events: fragments tagged
//! interim or final, an explicit error with a message, and an end-of-stream
//! signal distinct from an error.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use spotter_core::types::TranscriptFragment;

use crate::error::SessionError;

/// Handle on a host-provided speech capture engine.
pub trait CaptureEngine: Send {
    /// Acquire the engine and begin delivering events.
    ///
    /// Fails with `CaptureUnsupported` when no engine exists in this
    /// environment, or `CaptureEngine` when it refuses to start.
    fn start(&mut self) -> Result<(), SessionError>;

    /// Release the engine. Idempotent.
    fn stop(&mut self);

    fn is_active(&self) -> bool;
}

/// An event reported by the capture engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CaptureEvent {
    Fragment(TranscriptFragment),
    Error { message: String },
    End,
}

/// A capture engine that runs in a remote client, such as a browser page.
///
/// The client reports whether it has a usable engine; this handle tracks
/// whether the session currently wants it running and how many times it
/// has been (re)acquired, which the client uses to follow restarts.
#[derive(Debug, Clone)]
pub struct RemoteCaptureEngine {
    supported: Arc<AtomicBool>,
    active: Arc<AtomicBool>,
    acquisitions: Arc<AtomicU64>,
}

impl Default for RemoteCaptureEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteCaptureEngine {
    pub fn new() -> Self {
        Self {
            supported: Arc::new(AtomicBool::new(true)),
            active: Arc::new(AtomicBool::new(false)),
            acquisitions: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Record whether the client has a usable capture engine.
    pub fn set_supported(&self, supported: bool) {
        self.supported.store(supported, Ordering::Relaxed);
    }

    pub fn is_supported(&self) -> bool {
        self.supported.load(Ordering::Relaxed)
    }

    /// Number of successful starts, restarts included.
    pub fn acquisitions(&self) -> u64 {
        self.acquisitions.load(Ordering::Relaxed)
    }
}

impl CaptureEngine for RemoteCaptureEngine {
    fn start(&mut self) -> Result<(), SessionError> {
        if !self.is_supported() {
            return Err(SessionError::CaptureUnsupported);
        }
        self.active.store(true, Ordering::Relaxed);
        let count = self.acquisitions.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(acquisitions = count, "Remote capture engine acquired");
        Ok(())
    }

    fn stop(&mut self) {
        if self.active.swap(false, Ordering::Relaxed) {
            tracing::debug!("Remote capture engine released");
        }
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }
}
