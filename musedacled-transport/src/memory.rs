//! In-memory capture transport for tests and dry runs

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::TransportError;
use crate::{Transport, TransportDeviceInfo, TransportType};

/// Transport that records every frame instead of touching hardware
///
/// Frames are appended in send order and can be inspected with
/// [`sent_frames`](Self::sent_frames). `set_failing(true)` makes subsequent
/// sends fail, for exercising error paths.
pub struct MemoryTransport {
    frames: Mutex<Vec<Vec<u8>>>,
    failing: AtomicBool,
    closed: AtomicBool,
    info: TransportDeviceInfo,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransport {
    /// Create an empty capture transport
    pub fn new() -> Self {
        Self {
            frames: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            info: TransportDeviceInfo {
                device_path: "memory".to_string(),
                transport_type: TransportType::Memory,
            },
        }
    }

    /// Snapshot of all frames sent so far, in order
    pub fn sent_frames(&self) -> Vec<Vec<u8>> {
        self.frames.lock().clone()
    }

    /// Number of frames sent so far
    pub fn frame_count(&self) -> usize {
        self.frames.lock().len()
    }

    /// Drop all captured frames
    pub fn clear(&self) {
        self.frames.lock().clear();
    }

    /// Make subsequent sends fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, frame: &[u8]) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Disconnected);
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(TransportError::Internal("injected send failure".into()));
        }

        debug!("Captured {} byte frame", frame.len());
        self.frames.lock().push(frame.to_vec());
        Ok(())
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
