//! Transport abstraction layer for MuseDAC+ LED strip communication
//!
//! This crate provides a unified interface for pushing wire frames to the
//! LED strip across different backends:
//!
//! - SPI character device (`/dev/spidevB.D`, the real hardware path)
//! - In-memory capture (tests, dry runs)

pub mod error;

mod memory;
mod spidev;

pub use error::TransportError;
pub use memory::MemoryTransport;
pub use spidev::SpiDevTransport;

use async_trait::async_trait;
use std::sync::Arc;

/// Transport type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportType {
    /// Linux spidev character device
    SpiDev,
    /// In-memory frame capture
    Memory,
}

impl TransportType {
    /// Check if this transport talks to real hardware
    pub fn is_hardware(&self) -> bool {
        matches!(self, Self::SpiDev)
    }
}

/// Device identification information
#[derive(Debug, Clone)]
pub struct TransportDeviceInfo {
    /// Device path or identifier (transport-specific)
    pub device_path: String,
    /// Transport type
    pub transport_type: TransportType,
}

/// The core transport trait - all backends implement this
///
/// A transport is a byte sink: it takes one fully encoded wire frame at a
/// time and pushes it over the bus. Framing, timing and per-LED encoding are
/// the caller's problem; bus clocking is the kernel driver's.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one encoded frame over the wire
    ///
    /// The call may block while the bus drains. Errors indicate the frame
    /// was not (fully) written; the transport stays usable unless it reports
    /// [`TransportError::Disconnected`].
    async fn send(&self, frame: &[u8]) -> Result<(), TransportError>;

    /// Get device information
    fn device_info(&self) -> &TransportDeviceInfo;

    /// Close the transport gracefully
    ///
    /// Sends after close fail with [`TransportError::Disconnected`].
    async fn close(&self) -> Result<(), TransportError>;
}

/// Type alias for a boxed transport
pub type BoxedTransport = Arc<dyn Transport>;
