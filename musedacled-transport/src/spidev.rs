//! SPI character-device transport for the real LED strip

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::error::TransportError;
use crate::{Transport, TransportDeviceInfo, TransportType};

/// Transport writing frames to a Linux spidev node
///
/// Plain `write(2)` on a spidev node clocks the buffer out as a single
/// half-duplex transfer, which is all the strip protocol needs. Bus mode and
/// speed are whatever the kernel/device-tree configured for the node.
pub struct SpiDevTransport {
    /// Device node; writes are serialized through the mutex
    device: Mutex<File>,
    /// Device information
    info: TransportDeviceInfo,
    /// Set by `close()`; sends fail afterwards
    closed: AtomicBool,
}

impl SpiDevTransport {
    /// Open a spidev node for writing
    pub fn open(path: &str) -> Result<Self, TransportError> {
        let device = OpenOptions::new().write(true).open(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                TransportError::DeviceNotFound(path.to_string())
            } else {
                TransportError::Io(e)
            }
        })?;

        debug!("Opened SPI device {path}");

        Ok(Self {
            device: Mutex::new(device),
            info: TransportDeviceInfo {
                device_path: path.to_string(),
                transport_type: TransportType::SpiDev,
            },
            closed: AtomicBool::new(false),
        })
    }

    fn write_all(&self, frame: &[u8]) -> Result<(), TransportError> {
        let mut device = self
            .device
            .lock()
            .map_err(|_| TransportError::Internal("SPI device lock poisoned".into()))?;
        device.write_all(frame)?;
        device.flush()?;
        Ok(())
    }
}

#[async_trait]
impl Transport for SpiDevTransport {
    async fn send(&self, frame: &[u8]) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Disconnected);
        }

        debug!(
            "Writing {} byte frame to {}",
            frame.len(),
            self.info.device_path
        );
        self.write_all(frame)
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
