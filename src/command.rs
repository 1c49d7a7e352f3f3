//! Command dispatch: the userspace analog of the chardev write/read paths.
//!
//! Printable input is a line-oriented command (`color`, `anim`, `stop`,
//! `status`); anything non-printable is assumed to be a pre-encoded frame
//! and forwarded to the bus untouched. All validation happens before any
//! state changes, so a rejected command leaves the driver as it was.

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

use musedacled_transport::{BoxedTransport, TransportError};

use crate::anim::{AnimationEngine, AnimationMode};
use crate::frame::Frame;
use crate::parser::{parse_colors, ParseError};

/// Driver label used in the status report
pub const DRIVER_NAME: &str = "MuseDAC+ LED Driver";

const DRIVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Errors from command handling
#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("set a color before starting an animation")]
    StartWithoutColor,

    #[error("unknown animation mode '{0}'")]
    UnknownAnimMode(String),

    #[error("invalid animation period '{0}'")]
    InvalidDelay(String),

    #[error("unrecognized command '{0}'")]
    UnknownCommand(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// The driver front end: owns the engine and the last static color frame
///
/// Commands are serialized through an internal lock, so concurrent callers
/// resolve to last-writer-wins without interleaving.
pub struct LedDriver {
    transport: BoxedTransport,
    engine: AnimationEngine,
    last_frame: Mutex<Option<Arc<Frame>>>,
    cmd_lock: tokio::sync::Mutex<()>,
}

impl LedDriver {
    /// Create a driver on top of a transport
    pub fn new(transport: BoxedTransport) -> Self {
        Self {
            engine: AnimationEngine::new(Arc::clone(&transport)),
            transport,
            last_frame: Mutex::new(None),
            cmd_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// The animation engine behind this driver
    pub fn engine(&self) -> &AnimationEngine {
        &self.engine
    }

    /// Raw device input entry point
    ///
    /// Printable text dispatches as a command line; anything else goes to
    /// the bus unmodified.
    pub async fn handle_input(&self, input: &[u8]) -> Result<Option<String>, CommandError> {
        match input.first() {
            None => Ok(None),
            Some(b) if is_printable(*b) => {
                let line = String::from_utf8_lossy(input);
                self.handle_line(&line).await
            }
            Some(_) => {
                debug!("forwarding {} raw bytes to the bus", input.len());
                self.transport.send(input).await?;
                Ok(None)
            }
        }
    }

    /// Dispatch one command line
    ///
    /// Returns `Ok(Some(text))` only for `status`; other commands produce no
    /// output on success.
    pub async fn handle_line(&self, line: &str) -> Result<Option<String>, CommandError> {
        let _guard = self.cmd_lock.lock().await;
        let arg = line.trim();

        if arg.eq_ignore_ascii_case("stop") {
            info!("stopping animation");
            self.engine.stop().await;
            return Ok(None);
        }

        if arg.eq_ignore_ascii_case("status") {
            return Ok(Some(self.status_report()));
        }

        if let Some(rest) = strip_keyword(arg, "color") {
            self.cmd_color(rest.trim()).await?;
            return Ok(None);
        }

        if let Some(rest) = strip_keyword(arg, "anim") {
            self.cmd_anim(rest.trim()).await?;
            return Ok(None);
        }

        warn!("unrecognized command '{arg}'");
        Err(CommandError::UnknownCommand(arg.to_string()))
    }

    /// `color <spec>`: store the frame; update a running animation's base,
    /// or send statically when idle
    async fn cmd_color(&self, spec: &str) -> Result<(), CommandError> {
        let frame = Arc::new(parse_colors(spec)?);
        *self.last_frame.lock() = Some(Arc::clone(&frame));

        if self.engine.is_active() {
            debug!(leds = frame.led_count(), "updating animation base frame");
            self.engine.update_frame((*frame).clone());
        } else {
            info!(leds = frame.led_count(), "sending static frame");
            self.transport.send(&frame.encode()).await?;
        }
        Ok(())
    }

    /// `anim <mode>:<period_ms>`: start an animation over the last color frame
    async fn cmd_anim(&self, spec: &str) -> Result<(), CommandError> {
        let (mode_str, delay_str) = spec
            .split_once(':')
            .ok_or_else(|| CommandError::InvalidDelay(spec.to_string()))?;

        let mode_str = mode_str.trim();
        let mode = AnimationMode::parse(mode_str)
            .ok_or_else(|| CommandError::UnknownAnimMode(mode_str.to_string()))?;

        let delay_str = delay_str.trim();
        let period_ms = delay_str
            .parse::<i64>()
            .ok()
            .filter(|p| *p > 0)
            .ok_or_else(|| CommandError::InvalidDelay(delay_str.to_string()))?
            as u64;

        let frame = self
            .last_frame
            .lock()
            .clone()
            .ok_or(CommandError::StartWithoutColor)?;

        info!(mode = mode.name(), period_ms, "starting animation");
        self.engine.start(mode, period_ms, (*frame).clone()).await;
        Ok(())
    }

    /// Human-readable driver status, mirroring the old chardev read output
    pub fn status_report(&self) -> String {
        let leds = self
            .last_frame
            .lock()
            .as_ref()
            .map_or(0, |frame| frame.led_count());

        format!(
            r"{DRIVER_NAME} v{DRIVER_VERSION}

Current Status:
  Animation: {mode}
  Period:    {period} ms
  LEDs:      {leds}

Available Commands:
  color <spec>           - Set LED colors
    Named colors:        red, green, blue, yellow, cyan, magenta,
                         white, black, orange, purple, pink
    Hex colors:          #RRGGBB or 0xRRGGBB
    With brightness:     <color>:0-31 (e.g., red:20)
    Multiple LEDs:       color red green blue
  anim blink:<ms>        - Blink animation
  anim fade:<ms>         - Smooth fade animation
  anim pulse:<ms>        - Linear pulse animation
  stop                   - Stop current animation
  status                 - Show this report
",
            mode = self.engine.mode().name(),
            period = self.engine.period_ms(),
        )
    }
}

/// ASCII printable check, same range as `isprint(3)` in the C locale
fn is_printable(b: u8) -> bool {
    (0x20..=0x7E).contains(&b)
}

/// Strip a case-insensitive command keyword, requiring a word boundary
fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let head = line.get(..keyword.len())?;
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let rest = &line[keyword.len()..];
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest)
    } else {
        None
    }
}
