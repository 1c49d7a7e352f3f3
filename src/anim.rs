//! Brightness animation engine.
//!
//! One tokio task per active animation drives a repeating tick: derive a
//! frame from the base frame, send it, wait out the step delay. Because a
//! single task computes-sends-reschedules, at most one tick is ever pending,
//! and a slow bus delays the next tick instead of overlapping it.
//!
//! `stop()` signals the task through a watch channel and awaits its join
//! handle, so when it returns no tick is in flight and none will fire again.
//! The base frame sits in a reference-counted slot: a tick clones the `Arc`
//! under a short lock and renders from that snapshot, so `update_frame()`
//! can swap in a new frame mid-animation without a tick ever seeing a
//! half-written buffer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, warn};

use musedacled_transport::BoxedTransport;

use crate::frame::Frame;

/// Ticks in one full fade/pulse cycle (brightness up, then back down)
pub const WAVE_STEPS: u32 = 62;

/// Peak of the triangle wave, also the 5-bit brightness ceiling
const WAVE_PEAK: u32 = 31;

/// Animation mode selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationMode {
    #[default]
    None,
    Blink,
    Fade,
    Pulse,
}

impl AnimationMode {
    /// Lowercase mode name for status output
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Blink => "blink",
            Self::Fade => "fade",
            Self::Pulse => "pulse",
        }
    }

    /// Parse a user-supplied mode name (case-insensitive)
    ///
    /// `none` is not a startable mode and is rejected here.
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("blink") {
            Some(Self::Blink)
        } else if s.eq_ignore_ascii_case("fade") {
            Some(Self::Fade)
        } else if s.eq_ignore_ascii_case("pulse") {
            Some(Self::Pulse)
        } else {
            None
        }
    }
}

/// Shared between the engine handle and the running tick task
struct Shared {
    /// Reference-counted base frame slot; `None` only while stopped
    base_frame: Mutex<Option<Arc<Frame>>>,
    /// Ticks whose transport send failed
    send_failures: AtomicU64,
}

/// Handle to the currently running tick task
struct Runner {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Externally visible animation state
struct Control {
    mode: AnimationMode,
    period_ms: u64,
    runner: Option<Runner>,
}

/// Drives periodic brightness animations over a transport
///
/// One instance owns the base frame and the tick schedule; command handlers
/// share it behind the driver. `start`/`stop` are serialized internally, so
/// racing commands resolve to last-writer-wins with no leaked schedules.
pub struct AnimationEngine {
    transport: BoxedTransport,
    shared: Arc<Shared>,
    control: Mutex<Control>,
    /// Serializes start/stop transitions (cancel-and-join is multi-step)
    ops: tokio::sync::Mutex<()>,
}

impl AnimationEngine {
    /// Create an idle engine on top of a transport
    pub fn new(transport: BoxedTransport) -> Self {
        Self {
            transport,
            shared: Arc::new(Shared {
                base_frame: Mutex::new(None),
                send_failures: AtomicU64::new(0),
            }),
            control: Mutex::new(Control {
                mode: AnimationMode::None,
                period_ms: 0,
                runner: None,
            }),
            ops: tokio::sync::Mutex::new(()),
        }
    }

    /// Start an animation, replacing any running one
    ///
    /// Stops the previous animation first (cancel and join), adopts `frame`
    /// as the new base, and schedules the first tick immediately. Starting
    /// with [`AnimationMode::None`] is equivalent to [`stop`](Self::stop).
    pub async fn start(&self, mode: AnimationMode, period_ms: u64, frame: Frame) {
        let _guard = self.ops.lock().await;
        self.stop_locked().await;

        if mode == AnimationMode::None {
            return;
        }

        let step_delay_ms = step_delay_ms(mode, period_ms);
        *self.shared.base_frame.lock() = Some(Arc::new(frame));

        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(run_animation(
            Arc::clone(&self.shared),
            Arc::clone(&self.transport),
            mode,
            step_delay_ms,
            stop_rx,
        ));

        let mut ctl = self.control.lock();
        ctl.mode = mode;
        ctl.period_ms = period_ms;
        ctl.runner = Some(Runner { stop_tx, handle });
        debug!(
            mode = mode.name(),
            period_ms, step_delay_ms, "animation started"
        );
    }

    /// Stop the running animation, if any
    ///
    /// Blocks until the tick task has fully exited, then releases the base
    /// frame. Idempotent when already stopped.
    pub async fn stop(&self) {
        let _guard = self.ops.lock().await;
        self.stop_locked().await;
    }

    async fn stop_locked(&self) {
        let runner = {
            let mut ctl = self.control.lock();
            ctl.mode = AnimationMode::None;
            ctl.period_ms = 0;
            ctl.runner.take()
        };
        let Some(runner) = runner else {
            return;
        };

        let _ = runner.stop_tx.send(true);
        if let Err(e) = runner.handle.await {
            warn!("animation task ended abnormally: {e}");
        }
        *self.shared.base_frame.lock() = None;
        debug!("animation stopped");
    }

    /// Replace the base frame without touching mode or schedule
    ///
    /// Safe to call whether or not an animation is running; a tick executing
    /// concurrently renders either the old frame or the new one in full.
    pub fn update_frame(&self, frame: Frame) {
        *self.shared.base_frame.lock() = Some(Arc::new(frame));
    }

    /// Whether an animation is currently scheduled
    pub fn is_active(&self) -> bool {
        self.control.lock().mode != AnimationMode::None
    }

    /// Current mode (`None` when idle)
    pub fn mode(&self) -> AnimationMode {
        self.control.lock().mode
    }

    /// Period of the running animation in ms (0 when idle)
    pub fn period_ms(&self) -> u64 {
        self.control.lock().period_ms
    }

    /// Ticks whose frame could not be sent
    pub fn send_failures(&self) -> u64 {
        self.shared.send_failures.load(Ordering::Relaxed)
    }
}

/// Tick interval for a mode
///
/// Blink toggles once per period; fade/pulse sweep the 62-step triangle over
/// one period, so each step gets period/62 (at least 1ms).
fn step_delay_ms(mode: AnimationMode, period_ms: u64) -> u64 {
    match mode {
        AnimationMode::Fade | AnimationMode::Pulse => (period_ms / WAVE_STEPS as u64).max(1),
        _ => period_ms.max(1),
    }
}

/// Render the frame for one tick
///
/// Only brightness is modulated; RGB bytes pass through from the base frame.
fn render_tick(base: &Frame, mode: AnimationMode, t: u32, toggle: bool) -> Vec<u8> {
    base.encode_with_brightness(|brightness| match mode {
        AnimationMode::Blink => {
            if toggle {
                0
            } else {
                brightness
            }
        }
        AnimationMode::Fade | AnimationMode::Pulse => {
            let step = t % WAVE_STEPS;
            let triangle = if step < WAVE_PEAK { step } else { WAVE_STEPS - step };
            (u32::from(brightness) * triangle / WAVE_PEAK) as u8
        }
        // never scheduled; see start()
        AnimationMode::None => brightness,
    })
}

/// The repeating tick task
///
/// A send failure is counted and logged, never fatal: the strip may be
/// rebooting or the bus busy, and the next tick retries naturally.
async fn run_animation(
    shared: Arc<Shared>,
    transport: BoxedTransport,
    mode: AnimationMode,
    step_delay_ms: u64,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(Duration::from_millis(step_delay_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut t: u32 = 0;
    let mut toggle = false;

    loop {
        tokio::select! {
            _ = stop_rx.changed() => break,
            _ = ticker.tick() => {}
        }

        let base = shared.base_frame.lock().clone();
        let Some(base) = base else {
            error!("animation tick with no base frame, aborting");
            break;
        };

        let bytes = render_tick(&base, mode, t, toggle);
        if let Err(e) = transport.send(&bytes).await {
            shared.send_failures.fetch_add(1, Ordering::Relaxed);
            warn!("animation frame send failed: {e}");
        }

        toggle = !toggle;
        t = t.wrapping_add(1);
    }
}
