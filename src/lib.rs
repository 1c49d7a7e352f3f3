//! MuseDAC+ LED Strip Driver - Shared Library
//!
//! Frame encoding, color spec parsing, the animation engine, and the
//! command dispatcher. The binary in `main.rs` is a thin CLI shell over
//! these modules; the wire side lives in the `musedacled-transport` crate.

pub mod anim;
pub mod command;
pub mod frame;
pub mod parser;

pub use anim::{AnimationEngine, AnimationMode};
pub use command::{CommandError, LedDriver, DRIVER_NAME};
pub use frame::{Frame, LedColor, BRIGHTNESS_MAX, MAX_LEDS};
pub use parser::{parse_colors, ParseError};
