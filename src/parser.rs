//! Color spec parsing: text tokens to LED frames.
//!
//! A spec is whitespace-separated tokens, each naming one LED's color:
//! `red green:10 #00ff00:5 0xFF00FF`. The optional `:n` suffix is a decimal
//! brightness 0-31; anything unparsable or out of range clamps to 31.
//! Unrecognized color tokens are skipped rather than failing the spec, so a
//! typo costs one LED, not the whole command.

use thiserror::Error;

use crate::frame::{Frame, LedColor, BRIGHTNESS_MAX, MAX_LEDS};

/// Errors from color spec parsing
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty color specification")]
    EmptyInput,

    #[error("no recognizable color tokens")]
    AllTokensInvalid,
}

/// Fixed palette of named colors
const NAMED_COLORS: &[(&str, (u8, u8, u8))] = &[
    ("red", (255, 0, 0)),
    ("green", (0, 255, 0)),
    ("blue", (0, 0, 255)),
    ("yellow", (255, 255, 0)),
    ("cyan", (0, 255, 255)),
    ("magenta", (255, 0, 255)),
    ("white", (255, 255, 255)),
    ("black", (0, 0, 0)),
    ("orange", (255, 165, 0)),
    ("purple", (128, 0, 255)),
    ("pink", (255, 192, 203)),
];

/// Parse a color spec into a frame
///
/// Fails only when the spec is empty/whitespace or when no token at all
/// yields an LED; a partial frame is never produced on error. Token
/// consumption stops once [`MAX_LEDS`] LEDs have been collected.
pub fn parse_colors(spec: &str) -> Result<Frame, ParseError> {
    if spec.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let mut leds = Vec::new();
    for token in spec.split_whitespace() {
        if leds.len() >= MAX_LEDS {
            break;
        }

        let (color, brightness) = split_brightness(token);
        if let Some((r, g, b)) = parse_rgb(color) {
            leds.push(LedColor::new(r, g, b, brightness));
        }
    }

    if leds.is_empty() {
        return Err(ParseError::AllTokensInvalid);
    }
    Ok(Frame::new(leds))
}

/// Split an optional `:brightness` suffix off a token
///
/// Unparsable or out-of-range suffixes clamp to [`BRIGHTNESS_MAX`].
fn split_brightness(token: &str) -> (&str, u8) {
    match token.split_once(':') {
        Some((color, suffix)) => {
            let brightness = suffix
                .parse::<u8>()
                .ok()
                .filter(|b| *b <= BRIGHTNESS_MAX)
                .unwrap_or(BRIGHTNESS_MAX);
            (color, brightness)
        }
        None => (token, BRIGHTNESS_MAX),
    }
}

/// Resolve a single color token: `#RRGGBB`, `0xRRGGBB`, or a palette name
fn parse_rgb(token: &str) -> Option<(u8, u8, u8)> {
    if let Some(hex) = token
        .strip_prefix('#')
        .or_else(|| token.strip_prefix("0x"))
    {
        if hex.len() != 6 {
            return None;
        }
        let value = u32::from_str_radix(hex, 16).ok()?;
        return Some((
            ((value >> 16) & 0xFF) as u8,
            ((value >> 8) & 0xFF) as u8,
            (value & 0xFF) as u8,
        ));
    }

    NAMED_COLORS
        .iter()
        .find(|(name, _)| token.eq_ignore_ascii_case(name))
        .map(|&(_, rgb)| rgb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_colors_with_brightness_suffix() {
        let frame = parse_colors("red green:10").unwrap();
        assert_eq!(frame.led_count(), 2);
        assert_eq!(
            frame.encode(),
            vec![
                0x00, 0x00, 0x00, 0x00, //
                0xFF, 0x00, 0x00, 0xFF, // red at full brightness
                0xEA, 0x00, 0xFF, 0x00, // green at brightness 10
                0xFF, 0xFF, 0xFF, 0xFF,
            ]
        );
    }

    #[test]
    fn hex_color_with_brightness() {
        let frame = parse_colors("#00ff00:5").unwrap();
        let bytes = frame.encode();
        assert_eq!(frame.led_count(), 1);
        assert_eq!(&bytes[4..8], &[0xE5, 0x00, 0xFF, 0x00]);
    }

    #[test]
    fn zero_x_prefix_hex() {
        let frame = parse_colors("0xFF00FF").unwrap();
        assert_eq!(&frame.encode()[4..8], &[0xFF, 0xFF, 0x00, 0xFF]);
    }

    #[test]
    fn all_tokens_invalid() {
        assert_eq!(parse_colors("bogus"), Err(ParseError::AllTokensInvalid));
        assert_eq!(
            parse_colors("nope #12345 0xZZZZZZ"),
            Err(ParseError::AllTokensInvalid)
        );
    }

    #[test]
    fn empty_input() {
        assert_eq!(parse_colors(""), Err(ParseError::EmptyInput));
        assert_eq!(parse_colors("   \t "), Err(ParseError::EmptyInput));
    }

    #[test]
    fn unknown_tokens_are_skipped() {
        let frame = parse_colors("bogus red nonsense blue").unwrap();
        assert_eq!(frame.led_count(), 2);
        assert_eq!(frame.leds()[0], LedColor::new(255, 0, 0, 31));
        assert_eq!(frame.leds()[1], LedColor::new(0, 0, 255, 31));
    }

    #[test]
    fn brightness_clamps_never_errors() {
        for suffix in ["32", "100", "255", "300", "-4", "abc", ""] {
            let spec = format!("red:{suffix}");
            let frame = parse_colors(&spec).unwrap();
            assert_eq!(frame.encode()[4], 0xE0 | 0x1F, "suffix {suffix:?}");
        }
        for valid in 0u8..=31 {
            let frame = parse_colors(&format!("red:{valid}")).unwrap();
            assert_eq!(frame.encode()[4], 0xE0 | (valid & 0x1F));
        }
    }

    #[test]
    fn stops_at_max_leds() {
        let spec = vec!["white"; MAX_LEDS + 8].join(" ");
        let frame = parse_colors(&spec).unwrap();
        assert_eq!(frame.led_count(), MAX_LEDS);
    }

    #[test]
    fn palette_is_case_insensitive() {
        let frame = parse_colors("RED Cyan mAgEnTa").unwrap();
        assert_eq!(frame.led_count(), 3);
        assert_eq!(frame.leds()[1], LedColor::new(0, 255, 255, 31));
    }

    #[test]
    fn extended_palette_names_resolve() {
        let frame = parse_colors("orange purple pink").unwrap();
        assert_eq!(frame.leds()[0], LedColor::new(255, 165, 0, 31));
        assert_eq!(frame.leds()[1], LedColor::new(128, 0, 255, 31));
        assert_eq!(frame.leds()[2], LedColor::new(255, 192, 203, 31));
    }

    #[test]
    fn short_hex_is_skipped_not_misread() {
        // "#fff red" -> only red survives
        let frame = parse_colors("#fff red").unwrap();
        assert_eq!(frame.led_count(), 1);
        assert_eq!(frame.leds()[0], LedColor::new(255, 0, 0, 31));
    }

    #[test]
    fn double_colon_suffix_clamps() {
        let frame = parse_colors("red:5:6").unwrap();
        assert_eq!(frame.encode()[4], 0xE0 | 0x1F);
    }
}
