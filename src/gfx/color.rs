//! `#rrggbb` colour strings to and from normalized RGBA

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("colour '{0}' does not start with '#'")]
    MissingHash(String),

    #[error("colour '{0}' must have exactly six hex digits")]
    BadLength(String),

    #[error("colour '{0}' contains a non-hex digit")]
    BadDigit(String),
}

/// Parses `#rrggbb` into `[r, g, b, 1]` with channels in `[0, 1]`
pub fn parse_hex_color(text: &str) -> Result<[f32; 4], ColorParseError> {
    let digits = text
        .strip_prefix('#')
        .ok_or_else(|| ColorParseError::MissingHash(text.to_string()))?;

    if digits.len() != 6 {
        return Err(ColorParseError::BadLength(text.to_string()));
    }
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ColorParseError::BadDigit(text.to_string()));
    }

    let value =
        u32::from_str_radix(digits, 16).map_err(|_| ColorParseError::BadDigit(text.to_string()))?;

    Ok([
        ((value >> 16) & 0xff) as f32 / 255.0,
        ((value >> 8) & 0xff) as f32 / 255.0,
        (value & 0xff) as f32 / 255.0,
        1.0,
    ])
}

/// Formats the RGB channels as `#rrggbb`, truncating `c * 255`
pub fn to_hex_color(color: [f32; 4]) -> String {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).floor() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        channel(color[0]),
        channel(color[1]),
        channel(color[2])
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_picker_color() {
        let color = parse_hex_color("#20d0ff").unwrap();
        assert_eq!(color, [32.0 / 255.0, 208.0 / 255.0, 1.0, 1.0]);
    }

    #[test]
    fn test_round_trip() {
        for text in ["#20d0ff", "#000000", "#ffffff", "#0a0b0c", "#7f8081"] {
            let color = parse_hex_color(text).unwrap();
            assert_eq!(to_hex_color(color), text);
        }
    }

    #[test]
    fn test_formatting_truncates() {
        assert_eq!(to_hex_color([0.5, 0.1, 0.8, 1.0]), "#7f19cc");
        assert_eq!(to_hex_color([1.5, -0.2, 0.0, 1.0]), "#ff0000");
    }

    #[test]
    fn test_malformed_input() {
        assert_eq!(
            parse_hex_color("20d0ff"),
            Err(ColorParseError::MissingHash("20d0ff".to_string()))
        );
        assert_eq!(
            parse_hex_color("#20d0f"),
            Err(ColorParseError::BadLength("#20d0f".to_string()))
        );
        assert_eq!(
            parse_hex_color("#20d0fg"),
            Err(ColorParseError::BadDigit("#20d0fg".to_string()))
        );
        assert!(parse_hex_color("#+20d0f").is_err());
    }
}
