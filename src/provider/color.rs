use std::fmt;
use std::str::FromStr;

/// An opaque RGB color as used for title-bar styling.
///
/// Accepts `#rgb`, `#rrggbb`, `#aarrggbb` (alpha ignored) and a set of
/// common color names. Always written back as lowercase `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
	pub red: u8,
	pub green: u8,
	pub blue: u8,
}

/// Error returned when a color specification cannot be understood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(String);

impl fmt::Display for ParseColorError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "not a valid color: {:?}", self.0)
	}
}

impl std::error::Error for ParseColorError {}

const NAMED_COLORS: &[(&str, Color)] = &[
	("black", Color::rgb(0, 0, 0)),
	("white", Color::rgb(255, 255, 255)),
	("red", Color::rgb(255, 0, 0)),
	("green", Color::rgb(0, 128, 0)),
	("lime", Color::rgb(0, 255, 0)),
	("blue", Color::rgb(0, 0, 255)),
	("yellow", Color::rgb(255, 255, 0)),
	("cyan", Color::rgb(0, 255, 255)),
	("aqua", Color::rgb(0, 255, 255)),
	("magenta", Color::rgb(255, 0, 255)),
	("fuchsia", Color::rgb(255, 0, 255)),
	("gray", Color::rgb(128, 128, 128)),
	("grey", Color::rgb(128, 128, 128)),
	("darkgray", Color::rgb(169, 169, 169)),
	("darkgrey", Color::rgb(169, 169, 169)),
	("lightgray", Color::rgb(211, 211, 211)),
	("lightgrey", Color::rgb(211, 211, 211)),
	("silver", Color::rgb(192, 192, 192)),
	("maroon", Color::rgb(128, 0, 0)),
	("olive", Color::rgb(128, 128, 0)),
	("navy", Color::rgb(0, 0, 128)),
	("purple", Color::rgb(128, 0, 128)),
	("teal", Color::rgb(0, 128, 128)),
	("orange", Color::rgb(255, 165, 0)),
];

impl Color {
	/// Default title-bar background.
	pub const DARK_GRAY: Color = Color::rgb(50, 50, 50);

	/// Default title-bar text color.
	pub const WHITE: Color = Color::rgb(255, 255, 255);

	pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
		Color { red, green, blue }
	}

	/// Parse `value`, keeping `fallback` when it is not a valid color.
	pub fn parse_or(value: &str, fallback: Color) -> Color {
		match value.parse() {
			Ok(color) => color,
			Err(err) => {
				tracing::warn!(value, error = %err, "keeping previous color");
				fallback
			}
		}
	}
}

impl FromStr for Color {
	type Err = ParseColorError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let value = s.trim();
		let invalid = || ParseColorError(value.to_string());

		if let Some(hex) = value.strip_prefix('#') {
			if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
				return Err(invalid());
			}
			let channel = |from: usize, to: usize| u8::from_str_radix(&hex[from..to], 16);
			let color = match hex.len() {
				3 => {
					let short = |i: usize| channel(i, i + 1).map(|v| v * 17);
					(short(0), short(1), short(2))
				}
				6 => (channel(0, 2), channel(2, 4), channel(4, 6)),
				8 => (channel(2, 4), channel(4, 6), channel(6, 8)),
				_ => return Err(invalid()),
			};
			return match color {
				(Ok(red), Ok(green), Ok(blue)) => Ok(Color::rgb(red, green, blue)),
				_ => Err(invalid()),
			};
		}

		NAMED_COLORS
			.iter()
			.find(|(name, _)| name.eq_ignore_ascii_case(value))
			.map(|(_, color)| *color)
			.ok_or_else(invalid)
	}
}

impl fmt::Display for Color {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_long_hex() {
		assert_eq!("#ff0000".parse::<Color>().unwrap(), Color::rgb(255, 0, 0));
		assert_eq!("#FF8000".parse::<Color>().unwrap(), Color::rgb(255, 128, 0));
	}

	#[test]
	fn test_parse_short_hex() {
		assert_eq!("#f00".parse::<Color>().unwrap(), Color::rgb(255, 0, 0));
		assert_eq!("#abc".parse::<Color>().unwrap(), Color::rgb(0xaa, 0xbb, 0xcc));
	}

	#[test]
	fn test_parse_alpha_hex_ignores_alpha() {
		assert_eq!(
			"#80102030".parse::<Color>().unwrap(),
			Color::rgb(0x10, 0x20, 0x30)
		);
	}

	#[test]
	fn test_parse_named() {
		assert_eq!("White".parse::<Color>().unwrap(), Color::WHITE);
		assert_eq!("grey".parse::<Color>().unwrap(), Color::rgb(128, 128, 128));
	}

	#[test]
	fn test_parse_invalid() {
		assert!("#12".parse::<Color>().is_err());
		assert!("#gggggg".parse::<Color>().is_err());
		assert!("not-a-color".parse::<Color>().is_err());
		assert!("".parse::<Color>().is_err());
	}

	#[test]
	fn test_parse_or_keeps_fallback() {
		assert_eq!(Color::parse_or("bogus", Color::DARK_GRAY), Color::DARK_GRAY);
		assert_eq!(Color::parse_or("#000000", Color::WHITE), Color::rgb(0, 0, 0));
	}

	#[test]
	fn test_display_is_lowercase_rrggbb() {
		assert_eq!(Color::DARK_GRAY.to_string(), "#323232");
		assert_eq!(Color::rgb(0xAB, 0xCD, 0xEF).to_string(), "#abcdef");
	}
}
