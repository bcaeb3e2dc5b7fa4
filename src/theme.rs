//! Visual themes of the card: background fill and the text color policy that goes with it.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Rgb {
	pub r: u8,
	pub g: u8,
	pub b: u8,
}

impl Rgb {
	pub const fn hex(value: u32) -> Self {
		Self {
			r: (value >> 16) as u8,
			g: (value >> 8) as u8,
			b: value as u8,
		}
	}

	/// `#rrggbb`, as used in SVG paint attributes.
	pub fn css(self) -> String {
		format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
	}
}

/// Color plus alpha in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
	pub rgb: Rgb,
	pub alpha: f32,
}

impl Rgba {
	pub fn css(self) -> String {
		format!("rgba({}, {}, {}, {})", self.rgb.r, self.rgb.g, self.rgb.b, self.alpha)
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
	pub offset: f32,
	pub color: Rgb,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Fill {
	Solid(Rgb),
	/// Stops are sorted by offset, first at 0 and last at 1.
	Gradient(&'static [GradientStop]),
}

/// Which text color reads well on the theme's background.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TextTone {
	/// White text, for dark or saturated backgrounds.
	Light,
	/// Near-black text, for the white theme.
	Dark,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThemeSpec {
	pub id: VisualTheme,
	pub fill: Fill,
	pub text_tone: TextTone,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VisualTheme {
	#[default]
	Classic,
	Sunset,
	Ocean,
	Forest,
	Galaxy,
	Aurora,
	White,
	Black,
	Gray,
}

const fn stop(offset: f32, color: u32) -> GradientStop {
	GradientStop { offset, color: Rgb::hex(color) }
}

const CLASSIC_STOPS: &[GradientStop] = &[stop(0.0, 0x667eea), stop(1.0, 0x764ba2)];
const SUNSET_STOPS: &[GradientStop] = &[stop(0.0, 0xff9a9e), stop(0.5, 0xfecfef), stop(1.0, 0xfecfef)];
const FOREST_STOPS: &[GradientStop] = &[stop(0.0, 0x11998e), stop(1.0, 0x38ef7d)];
const GALAXY_STOPS: &[GradientStop] = &[stop(0.0, 0x2c3e50), stop(1.0, 0x4a00e0)];
const AURORA_STOPS: &[GradientStop] = &[stop(0.0, 0x00c6ff), stop(1.0, 0x0072ff)];

const THEMES: [ThemeSpec; 9] = [
	ThemeSpec {
		id: VisualTheme::Classic,
		fill: Fill::Gradient(CLASSIC_STOPS),
		text_tone: TextTone::Light,
	},
	ThemeSpec {
		id: VisualTheme::Sunset,
		fill: Fill::Gradient(SUNSET_STOPS),
		text_tone: TextTone::Light,
	},
	ThemeSpec {
		id: VisualTheme::Ocean,
		fill: Fill::Gradient(CLASSIC_STOPS),
		text_tone: TextTone::Light,
	},
	ThemeSpec {
		id: VisualTheme::Forest,
		fill: Fill::Gradient(FOREST_STOPS),
		text_tone: TextTone::Light,
	},
	ThemeSpec {
		id: VisualTheme::Galaxy,
		fill: Fill::Gradient(GALAXY_STOPS),
		text_tone: TextTone::Light,
	},
	ThemeSpec {
		id: VisualTheme::Aurora,
		fill: Fill::Gradient(AURORA_STOPS),
		text_tone: TextTone::Light,
	},
	ThemeSpec {
		id: VisualTheme::White,
		fill: Fill::Solid(Rgb::hex(0xffffff)),
		text_tone: TextTone::Dark,
	},
	ThemeSpec {
		id: VisualTheme::Black,
		fill: Fill::Solid(Rgb::hex(0x1a1a1a)),
		text_tone: TextTone::Light,
	},
	ThemeSpec {
		id: VisualTheme::Gray,
		fill: Fill::Solid(Rgb::hex(0x6b7280)),
		text_tone: TextTone::Light,
	},
];

impl VisualTheme {
	pub const ALL: [VisualTheme; 9] = [
		VisualTheme::Classic,
		VisualTheme::Sunset,
		VisualTheme::Ocean,
		VisualTheme::Forest,
		VisualTheme::Galaxy,
		VisualTheme::Aurora,
		VisualTheme::White,
		VisualTheme::Black,
		VisualTheme::Gray,
	];

	pub fn id(self) -> &'static str {
		match self {
			VisualTheme::Classic => "classic",
			VisualTheme::Sunset => "sunset",
			VisualTheme::Ocean => "ocean",
			VisualTheme::Forest => "forest",
			VisualTheme::Galaxy => "galaxy",
			VisualTheme::Aurora => "aurora",
			VisualTheme::White => "white",
			VisualTheme::Black => "black",
			VisualTheme::Gray => "gray",
		}
	}

	pub fn spec(self) -> &'static ThemeSpec {
		// THEMES is laid out in declaration order
		&THEMES[self as usize]
	}

	pub fn palette(self) -> TextPalette {
		TextPalette { tone: self.spec().text_tone }
	}
}

impl fmt::Display for VisualTheme {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.id())
	}
}

impl FromStr for VisualTheme {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let needle = s.trim().to_ascii_lowercase();
		VisualTheme::ALL.into_iter().find(|t| t.id() == needle).ok_or_else(|| format!("unknown theme `{s}`"))
	}
}

const DARK_TEXT: Rgb = Rgb::hex(0x1a1a1a);
const LIGHT_TEXT: Rgb = Rgb::hex(0xffffff);
const SHADOW: Rgb = Rgb::hex(0x000000);

/// Text colors for one theme.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TextPalette {
	tone: TextTone,
}

impl TextPalette {
	pub fn primary(self) -> Rgb {
		match self.tone {
			TextTone::Dark => DARK_TEXT,
			TextTone::Light => LIGHT_TEXT,
		}
	}

	/// Primary color faded to `alpha`, for the date details and signature.
	pub fn secondary(self, alpha: f32) -> Rgba {
		Rgba { rgb: self.primary(), alpha }
	}

	/// Drop shadow color. Shadows are fainter on the dark-text theme.
	pub fn shadow(self, layer: ShadowLayer) -> Rgba {
		let alpha = match (self.tone, layer) {
			(TextTone::Dark, ShadowLayer::Day) => 0.1,
			(TextTone::Light, ShadowLayer::Day) => 0.3,
			(TextTone::Dark, ShadowLayer::Quote) => 0.1,
			(TextTone::Light, ShadowLayer::Quote) => 0.2,
			(TextTone::Dark, ShadowLayer::Signature) => 0.08,
			(TextTone::Light, ShadowLayer::Signature) => 0.15,
		};
		Rgba { rgb: SHADOW, alpha }
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ShadowLayer {
	Day,
	Quote,
	Signature,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn registry_is_total_and_ordered() {
		for theme in VisualTheme::ALL {
			assert_eq!(theme.spec().id, theme);
		}
	}

	#[test]
	fn gradient_stops_span_unit_interval() {
		for theme in VisualTheme::ALL {
			if let Fill::Gradient(stops) = theme.spec().fill {
				assert_eq!(stops.first().map(|s| s.offset), Some(0.0), "{theme}");
				assert_eq!(stops.last().map(|s| s.offset), Some(1.0), "{theme}");
				assert!(stops.windows(2).all(|w| w[0].offset <= w[1].offset), "{theme}");
			}
		}
	}

	#[test]
	fn only_white_gets_dark_text() {
		for theme in VisualTheme::ALL {
			let expected = if theme == VisualTheme::White { DARK_TEXT } else { LIGHT_TEXT };
			assert_eq!(theme.palette().primary(), expected, "{theme}");
		}
		assert_eq!(VisualTheme::White.palette().secondary(0.8).css(), "rgba(26, 26, 26, 0.8)");
		assert_eq!(VisualTheme::Sunset.palette().secondary(0.9).css(), "rgba(255, 255, 255, 0.9)");
	}

	#[test]
	fn ids_round_trip_through_from_str() {
		for theme in VisualTheme::ALL {
			assert_eq!(theme.id().parse::<VisualTheme>(), Ok(theme));
		}
		assert_eq!(" Galaxy ".parse::<VisualTheme>(), Ok(VisualTheme::Galaxy));
		assert!("neon".parse::<VisualTheme>().is_err());
	}

	#[test]
	fn css_colors() {
		assert_eq!(Rgb::hex(0x667eea).css(), "#667eea");
		assert_eq!(VisualTheme::Classic.palette().shadow(ShadowLayer::Quote).css(), "rgba(0, 0, 0, 0.2)");
	}
}
