use std::{
	path::{Path, PathBuf},
	time::Duration,
};

use color_eyre::eyre::{Result, WrapErr as _};
use serde::{Deserialize, Deserializer};

use crate::{
	generator::{DEFAULT_BASE_URL, DEFAULT_MODEL, HttpBackend, REQUEST_TIMEOUT},
	raster::{DEFAULT_HEIGHT, DEFAULT_WIDTH, FontSources, MIN_SCALE, RasterOptions},
	text::QuoteParts,
	theme::VisualTheme,
};

const ENV_PREFIX: &str = "QUOTE_CARD";
/// Conventional variable for the API key, read when the config leaves it unset.
const API_KEY_VAR: &str = "SILICONFLOW_API_KEY";

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
	pub card: CardConfig,
	pub fonts: FontConfig,
	pub output_dir: Option<PathBuf>,
	pub api: ApiConfig,
	/// User's own quotes, picked from at random by `render --pick`.
	pub quotes: Vec<Quote>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CardConfig {
	pub width: u32,
	pub height: u32,
	pub scale: f32,
	pub theme: VisualTheme,
}

impl Default for CardConfig {
	fn default() -> Self {
		Self {
			width: DEFAULT_WIDTH,
			height: DEFAULT_HEIGHT,
			scale: MIN_SCALE,
			theme: VisualTheme::default(),
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FontConfig {
	pub system: bool,
	pub files: Vec<PathBuf>,
	pub dirs: Vec<PathBuf>,
}

impl Default for FontConfig {
	fn default() -> Self {
		Self {
			system: true,
			files: Vec::new(),
			dirs: Vec::new(),
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
	pub base_url: String,
	pub api_key: Option<String>,
	pub model: String,
	pub timeout_secs: u64,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			base_url: DEFAULT_BASE_URL.into(),
			api_key: None,
			model: DEFAULT_MODEL.into(),
			timeout_secs: REQUEST_TIMEOUT.as_secs(),
		}
	}
}

impl ApiConfig {
	pub fn backend(&self) -> Result<HttpBackend> {
		let api_key = self.api_key.clone().or_else(|| std::env::var(API_KEY_VAR).ok());
		HttpBackend::new(self.base_url.clone(), api_key, Duration::from_secs(self.timeout_secs)).wrap_err("Failed to build HTTP client")
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Quote {
	pub text: String,
	pub author: Option<String>,
}

impl Quote {
	/// Quote with its author, or as written when the author is left out so the text may carry its own `— source`.
	pub fn parts(&self) -> QuoteParts {
		match &self.author {
			Some(author) => QuoteParts::new(crate::text::normalize(&self.text), author.trim().to_string()),
			None => crate::text::split_quote(&self.text),
		}
	}
}

impl<'de> Deserialize<'de> for Quote {
	fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
	where
		D: Deserializer<'de>, {
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum QuoteHelper {
			String(String),
			Structured { text: String, author: Option<String> },
		}

		let helper = QuoteHelper::deserialize(deserializer)?;
		Ok(match helper {
			QuoteHelper::String(text) => Quote { text, author: None },
			QuoteHelper::Structured { text, author } => Quote { text, author },
		})
	}
}

impl AppConfig {
	/// Reads `path` if given, else `$XDG_CONFIG_HOME/quote_card.*` or `$XDG_CONFIG_HOME/quote_card/config.*` when present.
	/// `QUOTE_CARD__SECTION__KEY` environment variables override file values.
	pub fn read(path: Option<&Path>) -> Result<Self> {
		let app_name = env!("CARGO_PKG_NAME");

		let mut builder = config::Config::builder();
		match path {
			Some(path) => {
				builder = builder.add_source(config::File::with_name(&path.to_string_lossy()).required(true));
			}
			None => {
				let xdg_dirs = xdg::BaseDirectories::with_prefix(app_name);
				if let Some(app_dir) = xdg_dirs.get_config_home() {
					let conf_dir = app_dir.parent().map(Path::to_path_buf).unwrap_or_else(|| app_dir.clone());
					let locations = [conf_dir.join(app_name), app_dir.join("config")];
					for location in locations.iter() {
						builder = builder.add_source(config::File::with_name(&location.to_string_lossy()).required(false));
					}
				}
			}
		}
		builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true));

		let raw: config::Config = builder.build().wrap_err("Failed to load config")?;
		raw.try_deserialize().wrap_err("Config file is invalid")
	}

	pub fn raster_options(&self) -> RasterOptions {
		RasterOptions {
			device_scale: self.card.scale,
			width: self.card.width,
			height: self.card.height,
			fonts: FontSources {
				files: self.fonts.files.clone(),
				dirs: self.fonts.dirs.clone(),
			},
			system_fonts: self.fonts.system,
		}
	}

	pub fn output_dir(&self) -> PathBuf {
		self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn from_toml(toml: &str) -> AppConfig {
		config::Config::builder()
			.add_source(config::File::from_str(toml, config::FileFormat::Toml))
			.build()
			.unwrap()
			.try_deserialize()
			.unwrap()
	}

	#[test]
	fn empty_config_uses_defaults() {
		let config = from_toml("");
		assert_eq!(config.card.width, 400);
		assert_eq!(config.card.height, 600);
		assert_eq!(config.card.theme, VisualTheme::Classic);
		assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
		assert_eq!(config.api.timeout_secs, 10);
		assert!(config.fonts.system);
		assert_eq!(config.output_dir(), PathBuf::from("."));
	}

	#[test]
	fn reads_sections_and_both_quote_shapes() {
		let config = from_toml(
			r#"
			output_dir = "/tmp/cards"
			quotes = ["一花一世界 — 《华严经》", { text = "知行合一", author = "王阳明" }]

			[card]
			theme = "galaxy"
			scale = 3.0

			[api]
			model = "some/model"
			"#,
		);
		assert_eq!(config.card.theme, VisualTheme::Galaxy);
		assert_eq!(config.raster_options().device_scale, 3.0);
		assert_eq!(config.api.model, "some/model");
		assert_eq!(config.output_dir(), PathBuf::from("/tmp/cards"));
		assert_eq!(config.quotes[0].parts(), QuoteParts::new("一花一世界".into(), "华严经".into()));
		assert_eq!(config.quotes[1].parts(), QuoteParts::new("知行合一".into(), "王阳明".into()));
	}

	#[test]
	fn unknown_theme_is_rejected() {
		let result = config::Config::builder()
			.add_source(config::File::from_str("[card]\ntheme = \"neon\"", config::FileFormat::Toml))
			.build()
			.unwrap()
			.try_deserialize::<AppConfig>();
		assert!(result.is_err());
	}
}
