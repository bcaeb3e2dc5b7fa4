//! Card rasterizer: paints background, date block, wrapped quote and signature, then encodes the result as PNG.
//!
//! Each render builds a standalone SVG scene in CSS pixels and rasterizes it with resvg at the device scale.
//! Fill, shadow and clip settings live on the individual scene elements, so no drawing state carries over from one render to the next.

use std::{cell::RefCell, collections::HashMap, path::PathBuf, sync::Arc};

use chrono::{Datelike, NaiveDate};
use derive_new::new;
use tracing::{debug, instrument, warn};

use crate::{
	error::RenderError,
	theme::{Fill, Rgba, ShadowLayer, TextPalette, VisualTheme},
	wrap::wrap_text,
};

pub const DEFAULT_WIDTH: u32 = 400;
pub const DEFAULT_HEIGHT: u32 = 600;
/// Renders are never rasterized below this scale, so exports stay crisp on high-density displays.
pub const MIN_SCALE: f32 = 2.0;
pub const PLACEHOLDER_QUOTE: &str = "在此输入您的金句...";

const FONT_STACK: &str = "'PingFang SC', 'Microsoft YaHei', 'Noto Sans CJK SC', 'WenQuanYi Micro Hei', SimHei, Arial, sans-serif";
const CORNER_RADIUS: f32 = 20.0;
const LIGHTING_BAND: f32 = 0.3;

const DAY_SIZE: f32 = 90.0;
const DAY_Y: f32 = 0.2;
const YEAR_MONTH_SIZE: f32 = 26.0;
const YEAR_MONTH_Y: f32 = 0.315;
const WEEKDAY_SIZE: f32 = 20.0;
const WEEKDAY_Y: f32 = 0.375;
const QUOTE_SIZE: f32 = 32.0;
const QUOTE_Y: f32 = 0.55;
const QUOTE_MAX_WIDTH: f32 = 0.85;
const QUOTE_LINE_HEIGHT: f32 = 45.0;
const SIGNATURE_SIZE: f32 = 20.0;
const SIGNATURE_Y: f32 = 0.85;

const WEEKDAYS: [&str; 7] = ["星期日", "星期一", "星期二", "星期三", "星期四", "星期五", "星期六"];

/// What goes on the card. The date is only displayed.
#[derive(Clone, Debug, Eq, PartialEq, new)]
pub struct CardContent {
	pub quote: String,
	pub source: String,
	pub date: NaiveDate,
}

impl CardContent {
	/// `15`
	pub fn day_label(&self) -> String {
		self.date.day().to_string()
	}

	/// `2024年3月`
	pub fn year_month_label(&self) -> String {
		format!("{}年{}月", self.date.year(), self.date.month())
	}

	/// `星期五`
	pub fn weekday_label(&self) -> &'static str {
		WEEKDAYS[self.date.weekday().num_days_from_sunday() as usize]
	}
}

/// One render call; `width` and `height` are in CSS pixels.
#[derive(Clone, Copy, Debug, new)]
pub struct RenderRequest<'a> {
	pub content: &'a CardContent,
	pub theme: VisualTheme,
	pub width: u32,
	pub height: u32,
}

#[derive(Clone, Debug, Default)]
pub struct FontSources {
	pub files: Vec<PathBuf>,
	pub dirs: Vec<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct RasterOptions {
	/// Display scale factor; clamped to at least [`MIN_SCALE`].
	pub device_scale: f32,
	pub width: u32,
	pub height: u32,
	pub fonts: FontSources,
	pub system_fonts: bool,
}

impl Default for RasterOptions {
	fn default() -> Self {
		Self {
			device_scale: MIN_SCALE,
			width: DEFAULT_WIDTH,
			height: DEFAULT_HEIGHT,
			fonts: FontSources::default(),
			system_fonts: true,
		}
	}
}

/// Owns the drawing surface and fonts. Renders take `&mut self`, so one surface never serves two renders at once.
pub struct CardRasterizer {
	fontdb: Arc<fontdb::Database>,
	surface: tiny_skia::Pixmap,
	scale: f32,
	metrics: RefCell<Metrics>,
}

/// Laid-out widths, keyed by font size bits. Fonts never change after construction, so entries never go stale.
#[derive(Debug, Default)]
struct Metrics {
	guards: HashMap<u32, Option<f32>>,
	advances: HashMap<(char, u32), f32>,
}

impl CardRasterizer {
	/// Loads fonts and allocates the surface for the default card size.
	///
	/// Failing to allocate the surface is fatal for this rasterizer.
	#[instrument(skip_all)]
	pub fn new(options: RasterOptions) -> Result<Self, RenderError> {
		let scale = if options.device_scale.is_finite() { options.device_scale.max(MIN_SCALE) } else { MIN_SCALE };

		let mut fontdb = fontdb::Database::new();
		if options.system_fonts {
			fontdb.load_system_fonts();
		}
		for dir in &options.fonts.dirs {
			fontdb.load_fonts_dir(dir);
		}
		for file in &options.fonts.files {
			if let Err(e) = fontdb.load_font_file(file) {
				warn!(path = %file.display(), error = %e, "failed to load font file");
			}
		}
		let first_family = fontdb.faces().find_map(|face| face.families.first().map(|(name, _)| name.clone()));
		match first_family {
			None => warn!("no fonts available, card text will not be drawn"),
			// keeps `sans-serif` resolvable when none of the stack's named families are installed
			Some(family) if !FONT_STACK.contains(family.as_str()) => fontdb.set_sans_serif_family(family),
			Some(_) => {}
		}
		debug!(faces = fontdb.len(), scale, "rasterizer fonts loaded");

		let (width, height) = pixel_size(options.width, options.height, scale);
		let surface = tiny_skia::Pixmap::new(width, height).ok_or(RenderError::Surface { width, height })?;

		Ok(Self {
			fontdb: Arc::new(fontdb),
			surface,
			scale,
			metrics: RefCell::default(),
		})
	}

	pub fn scale(&self) -> f32 {
		self.scale
	}

	/// Output pixel dimensions for a card of `width` x `height` CSS pixels.
	pub fn pixel_size(&self, width: u32, height: u32) -> (u32, u32) {
		pixel_size(width, height, self.scale)
	}

	#[instrument(skip_all, fields(theme = %request.theme, width = request.width, height = request.height))]
	pub fn render(&mut self, request: &RenderRequest) -> Result<Vec<u8>, RenderError> {
		let (width, height) = self.pixel_size(request.width, request.height);
		if width != self.surface.width() || height != self.surface.height() {
			self.surface = tiny_skia::Pixmap::new(width, height).ok_or(RenderError::Surface { width, height })?;
		}

		let svg = self.card_svg(request);
		let tree = usvg::Tree::from_str(&svg, &self.usvg_options())?;

		self.surface.fill(tiny_skia::Color::TRANSPARENT);
		resvg::render(&tree, tiny_skia::Transform::from_scale(self.scale, self.scale), &mut self.surface.as_mut());

		let png = encode_png(&self.surface)?;
		debug!(bytes = png.len(), width, height, "card rendered");
		Ok(png)
	}

	/// Advance width of `text` in CSS pixels: the sum of its characters' advances in the card's regular face.
	///
	/// Each distinct character is laid out once per font size, so measuring cost stays flat as quotes get longer.
	pub fn measure_text(&self, text: &str, font_size: f32) -> f32 {
		if text.is_empty() {
			return 0.0;
		}
		if self.fontdb.is_empty() {
			return estimate_width(text, font_size);
		}
		text.chars().map(|c| self.advance(c, font_size)).sum()
	}

	fn advance(&self, c: char, font_size: f32) -> f32 {
		let key = (c, font_size.to_bits());
		if let Some(&advance) = self.metrics.borrow().advances.get(&key) {
			return advance;
		}

		// Ink bounds ignore side bearings and whitespace, so measure between two guard glyphs and subtract the guards.
		let mut buf = [0; 4];
		let glyph: &str = c.encode_utf8(&mut buf);
		let advance = match (self.ink_width(&format!("|{glyph}|"), font_size), self.guard_width(font_size)) {
			(Some(guarded), Some(guards)) => (guarded - guards).max(0.0),
			_ => estimate_width(glyph, font_size),
		};
		self.metrics.borrow_mut().advances.insert(key, advance);
		advance
	}

	fn guard_width(&self, font_size: f32) -> Option<f32> {
		let key = font_size.to_bits();
		if let Some(&guards) = self.metrics.borrow().guards.get(&key) {
			return guards;
		}
		let guards = self.ink_width("||", font_size);
		self.metrics.borrow_mut().guards.insert(key, guards);
		guards
	}

	fn ink_width(&self, text: &str, font_size: f32) -> Option<f32> {
		let svg = format!(
			r#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"><text x="0" y="{font_size}" xml:space="preserve" font-family="{FONT_STACK}" font-size="{font_size}">{}</text></svg>"#,
			escape_xml(text),
		);
		let tree = match usvg::Tree::from_str(&svg, &self.usvg_options()) {
			Ok(tree) => tree,
			Err(e) => {
				debug!(error = %e, "text measurement failed");
				return None;
			}
		};
		let root = tree.root();
		if !root.has_children() {
			return None;
		}
		Some(root.bounding_box().width())
	}

	fn usvg_options(&self) -> usvg::Options<'static> {
		let mut options = usvg::Options::default();
		options.fontdb = self.fontdb.clone();
		options
	}

	fn card_svg(&self, request: &RenderRequest) -> String {
		let w = request.width as f32;
		let h = request.height as f32;
		let theme = request.theme;
		let palette = theme.palette();
		let content = request.content;

		let mut svg = format!(r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><defs>"#);
		svg.push_str(&format!(r#"<clipPath id="card"><rect width="{w}" height="{h}" rx="{CORNER_RADIUS}" ry="{CORNER_RADIUS}"/></clipPath>"#));

		let background = match theme.spec().fill {
			Fill::Solid(color) => color.css(),
			Fill::Gradient(stops) => {
				// 135deg: top-left corner to bottom-right corner
				svg.push_str(&format!(r#"<linearGradient id="bg" gradientUnits="userSpaceOnUse" x1="0" y1="0" x2="{w}" y2="{h}">"#));
				for stop in stops {
					svg.push_str(&format!(r#"<stop offset="{}" stop-color="{}"/>"#, stop.offset, stop.color.css()));
				}
				svg.push_str("</linearGradient>");
				"url(#bg)".to_string()
			}
		};

		let band = h * LIGHTING_BAND;
		let shade_top = h - band;
		svg.push_str(&format!(
			r##"<linearGradient id="highlight" gradientUnits="userSpaceOnUse" x1="0" y1="0" x2="0" y2="{band}"><stop offset="0" stop-color="#ffffff" stop-opacity="0.15"/><stop offset="1" stop-color="#ffffff" stop-opacity="0"/></linearGradient>"##
		));
		svg.push_str(&format!(
			r##"<linearGradient id="shade" gradientUnits="userSpaceOnUse" x1="0" y1="{shade_top}" x2="0" y2="{h}"><stop offset="0" stop-color="#000000" stop-opacity="0"/><stop offset="1" stop-color="#000000" stop-opacity="0.1"/></linearGradient>"##
		));

		for shadow in [ShadowSpec::DAY, ShadowSpec::QUOTE, ShadowSpec::SIGNATURE] {
			svg.push_str(&shadow.filter(palette));
		}
		svg.push_str("</defs>");

		// background and lighting, clipped to the rounded card
		svg.push_str(r#"<g clip-path="url(#card)">"#);
		svg.push_str(&format!(r#"<rect width="{w}" height="{h}" fill="{background}"/>"#));
		svg.push_str(&format!(r#"<rect width="{w}" height="{band}" fill="url(#highlight)"/>"#));
		svg.push_str(&format!(r#"<rect y="{shade_top}" width="{w}" height="{band}" fill="url(#shade)"/>"#));
		svg.push_str("</g>");

		let x = w / 2.0;
		let primary = palette.secondary(1.0);

		// date block
		svg.push_str(&text_element(x, h * DAY_Y, &content.day_label(), DAY_SIZE, true, primary, Some(ShadowSpec::DAY.id)));
		svg.push_str(&text_element(x, h * YEAR_MONTH_Y, &content.year_month_label(), YEAR_MONTH_SIZE, false, palette.secondary(0.9), None));
		svg.push_str(&text_element(x, h * WEEKDAY_Y, content.weekday_label(), WEEKDAY_SIZE, false, palette.secondary(0.8), None));

		// quote, vertically centered around its anchor
		let quote = if content.quote.trim().is_empty() { PLACEHOLDER_QUOTE } else { content.quote.as_str() };
		let lines = wrap_text(quote, w * QUOTE_MAX_WIDTH, |s| self.measure_text(s, QUOTE_SIZE));
		let first_y = h * QUOTE_Y - (lines.len().saturating_sub(1)) as f32 * QUOTE_LINE_HEIGHT / 2.0;
		debug!(lines = lines.len(), "quote wrapped");
		for (i, line) in lines.iter().enumerate() {
			let y = first_y + i as f32 * QUOTE_LINE_HEIGHT;
			svg.push_str(&text_element(x, y, line, QUOTE_SIZE, false, primary, Some(ShadowSpec::QUOTE.id)));
		}

		svg.push_str(&text_element(x, h * SIGNATURE_Y, &content.source, SIGNATURE_SIZE, false, palette.secondary(0.85), Some(ShadowSpec::SIGNATURE.id)));

		svg.push_str("</svg>");
		svg
	}
}

/// Drop shadow of one text layer, in canvas terms: blur radius and offset.
#[derive(Clone, Copy, Debug)]
struct ShadowSpec {
	id: &'static str,
	layer: ShadowLayer,
	blur: f32,
	offset: f32,
}

impl ShadowSpec {
	const DAY: Self = Self {
		id: "shadow-day",
		layer: ShadowLayer::Day,
		blur: 4.0,
		offset: 2.0,
	};
	const QUOTE: Self = Self {
		id: "shadow-quote",
		layer: ShadowLayer::Quote,
		blur: 2.0,
		offset: 1.0,
	};
	const SIGNATURE: Self = Self {
		id: "shadow-signature",
		layer: ShadowLayer::Signature,
		blur: 1.0,
		offset: 1.0,
	};

	fn filter(self, palette: TextPalette) -> String {
		let color = palette.shadow(self.layer);
		// a canvas blur radius corresponds to twice the gaussian deviation
		format!(
			r#"<filter id="{}" x="-20%" y="-20%" width="140%" height="140%"><feDropShadow dx="{o}" dy="{o}" stdDeviation="{}" flood-color="{}" flood-opacity="{}"/></filter>"#,
			self.id,
			self.blur / 2.0,
			color.rgb.css(),
			color.alpha,
			o = self.offset,
		)
	}
}

fn text_element(x: f32, y: f32, text: &str, size: f32, bold: bool, color: Rgba, shadow: Option<&str>) -> String {
	let filter = shadow.map(|id| format!(r#" filter="url(#{id})""#)).unwrap_or_default();
	format!(
		r#"<text x="{x}" y="{y}" text-anchor="middle" dominant-baseline="central" xml:space="preserve" font-family="{FONT_STACK}" font-size="{size}" font-weight="{}" fill="{}" fill-opacity="{}"{filter}>{}</text>"#,
		if bold { "bold" } else { "normal" },
		color.rgb.css(),
		color.alpha,
		escape_xml(text),
	)
}

fn pixel_size(width: u32, height: u32, scale: f32) -> (u32, u32) {
	((width as f32 * scale).round() as u32, (height as f32 * scale).round() as u32)
}

/// Rough advance when no font is loaded: full-width for CJK, a bit over half an em otherwise.
fn estimate_width(text: &str, font_size: f32) -> f32 {
	text.chars().map(|c| if c.is_ascii() { 0.55 } else { 1.0 }).sum::<f32>() * font_size
}

fn escape_xml(text: &str) -> String {
	text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;").replace('\'', "&apos;")
}

/// Straight-alpha RGBA PNG of the surface.
fn encode_png(surface: &tiny_skia::Pixmap) -> Result<Vec<u8>, RenderError> {
	let mut image = image::RgbaImage::new(surface.width(), surface.height());
	for (dst, src) in image.pixels_mut().zip(surface.pixels()) {
		let c = src.demultiply();
		*dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
	}

	let mut png = Vec::new();
	image.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)?;
	Ok(png)
}
