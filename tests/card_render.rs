use chrono::NaiveDate;
use image::GenericImageView;
use quote_card::{
	CardContent, CardRasterizer, RasterOptions, RenderRequest, VisualTheme, export,
	session::CardSession,
	wrap::wrap_text,
};
use sha2::{Digest, Sha256};

fn mencius() -> CardContent {
	CardContent::new("生于忧患，死于安乐".into(), "孟子".into(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
}

fn digest(bytes: &[u8]) -> Vec<u8> {
	Sha256::digest(bytes).to_vec()
}

#[test]
fn mencius_card_end_to_end() {
	let mut rasterizer = CardRasterizer::new(RasterOptions::default()).unwrap();
	let card = mencius();
	assert_eq!(card.day_label(), "15");
	assert_eq!(card.year_month_label(), "2024年3月");
	assert_eq!(card.weekday_label(), "星期五");

	let lines = wrap_text(&card.quote, 400.0 * 0.85, |s| rasterizer.measure_text(s, 32.0));
	assert_eq!(lines, vec!["生于忧患，死于安乐"]);

	let png = rasterizer.render(&RenderRequest::new(&card, VisualTheme::Classic, 400, 600)).unwrap();
	let image = image::load_from_memory(&png).unwrap();
	let scale = rasterizer.scale();
	assert_eq!(image.dimensions(), ((400.0 * scale) as u32, (600.0 * scale) as u32));

	let dir = std::env::temp_dir().join(format!("quote_card-e2e-{}", std::process::id()));
	let path = export::save_png(&png, &dir, &export::card_filename(card.date, VisualTheme::Classic)).unwrap();
	assert!(path.ends_with("card-2024-03-15-classic.png"));
	assert_eq!(std::fs::read(&path).unwrap(), png);
	std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn corners_are_clipped_and_body_is_filled() {
	let mut rasterizer = CardRasterizer::new(RasterOptions { system_fonts: false, ..Default::default() }).unwrap();
	let card = mencius();
	let png = rasterizer.render(&RenderRequest::new(&card, VisualTheme::Black, 400, 600)).unwrap();
	let image = image::load_from_memory(&png).unwrap().to_rgba8();

	assert_eq!(image.get_pixel(0, 0)[3], 0);
	let (w, h) = image.dimensions();
	assert_eq!(image.get_pixel(w - 1, h - 1)[3], 0);

	// left edge at mid-height: no text there, only the solid fill under the lighting overlays
	let edge = image.get_pixel(4, h / 2);
	assert_eq!(edge[3], 255);
	assert_eq!((edge[0], edge[1], edge[2]), (0x1a, 0x1a, 0x1a));
}

#[test]
fn identical_requests_render_identical_bytes() {
	let mut rasterizer = CardRasterizer::new(RasterOptions::default()).unwrap();
	let card = mencius();
	let request = RenderRequest::new(&card, VisualTheme::Sunset, 400, 600);

	let first = digest(&rasterizer.render(&request).unwrap());
	let second = digest(&rasterizer.render(&request).unwrap());
	assert_eq!(first, second);
}

#[test]
fn previous_render_does_not_leak_into_next() {
	let mut rasterizer = CardRasterizer::new(RasterOptions::default()).unwrap();
	let card = mencius();
	let other = CardContent::new("".into(), "".into(), NaiveDate::from_ymd_opt(1999, 12, 31).unwrap());

	let fresh = rasterizer.render(&RenderRequest::new(&card, VisualTheme::Aurora, 400, 600)).unwrap();
	rasterizer.render(&RenderRequest::new(&other, VisualTheme::White, 320, 480)).unwrap();
	let again = rasterizer.render(&RenderRequest::new(&card, VisualTheme::Aurora, 400, 600)).unwrap();
	assert_eq!(digest(&fresh), digest(&again));
}

#[test]
fn surface_follows_requested_size() {
	let mut rasterizer = CardRasterizer::new(RasterOptions { device_scale: 3.0, system_fonts: false, ..Default::default() }).unwrap();
	let card = mencius();
	let png = rasterizer.render(&RenderRequest::new(&card, VisualTheme::Gray, 300, 500)).unwrap();
	assert_eq!(image::load_from_memory(&png).unwrap().dimensions(), (900, 1500));
}

#[test]
fn session_renders_its_theme() {
	let mut rasterizer = CardRasterizer::new(RasterOptions { system_fonts: false, ..Default::default() }).unwrap();
	let mut session = CardSession::new(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
	session.set_theme(VisualTheme::Forest);

	let png = session.render_with(&mut rasterizer, 400, 600).unwrap();
	let expected = rasterizer.render(&RenderRequest::new(&session.content, VisualTheme::Forest, 400, 600)).unwrap();
	assert_eq!(png, expected);
	assert_eq!(session.default_filename(), "card-2024-03-15-forest.png");
}
