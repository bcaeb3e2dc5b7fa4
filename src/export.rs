use std::{
	path::{Path, PathBuf},
	time::{SystemTime, UNIX_EPOCH},
};

use chrono::NaiveDate;
use tracing::info;

use crate::{error::ExportError, theme::VisualTheme};

/// `card-2024-03-15-classic.png`
pub fn card_filename(date: NaiveDate, theme: VisualTheme) -> String {
	format!("card-{}-{}.png", date.format("%Y-%m-%d"), theme.id())
}

/// `card-<unix millis>.png`, for exports with no card date at hand.
pub fn timestamp_filename() -> String {
	let millis = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or_default();
	format!("card-{millis}.png")
}

/// Writes encoded PNG bytes to `dir/filename`, adding the `.png` extension when missing.
///
/// An existing file of the same name is overwritten. Failures are returned as is; retrying is up to the caller.
pub fn save_png(png: &[u8], dir: &Path, filename: &str) -> Result<PathBuf, ExportError> {
	if png.is_empty() {
		return Err(ExportError::Empty);
	}

	let mut path = dir.join(filename);
	if path.extension().is_none_or(|ext| !ext.eq_ignore_ascii_case("png")) {
		path.set_file_name(format!("{filename}.png"));
	}

	std::fs::create_dir_all(dir).map_err(|source| ExportError::Write { path: dir.to_path_buf(), source })?;
	std::fs::write(&path, png).map_err(|source| ExportError::Write { path: path.clone(), source })?;

	info!(path = %path.display(), bytes = png.len(), "card exported");
	Ok(path)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn scratch_dir(name: &str) -> PathBuf {
		let dir = std::env::temp_dir().join(format!("quote_card-export-{name}-{}", std::process::id()));
		let _ = std::fs::remove_dir_all(&dir);
		dir
	}

	#[test]
	fn filename_has_date_and_theme() {
		let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
		assert_eq!(card_filename(date, VisualTheme::Sunset), "card-2024-03-05-sunset.png");
	}

	#[test]
	fn timestamp_filename_shape() {
		let name = timestamp_filename();
		assert!(name.starts_with("card-") && name.ends_with(".png"));
		assert!(name["card-".len()..name.len() - ".png".len()].chars().all(|c| c.is_ascii_digit()));
	}

	#[test]
	fn appends_missing_extension() {
		let dir = scratch_dir("ext");
		let path = save_png(b"\x89PNG", &dir, "card-2024-03-15-classic").unwrap();
		assert_eq!(path, dir.join("card-2024-03-15-classic.png"));
		assert_eq!(std::fs::read(&path).unwrap(), b"\x89PNG");
		std::fs::remove_dir_all(dir).unwrap();
	}

	#[test]
	fn keeps_existing_extension_and_creates_dirs() {
		let dir = scratch_dir("nested").join("a/b");
		let path = save_png(b"\x89PNG", &dir, "mine.PNG").unwrap();
		assert_eq!(path, dir.join("mine.PNG"));
		assert!(path.exists());
	}

	#[test]
	fn empty_image_is_rejected() {
		assert!(matches!(save_png(&[], &scratch_dir("empty"), "x.png"), Err(ExportError::Empty)));
	}

	#[test]
	fn unwritable_target_is_reported() {
		let dir = scratch_dir("blocked");
		std::fs::create_dir_all(&dir).unwrap();
		let blocker = dir.join("file");
		std::fs::write(&blocker, b"").unwrap();
		let err = save_png(b"\x89PNG", &blocker, "x.png").unwrap_err();
		assert!(matches!(err, ExportError::Write { .. }));
		std::fs::remove_dir_all(dir).unwrap();
	}
}
