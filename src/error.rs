use std::path::PathBuf;

use thiserror::Error;

/// Failures of the card rasterizer. A `Surface` error means the instance cannot render at all.
#[derive(Debug, Error)]
pub enum RenderError {
	#[error("failed to allocate a {width}x{height} drawing surface")]
	Surface { width: u32, height: u32 },
	#[error("failed to build card scene: {0}")]
	Scene(#[from] usvg::Error),
	#[error("failed to encode card as PNG: {0}")]
	Encode(#[from] image::ImageError),
}

#[derive(Debug, Error)]
pub enum ExportError {
	#[error("refusing to export an empty image")]
	Empty,
	#[error("failed to write {path}: {source}")]
	Write {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

/// Upstream quote generation failures. These never reach the renderer: the generator falls back to bundled quotes.
#[derive(Debug, Error)]
pub enum GenerateError {
	#[error("API key is not configured")]
	NotConfigured,
	#[error("request timed out after {0}s")]
	Timeout(u64),
	#[error("request failed: {0}")]
	Http(#[from] reqwest::Error),
	#[error("API responded with {status}")]
	Status { status: reqwest::StatusCode },
	#[error("malformed response: {0}")]
	Malformed(String),
}
