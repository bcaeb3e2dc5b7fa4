pub mod config;
pub mod error;
pub mod export;
pub mod generator;
pub mod quotes;
pub mod raster;
pub mod session;
pub mod text;
pub mod theme;
pub mod wrap;

pub use raster::{CardContent, CardRasterizer, RasterOptions, RenderRequest};
pub use theme::VisualTheme;
