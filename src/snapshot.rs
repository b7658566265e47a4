//! Raster snapshots of rendered surfaces.

use crate::config::Config;
use crate::depiction::ImageFormat;
use crate::surface::SurfaceContent;
use anyhow::{Result, anyhow};
use std::path::Path;

/// Rasterizes `svg` at its own size, falling back to the configured canvas
/// when the document has none.
pub fn svg_to_png(svg: &str, config: &Config) -> Result<Vec<u8>> {
    let mut opt = usvg::Options::default();
    opt.font_family = config
        .theme
        .font_family
        .split(',')
        .next()
        .map(|family| family.trim().trim_matches(|c: char| c == '"' || c == '\'').to_string())
        .filter(|family| !family.is_empty())
        .unwrap_or_else(|| "sans-serif".to_string());
    if let Some(size) = usvg::Size::from_wh(config.canvas.width, config.canvas.height) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    Ok(pixmap.encode_png()?)
}

/// Writes the surface as a PNG file. Raster depictions are written as-is;
/// surfaces without drawable content are an error.
pub fn write_surface_png(content: &SurfaceContent, output: &Path, config: &Config) -> Result<()> {
    let bytes = match content {
        SurfaceContent::Svg(svg) => svg_to_png(svg, config)?,
        SurfaceContent::Image {
            format: ImageFormat::Png,
            bytes,
        } => bytes.clone(),
        other => return Err(anyhow!("surface has no drawable content: {other:?}")),
    };
    std::fs::write(output, bytes)?;
    Ok(())
}
