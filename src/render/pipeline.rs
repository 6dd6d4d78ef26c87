use std::path::Path;

use anyhow::Context;
use image::RgbaImage;

use crate::{
    assets::{decode, resolve::resolve_view_assets},
    config::model::PlacementConfig,
    foundation::error::PrintmockResult,
    render::compose::compose,
};

/// Render one mockup: resolve the view's layer stack, load everything, and
/// flatten. Pure function of its inputs; owns every transient buffer.
///
/// The source path is taken as-is when absolute, otherwise joined onto
/// `base_dir` (callers pass their upload root or working directory).
#[tracing::instrument(skip(placement))]
pub fn render_mockup(
    assets_root: &Path,
    base_dir: &Path,
    model: &str,
    view: &str,
    placement: &PlacementConfig,
) -> PrintmockResult<RgbaImage> {
    let src = resolve_source_path(base_dir, &placement.src);
    let source = decode::load_source(&src)?;
    let paths = resolve_view_assets(assets_root, model, view)?;
    let layers = decode::ViewLayers::load(&paths)?;
    compose(&source, &layers, placement)
}

/// Absolute path of the user image referenced by a placement config.
pub fn resolve_source_path(base_dir: &Path, src: &str) -> std::path::PathBuf {
    let p = Path::new(src);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

/// Encode a finished canvas as PNG, creating parent directories as needed.
///
/// Only called once composition has fully succeeded, so no partial or corrupt
/// artifact is ever left behind.
pub fn write_png(image: &RgbaImage, out: &Path) -> PrintmockResult<()> {
    ensure_parent_dir(out)?;
    image
        .save_with_format(out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", out.display()))?;
    Ok(())
}

/// Create the parent directory of `path` if it does not exist yet.
pub fn ensure_parent_dir(path: &Path) -> PrintmockResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}
