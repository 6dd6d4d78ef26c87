use std::path::{Path, PathBuf};

use crate::foundation::error::{PrintmockError, PrintmockResult};

/// Layer filenames every view directory must provide.
pub const REQUIRED_LAYERS: [&str; 3] = ["background.png", "mask.png", "overlay.png"];

/// Optional secondary shading masks, applied after the primary masked pass.
pub const OPTIONAL_LAYERS: [&str; 2] = ["mask_s1.png", "mask_s2.png"];

/// Resolved on-disk paths for one product view's layer stack.
#[derive(Clone, Debug)]
pub struct ViewAssetPaths {
    /// Directory the layers were found in.
    pub dir: PathBuf,
    /// Full-canvas product art, RGBA.
    pub background: PathBuf,
    /// Primary print-area mask, single-channel intensity.
    pub mask: PathBuf,
    /// Top-most product shading / print guides, RGBA.
    pub overlay: PathBuf,
    /// First secondary shading mask, if deployed.
    pub mask_s1: Option<PathBuf>,
    /// Second secondary shading mask, if deployed.
    pub mask_s2: Option<PathBuf>,
}

/// Locate the layer stack for `(model, view)` under `assets_root`.
///
/// Lookup order: `assets_root/model/view`, then the model-agnostic
/// `assets_root/view`; the first directory that exists wins. Deliberately
/// uncached: every call re-touches the filesystem, which is cheap relative to
/// a render.
pub fn resolve_view_assets(
    assets_root: &Path,
    model: &str,
    view: &str,
) -> PrintmockResult<ViewAssetPaths> {
    let candidates = [assets_root.join(model).join(view), assets_root.join(view)];
    let Some(dir) = candidates.iter().find(|p| p.exists()) else {
        let tried = candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(" | ");
        return Err(PrintmockError::configuration(format!(
            "assets dir not found for view '{view}'. Tried: {tried}"
        )));
    };

    let missing: Vec<&str> = REQUIRED_LAYERS
        .iter()
        .copied()
        .filter(|name| !dir.join(name).exists())
        .collect();
    if !missing.is_empty() {
        return Err(PrintmockError::configuration(format!(
            "missing assets in {}: {}",
            dir.display(),
            missing.join(", ")
        )));
    }

    let optional = |name: &str| {
        let p = dir.join(name);
        p.exists().then_some(p)
    };

    Ok(ViewAssetPaths {
        background: dir.join(REQUIRED_LAYERS[0]),
        mask: dir.join(REQUIRED_LAYERS[1]),
        overlay: dir.join(REQUIRED_LAYERS[2]),
        mask_s1: optional(OPTIONAL_LAYERS[0]),
        mask_s2: optional(OPTIONAL_LAYERS[1]),
        dir: dir.clone(),
    })
}
