//! Working-storage bookkeeping for preview and order artifacts.
//!
//! The engine itself has no opinion on persistence; these helpers implement
//! the directory conventions the external layer hands paths out of:
//! `uploads/` for raw user files, `previews/` for throwaway renders, and
//! `orders/<id>/{sources,mockups}` for order artifacts.

use std::path::{Path, PathBuf};

use anyhow::Context;
use image::RgbaImage;

use crate::{foundation::error::PrintmockResult, render::pipeline::write_png};

/// Transient working-storage layout rooted at a caller-supplied directory.
#[derive(Clone, Debug)]
pub struct WorkDirs {
    pub root: PathBuf,
    pub uploads: PathBuf,
    pub previews: PathBuf,
    pub orders: PathBuf,
}

impl WorkDirs {
    /// Create the working-directory tree under `root` (idempotent).
    pub fn prepare(root: impl Into<PathBuf>) -> PrintmockResult<Self> {
        let root = root.into();
        let dirs = Self {
            uploads: root.join("uploads"),
            previews: root.join("previews"),
            orders: root.join("orders"),
            root,
        };
        for dir in [&dirs.uploads, &dirs.previews, &dirs.orders] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create working dir '{}'", dir.display()))?;
        }
        Ok(dirs)
    }

    /// Freshly named preview artifact path: `previews/<id>_<model>_<view>.png`.
    pub fn preview_path(&self, model: &str, view: &str) -> PathBuf {
        self.previews
            .join(format!("{}_{model}_{view}.png", short_id()))
    }
}

/// Paths produced by archiving one order.
#[derive(Clone, Debug)]
pub struct OrderArtifacts {
    pub order_id: String,
    pub order_dir: PathBuf,
    pub source_copy: PathBuf,
    pub mockup: PathBuf,
}

/// Persist a finished render as an order: a fresh `orders/<id>` directory
/// holding a copy of the user's source image and the flattened mockup.
///
/// Called only with a fully composed canvas, so a failed copy or write never
/// leaves a half-written mockup next to a valid-looking order id.
pub fn archive_order(
    work: &WorkDirs,
    model: &str,
    view: &str,
    source: &Path,
    image: &RgbaImage,
) -> PrintmockResult<OrderArtifacts> {
    let order_id = short_id();
    let order_dir = work.orders.join(&order_id);
    let sources = order_dir.join("sources");
    let mockups = order_dir.join("mockups");
    for dir in [&sources, &mockups] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create order dir '{}'", dir.display()))?;
    }

    let source_name = source
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("source.png"));
    let source_copy = sources.join(source_name);
    std::fs::copy(source, &source_copy)
        .with_context(|| format!("copy order source '{}'", source.display()))?;

    let mockup = mockups.join(format!("{model}_{view}.png"));
    write_png(image, &mockup)?;

    Ok(OrderArtifacts {
        order_id,
        order_dir,
        source_copy,
        mockup,
    })
}

/// Short random identifier for artifact names (8 hex chars of a UUIDv4).
pub fn short_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..8].to_string()
}
