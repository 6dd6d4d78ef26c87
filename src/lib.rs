//! Printmock renders a customer-supplied design onto a product mockup image.
//!
//! The engine composites a source image within a masked print area,
//! optionally tiling it, and layers background/overlay art to produce a
//! realistic preview or final order artifact.
//!
//! # Pipeline overview
//!
//! 1. **Resolve config**: `RenderRequest -> PlacementConfig`
//!    ([`resolve_placement`]) — merges top-level fields with the freeform
//!    `details`/`details.extras` overrides, most specific wins.
//! 2. **Resolve assets**: `(model, view) -> ViewAssetPaths`
//!    ([`resolve_view_assets`]) — model-specific directory first, then the
//!    model-agnostic fallback.
//! 3. **Compose**: `source + ViewLayers + PlacementConfig -> RgbaImage`
//!    ([`compose`]) — background, masked/tiled user layer, secondary shading
//!    masks, overlay.
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: a render is a pure, synchronous function of its
//!   inputs; identical inputs yield byte-identical canvases.
//! - **Request-local buffers**: canvases and layers live for one call and are
//!   released on every exit path.
//! - **Straight RGBA8 end-to-end**: the compositor matches paste-with-mask
//!   semantics on non-premultiplied pixels, so masked pastes and alpha-over
//!   blends stay distinct operations.
#![forbid(unsafe_code)]

mod assets;
mod config;
mod foundation;
mod orders;
mod render;

pub use assets::decode::{ViewLayers, load_luma, load_rgba, load_source};
pub use assets::resolve::{OPTIONAL_LAYERS, REQUIRED_LAYERS, ViewAssetPaths, resolve_view_assets};
pub use config::model::{OverrideSet, PlacementConfig, PlacementExtras, RenderRequest};
pub use config::resolve::resolve_placement;
pub use foundation::core::Rect;
pub use foundation::error::{PrintmockError, PrintmockResult};
pub use orders::{OrderArtifacts, WorkDirs, archive_order, short_id};
pub use render::blend::{
    alpha_of, multiply, nonzero_bbox, over_in_place, paste, paste_masked,
};
pub use render::compose::compose;
pub use render::pipeline::{ensure_parent_dir, render_mockup, resolve_source_path, write_png};
