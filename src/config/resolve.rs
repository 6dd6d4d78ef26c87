use std::collections::BTreeMap;

use serde_json::Value;

use crate::{
    config::model::{
        OverrideSet, PlacementConfig, PlacementExtras, RenderRequest, coerce_bbox, coerce_float,
        coerce_int, truthy,
    },
    foundation::error::{PrintmockError, PrintmockResult},
};

/// Resolve a [`RenderRequest`] into an immutable [`PlacementConfig`].
///
/// Per-tunable precedence, most specific wins:
/// top-level request field < same-named key in `details` < key in
/// `details.extras`. Explicit JSON `null` counts as "not provided". For the
/// source path, `print_path` is preferred over `src` within one level.
///
/// Fails with [`PrintmockError::Validation`] when no source path resolves or
/// when a numeric knob cannot be coerced from whatever the caller supplied.
#[tracing::instrument(skip(req), fields(model = %req.model, view = %req.view))]
pub fn resolve_placement(req: &RenderRequest) -> PrintmockResult<PlacementConfig> {
    let details = req.details.as_ref();
    let extras = details.and_then(|d| d.extras.as_deref());

    // Override levels, most specific first.
    let levels: [Option<&OverrideSet>; 2] = [extras, details];

    let pick = |get: fn(&OverrideSet) -> Option<&Value>| {
        levels
            .iter()
            .flatten()
            .filter_map(|lvl| get(lvl))
            .find(|v| !v.is_null())
    };

    let src = levels
        .iter()
        .flatten()
        .filter_map(|lvl| lvl.print_path.as_deref().or(lvl.src.as_deref()))
        .next()
        .or(req.src.as_deref())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| PrintmockError::validation("no source image specified"))?
        .to_string();

    let tile = pick(|l| l.tile.as_ref()).map_or(req.tile, truthy);
    let offset_x = pick(|l| l.offset_x.as_ref())
        .map(|v| coerce_int("offset_x", v))
        .transpose()?
        .unwrap_or(req.offset_x);
    let offset_y = pick(|l| l.offset_y.as_ref())
        .map(|v| coerce_int("offset_y", v))
        .transpose()?
        .unwrap_or(req.offset_y);
    let scale = pick(|l| l.scale.as_ref())
        .map(|v| coerce_float("scale", v))
        .transpose()?
        .unwrap_or(req.scale);

    let pick_int = |field: &str, get: fn(&OverrideSet) -> Option<&Value>| {
        pick(get).map(|v| coerce_int(field, v)).transpose()
    };

    let mut unrecognized = BTreeMap::new();
    for lvl in levels.iter().rev().flatten() {
        unrecognized.extend(lvl.rest.clone());
    }
    if !unrecognized.is_empty() {
        tracing::debug!(keys = ?unrecognized.keys().collect::<Vec<_>>(), "ignoring unrecognized override keys");
    }

    let extras = PlacementExtras {
        mask_bbox: pick(|l| l.mask_bbox.as_ref())
            .map(|v| coerce_bbox("mask_bbox", v))
            .transpose()?,
        limit_to_mask: pick(|l| l.limit_to_mask.as_ref()).is_none_or(truthy),
        tile_step_x: pick_int("tile_step_x", |l| l.tile_step_x.as_ref())?,
        tile_step_y: pick_int("tile_step_y", |l| l.tile_step_y.as_ref())?,
        tile_shift_x: pick_int("tile_shift_x", |l| l.tile_shift_x.as_ref())?,
        tile_shift_y: pick_int("tile_shift_y", |l| l.tile_shift_y.as_ref())?,
        unrecognized,
    };

    Ok(PlacementConfig {
        src,
        tile,
        offset_x,
        offset_y,
        scale,
        extras,
    })
}
