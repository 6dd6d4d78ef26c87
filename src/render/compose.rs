use image::{GrayImage, Rgba, RgbaImage, imageops};

use crate::{
    assets::decode::ViewLayers,
    config::model::PlacementConfig,
    foundation::{core::Rect, error::PrintmockResult},
    render::blend,
};

/// Smallest scale used when a request supplies a non-positive value.
const MIN_SCALE: f64 = 1.0 / 1024.0;

/// Flatten one view's layer stack with the user's source image placed per
/// `placement`.
///
/// Layer order: background, masked user layer, one re-pass per secondary
/// shading mask, overlay. The user layer is pasted through an intensity mask
/// (see [`blend::paste_masked`]); the background and overlay are standard
/// alpha-over. The result is a straight-alpha RGBA canvas sized like the
/// background, ready for PNG encoding.
#[tracing::instrument(skip(source, layers, placement), fields(tile = placement.tile))]
pub fn compose(
    source: &RgbaImage,
    layers: &ViewLayers,
    placement: &PlacementConfig,
) -> PrintmockResult<RgbaImage> {
    let (cw, ch) = layers.background.dimensions();
    let mut canvas = RgbaImage::from_pixel(cw, ch, Rgba([0, 0, 0, 0]));
    blend::over_in_place(&mut canvas, &layers.background);

    let base_mask = &layers.mask;
    let area = match placement
        .extras
        .mask_bbox
        .or_else(|| blend::nonzero_bbox(base_mask))
    {
        Some(rect) => rect,
        None => Rect::full_canvas(cw, ch)?,
    };

    let scale = if placement.scale > 0.0 {
        placement.scale
    } else {
        MIN_SCALE
    };
    let target_w = scaled_dim(area.width(), scale);
    let target_h = scaled_dim(area.height(), scale);
    let user = imageops::resize(source, target_w, target_h, imageops::FilterType::CatmullRom);

    let mut user_layer = RgbaImage::from_pixel(cw, ch, Rgba([0, 0, 0, 0]));
    if placement.tile {
        tile_into(&mut user_layer, &user, area, placement);
    } else {
        let pos_x = i64::from(area.left)
            + (area.width() - i64::from(user.width())).div_euclid(2)
            + i64::from(placement.offset_x);
        let pos_y = i64::from(area.top)
            + (area.height() - i64::from(user.height())).div_euclid(2)
            + i64::from(placement.offset_y);
        blend::paste(&mut user_layer, &user, pos_x, pos_y);
    }

    let user_alpha = blend::alpha_of(&user_layer);
    let primary_mask = shaped_mask(base_mask, &user_alpha, placement.extras.limit_to_mask);
    blend::paste_masked(&mut canvas, &user_layer, &primary_mask);

    // Secondary shading masks re-apply the same user layer with different
    // visibility shaping, after the primary pass and before the overlay.
    for secondary in [&layers.mask_s1, &layers.mask_s2].into_iter().flatten() {
        let mask = shaped_mask(secondary, &user_alpha, placement.extras.limit_to_mask);
        blend::paste_masked(&mut canvas, &user_layer, &mask);
    }

    blend::over_in_place(&mut canvas, &layers.overlay);
    Ok(canvas)
}

/// Visibility mask for one paste pass: intersection of the print mask and the
/// pasted source's own transparency, or the source transparency alone when
/// the mask limit is switched off.
fn shaped_mask(print_mask: &GrayImage, user_alpha: &GrayImage, limit_to_mask: bool) -> GrayImage {
    if limit_to_mask {
        blend::multiply(print_mask, user_alpha)
    } else {
        user_alpha.clone()
    }
}

/// Target dimension: placement-area extent scaled and rounded, floored at 1px
/// so degenerate areas never produce an empty resize.
fn scaled_dim(extent: i64, scale: f64) -> u32 {
    let t = (extent as f64 * scale).round();
    if t < 1.0 {
        return 1;
    }
    if t >= f64::from(u32::MAX) {
        return u32::MAX;
    }
    t as u32
}

/// Fill `layer` with copies of `tile` on a grid anchored to the placement
/// area's origin.
///
/// Step defaults to the offset when positive, else to the tile's own
/// dimension (edge-to-edge tiling). A negative offset acts as a grid shift
/// instead of spacing. The start position is normalized backward/forward by
/// whole steps so the grid phase stays anchored to the area origin regardless
/// of shift magnitude, and the grid extends one step-plus-tile of margin past
/// the area so tiles reach every canvas edge.
fn tile_into(layer: &mut RgbaImage, tile: &RgbaImage, area: Rect, placement: &PlacementConfig) {
    let w = i64::from(tile.width());
    let h = i64::from(tile.height());
    let (offset_x, offset_y) = (
        i64::from(placement.offset_x),
        i64::from(placement.offset_y),
    );

    let step_x = placement
        .extras
        .tile_step_x
        .map(i64::from)
        .unwrap_or(if offset_x > 0 { offset_x } else { w })
        .max(1);
    let step_y = placement
        .extras
        .tile_step_y
        .map(i64::from)
        .unwrap_or(if offset_y > 0 { offset_y } else { h })
        .max(1);

    let shift_x = placement
        .extras
        .tile_shift_x
        .map(i64::from)
        .unwrap_or(if offset_x < 0 { offset_x } else { 0 });
    let shift_y = placement
        .extras
        .tile_shift_y
        .map(i64::from)
        .unwrap_or(if offset_y < 0 { offset_y } else { 0 });

    let (left, top) = (i64::from(area.left), i64::from(area.top));
    let mut start_x = left + shift_x;
    let mut start_y = top + shift_y;
    while start_x + w < left {
        start_x += step_x;
    }
    while start_y + h < top {
        start_y += step_y;
    }
    while start_x > left {
        start_x -= step_x;
    }
    while start_y > top {
        start_y -= step_y;
    }

    let max_x = i64::from(area.right) + step_x + w;
    let max_y = i64::from(area.bottom) + step_y + h;
    let mut ty = start_y;
    while ty < max_y {
        let mut tx = start_x;
        while tx < max_x {
            blend::paste(layer, tile, tx, ty);
            tx += step_x;
        }
        ty += step_y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::PlacementExtras;
    use image::Luma;

    fn layers_with_centered_mask(canvas: u32, mask_side: u32) -> ViewLayers {
        let mut mask = GrayImage::from_pixel(canvas, canvas, Luma([0]));
        let off = (canvas - mask_side) / 2;
        for y in off..off + mask_side {
            for x in off..off + mask_side {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        ViewLayers {
            background: RgbaImage::from_pixel(canvas, canvas, Rgba([255, 255, 255, 255])),
            mask,
            overlay: RgbaImage::from_pixel(canvas, canvas, Rgba([0, 0, 0, 0])),
            mask_s1: None,
            mask_s2: None,
        }
    }

    fn placement(tile: bool, scale: f64) -> PlacementConfig {
        PlacementConfig {
            src: "unused".to_string(),
            tile,
            offset_x: 0,
            offset_y: 0,
            scale,
            extras: PlacementExtras::default(),
        }
    }

    #[test]
    fn scaled_dim_rounds_and_floors_at_one() {
        assert_eq!(scaled_dim(200, 1.0), 200);
        assert_eq!(scaled_dim(200, 0.251), 50);
        assert_eq!(scaled_dim(3, 0.1), 1);
        assert_eq!(scaled_dim(0, 2.0), 1);
        assert_eq!(scaled_dim(-40, 1.0), 1);
    }

    #[test]
    fn non_positive_scale_does_not_panic() {
        let layers = layers_with_centered_mask(50, 20);
        let source = RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]));
        let out = compose(&source, &layers, &placement(false, 0.0)).unwrap();
        assert_eq!(out.dimensions(), (50, 50));
    }

    #[test]
    fn empty_mask_falls_back_to_full_canvas_area() {
        let mut layers = layers_with_centered_mask(40, 10);
        layers.mask = GrayImage::from_pixel(40, 40, Luma([0]));
        let mut cfg = placement(false, 1.0);
        cfg.extras.limit_to_mask = false;

        let source = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 255, 255]));
        let out = compose(&source, &layers, &cfg).unwrap();
        // Source stretched over the full canvas, so a corner pixel is blue.
        assert_eq!(out.get_pixel(0, 0).0, [0, 0, 255, 255]);
    }

    #[test]
    fn centering_uses_floor_division_like_offsets() {
        // Area 20 wide, target 7 wide: floor((20-7)/2) = 6 from the area edge.
        let layers = layers_with_centered_mask(40, 20);
        let mut cfg = placement(false, 0.35);
        cfg.extras.limit_to_mask = false;
        let source = RgbaImage::from_pixel(7, 7, Rgba([0, 255, 0, 255]));
        let out = compose(&source, &layers, &cfg).unwrap();

        assert_eq!(out.get_pixel(16, 16).0, [0, 255, 0, 255]);
        assert_eq!(out.get_pixel(15, 16).0, [255, 255, 255, 255]);
        assert_eq!(out.get_pixel(22, 16).0, [0, 255, 0, 255]);
        assert_eq!(out.get_pixel(23, 16).0, [255, 255, 255, 255]);
    }

    #[test]
    fn mismatched_layer_dimensions_clip_instead_of_panicking() {
        let mut layers = layers_with_centered_mask(40, 20);
        layers.overlay = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
        layers.mask = GrayImage::from_pixel(25, 25, Luma([255]));

        let source = RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 255]));
        let out = compose(&source, &layers, &placement(false, 1.0)).unwrap();
        assert_eq!(out.dimensions(), (40, 40));
        // Undersized opaque overlay wins in its own extent only.
        assert_eq!(out.get_pixel(5, 5).0, [0, 0, 0, 255]);
        assert_ne!(out.get_pixel(30, 30).0, [0, 0, 0, 255]);
    }

    #[test]
    fn explicit_tile_shift_is_phase_normalized_against_the_area_origin() {
        // Mask spans 10..50. Step 12 with 10px tiles leaves 2px gutters, so
        // the grid phase is observable. Shift 35 from origin 10 lands at 45;
        // walking back by whole steps must stop at 9 (largest step-multiple
        // position not exceeding the origin), giving tiles at 9, 21, 33, 45.
        let layers = layers_with_centered_mask(60, 40);
        let mut cfg = placement(true, 0.25);
        cfg.extras.tile_step_x = Some(12);
        cfg.extras.tile_step_y = Some(12);
        cfg.extras.tile_shift_x = Some(35);
        cfg.extras.tile_shift_y = Some(35);
        let source = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 255, 255]));
        let out = compose(&source, &layers, &cfg).unwrap();

        assert_eq!(out.get_pixel(10, 10).0, [0, 0, 255, 255]);
        assert_eq!(out.get_pixel(19, 10).0, [255, 255, 255, 255]);
        assert_eq!(out.get_pixel(20, 15).0, [255, 255, 255, 255]);
        assert_eq!(out.get_pixel(21, 12).0, [0, 0, 255, 255]);
        // Outside the mask stays background even where a tile lands.
        assert_eq!(out.get_pixel(9, 12).0, [255, 255, 255, 255]);
    }

    #[test]
    fn secondary_mask_re_applies_user_layer_outside_primary_mask() {
        let canvas = 40;
        let mut layers = layers_with_centered_mask(canvas, 40);
        // Primary mask: left half. Secondary: right half.
        let mut primary = GrayImage::from_pixel(canvas, canvas, Luma([0]));
        let mut secondary = GrayImage::from_pixel(canvas, canvas, Luma([0]));
        for y in 0..canvas {
            for x in 0..canvas {
                if x < canvas / 2 {
                    primary.put_pixel(x, y, Luma([255]));
                } else {
                    secondary.put_pixel(x, y, Luma([255]));
                }
            }
        }
        layers.mask = primary;
        layers.mask_s1 = Some(secondary);

        let mut cfg = placement(false, 1.0);
        cfg.extras.mask_bbox = Some(Rect::new(0, 0, canvas as i32, canvas as i32));
        let source = RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]));
        let out = compose(&source, &layers, &cfg).unwrap();

        // The source covers the whole canvas; both halves end up red.
        assert_eq!(out.get_pixel(5, 20).0, [255, 0, 0, 255]);
        assert_eq!(out.get_pixel(35, 20).0, [255, 0, 0, 255]);
    }
}
