//! Pixel-level primitives for straight (non-premultiplied) RGBA8 buffers.
//!
//! Two distinct blend semantics are used by the compositor and must not be
//! conflated:
//!
//! - **alpha-over**: standard source-over with straight alpha, used for the
//!   background and overlay layers;
//! - **paste with mask**: per-band linear blend `src*m + dst*(1-m)` driven by
//!   an external intensity mask (the alpha band participates like any other
//!   band), used for placing the user layer through the print mask.
//!
//! All operations clip to the overlapping region of their operands, so layer
//! stacks with mismatched dimensions degrade to clipped output instead of
//! panicking.

use image::{GrayImage, RgbaImage};

use crate::foundation::core::Rect;

/// Alpha-composite `src` over `dst` at the origin (straight-alpha "over").
pub fn over_in_place(dst: &mut RgbaImage, src: &RgbaImage) {
    let w = dst.width().min(src.width());
    let h = dst.height().min(src.height());
    for y in 0..h {
        for x in 0..w {
            let s = src.get_pixel(x, y).0;
            let sa = u16::from(s[3]);
            if sa == 0 {
                continue;
            }
            if sa == 255 {
                dst.put_pixel(x, y, image::Rgba(s));
                continue;
            }
            let d = dst.get_pixel(x, y).0;
            let blend = u16::from(mul_div255(u16::from(d[3]), 255 - sa));
            let outa = (sa + blend).min(255);
            let mut out = [0u8; 4];
            out[3] = outa as u8;
            if outa > 0 {
                for i in 0..3 {
                    let num =
                        u32::from(s[i]) * u32::from(sa) + u32::from(d[i]) * u32::from(blend);
                    out[i] = ((num + u32::from(outa) / 2) / u32::from(outa)) as u8;
                }
            }
            dst.put_pixel(x, y, image::Rgba(out));
        }
    }
}

/// Paste `src` into `dst` at `(x, y)` using the source's own alpha as the
/// paste mask. Off-canvas portions are clipped.
pub fn paste(dst: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64) {
    let (dw, dh) = (i64::from(dst.width()), i64::from(dst.height()));
    for sy in 0..i64::from(src.height()) {
        let ty = y + sy;
        if ty < 0 || ty >= dh {
            continue;
        }
        for sx in 0..i64::from(src.width()) {
            let tx = x + sx;
            if tx < 0 || tx >= dw {
                continue;
            }
            let s = src.get_pixel(sx as u32, sy as u32).0;
            let px = blend_banded(dst.get_pixel(tx as u32, ty as u32).0, s, s[3]);
            dst.put_pixel(tx as u32, ty as u32, image::Rgba(px));
        }
    }
}

/// Paste `src` into `dst`, both anchored at the origin, through `mask`.
pub fn paste_masked(dst: &mut RgbaImage, src: &RgbaImage, mask: &GrayImage) {
    let w = dst.width().min(src.width()).min(mask.width());
    let h = dst.height().min(src.height()).min(mask.height());
    for y in 0..h {
        for x in 0..w {
            let m = mask.get_pixel(x, y).0[0];
            if m == 0 {
                continue;
            }
            let px = blend_banded(dst.get_pixel(x, y).0, src.get_pixel(x, y).0, m);
            dst.put_pixel(x, y, image::Rgba(px));
        }
    }
}

/// Per-pixel product of two intensity masks, sized to their overlap.
pub fn multiply(a: &GrayImage, b: &GrayImage) -> GrayImage {
    let w = a.width().min(b.width());
    let h = a.height().min(b.height());
    GrayImage::from_fn(w, h, |x, y| {
        image::Luma([mul_div255(
            u16::from(a.get_pixel(x, y).0[0]),
            u16::from(b.get_pixel(x, y).0[0]),
        )])
    })
}

/// Extract the alpha band of an RGBA image as an intensity mask.
pub fn alpha_of(img: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        image::Luma([img.get_pixel(x, y).0[3]])
    })
}

/// Bounding box of nonzero mask pixels, exclusive right/bottom. `None` when
/// the mask is entirely zero.
pub fn nonzero_bbox(mask: &GrayImage) -> Option<Rect> {
    let mut left = u32::MAX;
    let mut top = u32::MAX;
    let mut right = 0u32;
    let mut bottom = 0u32;
    for (x, y, px) in mask.enumerate_pixels() {
        if px.0[0] == 0 {
            continue;
        }
        left = left.min(x);
        top = top.min(y);
        right = right.max(x + 1);
        bottom = bottom.max(y + 1);
    }
    if left == u32::MAX {
        return None;
    }
    Some(Rect::new(
        left as i32,
        top as i32,
        right as i32,
        bottom as i32,
    ))
}

fn blend_banded(dst: [u8; 4], src: [u8; 4], m: u8) -> [u8; 4] {
    if m == 255 {
        return src;
    }
    let m = u16::from(m);
    let inv = 255 - m;
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = mul_div255(u16::from(src[i]), m)
            .saturating_add(mul_div255(u16::from(dst[i]), inv));
    }
    out
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}
