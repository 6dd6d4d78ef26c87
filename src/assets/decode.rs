use std::path::Path;

use anyhow::Context;
use image::{GrayImage, RgbaImage};

use crate::{
    assets::resolve::ViewAssetPaths,
    foundation::error::{PrintmockError, PrintmockResult},
};

/// Decoded layer stack for one view, straight (non-premultiplied) RGBA8 for
/// color layers and 8-bit luma for masks.
///
/// Layers nominally share `background`'s pixel dimensions. Mismatched
/// dimensions are tolerated downstream by clipping to the overlapping region.
#[derive(Clone, Debug)]
pub struct ViewLayers {
    pub background: RgbaImage,
    pub mask: GrayImage,
    pub overlay: RgbaImage,
    pub mask_s1: Option<GrayImage>,
    pub mask_s2: Option<GrayImage>,
}

impl ViewLayers {
    /// Decode all layers named by `paths`.
    pub fn load(paths: &ViewAssetPaths) -> PrintmockResult<Self> {
        Ok(Self {
            background: load_rgba(&paths.background)?,
            mask: load_luma(&paths.mask)?,
            overlay: load_rgba(&paths.overlay)?,
            mask_s1: paths.mask_s1.as_deref().map(load_luma).transpose()?,
            mask_s2: paths.mask_s2.as_deref().map(load_luma).transpose()?,
        })
    }
}

/// Decode an image file to straight RGBA8.
pub fn load_rgba(path: &Path) -> PrintmockResult<RgbaImage> {
    let bytes = read_bytes(path)?;
    let img = image::load_from_memory(&bytes)
        .with_context(|| format!("decode image '{}'", path.display()))?;
    Ok(img.to_rgba8())
}

/// Decode an image file to single-channel 8-bit intensity.
pub fn load_luma(path: &Path) -> PrintmockResult<GrayImage> {
    let bytes = read_bytes(path)?;
    let img = image::load_from_memory(&bytes)
        .with_context(|| format!("decode mask '{}'", path.display()))?;
    Ok(img.to_luma8())
}

/// Decode the user-supplied source image, failing with [`PrintmockError::NotFound`]
/// when the path does not exist.
pub fn load_source(path: &Path) -> PrintmockResult<RgbaImage> {
    if !path.exists() {
        return Err(PrintmockError::not_found(format!(
            "source image not found: {}",
            path.display()
        )));
    }
    load_rgba(path)
}

fn read_bytes(path: &Path) -> PrintmockResult<Vec<u8>> {
    std::fs::read(path)
        .with_context(|| format!("read asset bytes from '{}'", path.display()))
        .map_err(PrintmockError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn write_png(path: &Path, img: RgbaImage) {
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        std::fs::write(path, buf).unwrap();
    }

    #[test]
    fn load_rgba_roundtrips_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("px.png");
        write_png(
            &path,
            RgbaImage::from_pixel(2, 1, image::Rgba([10, 20, 30, 128])),
        );

        let img = load_rgba(&path).unwrap();
        assert_eq!(img.dimensions(), (2, 1));
        assert_eq!(img.get_pixel(1, 0).0, [10, 20, 30, 128]);
    }

    #[test]
    fn load_luma_flattens_to_intensity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.png");
        write_png(
            &path,
            RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255])),
        );

        let mask = load_luma(&path).unwrap();
        assert_eq!(mask.get_pixel(0, 0).0, [255]);
    }

    #[test]
    fn load_source_missing_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_source(&dir.path().join("nope.png")).unwrap_err();
        assert!(matches!(err, PrintmockError::NotFound(_)));
        assert!(err.to_string().contains("nope.png"));
    }
}
