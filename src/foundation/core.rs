use crate::foundation::error::{PrintmockError, PrintmockResult};

/// Integer pixel rectangle with exclusive right/bottom edges.
///
/// Used for placement areas: either an explicit `mask_bbox` taken verbatim from
/// the request, or the bounding box of the primary mask's nonzero pixels.
/// Coordinates may be negative or inverted when caller-supplied; consumers must
/// clip rather than panic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Build from `[left, top, right, bottom]`, the wire shape of `mask_bbox`.
    pub fn from_array(v: [i32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }

    /// Full-canvas rectangle anchored at the origin.
    pub fn full_canvas(width: u32, height: u32) -> PrintmockResult<Self> {
        let right = i32::try_from(width)
            .map_err(|_| PrintmockError::validation("canvas width exceeds i32 range"))?;
        let bottom = i32::try_from(height)
            .map_err(|_| PrintmockError::validation("canvas height exceeds i32 range"))?;
        Ok(Self::new(0, 0, right, bottom))
    }

    /// Signed width; negative when the rect is inverted.
    pub fn width(self) -> i64 {
        i64::from(self.right) - i64::from(self.left)
    }

    /// Signed height; negative when the rect is inverted.
    pub fn height(self) -> i64 {
        i64::from(self.bottom) - i64::from(self.top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_height_are_signed() {
        let r = Rect::new(10, 20, 30, 25);
        assert_eq!(r.width(), 20);
        assert_eq!(r.height(), 5);

        let inverted = Rect::new(30, 25, 10, 20);
        assert_eq!(inverted.width(), -20);
        assert_eq!(inverted.height(), -5);
    }

    #[test]
    fn full_canvas_anchors_at_origin() {
        let r = Rect::full_canvas(500, 400).unwrap();
        assert_eq!(r, Rect::new(0, 0, 500, 400));
    }

    #[test]
    fn full_canvas_rejects_oversized_dims() {
        assert!(Rect::full_canvas(u32::MAX, 1).is_err());
    }
}
