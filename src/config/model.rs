use std::collections::BTreeMap;

use serde_json::Value;

use crate::foundation::{
    core::Rect,
    error::{PrintmockError, PrintmockResult},
};

/// A render request as received from the caller.
///
/// This is a pure data model: it can be built programmatically or
/// deserialized from JSON. Turning it into an immutable [`PlacementConfig`]
/// is performed by [`crate::resolve_placement`], which applies the override
/// precedence `top-level field < details key < details.extras key`.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct RenderRequest {
    /// Product model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Product view identifier (e.g. "front").
    #[serde(default = "default_view")]
    pub view: String,
    /// Path of the user image to place.
    #[serde(default)]
    pub src: Option<String>,
    /// Tile the source across the placement area instead of centering it.
    #[serde(default)]
    pub tile: bool,
    /// Horizontal pixel offset; positive moves right.
    #[serde(default)]
    pub offset_x: i32,
    /// Vertical pixel offset; positive moves down.
    #[serde(default)]
    pub offset_y: i32,
    /// Multiplier on the placement area's dimensions.
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Freeform override payload; keys here win over the top-level fields.
    #[serde(default)]
    pub details: Option<OverrideSet>,
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            model: default_model(),
            view: default_view(),
            src: None,
            tile: false,
            offset_x: 0,
            offset_y: 0,
            scale: default_scale(),
            details: None,
        }
    }
}

fn default_model() -> String {
    "MT".to_string()
}

fn default_view() -> String {
    "front".to_string()
}

fn default_scale() -> f64 {
    1.0
}

/// One level of placement overrides (the `details` payload, or its nested
/// `extras` sub-payload).
///
/// Tunables are kept as raw JSON values because callers historically sent
/// numbers, numeric strings and booleans interchangeably; coercion happens at
/// resolve time and failures surface as [`PrintmockError::Validation`] naming
/// the raw value. Keys that are not recognized land in `rest` and are ignored
/// apart from diagnostics.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OverrideSet {
    pub src: Option<String>,
    /// Alias for `src`, preferred when both are present at the same level.
    pub print_path: Option<String>,
    pub tile: Option<Value>,
    pub offset_x: Option<Value>,
    pub offset_y: Option<Value>,
    pub scale: Option<Value>,
    /// Explicit placement rectangle `[left, top, right, bottom]`.
    pub mask_bbox: Option<Value>,
    /// Clip the placed source to the primary mask (default true).
    pub limit_to_mask: Option<Value>,
    pub tile_step_x: Option<Value>,
    pub tile_step_y: Option<Value>,
    pub tile_shift_x: Option<Value>,
    pub tile_shift_y: Option<Value>,
    /// Most-specific override level; only meaningful on the `details` payload.
    pub extras: Option<Box<OverrideSet>>,
    /// Unrecognized keys, kept only for logging.
    #[serde(flatten)]
    pub rest: BTreeMap<String, Value>,
}

/// Fully resolved placement parameters, consumed immutably by the compositor.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementConfig {
    /// Path/identifier of the user image.
    pub src: String,
    pub tile: bool,
    pub offset_x: i32,
    pub offset_y: i32,
    pub scale: f64,
    pub extras: PlacementExtras,
}

/// Auxiliary placement tuning knobs with their resolved defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementExtras {
    /// Placement rectangle used verbatim instead of the mask's bounding box.
    pub mask_bbox: Option<Rect>,
    /// Whether final visibility is intersected with the primary mask.
    pub limit_to_mask: bool,
    pub tile_step_x: Option<i32>,
    pub tile_step_y: Option<i32>,
    pub tile_shift_x: Option<i32>,
    pub tile_shift_y: Option<i32>,
    /// Leftover override keys nobody consumed; diagnostics only.
    pub unrecognized: BTreeMap<String, Value>,
}

impl Default for PlacementExtras {
    fn default() -> Self {
        Self {
            mask_bbox: None,
            limit_to_mask: true,
            tile_step_x: None,
            tile_step_y: None,
            tile_shift_x: None,
            tile_shift_y: None,
            unrecognized: BTreeMap::new(),
        }
    }
}

/// Coerce a caller-supplied value to an integer.
///
/// Accepts integral numbers, floats (truncated toward zero), numeric strings
/// and booleans.
pub(crate) fn coerce_int(field: &str, value: &Value) -> PrintmockResult<i32> {
    let out = match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i32::try_from(i).ok()
            } else {
                n.as_f64()
                    .map(f64::trunc)
                    .filter(|f| *f >= f64::from(i32::MIN) && *f <= f64::from(i32::MAX))
                    .map(|f| f as i32)
            }
        }
        Value::String(s) => s.trim().parse::<i32>().ok(),
        Value::Bool(b) => Some(i32::from(*b)),
        _ => None,
    };
    out.ok_or_else(|| {
        PrintmockError::validation(format!("invalid integer value for '{field}': {value}"))
    })
}

/// Coerce a caller-supplied value to a float.
pub(crate) fn coerce_float(field: &str, value: &Value) -> PrintmockResult<f64> {
    let out = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    out.filter(|f| f.is_finite()).ok_or_else(|| {
        PrintmockError::validation(format!("invalid float value for '{field}': {value}"))
    })
}

/// Truthiness of a caller-supplied flag: booleans as-is, nonzero numbers,
/// nonempty strings/arrays/objects. Never fails.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Coerce a caller-supplied value to a `[left, top, right, bottom]` rectangle.
pub(crate) fn coerce_bbox(field: &str, value: &Value) -> PrintmockResult<Rect> {
    let Value::Array(items) = value else {
        return Err(PrintmockError::validation(format!(
            "invalid bbox value for '{field}': {value}"
        )));
    };
    if items.len() != 4 {
        return Err(PrintmockError::validation(format!(
            "invalid bbox value for '{field}': expected 4 integers, got {value}"
        )));
    }
    let mut out = [0i32; 4];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = coerce_int(field, item)?;
    }
    Ok(Rect::from_array(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_deserializes_with_defaults() {
        let req: RenderRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.model, "MT");
        assert_eq!(req.view, "front");
        assert_eq!(req.scale, 1.0);
        assert!(!req.tile);
        assert!(req.details.is_none());
    }

    #[test]
    fn override_set_collects_unknown_keys() {
        let d: OverrideSet =
            serde_json::from_value(json!({ "scale": 2, "color_hint": "red" })).unwrap();
        assert_eq!(d.scale, Some(json!(2)));
        assert_eq!(d.rest.get("color_hint"), Some(&json!("red")));
    }

    #[test]
    fn coerce_int_accepts_numbers_strings_bools() {
        assert_eq!(coerce_int("k", &json!(7)).unwrap(), 7);
        assert_eq!(coerce_int("k", &json!(-3.9)).unwrap(), -3);
        assert_eq!(coerce_int("k", &json!(" 12 ")).unwrap(), 12);
        assert_eq!(coerce_int("k", &json!(true)).unwrap(), 1);
    }

    #[test]
    fn coerce_int_names_the_raw_value() {
        let err = coerce_int("offset_x", &json!("12px")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("offset_x"));
        assert!(msg.contains("12px"));
    }

    #[test]
    fn coerce_float_rejects_non_numerics() {
        assert_eq!(coerce_float("k", &json!("0.5")).unwrap(), 0.5);
        assert!(coerce_float("scale", &json!({})).is_err());
    }

    #[test]
    fn truthiness_matches_loose_callers() {
        assert!(truthy(&json!(1)));
        assert!(truthy(&json!("yes")));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("")));
        assert!(!truthy(&Value::Null));
    }

    #[test]
    fn coerce_bbox_requires_four_ints() {
        let r = coerce_bbox("mask_bbox", &json!([1, 2, 3, 4])).unwrap();
        assert_eq!(r, Rect::new(1, 2, 3, 4));
        assert!(coerce_bbox("mask_bbox", &json!([1, 2, 3])).is_err());
        assert!(coerce_bbox("mask_bbox", &json!("1,2,3,4")).is_err());
    }
}
