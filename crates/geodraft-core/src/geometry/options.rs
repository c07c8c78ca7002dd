//! Option bundles accepted by the drawing API.

use super::style::{LabelStyle, PointStyle, PolygonStyle, PolylineStyle};
use super::GeometryKind;
use crate::error::{DrawError, DrawResult};
use crate::merge::merge;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Options for `start_draw` and `draw`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawOptions {
    /// Geometry kind to create.
    #[serde(rename = "type")]
    pub kind: GeometryKind,
    /// Whether the geometry body is shown.
    pub show: bool,
    /// Position of a point geometry.
    pub position: Option<DVec3>,
    /// Positions of a polyline or polygon created with `draw`.
    pub positions: Vec<DVec3>,
    /// Style of point geometries and of vertex handles.
    pub point: PointStyle,
    /// Style of midpoint handles.
    pub midpoint: PointStyle,
    pub polyline: PolylineStyle,
    pub polygon: PolygonStyle,
    /// Label attached to point markers.
    pub label: Option<LabelStyle>,
}

impl DrawOptions {
    /// Default options for a geometry kind.
    pub fn new(kind: GeometryKind) -> Self {
        Self {
            kind,
            show: true,
            position: None,
            positions: Vec::new(),
            point: PointStyle::default(),
            midpoint: PointStyle::midpoint(),
            polyline: PolylineStyle::default(),
            polygon: PolygonStyle::default(),
            label: None,
        }
    }

    /// Parse a JSON option bundle, layering it over the defaults for its `type`.
    pub fn from_value(value: &Value) -> DrawResult<Self> {
        if !value.is_object() {
            return Err(DrawError::InvalidOptions("options must be an object".to_string()));
        }
        let kind: GeometryKind = match value.get("type") {
            None | Some(Value::Null) => return Err(DrawError::MissingKind),
            Some(Value::String(name)) => name.parse()?,
            Some(other) => return Err(DrawError::UnsupportedKind(other.to_string())),
        };

        let mut merged = serde_json::to_value(Self::new(kind))
            .map_err(|e| DrawError::InvalidOptions(e.to_string()))?;
        merge(&mut merged, value);
        serde_json::from_value(merged).map_err(|e| DrawError::InvalidOptions(e.to_string()))
    }

    pub fn with_position(mut self, position: DVec3) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_positions(mut self, positions: impl IntoIterator<Item = DVec3>) -> Self {
        self.positions = positions.into_iter().collect();
        self
    }

    pub fn with_point_style(mut self, style: PointStyle) -> Self {
        self.point = style;
        self
    }

    pub fn with_label(mut self, label: LabelStyle) -> Self {
        self.label = Some(label);
        self
    }
}

/// Options for inserting or replacing a single vertex.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeOptions {
    /// Vertex position. Required for inserts; updates keep the old position when absent.
    pub position: Option<DVec3>,
    /// Marker style; the geometry's vertex style when absent.
    pub point: Option<PointStyle>,
    /// Marker visibility; follows the geometry's editing state when absent.
    pub show: Option<bool>,
    pub label: Option<LabelStyle>,
}

impl NodeOptions {
    /// Node options at a position with the geometry's default styling.
    pub fn at(position: DVec3) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_merges_defaults() {
        let options = DrawOptions::from_value(&json!({
            "type": "polygon",
            "point": { "pixel_size": 14.0 },
            "positions": [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]
        }))
        .unwrap();

        assert_eq!(options.kind, GeometryKind::Polygon);
        assert_eq!(options.point.pixel_size, 14.0);
        assert_eq!(options.point.color, PointStyle::default().color);
        assert_eq!(options.positions, vec![DVec3::new(1.0, 2.0, 3.0), DVec3::new(4.0, 5.0, 6.0)]);
        assert!(options.show);
    }

    #[test]
    fn test_from_value_rejects_bad_type() {
        assert!(matches!(
            DrawOptions::from_value(&json!({ "type": "circle" })),
            Err(DrawError::UnsupportedKind(_))
        ));
        assert!(matches!(DrawOptions::from_value(&json!({})), Err(DrawError::MissingKind)));
        assert!(matches!(
            DrawOptions::from_value(&json!("polygon")),
            Err(DrawError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_point_position_and_label() {
        let options = DrawOptions::from_value(&json!({
            "type": "point",
            "position": [7.0, 8.0, 0.0],
            "label": { "text": "HQ" }
        }))
        .unwrap();
        assert_eq!(options.position, Some(DVec3::new(7.0, 8.0, 0.0)));
        assert_eq!(options.label.unwrap().text, "HQ");
    }
}
