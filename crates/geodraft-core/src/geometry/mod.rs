//! Geometry definitions for the drawing overlay.

mod options;
mod style;

pub use options::{DrawOptions, NodeOptions};
pub use style::{LabelStyle, PointStyle, PolygonStyle, PolylineStyle, SerializableColor};

use crate::error::DrawError;
use crate::scene::EntityId;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The drawable geometry kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    Point,
    Polyline,
    Polygon,
}

impl GeometryKind {
    /// All supported kinds, in lookup order.
    pub const ALL: [GeometryKind; 3] = [GeometryKind::Point, GeometryKind::Polyline, GeometryKind::Polygon];

    /// Name used in option bundles (`"type": "polygon"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Point => "point",
            GeometryKind::Polyline => "polyline",
            GeometryKind::Polygon => "polygon",
        }
    }

    /// Minimum vertex count before a draw may be finished.
    pub fn min_vertices(&self) -> usize {
        match self {
            GeometryKind::Point => 1,
            GeometryKind::Polyline => 2,
            GeometryKind::Polygon => 3,
        }
    }

    /// How consecutive vertices connect.
    pub fn topology(&self) -> Topology {
        match self {
            GeometryKind::Polygon => Topology::Closed,
            GeometryKind::Point | GeometryKind::Polyline => Topology::Open,
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeometryKind {
    type Err = DrawError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "point" => Ok(GeometryKind::Point),
            "polyline" => Ok(GeometryKind::Polyline),
            "polygon" => Ok(GeometryKind::Polygon),
            "" => Err(DrawError::MissingKind),
            other => Err(DrawError::UnsupportedKind(other.to_string())),
        }
    }
}

/// Whether a vertex ring wraps from the last vertex back to the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Open,
    Closed,
}

/// Midpoint of two positions.
///
/// This is a flat per-axis average in world space, not a geodesic midpoint.
pub fn midpoint(a: DVec3, b: DVec3) -> DVec3 {
    DVec3::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0, (a.z + b.z) / 2.0)
}

/// Midpoints of every edge of a vertex sequence.
///
/// Open sequences yield `len - 1` midpoints. Closed sequences yield one per
/// vertex, the last one sitting on the wrap-around edge.
pub fn midpoints(positions: &[DVec3], topology: Topology) -> Vec<DVec3> {
    match topology {
        Topology::Open => positions.windows(2).map(|w| midpoint(w[0], w[1])).collect(),
        Topology::Closed => positions
            .iter()
            .enumerate()
            .map(|(i, &p)| midpoint(p, positions[(i + 1) % positions.len()]))
            .collect(),
    }
}

/// How the rendered shape of a geometry is derived.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeRule {
    /// Shape follows the live vertex positions (drawing or editing).
    Live,
    /// Shape is a committed snapshot.
    Frozen(Vec<DVec3>),
}

/// A geometry created through the drawing API.
#[derive(Debug, Clone)]
pub struct Geometry {
    pub(crate) id: EntityId,
    /// Geometry kind.
    pub kind: GeometryKind,
    /// Style bundle the geometry was created with.
    pub options: DrawOptions,
    pub(crate) rule: ShapeRule,
}

impl Geometry {
    pub(crate) fn new(id: EntityId, options: DrawOptions, rule: ShapeRule) -> Self {
        Self {
            id,
            kind: options.kind,
            options,
            rule,
        }
    }

    /// Identity of the rendered entity backing this geometry.
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn rule(&self) -> &ShapeRule {
        &self.rule
    }

    pub fn is_live(&self) -> bool {
        matches!(self.rule, ShapeRule::Live)
    }

    pub(crate) fn go_live(&mut self) {
        self.rule = ShapeRule::Live;
    }

    pub(crate) fn freeze(&mut self, positions: &[DVec3]) {
        self.rule = ShapeRule::Frozen(positions.to_vec());
    }

    /// Positions the renderer should show, given the current live vertices.
    pub fn shape<'a>(&'a self, live: &'a [DVec3]) -> &'a [DVec3] {
        match &self.rule {
            ShapeRule::Live => live,
            ShapeRule::Frozen(snapshot) => snapshot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midpoint_is_axis_mean() {
        let a = DVec3::new(1.0, -4.0, 10.0);
        let b = DVec3::new(3.0, 8.0, -2.0);
        assert_eq!(midpoint(a, b), DVec3::new(2.0, 2.0, 4.0));
        assert_eq!(midpoint(a, b), midpoint(b, a));
    }

    #[test]
    fn test_open_midpoints() {
        let pts = [DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0), DVec3::new(2.0, 2.0, 0.0)];
        let mids = midpoints(&pts, Topology::Open);
        assert_eq!(mids, vec![DVec3::new(1.0, 0.0, 0.0), DVec3::new(2.0, 1.0, 0.0)]);
        assert!(midpoints(&pts[..1], Topology::Open).is_empty());
        assert!(midpoints(&[], Topology::Open).is_empty());
    }

    #[test]
    fn test_closed_midpoints_wrap() {
        let pts = [DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0), DVec3::new(2.0, 2.0, 0.0)];
        let mids = midpoints(&pts, Topology::Closed);
        assert_eq!(mids.len(), 3);
        assert_eq!(mids[2], DVec3::new(1.0, 1.0, 0.0));
        assert!(midpoints(&[], Topology::Closed).is_empty());
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("polygon".parse::<GeometryKind>().unwrap(), GeometryKind::Polygon);
        assert!(matches!("circle".parse::<GeometryKind>(), Err(DrawError::UnsupportedKind(_))));
        assert!(matches!("".parse::<GeometryKind>(), Err(DrawError::MissingKind)));
    }

    #[test]
    fn test_shape_rule() {
        let mut geometry = Geometry::new(uuid::Uuid::new_v4(), DrawOptions::new(GeometryKind::Polyline), ShapeRule::Live);
        let live = [DVec3::ZERO, DVec3::ONE];
        assert_eq!(geometry.shape(&live), &live);

        geometry.freeze(&live);
        let moved = [DVec3::ZERO, DVec3::new(5.0, 5.0, 5.0)];
        assert_eq!(geometry.shape(&moved), &live);
        assert!(!geometry.is_live());
    }
}
