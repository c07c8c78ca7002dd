//! In-memory scene implementation.

use super::{EntityDesc, EntityId, Scene};
use crate::config::SurfaceSettings;
use glam::DVec3;
use kurbo::{BezPath, Point, Rect, Shape};
use std::collections::HashMap;
use uuid::Uuid;

/// Default pick radius in screen pixels.
pub const DEFAULT_PICK_RADIUS: f64 = 5.0;

/// An entity stored in a [`MemoryScene`].
#[derive(Debug, Clone, PartialEq)]
pub struct SceneEntity {
    pub desc: EntityDesc,
    pub visible: bool,
}

/// In-memory scene for testing and headless use.
///
/// The globe is flat: screen `(x, y)` projects to world `(x, y, 0)` when it
/// falls inside the globe bounds, and world positions project back by dropping
/// `z`.
#[derive(Debug, Clone)]
pub struct MemoryScene {
    globe: Rect,
    pick_radius: f64,
    entities: HashMap<EntityId, SceneEntity>,
    /// Insertion order, oldest first.
    z_order: Vec<EntityId>,
    camera_input: bool,
    settings: Option<SurfaceSettings>,
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryScene {
    /// Create an empty scene with a 1000x1000 globe.
    pub fn new() -> Self {
        Self::with_globe(Rect::new(0.0, 0.0, 1000.0, 1000.0))
    }

    /// Create an empty scene with the given globe bounds.
    pub fn with_globe(globe: Rect) -> Self {
        Self {
            globe,
            pick_radius: DEFAULT_PICK_RADIUS,
            entities: HashMap::new(),
            z_order: Vec::new(),
            camera_input: true,
            settings: None,
        }
    }

    pub fn set_pick_radius(&mut self, radius: f64) {
        self.pick_radius = radius;
    }

    pub fn entity(&self, id: EntityId) -> Option<&SceneEntity> {
        self.entities.get(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn is_visible(&self, id: EntityId) -> bool {
        self.entities.get(&id).is_some_and(|e| e.visible)
    }

    /// Position of a marker.
    pub fn position(&self, id: EntityId) -> Option<DVec3> {
        match self.entities.get(&id).map(|e| &e.desc) {
            Some(EntityDesc::Marker { position, .. }) => Some(*position),
            _ => None,
        }
    }

    /// Positions of a polyline or polygon body.
    pub fn shape(&self, id: EntityId) -> Option<&[DVec3]> {
        match self.entities.get(&id).map(|e| &e.desc) {
            Some(EntityDesc::Polyline { positions, .. }) | Some(EntityDesc::Polygon { positions, .. }) => {
                Some(positions)
            }
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of marker entities, visible or not.
    pub fn marker_count(&self) -> usize {
        self.entities.values().filter(|e| e.desc.is_marker()).count()
    }

    pub fn camera_input(&self) -> bool {
        self.camera_input
    }

    /// Settings last applied by the overlay.
    pub fn settings(&self) -> Option<&SurfaceSettings> {
        self.settings.as_ref()
    }

    /// Screen position of a world position.
    pub fn to_screen(position: DVec3) -> Point {
        Point::new(position.x, position.y)
    }

    fn hit(&self, entity: &SceneEntity, screen: Point, radius: f64) -> bool {
        match &entity.desc {
            EntityDesc::Marker { position, .. } => Self::to_screen(*position).distance(screen) <= radius,
            EntityDesc::Polyline { positions, .. } => {
                let points: Vec<Point> = positions.iter().map(|p| Self::to_screen(*p)).collect();
                point_to_polyline_dist(screen, &points) <= radius
            }
            EntityDesc::Polygon { positions, .. } => {
                let points: Vec<Point> = positions.iter().map(|p| Self::to_screen(*p)).collect();
                if points.len() >= 3 && ring_path(&points).contains(screen) {
                    return true;
                }
                let mut ring = points.clone();
                if let Some(first) = points.first() {
                    ring.push(*first);
                }
                point_to_polyline_dist(screen, &ring) <= radius
            }
        }
    }
}

fn ring_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    if let Some((first, rest)) = points.split_first() {
        path.move_to(*first);
        for p in rest {
            path.line_to(*p);
        }
        path.close_path();
    }
    path
}

/// Distance from a point to a line segment.
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    point.distance(a + seg * t)
}

/// Minimum distance from a point to a sequence of connected segments.
///
/// A single point is treated as a degenerate segment.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => point.distance(*only),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

impl Scene for MemoryScene {
    fn pick_world(&self, screen: Point) -> Option<DVec3> {
        self.globe
            .contains(screen)
            .then(|| DVec3::new(screen.x, screen.y, 0.0))
    }

    fn pick(&self, screen: Point, tolerance: Option<f64>) -> Option<EntityId> {
        let radius = self.pick_radius + tolerance.unwrap_or(0.0);
        let visible = || {
            self.z_order
                .iter()
                .rev()
                .filter_map(|id| self.entities.get(id).map(|e| (*id, e)))
                .filter(|(_, e)| e.visible)
        };

        // Markers sit on top of bodies.
        visible()
            .filter(|(_, e)| e.desc.is_marker())
            .find(|(_, e)| self.hit(e, screen, radius))
            .or_else(|| {
                visible()
                    .filter(|(_, e)| !e.desc.is_marker())
                    .find(|(_, e)| self.hit(e, screen, radius))
            })
            .map(|(id, _)| id)
    }

    fn add(&mut self, desc: EntityDesc) -> EntityId {
        let id = Uuid::new_v4();
        let visible = desc.show();
        self.entities.insert(id, SceneEntity { desc, visible });
        self.z_order.push(id);
        id
    }

    fn remove(&mut self, id: EntityId) -> bool {
        if self.entities.remove(&id).is_some() {
            self.z_order.retain(|&other| other != id);
            true
        } else {
            false
        }
    }

    fn set_position(&mut self, id: EntityId, position: DVec3) {
        if let Some(SceneEntity {
            desc: EntityDesc::Marker { position: current, .. },
            ..
        }) = self.entities.get_mut(&id)
        {
            *current = position;
        }
    }

    fn set_shape(&mut self, id: EntityId, shape: &[DVec3]) {
        if let Some(entity) = self.entities.get_mut(&id) {
            match &mut entity.desc {
                EntityDesc::Polyline { positions, .. } | EntityDesc::Polygon { positions, .. } => {
                    positions.clear();
                    positions.extend_from_slice(shape);
                }
                EntityDesc::Marker { .. } => {}
            }
        }
    }

    fn set_visible(&mut self, id: EntityId, visible: bool) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.visible = visible;
        }
    }

    fn set_camera_input(&mut self, enabled: bool) {
        self.camera_input = enabled;
    }

    fn apply_settings(&mut self, settings: &SurfaceSettings) {
        self.settings = Some(settings.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{PointStyle, PolygonStyle, PolylineStyle};

    fn polygon(positions: Vec<DVec3>) -> EntityDesc {
        EntityDesc::Polygon {
            positions,
            style: PolygonStyle::default(),
            show: true,
        }
    }

    #[test]
    fn test_pick_world_inside_globe() {
        let scene = MemoryScene::new();
        assert_eq!(scene.pick_world(Point::new(10.0, 20.0)), Some(DVec3::new(10.0, 20.0, 0.0)));
        assert_eq!(scene.pick_world(Point::new(-1.0, 20.0)), None);
        assert_eq!(scene.pick_world(Point::new(10.0, 2000.0)), None);
    }

    #[test]
    fn test_markers_pick_before_bodies() {
        let mut scene = MemoryScene::new();
        let body = scene.add(polygon(vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(100.0, 0.0, 0.0),
            DVec3::new(100.0, 100.0, 0.0),
        ]));
        let marker = scene.add(EntityDesc::marker(DVec3::new(80.0, 20.0, 0.0), PointStyle::default(), true));

        assert_eq!(scene.pick(Point::new(81.0, 21.0), None), Some(marker));
        assert_eq!(scene.pick(Point::new(70.0, 20.0), None), Some(body));
        assert_eq!(scene.pick(Point::new(10.0, 90.0), None), None);
    }

    #[test]
    fn test_newest_marker_wins_and_hidden_are_skipped() {
        let mut scene = MemoryScene::new();
        let older = scene.add(EntityDesc::marker(DVec3::new(10.0, 10.0, 0.0), PointStyle::default(), true));
        let newer = scene.add(EntityDesc::marker(DVec3::new(11.0, 10.0, 0.0), PointStyle::default(), true));
        assert_eq!(scene.pick(Point::new(10.5, 10.0), None), Some(newer));

        scene.set_visible(newer, false);
        assert_eq!(scene.pick(Point::new(10.5, 10.0), None), Some(older));
    }

    #[test]
    fn test_polyline_hit_near_segment() {
        let mut scene = MemoryScene::new();
        let line = scene.add(EntityDesc::Polyline {
            positions: vec![DVec3::new(0.0, 0.0, 0.0), DVec3::new(100.0, 0.0, 0.0)],
            style: PolylineStyle::default(),
            show: true,
        });
        assert_eq!(scene.pick(Point::new(50.0, 3.0), None), Some(line));
        assert_eq!(scene.pick(Point::new(50.0, 9.0), None), None);
        assert_eq!(scene.pick(Point::new(50.0, 9.0), Some(5.0)), Some(line));
    }

    #[test]
    fn test_set_shape_and_remove() {
        let mut scene = MemoryScene::new();
        let body = scene.add(polygon(Vec::new()));
        scene.set_shape(body, &[DVec3::ONE, DVec3::ZERO]);
        assert_eq!(scene.shape(body), Some(&[DVec3::ONE, DVec3::ZERO][..]));

        assert!(scene.remove(body));
        assert!(!scene.remove(body));
        assert!(scene.is_empty());
    }

    #[test]
    fn test_segment_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(point_to_segment_dist(Point::new(5.0, 3.0), a, b), 3.0);
        assert_eq!(point_to_segment_dist(Point::new(-4.0, 3.0), a, b), 5.0);
        assert_eq!(point_to_segment_dist(Point::new(3.0, 4.0), a, a), 5.0);
    }
}
