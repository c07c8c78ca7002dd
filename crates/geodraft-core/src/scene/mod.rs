//! Rendering and picking backend abstraction.
//!
//! The drawing overlay never renders anything itself. Every surface is backed
//! by a [`Scene`] that owns the rendered entities, projects screen positions
//! onto the globe and answers pick queries.

mod memory;

pub use memory::{MemoryScene, SceneEntity};

use crate::config::SurfaceSettings;
use crate::geometry::{LabelStyle, PointStyle, PolygonStyle, PolylineStyle};
use glam::DVec3;
use kurbo::Point;
use uuid::Uuid;

/// Identity of a rendered entity.
pub type EntityId = Uuid;

/// Cursor styles the overlay asks the host to display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CursorStyle {
    #[default]
    Default,
    Pointer,
    Crosshair,
}

impl CursorStyle {
    /// CSS-style name of the cursor.
    pub fn as_str(&self) -> &'static str {
        match self {
            CursorStyle::Default => "default",
            CursorStyle::Pointer => "pointer",
            CursorStyle::Crosshair => "crosshair",
        }
    }
}

/// Description of an entity to add to a scene.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityDesc {
    /// A point marker, used for point geometries, vertices and midpoints.
    Marker {
        position: DVec3,
        style: PointStyle,
        label: Option<LabelStyle>,
        show: bool,
    },
    /// An open path body.
    Polyline {
        positions: Vec<DVec3>,
        style: PolylineStyle,
        show: bool,
    },
    /// A closed ring body.
    Polygon {
        positions: Vec<DVec3>,
        style: PolygonStyle,
        show: bool,
    },
}

impl EntityDesc {
    pub fn marker(position: DVec3, style: PointStyle, show: bool) -> Self {
        EntityDesc::Marker {
            position,
            style,
            label: None,
            show,
        }
    }

    /// Whether the entity starts out visible.
    pub fn show(&self) -> bool {
        match self {
            EntityDesc::Marker { show, .. }
            | EntityDesc::Polyline { show, .. }
            | EntityDesc::Polygon { show, .. } => *show,
        }
    }

    pub fn is_marker(&self) -> bool {
        matches!(self, EntityDesc::Marker { .. })
    }
}

/// A rendering surface the overlay draws into.
///
/// Implementations wrap the host engine: entity lifecycle, screen to world
/// projection, picking and camera control.
pub trait Scene {
    /// Project a screen position onto the globe. `None` when off the globe.
    fn pick_world(&self, screen: Point) -> Option<DVec3>;

    /// Topmost visible entity under a screen position.
    ///
    /// `tolerance` widens the pick window by that many pixels.
    fn pick(&self, screen: Point, tolerance: Option<f64>) -> Option<EntityId>;

    fn add(&mut self, desc: EntityDesc) -> EntityId;

    /// Remove an entity. Returns whether it existed.
    fn remove(&mut self, id: EntityId) -> bool;

    /// Move a marker.
    fn set_position(&mut self, id: EntityId, position: DVec3);

    /// Replace the positions of a polyline or polygon body.
    fn set_shape(&mut self, id: EntityId, positions: &[DVec3]);

    fn set_visible(&mut self, id: EntityId, visible: bool);

    /// Enable or disable camera navigation input.
    fn set_camera_input(&mut self, enabled: bool);

    fn apply_settings(&mut self, settings: &SurfaceSettings);
}
