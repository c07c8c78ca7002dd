//! GeoDraft Core Library
//!
//! Interactive drawing and editing of points, polylines and polygons on top of
//! one or more globe surfaces. Rendering and picking are delegated to a
//! [`Scene`] implementation supplied by the host.

pub mod config;
mod controller;
mod coordinator;
mod editor;
pub mod error;
pub mod events;
pub mod geometry;
mod hover;
pub mod input;
pub mod merge;
pub mod scene;
pub mod vertex;

pub use config::{CoordinatorConfig, SurfaceSettings};
pub use controller::{ControllerState, EditorKind, Mode};
pub use coordinator::{Coordinator, SurfaceId};
pub use error::{DrawError, DrawResult};
pub use events::{BoxFuture, DrawEvent, EventTopic, Reply, Verdict};
pub use geometry::{
    DrawOptions, Geometry, GeometryKind, LabelStyle, NodeOptions, PointStyle, PolygonStyle, PolylineStyle,
    SerializableColor,
};
pub use hover::HOVER_PICK_TOLERANCE;
pub use input::{Gesture, InputTranslator, Modifier, Modifiers, MouseButton, PointerEvent, PointerInput};
pub use merge::merge;
pub use scene::{CursorStyle, EntityDesc, EntityId, MemoryScene, Scene};
