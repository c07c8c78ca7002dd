//! Per-surface mode state machine and input routing.

use crate::config::SurfaceSettings;
use crate::coordinator::{Request, SurfaceId};
use crate::editor::{EditContext, Editors, GeometryEditor};
use crate::events::EventChannel;
use crate::geometry::GeometryKind;
use crate::input::{Gesture, InputBindings, Modifier, Route};
use crate::scene::{EntityId, Scene};
use std::collections::VecDeque;
use std::fmt;

/// Interaction mode of a surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    View,
    Add,
    Edit,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::View => "view",
            Mode::Add => "add",
            Mode::Edit => "edit",
        })
    }
}

/// Editor variants a surface dispatches to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EditorKind {
    /// No geometry is active.
    #[default]
    Initial,
    Point,
    Polyline,
    Polygon,
}

impl EditorKind {
    pub fn geometry_kind(self) -> Option<GeometryKind> {
        match self {
            EditorKind::Initial => None,
            EditorKind::Point => Some(GeometryKind::Point),
            EditorKind::Polyline => Some(GeometryKind::Polyline),
            EditorKind::Polygon => Some(GeometryKind::Polygon),
        }
    }
}

impl From<GeometryKind> for EditorKind {
    fn from(kind: GeometryKind) -> Self {
        match kind {
            GeometryKind::Point => EditorKind::Point,
            GeometryKind::Polyline => EditorKind::Polyline,
            GeometryKind::Polygon => EditorKind::Polygon,
        }
    }
}

/// Mode, active geometry and active editor of a surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerState {
    pub mode: Mode,
    pub active: Option<EntityId>,
    pub kind: EditorKind,
}

impl ControllerState {
    /// Whether `geometry` is the active geometry in `mode`.
    pub fn is_active_on(&self, mode: Mode, geometry: EntityId) -> bool {
        self.mode == mode && self.active == Some(geometry)
    }
}

/// Gestures an editor handles in a mode. Everything else is unbound.
pub(crate) fn handler_table(kind: EditorKind, mode: Mode) -> &'static [Gesture] {
    use Gesture::*;
    match (kind, mode) {
        (EditorKind::Point, Mode::Add) => &[LeftClick, MouseMove, RightClick],
        (EditorKind::Polyline | EditorKind::Polygon, Mode::Add) => {
            &[LeftClick, MouseMove, LeftDoubleClick, RightClick]
        }
        (EditorKind::Point | EditorKind::Polyline | EditorKind::Polygon, Mode::Edit) => {
            &[LeftClick, MouseMove, LeftDown, LeftUp, RightClick]
        }
        _ => &[],
    }
}

/// Rebind all six gestures for a mode.
///
/// View mode routes clicks and hover to the coordinator. The shift
/// double-click reset stays bound in every mode.
pub(crate) fn bind_mode(bindings: &mut InputBindings, mode: Mode, kind: EditorKind) {
    for gesture in Gesture::ALL {
        bindings.unbind(gesture);
    }
    match mode {
        Mode::View => {
            bindings.bind(Gesture::LeftClick, None, Route::ViewClick);
            bindings.bind(Gesture::MouseMove, None, Route::Hover);
        }
        Mode::Add | Mode::Edit => {
            for &gesture in handler_table(kind, mode) {
                bindings.bind(gesture, None, Route::Editor { kind, mode });
            }
        }
    }
    bindings.bind(Gesture::LeftDoubleClick, Some(Modifier::Shift), Route::ResetAll);
}

/// One rendering surface with its editors and subscriptions.
pub(crate) struct SurfaceController<S> {
    pub(crate) id: SurfaceId,
    pub(crate) scene: S,
    pub(crate) settings: SurfaceSettings,
    pub(crate) state: ControllerState,
    pub(crate) events: EventChannel,
    pub(crate) bindings: InputBindings,
    pub(crate) editors: Editors,
}

impl<S: Scene> SurfaceController<S> {
    pub(crate) fn new(id: SurfaceId, mut scene: S, settings: SurfaceSettings) -> Self {
        scene.apply_settings(&settings);
        let mut bindings = InputBindings::new();
        bind_mode(&mut bindings, Mode::View, EditorKind::Initial);
        Self {
            id,
            scene,
            settings,
            state: ControllerState::default(),
            events: EventChannel::new(),
            bindings,
            editors: Editors::default(),
        }
    }

    /// Run `f` on one editor with a context over the rest of the surface.
    pub(crate) fn with_editor<R>(
        &mut self,
        kind: EditorKind,
        requests: &mut VecDeque<Request>,
        f: impl FnOnce(&mut dyn GeometryEditor, &mut EditContext<'_>) -> R,
    ) -> R {
        let mut ctx = EditContext {
            surface: self.id,
            scene: &mut self.scene,
            state: &mut self.state,
            events: &mut self.events,
            bindings: &mut self.bindings,
            requests,
        };
        f(self.editors.get_mut(kind), &mut ctx)
    }

    /// Kind of a geometry tracked by one of this surface's editors.
    pub(crate) fn owns(&self, entity: EntityId) -> Option<GeometryKind> {
        self.editors.find(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::MemoryScene;

    #[test]
    fn test_view_bindings() {
        let mut bindings = InputBindings::new();
        bind_mode(&mut bindings, Mode::View, EditorKind::Initial);

        assert_eq!(bindings.route(Gesture::LeftClick, None), Some(Route::ViewClick));
        assert_eq!(bindings.route(Gesture::MouseMove, None), Some(Route::Hover));
        assert_eq!(bindings.route(Gesture::LeftDown, None), None);
        assert_eq!(
            bindings.route(Gesture::LeftDoubleClick, Some(Modifier::Shift)),
            Some(Route::ResetAll)
        );
    }

    #[test]
    fn test_rebinding_replaces_previous_mode() {
        let mut bindings = InputBindings::new();
        bind_mode(&mut bindings, Mode::Add, EditorKind::Polygon);
        let add = Route::Editor { kind: EditorKind::Polygon, mode: Mode::Add };
        assert_eq!(bindings.route(Gesture::LeftDoubleClick, None), Some(add));
        assert_eq!(bindings.route(Gesture::LeftDown, None), None);

        bind_mode(&mut bindings, Mode::Edit, EditorKind::Point);
        let edit = Route::Editor { kind: EditorKind::Point, mode: Mode::Edit };
        assert_eq!(bindings.route(Gesture::LeftDown, None), Some(edit));
        assert_eq!(bindings.route(Gesture::LeftDoubleClick, None), None);
        assert_eq!(
            bindings.route(Gesture::LeftDoubleClick, Some(Modifier::Shift)),
            Some(Route::ResetAll)
        );
        assert_eq!(bindings.len(), 6);
    }

    #[test]
    fn test_new_controller_applies_settings() {
        let settings = SurfaceSettings {
            enable_lighting: false,
            ..SurfaceSettings::default()
        };
        let controller = SurfaceController::new(SurfaceId::new(0), MemoryScene::new(), settings.clone());
        assert_eq!(controller.scene.settings(), Some(&settings));
        assert_eq!(controller.state.mode, Mode::View);
    }
}
