//! Geometry editors.
//!
//! Every surface owns one editor per geometry kind plus the no-op initial
//! editor that is active in view mode. An editor keeps the geometries it
//! created and their handles, and implements the mode-specific pointer
//! handlers for its kind.

mod initial;
mod path;
mod point;

pub(crate) use initial::InitialEditor;
pub(crate) use path::PathEditor;
pub(crate) use point::PointEditor;

use crate::controller::{ControllerState, EditorKind, Mode, bind_mode};
use crate::coordinator::{Continuation, Request, SurfaceId};
use crate::error::DrawResult;
use crate::events::{DrawEvent, EventChannel, Reply};
use crate::geometry::{DrawOptions, Geometry, GeometryKind, NodeOptions};
use crate::input::{InputBindings, PointerInput};
use crate::scene::{CursorStyle, EntityId, Scene};
use glam::DVec3;
use kurbo::Point;
use std::collections::VecDeque;

/// Everything an editor may touch while handling a call.
pub(crate) struct EditContext<'a> {
    pub(crate) surface: SurfaceId,
    pub(crate) scene: &'a mut dyn Scene,
    pub(crate) state: &'a mut ControllerState,
    pub(crate) events: &'a mut EventChannel,
    pub(crate) bindings: &'a mut InputBindings,
    pub(crate) requests: &'a mut VecDeque<Request>,
}

impl EditContext<'_> {
    /// Switch the surface to `mode` on `geometry` and rebind its gestures.
    ///
    /// This is the only place surface state changes.
    pub(crate) fn init(&mut self, mode: Mode, geometry: Option<EntityId>, kind: EditorKind) {
        *self.state = ControllerState {
            mode,
            active: geometry,
            kind,
        };
        bind_mode(self.bindings, mode, kind);
        self.requests.push_back(Request::Activate {
            surface: self.surface,
            mode,
        });
        log::debug!("{} entered {} mode ({:?})", self.surface, mode, kind);
    }

    /// Return the surface to view mode.
    pub(crate) fn view(&mut self) {
        self.init(Mode::View, None, EditorKind::Initial);
    }

    /// Active geometry, if the surface is in `mode`.
    pub(crate) fn active_in(&self, mode: Mode) -> Option<EntityId> {
        if self.state.mode == mode { self.state.active } else { None }
    }

    /// Emit a notification. The reply is not consulted.
    pub(crate) fn notify(&mut self, event: DrawEvent) {
        if let Reply::Pending(future) = self.events.emit(&event) {
            self.requests.push_back(Request::Detach(future));
        }
    }

    /// Emit a vetoable event and run `then` unless a subscriber aborts.
    pub(crate) fn ask(&mut self, event: DrawEvent, then: Continuation) {
        self.requests.push_back(Request::Ask {
            surface: self.surface,
            event,
            then,
        });
    }

    pub(crate) fn set_cursor(&mut self, style: CursorStyle) {
        self.requests.push_back(Request::Cursor(style));
    }

    /// Hand a plain pointer move to the debounced hover loop.
    pub(crate) fn hover(&mut self, position: Point) {
        self.requests.push_back(Request::Hover {
            surface: self.surface,
            position,
        });
    }

    /// Start or end a drag: camera input is off while dragging.
    pub(crate) fn set_dragging(&mut self, dragging: bool) {
        self.scene.set_camera_input(!dragging);
        self.set_cursor(if dragging { CursorStyle::Crosshair } else { CursorStyle::Default });
    }
}

/// Drawing and editing behaviour of one geometry kind.
pub(crate) trait GeometryEditor {
    /// Geometry kind handled, `None` for the initial editor.
    fn kind(&self) -> Option<GeometryKind>;

    /// Committed geometries owned by this editor.
    fn tracked(&self) -> &[EntityId];

    fn geometry(&self, id: EntityId) -> Option<&Geometry>;

    /// Create a geometry interactively and enter add mode.
    fn start_draw(&mut self, ctx: &mut EditContext<'_>, options: DrawOptions) -> DrawResult<EntityId>;

    /// Create a committed geometry from data.
    fn draw(&mut self, ctx: &mut EditContext<'_>, options: DrawOptions) -> DrawResult<EntityId>;

    /// Enter edit mode on an owned geometry.
    fn start_edit(&mut self, ctx: &mut EditContext<'_>, geometry: EntityId);

    /// Freeze the active geometry, hide its handles and return to view.
    fn complete_edit(&mut self, ctx: &mut EditContext<'_>);

    /// Remove the geometry being drawn and return to view.
    fn discard_draw(&mut self, ctx: &mut EditContext<'_>);

    /// Remove a geometry and all its handles.
    fn delete_entity(&mut self, ctx: &mut EditContext<'_>, geometry: EntityId) -> bool;

    fn handle(&mut self, ctx: &mut EditContext<'_>, mode: Mode, input: &PointerInput);

    fn get_nodes(&self, geometry: EntityId) -> Option<&[EntityId]>;

    fn get_node_positions(&self, geometry: EntityId) -> Option<&[DVec3]>;

    fn get_midpoints(&self, _geometry: EntityId) -> Option<&[EntityId]> {
        None
    }

    fn insert_node(
        &mut self,
        _ctx: &mut EditContext<'_>,
        _geometry: EntityId,
        _options: NodeOptions,
        _index: Option<usize>,
    ) -> Option<EntityId> {
        None
    }

    fn update_node(
        &mut self,
        _ctx: &mut EditContext<'_>,
        _geometry: EntityId,
        _options: NodeOptions,
        _index: usize,
    ) -> Option<EntityId> {
        None
    }

    fn delete_node(&mut self, _ctx: &mut EditContext<'_>, _geometry: EntityId, _index: Option<usize>) -> Option<DVec3> {
        None
    }

    /// Vertex at `index`, clamped to the last one.
    fn get_node(&self, geometry: EntityId, index: usize) -> Option<EntityId> {
        let nodes = self.get_nodes(geometry)?;
        let last = nodes.len().checked_sub(1)?;
        nodes.get(index.min(last)).copied()
    }

    fn owns(&self, id: EntityId) -> bool {
        self.tracked().contains(&id)
    }

    fn positions_of(&self, geometry: EntityId) -> Vec<DVec3> {
        self.get_node_positions(geometry).map(<[DVec3]>::to_vec).unwrap_or_default()
    }

    /// Ask to finish the active edit.
    fn finish_edit(&mut self, ctx: &mut EditContext<'_>) {
        self.finish_edit_then(ctx, None);
    }

    /// Ask to finish the active edit, then hand editing to `handoff`.
    fn finish_edit_then(&mut self, ctx: &mut EditContext<'_>, handoff: Option<EntityId>) {
        let (Some(kind), Some(geometry)) = (self.kind(), ctx.active_in(Mode::Edit)) else {
            return;
        };
        let positions = self.positions_of(geometry);
        ctx.ask(
            DrawEvent::FinishEdit {
                geometry,
                kind,
                positions,
            },
            Continuation::FinishEdit { geometry, handoff },
        );
    }

    /// Ask to cancel the active draw.
    fn cancel_draw(&mut self, ctx: &mut EditContext<'_>) {
        let (Some(kind), Some(geometry)) = (self.kind(), ctx.active_in(Mode::Add)) else {
            return;
        };
        ctx.ask(DrawEvent::CancelDraw { geometry, kind }, Continuation::CancelDraw { geometry });
    }

    /// End whatever this editor has active without consulting subscribers.
    fn preempt(&mut self, ctx: &mut EditContext<'_>) {
        let Some(kind) = self.kind() else {
            return;
        };
        if let Some(geometry) = ctx.active_in(Mode::Add) {
            ctx.notify(DrawEvent::CancelDraw { geometry, kind });
            self.discard_draw(ctx);
        } else if let Some(geometry) = ctx.active_in(Mode::Edit) {
            let positions = self.positions_of(geometry);
            ctx.notify(DrawEvent::FinishEdit {
                geometry,
                kind,
                positions,
            });
            self.complete_edit(ctx);
        }
    }
}

/// The editors of one surface, one per kind.
#[derive(Debug)]
pub(crate) struct Editors {
    initial: InitialEditor,
    point: PointEditor,
    polyline: PathEditor,
    polygon: PathEditor,
}

impl Default for Editors {
    fn default() -> Self {
        Self {
            initial: InitialEditor,
            point: PointEditor::default(),
            polyline: PathEditor::new(GeometryKind::Polyline),
            polygon: PathEditor::new(GeometryKind::Polygon),
        }
    }
}

impl Editors {
    pub(crate) fn get(&self, kind: EditorKind) -> &dyn GeometryEditor {
        match kind {
            EditorKind::Initial => &self.initial,
            EditorKind::Point => &self.point,
            EditorKind::Polyline => &self.polyline,
            EditorKind::Polygon => &self.polygon,
        }
    }

    pub(crate) fn get_mut(&mut self, kind: EditorKind) -> &mut dyn GeometryEditor {
        match kind {
            EditorKind::Initial => &mut self.initial,
            EditorKind::Point => &mut self.point,
            EditorKind::Polyline => &mut self.polyline,
            EditorKind::Polygon => &mut self.polygon,
        }
    }

    /// Kind of the editor tracking `entity`.
    pub(crate) fn find(&self, entity: EntityId) -> Option<GeometryKind> {
        GeometryKind::ALL
            .into_iter()
            .find(|&kind| self.get(kind.into()).owns(entity))
    }
}
