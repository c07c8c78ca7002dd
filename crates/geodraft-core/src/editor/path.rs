//! Polylines and polygons.
//!
//! Both kinds share one editor. They differ only in topology (polygons wrap
//! from the last vertex back to the first) and in how many vertices a draw
//! needs before it can be finished.

use super::{EditContext, GeometryEditor};
use crate::controller::{EditorKind, Mode};
use crate::error::{DrawError, DrawResult};
use crate::events::DrawEvent;
use crate::geometry::{DrawOptions, Geometry, GeometryKind, NodeOptions, PointStyle, ShapeRule};
use crate::input::{Gesture, PointerInput};
use crate::scene::{CursorStyle, EntityDesc, EntityId, Scene};
use crate::vertex::{VertexSet, marker};
use glam::DVec3;
use std::collections::HashMap;

/// Rebuild midpoints, or drop them while the vertex count is below what the
/// kind needs to be finished.
fn rebuild_or_clear(kind: GeometryKind, scene: &mut dyn Scene, set: &mut VertexSet, style: &PointStyle, show: bool) {
    if set.len() < kind.min_vertices() {
        set.clear_midpoints(scene);
    } else {
        set.rebuild_midpoints(scene, kind.topology(), style, show);
    }
}

#[derive(Debug)]
pub(crate) struct PathEditor {
    kind: GeometryKind,
    geometries: HashMap<EntityId, Geometry>,
    handles: HashMap<EntityId, VertexSet>,
    tracked: Vec<EntityId>,
    /// Vertex following the pointer in add mode, not yet committed by a click.
    preview: Option<usize>,
    /// Vertex being dragged in edit mode.
    drag: Option<usize>,
}

impl PathEditor {
    pub(crate) fn new(kind: GeometryKind) -> Self {
        Self {
            kind,
            geometries: HashMap::new(),
            handles: HashMap::new(),
            tracked: Vec::new(),
            preview: None,
            drag: None,
        }
    }

    fn editor_kind(&self) -> EditorKind {
        self.kind.into()
    }

    fn body(&self, options: &DrawOptions, positions: Vec<DVec3>) -> EntityDesc {
        match self.kind {
            GeometryKind::Polygon => EntityDesc::Polygon {
                positions,
                style: options.polygon.clone(),
                show: options.show,
            },
            GeometryKind::Polyline | GeometryKind::Point => EntityDesc::Polyline {
                positions,
                style: options.polyline.clone(),
                show: options.show,
            },
        }
    }

    /// Push the shape of a geometry to the scene.
    fn sync_shape(&self, scene: &mut dyn Scene, id: EntityId) {
        if let (Some(geometry), Some(set)) = (self.geometries.get(&id), self.handles.get(&id)) {
            scene.set_shape(id, geometry.shape(set.positions()));
        }
    }

    /// Rebuild the midpoints of a geometry, visible only while it is edited.
    fn rebuild_midpoints(&mut self, ctx: &mut EditContext<'_>, id: EntityId) {
        let show = ctx.state.is_active_on(Mode::Edit, id);
        if let (Some(geometry), Some(set)) = (self.geometries.get(&id), self.handles.get_mut(&id)) {
            rebuild_or_clear(self.kind, ctx.scene, set, &geometry.options.midpoint, show);
        }
    }

    fn end_drag(&mut self, ctx: &mut EditContext<'_>) -> bool {
        let ended = self.drag.take().is_some();
        if ended {
            ctx.set_dragging(false);
        }
        ended
    }

    /// Node edits shift vertex indices, so a drag on the geometry cannot go on.
    fn end_drag_on(&mut self, ctx: &mut EditContext<'_>, geometry: EntityId) -> bool {
        ctx.state.active == Some(geometry) && self.end_drag(ctx)
    }

    /// Re-snapshot a committed geometry so its shape follows the vertices.
    fn refreeze(&mut self, scene: &mut dyn Scene, id: EntityId) {
        if let (Some(geometry), Some(set)) = (self.geometries.get_mut(&id), self.handles.get(&id)) {
            if !geometry.is_live() {
                geometry.freeze(set.positions());
            }
        }
        self.sync_shape(scene, id);
    }

    /// Node edits rebuild midpoints, except on a geometry still being drawn.
    fn after_node_change(&mut self, ctx: &mut EditContext<'_>, id: EntityId) {
        if ctx.state.is_active_on(Mode::Add, id) {
            self.preview = None;
        } else {
            self.rebuild_midpoints(ctx, id);
        }
        self.refreeze(ctx.scene, id);
    }

    fn belongs_to(&self, active: EntityId, entity: EntityId) -> bool {
        entity == active
            || self
                .handles
                .get(&active)
                .is_some_and(|set| set.vertex_index(entity).is_some() || set.midpoint_index(entity).is_some())
    }

    fn emit_drawing(&self, ctx: &mut EditContext<'_>, id: EntityId) {
        ctx.notify(DrawEvent::Drawing {
            geometry: id,
            kind: self.kind,
            positions: self.positions_of(id),
        });
    }

    fn emit_editing(&self, ctx: &mut EditContext<'_>, id: EntityId) {
        ctx.notify(DrawEvent::Editing {
            geometry: id,
            kind: self.kind,
            positions: self.positions_of(id),
        });
    }

    fn remove_geometry(&mut self, scene: &mut dyn Scene, id: EntityId) -> bool {
        if self.geometries.remove(&id).is_none() {
            return false;
        }
        if let Some(mut set) = self.handles.remove(&id) {
            set.destroy(scene);
        }
        scene.remove(id);
        self.tracked.retain(|&tracked| tracked != id);
        true
    }

    fn add_mouse_move(&mut self, ctx: &mut EditContext<'_>, input: &PointerInput) {
        let Some(world) = ctx.scene.pick_world(input.position) else {
            ctx.set_cursor(CursorStyle::Default);
            return;
        };
        ctx.set_cursor(CursorStyle::Crosshair);
        let Some(id) = ctx.active_in(Mode::Add) else {
            return;
        };
        let (Some(geometry), Some(set)) = (self.geometries.get(&id), self.handles.get_mut(&id)) else {
            return;
        };
        match self.preview {
            Some(index) => {
                set.set_position(ctx.scene, index, world);
            }
            None => {
                set.push(ctx.scene, world, &geometry.options.point, true);
                self.preview = Some(set.len() - 1);
            }
        }
        self.sync_shape(ctx.scene, id);
        self.emit_drawing(ctx, id);
    }

    fn add_left_click(&mut self, ctx: &mut EditContext<'_>, input: &PointerInput) {
        let Some(world) = ctx.scene.pick_world(input.position) else {
            return;
        };
        let Some(id) = ctx.active_in(Mode::Add) else {
            return;
        };
        let (Some(geometry), Some(set)) = (self.geometries.get(&id), self.handles.get_mut(&id)) else {
            return;
        };
        match self.preview.take() {
            Some(index) => {
                set.set_position(ctx.scene, index, world);
            }
            // The clicks of a double-click land on the same spot.
            None if set.last_position() == Some(world) => return,
            None => {
                set.push(ctx.scene, world, &geometry.options.point, true);
            }
        }
        self.sync_shape(ctx.scene, id);
        self.emit_drawing(ctx, id);
    }

    fn add_double_click(&mut self, ctx: &mut EditContext<'_>) {
        let Some(id) = ctx.active_in(Mode::Add) else {
            return;
        };
        let (Some(geometry), Some(set)) = (self.geometries.get_mut(&id), self.handles.get_mut(&id)) else {
            return;
        };
        if set.len() < self.kind.min_vertices() {
            return;
        }
        self.preview = None;
        rebuild_or_clear(self.kind, ctx.scene, set, &geometry.options.midpoint, false);
        set.set_vertices_visible(ctx.scene, false);
        geometry.freeze(set.positions());
        self.sync_shape(ctx.scene, id);
        ctx.notify(DrawEvent::FinishDraw {
            geometry: id,
            kind: self.kind,
            positions: self.positions_of(id),
        });
        ctx.set_cursor(CursorStyle::Default);
        ctx.view();
    }

    fn add_right_click(&mut self, ctx: &mut EditContext<'_>) {
        let Some(id) = ctx.active_in(Mode::Add) else {
            return;
        };
        let Some(set) = self.handles.get_mut(&id) else {
            return;
        };
        if set.len() <= 1 {
            self.cancel_draw(ctx);
            return;
        }
        set.remove(ctx.scene, set.len() - 1);
        self.preview = None;
        self.sync_shape(ctx.scene, id);
        self.emit_drawing(ctx, id);
    }

    fn edit_left_click(&mut self, ctx: &mut EditContext<'_>, input: &PointerInput) {
        if self.drag.is_some() {
            return;
        }
        let Some(active) = ctx.active_in(Mode::Edit) else {
            return;
        };
        match ctx.scene.pick(input.position, None) {
            None => self.finish_edit(ctx),
            Some(picked) if self.belongs_to(active, picked) => {}
            Some(picked) => self.finish_edit_then(ctx, Some(picked)),
        }
    }

    fn edit_left_down(&mut self, ctx: &mut EditContext<'_>, input: &PointerInput) {
        let Some(active) = ctx.active_in(Mode::Edit) else {
            return;
        };
        let Some(picked) = ctx.scene.pick(input.position, None) else {
            return;
        };
        let (Some(geometry), Some(set)) = (self.geometries.get(&active), self.handles.get_mut(&active)) else {
            return;
        };
        let index = match set.vertex_index(picked) {
            Some(index) => index,
            None => match set.midpoint_index(picked) {
                Some(mid) => match set.promote_midpoint(ctx.scene, mid, &geometry.options.point) {
                    Some(index) => index,
                    None => return,
                },
                None => return,
            },
        };
        set.set_midpoints_visible(ctx.scene, false);
        self.drag = Some(index);
        ctx.set_dragging(true);
        self.sync_shape(ctx.scene, active);
    }

    fn edit_mouse_move(&mut self, ctx: &mut EditContext<'_>, input: &PointerInput) {
        let Some(index) = self.drag else {
            ctx.hover(input.position);
            return;
        };
        let (Some(active), Some(world)) = (ctx.active_in(Mode::Edit), ctx.scene.pick_world(input.position)) else {
            return;
        };
        if let Some(set) = self.handles.get_mut(&active) {
            set.set_position(ctx.scene, index, world);
        }
        self.sync_shape(ctx.scene, active);
        self.emit_editing(ctx, active);
    }

    fn edit_left_up(&mut self, ctx: &mut EditContext<'_>) {
        if self.drag.take().is_none() {
            return;
        }
        ctx.set_dragging(false);
        let Some(active) = ctx.active_in(Mode::Edit) else {
            return;
        };
        self.sync_shape(ctx.scene, active);
        self.emit_editing(ctx, active);
        self.rebuild_midpoints(ctx, active);
    }

    fn edit_right_click(&mut self, ctx: &mut EditContext<'_>, input: &PointerInput) {
        let Some(active) = ctx.active_in(Mode::Edit) else {
            return;
        };
        let Some(picked) = ctx.scene.pick(input.position, None) else {
            return;
        };
        if picked == active {
            ctx.notify(DrawEvent::Delete {
                geometry: active,
                kind: self.kind,
            });
            self.delete_entity(ctx, active);
            return;
        }

        let Some(set) = self.handles.get_mut(&active) else {
            return;
        };
        let Some(index) = set.vertex_index(picked) else {
            return;
        };
        set.remove(ctx.scene, index);
        let emptied = set.is_empty();
        self.rebuild_midpoints(ctx, active);
        self.sync_shape(ctx.scene, active);
        if emptied {
            ctx.notify(DrawEvent::Delete {
                geometry: active,
                kind: self.kind,
            });
            self.delete_entity(ctx, active);
            ctx.notify(DrawEvent::Editing {
                geometry: active,
                kind: self.kind,
                positions: Vec::new(),
            });
        } else {
            self.emit_editing(ctx, active);
        }
    }
}

impl GeometryEditor for PathEditor {
    fn kind(&self) -> Option<GeometryKind> {
        Some(self.kind)
    }

    fn tracked(&self) -> &[EntityId] {
        &self.tracked
    }

    fn geometry(&self, id: EntityId) -> Option<&Geometry> {
        self.geometries.get(&id)
    }

    fn start_draw(&mut self, ctx: &mut EditContext<'_>, options: DrawOptions) -> DrawResult<EntityId> {
        let id = ctx.scene.add(self.body(&options, Vec::new()));
        self.geometries.insert(id, Geometry::new(id, options, ShapeRule::Live));
        self.handles.insert(id, VertexSet::new());
        self.tracked.push(id);
        self.preview = None;
        self.drag = None;
        ctx.init(Mode::Add, Some(id), self.editor_kind());
        ctx.notify(DrawEvent::StartDraw {
            geometry: id,
            kind: self.kind,
        });
        Ok(id)
    }

    fn draw(&mut self, ctx: &mut EditContext<'_>, options: DrawOptions) -> DrawResult<EntityId> {
        if options.positions.is_empty() {
            return Err(DrawError::InvalidOptions(format!("{} requires positions", self.kind)));
        }
        let positions = options.positions.clone();
        let id = ctx.scene.add(self.body(&options, positions.clone()));

        let mut set = VertexSet::new();
        for &position in &positions {
            set.push(ctx.scene, position, &options.point, false);
        }
        rebuild_or_clear(self.kind, ctx.scene, &mut set, &options.midpoint, false);

        self.geometries.insert(id, Geometry::new(id, options, ShapeRule::Frozen(positions.clone())));
        self.handles.insert(id, set);
        self.tracked.push(id);
        ctx.notify(DrawEvent::FinishDraw {
            geometry: id,
            kind: self.kind,
            positions,
        });
        Ok(id)
    }

    fn start_edit(&mut self, ctx: &mut EditContext<'_>, geometry: EntityId) {
        let (Some(shape), Some(set)) = (self.geometries.get_mut(&geometry), self.handles.get(&geometry)) else {
            return;
        };
        shape.go_live();
        set.set_vertices_visible(ctx.scene, true);
        set.set_midpoints_visible(ctx.scene, true);
        self.drag = None;
        ctx.init(Mode::Edit, Some(geometry), self.editor_kind());
        self.sync_shape(ctx.scene, geometry);
    }

    fn complete_edit(&mut self, ctx: &mut EditContext<'_>) {
        let Some(active) = ctx.active_in(Mode::Edit) else {
            return;
        };
        self.end_drag(ctx);
        if let (Some(geometry), Some(set)) = (self.geometries.get_mut(&active), self.handles.get_mut(&active)) {
            geometry.freeze(set.positions());
            // A drag cut short leaves stale midpoints behind.
            rebuild_or_clear(self.kind, ctx.scene, set, &geometry.options.midpoint, false);
            set.set_vertices_visible(ctx.scene, false);
        }
        self.sync_shape(ctx.scene, active);
        ctx.view();
    }

    fn discard_draw(&mut self, ctx: &mut EditContext<'_>) {
        let Some(active) = ctx.active_in(Mode::Add) else {
            return;
        };
        self.preview = None;
        self.remove_geometry(ctx.scene, active);
        ctx.set_cursor(CursorStyle::Default);
        ctx.view();
    }

    fn delete_entity(&mut self, ctx: &mut EditContext<'_>, geometry: EntityId) -> bool {
        if !self.remove_geometry(ctx.scene, geometry) {
            return false;
        }
        // Other geometries go quietly: the surface keeps its mode.
        if ctx.state.active == Some(geometry) {
            self.preview = None;
            self.end_drag(ctx);
            ctx.view();
        }
        true
    }

    fn handle(&mut self, ctx: &mut EditContext<'_>, mode: Mode, input: &PointerInput) {
        match (mode, input.gesture) {
            (Mode::Add, Gesture::MouseMove) => self.add_mouse_move(ctx, input),
            (Mode::Add, Gesture::LeftClick) => self.add_left_click(ctx, input),
            (Mode::Add, Gesture::LeftDoubleClick) => self.add_double_click(ctx),
            (Mode::Add, Gesture::RightClick) => self.add_right_click(ctx),
            (Mode::Edit, Gesture::LeftClick) => self.edit_left_click(ctx, input),
            (Mode::Edit, Gesture::LeftDown) => self.edit_left_down(ctx, input),
            (Mode::Edit, Gesture::MouseMove) => self.edit_mouse_move(ctx, input),
            (Mode::Edit, Gesture::LeftUp) => self.edit_left_up(ctx),
            (Mode::Edit, Gesture::RightClick) => self.edit_right_click(ctx, input),
            _ => {}
        }
    }

    fn get_nodes(&self, geometry: EntityId) -> Option<&[EntityId]> {
        self.handles.get(&geometry).map(VertexSet::vertices)
    }

    fn get_node_positions(&self, geometry: EntityId) -> Option<&[DVec3]> {
        self.handles.get(&geometry).map(VertexSet::positions)
    }

    fn get_midpoints(&self, geometry: EntityId) -> Option<&[EntityId]> {
        self.handles.get(&geometry).map(VertexSet::midpoints)
    }

    fn insert_node(
        &mut self,
        ctx: &mut EditContext<'_>,
        geometry: EntityId,
        options: NodeOptions,
        index: Option<usize>,
    ) -> Option<EntityId> {
        let position = options.position?;
        let editing = ctx.state.is_active_on(Mode::Edit, geometry) || ctx.state.is_active_on(Mode::Add, geometry);
        let style = self.geometries.get(&geometry)?.options.point.clone();
        if !self.handles.contains_key(&geometry) {
            return None;
        }
        self.end_drag_on(ctx, geometry);
        let set = self.handles.get_mut(&geometry)?;

        let index = index.filter(|&i| i <= set.len()).unwrap_or(set.len());
        let desc = marker(
            position,
            options.point.as_ref().unwrap_or(&style),
            options.label,
            options.show.unwrap_or(editing),
        );
        let node = set.insert(ctx.scene, index, position, desc);
        self.after_node_change(ctx, geometry);
        Some(node)
    }

    fn update_node(
        &mut self,
        ctx: &mut EditContext<'_>,
        geometry: EntityId,
        options: NodeOptions,
        index: usize,
    ) -> Option<EntityId> {
        let editing = ctx.state.is_active_on(Mode::Edit, geometry) || ctx.state.is_active_on(Mode::Add, geometry);
        let style = self.geometries.get(&geometry)?.options.point.clone();
        if self.handles.get(&geometry)?.positions().get(index).is_none() {
            return None;
        }
        // The drag hid the midpoints.
        let dragged = self.end_drag_on(ctx, geometry);
        let set = self.handles.get_mut(&geometry)?;

        let old = *set.positions().get(index)?;
        let position = options.position.unwrap_or(old);
        let desc = marker(
            position,
            options.point.as_ref().unwrap_or(&style),
            options.label,
            options.show.unwrap_or(editing),
        );
        let node = set.replace(ctx.scene, index, position, desc)?;
        if position != old || dragged {
            self.after_node_change(ctx, geometry);
        }
        Some(node)
    }

    fn delete_node(&mut self, ctx: &mut EditContext<'_>, geometry: EntityId, index: Option<usize>) -> Option<DVec3> {
        if self.handles.get(&geometry)?.is_empty() {
            return None;
        }
        self.end_drag_on(ctx, geometry);
        let set = self.handles.get_mut(&geometry)?;
        let last = set.len().checked_sub(1)?;
        let removed = set.remove(ctx.scene, index.map_or(last, |i| i.min(last)))?;

        if set.is_empty() {
            ctx.notify(DrawEvent::Delete {
                geometry,
                kind: self.kind,
            });
            self.delete_entity(ctx, geometry);
        } else {
            self.after_node_change(ctx, geometry);
        }
        Some(removed)
    }
}
