//! Single-position markers.
//!
//! A point geometry is its own marker: there are no vertex or midpoint
//! handles, and its shape is always a one-position snapshot.

use super::{EditContext, GeometryEditor};
use crate::controller::{EditorKind, Mode};
use crate::error::{DrawError, DrawResult};
use crate::events::DrawEvent;
use crate::geometry::{DrawOptions, Geometry, GeometryKind, ShapeRule};
use crate::input::{Gesture, PointerInput};
use crate::scene::{CursorStyle, EntityDesc, EntityId};
use glam::DVec3;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub(crate) struct PointEditor {
    geometries: HashMap<EntityId, Geometry>,
    tracked: Vec<EntityId>,
    dragging: bool,
}

impl PointEditor {
    fn marker(options: &DrawOptions, position: DVec3, show: bool) -> EntityDesc {
        EntityDesc::Marker {
            position,
            style: options.point.clone(),
            label: options.label.clone(),
            show,
        }
    }

    /// Move a point and show it, returning its new shape.
    fn place(&mut self, ctx: &mut EditContext<'_>, id: EntityId, position: DVec3) -> Vec<DVec3> {
        let Some(geometry) = self.geometries.get_mut(&id) else {
            return Vec::new();
        };
        geometry.freeze(&[position]);
        ctx.scene.set_position(id, position);
        ctx.scene.set_visible(id, geometry.options.show);
        vec![position]
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
        let positions = self.place(ctx, id, world);
        ctx.notify(DrawEvent::Drawing {
            geometry: id,
            kind: GeometryKind::Point,
            positions,
        });
    }

    fn add_left_click(&mut self, ctx: &mut EditContext<'_>, input: &PointerInput) {
        let Some(world) = ctx.scene.pick_world(input.position) else {
            return;
        };
        let Some(id) = ctx.active_in(Mode::Add) else {
            return;
        };
        let positions = self.place(ctx, id, world);
        ctx.notify(DrawEvent::FinishDraw {
            geometry: id,
            kind: GeometryKind::Point,
            positions,
        });
        ctx.set_cursor(CursorStyle::Default);
        ctx.view();
    }

    fn edit_left_click(&mut self, ctx: &mut EditContext<'_>, input: &PointerInput) {
        if self.dragging {
            return;
        }
        let Some(active) = ctx.active_in(Mode::Edit) else {
            return;
        };
        match ctx.scene.pick(input.position, None) {
            None => self.finish_edit(ctx),
            Some(picked) if picked == active => {}
            Some(picked) => self.finish_edit_then(ctx, Some(picked)),
        }
    }

    fn edit_left_down(&mut self, ctx: &mut EditContext<'_>, input: &PointerInput) {
        let Some(active) = ctx.active_in(Mode::Edit) else {
            return;
        };
        if ctx.scene.pick(input.position, None) == Some(active) {
            self.dragging = true;
            ctx.set_dragging(true);
        }
    }

    fn edit_mouse_move(&mut self, ctx: &mut EditContext<'_>, input: &PointerInput) {
        if !self.dragging {
            ctx.hover(input.position);
            return;
        }
        let (Some(active), Some(world)) = (ctx.active_in(Mode::Edit), ctx.scene.pick_world(input.position)) else {
            return;
        };
        let positions = self.place(ctx, active, world);
        ctx.notify(DrawEvent::Editing {
            geometry: active,
            kind: GeometryKind::Point,
            positions,
        });
    }

    fn edit_left_up(&mut self, ctx: &mut EditContext<'_>) {
        if !self.dragging {
            return;
        }
        self.dragging = false;
        ctx.set_dragging(false);
        if let Some(active) = ctx.active_in(Mode::Edit) {
            let positions = self.positions_of(active);
            ctx.notify(DrawEvent::Editing {
                geometry: active,
                kind: GeometryKind::Point,
                positions,
            });
        }
    }

    fn edit_right_click(&mut self, ctx: &mut EditContext<'_>, input: &PointerInput) {
        let Some(active) = ctx.active_in(Mode::Edit) else {
            return;
        };
        if ctx.scene.pick(input.position, None) == Some(active) {
            ctx.notify(DrawEvent::Delete {
                geometry: active,
                kind: GeometryKind::Point,
            });
            self.delete_entity(ctx, active);
        }
    }
}

impl GeometryEditor for PointEditor {
    fn kind(&self) -> Option<GeometryKind> {
        Some(GeometryKind::Point)
    }

    fn tracked(&self) -> &[EntityId] {
        &self.tracked
    }

    fn geometry(&self, id: EntityId) -> Option<&Geometry> {
        self.geometries.get(&id)
    }

    fn start_draw(&mut self, ctx: &mut EditContext<'_>, options: DrawOptions) -> DrawResult<EntityId> {
        // Hidden until the pointer first moves over the globe.
        let id = ctx.scene.add(Self::marker(&options, options.position.unwrap_or(DVec3::ZERO), false));
        self.geometries.insert(id, Geometry::new(id, options, ShapeRule::Frozen(Vec::new())));
        self.tracked.push(id);
        self.dragging = false;
        ctx.init(Mode::Add, Some(id), EditorKind::Point);
        ctx.notify(DrawEvent::StartDraw {
            geometry: id,
            kind: GeometryKind::Point,
        });
        Ok(id)
    }

    fn draw(&mut self, ctx: &mut EditContext<'_>, options: DrawOptions) -> DrawResult<EntityId> {
        let position = options
            .position
            .ok_or_else(|| DrawError::InvalidOptions("point requires a position".to_string()))?;
        let id = ctx.scene.add(Self::marker(&options, position, options.show));
        self.geometries.insert(id, Geometry::new(id, options, ShapeRule::Frozen(vec![position])));
        self.tracked.push(id);
        ctx.notify(DrawEvent::FinishDraw {
            geometry: id,
            kind: GeometryKind::Point,
            positions: vec![position],
        });
        Ok(id)
    }

    fn start_edit(&mut self, ctx: &mut EditContext<'_>, geometry: EntityId) {
        if self.geometries.contains_key(&geometry) {
            self.dragging = false;
            ctx.init(Mode::Edit, Some(geometry), EditorKind::Point);
        }
    }

    fn complete_edit(&mut self, ctx: &mut EditContext<'_>) {
        if ctx.active_in(Mode::Edit).is_none() {
            return;
        }
        if self.dragging {
            self.dragging = false;
            ctx.set_dragging(false);
        }
        ctx.view();
    }

    fn discard_draw(&mut self, ctx: &mut EditContext<'_>) {
        let Some(id) = ctx.active_in(Mode::Add) else {
            return;
        };
        self.geometries.remove(&id);
        self.tracked.retain(|&tracked| tracked != id);
        ctx.scene.remove(id);
        ctx.set_cursor(CursorStyle::Default);
        ctx.view();
    }

    fn delete_entity(&mut self, ctx: &mut EditContext<'_>, geometry: EntityId) -> bool {
        if self.geometries.remove(&geometry).is_none() {
            return false;
        }
        ctx.scene.remove(geometry);
        self.tracked.retain(|&id| id != geometry);
        if ctx.state.active == Some(geometry) {
            if self.dragging {
                self.dragging = false;
                ctx.set_dragging(false);
            }
            ctx.view();
        }
        true
    }

    fn handle(&mut self, ctx: &mut EditContext<'_>, mode: Mode, input: &PointerInput) {
        match (mode, input.gesture) {
            (Mode::Add, Gesture::MouseMove) => self.add_mouse_move(ctx, input),
            (Mode::Add, Gesture::LeftClick) => self.add_left_click(ctx, input),
            (Mode::Add, Gesture::RightClick) => self.cancel_draw(ctx),
            (Mode::Edit, Gesture::LeftClick) => self.edit_left_click(ctx, input),
            (Mode::Edit, Gesture::LeftDown) => self.edit_left_down(ctx, input),
            (Mode::Edit, Gesture::MouseMove) => self.edit_mouse_move(ctx, input),
            (Mode::Edit, Gesture::LeftUp) => self.edit_left_up(ctx),
            (Mode::Edit, Gesture::RightClick) => self.edit_right_click(ctx, input),
            _ => {}
        }
    }

    fn get_nodes(&self, geometry: EntityId) -> Option<&[EntityId]> {
        self.geometries.get(&geometry).map(|g| std::slice::from_ref(&g.id))
    }

    fn get_node_positions(&self, geometry: EntityId) -> Option<&[DVec3]> {
        self.geometries.get(&geometry).map(|g| g.shape(&[]))
    }
}
