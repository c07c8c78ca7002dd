use super::{EditContext, GeometryEditor};
use crate::controller::Mode;
use crate::error::{DrawError, DrawResult};
use crate::geometry::{DrawOptions, Geometry, GeometryKind};
use crate::input::PointerInput;
use crate::scene::EntityId;
use glam::DVec3;

/// Editor active while nothing is drawn or edited. Every operation is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct InitialEditor;

impl GeometryEditor for InitialEditor {
    fn kind(&self) -> Option<GeometryKind> {
        None
    }

    fn tracked(&self) -> &[EntityId] {
        &[]
    }

    fn geometry(&self, _id: EntityId) -> Option<&Geometry> {
        None
    }

    fn start_draw(&mut self, _ctx: &mut EditContext<'_>, _options: DrawOptions) -> DrawResult<EntityId> {
        Err(DrawError::MissingKind)
    }

    fn draw(&mut self, _ctx: &mut EditContext<'_>, _options: DrawOptions) -> DrawResult<EntityId> {
        Err(DrawError::MissingKind)
    }

    fn start_edit(&mut self, _ctx: &mut EditContext<'_>, _geometry: EntityId) {}

    fn complete_edit(&mut self, _ctx: &mut EditContext<'_>) {}

    fn discard_draw(&mut self, _ctx: &mut EditContext<'_>) {}

    fn delete_entity(&mut self, _ctx: &mut EditContext<'_>, _geometry: EntityId) -> bool {
        false
    }

    fn handle(&mut self, _ctx: &mut EditContext<'_>, _mode: Mode, _input: &PointerInput) {}

    fn get_nodes(&self, _geometry: EntityId) -> Option<&[EntityId]> {
        None
    }

    fn get_node_positions(&self, _geometry: EntityId) -> Option<&[DVec3]> {
        None
    }
}
