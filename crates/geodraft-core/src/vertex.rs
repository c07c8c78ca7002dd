//! Vertex and midpoint handles of a path geometry.
//!
//! Every position has exactly one marker entity and the two arrays are only
//! ever changed together. Midpoints are derived: they are dropped and rebuilt
//! wholesale whenever the vertex topology changes.

use crate::geometry::{LabelStyle, PointStyle, Topology, midpoints};
use crate::scene::{EntityDesc, EntityId, Scene};
use glam::DVec3;

/// Vertex and midpoint handles of one geometry.
#[derive(Debug, Clone, Default)]
pub struct VertexSet {
    positions: Vec<DVec3>,
    vertices: Vec<EntityId>,
    midpoint_positions: Vec<DVec3>,
    midpoints: Vec<EntityId>,
}

impl VertexSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn positions(&self) -> &[DVec3] {
        &self.positions
    }

    pub fn vertices(&self) -> &[EntityId] {
        &self.vertices
    }

    pub fn midpoint_positions(&self) -> &[DVec3] {
        &self.midpoint_positions
    }

    pub fn midpoints(&self) -> &[EntityId] {
        &self.midpoints
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn last_position(&self) -> Option<DVec3> {
        self.positions.last().copied()
    }

    pub fn vertex_index(&self, entity: EntityId) -> Option<usize> {
        self.vertices.iter().position(|&v| v == entity)
    }

    pub fn midpoint_index(&self, entity: EntityId) -> Option<usize> {
        self.midpoints.iter().position(|&m| m == entity)
    }

    pub fn push(&mut self, scene: &mut dyn Scene, position: DVec3, style: &PointStyle, show: bool) -> EntityId {
        self.insert(scene, self.len(), position, marker(position, style, None, show))
    }

    /// Insert a vertex. `index` past the end appends.
    pub fn insert(&mut self, scene: &mut dyn Scene, index: usize, position: DVec3, desc: EntityDesc) -> EntityId {
        let index = index.min(self.len());
        let entity = scene.add(desc);
        self.positions.insert(index, position);
        self.vertices.insert(index, entity);
        entity
    }

    /// Remove a vertex and its marker.
    pub fn remove(&mut self, scene: &mut dyn Scene, index: usize) -> Option<DVec3> {
        if index >= self.len() {
            return None;
        }
        scene.remove(self.vertices.remove(index));
        Some(self.positions.remove(index))
    }

    /// Move a vertex.
    pub fn set_position(&mut self, scene: &mut dyn Scene, index: usize, position: DVec3) -> bool {
        match self.positions.get_mut(index) {
            Some(slot) => {
                *slot = position;
                scene.set_position(self.vertices[index], position);
                true
            }
            None => false,
        }
    }

    /// Swap the marker of a vertex for a new one.
    pub fn replace(&mut self, scene: &mut dyn Scene, index: usize, position: DVec3, desc: EntityDesc) -> Option<EntityId> {
        if index >= self.len() {
            return None;
        }
        scene.remove(self.vertices[index]);
        let entity = scene.add(desc);
        self.vertices[index] = entity;
        self.positions[index] = position;
        Some(entity)
    }

    pub fn set_vertices_visible(&self, scene: &mut dyn Scene, visible: bool) {
        for &vertex in &self.vertices {
            scene.set_visible(vertex, visible);
        }
    }

    pub fn set_midpoints_visible(&self, scene: &mut dyn Scene, visible: bool) {
        for &mid in &self.midpoints {
            scene.set_visible(mid, visible);
        }
    }

    pub fn clear_midpoints(&mut self, scene: &mut dyn Scene) {
        for mid in self.midpoints.drain(..) {
            scene.remove(mid);
        }
        self.midpoint_positions.clear();
    }

    /// Drop every midpoint and derive a fresh set from the vertices.
    pub fn rebuild_midpoints(&mut self, scene: &mut dyn Scene, topology: Topology, style: &PointStyle, show: bool) {
        self.clear_midpoints(scene);
        self.midpoint_positions = midpoints(&self.positions, topology);
        self.midpoints = self
            .midpoint_positions
            .iter()
            .map(|&p| scene.add(marker(p, style, None, show)))
            .collect();
    }

    /// Turn a midpoint into a vertex between its two parents.
    ///
    /// The midpoint entry is removed, so both arrays stay paired until the
    /// next rebuild. Returns the index of the new vertex.
    pub fn promote_midpoint(&mut self, scene: &mut dyn Scene, index: usize, style: &PointStyle) -> Option<usize> {
        if index >= self.midpoints.len() {
            return None;
        }
        let position = self.midpoint_positions.remove(index);
        scene.remove(self.midpoints.remove(index));
        let vertex = index + 1;
        self.insert(scene, vertex, position, marker(position, style, None, true));
        Some(vertex)
    }

    /// Remove every handle from the scene.
    pub fn destroy(&mut self, scene: &mut dyn Scene) {
        self.clear_midpoints(scene);
        for vertex in self.vertices.drain(..) {
            scene.remove(vertex);
        }
        self.positions.clear();
    }
}

/// Marker description for a handle.
pub fn marker(position: DVec3, style: &PointStyle, label: Option<LabelStyle>, show: bool) -> EntityDesc {
    EntityDesc::Marker {
        position,
        style: style.clone(),
        label,
        show,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::MemoryScene;

    fn square(scene: &mut MemoryScene) -> VertexSet {
        let mut set = VertexSet::new();
        let style = PointStyle::default();
        for p in [
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(10.0, 0.0, 0.0),
            DVec3::new(10.0, 10.0, 0.0),
            DVec3::new(0.0, 10.0, 0.0),
        ] {
            set.push(scene, p, &style, true);
        }
        set
    }

    fn assert_paired(set: &VertexSet) {
        assert_eq!(set.positions().len(), set.vertices().len());
        assert_eq!(set.midpoint_positions().len(), set.midpoints().len());
    }

    #[test]
    fn test_rebuild_midpoints_replaces_entities() {
        let mut scene = MemoryScene::new();
        let mut set = square(&mut scene);
        set.rebuild_midpoints(&mut scene, Topology::Closed, &PointStyle::midpoint(), true);
        let first = set.midpoints().to_vec();
        assert_eq!(first.len(), 4);
        assert_eq!(scene.len(), 8);

        set.rebuild_midpoints(&mut scene, Topology::Open, &PointStyle::midpoint(), true);
        assert_eq!(set.midpoints().len(), 3);
        assert!(first.iter().all(|m| !scene.contains(*m)));
        assert_eq!(scene.len(), 7);
        assert_paired(&set);
    }

    #[test]
    fn test_promote_midpoint() {
        let mut scene = MemoryScene::new();
        let mut set = square(&mut scene);
        set.rebuild_midpoints(&mut scene, Topology::Closed, &PointStyle::midpoint(), true);

        let promoted = set.promote_midpoint(&mut scene, 1, &PointStyle::default()).unwrap();
        assert_eq!(promoted, 2);
        assert_eq!(set.len(), 5);
        assert_eq!(set.positions()[2], DVec3::new(10.0, 5.0, 0.0));
        assert_eq!(set.midpoints().len(), 3);
        assert_paired(&set);

        set.rebuild_midpoints(&mut scene, Topology::Closed, &PointStyle::midpoint(), true);
        assert_eq!(set.midpoints().len(), 5);
    }

    #[test]
    fn test_insert_remove_keep_arrays_paired() {
        let mut scene = MemoryScene::new();
        let mut set = square(&mut scene);

        set.insert(&mut scene, 99, DVec3::ONE, marker(DVec3::ONE, &PointStyle::default(), None, true));
        assert_eq!(set.last_position(), Some(DVec3::ONE));
        assert_eq!(set.remove(&mut scene, 0), Some(DVec3::ZERO));
        assert_eq!(set.remove(&mut scene, 10), None);
        assert_paired(&set);
        assert_eq!(scene.len(), 4);

        set.destroy(&mut scene);
        assert!(set.is_empty());
        assert!(scene.is_empty());
    }

    #[test]
    fn test_replace_and_move() {
        let mut scene = MemoryScene::new();
        let mut set = square(&mut scene);
        let old = set.vertices()[1];

        let new = set.replace(&mut scene, 1, DVec3::splat(3.0), marker(DVec3::splat(3.0), &PointStyle::default(), None, false)).unwrap();
        assert!(!scene.contains(old));
        assert_eq!(set.vertex_index(new), Some(1));
        assert!(set.replace(&mut scene, 7, DVec3::ZERO, marker(DVec3::ZERO, &PointStyle::default(), None, true)).is_none());

        assert!(set.set_position(&mut scene, 1, DVec3::splat(4.0)));
        assert_eq!(scene.position(new), Some(DVec3::splat(4.0)));
    }
}
