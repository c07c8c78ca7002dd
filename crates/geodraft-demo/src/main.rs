//! Scripted drawing session on two in-memory surfaces.
//!
//! Run with `RUST_LOG=info` (or `debug` for mode changes) to follow along.

use geodraft_core::{
    Coordinator, CoordinatorConfig, DrawOptions, DrawResult, EventTopic, GeometryKind, InputTranslator, MemoryScene,
    MouseButton, PointerEvent, SurfaceId, SurfaceSettings,
};
use glam::DVec3;
use kurbo::Point;
use std::time::{Duration, Instant};

fn main() -> DrawResult<()> {
    env_logger::init();
    log::info!("Starting GeoDraft demo");
    run()
}

/// Feeds raw pointer events through a translator, a few milliseconds apart.
struct Pointer {
    translator: InputTranslator,
    clock: Instant,
}

impl Pointer {
    fn new() -> Self {
        Self {
            translator: InputTranslator::new(),
            clock: Instant::now(),
        }
    }

    fn send(&mut self, coordinator: &mut Coordinator<MemoryScene>, surface: SurfaceId, event: PointerEvent) -> DrawResult<()> {
        self.clock += Duration::from_millis(40);
        for input in self.translator.translate_at(event, self.clock) {
            coordinator.handle_input(surface, input)?;
        }
        Ok(())
    }

    fn move_to(&mut self, coordinator: &mut Coordinator<MemoryScene>, surface: SurfaceId, x: f64, y: f64) -> DrawResult<()> {
        self.send(coordinator, surface, PointerEvent::Move { position: Point::new(x, y) })
    }

    fn click(
        &mut self,
        coordinator: &mut Coordinator<MemoryScene>,
        surface: SurfaceId,
        button: MouseButton,
        x: f64,
        y: f64,
    ) -> DrawResult<()> {
        let position = Point::new(x, y);
        self.send(coordinator, surface, PointerEvent::Down { position, button })?;
        self.send(coordinator, surface, PointerEvent::Up { position, button })
    }

    fn drag(
        &mut self,
        coordinator: &mut Coordinator<MemoryScene>,
        surface: SurfaceId,
        from: Point,
        to: Point,
    ) -> DrawResult<()> {
        let button = MouseButton::Left;
        self.send(coordinator, surface, PointerEvent::Down { position: from, button })?;
        self.send(coordinator, surface, PointerEvent::Move { position: to })?;
        self.send(coordinator, surface, PointerEvent::Up { position: to, button })
    }

    /// Let the double-click window lapse.
    fn pause(&mut self) {
        self.clock += Duration::from_secs(1);
    }
}

fn subscribe(coordinator: &mut Coordinator<MemoryScene>, surface: SurfaceId) -> DrawResult<()> {
    for topic in EventTopic::ALL {
        coordinator.on(surface, topic, move |event| {
            match event.positions() {
                Some(positions) => log::info!("{surface} {topic}: {} vertices", positions.len()),
                None => log::info!("{surface} {topic}"),
            }
        })?;
    }
    Ok(())
}

fn run() -> DrawResult<()> {
    let mut coordinator = Coordinator::new(CoordinatorConfig::default());
    let west = coordinator.register(MemoryScene::new(), SurfaceSettings::default());
    let east = coordinator.register_with_options(
        MemoryScene::new(),
        Some(&serde_json::json!({ "show_frame_rate": false })),
    )?;
    subscribe(&mut coordinator, west)?;
    subscribe(&mut coordinator, east)?;
    let mut pointer = Pointer::new();

    // Draw a triangle with three clicks and a double-click on the last vertex.
    let triangle = coordinator.start_draw(west, DrawOptions::new(GeometryKind::Polygon))?;
    for (x, y) in [(100.0, 100.0), (300.0, 100.0)] {
        pointer.move_to(&mut coordinator, west, x, y)?;
        pointer.click(&mut coordinator, west, MouseButton::Left, x, y)?;
        pointer.pause();
    }
    pointer.move_to(&mut coordinator, west, 200.0, 300.0)?;
    pointer.click(&mut coordinator, west, MouseButton::Left, 200.0, 300.0)?;
    pointer.click(&mut coordinator, west, MouseButton::Left, 200.0, 300.0)?;
    pointer.pause();
    log::info!(
        "triangle committed with {} vertices, {} midpoints",
        coordinator.get_nodes(triangle).map_or(0, <[_]>::len),
        coordinator.get_midpoints(triangle).map_or(0, <[_]>::len),
    );

    // Click the body to edit it, then drag the first midpoint outwards.
    pointer.click(&mut coordinator, west, MouseButton::Left, 200.0, 150.0)?;
    pointer.pause();
    pointer.drag(&mut coordinator, west, Point::new(200.0, 100.0), Point::new(200.0, 40.0))?;
    log::info!(
        "after midpoint drag: {:?}",
        coordinator.get_node_positions(triangle).unwrap_or_default()
    );

    // Start a polyline on the other surface while the triangle is still edited.
    let route = coordinator.start_draw(east, DrawOptions::new(GeometryKind::Polyline))?;
    pointer.click(&mut coordinator, east, MouseButton::Left, 50.0, 50.0)?;
    pointer.pause();
    pointer.click(&mut coordinator, east, MouseButton::Left, 400.0, 80.0)?;
    pointer.pause();

    // Editing the triangle again cancels the unfinished polyline.
    coordinator.start_edit(west, triangle, None)?;
    log::info!(
        "polyline {} discarded: {}",
        route,
        coordinator.find_drawer(route).is_none()
    );
    pointer.click(&mut coordinator, west, MouseButton::Right, 300.0, 100.0)?;
    coordinator.finish_edit();

    // A point placed from data, then hovered.
    let marker = coordinator.draw(
        east,
        DrawOptions::new(GeometryKind::Point).with_position(DVec3::new(600.0, 600.0, 0.0)),
    )?;
    pointer.move_to(&mut coordinator, east, 601.0, 600.0)?;
    coordinator.tick_at(Instant::now() + coordinator.config().hover_debounce());
    if let Some(cursor) = coordinator.take_cursor_change() {
        log::info!("cursor over {marker}: {}", cursor.as_str());
    }

    for surface in [west, east] {
        for kind in GeometryKind::ALL {
            log::info!("{surface} tracks {} {kind}(s)", coordinator.tracked(surface, kind).len());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_session_succeeds() {
        assert!(run().is_ok());
    }
}
