//! Debounced hover picking.
//!
//! Pointer moves in view mode are coalesced: each move replaces the pending
//! pick, and the pick only runs once the pointer has rested for the debounce
//! window.

use crate::coordinator::SurfaceId;
use crate::scene::EntityId;
use kurbo::Point;
use std::time::{Duration, Instant};

/// Pixel tolerance of hover picks.
pub const HOVER_PICK_TOLERANCE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingPick {
    surface: SurfaceId,
    position: Point,
    due: Instant,
}

#[derive(Debug, Clone)]
pub(crate) struct HoverDebounce {
    window: Duration,
    pending: Option<PendingPick>,
    /// Entity under the pointer after the last pick.
    hovered: Option<EntityId>,
}

impl HoverDebounce {
    pub(crate) fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            hovered: None,
        }
    }

    /// Schedule a pick, replacing any pick still waiting.
    pub(crate) fn schedule(&mut self, surface: SurfaceId, position: Point, now: Instant) {
        self.pending = Some(PendingPick {
            surface,
            position,
            due: now + self.window,
        });
    }

    /// Take the pending pick if its window has elapsed.
    pub(crate) fn take_due(&mut self, now: Instant) -> Option<(SurfaceId, Point)> {
        match self.pending {
            Some(pick) if pick.due <= now => {
                self.pending = None;
                Some((pick.surface, pick.position))
            }
            _ => None,
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn forget_surface(&mut self, surface: SurfaceId) {
        if self.pending.is_some_and(|pick| pick.surface == surface) {
            self.pending = None;
        }
    }

    /// Record the hovered entity. Returns whether it changed.
    pub(crate) fn update_hovered(&mut self, entity: Option<EntityId>) -> bool {
        let changed = self.hovered != entity;
        self.hovered = entity;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_move_wins() {
        let mut hover = HoverDebounce::new(Duration::from_millis(15));
        let start = Instant::now();
        let surface = SurfaceId::new(0);

        hover.schedule(surface, Point::new(1.0, 1.0), start);
        hover.schedule(surface, Point::new(2.0, 2.0), start + Duration::from_millis(10));

        assert_eq!(hover.take_due(start + Duration::from_millis(20)), None);
        assert_eq!(
            hover.take_due(start + Duration::from_millis(25)),
            Some((surface, Point::new(2.0, 2.0)))
        );
        assert!(!hover.is_pending());
    }

    #[test]
    fn test_hovered_changes() {
        let mut hover = HoverDebounce::new(Duration::ZERO);
        let entity = uuid::Uuid::new_v4();
        assert!(!hover.update_hovered(None));
        assert!(hover.update_hovered(Some(entity)));
        assert!(!hover.update_hovered(Some(entity)));
        assert!(hover.update_hovered(None));
    }

    #[test]
    fn test_forget_surface() {
        let mut hover = HoverDebounce::new(Duration::ZERO);
        let now = Instant::now();
        hover.schedule(SurfaceId::new(1), Point::ZERO, now);
        hover.forget_surface(SurfaceId::new(0));
        assert!(hover.is_pending());
        hover.forget_surface(SurfaceId::new(1));
        assert!(!hover.is_pending());
    }
}
