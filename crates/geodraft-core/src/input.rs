//! Pointer gestures, input bindings and raw pointer translation.

use crate::controller::{EditorKind, Mode};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;

/// The pointer gestures the overlay reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gesture {
    LeftClick,
    LeftDoubleClick,
    LeftDown,
    LeftUp,
    RightClick,
    MouseMove,
}

impl Gesture {
    pub const ALL: [Gesture; 6] = [
        Gesture::LeftClick,
        Gesture::LeftDoubleClick,
        Gesture::LeftDown,
        Gesture::LeftUp,
        Gesture::RightClick,
        Gesture::MouseMove,
    ];
}

/// Keyboard modifier held during a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modifier {
    Shift,
    Ctrl,
    Alt,
}

/// A gesture delivered to a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub gesture: Gesture,
    /// Pointer position in screen coordinates. For moves this is the end position.
    pub position: Point,
    /// Start position of a move.
    pub previous: Option<Point>,
    pub modifier: Option<Modifier>,
}

impl PointerInput {
    pub fn new(gesture: Gesture, position: Point) -> Self {
        Self {
            gesture,
            position,
            previous: None,
            modifier: None,
        }
    }

    pub fn left_click(position: Point) -> Self {
        Self::new(Gesture::LeftClick, position)
    }

    pub fn double_click(position: Point) -> Self {
        Self::new(Gesture::LeftDoubleClick, position)
    }

    pub fn left_down(position: Point) -> Self {
        Self::new(Gesture::LeftDown, position)
    }

    pub fn left_up(position: Point) -> Self {
        Self::new(Gesture::LeftUp, position)
    }

    pub fn right_click(position: Point) -> Self {
        Self::new(Gesture::RightClick, position)
    }

    pub fn mouse_move(from: Point, to: Point) -> Self {
        Self {
            previous: Some(from),
            ..Self::new(Gesture::MouseMove, to)
        }
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifier = Some(modifier);
        self
    }
}

/// Where a bound gesture is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The handler table of an editor for a mode.
    Editor { kind: EditorKind, mode: Mode },
    /// Coordinator view-mode click resolution.
    ViewClick,
    /// Coordinator debounced hover feedback.
    Hover,
    /// Reset every surface to view mode.
    ResetAll,
}

/// One route per `(gesture, modifier)` pair.
#[derive(Debug, Clone, Default)]
pub struct InputBindings {
    routes: HashMap<(Gesture, Option<Modifier>), Route>,
}

impl InputBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a gesture, returning the route it replaced.
    pub fn bind(&mut self, gesture: Gesture, modifier: Option<Modifier>, route: Route) -> Option<Route> {
        self.routes.insert((gesture, modifier), route)
    }

    /// Remove every binding of a gesture, whatever its modifier.
    pub fn unbind(&mut self, gesture: Gesture) {
        self.routes.retain(|(bound, _), _| *bound != gesture);
    }

    /// Route bound to exactly this gesture and modifier.
    pub fn route(&self, gesture: Gesture, modifier: Option<Modifier>) -> Option<Route> {
        self.routes.get(&(gesture, modifier)).copied()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    /// The modifier a binding is looked up with. Shift wins over Ctrl over Alt.
    pub fn primary(&self) -> Option<Modifier> {
        if self.shift {
            Some(Modifier::Shift)
        } else if self.ctrl {
            Some(Modifier::Ctrl)
        } else if self.alt {
            Some(Modifier::Alt)
        } else {
            None
        }
    }
}

/// Raw pointer event from the host window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Up { position: Point, button: MouseButton },
    Move { position: Point },
}

/// Double-click detection constants.
const DOUBLE_CLICK_TIME_MS: u128 = 500;
const DOUBLE_CLICK_DISTANCE: f64 = 5.0;
/// A press and release further apart than this is a drag, not a click.
const CLICK_DISTANCE: f64 = 5.0;

/// Turns raw pointer events into gestures.
#[derive(Debug, Clone)]
pub struct InputTranslator {
    /// Current pointer position in screen coordinates.
    pub pointer_position: Point,
    pub modifiers: Modifiers,
    /// Button held down and where it was pressed.
    press: Option<(MouseButton, Point)>,
    last_click_time: Option<Instant>,
    last_click_position: Option<Point>,
}

impl Default for InputTranslator {
    fn default() -> Self {
        Self {
            pointer_position: Point::ZERO,
            modifiers: Modifiers::default(),
            press: None,
            last_click_time: None,
            last_click_position: None,
        }
    }
}

impl InputTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    pub fn translate(&mut self, event: PointerEvent) -> Vec<PointerInput> {
        self.translate_at(event, Instant::now())
    }

    /// Translate an event that happened at `now`.
    pub fn translate_at(&mut self, event: PointerEvent, now: Instant) -> Vec<PointerInput> {
        let modifier = self.modifiers.primary();
        let gesture = |gesture, position| PointerInput {
            modifier,
            ..PointerInput::new(gesture, position)
        };
        let mut out = Vec::new();

        match event {
            PointerEvent::Down { position, button } => {
                self.pointer_position = position;
                self.press = Some((button, position));
                if button == MouseButton::Left {
                    out.push(gesture(Gesture::LeftDown, position));
                }
            }
            PointerEvent::Up { position, button } => {
                self.pointer_position = position;
                let clicked = match self.press.take() {
                    Some((pressed, at)) => pressed == button && at.distance(position) <= CLICK_DISTANCE,
                    None => false,
                };
                match button {
                    MouseButton::Left => {
                        out.push(gesture(Gesture::LeftUp, position));
                        if clicked {
                            out.push(gesture(Gesture::LeftClick, position));
                            if self.is_double_click(position, now) {
                                out.push(gesture(Gesture::LeftDoubleClick, position));
                            }
                        }
                    }
                    MouseButton::Right if clicked => out.push(gesture(Gesture::RightClick, position)),
                    _ => {}
                }
            }
            PointerEvent::Move { position } => {
                let previous = self.pointer_position;
                self.pointer_position = position;
                out.push(PointerInput {
                    previous: Some(previous),
                    ..gesture(Gesture::MouseMove, position)
                });
            }
        }
        out
    }

    fn is_double_click(&mut self, position: Point, now: Instant) -> bool {
        if let (Some(last_time), Some(last_pos)) = (self.last_click_time, self.last_click_position) {
            let elapsed = now.saturating_duration_since(last_time).as_millis();
            if elapsed < DOUBLE_CLICK_TIME_MS && last_pos.distance(position) < DOUBLE_CLICK_DISTANCE {
                // A third click starts a new pair.
                self.last_click_time = None;
                self.last_click_position = None;
                return true;
            }
        }
        self.last_click_time = Some(now);
        self.last_click_position = Some(position);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn gestures(inputs: &[PointerInput]) -> Vec<Gesture> {
        inputs.iter().map(|i| i.gesture).collect()
    }

    fn click(translator: &mut InputTranslator, at: Point, now: Instant) -> Vec<Gesture> {
        let mut out = translator.translate_at(PointerEvent::Down { position: at, button: MouseButton::Left }, now);
        out.extend(translator.translate_at(PointerEvent::Up { position: at, button: MouseButton::Left }, now));
        gestures(&out)
    }

    #[test]
    fn test_unbind_removes_every_modifier() {
        let mut bindings = InputBindings::new();
        bindings.bind(Gesture::LeftDoubleClick, None, Route::ViewClick);
        bindings.bind(Gesture::LeftDoubleClick, Some(Modifier::Shift), Route::ResetAll);
        bindings.bind(Gesture::MouseMove, None, Route::Hover);

        assert_eq!(bindings.route(Gesture::LeftDoubleClick, Some(Modifier::Shift)), Some(Route::ResetAll));
        assert_eq!(bindings.route(Gesture::LeftDoubleClick, Some(Modifier::Ctrl)), None);

        bindings.unbind(Gesture::LeftDoubleClick);
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings.route(Gesture::MouseMove, None), Some(Route::Hover));
    }

    #[test]
    fn test_bind_replaces() {
        let mut bindings = InputBindings::new();
        assert_eq!(bindings.bind(Gesture::LeftClick, None, Route::ViewClick), None);
        assert_eq!(bindings.bind(Gesture::LeftClick, None, Route::Hover), Some(Route::ViewClick));
        assert_eq!(bindings.len(), 1);
    }

    #[test]
    fn test_click_and_double_click() {
        let mut translator = InputTranslator::new();
        let start = Instant::now();
        let at = Point::new(10.0, 10.0);

        assert_eq!(click(&mut translator, at, start), vec![Gesture::LeftDown, Gesture::LeftUp, Gesture::LeftClick]);
        assert_eq!(
            click(&mut translator, at, start + Duration::from_millis(200)),
            vec![Gesture::LeftDown, Gesture::LeftUp, Gesture::LeftClick, Gesture::LeftDoubleClick]
        );
        // Third click does not pair with the second.
        assert_eq!(
            click(&mut translator, at, start + Duration::from_millis(300)),
            vec![Gesture::LeftDown, Gesture::LeftUp, Gesture::LeftClick]
        );
    }

    #[test]
    fn test_slow_clicks_are_not_double() {
        let mut translator = InputTranslator::new();
        let start = Instant::now();
        let at = Point::new(10.0, 10.0);
        click(&mut translator, at, start);
        assert!(!click(&mut translator, at, start + Duration::from_millis(600)).contains(&Gesture::LeftDoubleClick));
    }

    #[test]
    fn test_drag_is_not_a_click() {
        let mut translator = InputTranslator::new();
        let now = Instant::now();
        translator.translate_at(PointerEvent::Down { position: Point::new(0.0, 0.0), button: MouseButton::Left }, now);
        let moved = translator.translate_at(PointerEvent::Move { position: Point::new(40.0, 0.0) }, now);
        assert_eq!(moved[0].previous, Some(Point::new(0.0, 0.0)));

        let up = translator.translate_at(PointerEvent::Up { position: Point::new(40.0, 0.0), button: MouseButton::Left }, now);
        assert_eq!(gestures(&up), vec![Gesture::LeftUp]);
    }

    #[test]
    fn test_right_click_and_modifiers() {
        let mut translator = InputTranslator::new();
        translator.set_modifiers(Modifiers { shift: true, ..Modifiers::default() });
        let now = Instant::now();
        let at = Point::new(5.0, 5.0);

        assert!(translator.translate_at(PointerEvent::Down { position: at, button: MouseButton::Right }, now).is_empty());
        let up = translator.translate_at(PointerEvent::Up { position: at, button: MouseButton::Right }, now);
        assert_eq!(up.len(), 1);
        assert_eq!(up[0].gesture, Gesture::RightClick);
        assert_eq!(up[0].modifier, Some(Modifier::Shift));
    }
}
