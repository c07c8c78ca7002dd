//! Cross-surface coordination.
//!
//! The [`Coordinator`] owns every registered surface. It resolves which
//! surface and editor own a picked entity, keeps at most one geometry drawn or
//! edited across all surfaces, runs the debounced hover loop and parks
//! transitions that wait on asynchronous subscriber replies.
//!
//! Editors never call back into the coordinator. They queue [`Request`]s,
//! which the coordinator drains after every public call.

use crate::config::{CoordinatorConfig, SurfaceSettings};
use crate::controller::{ControllerState, EditorKind, Mode, SurfaceController};
use crate::editor::{EditContext, GeometryEditor};
use crate::error::{DrawError, DrawResult};
use crate::events::{BoxFuture, DrawEvent, EventTopic, Reply, Verdict};
use crate::geometry::{DrawOptions, Geometry, GeometryKind, NodeOptions};
use crate::hover::{HOVER_PICK_TOLERANCE, HoverDebounce};
use crate::input::{PointerInput, Route};
use crate::scene::{CursorStyle, EntityId, Scene};
use glam::DVec3;
use kurbo::Point;
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt;
use std::task::{Context, Poll, Waker};
use std::time::Instant;

/// Handle of a registered surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(usize);

impl SurfaceId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// Work an editor hands back to the coordinator.
pub(crate) enum Request {
    /// A surface went through `init` and is now the globally active one.
    Activate { surface: SurfaceId, mode: Mode },
    Cursor(CursorStyle),
    Hover { surface: SurfaceId, position: Point },
    /// Emit a vetoable event and run `then` unless it is aborted.
    Ask {
        surface: SurfaceId,
        event: DrawEvent,
        then: Continuation,
    },
    /// A pending notification reply to poll to completion.
    Detach(BoxFuture<'static, Verdict>),
}

/// The transition behind a vetoable event.
///
/// Each variant re-checks its precondition when it runs, since a deferred
/// reply may resolve after the state moved on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Continuation {
    FinishEdit {
        geometry: EntityId,
        handoff: Option<EntityId>,
    },
    CancelDraw {
        geometry: EntityId,
    },
    StartEdit {
        geometry: EntityId,
    },
}

struct Deferred {
    surface: SurfaceId,
    future: BoxFuture<'static, Verdict>,
    then: Continuation,
}

/// Registry of every drawing surface.
pub struct Coordinator<S: Scene> {
    config: CoordinatorConfig,
    controllers: Vec<Option<SurfaceController<S>>>,
    active: Option<SurfaceId>,
    global_mode: Mode,
    cursor: CursorStyle,
    cursor_changed: bool,
    hover: HoverDebounce,
    requests: VecDeque<Request>,
    deferred: Vec<Deferred>,
    detached: Vec<BoxFuture<'static, Verdict>>,
}

impl<S: Scene> Default for Coordinator<S> {
    fn default() -> Self {
        Self::new(CoordinatorConfig::default())
    }
}

impl<S: Scene> Coordinator<S> {
    pub fn new(config: CoordinatorConfig) -> Self {
        let hover = HoverDebounce::new(config.hover_debounce());
        Self {
            config,
            controllers: Vec::new(),
            active: None,
            global_mode: Mode::View,
            cursor: CursorStyle::Default,
            cursor_changed: false,
            hover,
            requests: VecDeque::new(),
            deferred: Vec::new(),
            detached: Vec::new(),
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Register a surface.
    pub fn register(&mut self, scene: S, settings: SurfaceSettings) -> SurfaceId {
        settings.warn_deprecated();
        self.insert(scene, settings)
    }

    /// Register a surface with JSON settings.
    pub fn register_with_options(&mut self, scene: S, options: Option<&Value>) -> DrawResult<SurfaceId> {
        let settings = SurfaceSettings::from_value(options)?;
        Ok(self.insert(scene, settings))
    }

    fn insert(&mut self, scene: S, settings: SurfaceSettings) -> SurfaceId {
        let id = SurfaceId(self.controllers.len());
        self.controllers.push(Some(SurfaceController::new(id, scene, settings)));
        if self.active.is_none() {
            self.active = Some(id);
        }
        log::info!("registered {id}");
        id
    }

    /// Remove a surface, returning its scene.
    pub fn unregister(&mut self, surface: SurfaceId) -> Option<S> {
        let controller = self.controllers.get_mut(surface.0)?.take()?;
        if self.active == Some(surface) {
            self.active = None;
            self.global_mode = Mode::View;
        }
        if controller.state.mode != Mode::View {
            log::debug!("{surface} unregistered while in {} mode", controller.state.mode);
        }
        self.hover.forget_surface(surface);
        self.deferred.retain(|d| d.surface != surface);
        log::info!("unregistered {surface}");
        Some(controller.scene)
    }

    pub fn surfaces(&self) -> impl Iterator<Item = SurfaceId> + '_ {
        self.controllers.iter().flatten().map(|c| c.id)
    }

    fn controller(&self, surface: SurfaceId) -> Option<&SurfaceController<S>> {
        self.controllers.get(surface.0)?.as_ref()
    }

    fn controller_mut(&mut self, surface: SurfaceId) -> Option<&mut SurfaceController<S>> {
        self.controllers.get_mut(surface.0)?.as_mut()
    }

    fn require(&self, surface: SurfaceId) -> DrawResult<&SurfaceController<S>> {
        self.controller(surface).ok_or(DrawError::UnknownSurface(surface))
    }

    /// Run `f` on an editor of a surface. `None` picks the surface's active editor.
    fn with_editor<R>(
        &mut self,
        surface: SurfaceId,
        kind: Option<EditorKind>,
        f: impl FnOnce(&mut dyn GeometryEditor, &mut EditContext<'_>) -> R,
    ) -> Option<R> {
        let controller = self.controllers.get_mut(surface.0)?.as_mut()?;
        let kind = kind.unwrap_or(controller.state.kind);
        Some(controller.with_editor(kind, &mut self.requests, f))
    }

    /// Emit a notification on a surface without consulting the reply.
    fn notify(&mut self, surface: SurfaceId, event: DrawEvent) {
        let Some(controller) = self.controllers.get_mut(surface.0).and_then(Option::as_mut) else {
            return;
        };
        if let Reply::Pending(future) = controller.events.emit(&event) {
            self.detached.push(future);
        }
    }

    // --- subscriptions ---

    /// Subscribe to a topic on a surface, replacing any previous subscriber.
    pub fn on<F, R>(&mut self, surface: SurfaceId, topic: EventTopic, callback: F) -> DrawResult<()>
    where
        F: FnMut(&DrawEvent) -> R + 'static,
        R: Into<Reply>,
    {
        let controller = self.controller_mut(surface).ok_or(DrawError::UnknownSurface(surface))?;
        controller.events.on(topic, callback);
        Ok(())
    }

    pub fn off(&mut self, surface: SurfaceId, topic: EventTopic) -> DrawResult<bool> {
        let controller = self.controller_mut(surface).ok_or(DrawError::UnknownSurface(surface))?;
        Ok(controller.events.off(topic))
    }

    // --- drawing API ---

    /// Start drawing a geometry interactively on a surface.
    ///
    /// Whatever is drawn or edited anywhere is cancelled or finished first.
    pub fn start_draw(&mut self, surface: SurfaceId, options: DrawOptions) -> DrawResult<EntityId> {
        self.require(surface)?;
        self.preempt();
        let kind = EditorKind::from(options.kind);
        let result = self
            .with_editor(surface, Some(kind), |editor, ctx| editor.start_draw(ctx, options))
            .unwrap_or(Err(DrawError::UnknownSurface(surface)));
        self.flush();
        if let Ok(id) = &result {
            log::debug!("{surface} started drawing {id}");
        }
        result
    }

    /// [`start_draw`](Self::start_draw) with a JSON option bundle.
    pub fn start_draw_value(&mut self, surface: SurfaceId, options: &Value) -> DrawResult<EntityId> {
        self.start_draw(surface, DrawOptions::from_value(options)?)
    }

    /// Create a committed geometry from supplied positions.
    pub fn draw(&mut self, surface: SurfaceId, options: DrawOptions) -> DrawResult<EntityId> {
        self.require(surface)?;
        let kind = EditorKind::from(options.kind);
        let result = self
            .with_editor(surface, Some(kind), |editor, ctx| editor.draw(ctx, options))
            .unwrap_or(Err(DrawError::UnknownSurface(surface)));
        self.flush();
        result
    }

    /// [`draw`](Self::draw) with a JSON option bundle.
    pub fn draw_value(&mut self, surface: SurfaceId, options: &Value) -> DrawResult<EntityId> {
        self.draw(surface, DrawOptions::from_value(options)?)
    }

    /// Start editing a geometry.
    ///
    /// The owner found by [`find_drawer`](Self::find_drawer) wins over `kind`.
    /// Entities the overlay did not create cannot be edited, and neither can a
    /// geometry that is still being drawn.
    pub fn start_edit(&mut self, surface: SurfaceId, entity: EntityId, kind: Option<GeometryKind>) -> DrawResult<()> {
        self.require(surface)?;
        let (owner, owned_kind) = self.find_drawer(entity).ok_or(DrawError::NotOwned(entity))?;
        if self.controller(owner).is_some_and(|c| c.state.is_active_on(Mode::Add, entity)) {
            return Err(DrawError::StillDrawing(entity));
        }
        if let Some(kind) = kind.filter(|&k| k != owned_kind) {
            log::debug!("{entity} is a {owned_kind}, not a {kind}");
        }
        self.preempt();
        self.notify(
            owner,
            DrawEvent::StartEdit {
                geometry: entity,
                kind: owned_kind,
            },
        );
        self.begin_edit(owner, entity, owned_kind);
        self.flush();
        Ok(())
    }

    /// Ask to finish whatever is being edited. Returns whether an edit was active.
    pub fn finish_edit(&mut self) -> bool {
        self.ask_active(Mode::Edit, |editor, ctx| editor.finish_edit(ctx))
    }

    /// Ask to cancel whatever is being drawn. Returns whether a draw was active.
    pub fn cancel_draw(&mut self) -> bool {
        self.ask_active(Mode::Add, |editor, ctx| editor.cancel_draw(ctx))
    }

    fn ask_active(&mut self, mode: Mode, f: impl FnOnce(&mut dyn GeometryEditor, &mut EditContext<'_>)) -> bool {
        let Some(surface) = self.find_in_mode(mode) else {
            return false;
        };
        self.with_editor(surface, None, f);
        self.flush();
        true
    }

    fn find_in_mode(&self, mode: Mode) -> Option<SurfaceId> {
        self.controllers
            .iter()
            .flatten()
            .find(|c| c.state.mode == mode)
            .map(|c| c.id)
    }

    /// Whether any surface is drawing. Cross-surface switches wait until it is done.
    fn is_drawing(&self) -> bool {
        self.find_in_mode(Mode::Add).is_some()
    }

    /// Delete an entity. Entities the overlay does not own are removed from
    /// the surface's scene directly.
    pub fn delete(&mut self, surface: SurfaceId, entity: EntityId) -> DrawResult<()> {
        self.require(surface)?;
        match self.find_drawer(entity) {
            Some((owner, kind)) => {
                self.with_editor(owner, Some(kind.into()), |editor, ctx| editor.delete_entity(ctx, entity));
            }
            None => {
                log::warn!("{entity} was not created by the drawing overlay");
                if let Some(controller) = self.controller_mut(surface) {
                    controller.scene.remove(entity);
                }
            }
        }
        self.flush();
        Ok(())
    }

    // --- node API ---

    fn with_owner<R>(
        &mut self,
        geometry: EntityId,
        f: impl FnOnce(&mut dyn GeometryEditor, &mut EditContext<'_>) -> Option<R>,
    ) -> Option<R> {
        let (owner, kind) = self.find_drawer(geometry)?;
        let result = self.with_editor(owner, Some(kind.into()), f).flatten();
        self.flush();
        result
    }

    fn owner_editor(&self, geometry: EntityId) -> Option<&dyn GeometryEditor> {
        let (owner, kind) = self.find_drawer(geometry)?;
        Some(self.controller(owner)?.editors.get(kind.into()))
    }

    /// Insert a vertex at `index`, appending when it is absent or out of range.
    pub fn insert_node(&mut self, geometry: EntityId, options: NodeOptions, index: Option<usize>) -> Option<EntityId> {
        self.with_owner(geometry, |editor, ctx| editor.insert_node(ctx, geometry, options, index))
    }

    /// Replace the vertex at `index` with a freshly styled marker.
    pub fn update_node(&mut self, geometry: EntityId, options: NodeOptions, index: usize) -> Option<EntityId> {
        self.with_owner(geometry, |editor, ctx| editor.update_node(ctx, geometry, options, index))
    }

    /// Remove the vertex at `index`, or the last one. Removing the last
    /// remaining vertex deletes the geometry.
    pub fn delete_node(&mut self, geometry: EntityId, index: Option<usize>) -> Option<DVec3> {
        self.with_owner(geometry, |editor, ctx| editor.delete_node(ctx, geometry, index))
    }

    pub fn get_node(&self, geometry: EntityId, index: usize) -> Option<EntityId> {
        self.owner_editor(geometry)?.get_node(geometry, index)
    }

    pub fn get_nodes(&self, geometry: EntityId) -> Option<&[EntityId]> {
        self.owner_editor(geometry)?.get_nodes(geometry)
    }

    pub fn get_node_positions(&self, geometry: EntityId) -> Option<&[DVec3]> {
        self.owner_editor(geometry)?.get_node_positions(geometry)
    }

    /// Midpoint handles of a polyline or polygon.
    pub fn get_midpoints(&self, geometry: EntityId) -> Option<&[EntityId]> {
        self.owner_editor(geometry)?.get_midpoints(geometry)
    }

    // --- queries ---

    /// Surface and kind of the editor that created `entity`.
    pub fn find_drawer(&self, entity: EntityId) -> Option<(SurfaceId, GeometryKind)> {
        self.controllers
            .iter()
            .flatten()
            .find_map(|c| c.owns(entity).map(|kind| (c.id, kind)))
    }

    /// Geometries of one kind on a surface, including one still being drawn.
    pub fn tracked(&self, surface: SurfaceId, kind: GeometryKind) -> &[EntityId] {
        self.controller(surface)
            .map(|c| c.editors.get(kind.into()).tracked())
            .unwrap_or(&[])
    }

    pub fn geometry(&self, entity: EntityId) -> Option<&Geometry> {
        self.controllers
            .iter()
            .flatten()
            .find_map(|c| GeometryKind::ALL.iter().find_map(|&k| c.editors.get(k.into()).geometry(entity)))
    }

    pub fn state(&self, surface: SurfaceId) -> Option<ControllerState> {
        self.controller(surface).map(|c| c.state)
    }

    pub fn mode(&self, surface: SurfaceId) -> Option<Mode> {
        self.controller(surface).map(|c| c.state.mode)
    }

    pub fn active_geometry(&self, surface: SurfaceId) -> Option<EntityId> {
        self.controller(surface)?.state.active
    }

    /// Mode of the surface that last changed mode.
    pub fn global_mode(&self) -> Mode {
        self.global_mode
    }

    /// Surface that last changed mode.
    pub fn active_surface(&self) -> Option<SurfaceId> {
        self.active
    }

    pub fn settings(&self, surface: SurfaceId) -> Option<&SurfaceSettings> {
        self.controller(surface).map(|c| &c.settings)
    }

    pub fn scene(&self, surface: SurfaceId) -> Option<&S> {
        self.controller(surface).map(|c| &c.scene)
    }

    pub fn scene_mut(&mut self, surface: SurfaceId) -> Option<&mut S> {
        self.controller_mut(surface).map(|c| &mut c.scene)
    }

    /// Cursor style the host should display.
    pub fn cursor(&self) -> CursorStyle {
        self.cursor
    }

    /// Cursor style, if it changed since the last call.
    pub fn take_cursor_change(&mut self) -> Option<CursorStyle> {
        std::mem::take(&mut self.cursor_changed).then_some(self.cursor)
    }

    fn set_cursor(&mut self, style: CursorStyle) {
        if self.cursor != style {
            self.cursor = style;
            self.cursor_changed = true;
        }
    }

    // --- input ---

    /// Dispatch a gesture through a surface's bindings.
    pub fn handle_input(&mut self, surface: SurfaceId, input: PointerInput) -> DrawResult<()> {
        let controller = self.require(surface)?;
        let Some(route) = controller.bindings.route(input.gesture, input.modifier) else {
            return Ok(());
        };
        match route {
            Route::Editor { kind, mode } => {
                self.with_editor(surface, Some(kind), |editor, ctx| editor.handle(ctx, mode, &input));
            }
            Route::ViewClick => self.view_click(surface, input.position),
            Route::Hover => self.hover.schedule(surface, input.position, Instant::now()),
            Route::ResetAll => self.reset_all(),
        }
        self.flush();
        Ok(())
    }

    fn view_click(&mut self, surface: SurfaceId, position: Point) {
        if self.is_drawing() {
            return;
        }
        let Some(entity) = self.controller(surface).and_then(|c| c.scene.pick(position, None)) else {
            return;
        };
        match self.find_drawer(entity) {
            Some(_) => self.request_edit(entity),
            None => {
                let surfaces: Vec<SurfaceId> = self.surfaces().collect();
                for other in surfaces {
                    self.notify(other, DrawEvent::Click { entity });
                }
            }
        }
    }

    /// Ask the owner of `geometry` whether editing may start.
    fn request_edit(&mut self, geometry: EntityId) {
        if let Some((owner, kind)) = self.find_drawer(geometry) {
            self.requests.push_back(Request::Ask {
                surface: owner,
                event: DrawEvent::StartEdit { geometry, kind },
                then: Continuation::StartEdit { geometry },
            });
        }
    }

    fn reset_all(&mut self) {
        if self.is_drawing() {
            return;
        }
        self.preempt();
        self.reset_to_view();
    }

    fn reset_to_view(&mut self) {
        let surfaces: Vec<SurfaceId> = self.surfaces().collect();
        for surface in surfaces {
            self.with_editor(surface, Some(EditorKind::Initial), |_, ctx| ctx.view());
        }
    }

    /// Force-end every active draw or edit.
    fn preempt(&mut self) {
        let busy: Vec<SurfaceId> = self
            .controllers
            .iter()
            .flatten()
            .filter(|c| c.state.mode != Mode::View)
            .map(|c| c.id)
            .collect();
        for surface in busy {
            self.with_editor(surface, None, |editor, ctx| editor.preempt(ctx));
        }
    }

    fn begin_edit(&mut self, owner: SurfaceId, geometry: EntityId, kind: GeometryKind) {
        self.preempt();
        self.reset_to_view();
        self.with_editor(owner, Some(kind.into()), |editor, ctx| editor.start_edit(ctx, geometry));
        log::debug!("{owner} editing {geometry}");
    }

    // --- hover loop ---

    /// Run the hover pick if the pointer has rested long enough.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    pub fn tick_at(&mut self, now: Instant) {
        if let Some((surface, position)) = self.hover.take_due(now) {
            if let Some(controller) = self.controller(surface) {
                let picked = controller.scene.pick(position, Some(HOVER_PICK_TOLERANCE));
                self.set_cursor(if picked.is_some() {
                    CursorStyle::Pointer
                } else {
                    CursorStyle::Default
                });
                if self.hover.update_hovered(picked) {
                    self.notify(surface, DrawEvent::MouseOver { entity: picked });
                }
            }
        }
        self.flush();
    }

    pub fn hover_pending(&self) -> bool {
        self.hover.is_pending()
    }

    // --- request processing ---

    fn flush(&mut self) {
        while let Some(request) = self.requests.pop_front() {
            match request {
                Request::Activate { surface, mode } => {
                    self.active = Some(surface);
                    self.global_mode = mode;
                }
                Request::Cursor(style) => self.set_cursor(style),
                Request::Hover { surface, position } => self.hover.schedule(surface, position, Instant::now()),
                Request::Ask { surface, event, then } => self.ask(surface, event, then),
                Request::Detach(future) => self.detached.push(future),
            }
        }
    }

    fn ask(&mut self, surface: SurfaceId, event: DrawEvent, then: Continuation) {
        let reply = match self.controller_mut(surface) {
            Some(controller) => controller.events.emit(&event),
            None => return,
        };
        match reply {
            Reply::Ready(Verdict::Proceed) => self.resume(surface, then),
            Reply::Ready(Verdict::Abort) => log::debug!("{} vetoed on {surface}", event.topic()),
            Reply::Pending(future) => self.deferred.push(Deferred { surface, future, then }),
        }
    }

    fn resume(&mut self, surface: SurfaceId, then: Continuation) {
        let state = match self.controller(surface) {
            Some(controller) => controller.state,
            None => return,
        };
        match then {
            Continuation::FinishEdit { geometry, handoff } => {
                if !state.is_active_on(Mode::Edit, geometry) {
                    log::debug!("dropping stale finishEdit for {geometry}");
                    return;
                }
                self.with_editor(surface, None, |editor, ctx| editor.complete_edit(ctx));
                if let Some(target) = handoff {
                    self.request_edit(target);
                }
            }
            Continuation::CancelDraw { geometry } => {
                if !state.is_active_on(Mode::Add, geometry) {
                    log::debug!("dropping stale cancelDraw for {geometry}");
                    return;
                }
                self.with_editor(surface, None, |editor, ctx| editor.discard_draw(ctx));
            }
            Continuation::StartEdit { geometry } => {
                // A draw started while the reply was pending wins.
                if self.is_drawing() {
                    log::debug!("dropping startEdit for {geometry}: a draw is in progress");
                    return;
                }
                if let Some((owner, kind)) = self.find_drawer(geometry) {
                    self.begin_edit(owner, geometry, kind);
                }
            }
        }
    }

    // --- asynchronous replies ---

    /// Whether any subscriber reply is still unresolved.
    pub fn has_pending(&self) -> bool {
        !self.deferred.is_empty() || !self.detached.is_empty()
    }

    /// Poll pending subscriber replies, running the transitions whose replies
    /// resolved. Returns whether replies remain pending.
    pub fn poll_pending(&mut self, cx: &mut Context<'_>) -> bool {
        self.detached.retain_mut(|future| future.as_mut().poll(cx).is_pending());

        let mut resolved = Vec::new();
        let mut index = 0;
        while index < self.deferred.len() {
            match self.deferred[index].future.as_mut().poll(cx) {
                Poll::Ready(verdict) => {
                    let deferred = self.deferred.remove(index);
                    resolved.push((deferred.surface, deferred.then, verdict));
                }
                Poll::Pending => index += 1,
            }
        }

        for (surface, then, verdict) in resolved {
            match verdict {
                Verdict::Proceed => self.resume(surface, then),
                Verdict::Abort => log::debug!("{then:?} vetoed on {surface}"),
            }
            self.flush();
        }
        self.has_pending()
    }

    /// [`poll_pending`](Self::poll_pending) with a no-op waker, for hosts that
    /// poll from their frame loop.
    pub fn drive_pending(&mut self) -> bool {
        let mut cx = Context::from_waker(Waker::noop());
        self.poll_pending(&mut cx)
    }
}
