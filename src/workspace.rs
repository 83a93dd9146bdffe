//! The canvas workspace: event routing, gesture orchestration, and commit
//! ordering.
//!
//! The workspace exclusively owns viewport and selection state; tile and
//! connection records live in the injected store and are addressed by id.
//! Every committed user action follows the same order: mutate the records,
//! notify the history bridge, then schedule one coalesced recompute.

use crate::connection::{Connection, ConnectionId};
use crate::error::BoardError;
use crate::geometry::{Side, bounds_of};
use crate::input::{Key, Modifiers, MouseButton, PointerEvent};
use crate::interaction::{
    ConnectSession, ControlPointSession, DragSession, InteractionState, PanSession,
    ResizeDirection, ResizeSession, RetargetSession, TileGeometry, hit_tile_at,
    resize_tile, resolve_connection_sides,
};
use crate::router::{RoutedPath, RouterOptions, route_between};
use crate::scheduler::FrameScheduler;
use crate::selection::{Selection, SelectionHandle, layout_handles};
use crate::store::{BoardStore, BoardUpdate, HistoryBridge};
use crate::tile::{MinSizePolicy, Tile, TileId, TileKind};
use crate::viewport::Viewport;
use kurbo::{ParamCurveNearest, Point, Rect, Size, Vec2};

/// Handle hit tolerance in screen pixels (converted by zoom when testing
/// in world space).
pub const HANDLE_HIT_TOLERANCE: f64 = 12.0;
/// Drag extents below this, in both axes, create a centered default tile
/// instead of a degenerate one.
pub const MIN_CREATE_DRAG: f64 = 20.0;

/// What a pointer press landed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitTarget {
    /// A resize handle of the single selected tile.
    ResizeHandle(ResizeDirection),
    /// The selected connection's shaping handle.
    ConnectionControl(ConnectionId),
    /// The selected connection's target endpoint.
    ConnectionEndpoint(ConnectionId),
    /// A tile body.
    TileBody(TileId),
    /// A connection's routed path.
    ConnectionBody(ConnectionId),
    /// Empty canvas.
    Canvas,
}

/// The interaction engine for one board.
pub struct Workspace {
    store: Box<dyn BoardStore>,
    history: Box<dyn HistoryBridge>,
    min_sizes: Box<dyn MinSizePolicy>,
    scheduler: Box<dyn FrameScheduler>,
    pub viewport: Viewport,
    selection: Selection,
    state: InteractionState,
    /// Latest pointer position in world coordinates.
    pointer_world: Point,
    /// Latest modifier state, captured so release commits see the same
    /// constraints the last move previewed.
    modifiers: Modifiers,
    recompute_pending: bool,
}

impl Workspace {
    pub fn new(
        store: Box<dyn BoardStore>,
        history: Box<dyn HistoryBridge>,
        min_sizes: Box<dyn MinSizePolicy>,
        scheduler: Box<dyn FrameScheduler>,
    ) -> Self {
        Self {
            store,
            history,
            min_sizes,
            scheduler,
            viewport: Viewport::new(),
            selection: Selection::new(),
            state: InteractionState::Idle,
            pointer_world: Point::ZERO,
            modifiers: Modifiers::default(),
            recompute_pending: false,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn snapshot(&self) -> crate::store::BoardSnapshot {
        self.store.snapshot()
    }

    /// World bounds of the board content, buffered and floored.
    pub fn content_bounds(&self) -> Rect {
        bounds_of(&self.store.snapshot().tiles)
    }

    /// Resize/affordance handles for the current selection box.
    pub fn selection_handles(&self) -> Vec<SelectionHandle> {
        let tiles = self.store.snapshot().tiles;
        match self.selection.bounds(&tiles) {
            Some(rect) => layout_handles(rect).to_vec(),
            None => Vec::new(),
        }
    }

    /// Routed paths for every renderable connection. Connections with a
    /// missing endpoint tile are skipped.
    pub fn routed_connections(&self) -> Vec<(ConnectionId, RoutedPath)> {
        let options = RouterOptions::default();
        self.store
            .snapshot()
            .connections
            .iter()
            .filter_map(|conn| {
                route_between(self.store.as_ref(), conn, &options).map(|path| (conn.id, path))
            })
            .collect()
    }

    /// Tiles in draw order, with the active gesture's live preview
    /// geometry applied. Previews never touch the store; the store mutates
    /// once, on release.
    pub fn tiles_for_render(&self) -> Vec<Tile> {
        let mut tiles = self.store.snapshot().tiles;
        if let Some((id, geometry)) = self.preview_geometry() {
            if let Some(tile) = tiles.iter_mut().find(|t| t.id == id) {
                tile.position = geometry.position;
                tile.width = geometry.width;
                tile.height = geometry.height;
            }
        }
        tiles
    }

    /// Live geometry of the tile under an active drag or resize.
    pub fn preview_geometry(&self) -> Option<(TileId, TileGeometry)> {
        match &self.state {
            InteractionState::DraggingTile(session) => {
                let tile = self.store.tile(session.tile)?;
                Some((
                    session.tile,
                    TileGeometry {
                        position: session.position_at(self.pointer_world),
                        width: tile.width,
                        height: tile.height,
                    },
                ))
            }
            InteractionState::ResizingTile(session) => Some((
                session.tile,
                resize_tile(
                    session,
                    session.delta_at(self.pointer_world),
                    self.modifiers.shift,
                    self.min_sizes.as_ref(),
                ),
            )),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Board lifecycle
    // ------------------------------------------------------------------

    /// Switch the active board: selection and any gesture are dropped
    /// unconditionally; viewport is the embedder's choice to keep.
    pub fn switch_board(&mut self) {
        self.selection.clear();
        self.state.cancel();
        self.invalidate();
    }

    // ------------------------------------------------------------------
    // Hit testing
    // ------------------------------------------------------------------

    /// Classify a world-space point against handles, connection controls,
    /// and tile bodies, front to back.
    pub fn hit_test(&self, world: Point) -> HitTarget {
        let tolerance = HANDLE_HIT_TOLERANCE / self.viewport.zoom;

        if self.selection.single_tile().is_some() {
            for handle in self.selection_handles() {
                if handle.hit_test(world, tolerance) {
                    return HitTarget::ResizeHandle(handle.direction);
                }
            }
        }

        if let Some(conn_id) = self.selection.selected_connection() {
            if let Some(conn) = self.store.connection(conn_id) {
                if let Some(routed) =
                    route_between(self.store.as_ref(), &conn, &RouterOptions::default())
                {
                    if let Some(to_tile) = self.store.tile(conn.to_tile) {
                        let endpoint = crate::geometry::anchor_point(&to_tile, conn.to_side);
                        if hit_point(endpoint, world, tolerance) {
                            return HitTarget::ConnectionEndpoint(conn_id);
                        }
                    }
                    if hit_point(routed.control_point, world, tolerance) {
                        return HitTarget::ConnectionControl(conn_id);
                    }
                }
            }
        }

        let tiles = self.store.snapshot().tiles;
        if let Some(id) = hit_tile_at(&tiles, world, None) {
            return HitTarget::TileBody(id);
        }
        if let Some(id) = self.hit_connection_at(world, tolerance) {
            return HitTarget::ConnectionBody(id);
        }
        HitTarget::Canvas
    }

    /// Frontmost routed connection whose path passes within `tolerance`
    /// of the point. Connections draw under tiles, so this runs after the
    /// tile-body test.
    fn hit_connection_at(&self, world: Point, tolerance: f64) -> Option<ConnectionId> {
        self.routed_connections()
            .iter()
            .rev()
            .find(|(_, routed)| {
                routed
                    .path
                    .segments()
                    .any(|seg| seg.nearest(world, 0.1).distance_sq <= tolerance * tolerance)
            })
            .map(|(id, _)| *id)
    }

    // ------------------------------------------------------------------
    // Event routing
    // ------------------------------------------------------------------

    /// Route a pointer event through the state machine.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { position, button, modifiers } => {
                self.modifiers = modifiers;
                self.pointer_world = self.viewport.screen_to_world(position);
                self.on_pointer_down(position, button);
            }
            PointerEvent::Move { position, modifiers } => {
                self.modifiers = modifiers;
                self.on_pointer_move(position);
            }
            PointerEvent::Up { position, button, modifiers } => {
                self.modifiers = modifiers;
                self.pointer_world = self.viewport.screen_to_world(position);
                if button == MouseButton::Left || button == MouseButton::Middle {
                    self.finish_gesture();
                }
            }
            PointerEvent::Wheel { position, delta, modifiers } => {
                self.modifiers = modifiers;
                self.viewport.wheel_zoom(position, delta.y);
                self.invalidate();
            }
        }
    }

    fn on_pointer_down(&mut self, screen: Point, button: MouseButton) {
        if button == MouseButton::Middle {
            let _ = self.state.begin(InteractionState::PanningView(PanSession {
                pointer_start: screen,
                pan_start: self.viewport.pan,
            }));
            return;
        }
        if button != MouseButton::Left {
            return;
        }

        let world = self.pointer_world;
        match self.hit_test(world) {
            HitTarget::ResizeHandle(direction) => {
                if let Some(tile_id) = self.selection.single_tile() {
                    let _ = self.begin_resize(tile_id, direction);
                }
            }
            HitTarget::ConnectionControl(conn_id) => {
                let _ = self.begin_control_point_drag(conn_id);
            }
            HitTarget::ConnectionEndpoint(conn_id) => {
                let _ = self.begin_retarget(conn_id);
            }
            HitTarget::TileBody(tile_id) => {
                self.selection.click_tile(tile_id, self.modifiers.command());
                // A plain click also starts a move; a Ctrl/Cmd toggle
                // only adjusts the selection.
                if !self.modifiers.command() {
                    let _ = self.begin_drag(tile_id);
                }
                self.invalidate();
            }
            HitTarget::ConnectionBody(conn_id) => {
                self.selection.select_connection(conn_id);
                self.invalidate();
            }
            HitTarget::Canvas => {
                self.selection.clear();
                self.invalidate();
            }
        }
    }

    fn on_pointer_move(&mut self, screen: Point) {
        self.pointer_world = self.viewport.screen_to_world(screen);

        match &mut self.state {
            InteractionState::Idle => {}
            InteractionState::PanningView(session) => {
                self.viewport.pan = session.pan_start
                    + Vec2::new(
                        screen.x - session.pointer_start.x,
                        screen.y - session.pointer_start.y,
                    );
                self.invalidate();
            }
            InteractionState::DraggingTile(_) | InteractionState::ResizingTile(_) => {
                // Preview only; the store mutates once on release.
                self.invalidate();
            }
            InteractionState::Connecting(session) => {
                session.pointer = self.pointer_world;
                let tiles = self.store.snapshot().tiles;
                session.candidate = hit_tile_at(&tiles, self.pointer_world, Some(session.source));
                self.invalidate();
            }
            InteractionState::RetargetingEndpoint(session) => {
                session.pointer = self.pointer_world;
                let source = self
                    .store
                    .connection(session.connection)
                    .map(|c| c.from_tile);
                let tiles = self.store.snapshot().tiles;
                session.candidate = hit_tile_at(&tiles, self.pointer_world, source);
                self.invalidate();
            }
            InteractionState::DraggingControlPoint(_) => {
                self.invalidate();
            }
        }
    }

    /// Handle a key press. Escape aborts the active gesture without
    /// committing; Delete removes the current selection.
    pub fn handle_key(&mut self, key: Key) {
        match key {
            Key::Escape => {
                if !self.state.is_idle() {
                    log::debug!("gesture cancelled via escape");
                    self.state.cancel();
                    self.invalidate();
                }
            }
            Key::Delete => self.delete_selection(),
        }
    }

    /// Select a connection, replacing any tile selection.
    pub fn select_connection(&mut self, connection: ConnectionId) -> Result<(), BoardError> {
        if self.store.connection(connection).is_none() {
            return Err(BoardError::ConnectionNotFound(connection));
        }
        self.selection.select_connection(connection);
        self.invalidate();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Gesture entry points
    // ------------------------------------------------------------------

    /// Start moving a tile. Refused while another gesture is active.
    pub fn begin_drag(&mut self, tile_id: TileId) -> Result<(), BoardError> {
        let tile = self
            .store
            .tile(tile_id)
            .ok_or(BoardError::TileNotFound(tile_id))?;
        self.state.begin(InteractionState::DraggingTile(DragSession {
            tile: tile_id,
            pointer_start: self.pointer_world,
            origin_start: tile.position,
        }))
    }

    /// Start resizing a tile from one of its eight handles.
    pub fn begin_resize(&mut self, tile_id: TileId, direction: ResizeDirection) -> Result<(), BoardError> {
        let tile = self
            .store
            .tile(tile_id)
            .ok_or(BoardError::TileNotFound(tile_id))?;
        self.state.begin(InteractionState::ResizingTile(ResizeSession {
            tile: tile_id,
            kind: tile.kind,
            direction,
            pointer_start: self.pointer_world,
            origin_start: tile.position,
            size_start: Size::new(tile.width, tile.height),
        }))
    }

    /// Start a connection gesture from a tile, optionally from an explicit
    /// side handle.
    pub fn begin_connection(&mut self, source: TileId, side: Option<Side>) -> Result<(), BoardError> {
        if self.store.tile(source).is_none() {
            return Err(BoardError::TileNotFound(source));
        }
        self.state.begin(InteractionState::Connecting(ConnectSession {
            source,
            source_side: side,
            pointer: self.pointer_world,
            candidate: None,
        }))
    }

    /// Start dragging an existing connection's shaping handle.
    pub fn begin_control_point_drag(&mut self, connection: ConnectionId) -> Result<(), BoardError> {
        let conn = self
            .store
            .connection(connection)
            .ok_or(BoardError::ConnectionNotFound(connection))?;
        self.state
            .begin(InteractionState::DraggingControlPoint(ControlPointSession {
                connection,
                pointer_start: self.pointer_world,
                offset_start: conn.control_point_offset.unwrap_or(Vec2::ZERO),
            }))
    }

    /// Start dragging an existing connection's target endpoint.
    pub fn begin_retarget(&mut self, connection: ConnectionId) -> Result<(), BoardError> {
        if self.store.connection(connection).is_none() {
            return Err(BoardError::ConnectionNotFound(connection));
        }
        self.state
            .begin(InteractionState::RetargetingEndpoint(RetargetSession {
                connection,
                pointer: self.pointer_world,
                candidate: None,
            }))
    }

    // ------------------------------------------------------------------
    // Commits
    // ------------------------------------------------------------------

    /// Complete the active gesture at the current pointer, committing at
    /// most one mutation.
    fn finish_gesture(&mut self) {
        let state = std::mem::take(&mut self.state);
        match state {
            InteractionState::Idle => {}
            InteractionState::PanningView(_) => {
                // Pan mutates only the viewport; nothing to commit.
            }
            InteractionState::DraggingTile(session) => {
                let position = session.position_at(self.pointer_world);
                // A click with no movement selects without committing.
                if position != session.origin_start {
                    self.commit_tile_geometry(session.tile, None, Some(position));
                }
            }
            InteractionState::ResizingTile(session) => {
                let delta = session.delta_at(self.pointer_world);
                if delta != Vec2::ZERO {
                    let geometry = resize_tile(
                        &session,
                        delta,
                        self.modifiers.shift,
                        self.min_sizes.as_ref(),
                    );
                    self.commit_tile_geometry(session.tile, Some(geometry), None);
                }
            }
            InteractionState::Connecting(session) => {
                if let Some(target) = session.candidate {
                    let _ = self.create_connection(session.source, target, session.source_side, None);
                } else {
                    log::debug!("connection gesture released over empty canvas, cancelled");
                }
                self.invalidate();
            }
            InteractionState::DraggingControlPoint(session) => {
                self.commit_control_point(&session);
            }
            InteractionState::RetargetingEndpoint(session) => {
                self.commit_retarget(&session);
            }
        }
    }

    fn commit_tile_geometry(&mut self, tile_id: TileId, geometry: Option<TileGeometry>, position: Option<Point>) {
        let mut snapshot = self.store.snapshot();
        let Some(tile) = snapshot.tiles.iter_mut().find(|t| t.id == tile_id) else {
            log::warn!("commit for missing tile {tile_id}, dropped");
            return;
        };
        if let Some(geometry) = geometry {
            tile.position = geometry.position;
            tile.width = geometry.width;
            tile.height = geometry.height;
        }
        if let Some(position) = position {
            tile.position = position;
        }
        tile.sanitize(self.min_sizes.as_ref());
        self.commit(BoardUpdate::tiles(snapshot.tiles));
    }

    fn commit_control_point(&mut self, session: &ControlPointSession) {
        let offset = session.offset_at(self.pointer_world);
        let mut snapshot = self.store.snapshot();
        let Some(conn) = snapshot
            .connections
            .iter_mut()
            .find(|c| c.id == session.connection)
        else {
            return;
        };
        conn.control_point_offset = Some(offset);
        self.commit(BoardUpdate::connections(snapshot.connections));
    }

    fn commit_retarget(&mut self, session: &RetargetSession) {
        let Some(old) = self.store.connection(session.connection) else {
            return;
        };
        let Some(target) = session.candidate else {
            self.invalidate();
            return;
        };
        // Dragging back onto the current target is a no-op.
        if target == old.to_tile {
            self.invalidate();
            return;
        }
        let (Some(from_tile), Some(to_tile)) = (self.store.tile(old.from_tile), self.store.tile(target)) else {
            return;
        };

        let (from_side, to_side) = resolve_connection_sides(&from_tile, &to_tile, None, None);
        let Ok(mut replacement) = Connection::new(old.from_tile, target, from_side, to_side) else {
            return;
        };
        // The reroute keeps the connection's look; the shaping offset is
        // stale for the new geometry.
        replacement.label = old.label.clone();
        replacement.style = old.style;
        replacement.roughness = old.roughness;
        replacement.stroke_width = old.stroke_width;
        replacement.color = old.color.clone();

        let mut connections = self.store.snapshot().connections;
        connections.retain(|c| c.id != old.id);
        connections.push(replacement.clone());
        log::debug!("connection {} retargeted to tile {target} as {}", old.id, replacement.id);

        if self.selection.selected_connection() == Some(old.id) {
            self.selection.select_connection(replacement.id);
        }
        self.commit(BoardUpdate::connections(connections));
    }

    /// Apply a committed mutation in the required order: records first,
    /// then the history bridge, then one coalesced recompute.
    fn commit(&mut self, update: BoardUpdate) {
        if let Err(err) = self.store.apply_update(update) {
            log::warn!("store rejected update: {err}");
            return;
        }
        self.history.notify_before_mutation();
        self.invalidate();
    }

    // ------------------------------------------------------------------
    // Record operations
    // ------------------------------------------------------------------

    /// Create a tile at a position. With no drag extent, or one below the
    /// degenerate threshold in both axes, the tile centers on the point at
    /// its type minimum; otherwise the drag rectangle is used, clamped to
    /// the minimum.
    pub fn create_tile_at(&mut self, kind: TileKind, point: Point, drag_extent: Option<Rect>) -> TileId {
        let min = self.min_sizes.min_size(kind);
        let extent = drag_extent.filter(|rect| {
            rect.width().abs() >= MIN_CREATE_DRAG || rect.height().abs() >= MIN_CREATE_DRAG
        });

        let mut tile = match extent {
            Some(rect) => {
                let rect = rect.abs();
                Tile::new(
                    kind,
                    Point::new(rect.x0, rect.y0),
                    rect.width().max(min.width),
                    rect.height().max(min.height),
                )
            }
            None => Tile::new(
                kind,
                Point::new(point.x - min.width / 2.0, point.y - min.height / 2.0),
                min.width,
                min.height,
            ),
        };
        if kind == TileKind::Document {
            tile.height = (tile.width * crate::tile::DOCUMENT_ASPECT).round();
        }
        tile.sanitize(self.min_sizes.as_ref());

        let id = tile.id;
        let mut tiles = self.store.snapshot().tiles;
        tiles.push(tile);
        self.commit(BoardUpdate::tiles(tiles));
        id
    }

    /// Create a connection between two tiles, auto-resolving any side not
    /// explicitly given.
    pub fn create_connection(
        &mut self,
        from: TileId,
        to: TileId,
        explicit_from: Option<Side>,
        explicit_to: Option<Side>,
    ) -> Result<ConnectionId, BoardError> {
        let from_tile = self.store.tile(from).ok_or(BoardError::TileNotFound(from))?;
        let to_tile = self.store.tile(to).ok_or(BoardError::TileNotFound(to))?;
        let (from_side, to_side) =
            resolve_connection_sides(&from_tile, &to_tile, explicit_from, explicit_to);
        let connection = Connection::new(from, to, from_side, to_side)?;
        let id = connection.id;

        let mut connections = self.store.snapshot().connections;
        connections.push(connection);
        self.commit(BoardUpdate::connections(connections));
        Ok(id)
    }

    /// Delete a tile and cascade to every connection referencing it.
    pub fn delete_tile(&mut self, tile_id: TileId) {
        let snapshot = self.store.snapshot();
        let tiles: Vec<Tile> = snapshot
            .tiles
            .into_iter()
            .filter(|t| t.id != tile_id)
            .collect();
        let connections: Vec<Connection> = snapshot
            .connections
            .into_iter()
            .filter(|c| !c.references(tile_id))
            .collect();

        let conn_ids: Vec<ConnectionId> = connections.iter().map(|c| c.id).collect();
        self.selection.retain_existing(&tiles, &conn_ids);
        self.commit(BoardUpdate::both(tiles, connections));
    }

    /// Delete a single connection.
    pub fn delete_connection(&mut self, conn_id: ConnectionId) {
        let mut connections = self.store.snapshot().connections;
        connections.retain(|c| c.id != conn_id);
        if self.selection.selected_connection() == Some(conn_id) {
            self.selection.clear();
        }
        self.commit(BoardUpdate::connections(connections));
    }

    /// Delete whatever is selected: either the tile set (with connection
    /// cascade) or the selected connection.
    pub fn delete_selection(&mut self) {
        if let Some(conn_id) = self.selection.selected_connection() {
            self.delete_connection(conn_id);
            return;
        }
        let selected: Vec<TileId> = self.selection.tiles().to_vec();
        if selected.is_empty() {
            return;
        }

        let snapshot = self.store.snapshot();
        let tiles: Vec<Tile> = snapshot
            .tiles
            .into_iter()
            .filter(|t| !selected.contains(&t.id))
            .collect();
        let connections: Vec<Connection> = snapshot
            .connections
            .into_iter()
            .filter(|c| !selected.iter().any(|&id| c.references(id)))
            .collect();

        log::debug!("deleting {} selected tile(s) with cascade", selected.len());
        self.selection.clear();
        self.commit(BoardUpdate::both(tiles, connections));
    }

    // ------------------------------------------------------------------
    // Frame coalescing
    // ------------------------------------------------------------------

    /// Mark derived state (paths, bounds) stale. Repeated calls before the
    /// next frame supersede rather than stack.
    fn invalidate(&mut self) {
        if !self.recompute_pending {
            self.recompute_pending = true;
            self.scheduler.request_frame();
        }
    }

    /// Consume the pending-recompute flag; the embedder calls this once
    /// per animation frame and recomputes only when it returns true.
    pub fn take_pending_recompute(&mut self) -> bool {
        std::mem::take(&mut self.recompute_pending)
    }
}

fn hit_point(target: Point, probe: Point, tolerance: f64) -> bool {
    let dx = probe.x - target.x;
    let dy = probe.y - target.y;
    dx * dx + dy * dy <= tolerance * tolerance
}
