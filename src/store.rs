//! Store and history contracts consumed by the workspace.
//!
//! Tile and connection records are owned by an external store and
//! referenced by id; the core reads owned copies and writes whole
//! collections back, so it never holds references across mutations.

use crate::connection::{Connection, ConnectionId};
use crate::error::BoardError;
use crate::tile::{Tile, TileId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A full read of the board's records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub tiles: Vec<Tile>,
    pub connections: Vec<Connection>,
}

/// A wholesale replacement of one or both record collections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardUpdate {
    pub tiles: Option<Vec<Tile>>,
    pub connections: Option<Vec<Connection>>,
}

impl BoardUpdate {
    pub fn tiles(tiles: Vec<Tile>) -> Self {
        Self {
            tiles: Some(tiles),
            connections: None,
        }
    }

    pub fn connections(connections: Vec<Connection>) -> Self {
        Self {
            tiles: None,
            connections: Some(connections),
        }
    }

    pub fn both(tiles: Vec<Tile>, connections: Vec<Connection>) -> Self {
        Self {
            tiles: Some(tiles),
            connections: Some(connections),
        }
    }
}

/// Storage contract for board records.
pub trait BoardStore {
    /// Replace the given collections wholesale.
    fn apply_update(&mut self, update: BoardUpdate) -> Result<(), BoardError>;

    /// Full owned read of the current records.
    fn snapshot(&self) -> BoardSnapshot;

    /// Owned copy of a tile by id.
    fn tile(&self, id: TileId) -> Option<Tile>;

    /// Owned copy of a connection by id.
    fn connection(&self, id: ConnectionId) -> Option<Connection>;
}

/// Contract exposed to an external undo/redo stack.
///
/// Called once per committed user action (drag-end, resize-end, create,
/// delete, connection create/delete/reroute). The external stack owns
/// snapshot capture and restore; the core stores nothing.
pub trait HistoryBridge {
    fn notify_before_mutation(&mut self);
}

/// History bridge that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHistory;

impl HistoryBridge for NullHistory {
    fn notify_before_mutation(&mut self) {}
}

/// In-memory store for tests and simple embeddings.
///
/// Keeps insertion order so snapshots render back-to-front
/// deterministically.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tiles: HashMap<TileId, Tile>,
    tile_order: Vec<TileId>,
    connections: HashMap<ConnectionId, Connection>,
    connection_order: Vec<ConnectionId>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tile, appending to the draw order.
    pub fn insert_tile(&mut self, tile: Tile) {
        let id = tile.id;
        if !self.tiles.contains_key(&id) {
            self.tile_order.push(id);
        }
        self.tiles.insert(id, tile);
    }

    /// Insert a connection, appending to the draw order.
    pub fn insert_connection(&mut self, connection: Connection) {
        let id = connection.id;
        if !self.connections.contains_key(&id) {
            self.connection_order.push(id);
        }
        self.connections.insert(id, connection);
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl BoardStore for MemoryStore {
    fn apply_update(&mut self, update: BoardUpdate) -> Result<(), BoardError> {
        if let Some(tiles) = update.tiles {
            self.tiles.clear();
            self.tile_order.clear();
            for tile in tiles {
                self.insert_tile(tile);
            }
        }
        if let Some(connections) = update.connections {
            self.connections.clear();
            self.connection_order.clear();
            for connection in connections {
                self.insert_connection(connection);
            }
        }
        Ok(())
    }

    fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            tiles: self
                .tile_order
                .iter()
                .filter_map(|id| self.tiles.get(id).cloned())
                .collect(),
            connections: self
                .connection_order
                .iter()
                .filter_map(|id| self.connections.get(id).cloned())
                .collect(),
        }
    }

    fn tile(&self, id: TileId) -> Option<Tile> {
        self.tiles.get(&id).cloned()
    }

    fn connection(&self, id: ConnectionId) -> Option<Connection> {
        self.connections.get(&id).cloned()
    }
}
