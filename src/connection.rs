//! Connection records: directed, styled links between tile edge anchors.

use crate::error::BoardError;
use crate::geometry::Side;
use crate::tile::TileId;
use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for connections.
pub type ConnectionId = Uuid;

/// Default jitter magnitude for hand-drawn routing.
pub const DEFAULT_ROUGHNESS: f64 = 1.0;
/// Default stroke width in world units.
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

/// Visual routing style of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionStyle {
    /// Right-angle orthogonal path with a drag-adjustable bend.
    Straight,
    /// Single smooth curve between the anchors.
    Smooth,
    /// Orthogonal skeleton with deterministic sketch jitter.
    #[default]
    HandDrawn,
}

/// A directed link between two tile edge anchors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub from_tile: TileId,
    pub to_tile: TileId,
    pub from_side: Side,
    pub to_side: Side,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub style: ConnectionStyle,
    #[serde(default = "default_roughness")]
    pub roughness: f64,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    /// Optional stroke color as a hex string; renderer's concern.
    #[serde(default)]
    pub color: Option<String>,
    /// User-dragged offset applied to the path's bend point. Mutated only
    /// by an explicit control-point drag.
    #[serde(default)]
    pub control_point_offset: Option<Vec2>,
}

fn default_roughness() -> f64 {
    DEFAULT_ROUGHNESS
}

fn default_stroke_width() -> f64 {
    DEFAULT_STROKE_WIDTH
}

impl Connection {
    /// Create a new connection. Self-loops are refused: the two endpoints
    /// must be distinct tiles.
    pub fn new(
        from_tile: TileId,
        to_tile: TileId,
        from_side: Side,
        to_side: Side,
    ) -> Result<Self, BoardError> {
        if from_tile == to_tile {
            return Err(BoardError::SelfConnection);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            from_tile,
            to_tile,
            from_side,
            to_side,
            label: None,
            style: ConnectionStyle::default(),
            roughness: DEFAULT_ROUGHNESS,
            stroke_width: DEFAULT_STROKE_WIDTH,
            color: None,
            control_point_offset: None,
        })
    }

    /// Whether this connection references the given tile at either end.
    pub fn references(&self, tile: TileId) -> bool {
        self.from_tile == tile || self.to_tile == tile
    }
}
