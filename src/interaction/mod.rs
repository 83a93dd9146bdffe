//! Interaction state machines for tile and connection gestures.
//!
//! All gesture state lives in one tagged union: exactly one gesture can be
//! active at a time, enforced by construction rather than locking (there
//! is one UI thread). Sessions capture starting values by copy and refer
//! to records by id only.

mod connect;
mod resize;

pub use connect::{hit_tile_at, resolve_connection_sides};
pub use resize::{TileGeometry, resize_tile};

use crate::connection::ConnectionId;
use crate::error::BoardError;
use crate::geometry::Side;
use crate::tile::{TileId, TileKind};
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// The eight resize handle directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeDirection {
    N,
    S,
    E,
    W,
    Nw,
    Ne,
    Sw,
    Se,
}

impl ResizeDirection {
    /// CSS cursor hint for this handle.
    pub fn cursor(self) -> &'static str {
        match self {
            ResizeDirection::N | ResizeDirection::S => "ns-resize",
            ResizeDirection::E | ResizeDirection::W => "ew-resize",
            ResizeDirection::Nw | ResizeDirection::Se => "nwse-resize",
            ResizeDirection::Ne | ResizeDirection::Sw => "nesw-resize",
        }
    }

    /// Whether dragging this handle moves the left edge.
    pub fn affects_left(self) -> bool {
        matches!(self, ResizeDirection::W | ResizeDirection::Nw | ResizeDirection::Sw)
    }

    /// Whether dragging this handle moves the right edge.
    pub fn affects_right(self) -> bool {
        matches!(self, ResizeDirection::E | ResizeDirection::Ne | ResizeDirection::Se)
    }

    /// Whether dragging this handle moves the top edge.
    pub fn affects_top(self) -> bool {
        matches!(self, ResizeDirection::N | ResizeDirection::Nw | ResizeDirection::Ne)
    }

    /// Whether dragging this handle moves the bottom edge.
    pub fn affects_bottom(self) -> bool {
        matches!(self, ResizeDirection::S | ResizeDirection::Sw | ResizeDirection::Se)
    }

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            ResizeDirection::Nw | ResizeDirection::Ne | ResizeDirection::Sw | ResizeDirection::Se
        )
    }
}

/// Drag-to-move session. Position deltas are world space.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub tile: TileId,
    pub pointer_start: Point,
    pub origin_start: Point,
}

impl DragSession {
    /// Live preview position for the current pointer.
    pub fn position_at(&self, pointer: Point) -> Point {
        Point::new(
            self.origin_start.x + (pointer.x - self.pointer_start.x),
            self.origin_start.y + (pointer.y - self.pointer_start.y),
        )
    }
}

/// Resize-to-scale session.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSession {
    pub tile: TileId,
    pub kind: TileKind,
    pub direction: ResizeDirection,
    pub pointer_start: Point,
    pub origin_start: Point,
    pub size_start: Size,
}

impl ResizeSession {
    /// Raw pointer delta in world units.
    pub fn delta_at(&self, pointer: Point) -> Vec2 {
        Vec2::new(
            pointer.x - self.pointer_start.x,
            pointer.y - self.pointer_start.y,
        )
    }
}

/// Connection creation gesture from a tile edge.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectSession {
    pub source: TileId,
    /// Explicit side the gesture started from, if any.
    pub source_side: Option<Side>,
    pub pointer: Point,
    /// Highlighted candidate target under the pointer.
    pub candidate: Option<TileId>,
}

/// Dragging an existing connection's shaping handle.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPointSession {
    pub connection: ConnectionId,
    pub pointer_start: Point,
    pub offset_start: Vec2,
}

impl ControlPointSession {
    /// Live offset for the current pointer.
    pub fn offset_at(&self, pointer: Point) -> Vec2 {
        Vec2::new(
            self.offset_start.x + (pointer.x - self.pointer_start.x),
            self.offset_start.y + (pointer.y - self.pointer_start.y),
        )
    }
}

/// Dragging an existing connection's loose end to a new target tile.
#[derive(Debug, Clone, PartialEq)]
pub struct RetargetSession {
    pub connection: ConnectionId,
    pub pointer: Point,
    pub candidate: Option<TileId>,
}

/// View panning session; coordinates are screen space.
#[derive(Debug, Clone, PartialEq)]
pub struct PanSession {
    pub pointer_start: Point,
    pub pan_start: Vec2,
}

/// The one active gesture, or idle.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    DraggingTile(DragSession),
    ResizingTile(ResizeSession),
    Connecting(ConnectSession),
    DraggingControlPoint(ControlPointSession),
    RetargetingEndpoint(RetargetSession),
    PanningView(PanSession),
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    /// Enter a gesture. Refused while any other gesture is active.
    pub fn begin(&mut self, next: InteractionState) -> Result<(), BoardError> {
        if !self.is_idle() {
            return Err(BoardError::GestureInProgress);
        }
        *self = next;
        Ok(())
    }

    /// Abort the active gesture, returning to idle without committing.
    pub fn cancel(&mut self) {
        *self = InteractionState::Idle;
    }
}
