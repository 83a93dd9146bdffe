//! Tileboard Core Library
//!
//! Platform-agnostic interaction and geometry engine for an infinite-canvas
//! tile/connection editor. The crate owns viewport transforms, tile and
//! connection records, drag/resize/connect state machines, and multi-style
//! connector routing. Rendering, persistence, and undo storage live behind
//! the traits in [`store`].

pub mod connection;
pub mod error;
pub mod geometry;
pub mod input;
pub mod interaction;
pub mod router;
pub mod scheduler;
pub mod selection;
pub mod store;
pub mod tile;
pub mod viewport;
pub mod workspace;

pub use connection::{Connection, ConnectionId, ConnectionStyle};
pub use error::BoardError;
pub use geometry::{Side, anchor_point, bounds_of, expand, resolve_optimal_sides};
pub use input::{Key, Modifiers, MouseButton, PointerEvent};
pub use interaction::{InteractionState, ResizeDirection};
pub use router::{RoutedPath, RouterOptions, route};
pub use scheduler::{FrameScheduler, ManualScheduler};
pub use selection::{Selection, SelectionHandle};
pub use store::{BoardSnapshot, BoardStore, BoardUpdate, HistoryBridge, MemoryStore, NullHistory};
pub use tile::{DefaultMinSizes, MinSizePolicy, Tile, TileContent, TileId, TileKind};
pub use viewport::Viewport;
pub use workspace::Workspace;
