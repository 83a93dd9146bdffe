//! Error types for store and workspace operations.

use thiserror::Error;

/// Errors surfaced by board operations.
///
/// Nothing here is fatal; callers are expected to degrade (skip the
/// element, ignore the gesture) rather than abort.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    /// A tile id was not found in the store.
    #[error("tile {0} not found")]
    TileNotFound(uuid::Uuid),

    /// A connection id was not found in the store.
    #[error("connection {0} not found")]
    ConnectionNotFound(uuid::Uuid),

    /// A connection may not reference the same tile at both ends.
    #[error("connection endpoints must be distinct tiles")]
    SelfConnection,

    /// A gesture was started while another one was active.
    #[error("another interaction gesture is already in progress")]
    GestureInProgress,

    /// The requested operation needs an active gesture and none exists.
    #[error("no active interaction gesture")]
    NoActiveGesture,
}
