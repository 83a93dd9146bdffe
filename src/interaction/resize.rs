//! Resize math: direction formulas, aspect constraints, minimum-size
//! clamping, and anchor-preserving position adjustment.

use super::ResizeSession;
use crate::tile::{DOCUMENT_ASPECT, MinSizePolicy, TileKind};
use kurbo::{Point, Vec2};

/// Candidate tile geometry produced by a resize step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileGeometry {
    pub position: Point,
    pub width: f64,
    pub height: f64,
}

/// Compute the tile geometry for a resize session at the given pointer
/// delta (world units).
///
/// The handle the user is pulling moves; the opposite edge or corner
/// stays fixed, including after clamping. Shift preserves the original
/// aspect ratio: edge handles derive the other dimension and re-center
/// the anchored axis, corner handles follow the dominant drag axis so the
/// two axes cannot fight for control.
pub fn resize_tile(session: &ResizeSession, delta: Vec2, shift: bool, policy: &dyn MinSizePolicy) -> TileGeometry {
    let dir = session.direction;
    let start_w = session.size_start.width;
    let start_h = session.size_start.height;
    let aspect = start_w / start_h.max(f64::EPSILON);

    // Direction-specific raw dimensions.
    let mut width = start_w;
    let mut height = start_h;
    if dir.affects_right() {
        width = start_w + delta.x;
    } else if dir.affects_left() {
        width = start_w - delta.x;
    }
    if dir.affects_bottom() {
        height = start_h + delta.y;
    } else if dir.affects_top() {
        height = start_h - delta.y;
    }

    // Which axis the user is actually driving.
    let width_dominant = if dir.is_corner() {
        delta.x.abs() >= delta.y.abs()
    } else {
        dir.affects_left() || dir.affects_right()
    };

    // Shift: derive the passive dimension from the original aspect.
    let mut width_derived = false;
    let mut height_derived = false;
    if shift {
        if width_dominant {
            height = width / aspect;
            height_derived = true;
        } else {
            width = height * aspect;
            width_derived = true;
        }
    }

    // Clamp to the type minimum; malformed deltas degrade the same way.
    let min = policy.min_size(session.kind);
    if !width.is_finite() {
        width = min.width;
    }
    if !height.is_finite() {
        height = min.height;
    }
    width = width.max(min.width);
    height = height.max(min.height);

    // Document tiles keep width:height at 1:1.4, driven by the dominant
    // axis; the derived dimension rounds to a whole unit.
    if session.kind == TileKind::Document {
        if width_dominant {
            height = (width * DOCUMENT_ASPECT).round();
            height_derived = true;
        } else {
            width = (height / DOCUMENT_ASPECT).round();
            width_derived = true;
        }
        width = width.max(min.width);
        height = height.max(min.height);
    }

    // Re-derive the position so the anchor opposite the handle stays
    // fixed, even when clamping changed the dimensions.
    let x = if dir.affects_left() {
        session.origin_start.x + start_w - width
    } else if dir.affects_right() {
        session.origin_start.x
    } else if width_derived {
        // Passive axis re-centers around the original span.
        session.origin_start.x + (start_w - width) / 2.0
    } else {
        session.origin_start.x
    };
    let y = if dir.affects_top() {
        session.origin_start.y + start_h - height
    } else if dir.affects_bottom() {
        session.origin_start.y
    } else if height_derived {
        session.origin_start.y + (start_h - height) / 2.0
    } else {
        session.origin_start.y
    };

    TileGeometry {
        position: Point::new(x, y),
        width,
        height,
    }
}
