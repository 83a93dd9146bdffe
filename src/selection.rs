//! Selection tracking and multi-select bounds.

use crate::connection::ConnectionId;
use crate::geometry::expand;
use crate::interaction::ResizeDirection;
use crate::tile::{Tile, TileId};
use kurbo::{Point, Rect};

/// Visual padding around the multi-select bounding box, in world units.
pub const SELECTION_PADDING: f64 = 8.0;

/// Transient selection state: a set of tile ids, or a single connection.
///
/// Tiles and connections are mutually exclusive selection classes;
/// selecting one clears the other. Never persisted, cleared on board
/// switch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    tiles: Vec<TileId>,
    connection: Option<ConnectionId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Click selection: replaces the selection unless `multi` (Ctrl/Cmd)
    /// is held, in which case the tile toggles in and out of the set.
    pub fn click_tile(&mut self, id: TileId, multi: bool) {
        self.connection = None;
        if multi {
            if let Some(pos) = self.tiles.iter().position(|&t| t == id) {
                self.tiles.remove(pos);
            } else {
                self.tiles.push(id);
            }
        } else {
            self.tiles.clear();
            self.tiles.push(id);
        }
    }

    /// Select a single connection, deselecting all tiles.
    pub fn select_connection(&mut self, id: ConnectionId) {
        self.tiles.clear();
        self.connection = Some(id);
    }

    /// Clear everything. Board switches call this unconditionally.
    pub fn clear(&mut self) {
        self.tiles.clear();
        self.connection = None;
    }

    pub fn is_tile_selected(&self, id: TileId) -> bool {
        self.tiles.contains(&id)
    }

    pub fn selected_connection(&self) -> Option<ConnectionId> {
        self.connection
    }

    pub fn tiles(&self) -> &[TileId] {
        &self.tiles
    }

    /// The single selected tile, if exactly one is selected.
    pub fn single_tile(&self) -> Option<TileId> {
        match self.tiles.as_slice() {
            [id] => Some(*id),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty() && self.connection.is_none()
    }

    /// Drop ids that no longer exist in the store.
    pub fn retain_existing(&mut self, tiles: &[Tile], connections: &[ConnectionId]) {
        self.tiles.retain(|id| tiles.iter().any(|t| t.id == *id));
        if let Some(conn) = self.connection {
            if !connections.contains(&conn) {
                self.connection = None;
            }
        }
    }

    /// Combined bounding box of the selected tiles, expanded by the fixed
    /// selection padding. `None` when no tile is selected.
    pub fn bounds(&self, tiles: &[Tile]) -> Option<Rect> {
        let selected: Vec<Tile> = tiles
            .iter()
            .filter(|t| self.tiles.contains(&t.id))
            .cloned()
            .collect();
        if selected.is_empty() {
            return None;
        }
        // bounds_of applies the canvas floor; selection visuals want the
        // tight box, so compute the union directly.
        let mut rect = selected[0].bounds();
        for tile in &selected[1..] {
            rect = rect.union(tile.bounds());
        }
        Some(expand(rect, SELECTION_PADDING))
    }
}

/// A resize/affordance handle on the selection box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionHandle {
    pub direction: ResizeDirection,
    /// Position in world coordinates.
    pub position: Point,
}

impl SelectionHandle {
    /// Hit test in world coordinates with a zoom-adjusted tolerance.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        dx * dx + dy * dy <= tolerance * tolerance
    }
}

/// Eight handles laid out at the corners and edge midpoints of a box.
pub fn layout_handles(rect: Rect) -> [SelectionHandle; 8] {
    let cx = rect.center().x;
    let cy = rect.center().y;
    let handle = |direction, x, y| SelectionHandle {
        direction,
        position: Point::new(x, y),
    };
    [
        handle(ResizeDirection::Nw, rect.x0, rect.y0),
        handle(ResizeDirection::N, cx, rect.y0),
        handle(ResizeDirection::Ne, rect.x1, rect.y0),
        handle(ResizeDirection::E, rect.x1, cy),
        handle(ResizeDirection::Se, rect.x1, rect.y1),
        handle(ResizeDirection::S, cx, rect.y1),
        handle(ResizeDirection::Sw, rect.x0, rect.y1),
        handle(ResizeDirection::W, rect.x0, cy),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileKind;

    fn tile_at(x: f64, y: f64) -> Tile {
        Tile::new(TileKind::Note, Point::new(x, y), 100.0, 100.0)
    }

    #[test]
    fn test_click_replaces() {
        let mut sel = Selection::new();
        let (a, b) = (tile_at(0.0, 0.0), tile_at(10.0, 10.0));
        sel.click_tile(a.id, false);
        sel.click_tile(b.id, false);
        assert!(!sel.is_tile_selected(a.id));
        assert!(sel.is_tile_selected(b.id));
    }

    #[test]
    fn test_multi_click_toggles() {
        let mut sel = Selection::new();
        let (a, b) = (tile_at(0.0, 0.0), tile_at(10.0, 10.0));
        sel.click_tile(a.id, false);
        sel.click_tile(b.id, true);
        assert!(sel.is_tile_selected(a.id));
        assert!(sel.is_tile_selected(b.id));

        sel.click_tile(a.id, true);
        assert!(!sel.is_tile_selected(a.id));
        assert!(sel.is_tile_selected(b.id));
    }

    #[test]
    fn test_connection_and_tiles_mutually_exclusive() {
        let mut sel = Selection::new();
        let t = tile_at(0.0, 0.0);
        let conn_id = uuid::Uuid::new_v4();

        sel.click_tile(t.id, false);
        sel.select_connection(conn_id);
        assert!(sel.tiles().is_empty());
        assert_eq!(sel.selected_connection(), Some(conn_id));

        sel.click_tile(t.id, false);
        assert!(sel.selected_connection().is_none());
        assert!(sel.is_tile_selected(t.id));
    }

    #[test]
    fn test_bounds_union_with_padding() {
        let mut sel = Selection::new();
        let a = tile_at(0.0, 0.0);
        let b = tile_at(200.0, 100.0);
        sel.click_tile(a.id, false);
        sel.click_tile(b.id, true);

        let bounds = sel.bounds(&[a, b]).unwrap();
        assert_eq!(
            bounds,
            Rect::new(
                -SELECTION_PADDING,
                -SELECTION_PADDING,
                300.0 + SELECTION_PADDING,
                200.0 + SELECTION_PADDING
            )
        );
    }

    #[test]
    fn test_handle_layout_positions_and_cursors() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        let handles = layout_handles(rect);
        assert_eq!(handles.len(), 8);

        let se = handles
            .iter()
            .find(|h| h.direction == ResizeDirection::Se)
            .unwrap();
        assert_eq!(se.position, Point::new(100.0, 50.0));
        assert_eq!(se.direction.cursor(), "nwse-resize");

        let n = handles
            .iter()
            .find(|h| h.direction == ResizeDirection::N)
            .unwrap();
        assert_eq!(n.position, Point::new(50.0, 0.0));
        assert_eq!(n.direction.cursor(), "ns-resize");
    }

    #[test]
    fn test_retain_existing_drops_stale() {
        let mut sel = Selection::new();
        let a = tile_at(0.0, 0.0);
        let stale = tile_at(10.0, 10.0);
        sel.click_tile(a.id, false);
        sel.click_tile(stale.id, true);

        sel.retain_existing(&[a.clone()], &[]);
        assert!(sel.is_tile_selected(a.id));
        assert!(!sel.is_tile_selected(stale.id));
    }

    #[test]
    fn test_clear() {
        let mut sel = Selection::new();
        sel.click_tile(tile_at(0.0, 0.0).id, false);
        sel.clear();
        assert!(sel.is_empty());
    }
}
