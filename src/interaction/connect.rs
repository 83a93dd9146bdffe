//! Connection gesture helpers: target hit-testing and side resolution.

use crate::geometry::{Side, resolve_optimal_sides};
use crate::tile::{Tile, TileId};
use kurbo::Point;

/// Topmost tile containing the point, excluding the gesture's source.
///
/// `tiles` is expected in back-to-front draw order; the frontmost hit
/// wins.
pub fn hit_tile_at(tiles: &[Tile], point: Point, exclude: Option<TileId>) -> Option<TileId> {
    tiles
        .iter()
        .rev()
        .find(|tile| Some(tile.id) != exclude && tile.contains(point))
        .map(|tile| tile.id)
}

/// Resolve the sides for a completed connection gesture.
///
/// A side explicitly chosen at either end of the gesture wins; any
/// unspecified end falls back to the center-offset auto resolution.
pub fn resolve_connection_sides(
    from: &Tile,
    to: &Tile,
    explicit_from: Option<Side>,
    explicit_to: Option<Side>,
) -> (Side, Side) {
    let (auto_from, auto_to) = resolve_optimal_sides(from, to);
    (
        explicit_from.unwrap_or(auto_from),
        explicit_to.unwrap_or(auto_to),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileKind;

    fn tile_at(x: f64, y: f64) -> Tile {
        Tile::new(TileKind::Note, Point::new(x, y), 100.0, 100.0)
    }

    #[test]
    fn test_hit_excludes_source() {
        let a = tile_at(0.0, 0.0);
        let tiles = vec![a.clone()];
        assert_eq!(hit_tile_at(&tiles, Point::new(50.0, 50.0), Some(a.id)), None);
        assert_eq!(hit_tile_at(&tiles, Point::new(50.0, 50.0), None), Some(a.id));
    }

    #[test]
    fn test_hit_prefers_frontmost() {
        let back = tile_at(0.0, 0.0);
        let front = tile_at(50.0, 50.0);
        let tiles = vec![back.clone(), front.clone()];
        // Overlap region: the later (frontmost) tile wins.
        assert_eq!(hit_tile_at(&tiles, Point::new(75.0, 75.0), None), Some(front.id));
        // Non-overlap region still hits the back tile.
        assert_eq!(hit_tile_at(&tiles, Point::new(25.0, 25.0), None), Some(back.id));
    }

    #[test]
    fn test_hit_misses_empty_canvas() {
        let tiles = vec![tile_at(0.0, 0.0)];
        assert_eq!(hit_tile_at(&tiles, Point::new(500.0, 500.0), None), None);
    }

    #[test]
    fn test_auto_sides_when_unspecified() {
        let a = tile_at(0.0, 0.0);
        let b = tile_at(300.0, 0.0);
        assert_eq!(
            resolve_connection_sides(&a, &b, None, None),
            (Side::Right, Side::Left)
        );
    }

    #[test]
    fn test_explicit_sides_win() {
        let a = tile_at(0.0, 0.0);
        let b = tile_at(300.0, 0.0);
        assert_eq!(
            resolve_connection_sides(&a, &b, Some(Side::Bottom), None),
            (Side::Bottom, Side::Left)
        );
        assert_eq!(
            resolve_connection_sides(&a, &b, Some(Side::Top), Some(Side::Bottom)),
            (Side::Top, Side::Bottom)
        );
    }
}
