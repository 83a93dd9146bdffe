//! Geometry utilities: canvas bounds, box expansion, and anchor/side
//! resolution.

use crate::tile::Tile;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Extra world units added around the content when computing canvas bounds.
pub const BOUNDS_BUFFER: f64 = 500.0;
/// Minimum canvas extent on each axis, so a single small tile does not
/// produce a degenerate viewport.
pub const MIN_CANVAS_EXTENT: f64 = 2000.0;

/// One of the four edge-midpoints of a tile, used as a connection endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// The side facing this one on the other tile.
    pub fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
        }
    }

    /// Whether this side exits along the horizontal axis.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }

    /// Unit outward direction of the side.
    pub fn direction(self) -> kurbo::Vec2 {
        match self {
            Side::Top => kurbo::Vec2::new(0.0, -1.0),
            Side::Right => kurbo::Vec2::new(1.0, 0.0),
            Side::Bottom => kurbo::Vec2::new(0.0, 1.0),
            Side::Left => kurbo::Vec2::new(-1.0, 0.0),
        }
    }
}

/// Combined bounding box for a set of tiles, buffered and floored to the
/// minimum canvas extent.
///
/// Empty input yields a default canvas centered on the origin.
pub fn bounds_of(tiles: &[Tile]) -> Rect {
    let half = MIN_CANVAS_EXTENT / 2.0;
    if tiles.is_empty() {
        return Rect::new(-half, -half, half, half);
    }

    let mut result = tiles[0].bounds();
    for tile in &tiles[1..] {
        result = result.union(tile.bounds());
    }
    result = result.inflate(BOUNDS_BUFFER, BOUNDS_BUFFER);

    // Grow symmetrically around the center up to the minimum extent.
    let center = result.center();
    let width = result.width().max(MIN_CANVAS_EXTENT);
    let height = result.height().max(MIN_CANVAS_EXTENT);
    Rect::new(
        center.x - width / 2.0,
        center.y - height / 2.0,
        center.x + width / 2.0,
        center.y + height / 2.0,
    )
}

/// Grow a box symmetrically by `padding` on each side.
pub fn expand(bounds: Rect, padding: f64) -> Rect {
    bounds.inflate(padding, padding)
}

/// Edge-midpoint anchor for a tile side.
pub fn anchor_point(tile: &Tile, side: Side) -> Point {
    let bounds = tile.bounds();
    let center = bounds.center();
    match side {
        Side::Top => Point::new(center.x, bounds.y0),
        Side::Right => Point::new(bounds.x1, center.y),
        Side::Bottom => Point::new(center.x, bounds.y1),
        Side::Left => Point::new(bounds.x0, center.y),
    }
}

/// Pick the (from, to) sides for a connection between two tiles by
/// comparing their center offsets.
///
/// Horizontal distance dominates on exact ties, so the result is
/// deterministic for symmetric layouts.
pub fn resolve_optimal_sides(from: &Tile, to: &Tile) -> (Side, Side) {
    let dx = to.center().x - from.center().x;
    let dy = to.center().y - from.center().y;

    if dx.abs() >= dy.abs() {
        if dx >= 0.0 {
            (Side::Right, Side::Left)
        } else {
            (Side::Left, Side::Right)
        }
    } else if dy >= 0.0 {
        (Side::Bottom, Side::Top)
    } else {
        (Side::Top, Side::Bottom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileKind;

    fn tile_at(x: f64, y: f64, w: f64, h: f64) -> Tile {
        Tile::new(TileKind::Note, Point::new(x, y), w, h)
    }

    #[test]
    fn test_bounds_of_empty() {
        let bounds = bounds_of(&[]);
        assert!(bounds.width() >= MIN_CANVAS_EXTENT);
        assert!(bounds.height() >= MIN_CANVAS_EXTENT);
        assert_eq!(bounds.center(), Point::ZERO);
    }

    #[test]
    fn test_bounds_of_single_tile_floors_at_minimum() {
        let bounds = bounds_of(&[tile_at(0.0, 0.0, 100.0, 100.0)]);
        assert!((bounds.width() - MIN_CANVAS_EXTENT).abs() < f64::EPSILON);
        assert!((bounds.height() - MIN_CANVAS_EXTENT).abs() < f64::EPSILON);
        // Centered on the tile.
        assert_eq!(bounds.center(), Point::new(50.0, 50.0));
    }

    #[test]
    fn test_bounds_of_spread_tiles_buffers() {
        let tiles = [tile_at(0.0, 0.0, 100.0, 100.0), tile_at(3000.0, 0.0, 100.0, 100.0)];
        let bounds = bounds_of(&tiles);
        assert!((bounds.x0 - (-BOUNDS_BUFFER)).abs() < f64::EPSILON);
        assert!((bounds.x1 - (3100.0 + BOUNDS_BUFFER)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_expand() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let grown = expand(rect, 5.0);
        assert_eq!(grown, Rect::new(-5.0, -5.0, 15.0, 15.0));
    }

    #[test]
    fn test_anchor_points() {
        let tile = tile_at(0.0, 0.0, 100.0, 60.0);
        assert_eq!(anchor_point(&tile, Side::Top), Point::new(50.0, 0.0));
        assert_eq!(anchor_point(&tile, Side::Right), Point::new(100.0, 30.0));
        assert_eq!(anchor_point(&tile, Side::Bottom), Point::new(50.0, 60.0));
        assert_eq!(anchor_point(&tile, Side::Left), Point::new(0.0, 30.0));
    }

    #[test]
    fn test_resolve_sides_horizontal() {
        // A at (0,0,100,100), B at (300,0,100,100): horizontal gap wins.
        let a = tile_at(0.0, 0.0, 100.0, 100.0);
        let b = tile_at(300.0, 0.0, 100.0, 100.0);
        assert_eq!(resolve_optimal_sides(&a, &b), (Side::Right, Side::Left));
        assert_eq!(resolve_optimal_sides(&b, &a), (Side::Left, Side::Right));
    }

    #[test]
    fn test_resolve_sides_vertical() {
        let a = tile_at(0.0, 0.0, 100.0, 100.0);
        let b = tile_at(0.0, 400.0, 100.0, 100.0);
        assert_eq!(resolve_optimal_sides(&a, &b), (Side::Bottom, Side::Top));
        assert_eq!(resolve_optimal_sides(&b, &a), (Side::Top, Side::Bottom));
    }

    #[test]
    fn test_resolve_sides_tie_breaks_horizontal() {
        // Equal |dx| and |dy| must resolve to the horizontal pair.
        let a = tile_at(0.0, 0.0, 100.0, 100.0);
        let b = tile_at(300.0, 300.0, 100.0, 100.0);
        assert_eq!(resolve_optimal_sides(&a, &b), (Side::Right, Side::Left));
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Top.opposite(), Side::Bottom);
        assert_eq!(Side::Left.opposite(), Side::Right);
    }
}
