//! Connection routing: orthogonal, smooth, and hand-drawn path generation.
//!
//! Routing depends only on the two endpoints, their declared sides, and the
//! style parameters. There is no obstacle avoidance; that is a documented
//! simplification, not a bug.

use crate::connection::{Connection, ConnectionId, ConnectionStyle};
use crate::geometry::{Side, anchor_point};
use crate::store::BoardStore;
use kurbo::{BezPath, Point, Vec2};

/// Default perpendicular bulge factor for hand-drawn routing.
pub const DEFAULT_BOWING: f64 = 1.0;

/// Style parameters the router accepts beyond what the connection record
/// carries.
#[derive(Debug, Clone, Copy)]
pub struct RouterOptions {
    /// Curve bulge factor for hand-drawn jitter.
    pub bowing: f64,
    /// Explicit jitter seed. When absent the seed is derived from the
    /// connection id, so rendering stays deterministic either way.
    pub seed: Option<u32>,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            bowing: DEFAULT_BOWING,
            seed: None,
        }
    }
}

/// A renderable path plus the draggable shaping handle location.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedPath {
    pub path: BezPath,
    /// Location of the control handle: the (possibly offset) bend point
    /// for orthogonal styles, the geometric midpoint for smooth.
    pub control_point: Point,
}

/// Route a connection between two resolved anchor points.
pub fn route(connection: &Connection, from_anchor: Point, to_anchor: Point, options: &RouterOptions) -> RoutedPath {
    match connection.style {
        ConnectionStyle::Straight => route_straight(
            from_anchor,
            connection.from_side,
            to_anchor,
            connection.to_side,
            connection.control_point_offset,
        ),
        ConnectionStyle::Smooth => route_smooth(
            from_anchor,
            connection.from_side,
            to_anchor,
            connection.to_side,
        ),
        ConnectionStyle::HandDrawn => {
            let seed = options.seed.unwrap_or_else(|| seed_from_id(connection.id));
            route_hand_drawn(
                from_anchor,
                connection.from_side,
                to_anchor,
                connection.to_side,
                connection.control_point_offset,
                connection.roughness,
                options.bowing,
                seed,
            )
        }
    }
}

/// Resolve the connection's tiles through the store and route between
/// their anchors. Returns `None` when either tile is missing; a dangling
/// reference degrades to "don't render this connection".
pub fn route_between(store: &dyn BoardStore, connection: &Connection, options: &RouterOptions) -> Option<RoutedPath> {
    let Some(from) = store.tile(connection.from_tile) else {
        log::debug!(
            "connection {}: from-tile {} missing, skipping render",
            connection.id,
            connection.from_tile
        );
        return None;
    };
    let Some(to) = store.tile(connection.to_tile) else {
        log::debug!(
            "connection {}: to-tile {} missing, skipping render",
            connection.id,
            connection.to_tile
        );
        return None;
    };
    let from_anchor = anchor_point(&from, connection.from_side);
    let to_anchor = anchor_point(&to, connection.to_side);
    Some(route(connection, from_anchor, to_anchor, options))
}

/// Derive a deterministic jitter seed from a connection id (FNV-1a over
/// the raw bytes). Same id, same seed, across reloads.
pub fn seed_from_id(id: ConnectionId) -> u32 {
    let mut hash: u32 = 0x811C_9DC5;
    for &byte in id.as_bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

/// The right-angle polyline connecting two anchors through a bend point,
/// honoring the declared exit and entry sides.
///
/// Returns the skeleton points and the bend. The bend defaults to the
/// natural corner (or midline for parallel sides) and is displaced by the
/// user's control-point offset.
fn orthogonal_skeleton(
    from: Point,
    from_side: Side,
    to: Point,
    to_side: Side,
    offset: Option<Vec2>,
) -> (Vec<Point>, Point) {
    let mid = Point::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);
    let default_bend = match (from_side.is_horizontal(), to_side.is_horizontal()) {
        // Parallel exits produce a Z; the bend sits on the crossing leg.
        (true, true) | (false, false) => mid,
        // Perpendicular exits produce an L with the bend at the corner.
        (true, false) => Point::new(to.x, from.y),
        (false, true) => Point::new(from.x, to.y),
    };
    let bend = default_bend + offset.unwrap_or(Vec2::ZERO);

    // Exit leg stays aligned with the from side, entry leg with the to
    // side; the bend joins them with right angles.
    let exit = if from_side.is_horizontal() {
        Point::new(bend.x, from.y)
    } else {
        Point::new(from.x, bend.y)
    };
    let entry = if to_side.is_horizontal() {
        Point::new(bend.x, to.y)
    } else {
        Point::new(to.x, bend.y)
    };

    // For parallel sides the crossing leg spans the two anchors'
    // cross-axis range. A bend dragged outside that range would make the
    // leg retrace itself, so route a detour out, across at the bend, and
    // back, keeping the bend centered on the middle leg.
    let parallel = from_side.is_horizontal() == to_side.is_horizontal();
    let mut points = if parallel
        && from_side.is_horizontal()
        && (bend.y < from.y.min(to.y) || bend.y > from.y.max(to.y))
    {
        let quarter = (to.x - from.x) / 4.0;
        vec![
            from,
            Point::new(bend.x - quarter, from.y),
            Point::new(bend.x - quarter, bend.y),
            Point::new(bend.x + quarter, bend.y),
            Point::new(bend.x + quarter, to.y),
            to,
        ]
    } else if parallel
        && !from_side.is_horizontal()
        && (bend.x < from.x.min(to.x) || bend.x > from.x.max(to.x))
    {
        let quarter = (to.y - from.y) / 4.0;
        vec![
            from,
            Point::new(from.x, bend.y - quarter),
            Point::new(bend.x, bend.y - quarter),
            Point::new(bend.x, bend.y + quarter),
            Point::new(to.x, bend.y + quarter),
            to,
        ]
    } else {
        vec![from, exit, bend, entry, to]
    };
    points.dedup_by(|a, b| (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9);
    (points, bend)
}

fn polyline_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    if points.len() < 2 {
        return path;
    }
    path.move_to(points[0]);
    for &p in &points[1..] {
        path.line_to(p);
    }
    path
}

fn route_straight(
    from: Point,
    from_side: Side,
    to: Point,
    to_side: Side,
    offset: Option<Vec2>,
) -> RoutedPath {
    let (points, bend) = orthogonal_skeleton(from, from_side, to, to_side, offset);
    RoutedPath {
        path: polyline_path(&points),
        control_point: bend,
    }
}

fn route_smooth(from: Point, from_side: Side, to: Point, to_side: Side) -> RoutedPath {
    let mid = Point::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);
    let dist = ((to.x - from.x).powi(2) + (to.y - from.y).powi(2)).sqrt();
    let reach = dist * 0.4;

    // Tangents leave and enter along the declared sides.
    let c1 = from + from_side.direction() * reach;
    let c2 = to + to_side.direction() * reach;

    let mut path = BezPath::new();
    path.move_to(from);
    path.curve_to(c1, c2, to);

    // The midpoint handle is display-only for this style; it carries no
    // extra curvature control.
    RoutedPath {
        path,
        control_point: mid,
    }
}

#[allow(clippy::too_many_arguments)]
fn route_hand_drawn(
    from: Point,
    from_side: Side,
    to: Point,
    to_side: Side,
    offset: Option<Vec2>,
    roughness: f64,
    bowing: f64,
    seed: u32,
) -> RoutedPath {
    let (points, bend) = orthogonal_skeleton(from, from_side, to, to_side, offset);
    if roughness <= 0.0 {
        return RoutedPath {
            path: polyline_path(&points),
            control_point: bend,
        };
    }

    let max_offset = roughness * 2.0;
    let mut rng = SimpleRng::new(seed);
    let mut path = BezPath::new();

    let start = Point::new(
        points[0].x + rng.offset(max_offset),
        points[0].y + rng.offset(max_offset),
    );
    path.move_to(start);

    for window in points.windows(2) {
        let (a, b) = (window[0], window[1]);
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let len = (dx * dx + dy * dy).sqrt();

        // Bow the segment midpoint perpendicular to the segment,
        // proportional to its length, then overshoot the endpoint.
        let bow_amount = rng.offset(bowing * roughness * len / 200.0);
        let (perp_x, perp_y) = if len > 1e-9 {
            (-dy / len, dx / len)
        } else {
            (0.0, 0.0)
        };
        let control = Point::new(
            (a.x + b.x) / 2.0 + perp_x * bow_amount,
            (a.y + b.y) / 2.0 + perp_y * bow_amount,
        );
        let end = Point::new(b.x + rng.offset(max_offset), b.y + rng.offset(max_offset));
        path.quad_to(control, end);
    }

    RoutedPath {
        path,
        control_point: bend,
    }
}

/// Seeded xorshift32 generator for deterministic sketch jitter.
struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Random value in [-amount, amount].
    fn offset(&mut self, amount: f64) -> f64 {
        let unit = (f64::from(self.next_u32()) / f64::from(u32::MAX)) * 2.0 - 1.0;
        unit * amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::tile::{Tile, TileKind};
    use kurbo::PathEl;
    use uuid::Uuid;

    fn conn(style: ConnectionStyle) -> Connection {
        let mut c = Connection::new(Uuid::new_v4(), Uuid::new_v4(), Side::Right, Side::Left).unwrap();
        c.style = style;
        c
    }

    fn path_points(path: &BezPath) -> Vec<Point> {
        path.elements()
            .iter()
            .filter_map(|el| match el {
                PathEl::MoveTo(p) | PathEl::LineTo(p) => Some(*p),
                PathEl::QuadTo(_, p) => Some(*p),
                PathEl::CurveTo(_, _, p) => Some(*p),
                PathEl::ClosePath => None,
            })
            .collect()
    }

    #[test]
    fn test_straight_z_shape_for_opposite_sides() {
        let c = conn(ConnectionStyle::Straight);
        let routed = route(&c, Point::new(100.0, 50.0), Point::new(300.0, 150.0), &RouterOptions::default());
        let pts = path_points(&routed.path);
        // from, two bend legs, to.
        assert_eq!(pts.len(), 5);
        assert_eq!(pts[0], Point::new(100.0, 50.0));
        assert_eq!(*pts.last().unwrap(), Point::new(300.0, 150.0));
        // Right-angle legs only.
        for w in pts.windows(2) {
            let axis_aligned =
                (w[0].x - w[1].x).abs() < 1e-9 || (w[0].y - w[1].y).abs() < 1e-9;
            assert!(axis_aligned, "segment {w:?} is not axis-aligned");
        }
        assert_eq!(routed.control_point, Point::new(200.0, 100.0));
    }

    #[test]
    fn test_straight_l_shape_for_perpendicular_sides() {
        let mut c = conn(ConnectionStyle::Straight);
        c.from_side = Side::Right;
        c.to_side = Side::Top;
        let routed = route(&c, Point::new(100.0, 50.0), Point::new(300.0, 200.0), &RouterOptions::default());
        let pts = path_points(&routed.path);
        assert_eq!(pts.len(), 3);
        assert_eq!(pts[1], Point::new(300.0, 50.0));
    }

    #[test]
    fn test_control_point_offset_moves_bend() {
        let mut c = conn(ConnectionStyle::Straight);
        c.control_point_offset = Some(Vec2::new(40.0, -25.0));
        let routed = route(&c, Point::new(0.0, 0.0), Point::new(200.0, 0.0), &RouterOptions::default());
        assert_eq!(routed.control_point, Point::new(140.0, -25.0));
        // Path still starts and ends on the anchors.
        let pts = path_points(&routed.path);
        assert_eq!(pts[0], Point::new(0.0, 0.0));
        assert_eq!(*pts.last().unwrap(), Point::new(200.0, 0.0));
    }

    #[test]
    fn test_offset_off_crossing_leg_routes_detour() {
        // Equal-y anchors with a purely perpendicular offset: the bend
        // leaves the (zero-length) crossing leg, so the path must detour
        // instead of spiking out and retracing the same segment.
        let mut c = conn(ConnectionStyle::Straight);
        c.control_point_offset = Some(Vec2::new(40.0, -25.0));
        let routed = route(&c, Point::new(0.0, 0.0), Point::new(200.0, 0.0), &RouterOptions::default());
        let pts = path_points(&routed.path);
        assert_eq!(
            pts,
            vec![
                Point::new(0.0, 0.0),
                Point::new(90.0, 0.0),
                Point::new(90.0, -25.0),
                Point::new(190.0, -25.0),
                Point::new(190.0, 0.0),
                Point::new(200.0, 0.0),
            ]
        );
        // No segment doubles back on the previous one.
        for w in pts.windows(3) {
            let ab = (w[1].x - w[0].x, w[1].y - w[0].y);
            let bc = (w[2].x - w[1].x, w[2].y - w[1].y);
            assert!(
                ab.0 * bc.0 + ab.1 * bc.1 >= 0.0,
                "segments {w:?} reverse direction"
            );
        }
        // The handle stays on the middle leg.
        assert_eq!(routed.control_point, Point::new(140.0, -25.0));
    }

    #[test]
    fn test_offset_detour_vertical_sides() {
        let mut c = conn(ConnectionStyle::Straight);
        c.from_side = Side::Bottom;
        c.to_side = Side::Top;
        c.control_point_offset = Some(Vec2::new(30.0, 0.0));
        // Equal-x anchors, offset pushes the bend sideways off the run.
        let routed = route(&c, Point::new(50.0, 0.0), Point::new(50.0, 200.0), &RouterOptions::default());
        let pts = path_points(&routed.path);
        assert_eq!(
            pts,
            vec![
                Point::new(50.0, 0.0),
                Point::new(50.0, 50.0),
                Point::new(80.0, 50.0),
                Point::new(80.0, 150.0),
                Point::new(50.0, 150.0),
                Point::new(50.0, 200.0),
            ]
        );
        assert_eq!(routed.control_point, Point::new(80.0, 100.0));
    }

    #[test]
    fn test_smooth_control_is_midpoint() {
        let c = conn(ConnectionStyle::Smooth);
        let routed = route(&c, Point::new(0.0, 0.0), Point::new(100.0, 60.0), &RouterOptions::default());
        assert_eq!(routed.control_point, Point::new(50.0, 30.0));
        assert_eq!(routed.path.elements().len(), 2); // MoveTo + CurveTo
    }

    #[test]
    fn test_hand_drawn_deterministic() {
        let c = conn(ConnectionStyle::HandDrawn);
        let opts = RouterOptions::default();
        let a = route(&c, Point::new(0.0, 0.0), Point::new(250.0, 90.0), &opts);
        let b = route(&c, Point::new(0.0, 0.0), Point::new(250.0, 90.0), &opts);
        assert_eq!(a.path.elements(), b.path.elements());
        assert_eq!(a.control_point, b.control_point);
    }

    #[test]
    fn test_hand_drawn_differs_per_connection() {
        let c1 = conn(ConnectionStyle::HandDrawn);
        let c2 = conn(ConnectionStyle::HandDrawn);
        let opts = RouterOptions::default();
        let a = route(&c1, Point::new(0.0, 0.0), Point::new(250.0, 90.0), &opts);
        let b = route(&c2, Point::new(0.0, 0.0), Point::new(250.0, 90.0), &opts);
        assert_ne!(a.path.elements(), b.path.elements());
    }

    #[test]
    fn test_hand_drawn_zero_roughness_is_clean() {
        let mut c = conn(ConnectionStyle::HandDrawn);
        c.roughness = 0.0;
        let routed = route(&c, Point::new(0.0, 0.0), Point::new(200.0, 100.0), &RouterOptions::default());
        // No jitter: plain orthogonal polyline.
        let pts = path_points(&routed.path);
        assert_eq!(pts[0], Point::new(0.0, 0.0));
        assert_eq!(*pts.last().unwrap(), Point::new(200.0, 100.0));
    }

    #[test]
    fn test_explicit_seed_overrides_id() {
        let c = conn(ConnectionStyle::HandDrawn);
        let with_seed = RouterOptions { seed: Some(7), ..Default::default() };
        let a = route(&c, Point::new(0.0, 0.0), Point::new(250.0, 90.0), &with_seed);
        let b = route(&c, Point::new(0.0, 0.0), Point::new(250.0, 90.0), &with_seed);
        assert_eq!(a.path.elements(), b.path.elements());
    }

    #[test]
    fn test_seed_from_id_is_stable() {
        let id = Uuid::new_v4();
        assert_eq!(seed_from_id(id), seed_from_id(id));
        assert_ne!(seed_from_id(id), seed_from_id(Uuid::new_v4()));
    }

    #[test]
    fn test_route_between_skips_dangling() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut store = MemoryStore::new();
        let tile = Tile::new(TileKind::Note, Point::new(0.0, 0.0), 200.0, 200.0);
        let tile_id = tile.id;
        store.insert_tile(tile);

        // to_tile never inserted: dangling reference.
        let c = Connection::new(tile_id, Uuid::new_v4(), Side::Right, Side::Left).unwrap();
        assert!(route_between(&store, &c, &RouterOptions::default()).is_none());
    }

    #[test]
    fn test_route_between_resolves_anchors() {
        let mut store = MemoryStore::new();
        let a = Tile::new(TileKind::Note, Point::new(0.0, 0.0), 100.0, 100.0);
        let b = Tile::new(TileKind::Note, Point::new(300.0, 0.0), 100.0, 100.0);
        let (a_id, b_id) = (a.id, b.id);
        store.insert_tile(a);
        store.insert_tile(b);

        let mut c = Connection::new(a_id, b_id, Side::Right, Side::Left).unwrap();
        c.style = ConnectionStyle::Straight;
        let routed = route_between(&store, &c, &RouterOptions::default()).unwrap();
        let pts = path_points(&routed.path);
        assert_eq!(pts[0], Point::new(100.0, 50.0));
        assert_eq!(*pts.last().unwrap(), Point::new(300.0, 50.0));
    }
}
