//! Tile records and the minimum-size policy.

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for tiles.
pub type TileId = Uuid;

/// Fixed width:height ratio for document tiles (1:1.4, roughly A-series
/// paper).
pub const DOCUMENT_ASPECT: f64 = 1.4;

/// The content type of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileKind {
    Text,
    Code,
    Note,
    Image,
    Mermaid,
    Shape,
    Document,
    Bookmark,
}

/// Type-specific tile payload. The core never interprets these beyond
/// carrying them through mutations; rendering is an external concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TileContent {
    Text { text: String },
    Code { code: String, language: String },
    Note { text: String },
    Image { url: String },
    Mermaid { source: String },
    Shape { shape: String },
    Document { body: String },
    Bookmark { url: String, description: String },
}

impl TileContent {
    /// Empty payload for a given kind.
    pub fn empty(kind: TileKind) -> Self {
        match kind {
            TileKind::Text => TileContent::Text { text: String::new() },
            TileKind::Code => TileContent::Code {
                code: String::new(),
                language: "plaintext".to_string(),
            },
            TileKind::Note => TileContent::Note { text: String::new() },
            TileKind::Image => TileContent::Image { url: String::new() },
            TileKind::Mermaid => TileContent::Mermaid { source: String::new() },
            TileKind::Shape => TileContent::Shape { shape: "rectangle".to_string() },
            TileKind::Document => TileContent::Document { body: String::new() },
            TileKind::Bookmark => TileContent::Bookmark {
                url: String::new(),
                description: String::new(),
            },
        }
    }

    /// The kind this payload belongs to.
    pub fn kind(&self) -> TileKind {
        match self {
            TileContent::Text { .. } => TileKind::Text,
            TileContent::Code { .. } => TileKind::Code,
            TileContent::Note { .. } => TileKind::Note,
            TileContent::Image { .. } => TileKind::Image,
            TileContent::Mermaid { .. } => TileKind::Mermaid,
            TileContent::Shape { .. } => TileKind::Shape,
            TileContent::Document { .. } => TileKind::Document,
            TileContent::Bookmark { .. } => TileKind::Bookmark,
        }
    }
}

/// A positioned, sized, typed content box on the canvas.
///
/// Position and size are world-space floats. After any committed mutation
/// `width >= min.width` and `height >= min.height` for the tile's kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub kind: TileKind,
    /// Top-left corner in world coordinates.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    /// Rotation in radians around the tile center.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub title: String,
    pub content: TileContent,
}

impl Tile {
    /// Create a new tile of the given kind.
    pub fn new(kind: TileKind, position: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            position,
            width,
            height,
            rotation: 0.0,
            title: String::new(),
            content: TileContent::empty(kind),
        }
    }

    /// Bounding box in world coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }

    /// Center point in world coordinates.
    pub fn center(&self) -> Point {
        Point::new(
            self.position.x + self.width / 2.0,
            self.position.y + self.height / 2.0,
        )
    }

    /// Axis-aligned containment test.
    pub fn contains(&self, point: Point) -> bool {
        self.bounds().contains(point)
    }

    /// Sanitize geometry in place: NaN or sub-minimum sizes clamp to the
    /// kind's minimum, NaN coordinates reset to the origin. Malformed
    /// input degrades instead of being rejected.
    pub fn sanitize(&mut self, policy: &dyn MinSizePolicy) {
        let min = policy.min_size(self.kind);
        if !self.position.x.is_finite() || !self.position.y.is_finite() {
            log::warn!("tile {}: non-finite position reset to origin", self.id);
            self.position = Point::ZERO;
        }
        if !self.width.is_finite() || self.width < min.width {
            self.width = min.width;
        }
        if !self.height.is_finite() || self.height < min.height {
            self.height = min.height;
        }
        if !self.rotation.is_finite() {
            self.rotation = 0.0;
        }
    }
}

/// Pure lookup for the minimum committed size of each tile kind.
pub trait MinSizePolicy {
    fn min_size(&self, kind: TileKind) -> Size;
}

/// Built-in minimum-size table.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMinSizes;

impl MinSizePolicy for DefaultMinSizes {
    fn min_size(&self, kind: TileKind) -> Size {
        match kind {
            TileKind::Text => Size::new(600.0, 550.0),
            TileKind::Code => Size::new(400.0, 300.0),
            TileKind::Note => Size::new(200.0, 200.0),
            TileKind::Image => Size::new(200.0, 150.0),
            TileKind::Mermaid => Size::new(300.0, 200.0),
            TileKind::Shape => Size::new(100.0, 100.0),
            // Document minimum keeps the 1:1.4 ratio.
            TileKind::Document => Size::new(280.0, 392.0),
            TileKind::Bookmark => Size::new(250.0, 120.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_bounds_and_center() {
        let tile = Tile::new(TileKind::Note, Point::new(10.0, 20.0), 100.0, 50.0);
        assert_eq!(tile.bounds(), Rect::new(10.0, 20.0, 110.0, 70.0));
        assert_eq!(tile.center(), Point::new(60.0, 45.0));
    }

    #[test]
    fn test_contains() {
        let tile = Tile::new(TileKind::Note, Point::new(0.0, 0.0), 100.0, 100.0);
        assert!(tile.contains(Point::new(50.0, 50.0)));
        assert!(!tile.contains(Point::new(150.0, 50.0)));
    }

    #[test]
    fn test_sanitize_nan_geometry() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut tile = Tile::new(TileKind::Note, Point::new(f64::NAN, 5.0), f64::NAN, -20.0);
        tile.sanitize(&DefaultMinSizes);
        let min = DefaultMinSizes.min_size(TileKind::Note);
        assert_eq!(tile.position, Point::ZERO);
        assert!((tile.width - min.width).abs() < f64::EPSILON);
        assert!((tile.height - min.height).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sanitize_keeps_valid_geometry() {
        let mut tile = Tile::new(TileKind::Note, Point::new(10.0, 10.0), 300.0, 300.0);
        tile.sanitize(&DefaultMinSizes);
        assert!((tile.width - 300.0).abs() < f64::EPSILON);
        assert!((tile.height - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_document_minimum_keeps_aspect() {
        let min = DefaultMinSizes.min_size(TileKind::Document);
        assert!((min.height - min.width * DOCUMENT_ASPECT).abs() < 1e-9);
    }

    #[test]
    fn test_content_kind_roundtrip() {
        for kind in [
            TileKind::Text,
            TileKind::Code,
            TileKind::Note,
            TileKind::Image,
            TileKind::Mermaid,
            TileKind::Shape,
            TileKind::Document,
            TileKind::Bookmark,
        ] {
            assert_eq!(TileContent::empty(kind).kind(), kind);
        }
    }

    #[test]
    fn test_serde_roundtrip() {
        let tile = Tile::new(TileKind::Code, Point::new(1.0, 2.0), 400.0, 300.0);
        let json = serde_json::to_string(&tile).unwrap();
        let back: Tile = serde_json::from_str(&json).unwrap();
        assert_eq!(tile, back);
    }
}
