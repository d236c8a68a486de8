use geo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Wire shape of a bounding box: the four edges in degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct BoundsEdges {
    west: f64,
    south: f64,
    east: f64,
    north: f64,
}

impl From<BoundsEdges> for MapBounds {
    fn from(edges: BoundsEdges) -> Self {
        MapBounds::new(edges.west, edges.south, edges.east, edges.north)
    }
}

impl From<MapBounds> for BoundsEdges {
    fn from(bounds: MapBounds) -> Self {
        BoundsEdges {
            west: bounds.west(),
            south: bounds.south(),
            east: bounds.east(),
            north: bounds.north(),
        }
    }
}

/// A geographic rectangle in WGS84 degrees.
///
/// Wraps `geo::Rect`, so construction always yields `west <= east` and
/// `south <= north`: inverted edges are swapped rather than rejected.
/// Serializes as `{"west", "south", "east", "north"}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "BoundsEdges", into = "BoundsEdges")]
pub struct MapBounds {
    /// The underlying geometric rectangle (x = longitude, y = latitude)
    pub rect: Rect,
}

impl MapBounds {
    /// Create bounds from the four edges.
    ///
    /// # Examples
    ///
    /// ```
    /// use vacancy_types::bounds::MapBounds;
    ///
    /// let bounds = MapBounds::new(129.2, 35.3, 129.0, 35.1);
    /// assert_eq!(bounds.west(), 129.0);
    /// assert_eq!(bounds.north(), 35.3);
    /// ```
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            rect: Rect::new(
                geo::coord! { x: west, y: south },
                geo::coord! { x: east, y: north },
            ),
        }
    }

    pub fn west(&self) -> f64 {
        self.rect.min().x
    }

    pub fn south(&self) -> f64 {
        self.rect.min().y
    }

    pub fn east(&self) -> f64 {
        self.rect.max().x
    }

    pub fn north(&self) -> f64 {
        self.rect.max().y
    }

    /// All four edges are finite.
    pub fn is_finite(&self) -> bool {
        [self.west(), self.south(), self.east(), self.north()]
            .iter()
            .all(|v| v.is_finite())
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.west() + self.east()) / 2.0,
            (self.south() + self.north()) / 2.0,
        )
    }

    /// Inclusive containment test on all four edges.
    pub fn contains(&self, point: &Point) -> bool {
        point.x() >= self.west()
            && point.x() <= self.east()
            && point.y() >= self.south()
            && point.y() <= self.north()
    }
}

/// What the map widget is currently showing: bounds plus an integer zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub bounds: MapBounds,
    pub zoom: u8,
}

impl Viewport {
    pub fn new(bounds: MapBounds, zoom: u8) -> Self {
        Self { bounds, zoom }
    }

    /// Build a viewport from a widget that reports fractional zoom levels.
    /// The zoom is floored; negative and non-finite values become 0.
    pub fn from_fractional_zoom(bounds: MapBounds, zoom: f64) -> Self {
        let zoom = if zoom.is_finite() {
            zoom.floor().clamp(0.0, f64::from(u8::MAX)) as u8
        } else {
            0
        };
        Self { bounds, zoom }
    }
}
