//! Distance and centroid helpers built on the geo crate.

use geo::{Distance, Euclidean, Geodesic, Haversine, Point};
use std::cmp::Ordering;

/// Distance metrics for ranking markers around a focal point.
///
/// - **Haversine**: spherical great-circle distance, the default
/// - **Geodesic**: ellipsoidal distance (Karney 2013), slower
/// - **Euclidean**: planar distance in degrees, only useful for tiny areas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMetric {
    #[default]
    Haversine,
    Geodesic,
    Euclidean,
}

/// Distance between two lng/lat points, in meters for the geographic metrics.
///
/// # Examples
///
/// ```rust
/// use vacancy_map::spatial::{distance_between, DistanceMetric};
/// use geo::Point;
///
/// let seomyeon = Point::new(129.0590, 35.1578);
/// let haeundae = Point::new(129.1604, 35.1631);
///
/// let dist = distance_between(&seomyeon, &haeundae, DistanceMetric::Haversine);
/// assert!(dist > 9_000.0 && dist < 10_000.0);
/// ```
pub fn distance_between(point1: &Point, point2: &Point, metric: DistanceMetric) -> f64 {
    match metric {
        DistanceMetric::Haversine => Haversine.distance(*point1, *point2),
        DistanceMetric::Geodesic => Geodesic.distance(*point1, *point2),
        DistanceMetric::Euclidean => Euclidean.distance(*point1, *point2),
    }
}

/// Sort items by distance from `center`, nearest first.
///
/// `position` extracts each item's location. Ties keep their input order.
pub fn sort_by_distance<T>(
    items: &mut [T],
    center: &Point,
    metric: DistanceMetric,
    position: impl Fn(&T) -> Point,
) {
    let mut keyed: Vec<(f64, usize)> = items
        .iter()
        .enumerate()
        .map(|(i, item)| (distance_between(center, &position(item), metric), i))
        .collect();

    keyed.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(Ordering::Equal)
            .then(a.1.cmp(&b.1))
    });

    apply_permutation(items, keyed.into_iter().map(|(_, i)| i).collect());
}

/// Reorder `items` so that position `k` holds the element previously at `order[k]`.
fn apply_permutation<T>(items: &mut [T], mut order: Vec<usize>) {
    for start in 0..order.len() {
        let mut current = start;
        while order[current] != start {
            let next = order[current];
            items.swap(current, next);
            order[current] = current;
            current = next;
        }
        order[current] = current;
    }
}

/// Arithmetic mean of lng/lat positions, or `None` for an empty set.
pub fn centroid<I>(points: I) -> Option<Point>
where
    I: IntoIterator<Item = Point>,
{
    let (mut sum_x, mut sum_y, mut count) = (0.0, 0.0, 0usize);
    for point in points {
        sum_x += point.x();
        sum_y += point.y();
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some(Point::new(sum_x / count as f64, sum_y / count as f64))
}
