//! The 3-D point type shared by the color space and the k-d forest.

use nalgebra::Point3;

/// A point in whichever color space the run is configured for (RGB, L*a*b*
/// or L*u*v*). Always finite, double precision, immutable once constructed.
pub type Coord = Point3<f64>;

/// Squared Euclidean distance between two coordinates.
///
/// The k-d forest never needs the actual distance, only a value it can
/// compare, so every search path works in squared distance and avoids the
/// square root.
pub fn dist_squared(a: &Coord, b: &Coord) -> f64 {
    nalgebra::distance_squared(a, b)
}
