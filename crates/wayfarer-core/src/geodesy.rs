//! Geodesic helpers over WGS 84 coordinates

use geo::{Bearing, Distance, Haversine, Point};

use crate::models::Coordinate;

impl From<Coordinate> for Point<f64> {
    fn from(coord: Coordinate) -> Self {
        Point::new(coord.longitude, coord.latitude)
    }
}

/// Great-circle distance between two coordinates in meters
pub fn geodesic_distance(a: Coordinate, b: Coordinate) -> f64 {
    Haversine.distance(Point::from(a), Point::from(b))
}

/// Initial compass bearing from `a` to `b`, in degrees within [0, 360)
pub fn initial_bearing(a: Coordinate, b: Coordinate) -> f64 {
    Haversine.bearing(Point::from(a), Point::from(b)).rem_euclid(360.0)
}

/// Total length of a polyline in meters
pub fn path_length(path: &[Coordinate]) -> f64 {
    path.windows(2).map(|pair| geodesic_distance(pair[0], pair[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_self_is_zero() {
        let c = Coordinate::new(-37.81803, 144.9549);
        assert_eq!(geodesic_distance(c, c), 0.0);
    }

    #[test]
    fn test_short_distance_in_melbourne() {
        // Flinders Street Station to Federation Square, under 200m apart
        let station = Coordinate::new(-37.8183, 144.9671);
        let square = Coordinate::new(-37.8180, 144.9691);
        let d = geodesic_distance(station, square);
        assert!(d > 150.0 && d < 250.0, "unexpected distance {d}");
    }

    #[test]
    fn test_initial_bearing_cardinal_directions() {
        let origin = Coordinate::new(0.0, 0.0);
        let north = initial_bearing(origin, Coordinate::new(1.0, 0.0));
        let east = initial_bearing(origin, Coordinate::new(0.0, 1.0));
        let west = initial_bearing(origin, Coordinate::new(0.0, -1.0));

        assert!(north.abs() < 1e-6 || (north - 360.0).abs() < 1e-6);
        assert!((east - 90.0).abs() < 1e-6);
        assert!((west - 270.0).abs() < 1e-6);
    }

    #[test]
    fn test_path_length_sums_segments() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 0.01);
        let c = Coordinate::new(0.0, 0.02);
        let total = path_length(&[a, b, c]);
        let direct = geodesic_distance(a, c);
        assert!((total - direct).abs() < 1e-6);
        assert_eq!(path_length(&[a]), 0.0);
        assert_eq!(path_length(&[]), 0.0);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn coordinate() -> impl Strategy<Value = Coordinate> {
            (-80.0f64..80.0, -179.0f64..179.0).prop_map(|(lat, lon)| Coordinate::new(lat, lon))
        }

        proptest! {
            #[test]
            fn distance_is_symmetric(a in coordinate(), b in coordinate()) {
                let ab = geodesic_distance(a, b);
                let ba = geodesic_distance(b, a);
                prop_assert!(ab >= 0.0);
                prop_assert!((ab - ba).abs() <= 1e-6 * ab.max(1.0));
            }

            #[test]
            fn distance_obeys_triangle_inequality(
                a in coordinate(),
                b in coordinate(),
                c in coordinate(),
            ) {
                let direct = geodesic_distance(a, c);
                let via = geodesic_distance(a, b) + geodesic_distance(b, c);
                prop_assert!(direct <= via + 1e-6 * via.max(1.0));
            }
        }
    }
}
