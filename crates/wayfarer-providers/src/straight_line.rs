//! Offline directions: straight segments between waypoints

use async_trait::async_trait;
use wayfarer_core::error::{Result, WayfarerError};
use wayfarer_core::geodesy::{geodesic_distance, initial_bearing};
use wayfarer_core::models::{Coordinate, TravelProfile};

use crate::ports::{Directions, DirectionsProvider, Leg};

const COMPASS: [&str; 8] =
    ["north", "northeast", "east", "southeast", "south", "southwest", "west", "northwest"];

/// Compass point for a bearing in degrees
fn compass_point(bearing: f64) -> &'static str {
    let index = ((bearing.rem_euclid(360.0) + 22.5) / 45.0) as usize % COMPASS.len();
    COMPASS[index]
}

/// Directions provider that connects waypoints with straight lines
///
/// Used when no routing service is configured. Durations assume a constant
/// speed per travel profile.
#[derive(Debug, Clone, Default)]
pub struct StraightLineDirections;

impl StraightLineDirections {
    pub fn new() -> Self {
        Self
    }

    /// Assumed average speed in meters per second
    pub fn speed(profile: TravelProfile) -> f64 {
        match profile {
            TravelProfile::Walking => 1.4,
            TravelProfile::Cycling => 4.2,
            TravelProfile::Driving => 11.1,
        }
    }
}

#[async_trait]
impl DirectionsProvider for StraightLineDirections {
    async fn directions(
        &self,
        waypoints: &[Coordinate],
        profile: TravelProfile,
    ) -> Result<Directions> {
        if waypoints.len() < 2 {
            return Err(WayfarerError::RoutingFailure {
                reason: format!("At least 2 waypoints are required, got {}", waypoints.len()),
            });
        }

        let speed = Self::speed(profile);
        let mut total_meters = 0.0;
        let legs = waypoints
            .windows(2)
            .enumerate()
            .map(|(i, pair)| {
                let meters = geodesic_distance(pair[0], pair[1]);
                total_meters += meters;
                Leg {
                    instructions: vec![format!(
                        "Head {} for {:.0} m to stop {}",
                        compass_point(initial_bearing(pair[0], pair[1])),
                        meters,
                        i + 1
                    )],
                }
            })
            .collect();

        Ok(Directions {
            geometry: waypoints.to_vec(),
            legs,
            duration_secs: total_meters / speed,
        })
    }

    fn name(&self) -> &str {
        "straight-line"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compass_point() {
        assert_eq!(compass_point(0.0), "north");
        assert_eq!(compass_point(359.0), "north");
        assert_eq!(compass_point(44.0), "northeast");
        assert_eq!(compass_point(90.0), "east");
        assert_eq!(compass_point(200.0), "south");
        assert_eq!(compass_point(-90.0), "west");
    }

    #[tokio::test]
    async fn test_one_leg_per_segment() {
        let waypoints = [
            Coordinate::new(-37.81803, 144.9549),
            Coordinate::new(-37.8090, 144.9549),
            Coordinate::new(-37.8090, 144.9649),
        ];

        let directions =
            StraightLineDirections::new().directions(&waypoints, TravelProfile::Walking).await.unwrap();

        assert_eq!(directions.geometry, waypoints.to_vec());
        assert_eq!(directions.legs.len(), 2);
        assert!(directions.instructions()[0].starts_with("Head north"));
        assert!(directions.instructions()[1].starts_with("Head east"));
        assert!(directions.duration_secs > 0.0);
    }

    #[tokio::test]
    async fn test_faster_profiles_take_less_time() {
        let waypoints = [Coordinate::new(-37.81803, 144.9549), Coordinate::new(-37.8033, 144.9717)];
        let provider = StraightLineDirections::new();

        let walking = provider.directions(&waypoints, TravelProfile::Walking).await.unwrap();
        let driving = provider.directions(&waypoints, TravelProfile::Driving).await.unwrap();
        assert!(driving.duration_secs < walking.duration_secs);
    }

    #[tokio::test]
    async fn test_single_waypoint_fails() {
        let result = StraightLineDirections::new()
            .directions(&[Coordinate::new(0.0, 0.0)], TravelProfile::Cycling)
            .await;
        assert!(matches!(result, Err(WayfarerError::RoutingFailure { .. })));
    }
}
