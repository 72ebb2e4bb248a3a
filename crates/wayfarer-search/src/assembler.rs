use std::sync::Arc;
use wayfarer_core::error::{Result, WayfarerError};
use wayfarer_core::models::{Coordinate, NewRoute, ScoredLocation, TravelProfile, UserId};
use wayfarer_providers::DirectionsProvider;

/// Turns chosen locations into a navigable route
#[derive(Clone)]
pub struct RouteAssembler {
    directions: Arc<dyn DirectionsProvider>,
}

impl RouteAssembler {
    pub fn new(directions: Arc<dyn DirectionsProvider>) -> Self {
        Self { directions }
    }

    /// Request directions from `start` through every chosen location
    ///
    /// The returned route lists only the chosen locations; its geometry
    /// begins at `start`.
    pub async fn assemble_route(
        &self,
        start: Coordinate,
        chosen: &[ScoredLocation],
        profile: TravelProfile,
        created_by: UserId,
    ) -> Result<NewRoute> {
        if chosen.is_empty() {
            return Err(WayfarerError::RoutingFailure {
                reason: "No locations to route through".to_string(),
            });
        }

        let waypoints: Vec<Coordinate> =
            std::iter::once(start).chain(chosen.iter().map(|l| l.coordinate)).collect();

        let directions = self.directions.directions(&waypoints, profile).await?;
        if directions.geometry.is_empty() {
            return Err(WayfarerError::RoutingFailure {
                reason: format!("{} returned an empty route", self.directions.name()),
            });
        }

        let instructions = directions.instructions();
        tracing::info!(
            provider = self.directions.name(),
            profile = %profile,
            waypoints = waypoints.len(),
            instructions = instructions.len(),
            duration_secs = directions.duration_secs,
            "Assembled route"
        );

        Ok(NewRoute {
            created_by,
            locations: chosen.iter().map(|l| l.name.clone()).collect(),
            location_coordinates: chosen.iter().map(|l| l.coordinate).collect(),
            geometry: directions.geometry,
            instructions,
            duration_secs: directions.duration_secs,
        })
    }
}
