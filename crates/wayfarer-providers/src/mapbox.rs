//! Mapbox Directions API adapter

use async_trait::async_trait;
use serde::Deserialize;
use wayfarer_core::error::{Result, WayfarerError};
use wayfarer_core::models::{Coordinate, TravelProfile};

use crate::ports::{Directions, DirectionsProvider, Leg};

const DEFAULT_BASE_URL: &str = "https://api.mapbox.com";

/// Mapbox accepts at most this many waypoints per request
const MAX_WAYPOINTS: usize = 25;

/// Directions provider backed by the Mapbox Directions API
pub struct MapboxDirections {
    base_url: String,
    access_token: String,
    client: reqwest::Client,
}

impl MapboxDirections {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, access_token)
    }

    /// Point the adapter at a different host, e.g. a local mock server
    pub fn with_base_url(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            client: reqwest::Client::new(),
        }
    }

    fn profile_path(profile: TravelProfile) -> &'static str {
        match profile {
            TravelProfile::Driving => "mapbox/driving",
            TravelProfile::Walking => "mapbox/walking",
            TravelProfile::Cycling => "mapbox/cycling",
        }
    }

    /// Request URL for the given waypoints; coordinates go as `lon,lat;lon,lat`
    pub fn request_url(
        &self,
        waypoints: &[Coordinate],
        profile: TravelProfile,
    ) -> Result<reqwest::Url> {
        let coordinates = waypoints
            .iter()
            .map(|c| format!("{},{}", c.longitude, c.latitude))
            .collect::<Vec<_>>()
            .join(";");

        let base = format!(
            "{}/directions/v5/{}/{}",
            self.base_url,
            Self::profile_path(profile),
            coordinates
        );

        reqwest::Url::parse_with_params(
            &base,
            &[
                ("geometries", "geojson"),
                ("steps", "true"),
                ("overview", "full"),
                ("access_token", self.access_token.as_str()),
            ],
        )
        .map_err(|e| WayfarerError::RoutingFailure {
            reason: format!("Invalid directions URL: {}", e),
        })
    }
}

#[async_trait]
impl DirectionsProvider for MapboxDirections {
    async fn directions(
        &self,
        waypoints: &[Coordinate],
        profile: TravelProfile,
    ) -> Result<Directions> {
        if waypoints.len() < 2 || waypoints.len() > MAX_WAYPOINTS {
            return Err(WayfarerError::RoutingFailure {
                reason: format!(
                    "Mapbox needs between 2 and {} waypoints, got {}",
                    MAX_WAYPOINTS,
                    waypoints.len()
                ),
            });
        }

        let url = self.request_url(waypoints, profile)?;

        let response = self.client.get(url).send().await.map_err(|e| {
            WayfarerError::RoutingFailure { reason: format!("Mapbox request failed: {}", e) }
        })?;

        let status = response.status();
        let body: MapboxResponse = response.json().await.map_err(|e| {
            WayfarerError::RoutingFailure {
                reason: format!("Failed to parse Mapbox response ({}): {}", status, e),
            }
        })?;

        let directions = body.into_directions()?;
        tracing::debug!(
            profile = %profile,
            waypoints = waypoints.len(),
            duration_secs = directions.duration_secs,
            "Mapbox directions resolved"
        );
        Ok(directions)
    }

    fn name(&self) -> &str {
        "mapbox"
    }
}

#[derive(Debug, Deserialize)]
struct MapboxResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<MapboxRoute>,
}

#[derive(Debug, Deserialize)]
struct MapboxRoute {
    geometry: MapboxGeometry,
    #[serde(default)]
    legs: Vec<MapboxLeg>,
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct MapboxGeometry {
    /// GeoJSON positions, `[lon, lat]`
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct MapboxLeg {
    #[serde(default)]
    steps: Vec<MapboxStep>,
}

#[derive(Debug, Deserialize)]
struct MapboxStep {
    maneuver: MapboxManeuver,
}

#[derive(Debug, Deserialize)]
struct MapboxManeuver {
    instruction: String,
}

impl MapboxResponse {
    /// Take the first (best) route
    fn into_directions(self) -> Result<Directions> {
        if self.code != "Ok" {
            return Err(WayfarerError::RoutingFailure {
                reason: format!(
                    "Mapbox returned {}: {}",
                    self.code,
                    self.message.unwrap_or_default()
                ),
            });
        }

        let route = self.routes.into_iter().next().ok_or_else(|| WayfarerError::RoutingFailure {
            reason: "Mapbox returned no routes".to_string(),
        })?;

        Ok(Directions {
            geometry: route
                .geometry
                .coordinates
                .into_iter()
                .map(|[lon, lat]| Coordinate::new(lat, lon))
                .collect(),
            legs: route
                .legs
                .into_iter()
                .map(|leg| Leg {
                    instructions: leg.steps.into_iter().map(|s| s.maneuver.instruction).collect(),
                })
                .collect(),
            duration_secs: route.duration,
        })
    }
}
