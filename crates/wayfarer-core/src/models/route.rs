use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::location::Coordinate;
use super::timestamp;
use crate::error::WayfarerError;

/// Route identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(pub i64);

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RouteId {
    type Err = WayfarerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>()
            .map(RouteId)
            .map_err(|_| WayfarerError::invalid_query(format!("invalid route id '{}'", s)))
    }
}

/// User identifier issued by the external authentication service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Route content produced by the assembler, before it has an id
#[derive(Debug, Clone, PartialEq)]
pub struct NewRoute {
    pub created_by: UserId,
    pub locations: Vec<String>,
    pub location_coordinates: Vec<Coordinate>,
    pub geometry: Vec<Coordinate>,
    pub instructions: Vec<String>,
    pub duration_secs: f64,
}

/// Persisted route; immutable after creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub route_id: RouteId,
    pub created_by: UserId,
    pub locations: Vec<String>,
    pub location_coordinates: Vec<Coordinate>,
    pub geometry: Vec<Coordinate>,
    pub instructions: Vec<String>,
    pub duration_secs: f64,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Route {
    pub fn from_new(route_id: RouteId, new: NewRoute, created_at: DateTime<Utc>) -> Self {
        Self {
            route_id,
            created_by: new.created_by,
            locations: new.locations,
            location_coordinates: new.location_coordinates,
            geometry: new.geometry,
            instructions: new.instructions,
            duration_secs: new.duration_secs,
            created_at,
        }
    }
}

/// Display form of a route, as stored in the detail cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDetail {
    pub route_id: RouteId,
    pub created_by: UserId,
    pub locations: Vec<String>,
    pub locations_coordinates: Vec<Coordinate>,
    pub route: Vec<Coordinate>,
    pub instructions: Vec<String>,
    pub duration: f64,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    pub image_name: Option<String>,
}

impl RouteDetail {
    pub fn from_route(route: Route, image_name: Option<String>) -> Self {
        Self {
            route_id: route.route_id,
            created_by: route.created_by,
            locations: route.locations,
            locations_coordinates: route.location_coordinates,
            route: route.geometry,
            instructions: route.instructions,
            duration: route.duration_secs,
            created_at: route.created_at,
            image_name,
        }
    }
}

/// Route detail annotated with live vote information for one viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub route: RouteDetail,
    pub num_votes: i64,
    pub voted_by_user: bool,
}
