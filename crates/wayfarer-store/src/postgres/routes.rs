use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::Row;
use wayfarer_core::error::{Result, WayfarerError};
use wayfarer_core::models::{Coordinate, NewRoute, Route, RouteId, UserId};

use super::{storage_error, PostgresStore};
use crate::ports::RouteStore;

/// Split coordinates into the parallel latitude/longitude arrays the schema stores
fn split_coordinates(coords: &[Coordinate]) -> (Vec<f64>, Vec<f64>) {
    coords.iter().map(|c| (c.latitude, c.longitude)).unzip()
}

fn zip_coordinates(
    latitudes: Vec<f64>,
    longitudes: Vec<f64>,
    column: &str,
) -> Result<Vec<Coordinate>> {
    if latitudes.len() != longitudes.len() {
        return Err(WayfarerError::Storage(format!(
            "{} has {} latitudes but {} longitudes",
            column,
            latitudes.len(),
            longitudes.len()
        )));
    }

    Ok(latitudes.into_iter().zip(longitudes).map(|(lat, lon)| Coordinate::new(lat, lon)).collect())
}

fn route_from_row(row: &PgRow) -> Result<Route> {
    let get_f64s = |name: &str| -> Result<Vec<f64>> {
        row.try_get(name).map_err(|e| storage_error(&format!("read {}", name), e))
    };

    let created_at: DateTime<Utc> =
        row.try_get("created_at").map_err(|e| storage_error("read created_at", e))?;

    Ok(Route {
        route_id: RouteId(row.try_get("id").map_err(|e| storage_error("read id", e))?),
        created_by: UserId(
            row.try_get("created_by").map_err(|e| storage_error("read created_by", e))?,
        ),
        locations: row.try_get("locations").map_err(|e| storage_error("read locations", e))?,
        location_coordinates: zip_coordinates(
            get_f64s("location_latitudes")?,
            get_f64s("location_longitudes")?,
            "location coordinates",
        )?,
        geometry: zip_coordinates(
            get_f64s("route_latitudes")?,
            get_f64s("route_longitudes")?,
            "route geometry",
        )?,
        instructions: row
            .try_get("instructions")
            .map_err(|e| storage_error("read instructions", e))?,
        duration_secs: row.try_get("duration").map_err(|e| storage_error("read duration", e))?,
        created_at,
    })
}

#[async_trait]
impl RouteStore for PostgresStore {
    async fn create_route(&self, route: NewRoute) -> Result<Route> {
        let (location_latitudes, location_longitudes) =
            split_coordinates(&route.location_coordinates);
        let (route_latitudes, route_longitudes) = split_coordinates(&route.geometry);

        let row = sqlx::query(
            r#"
            INSERT INTO routes (
                created_by, locations, location_latitudes, location_longitudes,
                route_latitudes, route_longitudes, instructions, duration
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, created_at
            "#,
        )
        .bind(route.created_by.0)
        .bind(&route.locations)
        .bind(&location_latitudes)
        .bind(&location_longitudes)
        .bind(&route_latitudes)
        .bind(&route_longitudes)
        .bind(&route.instructions)
        .bind(route.duration_secs)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("insert route", e))?;

        let route_id = RouteId(row.try_get("id").map_err(|e| storage_error("read id", e))?);
        let created_at: DateTime<Utc> =
            row.try_get("created_at").map_err(|e| storage_error("read created_at", e))?;

        Ok(Route::from_new(route_id, route, created_at))
    }

    async fn get_route(&self, id: RouteId) -> Result<Option<Route>> {
        let row = sqlx::query(
            r#"
            SELECT id, created_by, locations, location_latitudes, location_longitudes,
                   route_latitudes, route_longitudes, instructions, duration, created_at
            FROM routes
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("fetch route", e))?;

        row.as_ref().map(route_from_row).transpose()
    }

    async fn route_image(&self, id: RouteId) -> Result<Option<String>> {
        sqlx::query_scalar("SELECT route_image_name FROM route_images WHERE route_id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("fetch route image", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_and_zip_coordinates() {
        let coords = vec![Coordinate::new(-37.8, 144.9), Coordinate::new(-37.9, 145.0)];
        let (lats, lons) = split_coordinates(&coords);

        assert_eq!(lats, vec![-37.8, -37.9]);
        assert_eq!(lons, vec![144.9, 145.0]);
        assert_eq!(zip_coordinates(lats, lons, "route").unwrap(), coords);
    }

    #[test]
    fn test_zip_rejects_ragged_arrays() {
        let result = zip_coordinates(vec![1.0, 2.0], vec![1.0], "route geometry");
        assert!(matches!(result, Err(WayfarerError::Storage(_))));
    }
}
