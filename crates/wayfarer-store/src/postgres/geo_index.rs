use async_trait::async_trait;
use sqlx::Row;
use wayfarer_core::error::Result;
use wayfarer_core::models::{Category, Coordinate, LocationCandidate, LocationId, ScoredLocation};

use super::vector::format_pgvector;
use super::{storage_error, PostgresStore};
use crate::ports::{GeoIndex, GeoQuery};

/// Build the similarity query for one category table
///
/// Placeholders: $1 query vector, $2 longitude, $3 latitude, $4 distance in
/// meters, $5 similarity threshold, $6 excluded names, $7 limit, and with a
/// negative filter $8 negative vector and $9 negative threshold.
pub(crate) fn nearest_similar_sql(table: &str, with_negative: bool) -> String {
    let negative_clause = if with_negative {
        "\n  AND 1 - (embedding <=> $8::vector) < $9"
    } else {
        ""
    };

    format!(
        r#"SELECT id, name, ST_Y(coord) AS latitude, ST_X(coord) AS longitude,
       1 - (embedding <=> $1::vector) AS similarity
FROM {table}
WHERE ST_DWithin(coord::geography, ST_SetSRID(ST_MakePoint($2, $3), 4326)::geography, $4)
  AND 1 - (embedding <=> $1::vector) > $5
  AND NOT (name = ANY($6)){negative_clause}
ORDER BY similarity DESC
LIMIT $7"#
    )
}

#[async_trait]
impl GeoIndex for PostgresStore {
    async fn nearest_similar(&self, query: &GeoQuery) -> Result<Vec<ScoredLocation>> {
        let table = query.category.tables().locations;
        let sql = nearest_similar_sql(table, query.negative.is_some());

        let mut statement = sqlx::query(&sql)
            .bind(format_pgvector(&query.embedding))
            .bind(query.origin.longitude)
            .bind(query.origin.latitude)
            .bind(query.distance_threshold)
            .bind(query.similarity_threshold)
            .bind(&query.excluded_names)
            .bind(query.limit as i64);

        if let Some(negative) = &query.negative {
            statement = statement.bind(format_pgvector(&negative.embedding)).bind(negative.threshold);
        }

        let rows = statement
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error(&format!("query {}", table), e))?;

        rows.into_iter()
            .map(|row| -> Result<ScoredLocation> {
                Ok(ScoredLocation {
                    id: LocationId(row.try_get("id").map_err(|e| storage_error("read id", e))?),
                    name: row.try_get("name").map_err(|e| storage_error("read name", e))?,
                    category: query.category,
                    coordinate: Coordinate::new(
                        row.try_get("latitude").map_err(|e| storage_error("read latitude", e))?,
                        row.try_get("longitude").map_err(|e| storage_error("read longitude", e))?,
                    ),
                    similarity: row
                        .try_get("similarity")
                        .map_err(|e| storage_error("read similarity", e))?,
                })
            })
            .collect()
    }

    async fn upsert_locations(
        &self,
        category: Category,
        locations: &[LocationCandidate],
    ) -> Result<usize> {
        if locations.is_empty() {
            return Ok(0);
        }

        let table = category.tables().locations;
        let sql = format!(
            r#"INSERT INTO {table} (id, name, coord, embedding)
VALUES ($1, $2, ST_SetSRID(ST_MakePoint($3, $4), 4326), $5::vector)
ON CONFLICT (id) DO UPDATE
SET name = EXCLUDED.name,
    coord = EXCLUDED.coord,
    embedding = EXCLUDED.embedding"#
        );

        let mut tx = self.pool.begin().await.map_err(|e| storage_error("begin transaction", e))?;

        for location in locations {
            sqlx::query(&sql)
                .bind(location.id.0)
                .bind(&location.name)
                .bind(location.coordinate.longitude)
                .bind(location.coordinate.latitude)
                .bind(format_pgvector(&location.embedding))
                .execute(&mut *tx)
                .await
                .map_err(|e| storage_error(&format!("upsert into {}", table), e))?;
        }

        tx.commit().await.map_err(|e| storage_error("commit transaction", e))?;

        tracing::info!(category = %category, count = locations.len(), "Upserted locations");
        Ok(locations.len())
    }

    async fn count_locations(&self, category: Category) -> Result<usize> {
        let table = category.tables().locations;
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_error(&format!("count {}", table), e))?;
        Ok(count as usize)
    }
}
