use async_trait::async_trait;
use chrono::{DateTime, Utc};
use wayfarer_core::error::{Result, WayfarerError};
use wayfarer_core::models::{RouteId, UserId, Vote};

use super::{storage_error, PostgresStore};
use crate::ports::VoteStore;

#[async_trait]
impl VoteStore for PostgresStore {
    async fn add_vote(&self, route_id: RouteId, user_id: UserId) -> Result<Vote> {
        // The primary key enforces one vote per (user, route); a conflict
        // returns no row.
        let created_at: Option<DateTime<Utc>> = sqlx::query_scalar(
            r#"
            INSERT INTO user_route_votes (user_id, route_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, route_id) DO NOTHING
            RETURNING created_at
            "#,
        )
        .bind(user_id.0)
        .bind(route_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("insert vote", e))?;

        match created_at {
            Some(created_at) => Ok(Vote { user_id, route_id, created_at }),
            None => Err(WayfarerError::AlreadyVoted { route_id }),
        }
    }

    async fn remove_vote(&self, route_id: RouteId, user_id: UserId) -> Result<()> {
        let result =
            sqlx::query("DELETE FROM user_route_votes WHERE user_id = $1 AND route_id = $2")
                .bind(user_id.0)
                .bind(route_id.0)
                .execute(&self.pool)
                .await
                .map_err(|e| storage_error("delete vote", e))?;

        if result.rows_affected() == 0 {
            return Err(WayfarerError::VoteNotFound { route_id });
        }
        Ok(())
    }

    async fn count_votes(&self, route_id: RouteId) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM user_route_votes WHERE route_id = $1")
            .bind(route_id.0)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_error("count votes", e))
    }

    async fn has_voted(&self, route_id: RouteId, user_id: UserId) -> Result<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM user_route_votes WHERE user_id = $1 AND route_id = $2)",
        )
        .bind(user_id.0)
        .bind(route_id.0)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("check vote", e))
    }
}
