use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use wayfarer_core::error::Result;
use wayfarer_core::models::{Category, LocationId, NewPrompt, Prompt, PromptId, RouteId};

use super::{storage_error, PostgresStore};
use crate::ports::PromptStore;

#[async_trait]
impl PromptStore for PostgresStore {
    async fn create_prompt(&self, prompt: &NewPrompt) -> Result<Prompt> {
        let location_types: Vec<&str> = prompt.categories.iter().map(|c| c.as_str()).collect();

        let row = sqlx::query(
            r#"
            INSERT INTO prompts (created_by, prompt, negative_prompt, location_type)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created_at
            "#,
        )
        .bind(prompt.created_by.0)
        .bind(&prompt.queries)
        .bind(&prompt.negative_queries)
        .bind(&location_types)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("insert prompt", e))?;

        let created_at: DateTime<Utc> =
            row.try_get("created_at").map_err(|e| storage_error("read created_at", e))?;

        Ok(Prompt {
            prompt_id: PromptId(row.try_get("id").map_err(|e| storage_error("read id", e))?),
            created_by: prompt.created_by,
            queries: prompt.queries.clone(),
            negative_queries: prompt.negative_queries.clone(),
            categories: prompt.categories.clone(),
            created_at,
        })
    }

    async fn link_location(
        &self,
        prompt_id: PromptId,
        category: Category,
        location_id: LocationId,
    ) -> Result<()> {
        let table = category.tables().prompt_links;
        let sql = format!(
            "INSERT INTO {} (prompt_id, location_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            table
        );

        sqlx::query(&sql)
            .bind(prompt_id.0)
            .bind(location_id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error(&format!("insert into {}", table), e))?;
        Ok(())
    }

    async fn link_route(&self, prompt_id: PromptId, route_id: RouteId) -> Result<()> {
        sqlx::query(
            "INSERT INTO prompt_routes (prompt_id, route_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(prompt_id.0)
        .bind(route_id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("insert into prompt_routes", e))?;
        Ok(())
    }
}
