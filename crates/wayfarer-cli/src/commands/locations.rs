use crate::cli::{ImportArgs, LocationsArgs, LocationsCommand};
use crate::output::OutputWriter;
use crate::settings::ollama_url;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use wayfarer_core::config::LayeredConfig;
use wayfarer_core::models::{Category, Coordinate, LocationCandidate, LocationId};
use wayfarer_providers::{Embedder, OllamaEmbedder};
use wayfarer_store::GeoIndex;

use super::connect_postgres;

/// One record of an import file
#[derive(Debug, Clone, Deserialize)]
struct LocationRecord {
    id: i64,
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    embedding: Option<Vec<f32>>,
    /// Text to embed instead of the name
    #[serde(default)]
    description: Option<String>,
}

impl LocationRecord {
    fn embedding_text(&self) -> &str {
        self.description.as_deref().filter(|d| !d.trim().is_empty()).unwrap_or(&self.name)
    }
}

/// Execute location data commands
pub async fn execute(args: LocationsArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    match args.command {
        LocationsCommand::Import(import) => execute_import(import, config, output).await,
    }
}

async fn execute_import(args: ImportArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let category: Category = args.category.parse()?;
    let mut records = read_records(&args.file)?;
    output.info(format!("Read {} {} record(s) from {}", records.len(), category, args.file.display()));

    let dimensions = config.embedder_dimensions.value;
    let missing: Vec<usize> =
        records.iter().enumerate().filter(|(_, r)| r.embedding.is_none()).map(|(i, _)| i).collect();

    if !missing.is_empty() {
        let embedder =
            OllamaEmbedder::new(ollama_url(), config.embedder_model.value.clone(), dimensions);
        output.info(format!(
            "Embedding {} record(s) with {}",
            missing.len(),
            embedder.model_name()
        ));

        let texts: Vec<&str> = missing.iter().map(|&i| records[i].embedding_text()).collect();
        let vectors = embedder.embed(&texts).await.context("Failed to embed locations")?;
        if vectors.len() != missing.len() {
            bail!("Embedder returned {} vectors for {} texts", vectors.len(), missing.len());
        }
        for (i, vector) in missing.into_iter().zip(vectors) {
            records[i].embedding = Some(vector);
        }
    }

    let candidates = to_candidates(records, category, dimensions)?;

    if args.dry_run {
        output.success(format!("Dry run: {} {} location(s) ready to import", candidates.len(), category));
        return Ok(());
    }

    let store = connect_postgres().await?;
    let written = store
        .upsert_locations(category, &candidates)
        .await
        .with_context(|| format!("Failed to import {} locations", category))?;
    let total = store.count_locations(category).await.context("Failed to count locations")?;

    output.success(format!("Imported {} {} location(s); {} stored", written, category, total));
    Ok(())
}

fn read_records(path: &Path) -> Result<Vec<LocationRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of location records", path.display()))
}

/// Validate fully embedded records and convert them into index rows
fn to_candidates(
    records: Vec<LocationRecord>,
    category: Category,
    dimensions: usize,
) -> Result<Vec<LocationCandidate>> {
    records
        .into_iter()
        .map(|record| {
            if !(-90.0..=90.0).contains(&record.latitude)
                || !(-180.0..=180.0).contains(&record.longitude)
            {
                bail!(
                    "Location {} ({}) has out-of-range coordinates {}, {}",
                    record.id,
                    record.name,
                    record.latitude,
                    record.longitude
                );
            }
            let embedding = match record.embedding {
                Some(embedding) if embedding.len() == dimensions => embedding,
                Some(embedding) => bail!(
                    "Location {} ({}) has a {}-dimensional embedding; expected {}",
                    record.id,
                    record.name,
                    embedding.len(),
                    dimensions
                ),
                None => bail!("Location {} ({}) has no embedding", record.id, record.name),
            };
            Ok(LocationCandidate {
                id: LocationId(record.id),
                name: record.name,
                coordinate: Coordinate::new(record.latitude, record.longitude),
                category,
                embedding,
            })
        })
        .collect()
}
