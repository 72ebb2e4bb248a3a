//! In-memory storage implementations for development and testing.
//!
//! These implementations use `RwLock::unwrap()` intentionally. Lock poisoning
//! only occurs when another thread panicked while holding the lock, which is
//! an unrecoverable state. For production workloads, use the PostgreSQL and
//! Redis backends.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use wayfarer_core::error::{Result, WayfarerError};
use wayfarer_core::geodesy::geodesic_distance;
use wayfarer_core::models::{
    Category, LocationCandidate, LocationId, NewPrompt, NewRoute, Prompt, PromptId, Route,
    RouteId, ScoredLocation, UserId, Vote,
};

use crate::ports::{GeoIndex, GeoQuery, KeyValueStore, PromptStore, RouteStore, VoteStore};

/// Calculate cosine similarity between two vectors
///
/// Mirrors pgvector's `1 - (a <=> b)`; mismatched or zero vectors score 0.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f64 = a.iter().zip(b.iter()).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// In-memory implementation of GeoIndex
#[derive(Debug, Clone, Default)]
pub struct MemoryGeoIndex {
    locations: Arc<RwLock<HashMap<Category, Vec<LocationCandidate>>>>,
}

impl MemoryGeoIndex {
    /// Create a new in-memory geo index
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GeoIndex for MemoryGeoIndex {
    async fn nearest_similar(&self, query: &GeoQuery) -> Result<Vec<ScoredLocation>> {
        let locations = self.locations.read().unwrap();
        let Some(rows) = locations.get(&query.category) else {
            return Ok(Vec::new());
        };

        let mut results: Vec<ScoredLocation> = rows
            .iter()
            .filter(|row| !query.excluded_names.contains(&row.name))
            .filter(|row| geodesic_distance(query.origin, row.coordinate) <= query.distance_threshold)
            .filter(|row| match &query.negative {
                Some(negative) => {
                    cosine_similarity(&row.embedding, &negative.embedding) < negative.threshold
                }
                None => true,
            })
            .map(|row| ScoredLocation {
                id: row.id,
                name: row.name.clone(),
                category: row.category,
                coordinate: row.coordinate,
                similarity: cosine_similarity(&row.embedding, &query.embedding),
            })
            .filter(|scored| scored.similarity > query.similarity_threshold)
            .collect();

        results.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        results.truncate(query.limit);

        Ok(results)
    }

    async fn upsert_locations(
        &self,
        category: Category,
        locations: &[LocationCandidate],
    ) -> Result<usize> {
        let mut store = self.locations.write().unwrap();
        let rows = store.entry(category).or_default();

        for location in locations {
            let mut location = location.clone();
            location.category = category;
            match rows.iter_mut().find(|row| row.id == location.id) {
                Some(existing) => *existing = location,
                None => rows.push(location),
            }
        }

        Ok(locations.len())
    }

    async fn count_locations(&self, category: Category) -> Result<usize> {
        Ok(self.locations.read().unwrap().get(&category).map_or(0, Vec::len))
    }
}

/// In-memory implementation of PromptStore
#[derive(Debug, Clone, Default)]
pub struct MemoryPromptStore {
    prompts: Arc<RwLock<Vec<Prompt>>>,
    location_links: Arc<RwLock<Vec<(PromptId, Category, LocationId)>>>,
    route_links: Arc<RwLock<Vec<(PromptId, RouteId)>>>,
}

impl MemoryPromptStore {
    /// Create a new in-memory prompt store
    pub fn new() -> Self {
        Self::default()
    }

    /// All prompts recorded so far
    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.read().unwrap().clone()
    }

    /// Prompt-location join rows, in insertion order
    pub fn location_links(&self) -> Vec<(PromptId, Category, LocationId)> {
        self.location_links.read().unwrap().clone()
    }

    /// Prompt-route join rows, in insertion order
    pub fn route_links(&self) -> Vec<(PromptId, RouteId)> {
        self.route_links.read().unwrap().clone()
    }
}

#[async_trait]
impl PromptStore for MemoryPromptStore {
    async fn create_prompt(&self, prompt: &NewPrompt) -> Result<Prompt> {
        let mut prompts = self.prompts.write().unwrap();
        let record = Prompt {
            prompt_id: PromptId(prompts.len() as i64 + 1),
            created_by: prompt.created_by,
            queries: prompt.queries.clone(),
            negative_queries: prompt.negative_queries.clone(),
            categories: prompt.categories.clone(),
            created_at: Utc::now(),
        };
        prompts.push(record.clone());
        Ok(record)
    }

    async fn link_location(
        &self,
        prompt_id: PromptId,
        category: Category,
        location_id: LocationId,
    ) -> Result<()> {
        self.location_links.write().unwrap().push((prompt_id, category, location_id));
        Ok(())
    }

    async fn link_route(&self, prompt_id: PromptId, route_id: RouteId) -> Result<()> {
        self.route_links.write().unwrap().push((prompt_id, route_id));
        Ok(())
    }
}

/// In-memory implementation of RouteStore
#[derive(Debug, Clone, Default)]
pub struct MemoryRouteStore {
    routes: Arc<RwLock<HashMap<RouteId, Route>>>,
    images: Arc<RwLock<HashMap<RouteId, String>>>,
    next_id: Arc<RwLock<i64>>,
}

impl MemoryRouteStore {
    /// Create a new in-memory route store
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a rendered image to a route
    pub fn attach_image(&self, route_id: RouteId, image_name: impl Into<String>) {
        self.images.write().unwrap().insert(route_id, image_name.into());
    }

    /// Insert a fully-formed route, keeping its id and timestamp
    pub fn insert(&self, route: Route) {
        let mut next_id = self.next_id.write().unwrap();
        *next_id = (*next_id).max(route.route_id.0);
        self.routes.write().unwrap().insert(route.route_id, route);
    }

    /// Number of routes stored
    pub fn len(&self) -> usize {
        self.routes.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RouteStore for MemoryRouteStore {
    async fn create_route(&self, route: NewRoute) -> Result<Route> {
        let route_id = {
            let mut next_id = self.next_id.write().unwrap();
            *next_id += 1;
            RouteId(*next_id)
        };

        let route = Route::from_new(route_id, route, Utc::now());
        self.routes.write().unwrap().insert(route_id, route.clone());
        Ok(route)
    }

    async fn get_route(&self, id: RouteId) -> Result<Option<Route>> {
        Ok(self.routes.read().unwrap().get(&id).cloned())
    }

    async fn route_image(&self, id: RouteId) -> Result<Option<String>> {
        Ok(self.images.read().unwrap().get(&id).cloned())
    }
}

/// In-memory implementation of VoteStore
#[derive(Debug, Clone, Default)]
pub struct MemoryVoteStore {
    votes: Arc<RwLock<HashMap<(RouteId, UserId), Vote>>>,
}

impl MemoryVoteStore {
    /// Create a new in-memory vote store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VoteStore for MemoryVoteStore {
    async fn add_vote(&self, route_id: RouteId, user_id: UserId) -> Result<Vote> {
        let mut votes = self.votes.write().unwrap();
        match votes.entry((route_id, user_id)) {
            Entry::Occupied(_) => Err(WayfarerError::AlreadyVoted { route_id }),
            Entry::Vacant(slot) => {
                let vote = Vote { user_id, route_id, created_at: Utc::now() };
                slot.insert(vote.clone());
                Ok(vote)
            }
        }
    }

    async fn remove_vote(&self, route_id: RouteId, user_id: UserId) -> Result<()> {
        match self.votes.write().unwrap().remove(&(route_id, user_id)) {
            Some(_) => Ok(()),
            None => Err(WayfarerError::VoteNotFound { route_id }),
        }
    }

    async fn count_votes(&self, route_id: RouteId) -> Result<i64> {
        let votes = self.votes.read().unwrap();
        Ok(votes.keys().filter(|(route, _)| *route == route_id).count() as i64)
    }

    async fn has_voted(&self, route_id: RouteId, user_id: UserId) -> Result<bool> {
        Ok(self.votes.read().unwrap().contains_key(&(route_id, user_id)))
    }
}

#[derive(Debug, Clone)]
enum StoredValue {
    Text(String),
    Sorted(HashMap<String, f64>),
}

#[derive(Debug, Clone)]
struct StoredEntry {
    value: StoredValue,
    expires_at: Option<Instant>,
}

impl StoredEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

fn wrong_type(key: &str) -> WayfarerError {
    WayfarerError::Cache(format!(
        "WRONGTYPE Operation against key '{}' holding the wrong kind of value",
        key
    ))
}

/// Expired entries are swept once every this many writes
const PURGE_EVERY: usize = 64;

/// In-memory implementation of KeyValueStore with lazy TTL expiry
///
/// Expired keys are dropped when read, and swept in bulk every
/// `PURGE_EVERY` writes so keys that are never read again do not pile up.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: Arc<RwLock<HashMap<String, StoredEntry>>>,
    writes: Arc<AtomicUsize>,
}

impl MemoryKeyValueStore {
    /// Create a new in-memory key-value store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.read().unwrap().values().filter(|e| e.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn purge_if_due(&self, entries: &mut HashMap<String, StoredEntry>) {
        let writes = self.writes.fetch_add(1, Ordering::Relaxed) + 1;
        if writes % PURGE_EVERY == 0 {
            let now = Instant::now();
            let before = entries.len();
            entries.retain(|_, entry| entry.is_live(now));
            tracing::debug!(purged = before - entries.len(), "Purged expired keys");
        }
    }

    /// Drop the entry if it has expired, then hand out the live one
    fn live_entry<'a>(
        entries: &'a mut HashMap<String, StoredEntry>,
        key: &str,
    ) -> Option<&'a mut StoredEntry> {
        let now = Instant::now();
        if entries.get(key).is_some_and(|e| !e.is_live(now)) {
            entries.remove(key);
        }
        entries.get_mut(key)
    }

    fn sorted_set<'a>(
        entries: &'a mut HashMap<String, StoredEntry>,
        key: &str,
    ) -> Result<&'a mut HashMap<String, f64>> {
        if Self::live_entry(entries, key).is_none() {
            entries.insert(
                key.to_string(),
                StoredEntry { value: StoredValue::Sorted(HashMap::new()), expires_at: None },
            );
        }

        match entries.get_mut(key).map(|e| &mut e.value) {
            Some(StoredValue::Sorted(set)) => Ok(set),
            _ => Err(wrong_type(key)),
        }
    }

    fn read_sorted_set(&self, key: &str) -> Result<Vec<(String, f64)>> {
        let mut entries = self.entries.write().unwrap();
        match Self::live_entry(&mut entries, key).map(|e| &e.value) {
            None => Ok(Vec::new()),
            Some(StoredValue::Sorted(set)) => {
                Ok(set.iter().map(|(m, s)| (m.clone(), *s)).collect())
            }
            Some(StoredValue::Text(_)) => Err(wrong_type(key)),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.write().unwrap();
        match Self::live_entry(&mut entries, key).map(|e| &e.value) {
            None => Ok(None),
            Some(StoredValue::Text(value)) => Ok(Some(value.clone())),
            Some(StoredValue::Sorted(_)) => Err(wrong_type(key)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.write().unwrap().insert(
            key.to_string(),
            StoredEntry { value: StoredValue::Text(value.to_string()), expires_at: None },
        );
        Ok(())
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.write().unwrap();
        self.purge_if_due(&mut entries);
        entries.insert(
            key.to_string(),
            StoredEntry {
                value: StoredValue::Text(value.to_string()),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<usize> {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap();
        let removed = keys
            .iter()
            .filter_map(|key| entries.remove(key))
            .filter(|entry| entry.is_live(now))
            .count();
        Ok(removed)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.write().unwrap();
        Ok(Self::live_entry(&mut entries, key).is_some())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.write().unwrap();
        if let Some(entry) = Self::live_entry(&mut entries, key) {
            entry.expires_at = Some(Instant::now() + ttl);
        }
        Ok(())
    }

    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<()> {
        let mut entries = self.entries.write().unwrap();
        self.purge_if_due(&mut entries);
        Self::sorted_set(&mut entries, key)?.insert(member.to_string(), score);
        Ok(())
    }

    async fn zincrby(&self, key: &str, member: &str, delta: f64) -> Result<f64> {
        let mut entries = self.entries.write().unwrap();
        let score = Self::sorted_set(&mut entries, key)?.entry(member.to_string()).or_insert(0.0);
        *score += delta;
        Ok(*score)
    }

    async fn zrevrange(&self, key: &str, offset: usize, limit: usize) -> Result<Vec<String>> {
        let mut members = self.read_sorted_set(key)?;
        // Redis breaks score ties by member, reversed for ZREVRANGE
        members.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| b.0.cmp(&a.0)));
        Ok(members.into_iter().skip(offset).take(limit).map(|(m, _)| m).collect())
    }

    async fn zmembers(&self, key: &str) -> Result<Vec<String>> {
        Ok(self.read_sorted_set(key)?.into_iter().map(|(m, _)| m).collect())
    }

    async fn zscore(&self, key: &str, member: &str) -> Result<Option<f64>> {
        let members = self.read_sorted_set(key)?;
        Ok(members.into_iter().find(|(m, _)| m == member).map(|(_, s)| s))
    }

    async fn zrem(&self, key: &str, members: &[String]) -> Result<usize> {
        let mut entries = self.entries.write().unwrap();
        let Some(entry) = Self::live_entry(&mut entries, key) else {
            return Ok(0);
        };
        let StoredValue::Sorted(set) = &mut entry.value else {
            return Err(wrong_type(key));
        };

        let removed = members.iter().filter(|m| set.remove(m.as_str()).is_some()).count();
        if set.is_empty() {
            entries.remove(key);
        }
        Ok(removed)
    }
}
