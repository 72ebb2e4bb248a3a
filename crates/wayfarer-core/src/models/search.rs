use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use super::location::{Category, Coordinate, ScoredLocation};
use super::route::UserId;
use crate::error::{Result, WayfarerError};

/// Upper bound on the number of steps in one search request
pub const MAX_SEARCH_STEPS: usize = 10;

/// Travel profile understood by the directions provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelProfile {
    Driving,
    #[default]
    Walking,
    Cycling,
}

impl TravelProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelProfile::Driving => "driving",
            TravelProfile::Walking => "walking",
            TravelProfile::Cycling => "cycling",
        }
    }
}

impl fmt::Display for TravelProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelProfile {
    type Err = WayfarerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "driving" => Ok(TravelProfile::Driving),
            "walking" => Ok(TravelProfile::Walking),
            "cycling" => Ok(TravelProfile::Cycling),
            other => Err(WayfarerError::invalid_query(format!(
                "unknown travel profile '{}': expected driving, walking, or cycling",
                other
            ))),
        }
    }
}

/// One position in a requested location sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchStep {
    pub query: String,
    pub category: Category,
    /// Maximum geodesic distance from the current location, in meters
    pub distance_threshold: f64,
    /// Candidates must score strictly above this similarity
    pub similarity_threshold: f64,
    pub negative_query: Option<String>,
    /// Candidates must score strictly below this similarity to the negative query
    pub negative_similarity_threshold: f64,
}

/// A full sequence search: a starting point and the ordered steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub start: Coordinate,
    pub steps: Vec<SearchStep>,
}

impl SearchRequest {
    /// Build a request from parallel query/category/negative-query lists
    ///
    /// An empty negative query string means "no negative query" for that step.
    #[allow(clippy::too_many_arguments)]
    pub fn from_lists(
        start: Coordinate,
        queries: &[String],
        categories: &[String],
        negative_queries: Option<&[String]>,
        distance_threshold: f64,
        similarity_threshold: f64,
        negative_similarity_threshold: f64,
    ) -> Result<Self> {
        if queries.len() != categories.len() {
            return Err(WayfarerError::invalid_query(format!(
                "{} queries but {} location types",
                queries.len(),
                categories.len()
            )));
        }

        if let Some(negatives) = negative_queries {
            if negatives.len() != queries.len() {
                return Err(WayfarerError::invalid_query(format!(
                    "{} queries but {} negative queries",
                    queries.len(),
                    negatives.len()
                )));
            }
        }

        let steps = queries
            .iter()
            .zip(categories)
            .enumerate()
            .map(|(i, (query, category))| {
                let negative_query = negative_queries
                    .map(|n| n[i].trim())
                    .filter(|n| !n.is_empty())
                    .map(str::to_string);

                Ok(SearchStep {
                    query: query.clone(),
                    category: category.parse()?,
                    distance_threshold,
                    similarity_threshold,
                    negative_query,
                    negative_similarity_threshold,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let request = Self { start, steps };
        request.validate()?;
        Ok(request)
    }

    /// Validate step count, starting point and per-step thresholds
    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(WayfarerError::invalid_query("at least one query is required"));
        }

        if self.steps.len() > MAX_SEARCH_STEPS {
            return Err(WayfarerError::ParametersTooLarge {
                reason: format!(
                    "{} steps requested, at most {} allowed",
                    self.steps.len(),
                    MAX_SEARCH_STEPS
                ),
            });
        }

        if !self.start.is_valid() {
            return Err(WayfarerError::invalid_query(format!(
                "starting coordinate ({}, {}) is outside WGS 84 bounds",
                self.start.latitude, self.start.longitude
            )));
        }

        for (i, step) in self.steps.iter().enumerate() {
            if step.query.trim().is_empty() {
                return Err(WayfarerError::invalid_query(format!("query {} is empty", i)));
            }
            if !step.distance_threshold.is_finite() || step.distance_threshold <= 0.0 {
                return Err(WayfarerError::invalid_query(format!(
                    "distance threshold for step {} must be a positive number of meters",
                    i
                )));
            }
            if !step.similarity_threshold.is_finite()
                || !step.negative_similarity_threshold.is_finite()
            {
                return Err(WayfarerError::invalid_query(format!(
                    "similarity thresholds for step {} must be finite",
                    i
                )));
            }
        }

        Ok(())
    }

    pub fn queries(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.query.clone()).collect()
    }

    pub fn categories(&self) -> Vec<Category> {
        self.steps.iter().map(|s| s.category).collect()
    }

    pub fn negative_queries(&self) -> Option<Vec<String>> {
        if self.steps.iter().all(|s| s.negative_query.is_none()) {
            return None;
        }
        Some(self.steps.iter().map(|s| s.negative_query.clone().unwrap_or_default()).collect())
    }
}

/// Per-request cursor: where the next step searches from and what to skip
#[derive(Debug, Clone)]
pub struct SearchState {
    current_location: Coordinate,
    seen_place_names: HashSet<String>,
}

impl SearchState {
    pub fn new(start: Coordinate) -> Self {
        Self { current_location: start, seen_place_names: HashSet::new() }
    }

    pub fn current_location(&self) -> Coordinate {
        self.current_location
    }

    pub fn has_seen(&self, name: &str) -> bool {
        self.seen_place_names.contains(name)
    }

    pub fn seen_count(&self) -> usize {
        self.seen_place_names.len()
    }

    /// Names to exclude from the next query, sorted for stable query text
    pub fn excluded_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.seen_place_names.iter().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Move the cursor to the chosen location and mark it as seen
    pub fn advance(&mut self, chosen: &ScoredLocation) {
        self.current_location = chosen.coordinate;
        self.seen_place_names.insert(chosen.name.clone());
    }
}

/// Prompt identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PromptId(pub i64);

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Prompt record to be persisted before a search runs
#[derive(Debug, Clone, PartialEq)]
pub struct NewPrompt {
    pub created_by: UserId,
    pub queries: Vec<String>,
    pub negative_queries: Option<Vec<String>>,
    pub categories: Vec<Category>,
}

impl NewPrompt {
    pub fn from_request(created_by: UserId, request: &SearchRequest) -> Self {
        Self {
            created_by,
            queries: request.queries(),
            negative_queries: request.negative_queries(),
            categories: request.categories(),
        }
    }
}

/// Persisted prompt record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub prompt_id: PromptId,
    pub created_by: UserId,
    pub queries: Vec<String>,
    pub negative_queries: Option<Vec<String>>,
    pub categories: Vec<Category>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LocationId;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn melbourne() -> Coordinate {
        Coordinate::new(-37.81803, 144.9549)
    }

    #[test]
    fn test_from_lists_builds_steps() {
        let request = SearchRequest::from_lists(
            melbourne(),
            &strings(&["museum", "Indian food", "pharmacy"]),
            &strings(&["landmark", "restaurant", "pharmacy"]),
            Some(&strings(&["", "spicy", ""])),
            500.0,
            0.0,
            0.8,
        )
        .unwrap();

        assert_eq!(request.steps.len(), 3);
        assert_eq!(request.steps[1].category, Category::Restaurant);
        assert_eq!(request.steps[0].negative_query, None);
        assert_eq!(request.steps[1].negative_query.as_deref(), Some("spicy"));
        assert_eq!(request.negative_queries(), Some(strings(&["", "spicy", ""])));
    }

    #[test]
    fn test_from_lists_rejects_length_mismatch() {
        let result = SearchRequest::from_lists(
            melbourne(),
            &strings(&["museum", "Indian food"]),
            &strings(&["landmark"]),
            None,
            500.0,
            0.0,
            1.0,
        );
        assert!(matches!(result, Err(WayfarerError::InvalidQuery { .. })));

        let result = SearchRequest::from_lists(
            melbourne(),
            &strings(&["museum"]),
            &strings(&["landmark"]),
            Some(&strings(&["a", "b"])),
            500.0,
            0.0,
            1.0,
        );
        assert!(matches!(result, Err(WayfarerError::InvalidQuery { .. })));
    }

    #[test]
    fn test_from_lists_rejects_unknown_category() {
        let result = SearchRequest::from_lists(
            melbourne(),
            &strings(&["museum"]),
            &strings(&["castle"]),
            None,
            500.0,
            0.0,
            1.0,
        );
        assert!(matches!(result, Err(WayfarerError::CategoryNotFound { .. })));
    }

    #[test]
    fn test_validate_limits() {
        let queries: Vec<String> = (0..=MAX_SEARCH_STEPS).map(|i| format!("q{}", i)).collect();
        let categories = vec!["landmark".to_string(); queries.len()];
        let result =
            SearchRequest::from_lists(melbourne(), &queries, &categories, None, 500.0, 0.0, 1.0);
        assert!(matches!(result, Err(WayfarerError::ParametersTooLarge { .. })));

        let result = SearchRequest::from_lists(melbourne(), &[], &[], None, 500.0, 0.0, 1.0);
        assert!(matches!(result, Err(WayfarerError::InvalidQuery { .. })));

        let result = SearchRequest::from_lists(
            melbourne(),
            &strings(&["museum"]),
            &strings(&["landmark"]),
            None,
            0.0,
            0.0,
            1.0,
        );
        assert!(matches!(result, Err(WayfarerError::InvalidQuery { .. })));

        let result = SearchRequest::from_lists(
            Coordinate::new(120.0, 0.0),
            &strings(&["museum"]),
            &strings(&["landmark"]),
            None,
            500.0,
            0.0,
            1.0,
        );
        assert!(matches!(result, Err(WayfarerError::InvalidQuery { .. })));
    }

    #[test]
    fn test_search_state_advance() {
        let mut state = SearchState::new(melbourne());
        let chosen = ScoredLocation {
            id: LocationId(1),
            name: "Melbourne Museum".to_string(),
            category: Category::Landmark,
            coordinate: Coordinate::new(-37.8033, 144.9717),
            similarity: 0.7,
        };

        state.advance(&chosen);

        assert_eq!(state.current_location(), chosen.coordinate);
        assert!(state.has_seen("Melbourne Museum"));
        assert_eq!(state.seen_count(), 1);
        assert_eq!(state.excluded_names(), vec!["Melbourne Museum".to_string()]);
    }

    #[test]
    fn test_travel_profile_parse() {
        assert_eq!("Cycling".parse::<TravelProfile>().unwrap(), TravelProfile::Cycling);
        assert_eq!(TravelProfile::default(), TravelProfile::Walking);
        assert!("flying".parse::<TravelProfile>().is_err());
    }
}
