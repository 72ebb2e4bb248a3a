use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::WayfarerError;

/// Point-of-interest category
///
/// Every category is backed by its own location table and its own
/// prompt-link table; both are resolved through [`Category::tables`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Landmark,
    Restaurant,
    Grocery,
    Pharmacy,
}

/// Storage tables owned by a category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryTables {
    pub category: Category,
    /// Table holding the category's location rows
    pub locations: &'static str,
    /// Table linking prompts to the locations chosen for them
    pub prompt_links: &'static str,
}

/// Indexed by the enum discriminant; order must match [`Category::ALL`].
static REGISTRY: [CategoryTables; 4] = [
    CategoryTables {
        category: Category::Landmark,
        locations: "landmarks",
        prompt_links: "prompt_landmarks",
    },
    CategoryTables {
        category: Category::Restaurant,
        locations: "restaurants",
        prompt_links: "prompt_restaurants",
    },
    CategoryTables {
        category: Category::Grocery,
        locations: "groceries",
        prompt_links: "prompt_groceries",
    },
    CategoryTables {
        category: Category::Pharmacy,
        locations: "pharmacies",
        prompt_links: "prompt_pharmacies",
    },
];

impl Category {
    pub const ALL: [Category; 4] =
        [Category::Landmark, Category::Restaurant, Category::Grocery, Category::Pharmacy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Landmark => "landmark",
            Category::Restaurant => "restaurant",
            Category::Grocery => "grocery",
            Category::Pharmacy => "pharmacy",
        }
    }

    /// Storage tables for this category
    pub fn tables(self) -> &'static CategoryTables {
        &REGISTRY[self as usize]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = WayfarerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "landmark" => Ok(Category::Landmark),
            "restaurant" => Ok(Category::Restaurant),
            "grocery" => Ok(Category::Grocery),
            "pharmacy" => Ok(Category::Pharmacy),
            other => Err(WayfarerError::CategoryNotFound { category: other.to_string() }),
        }
    }
}

/// WGS 84 coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check that both components are finite and inside WGS 84 bounds
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Location identifier, unique within a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocationId(pub i64);

/// Reference location row owned by the geo-similarity index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCandidate {
    pub id: LocationId,
    pub name: String,
    pub coordinate: Coordinate,
    pub category: Category,
    pub embedding: Vec<f32>,
}

/// A location returned by a similarity query, with its score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredLocation {
    pub id: LocationId,
    pub name: String,
    pub category: Category,
    pub coordinate: Coordinate,
    /// `1 - cosine_distance(embedding, query)`
    pub similarity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_matches_variant_order() {
        for category in Category::ALL {
            assert_eq!(category.tables().category, category);
        }
    }

    #[test]
    fn test_registry_tables_are_distinct() {
        let mut names: Vec<&str> = Category::ALL
            .iter()
            .flat_map(|c| [c.tables().locations, c.tables().prompt_links])
            .collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 8);
    }

    #[test]
    fn test_parse_category() {
        assert_eq!("landmark".parse::<Category>().unwrap(), Category::Landmark);
        assert_eq!(" Pharmacy ".parse::<Category>().unwrap(), Category::Pharmacy);

        match "museum".parse::<Category>() {
            Err(WayfarerError::CategoryNotFound { category }) => assert_eq!(category, "museum"),
            other => panic!("Expected CategoryNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_category_serde_is_lowercase() {
        let json = serde_json::to_string(&Category::Grocery).unwrap();
        assert_eq!(json, "\"grocery\"");
        let parsed: Category = serde_json::from_str("\"restaurant\"").unwrap();
        assert_eq!(parsed, Category::Restaurant);
    }

    #[test]
    fn test_coordinate_validity() {
        assert!(Coordinate::new(-37.81803, 144.9549).is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -180.5).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }
}
