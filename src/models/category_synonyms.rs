use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Version of the built-in synonym table
pub const DEFAULT_TABLE_VERSION: u32 = 1;

/// One canonical category and the everyday words that imply it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryEntry {
    pub name: String,
    pub synonyms: Vec<String>,
}

/// Versioned mapping from category name to related words
///
/// Entries are evaluated in order, so the order is part of the table: it
/// decides the order category labels appear in a recommendation reason.
/// Synonyms are stored lowercase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategorySynonyms {
    pub version: u32,
    pub categories: Vec<CategoryEntry>,
}

impl Default for CategorySynonyms {
    fn default() -> Self {
        let table: &[(&str, &[&str])] = &[
            (
                "Environment",
                &[
                    "environment", "environmental", "nature", "clean", "cleanup", "litter",
                    "trash", "garbage", "recycle", "recycling", "beach", "park", "parks",
                    "trees", "planting", "garden", "gardening", "green", "climate",
                    "conservation", "ocean", "hiking", "wildlife",
                ],
            ),
            (
                "Education",
                &[
                    "education", "educational", "teach", "teaching", "tutor", "tutoring",
                    "mentor", "mentoring", "school", "reading", "literacy", "homework",
                    "math", "science", "learn", "learning", "library", "students", "classroom",
                ],
            ),
            (
                "Community",
                &[
                    "community", "neighborhood", "neighbourhood", "local", "hometown", "festival",
                    "outreach", "civic", "church", "food bank",
                ],
            ),
            (
                "Animal Welfare",
                &[
                    "animal", "animals", "pets", "dog", "dogs", "cats",
                    "shelter", "rescue", "adoption", "wildlife", "veterinary", "puppy", "kitten",
                ],
            ),
            (
                "Health",
                &[
                    "health", "healthy", "medical", "hospital", "clinic", "blood", "donor",
                    "wellness", "mental health", "fitness", "nurse", "nutrition",
                ],
            ),
            (
                "Arts",
                &[
                    "artist", "artistic", "painting", "paint", "mural", "music",
                    "theater", "theatre", "dancing", "craft", "crafts", "museum", "drawing",
                    "creative", "photography",
                ],
            ),
            (
                "Elderly Care",
                &[
                    "elderly", "senior", "seniors", "retirement", "nursing home",
                    "grandparents", "companionship", "eldercare",
                ],
            ),
            (
                "Disaster Relief",
                &[
                    "disaster", "relief", "emergency", "flood", "wildfire", "firefighters",
                    "hurricane", "earthquake", "storm", "recovery", "evacuation", "crisis",
                ],
            ),
            (
                "Clothing Donation",
                &[
                    "clothing", "clothes", "donation", "donate", "donations", "coat",
                    "coats", "shoes", "apparel", "garment", "wardrobe", "thrift",
                ],
            ),
            (
                "Homelessness",
                &[
                    "homeless", "homelessness", "housing", "soup", "kitchen", "meal",
                    "meals", "food", "pantry", "hunger", "hungry", "unhoused",
                ],
            ),
            (
                "Youth",
                &[
                    "youth", "kids", "children", "child", "teens", "teenagers",
                    "young", "summer camp", "after-school", "scouts", "babysitting",
                ],
            ),
            (
                "Sports",
                &[
                    "sports", "soccer", "football", "basketball", "baseball",
                    "tennis", "running", "marathon", "coach", "coaching", "league",
                    "tournament", "swim", "swimming",
                ],
            ),
        ];

        Self {
            version: DEFAULT_TABLE_VERSION,
            categories: table
                .iter()
                .map(|(name, synonyms)| CategoryEntry {
                    name: name.to_string(),
                    synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
                })
                .collect(),
        }
    }
}

impl CategorySynonyms {
    /// Parses a table from JSON and normalizes it
    pub fn from_json(json: &str) -> AppResult<Self> {
        let table: CategorySynonyms = serde_json::from_str(json)
            .map_err(|e| AppError::Config(format!("Invalid synonym table: {}", e)))?;
        table.normalized()
    }

    /// Loads a table from a JSON file on disk
    pub fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!(
                "Failed to read synonym table {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&json)
    }

    /// Lowercases and trims synonyms, drops blanks and rejects malformed entries
    fn normalized(mut self) -> AppResult<Self> {
        let mut seen = std::collections::HashSet::new();

        for entry in &mut self.categories {
            entry.name = entry.name.trim().to_string();
            if entry.name.is_empty() {
                return Err(AppError::Config(
                    "Synonym table contains a category with an empty name".to_string(),
                ));
            }
            if !seen.insert(entry.name.to_lowercase()) {
                return Err(AppError::Config(format!(
                    "Synonym table lists category '{}' more than once",
                    entry.name
                )));
            }

            entry.synonyms = entry
                .synonyms
                .iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(self)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryEntry> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
