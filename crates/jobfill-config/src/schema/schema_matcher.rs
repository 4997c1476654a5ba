//! Field matcher configuration: thresholds, synonym table, semantic types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::default_true;

/// Field matcher tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Minimum fuzzy score (0, 1] for a fuzzy match.
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,

    /// Minimum confidence (0-100) of a remote classification.
    #[serde(default = "default_inference_min_confidence")]
    pub inference_min_confidence: f64,

    /// Start from the built-in synonym table.
    #[serde(default = "default_true")]
    pub use_default_synonyms: bool,

    /// Extra synonyms per profile key, merged into the built-in table.
    #[serde(default)]
    pub synonyms: BTreeMap<String, Vec<String>>,

    /// Semantic type per profile key (text, email, phone, url, number, date,
    /// boolean, document), merged into the built-in table.
    #[serde(default)]
    pub semantic_types: BTreeMap<String, String>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: default_fuzzy_threshold(),
            inference_min_confidence: default_inference_min_confidence(),
            use_default_synonyms: true,
            synonyms: BTreeMap::new(),
            semantic_types: BTreeMap::new(),
        }
    }
}

impl MatcherConfig {
    /// Built-in table (when enabled) with the configured additions.
    pub fn effective_synonyms(&self) -> BTreeMap<String, Vec<String>> {
        let mut table = if self.use_default_synonyms {
            default_synonyms()
        } else {
            BTreeMap::new()
        };
        for (key, extra) in &self.synonyms {
            let entry = table.entry(key.clone()).or_default();
            for synonym in extra {
                if !entry.contains(synonym) {
                    entry.push(synonym.clone());
                }
            }
        }
        table
    }

    pub fn effective_semantic_types(&self) -> BTreeMap<String, String> {
        let mut table = default_semantic_types();
        table.extend(self.semantic_types.clone());
        table
    }
}

fn default_fuzzy_threshold() -> f64 {
    0.6
}

fn default_inference_min_confidence() -> f64 {
    80.0
}

/// Allowed names in `semantic_types`.
pub const SEMANTIC_TYPE_NAMES: &[&str] = &[
    "text", "email", "phone", "url", "number", "date", "boolean", "document",
];

/// Built-in synonym table keyed by profile key.
pub fn default_synonyms() -> BTreeMap<String, Vec<String>> {
    let table: &[(&str, &[&str])] = &[
        ("firstName", &["first name", "given name", "forename", "fname"]),
        ("lastName", &["last name", "family name", "surname", "lname"]),
        ("fullName", &["full name", "complete name", "name", "your name", "legal name"]),
        ("email", &["email", "e-mail", "email address", "contact email"]),
        ("phone", &["phone", "phone number", "mobile", "mobile number", "telephone", "cell phone"]),
        ("resume", &["resume", "cv", "curriculum vitae"]),
        ("coverLetter", &["cover letter", "motivation letter"]),
        ("transcript", &["transcript", "academic record"]),
        ("linkedin", &["linkedin", "linkedin profile", "linkedin url"]),
        ("website", &["website", "portfolio", "personal website"]),
        ("github", &["github", "github profile"]),
        ("address", &["address", "street address", "address line"]),
        ("city", &["city", "town"]),
        ("state", &["state", "province", "region"]),
        ("country", &["country"]),
        ("zip", &["zip", "zip code", "postal code", "postcode"]),
        ("skills", &["skill", "skills", "technical skills"]),
        ("yearsExperience", &["years of experience", "years experience", "experience years"]),
        ("sponsorship", &["sponsorship", "visa sponsorship", "require sponsorship"]),
        ("salary", &["salary", "desired salary", "expected salary"]),
    ];
    table
        .iter()
        .map(|(key, synonyms)| {
            (
                key.to_string(),
                synonyms.iter().map(|s| s.to_string()).collect(),
            )
        })
        .collect()
}

/// Built-in semantic types keyed by profile key.
pub fn default_semantic_types() -> BTreeMap<String, String> {
    [
        ("email", "email"),
        ("phone", "phone"),
        ("linkedin", "url"),
        ("website", "url"),
        ("github", "url"),
        ("yearsExperience", "number"),
        ("salary", "number"),
        ("resume", "document"),
        ("coverLetter", "document"),
        ("transcript", "document"),
        ("sponsorship", "boolean"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
