//! Registry of known apps and sites.
//!
//! Maps what the vision oracle reports (app label, on-screen text,
//! description) onto a canonical app name, a content category and a
//! baseline wellness tier.

mod entries;

use serde::{Deserialize, Serialize};

use crate::db::models::ContentCategory;

/// Baseline wellness tier of an app or category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImpactTier {
    HighRisk,
    ModerateRisk,
    Positive,
    Neutral,
    Variable,
}

impl ImpactTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactTier::HighRisk => "high_risk",
            ImpactTier::ModerateRisk => "moderate_risk",
            ImpactTier::Positive => "positive",
            ImpactTier::Neutral => "neutral",
            ImpactTier::Variable => "variable",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AppEntry {
    pub key: &'static str,
    pub category: ContentCategory,
    pub tier: ImpactTier,
    pub keywords: &'static [&'static str],
}

impl AppEntry {
    /// `prime_video` -> `Prime Video`.
    pub fn display_name(&self) -> String {
        title_case(&self.key.replace('_', " "))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CategoryInfo {
    pub category: ContentCategory,
    pub description: &'static str,
    pub default_tier: ImpactTier,
}

/// Outcome of keyword classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogMatch {
    pub app: String,
    /// `None` when no entry scored high enough.
    pub category: Option<ContentCategory>,
}

const MIN_MATCH_SCORE: u32 = 2;

pub fn apps() -> &'static [AppEntry] {
    entries::APPS
}

pub fn categories() -> &'static [CategoryInfo] {
    entries::CATEGORIES
}

pub fn category_info(category: ContentCategory) -> Option<&'static CategoryInfo> {
    entries::CATEGORIES.iter().find(|info| info.category == category)
}

/// Re-rank an oracle detection against the keyword table.
///
/// Each keyword found anywhere in the combined text scores 3 when it is in
/// the detected label, 2 when it is in the extracted text and 1 otherwise.
/// The first entry with the highest score wins, and only a score of at
/// least 2 counts as a match.
pub fn classify(detected: &str, extracted_text: &str, description: &str) -> CatalogMatch {
    let detected_lower = detected.to_lowercase();
    let text_lower = extracted_text.to_lowercase();
    let desc_lower = description.to_lowercase();
    let combined = format!("{} {} {}", detected_lower, text_lower, desc_lower);

    let mut best: Option<&AppEntry> = None;
    let mut best_score = 0u32;

    for app in entries::APPS {
        let mut score = 0u32;
        for keyword in app.keywords {
            let keyword = keyword.to_lowercase();
            if !combined.contains(&keyword) {
                continue;
            }
            score += if detected_lower.contains(&keyword) {
                3
            } else if text_lower.contains(&keyword) {
                2
            } else {
                1
            };
        }

        if score > best_score {
            best_score = score;
            best = Some(app);
        }
    }

    match best {
        Some(app) if best_score >= MIN_MATCH_SCORE => CatalogMatch {
            app: app.display_name(),
            category: Some(app.category),
        },
        _ => CatalogMatch {
            app: if detected.is_empty() {
                "Unknown".to_string()
            } else {
                detected.to_string()
            },
            category: None,
        },
    }
}

/// Baseline tier for an app label: the first entry whose key contains the
/// normalized label or is contained in it.
pub fn baseline_for(app_label: &str) -> Option<ImpactTier> {
    let normalized = app_label.trim().to_lowercase().replace(' ', "_");
    if normalized.is_empty() {
        return None;
    }

    entries::APPS
        .iter()
        .find(|app| normalized.contains(app.key) || app.key.contains(normalized.as_str()))
        .map(|app| app.tier)
}

/// Display names of the first `limit` catalog entries, for oracle prompts.
pub fn prompt_app_names(limit: usize) -> String {
    entries::APPS
        .iter()
        .take(limit)
        .map(AppEntry::display_name)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn prompt_category_names() -> String {
    entries::CATEGORIES
        .iter()
        .map(|info| info.category.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn title_case(value: &str) -> String {
    value
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
