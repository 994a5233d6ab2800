//! Frame analysis data models.
//!
//! A `FrameRecord` is one analysed screen frame. It is created once per
//! uploaded frame and never updated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    Mixed,
}

impl Sentiment {
    pub const ALL: [Sentiment; 4] = [
        Sentiment::Positive,
        Sentiment::Negative,
        Sentiment::Neutral,
        Sentiment::Mixed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
            Sentiment::Mixed => "mixed",
        }
    }

    /// Unknown labels read as neutral.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            "mixed" => Sentiment::Mixed,
            _ => Sentiment::Neutral,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum WellnessImpact {
    Positive,
    Neutral,
    Negative,
}

impl WellnessImpact {
    pub fn as_str(&self) -> &'static str {
        match self {
            WellnessImpact::Positive => "positive",
            WellnessImpact::Neutral => "neutral",
            WellnessImpact::Negative => "negative",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "positive" => WellnessImpact::Positive,
            "negative" => WellnessImpact::Negative,
            _ => WellnessImpact::Neutral,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    SocialMedia,
    Video,
    Entertainment,
    Messaging,
    Work,
    Professional,
    Educational,
    Shopping,
    Gaming,
    News,
    Health,
    Finance,
    Utility,
    Travel,
    Food,
    Music,
    Dating,
    AiTools,
    Other,
}

impl ContentCategory {
    pub const ALL: [ContentCategory; 19] = [
        ContentCategory::SocialMedia,
        ContentCategory::Video,
        ContentCategory::Entertainment,
        ContentCategory::Messaging,
        ContentCategory::Work,
        ContentCategory::Professional,
        ContentCategory::Educational,
        ContentCategory::Shopping,
        ContentCategory::Gaming,
        ContentCategory::News,
        ContentCategory::Health,
        ContentCategory::Finance,
        ContentCategory::Utility,
        ContentCategory::Travel,
        ContentCategory::Food,
        ContentCategory::Music,
        ContentCategory::Dating,
        ContentCategory::AiTools,
        ContentCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentCategory::SocialMedia => "social_media",
            ContentCategory::Video => "video",
            ContentCategory::Entertainment => "entertainment",
            ContentCategory::Messaging => "messaging",
            ContentCategory::Work => "work",
            ContentCategory::Professional => "professional",
            ContentCategory::Educational => "educational",
            ContentCategory::Shopping => "shopping",
            ContentCategory::Gaming => "gaming",
            ContentCategory::News => "news",
            ContentCategory::Health => "health",
            ContentCategory::Finance => "finance",
            ContentCategory::Utility => "utility",
            ContentCategory::Travel => "travel",
            ContentCategory::Food => "food",
            ContentCategory::Music => "music",
            ContentCategory::Dating => "dating",
            ContentCategory::AiTools => "ai_tools",
            ContentCategory::Other => "other",
        }
    }

    /// Oracle labels outside the known set collapse to `Other`.
    pub fn parse(value: &str) -> Self {
        let normalized = value.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .unwrap_or(ContentCategory::Other)
    }

    /// Categories that count towards the productivity score.
    pub fn is_productive(&self) -> bool {
        matches!(self, ContentCategory::Work | ContentCategory::Educational)
    }
}

/// Engagement signals reported by the vision oracle.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngagementFlags {
    pub has_notifications: bool,
    pub has_comments: bool,
    pub has_likes: bool,
    pub is_video_playing: bool,
    pub is_scrollable_feed: bool,
}

/// Where the vision data of a frame came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    Oracle,
    Reused,
    Fallback,
}

impl AnalysisSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisSource::Oracle => "oracle",
            AnalysisSource::Reused => "reused",
            AnalysisSource::Fallback => "fallback",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "oracle" => AnalysisSource::Oracle,
            "reused" => AnalysisSource::Reused,
            _ => AnalysisSource::Fallback,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameRecord {
    pub id: Option<i64>,
    pub session_id: i64,
    pub frame_number: u32,
    /// Seconds since the start of the recording.
    pub timestamp: f64,
    pub frame_path: Option<String>,
    pub app_detected: String,
    pub content_type: ContentCategory,
    pub extracted_text: String,
    pub detected_language: String,
    pub translated_text: Option<String>,
    pub content_description: String,
    pub objects_detected: Vec<String>,
    pub engagement: EngagementFlags,
    pub concerns: Vec<String>,
    pub sentiment: Sentiment,
    pub sentiment_score: f64,
    pub wellness_impact: WellnessImpact,
    pub source: AnalysisSource,
    pub phash: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_labels_fall_back() {
        assert_eq!(Sentiment::parse("Furious"), Sentiment::Neutral);
        assert_eq!(Sentiment::parse(" Negative "), Sentiment::Negative);
        assert_eq!(ContentCategory::parse("Social Media"), ContentCategory::SocialMedia);
        assert_eq!(ContentCategory::parse("ai-tools"), ContentCategory::AiTools);
        assert_eq!(ContentCategory::parse("cooking"), ContentCategory::Other);
    }

    #[test]
    fn only_work_and_education_are_productive() {
        let productive: Vec<_> = ContentCategory::ALL
            .into_iter()
            .filter(ContentCategory::is_productive)
            .collect();
        assert_eq!(productive, vec![ContentCategory::Work, ContentCategory::Educational]);
    }
}
