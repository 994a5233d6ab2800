use std::collections::BTreeMap;

use crate::db::models::{FrameRecord, Sentiment, SessionSummary, WellnessImpact};
use crate::utils::round_to;

/// Score reported for a session without frames.
pub const DEFAULT_SCORE: f64 = 5.0;

/// Fold a session's frames into its summary.
///
/// wellness = (positive * 10 + neutral * 5) / frames, productivity = share
/// of work and educational frames scaled to 10. Both are rounded to two
/// places.
pub fn summarize(frames: &[FrameRecord]) -> SessionSummary {
    if frames.is_empty() {
        return SessionSummary {
            total_frames: 0,
            duration_seconds: 0,
            wellness_score: DEFAULT_SCORE,
            productivity_score: DEFAULT_SCORE,
            sentiment_distribution: BTreeMap::new(),
            app_usage: BTreeMap::new(),
            content_categories: BTreeMap::new(),
        };
    }

    let mut sentiment_distribution: BTreeMap<String, u32> = Sentiment::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();
    let mut app_usage: BTreeMap<String, u32> = BTreeMap::new();
    let mut content_categories: BTreeMap<String, u32> = BTreeMap::new();
    let mut positive = 0u32;
    let mut neutral = 0u32;
    let mut productive = 0u32;
    let mut duration = 0f64;

    for frame in frames {
        *sentiment_distribution
            .entry(frame.sentiment.as_str().to_string())
            .or_insert(0) += 1;

        if !frame.app_detected.is_empty() {
            *app_usage.entry(frame.app_detected.clone()).or_insert(0) += 1;
        }

        *content_categories
            .entry(frame.content_type.as_str().to_string())
            .or_insert(0) += 1;

        match frame.wellness_impact {
            WellnessImpact::Positive => positive += 1,
            WellnessImpact::Neutral => neutral += 1,
            WellnessImpact::Negative => {}
        }

        if frame.content_type.is_productive() {
            productive += 1;
        }

        duration = duration.max(frame.timestamp);
    }

    let total = frames.len() as f64;
    let wellness = (positive as f64 * 10.0 + neutral as f64 * 5.0) / total;
    let productivity = (productive as f64 / total * 10.0).min(10.0);

    SessionSummary {
        total_frames: frames.len() as u32,
        duration_seconds: duration.trunc() as i64,
        wellness_score: round_to(wellness, 2),
        productivity_score: round_to(productivity, 2),
        sentiment_distribution,
        app_usage,
        content_categories,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::models::{AnalysisSource, ContentCategory, EngagementFlags};
    use chrono::Utc;

    pub(crate) fn frame(
        number: u32,
        timestamp: f64,
        app: &str,
        category: ContentCategory,
        sentiment: Sentiment,
        impact: WellnessImpact,
    ) -> FrameRecord {
        FrameRecord {
            id: None,
            session_id: 1,
            frame_number: number,
            timestamp,
            frame_path: None,
            app_detected: app.to_string(),
            content_type: category,
            extracted_text: String::new(),
            detected_language: "en".to_string(),
            translated_text: None,
            content_description: String::new(),
            objects_detected: Vec::new(),
            engagement: EngagementFlags::default(),
            concerns: Vec::new(),
            sentiment,
            sentiment_score: 0.0,
            wellness_impact: impact,
            source: AnalysisSource::Oracle,
            phash: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_session_uses_defaults() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_frames, 0);
        assert_eq!(summary.duration_seconds, 0);
        assert_eq!(summary.wellness_score, 5.0);
        assert_eq!(summary.productivity_score, 5.0);
        assert!(summary.sentiment_distribution.is_empty());
    }

    #[test]
    fn all_positive_frames_score_ten() {
        let frames: Vec<_> = (0..4)
            .map(|i| {
                frame(
                    i,
                    i as f64 * 0.5,
                    "Coursera",
                    ContentCategory::Educational,
                    Sentiment::Positive,
                    WellnessImpact::Positive,
                )
            })
            .collect();
        let summary = summarize(&frames);
        assert_eq!(summary.wellness_score, 10.0);
        assert_eq!(summary.productivity_score, 10.0);
        assert_eq!(summary.duration_seconds, 1);
        assert_eq!(summary.app_usage["Coursera"], 4);
    }

    #[test]
    fn mixed_session_counts_and_scores() {
        let frames = vec![
            frame(0, 0.0, "Slack", ContentCategory::Work, Sentiment::Neutral, WellnessImpact::Positive),
            frame(1, 0.5, "Tiktok", ContentCategory::SocialMedia, Sentiment::Negative, WellnessImpact::Negative),
            frame(2, 1.0, "", ContentCategory::Other, Sentiment::Neutral, WellnessImpact::Neutral),
        ];
        let summary = summarize(&frames);
        assert_eq!(summary.total_frames, 3);
        // (10 + 5) / 3
        assert_eq!(summary.wellness_score, 5.0);
        assert_eq!(summary.productivity_score, 3.33);
        assert_eq!(summary.sentiment_distribution["neutral"], 2);
        assert_eq!(summary.sentiment_distribution["mixed"], 0);
        assert_eq!(summary.app_usage.len(), 2);
        assert_eq!(summary.content_categories["social_media"], 1);
    }
}
