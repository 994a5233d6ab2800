//! Dashboard views over a user's completed sessions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::session::DEFAULT_SCORE;
use super::user::{merge_counts, sorted_desc};
use crate::db::models::{FrameRecord, ScreenSession, Sentiment, SessionStatus, WellnessImpact};
use crate::utils::round_to;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_sessions: usize,
    pub total_duration: i64,
    pub avg_wellness: Option<f64>,
    pub avg_productivity: Option<f64>,
    pub total_frames: u32,
    pub no_data: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppShare {
    pub name: String,
    pub count: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentAnalysis {
    pub content_types: BTreeMap<String, u32>,
    pub sentiment_distribution: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentimentPoint {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WellnessPoint {
    /// `YYYY-MM-DD HH:MM`.
    pub date: String,
    pub wellness_score: f64,
    pub productivity_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppDetail {
    pub app_name: String,
    pub total_frames: usize,
    pub content_types: BTreeMap<String, u32>,
    pub sentiments: BTreeMap<String, u32>,
    pub wellness_impacts: BTreeMap<String, u32>,
    pub avg_sentiment_score: f64,
}

fn completed(sessions: &[ScreenSession]) -> impl Iterator<Item = &ScreenSession> {
    sessions.iter().filter(|s| s.status == SessionStatus::Completed)
}

fn oldest_first(sessions: &[ScreenSession]) -> Vec<&ScreenSession> {
    let mut ordered: Vec<&ScreenSession> = completed(sessions).collect();
    ordered.sort_by_key(|s| s.created_at);
    ordered
}

fn seeded_sentiments() -> BTreeMap<String, u32> {
    Sentiment::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect()
}

pub fn user_stats(sessions: &[ScreenSession]) -> UserStats {
    let sessions: Vec<&ScreenSession> = completed(sessions).collect();
    if sessions.is_empty() {
        return UserStats {
            total_sessions: 0,
            total_duration: 0,
            avg_wellness: None,
            avg_productivity: None,
            total_frames: 0,
            no_data: true,
        };
    }

    let count = sessions.len() as f64;
    UserStats {
        total_sessions: sessions.len(),
        total_duration: sessions.iter().map(|s| s.duration_seconds()).sum(),
        avg_wellness: Some(round_to(
            sessions.iter().map(|s| s.wellness_score().unwrap_or(0.0)).sum::<f64>() / count,
            2,
        )),
        avg_productivity: Some(round_to(
            sessions.iter().map(|s| s.productivity_score().unwrap_or(0.0)).sum::<f64>() / count,
            2,
        )),
        total_frames: sessions.iter().map(|s| s.total_frames()).sum(),
        no_data: false,
    }
}

/// App usage across sessions, most used first.
pub fn app_usage(sessions: &[ScreenSession]) -> Vec<AppShare> {
    let merged = merge_counts(
        completed(sessions)
            .filter_map(|s| s.summary.as_ref())
            .map(|s| &s.app_usage),
    );
    let total: u32 = merged.values().sum();

    sorted_desc(&merged)
        .into_iter()
        .map(|(name, count)| AppShare {
            percentage: if total > 0 {
                round_to(count as f64 / total as f64 * 100.0, 1)
            } else {
                0.0
            },
            name,
            count,
        })
        .collect()
}

pub fn content_analysis(sessions: &[ScreenSession]) -> ContentAnalysis {
    let summaries: Vec<_> = completed(sessions).filter_map(|s| s.summary.as_ref()).collect();
    let mut sentiment_distribution = seeded_sentiments();
    for (key, count) in merge_counts(summaries.iter().map(|s| &s.sentiment_distribution)) {
        *sentiment_distribution.entry(key).or_insert(0) += count;
    }

    ContentAnalysis {
        content_types: merge_counts(summaries.iter().map(|s| &s.content_categories)),
        sentiment_distribution,
    }
}

/// Per-session sentiment percentages, oldest first. Sessions without a
/// sentiment breakdown are skipped.
pub fn sentiment_timeline(sessions: &[ScreenSession]) -> Vec<SentimentPoint> {
    oldest_first(sessions)
        .into_iter()
        .filter_map(|session| {
            let summary = session.summary.as_ref()?;
            let dist = &summary.sentiment_distribution;
            if dist.is_empty() {
                return None;
            }
            let total: u32 = dist.values().sum();
            let pct = |sentiment: Sentiment| {
                if total == 0 {
                    0.0
                } else {
                    dist.get(sentiment.as_str()).copied().unwrap_or(0) as f64 / total as f64 * 100.0
                }
            };
            Some(SentimentPoint {
                date: session.created_at.format("%Y-%m-%d").to_string(),
                positive: pct(Sentiment::Positive),
                negative: pct(Sentiment::Negative),
                neutral: pct(Sentiment::Neutral),
            })
        })
        .collect()
}

pub fn wellness_trend_series(sessions: &[ScreenSession]) -> Vec<WellnessPoint> {
    oldest_first(sessions)
        .into_iter()
        .map(|session| WellnessPoint {
            date: session.created_at.format("%Y-%m-%d %H:%M").to_string(),
            wellness_score: session.wellness_score().unwrap_or(DEFAULT_SCORE),
            productivity_score: session.productivity_score().unwrap_or(DEFAULT_SCORE),
        })
        .collect()
}

/// Frame-level breakdown for one app, matched ASCII case-insensitively like
/// the frame lookup. Reports the stored app name. `None` when no frame matches.
pub fn app_detail(app_name: &str, frames: &[FrameRecord]) -> Option<AppDetail> {
    let frames: Vec<&FrameRecord> = frames
        .iter()
        .filter(|f| f.app_detected.eq_ignore_ascii_case(app_name))
        .collect();
    let stored_name = frames.first()?.app_detected.clone();

    let mut content_types = BTreeMap::new();
    let mut sentiments = seeded_sentiments();
    let mut wellness_impacts: BTreeMap<String, u32> = [
        WellnessImpact::Positive,
        WellnessImpact::Negative,
        WellnessImpact::Neutral,
    ]
    .iter()
    .map(|i| (i.as_str().to_string(), 0))
    .collect();

    for frame in &frames {
        *content_types
            .entry(frame.content_type.as_str().to_string())
            .or_insert(0) += 1;
        *sentiments.entry(frame.sentiment.as_str().to_string()).or_insert(0) += 1;
        *wellness_impacts
            .entry(frame.wellness_impact.as_str().to_string())
            .or_insert(0) += 1;
    }

    let score_sum: f64 = frames.iter().map(|f| f.sentiment_score).sum();

    Some(AppDetail {
        app_name: stored_name,
        total_frames: frames.len(),
        content_types,
        sentiments,
        wellness_impacts,
        avg_sentiment_score: round_to(score_sum / frames.len() as f64, 2),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::session::tests::frame;
    use crate::db::models::{ContentCategory, SessionSummary};
    use chrono::{TimeZone, Utc};

    fn session(id: i64, day: u32, apps: &[(&str, u32)], sentiments: &[(&str, u32)]) -> ScreenSession {
        ScreenSession {
            id,
            user_id: 1,
            name: None,
            status: SessionStatus::Completed,
            summary: Some(SessionSummary {
                total_frames: 10,
                duration_seconds: 120,
                wellness_score: 6.0,
                productivity_score: 4.0,
                sentiment_distribution: sentiments.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
                app_usage: apps.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
                content_categories: [("work".to_string(), 3)].into_iter().collect(),
            }),
            created_at: Utc.with_ymd_and_hms(2025, 3, day, 9, 30, 0).unwrap(),
            completed_at: None,
        }
    }

    #[test]
    fn stats_without_sessions_flag_no_data() {
        let stats = user_stats(&[]);
        assert!(stats.no_data);
        assert_eq!(stats.avg_wellness, None);
    }

    #[test]
    fn app_usage_percentages() {
        let sessions = vec![
            session(1, 1, &[("Slack", 1), ("Youtube", 2)], &[]),
            session(2, 2, &[("Youtube", 3)], &[]),
        ];
        let apps = app_usage(&sessions);
        assert_eq!(apps[0].name, "Youtube");
        assert_eq!(apps[0].percentage, 83.3);
        assert_eq!(apps[1].percentage, 16.7);

        let stats = user_stats(&sessions);
        assert_eq!(stats.total_frames, 20);
        assert_eq!(stats.total_duration, 240);
        assert_eq!(stats.avg_wellness, Some(6.0));
    }

    #[test]
    fn timeline_is_oldest_first_and_skips_empty() {
        let sessions = vec![
            session(2, 5, &[], &[("positive", 1), ("negative", 3)]),
            session(1, 4, &[], &[]),
            session(3, 3, &[], &[("neutral", 2)]),
        ];
        let timeline = sentiment_timeline(&sessions);
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline[0].date, "2025-03-03");
        assert_eq!(timeline[0].neutral, 100.0);
        assert_eq!(timeline[1].negative, 75.0);

        let series = wellness_trend_series(&sessions);
        assert_eq!(series[0].date, "2025-03-03 09:30");
        assert_eq!(series.len(), 3);

        let content = content_analysis(&sessions);
        assert_eq!(content.content_types["work"], 9);
        assert_eq!(content.sentiment_distribution["mixed"], 0);
    }

    #[test]
    fn app_detail_averages_scores() {
        let mut frames = vec![
            frame(0, 0.0, "Reddit", ContentCategory::SocialMedia, Sentiment::Negative, WellnessImpact::Negative),
            frame(1, 0.5, "Reddit", ContentCategory::News, Sentiment::Positive, WellnessImpact::Neutral),
            frame(2, 1.0, "Slack", ContentCategory::Work, Sentiment::Neutral, WellnessImpact::Positive),
        ];
        frames[0].sentiment_score = -0.5;
        frames[1].sentiment_score = 0.2;

        let detail = app_detail("Reddit", &frames).expect("detail");
        assert_eq!(detail.total_frames, 2);
        assert_eq!(detail.avg_sentiment_score, -0.15);
        assert_eq!(detail.wellness_impacts["positive"], 0);
        assert!(app_detail("Discord", &frames).is_none());
    }

    #[test]
    fn app_detail_ignores_case_and_reports_stored_name() {
        let frames = vec![
            frame(0, 0.0, "Coursera", ContentCategory::Educational, Sentiment::Positive, WellnessImpact::Positive),
            frame(1, 0.5, "Coursera", ContentCategory::Educational, Sentiment::Neutral, WellnessImpact::Positive),
        ];

        let detail = app_detail("coursera", &frames).expect("detail");
        assert_eq!(detail.app_name, "Coursera");
        assert_eq!(detail.total_frames, 2);
        assert_eq!(detail.content_types["educational"], 2);
        assert_eq!(app_detail("COURSERA", &frames).map(|d| d.total_frames), Some(2));
    }
}
