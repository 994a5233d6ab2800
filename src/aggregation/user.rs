//! Per-user rollups over completed sessions: trend, alerts and quick
//! insights.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::trend::{halves_trend, Trend, SESSION_THRESHOLD};
use crate::db::models::{ScreenSession, Sentiment, SessionStatus, WellnessImpact};
use crate::utils::round_to;

/// Sessions whose frames feed the impact percentages and the trend.
pub const RECENT_SESSIONS: usize = 10;
const TOP_APPS: usize = 10;
const SOCIAL_APPS: [&str; 6] = ["instagram", "facebook", "twitter", "tiktok", "snapchat", "reddit"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub total_sessions: usize,
    pub total_duration_hours: f64,
    pub avg_wellness: f64,
    pub avg_productivity: f64,
    /// Most used first.
    pub top_apps: Vec<(String, u32)>,
    /// Most frequent first.
    pub content_categories: Vec<(String, u32)>,
    pub sentiment_distribution: BTreeMap<String, u32>,
    pub high_risk_percentage: f64,
    pub productive_percentage: f64,
    pub wellness_trend: Trend,
    pub wellness_impacts: BTreeMap<String, u32>,
}

impl UserData {
    pub fn sentiment_count(&self, sentiment: Sentiment) -> u32 {
        self.sentiment_distribution
            .get(sentiment.as_str())
            .copied()
            .unwrap_or(0)
    }
}

pub(crate) fn merge_counts<'a, I>(maps: I) -> BTreeMap<String, u32>
where
    I: IntoIterator<Item = &'a BTreeMap<String, u32>>,
{
    let mut merged = BTreeMap::new();
    for map in maps {
        for (key, count) in map {
            *merged.entry(key.clone()).or_insert(0) += *count;
        }
    }
    merged
}

/// Highest count first; equal counts keep key order.
pub(crate) fn sorted_desc(counts: &BTreeMap<String, u32>) -> Vec<(String, u32)> {
    let mut entries: Vec<(String, u32)> = counts.iter().map(|(k, v)| (k.clone(), *v)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries
}

/// Roll up a user's sessions, newest first. `recent_impacts` are the
/// wellness impacts of every frame in the newest `RECENT_SESSIONS`
/// sessions. Returns `None` when the user has no completed session.
pub fn gather_user_data(
    sessions_newest_first: &[ScreenSession],
    recent_impacts: &[WellnessImpact],
) -> Option<UserData> {
    let sessions: Vec<&ScreenSession> = sessions_newest_first
        .iter()
        .filter(|s| s.status == SessionStatus::Completed)
        .collect();
    if sessions.is_empty() {
        return None;
    }

    let count = sessions.len() as f64;
    let total_duration: i64 = sessions.iter().map(|s| s.duration_seconds()).sum();
    let avg_wellness = sessions.iter().map(|s| s.wellness_score().unwrap_or(0.0)).sum::<f64>() / count;
    let avg_productivity =
        sessions.iter().map(|s| s.productivity_score().unwrap_or(0.0)).sum::<f64>() / count;

    let summaries: Vec<_> = sessions.iter().filter_map(|s| s.summary.as_ref()).collect();
    let app_usage = merge_counts(summaries.iter().map(|s| &s.app_usage));
    let categories = merge_counts(summaries.iter().map(|s| &s.content_categories));

    let mut sentiment_distribution: BTreeMap<String, u32> = Sentiment::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();
    for (key, value) in merge_counts(summaries.iter().map(|s| &s.sentiment_distribution)) {
        *sentiment_distribution.entry(key).or_insert(0) += value;
    }

    let mut wellness_impacts: BTreeMap<String, u32> = [
        WellnessImpact::Positive,
        WellnessImpact::Negative,
        WellnessImpact::Neutral,
    ]
    .iter()
    .map(|i| (i.as_str().to_string(), 0))
    .collect();
    for impact in recent_impacts {
        *wellness_impacts.entry(impact.as_str().to_string()).or_insert(0) += 1;
    }

    let impact_total = recent_impacts.len() as f64;
    let share = |impact: WellnessImpact| {
        if impact_total > 0.0 {
            let hits = recent_impacts.iter().filter(|i| **i == impact).count() as f64;
            round_to(hits / impact_total * 100.0, 1)
        } else {
            0.0
        }
    };

    let recent_scores: Vec<f64> = sessions
        .iter()
        .take(RECENT_SESSIONS)
        .map(|s| s.wellness_score().unwrap_or(0.0))
        .collect();

    let mut top_apps = sorted_desc(&app_usage);
    top_apps.truncate(TOP_APPS);

    Some(UserData {
        total_sessions: sessions.len(),
        total_duration_hours: round_to(total_duration as f64 / 3600.0, 1),
        avg_wellness: round_to(avg_wellness, 1),
        avg_productivity: round_to(avg_productivity, 1),
        top_apps,
        content_categories: sorted_desc(&categories),
        sentiment_distribution,
        high_risk_percentage: share(WellnessImpact::Negative),
        productive_percentage: share(WellnessImpact::Positive),
        wellness_trend: halves_trend(&recent_scores, SESSION_THRESHOLD),
        wellness_impacts,
    })
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Danger,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuickInsight {
    pub severity: Severity,
    pub icon: String,
    pub title: String,
    pub message: String,
}

impl QuickInsight {
    fn new(severity: Severity, icon: &str, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            icon: icon.to_string(),
            title: title.into(),
            message: message.into(),
        }
    }
}

pub fn wellness_alerts(data: Option<&UserData>) -> Vec<Alert> {
    let Some(data) = data else {
        return Vec::new();
    };
    let mut alerts = Vec::new();

    let total_sentiment: u32 = data.sentiment_distribution.values().sum();
    if total_sentiment > 0 {
        let negative_ratio = data.sentiment_count(Sentiment::Negative) as f64 / total_sentiment as f64;
        if negative_ratio > 0.3 {
            alerts.push(Alert {
                severity: Severity::Warning,
                message: "High negative content exposure detected. Consider curating your feeds."
                    .to_string(),
            });
        }
    }

    if data.total_duration_hours > 50.0 {
        alerts.push(Alert {
            severity: Severity::Danger,
            message: "Extended screen time detected. Remember to take breaks and rest your eyes."
                .to_string(),
        });
    }

    if data.avg_wellness < 4.0 {
        alerts.push(Alert {
            severity: Severity::Warning,
            message: "Your wellness score is below average. Review your AI insights for improvement tips."
                .to_string(),
        });
    }

    alerts
}

pub const DEFAULT_QUICK_INSIGHTS: usize = 3;

pub fn quick_insights(data: Option<&UserData>, limit: usize) -> Vec<QuickInsight> {
    let Some(data) = data else {
        return vec![QuickInsight::new(
            Severity::Info,
            "fa-info-circle",
            "Get Started",
            "Start your first analysis session to get personalized insights.",
        )];
    };

    let mut insights = Vec::new();

    match data.wellness_trend {
        Trend::Improving => insights.push(QuickInsight::new(
            Severity::Success,
            "fa-arrow-up",
            "Wellness Improving",
            "Great job! Your wellness score is trending upward.",
        )),
        Trend::Declining => insights.push(QuickInsight::new(
            Severity::Warning,
            "fa-arrow-down",
            "Wellness Declining",
            "Your wellness score has dropped. Consider reducing social media time.",
        )),
        Trend::Stable => {}
    }

    if data.high_risk_percentage > 30.0 {
        insights.push(QuickInsight::new(
            Severity::Danger,
            "fa-exclamation-triangle",
            "High-Risk Alert",
            format!(
                "{}% of your screen time is high-risk. Try healthier alternatives.",
                data.high_risk_percentage
            ),
        ));
    }

    if data.productive_percentage > 50.0 {
        insights.push(QuickInsight::new(
            Severity::Success,
            "fa-star",
            "Productive User",
            format!(
                "Excellent! {}% of your screen time is productive.",
                data.productive_percentage
            ),
        ));
    } else if data.productive_percentage < 20.0 {
        insights.push(QuickInsight::new(
            Severity::Info,
            "fa-lightbulb",
            "Boost Productivity",
            "Try using more educational and work-related apps to boost productivity.",
        ));
    }

    if let Some((top_app, _)) = data.top_apps.first() {
        let lower = top_app.to_lowercase();
        if SOCIAL_APPS.iter().any(|app| lower.contains(app)) {
            insights.push(QuickInsight::new(
                Severity::Warning,
                "fa-mobile-alt",
                format!("Most Used: {}", top_app),
                "Social media is your top app. Consider setting usage limits.",
            ));
        }
    }

    insights.truncate(limit);
    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::SessionSummary;
    use chrono::{Duration, Utc};

    fn completed(id: i64, wellness: f64, duration: i64, apps: &[(&str, u32)], sentiments: &[(&str, u32)]) -> ScreenSession {
        ScreenSession {
            id,
            user_id: 1,
            name: None,
            status: SessionStatus::Completed,
            summary: Some(SessionSummary {
                total_frames: apps.iter().map(|(_, c)| c).sum(),
                duration_seconds: duration,
                wellness_score: wellness,
                productivity_score: 2.0,
                sentiment_distribution: sentiments.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
                app_usage: apps.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
                content_categories: BTreeMap::new(),
            }),
            created_at: Utc::now() - Duration::hours(id),
            completed_at: Some(Utc::now()),
        }
    }

    #[test]
    fn no_sessions_means_no_data() {
        assert!(gather_user_data(&[], &[]).is_none());
        let insights = quick_insights(None, DEFAULT_QUICK_INSIGHTS);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].title, "Get Started");
        assert!(wellness_alerts(None).is_empty());
    }

    #[test]
    fn recording_sessions_are_ignored() {
        let mut session = completed(1, 8.0, 60, &[], &[]);
        session.status = SessionStatus::Recording;
        assert!(gather_user_data(&[session], &[]).is_none());
    }

    #[test]
    fn rollup_merges_sessions() {
        let sessions = vec![
            completed(1, 8.0, 1800, &[("Instagram", 6), ("Slack", 2)], &[("negative", 5), ("neutral", 3)]),
            completed(2, 6.0, 1800, &[("Instagram", 1), ("Slack", 4)], &[("positive", 5)]),
        ];
        let impacts = vec![
            WellnessImpact::Negative,
            WellnessImpact::Negative,
            WellnessImpact::Positive,
            WellnessImpact::Neutral,
        ];
        let data = gather_user_data(&sessions, &impacts).expect("data");
        assert_eq!(data.total_sessions, 2);
        assert_eq!(data.total_duration_hours, 1.0);
        assert_eq!(data.avg_wellness, 7.0);
        assert_eq!(data.top_apps[0], ("Instagram".to_string(), 7));
        assert_eq!(data.high_risk_percentage, 50.0);
        assert_eq!(data.productive_percentage, 25.0);
        assert_eq!(data.sentiment_count(Sentiment::Mixed), 0);
        // recent [8.0] vs older [6.0]
        assert_eq!(data.wellness_trend, Trend::Improving);
    }

    #[test]
    fn alerts_fire_on_thresholds() {
        let sessions = vec![completed(1, 3.0, 51 * 3600, &[("Reddit", 3)], &[("negative", 4), ("neutral", 6)])];
        let data = gather_user_data(&sessions, &[]).expect("data");
        let alerts = wellness_alerts(Some(&data));
        let severities: Vec<_> = alerts.iter().map(|a| a.severity).collect();
        assert_eq!(severities, vec![Severity::Warning, Severity::Danger, Severity::Warning]);
    }

    #[test]
    fn quick_insights_flag_social_top_app_and_respect_limit() {
        let sessions = vec![completed(1, 5.0, 60, &[("Tiktok", 9), ("Notion", 1)], &[("neutral", 10)])];
        let impacts = vec![WellnessImpact::Negative; 4];
        let data = gather_user_data(&sessions, &impacts).expect("data");

        let all = quick_insights(Some(&data), 10);
        let titles: Vec<_> = all.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["High-Risk Alert", "Boost Productivity", "Most Used: Tiktok"]);
        assert_eq!(all[0].message, "100% of your screen time is high-risk. Try healthier alternatives.");

        assert_eq!(quick_insights(Some(&data), 2).len(), 2);
    }
}
