//! Long-form coaching insights: oracle generated when possible, rule based
//! otherwise.

use std::fmt::Display;

use chrono::Utc;
use serde_json::{json, Value};

use super::user::UserData;
use crate::db::models::{PersonalityProfile, User};
use crate::oracle::{self, Oracle};
use crate::personality::Trait;

const INSIGHTS_MAX_TOKENS: u32 = 3000;
const PROMPT_LIST_LIMIT: usize = 5;

const COACH_SYSTEM_PROMPT: &str = "You are a compassionate digital wellness expert and life coach. \
Provide personalized, actionable advice that helps users improve their digital habits, physical \
health, and mental wellbeing. Be supportive but honest about areas needing improvement.";

pub fn new_user_insights(user: &User) -> Value {
    json!({
        "overall_assessment": {
            "summary": format!(
                "Welcome to Screenwell, {}! Start your digital wellness journey by recording your first screen analysis session.",
                user.name
            ),
            "wellness_grade": "N/A",
            "key_strength": "Taking the first step towards digital wellness",
            "primary_concern": "No data yet - start analyzing your screen time"
        },
        "digital_wellness_tips": [
            {
                "title": "Start Your First Analysis",
                "description": "Record a 5-10 minute screen session to begin tracking your digital habits.",
                "priority": "high",
                "category": "improve"
            },
            {
                "title": "Set Your Wellness Goals",
                "description": "Take the quiz to set personal wellness goals for better tracking.",
                "priority": "medium",
                "category": "focus"
            }
        ],
        "physical_health_tips": [
            {
                "title": "20-20-20 Rule",
                "description": "Every 20 minutes, look at something 20 feet away for 20 seconds.",
                "icon": "fa-eye"
            }
        ],
        "mental_health_tips": [
            {
                "title": "Mindful Screen Use",
                "description": "Before picking up your phone, ask yourself: \"What am I looking for?\"",
                "icon": "fa-brain"
            }
        ],
        "motivational_message": "Every journey begins with a single step. You're already on the path to better digital wellness!",
        "is_new_user": true
    })
}

pub fn fallback_insights(data: &UserData) -> Value {
    json!({
        "overall_assessment": {
            "summary": format!(
                "Based on {} sessions, your digital wellness score is {}/10.",
                data.total_sessions, data.avg_wellness
            ),
            "wellness_grade": if data.avg_wellness >= 6.0 { "B" } else { "C" },
            "key_strength": "Consistent tracking of screen time",
            "primary_concern": "Consider reducing high-risk screen time"
        },
        "digital_wellness_tips": [
            {
                "title": "Balance Your Screen Time",
                "description": format!(
                    "Your high-risk screen time is {}%. Try to keep it under 20%.",
                    data.high_risk_percentage
                ),
                "priority": "high",
                "category": "reduce"
            }
        ],
        "physical_health_tips": [
            {
                "title": "Take Regular Breaks",
                "description": "Stand up and stretch every 30 minutes of screen time.",
                "icon": "fa-walking"
            }
        ],
        "mental_health_tips": [
            {
                "title": "Digital Detox",
                "description": "Try a 1-hour digital detox each day to reset your mind.",
                "icon": "fa-spa"
            }
        ],
        "motivational_message": "Keep tracking your screen time - awareness is the first step to improvement!",
        "user_data": data
    })
}

fn or_unknown(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("Unknown")
}

fn joined_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

/// `- name: value{suffix}` per entry, one per line.
fn bullets<'a, V: Display + 'a>(
    entries: impl IntoIterator<Item = (&'a String, &'a V)>,
    suffix: &str,
) -> String {
    entries
        .into_iter()
        .map(|(name, value)| format!("- {name}: {value}{suffix}\n"))
        .collect()
}

/// User context block for the coaching prompt.
pub fn build_prompt(user: &User, profile: Option<&PersonalityProfile>, data: &UserData) -> String {
    let results = profile.map(|p| &p.results);
    let listed = |items: Option<&[String]>, empty: &str| joined_or(items.unwrap_or(&[]), empty);

    let mut out = format!(
        "User Profile:\n\
         - Name: {}\n\
         - Age: {}\n\
         - Occupation: {}\n\
         - Personality Type: {}\n\
         - Personality Description: {}\n\
         - Stress Level: {}\n\
         - Wellness Goals: {}\n",
        user.name,
        user.age.map(|a| a.to_string()).unwrap_or_else(|| "Unknown".into()),
        or_unknown(user.occupation.as_deref()),
        or_unknown(results.map(|r| r.personality_type.as_str())),
        results
            .map(|r| r.personality_description.as_str())
            .unwrap_or("Not assessed"),
        or_unknown(results.map(|r| r.stress_level.as_str())),
        listed(results.map(|r| r.wellness_goals.as_slice()), "Not set"),
    );

    out.push_str("\nBig Five Personality Traits (1-5 scale):\n");
    for trait_name in [
        Trait::Openness,
        Trait::Conscientiousness,
        Trait::Extraversion,
        Trait::Agreeableness,
        Trait::Neuroticism,
    ] {
        let score = results
            .map(|r| r.traits.display(trait_name).to_string())
            .unwrap_or_else(|| "N/A".into());
        out.push_str(&format!("- {}: {}\n", trait_name.label(), score));
    }

    out.push_str(&format!(
        "\nStrengths: {}\nGrowth Areas: {}\n",
        listed(results.map(|r| r.strengths.as_slice()), "Not identified"),
        listed(results.map(|r| r.growth_areas.as_slice()), "Not identified"),
    ));

    match results {
        Some(r) => out.push_str(&format!(
            "\nMental Wellness Index: {}/100\n\
             Mental Health Status: {}\n\
             Mental Health Category Scores:\n\
             {}\n\
             Digital Wellness Index: {}/100\n\
             Digital Risk Level: {}\n",
            r.mental_health.wellness_index,
            r.mental_health.status.as_str(),
            bullets(&r.mental_health.category_scores, ""),
            r.digital_wellness.wellness_index,
            r.digital_wellness.risk_level.as_str(),
        )),
        None => out.push_str("\nMental Wellness Index: N/A/100\nDigital Wellness Index: N/A/100\n"),
    }

    out.push_str(&format!(
        "\nScreen Time Data:\n\
         - Total Sessions Analyzed: {}\n\
         - Total Time Analyzed: {} hours\n\
         - Average Wellness Score: {}/10\n\
         - Average Productivity Score: {}/10\n\
         - High-Risk Screen Time: {}%\n\
         - Productive Screen Time: {}%\n\
         - Wellness Trend: {}\n",
        data.total_sessions,
        data.total_duration_hours,
        data.avg_wellness,
        data.avg_productivity,
        data.high_risk_percentage,
        data.productive_percentage,
        data.wellness_trend.as_str(),
    ));

    let top_apps = data.top_apps.iter().take(PROMPT_LIST_LIMIT).map(|(app, count)| (app, count));
    let categories = data
        .content_categories
        .iter()
        .take(PROMPT_LIST_LIMIT)
        .map(|(category, count)| (category, count));
    out.push_str(&format!(
        "\nTop Applications Used:\n{}\nContent Categories:\n{}\nSentiment Distribution:\n{}",
        bullets(top_apps, " frames"),
        bullets(categories, ""),
        bullets(&data.sentiment_distribution, ""),
    ));

    out.push_str(&format!(
        "\nBased on this user's screen time data, personality profile, and mental health indicators, \
provide comprehensive, personalized insights as a caring friend, mentor, and wellness guide.\n\n\
Tailor all advice to their personality type and mental health status:\n\
- For high neuroticism: focus on stress reduction and calming activities\n\
- For low extraversion: suggest solo wellness activities, not forced socializing\n\
- For low conscientiousness: provide simple, easy-to-follow routines\n\
- For high openness: include creative and novel wellness approaches\n\n\
Respond with one JSON object with the keys overall_assessment (summary, wellness_grade, \
key_strength, primary_concern), digital_wellness_tips, physical_health_tips, mental_health_tips, \
productivity_suggestions, app_specific_advice, daily_routine_suggestions (morning, work_hours, \
evening, before_bed), weekly_challenges, motivational_message, focus_areas, avoid_areas and \
wellness_score_prediction (current = {}, potential, timeframe). Provide 3-5 items for each list, \
specific to the apps above.",
        data.avg_wellness
    ));
    out
}

/// Insights for the dashboard. Users without completed sessions get the
/// welcome set; an oracle failure or a non-object reply gets the rule-based
/// set.
pub async fn comprehensive_insights(
    oracle: &dyn Oracle,
    user: &User,
    profile: Option<&PersonalityProfile>,
    data: Option<&UserData>,
) -> Value {
    let Some(data) = data else {
        return new_user_insights(user);
    };

    let prompt = build_prompt(user, profile, data);
    let reply = oracle
        .complete_with_system(COACH_SYSTEM_PROMPT, &prompt, INSIGHTS_MAX_TOKENS)
        .await;

    let parsed = reply.and_then(|text| oracle::parse_json_reply::<Value>(&text));
    match parsed {
        Ok(Value::Object(mut insights)) => {
            insights.insert("user_data".into(), json!(data));
            insights.insert("generated_at".into(), json!(Utc::now().to_rfc3339()));
            Value::Object(insights)
        }
        Ok(_) => {
            log::warn!("Insight reply for user {} was not a JSON object", user.id);
            fallback_insights(data)
        }
        Err(err) => {
            log::warn!("Insight generation failed for user {}: {err:#}", user.id);
            fallback_insights(data)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::Trend;
    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use std::collections::BTreeMap;

    struct Scripted(Option<&'static str>);

    #[async_trait]
    impl Oracle for Scripted {
        async fn describe_image(&self, _: &[u8], _: &str, _: &str, _: u32) -> Result<String> {
            bail!("not used")
        }

        async fn complete(&self, _prompt: &str, _max_tokens: u32) -> Result<String> {
            match self.0 {
                Some(reply) => Ok(reply.to_string()),
                None => bail!("service down"),
            }
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn user() -> User {
        User {
            id: 7,
            email: "ana@example.com".into(),
            name: "Ana".into(),
            age: Some(31),
            gender: None,
            occupation: Some("Nurse".into()),
            location: None,
            quiz_completed: false,
            created_at: Utc::now(),
        }
    }

    fn data(avg_wellness: f64) -> UserData {
        UserData {
            total_sessions: 4,
            total_duration_hours: 1.5,
            avg_wellness,
            avg_productivity: 3.0,
            top_apps: vec![("Instagram".into(), 12), ("Slack".into(), 4)],
            content_categories: vec![("social_media".into(), 12)],
            sentiment_distribution: BTreeMap::new(),
            high_risk_percentage: 25.0,
            productive_percentage: 10.0,
            wellness_trend: Trend::Stable,
            wellness_impacts: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn no_data_gets_welcome_insights() {
        let insights = comprehensive_insights(&Scripted(None), &user(), None, None).await;
        assert_eq!(insights["is_new_user"], true);
        assert_eq!(insights["overall_assessment"]["wellness_grade"], "N/A");
    }

    #[tokio::test]
    async fn oracle_failure_uses_rules() {
        let insights = comprehensive_insights(&Scripted(None), &user(), None, Some(&data(6.5))).await;
        assert_eq!(insights["overall_assessment"]["wellness_grade"], "B");
        assert_eq!(
            insights["overall_assessment"]["summary"],
            "Based on 4 sessions, your digital wellness score is 6.5/10."
        );

        let insights = comprehensive_insights(&Scripted(Some("no json here")), &user(), None, Some(&data(4.0))).await;
        assert_eq!(insights["overall_assessment"]["wellness_grade"], "C");
    }

    #[tokio::test]
    async fn oracle_reply_is_enriched() {
        let reply = "```json\n{\"motivational_message\": \"keep going\"}\n```";
        let insights = comprehensive_insights(&Scripted(Some(reply)), &user(), None, Some(&data(5.0))).await;
        assert_eq!(insights["motivational_message"], "keep going");
        assert_eq!(insights["user_data"]["totalSessions"], 4);
        assert!(insights["generated_at"].is_string());
    }

    #[test]
    fn prompt_mentions_usage_without_profile() {
        let prompt = build_prompt(&user(), None, &data(5.0));
        assert!(prompt.contains("- Occupation: Nurse"));
        assert!(prompt.contains("- Personality Type: Unknown"));
        assert!(prompt.contains("- Instagram: 12 frames"));
        assert!(prompt.contains("- Openness: N/A"));
        assert!(prompt.starts_with("User Profile:\n- Name: Ana\n- Age: 31\n"));
        assert!(prompt.contains("Growth Areas: Not identified\n\nMental Wellness Index: N/A/100\n"));
        assert!(prompt.contains("- Slack: 4 frames\n\nContent Categories:\n- social_media: 12\n"));
        assert!(prompt.contains("Sentiment Distribution:\n\nBased on"));
        assert!(prompt.ends_with("specific to the apps above."));
    }
}
