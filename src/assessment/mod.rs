//! Weekly and monthly wellness check-ins.
//!
//! A check-in is keyed by `(user, kind, period_key)`. Scoring is pure; the
//! caller looks up the previous period's record and persists the result.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::aggregation::trend::{halves_trend, Trend, ASSESSMENT_THRESHOLD};
use crate::db::models::{AssessmentKind, AssessmentScores, PeriodicAssessment};
use crate::personality::{Trait, TraitScores};

pub const HISTORY_LIMIT: usize = 12;
const WEEKLY_TREND_POINTS: usize = 4;
const MONTHLY_TREND_POINTS: usize = 3;
const NEUTRAL_ANSWER: u8 = 3;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CheckInQuestion {
    pub id: &'static str,
    pub text: &'static str,
    pub category: &'static str,
}

const fn question(id: &'static str, text: &'static str, category: &'static str) -> CheckInQuestion {
    CheckInQuestion { id, text, category }
}

pub static WEEKLY_QUESTIONS: [CheckInQuestion; 8] = [
    question("W1", "How would you rate your overall mood this week?", "mood"),
    question("W2", "How well did you sleep this week?", "sleep"),
    question("W3", "How stressed did you feel this week?", "stress"),
    question("W4", "How productive were you this week?", "productivity"),
    question("W5", "How much energy did you have this week?", "energy"),
    question("W6", "How well did you manage your screen time this week?", "digital"),
    question("W7", "How connected did you feel to others this week?", "social"),
    question("W8", "How satisfied are you with this week overall?", "satisfaction"),
];

pub static MONTHLY_QUESTIONS: [CheckInQuestion; 10] = [
    question("M1", "How would you rate your mental wellness this month?", "mental_wellness"),
    question("M2", "How consistent was your sleep routine?", "sleep"),
    question("M3", "How well did you handle stress this month?", "stress"),
    question("M4", "How would you rate your work-life balance?", "balance"),
    question("M5", "How much progress did you make on personal goals?", "goals"),
    question("M6", "How healthy were your digital habits?", "digital"),
    question("M7", "How often did you practice self-care?", "selfcare"),
    question("M8", "How optimistic do you feel about next month?", "outlook"),
    question("M9", "How would you rate your physical activity level?", "physical"),
    question("M10", "Overall, how satisfied are you with this month?", "satisfaction"),
];

pub fn questions(kind: AssessmentKind) -> &'static [CheckInQuestion] {
    match kind {
        AssessmentKind::Weekly => &WEEKLY_QUESTIONS,
        AssessmentKind::Monthly => &MONTHLY_QUESTIONS,
    }
}

/// `2026-W07` (ISO week) or `2026-02`.
pub fn period_key(kind: AssessmentKind, date: NaiveDate) -> String {
    match kind {
        AssessmentKind::Weekly => {
            let week = date.iso_week();
            format!("{}-W{:02}", week.year(), week.week())
        }
        AssessmentKind::Monthly => date.format("%Y-%m").to_string(),
    }
}

/// Key of the calendar period just before the one containing `date`.
pub fn previous_period_key(kind: AssessmentKind, date: NaiveDate) -> String {
    let previous = match kind {
        AssessmentKind::Weekly => date - chrono::Duration::weeks(1),
        AssessmentKind::Monthly => date
            .with_day(1)
            .and_then(|first| first.checked_sub_months(Months::new(1)))
            .unwrap_or(date),
    };
    period_key(kind, previous)
}

/// A scored check-in, ready to be upserted.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckIn {
    pub kind: AssessmentKind,
    pub period_key: String,
    pub scores: AssessmentScores,
    pub big_five_snapshot: Option<BTreeMap<Trait, f64>>,
    pub responses: BTreeMap<String, u8>,
    pub insights: Vec<String>,
    pub improvement_score: f64,
}

/// Keep one answer per question of `kind`, clamped to 1..=5. Unanswered
/// questions read as 3 and unknown ids are dropped.
pub fn normalize_responses<K, I>(kind: AssessmentKind, raw: I) -> BTreeMap<String, u8>
where
    K: AsRef<str>,
    I: IntoIterator<Item = (K, i64)>,
{
    let raw: BTreeMap<String, i64> = raw
        .into_iter()
        .map(|(id, value)| (id.as_ref().to_string(), value))
        .collect();

    questions(kind)
        .iter()
        .map(|q| {
            let answer = raw
                .get(q.id)
                .map(|value| (*value).clamp(1, 5) as u8)
                .unwrap_or(NEUTRAL_ANSWER);
            (q.id.to_string(), answer)
        })
        .collect()
}

fn answer(responses: &BTreeMap<String, u8>, id: &str) -> u8 {
    responses.get(id).copied().unwrap_or(NEUTRAL_ANSWER)
}

fn scaled(responses: &BTreeMap<String, u8>, id: &str) -> f64 {
    f64::from(answer(responses, id)) * 20.0
}

/// Score one check-in.
///
/// `previous_overall` is the overall wellness of the previous period's
/// record of the same kind. `traits` feed the monthly Big Five snapshot.
pub fn score_check_in(
    kind: AssessmentKind,
    responses: BTreeMap<String, u8>,
    previous_overall: Option<f64>,
    traits: Option<&TraitScores>,
    today: NaiveDate,
) -> CheckIn {
    let count = questions(kind).len() as f64;
    let total: f64 = questions(kind)
        .iter()
        .map(|q| f64::from(answer(&responses, q.id)))
        .sum();
    let overall = total / count * 20.0;

    let improvement_score = match previous_overall {
        Some(previous) if previous != 0.0 => overall - previous,
        _ => 0.0,
    };

    let (scores, insights, big_five_snapshot) = match kind {
        AssessmentKind::Weekly => (
            AssessmentScores {
                overall_wellness: overall,
                mood_score: Some(scaled(&responses, "W1")),
                sleep_quality_score: Some(scaled(&responses, "W2")),
                stress_level_score: Some(100.0 - scaled(&responses, "W3")),
                productivity_score: Some(scaled(&responses, "W4")),
                energy_score: Some(scaled(&responses, "W5")),
                digital_wellness_score: Some(scaled(&responses, "W6")),
                mental_wellness_score: None,
            },
            weekly_insights(&responses, improvement_score),
            None,
        ),
        AssessmentKind::Monthly => (
            AssessmentScores {
                overall_wellness: overall,
                mental_wellness_score: Some(scaled(&responses, "M1")),
                sleep_quality_score: Some(scaled(&responses, "M2")),
                stress_level_score: Some(scaled(&responses, "M3")),
                digital_wellness_score: Some(scaled(&responses, "M6")),
                ..Default::default()
            },
            monthly_insights(&responses, improvement_score),
            traits.map(TraitScores::normalized_map),
        ),
    };

    CheckIn {
        kind,
        period_key: period_key(kind, today),
        scores,
        big_five_snapshot,
        responses,
        insights,
        improvement_score,
    }
}

pub fn weekly_insights(responses: &BTreeMap<String, u8>, improvement: f64) -> Vec<String> {
    let mood = answer(responses, "W1");
    let sleep = answer(responses, "W2");
    let stress = answer(responses, "W3");
    let energy = answer(responses, "W5");
    let digital = answer(responses, "W6");

    let mut insights: Vec<&str> = Vec::new();
    if improvement > 10.0 {
        insights.push("Great improvement from last week! Keep up the positive momentum.");
    } else if improvement < -10.0 {
        insights.push("This week was challenging. Remember, setbacks are part of the journey.");
    }

    if mood >= 4 && energy >= 4 {
        insights.push("Your mood and energy levels are excellent - you're thriving!");
    } else if mood <= 2 {
        insights.push("Low mood detected. Consider activities that bring you joy.");
    }

    if sleep <= 2 {
        insights.push("Sleep quality needs attention. Try a consistent bedtime routine.");
    }
    if stress >= 4 {
        insights.push("High stress levels. Practice deep breathing or take short breaks.");
    }

    if digital <= 2 {
        insights.push("Great job managing screen time this week!");
    } else if digital >= 4 {
        insights.push("Consider setting app timers to reduce screen time.");
    }

    if insights.is_empty() {
        insights.push("Balanced week overall. Maintain your healthy routines.");
    }
    insights.into_iter().map(String::from).collect()
}

pub fn monthly_insights(responses: &BTreeMap<String, u8>, improvement: f64) -> Vec<String> {
    let mental = answer(responses, "M1");
    let balance = answer(responses, "M4");
    let goals = answer(responses, "M5");
    let selfcare = answer(responses, "M7");
    let outlook = answer(responses, "M8");

    let mut insights: Vec<&str> = Vec::new();
    if improvement > 5.0 {
        insights.push("Monthly improvement trend is positive - your efforts are paying off!");
    } else if improvement < -5.0 {
        insights.push("This month had challenges. Next month is a fresh start.");
    }

    if mental >= 4 {
        insights.push("Strong mental wellness this month - excellent self-care!");
    }
    if balance <= 2 {
        insights.push("Work-life balance needs attention. Set boundaries for personal time.");
    }

    if goals >= 4 {
        insights.push("Great progress on goals! Consider setting new milestones.");
    } else if goals <= 2 {
        insights.push("Break down goals into smaller, achievable steps.");
    }

    if selfcare <= 2 {
        insights.push("Prioritize self-care activities - even 10 minutes daily helps.");
    }
    if outlook >= 4 {
        insights.push("Positive outlook for the future - optimism supports wellbeing!");
    }

    if insights.is_empty() {
        insights.push("Steady month with room for growth in various areas.");
    }
    insights.into_iter().map(String::from).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentHistory {
    pub weekly: Vec<PeriodicAssessment>,
    pub monthly: Vec<PeriodicAssessment>,
    pub weekly_trend: Trend,
    pub monthly_trend: Trend,
    pub weekly_due: bool,
    pub monthly_due: bool,
}

/// Build the history view from records ordered newest first.
pub fn history(
    mut weekly: Vec<PeriodicAssessment>,
    mut monthly: Vec<PeriodicAssessment>,
    today: NaiveDate,
) -> AssessmentHistory {
    weekly.truncate(HISTORY_LIMIT);
    monthly.truncate(HISTORY_LIMIT);

    let overall = |records: &[PeriodicAssessment], points: usize| -> Vec<f64> {
        records
            .iter()
            .take(points)
            .map(|a| a.scores.overall_wellness)
            .collect()
    };
    let weekly_trend = halves_trend(&overall(&weekly, WEEKLY_TREND_POINTS), ASSESSMENT_THRESHOLD);
    let monthly_trend = halves_trend(&overall(&monthly, MONTHLY_TREND_POINTS), ASSESSMENT_THRESHOLD);

    let current_week = period_key(AssessmentKind::Weekly, today);
    let current_month = period_key(AssessmentKind::Monthly, today);

    AssessmentHistory {
        weekly_due: !weekly.iter().any(|a| a.period_key == current_week),
        monthly_due: !monthly.iter().any(|a| a.period_key == current_month),
        weekly,
        monthly,
        weekly_trend,
        monthly_trend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(kind: AssessmentKind, key: &str, overall: f64) -> PeriodicAssessment {
        PeriodicAssessment {
            id: 0,
            user_id: 1,
            kind,
            period_key: key.to_string(),
            scores: AssessmentScores {
                overall_wellness: overall,
                ..Default::default()
            },
            big_five_snapshot: None,
            responses: BTreeMap::new(),
            insights: Vec::new(),
            improvement_score: 0.0,
            created_at: Utc::now(),
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn period_keys_follow_iso_weeks_and_months() {
        assert_eq!(period_key(AssessmentKind::Weekly, date(2026, 2, 12)), "2026-W07");
        // 2027-01-01 is a Friday, still in ISO week 53 of 2026.
        assert_eq!(period_key(AssessmentKind::Weekly, date(2027, 1, 1)), "2026-W53");
        assert_eq!(period_key(AssessmentKind::Monthly, date(2026, 3, 31)), "2026-03");
    }

    #[test]
    fn previous_keys_step_back_one_period() {
        assert_eq!(previous_period_key(AssessmentKind::Weekly, date(2026, 1, 5)), "2026-W01");
        assert_eq!(previous_period_key(AssessmentKind::Monthly, date(2026, 3, 31)), "2026-02");
        assert_eq!(previous_period_key(AssessmentKind::Monthly, date(2026, 1, 15)), "2025-12");
    }

    #[test]
    fn unanswered_questions_are_neutral() {
        let responses = normalize_responses(AssessmentKind::Weekly, [("W1", 9), ("X9", 1)]);
        assert_eq!(responses.len(), 8);
        assert_eq!(responses["W1"], 5);
        assert_eq!(responses["W2"], 3);
        assert!(!responses.contains_key("X9"));
    }

    #[test]
    fn weekly_scores_invert_stress() {
        let responses = normalize_responses(
            AssessmentKind::Weekly,
            [("W1", 5), ("W2", 4), ("W3", 4), ("W4", 3), ("W5", 5), ("W6", 2), ("W7", 3), ("W8", 4)],
        );
        let check_in = score_check_in(AssessmentKind::Weekly, responses, Some(60.0), None, date(2026, 2, 12));
        assert_eq!(check_in.scores.overall_wellness, 75.0);
        assert_eq!(check_in.scores.stress_level_score, Some(20.0));
        assert_eq!(check_in.scores.mood_score, Some(100.0));
        assert_eq!(check_in.scores.mental_wellness_score, None);
        assert_eq!(check_in.improvement_score, 15.0);
        assert_eq!(check_in.period_key, "2026-W07");
        assert_eq!(
            check_in.insights,
            vec![
                "Great improvement from last week! Keep up the positive momentum.",
                "Your mood and energy levels are excellent - you're thriving!",
                "High stress levels. Practice deep breathing or take short breaks.",
                "Great job managing screen time this week!",
            ]
        );
    }

    #[test]
    fn neutral_week_gets_default_insight() {
        let responses = normalize_responses::<&str, _>(AssessmentKind::Weekly, []);
        let check_in = score_check_in(AssessmentKind::Weekly, responses, None, None, date(2026, 2, 12));
        assert_eq!(check_in.scores.overall_wellness, 60.0);
        assert_eq!(check_in.improvement_score, 0.0);
        assert_eq!(check_in.insights, vec!["Balanced week overall. Maintain your healthy routines."]);
    }

    #[test]
    fn monthly_snapshot_uses_normalized_traits() {
        let responses = normalize_responses(AssessmentKind::Monthly, [("M5", 1), ("M8", 5)]);
        let traits = TraitScores::neutral();
        let check_in = score_check_in(
            AssessmentKind::Monthly,
            responses,
            Some(70.0),
            Some(&traits),
            date(2026, 2, 12),
        );
        assert_eq!(check_in.scores.overall_wellness, 60.0);
        assert_eq!(check_in.improvement_score, -10.0);
        assert_eq!(check_in.period_key, "2026-02");
        let snapshot = check_in.big_five_snapshot.unwrap();
        assert_eq!(snapshot[&Trait::Openness], 0.5);
        assert_eq!(
            check_in.insights,
            vec![
                "This month had challenges. Next month is a fresh start.",
                "Break down goals into smaller, achievable steps.",
                "Positive outlook for the future - optimism supports wellbeing!",
            ]
        );
    }

    #[test]
    fn zero_previous_overall_is_ignored() {
        let responses = normalize_responses::<&str, _>(AssessmentKind::Monthly, []);
        let check_in = score_check_in(AssessmentKind::Monthly, responses, Some(0.0), None, date(2026, 2, 12));
        assert_eq!(check_in.improvement_score, 0.0);
        assert!(check_in.big_five_snapshot.is_none());
    }

    #[test]
    fn history_reports_trends_and_due_flags() {
        let today = date(2026, 2, 12);
        let weekly = vec![
            record(AssessmentKind::Weekly, "2026-W07", 80.0),
            record(AssessmentKind::Weekly, "2026-W06", 78.0),
            record(AssessmentKind::Weekly, "2026-W05", 60.0),
            record(AssessmentKind::Weekly, "2026-W04", 62.0),
            record(AssessmentKind::Weekly, "2026-W03", 10.0),
        ];
        let monthly = vec![record(AssessmentKind::Monthly, "2026-01", 70.0)];
        let view = history(weekly, monthly, today);
        assert_eq!(view.weekly_trend, Trend::Improving);
        assert_eq!(view.monthly_trend, Trend::Stable);
        assert!(!view.weekly_due);
        assert!(view.monthly_due);
        assert_eq!(view.weekly.len(), 5);
    }
}
