use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::clusters::{self, PersonalityCluster};
use super::questions::{CategoryItem, Keyed, BIG_FIVE_ITEMS, DIGITAL_WELLNESS_ITEMS, MENTAL_HEALTH_ITEMS};
use super::{Answers, Trait, TraitScores};
use crate::utils::round_to;

const NEUTRAL_ANSWER: f64 = 3.0;
const RECOMMENDATION_THRESHOLD: f64 = 3.5;

fn keyed_score(raw: u8, keyed: Keyed) -> f64 {
    match keyed {
        Keyed::Positive => raw as f64,
        Keyed::Negative => 6.0 - raw as f64,
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Average each trait's answered items after reverse-keying, normalized to
/// [0, 1]. Traits with no answers sit at 0.5.
pub fn trait_scores(answers: &Answers) -> TraitScores {
    let mut values = [0.5; 5];
    for (slot, trait_name) in Trait::ALL.iter().enumerate() {
        let scores: Vec<f64> = BIG_FIVE_ITEMS
            .iter()
            .filter(|q| q.trait_name == *trait_name)
            .filter_map(|q| answers.get(q.id).map(|raw| keyed_score(*raw, q.keyed)))
            .collect();
        if let Some(avg) = mean(&scores) {
            values[slot] = ((avg - 1.0) / 4.0).clamp(0.0, 1.0);
        }
    }
    TraitScores::from_vector(values)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MentalHealthStatus {
    Excellent,
    Good,
    Moderate,
    NeedsAttention,
}

impl MentalHealthStatus {
    pub fn from_index(index: f64) -> Self {
        if index >= 75.0 {
            MentalHealthStatus::Excellent
        } else if index >= 60.0 {
            MentalHealthStatus::Good
        } else if index >= 45.0 {
            MentalHealthStatus::Moderate
        } else {
            MentalHealthStatus::NeedsAttention
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MentalHealthStatus::Excellent => "excellent",
            MentalHealthStatus::Good => "good",
            MentalHealthStatus::Moderate => "moderate",
            MentalHealthStatus::NeedsAttention => "needs_attention",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MentalHealthStatus::Excellent => {
                "Your mental wellness indicators are strong. Keep up the great work!"
            }
            MentalHealthStatus::Good => {
                "Your mental wellness is in a healthy range with some areas for improvement."
            }
            MentalHealthStatus::Moderate => {
                "Some areas of your mental wellness could use attention. Consider the recommendations below."
            }
            MentalHealthStatus::NeedsAttention => {
                "Your responses indicate some mental wellness challenges. Please consider speaking with a professional."
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CareTip {
    pub area: String,
    pub priority: String,
    pub tip: String,
    pub action: String,
}

impl CareTip {
    fn new(area: &str, priority: &str, tip: &str, action: &str) -> Self {
        Self {
            area: area.to_string(),
            priority: priority.to_string(),
            tip: tip.to_string(),
            action: action.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MentalHealthAssessment {
    /// depression, anxiety, stress, sleep, energy; each in [1, 5].
    pub category_scores: BTreeMap<String, f64>,
    pub wellness_index: f64,
    pub status: MentalHealthStatus,
    pub status_description: String,
    pub recommendations: Vec<CareTip>,
}

pub fn assess_mental_health(answers: &Answers) -> MentalHealthAssessment {
    let category_avg = |category: &str| -> f64 {
        let scores: Vec<f64> = MENTAL_HEALTH_ITEMS
            .iter()
            .filter(|q| q.category == category)
            .filter_map(|q| answers.get(q.id).map(|raw| keyed_score(*raw, q.keyed)))
            .collect();
        mean(&scores).unwrap_or(NEUTRAL_ANSWER)
    };

    let depression = category_avg("depression");
    let anxiety = category_avg("anxiety");
    let stress = category_avg("stress");
    let sleep = category_avg("sleep");
    let energy = category_avg("energy");

    let concern = (depression + anxiety + stress) / 3.0;
    let positive = (sleep + energy) / 2.0;
    let raw_index = (6.0 - concern) / 5.0 * 50.0 + positive / 5.0 * 50.0;
    let wellness_index = round_to(raw_index.clamp(0.0, 100.0), 1);
    let status = MentalHealthStatus::from_index(raw_index);

    let mut recommendations = Vec::new();
    if depression >= RECOMMENDATION_THRESHOLD {
        recommendations.push(CareTip::new(
            "Mood",
            "high",
            "Consider activities that bring joy. Small daily pleasures can lift your mood.",
            "Start a gratitude journal - write 3 things you appreciate each day",
        ));
    }
    if anxiety >= RECOMMENDATION_THRESHOLD {
        recommendations.push(CareTip::new(
            "Anxiety",
            "high",
            "Practice relaxation techniques to manage worry and tension.",
            "Try the 4-7-8 breathing technique: inhale 4 sec, hold 7 sec, exhale 8 sec",
        ));
    }
    if stress >= RECOMMENDATION_THRESHOLD {
        recommendations.push(CareTip::new(
            "Stress",
            "high",
            "Break overwhelming tasks into smaller, manageable pieces.",
            "Use the Pomodoro technique: 25 minutes work, 5 minutes break",
        ));
    }
    if sleep >= RECOMMENDATION_THRESHOLD {
        recommendations.push(CareTip::new(
            "Sleep",
            "medium",
            "Quality sleep is foundational for mental health.",
            "Establish a consistent sleep schedule and avoid screens 1 hour before bed",
        ));
    }
    if energy >= RECOMMENDATION_THRESHOLD {
        recommendations.push(CareTip::new(
            "Energy",
            "medium",
            "Low energy can be improved through lifestyle changes.",
            "Take a 10-minute walk daily - even brief movement boosts energy",
        ));
    }
    if recommendations.is_empty() {
        recommendations.push(CareTip::new(
            "Maintenance",
            "low",
            "Your mental wellness is in a good place!",
            "Continue your healthy habits and check in with yourself regularly",
        ));
    }

    let category_scores = [
        ("depression", depression),
        ("anxiety", anxiety),
        ("stress", stress),
        ("sleep", sleep),
        ("energy", energy),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), round_to(value, 2)))
    .collect();

    MentalHealthAssessment {
        category_scores,
        wellness_index,
        status,
        status_description: status.description().to_string(),
        recommendations,
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DigitalWellnessAssessment {
    /// digital_impact, digital_dependency, comparison, sleep_impact; 0 when
    /// unanswered.
    pub category_scores: BTreeMap<String, u8>,
    pub wellness_index: f64,
    pub risk_level: RiskLevel,
    pub wellness_goals: Vec<String>,
    pub recommendations: Vec<String>,
}

const DIGITAL_CONCERNS: [(&str, &str); 4] = [
    (
        "digital_impact",
        "Take regular breaks from social media - try a 24-hour digital detox weekly",
    ),
    (
        "digital_dependency",
        "Use app timers to limit time on addictive apps",
    ),
    (
        "comparison",
        "Curate your feeds to follow inspiring, not comparing content",
    ),
    (
        "sleep_impact",
        "Enable night mode and avoid screens 1 hour before bed",
    ),
];

pub fn assess_digital_wellness(answers: &Answers) -> DigitalWellnessAssessment {
    let answer_for = |category: &str| -> Option<(&'static CategoryItem, u8)> {
        DIGITAL_WELLNESS_ITEMS
            .iter()
            .find(|q| q.category == category)
            .and_then(|q| answers.get(q.id).map(|raw| (q, *raw)))
    };

    let category_scores: BTreeMap<String, u8> = DIGITAL_CONCERNS
        .iter()
        .map(|(category, _)| {
            let score = answer_for(*category).map(|(_, raw)| raw).unwrap_or(0);
            (category.to_string(), score)
        })
        .collect();

    let wellness_goals = match answer_for("goals") {
        Some((item, raw)) if raw >= 4 => vec![item.text.to_string()],
        _ => Vec::new(),
    };

    let total: u32 = category_scores.values().map(|v| *v as u32).sum();
    let index = (100.0 - total as f64 / DIGITAL_CONCERNS.len() as f64 * 20.0).max(0.0);
    let risk_level = if total <= 8 {
        RiskLevel::Low
    } else if total <= 14 {
        RiskLevel::Moderate
    } else {
        RiskLevel::High
    };

    let mut recommendations: Vec<String> = DIGITAL_CONCERNS
        .iter()
        .filter(|(category, _)| category_scores.get(*category).copied().unwrap_or(0) >= 4)
        .map(|(_, text)| text.to_string())
        .collect();
    if recommendations.is_empty() {
        recommendations
            .push("Your digital habits are healthy! Maintain your balanced approach.".to_string());
    }

    DigitalWellnessAssessment {
        category_scores,
        wellness_index: round_to(index.min(100.0), 1),
        risk_level,
        wellness_goals,
        recommendations,
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StressLevel {
    Low,
    Medium,
    High,
}

impl StressLevel {
    pub fn classify(neuroticism: f64, mental_wellness_index: f64) -> Self {
        if neuroticism >= 0.7 || mental_wellness_index < 45.0 {
            StressLevel::High
        } else if neuroticism >= 0.5 || mental_wellness_index < 60.0 {
            StressLevel::Medium
        } else {
            StressLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StressLevel::Low => "low",
            StressLevel::Medium => "medium",
            StressLevel::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(StressLevel::Low),
            "medium" => Some(StressLevel::Medium),
            "high" => Some(StressLevel::High),
            _ => None,
        }
    }
}

/// Everything the quiz produces for one submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizResults {
    pub personality_type: String,
    pub personality_description: String,
    pub traits: TraitScores,
    pub big_five_scores: BTreeMap<Trait, f64>,
    pub cluster: usize,
    pub cluster_confidence: f64,
    pub cluster_similarities: BTreeMap<String, f64>,
    pub strengths: Vec<String>,
    pub growth_areas: Vec<String>,
    pub wellness_tips: Vec<String>,
    pub digital_wellness_tips: Vec<String>,
    pub mental_health: MentalHealthAssessment,
    pub digital_wellness: DigitalWellnessAssessment,
    pub stress_level: StressLevel,
    pub wellness_goals: Vec<String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn analyze(answers: &Answers) -> QuizResults {
    let traits = trait_scores(answers);
    let classification = clusters::classify(&traits);
    let cluster: &PersonalityCluster = classification.cluster();
    let mental_health = assess_mental_health(answers);
    let digital_wellness = assess_digital_wellness(answers);
    let stress_level = StressLevel::classify(traits.neuroticism, mental_health.wellness_index);

    QuizResults {
        personality_type: cluster.name.to_string(),
        personality_description: cluster.description.to_string(),
        big_five_scores: traits.display_map(),
        traits,
        cluster: classification.cluster,
        cluster_confidence: classification.confidence,
        cluster_similarities: classification.similarities.clone(),
        strengths: owned(cluster.strengths),
        growth_areas: owned(cluster.growth_areas),
        wellness_tips: owned(cluster.wellness_tips),
        digital_wellness_tips: owned(cluster.digital_wellness),
        wellness_goals: digital_wellness.wellness_goals.clone(),
        mental_health,
        digital_wellness,
        stress_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(pairs: &[(&str, u8)]) -> Answers {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn no_answers_gives_neutral_traits() {
        let traits = trait_scores(&Answers::new());
        assert_eq!(traits.vector(), [0.5; 5]);
    }

    #[test]
    fn negative_keyed_items_are_reversed() {
        // EXT4/EXT5 are negative keyed: answering 1 there means outgoing.
        let traits = trait_scores(&answers(&[
            ("EXT1", 5),
            ("EXT2", 5),
            ("EXT3", 5),
            ("EXT4", 1),
            ("EXT5", 1),
        ]));
        assert_eq!(traits.extraversion, 1.0);
        assert_eq!(traits.neuroticism, 0.5);
    }

    #[test]
    fn traits_stay_in_unit_interval() {
        for value in 1..=5u8 {
            let all: Answers = BIG_FIVE_ITEMS.iter().map(|q| (q.id.to_string(), value)).collect();
            for score in trait_scores(&all).vector() {
                assert!((0.0..=1.0).contains(&score));
            }
        }
    }

    #[test]
    fn all_threes_lands_on_balanced_achiever() {
        let all: Answers = BIG_FIVE_ITEMS.iter().map(|q| (q.id.to_string(), 3)).collect();
        let results = analyze(&all);
        assert_eq!(results.traits.vector(), [0.5; 5]);
        assert_eq!(results.personality_type, "The Balanced Achiever");
        assert_eq!(results.big_five_scores[&Trait::Openness], 3.0);
    }

    #[test]
    fn mental_health_defaults_to_neutral() {
        let assessment = assess_mental_health(&Answers::new());
        // concern 3 -> 30, positive 3 -> 30
        assert_eq!(assessment.wellness_index, 60.0);
        assert_eq!(assessment.status, MentalHealthStatus::Good);
        assert_eq!(assessment.category_scores["sleep"], 3.0);
        assert_eq!(assessment.recommendations.len(), 1);
        assert_eq!(assessment.recommendations[0].area, "Maintenance");
    }

    #[test]
    fn mental_health_best_and_worst_case() {
        let best = assess_mental_health(&answers(&[
            ("MH1", 1),
            ("MH2", 1),
            ("MH3", 1),
            ("MH4", 1),
            ("MH5", 1),
        ]));
        // MH3/MH5 reversed: sleep = energy = 5 -> 50 + 50
        assert_eq!(best.wellness_index, 100.0);
        assert_eq!(best.status, MentalHealthStatus::Excellent);

        let worst = assess_mental_health(&answers(&[
            ("MH1", 5),
            ("MH2", 5),
            ("MH3", 5),
            ("MH4", 5),
            ("MH5", 5),
        ]));
        assert_eq!(worst.wellness_index, 20.0);
        assert_eq!(worst.status, MentalHealthStatus::NeedsAttention);
        let areas: Vec<_> = worst.recommendations.iter().map(|r| r.area.as_str()).collect();
        assert_eq!(areas, vec!["Mood", "Anxiety", "Stress"]);
    }

    #[test]
    fn poor_sleep_answer_triggers_sleep_tip() {
        // Answering 1 to "sleeping well" reverses to 5.
        let assessment = assess_mental_health(&answers(&[("MH3", 1)]));
        assert!(assessment.recommendations.iter().any(|r| r.area == "Sleep"));
    }

    #[test]
    fn digital_wellness_worst_case() {
        let assessment = assess_digital_wellness(&answers(&[
            ("DW1", 5),
            ("DW2", 5),
            ("DW3", 5),
            ("DW4", 5),
            ("DW5", 5),
        ]));
        assert_eq!(assessment.wellness_index, 0.0);
        assert_eq!(assessment.risk_level, RiskLevel::High);
        assert_eq!(
            assessment.wellness_goals,
            vec!["I want to reduce my overall screen time".to_string()]
        );
        assert_eq!(assessment.recommendations.len(), 4);
    }

    #[test]
    fn digital_wellness_unanswered_counts_zero() {
        let assessment = assess_digital_wellness(&Answers::new());
        assert_eq!(assessment.wellness_index, 100.0);
        assert_eq!(assessment.risk_level, RiskLevel::Low);
        assert!(assessment.wellness_goals.is_empty());
        assert_eq!(assessment.category_scores["comparison"], 0);
        assert_eq!(
            assessment.recommendations,
            vec!["Your digital habits are healthy! Maintain your balanced approach.".to_string()]
        );
    }

    #[test]
    fn digital_risk_boundaries() {
        let moderate = assess_digital_wellness(&answers(&[("DW1", 3), ("DW2", 3), ("DW3", 3)]));
        assert_eq!(moderate.risk_level, RiskLevel::Moderate);
        assert_eq!(moderate.wellness_index, 55.0);

        let low = assess_digital_wellness(&answers(&[("DW1", 4), ("DW2", 4)]));
        assert_eq!(low.risk_level, RiskLevel::Low);
        assert_eq!(low.recommendations.len(), 2);
    }

    #[test]
    fn stress_level_thresholds() {
        assert_eq!(StressLevel::classify(0.7, 80.0), StressLevel::High);
        assert_eq!(StressLevel::classify(0.2, 44.9), StressLevel::High);
        assert_eq!(StressLevel::classify(0.5, 80.0), StressLevel::Medium);
        assert_eq!(StressLevel::classify(0.2, 59.0), StressLevel::Medium);
        assert_eq!(StressLevel::classify(0.2, 60.0), StressLevel::Low);
    }
}
