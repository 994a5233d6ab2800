//! Improvement plan combining profile and screen behaviour.

use serde::{Deserialize, Serialize};

use super::{StressLevel, Trait, TraitScores};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub area: String,
    pub insight: String,
    pub action: String,
    pub benefit: String,
}

impl Recommendation {
    fn new(area: &str, insight: &str, action: &str, benefit: &str) -> Self {
        Self {
            area: area.to_string(),
            insight: insight.to_string(),
            action: action.to_string(),
            benefit: benefit.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementPlan {
    pub personality_based: Vec<Recommendation>,
    pub mental_health_based: Vec<Recommendation>,
    pub screen_behavior_based: Vec<Recommendation>,
    pub immediate_actions: Vec<Recommendation>,
}

const IMMEDIATE_ACTIONS: usize = 3;

/// `avg_session_wellness` is on the 0-10 session scale; pass `None` when
/// the user has no completed sessions.
pub fn improvement_recommendations(
    traits: Option<&TraitScores>,
    stress_level: Option<StressLevel>,
    avg_session_wellness: Option<f64>,
) -> ImprovementPlan {
    let mut plan = ImprovementPlan::default();

    if let Some(traits) = traits {
        if traits.display(Trait::Neuroticism) > 3.5 {
            plan.personality_based.push(Recommendation::new(
                "Emotional Regulation",
                "Your personality profile shows sensitivity to stress.",
                "Practice daily mindfulness meditation for 10 minutes",
                "Reduced anxiety and improved emotional resilience",
            ));
        }
        if traits.display(Trait::Extraversion) < 2.5 {
            plan.personality_based.push(Recommendation::new(
                "Social Connection",
                "You prefer solitude, but some social connection benefits wellbeing.",
                "Schedule one meaningful conversation per week",
                "Maintained social bonds without overwhelm",
            ));
        }
        if traits.display(Trait::Conscientiousness) < 2.5 {
            plan.personality_based.push(Recommendation::new(
                "Structure & Routine",
                "Adding more structure could enhance your productivity.",
                "Use a simple daily planning system",
                "Reduced stress from disorganization",
            ));
        }
    }

    if stress_level == Some(StressLevel::High) {
        plan.mental_health_based.push(Recommendation::new(
            "Stress Management",
            "High stress levels detected.",
            "Implement the 5-4-3-2-1 grounding technique when stressed",
            "Immediate anxiety relief",
        ));
    }

    if avg_session_wellness.is_some_and(|avg| avg < 5.0) {
        plan.screen_behavior_based.push(Recommendation::new(
            "Content Quality",
            "Your screen content may be affecting your wellbeing negatively.",
            "Curate your feeds to reduce negative content exposure",
            "Improved mood during screen time",
        ));
    }

    plan.immediate_actions = plan
        .personality_based
        .iter()
        .chain(plan.mental_health_based.iter())
        .chain(plan.screen_behavior_based.iter())
        .take(IMMEDIATE_ACTIONS)
        .cloned()
        .collect();

    plan
}
