//! Quiz scoring: Big Five traits, personality archetype, mental-health and
//! digital-wellness indices.

pub mod clusters;
pub mod questions;
pub mod recommendations;
pub mod scorer;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use clusters::{classify, ClassificationResult, PersonalityCluster, CLUSTERS};
pub use questions::{all_questions, question_bank, QuestionBank, QuestionView};
pub use recommendations::{improvement_recommendations, ImprovementPlan, Recommendation};
pub use scorer::{
    analyze, assess_digital_wellness, assess_mental_health, trait_scores, DigitalWellnessAssessment,
    MentalHealthAssessment, MentalHealthStatus, QuizResults, RiskLevel, StressLevel,
};

/// Raw quiz answers keyed by question id, each in 1..=5.
pub type Answers = BTreeMap<String, u8>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Trait {
    Extraversion,
    Neuroticism,
    Agreeableness,
    Conscientiousness,
    Openness,
}

impl Trait {
    /// Cluster-space order.
    pub const ALL: [Trait; 5] = [
        Trait::Extraversion,
        Trait::Neuroticism,
        Trait::Agreeableness,
        Trait::Conscientiousness,
        Trait::Openness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Trait::Extraversion => "extraversion",
            Trait::Neuroticism => "neuroticism",
            Trait::Agreeableness => "agreeableness",
            Trait::Conscientiousness => "conscientiousness",
            Trait::Openness => "openness",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Trait::Extraversion => "Extraversion",
            Trait::Neuroticism => "Neuroticism",
            Trait::Agreeableness => "Agreeableness",
            Trait::Conscientiousness => "Conscientiousness",
            Trait::Openness => "Openness",
        }
    }

    fn index(&self) -> usize {
        match self {
            Trait::Extraversion => 0,
            Trait::Neuroticism => 1,
            Trait::Agreeableness => 2,
            Trait::Conscientiousness => 3,
            Trait::Openness => 4,
        }
    }
}

/// Normalized Big Five scores, each in [0, 1].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TraitScores {
    pub extraversion: f64,
    pub neuroticism: f64,
    pub agreeableness: f64,
    pub conscientiousness: f64,
    pub openness: f64,
}

impl TraitScores {
    pub fn neutral() -> Self {
        Self::from_vector([0.5; 5])
    }

    pub fn from_vector(values: [f64; 5]) -> Self {
        Self {
            extraversion: values[0],
            neuroticism: values[1],
            agreeableness: values[2],
            conscientiousness: values[3],
            openness: values[4],
        }
    }

    pub fn vector(&self) -> [f64; 5] {
        [
            self.extraversion,
            self.neuroticism,
            self.agreeableness,
            self.conscientiousness,
            self.openness,
        ]
    }

    pub fn get(&self, trait_name: Trait) -> f64 {
        self.vector()[trait_name.index()]
    }

    /// Score on the 1-5 display scale, rounded to two places.
    pub fn display(&self, trait_name: Trait) -> f64 {
        crate::utils::round_to(self.get(trait_name) * 4.0 + 1.0, 2)
    }

    pub fn display_map(&self) -> BTreeMap<Trait, f64> {
        Trait::ALL
            .into_iter()
            .map(|trait_name| (trait_name, self.display(trait_name)))
            .collect()
    }

    pub fn normalized_map(&self) -> BTreeMap<Trait, f64> {
        Trait::ALL
            .into_iter()
            .map(|trait_name| (trait_name, self.get(trait_name)))
            .collect()
    }
}

/// Clamp answers into the 1..=5 scale and drop ids the quiz does not ask.
pub fn sanitize_answers<I, K>(raw: I) -> Answers
where
    I: IntoIterator<Item = (K, i64)>,
    K: Into<String>,
{
    raw.into_iter()
        .map(|(id, value)| (id.into(), value.clamp(1, 5) as u8))
        .filter(|(id, _)| questions::is_known_question(id))
        .collect()
}
