//! Fixed personality archetypes in trait space.

use std::collections::BTreeMap;

use serde::Serialize;

use super::TraitScores;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersonalityCluster {
    pub id: usize,
    pub name: &'static str,
    pub description: &'static str,
    /// Extraversion, neuroticism, agreeableness, conscientiousness, openness.
    pub center: [f64; 5],
    pub strengths: &'static [&'static str],
    pub growth_areas: &'static [&'static str],
    pub wellness_tips: &'static [&'static str],
    pub digital_wellness: &'static [&'static str],
}

pub static CLUSTERS: [PersonalityCluster; 5] = [
    PersonalityCluster {
        id: 0,
        name: "The Balanced Achiever",
        description: "You have a well-rounded personality with moderate levels across all traits. You adapt well to different situations and maintain emotional stability.",
        center: [0.50, 0.50, 0.55, 0.55, 0.55],
        strengths: &["Adaptability", "Emotional balance", "Versatility", "Stable relationships"],
        growth_areas: &["Setting ambitious goals", "Taking more initiative", "Developing specialized skills"],
        wellness_tips: &[
            "Maintain your balanced approach while setting stretch goals",
            "Use your adaptability to try new wellness practices",
            "Your stability allows for consistent health routines",
        ],
        digital_wellness: &[
            "Set intentional screen time boundaries",
            "Use apps that align with your balanced lifestyle",
            "Practice digital minimalism during key hours",
        ],
    },
    PersonalityCluster {
        id: 1,
        name: "The Analytical Introvert",
        description: "You prefer deep thinking and solitary activities. You have a rich inner world and excel at focused, detailed work.",
        center: [0.30, 0.55, 0.50, 0.50, 0.60],
        strengths: &["Deep thinking", "Focus", "Independence", "Attention to detail"],
        growth_areas: &["Social engagement", "Sharing ideas openly", "Collaborative activities"],
        wellness_tips: &[
            "Schedule regular quiet time for mental recharge",
            "Practice mindfulness meditation",
            "Balance alone time with meaningful social connections",
        ],
        digital_wellness: &[
            "Limit social media to prevent overstimulation",
            "Use focus apps for deep work sessions",
            "Choose educational content over social feeds",
        ],
    },
    PersonalityCluster {
        id: 2,
        name: "The Social Connector",
        description: "You thrive on social interaction and bringing people together. Your energy and enthusiasm are contagious.",
        center: [0.70, 0.45, 0.60, 0.45, 0.50],
        strengths: &["Communication", "Networking", "Enthusiasm", "Team building"],
        growth_areas: &["Deep focus time", "Independent work", "Emotional regulation"],
        wellness_tips: &[
            "Balance social activities with rest periods",
            "Practice active listening in conversations",
            "Develop solo hobbies for self-reflection",
        ],
        digital_wellness: &[
            "Be mindful of social media comparison traps",
            "Quality over quantity in online interactions",
            "Schedule digital detox periods",
        ],
    },
    PersonalityCluster {
        id: 3,
        name: "The Sensitive Creative",
        description: "You experience emotions deeply and have a strong creative and empathetic nature. You are attuned to aesthetics and meaning.",
        center: [0.45, 0.65, 0.65, 0.40, 0.65],
        strengths: &["Creativity", "Empathy", "Emotional depth", "Artistic expression"],
        growth_areas: &["Emotional resilience", "Stress management", "Practical decision-making"],
        wellness_tips: &[
            "Practice stress-reduction techniques daily",
            "Channel emotions through creative outlets",
            "Build a support network for difficult times",
        ],
        digital_wellness: &[
            "Curate feeds to minimize negative content",
            "Set boundaries around consuming emotional content",
            "Use apps for creative expression and mood tracking",
        ],
    },
    PersonalityCluster {
        id: 4,
        name: "The Organized Leader",
        description: "You are goal-oriented, disciplined, and take charge naturally. You value efficiency and results.",
        center: [0.55, 0.35, 0.50, 0.70, 0.55],
        strengths: &["Organization", "Leadership", "Goal achievement", "Discipline"],
        growth_areas: &["Flexibility", "Emotional openness", "Work-life balance"],
        wellness_tips: &[
            "Schedule wellness activities like other priorities",
            "Allow flexibility in your routines",
            "Practice self-compassion when plans change",
        ],
        digital_wellness: &[
            "Use productivity apps mindfully",
            "Set boundaries between work and personal digital use",
            "Track wellness metrics but avoid obsession",
        ],
    },
];

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub cluster: usize,
    pub confidence: f64,
    /// `1 / (1 + distance)` per cluster name.
    pub similarities: BTreeMap<String, f64>,
}

impl ClassificationResult {
    pub fn cluster(&self) -> &'static PersonalityCluster {
        &CLUSTERS[self.cluster]
    }
}

fn distance(a: &[f64; 5], b: &[f64; 5]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Assign the nearest center. Equal distances keep the lower cluster id.
pub fn classify(traits: &TraitScores) -> ClassificationResult {
    let vector = traits.vector();
    let distances: Vec<f64> = CLUSTERS
        .iter()
        .map(|cluster| distance(&vector, &cluster.center))
        .collect();

    let mut nearest = 0;
    for (index, d) in distances.iter().enumerate() {
        if *d < distances[nearest] {
            nearest = index;
        }
    }

    let confidence = (1.0 - distances[nearest]).clamp(0.0, 1.0);
    let similarities = CLUSTERS
        .iter()
        .zip(distances.iter())
        .map(|(cluster, d)| (cluster.name.to_string(), 1.0 / (1.0 + d)))
        .collect();

    ClassificationResult {
        cluster: nearest,
        confidence,
        similarities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_vector_is_balanced_achiever() {
        let result = classify(&TraitScores::neutral());
        assert_eq!(result.cluster, 0);
        assert_eq!(result.cluster().name, "The Balanced Achiever");
        assert!(result.confidence > 0.9 && result.confidence <= 1.0);
    }

    #[test]
    fn exact_center_has_full_confidence() {
        for cluster in &CLUSTERS {
            let traits = TraitScores::from_vector(cluster.center);
            let result = classify(&traits);
            assert_eq!(result.cluster, cluster.id);
            assert_eq!(result.confidence, 1.0);
            assert_eq!(result.similarities[cluster.name], 1.0);
        }
    }

    #[test]
    fn far_vectors_clamp_confidence_at_zero() {
        let traits = TraitScores::from_vector([0.0, 1.0, 0.0, 1.0, 0.0]);
        let result = classify(&traits);
        assert!((0.0..=1.0).contains(&result.confidence));
        assert_eq!(result.similarities.len(), 5);
        for similarity in result.similarities.values() {
            assert!(*similarity > 0.0 && *similarity <= 1.0);
        }
    }
}
