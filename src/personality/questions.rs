//! Quiz question bank.

use serde::Serialize;

use super::Trait;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Keyed {
    Positive,
    Negative,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    BigFive,
    MentalHealth,
    Wellness,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::BigFive => "big_five",
            Dimension::MentalHealth => "mental_health",
            Dimension::Wellness => "wellness",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraitItem {
    pub id: &'static str,
    pub text: &'static str,
    pub trait_name: Trait,
    pub keyed: Keyed,
}

/// Mental-health and digital-wellness items share this shape; `category`
/// names the score bucket they feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryItem {
    pub id: &'static str,
    pub text: &'static str,
    pub category: &'static str,
    pub keyed: Keyed,
}

const fn item(id: &'static str, text: &'static str, trait_name: Trait, keyed: Keyed) -> TraitItem {
    TraitItem {
        id,
        text,
        trait_name,
        keyed,
    }
}

const fn check(id: &'static str, text: &'static str, category: &'static str, keyed: Keyed) -> CategoryItem {
    CategoryItem {
        id,
        text,
        category,
        keyed,
    }
}

use Keyed::{Negative, Positive};
use Trait::*;

pub static BIG_FIVE_ITEMS: [TraitItem; 25] = [
    item("EXT1", "I am the life of the party", Extraversion, Positive),
    item("EXT2", "I feel comfortable around people", Extraversion, Positive),
    item("EXT3", "I start conversations", Extraversion, Positive),
    item("EXT4", "I keep in the background", Extraversion, Negative),
    item("EXT5", "I am quiet around strangers", Extraversion, Negative),
    item("EST1", "I get stressed out easily", Neuroticism, Positive),
    item("EST2", "I am relaxed most of the time", Neuroticism, Negative),
    item("EST3", "I worry about things", Neuroticism, Positive),
    item("EST4", "I have frequent mood swings", Neuroticism, Positive),
    item("EST5", "I often feel blue", Neuroticism, Positive),
    item("AGR1", "I am interested in people", Agreeableness, Positive),
    item("AGR2", "I sympathize with others' feelings", Agreeableness, Positive),
    item("AGR3", "I have a soft heart", Agreeableness, Positive),
    item("AGR4", "I feel little concern for others", Agreeableness, Negative),
    item("AGR5", "I make people feel at ease", Agreeableness, Positive),
    item("CSN1", "I am always prepared", Conscientiousness, Positive),
    item("CSN2", "I pay attention to details", Conscientiousness, Positive),
    item("CSN3", "I get chores done right away", Conscientiousness, Positive),
    item("CSN4", "I leave my belongings around", Conscientiousness, Negative),
    item("CSN5", "I follow a schedule", Conscientiousness, Positive),
    item("OPN1", "I have a vivid imagination", Openness, Positive),
    item("OPN2", "I have excellent ideas", Openness, Positive),
    item("OPN3", "I am quick to understand things", Openness, Positive),
    item("OPN4", "I am full of ideas", Openness, Positive),
    item("OPN5", "I have difficulty understanding abstract ideas", Openness, Negative),
];

pub static MENTAL_HEALTH_ITEMS: [CategoryItem; 5] = [
    check("MH1", "I have been feeling down, depressed, or hopeless lately", "depression", Positive),
    check("MH2", "I have trouble relaxing and often feel tense", "anxiety", Positive),
    check("MH3", "I have been sleeping well and waking up refreshed", "sleep", Negative),
    check("MH4", "I feel overwhelmed by my responsibilities", "stress", Positive),
    check("MH5", "I feel energetic and motivated most days", "energy", Negative),
];

pub static DIGITAL_WELLNESS_ITEMS: [CategoryItem; 5] = [
    check("DW1", "Social media negatively affects my mood", "digital_impact", Positive),
    check("DW2", "I find it difficult to put down my phone", "digital_dependency", Positive),
    check("DW3", "I compare myself to others on social media", "comparison", Positive),
    check("DW4", "Screen time interferes with my sleep", "sleep_impact", Positive),
    check("DW5", "I want to reduce my overall screen time", "goals", Positive),
];

/// One numbered question as shown to the user.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: &'static str,
    pub number: usize,
    pub text: &'static str,
    pub dimension: Dimension,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trait_name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<&'static str>,
    pub keyed: Keyed,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionSection {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub questions: Vec<QuestionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionBank {
    pub questions: Vec<QuestionView>,
    pub sections: Vec<QuestionSection>,
    pub total_questions: usize,
}

/// Flat list, numbered from 1: Big Five, then mental health, then digital
/// wellness.
pub fn all_questions() -> Vec<QuestionView> {
    let trait_views = BIG_FIVE_ITEMS.iter().map(|q| QuestionView {
        id: q.id,
        number: 0,
        text: q.text,
        dimension: Dimension::BigFive,
        trait_name: Some(q.trait_name.as_str()),
        category: None,
        keyed: q.keyed,
    });

    let category_views = |items: &'static [CategoryItem], dimension: Dimension| {
        items.iter().map(move |q| QuestionView {
            id: q.id,
            number: 0,
            text: q.text,
            dimension,
            trait_name: None,
            category: Some(q.category),
            keyed: q.keyed,
        })
    };

    trait_views
        .chain(category_views(&MENTAL_HEALTH_ITEMS, Dimension::MentalHealth))
        .chain(category_views(&DIGITAL_WELLNESS_ITEMS, Dimension::Wellness))
        .enumerate()
        .map(|(index, mut view)| {
            view.number = index + 1;
            view
        })
        .collect()
}

pub fn question_bank() -> QuestionBank {
    let questions = all_questions();

    let section = |dimension: Dimension, title: &'static str, description: &'static str| {
        QuestionSection {
            id: dimension.as_str(),
            title,
            description,
            questions: questions
                .iter()
                .filter(|q| q.dimension == dimension)
                .cloned()
                .collect(),
        }
    };

    let sections = vec![
        section(
            Dimension::BigFive,
            "Personality Assessment",
            "These questions help us understand your personality traits based on the scientifically validated Big Five model.",
        ),
        section(
            Dimension::MentalHealth,
            "Mental Wellness Check",
            "Help us understand your current mental wellness state so we can provide personalized support.",
        ),
        section(
            Dimension::Wellness,
            "Digital Wellness",
            "Tell us about your digital habits and goals.",
        ),
    ];

    QuestionBank {
        total_questions: questions.len(),
        questions,
        sections,
    }
}

/// Whether `id` names any quiz question.
pub fn is_known_question(id: &str) -> bool {
    BIG_FIVE_ITEMS.iter().any(|q| q.id == id)
        || MENTAL_HEALTH_ITEMS.iter().any(|q| q.id == id)
        || DIGITAL_WELLNESS_ITEMS.iter().any(|q| q.id == id)
}
