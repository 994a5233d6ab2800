//! Per-user profile graph: demographics, personality, stress, screen usage
//! and goals hung off a single `User` node.

use crate::aggregation::user::{merge_counts, sorted_desc};
use crate::db::models::{
    GraphEdge, GraphNode, KnowledgeGraph, PersonalityProfile, ScreenSession, SessionStatus, User,
};
use crate::personality::Trait;

const ROOT: &str = "User";
const TOP_ENTRIES: usize = 5;
const MAX_GOALS: usize = 3;
const GOAL_LABEL_CHARS: usize = 50;
const HIGH_TRAIT_SCORE: f64 = 3.5;

#[derive(Default)]
struct GraphBuilder {
    graph: KnowledgeGraph,
}

impl GraphBuilder {
    /// Adding an existing id updates it in place.
    fn node(&mut self, id: &str, label: &str, node_type: &str, value: Option<f64>) {
        if let Some(existing) = self.graph.nodes.iter_mut().find(|n| n.id == id) {
            existing.node_type = node_type.to_string();
            if value.is_some() {
                existing.value = value;
            }
            return;
        }
        self.graph.nodes.push(GraphNode {
            id: id.to_string(),
            label: label.to_string(),
            node_type: node_type.to_string(),
            value,
        });
    }

    fn leaf(&mut self, id: &str, node_type: &str, value: Option<f64>, from: &str, relationship: &str) {
        self.node(id, id, node_type, value);
        self.edge(from, id, relationship);
    }

    fn edge(&mut self, source: &str, target: &str, relationship: &str) {
        if let Some(existing) = self
            .graph
            .edges
            .iter_mut()
            .find(|e| e.source == source && e.target == target)
        {
            existing.relationship = relationship.to_string();
            return;
        }
        self.graph.edges.push(GraphEdge {
            source: source.to_string(),
            target: target.to_string(),
            relationship: relationship.to_string(),
        });
    }
}

fn age_group(age: u32) -> &'static str {
    if age < 30 {
        "Young Adult"
    } else if age < 50 {
        "Adult"
    } else {
        "Senior"
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

fn shorten_goal(goal: &str) -> String {
    if goal.chars().count() > GOAL_LABEL_CHARS {
        let head: String = goal.chars().take(GOAL_LABEL_CHARS).collect();
        format!("{head}...")
    } else {
        goal.to_string()
    }
}

pub fn build_graph(
    user: &User,
    profile: Option<&PersonalityProfile>,
    sessions: &[ScreenSession],
) -> KnowledgeGraph {
    let mut g = GraphBuilder::default();
    g.node(ROOT, &user.name, "person", None);

    if let Some(age) = user.age {
        g.leaf(age_group(age), "demographic", None, ROOT, "belongs_to");
    }
    let optional_leaves = [
        (&user.gender, "demographic", "identified_as"),
        (&user.occupation, "occupation", "works_as"),
        (&user.location, "location", "lives_in"),
    ];
    for (field, node_type, relationship) in optional_leaves {
        if let Some(value) = field.as_deref().filter(|v| !v.is_empty()) {
            g.leaf(value, node_type, None, ROOT, relationship);
        }
    }

    if let Some(results) = profile.map(|p| &p.results) {
        let personality = results.personality_type.as_str();
        let trait_parent = if personality.is_empty() {
            ROOT
        } else {
            g.leaf(personality, "personality", None, ROOT, "has_personality");
            personality
        };

        for trait_name in Trait::ALL {
            let score = results.traits.display(trait_name);
            let level = if score > HIGH_TRAIT_SCORE { "High" } else { "Low" };
            let id = format!("{} ({})", trait_name.label(), level);
            g.leaf(&id, "trait", Some(score), trait_parent, "exhibits");
        }

        let stress = format!("Stress Level: {}", capitalize(results.stress_level.as_str()));
        g.leaf(&stress, "wellness", None, ROOT, "experiences");
    }

    let completed: Vec<&ScreenSession> = sessions
        .iter()
        .filter(|s| s.status == SessionStatus::Completed)
        .collect();
    if !completed.is_empty() {
        let count = completed.len() as f64;
        let avg_wellness = completed.iter().filter_map(|s| s.wellness_score()).sum::<f64>() / count;
        let avg_productivity = completed
            .iter()
            .filter_map(|s| s.productivity_score())
            .sum::<f64>()
            / count;

        let wellness = format!("Avg Wellness: {avg_wellness:.1}/10");
        g.leaf(&wellness, "metric", Some(avg_wellness), ROOT, "has_metric");
        let productivity = format!("Avg Productivity: {avg_productivity:.1}/10");
        g.leaf(&productivity, "metric", Some(avg_productivity), ROOT, "has_metric");
    }

    let summaries: Vec<_> = completed.iter().filter_map(|s| s.summary.as_ref()).collect();
    let apps = merge_counts(summaries.iter().map(|s| &s.app_usage));
    for (app, count) in sorted_desc(&apps).into_iter().take(TOP_ENTRIES) {
        g.leaf(&app, "app", Some(f64::from(count)), ROOT, "uses");
    }

    let content = merge_counts(summaries.iter().map(|s| &s.content_categories));
    for (category, count) in sorted_desc(&content).into_iter().take(TOP_ENTRIES) {
        let title = category
            .split('_')
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ");
        let id = format!("{title} Content");
        g.leaf(&id, "content", Some(f64::from(count)), ROOT, "consumes");
    }

    if let Some(results) = profile.map(|p| &p.results) {
        for goal in results.wellness_goals.iter().take(MAX_GOALS) {
            g.leaf(&shorten_goal(goal), "goal", None, ROOT, "pursues");
        }
    }

    g.graph
}
