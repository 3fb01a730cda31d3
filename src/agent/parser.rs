use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ledger::repo_types::Nutrition;

pub const MAX_REFERENCES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DecisionStatus {
    #[default]
    Optimal,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    pub title: String,
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDecision {
    pub status: DecisionStatus,
    pub reasoning: String,
    pub suggestion: String,
    #[serde(default)]
    pub references: Vec<Reference>,
}

impl AgentDecision {
    /// Neutral decision substituted whenever the collaborator's reply is
    /// unusable. Never an error: the UI must stay interactive.
    pub fn fallback() -> Self {
        Self {
            status: DecisionStatus::Optimal,
            reasoning: "Could not interpret the coaching reply.".into(),
            suggestion: "Keep logging your meals and stay close to your daily targets.".into(),
            references: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodAnalysis {
    pub food_name: String,
    pub is_food: bool,
    pub confidence: f64,
    pub nutrition: Nutrition,
}

impl FoodAnalysis {
    pub fn fallback() -> Self {
        Self {
            food_name: "Unknown food".into(),
            is_food: false,
            confidence: 0.0,
            nutrition: Nutrition::default(),
        }
    }
}

// Tolerant wire shapes. The collaborator is not trusted to follow the schema,
// so every field is optional here and normalized below.

#[derive(Debug, Deserialize)]
struct RawDecision {
    status: Option<String>,
    reasoning: Option<String>,
    #[serde(alias = "action")]
    suggestion: Option<String>,
    #[serde(default, alias = "links")]
    references: Vec<RawReference>,
}

#[derive(Debug, Deserialize)]
struct RawReference {
    #[serde(default)]
    title: String,
    #[serde(default, alias = "url")]
    uri: String,
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    #[serde(alias = "foodName", alias = "name")]
    food_name: Option<String>,
    #[serde(alias = "isFood")]
    is_food: Option<bool>,
    confidence: Option<f64>,
    #[serde(default)]
    nutrition: Nutrition,
}

/// Decode an advice reply: structured JSON first, then labeled free text
/// (`STATUS:` / `REASONING:` / `ACTION:`), then the neutral fallback.
/// Total — never returns an error.
pub fn parse_decision(raw: &str) -> AgentDecision {
    if let Some(d) = parse_decision_json(raw) {
        return d;
    }
    if let Some(d) = parse_decision_labeled(raw) {
        return d;
    }
    tracing::warn!("advice reply had no recognizable fields; using fallback decision");
    AgentDecision::fallback()
}

/// Decode a vision reply into a food analysis, falling back to a
/// zero-confidence non-food on any failure.
pub fn parse_food_analysis(raw: &str) -> FoodAnalysis {
    let Some(json) = extract_json(raw) else {
        tracing::warn!("vision reply contained no JSON; using fallback analysis");
        return FoodAnalysis::fallback();
    };
    match serde_json::from_str::<RawAnalysis>(&json) {
        Ok(a) => FoodAnalysis {
            food_name: a.food_name.unwrap_or_else(|| "Unknown food".into()),
            is_food: a.is_food.unwrap_or(false),
            confidence: a.confidence.unwrap_or(0.0).clamp(0.0, 1.0),
            nutrition: a.nutrition,
        },
        Err(e) => {
            tracing::warn!(error = %e, "vision reply JSON did not decode; using fallback analysis");
            FoodAnalysis::fallback()
        }
    }
}

fn parse_decision_json(raw: &str) -> Option<AgentDecision> {
    let json = extract_json(raw)?;
    let d: RawDecision = serde_json::from_str(&json).ok()?;
    if d.status.is_none() && d.reasoning.is_none() && d.suggestion.is_none() {
        return None;
    }
    let fallback = AgentDecision::fallback();
    Some(AgentDecision {
        status: d
            .status
            .as_deref()
            .map(status_from_str)
            .unwrap_or_default(),
        reasoning: d.reasoning.unwrap_or(fallback.reasoning),
        suggestion: d.suggestion.unwrap_or(fallback.suggestion),
        references: truncate_references(d.references),
    })
}

fn parse_decision_labeled(raw: &str) -> Option<AgentDecision> {
    lazy_static! {
        static ref STATUS: Regex = Regex::new(r"(?im)^\s*STATUS:\s*(.+)$").unwrap();
        static ref REASONING: Regex = Regex::new(r"(?im)^\s*REASONING:\s*(.+)$").unwrap();
        static ref ACTION: Regex = Regex::new(r"(?im)^\s*(?:ACTION|SUGGESTION):\s*(.+)$").unwrap();
    }
    let status = STATUS.captures(raw).map(|c| c[1].trim().to_string());
    let reasoning = REASONING.captures(raw).map(|c| c[1].trim().to_string());
    let suggestion = ACTION.captures(raw).map(|c| c[1].trim().to_string());
    if status.is_none() && reasoning.is_none() && suggestion.is_none() {
        return None;
    }
    let fallback = AgentDecision::fallback();
    Some(AgentDecision {
        status: status.as_deref().map(status_from_str).unwrap_or_default(),
        reasoning: reasoning.unwrap_or(fallback.reasoning),
        suggestion: suggestion.unwrap_or(fallback.suggestion),
        references: Vec::new(),
    })
}

fn status_from_str(s: &str) -> DecisionStatus {
    let s = s.to_ascii_lowercase();
    if s.contains("critical") {
        DecisionStatus::Critical
    } else if s.contains("warning") || s.contains("caution") {
        DecisionStatus::Warning
    } else {
        DecisionStatus::Optimal
    }
}

fn truncate_references(raw: Vec<RawReference>) -> Vec<Reference> {
    raw.into_iter()
        .filter(|r| !r.uri.is_empty())
        .take(MAX_REFERENCES)
        .map(|r| Reference {
            title: r.title,
            uri: r.uri,
        })
        .collect()
}

/// Pull the JSON object out of a reply that may wrap it in prose or a
/// ```json fence.
fn extract_json(raw: &str) -> Option<String> {
    lazy_static! {
        static ref FENCE: Regex = Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").unwrap();
    }
    if let Some(c) = FENCE.captures(raw) {
        return Some(c[1].to_string());
    }
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end > start {
        Some(raw[start..=end].to_string())
    } else {
        None
    }
}
