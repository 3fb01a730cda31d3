use serde::{Deserialize, Serialize};

use super::repo_types::{Goal, MealRecord, Nutrition, Profile};
use super::totals::{NutritionTotals, Progress};
use crate::agent::parser::AgentDecision;

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub profile: Profile,
    pub meals: Vec<MealRecord>,
    pub totals: NutritionTotals,
    pub progress: Progress,
}

/// Settings edit; every field optional, absent fields keep their value.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub goal: Option<Goal>,
    pub calorie_target: Option<f64>,
    pub protein_target: Option<f64>,
    pub age: Option<u32>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub sex: Option<String>,
    pub activity_multiplier: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct UpdateProfileResponse {
    pub profile: Profile,
    pub totals: NutritionTotals,
    pub decision: Option<AgentDecision>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub image_b64: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

/// An accepted analysis becomes a logged meal.
#[derive(Debug, Deserialize)]
pub struct LogMealRequest {
    pub name: String,
    pub nutrition: Nutrition,
    #[serde(default)]
    pub image_b64: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogMealResponse {
    pub meal: MealRecord,
    pub totals: NutritionTotals,
    pub decision: Option<AgentDecision>,
}

#[derive(Debug, Serialize)]
pub struct DeleteMealResponse {
    pub removed: bool,
    pub totals: NutritionTotals,
    pub decision: Option<AgentDecision>,
}

#[derive(Debug, Serialize)]
pub struct AdviceResponse {
    pub decision: Option<AgentDecision>,
}
