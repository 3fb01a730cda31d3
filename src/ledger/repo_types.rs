use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Goal {
    WeightLoss,
    MuscleGain,
    #[default]
    Maintenance,
    Keto,
    Vegan,
}

/// Per-identity profile blob. Every optional field defaults so blobs written
/// by older builds still load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub identity: String,
    #[serde(default)]
    pub goal: Goal,
    #[serde(default = "default_calorie_target")]
    pub calorie_target: f64,
    #[serde(default = "default_protein_target")]
    pub protein_target: f64,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub activity_multiplier: Option<f64>,
    /// Calendar-date string of the last touch; drives the day-boundary reset.
    #[serde(default)]
    pub last_active_date: Option<String>,
}

fn default_calorie_target() -> f64 {
    2000.0
}

fn default_protein_target() -> f64 {
    120.0
}

impl Profile {
    pub fn default_for(identity: &str, today: &str) -> Self {
        Self {
            identity: identity.to_string(),
            goal: Goal::default(),
            calorie_target: default_calorie_target(),
            protein_target: default_protein_target(),
            age: None,
            weight_kg: None,
            height_cm: None,
            sex: None,
            activity_multiplier: None,
            last_active_date: Some(today.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    #[serde(default)]
    pub calories: f64,
    #[serde(default, alias = "protein")]
    pub protein_g: f64,
    #[serde(default, alias = "carbs")]
    pub carbs_g: f64,
    #[serde(default, alias = "fat")]
    pub fat_g: f64,
    #[serde(default, alias = "fiber")]
    pub fiber_g: Option<f64>,
}

/// One logged meal. Immutable after creation except for deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealRecord {
    pub id: Uuid,
    pub logged_at_ms: i64,
    pub name: String,
    #[serde(default)]
    pub nutrition: Nutrition,
    #[serde(default)]
    pub image_b64: Option<String>,
    #[serde(default)]
    pub image_content_type: Option<String>,
}
