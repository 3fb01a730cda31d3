use serde::Serialize;

use super::repo_types::{MealRecord, Profile};

/// Derived per-nutrient sums over the current meal list. Never persisted;
/// must always equal the fold of the list it was computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NutritionTotals {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
}

pub fn totals(meals: &[MealRecord]) -> NutritionTotals {
    meals.iter().fold(NutritionTotals::default(), |acc, m| {
        let n = &m.nutrition;
        NutritionTotals {
            calories: acc.calories + n.calories,
            protein_g: acc.protein_g + n.protein_g,
            carbs_g: acc.carbs_g + n.carbs_g,
            fat_g: acc.fat_g + n.fat_g,
            fiber_g: acc.fiber_g + n.fiber_g.unwrap_or(0.0),
        }
    })
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Progress {
    pub calorie_pct: f64,
    pub protein_pct: f64,
}

pub fn progress(totals: &NutritionTotals, profile: &Profile) -> Progress {
    Progress {
        calorie_pct: pct(totals.calories, profile.calorie_target),
        protein_pct: pct(totals.protein_g, profile.protein_target),
    }
}

fn pct(value: f64, target: f64) -> f64 {
    if target > 0.0 {
        value / target * 100.0
    } else {
        0.0
    }
}
