use std::fmt::Write;

use crate::ledger::repo_types::{MealRecord, Profile};
use crate::ledger::totals::NutritionTotals;

/// Render the advice prompt: goal, numeric targets, today's computed totals
/// and a line-item meal history.
pub fn advice_prompt(profile: &Profile, totals: &NutritionTotals, meals: &[MealRecord]) -> String {
    let mut p = String::new();

    let _ = writeln!(
        p,
        "You are a nutrition coach. The user's goal is {}.",
        goal_label(profile)
    );
    let _ = writeln!(
        p,
        "Daily targets: {:.0} kcal, {:.0} g protein.",
        profile.calorie_target, profile.protein_target
    );
    if let (Some(age), Some(weight)) = (profile.age, profile.weight_kg) {
        let _ = writeln!(p, "The user is {age} years old and weighs {weight:.1} kg.");
    }
    let _ = writeln!(
        p,
        "So far today: {:.0} kcal, {:.0} g protein, {:.0} g carbs, {:.0} g fat.",
        totals.calories, totals.protein_g, totals.carbs_g, totals.fat_g
    );
    let _ = writeln!(p, "Meals logged today:");
    for m in meals {
        let n = &m.nutrition;
        let _ = writeln!(
            p,
            "- {}: {:.0} kcal, {:.0} g protein, {:.0} g carbs, {:.0} g fat",
            m.name, n.calories, n.protein_g, n.carbs_g, n.fat_g
        );
    }
    let _ = writeln!(
        p,
        "\nReply with a JSON object: {{\"status\": \"optimal\"|\"warning\"|\"critical\", \
         \"reasoning\": string, \"suggestion\": string, \
         \"references\": [{{\"title\": string, \"uri\": string}}] (optional, at most 3)}}."
    );
    p
}

/// Render the vision prompt for image classification.
pub fn vision_prompt(hint: Option<&str>) -> String {
    let mut p = String::from(
        "Identify the food in this photo and estimate its nutrition. \
         Reply with a JSON object: {\"food_name\": string, \"is_food\": boolean, \
         \"confidence\": number between 0 and 1, \
         \"nutrition\": {\"calories\": number, \"protein_g\": number, \
         \"carbs_g\": number, \"fat_g\": number}}.",
    );
    if let Some(hint) = hint {
        let _ = write!(p, " The user says: {hint}");
    }
    p
}

fn goal_label(profile: &Profile) -> &'static str {
    use crate::ledger::repo_types::Goal;
    match profile.goal {
        Goal::WeightLoss => "weight loss",
        Goal::MuscleGain => "muscle gain",
        Goal::Maintenance => "maintenance",
        Goal::Keto => "keto",
        Goal::Vegan => "vegan",
    }
}

#[cfg(test)]
mod prompt_tests {
    use super::*;
    use crate::ledger::repo_types::{Goal, Nutrition, Profile};
    use crate::ledger::services::new_meal;
    use crate::ledger::totals;

    #[test]
    fn test_advice_prompt_embeds_targets_totals_and_history() {
        let mut profile = Profile::default_for("alice", "2026-08-30");
        profile.goal = Goal::MuscleGain;
        profile.calorie_target = 2200.0;
        profile.protein_target = 160.0;

        let meals = vec![
            new_meal(
                "Oatmeal",
                Nutrition {
                    calories: 500.0,
                    protein_g: 30.0,
                    ..Default::default()
                },
                None,
                None,
            ),
            new_meal(
                "Chicken bowl",
                Nutrition {
                    calories: 700.0,
                    protein_g: 45.0,
                    ..Default::default()
                },
                None,
                None,
            ),
        ];
        let t = totals::totals(&meals);
        let p = advice_prompt(&profile, &t, &meals);

        assert!(p.contains("muscle gain"));
        assert!(p.contains("2200 kcal"));
        assert!(p.contains("160 g protein"));
        assert!(p.contains("So far today: 1200 kcal, 75 g protein"));
        assert!(p.contains("- Oatmeal: 500 kcal"));
        assert!(p.contains("- Chicken bowl: 700 kcal"));
    }

    #[test]
    fn test_vision_prompt_includes_hint() {
        let p = vision_prompt(Some("it's a homemade burrito"));
        assert!(p.contains("homemade burrito"));
        assert!(vision_prompt(None).contains("food_name"));
    }
}
