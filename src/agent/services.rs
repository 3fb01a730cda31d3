use bytes::Bytes;
use tracing::warn;

use super::parser::{self, AgentDecision, FoodAnalysis};
use super::prompt;
use crate::ledger::repo_types::{MealRecord, Profile};
use crate::ledger::totals;
use crate::state::AppState;

/// Regenerate the coaching decision from the current ledger state.
///
/// An empty ledger skips the external call entirely and clears any prior
/// decision. A collaborator failure is substituted with the neutral fallback;
/// this function never errors.
pub async fn refresh_decision(
    state: &AppState,
    profile: &Profile,
    meals: &[MealRecord],
) -> Option<AgentDecision> {
    if meals.is_empty() {
        return None;
    }
    let t = totals::totals(meals);
    let p = prompt::advice_prompt(profile, &t, meals);
    match state.ai.generate_advice(&p).await {
        Ok(raw) => Some(parser::parse_decision(&raw)),
        Err(e) => {
            warn!(error = %e, identity = %profile.identity, "advice call failed; using fallback decision");
            Some(AgentDecision::fallback())
        }
    }
}

/// Classify a food photo. No ledger mutation; a collaborator failure yields
/// the zero-confidence fallback analysis rather than an error.
pub async fn analyze_image(
    state: &AppState,
    image: Bytes,
    content_type: &str,
    hint: Option<&str>,
) -> FoodAnalysis {
    let p = prompt::vision_prompt(hint);
    match state.ai.analyze_image(&p, image, content_type).await {
        Ok(raw) => parser::parse_food_analysis(&raw),
        Err(e) => {
            warn!(error = %e, "image analysis call failed; using fallback analysis");
            FoodAnalysis::fallback()
        }
    }
}
