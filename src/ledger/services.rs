use time::macros::format_description;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use super::repo;
use super::repo_types::{MealRecord, Nutrition, Profile};
use super::totals::{self, NutritionTotals};
use crate::agent::parser::AgentDecision;
use crate::agent::services::refresh_decision;
use crate::state::AppState;

/// The per-identity mutable state: today's meal list plus the profile.
/// Owned by the request that loaded it; handed back via `changed`.
pub struct Ledger {
    pub profile: Profile,
    pub meals: Vec<MealRecord>,
}

impl Ledger {
    pub fn add_meal(&mut self, record: MealRecord) {
        self.meals.push(record);
    }

    /// Filter by id. Absent id is a no-op; returns whether anything went.
    pub fn remove_meal(&mut self, id: Uuid) -> bool {
        let before = self.meals.len();
        self.meals.retain(|m| m.id != id);
        self.meals.len() != before
    }

    pub fn totals(&self) -> NutritionTotals {
        totals::totals(&self.meals)
    }
}

/// Today's calendar date as a string. Local offset when the platform exposes
/// one, UTC otherwise. The reset rule only needs this to change exactly when
/// the calendar day does.
pub fn today_string() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let fmt = format_description!("[year]-[month]-[day]");
    now.date()
        .format(&fmt)
        .unwrap_or_else(|_| now.date().to_string())
}

pub fn now_ms() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// Day-boundary reset. Fires at most once per distinct calendar date, lazily,
/// on the first touch of the ledger that day:
/// - same date: meals pass through untouched;
/// - different date: meal list cleared, date stamped;
/// - no date at all (first run): date stamped, list kept (it is empty anyway).
pub fn reconcile_day(profile: &mut Profile, meals: Vec<MealRecord>, today: &str) -> Vec<MealRecord> {
    match profile.last_active_date.as_deref() {
        Some(d) if d == today => meals,
        Some(d) => {
            info!(identity = %profile.identity, from = %d, to = %today, "day rolled over; clearing meal list");
            profile.last_active_date = Some(today.to_string());
            Vec::new()
        }
        None => {
            profile.last_active_date = Some(today.to_string());
            meals
        }
    }
}

/// Load the ledger for `identity`: tolerant read of both blobs, then the day
/// reconcile. If the reconcile fired, the rolled state is persisted
/// immediately so the reset happens once even on a read-only touch. Never
/// errors.
pub async fn load(state: &AppState, identity: &str) -> Ledger {
    let today = today_string();
    let mut profile = repo::load_profile(state, identity, &today).await;
    let stored = repo::load_meals(state, identity).await;

    let before = profile.last_active_date.clone();
    let meals = reconcile_day(&mut profile, stored, &today);
    if before.as_deref() != Some(today.as_str()) {
        if let Err(e) = repo::save(state, &profile, &meals).await {
            warn!(error = %e, %identity, "failed to persist day rollover");
        }
    }

    Ledger { profile, meals }
}

pub fn new_meal(
    name: &str,
    nutrition: Nutrition,
    image_b64: Option<String>,
    image_content_type: Option<String>,
) -> MealRecord {
    MealRecord {
        id: Uuid::new_v4(),
        logged_at_ms: now_ms(),
        name: name.to_string(),
        nutrition,
        image_b64,
        image_content_type,
    }
}

/// The on-ledger-changed hook, invoked synchronously after every mutation:
/// persist, recompute totals, refresh the coaching decision. A later caller's
/// decision may overwrite an earlier one in whatever view holds it; no
/// ordering is enforced between overlapping refreshes.
pub async fn changed(
    state: &AppState,
    ledger: &Ledger,
) -> anyhow::Result<(NutritionTotals, Option<AgentDecision>)> {
    repo::save(state, &ledger.profile, &ledger.meals).await?;
    let t = ledger.totals();
    let decision = refresh_decision(state, &ledger.profile, &ledger.meals).await;
    Ok((t, decision))
}

#[cfg(test)]
mod ledger_tests {
    use super::*;
    use crate::agent::parser::DecisionStatus;

    fn meal(name: &str, calories: f64, protein_g: f64) -> MealRecord {
        new_meal(
            name,
            Nutrition {
                calories,
                protein_g,
                ..Default::default()
            },
            None,
            None,
        )
    }

    #[test]
    fn test_reconcile_same_day_is_a_noop() {
        let mut profile = Profile::default_for("alice", "2026-08-30");
        let meals = vec![meal("Oatmeal", 320.0, 12.0)];
        let out = reconcile_day(&mut profile, meals.clone(), "2026-08-30");
        assert_eq!(out.len(), 1);
        assert_eq!(profile.last_active_date.as_deref(), Some("2026-08-30"));
    }

    #[test]
    fn test_reconcile_new_day_clears_and_stamps_once() {
        let mut profile = Profile::default_for("alice", "2026-08-30");
        let meals = vec![meal("Oatmeal", 320.0, 12.0), meal("Burger", 800.0, 35.0)];

        let out = reconcile_day(&mut profile, meals, "2026-08-31");
        assert!(out.is_empty());
        assert_eq!(profile.last_active_date.as_deref(), Some("2026-08-31"));

        // second call with the same date: no-op
        let again = reconcile_day(&mut profile, out, "2026-08-31");
        assert!(again.is_empty());
        assert_eq!(profile.last_active_date.as_deref(), Some("2026-08-31"));
    }

    #[test]
    fn test_reconcile_first_run_stamps_without_clearing() {
        let mut profile = Profile::default_for("alice", "2026-08-30");
        profile.last_active_date = None;
        let meals = vec![meal("Oatmeal", 320.0, 12.0)];
        let out = reconcile_day(&mut profile, meals, "2026-08-30");
        assert_eq!(out.len(), 1);
        assert_eq!(profile.last_active_date.as_deref(), Some("2026-08-30"));
    }

    #[test]
    fn test_remove_meal_present_and_absent() {
        let mut ledger = Ledger {
            profile: Profile::default_for("alice", "2026-08-30"),
            meals: vec![meal("a", 1.0, 1.0), meal("b", 2.0, 2.0)],
        };
        let victim = ledger.meals[0].id;

        assert!(ledger.remove_meal(victim));
        assert_eq!(ledger.meals.len(), 1);
        assert!(ledger.meals.iter().all(|m| m.id != victim));

        // absent id: no-op
        assert!(!ledger.remove_meal(victim));
        assert_eq!(ledger.meals.len(), 1);
    }

    #[test]
    fn test_totals_track_every_mutation() {
        let mut ledger = Ledger {
            profile: Profile::default_for("alice", "2026-08-30"),
            meals: Vec::new(),
        };
        assert_eq!(ledger.totals().calories, 0.0);

        ledger.add_meal(meal("Oatmeal", 500.0, 30.0));
        ledger.add_meal(meal("Chicken bowl", 700.0, 45.0));
        let t = ledger.totals();
        assert_eq!(t.calories, 1200.0);
        assert_eq!(t.protein_g, 75.0);

        let id = ledger.meals[1].id;
        ledger.remove_meal(id);
        assert_eq!(ledger.totals().calories, 500.0);

        let cleared = reconcile_day(&mut ledger.profile, std::mem::take(&mut ledger.meals), "2026-08-31");
        ledger.meals = cleared;
        assert_eq!(ledger.totals(), NutritionTotals::default());
    }

    #[tokio::test]
    async fn test_load_mutate_save_flow() {
        let state = AppState::fake();

        let mut ledger = load(&state, "alice").await;
        assert!(ledger.meals.is_empty());

        ledger.add_meal(meal("Oatmeal", 500.0, 30.0));
        let (t, decision) = changed(&state, &ledger).await.unwrap();
        assert_eq!(t.calories, 500.0);
        // the fake collaborator answers with a parseable decision
        let decision = decision.unwrap();
        assert_eq!(decision.status, DecisionStatus::Optimal);

        // a fresh load on the same day sees the persisted meal
        let reloaded = load(&state, "alice").await;
        assert_eq!(reloaded.meals.len(), 1);
        assert_eq!(reloaded.meals[0].name, "Oatmeal");
    }

    #[tokio::test]
    async fn test_changed_with_empty_ledger_skips_the_call() {
        let state = AppState::fake();
        let ledger = Ledger {
            profile: Profile::default_for("alice", "2026-08-30"),
            meals: Vec::new(),
        };
        let (t, decision) = changed(&state, &ledger).await.unwrap();
        assert_eq!(t, NutritionTotals::default());
        assert!(decision.is_none());
    }
}
