use anyhow::Context;
use tracing::warn;

use super::repo_types::{MealRecord, Profile};
use crate::state::AppState;

fn profile_key(prefix: &str, identity: &str) -> String {
    format!("{prefix}:{identity}:profile")
}

fn meals_key(prefix: &str, identity: &str) -> String {
    format!("{prefix}:{identity}:meals")
}

/// Read the persisted profile for `identity`. Missing or malformed data is
/// silently replaced by a default profile stamped with `today`; this never
/// errors.
pub async fn load_profile(state: &AppState, identity: &str, today: &str) -> Profile {
    let key = profile_key(&state.config.store.prefix, identity);
    let raw = match state.store.get(&key).await {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, %identity, "profile read failed; using defaults");
            None
        }
    };
    match raw {
        Some(s) => serde_json::from_str::<Profile>(&s).unwrap_or_else(|e| {
            warn!(error = %e, %identity, "stored profile malformed; using defaults");
            Profile::default_for(identity, today)
        }),
        None => Profile::default_for(identity, today),
    }
}

/// Read the persisted meal list for `identity`. Missing or malformed data is
/// treated as an empty list.
pub async fn load_meals(state: &AppState, identity: &str) -> Vec<MealRecord> {
    let key = meals_key(&state.config.store.prefix, identity);
    let raw = match state.store.get(&key).await {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, %identity, "meal list read failed; treating as empty");
            None
        }
    };
    match raw {
        Some(s) => serde_json::from_str::<Vec<MealRecord>>(&s).unwrap_or_else(|e| {
            warn!(error = %e, %identity, "stored meal list malformed; treating as empty");
            Vec::new()
        }),
        None => Vec::new(),
    }
}

/// Persist profile and meal list under identity-namespaced keys. Two writes,
/// no cross-key transaction.
pub async fn save(state: &AppState, profile: &Profile, meals: &[MealRecord]) -> anyhow::Result<()> {
    let prefix = &state.config.store.prefix;
    let profile_json = serde_json::to_string(profile).context("serialize profile")?;
    let meals_json = serde_json::to_string(meals).context("serialize meals")?;
    state
        .store
        .put(&profile_key(prefix, &profile.identity), &profile_json)
        .await
        .context("write profile")?;
    state
        .store
        .put(&meals_key(prefix, &profile.identity), &meals_json)
        .await
        .context("write meals")?;
    Ok(())
}

#[cfg(test)]
mod repo_tests {
    use super::*;
    use crate::ledger::repo_types::Goal;

    #[tokio::test]
    async fn test_load_defaults_when_store_is_empty() {
        let state = AppState::fake();
        let profile = load_profile(&state, "alice", "2026-08-30").await;
        assert_eq!(profile.identity, "alice");
        assert_eq!(profile.goal, Goal::Maintenance);
        assert_eq!(profile.last_active_date.as_deref(), Some("2026-08-30"));
        assert!(load_meals(&state, "alice").await.is_empty());
    }

    #[tokio::test]
    async fn test_load_defaults_on_malformed_blobs() {
        let state = AppState::fake();
        let prefix = state.config.store.prefix.clone();
        state
            .store
            .put(&profile_key(&prefix, "alice"), "{not json")
            .await
            .unwrap();
        state
            .store
            .put(&meals_key(&prefix, "alice"), "also not json")
            .await
            .unwrap();

        let profile = load_profile(&state, "alice", "2026-08-30").await;
        assert_eq!(profile.calorie_target, 2000.0);
        assert!(load_meals(&state, "alice").await.is_empty());
    }

    #[tokio::test]
    async fn test_load_tolerates_missing_optional_fields() {
        let state = AppState::fake();
        let prefix = state.config.store.prefix.clone();
        // an old blob: identity only
        state
            .store
            .put(&profile_key(&prefix, "bob"), r#"{"identity":"bob"}"#)
            .await
            .unwrap();

        let profile = load_profile(&state, "bob", "2026-08-30").await;
        assert_eq!(profile.identity, "bob");
        assert_eq!(profile.goal, Goal::Maintenance);
        // absent last_active_date is first-run, not a reset trigger
        assert_eq!(profile.last_active_date, None);
    }

    #[tokio::test]
    async fn test_save_then_load_roundtrip() {
        let state = AppState::fake();
        let mut profile = Profile::default_for("carol", "2026-08-30");
        profile.goal = Goal::Keto;
        let meals = vec![crate::ledger::services::new_meal(
            "Avocado toast",
            Default::default(),
            None,
            None,
        )];

        save(&state, &profile, &meals).await.unwrap();

        let loaded = load_profile(&state, "carol", "2026-08-31").await;
        assert_eq!(loaded.goal, Goal::Keto);
        let loaded_meals = load_meals(&state, "carol").await;
        assert_eq!(loaded_meals.len(), 1);
        assert_eq!(loaded_meals[0].name, "Avocado toast");
    }
}
