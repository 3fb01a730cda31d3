use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post, put},
    Json, Router,
};
use base64::Engine;
use bytes::Bytes;
use tracing::instrument;
use uuid::Uuid;

use super::dto::{
    AdviceResponse, AnalyzeRequest, DeleteMealResponse, LogMealRequest, LogMealResponse,
    SummaryResponse, UpdateProfileRequest, UpdateProfileResponse,
};
use super::services::{self, new_meal};
use super::totals;
use crate::agent::parser::FoodAnalysis;
use crate::agent::services::{analyze_image, refresh_decision};
use crate::state::AppState;

// --- public routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/users/:identity/summary", get(get_summary))
        .route("/users/:identity/advice", get(get_advice))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/users/:identity/profile", put(update_profile))
        .route("/users/:identity/meals", post(log_meal))
        .route("/users/:identity/meals/analyze", post(analyze_meal_photo))
        .route("/users/:identity/meals/:id", delete(remove_meal))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB, photos ride in JSON
}

// --- handlers ---

#[instrument(skip(state))]
pub async fn get_summary(
    State(state): State<AppState>,
    Path(identity): Path<String>,
) -> Json<SummaryResponse> {
    let ledger = services::load(&state, &identity).await;
    let t = ledger.totals();
    let progress = totals::progress(&t, &ledger.profile);
    Json(SummaryResponse {
        profile: ledger.profile,
        meals: ledger.meals,
        totals: t,
        progress,
    })
}

#[instrument(skip(state))]
pub async fn get_advice(
    State(state): State<AppState>,
    Path(identity): Path<String>,
) -> Json<AdviceResponse> {
    let ledger = services::load(&state, &identity).await;
    let decision = refresh_decision(&state, &ledger.profile, &ledger.meals).await;
    Json(AdviceResponse { decision })
}

#[instrument(skip(state, body))]
pub async fn update_profile(
    State(state): State<AppState>,
    Path(identity): Path<String>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<UpdateProfileResponse>, (StatusCode, String)> {
    let mut ledger = services::load(&state, &identity).await;

    let p = &mut ledger.profile;
    if let Some(goal) = body.goal {
        p.goal = goal;
    }
    if let Some(v) = body.calorie_target {
        p.calorie_target = v;
    }
    if let Some(v) = body.protein_target {
        p.protein_target = v;
    }
    if let Some(v) = body.age {
        p.age = Some(v);
    }
    if let Some(v) = body.weight_kg {
        p.weight_kg = Some(v);
    }
    if let Some(v) = body.height_cm {
        p.height_cm = Some(v);
    }
    if let Some(v) = body.sex {
        p.sex = Some(v);
    }
    if let Some(v) = body.activity_multiplier {
        p.activity_multiplier = Some(v);
    }

    let (t, decision) = services::changed(&state, &ledger).await.map_err(internal)?;
    Ok(Json(UpdateProfileResponse {
        profile: ledger.profile,
        totals: t,
        decision,
    }))
}

/// POST /users/:identity/meals/analyze { image_b64, content_type?, hint? }
/// Classification only, no ledger mutation. Malformed base64 is the caller's
/// mistake; a collaborator failure is a fallback analysis, never a 5xx.
#[instrument(skip(state, body))]
pub async fn analyze_meal_photo(
    State(state): State<AppState>,
    Path(_identity): Path<String>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<FoodAnalysis>, (StatusCode, String)> {
    let image = base64::engine::general_purpose::STANDARD
        .decode(body.image_b64.as_bytes())
        .map_err(|_| (StatusCode::BAD_REQUEST, "invalid base64 image".to_string()))?;
    let content_type = body.content_type.as_deref().unwrap_or("image/jpeg");

    let analysis = analyze_image(&state, Bytes::from(image), content_type, body.hint.as_deref()).await;
    Ok(Json(analysis))
}

/// POST /users/:identity/meals — log an accepted analysis as a meal.
#[instrument(skip(state, body))]
pub async fn log_meal(
    State(state): State<AppState>,
    Path(identity): Path<String>,
    Json(body): Json<LogMealRequest>,
) -> Result<(StatusCode, HeaderMap, Json<LogMealResponse>), (StatusCode, String)> {
    if body.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "name must be non-empty".into()));
    }

    let mut ledger = services::load(&state, &identity).await;
    let meal = new_meal(&body.name, body.nutrition, body.image_b64, body.content_type);
    let meal_id = meal.id;
    ledger.add_meal(meal.clone());

    let (t, decision) = services::changed(&state, &ledger).await.map_err(internal)?;

    let mut headers = HeaderMap::new();
    if let Ok(loc) = format!("/api/v1/users/{identity}/meals/{meal_id}").parse() {
        headers.insert(axum::http::header::LOCATION, loc);
    }

    Ok((
        StatusCode::CREATED,
        headers,
        Json(LogMealResponse {
            meal,
            totals: t,
            decision,
        }),
    ))
}

/// DELETE /users/:identity/meals/:id — absent id is a no-op, not a 404.
#[instrument(skip(state))]
pub async fn remove_meal(
    State(state): State<AppState>,
    Path((identity, id)): Path<(String, Uuid)>,
) -> Result<Json<DeleteMealResponse>, (StatusCode, String)> {
    let mut ledger = services::load(&state, &identity).await;
    let removed = ledger.remove_meal(id);

    let (t, decision) = services::changed(&state, &ledger).await.map_err(internal)?;
    Ok(Json(DeleteMealResponse {
        removed,
        totals: t,
        decision,
    }))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
