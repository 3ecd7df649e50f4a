//! Countdown HTTP handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::model::{Countdown, CountdownInput};
use crate::error::CountdownError;
use crate::http::{ApiResult, AppState};

pub async fn list_countdowns(State(state): State<AppState>) -> ApiResult<Json<Vec<Countdown>>> {
    Ok(Json(state.countdowns.list().await?))
}

/// Create a countdown. Mounted behind the rate limit gate.
pub async fn create_countdown(
    State(state): State<AppState>,
    Json(input): Json<CountdownInput>,
) -> ApiResult<(StatusCode, Json<Countdown>)> {
    let countdown = Countdown::from_input(input, Uuid::new_v4(), Utc::now())?;
    state.countdowns.save(&countdown).await?;

    info!(id = %countdown.id, expiration = %countdown.expiration, "Countdown created");
    Ok((StatusCode::CREATED, Json(countdown)))
}

pub async fn get_countdown(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Countdown>> {
    state
        .countdowns
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| CountdownError::NotFound(format!("countdown {}", id)).into())
}

pub async fn delete_countdown(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if state.countdowns.delete(id).await? {
        info!(id = %id, "Countdown deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CountdownError::NotFound(format!("countdown {}", id)).into())
    }
}
