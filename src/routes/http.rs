//! HTTP endpoint handlers. These are thin wrappers that forward to state/engine logic.
//! Each handler is instrumented and logs its parameters and basic result info.
//! "Now" is read from the clock here, at the edge, unless the client pins it.

use std::sync::Arc;
use axum::{
  extract::{rejection::{JsonRejection, QueryRejection}, Path, Query, State},
  Json, response::IntoResponse,
};
use chrono::{FixedOffset, Utc};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::protocol::*;
use crate::rubric::CatalogProvider;
use crate::state::AppState;
use crate::util::{offset_from_minutes, utc_offset};

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let rejected = state.rejected.iter().map(|e| e.template_id().to_string()).collect();
  Json(HealthOut { ok: true, templates: state.catalog.len(), rejected })
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_templates(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let out: Vec<TemplateSummaryOut> = state.catalog.templates().into_iter().map(to_summary).collect();
  Json(out)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_template(
  State(state): State<Arc<AppState>>,
  Path(template_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
  let t = state
    .catalog
    .get_template(&template_id)
    .ok_or_else(|| ApiError::NotFound(format!("template {template_id}")))?;
  Ok(Json(t.clone()))
}

fn resolve_offset(minutes: Option<i32>) -> Result<FixedOffset, ApiError> {
  match minutes {
    None => Ok(utc_offset()),
    Some(m) => offset_from_minutes(m)
      .ok_or_else(|| ApiError::BadRequest(format!("utcOffsetMinutes {m} is outside -1439..=1439"))),
  }
}

#[instrument(level = "info", skip(state, payload))]
pub async fn http_post_submission(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<SubmissionIn>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(body) = payload?;
  info!(target: "grading", template = %body.template_id, criteria = body.scores_by_criterion.len(), "HTTP submission received");
  if body.user_id.trim().is_empty() {
    return Err(ApiError::BadRequest("userId must not be empty".into()));
  }
  let (submission, total_score) = state.record_submission(body.into(), Utc::now()).await?;
  info!(target: "grading", id = %submission.id, total_score, "HTTP submission recorded");
  Ok(Json(SubmissionOut { submission, total_score }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_progress(
  State(state): State<Arc<AppState>>,
  Path(user_id): Path<String>,
  query: Result<Query<ProgressQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Query(q) = query?;
  let now = q.now.unwrap_or_else(Utc::now);
  let offset = resolve_offset(q.utc_offset_minutes)?;
  let report = state.compute_user_progress(&user_id, now, offset).await;
  info!(target: "grading", %user_id, points = report.progress.total_points, warnings = report.warnings.len(), "HTTP progress served");
  Ok(Json(ProgressOut { progress: report.progress, warnings: report.warnings }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_activity(
  State(state): State<Arc<AppState>>,
  Path(user_id): Path<String>,
  query: Result<Query<ActivityQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Query(q) = query?;
  let now = q.now.unwrap_or_else(Utc::now);
  let items = state.recent_activity(&user_id, now, q.limit).await;
  Ok(Json(ActivityOut { items }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_dashboard(
  State(state): State<Arc<AppState>>,
  Path(user_id): Path<String>,
  query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Query(q) = query?;
  let now = q.now.unwrap_or_else(Utc::now);
  let offset = resolve_offset(q.utc_offset_minutes)?;
  let (report, recent_activity) = state.dashboard(&user_id, now, offset, q.limit).await;
  info!(target: "grading", %user_id, points = report.progress.total_points, items = recent_activity.len(), "HTTP dashboard served");
  Ok(Json(DashboardOut { progress: report.progress, recent_activity, warnings: report.warnings }))
}
