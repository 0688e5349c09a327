//! Error taxonomy: catalog integrity, submission validation, soft aggregation warnings,
//! and the HTTP-facing `ApiError`.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Catalog data violates rubric invariants. Blocks serving that template only.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("template {template_id}: criteria sum to {criteria_sum} but maxPoints is {max_points}")]
    PointsMismatch {
        template_id: String,
        criteria_sum: i64,
        max_points: i32,
    },

    #[error("template {template_id}: criterion {criterion_id} has negative maxPoints ({max_points})")]
    NegativeCriterionPoints {
        template_id: String,
        criterion_id: String,
        max_points: i32,
    },

    #[error("template {template_id}: duplicate criterion id {criterion_id}")]
    DuplicateCriterion {
        template_id: String,
        criterion_id: String,
    },

    #[error("duplicate template id {template_id}")]
    DuplicateTemplate { template_id: String },
}

impl IntegrityError {
    pub fn template_id(&self) -> &str {
        match self {
            IntegrityError::PointsMismatch { template_id, .. }
            | IntegrityError::NegativeCriterionPoints { template_id, .. }
            | IntegrityError::DuplicateCriterion { template_id, .. }
            | IntegrityError::DuplicateTemplate { template_id } => template_id,
        }
    }
}

/// A submission was rejected; it never reaches aggregation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unknown template {0}")]
    UnknownTemplate(String),

    #[error("submission targets template {submitted} but was checked against {expected}")]
    TemplateMismatch { submitted: String, expected: String },

    #[error("criterion {criterion_id} does not belong to template {template_id}")]
    UnknownCriterion {
        template_id: String,
        criterion_id: String,
    },

    #[error("criterion {criterion_id}: awarded {awarded} outside 0..={max_points}")]
    ScoreOutOfRange {
        criterion_id: String,
        awarded: i32,
        max_points: i32,
    },

    #[error("submittedAt {submitted_at} is after processing time {now}")]
    FutureTimestamp {
        submitted_at: DateTime<Utc>,
        now: DateTime<Utc>,
    },
}

/// Non-fatal conditions found while folding a user's history.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AggregationWarning {
    /// Template missing from the catalog: dates still count toward the streak.
    UnresolvedTemplate {
        #[serde(rename = "templateId")]
        template_id: String,
        submissions: usize,
    },
    /// Dated after "now"; skipped entirely.
    FutureSubmission {
        #[serde(rename = "submissionId")]
        submission_id: String,
    },
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Submission limit reached for user {user_id} ({limit})")]
    LimitReached { user_id: String, limit: usize },
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Validation(ValidationError::UnknownTemplate(_)) => {
                (StatusCode::NOT_FOUND, "Template not found")
            }
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation error"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "Resource not found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "Bad request"),
            ApiError::LimitReached { .. } => {
                (StatusCode::TOO_MANY_REQUESTS, "Submission limit reached")
            }
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "details": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}
