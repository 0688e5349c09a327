//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and dashboard independently.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ActivityItem, Difficulty, ProjectTemplate, Stack, Submission, UserProgress};
use crate::error::AggregationWarning;
use crate::state::NewSubmission;

/// Catalog listing entry; the full rubric is served by the per-template endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummaryOut {
    pub id: String,
    pub name: String,
    pub stack: Stack,
    pub difficulty: Difficulty,
    pub estimated_hours: u32,
    pub max_points: i32,
    pub criteria: usize,
}

pub fn to_summary(t: &ProjectTemplate) -> TemplateSummaryOut {
    TemplateSummaryOut {
        id: t.id.clone(),
        name: t.name.clone(),
        stack: t.stack,
        difficulty: t.difficulty,
        estimated_hours: t.estimated_hours,
        max_points: t.max_points,
        criteria: t.grading_criteria.len(),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionIn {
    pub user_id: String,
    pub template_id: String,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scores_by_criterion: BTreeMap<String, i32>,
}

impl From<SubmissionIn> for NewSubmission {
    fn from(body: SubmissionIn) -> Self {
        NewSubmission {
            user_id: body.user_id,
            template_id: body.template_id,
            submitted_at: body.submitted_at,
            scores_by_criterion: body.scores_by_criterion,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOut {
    #[serde(flatten)]
    pub submission: Submission,
    pub total_score: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressQuery {
    pub now: Option<DateTime<Utc>>,
    pub utc_offset_minutes: Option<i32>,
}

#[derive(Serialize)]
pub struct ProgressOut {
    pub progress: UserProgress,
    pub warnings: Vec<AggregationWarning>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub now: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct ActivityOut {
    pub items: Vec<ActivityItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQuery {
    pub now: Option<DateTime<Utc>>,
    pub utc_offset_minutes: Option<i32>,
    pub limit: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOut {
    pub progress: UserProgress,
    pub recent_activity: Vec<ActivityItem>,
    pub warnings: Vec<AggregationWarning>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub templates: usize,
    /// Ids of catalog templates refused at load.
    pub rejected: Vec<String>,
}
