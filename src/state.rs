//! Application state: validated catalog, submission store, progression ladder, and the
//! two dashboard entry points.
//!
//! This module owns:
//!   - the catalog (built once at startup from config + built-in templates)
//!   - the in-memory submission store
//!   - dashboard limits and the stage ladder (from TOML or defaults)
//!
//! Every computation here reads a snapshot of one user's history and is otherwise pure;
//! "now" always comes in from the caller.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Utc};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::{load_config_from_env, DashboardCfg, ServiceConfig};
use crate::domain::{ActivityItem, Submission};
use crate::error::{ApiError, IntegrityError, ValidationError};
use crate::feed::recent_activity;
use crate::rubric::{Catalog, CatalogProvider};
use crate::seeds::{merge_templates, seed_templates};
use crate::stats::{compute_user_progress, ProgressReport, ProgressionLadder};
use crate::store::SubmissionStore;
use crate::submission::{total_score, validate_submission};
use crate::util::trunc_for_log;

/// A submission as handed in by a client, before the server assigns an id.
#[derive(Clone, Debug)]
pub struct NewSubmission {
    pub user_id: String,
    pub template_id: String,
    pub submitted_at: Option<DateTime<Utc>>,
    pub scores_by_criterion: BTreeMap<String, i32>,
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    /// Templates refused at load; kept for operator visibility.
    pub rejected: Vec<IntegrityError>,
    pub store: SubmissionStore,
    pub ladder: ProgressionLadder,
    pub dashboard: DashboardCfg,
}

impl AppState {
    /// Build state from env: load config, merge with built-in templates, validate the catalog.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        Self::from_config(load_config_from_env().unwrap_or_default())
    }

    pub fn from_config(cfg: ServiceConfig) -> Self {
        let templates = merge_templates(cfg.templates, seed_templates());
        let (catalog, rejected) = Catalog::load(templates);
        info!(
            target: "devpath_backend",
            templates = catalog.len(),
            rejected = rejected.len(),
            intermediate_points = cfg.progression.intermediate_points,
            advanced_points = cfg.progression.advanced_points,
            activity_limit = cfg.dashboard.activity_limit,
            "Startup catalog inventory"
        );
        Self {
            catalog,
            rejected,
            store: SubmissionStore::new(),
            ladder: cfg.progression,
            dashboard: cfg.dashboard,
        }
    }

    /// Validate against the catalog and append. The stored submission is returned with
    /// its server-assigned id.
    #[instrument(level = "info", skip(self, input), fields(user = %trunc_for_log(&input.user_id, 64), template = %input.template_id))]
    pub async fn record_submission(
        &self,
        input: NewSubmission,
        now: DateTime<Utc>,
    ) -> Result<(Submission, i32), ApiError> {
        let template = self
            .catalog
            .get_template(&input.template_id)
            .ok_or_else(|| ValidationError::UnknownTemplate(input.template_id.clone()))?;

        let submission = Submission {
            id: Uuid::new_v4().to_string(),
            user_id: input.user_id,
            template_id: input.template_id,
            submitted_at: input.submitted_at.unwrap_or(now),
            scores_by_criterion: input.scores_by_criterion,
        };

        if let Err(e) = validate_submission(&submission, template, now) {
            warn!(target: "grading", id = %submission.id, error = %e, "Submission rejected");
            return Err(e.into());
        }

        let limit = self.dashboard.max_submissions_per_user;
        if !self.store.append(submission.clone(), limit).await {
            warn!(target: "grading", user = %submission.user_id, limit, "Submission limit reached");
            return Err(ApiError::LimitReached { user_id: submission.user_id, limit });
        }

        let score = total_score(&submission, template);
        info!(target: "grading", id = %submission.id, score, max_points = template.max_points, "Submission recorded");
        Ok((submission, score))
    }

    #[instrument(level = "info", skip(self))]
    pub async fn compute_user_progress(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        offset: FixedOffset,
    ) -> ProgressReport {
        let history = self.store.list_submissions(user_id).await;
        compute_user_progress(&history, &self.catalog, now, offset, &self.ladder)
    }

    /// Newest-first feed as of `now`, `limit` defaulting to the configured dashboard length.
    #[instrument(level = "info", skip(self))]
    pub async fn recent_activity(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        limit: Option<usize>,
    ) -> Vec<ActivityItem> {
        let history = self.store.list_submissions(user_id).await;
        self.feed_as_of(&history, now, limit)
    }

    /// Progress and feed built from one snapshot of the user's history.
    #[instrument(level = "info", skip(self))]
    pub async fn dashboard(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        offset: FixedOffset,
        limit: Option<usize>,
    ) -> (ProgressReport, Vec<ActivityItem>) {
        let history = self.store.list_submissions(user_id).await;
        let report = compute_user_progress(&history, &self.catalog, now, offset, &self.ladder);
        let feed = self.feed_as_of(&history, now, limit);
        (report, feed)
    }

    // Submissions dated after `now` are left out, same as in aggregation.
    fn feed_as_of(&self, history: &[Submission], now: DateTime<Utc>, limit: Option<usize>) -> Vec<ActivityItem> {
        let visible: Vec<Submission> = history.iter().filter(|s| s.submitted_at <= now).cloned().collect();
        let limit = limit.unwrap_or(self.dashboard.activity_limit);
        recent_activity(&visible, &self.catalog, limit).collect()
    }
}
