//! Domain models used by the backend: project templates and their rubrics, submissions,
//! and the derived progress/activity views.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Difficulty tier of a project template. Ordered: beginner < intermediate < advanced.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Beginner,
  Intermediate,
  Advanced,
}

/// Which part of the stack a project exercises.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Stack {
  Frontend,
  Backend,
  Fullstack,
}

/// One weighted category within a template's rubric.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingCriterion {
  pub id: String,
  pub category: String,
  #[serde(default)] pub description: String,
  pub max_points: i32,
  /// Checklist shown to the learner; not scored on its own.
  #[serde(default)] pub requirements: Vec<String>,
}

/// Catalog entry: a project a learner can build and get graded on.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTemplate {
  pub id: String,
  pub name: String,
  #[serde(default)] pub description: String,
  pub stack: Stack,
  pub difficulty: Difficulty,
  #[serde(default)] pub technologies: Vec<String>,
  #[serde(default)] pub estimated_hours: u32,
  pub max_points: i32,
  /// Project-level deliverables, shown to the learner. Not scored directly.
  #[serde(default)] pub requirements: Vec<String>,
  pub grading_criteria: Vec<GradingCriterion>,
}

impl ProjectTemplate {
  pub fn criterion(&self, id: &str) -> Option<&GradingCriterion> {
    self.grading_criteria.iter().find(|c| c.id == id)
  }
}

/// A user's graded attempt at a template. Never mutated once recorded.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
  pub id: String,
  pub user_id: String,
  pub template_id: String,
  pub submitted_at: DateTime<Utc>,
  /// Criterion id -> awarded points. Missing criteria count as 0.
  #[serde(default)] pub scores_by_criterion: BTreeMap<String, i32>,
}

/// Coarse progression label. Same tiers as `Difficulty`, also ordered.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
  #[default]
  Beginner,
  Intermediate,
  Advanced,
}

/// Derived dashboard statistics. Recomputed from submissions on every request.
#[derive(Clone, Debug, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
  pub total_projects: u32,
  pub total_points: i64,
  pub streak_days: u32,
  pub current_stage: Stage,
}

/// One row of the recent-activity feed.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
  pub id: String,
  #[serde(rename = "type")]
  pub kind: &'static str,
  pub title: String,
  /// None when the template has since left the catalog.
  pub difficulty: Option<Difficulty>,
  pub description: String,
  pub date: DateTime<Utc>,
  pub score: i32,
  pub max_points: Option<i32>,
}
