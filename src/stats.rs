//! Folding a user's submission history into dashboard statistics.
//!
//! Flow:
//! 1) Drop submissions dated after "now" (warned, never counted).
//! 2) Collect activity days from every remaining submission, resolved or not.
//! 3) Group by template; the current submission is the latest one (tie-break: higher
//!    total, then greater id). Unresolved templates are warned and left out of totals.
//! 4) Streak from the day set, stage from points and completed difficulty counts.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::domain::{Difficulty, Stage, Submission, UserProgress};
use crate::error::AggregationWarning;
use crate::rubric::CatalogProvider;
use crate::submission::total_score;
use crate::util::local_day;

/// Promotion thresholds. A user is promoted when either the points or the
/// completed-template condition of a tier holds.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProgressionLadder {
  pub intermediate_points: i64,
  /// Completed templates of intermediate difficulty or higher.
  pub intermediate_templates: usize,
  pub advanced_points: i64,
  /// Completed templates of advanced difficulty.
  pub advanced_templates: usize,
}

impl Default for ProgressionLadder {
  fn default() -> Self {
    Self {
      intermediate_points: 300,
      intermediate_templates: 3,
      advanced_points: 800,
      advanced_templates: 2,
    }
  }
}

/// Distinct templates whose current submission scored above zero, by tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompletedCounts {
  pub intermediate_or_higher: usize,
  pub advanced: usize,
}

impl CompletedCounts {
  fn record(&mut self, difficulty: Difficulty) {
    if difficulty >= Difficulty::Intermediate { self.intermediate_or_higher += 1; }
    if difficulty == Difficulty::Advanced { self.advanced += 1; }
  }
}

/// Aggregation output: the statistics plus any soft warnings found on the way.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ProgressReport {
  pub progress: UserProgress,
  pub warnings: Vec<AggregationWarning>,
}

#[instrument(level = "debug", skip_all, fields(submissions = submissions.len(), %now))]
pub fn compute_user_progress<C: CatalogProvider + ?Sized>(
  submissions: &[Submission],
  catalog: &C,
  now: DateTime<Utc>,
  offset: FixedOffset,
  ladder: &ProgressionLadder,
) -> ProgressReport {
  let mut warnings = Vec::new();
  let mut days = BTreeSet::new();
  let mut groups: BTreeMap<&str, Vec<&Submission>> = BTreeMap::new();

  for s in submissions {
    if s.submitted_at > now {
      warn!(target: "grading", submission = %s.id, submitted_at = %s.submitted_at, "Skipping future-dated submission");
      warnings.push(AggregationWarning::FutureSubmission { submission_id: s.id.clone() });
      continue;
    }
    days.insert(local_day(s.submitted_at, offset));
    groups.entry(s.template_id.as_str()).or_default().push(s);
  }

  let mut total_projects = 0u32;
  let mut total_points = 0i64;
  let mut completed = CompletedCounts::default();

  for (template_id, group) in groups {
    let Some(template) = catalog.get_template(template_id) else {
      warn!(target: "grading", template = %template_id, submissions = group.len(), "Unresolved template; excluded from points");
      warnings.push(AggregationWarning::UnresolvedTemplate {
        template_id: template_id.to_string(),
        submissions: group.len(),
      });
      continue;
    };

    let current = group
      .into_iter()
      .map(|s| (s, total_score(s, template)))
      .max_by(|(a, a_score), (b, b_score)| {
        a.submitted_at
          .cmp(&b.submitted_at)
          .then_with(|| a_score.cmp(b_score))
          .then_with(|| a.id.cmp(&b.id))
      });

    if let Some((s, score)) = current {
      debug!(target: "grading", template = %template_id, current = %s.id, score, "Current submission");
      total_projects += 1;
      total_points += i64::from(score);
      if score > 0 { completed.record(template.difficulty); }
    }
  }

  let streak = streak_days(&days, local_day(now, offset));
  let stage = derive_stage(total_points, completed, ladder);
  debug!(target: "grading", total_projects, total_points, streak, ?stage, "Progress computed");

  ProgressReport {
    progress: UserProgress {
      total_projects,
      total_points,
      streak_days: streak,
      current_stage: stage,
    },
    warnings,
  }
}

/// Consecutive active days ending at the most recent one. Zero when that day is
/// more than one day before `today`. Days after `today` are ignored.
pub fn streak_days(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
  let Some(&latest) = days.range(..=today).next_back() else { return 0 };
  if (today - latest).num_days() > 1 {
    return 0;
  }

  let mut streak = 0;
  let mut cursor = Some(latest);
  while let Some(day) = cursor.filter(|d| days.contains(d)) {
    streak += 1;
    cursor = day.pred_opt();
  }
  streak
}

/// Stage as a pure function of current state; never stored, so it cannot drift.
pub fn derive_stage(total_points: i64, completed: CompletedCounts, ladder: &ProgressionLadder) -> Stage {
  if total_points >= ladder.advanced_points || completed.advanced >= ladder.advanced_templates {
    Stage::Advanced
  } else if total_points >= ladder.intermediate_points
    || completed.intermediate_or_higher >= ladder.intermediate_templates
  {
    Stage::Intermediate
  } else {
    Stage::Beginner
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Difficulty;
  use crate::rubric::tests::template;
  use crate::rubric::Catalog;
  use crate::submission::tests::submission;
  use crate::util::{offset_from_minutes, utc_offset};
  use chrono::TimeZone;

  fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, d, 10, 0, 0).unwrap()
  }

  fn catalog() -> Catalog {
    let (catalog, rejected) = Catalog::load(vec![
      template("bg-1", Difficulty::Beginner, &[("design", 50), ("code", 50)]),
      template("bg-3", Difficulty::Beginner, &[("design", 50), ("code", 50)]),
      template("bg-4", Difficulty::Beginner, &[("design", 50), ("code", 50)]),
      template("int-1", Difficulty::Intermediate, &[("core", 100)]),
      template("int-2", Difficulty::Intermediate, &[("core", 100)]),
      template("int-3", Difficulty::Intermediate, &[("core", 100)]),
      template("adv-1", Difficulty::Advanced, &[("core", 100)]),
      template("adv-2", Difficulty::Advanced, &[("core", 100)]),
    ]);
    assert!(rejected.is_empty());
    catalog
  }

  fn progress(subs: &[Submission], now: DateTime<Utc>) -> ProgressReport {
    compute_user_progress(subs, &catalog(), now, utc_offset(), &ProgressionLadder::default())
  }

  fn history() -> Vec<Submission> {
    vec![
      submission("s1", "bg-1", day(1), &[("design", 40), ("code", 40)]),
      submission("s2", "bg-3", day(2), &[("design", 45), ("code", 45)]),
      submission("s3", "bg-4", day(4), &[("design", 35), ("code", 35)]),
    ]
  }

  #[test]
  fn empty_history_is_all_zeros_and_beginner() {
    let report = progress(&[], day(4));
    assert_eq!(report.progress, UserProgress::default());
    assert_eq!(report.progress.current_stage, Stage::Beginner);
    assert!(report.warnings.is_empty());
  }

  #[test]
  fn three_beginner_projects_with_a_gap() {
    let report = progress(&history(), day(4));
    assert_eq!(report.progress.total_projects, 3);
    assert_eq!(report.progress.total_points, 240);
    assert_eq!(report.progress.streak_days, 1);
    assert_eq!(report.progress.current_stage, Stage::Beginner);
  }

  #[test]
  fn resubmission_replaces_previous_score() {
    let mut subs = history();
    subs.push(submission("s4", "bg-1", day(5), &[("design", 50), ("code", 45)]));
    let report = progress(&subs, day(5));
    assert_eq!(report.progress.total_points, 255);
    assert_eq!(report.progress.total_projects, 3);
    assert_eq!(report.progress.streak_days, 2);
  }

  #[test]
  fn lower_scoring_duplicate_of_latest_does_not_double_count() {
    let mut subs = history();
    let before = progress(&subs, day(5)).progress.total_points;
    subs.push(submission("s9", "bg-4", day(4), &[("design", 10), ("code", 10)]));
    let after = progress(&subs, day(5));
    assert_eq!(after.progress.total_points, before);
    assert_eq!(after.progress.total_projects, 3);
  }

  #[test]
  fn same_instant_tie_prefers_higher_total() {
    let subs = vec![
      submission("a", "bg-1", day(1), &[("design", 10)]),
      submission("b", "bg-1", day(1), &[("design", 30)]),
    ];
    assert_eq!(progress(&subs, day(1)).progress.total_points, 30);

    let reversed: Vec<Submission> = subs.into_iter().rev().collect();
    assert_eq!(progress(&reversed, day(1)).progress.total_points, 30);
  }

  #[test]
  fn streak_counts_consecutive_days_ending_today() {
    let subs: Vec<Submission> = (1..=5)
      .map(|d| submission(&format!("s{d}"), "bg-1", day(d), &[("design", 10)]))
      .collect();
    assert_eq!(progress(&subs, day(5)).progress.streak_days, 5);
    // Yesterday still holds the streak.
    assert_eq!(progress(&subs, day(6)).progress.streak_days, 5);
    // Two idle days break it.
    assert_eq!(progress(&subs, day(7)).progress.streak_days, 0);
  }

  #[test]
  fn streak_resets_after_a_gap_day() {
    let subs = vec![
      submission("s1", "bg-1", day(1), &[("design", 10)]),
      submission("s2", "bg-1", day(2), &[("design", 10)]),
      submission("s3", "bg-3", day(4), &[("design", 10)]),
    ];
    assert_eq!(progress(&subs, day(4)).progress.streak_days, 1);
  }

  #[test]
  fn multiple_submissions_on_one_day_count_once() {
    let subs = vec![
      submission("s1", "bg-1", day(3), &[("design", 10)]),
      submission("s2", "bg-3", day(3), &[("design", 10)]),
      submission("s3", "bg-4", day(2), &[("design", 10)]),
    ];
    assert_eq!(progress(&subs, day(3)).progress.streak_days, 2);
  }

  #[test]
  fn streak_days_uses_user_offset() {
    // 23:30 UTC on the 1st is already the 2nd at UTC+1.
    let late = Utc.with_ymd_and_hms(2024, 3, 1, 23, 30, 0).unwrap();
    let subs = vec![
      submission("s1", "bg-1", day(1), &[("design", 10)]),
      submission("s2", "bg-3", late, &[("design", 10)]),
    ];
    let now = Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap();
    let ladder = ProgressionLadder::default();
    let utc = compute_user_progress(&subs, &catalog(), now, utc_offset(), &ladder);
    let cet = compute_user_progress(&subs, &catalog(), now, offset_from_minutes(60).unwrap(), &ladder);
    assert_eq!(utc.progress.streak_days, 1);
    assert_eq!(cet.progress.streak_days, 2);
  }

  #[test]
  fn unresolved_template_counts_for_streak_only() {
    let subs = vec![
      submission("s1", "gone-1", day(3), &[("core", 90)]),
      submission("s2", "gone-1", day(3), &[("core", 95)]),
      submission("s3", "bg-1", day(4), &[("design", 50)]),
    ];
    let report = progress(&subs, day(4));
    assert_eq!(report.progress.total_projects, 1);
    assert_eq!(report.progress.total_points, 50);
    assert_eq!(report.progress.streak_days, 2);
    assert_eq!(
      report.warnings,
      vec![AggregationWarning::UnresolvedTemplate { template_id: "gone-1".into(), submissions: 2 }]
    );
  }

  #[test]
  fn future_dated_submissions_are_skipped_with_a_warning() {
    let subs = vec![
      submission("s1", "bg-1", day(2), &[("design", 10)]),
      submission("s2", "bg-3", day(9), &[("design", 50)]),
    ];
    let report = progress(&subs, day(2));
    assert_eq!(report.progress.total_points, 10);
    assert_eq!(report.progress.streak_days, 1);
    assert_eq!(report.warnings, vec![AggregationWarning::FutureSubmission { submission_id: "s2".into() }]);
  }

  #[test]
  fn three_intermediate_completions_promote() {
    let subs = vec![
      submission("s1", "int-1", day(1), &[("core", 10)]),
      submission("s2", "int-2", day(1), &[("core", 10)]),
      submission("s3", "adv-1", day(1), &[("core", 10)]),
    ];
    let report = progress(&subs, day(1));
    assert_eq!(report.progress.total_points, 30);
    assert_eq!(report.progress.current_stage, Stage::Intermediate);
  }

  #[test]
  fn zero_score_does_not_count_as_completed() {
    let subs = vec![
      submission("s1", "int-1", day(1), &[("core", 0)]),
      submission("s2", "int-2", day(1), &[("core", 10)]),
      submission("s3", "int-3", day(1), &[]),
    ];
    assert_eq!(progress(&subs, day(1)).progress.current_stage, Stage::Beginner);
  }

  #[test]
  fn two_advanced_completions_promote_to_advanced() {
    let subs = vec![
      submission("s1", "adv-1", day(1), &[("core", 5)]),
      submission("s2", "adv-2", day(1), &[("core", 5)]),
    ];
    assert_eq!(progress(&subs, day(1)).progress.current_stage, Stage::Advanced);
  }

  #[test]
  fn stage_never_regresses_along_a_growing_history() {
    let ladder = ProgressionLadder::default();
    let mut last = Stage::Beginner;
    for points in (0..=1000).step_by(25) {
      for completed_int in 0..=4usize {
        let counts = CompletedCounts { intermediate_or_higher: completed_int, advanced: completed_int / 2 };
        let stage = derive_stage(points, counts, &ladder);
        if completed_int == 0 {
          assert!(stage >= last, "regressed at {points} points");
          last = stage;
        }
        assert!(stage >= derive_stage(points, CompletedCounts::default(), &ladder));
      }
    }
    assert_eq!(derive_stage(299, CompletedCounts::default(), &ladder), Stage::Beginner);
    assert_eq!(derive_stage(300, CompletedCounts::default(), &ladder), Stage::Intermediate);
    assert_eq!(derive_stage(800, CompletedCounts::default(), &ladder), Stage::Advanced);
  }
}
