//! Recent-activity feed: a newest-first projection over every submission.
//! No dedup by template and no aggregation; it never feeds back into progress.

use crate::domain::{ActivityItem, Submission};
use crate::rubric::CatalogProvider;
use crate::submission::total_score;

pub const DEFAULT_ACTIVITY_LIMIT: usize = 5;

const ACTIVITY_KIND: &str = "project_submission";

/// Up to `limit` items ordered by `submitted_at` descending, ties by id descending.
/// The returned iterator is consumed once; call again for a fresh pass.
pub fn recent_activity<'a, C: CatalogProvider + ?Sized>(
  submissions: &'a [Submission],
  catalog: &'a C,
  limit: usize,
) -> impl Iterator<Item = ActivityItem> + 'a {
  let mut ordered: Vec<&'a Submission> = submissions.iter().collect();
  ordered.sort_by(|a, b| {
    b.submitted_at
      .cmp(&a.submitted_at)
      .then_with(|| b.id.cmp(&a.id))
  });
  ordered.into_iter().take(limit).map(move |s| to_item(s, catalog))
}

fn to_item<C: CatalogProvider + ?Sized>(s: &Submission, catalog: &C) -> ActivityItem {
  match catalog.get_template(&s.template_id) {
    Some(t) => {
      let graded = t
        .grading_criteria
        .iter()
        .filter(|c| s.scores_by_criterion.contains_key(&c.id))
        .count();
      ActivityItem {
        id: s.id.clone(),
        kind: ACTIVITY_KIND,
        title: t.name.clone(),
        difficulty: Some(t.difficulty),
        description: format!("Submitted for grading ({graded}/{} criteria scored)", t.grading_criteria.len()),
        date: s.submitted_at,
        score: total_score(s, t),
        max_points: Some(t.max_points),
      }
    }
    None => ActivityItem {
      id: s.id.clone(),
      kind: ACTIVITY_KIND,
      title: s.template_id.clone(),
      difficulty: None,
      description: "Project no longer in the catalog".into(),
      date: s.submitted_at,
      score: 0,
      max_points: None,
    },
  }
}
