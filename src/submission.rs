//! Submission checks against an already-trusted template, and score totals.

use chrono::{DateTime, Utc};

use crate::domain::{ProjectTemplate, Submission};
use crate::error::ValidationError;

/// Reject a submission that targets another template, scores unknown criteria,
/// awards points outside a criterion's range, or is dated after `now`.
pub fn validate_submission(
  submission: &Submission,
  template: &ProjectTemplate,
  now: DateTime<Utc>,
) -> Result<(), ValidationError> {
  if submission.template_id != template.id {
    return Err(ValidationError::TemplateMismatch {
      submitted: submission.template_id.clone(),
      expected: template.id.clone(),
    });
  }

  for (criterion_id, &awarded) in &submission.scores_by_criterion {
    let Some(criterion) = template.criterion(criterion_id) else {
      return Err(ValidationError::UnknownCriterion {
        template_id: template.id.clone(),
        criterion_id: criterion_id.clone(),
      });
    };
    if awarded < 0 || awarded > criterion.max_points {
      return Err(ValidationError::ScoreOutOfRange {
        criterion_id: criterion_id.clone(),
        awarded,
        max_points: criterion.max_points,
      });
    }
  }

  if submission.submitted_at > now {
    return Err(ValidationError::FutureTimestamp { submitted_at: submission.submitted_at, now });
  }
  Ok(())
}

/// Sum of awarded points over the template's criteria. Keys the template does not
/// know (stale template version) are ignored and each award is clamped to its range,
/// so the result always lies in `0..=template.max_points`.
pub fn total_score(submission: &Submission, template: &ProjectTemplate) -> i32 {
  template
    .grading_criteria
    .iter()
    .filter_map(|c| {
      submission
        .scores_by_criterion
        .get(&c.id)
        .map(|&awarded| awarded.clamp(0, c.max_points.max(0)))
    })
    .sum()
}
