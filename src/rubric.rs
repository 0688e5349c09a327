//! Rubric integrity checks and the validated, read-only template catalog.
//!
//! Templates are checked once, when the catalog is built. Anything that fails is kept
//! out of the catalog and reported; the rest is served as trusted data.

use std::collections::{HashMap, HashSet};

use tracing::{error, info, instrument};

use crate::domain::ProjectTemplate;
use crate::error::IntegrityError;

/// Read access to templates by id. Aggregation and the feed only need this.
pub trait CatalogProvider {
  fn get_template(&self, template_id: &str) -> Option<&ProjectTemplate>;
}

/// Check rubric invariants: non-negative criteria, unique criterion ids,
/// and criteria points summing to the template maximum.
pub fn validate_template(template: &ProjectTemplate) -> Result<(), IntegrityError> {
  let mut seen = HashSet::new();
  let mut sum: i64 = 0;
  for c in &template.grading_criteria {
    if c.max_points < 0 {
      return Err(IntegrityError::NegativeCriterionPoints {
        template_id: template.id.clone(),
        criterion_id: c.id.clone(),
        max_points: c.max_points,
      });
    }
    if !seen.insert(c.id.as_str()) {
      return Err(IntegrityError::DuplicateCriterion {
        template_id: template.id.clone(),
        criterion_id: c.id.clone(),
      });
    }
    sum += i64::from(c.max_points);
  }
  if sum != i64::from(template.max_points) {
    return Err(IntegrityError::PointsMismatch {
      template_id: template.id.clone(),
      criteria_sum: sum,
      max_points: template.max_points,
    });
  }
  Ok(())
}

/// Templates that passed validation, indexed by id.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
  by_id: HashMap<String, ProjectTemplate>,
}

impl Catalog {
  /// Validate every template and keep the good ones. Rejections are returned, never fatal.
  #[instrument(level = "info", skip_all, fields(candidates = templates.len()))]
  pub fn load(templates: Vec<ProjectTemplate>) -> (Self, Vec<IntegrityError>) {
    let mut by_id = HashMap::with_capacity(templates.len());
    let mut seen = HashSet::with_capacity(templates.len());
    let mut rejected = Vec::new();

    for t in templates {
      // Ids are claimed by their first occurrence, valid or not.
      if !seen.insert(t.id.clone()) {
        let err = IntegrityError::DuplicateTemplate { template_id: t.id.clone() };
        error!(target: "catalog", template = %t.id, error = %err, "Rejected template");
        rejected.push(err);
        continue;
      }
      match validate_template(&t) {
        Ok(()) => {
          by_id.insert(t.id.clone(), t);
        }
        Err(err) => {
          error!(target: "catalog", template = %t.id, error = %err, "Rejected template");
          rejected.push(err);
        }
      }
    }

    info!(target: "catalog", served = by_id.len(), rejected = rejected.len(), "Catalog loaded");
    (Self { by_id }, rejected)
  }

  pub fn len(&self) -> usize {
    self.by_id.len()
  }

  /// All served templates, ordered by difficulty then id.
  pub fn templates(&self) -> Vec<&ProjectTemplate> {
    let mut out: Vec<&ProjectTemplate> = self.by_id.values().collect();
    out.sort_by(|a, b| a.difficulty.cmp(&b.difficulty).then_with(|| a.id.cmp(&b.id)));
    out
  }
}

impl CatalogProvider for Catalog {
  fn get_template(&self, template_id: &str) -> Option<&ProjectTemplate> {
    self.by_id.get(template_id)
  }
}
