//! Built-in project catalog shipped with the binary.

use serde::Deserialize;
use tracing::error;

use crate::domain::ProjectTemplate;

const BUILTIN_CATALOG: &str = include_str!("../catalog/projects.toml");

#[derive(Deserialize)]
struct CatalogFile {
  #[serde(default)]
  templates: Vec<ProjectTemplate>,
}

/// Templates from the embedded catalog, unvalidated. A malformed file yields none.
pub fn seed_templates() -> Vec<ProjectTemplate> {
  match toml::from_str::<CatalogFile>(BUILTIN_CATALOG) {
    Ok(file) => file.templates,
    Err(e) => {
      error!(target: "catalog", error = %e, "Built-in catalog is not valid TOML");
      Vec::new()
    }
  }
}

/// Config templates first, then built-ins whose id is not already taken.
pub fn merge_templates(configured: Vec<ProjectTemplate>, builtin: Vec<ProjectTemplate>) -> Vec<ProjectTemplate> {
  let mut out = configured;
  for t in builtin {
    if !out.iter().any(|c| c.id == t.id) {
      out.push(t);
    }
  }
  out
}
