//! Loading service configuration (progression ladder, dashboard limits, extra catalog
//! templates) from TOML.
//!
//! See `ServiceConfig` for the expected schema.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::ProjectTemplate;
use crate::feed::DEFAULT_ACTIVITY_LIMIT;
use crate::stats::ProgressionLadder;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ServiceConfig {
  #[serde(default)]
  pub progression: ProgressionLadder,
  #[serde(default)]
  pub dashboard: DashboardCfg,
  /// Templates added to (or overriding) the built-in catalog. Same shape as the catalog file.
  #[serde(default)]
  pub templates: Vec<ProjectTemplate>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DashboardCfg {
  /// Feed length when the client does not ask for one.
  pub activity_limit: usize,
  /// Upper bound on stored submissions per user; bounds aggregation work.
  pub max_submissions_per_user: usize,
}

impl Default for DashboardCfg {
  fn default() -> Self {
    Self {
      activity_limit: DEFAULT_ACTIVITY_LIMIT,
      max_submissions_per_user: 1000,
    }
  }
}

pub fn parse_config(s: &str) -> Result<ServiceConfig, toml::de::Error> {
  toml::from_str::<ServiceConfig>(s)
}

/// Attempt to load `ServiceConfig` from DEVPATH_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<ServiceConfig> {
  let path = std::env::var("DEVPATH_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "devpath_backend", %path, templates = cfg.templates.len(), "Loaded service config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "devpath_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "devpath_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
