use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Checked in order; blank values count as unset.
const TOKEN_VARS: [&str; 2] = ["ISSUESMITH_GITHUB_TOKEN", "GITHUB_TOKEN"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub github: GithubConfig,
  /// Local checkout of the content repository, used for branch listing
  pub repo_path: Option<PathBuf>,
  #[serde(default = "default_branch")]
  pub default_branch: String,
  #[serde(default)]
  pub languages: LanguagesConfig,
  /// Write logs to this file instead of stderr
  pub log_file: Option<PathBuf>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      github: GithubConfig::default(),
      repo_path: None,
      default_branch: default_branch(),
      languages: LanguagesConfig::default(),
      log_file: None,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubConfig {
  #[serde(default = "default_owner")]
  pub owner: String,
  #[serde(default = "default_repo")]
  pub repo: String,
  /// Node id of the project board new issues are attached to
  pub project_id: Option<String>,
  #[serde(default = "default_api_url")]
  pub api_url: String,
  /// Timeout for every request, in seconds
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for GithubConfig {
  fn default() -> Self {
    Self {
      owner: default_owner(),
      repo: default_repo(),
      project_id: None,
      api_url: default_api_url(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LanguagesConfig {
  /// Base URL of a remote language catalog serving `GET /languages`.
  /// The built-in catalog is used when unset.
  pub catalog_url: Option<String>,
}

fn default_branch() -> String {
  "dev".to_string()
}

fn default_owner() -> String {
  "PlanB-Network".to_string()
}

fn default_repo() -> String {
  "bitcoin-educational-content".to_string()
}

fn default_api_url() -> String {
  "https://api.github.com".to_string()
}

fn default_timeout_secs() -> u64 {
  10
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./issuesmith.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/issuesmith/config.yaml
  ///
  /// Without any file the defaults are used. Environment overrides are
  /// applied last.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };

    Ok(config.with_env_overrides())
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("issuesmith.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("issuesmith").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> serde_yaml::Result<Self> {
    serde_yaml::from_str(contents)
  }

  fn with_env_overrides(mut self) -> Self {
    if let Ok(project_id) = std::env::var("ISSUESMITH_PROJECT_ID") {
      self.github.project_id = Some(project_id);
    }
    if let Ok(repo_path) = std::env::var("ISSUESMITH_REPO_PATH") {
      if !repo_path.is_empty() {
        self.repo_path = Some(PathBuf::from(repo_path));
      }
    }
    self
  }

  /// Get the GitHub token from environment variables.
  ///
  /// Checks ISSUESMITH_GITHUB_TOKEN first, then GITHUB_TOKEN as fallback.
  pub fn github_token() -> std::result::Result<String, Error> {
    Self::token_from(|name| std::env::var(name).ok())
  }

  /// First non-blank value among the token variables, in order.
  fn token_from(lookup: impl Fn(&str) -> Option<String>) -> std::result::Result<String, Error> {
    TOKEN_VARS
      .iter()
      .find_map(|name| lookup(*name).filter(|t| !t.trim().is_empty()))
      .ok_or_else(|| {
        Error::ConfigurationMissing(
          "GitHub token not found. Set ISSUESMITH_GITHUB_TOKEN or GITHUB_TOKEN.".to_string(),
        )
      })
  }

  /// The project board new issues are linked to.
  pub fn project_id(&self) -> std::result::Result<&str, Error> {
    self
      .github
      .project_id
      .as_deref()
      .filter(|id| !id.is_empty())
      .ok_or_else(|| Error::ConfigurationMissing("github.project_id is not set".to_string()))
  }
}
