//! Process-level glue for the Pointage server: configuration and startup
//! bootstrap. The binary in `main.rs` wires these to the API router.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use pointage_api::{
  DEFAULT_MAX_UPLOAD_BYTES,
  auth::{jwt::DEFAULT_TOKEN_TTL_HOURS, password::hash_blocking},
};
use pointage_core::{admin::validate_new_password, store::AttendanceStore};
use serde::Deserialize;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Environment variables with this prefix override file settings, e.g.
/// `POINTAGE_JWT_SECRET`.
pub const ENV_PREFIX: &str = "POINTAGE";

/// Runtime configuration, deserialised from `config.toml` and the
/// environment.
#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub database_path:      PathBuf,
  pub jwt_secret:         String,
  pub token_ttl_hours:    i64,
  pub bootstrap_username: String,
  /// When unset, no superadmin is created at startup.
  pub bootstrap_password: Option<String>,
  pub max_upload_bytes:   usize,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:               "127.0.0.1".into(),
      port:               3000,
      database_path:      PathBuf::from("pointage.db"),
      jwt_secret:         String::new(),
      token_ttl_hours:    DEFAULT_TOKEN_TTL_HOURS,
      bootstrap_username: "superadmin".into(),
      bootstrap_password: None,
      max_upload_bytes:   DEFAULT_MAX_UPLOAD_BYTES,
    }
  }
}

impl ServerConfig {
  /// Layer the optional TOML file at `path` under `POINTAGE_*` variables.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
      .build()
      .context("failed to read configuration")?;

    let mut cfg: ServerConfig = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;
    cfg.database_path = expand_tilde(&cfg.database_path);
    cfg.validate()?;
    Ok(cfg)
  }

  pub fn validate(&self) -> anyhow::Result<()> {
    if self.jwt_secret.trim().is_empty() {
      bail!("jwt_secret must be set (or {ENV_PREFIX}_JWT_SECRET)");
    }
    if self.token_ttl_hours <= 0 {
      bail!("token_ttl_hours must be positive, got {}", self.token_ttl_hours);
    }
    if self.max_upload_bytes == 0 {
      bail!("max_upload_bytes must be positive");
    }
    Ok(())
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Bootstrap ───────────────────────────────────────────────────────────────

/// Ensure the protected superadmin exists. An existing account is left
/// untouched, password included. Returns whether an account was created.
pub async fn bootstrap_superadmin<S: AttendanceStore>(
  store: &S,
  cfg: &ServerConfig,
) -> anyhow::Result<bool> {
  let Some(password) = cfg.bootstrap_password.clone() else {
    tracing::warn!("no bootstrap_password configured; skipping superadmin bootstrap");
    return Ok(false);
  };
  validate_new_password(&password).context("invalid bootstrap_password")?;

  let hash = hash_blocking(password)
    .await
    .context("failed to hash bootstrap password")?;
  let created = store
    .bootstrap_superadmin(cfg.bootstrap_username.clone(), hash)
    .await
    .map_err(|e| -> pointage_core::Error { e.into() })
    .context("failed to bootstrap superadmin")?;

  if created {
    tracing::info!(username = %cfg.bootstrap_username, "superadmin created");
  } else {
    tracing::debug!("superadmin already present");
  }
  Ok(created)
}
