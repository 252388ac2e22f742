//! Runtime configuration.

use std::path::{Path, PathBuf};

use sathi_store_remote::RemoteConfig;
use serde::Deserialize;

use crate::{Error, Result};

/// Settings for the document layer, deserialised from an optional TOML file
/// and the process environment (`SUPABASE_URL`, `SUPABASE_KEY` and
/// `SATHI_`-prefixed names such as `SATHI_LOCAL_STORE_PATH`).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  /// Remote project URL. Blank counts as unset.
  #[serde(default)]
  pub supabase_url:            Option<String>,
  /// Remote access key. Blank counts as unset.
  #[serde(default)]
  pub supabase_key:            Option<String>,
  /// The local SQLite file for the legacy tables.
  #[serde(default = "default_local_store_path")]
  pub local_store_path:        PathBuf,
  /// Serve documents from the local store when the remote store is not
  /// configured. Off by default: documents are then not persisted at all.
  #[serde(default)]
  pub local_document_fallback: bool,
}

/// Prefix for every setting except the two remote ones.
const ENV_PREFIX: &str = "SATHI";

/// Remote settings keep their conventional unprefixed names.
const SUPABASE_VARS: [&str; 2] = ["SUPABASE_URL", "SUPABASE_KEY"];

fn default_local_store_path() -> PathBuf { PathBuf::from("data/digifest.db") }

impl Default for Settings {
  fn default() -> Self {
    Self {
      supabase_url:            None,
      supabase_key:            None,
      local_store_path:        default_local_store_path(),
      local_document_fallback: false,
    }
  }
}

impl Settings {
  /// Load `.env` (if any) into the environment, then read `path` (if given
  /// and present) overridden by environment variables. Only `SATHI_*`
  /// variables and the two `SUPABASE_*` settings are read.
  pub fn load(path: Option<&Path>) -> Result<Self> {
    if let Ok(dotenv) = dotenvy::dotenv() {
      tracing::debug!(path = %dotenv.display(), "loaded .env");
    }
    Self::load_from(path, std::env::vars())
  }

  pub(crate) fn load_from(
    path: Option<&Path>,
    vars: impl IntoIterator<Item = (String, String)>,
  ) -> Result<Self> {
    let vars: config::Map<String, String> = vars.into_iter().collect();
    let supabase: config::Map<String, String> = vars
      .iter()
      .filter(|(key, _)| SUPABASE_VARS.contains(&key.as_str()))
      .map(|(key, value)| (key.clone(), value.clone()))
      .collect();

    let mut builder = config::Config::builder();
    if let Some(path) = path {
      builder = builder.add_source(config::File::from(path).required(false));
    }
    let settings = builder
      .add_source(config::Environment::with_prefix(ENV_PREFIX).source(Some(vars)))
      .add_source(config::Environment::default().source(Some(supabase)))
      .build()?
      .try_deserialize()?;
    Ok(settings)
  }

  /// Parse settings from TOML text alone.
  pub fn from_toml(raw: &str) -> Result<Self> {
    Ok(
      config::Config::builder()
        .add_source(config::File::from_str(raw, config::FileFormat::Toml))
        .build()?
        .try_deserialize()?,
    )
  }

  /// The remote store settings, or [`Error::MissingSetting`] naming the
  /// first one that is unset or blank.
  pub fn remote_config(&self) -> Result<RemoteConfig> {
    let endpoint = non_blank(&self.supabase_url).ok_or(Error::MissingSetting("SUPABASE_URL"))?;
    let api_key = non_blank(&self.supabase_key).ok_or(Error::MissingSetting("SUPABASE_KEY"))?;
    Ok(RemoteConfig { endpoint: endpoint.to_owned(), api_key: api_key.to_owned() })
  }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
  value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
