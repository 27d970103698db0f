use std::path::PathBuf;
use std::time::Duration;

use perspecto_core::storage::DEFAULT_VIDEO_BUCKET;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} must be {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Project base URL, e.g. `https://abc.supabase.co`.
    pub supabase_url: String,
    /// Public anon key sent as `apikey`.
    pub supabase_anon_key: String,
    /// Directory holding local preference files (default: `.perspecto`).
    pub data_dir: PathBuf,
    /// Storage bucket for uploaded videos (default: `videos`).
    pub video_bucket: String,
    /// Per-request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                | Default       |
    /// |------------------------|---------------|
    /// | `SUPABASE_URL`         | required      |
    /// | `SUPABASE_ANON_KEY`    | required      |
    /// | `PERSPECTO_DATA_DIR`   | `.perspecto`  |
    /// | `VIDEO_BUCKET`         | `videos`      |
    /// | `REQUEST_TIMEOUT_SECS` | `30`          |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |var: &'static str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(var))
        };

        let supabase_url = required("SUPABASE_URL")?;
        if !supabase_url.starts_with("http://") && !supabase_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                var: "SUPABASE_URL",
                expected: "an http(s) URL",
                value: supabase_url,
            });
        }
        let supabase_anon_key = required("SUPABASE_ANON_KEY")?;

        let data_dir = lookup("PERSPECTO_DATA_DIR")
            .unwrap_or_else(|| ".perspecto".into())
            .into();

        let video_bucket = lookup("VIDEO_BUCKET").unwrap_or_else(|| DEFAULT_VIDEO_BUCKET.into());

        let raw_timeout = lookup("REQUEST_TIMEOUT_SECS").unwrap_or_else(|| "30".into());
        let request_timeout_secs: u64 =
            raw_timeout
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid {
                    var: "REQUEST_TIMEOUT_SECS",
                    expected: "a whole number of seconds",
                    value: raw_timeout.clone(),
                })?;

        Ok(Self {
            supabase_url: supabase_url.trim_end_matches('/').to_string(),
            supabase_anon_key,
            data_dir,
            video_bucket,
            request_timeout_secs,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
