use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default S3 location for query results.
pub const DEFAULT_OUTPUT_LOCATION: &str = "s3://qfetch-athena-results";

/// Credential profile used when `AWS_PROFILE` is unset.
pub const DEFAULT_AWS_PROFILE: &str = "default";

pub const DEFAULT_DATABASE: &str = "default";

pub const DEFAULT_OUTPUT_FILE: &str = "out.csv";

/// Fixed delay between two status polls.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a prefixed env var: tries {PREFIX}_{KEY} first, falls back to {KEY}.
fn prefixed_env_opt(prefix: &str, key: &str) -> Option<String> {
    if !prefix.is_empty() {
        let prefixed = format!("{}_{}", prefix, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn prefixed_env_or(prefix: &str, key: &str, default: &str) -> String {
    prefixed_env_opt(prefix, key).unwrap_or_else(|| default.to_string())
}

fn prefixed_env_u64(prefix: &str, key: &str) -> Option<u64> {
    prefixed_env_opt(prefix, key).and_then(|v| v.parse().ok())
}

// ── Top-level config ──────────────────────────────────────────

/// Resolved runtime configuration, assembled once at startup.
///
/// Precedence, highest first: CLI flag ([`Config::apply`]), `{ENV}_{KEY}`,
/// `{KEY}`, built-in default. `{ENV}` comes from `QFETCH_ENV` (e.g. `PROD`
/// makes `PROD_ATHENA_DATABASE` win over `ATHENA_DATABASE`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active env prefix (empty = none).
    pub env_prefix: String,
    pub aws: AwsConfig,
    pub athena: AthenaConfig,
    /// Local path the result CSV is written to.
    pub output_file: PathBuf,
}

/// Values supplied on the command line. `None` leaves the env/default value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub region: Option<String>,
    pub database: Option<String>,
    pub workgroup: Option<String>,
    pub output_location: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub timeout_seconds: Option<u64>,
    pub output_file: Option<PathBuf>,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        let prefix = env_opt("QFETCH_ENV")
            .map(|s| s.to_uppercase())
            .unwrap_or_default();
        Self::for_env_prefix(&prefix)
    }

    /// Build config for a specific env prefix (empty string = unprefixed).
    pub fn for_env_prefix(prefix: &str) -> Self {
        let p = prefix.to_uppercase();
        let p = p.as_str();
        Self {
            env_prefix: p.to_string(),
            aws: AwsConfig::from_env_prefixed(p),
            athena: AthenaConfig::from_env_prefixed(p),
            output_file: PathBuf::from(prefixed_env_or(p, "QFETCH_OUTPUT_FILE", DEFAULT_OUTPUT_FILE)),
        }
    }

    /// Layer command-line values on top of the env-derived config.
    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(v) = overrides.profile {
            self.aws.profile = v;
        }
        if overrides.region.is_some() {
            self.aws.region = overrides.region;
        }
        if let Some(v) = overrides.database {
            self.athena.database = v;
        }
        if overrides.workgroup.is_some() {
            self.athena.workgroup = overrides.workgroup;
        }
        if let Some(v) = overrides.output_location {
            self.athena.output_location = v;
        }
        if let Some(v) = overrides.poll_interval_ms {
            self.athena.poll_interval_ms = v;
        }
        if overrides.timeout_seconds.is_some() {
            self.athena.timeout_seconds = overrides.timeout_seconds;
        }
        if let Some(v) = overrides.output_file {
            self.output_file = v;
        }
        self
    }

    pub fn env_label(&self) -> &str {
        if self.env_prefix.is_empty() { "default" } else { &self.env_prefix }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (env: {}):", self.env_label());
        tracing::info!(
            "  aws:     profile={}, region={}",
            self.aws.profile,
            self.aws.region.as_deref().unwrap_or("(profile default)")
        );
        tracing::info!(
            "  athena:  database={}, workgroup={}, output={}",
            self.athena.database,
            self.athena.workgroup.as_deref().unwrap_or("(service default)"),
            self.athena.output_location
        );
        tracing::info!(
            "  polling: interval={}ms, timeout={}",
            self.athena.poll_interval_ms,
            self.athena
                .timeout_seconds
                .map(|s| format!("{s}s"))
                .unwrap_or_else(|| "none".to_string())
        );
        tracing::info!("  output:  {}", self.output_file.display());
    }
}

// ── AWS ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    /// Named credential profile, resolved by the AWS shared config files.
    pub profile: String,
    /// Region override; `None` lets the profile decide.
    pub region: Option<String>,
    /// Custom endpoint (LocalStack, MinIO).
    pub endpoint_url: Option<String>,
}

impl AwsConfig {
    fn from_env_prefixed(p: &str) -> Self {
        Self {
            profile: prefixed_env_or(p, "AWS_PROFILE", DEFAULT_AWS_PROFILE),
            region: prefixed_env_opt(p, "AWS_REGION"),
            endpoint_url: prefixed_env_opt(p, "AWS_ENDPOINT_URL"),
        }
    }
}

// ── Athena ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AthenaConfig {
    pub database: String,
    /// Athena workgroup; `None` uses the account's default (`primary`).
    pub workgroup: Option<String>,
    /// Raw S3 result location; validated by the caller via `OutputLocation::parse`.
    pub output_location: String,
    pub poll_interval_ms: u64,
    /// Give up (and cancel the execution) after this many seconds. `None` = wait forever.
    pub timeout_seconds: Option<u64>,
}

impl AthenaConfig {
    fn from_env_prefixed(p: &str) -> Self {
        Self {
            database: prefixed_env_or(p, "ATHENA_DATABASE", DEFAULT_DATABASE),
            workgroup: prefixed_env_opt(p, "ATHENA_WORKGROUP"),
            output_location: prefixed_env_or(p, "ATHENA_OUTPUT_LOCATION", DEFAULT_OUTPUT_LOCATION),
            poll_interval_ms: prefixed_env_u64(p, "ATHENA_POLL_INTERVAL_MS")
                .unwrap_or(DEFAULT_POLL_INTERVAL_MS),
            timeout_seconds: prefixed_env_u64(p, "ATHENA_TIMEOUT_SECONDS"),
        }
    }
}
