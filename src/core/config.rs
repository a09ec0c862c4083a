use std::env;
use std::time::Duration;

use url::Url;

pub const DEFAULT_IDENTITY_API_BASE_URL: &str = "https://identitytoolkit.googleapis.com";
pub const DEFAULT_PROFILE_STORE_BASE_URL: &str = "https://firestore.googleapis.com";
pub const DEFAULT_PROFILE_COLLECTION: &str = "users";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Which collaborator implementations the process wires up at start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Firebase,
    /// Process-local maps; state is lost when the runtime recycles the process.
    Memory,
}

#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    pub project_id: String,
    /// OAuth bearer token from `GOOGLE_ACCESS_TOKEN`, read once at process start.
    ///
    /// Google access tokens expire after about an hour and nothing here
    /// refreshes them, so a process that outlives its token answers every call
    /// with `UpstreamFailure`. Deployments must rotate the environment (or
    /// recycle the function) within the token lifetime.
    pub access_token: String,
    pub identity_base_url: Url,
    pub profile_store_base_url: Url,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: Backend,
    pub firebase: Option<FirebaseConfig>,
    pub profile_collection: String,
    pub upstream_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests don't have to
    /// mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup("ADMIN_BACKEND").as_deref() {
            None | Some("firebase") => Backend::Firebase,
            Some("memory") => Backend::Memory,
            Some(other) => return Err(format!("ADMIN_BACKEND: unknown backend '{other}'")),
        };

        let firebase = match backend {
            Backend::Firebase => Some(FirebaseConfig {
                project_id: required(&lookup, "FIREBASE_PROJECT_ID")?,
                access_token: required(&lookup, "GOOGLE_ACCESS_TOKEN")?,
                identity_base_url: base_url(
                    &lookup,
                    "IDENTITY_API_BASE_URL",
                    DEFAULT_IDENTITY_API_BASE_URL,
                )?,
                profile_store_base_url: base_url(
                    &lookup,
                    "PROFILE_STORE_BASE_URL",
                    DEFAULT_PROFILE_STORE_BASE_URL,
                )?,
            }),
            Backend::Memory => None,
        };

        let upstream_timeout = match lookup("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(0) => return Err("UPSTREAM_TIMEOUT_SECS: must be greater than zero".to_string()),
                Ok(secs) => Duration::from_secs(secs),
                Err(e) => return Err(format!("UPSTREAM_TIMEOUT_SECS: {}", e)),
            },
            None => Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        };

        Ok(Self {
            backend,
            firebase,
            profile_collection: lookup("PROFILE_COLLECTION")
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_PROFILE_COLLECTION.to_string()),
            upstream_timeout,
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| format!("{}: environment variable not set", key))
}

fn base_url<F>(lookup: &F, key: &str, default: &str) -> Result<Url, String>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    Url::parse(&raw).map_err(|e| format!("{}: {}", key, e))
}
