use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the hosted data platform, e.g. "https://abc.supabase.co".
    pub remote_url: String,
    /// Project API key sent as the `apikey` header on every request.
    pub remote_api_key: String,
    /// Bearer token for the signed-in session. Falls back to the API key
    /// when unset (anonymous access level).
    pub remote_access_token: Option<String>,
    pub request_timeout: Duration,

    /// Where the on-device mood cache lives.
    pub cache_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            remote_url: env::var("MINDZONE_REMOTE_URL").expect("MINDZONE_REMOTE_URL must be set"),
            remote_api_key: env::var("MINDZONE_API_KEY").expect("MINDZONE_API_KEY must be set"),
            remote_access_token: env::var("MINDZONE_ACCESS_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            request_timeout: Duration::from_secs(
                env::var("MINDZONE_REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".into())
                    .parse()
                    .expect("MINDZONE_REQUEST_TIMEOUT_SECS must be a number"),
            ),
            cache_path: env::var("MINDZONE_CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| Self::default_cache_path()),
        }
    }

    /// Default cache file location: `<platform data dir>/mindzone/moods.json`.
    pub fn default_cache_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mindzone")
            .join("moods.json")
    }
}
