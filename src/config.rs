use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub identity_jwt_secret: String,
    pub storage_signing_key: String,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub storage_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub page_size: i64,
    pub signed_url_ttl: Duration,
    pub storage_timeout: Duration,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let identity_jwt_secret = env_required("IDENTITY_JWT_SECRET")?;
        let storage_signing_key = env_required("STORAGE_SIGNING_KEY")?;

        let host: IpAddr = env_or("REPORT_DESK_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid REPORT_DESK_HOST: {e}"))?;

        let port: u16 = env_or("REPORT_DESK_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid REPORT_DESK_PORT: {e}"))?;

        let base_url = env_or("REPORT_DESK_BASE_URL", &format!("http://{host}:{port}"))
            .trim_end_matches('/')
            .to_string();

        let storage_dir = PathBuf::from(env_or("REPORT_DESK_STORAGE_DIR", "./data/reports"));

        let max_upload_bytes: usize = env_or("REPORT_DESK_MAX_UPLOAD_BYTES", "10485760")
            .parse()
            .map_err(|e| format!("Invalid REPORT_DESK_MAX_UPLOAD_BYTES: {e}"))?;

        let page_size: i64 = env_or("REPORT_DESK_PAGE_SIZE", "10")
            .parse()
            .map_err(|e| format!("Invalid REPORT_DESK_PAGE_SIZE: {e}"))?;
        if page_size < 1 {
            return Err("REPORT_DESK_PAGE_SIZE must be at least 1".to_string());
        }

        let signed_url_ttl = env_secs("REPORT_DESK_SIGNED_URL_TTL_SECS", "300")?;
        let storage_timeout = env_secs("REPORT_DESK_STORAGE_TIMEOUT_SECS", "30")?;

        let log_level = env_or("REPORT_DESK_LOG_LEVEL", "info");

        Ok(Config {
            database_url,
            identity_jwt_secret,
            storage_signing_key,
            host,
            port,
            base_url,
            storage_dir,
            max_upload_bytes,
            page_size,
            signed_url_ttl,
            storage_timeout,
            log_level,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_secs(key: &str, default: &str) -> Result<Duration, String> {
    env_or(key, default)
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| format!("Invalid {key}: {e}"))
}
