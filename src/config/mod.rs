use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

use crate::domain::Role;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub announcements: AnnouncementConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Bearer token handed over by whatever performed the login.
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SessionConfig {
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnnouncementConfig {
    pub admin_page_limit: u32,
    pub recent_count: usize,
}

impl Default for AnnouncementConfig {
    fn default() -> Self {
        Self {
            admin_page_limit: DEFAULT_ADMIN_PAGE_LIMIT,
            recent_count: DEFAULT_RECENT_COUNT,
        }
    }
}

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_ADMIN_PAGE_LIMIT: u32 = 100;
pub const DEFAULT_RECENT_COUNT: usize = 5;

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("api.base_url", DEFAULT_BASE_URL)?
            .set_default("api.timeout_secs", DEFAULT_TIMEOUT_SECS as i64)?
            .set_default("session.role", "student")?
            .set_default("announcements.admin_page_limit", DEFAULT_ADMIN_PAGE_LIMIT as i64)?
            .set_default("announcements.recent_count", DEFAULT_RECENT_COUNT as i64)?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with SANCTUM__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("SANCTUM").separator("__"))

            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
                token: None,
            },
            session: SessionConfig { role: Role::Student },
            announcements: AnnouncementConfig::default(),
        }
    }
}
