use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::ProductFilters;
use crate::login::LoginOptions;

const SECRETS_DIR_ENV: &str = "STOREFRONT_SECRETS_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorefrontSettings {
    pub application: ApplicationSettings,
    pub backend: BackendSettings,
    pub identity: IdentitySettings,
    pub cookies: CookieSettings,
    pub otp: OtpSettings,
    pub catalog: CatalogSettings,
    pub logging: LoggingSettings,
    pub storage: StorageSettings,
    pub visitors: VisitorSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentitySettings {
    // Direct values (can be overridden by environment variables)
    pub google_client_id: Option<String>,
    pub facebook_app_id: Option<String>,

    // Environment variable names for overrides
    pub google_client_id_env: Option<String>,
    pub facebook_app_id_env: Option<String>,

    pub facebook_api_version: String,
    pub google_script_url: String,
    pub facebook_script_url: String,
    pub facebook_graph_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieSettings {
    pub secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OtpSettings {
    pub countdown_seconds: u32,
    pub auto_submit_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub price_debounce_ms: u64,
    pub default_min_price: f64,
    pub default_max_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageSettings {
    /// JSON file backing the email account registry; in memory when unset
    pub registry_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisitorSettings {
    /// Visitors unseen for this long are dropped by the sweeper
    pub idle_timeout_secs: u64,
    pub sweep_interval_secs: u64,
    /// Hard ceiling on tracked visitors; the least recently seen go first
    pub max_visitors: usize,
}

impl Default for VisitorSettings {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 1800,
            sweep_interval_secs: 60,
            max_visitors: 10_000,
        }
    }
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: "http://localhost:3000,http://localhost:8080".to_string(),
        }
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api/v1/".to_string(),
        }
    }
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            google_client_id: None,
            facebook_app_id: None,
            google_client_id_env: None,
            facebook_app_id_env: None,
            facebook_api_version: "v18.0".to_string(),
            google_script_url: "https://accounts.google.com/gsi/client".to_string(),
            facebook_script_url: "https://connect.facebook.net/en_US/sdk.js".to_string(),
            facebook_graph_url: "https://graph.facebook.com".to_string(),
        }
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self { secure: true }
    }
}

impl Default for OtpSettings {
    fn default() -> Self {
        Self {
            countdown_seconds: 60,
            auto_submit_delay_ms: 100,
        }
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            price_debounce_ms: 300,
            default_min_price: 0.0,
            default_max_price: 10_000.0,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl StorefrontSettings {
    /// Load settings from configuration files and environment variables,
    /// then start the logger at `logging.level`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A settings file cannot be read
    /// - TOML parsing fails
    /// - Logger initialization fails
    pub fn load() -> anyhow::Result<Self> {
        Self::load_env_file();

        let (mut settings, sources) = Self::load_base_settings()?;
        Self::apply_env_overrides(&mut settings);

        init_logger(&settings.logging)?;
        for source in &sources {
            log::info!("Loaded settings from {}", source.display());
        }
        log::info!("Log level: {}", settings.logging.level);

        Ok(settings)
    }

    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading base settings)
    /// 2. Settings.toml in `STOREFRONT_SECRETS_DIR` (if specified and exists)
    /// 3. Settings.toml in current directory (if exists)
    /// 4. Default settings
    ///
    /// Runs before the logger exists, so the files read are returned for logging.
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file cannot be read or parsed
    fn load_base_settings() -> anyhow::Result<(Self, Vec<PathBuf>)> {
        let mut settings = Self::default();
        let mut sources = Vec::new();

        let default_config_path = PathBuf::from("Settings.toml");
        if default_config_path.exists() {
            settings = Self::from_toml(&fs::read_to_string(&default_config_path)?)?;
            sources.push(default_config_path);
        }

        if let Ok(secrets_dir) = std::env::var(SECRETS_DIR_ENV) {
            let secrets_path = Path::new(&secrets_dir).join("Settings.toml");
            if secrets_path.exists() {
                settings = Self::from_toml(&fs::read_to_string(&secrets_path)?)?;
                sources.push(secrets_path);
            } else {
                eprintln!(
                    "{SECRETS_DIR_ENV} set but no Settings.toml found at: {}",
                    secrets_path.display()
                );
            }
        }

        Ok((settings, sources))
    }

    /// Parse a Settings.toml document; missing sections and keys take their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if `content` is not valid TOML for these settings
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(basic_toml::from_str(content)?)
    }

    fn apply_env_overrides(settings: &mut Self) {
        Self::apply_application_env_overrides(&mut settings.application);
        Self::apply_backend_env_overrides(&mut settings.backend);
        Self::apply_identity_env_overrides(&mut settings.identity);
        Self::apply_cookie_env_overrides(&mut settings.cookies);
        Self::apply_logging_env_overrides(&mut settings.logging);
    }

    fn apply_application_env_overrides(app_settings: &mut ApplicationSettings) {
        if let Ok(host) = std::env::var("HOST") {
            app_settings.host = host;
        }
        if let Ok(port_str) = std::env::var("PORT") {
            if let Ok(port) = port_str.parse::<u16>() {
                app_settings.port = port;
            }
        }
        if let Ok(cors_origins) = std::env::var("CORS_ORIGINS") {
            app_settings.cors_origins = cors_origins;
        }
    }

    fn apply_backend_env_overrides(backend_settings: &mut BackendSettings) {
        if let Ok(base_url) = std::env::var("BACKEND_BASE_URL") {
            backend_settings.base_url = base_url;
        }
    }

    pub fn apply_identity_env_overrides(identity_settings: &mut IdentitySettings) {
        if let Some(client_id) = non_empty_env("GOOGLE_CLIENT_ID") {
            identity_settings.google_client_id = Some(client_id);
        }
        if let Some(app_id) = non_empty_env("FACEBOOK_APP_ID") {
            identity_settings.facebook_app_id = Some(app_id);
        }
    }

    fn apply_cookie_env_overrides(cookie_settings: &mut CookieSettings) {
        if let Ok(cookie_secure_str) = std::env::var("COOKIE_SECURE") {
            if let Ok(cookie_secure) = cookie_secure_str.parse::<bool>() {
                cookie_settings.secure = cookie_secure;
            }
        }
    }

    fn apply_logging_env_overrides(logging_settings: &mut LoggingSettings) {
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            logging_settings.level = log_level;
        }
    }

    fn load_env_file() {
        if let Ok(contents) = std::fs::read_to_string(".env") {
            for line in contents.lines() {
                let line = line.trim();
                if line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    std::env::set_var(key.trim(), value.trim());
                }
            }
        }
    }

    #[must_use]
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }

    #[must_use]
    pub fn get_cors_origins(&self) -> Vec<String> {
        self.application
            .cors_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    #[must_use]
    pub fn login_options(&self) -> LoginOptions {
        LoginOptions {
            countdown_seconds: self.otp.countdown_seconds,
            auto_submit_delay: Duration::from_millis(self.otp.auto_submit_delay_ms),
        }
    }

    /// Filters every new visitor's listing starts from
    #[must_use]
    pub fn initial_filters(&self) -> ProductFilters {
        ProductFilters::new(self.catalog.default_min_price, self.catalog.default_max_price)
    }

    #[must_use]
    pub const fn price_debounce(&self) -> Duration {
        Duration::from_millis(self.catalog.price_debounce_ms)
    }

    #[must_use]
    pub const fn visitor_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.visitors.idle_timeout_secs)
    }

    #[must_use]
    pub const fn visitor_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.visitors.sweep_interval_secs)
    }
}

impl IdentitySettings {
    /// The Google client ID, checking the named environment variable first
    #[must_use]
    pub fn get_google_client_id(&self) -> String {
        resolve(self.google_client_id_env.as_deref(), self.google_client_id.as_ref())
    }

    /// The Facebook app ID, checking the named environment variable first
    #[must_use]
    pub fn get_facebook_app_id(&self) -> String {
        resolve(self.facebook_app_id_env.as_deref(), self.facebook_app_id.as_ref())
    }

    /// Graph API root including the version, e.g. `https://graph.facebook.com/v18.0`
    #[must_use]
    pub fn graph_api_base(&self) -> String {
        format!(
            "{}/{}",
            self.facebook_graph_url.trim_end_matches('/'),
            self.facebook_api_version
        )
    }
}

/// `env_logger` filtered by `logging.level`, which already carries `RUST_LOG` when set
fn logger_builder(logging: &LoggingSettings) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(&logging.level);
    if let Ok(style) = std::env::var("RUST_LOG_STYLE") {
        builder.parse_write_style(&style);
    }
    builder
}

fn init_logger(logging: &LoggingSettings) -> anyhow::Result<()> {
    logger_builder(logging).try_init()?;
    Ok(())
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn resolve(env_name: Option<&str>, direct: Option<&String>) -> String {
    env_name
        .and_then(non_empty_env)
        .or_else(|| direct.cloned())
        .unwrap_or_default()
}
