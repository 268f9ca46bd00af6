use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub email: EmailSettings,
    pub media: MediaSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    /// Public address of the web client, used to build links sent by email.
    pub app_url: String,
    /// Allowed CORS origin, `*` allows any.
    pub frontend_url: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub user_name: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database_name: String,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
}

fn default_acquire_timeout() -> u64 {
    5
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.user_name, self.password, self.host, self.port, self.database_name
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}",
            self.user_name, self.password, self.host, self.port
        )
    }
}

#[derive(Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings").field("secret", &"****").finish()
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct EmailSettings {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub user_name: String,
    pub password: String,
    pub sender: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct MediaSettings {
    pub enabled: bool,
    pub bucket: String,
    pub region: String,
    pub endpoint_url: String,
    /// Prefix shared by every object URL this bucket serves.
    pub public_base_url: String,
    pub access_key: String,
    pub secret_key: String,
}

/// Reads `<filename>.json`, then applies `APP__SECTION__KEY` environment
/// overrides. `JWT_SECRET`, when set, always wins over the file.
pub fn get_configuration(filename: &str) -> Result<Settings, config::ConfigError> {
    let builder = Config::builder()
        .add_source(File::new(filename, FileFormat::Json))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?;
    let config = builder.build()?;
    config.try_deserialize()
}
