use axum_helpers::JwtConfig;
use core_config::{AppInfo, FromEnv, app_info, env_optional, env_or_default, server::ServerConfig};
use database::mongodb::MongoConfig;
use std::fmt;

pub use core_config::Environment;

const DEFAULT_ADMIN_NAME: &str = "Main Admin";

/// Application configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub environment: Environment,
    /// Main admin ensured at startup
    pub admin: Option<AdminSeed>,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            app: app_info!(),
            mongodb: MongoConfig::from_env()?,
            server: ServerConfig::from_env()?,
            jwt: JwtConfig::from_env()?,
            environment: Environment::from_env(),
            admin: AdminSeed::from_env(),
        })
    }
}

/// Bootstrap credentials for the first `MAIN_ADMIN`.
///
/// - `ADMIN_EMAIL` and `ADMIN_PASSWORD` (both needed, otherwise no seed)
/// - `ADMIN_NAME` (default "Main Admin")
#[derive(Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl AdminSeed {
    fn from_env() -> Option<Self> {
        let email = env_optional("ADMIN_EMAIL")?;
        let password = env_optional("ADMIN_PASSWORD")?;

        Some(Self {
            email,
            password,
            name: env_or_default("ADMIN_NAME", DEFAULT_ADMIN_NAME),
        })
    }
}

impl fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSeed")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .field("name", &self.name)
            .finish()
    }
}
