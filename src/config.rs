use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub log_snapshot: bool,  // dump tables at startup
}

#[derive(Debug, Deserialize, Clone)]
pub struct LimitsConfig {
    pub max_body_size: usize,  // in bytes
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("database.url", "sqlite://tasks.db")?
            .set_default("database.max_connections", 5)?
            .set_default("database.log_snapshot", true)?
            .set_default("limits.max_body_size", 64 * 1024)?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .build()?;

        config.try_deserialize()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
