//! Process configuration, loaded from the environment (optionally via a
//! `.env` file picked up in `main`).

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = match std::env::var("SERVER_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("invalid SERVER_PORT {:?}: {}", raw, e))?,
            Err(_) => 8080,
        };
        Ok(Self {
            server: ServerConfig { host, port },
        })
    }
}
