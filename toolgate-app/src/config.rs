use std::path::PathBuf;

/// Gateway process configuration, read from the environment. Adapter
/// credentials are not here: each adapter reads its own at load time.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub file_root: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let host = std::env::var("TOOLGATE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let file_root = std::env::var("FILE_MANAGER_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/files"));
        Self {
            host,
            port,
            file_root,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
