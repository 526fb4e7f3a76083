use std::env;
use std::path::PathBuf;

/// Runtime settings, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Path of the source CSV export.
    pub data_path: PathBuf,
    /// Port the HTTP service binds to.
    pub port: u16,
    /// Upper bound on one response body chunk.
    pub chunk_bytes: usize,
}

pub const DEFAULT_DATA_PATH: &str = "data-to-visualize/Electric_Vehicle_Population_Data.csv";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_CHUNK_BYTES: usize = 64 * 1024;

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            port: DEFAULT_PORT,
            chunk_bytes: DEFAULT_CHUNK_BYTES,
        }
    }
}

impl ServiceConfig {
    /// `EVDASH_DATA_PATH`, `PORT` and `EVDASH_CHUNK_BYTES`, each falling back
    /// to its default when unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_path: env::var("EVDASH_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            chunk_bytes: env::var("EVDASH_CHUNK_BYTES")
                .ok()
                .and_then(|c| c.parse().ok())
                .filter(|&c| c > 0)
                .unwrap_or(defaults.chunk_bytes),
        }
    }
}
