use std::path::PathBuf;

use clap::Parser;

/// Real-estate price prediction API.
#[derive(Debug, Clone, Parser)]
#[command(name = "real-estate-api", version, about)]
pub struct Config {
    /// Address to bind.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Worker threads; actix picks one per core when unset.
    #[arg(long, env = "WORKERS")]
    pub workers: Option<usize>,

    /// Artifact manifest (model path, district averages, training columns).
    #[arg(long, env = "ARTIFACTS_PATH", default_value = "artifacts/artifacts.json")]
    pub artifacts: PathBuf,

    /// Historical sales CSV used for the city directory.
    #[arg(
        long,
        env = "DATASET_PATH",
        default_value = "processed_turkish_house_sales.csv"
    )]
    pub dataset: PathBuf,
}

impl Config {
    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "real-estate-api",
            "--host",
            "0.0.0.0",
            "--port",
            "9000",
            "--workers",
            "2",
            "--artifacts",
            "/srv/model/artifacts.json",
            "--dataset",
            "/srv/data/sales.csv",
        ])
        .unwrap();

        assert_eq!(config.bind_address(), ("0.0.0.0".to_string(), 9000));
        assert_eq!(config.workers, Some(2));
        assert_eq!(config.artifacts, PathBuf::from("/srv/model/artifacts.json"));
        assert_eq!(config.dataset, PathBuf::from("/srv/data/sales.csv"));
    }

    #[test]
    fn rejects_invalid_port() {
        assert!(Config::try_parse_from(["real-estate-api", "--port", "http"]).is_err());
    }
}
