use crate::store::FileRetention;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppMode {
    Development,
    Testing,
    Production,
}

impl FromStr for AppMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(AppMode::Development),
            "testing" | "test" => Ok(AppMode::Testing),
            "production" | "prod" => Ok(AppMode::Production),
            other => Err(format!("Unknown APP_MODE: {}", other)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub mode: AppMode,
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub public_base_url: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub file_retention: FileRetention,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = match lookup("APP_MODE") {
            Some(value) => value.parse()?,
            None => AppMode::Development,
        };

        let database_url = match (lookup("DATABASE_URL"), mode) {
            (Some(url), _) => url,
            (None, AppMode::Development) => "tuneful.db".to_string(),
            (None, AppMode::Testing) => "tuneful-test.db".to_string(),
            (None, AppMode::Production) => {
                return Err("DATABASE_URL must be set in production".to_string())
            }
        };

        let upload_dir = lookup("UPLOAD_FOLDER").unwrap_or_else(|| match mode {
            AppMode::Testing => "test-uploads".to_string(),
            _ => "uploads".to_string(),
        });

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = lookup("PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse()
            .map_err(|_| "PORT must be a valid u16".to_string())?;

        let public_base_url = lookup("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();

        let max_upload_bytes = lookup("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|| "104857600".to_string())
            .parse()
            .map_err(|_| "MAX_UPLOAD_BYTES must be a valid usize".to_string())?;

        let cascade: bool = lookup("SONG_DELETE_CASCADE")
            .unwrap_or_else(|| "false".to_string())
            .parse()
            .map_err(|_| "SONG_DELETE_CASCADE must be true or false".to_string())?;

        Ok(Self {
            mode,
            database_url,
            host,
            port,
            public_base_url,
            upload_dir: PathBuf::from(upload_dir),
            max_upload_bytes,
            file_retention: if cascade {
                FileRetention::Cascade
            } else {
                FileRetention::Retain
            },
        })
    }

    /// Testing configuration keeping the database and uploads under `root`.
    pub fn testing(root: &Path) -> Self {
        Self {
            mode: AppMode::Testing,
            database_url: root.join("tuneful-test.db").to_string_lossy().into_owned(),
            host: "127.0.0.1".to_string(),
            port: 0,
            public_base_url: "http://localhost:8080".to_string(),
            upload_dir: root.join("test-uploads"),
            max_upload_bytes: 1048576,
            file_retention: FileRetention::Retain,
        }
    }
}
