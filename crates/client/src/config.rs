use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use buildboard_core::pagination::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a page request is spelled on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteStyle {
    /// `/builders/number={limit}/offset={offset}`
    #[default]
    PathSegments,
    /// `/data?limit={limit}&offset={offset}`
    Query,
}

impl FromStr for RouteStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path-segments" | "path" => Ok(Self::PathSegments),
            "query" => Ok(Self::Query),
            other => Err(ConfigError::UnknownRouteStyle(other.to_string())),
        }
    }
}

impl fmt::Display for RouteStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PathSegments => "path-segments",
            Self::Query => "query",
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("unknown route style: {0} (expected path-segments or query)")]
    UnknownRouteStyle(String),
}

/// Client settings. Every key is optional in the TOML file.
///
/// ```toml
/// base_url = "http://127.0.0.1:8080"
/// page_size = 20
/// route_style = "query"
/// request_timeout_ms = 5000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub page_size: u32,
    pub route_style: RouteStyle,
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            route_style: RouteStyle::PathSegments,
            request_timeout_ms: 10_000,
        }
    }
}

impl ClientConfig {
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&s).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
