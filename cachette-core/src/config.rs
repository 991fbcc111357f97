use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Process-wide key configuration.
///
/// `version` is mixed into every versioned digest. Bumping it changes every
/// versioned key at once, which invalidates all such entries without touching
/// the store.
///
/// # Examples
///
/// ```
/// use cachette_core::CacheConfig;
///
/// let config: CacheConfig = serde_json::from_str(r#"{ "version": 4 }"#).unwrap();
/// assert_eq!(config.version, 4);
/// assert_eq!(CacheConfig::default().version, 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub version: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { version: 1 }
    }
}

/// Deployment environment, used to silence verbose key logging in production.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl Environment {
    pub fn is_production_like(self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
        };
        f.write_str(name)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment `{}`", other)),
        }
    }
}
