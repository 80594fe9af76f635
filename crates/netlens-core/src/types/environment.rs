//! Backend environment selection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend environment the host application talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Environment {
    Production,
    PreProduction,
    Local,
    Custom,
}

impl Environment {
    pub const ALL: [Environment; 4] = [
        Environment::Production,
        Environment::PreProduction,
        Environment::Local,
        Environment::Custom,
    ];

    /// Stable name used for persistence.
    pub fn name(self) -> &'static str {
        match self {
            Environment::Production => "PRODUCTION",
            Environment::PreProduction => "PRE_PRODUCTION",
            Environment::Local => "LOCAL",
            Environment::Custom => "CUSTOM",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Environment::Production => "Production",
            Environment::PreProduction => "Pre-production",
            Environment::Local => "Local",
            Environment::Custom => "Custom",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|env| env.name() == name)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Base URLs per environment plus the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnvironmentConfig {
    /// Name of the selected environment; unknown names resolve to production
    pub current_environment: String,
    pub custom_base_url: String,
    pub production_url: String,
    pub pre_production_url: String,
    pub local_url: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            current_environment: Environment::Production.name().to_owned(),
            custom_base_url: String::new(),
            production_url: "https://api.example.com".to_owned(),
            pre_production_url: "https://preprod-api.example.com".to_owned(),
            local_url: "http://localhost:8080".to_owned(),
        }
    }
}

impl EnvironmentConfig {
    pub fn current_environment(&self) -> Environment {
        Environment::from_name(&self.current_environment).unwrap_or(Environment::Production)
    }

    pub fn base_url(&self) -> &str {
        match self.current_environment() {
            Environment::Production => &self.production_url,
            Environment::PreProduction => &self.pre_production_url,
            Environment::Local => &self.local_url,
            Environment::Custom => &self.custom_base_url,
        }
    }
}
