//! Debugger configuration snapshot.

use crate::mocks::{RequestMock, ResponseMock};
use crate::types::environment::EnvironmentConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Timeout overrides in milliseconds. `0` keeps the host default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeoutOverrides {
    pub request_ms: u64,
    pub connect_ms: u64,
    pub socket_ms: u64,
}

impl TimeoutOverrides {
    pub fn request_timeout(&self) -> Option<Duration> {
        non_zero(self.request_ms)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        non_zero(self.connect_ms)
    }

    pub fn socket_timeout(&self) -> Option<Duration> {
        non_zero(self.socket_ms)
    }
}

fn non_zero(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

/// Immutable snapshot of everything the interception pipeline reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DebugConfig {
    /// Master switch for response mocking and header injection
    pub enabled: bool,
    pub response_mocking_enabled: bool,
    /// Abort every call before transmission
    pub offline_mode: bool,
    pub throttle_ms: u64,
    /// Header overrides; every matching rule applies
    pub request_mocks: Vec<RequestMock>,
    /// Full response substitutions; first match wins
    pub response_mocks: Vec<ResponseMock>,
    pub global_headers: HashMap<String, String>,
    pub timeouts: TimeoutOverrides,
    pub environment: EnvironmentConfig,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            response_mocking_enabled: true,
            offline_mode: false,
            throttle_ms: 0,
            request_mocks: Vec::new(),
            response_mocks: Vec::new(),
            global_headers: HashMap::new(),
            timeouts: TimeoutOverrides::default(),
            environment: EnvironmentConfig::default(),
        }
    }
}

impl DebugConfig {
    pub fn throttle(&self) -> Option<Duration> {
        non_zero(self.throttle_ms)
    }

    /// Whether response mocks are consulted at all.
    pub fn mocking_active(&self) -> bool {
        self.enabled && self.response_mocking_enabled
    }
}
