//! Live configuration store.
//!
//! `ConfigStore` owns the current [`DebugConfig`] snapshot and publishes a new
//! snapshot to every subscriber on each mutation. Readers only ever see whole
//! snapshots; mutators are read-modify-write against the latest one.

use crate::config::preferences::{MemoryPreferences, PreferencesStore};
use crate::mocks::{MockSet, RequestMock, ResponseMock};
use crate::types::{DebugConfig, Environment, TimeoutOverrides};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use tokio::sync::watch;

/// Preference key holding the selected environment name
pub const KEY_CURRENT_ENV: &str = "debug_current_env";
/// Preference key holding the custom base URL
pub const KEY_CUSTOM_URL: &str = "debug_custom_url";

type EnvironmentListener = Arc<dyn Fn(Environment) + Send + Sync>;

pub struct ConfigStore {
    sender: watch::Sender<Arc<DebugConfig>>,
    preferences: Arc<dyn PreferencesStore>,
    environment_listener: RwLock<Option<EnvironmentListener>>,
}

impl ConfigStore {
    /// Store with default configuration and in-memory preferences.
    pub fn new() -> Self {
        Self::with_preferences(Arc::new(MemoryPreferences::new()))
    }

    pub fn with_preferences(preferences: Arc<dyn PreferencesStore>) -> Self {
        Self::with_config(DebugConfig::default(), preferences)
    }

    pub fn with_config(config: DebugConfig, preferences: Arc<dyn PreferencesStore>) -> Self {
        let (sender, _) = watch::channel(Arc::new(config));
        Self {
            sender,
            preferences,
            environment_listener: RwLock::new(None),
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<DebugConfig> {
        Arc::clone(&self.sender.borrow())
    }

    /// Receiver of every future snapshot; the current one is marked as seen.
    pub fn subscribe(&self) -> watch::Receiver<Arc<DebugConfig>> {
        self.sender.subscribe()
    }

    fn update(&self, modify: impl FnOnce(&mut DebugConfig)) {
        self.sender.send_modify(|config| modify(Arc::make_mut(config)));
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.update(|c| c.enabled = enabled);
    }

    pub fn set_response_mocking_enabled(&self, enabled: bool) {
        self.update(|c| c.response_mocking_enabled = enabled);
    }

    pub fn set_offline_mode(&self, enabled: bool) {
        self.update(|c| c.offline_mode = enabled);
    }

    pub fn set_throttle(&self, throttle_ms: u64) {
        self.update(|c| c.throttle_ms = throttle_ms);
    }

    /// Apply a throttle typed by a user; anything but a non-negative integer is ignored.
    ///
    /// Returns whether the value was accepted.
    pub fn set_throttle_input(&self, input: &str) -> bool {
        match input.trim().parse::<u64>() {
            Ok(ms) => {
                self.set_throttle(ms);
                true
            }
            Err(_) => {
                tracing::debug!(input, "ignoring non-numeric throttle input");
                false
            }
        }
    }

    pub fn set_timeout_overrides(&self, request_ms: u64, connect_ms: u64, socket_ms: u64) {
        self.update(|c| {
            c.timeouts = TimeoutOverrides {
                request_ms,
                connect_ms,
                socket_ms,
            }
        });
    }

    pub fn update_global_headers(&self, headers: HashMap<String, String>) {
        self.update(|c| c.global_headers = headers);
    }

    pub fn add_request_mock(&self, mock: RequestMock) {
        self.update(|c| c.request_mocks.push(mock));
    }

    /// Replace the request mock with the same id; unknown ids are ignored.
    pub fn update_request_mock(&self, mock: RequestMock) {
        self.update(|c| {
            if let Some(existing) = c.request_mocks.iter_mut().find(|m| m.id == mock.id) {
                *existing = mock;
            }
        });
    }

    pub fn remove_request_mock(&self, id: &str) {
        self.update(|c| c.request_mocks.retain(|m| m.id != id));
    }

    /// Append a response mock, dropping any existing mock for the same pattern and method.
    pub fn add_response_mock(&self, mock: ResponseMock) {
        self.update(|c| insert_response_mock(&mut c.response_mocks, mock));
    }

    /// Replace the response mock with the same id; unknown ids are ignored.
    pub fn update_response_mock(&self, mock: ResponseMock) {
        self.update(|c| {
            if let Some(existing) = c.response_mocks.iter_mut().find(|m| m.id == mock.id) {
                *existing = mock;
            }
        });
    }

    pub fn remove_response_mock(&self, id: &str) {
        self.update(|c| c.response_mocks.retain(|m| m.id != id));
    }

    /// Drop every mock and every global header.
    pub fn clear_all_mocks(&self) {
        self.update(|c| {
            c.request_mocks.clear();
            c.response_mocks.clear();
            c.global_headers.clear();
        });
    }

    /// Add all rules from a mock file in one snapshot.
    pub fn apply_mock_set(&self, set: MockSet) {
        self.update(|c| {
            c.request_mocks.extend(set.request_mocks);
            for mock in set.response_mocks {
                insert_response_mock(&mut c.response_mocks, mock);
            }
            c.global_headers.extend(set.global_headers);
        });
    }

    /// Register the callback told about effective environment changes.
    pub fn on_environment_change(&self, listener: impl Fn(Environment) + Send + Sync + 'static) {
        let mut slot = self
            .environment_listener
            .write()
            .unwrap_or_else(|e| e.into_inner());
        *slot = Some(Arc::new(listener));
    }

    fn notify_environment(&self, environment: Environment) {
        let listener = self
            .environment_listener
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        if let Some(listener) = listener {
            listener(environment);
        }
    }

    fn persist(&self, key: &str, value: &str) {
        if let Err(err) = self.preferences.set(key, value) {
            tracing::warn!(key, error = %err, "failed to persist preference");
        }
    }

    pub fn update_environment(&self, environment: Environment) {
        self.update(|c| c.environment.current_environment = environment.name().to_owned());
        self.persist(KEY_CURRENT_ENV, environment.name());
        tracing::info!(environment = environment.name(), "environment changed");
        self.notify_environment(environment);
    }

    pub fn set_custom_base_url(&self, url: impl Into<String>) {
        let url = url.into();
        self.persist(KEY_CUSTOM_URL, &url);
        self.update(|c| c.environment.custom_base_url = url);
        if self.snapshot().environment.current_environment() == Environment::Custom {
            self.notify_environment(Environment::Custom);
        }
    }

    /// Base URL of the currently selected environment.
    pub fn base_url(&self) -> String {
        self.snapshot().environment.base_url().to_owned()
    }

    /// Restore the persisted environment selection and custom URL.
    ///
    /// Always ends by notifying the listener with the effective environment.
    pub fn load_persisted_config(&self) {
        let saved = match self.preferences.get_all() {
            Ok(saved) => saved,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read persisted preferences");
                HashMap::new()
            }
        };

        self.update(|c| {
            if let Some(url) = saved.get(KEY_CUSTOM_URL) {
                c.environment.custom_base_url = url.clone();
            }
            if let Some(env) = saved.get(KEY_CURRENT_ENV) {
                c.environment.current_environment = env.clone();
            }
        });

        let environment = self.snapshot().environment.current_environment();
        tracing::debug!(environment = environment.name(), "loaded persisted config");
        self.notify_environment(environment);
    }
}

fn insert_response_mock(mocks: &mut Vec<ResponseMock>, mock: ResponseMock) {
    mocks.retain(|existing| !existing.same_target(&mock));
    mocks.push(mock);
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigStore")
            .field("config", &*self.sender.borrow())
            .finish_non_exhaustive()
    }
}
