// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Process-wide configuration.
//!
//! Loaded lazily from the file named by `PHARMFLOW_CONFIG`; a missing or
//! broken file falls back to defaults with a warning.

use crate::config::consts::CONFIG_ENV_VAR;
use crate::config::{load_and_validate_config, Config};
use crate::observability::messages::config::{ConfigFallback, ConfigLoaded};
use crate::observability::messages::StructuredLog;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError, RwLock};

static GLOBAL: LazyLock<RwLock<Arc<Config>>> = LazyLock::new(|| RwLock::new(Arc::new(load_from_env())));

/// Serializes overrides so tests that swap the configuration do not
/// interleave.
static OVERRIDE_LOCK: Mutex<()> = Mutex::new(());

fn load_from_env() -> Config {
    let Some(path) = std::env::var_os(CONFIG_ENV_VAR) else {
        return Config::default();
    };
    match load_and_validate_config(&path) {
        Ok(cfg) => {
            ConfigLoaded { path: &path }.log();
            cfg
        }
        Err(error) => {
            ConfigFallback { path: &path, error: &error }.log();
            Config::default()
        }
    }
}

/// Current configuration snapshot.
pub fn global() -> Arc<Config> {
    GLOBAL.read().unwrap_or_else(PoisonError::into_inner).clone()
}

pub fn set_global(cfg: Config) {
    *GLOBAL.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(cfg);
}

/// Swap in `cfg` until the returned guard is dropped.
pub fn override_global(cfg: Config) -> ConfigOverride {
    let serial = OVERRIDE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let previous = std::mem::replace(
        &mut *GLOBAL.write().unwrap_or_else(PoisonError::into_inner),
        Arc::new(cfg),
    );
    ConfigOverride {
        previous: Some(previous),
        _serial: serial,
    }
}

#[must_use = "the override ends when the guard is dropped"]
pub struct ConfigOverride {
    previous: Option<Arc<Config>>,
    _serial: MutexGuard<'static, ()>,
}

impl Drop for ConfigOverride {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            *GLOBAL.write().unwrap_or_else(PoisonError::into_inner) = previous;
        }
    }
}
