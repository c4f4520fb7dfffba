// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod global;
mod loader;
pub mod consts;

pub use global::{global, override_global, set_global, ConfigOverride};
pub use loader::{
    load_and_validate_config, load_config, Config, DatabaseOptions, DispatcherKind,
    ExecutorOptions, ModelfitOptions,
};
