//! Environment and session configuration.
//!
//! The session config is an explicit value threaded through every operation
//! that needs it; there is no module-global editor state.

use std::env;

pub const DEFAULT_TAB_STOP: usize = 8;
pub const DEFAULT_QUIT_TIMES: u32 = 3;

/// Per-session editing knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorConfig {
    /// Column interval a tab always advances to (see the render projection).
    pub tab_stop: usize,
    /// Consecutive quit presses required to discard unsaved changes.
    pub quit_times: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_stop: DEFAULT_TAB_STOP,
            quit_times: DEFAULT_QUIT_TIMES,
        }
    }
}

impl EditorConfig {
    pub fn from_env(env: &EnvConfig) -> Self {
        let mut config = Self::default();
        if let Some(tab_stop) = env.tab_stop {
            config.tab_stop = tab_stop;
        }
        config
    }
}

/// Values read from the process environment at startup.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    /// Log file path; logging stays off without it so the raw-mode screen is
    /// never written to by a subscriber.
    pub log_file: Option<String>,
    pub tab_stop: Option<usize>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            log_file: env_string_opt("JOT_LOG"),
            tab_stop: env_usize_opt("JOT_TAB_STOP"),
        }
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

fn env_usize_opt(key: &str) -> Option<usize> {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|value| *value > 0)
}
