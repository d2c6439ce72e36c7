//! Cache tuning knobs, overridable through the environment.

use std::{env, time::Duration};

use tracing::warn;

/// Default window during which a successful entry is served without revalidation.
const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_secs(30);
/// Default quiescence period before a search term edit becomes a cache lookup.
const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);
/// Environment variable overriding the freshness window, in milliseconds.
const FRESHNESS_WINDOW_ENV: &str = "GAME_SHELF_FRESHNESS_MS";
/// Environment variable overriding the search debounce, in milliseconds.
const SEARCH_DEBOUNCE_ENV: &str = "GAME_SHELF_DEBOUNCE_MS";

/// Tuning for the query cache and the search debouncer.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    freshness_window: Duration,
    search_debounce: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            freshness_window: DEFAULT_FRESHNESS_WINDOW,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
        }
    }
}

impl CacheConfig {
    /// Build a configuration from the defaults plus any environment overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(window) = read_duration_ms(FRESHNESS_WINDOW_ENV) {
            config.freshness_window = window;
        }
        if let Some(debounce) = read_duration_ms(SEARCH_DEBOUNCE_ENV) {
            config.search_debounce = debounce;
        }
        config
    }

    /// Override the freshness window.
    pub fn with_freshness_window(mut self, window: Duration) -> Self {
        self.freshness_window = window;
        self
    }

    /// Override the search debounce quiescence period.
    pub fn with_search_debounce(mut self, debounce: Duration) -> Self {
        self.search_debounce = debounce;
        self
    }

    /// Window during which a successful entry is considered fresh.
    pub fn freshness_window(&self) -> Duration {
        self.freshness_window
    }

    /// Quiescence period applied to search term edits.
    pub fn search_debounce(&self) -> Duration {
        self.search_debounce
    }
}

/// Read a millisecond duration from the environment, ignoring unparseable values.
fn read_duration_ms(var: &'static str) -> Option<Duration> {
    let raw = env::var(var).ok()?;
    match raw.parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(err) => {
            warn!(var, value = %raw, error = %err, "ignoring unparseable duration override");
            None
        }
    }
}
