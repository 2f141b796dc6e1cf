//! Application state shared across handlers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ecommerce_hub_core::clock::{Clock, SystemClock};

use crate::catalog::Catalog;
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// configuration, the catalog and the time source.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create state using the wall clock and the demo catalog.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create state with an explicit time source.
    #[must_use]
    pub fn with_clock(config: StorefrontConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog: Catalog::demo(),
                clock,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Current time from the configured clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.inner.clock.now()
    }
}
