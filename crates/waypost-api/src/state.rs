//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor. Every service shares one [`Ledger`], so the
//! coordinator and the lifecycle guard serialize on the same write lock.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use waypost_engine::{AssignmentCoordinator, InMemoryChannels, Ledger, LifecycleGuard};
use waypost_match::{CandidateFinder, GeoMatcher, DEFAULT_THRESHOLD_KM};

// ── Configuration ────────────────────────────────────────────────────────

/// Runtime configuration read from the environment.
///
/// Custom `Debug` redacts the auth token.
#[derive(Clone)]
pub struct AppConfig {
    /// Listen port (`PORT`, default 8080).
    pub port: u16,
    /// Bearer secret (`AUTH_TOKEN`). `None` disables auth.
    pub auth_token: Option<String>,
    /// Compatibility radius (`WAYPOST_MATCH_RADIUS_KM`, default 500).
    pub match_radius_km: f64,
    /// Emit JSON logs (`WAYPOST_LOG_FORMAT=json`).
    pub json_logs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
            match_radius_km: DEFAULT_THRESHOLD_KM,
            json_logs: false,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("match_radius_km", &self.match_radius_km)
            .field("json_logs", &self.json_logs)
            .finish()
    }
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for
    /// unset variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("PORT must be a port number, got {raw:?}: {e}"))?,
            None => defaults.port,
        };

        let match_radius_km = match lookup("WAYPOST_MATCH_RADIUS_KM") {
            Some(raw) => {
                let radius = raw.parse::<f64>().map_err(|e| {
                    anyhow::anyhow!("WAYPOST_MATCH_RADIUS_KM must be a number, got {raw:?}: {e}")
                })?;
                if !radius.is_finite() || radius <= 0.0 {
                    anyhow::bail!("WAYPOST_MATCH_RADIUS_KM must be positive, got {radius}");
                }
                radius
            }
            None => defaults.match_radius_km,
        };

        let auth_token = lookup("AUTH_TOKEN").filter(|token| !token.is_empty());

        let json_logs = match lookup("WAYPOST_LOG_FORMAT").as_deref() {
            None | Some("text") => false,
            Some("json") => true,
            Some(other) => anyhow::bail!("WAYPOST_LOG_FORMAT must be text or json, got {other:?}"),
        };

        Ok(Self {
            port,
            auth_token,
            match_radius_km,
            json_logs,
        })
    }
}

// ── Application State ────────────────────────────────────────────────────

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Ledger,
    pub guard: LifecycleGuard,
    pub coordinator: AssignmentCoordinator,
    pub channels: Arc<InMemoryChannels>,
    pub config: AppConfig,
    /// Renders `/metrics`. `None` when no recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("packages", &self.ledger.package_count())
            .field("trips", &self.ledger.trip_count())
            .field("channels", &self.channels.len())
            .field("config", &self.config)
            .field("prometheus", &self.prometheus.is_some())
            .finish()
    }
}

impl AppState {
    /// State with default configuration and no metrics recorder.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), None)
    }

    /// Wire the services over a fresh ledger.
    pub fn with_config(config: AppConfig, prometheus: Option<PrometheusHandle>) -> Self {
        let ledger = Ledger::new();
        let channels = Arc::new(InMemoryChannels::new());
        let finder = CandidateFinder::new(GeoMatcher::new(config.match_radius_km));
        let coordinator = AssignmentCoordinator::new(ledger.clone(), finder, channels.clone());
        Self {
            guard: LifecycleGuard::new(ledger.clone()),
            ledger,
            coordinator,
            channels,
            config,
            prometheus,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
