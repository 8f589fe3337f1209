// ── Runtime engine configuration ──
//
// These types describe how the account model behaves: trial length,
// sweep cadence, token lifetime, and where generated links point.
// They never touch disk. The CLI constructs an `EngineConfig` and
// hands it in.

use std::time::Duration;

use url::Url;

/// Default trial window granted on a first visit.
pub const DEFAULT_TRIAL_DAYS: i64 = 7;

/// Default lifetime of a payment request before it is hidden from reads.
pub const DEFAULT_PAYMENT_REQUEST_TTL_DAYS: i64 = 7;

/// Default cadence of the subscription expiry sweep (one hour).
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_millis(3_600_000);

/// Base path used for routes when the production flag is set.
pub const PRODUCTION_BASE_PATH: &str = "/scholarly/";

/// Configuration for a single engine instance.
///
/// Built by the CLI (via `scholarly-config`), passed to the session and
/// registries. Core never reads config files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Length of the first-visit trial, in days.
    pub trial_days: i64,
    /// How often the background sweep checks for expired subscriptions.
    /// `Duration::ZERO` disables the background task; the sweep still
    /// runs once on start.
    pub sweep_interval: Duration,
    /// Lifetime of a payment request, in days.
    pub payment_request_ttl_days: i64,
    /// Absolute base for generated links (payment pages, invitations).
    pub link_base: Url,
}

impl EngineConfig {
    /// Resolve the route base path from the production flag.
    pub fn base_path(production: bool) -> &'static str {
        if production { PRODUCTION_BASE_PATH } else { "/" }
    }

    /// Join a route onto the configured link base.
    ///
    /// `route` is relative (no leading slash), e.g. `pay/{token}`.
    pub fn link(&self, route: &str) -> Url {
        let mut base = self.link_base.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        match base.join(route.trim_start_matches('/')) {
            Ok(url) => url,
            Err(_) => base,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trial_days: DEFAULT_TRIAL_DAYS,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            payment_request_ttl_days: DEFAULT_PAYMENT_REQUEST_TTL_DAYS,
            link_base: Url::parse("http://localhost:5173/").expect("static default URL is valid"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn link_joins_relative_routes() {
        let cfg = EngineConfig::default();
        assert_eq!(
            cfg.link("pay/abc").as_str(),
            "http://localhost:5173/pay/abc"
        );
    }

    #[test]
    fn link_keeps_base_path_without_trailing_slash() {
        let cfg = EngineConfig {
            link_base: Url::parse("https://example.org/scholarly").unwrap(),
            ..EngineConfig::default()
        };
        assert_eq!(
            cfg.link("/invitation/xyz").as_str(),
            "https://example.org/scholarly/invitation/xyz"
        );
    }

    #[test]
    fn production_flag_selects_base_path() {
        assert_eq!(EngineConfig::base_path(true), "/scholarly/");
        assert_eq!(EngineConfig::base_path(false), "/");
    }
}
