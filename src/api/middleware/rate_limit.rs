//! Per-client rate limiting for link creation.

use std::sync::Arc;
use std::time::Duration;

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

use crate::config::Config;

/// Token bucket settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSettings {
    /// Time needed to replenish one request.
    pub period: Duration,
    pub burst: u32,
    /// Read the client IP from forwarding headers instead of the socket peer.
    pub behind_proxy: bool,
}

impl RateLimitSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            period: Duration::from_secs(config.rate_limit_period_secs),
            burst: config.rate_limit_burst,
            behind_proxy: config.behind_proxy,
        }
    }
}

type Layer<K> = GovernorLayer<K, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

fn build<K: KeyExtractor>(settings: RateLimitSettings, extractor: K) -> Layer<K> {
    let governor_conf = GovernorConfigBuilder::default()
        .period(settings.period.max(Duration::from_millis(1)))
        .burst_size(settings.burst.max(1))
        .key_extractor(extractor)
        .finish()
        .expect("period and burst are non-zero");

    GovernorLayer::new(Arc::new(governor_conf))
}

/// Limiter keyed by the socket peer address.
///
/// Requires the server to be started with `into_make_service_with_connect_info`.
/// Requests exceeding the limit receive `429 Too Many Requests`.
pub fn layer(settings: RateLimitSettings) -> Layer<PeerIpKeyExtractor> {
    build(settings, PeerIpKeyExtractor)
}

/// Limiter keyed by `X-Forwarded-For` / `X-Real-IP` / `Forwarded`, falling back to the peer
/// address. Only safe behind a trusted reverse proxy.
pub fn proxied_layer(settings: RateLimitSettings) -> Layer<SmartIpKeyExtractor> {
    build(settings, SmartIpKeyExtractor)
}
