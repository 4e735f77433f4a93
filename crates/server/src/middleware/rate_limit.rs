//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Login and registration are the only endpoints worth brute-forcing, so
//! they get a per-IP limiter; the rest of the API is left to the session
//! layer. `SmartIpKeyExtractor` checks the standard proxy headers
//! (`x-forwarded-for`, `x-real-ip`, `forwarded`) before falling back to the
//! peer address, which requires serving with connect info (see `main.rs`).

use std::sync::Arc;

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor};

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for auth endpoints: ~30 requests per minute per IP.
///
/// Configuration: 1 request every 2 seconds (replenish), burst of 20.
/// This slows brute force attacks on login/registration without tripping
/// legitimate clients behind a shared NAT.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(2)` and `burst_size(20)`), which are always
/// accepted by `GovernorConfigBuilder`.
#[must_use]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(SmartIpKeyExtractor)
        .per_second(2) // Replenish 1 token every 2 seconds (~30/minute)
        .burst_size(20) // Allow burst of 20 requests
        .finish()
        .expect("rate limiter config with per_second(2) and burst_size(20) is valid");
    GovernorLayer::new(Arc::new(config))
}
