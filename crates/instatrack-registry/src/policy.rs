//! Health-aware provider selection, layered over the rank-only chain.

use instatrack_core::HealthStatus;

use crate::providers::{FallbackChain, RankedProvider};

/// Pick the provider an extraction should try first.
///
/// The highest-ranked `Online` provider wins; failing that, the
/// highest-ranked `Degraded` one. `Offline` providers are never chosen.
#[must_use]
pub fn select_provider(chain: &FallbackChain) -> Option<RankedProvider<'_>> {
    chain
        .iter()
        .find(|ranked| ranked.provider.health == HealthStatus::Online)
        .or_else(|| {
            chain
                .iter()
                .find(|ranked| ranked.provider.health == HealthStatus::Degraded)
        })
}
