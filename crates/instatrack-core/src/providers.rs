use serde::{Deserialize, Serialize};

use crate::category::Category;

/// Operator-assigned provider identifier, e.g. `"api-1"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ProviderId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Online,
    Degraded,
    Offline,
}

impl HealthStatus {
    /// Whether an extraction could still be attempted against the provider.
    #[must_use]
    pub fn is_usable(self) -> bool {
        !matches!(self, HealthStatus::Offline)
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Online => write!(f, "online"),
            HealthStatus::Degraded => write!(f, "degraded"),
            HealthStatus::Offline => write!(f, "offline"),
        }
    }
}

/// An external data provider able to serve one content category.
///
/// Rank is not stored: it is the provider's position among same-category
/// providers in the registry, and the provider is a fallback exactly when that
/// rank is non-zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub id: ProviderId,
    /// Display label. Not unique.
    pub name: String,
    pub category: Category,
    /// Opaque connection descriptor; never parsed.
    pub endpoint: String,
    pub health: HealthStatus,
    /// Percentage in `[0, 100]`. Informational only.
    pub success_rate: f64,
    pub total_requests: u64,
}

impl ProviderConfig {
    /// A freshly registered provider: online, no traffic yet.
    pub fn new(
        id: impl Into<ProviderId>,
        name: impl Into<String>,
        category: Category,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            endpoint: endpoint.into(),
            health: HealthStatus::Online,
            success_rate: 100.0,
            total_requests: 0,
        }
    }

    /// Folds one request outcome into the counters.
    ///
    /// `success_rate` becomes the running mean over all requests seen so far.
    #[allow(clippy::cast_precision_loss)]
    pub fn record_request(&mut self, succeeded: bool) {
        let previous = self.total_requests as f64;
        let sample = if succeeded { 100.0 } else { 0.0 };
        self.total_requests = self.total_requests.saturating_add(1);
        let rate = (self.success_rate * previous + sample) / self.total_requests as f64;
        self.success_rate = rate.clamp(0.0, 100.0);
    }
}
