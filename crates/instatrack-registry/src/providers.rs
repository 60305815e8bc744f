//! Provider ranking registry.
//!
//! Providers of every category live in one flat sequence. A category's
//! fallback chain is that sequence filtered to the category, so a provider's
//! rank is its index in the filtered view. Reordering swaps two elements of
//! the flat sequence that are adjacent in the filtered view; providers of
//! other categories keep their positions.

use instatrack_core::{Category, HealthStatus, ProviderConfig, ProviderId};
use serde::Serialize;

use crate::{EntityKind, RegistryError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

/// Result of a promote/demote request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved { from_rank: usize, to_rank: usize },
    /// Already first (up) or last (down) in its category.
    Unchanged,
}

/// Fields an operator may edit on an existing provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderEdit {
    pub name: Option<String>,
    pub endpoint: Option<String>,
}

/// A provider observed together with its rank in its category.
#[derive(Debug, Clone, Copy)]
pub struct RankedProvider<'a> {
    pub rank: usize,
    pub provider: &'a ProviderConfig,
}

impl RankedProvider<'_> {
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.rank == 0
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.rank > 0
    }
}

/// Rank-ascending providers for one category.
///
/// Order is by rank only; health never reorders the chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackChain {
    pub category: Category,
    providers: Vec<ProviderConfig>,
}

impl FallbackChain {
    #[must_use]
    pub fn primary(&self) -> Option<&ProviderConfig> {
        self.providers.first()
    }

    #[must_use]
    pub fn fallbacks(&self) -> &[ProviderConfig] {
        self.providers.get(1..).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = RankedProvider<'_>> {
        self.providers
            .iter()
            .enumerate()
            .map(|(rank, provider)| RankedProvider { rank, provider })
    }

    #[must_use]
    pub fn ids(&self) -> Vec<&ProviderId> {
        self.providers.iter().map(|p| &p.id).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<ProviderConfig> {
        self.providers
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProviderRegistry {
    providers: Vec<ProviderConfig>,
}

impl ProviderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from providers in registry order.
    ///
    /// # Errors
    ///
    /// Fails on the first provider [`ProviderRegistry::add`] would reject.
    pub fn from_providers(
        providers: impl IntoIterator<Item = ProviderConfig>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for provider in providers {
            registry.add(provider)?;
        }
        Ok(registry)
    }

    /// Append a provider as the lowest-priority fallback of its category.
    /// Returns the rank it landed at.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateId`] if the id is taken, or
    /// [`RegistryError::Validation`] for blank fields or an out-of-range
    /// success rate.
    pub fn add(&mut self, provider: ProviderConfig) -> Result<usize, RegistryError> {
        validate_provider(&provider)?;

        if self.position(&provider.id).is_some() {
            tracing::warn!(provider_id = %provider.id, "rejected duplicate provider id");
            return Err(RegistryError::DuplicateId {
                kind: EntityKind::Provider,
                id: provider.id.to_string(),
            });
        }

        let rank = self.category_positions(provider.category).len();
        tracing::info!(
            provider_id = %provider.id,
            category = %provider.category,
            rank,
            "provider added"
        );
        self.providers.push(provider);
        Ok(rank)
    }

    /// Delete a provider. Lower-ranked providers of the same category move up
    /// one rank.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] if no provider has this id.
    pub fn remove(&mut self, id: &ProviderId) -> Result<ProviderConfig, RegistryError> {
        let position = self.require_position(id)?;
        let removed = self.providers.remove(position);
        tracing::info!(provider_id = %id, category = %removed.category, "provider removed");
        Ok(removed)
    }

    /// Swap the provider with the one ranked directly above it in its category.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] if no provider has this id.
    pub fn move_up(&mut self, id: &ProviderId) -> Result<MoveOutcome, RegistryError> {
        self.shift(id, Direction::Up)
    }

    /// Swap the provider with the one ranked directly below it in its category.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] if no provider has this id.
    pub fn move_down(&mut self, id: &ProviderId) -> Result<MoveOutcome, RegistryError> {
        self.shift(id, Direction::Down)
    }

    fn shift(&mut self, id: &ProviderId, direction: Direction) -> Result<MoveOutcome, RegistryError> {
        let position = self.require_position(id)?;
        let category = self.providers[position].category;
        let siblings = self.category_positions(category);

        let Some(rank) = siblings.iter().position(|&p| p == position) else {
            return Err(RegistryError::provider_not_found(id));
        };

        let target_rank = match direction {
            Direction::Up => rank.checked_sub(1),
            Direction::Down => Some(rank + 1).filter(|&r| r < siblings.len()),
        };

        let Some(target_rank) = target_rank else {
            tracing::debug!(provider_id = %id, ?direction, rank, "provider already at edge of its category");
            return Ok(MoveOutcome::Unchanged);
        };

        // Positions in the flat sequence, not neighbours in it.
        self.providers.swap(position, siblings[target_rank]);

        tracing::info!(
            provider_id = %id,
            category = %category,
            from_rank = rank,
            to_rank = target_rank,
            "provider reordered"
        );
        Ok(MoveOutcome::Moved {
            from_rank: rank,
            to_rank: target_rank,
        })
    }

    /// The category's fallback chain, primary first.
    #[must_use]
    pub fn resolve(&self, category: Category) -> FallbackChain {
        FallbackChain {
            category,
            providers: self
                .providers
                .iter()
                .filter(|p| p.category == category)
                .cloned()
                .collect(),
        }
    }

    /// Update a provider's health. Rank is not affected.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] if no provider has this id.
    pub fn set_health(&mut self, id: &ProviderId, status: HealthStatus) -> Result<(), RegistryError> {
        let provider = self.require_mut(id)?;
        let previous = provider.health;
        provider.health = status;
        if previous != status {
            tracing::info!(provider_id = %id, from = %previous, to = %status, "provider health changed");
        }
        Ok(())
    }

    /// Apply an operator edit to name and/or endpoint.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] if no provider has this id, or
    /// [`RegistryError::Validation`] if an edited value is blank.
    pub fn update(&mut self, id: &ProviderId, edit: ProviderEdit) -> Result<ProviderConfig, RegistryError> {
        if edit.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(RegistryError::Validation(format!(
                "provider '{id}' name must be non-empty"
            )));
        }
        if edit.endpoint.as_deref().is_some_and(|e| e.trim().is_empty()) {
            return Err(RegistryError::Validation(format!(
                "provider '{id}' endpoint must be non-empty"
            )));
        }

        let provider = self.require_mut(id)?;
        if let Some(name) = edit.name {
            provider.name = name.trim().to_string();
        }
        if let Some(endpoint) = edit.endpoint {
            provider.endpoint = endpoint.trim().to_string();
        }
        tracing::info!(provider_id = %id, "provider updated");
        Ok(provider.clone())
    }

    /// Count one request against the provider.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] if no provider has this id.
    pub fn record_request(&mut self, id: &ProviderId, succeeded: bool) -> Result<(), RegistryError> {
        self.require_mut(id)?.record_request(succeeded);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &ProviderId) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| &p.id == id)
    }

    /// Zero-based position of the provider within its category.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] if no provider has this id.
    pub fn rank_of(&self, id: &ProviderId) -> Result<usize, RegistryError> {
        let position = self.require_position(id)?;
        let category = self.providers[position].category;
        Ok(self.providers[..position]
            .iter()
            .filter(|p| p.category == category)
            .count())
    }

    /// # Errors
    ///
    /// [`RegistryError::NotFound`] if no provider has this id.
    pub fn is_fallback(&self, id: &ProviderId) -> Result<bool, RegistryError> {
        Ok(self.rank_of(id)? > 0)
    }

    /// All providers in registry order, categories interleaved.
    pub fn iter(&self) -> impl Iterator<Item = &ProviderConfig> {
        self.providers.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    fn position(&self, id: &ProviderId) -> Option<usize> {
        self.providers.iter().position(|p| &p.id == id)
    }

    fn require_position(&self, id: &ProviderId) -> Result<usize, RegistryError> {
        self.position(id).ok_or_else(|| {
            tracing::warn!(provider_id = %id, "provider not found");
            RegistryError::provider_not_found(id)
        })
    }

    fn require_mut(&mut self, id: &ProviderId) -> Result<&mut ProviderConfig, RegistryError> {
        let position = self.require_position(id)?;
        Ok(&mut self.providers[position])
    }

    /// Flat-sequence indices of the category's providers, in rank order.
    fn category_positions(&self, category: Category) -> Vec<usize> {
        self.providers
            .iter()
            .enumerate()
            .filter(|(_, p)| p.category == category)
            .map(|(i, _)| i)
            .collect()
    }
}

fn validate_provider(provider: &ProviderConfig) -> Result<(), RegistryError> {
    if provider.id.as_str().trim().is_empty() {
        return Err(RegistryError::Validation(
            "provider id must be non-empty".to_string(),
        ));
    }
    if provider.name.trim().is_empty() {
        return Err(RegistryError::Validation(format!(
            "provider '{}' name must be non-empty",
            provider.id
        )));
    }
    if provider.endpoint.trim().is_empty() {
        return Err(RegistryError::Validation(format!(
            "provider '{}' endpoint must be non-empty",
            provider.id
        )));
    }
    if !(0.0..=100.0).contains(&provider.success_rate) {
        return Err(RegistryError::Validation(format!(
            "provider '{}' success rate {} is outside 0..=100",
            provider.id, provider.success_rate
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "providers_test.rs"]
mod tests;
