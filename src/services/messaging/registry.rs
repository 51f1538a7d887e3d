use std::collections::HashMap;
use std::sync::Arc;

use super::SmsAdapter;
use crate::errors::DispatchError;
use crate::models::SmsProviderId;

/// Provider id → adapter. Filled once at startup, read-only afterwards.
#[derive(Clone, Default)]
pub struct SmsAdapterRegistry {
    adapters: HashMap<SmsProviderId, Arc<dyn SmsAdapter>>,
}

impl SmsAdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, adapter: Arc<dyn SmsAdapter>) -> Self {
        let id = adapter.provider();
        if self.adapters.insert(id, adapter).is_some() {
            tracing::warn!(provider = %id, "replacing previously registered SMS adapter");
        } else {
            tracing::debug!(provider = %id, "registered SMS adapter");
        }
        self
    }

    pub fn get(&self, provider_id: &str) -> Result<&dyn SmsAdapter, DispatchError> {
        let id: SmsProviderId = provider_id.parse()?;
        self.adapters
            .get(&id)
            .map(|adapter| adapter.as_ref())
            .ok_or_else(|| DispatchError::UnknownProvider(provider_id.to_string()))
    }

    pub fn contains(&self, id: SmsProviderId) -> bool {
        self.adapters.contains_key(&id)
    }

    pub fn providers(&self) -> Vec<SmsProviderId> {
        let mut ids: Vec<_> = self.adapters.keys().copied().collect();
        ids.sort();
        ids
    }
}
