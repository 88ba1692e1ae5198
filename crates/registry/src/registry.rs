use std::{sync::Arc, time::Duration};

use alloy_primitives::Address;
use blockcast_storage::Store;
use blockcast_types::ContractCacheEntry;
use tracing::debug;

use crate::{
    known,
    resolver::ExternalResolver,
    selectors
};

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default)]
pub struct RegistryConfig {
    pub etherscan_api_key: Option<String>,
    /// Disable to run fully offline (tests, degraded mode).
    pub external_lookups:  bool
}

/// Layered contract and selector resolution: static table, persistent
/// cache, then external resolvers. External misses are persisted with
/// `fetch_attempted` so each address is looked up at most once.
pub struct ContractRegistry {
    store:    Arc<dyn Store>,
    resolver: Option<ExternalResolver>
}

impl ContractRegistry {
    pub fn new(store: Arc<dyn Store>, config: RegistryConfig) -> Self {
        let resolver = config.external_lookups.then(|| {
            let http = reqwest::Client::builder()
                .timeout(HTTP_TIMEOUT)
                .build()
                .expect("default tls backend available");
            ExternalResolver::new(http, config.etherscan_api_key)
        });

        Self { store, resolver }
    }

    /// Resolves what is known about a contract address.
    pub async fn contract(&self, address: Address) -> Option<ContractCacheEntry> {
        if let Some(known) = known::known_contract(address) {
            return Some(Self::entry_from_known(address, known))
        }

        let cached = match self.store.contract(address).await {
            Ok(cached) => cached,
            Err(err) => {
                debug!(target: "registry", %address, %err, "contract cache read failed");
                None
            }
        };

        if let Some(entry) = cached {
            if let Err(err) = self.store.bump_contract_calls(address).await {
                debug!(target: "registry", %address, %err, "call count bump failed");
            }
            if entry.is_resolved() {
                return Some(entry)
            }
            if entry.fetch_attempted {
                // already failed externally once, never retry
                return None
            }
        }

        self.fetch_and_cache(address).await
    }

    /// Human name for a 4-byte selector, if any layer knows it.
    pub async fn method_name(&self, selector: [u8; 4]) -> Option<String> {
        if let Some(name) = selectors::builtin_name(selector) {
            return Some(name.to_string())
        }

        match self.store.signature(selector).await {
            Ok(Some(name)) => return Some(name),
            Ok(None) => {}
            Err(err) => {
                debug!(target: "registry", %err, "signature cache read failed")
            }
        }

        let resolver = self.resolver.as_ref()?;
        let name = resolver.resolve_signature(selector).await?;
        if let Err(err) = self.store.save_signature(selector, &name).await {
            debug!(target: "registry", %err, "signature cache write failed");
        }
        Some(name)
    }

    async fn fetch_and_cache(&self, address: Address) -> Option<ContractCacheEntry> {
        let resolver = self.resolver.as_ref()?;

        match resolver.resolve_contract(address).await {
            Some(resolved) => {
                let mut entry = ContractCacheEntry::empty(address);
                entry.contract_name = resolved.name;
                entry.abi = Some(resolved.abi);
                entry.verified = true;

                if let Err(err) = self.store.upsert_contract(entry.clone()).await {
                    debug!(target: "registry", %address, %err, "contract cache write failed");
                }
                Some(entry)
            }
            None => {
                // record the miss so concurrent and future lookups converge
                // on the cache instead of hammering the resolvers
                let marker = ContractCacheEntry::attempted(address);
                if let Err(err) = self.store.upsert_contract(marker).await {
                    debug!(target: "registry", %address, %err, "attempt marker write failed");
                }
                None
            }
        }
    }

    fn entry_from_known(address: Address, known: &known::KnownContract) -> ContractCacheEntry {
        ContractCacheEntry {
            address,
            contract_name: Some(known.name.to_string()),
            protocol: Some(known.protocol.to_string()),
            kind: Some(known.kind),
            abi: known.abi.map(str::to_string),
            verified: true,
            fetch_attempted: false,
            call_count: 0
        }
    }
}
