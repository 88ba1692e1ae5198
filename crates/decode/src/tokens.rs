use std::collections::HashMap;

use alloy_primitives::{Address, Bytes};
use blockcast_node::{NodeError, NodeRpc};
use blockcast_registry::known;
use blockcast_types::TokenInfo;
use blockcast_utils::RateLimiter;
use parking_lot::RwLock;
use tracing::debug;

use crate::erc20;

/// Resolves ERC-20 metadata with `eth_call`, memoizing results. The static
/// token table answers without touching the node; failed reads are cached so
/// a non-token address is probed once. Rate-limited reads are skipped and
/// retried on a later annotation pass.
pub(crate) struct TokenReader<N> {
    node:    N,
    limiter: RateLimiter,
    cache:   RwLock<HashMap<Address, Option<TokenInfo>>>
}

impl<N: NodeRpc> TokenReader<N> {
    pub(crate) fn new(node: N, limiter: RateLimiter) -> Self {
        Self { node, limiter, cache: RwLock::new(HashMap::new()) }
    }

    pub(crate) async fn token(&self, address: Address) -> Option<TokenInfo> {
        if let Some(known) = known::known_token(address) {
            return Some(known.clone())
        }
        if let Some(cached) = self.cache.read().get(&address) {
            return cached.clone()
        }

        match self.read_metadata(address).await {
            Ok(info) => {
                self.cache.write().insert(address, info.clone());
                info
            }
            Err(err) if err.is_rate_limited() => {
                debug!(target: "decode", %address, "token metadata read rate limited, skipping");
                None
            }
            Err(err) => {
                debug!(target: "decode", %address, %err, "token metadata read failed");
                self.cache.write().insert(address, None);
                None
            }
        }
    }

    pub(crate) fn clear(&self) {
        self.cache.write().clear();
    }

    async fn read_metadata(&self, address: Address) -> Result<Option<TokenInfo>, NodeError> {
        let symbol = self
            .limiter
            .submit(self.node.call(address, Bytes::from(erc20::encode_symbol_call())))
            .await?;
        let decimals = self
            .limiter
            .submit(self.node.call(address, Bytes::from(erc20::encode_decimals_call())))
            .await?;

        let info = erc20::decode_symbol_return(&symbol)
            .zip(erc20::decode_decimals_return(&decimals))
            .map(|(symbol, decimals)| TokenInfo { address, symbol, decimals });
        Ok(info)
    }
}
