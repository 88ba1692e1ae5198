use std::sync::Arc;

use alloy_primitives::Address;
use blockcast_node::NodeRpc;
use blockcast_registry::{known, ContractRegistry};
use blockcast_types::{PendingTx, TxAnnotation, TxCategory, TxKind};
use blockcast_utils::RateLimiter;
use serde_json::Value;

use crate::{
    abi, erc20,
    selectors::{is_bridge, is_lending, is_liquidity, is_swap},
    tokens::TokenReader
};

/// Produces a [`TxAnnotation`] for a pending transaction.
///
/// Classification is a pure function of `(to, value, calldata)` against the
/// registry snapshot; enrichment (token metadata, external ABIs) goes
/// through the shared rate limiter and degrades silently when unavailable.
pub struct Decoder<N> {
    registry: Arc<ContractRegistry>,
    limiter:  RateLimiter,
    tokens:   TokenReader<N>
}

impl<N: NodeRpc> Decoder<N> {
    pub fn new(node: N, registry: Arc<ContractRegistry>, limiter: RateLimiter) -> Self {
        let tokens = TokenReader::new(node, limiter.clone());
        Self { registry, limiter, tokens }
    }

    /// Drops session-derived enrichment state. Called on reconnect.
    pub fn clear_caches(&self) {
        self.tokens.clear();
    }

    pub async fn annotate(&self, tx: &PendingTx) -> TxAnnotation {
        let Some(to) = tx.to else {
            if !tx.input.is_empty() {
                return TxAnnotation::new(TxKind::ContractCreation, TxCategory::Deployment)
            }
            return TxAnnotation::unknown()
        };

        if let Some(selector) = tx.selector() {
            if let Some(annotation) = self.annotate_erc20(selector, tx, to).await {
                return annotation
            }
            if is_swap(selector) {
                return self.annotate_dex(TxKind::Swap, selector, tx, to).await
            }
            if is_liquidity(selector) {
                return self.annotate_dex(TxKind::Liquidity, selector, tx, to).await
            }
            if is_lending(selector) {
                return self
                    .annotate_tagged(TxKind::Lending, TxCategory::Defi, Some(selector), tx, to)
                    .await
            }
            if is_bridge(selector) || known::is_bridge_contract(to) {
                return self
                    .annotate_tagged(TxKind::Bridge, TxCategory::Bridge, Some(selector), tx, to)
                    .await
            }
        } else if known::is_bridge_contract(to) {
            return self
                .annotate_tagged(TxKind::Bridge, TxCategory::Bridge, None, tx, to)
                .await
        }

        // fall back to whatever the registry knows about the callee
        if let Some(entry) = self.limiter.submit(self.registry.contract(to)).await {
            if let Some(kind) = entry.kind {
                let (tx_kind, category) = kind.annotation_hint();
                let mut annotation = TxAnnotation::new(tx_kind, category);
                annotation.protocol = entry.protocol.clone();
                if let Some(selector) = tx.selector() {
                    annotation.method = self.registry.method_name(selector).await;
                    if let Some(abi_json) = entry.abi.as_deref() {
                        if let Some((name, params)) =
                            abi::decode_with_abi(abi_json, selector, &tx.input)
                        {
                            annotation.method = Some(name);
                            annotation.params = Some(params);
                        }
                    }
                }
                return annotation
            }
        }

        if tx.input.is_empty() && !tx.value.is_zero() {
            return TxAnnotation::new(TxKind::Transfer, TxCategory::Native)
                .with_protocol("Ethereum")
        }

        // unknown, but keep a method name when one resolves
        let mut annotation = TxAnnotation::unknown();
        if let Some(selector) = tx.selector() {
            annotation.method = self.registry.method_name(selector).await;
        }
        annotation
    }

    async fn annotate_erc20(
        &self,
        selector: [u8; 4],
        tx: &PendingTx,
        to: Address
    ) -> Option<TxAnnotation> {
        let decoded = erc20::decode(selector, &tx.input)?;

        let mut annotation =
            TxAnnotation::new(TxKind::Transfer, TxCategory::Token).with_method(decoded.method);
        annotation.token = Some(to);
        annotation.params = Some(decoded.params);

        if let Some(info) = self.tokens.token(to).await {
            annotation.protocol = Some(info.symbol.clone());
            annotation.token_symbol = Some(info.symbol);
            annotation.token_decimals = Some(info.decimals);
            annotation.token_amount =
                Some(blockcast_types::units::format_units(decoded.amount, info.decimals));
        }

        Some(annotation)
    }

    async fn annotate_dex(
        &self,
        kind: TxKind,
        selector: [u8; 4],
        tx: &PendingTx,
        to: Address
    ) -> TxAnnotation {
        let mut annotation = self
            .annotate_tagged(kind, TxCategory::Dex, Some(selector), tx, to)
            .await;

        let candidates = extract_token_candidates(&tx.input);
        if let Some(first) = candidates.first() {
            annotation.token = Some(*first);
            if let Some(info) = self.tokens.token(*first).await {
                annotation.token_symbol = Some(info.symbol);
                annotation.token_decimals = Some(info.decimals);
            }
        }
        if let Some(second) = candidates.get(1) {
            annotation
                .params
                .get_or_insert_with(Default::default)
                .insert("pairToken".into(), Value::String(second.to_string()));
        }

        annotation
    }

    async fn annotate_tagged(
        &self,
        kind: TxKind,
        category: TxCategory,
        selector: Option<[u8; 4]>,
        tx: &PendingTx,
        to: Address
    ) -> TxAnnotation {
        let mut annotation = TxAnnotation::new(kind, category);

        let entry = self.limiter.submit(self.registry.contract(to)).await;
        if let Some(entry) = &entry {
            annotation.protocol = entry.protocol.clone();
        }

        if let Some(selector) = selector {
            annotation.method = self.registry.method_name(selector).await;
            if let Some(abi_json) = entry.as_ref().and_then(|e| e.abi.as_deref()) {
                if let Some((name, params)) = abi::decode_with_abi(abi_json, selector, &tx.input) {
                    annotation.method = Some(name);
                    annotation.params = Some(params);
                }
            }
        }

        annotation
    }
}

/// Scans 32-byte-aligned calldata words for 20-byte address suffixes.
/// A zero-padded word whose suffix leads with a non-zero byte is a
/// candidate (words that are right-aligned small integers, like amounts and
/// deadlines, fail that test); at most two are kept. Only shape-reliable
/// for router-style calldata.
fn extract_token_candidates(input: &[u8]) -> Vec<Address> {
    let mut candidates = Vec::new();
    if input.len() < 4 {
        return candidates
    }

    for word in input[4..].chunks_exact(32) {
        if word[..12].iter().all(|byte| *byte == 0) && word[12] != 0 {
            let address = Address::from_slice(&word[12..]);
            if !candidates.contains(&address) {
                candidates.push(address);
                if candidates.len() == 2 {
                    break
                }
            }
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use alloy_primitives::{address, Bytes, B256, U256};
    use alloy_sol_macro::sol;
    use alloy_sol_types::SolCall;
    use blockcast_node::test_utils::MockNode;
    use blockcast_registry::RegistryConfig;
    use blockcast_storage::MemoryStore;
    use blockcast_types::TxStatus;

    use super::*;

    sol! {
        function transfer(address to, uint256 amount) returns (bool);
        function swapExactTokensForTokens(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] path,
            address to,
            uint256 deadline
        ) returns (uint256[] amounts);
        function supply(address asset, uint256 amount, address onBehalfOf, uint16 referralCode);
    }

    fn decoder() -> Decoder<MockNode> {
        let store = Arc::new(MemoryStore::default());
        let registry = Arc::new(ContractRegistry::new(store, RegistryConfig::default()));
        Decoder::new(MockNode::default(), registry, RateLimiter::new(8))
    }

    fn tx_to(to: Option<Address>, value: U256, input: Bytes) -> PendingTx {
        PendingTx {
            hash: B256::with_last_byte(1),
            from: Address::with_last_byte(1),
            to,
            value,
            gas_limit: 100_000,
            nonce: Some(0),
            gas_price: None,
            max_fee_per_gas: Some(20_000_000_000),
            max_priority_fee_per_gas: Some(1_000_000_000),
            input,
            first_seen: Instant::now(),
            status: TxStatus::Pending
        }
    }

    #[tokio::test]
    async fn contract_creation() {
        let annotation = decoder()
            .annotate(&tx_to(None, U256::ZERO, Bytes::from(vec![0x60, 0x80, 0x60, 0x40])))
            .await;
        assert_eq!(annotation.kind, TxKind::ContractCreation);
        assert_eq!(annotation.category, TxCategory::Deployment);
    }

    #[tokio::test]
    async fn native_value_transfer() {
        let annotation = decoder()
            .annotate(&tx_to(
                Some(Address::with_last_byte(9)),
                U256::from(10u64).pow(U256::from(18u8)),
                Bytes::new()
            ))
            .await;
        assert_eq!(annotation.kind, TxKind::Transfer);
        assert_eq!(annotation.category, TxCategory::Native);
        assert_eq!(annotation.protocol.as_deref(), Some("Ethereum"));
    }

    #[tokio::test]
    async fn erc20_transfer_on_known_token() {
        let usdc = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
        let calldata = transferCall {
            to:     Address::with_last_byte(7),
            amount: U256::from(2_500_000u64)
        }
        .abi_encode();

        let annotation = decoder()
            .annotate(&tx_to(Some(usdc), U256::ZERO, Bytes::from(calldata)))
            .await;

        assert_eq!(annotation.kind, TxKind::Transfer);
        assert_eq!(annotation.category, TxCategory::Token);
        assert_eq!(annotation.method.as_deref(), Some("transfer"));
        assert_eq!(annotation.token_symbol.as_deref(), Some("USDC"));
        assert_eq!(annotation.token_decimals, Some(6));
        // 2_500_000 raw at 6 decimals
        assert_eq!(annotation.token_amount.as_deref(), Some("2.5"));
    }

    #[tokio::test]
    async fn swap_through_known_router_decodes_params() {
        let router = address!("7a250d5630b4cf539739df2c5dacb4c659f2488d");
        let weth = address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
        let usdc = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");

        let calldata = swapExactTokensForTokensCall {
            amountIn:     U256::from(10u64).pow(U256::from(18u8)),
            amountOutMin: U256::from(2_400_000_000u64),
            path:         vec![weth, usdc],
            to:           Address::with_last_byte(5),
            deadline:     U256::from(1_700_000_000u64)
        }
        .abi_encode();

        let annotation = decoder()
            .annotate(&tx_to(Some(router), U256::ZERO, Bytes::from(calldata)))
            .await;

        assert_eq!(annotation.kind, TxKind::Swap);
        assert_eq!(annotation.category, TxCategory::Dex);
        assert_eq!(annotation.protocol.as_deref(), Some("Uniswap V2"));
        assert_eq!(annotation.method.as_deref(), Some("swapExactTokensForTokens"));

        let params = annotation.params.as_ref().unwrap();
        assert_eq!(
            params.get("amountIn"),
            Some(&Value::String("1000000000000000000".to_string()))
        );
        // the first extractable token candidate is resolved
        assert_eq!(annotation.token, Some(weth));
        assert_eq!(annotation.token_symbol.as_deref(), Some("WETH"));
    }

    #[tokio::test]
    async fn lending_supply_classifies() {
        let pool = address!("87870bca3f3fd6335c3f4ce8392d69350b4fa4e2");
        let calldata = supplyCall {
            asset:        address!("6b175474e89094c44da98b954eedeac495271d0f"),
            amount:       U256::from(100u64),
            onBehalfOf:   Address::with_last_byte(3),
            referralCode: 0
        }
        .abi_encode();

        let annotation = decoder()
            .annotate(&tx_to(Some(pool), U256::ZERO, Bytes::from(calldata)))
            .await;

        assert_eq!(annotation.kind, TxKind::Lending);
        assert_eq!(annotation.category, TxCategory::Defi);
        assert_eq!(annotation.protocol.as_deref(), Some("Aave V3"));
        assert_eq!(annotation.method.as_deref(), Some("supply"));
    }

    #[tokio::test]
    async fn bridge_contract_without_known_selector() {
        let bridge = address!("99c9fc46f92e8a1c0dec1b1747d010903e884be1");
        let annotation = decoder()
            .annotate(&tx_to(
                Some(bridge),
                U256::from(10u64).pow(U256::from(17u8)),
                Bytes::from(vec![0xde, 0xad, 0xbe, 0xef, 0x00])
            ))
            .await;

        assert_eq!(annotation.kind, TxKind::Bridge);
        assert_eq!(annotation.category, TxCategory::Bridge);
        assert_eq!(annotation.protocol.as_deref(), Some("Optimism"));
    }

    #[tokio::test]
    async fn garbage_calldata_is_unknown() {
        let annotation = decoder()
            .annotate(&tx_to(
                Some(Address::with_last_byte(0xaa)),
                U256::ZERO,
                Bytes::from(vec![0x01, 0x02, 0x03])
            ))
            .await;
        assert_eq!(annotation.kind, TxKind::Unknown);
        assert_eq!(annotation.category, TxCategory::Other);
    }

    #[tokio::test]
    async fn annotation_is_deterministic() {
        let decoder = decoder();
        let usdt = address!("dac17f958d2ee523a2206206994597c13d831ec7");
        let calldata = transferCall {
            to:     Address::with_last_byte(7),
            amount: U256::from(42u64)
        }
        .abi_encode();
        let tx = tx_to(Some(usdt), U256::ZERO, Bytes::from(calldata));

        let first = decoder.annotate(&tx).await;
        let second = decoder.annotate(&tx).await;
        assert_eq!(first, second);
    }

    #[test]
    fn token_extraction_reads_aligned_words() {
        let weth = address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
        let usdc = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");

        let mut input = vec![0x38, 0xed, 0x17, 0x39];
        let mut word_a = [0u8; 32];
        word_a[12..].copy_from_slice(weth.as_slice());
        let mut word_b = [0u8; 32];
        word_b[12..].copy_from_slice(usdc.as_slice());
        input.extend_from_slice(&word_a);
        input.extend_from_slice(&word_b);

        assert_eq!(extract_token_candidates(&input), vec![weth, usdc]);
        // too short for a selector
        assert!(extract_token_candidates(&[0x01]).is_empty());
    }
}
