use std::collections::BTreeMap;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// What a transaction does, as far as decoding could tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    Swap,
    Liquidity,
    Bridge,
    Lending,
    Transfer,
    Sandwich,
    ContractCreation,
    #[default]
    Unknown
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Swap => "swap",
            Self::Liquidity => "liquidity",
            Self::Bridge => "bridge",
            Self::Lending => "lending",
            Self::Transfer => "transfer",
            Self::Sandwich => "sandwich",
            Self::ContractCreation => "contract_creation",
            Self::Unknown => "unknown"
        }
    }
}

/// Coarse bucket the transaction falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxCategory {
    Dex,
    Defi,
    Bridge,
    Token,
    Native,
    Deployment,
    #[default]
    Other
}

/// Decoded interpretation of a pending transaction.
///
/// Pure function of `(to, value, calldata)` against a registry snapshot.
/// Decoded integers are carried as decimal strings so the serialized form
/// never round-trips through floats.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxAnnotation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol:           Option<String>,
    #[serde(rename = "type")]
    pub kind:               TxKind,
    pub category:           TxCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method:             Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params:             Option<BTreeMap<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_sandwich_target: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token:              Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_symbol:       Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_decimals:     Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_amount:       Option<String>
}

impl TxAnnotation {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn new(kind: TxKind, category: TxCategory) -> Self {
        Self { kind, category, ..Default::default() }
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&TxKind::ContractCreation).unwrap();
        assert_eq!(json, "\"contract_creation\"");
    }

    #[test]
    fn annotation_round_trips() {
        let mut params = BTreeMap::new();
        params.insert(
            "amount".to_string(),
            serde_json::Value::String("1000000000000000000".to_string())
        );

        let ann = TxAnnotation::new(TxKind::Transfer, TxCategory::Token)
            .with_protocol("USDC")
            .with_method("transfer");
        let ann = TxAnnotation { params: Some(params), ..ann };

        let json = serde_json::to_string(&ann).unwrap();
        let back: TxAnnotation = serde_json::from_str(&json).unwrap();
        assert_eq!(ann, back);
        // the closed "type" field survives the rename
        assert!(json.contains("\"type\":\"transfer\""));
    }

    #[test]
    fn sandwich_target_flag_omitted_when_false() {
        let ann = TxAnnotation::new(TxKind::Swap, TxCategory::Dex);
        let json = serde_json::to_string(&ann).unwrap();
        assert!(!json.contains("isSandwichTarget"));
    }
}
