use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::annotation::{TxCategory, TxKind};

/// Broad classification a registry entry carries for a contract address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractKind {
    Dex,
    Lending,
    Bridge,
    Oracle,
    Nft,
    Token
}

impl ContractKind {
    /// Default annotation for a call into a contract of this kind when the
    /// selector itself was not recognized.
    pub fn annotation_hint(&self) -> (TxKind, TxCategory) {
        match self {
            Self::Dex => (TxKind::Swap, TxCategory::Dex),
            Self::Lending => (TxKind::Lending, TxCategory::Defi),
            Self::Bridge => (TxKind::Bridge, TxCategory::Bridge),
            Self::Token => (TxKind::Transfer, TxCategory::Token),
            Self::Oracle | Self::Nft => (TxKind::Unknown, TxCategory::Other)
        }
    }
}

/// Cached knowledge about a contract address.
///
/// `fetch_attempted` records that an external lookup already failed for this
/// address; it is never retried unless the entry is invalidated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractCacheEntry {
    pub address:         Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_name:   Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol:        Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind:            Option<ContractKind>,
    /// Raw ABI JSON as fetched; parsed on use.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abi:             Option<String>,
    pub verified:        bool,
    pub fetch_attempted: bool,
    pub call_count:      u64
}

impl ContractCacheEntry {
    pub fn empty(address: Address) -> Self {
        Self {
            address,
            contract_name: None,
            protocol: None,
            kind: None,
            abi: None,
            verified: false,
            fetch_attempted: false,
            call_count: 0
        }
    }

    /// Marker entry for an address whose external lookup came back empty.
    pub fn attempted(address: Address) -> Self {
        Self { fetch_attempted: true, ..Self::empty(address) }
    }

    /// Whether the entry carries anything beyond bookkeeping.
    pub fn is_resolved(&self) -> bool {
        self.contract_name.is_some() || self.protocol.is_some() || self.abi.is_some()
    }
}

/// ERC-20 metadata resolved for a token address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address:  Address,
    pub symbol:   String,
    pub decimals: u8
}
