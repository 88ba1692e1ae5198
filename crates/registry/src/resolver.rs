use alloy_primitives::Address;
use serde::Deserialize;
use tracing::debug;

const SOURCIFY_BASE: &str = "https://repo.sourcify.dev/contracts/full_match/1";
const ETHERSCAN_BASE: &str = "https://api.etherscan.io/api";
const FOURBYTE_BASE: &str = "https://www.4byte.directory/api/v1/signatures/";

/// What an external lookup produced for a contract address.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedContract {
    pub name: Option<String>,
    pub abi:  String
}

/// External ABI and signature resolvers. All failures degrade to `None`;
/// the registry records the miss so the address is never retried.
#[derive(Debug, Clone)]
pub(crate) struct ExternalResolver {
    http:          reqwest::Client,
    etherscan_key: Option<String>
}

impl ExternalResolver {
    pub(crate) fn new(http: reqwest::Client, etherscan_key: Option<String>) -> Self {
        Self { http, etherscan_key }
    }

    /// Sourcify first, then Etherscan when a key is configured.
    pub(crate) async fn resolve_contract(&self, address: Address) -> Option<ResolvedContract> {
        if let Some(resolved) = self.sourcify(address).await {
            return Some(resolved)
        }
        if self.etherscan_key.is_some() {
            return self.etherscan(address).await
        }
        None
    }

    async fn sourcify(&self, address: Address) -> Option<ResolvedContract> {
        #[derive(Deserialize)]
        struct Metadata {
            output:   MetadataOutput,
            #[serde(default)]
            settings: MetadataSettings
        }
        #[derive(Deserialize)]
        struct MetadataOutput {
            abi: serde_json::Value
        }
        #[derive(Deserialize, Default)]
        struct MetadataSettings {
            #[serde(rename = "compilationTarget", default)]
            compilation_target: std::collections::BTreeMap<String, String>
        }

        let url = format!("{SOURCIFY_BASE}/{address:?}/metadata.json");
        let response = match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                debug!(target: "registry", %address, status = %response.status(), "sourcify miss");
                return None
            }
            Err(err) => {
                debug!(target: "registry", %address, %err, "sourcify request failed");
                return None
            }
        };

        let metadata: Metadata = response.json().await.ok()?;
        let name = metadata.settings.compilation_target.into_values().next();
        Some(ResolvedContract { name, abi: metadata.output.abi.to_string() })
    }

    async fn etherscan(&self, address: Address) -> Option<ResolvedContract> {
        #[derive(Deserialize)]
        struct Envelope {
            status: String,
            result: Vec<SourceRow>
        }
        #[derive(Deserialize)]
        struct SourceRow {
            #[serde(rename = "ABI")]
            abi:           String,
            #[serde(rename = "ContractName")]
            contract_name: String
        }

        let key = self.etherscan_key.as_deref()?;
        let url = format!(
            "{ETHERSCAN_BASE}?module=contract&action=getsourcecode&address={address:?}&apikey={key}"
        );

        let envelope: Envelope = match self.http.get(&url).send().await {
            Ok(response) => response.json().await.ok()?,
            Err(err) => {
                debug!(target: "registry", %address, %err, "etherscan request failed");
                return None
            }
        };

        if envelope.status != "1" {
            return None
        }
        let row = envelope.result.into_iter().next()?;
        // unverified contracts answer with a sentinel string, not an error
        if !row.abi.starts_with('[') {
            return None
        }

        let name = (!row.contract_name.is_empty()).then_some(row.contract_name);
        Some(ResolvedContract { name, abi: row.abi })
    }

    /// Public 4-byte directory. Earliest registered signature wins, which is
    /// almost always the canonical one.
    pub(crate) async fn resolve_signature(&self, selector: [u8; 4]) -> Option<String> {
        #[derive(Deserialize)]
        struct Page {
            results: Vec<Signature>
        }
        #[derive(Deserialize)]
        struct Signature {
            id:             u64,
            text_signature: String
        }

        let hex = alloy_primitives::hex::encode(selector);
        let url = format!("{FOURBYTE_BASE}?hex_signature=0x{hex}");

        let page: Page = match self.http.get(&url).send().await {
            Ok(response) => response.json().await.ok()?,
            Err(err) => {
                debug!(target: "registry", selector = %hex, %err, "4byte request failed");
                return None
            }
        };

        let earliest = page.results.into_iter().min_by_key(|sig| sig.id)?;
        let name = earliest
            .text_signature
            .split('(')
            .next()
            .unwrap_or(&earliest.text_signature)
            .to_string();
        (!name.is_empty()).then_some(name)
    }
}
