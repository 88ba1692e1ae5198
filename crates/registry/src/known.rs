//! Static table of well-known mainnet contracts and tokens.

use std::{collections::HashMap, sync::LazyLock};

use alloy_primitives::{address, Address};
use blockcast_types::{ContractKind, TokenInfo};

/// A statically known protocol contract. `abi` is an abbreviated schema
/// covering the handful of methods worth decoding arguments for.
#[derive(Debug, Clone, Copy)]
pub struct KnownContract {
    pub name:     &'static str,
    pub protocol: &'static str,
    pub kind:     ContractKind,
    pub abi:      Option<&'static str>
}

/// Abbreviated Uniswap-V2-style router schema shared by the V2 forks.
const V2_ROUTER_ABI: &str = r#"[
  {"type":"function","name":"swapExactTokensForTokens","inputs":[{"name":"amountIn","type":"uint256"},{"name":"amountOutMin","type":"uint256"},{"name":"path","type":"address[]"},{"name":"to","type":"address"},{"name":"deadline","type":"uint256"}],"outputs":[{"name":"amounts","type":"uint256[]"}],"stateMutability":"nonpayable"},
  {"type":"function","name":"swapExactETHForTokens","inputs":[{"name":"amountOutMin","type":"uint256"},{"name":"path","type":"address[]"},{"name":"to","type":"address"},{"name":"deadline","type":"uint256"}],"outputs":[{"name":"amounts","type":"uint256[]"}],"stateMutability":"payable"},
  {"type":"function","name":"swapExactTokensForETH","inputs":[{"name":"amountIn","type":"uint256"},{"name":"amountOutMin","type":"uint256"},{"name":"path","type":"address[]"},{"name":"to","type":"address"},{"name":"deadline","type":"uint256"}],"outputs":[{"name":"amounts","type":"uint256[]"}],"stateMutability":"nonpayable"},
  {"type":"function","name":"addLiquidity","inputs":[{"name":"tokenA","type":"address"},{"name":"tokenB","type":"address"},{"name":"amountADesired","type":"uint256"},{"name":"amountBDesired","type":"uint256"},{"name":"amountAMin","type":"uint256"},{"name":"amountBMin","type":"uint256"},{"name":"to","type":"address"},{"name":"deadline","type":"uint256"}],"outputs":[{"name":"amountA","type":"uint256"},{"name":"amountB","type":"uint256"},{"name":"liquidity","type":"uint256"}],"stateMutability":"nonpayable"}
]"#;

const ERC20_ABI: &str = r#"[
  {"type":"function","name":"transfer","inputs":[{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],"outputs":[{"name":"","type":"bool"}],"stateMutability":"nonpayable"},
  {"type":"function","name":"transferFrom","inputs":[{"name":"from","type":"address"},{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],"outputs":[{"name":"","type":"bool"}],"stateMutability":"nonpayable"},
  {"type":"function","name":"approve","inputs":[{"name":"spender","type":"address"},{"name":"amount","type":"uint256"}],"outputs":[{"name":"","type":"bool"}],"stateMutability":"nonpayable"}
]"#;

static KNOWN_CONTRACTS: LazyLock<HashMap<Address, KnownContract>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    let mut insert = |addr: Address, entry: KnownContract| {
        map.insert(addr, entry);
    };

    // dex routers & pools
    insert(
        address!("7a250d5630b4cf539739df2c5dacb4c659f2488d"),
        KnownContract {
            name:     "UniswapV2Router02",
            protocol: "Uniswap V2",
            kind:     ContractKind::Dex,
            abi:      Some(V2_ROUTER_ABI)
        }
    );
    insert(
        address!("e592427a0aece92de3edee1f18e0157c05861564"),
        KnownContract {
            name:     "SwapRouter",
            protocol: "Uniswap V3",
            kind:     ContractKind::Dex,
            abi:      None
        }
    );
    insert(
        address!("68b3465833fb72a70ecdf485e0e4c7bd8665fc45"),
        KnownContract {
            name:     "SwapRouter02",
            protocol: "Uniswap V3",
            kind:     ContractKind::Dex,
            abi:      None
        }
    );
    insert(
        address!("ef1c6e67703c7bd7107eed8303fbe6ec2554bf6b"),
        KnownContract {
            name:     "UniversalRouter",
            protocol: "Uniswap",
            kind:     ContractKind::Dex,
            abi:      None
        }
    );
    insert(
        address!("d9e1ce17f2641f24ae83637ab66a2cca9c378b9f"),
        KnownContract {
            name:     "SushiSwapRouter",
            protocol: "SushiSwap",
            kind:     ContractKind::Dex,
            abi:      Some(V2_ROUTER_ABI)
        }
    );
    insert(
        address!("1111111254eeb25477b68fb85ed929f73a960582"),
        KnownContract {
            name:     "AggregationRouterV5",
            protocol: "1inch",
            kind:     ContractKind::Dex,
            abi:      None
        }
    );
    insert(
        address!("def1c0ded9bec7f1a1670819833240f027b25eff"),
        KnownContract {
            name:     "ExchangeProxy",
            protocol: "0x Protocol",
            kind:     ContractKind::Dex,
            abi:      None
        }
    );
    insert(
        address!("bebc44782c7db0a1a60cb6fe97d0b483032ff1c7"),
        KnownContract {
            name:     "3pool",
            protocol: "Curve",
            kind:     ContractKind::Dex,
            abi:      None
        }
    );
    insert(
        address!("ba12222222228d8ba445958a75a0704d566bf2c8"),
        KnownContract {
            name:     "Vault",
            protocol: "Balancer",
            kind:     ContractKind::Dex,
            abi:      None
        }
    );

    // lending
    insert(
        address!("7d2768de32b0b80b7a3454c06bdac94a69ddc7a9"),
        KnownContract {
            name:     "LendingPool",
            protocol: "Aave V2",
            kind:     ContractKind::Lending,
            abi:      None
        }
    );
    insert(
        address!("87870bca3f3fd6335c3f4ce8392d69350b4fa4e2"),
        KnownContract {
            name:     "Pool",
            protocol: "Aave V3",
            kind:     ContractKind::Lending,
            abi:      None
        }
    );
    insert(
        address!("3d9819210a31b4961b30ef54be2aed79b9c9cd3b"),
        KnownContract {
            name:     "Comptroller",
            protocol: "Compound",
            kind:     ContractKind::Lending,
            abi:      None
        }
    );

    // bridges
    insert(
        address!("4dbd4fc535ac27206064b68ffcf827b0a60bab3f"),
        KnownContract {
            name:     "DelayedInbox",
            protocol: "Arbitrum",
            kind:     ContractKind::Bridge,
            abi:      None
        }
    );
    insert(
        address!("99c9fc46f92e8a1c0dec1b1747d010903e884be1"),
        KnownContract {
            name:     "L1StandardBridge",
            protocol: "Optimism",
            kind:     ContractKind::Bridge,
            abi:      None
        }
    );
    insert(
        address!("a0c68c638235ee32657e8f720a23cec1bfc77c77"),
        KnownContract {
            name:     "RootChainManager",
            protocol: "Polygon",
            kind:     ContractKind::Bridge,
            abi:      None
        }
    );
    insert(
        address!("32400084c286cf3e17e7b677ea9583e60a000324"),
        KnownContract {
            name:     "DiamondProxy",
            protocol: "zkSync Era",
            kind:     ContractKind::Bridge,
            abi:      None
        }
    );

    // nft marketplaces
    insert(
        address!("00000000000000adc04c56bf30ac9d3c0aaf14dc"),
        KnownContract {
            name:     "Seaport",
            protocol: "OpenSea",
            kind:     ContractKind::Nft,
            abi:      None
        }
    );
    insert(
        address!("000000000000ad05ccc4f10045630fb830b95127"),
        KnownContract {
            name:     "BlurExchange",
            protocol: "Blur",
            kind:     ContractKind::Nft,
            abi:      None
        }
    );

    // oracles
    insert(
        address!("5f4ec3df9cbd43714fe2740f5e3616155c5b8419"),
        KnownContract {
            name:     "ETH/USD",
            protocol: "Chainlink",
            kind:     ContractKind::Oracle,
            abi:      None
        }
    );

    // common tokens
    for (addr, symbol) in [
        (address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"), "WETH"),
        (address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"), "USDC"),
        (address!("dac17f958d2ee523a2206206994597c13d831ec7"), "USDT"),
        (address!("6b175474e89094c44da98b954eedeac495271d0f"), "DAI"),
        (address!("2260fac5e5542a773aa44fbcfedf7c193bc2c599"), "WBTC"),
    ] {
        insert(
            addr,
            KnownContract {
                name:     symbol,
                protocol: symbol,
                kind:     ContractKind::Token,
                abi:      Some(ERC20_ABI)
            }
        );
    }

    map
});

static KNOWN_TOKENS: LazyLock<HashMap<Address, TokenInfo>> = LazyLock::new(|| {
    [
        (address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"), "WETH", 18u8),
        (address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"), "USDC", 6),
        (address!("dac17f958d2ee523a2206206994597c13d831ec7"), "USDT", 6),
        (address!("6b175474e89094c44da98b954eedeac495271d0f"), "DAI", 18),
        (address!("2260fac5e5542a773aa44fbcfedf7c193bc2c599"), "WBTC", 8),
    ]
    .into_iter()
    .map(|(address, symbol, decimals)| {
        (address, TokenInfo { address, symbol: symbol.to_string(), decimals })
    })
    .collect()
});

pub fn known_contract(address: Address) -> Option<&'static KnownContract> {
    KNOWN_CONTRACTS.get(&address)
}

pub fn known_token(address: Address) -> Option<&'static TokenInfo> {
    KNOWN_TOKENS.get(&address)
}

/// Addresses the decoder treats as bridge entry points even when the
/// selector is unrecognized.
pub fn is_bridge_contract(address: Address) -> bool {
    known_contract(address).is_some_and(|known| known.kind == ContractKind::Bridge)
}
