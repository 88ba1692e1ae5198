//! Selector sets driving the classification ladder.

use hex_literal::hex;

/// Common Uniswap V2/V3 router selectors and aggregator variants.
pub const SWAP_SELECTORS: &[[u8; 4]] = &[
    // v2 routers
    hex!("38ed1739"), // swapExactTokensForTokens
    hex!("8803dbee"), // swapTokensForExactTokens
    hex!("7ff36ab5"), // swapExactETHForTokens
    hex!("4a25d94a"), // swapTokensForExactETH
    hex!("18cbafe5"), // swapExactTokensForETH
    hex!("fb3bdb41"), // swapETHForExactTokens
    hex!("5c11d795"), // swapExactTokensForTokensSupportingFeeOnTransferTokens
    hex!("b6f9de95"), // swapExactETHForTokensSupportingFeeOnTransferTokens
    hex!("791ac947"), // swapExactTokensForETHSupportingFeeOnTransferTokens
    // v3 / universal router
    hex!("414bf389"), // exactInputSingle
    hex!("c04b8d59"), // exactInput
    hex!("db3e2198"), // exactOutputSingle
    hex!("f28c0498"), // exactOutput
    hex!("5ae401dc"), // multicall(deadline,bytes[])
    hex!("3593564c"), // execute
    // 1inch
    hex!("12aa3caf"), // swap
    hex!("0502b1c5"), // unoswap
    hex!("e449022e"), // uniswapV3Swap
];

pub const LIQUIDITY_SELECTORS: &[[u8; 4]] = &[
    hex!("e8e33700"), // addLiquidity
    hex!("f305d719"), // addLiquidityETH
    hex!("baa2abde"), // removeLiquidity
    hex!("02751cec"), // removeLiquidityETH
    hex!("88316456"), // mint (v3 position)
    hex!("219f5d17"), // increaseLiquidity
    hex!("0c49ccbe"), // decreaseLiquidity
];

pub const LENDING_SELECTORS: &[[u8; 4]] = &[
    hex!("e8eda9df"), // deposit (aave v2)
    hex!("617ba037"), // supply (aave v3)
    hex!("69328dec"), // withdraw
    hex!("a415bcad"), // borrow
    hex!("573ade81"), // repay
];

pub const BRIDGE_SELECTORS: &[[u8; 4]] = &[
    hex!("439370b1"), // depositEth (arbitrum)
    hex!("9a2ac6d5"), // depositETHTo (optimism)
    hex!("58a997f6"), // depositERC20
    hex!("eb672419"), // requestL2Transaction (zksync)
];

pub fn is_swap(selector: [u8; 4]) -> bool {
    SWAP_SELECTORS.contains(&selector)
}

pub fn is_liquidity(selector: [u8; 4]) -> bool {
    LIQUIDITY_SELECTORS.contains(&selector)
}

pub fn is_lending(selector: [u8; 4]) -> bool {
    LENDING_SELECTORS.contains(&selector)
}

pub fn is_bridge(selector: [u8; 4]) -> bool {
    BRIDGE_SELECTORS.contains(&selector)
}
