//! Embedded 4-byte selector names for the methods that dominate mempool
//! traffic. Anything missing here falls through to the persisted table and
//! the public directory.

use hex_literal::hex;

pub type Selector = [u8; 4];

// erc-20
pub const TRANSFER: Selector = hex!("a9059cbb");
pub const TRANSFER_FROM: Selector = hex!("23b872dd");
pub const APPROVE: Selector = hex!("095ea7b3");

const BUILTIN_NAMES: &[(Selector, &str)] = &[
    (TRANSFER, "transfer"),
    (TRANSFER_FROM, "transferFrom"),
    (APPROVE, "approve"),
    // uniswap v2 style routers
    (hex!("38ed1739"), "swapExactTokensForTokens"),
    (hex!("8803dbee"), "swapTokensForExactTokens"),
    (hex!("7ff36ab5"), "swapExactETHForTokens"),
    (hex!("4a25d94a"), "swapTokensForExactETH"),
    (hex!("18cbafe5"), "swapExactTokensForETH"),
    (hex!("fb3bdb41"), "swapETHForExactTokens"),
    (hex!("5c11d795"), "swapExactTokensForTokensSupportingFeeOnTransferTokens"),
    (hex!("b6f9de95"), "swapExactETHForTokensSupportingFeeOnTransferTokens"),
    (hex!("791ac947"), "swapExactTokensForETHSupportingFeeOnTransferTokens"),
    // uniswap v3 / universal router
    (hex!("414bf389"), "exactInputSingle"),
    (hex!("c04b8d59"), "exactInput"),
    (hex!("db3e2198"), "exactOutputSingle"),
    (hex!("f28c0498"), "exactOutput"),
    (hex!("ac9650d8"), "multicall"),
    (hex!("5ae401dc"), "multicall"),
    (hex!("3593564c"), "execute"),
    // 1inch
    (hex!("12aa3caf"), "swap"),
    (hex!("0502b1c5"), "unoswap"),
    (hex!("e449022e"), "uniswapV3Swap"),
    // liquidity management
    (hex!("e8e33700"), "addLiquidity"),
    (hex!("f305d719"), "addLiquidityETH"),
    (hex!("baa2abde"), "removeLiquidity"),
    (hex!("02751cec"), "removeLiquidityETH"),
    (hex!("88316456"), "mint"),
    (hex!("219f5d17"), "increaseLiquidity"),
    (hex!("0c49ccbe"), "decreaseLiquidity"),
    // lending
    (hex!("e8eda9df"), "deposit"),
    (hex!("617ba037"), "supply"),
    (hex!("69328dec"), "withdraw"),
    (hex!("a415bcad"), "borrow"),
    (hex!("573ade81"), "repay"),
    // bridges
    (hex!("439370b1"), "depositEth"),
    (hex!("9a2ac6d5"), "depositETHTo"),
    (hex!("58a997f6"), "depositERC20"),
    (hex!("eb672419"), "requestL2Transaction"),
];

pub fn builtin_name(selector: Selector) -> Option<&'static str> {
    BUILTIN_NAMES
        .iter()
        .find(|(known, _)| *known == selector)
        .map(|(_, name)| *name)
}
