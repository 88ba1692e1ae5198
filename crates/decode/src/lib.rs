//! Turns raw pending transactions into [`TxAnnotation`]s.
//!
//! Classification walks a fixed ladder: contract creation, ERC-20 methods,
//! swap/liquidity/lending/bridge selector sets, registry type tags, native
//! value transfers, then unknown. Argument decoding uses the built-in ERC-20
//! schema or a per-contract ABI from the registry. The decoder never fails:
//! malformed input degrades to an unknown annotation.

mod abi;
mod decoder;
mod erc20;
pub mod selectors;
mod tokens;

pub use decoder::Decoder;
