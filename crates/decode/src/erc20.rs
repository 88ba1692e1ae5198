//! Built-in ERC-20 schema. These three methods are frequent enough that
//! decoding must not depend on any fetched ABI.

use std::collections::BTreeMap;

use alloy_primitives::U256;
use alloy_sol_macro::sol;
use alloy_sol_types::SolCall;
use blockcast_registry::selectors::{APPROVE, TRANSFER, TRANSFER_FROM};
use serde_json::Value;

sol! {
    function transfer(address to, uint256 amount) returns (bool);
    function transferFrom(address from, address to, uint256 amount) returns (bool);
    function approve(address spender, uint256 amount) returns (bool);
    function symbol() returns (string);
    function decimals() returns (uint8);
}

#[derive(Debug)]
pub(crate) struct DecodedErc20 {
    pub method: &'static str,
    /// Raw token amount; scaled for display once decimals are known.
    pub amount: U256,
    pub params: BTreeMap<String, Value>
}

pub(crate) fn decode(selector: [u8; 4], input: &[u8]) -> Option<DecodedErc20> {
    let mut params = BTreeMap::new();

    match selector {
        TRANSFER => {
            let call = transferCall::abi_decode(input, true).ok()?;
            params.insert("to".into(), Value::String(call.to.to_string()));
            params.insert("amount".into(), Value::String(call.amount.to_string()));
            Some(DecodedErc20 { method: "transfer", amount: call.amount, params })
        }
        TRANSFER_FROM => {
            let call = transferFromCall::abi_decode(input, true).ok()?;
            params.insert("from".into(), Value::String(call.from.to_string()));
            params.insert("to".into(), Value::String(call.to.to_string()));
            params.insert("amount".into(), Value::String(call.amount.to_string()));
            Some(DecodedErc20 { method: "transferFrom", amount: call.amount, params })
        }
        APPROVE => {
            let call = approveCall::abi_decode(input, true).ok()?;
            params.insert("spender".into(), Value::String(call.spender.to_string()));
            params.insert("amount".into(), Value::String(call.amount.to_string()));
            Some(DecodedErc20 { method: "approve", amount: call.amount, params })
        }
        _ => None
    }
}

pub(crate) fn encode_symbol_call() -> Vec<u8> {
    symbolCall {}.abi_encode()
}

pub(crate) fn encode_decimals_call() -> Vec<u8> {
    decimalsCall {}.abi_encode()
}

pub(crate) fn decode_symbol_return(data: &[u8]) -> Option<String> {
    symbolCall::abi_decode_returns(data, true).ok().map(|ret| ret._0)
}

pub(crate) fn decode_decimals_return(data: &[u8]) -> Option<u8> {
    decimalsCall::abi_decode_returns(data, true).ok().map(|ret| ret._0)
}
