//! Dynamic argument decoding against a per-contract ABI from the registry.

use std::collections::BTreeMap;

use alloy_dyn_abi::{DynSolValue, JsonAbiExt};
use alloy_json_abi::JsonAbi;
use alloy_primitives::hex;
use serde_json::Value;

/// Decodes `input` against the function matching its selector. Returns the
/// function name and a name -> value mapping with integers rendered as
/// decimal strings.
pub(crate) fn decode_with_abi(
    abi_json: &str,
    selector: [u8; 4],
    input: &[u8]
) -> Option<(String, BTreeMap<String, Value>)> {
    if input.len() < 4 {
        return None
    }

    let abi: JsonAbi = serde_json::from_str(abi_json).ok()?;
    let function = abi.functions().find(|f| f.selector().0 == selector)?;
    let values = function.abi_decode_input(&input[4..], true).ok()?;

    let mut params = BTreeMap::new();
    for (index, (param, value)) in function.inputs.iter().zip(values.iter()).enumerate() {
        let key = if param.name.is_empty() {
            format!("arg{index}")
        } else {
            param.name.clone()
        };
        params.insert(key, dyn_value_to_json(value));
    }

    Some((function.name.clone(), params))
}

fn dyn_value_to_json(value: &DynSolValue) -> Value {
    match value {
        DynSolValue::Address(address) => Value::String(address.to_string()),
        DynSolValue::Uint(value, _) => Value::String(value.to_string()),
        DynSolValue::Int(value, _) => Value::String(value.to_string()),
        DynSolValue::Bool(value) => Value::Bool(*value),
        DynSolValue::String(value) => Value::String(value.clone()),
        DynSolValue::Bytes(bytes) => Value::String(format!("0x{}", hex::encode(bytes))),
        DynSolValue::FixedBytes(word, size) => {
            Value::String(format!("0x{}", hex::encode(&word[..*size])))
        }
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) => {
            Value::Array(items.iter().map(dyn_value_to_json).collect())
        }
        DynSolValue::Tuple(items) => Value::Array(items.iter().map(dyn_value_to_json).collect()),
        _ => Value::Null
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, U256};
    use alloy_sol_macro::sol;
    use alloy_sol_types::SolCall;

    use super::*;

    sol! {
        function swapExactTokensForTokens(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] path,
            address to,
            uint256 deadline
        ) returns (uint256[] amounts);
    }

    const ROUTER_ABI: &str = r#"[
      {"type":"function","name":"swapExactTokensForTokens","inputs":[{"name":"amountIn","type":"uint256"},{"name":"amountOutMin","type":"uint256"},{"name":"path","type":"address[]"},{"name":"to","type":"address"},{"name":"deadline","type":"uint256"}],"outputs":[{"name":"amounts","type":"uint256[]"}],"stateMutability":"nonpayable"}
    ]"#;

    #[test]
    fn decodes_router_swap() {
        let weth = address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
        let usdc = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
        let call = swapExactTokensForTokensCall {
            amountIn:     U256::from(10u64).pow(U256::from(18u8)),
            amountOutMin: U256::from(2500u64),
            path:         vec![weth, usdc],
            to:           address!("2222222222222222222222222222222222222222"),
            deadline:     U256::from(1_700_000_000u64)
        };
        let calldata = call.abi_encode();
        let selector = calldata[..4].try_into().unwrap();

        let (name, params) = decode_with_abi(ROUTER_ABI, selector, &calldata).unwrap();
        assert_eq!(name, "swapExactTokensForTokens");
        assert_eq!(
            params.get("amountIn"),
            Some(&Value::String("1000000000000000000".to_string()))
        );
        let path = params.get("path").unwrap().as_array().unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path[0], Value::String(weth.to_string()));
    }

    #[test]
    fn unknown_selector_yields_none() {
        assert!(decode_with_abi(ROUTER_ABI, [0u8; 4], &[0u8; 68]).is_none());
    }

    #[test]
    fn malformed_abi_yields_none() {
        assert!(decode_with_abi("not json", [0u8; 4], &[0u8; 68]).is_none());
    }
}
