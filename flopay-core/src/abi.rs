//! Calldata encoding for the three ERC-20 operations the settlement flow
//! uses.
//!
//! Payloads are the 4-byte function selector followed by each argument
//! ABI-encoded into a 32-byte word: addresses are left-padded with zeros,
//! integers are big-endian. No other ABI types are needed here.

use alloy_primitives::{Address, U256, hex};
use thiserror::Error;

/// allowance(address,address)
const ALLOWANCE_SELECTOR: [u8; 4] = [0xdd, 0x62, 0xed, 0x3e];
/// approve(address,uint256)
const APPROVE_SELECTOR: [u8; 4] = [0x09, 0x5e, 0xa7, 0xb3];
/// transfer(address,uint256)
const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

/// Errors from decoding contract call replies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    /// The reply is not a `0x`-prefixed uint256 word.
    #[error("call reply is not a uint256: {0:?}")]
    InvalidUintReply(String),
}

/// An argument of an ERC-20 call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallArg {
    Address(Address),
    Uint(U256),
}

/// Hex-encoded calldata, `0x` + selector + one 64-character word per
/// argument.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct CallData(String);

impl CallData {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for CallData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Encode a selector plus ABI-padded arguments.
///
/// The output length is always `2 + 8 + 64·n` characters for `n` arguments.
fn encode_call(selector: [u8; 4], args: &[CallArg]) -> CallData {
    let mut data = String::with_capacity(2 + 8 + 64 * args.len());
    data.push_str("0x");
    data.push_str(&hex::encode(selector));
    for arg in args {
        let word: [u8; 32] = match arg {
            CallArg::Address(address) => {
                let mut word = [0u8; 32];
                word[12..].copy_from_slice(address.as_slice());
                word
            }
            CallArg::Uint(value) => value.to_be_bytes::<32>(),
        };
        data.push_str(&hex::encode(word));
    }
    CallData(data)
}

/// Calldata for `allowance(owner, spender)`.
pub fn allowance_call(owner: Address, spender: Address) -> CallData {
    encode_call(
        ALLOWANCE_SELECTOR,
        &[CallArg::Address(owner), CallArg::Address(spender)],
    )
}

/// Calldata for an unlimited `approve(spender, uint256::MAX)`.
///
/// The approval is always for the maximum representable amount so that one
/// approval covers any later order.
pub fn approve_call(spender: Address) -> CallData {
    encode_call(
        APPROVE_SELECTOR,
        &[CallArg::Address(spender), CallArg::Uint(U256::MAX)],
    )
}

/// Calldata for `transfer(recipient, amount)`.
pub fn transfer_call(recipient: Address, amount: U256) -> CallData {
    encode_call(
        TRANSFER_SELECTOR,
        &[CallArg::Address(recipient), CallArg::Uint(amount)],
    )
}

/// Decode a read-only call reply into a uint256.
///
/// Replies must be `0x`-prefixed hex of at most one 32-byte word; anything
/// else (including the empty `0x` some nodes return for missing contracts)
/// fails loudly rather than being treated as zero.
pub fn decode_uint_reply(reply: &str) -> Result<U256, AbiError> {
    let invalid = || AbiError::InvalidUintReply(reply.to_string());
    let digits = reply.strip_prefix("0x").ok_or_else(invalid)?;
    if digits.is_empty() || digits.len() > 64 {
        return Err(invalid());
    }
    U256::from_str_radix(digits, 16).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[test]
    fn test_encoded_length() {
        assert_eq!(allowance_call(addr(0x01), addr(0x02)).as_str().len(), 2 + 8 + 64 * 2);
        assert_eq!(approve_call(addr(0x01)).as_str().len(), 2 + 8 + 64 * 2);
        assert_eq!(
            transfer_call(addr(0x01), U256::from(1u8)).as_str().len(),
            2 + 8 + 64 * 2
        );
    }

    #[test]
    fn test_allowance_encoding() {
        let data = allowance_call(addr(0x01), addr(0x02));
        assert_eq!(
            data.as_str(),
            "0xdd62ed3e\
             0000000000000000000000000101010101010101010101010101010101010101\
             0000000000000000000000000202020202020202020202020202020202020202"
        );
    }

    #[test]
    fn test_approve_is_unlimited() {
        let data = approve_call(addr(0x02));
        assert_eq!(
            data.as_str(),
            "0x095ea7b3\
             0000000000000000000000000202020202020202020202020202020202020202\
             ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
        );
    }

    #[test]
    fn test_transfer_encoding() {
        let data = transfer_call(addr(0x02), U256::from(100_000_000u64));
        assert_eq!(
            data.as_str(),
            "0xa9059cbb\
             0000000000000000000000000202020202020202020202020202020202020202\
             0000000000000000000000000000000000000000000000000000000005f5e100"
        );
    }

    #[test]
    fn test_address_round_trips_through_padding() {
        let owner = addr(0xab);
        let data = allowance_call(owner, addr(0x02));
        let padded = &data.as_str()[10..74];
        assert_eq!(&padded[..24], "000000000000000000000000");
        assert_eq!(padded[24..].parse::<Address>().ok(), Some(owner));
    }

    #[test]
    fn test_decode_uint_reply() {
        assert_eq!(decode_uint_reply("0x0").unwrap(), U256::ZERO);
        assert_eq!(
            decode_uint_reply(&format!("0x{:064x}", 100_000_000u64)).unwrap(),
            U256::from(100_000_000u64)
        );
        assert_eq!(decode_uint_reply(&format!("0x{}", "f".repeat(64))).unwrap(), U256::MAX);
    }

    #[test]
    fn test_decode_rejects_malformed_replies() {
        assert!(decode_uint_reply("0x").is_err());
        assert!(decode_uint_reply("1234").is_err());
        assert!(decode_uint_reply("0xzz").is_err());
        assert!(decode_uint_reply(&format!("0x{}", "0".repeat(65))).is_err());
    }
}
