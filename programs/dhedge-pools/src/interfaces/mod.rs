//! Call-data codec and the external interfaces the pools talk to.
//!
//! Call data is `selector || borsh(args)` where the selector is the first
//! 8 bytes of `sha256("global:<method>")`, the same sighash Anchor uses
//! for instruction discriminators.

use anchor_lang::prelude::*;
use solana_sha256_hasher::hash;

use crate::errors::PoolError;

pub mod aggregator;
pub mod erc20;
pub mod staking;
pub mod uniswap_v2;
pub mod uniswap_v3;

pub type Selector = [u8; 8];

pub const SELECTOR_LEN: usize = 8;

/// Method selector for `name`
pub fn selector(name: &str) -> Selector {
    let preimage = format!("global:{}", name);
    let mut out = [0u8; SELECTOR_LEN];
    out.copy_from_slice(&hash(preimage.as_bytes()).to_bytes()[..SELECTOR_LEN]);
    out
}

/// Encode a call to `method` with borsh arguments
pub fn encode_call<T: AnchorSerialize>(method: &str, args: &T) -> Vec<u8> {
    let mut data = selector(method).to_vec();
    // Writing into a Vec cannot fail
    args.serialize(&mut data).ok();
    data
}

/// Split call data into selector and argument bytes
///
/// Data too short to carry a selector is malformed, never an unclassified
/// call: it fails `invalid transaction data` before any guard looks at it.
pub fn split_selector(data: &[u8]) -> Result<(Selector, &[u8])> {
    require!(data.len() >= SELECTOR_LEN, PoolError::InvalidTransactionData);
    let mut sel = [0u8; SELECTOR_LEN];
    sel.copy_from_slice(&data[..SELECTOR_LEN]);
    Ok((sel, &data[SELECTOR_LEN..]))
}

/// Decode borsh arguments of a recognised call
pub fn decode_args<T: AnchorDeserialize>(args: &[u8]) -> Result<T> {
    T::try_from_slice(args).map_err(|_| error!(PoolError::InvalidTransactionData))
}

/// Borsh-encode a return value
pub fn encode_return<T: AnchorSerialize>(value: &T) -> Vec<u8> {
    let mut data = Vec::new();
    value.serialize(&mut data).ok();
    data
}

/// Decode a borsh return value
pub fn decode_return<T: AnchorDeserialize>(data: &[u8]) -> Result<T> {
    T::try_from_slice(data).map_err(|_| error!(PoolError::InvalidTransactionData))
}
