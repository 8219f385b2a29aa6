//! Small conversions between the word and hash/address types.

use primitive_types::{H160, H256, U256};

#[must_use]
pub fn u256_to_h256(value: U256) -> H256 {
	let mut ret = H256::default();
	value.to_big_endian(&mut ret[..]);
	ret
}

#[must_use]
pub fn h256_to_u256(value: H256) -> U256 {
	U256::from_big_endian(&value[..])
}

#[must_use]
pub fn u256_to_h160(value: U256) -> H160 {
	let hash = u256_to_h256(value);
	H160::from_slice(&hash[12..])
}

#[must_use]
pub fn h160_to_u256(value: H160) -> U256 {
	let mut padded = [0u8; 32];
	padded[12..].copy_from_slice(&value[..]);
	U256::from_big_endian(&padded)
}

/// Number of 32-byte words needed to hold `len` bytes.
#[must_use]
pub fn num_words(len: u64) -> u64 {
	(len + 31) / 32
}
