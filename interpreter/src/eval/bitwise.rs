use primitive_types::U256;

pub fn iszero(op1: U256) -> U256 {
	if op1.is_zero() {
		U256::one()
	} else {
		U256::zero()
	}
}

pub fn not(op1: U256) -> U256 {
	!op1
}

/// The `i`-th byte of the word, counting from the most significant.
pub fn byte(op1: U256, op2: U256) -> U256 {
	if op1 >= U256::from(32) {
		return U256::zero();
	}

	let index = op1.as_usize();
	U256::from(op2.byte(31 - index))
}

pub fn shl(shift: U256, value: U256) -> U256 {
	if shift >= U256::from(256) {
		U256::zero()
	} else {
		value << shift.as_usize()
	}
}

pub fn shr(shift: U256, value: U256) -> U256 {
	if shift >= U256::from(256) {
		U256::zero()
	} else {
		value >> shift.as_usize()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn byte_indexing_is_big_endian() {
		let value = U256::from_big_endian(&{
			let mut bytes = [0u8; 32];
			bytes[0] = 0xaa;
			bytes[31] = 0xbb;
			bytes
		});
		assert_eq!(byte(U256::zero(), value), U256::from(0xaa));
		assert_eq!(byte(U256::from(31), value), U256::from(0xbb));
		assert_eq!(byte(U256::from(32), value), U256::zero());
	}

	#[test]
	fn out_of_range_shifts() {
		assert_eq!(shl(U256::from(256), U256::one()), U256::zero());
		assert_eq!(shr(U256::from(256), U256::one()), U256::zero());
		assert_eq!(shl(U256::from(255), U256::one()), U256::one() << 255);
	}
}
