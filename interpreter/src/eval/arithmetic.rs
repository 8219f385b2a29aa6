use core::cmp::Ordering;
use core::ops::Rem;

use primitive_types::{U256, U512};

const SIGN_BIT: U256 = U256([0, 0, 0, 0x8000000000000000]);

fn is_negative(value: &U256) -> bool {
	value.bit(255)
}

/// Two's complement negation.
fn twos_neg(value: U256) -> U256 {
	(!value).overflowing_add(U256::one()).0
}

pub fn div(op1: U256, op2: U256) -> U256 {
	if op2.is_zero() {
		U256::zero()
	} else {
		op1 / op2
	}
}

pub fn sdiv(op1: U256, op2: U256) -> U256 {
	if op2.is_zero() {
		return U256::zero();
	}

	// MIN / -1 overflows back to MIN.
	if op1 == SIGN_BIT && op2 == !U256::zero() {
		return SIGN_BIT;
	}

	let negative = is_negative(&op1) != is_negative(&op2);
	let abs1 = if is_negative(&op1) { twos_neg(op1) } else { op1 };
	let abs2 = if is_negative(&op2) { twos_neg(op2) } else { op2 };

	let quotient = abs1 / abs2;
	if negative {
		twos_neg(quotient)
	} else {
		quotient
	}
}

pub fn rem(op1: U256, op2: U256) -> U256 {
	if op2.is_zero() {
		U256::zero()
	} else {
		op1.rem(op2)
	}
}

pub fn srem(op1: U256, op2: U256) -> U256 {
	if op2.is_zero() {
		return U256::zero();
	}

	// The sign of the result follows the dividend.
	let abs1 = if is_negative(&op1) { twos_neg(op1) } else { op1 };
	let abs2 = if is_negative(&op2) { twos_neg(op2) } else { op2 };

	let remainder = abs1.rem(abs2);
	if is_negative(&op1) {
		twos_neg(remainder)
	} else {
		remainder
	}
}

pub fn addmod(op1: U256, op2: U256, op3: U256) -> U256 {
	if op3.is_zero() {
		return U256::zero();
	}

	let op1: U512 = op1.into();
	let op2: U512 = op2.into();
	let op3: U512 = op3.into();
	let v = (op1 + op2) % op3;
	v.try_into()
		.expect("modulus fits in U256; the remainder must as well")
}

pub fn mulmod(op1: U256, op2: U256, op3: U256) -> U256 {
	if op3.is_zero() {
		return U256::zero();
	}

	let op3: U512 = op3.into();
	let v = op1.full_mul(op2) % op3;
	v.try_into()
		.expect("modulus fits in U256; the remainder must as well")
}

pub fn exp(op1: U256, op2: U256) -> U256 {
	let mut op1 = op1;
	let mut op2 = op2;
	let mut r = U256::one();

	while !op2.is_zero() {
		if op2.bit(0) {
			r = r.overflowing_mul(op1).0;
		}
		op2 = op2 >> 1usize;
		op1 = op1.overflowing_mul(op1).0;
	}

	r
}

/// Extend the sign of a `t + 1`-byte value to the full word.
pub fn signextend(op1: U256, op2: U256) -> U256 {
	if op1 >= U256::from(31) {
		return op2;
	}

	let byte_index = op1.as_usize();
	let bit_index = byte_index * 8 + 7;
	if op2.bit(bit_index) {
		let mask = (U256::one() << (bit_index + 1)) - U256::one();
		op2 | !mask
	} else {
		let mask = (U256::one() << (bit_index + 1)) - U256::one();
		op2 & mask
	}
}

pub fn slt(op1: U256, op2: U256) -> U256 {
	let ret = match (is_negative(&op1), is_negative(&op2)) {
		(true, false) => true,
		(false, true) => false,
		_ => op1 < op2,
	};
	if ret {
		U256::one()
	} else {
		U256::zero()
	}
}

pub fn sgt(op1: U256, op2: U256) -> U256 {
	let ret = match (is_negative(&op1), is_negative(&op2)) {
		(true, false) => false,
		(false, true) => true,
		_ => op1 > op2,
	};
	if ret {
		U256::one()
	} else {
		U256::zero()
	}
}

/// Arithmetic (sign-preserving) right shift.
pub fn sar(shift: U256, value: U256) -> U256 {
	let negative = is_negative(&value);

	if shift >= U256::from(256) {
		return if negative { !U256::zero() } else { U256::zero() };
	}

	let shift = shift.as_usize();
	let shifted = value >> shift;
	if negative && shift > 0 {
		// Fill the vacated high bits with ones.
		shifted | (!U256::zero() << (256 - shift))
	} else {
		shifted
	}
}

pub fn sign_compare(op1: &U256, op2: &U256) -> Ordering {
	match (is_negative(op1), is_negative(op2)) {
		(true, false) => Ordering::Less,
		(false, true) => Ordering::Greater,
		_ => op1.cmp(op2),
	}
}
