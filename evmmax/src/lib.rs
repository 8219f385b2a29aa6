//! Modular-arithmetic engine for the EVM precompiles.
//!
//! The centrepiece is [`ModArith`], a fixed-width Montgomery multiplication
//! context generic over the word count, on top of which sit the
//! variable-width [`modexp`](crate::modexp::modexp) engine and the
//! short-Weierstrass elliptic-curve operations used by the curve
//! precompiles.

// #![deny(warnings)]
#![cfg_attr(not(feature = "std"), no_std)]

pub mod bn254;
pub mod ecc;
pub mod modexp;
pub mod secp256k1;
pub mod secp256r1;
pub mod uint;

pub use crate::uint::{Uint, U256};

use crate::uint::{adc, mac};

/// Compute the modular inverse of the number modulo 2⁶⁴: `inv * a == 1 mod 2⁶⁴`.
///
/// The argument must be odd, otherwise the inverse does not exist.
/// Uses the Newton–Raphson method; each iteration doubles the number of
/// correct bits, so a 64-bit value needs 6 iterations starting from the
/// inversion mod 2.
#[must_use]
pub const fn inv_mod64(a: u64) -> u64 {
	debug_assert!(a % 2 == 1);

	let mut inv: u64 = 1;
	let mut i = 0;
	while i < 6 {
		inv = inv.wrapping_mul(2u64.wrapping_sub(a.wrapping_mul(inv)));
		i += 1;
	}
	inv
}

/// Modular arithmetic context over an `N`-word unsigned type.
///
/// Montgomery operations (`to_mont`, `from_mont`, `mul`, `inv`) require the
/// modulus to be odd; `add` and `sub` only need it to be positive.
#[derive(Clone, Copy, Debug)]
pub struct ModArith<const N: usize> {
	modulus: Uint<N>,
	/// `R² % modulus` with `R = 2^(N * 64)`.
	r_squared: Uint<N>,
	/// `-modulus⁻¹ mod 2⁶⁴`, so that `modulus * mod_inv == 2⁶⁴ - 1`.
	mod_inv: u64,
}

impl<const N: usize> ModArith<N> {
	/// Create the context, precomputing `R² % modulus` and the negated
	/// 64-bit modulus inverse. The modulus must be at least 3 for the
	/// Montgomery operations to be meaningful.
	#[must_use]
	pub const fn new(modulus: Uint<N>) -> Self {
		// R² % mod as 2^(2 * N * 64) % mod, by modular doubling starting
		// from 1 % mod. This avoids a wide division.
		let mut r_squared = Uint::<N>::ONE;
		if r_squared.ge(&modulus) {
			r_squared = r_squared.wrapping_sub(modulus);
		}
		let mut i = 0;
		while i < 2 * N * 64 {
			r_squared = Self::mod_double(r_squared, &modulus);
			i += 1;
		}

		// The final inverse is negated: mod * mod_inv == -1 mod 2⁶⁴.
		let mod_inv = inv_mod64(modulus.0[0]).wrapping_neg();

		Self {
			modulus,
			r_squared,
			mod_inv,
		}
	}

	const fn mod_double(x: Uint<N>, modulus: &Uint<N>) -> Uint<N> {
		let (s, carry) = x.overflowing_add(x);
		let (d, borrow) = s.overflowing_sub(*modulus);
		if !carry && borrow {
			s
		} else {
			d
		}
	}

	#[must_use]
	pub const fn modulus(&self) -> Uint<N> {
		self.modulus
	}

	/// Convert a value to Montgomery form: `mul(x, R²) = x * R % mod`.
	/// Requires `x < mod`.
	#[must_use]
	pub const fn to_mont(&self, x: Uint<N>) -> Uint<N> {
		self.mul(x, self.r_squared)
	}

	/// Convert a value in Montgomery form back: `mul(x, 1) = x * R⁻¹ % mod`.
	#[must_use]
	pub const fn from_mont(&self, x: Uint<N>) -> Uint<N> {
		self.mul(x, Uint::ONE)
	}

	/// Montgomery modular multiplication: for `x = aR` and `y = bR` returns
	/// `x * y * R⁻¹ % mod = abR % mod`.
	///
	/// Coarsely Integrated Operand Scanning (CIOS), following 2.3.2 of
	/// "High-Speed Algorithms & Architectures For Number-Theoretic
	/// Cryptosystems" (Acar, 1998).
	#[must_use]
	pub const fn mul(&self, x: Uint<N>, y: Uint<N>) -> Uint<N> {
		let m = &self.modulus.0;
		let mut t = [0u64; N];
		// The extra accumulator word t[N].
		let mut t_n: u64 = 0;

		let mut i = 0;
		while i < N {
			// t += x * y[i]
			let mut carry = 0;
			let mut j = 0;
			while j < N {
				let (lo, hi) = mac(t[j], x.0[j], y.0[i], carry);
				t[j] = lo;
				carry = hi;
				j += 1;
			}
			let (sum, d) = adc(t_n, carry, 0);
			t_n = sum;

			// Pick q so the lowest accumulator word cancels, then shift
			// the accumulator down one word while adding q * mod.
			let q = t[0].wrapping_mul(self.mod_inv);
			let (_, mut carry) = mac(t[0], q, m[0], 0);
			let mut j = 1;
			while j < N {
				let (lo, hi) = mac(t[j], q, m[j], carry);
				t[j - 1] = lo;
				carry = hi;
				j += 1;
			}
			let (sum, d2) = adc(t_n, carry, 0);
			t[N - 1] = sum;
			t_n = d + d2;

			i += 1;
		}

		// The accumulator is below 2 * mod; one conditional subtraction
		// brings it into range.
		let value = Uint(t);
		let (reduced, borrow) = value.overflowing_sub(self.modulus);
		if t_n != 0 || !borrow {
			reduced
		} else {
			value
		}
	}

	/// Modular addition. Requires `x < mod` and `y < mod`; the inputs may
	/// but do not have to be in Montgomery form.
	#[must_use]
	pub const fn add(&self, x: Uint<N>, y: Uint<N>) -> Uint<N> {
		let (s, carry) = x.overflowing_add(y);
		let (d, borrow) = s.overflowing_sub(self.modulus);
		if !carry && borrow {
			s
		} else {
			d
		}
	}

	/// Modular subtraction. Requires the inputs to be reduced.
	#[must_use]
	pub const fn sub(&self, x: Uint<N>, y: Uint<N>) -> Uint<N> {
		let (d, borrow) = x.overflowing_sub(y);
		if borrow {
			d.wrapping_add(self.modulus)
		} else {
			d
		}
	}

	/// Modular inversion of a value in Montgomery form; the result is in
	/// Montgomery form as well. Returns 0 when `gcd(x, mod) != 1`.
	///
	/// Extended binary Euclidean algorithm (Algorithm 1 of "Optimized
	/// Binary GCD for Modular Inversion"). The modulus must be odd and at
	/// least 3.
	#[must_use]
	pub fn inv(&self, x: Uint<N>) -> Uint<N> {
		debug_assert!(self.modulus.bit(0));

		// 1/2 % mod, used to halve an odd Bézout coefficient:
		// (mod - 1) / 2 + 1 = ⌊mod / 2⌋ + 1.
		let inv2 = self.modulus.shr(1).wrapping_add(Uint::ONE);

		let mut a = x;
		let mut b = self.modulus;

		// The Bézout coefficient u starts at R² instead of 1: the input is
		// XR, so the plain algorithm would produce X⁻¹R⁻¹, and the extra R²
		// rescales it to the expected X⁻¹R.
		let mut u = self.r_squared;
		let mut v = Uint::<N>::ZERO;

		while !a.is_zero() {
			if a.bit(0) {
				let (d, less) = a.overflowing_sub(b);
				if less {
					b = a;
					a = d.wrapping_neg();
					core::mem::swap(&mut u, &mut v);
				} else {
					a = d;
				}
				u = self.sub(u, v);
			}

			// a is even here, so the halving is exact.
			a = a.shr(1);

			let u_odd = u.bit(0);
			u = u.shr(1);
			if u_odd {
				u = u.wrapping_add(inv2);
			}
		}

		if b != Uint::ONE {
			v = Uint::ZERO;
		}
		v
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn u256(hex_str: &str) -> U256 {
		U256::from_be_slice(&hex::decode(hex_str).unwrap())
	}

	const SECP256K1_N: U256 = U256::from_be_words([
		0xffffffffffffffff,
		0xfffffffffffffffe,
		0xbaaedce6af48a03b,
		0xbfd25e8cd0364141,
	]);

	#[test]
	fn inv_mod64_small() {
		for a in [1u64, 3, 5, 0xffffffffffffffff, 0x1234567890abcdef] {
			assert_eq!(a.wrapping_mul(inv_mod64(a)), 1, "{a}");
		}
	}

	#[test]
	fn mont_round_trip() {
		let n = ModArith::new(SECP256K1_N);
		for x in [
			U256::ZERO,
			U256::ONE,
			u256("06e140df17432311190232a91a38daed3ee9ed7f038645dd0278da7ca6e497de"),
			SECP256K1_N.wrapping_sub(U256::ONE),
		] {
			assert_eq!(n.from_mont(n.to_mont(x)), x);
		}
	}

	#[test]
	fn mont_mul_matches_plain_product() {
		// 3 * 5 and a few wide products reduced mod the secp256k1 order.
		let n = ModArith::new(SECP256K1_N);
		let mul = |a: U256, b: U256| n.from_mont(n.mul(n.to_mont(a), n.to_mont(b)));

		assert_eq!(mul(U256::from_u64(3), U256::from_u64(5)), U256::from_u64(15));

		let a = u256("f3b9accc43dc8919ba3b4f1e14c8f7c72e7c4c013a404e9fd35e9c9a5b7b0228");
		let b = u256("37ec7e48f17a78e38d7b3c77d15be8c4a8e6bae83971fdec3b25f861be4b70da");
		// a * b % N, computed independently.
		let expected = u256("ff058a871bc5ae0294728c2eca666ccf0ec0659682696f8f0ade21e2d2e6ab3d");
		assert_eq!(mul(a, b), expected);

		// (N - 1)² % N == 1.
		let n_minus_1 = SECP256K1_N.wrapping_sub(U256::ONE);
		assert_eq!(mul(n_minus_1, n_minus_1), U256::ONE);
	}

	#[test]
	fn mod_add_sub() {
		let n = ModArith::new(SECP256K1_N);
		let n_minus_1 = SECP256K1_N.wrapping_sub(U256::ONE);
		assert_eq!(n.add(n_minus_1, U256::ONE), U256::ZERO);
		assert_eq!(n.add(n_minus_1, n_minus_1), SECP256K1_N.wrapping_sub(U256::from_u64(2)));
		assert_eq!(n.sub(U256::ZERO, U256::ONE), n_minus_1);
		assert_eq!(n.sub(U256::ONE, U256::ONE), U256::ZERO);
	}

	#[test]
	fn inversion() {
		// Cases from the original scalar-inversion test set.
		let n = ModArith::new(SECP256K1_N);
		for x in [
			U256::ONE,
			u256("06e140df17432311190232a91a38daed3ee9ed7f038645dd0278da7ca6e497de"),
			SECP256K1_N.wrapping_sub(U256::ONE),
		] {
			let x_mont = n.to_mont(x);
			let x_inv = n.inv(x_mont);
			assert_eq!(n.from_mont(n.mul(x_mont, x_inv)), U256::ONE);
		}
	}

	#[test]
	fn inversion_of_zero_and_non_coprime() {
		let n = ModArith::new(U256::from_u64(15));
		assert_eq!(n.inv(U256::ZERO), U256::ZERO);
		// gcd(to_mont(3), 15) != 1.
		assert_eq!(n.inv(n.to_mont(U256::from_u64(3))), U256::ZERO);
	}

	#[test]
	fn small_odd_modulus() {
		let m = ModArith::new(U256::from_u64(7));
		let mul = |a: u64, b: u64| {
			m.from_mont(m.mul(m.to_mont(U256::from_u64(a)), m.to_mont(U256::from_u64(b))))
		};
		assert_eq!(mul(3, 5), U256::from_u64(1));
		assert_eq!(mul(6, 6), U256::from_u64(1));
		assert_eq!(mul(0, 4), U256::ZERO);
	}
}
