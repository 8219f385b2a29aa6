//! Variable-width modular exponentiation.
//!
//! `base^exp % mod` over big-endian byte strings, dispatched over a closed
//! set of working widths so that small operands take the fast monomorphic
//! paths. The odd-modulus core runs on Almost Montgomery Multiplication;
//! even moduli are split into an odd part and a power of two and recombined
//! with Garner's formula.

use crate::inv_mod64;
use crate::uint::{adc, mac, Uint};

/// Hard cap on the byte width of the base and modulus operands.
pub const MAX_INPUT_SIZE: usize = 1024;

/// The exponent of the modular exponentiation operation.
///
/// A view of the big-endian bytes that trims leading zero bytes once and
/// exposes indexed bit access.
#[derive(Clone, Copy)]
pub struct Exponent<'a> {
	data: &'a [u8],
	bit_width: usize,
}

impl<'a> Exponent<'a> {
	#[must_use]
	pub fn new(bytes: &'a [u8]) -> Self {
		let first_non_zero = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
		let trimmed = &bytes[first_non_zero..];
		let bit_width = match trimmed.first() {
			Some(top) => 8 - top.leading_zeros() as usize + (trimmed.len() - 1) * 8,
			None => 0,
		};
		Self {
			data: trimmed,
			bit_width,
		}
	}

	/// Number of significant bits; an exponent of zero has bit width 0.
	#[must_use]
	pub const fn bit_width(&self) -> usize {
		self.bit_width
	}

	/// The bit at `index`, counting from the least significant bit.
	/// `bit(bit_width() - 1)` is the top bit.
	#[must_use]
	pub fn bit(&self, index: usize) -> bool {
		let byte = self.data[self.data.len() - 1 - index / 8];
		(byte >> (index % 8)) & 1 != 0
	}
}

/// Multiplies each word of `x` by `y`, adds the matching word of `t`
/// shifted down by `skip` words, and stores into `t[..N - skip]`.
/// Returns the final carry. With `skip == 0` this is `t[] += x[] * y`.
fn addmul_words<const N: usize>(t: &mut [u64; N], x: &[u64], y: u64, carry_in: u64, skip: usize) -> u64 {
	let mut carry = carry_in;
	for j in 0..N - skip {
		let (lo, hi) = mac(t[j + skip], x[j + skip], y, carry);
		t[j] = lo;
		carry = hi;
	}
	carry
}

/// Almost Montgomery Multiplication (AMM).
///
/// A relaxed Montgomery multiplication whose result, in plain form, lies in
/// `[0, 2 * mod)`: the per-iteration conditional subtractions are omitted,
/// removing data-dependent branches from the hot loop. The inputs must be
/// in Montgomery form (or below `R`); passing `y = 1` converts back to
/// plain form. See "Efficient Software Implementations of Modular
/// Exponentiation" (Gueron, 2011).
fn mul_amm<const N: usize>(x: &Uint<N>, y: &Uint<N>, m: &Uint<N>, mod_inv: u64) -> Uint<N> {
	let mut t = [0u64; N];
	let mut t_carry = 0u64;

	for i in 0..N {
		let c1 = addmul_words(&mut t, &x.0, y.0[i], 0, 0);
		let (sum1, d1) = adc(c1, t_carry, 0);

		let q = t[0].wrapping_mul(mod_inv);
		let (_, c2) = mac(t[0], q, m.0[0], 0);

		let c3 = addmul_words(&mut t, &m.0, q, c2, 1);
		let (sum2, d2) = adc(sum1, c3, 0);
		t[N - 1] = sum2;
		t_carry = d1 | d2;
	}

	let mut value = Uint(t);
	if t_carry != 0 {
		value = value.wrapping_sub(*m);
	}
	value
}

/// `x * R % mod` with `R = 2^(N * 64)`, by repeated modular doubling.
/// Requires `x < mod`.
fn mont_shift<const N: usize>(x: Uint<N>, m: &Uint<N>) -> Uint<N> {
	let mut value = x;
	for _ in 0..N * 64 {
		let (s, carry) = value.overflowing_add(value);
		let (d, borrow) = s.overflowing_sub(*m);
		value = if !carry && borrow { s } else { d };
	}
	value
}

/// Left-to-right square-and-multiply over AMM for an odd modulus.
fn modexp_odd<const N: usize>(base: &Uint<N>, exp: &Exponent, m: &Uint<N>) -> Uint<N> {
	debug_assert!(exp.bit_width() != 0);
	debug_assert!(m.bit(0));

	let mod_inv = inv_mod64(m.0[0]).wrapping_neg();
	let base_mont = mont_shift(base.rem(m), m);

	let mut ret = base_mont;
	let mut i = exp.bit_width() - 1;
	while i != 0 {
		ret = mul_amm(&ret, &ret, m, mod_inv);
		if exp.bit(i - 1) {
			ret = mul_amm(&ret, &base_mont, m, mod_inv);
		}
		i -= 1;
	}

	// Convert from Montgomery form by multiplying with plain 1, then
	// reduce the AMM slack.
	let mut ret = mul_amm(&ret, &Uint::ONE, m, mod_inv);
	if ret.ge(m) {
		ret = ret.wrapping_sub(*m);
	}
	ret
}

/// Square-and-multiply with results truncated to `k` bits, for a modulus
/// of `2^k`.
fn modexp_pow2<const N: usize>(base: &Uint<N>, exp: &Exponent, k: usize) -> Uint<N> {
	debug_assert!(k != 0);

	let mut ret = Uint::<N>::ONE;
	let mut i = exp.bit_width();
	while i != 0 {
		ret = ret.wrapping_mul(ret);
		if exp.bit(i - 1) {
			ret = ret.wrapping_mul(*base);
		}
		i -= 1;
	}

	let mask = Uint::<N>::ONE.shl(k).wrapping_sub(Uint::ONE);
	ret & mask
}

/// Modular inversion for a modulus of `2^k`; `x` must be odd. The result
/// may carry bits above `k`, the caller masks.
fn modinv_pow2<const N: usize>(x: &Uint<N>, k: usize) -> Uint<N> {
	debug_assert!(x.bit(0));
	debug_assert!(k <= N * 64);

	// Seed with the inversion mod 2⁶⁴, then double the correct bits per
	// iteration as in `inv_mod64`.
	let mut inv = Uint::<N>::from_u64(inv_mod64(x.0[0]));
	let two = Uint::<N>::from_u64(2);

	let mut correct_bits = 64;
	while correct_bits < k {
		inv = inv.wrapping_mul(two.wrapping_sub(x.wrapping_mul(inv)));
		correct_bits *= 2;
	}
	inv
}

/// `base^exp % (mod_odd * 2^k)` via "Montgomery reduction with even
/// modulus" (Koç): solve both halves and recombine with Garner's formula.
fn modexp_even<const N: usize>(base: &Uint<N>, exp: &Exponent, mod_odd: &Uint<N>, k: usize) -> Uint<N> {
	debug_assert!(k != 0);

	let x1 = modexp_odd(base, exp, mod_odd);
	let x2 = modexp_pow2(base, exp, k);

	let mod_odd_inv = modinv_pow2(mod_odd, k);

	let mask = Uint::<N>::ONE.shl(k).wrapping_sub(Uint::ONE);
	let y = x2.wrapping_sub(x1).wrapping_mul(mod_odd_inv) & mask;
	x1.wrapping_add(y.wrapping_mul(*mod_odd))
}

fn modexp_width<const N: usize>(base_bytes: &[u8], exp: &Exponent, mod_bytes: &[u8], output: &mut [u8]) {
	let base = Uint::<N>::from_be_slice(base_bytes);
	let m = Uint::<N>::from_be_slice(mod_bytes);
	debug_assert!(!m.is_zero());

	let result = if exp.bit_width() == 0 {
		// Exponent of 0: the result is 1, except modulo 1.
		if m == Uint::ONE {
			Uint::ZERO
		} else {
			Uint::ONE
		}
	} else {
		let mod_tz = m.trailing_zeros();
		if mod_tz == 0 {
			modexp_odd(&base, exp, &m)
		} else {
			let mod_odd = m.shr(mod_tz);
			if mod_odd == Uint::ONE {
				modexp_pow2(&base, exp, mod_tz)
			} else {
				modexp_even(&base, exp, &mod_odd, mod_tz)
			}
		}
	};

	result.to_be_bytes(output);
}

/// Modular exponentiation over big-endian byte strings.
///
/// The output width equals the modulus width. The modulus must not be
/// zero; the caller rejects that before dispatch. The working width is the
/// smallest of {16, 32, 64, 128, 256, 1024} bytes covering the larger of
/// the base and the modulus.
pub fn modexp(base: &[u8], exp: &[u8], modulus: &[u8], output: &mut [u8]) {
	debug_assert!(base.len() <= MAX_INPUT_SIZE);
	debug_assert!(modulus.len() <= MAX_INPUT_SIZE);
	debug_assert_eq!(output.len(), modulus.len());

	let exp = Exponent::new(exp);

	let size = core::cmp::max(modulus.len(), base.len());
	if size <= 16 {
		modexp_width::<2>(base, &exp, modulus, output);
	} else if size <= 32 {
		modexp_width::<4>(base, &exp, modulus, output);
	} else if size <= 64 {
		modexp_width::<8>(base, &exp, modulus, output);
	} else if size <= 128 {
		modexp_width::<16>(base, &exp, modulus, output);
	} else if size <= 256 {
		modexp_width::<32>(base, &exp, modulus, output);
	} else {
		modexp_width::<128>(base, &exp, modulus, output);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn run(base: &str, exp: &str, modulus: &str) -> String {
		let base = hex::decode(base).unwrap();
		let exp = hex::decode(exp).unwrap();
		let modulus = hex::decode(modulus).unwrap();
		let mut output = vec![0u8; modulus.len()];
		modexp(&base, &exp, &modulus, &mut output);
		hex::encode(output)
	}

	#[test]
	fn exponent_view() {
		let e = Exponent::new(&[0, 0, 0x0a]);
		assert_eq!(e.bit_width(), 4);
		assert!(e.bit(3));
		assert!(!e.bit(2));
		assert!(e.bit(1));
		assert!(!e.bit(0));

		assert_eq!(Exponent::new(&[]).bit_width(), 0);
		assert_eq!(Exponent::new(&[0, 0, 0]).bit_width(), 0);
		assert_eq!(Exponent::new(&[0x80]).bit_width(), 8);
	}

	#[test]
	fn two_pow_ten_mod_seven() {
		assert_eq!(run("02", "0a", "07"), "02");
	}

	#[test]
	fn zero_exponent() {
		// exp == 0: 1 unless mod == 1.
		assert_eq!(run("05", "00", "09"), "01");
		assert_eq!(run("05", "", "01"), "00");
		assert_eq!(run("", "00", "0100"), "0001");
	}

	#[test]
	fn modulus_one() {
		assert_eq!(run("ff", "02", "01"), "00");
	}

	#[test]
	fn odd_modulus() {
		// 3^65537 mod a 256-bit odd modulus.
		assert_eq!(
			run(
				"03",
				"010001",
				"fff1fff1fff1fff1fff1fff1fff1fff1fff1fff1fff1fff1fff1fff1fff1fff1"
			),
			"3bf13cb5abd1235496db456f513b5c522a5ef8c55e8f287e1c7a8232520b220e"
		);
	}

	#[test]
	fn power_of_two_modulus() {
		// mod = 2^256, result masked to 256 bits (33-byte output width).
		assert_eq!(
			run(
				"1234567890abcdef",
				"deadbeef",
				"010000000000000000000000000000000000000000000000000000000000000000"
			),
			"00fa3bb4c6adba9544c794a76a2709215200a5d052df8226cfbc1351a205e89a0f"
		);
	}

	#[test]
	fn even_modulus_small() {
		// 0xc0ffee^0xfeed mod 12: exercises the odd/pow2 split.
		assert_eq!(run("c0ffee", "feed", "0c"), "04");
	}

	#[test]
	fn even_modulus_wide() {
		// 39-byte operands: the 64-byte working width.
		assert_eq!(
			run(
				"94b2b8a02f34a6795b929e9a9a80fdea7b5bf55eb561a4216363698b529b4a97b750923ceb3ffd",
				"42781f9c58d6645fa9e8a8529f035efa259b08923d10c67fd9",
				"f3e491196941afac44aceb14fa876af0c660e96f2e070dfdc528ec622c484e77fa3a671a0071da"
			),
			"eef887c4732380d8ab300c6774f1c8609eee9a16ddabd3ba53f67c272ff9298120a63d9090ca37"
		);
	}

	#[test]
	fn wide_odd_modulus() {
		// ~100-byte operands: the 128-byte working width.
		assert_eq!(
			run(
				"d2d5844307f062cec7b317d94d1fe09f0af438d297524d6af51e8722c21b609228ce6f2410645d51c6f8da3eabe19f5803e0a813bdc2ae9963d2e49085ef3430ed038db4de38378426d0b944a2863a7f3b5f3d86268ecc45dc6bf1e1a399f82a65aa9c82",
				"097906159644f9794cdd933160",
				"f729b4420b0ebe378c74dc7eb0adf422cedafb092fdddf18f2c41c5d92b243e0fd67dd2257989fef829c88f6ced90a71d2af7293b05a04cd085b71ba6676b3651c52536d4b9adbebcd1f5ec9c18070b6d13089633a50eee0f9e038eb8f624fb804d821"
			),
			"3d0150ada8d95ffc85a7d9a033659e6783473211c77d522bb2b6f6843194d67c24df6032aa00746af2bddc380b007377aa41535c679124fa990bf96a62e76bf2e51bc24ec056bda6eba58420acc199fbfcae432da53a5e39009307d325d09fa33837cd"
		);
	}

	#[test]
	fn base_larger_than_modulus() {
		// The base is reduced before entering Montgomery form.
		assert_eq!(run("ffffffffffffffff", "02", "07"), "01");
	}
}
