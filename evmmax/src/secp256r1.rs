//! The secp256r1 (P-256) curve and ECDSA signature verification.

use crate::ecc::{self, CurveParams, FieldElement};
use crate::uint::U256;
use crate::ModArith;

/// The field prime number (P).
pub const FIELD_PRIME: U256 = U256::from_be_words([
	0xffffffff00000001,
	0x0000000000000000,
	0x00000000ffffffff,
	0xffffffffffffffff,
]);

/// The secp256r1 curve group order (N).
pub const ORDER: U256 = U256::from_be_words([
	0xffffffff00000000,
	0xffffffffffffffff,
	0xbce6faada7179e84,
	0xf3b9cac2fc632551,
]);

/// The curve equation constant B.
pub const B: U256 = U256::from_be_words([
	0x5ac635d8aa3a93e7,
	0xb3ebbd55769886bc,
	0x651d06b0cc53b0f6,
	0x3bce3c3e27d2604b,
]);

/// Montgomery context for the scalar field (mod N).
const FN: ModArith<4> = ModArith::new(ORDER);

#[derive(Clone, Copy)]
pub struct Secp256r1;

impl CurveParams for Secp256r1 {
	const FP: ModArith<4> = ModArith::new(FIELD_PRIME);
	const ORDER: U256 = ORDER;
	const A_IS_MINUS_3: bool = true;
	const B: U256 = B;
}

pub type Fp = FieldElement<Secp256r1>;
pub type AffinePoint = ecc::AffinePoint<Secp256r1>;

/// The curve generator point (G).
pub const G: AffinePoint = AffinePoint::from_values(
	U256::from_be_words([
		0x6b17d1f2e12c4247,
		0xf8bce6e563a440f2,
		0x77037d812deb33a0,
		0xf4a13945d898c296,
	]),
	U256::from_be_words([
		0x4fe342e2fe1a7f9b,
		0x8ee7eb4a7c0f9e16,
		0x2bce33576b315ece,
		0xcbb6406837bf51f5,
	]),
);

fn is_on_curve(p: &AffinePoint) -> bool {
	// y² == x³ - 3x + B
	let three_x = p.x + p.x + p.x;
	let b = Fp::new(B);
	p.y * p.y == p.x * p.x * p.x - three_x + b
}

/// ECDSA signature verification.
///
/// Follows the textbook algorithm (and the EIP-7951 restatement of it):
/// range-check `r` and `s`, validate the public key point, compute
/// `R = u1 * G + u2 * Q` and accept iff `R.x ≡ r (mod N)`.
#[must_use]
pub fn verify(hash: &[u8; 32], r: &U256, s: &U256, qx: &U256, qy: &U256) -> bool {
	// 1. r and s must be within [1, N - 1].
	if r.is_zero() || r.ge(&ORDER) || s.is_zero() || s.ge(&ORDER) {
		return false;
	}

	// 2. The public key must be a valid non-infinity curve point.
	if qx.ge(&FIELD_PRIME) || qy.ge(&FIELD_PRIME) {
		return false;
	}
	let q = AffinePoint::from_values(*qx, *qy);
	if q.is_infinity() || !is_on_curve(&q) {
		return false;
	}

	// 3. z is the hash read as a number. N > 2²⁵⁵, so no truncation is
	// needed, and the Montgomery multiplication reduces z on the fly.
	let z = U256::from_be_slice(hash);

	// 4. u1 = z * s⁻¹ mod N, u2 = r * s⁻¹ mod N.
	let s_inv = FN.inv(FN.to_mont(*s));
	let u1 = FN.from_mont(FN.mul(FN.to_mont(z), s_inv));
	let u2 = FN.from_mont(FN.mul(FN.to_mont(*r), s_inv));

	// 5. R = u1 * G + u2 * Q. Both scalars are already below the order.
	let t1 = ecc::scalar_mul(&G, &u1);
	let t2 = ecc::scalar_mul(&q, &u2);
	let r_point = ecc::to_affine(&ecc::add_jacobian(&t1, &t2));

	// If R is at infinity its x coordinate is 0 and cannot equal r >= 1.
	// 6. Accept iff r == R.x mod N.
	let mut x1 = r_point.x.value();
	if x1.ge(&ORDER) {
		x1 = x1.wrapping_sub(ORDER);
	}
	x1 == *r
}

#[cfg(test)]
mod tests {
	use super::*;

	fn u256(hex_str: &str) -> U256 {
		U256::from_be_slice(&hex::decode(hex_str).unwrap())
	}

	fn hash32(hex_str: &str) -> [u8; 32] {
		hex::decode(hex_str).unwrap().try_into().unwrap()
	}

	#[test]
	fn valid_signatures() {
		let cases = [
			(
				"bb5a52f42f9c9261ed4361f59422a1e30036e7c32b270c8807a419feca605023",
				"2ba3a8be6b94d5ec80a6d9d1190a436effe50d85a1eee859b8cc6af9bd5c2e18",
				"4cd60b855d442f5b3c7b11eb6c4e0ae7525fe710fab9aa7c77a67f79e6fadd76",
				"2927b10512bae3eddcfe467828128bad2903269919f7086069c8c4df6c732838",
				"c7787964eaac00e5921fb1498a60f4606766b3d9685001558d1a974e7341513e",
			),
			// Valid public key with zero x coordinate.
			(
				"c3d3be9eb3577f217ae0ab360529a30b18adc751aec886328593d7d6fe042809",
				"3a4e97b44cbf88b90e6205a45ba957e520f63f3c6072b53c244653278a1819d8",
				"6a184aa037688a5ebd25081fd2c0b10bb64fa558b671bd81955ca86e09d9d722",
				"0000000000000000000000000000000000000000000000000000000000000000",
				"66485c780e2f83d72433bd5d84a06bb6541c2af31dae871728bf856a174f93f4",
			),
		];

		for (h, r, s, x, y) in cases {
			assert!(
				verify(&hash32(h), &u256(r), &u256(s), &u256(x), &u256(y)),
				"{h}"
			);
		}
	}

	#[test]
	fn invalid_signatures() {
		let zero = U256::ZERO;
		assert!(!verify(&[0; 32], &zero, &zero, &zero, &zero));

		// r or s out of range.
		let valid = hash32("bb5a52f42f9c9261ed4361f59422a1e30036e7c32b270c8807a419feca605023");
		let r = u256("2ba3a8be6b94d5ec80a6d9d1190a436effe50d85a1eee859b8cc6af9bd5c2e18");
		let s = u256("4cd60b855d442f5b3c7b11eb6c4e0ae7525fe710fab9aa7c77a67f79e6fadd76");
		let qx = u256("2927b10512bae3eddcfe467828128bad2903269919f7086069c8c4df6c732838");
		let qy = u256("c7787964eaac00e5921fb1498a60f4606766b3d9685001558d1a974e7341513e");
		assert!(!verify(&valid, &ORDER, &s, &qx, &qy));
		assert!(!verify(&valid, &r, &ORDER, &qx, &qy));
		assert!(!verify(&valid, &r, &U256::ZERO, &qx, &qy));

		// Public key not on the curve.
		assert!(!verify(&valid, &r, &s, &qx, &qx));

		// Coordinates out of the field.
		assert!(!verify(&valid, &r, &s, &FIELD_PRIME, &qy));

		// Flipped hash bit: signature no longer matches.
		let bad = hash32("bb5a52f42f9c9261ed4361f59422a1e30036e7c32b270c8807a419feca605022");
		assert!(!verify(&bad, &r, &s, &qx, &qy));
	}
}
