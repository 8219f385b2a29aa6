//! The secp256k1 curve and ECDSA public-key recovery.

use crate::ecc::{self, CurveParams, FieldElement};
use crate::uint::U256;
use crate::ModArith;

/// The field prime number (P).
pub const FIELD_PRIME: U256 = U256::from_be_words([
	0xffffffffffffffff,
	0xffffffffffffffff,
	0xffffffffffffffff,
	0xfffffffefffffc2f,
]);

/// The secp256k1 curve group order (N).
pub const ORDER: U256 = U256::from_be_words([
	0xffffffffffffffff,
	0xfffffffffffffffe,
	0xbaaedce6af48a03b,
	0xbfd25e8cd0364141,
]);

/// `(P + 1) / 4`, the exponent computing square roots in the field.
const SQRT_EXPONENT: U256 = U256::from_be_words([
	0x3fffffffffffffff,
	0xffffffffffffffff,
	0xffffffffffffffff,
	0xffffffffbfffff0c,
]);

/// Montgomery context for the scalar field (mod N).
const FN: ModArith<4> = ModArith::new(ORDER);

#[derive(Clone, Copy)]
pub struct Secp256k1;

impl CurveParams for Secp256k1 {
	const FP: ModArith<4> = ModArith::new(FIELD_PRIME);
	const ORDER: U256 = ORDER;
	const A_IS_MINUS_3: bool = false;
	const B: U256 = U256::from_u64(7);
}

pub type Fp = FieldElement<Secp256k1>;
pub type AffinePoint = ecc::AffinePoint<Secp256k1>;

/// The curve generator point (G).
pub const G: AffinePoint = AffinePoint::from_values(
	U256::from_be_words([
		0x79be667ef9dcbbac,
		0x55a06295ce870b07,
		0x029bfcdb2dce28d9,
		0x59f2815b16f81798,
	]),
	U256::from_be_words([
		0x483ada7726a3c465,
		0x5da4fbfc0e1108a8,
		0xfd17b448a6855419,
		0x9c47d08ffb10d4b8,
	]),
);

/// Square root in the secp256k1 prime field, as `x^((P + 1) / 4)`.
/// Returns `None` when `x` is not a quadratic residue.
#[must_use]
pub fn field_sqrt(x: &Fp) -> Option<Fp> {
	let root = x.pow(&SQRT_EXPONENT);
	if root * root != *x {
		return None;
	}
	Some(root)
}

/// The y coordinate of a curve point given its x coordinate and the parity
/// of y.
#[must_use]
pub fn calculate_y(x: &Fp, y_parity_odd: bool) -> Option<Fp> {
	// y² = x³ + 7
	let b = Fp::new(U256::from_u64(7));
	let y = field_sqrt(&(*x * *x * *x + b))?;

	let y_is_odd = y.value().bit(0);
	Some(if y_is_odd == y_parity_odd { y } else { -y })
}

/// Recover the public key of the ECDSA signature `(r, s)` over `hash`.
///
/// Returns the point as affine coordinates; any validation failure yields
/// `None`. The recovered point may be the point at infinity, which
/// converts to the all-zero coordinate encoding.
#[must_use]
pub fn ecdsa_recover(
	hash: &[u8; 32],
	r_bytes: &[u8; 32],
	s_bytes: &[u8; 32],
	y_parity_odd: bool,
) -> Option<AffinePoint> {
	let r = U256::from_be_slice(r_bytes);
	let s = U256::from_be_slice(s_bytes);
	if r.is_zero() || r.ge(&ORDER) || s.is_zero() || s.ge(&ORDER) {
		return None;
	}

	// The signature point R = (r, y). N < P, so r is a valid x coordinate
	// candidate without further range checks.
	let x = Fp::new(r);
	let y = calculate_y(&x, y_parity_odd)?;

	let z = U256::from_be_slice(hash).rem(&ORDER);

	// u1 = -z * r⁻¹ mod N, u2 = s * r⁻¹ mod N.
	let r_inv = FN.inv(FN.to_mont(r));
	let z_neg = FN.sub(U256::ZERO, z);
	let u1 = FN.from_mont(FN.mul(FN.to_mont(z_neg), r_inv));
	let u2 = FN.from_mont(FN.mul(FN.to_mont(s), r_inv));

	// Q = u1 * G + u2 * R.
	let q = ecc::msm(&u1, &G, &u2, &AffinePoint::new(x, y));
	Some(ecc::to_affine(&q))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ecc::{add_affine, scalar_mul, to_affine};

	fn u256(hex_str: &str) -> U256 {
		U256::from_be_slice(&hex::decode(hex_str).unwrap())
	}

	fn point(x: &str, y: &str) -> AffinePoint {
		AffinePoint::from_values(u256(x), u256(y))
	}

	fn mul(p: &AffinePoint, c: U256) -> AffinePoint {
		to_affine(&scalar_mul(p, &c))
	}

	#[test]
	fn sqrt_round_trip() {
		for value in [
			"0000000000000000000000000000000000000000000000000000000000000001",
			"06e140df17432311190232a91a38daed3ee9ed7f038645dd0278da7ca6e497de",
			"0f3b9accc43dc8919ba3b4f1e14c8f7c72e7c4c013a404e9fd35e9c9a5b7b228",
			"fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2e",
		] {
			let a = Fp::new(u256(value));
			let root = field_sqrt(&(a * a)).unwrap();
			assert!(root == a || root == -a, "{value}");
		}
	}

	#[test]
	fn sqrt_of_non_residue() {
		for value in [
			U256::from_u64(3),
			FIELD_PRIME.wrapping_sub(U256::ONE),
		] {
			assert!(field_sqrt(&Fp::new(value)).is_none());
		}
	}

	#[test]
	fn y_from_x() {
		// (x, y_even, y_odd) triplets.
		let cases = [
			(
				"0000000000000000000000000000000000000000000000000000000000000001",
				"4218f20ae6c646b363db68605822fb14264ca8d2587fdd6fbc750d587e76a7ee",
				"bde70df51939b94c9c24979fa7dd04ebd9b3572da7802290438af2a681895441",
			),
			(
				"b697546bfbc062d06df1d25a26e4fadfe2f2a48109c349bf65d2b01182f3aa60",
				"d02714d31d0c08c38037400d232886863b473a37adba9823ea44ae50028a5bea",
				"2fd8eb2ce2f3f73c7fc8bff2dcd77979c4b8c5c8524567dc15bb51aefd75a045",
			),
			(
				"18f4057699e2d9679421de8f4e11d7df9fa4b9e7cb841ea48aed75f1567b9731",
				"6db5b7ecd8e226c06f538d15173267bf1e78acc02bb856e83b3d6daec6a68144",
				"924a4813271dd93f90ac72eae8cd9840e187533fd447a917c4c2925039597aeb",
			),
		];

		for (x, y_even, y_odd) in cases {
			let x = Fp::new(u256(x));
			assert_eq!(calculate_y(&x, false).unwrap().value(), u256(y_even));
			assert_eq!(calculate_y(&x, true).unwrap().value(), u256(y_odd));
		}
	}

	#[test]
	fn y_from_x_invalid() {
		for x in [
			"207ea538f1835f6de40c793fc23d22b14da5a80015a0fecddf56f146b21d7949",
			"fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2e",
		] {
			let x = Fp::new(u256(x));
			assert!(calculate_y(&x, false).is_none());
			assert!(calculate_y(&x, true).is_none());
		}
	}

	#[test]
	fn affine_addition() {
		let p1 = point(
			"18f4057699e2d9679421de8f4e11d7df9fa4b9e7cb841ea48aed75f1567b9731",
			"6db5b7ecd8e226c06f538d15173267bf1e78acc02bb856e83b3d6daec6a68144",
		);
		let p2 = point(
			"f929e07c83d65da3569113ae03998d13359ba982216285a686f4d66e721a0beb",
			"0b6d73966107b10526e2e140c17f343ee0a373351f2b1408923151b027f55b82",
		);
		// p3 = -p2
		let p3 = point(
			"f929e07c83d65da3569113ae03998d13359ba982216285a686f4d66e721a0beb",
			"f4928c699ef84efad91d1ebf3e80cbc11f5c8ccae0d4ebf76dceae4ed80aa0ad",
		);
		let p4 = point(
			"0000000000000000000000000000000000000000000000000000000000000001",
			"bde70df51939b94c9c24979fa7dd04ebd9b3572da7802290438af2a681895441",
		);

		let inf = AffinePoint::infinity();
		assert!(inf.is_infinity());
		assert_eq!(add_affine(&p1, &inf), p1);
		assert_eq!(add_affine(&inf, &p1), p1);
		assert_eq!(add_affine(&inf, &inf), inf);

		assert_eq!(
			add_affine(&p1, &p2),
			point(
				"40468d7704db3d11961ab9c222e35919d7e5d1baef59e0f46255d66bec3bd1d3",
				"6fff88d9f575236b6cc5c74e7d074832a460c2792fba888aea7b9986429dd7f7",
			)
		);
		assert_eq!(
			add_affine(&p1, &p1),
			point(
				"d8e7b42b8c82e185bf0669ce0754697a6eb46c156497d5d1971bd6a23f38ed9e",
				"628c3107fc73c92e7b8c534e239257fb2de95bd6b965dc1021f636da086a7e99",
			)
		);
		assert_eq!(
			add_affine(&p1, &p3),
			point(
				"df592d726f42759020da10d3106db3880e514c783d6970d2a9085fb16879b37f",
				"10aa0ef9fe224e3797792b4b286b9f63542d4c11fe26d449a845b9db0f5993f9",
			)
		);
		assert_eq!(
			add_affine(&p1, &p4),
			point(
				"12a5fd099bcd30e7290e58d63f8d5008287239500e6d0108020040497c5cb9c9",
				"7f6bd83b5ac46e3b59e24af3bc9bfbb213ed13e21d754e4950ae635961742574",
			)
		);
	}

	#[test]
	fn multiplication_by_zero_and_order() {
		let p1 = point(
			"18f4057699e2d9679421de8f4e11d7df9fa4b9e7cb841ea48aed75f1567b9731",
			"6db5b7ecd8e226c06f538d15173267bf1e78acc02bb856e83b3d6daec6a68144",
		);
		let inf = AffinePoint::infinity();

		assert_eq!(mul(&p1, U256::ZERO), inf);
		assert_eq!(mul(&p1, ORDER), inf);
		assert_eq!(mul(&inf, U256::ZERO), inf);
		assert_eq!(mul(&inf, U256::ONE), inf);
		assert_eq!(mul(&inf, ORDER.wrapping_sub(U256::ONE)), inf);
		assert_eq!(mul(&inf, ORDER), inf);
	}

	#[test]
	fn multiplication() {
		let p1 = point(
			"18f4057699e2d9679421de8f4e11d7df9fa4b9e7cb841ea48aed75f1567b9731",
			"6db5b7ecd8e226c06f538d15173267bf1e78acc02bb856e83b3d6daec6a68144",
		);

		assert_eq!(
			mul(&p1, u256("0000000000000000000000000000000000000000000000056bc75e2d63100000")),
			point(
				"4c34e6dc48badd579d1ce4702fd490fb98fa0e666417bfc2d4ff8e957d99c565",
				"b53da5be179d80c7f07226ba79b6bce643d89496b37d6bc2d111b009e37cc28b",
			)
		);
		assert_eq!(
			mul(&p1, u256("00000000000000000000000000000000000004ee2d6d415b85acef8100000000")),
			point(
				"f86902594c8a4e4fc5f6dfb27886784271302c6bab3dc4350a0fe7c5b056af66",
				"b5748aa8f9122bfdcbf5846f6f8ec76f41626642a3f2ea0f483c92bf915847ad",
			)
		);
		assert_eq!(
			mul(&G, u256("d17a4c1f283fa5d67656ea81367b520eaa689207e5665620d4f51c7cf85fa220")),
			point(
				"39cb41b2567f68137aae52e99dbe91cd38d9faa3ba6be536a04355b63a7964fe",
				"f31e6abd08cbd8e4896c9e0304b25000edcd52a9f6d2bac7cfbdad2c835c9a35",
			)
		);
	}

	#[test]
	fn recover_known_signature() {
		let hash: [u8; 32] =
			hex::decode("18c547e4f7b0f325ad1e56f57e26c745b09a3e503d86e00e5255ff7f715d3d1c")
				.unwrap()
				.try_into()
				.unwrap();
		let r: [u8; 32] =
			hex::decode("73b1693892219d736caba55bdb67216e485557ea6b6af75f37096c9aa6a5a75f")
				.unwrap()
				.try_into()
				.unwrap();
		let s: [u8; 32] =
			hex::decode("eeb940b1d03b21e36b0e47e79769f095fe2ab855bd91e3a38756b7d75a9c4549")
				.unwrap()
				.try_into()
				.unwrap();

		// v == 28, so the y parity is odd.
		let q = ecdsa_recover(&hash, &r, &s, true).unwrap();
		// The recovered key hashes to address
		// 0xa94f5374fce5edbc8e2a8697c15331677e6ebf0b (checked at the
		// precompile layer, which owns Keccak).
		assert!(!q.is_infinity());

		// Malformed signatures are rejected.
		let zero = [0u8; 32];
		let order: [u8; 32] =
			hex::decode("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141")
				.unwrap()
				.try_into()
				.unwrap();
		assert!(ecdsa_recover(&hash, &zero, &s, true).is_none());
		assert!(ecdsa_recover(&hash, &r, &zero, true).is_none());
		assert!(ecdsa_recover(&hash, &order, &s, true).is_none());
		assert!(ecdsa_recover(&hash, &r, &order, true).is_none());
	}
}
