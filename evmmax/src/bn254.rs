//! The bn254 (alt_bn128) G1 curve group.
//!
//! Point validation and scalar multiplication for the ECADD/ECMUL
//! precompiles. Scalar multiplication uses the GLV endomorphism
//! `(x, y) → (β·x, y)`: the scalar is split as `k = k1 + k2·λ (mod N)`
//! with both halves around 128 bits, and the two half-width
//! multiplications run as a single Straus–Shamir pass.

use crate::ecc::{self, CurveParams, FieldElement};
use crate::uint::{Uint, U256};
use crate::ModArith;

/// The field prime number (P).
pub const FIELD_PRIME: U256 = U256::from_be_words([
	0x30644e72e131a029,
	0xb85045b68181585d,
	0x97816a916871ca8d,
	0x3c208c16d87cfd47,
]);

/// The order of the curve group (N).
pub const ORDER: U256 = U256::from_be_words([
	0x30644e72e131a029,
	0xb85045b68181585d,
	0x2833e84879b97091,
	0x43e1f593f0000001,
]);

/// β: the cube root of unity implementing the curve endomorphism.
const BETA: U256 = U256::from_be_words([
	0x0000000000000000,
	0x59e26bcea0d48bac,
	0xd4f263f1acdb5c4f,
	0x5763473177fffffe,
]);

/// Short lattice-basis vectors for the scalar decomposition:
/// `v1 = (x1, -y1)` and `v2 = (x2, y2)`, with `x1·y2 + x2·y1 = 2N`.
const X1: Uint<5> = Uint([0x95b806bca6f338ee, 0x6f4d8248eeb859fd, 0, 0, 0]);
const Y1: Uint<5> = Uint([0xf83e9682e87cfd45, 0x6f4d8248eeb859fb, 0, 0, 0]);
const X2: Uint<5> = Uint([0x8211bbeb7d4f1128, 0x6f4d8248eeb859fc, 0, 0, 0]);
const Y2: Uint<5> = Uint([0x0be4e1541221250b, 0x6f4d8248eeb859fd, 0, 0, 0]);

/// Rounding constants `⌊y1·2³⁸⁴/2N⌋` and `⌊x1... 2³⁸⁴/2N⌋` for the
/// division-free Babai rounding; see `decompose`.
const ROUND_G1: Uint<10> = Uint([
	0x0b1da421e5a5cd2f,
	0x8a4eaa07eaf24ae6,
	0x29cc7e81807fb2b2,
	0x2667780a53b9e969,
	0x0000000000000001,
	0,
	0,
	0,
	0,
	0,
]);
const ROUND_G2: Uint<10> = Uint([
	0x7b75d0f4b5f612cb,
	0x1b94e2f373b7dbf3,
	0x50af5b52b89efedb,
	0x2667780a53b9e966,
	0x0000000000000001,
	0,
	0,
	0,
	0,
	0,
]);

#[derive(Clone, Copy)]
pub struct Bn254;

impl CurveParams for Bn254 {
	const FP: ModArith<4> = ModArith::new(FIELD_PRIME);
	const ORDER: U256 = ORDER;
	const A_IS_MINUS_3: bool = false;
	const B: U256 = U256::from_u64(3);
}

pub type Fp = FieldElement<Bn254>;
pub type AffinePoint = ecc::AffinePoint<Bn254>;

/// The curve generator point (G).
pub const G: AffinePoint = AffinePoint::from_values(U256::from_u64(1), U256::from_u64(2));

/// Validates that the point is in the bn254 curve group:
/// `y² == x³ + 3`, or the point at infinity.
#[must_use]
pub fn validate(pt: &AffinePoint) -> bool {
	let yy = pt.y * pt.y;
	let xxx = pt.x * pt.x * pt.x;
	let b = Fp::new(U256::from_u64(3));
	yy == xxx + b || pt.is_infinity()
}

/// A signed half-width scalar produced by `decompose`.
struct HalfScalar {
	negative: bool,
	magnitude: U256,
}

/// Split `k < N` into `(k1, k2)` with `k1 + k2·λ ≡ k (mod N)` and both
/// magnitudes at most 128 bits.
///
/// Babai rounding against the lattice basis `(v1, v2)`:
/// `c1 = ⌊k·y2/2N⌉`, `c2 = ⌊k·y1/2N⌉` are computed by multiplying with
/// the precomputed `⌊yi·2³⁸⁴/2N⌋` constants and shifting, then
/// `k1 = k - c1·x1 - c2·x2` and `k2 = c1·y1 - c2·y2` exactly.
fn decompose(k: &U256) -> (HalfScalar, HalfScalar) {
	let k_wide: Uint<10> = k.resize();
	let c1: Uint<5> = k_wide.wrapping_mul(ROUND_G1).shr(384).resize();
	let c2: Uint<5> = k_wide.wrapping_mul(ROUND_G2).shr(384).resize();

	// k1 = k - (c1·x1 + c2·x2); all products stay well below 2³²⁰.
	let s = c1.wrapping_mul(X1).wrapping_add(c2.wrapping_mul(X2));
	let k5: Uint<5> = k.resize();
	let k1 = if s.ge(&k5) {
		HalfScalar {
			negative: true,
			magnitude: s.wrapping_sub(k5).resize(),
		}
	} else {
		HalfScalar {
			negative: false,
			magnitude: k5.wrapping_sub(s).resize(),
		}
	};

	// k2 = c1·y1 - c2·y2.
	let t1 = c1.wrapping_mul(Y1);
	let t2 = c2.wrapping_mul(Y2);
	let k2 = if t2.ge(&t1) {
		HalfScalar {
			negative: true,
			magnitude: t2.wrapping_sub(t1).resize(),
		}
	} else {
		HalfScalar {
			negative: false,
			magnitude: t1.wrapping_sub(t2).resize(),
		}
	};

	(k1, k2)
}

/// Scalar multiplication `[c]P` in the bn254 curve group.
#[must_use]
pub fn mul(pt: &AffinePoint, c: &U256) -> AffinePoint {
	if pt.is_infinity() {
		return *pt;
	}
	let k = c.rem(&ORDER);
	if k.is_zero() {
		return AffinePoint::infinity();
	}

	let (k1, k2) = decompose(&k);

	let p1 = if k1.negative { -*pt } else { *pt };
	let endo = AffinePoint::new(Fp::new(BETA) * pt.x, pt.y);
	let p2 = if k2.negative { -endo } else { endo };

	let r = ecc::msm(&k1.magnitude, &p1, &k2.magnitude, &p2);
	ecc::to_affine(&r)
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

	#[test]
	fn generator_is_valid() {
		assert!(validate(&G));
		assert!(validate(&AffinePoint::infinity()));
		assert!(!validate(&AffinePoint::from_values(
			U256::from_u64(1),
			U256::from_u64(1)
		)));
	}

	#[test]
	fn small_multiples_of_g() {
		assert_eq!(
			mul(&G, &U256::from_u64(2)),
			point(
				"030644e72e131a029b85045b68181585d97816a916871ca8d3c208c16d87cfd3",
				"15ed738c0e0a7c92e7845f96b2ae9c0a68a6a449e3538fc7ff3ebf7a5a18a2c4",
			)
		);
		assert_eq!(
			mul(&G, &U256::from_u64(9)),
			point(
				"039730ea8dff1254c0fee9c0ea777d29a9c710b7e616683f194f18c43b43b869",
				"073a5ffcc6fc7a28c30723d6e58ce577356982d65b833a5a5c15bf9024b43d98",
			)
		);
		// 2G + 9G == 11G.
		let eleven_g = add_affine(&mul(&G, &U256::from_u64(2)), &mul(&G, &U256::from_u64(9)));
		assert_eq!(
			eleven_g,
			point(
				"2a14705537b009189da8808651eecdb82482477fe92ac12ca8b71f80fc3d49ef",
				"2df7ee7f243ea8b38e1ddf14029258877a618c779fd4717db6177e19ea67ec38",
			)
		);
	}

	#[test]
	fn wide_scalar() {
		assert_eq!(
			mul(&G, &u256("183227397098d014dc2822db40c0ac2ecbc0b548b438e5469e10460b6c3e7ea3")),
			point(
				"02bf4f048996610380a2238447bae2fc1a4619cf05eefe9a615d66d6731d7512",
				"0f87a976a1e8c5813e0d058ff1db8451bdca89a093d1e45ad5308870c95d10e5",
			)
		);
	}

	#[test]
	fn order_boundary() {
		let order_minus_1 = ORDER.wrapping_sub(U256::ONE);
		assert_eq!(
			mul(&G, &order_minus_1),
			point(
				"0000000000000000000000000000000000000000000000000000000000000001",
				"30644e72e131a029b85045b68181585d97816a916871ca8d3c208c16d87cfd45",
			)
		);
		assert_eq!(mul(&G, &ORDER), AffinePoint::infinity());
		assert_eq!(mul(&G, &U256::ZERO), AffinePoint::infinity());

		// Scalars reduce modulo the order.
		let order_plus_5 = ORDER.wrapping_add(U256::from_u64(5));
		assert_eq!(mul(&G, &order_plus_5), mul(&G, &U256::from_u64(5)));
	}

	#[test]
	fn glv_matches_plain_double_and_add() {
		for scalar in [
			"0000000000000000000000000000000000000000000000000000000000000003",
			"00000000000000000000000000000000000000000000000000000000000100ff",
			"183227397098d014dc2822db40c0ac2ecbc0b548b438e5469e10460b6c3e7ea3",
			"30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000000",
		] {
			let k = u256(scalar);
			assert_eq!(mul(&G, &k), to_affine(&scalar_mul(&G, &k)), "{scalar}");
		}
	}

	#[test]
	fn infinity_multiplication() {
		let inf = AffinePoint::infinity();
		assert_eq!(mul(&inf, &U256::from_u64(7)), inf);
	}
}
