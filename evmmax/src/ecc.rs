//! Short-Weierstrass elliptic-curve arithmetic over prime fields.
//!
//! Curves are described by [`CurveParams`]; all field arithmetic goes
//! through [`FieldElement`], which keeps values in Montgomery form
//! internally. Points exist in affine and Jacobian coordinates, with the
//! addition/doubling formulas selected by the curve's `A` parameter
//! (`A == 0` or `A == FIELD_PRIME - 3` are supported).

use core::marker::PhantomData;

use crate::uint::U256;
use crate::ModArith;

/// Compile-time curve description. `A` is restricted to the two values the
/// doubling formulas cover and is expressed as the `A_IS_MINUS_3` flag.
pub trait CurveParams: 'static {
	/// Montgomery context for the base field.
	const FP: ModArith<4>;
	/// The order of the curve group (N).
	const ORDER: U256;
	/// `true` for `A == FIELD_PRIME - 3`, `false` for `A == 0`.
	const A_IS_MINUS_3: bool;
	/// The curve equation constant B.
	const B: U256;
}

/// An element of the curve's prime field, kept in Montgomery form.
pub struct FieldElement<C: CurveParams> {
	value: U256,
	_curve: PhantomData<C>,
}

impl<C: CurveParams> Clone for FieldElement<C> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<C: CurveParams> Copy for FieldElement<C> {}

impl<C: CurveParams> PartialEq for FieldElement<C> {
	fn eq(&self, other: &Self) -> bool {
		self.value == other.value
	}
}

impl<C: CurveParams> Eq for FieldElement<C> {}

impl<C: CurveParams> core::fmt::Debug for FieldElement<C> {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		write!(f, "{:?}", self.value())
	}
}

impl<C: CurveParams> FieldElement<C> {
	/// Convert a residue into the field; requires `value < FIELD_PRIME`.
	#[must_use]
	pub const fn new(value: U256) -> Self {
		Self::from_raw(C::FP.to_mont(value))
	}

	/// Wrap a raw value already in Montgomery form.
	#[must_use]
	pub const fn from_raw(value: U256) -> Self {
		Self {
			value,
			_curve: PhantomData,
		}
	}

	#[must_use]
	pub const fn zero() -> Self {
		Self::from_raw(U256::ZERO)
	}

	#[must_use]
	pub const fn one() -> Self {
		Self::new(U256::ONE)
	}

	/// The residue in `[0, FIELD_PRIME)`.
	#[must_use]
	pub const fn value(&self) -> U256 {
		C::FP.from_mont(self.value)
	}

	/// The Montgomery-form representation.
	#[must_use]
	pub const fn raw(&self) -> U256 {
		self.value
	}

	#[must_use]
	pub const fn is_zero(&self) -> bool {
		self.value.is_zero()
	}

	/// Multiplicative inverse; zero for non-invertible input.
	#[must_use]
	pub fn inv(&self) -> Self {
		Self::from_raw(C::FP.inv(self.value))
	}

	/// `self^exp` by left-to-right square-and-multiply.
	#[must_use]
	pub fn pow(&self, exp: &U256) -> Self {
		let mut ret = Self::one();
		let mut i = exp.bit_width();
		while i != 0 {
			ret = ret * ret;
			if exp.bit(i - 1) {
				ret = ret * *self;
			}
			i -= 1;
		}
		ret
	}
}

impl<C: CurveParams> core::ops::Add for FieldElement<C> {
	type Output = Self;

	fn add(self, rhs: Self) -> Self {
		Self::from_raw(C::FP.add(self.value, rhs.value))
	}
}

impl<C: CurveParams> core::ops::Sub for FieldElement<C> {
	type Output = Self;

	fn sub(self, rhs: Self) -> Self {
		Self::from_raw(C::FP.sub(self.value, rhs.value))
	}
}

impl<C: CurveParams> core::ops::Mul for FieldElement<C> {
	type Output = Self;

	fn mul(self, rhs: Self) -> Self {
		Self::from_raw(C::FP.mul(self.value, rhs.value))
	}
}

impl<C: CurveParams> core::ops::Neg for FieldElement<C> {
	type Output = Self;

	fn neg(self) -> Self {
		Self::from_raw(C::FP.sub(U256::ZERO, self.value))
	}
}

/// The affine (two coordinates) point on an elliptic curve over a prime
/// field. Both coordinates zero denotes the point at infinity.
pub struct AffinePoint<C: CurveParams> {
	pub x: FieldElement<C>,
	pub y: FieldElement<C>,
}

impl<C: CurveParams> Clone for AffinePoint<C> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<C: CurveParams> Copy for AffinePoint<C> {}

impl<C: CurveParams> PartialEq for AffinePoint<C> {
	fn eq(&self, other: &Self) -> bool {
		self.x == other.x && self.y == other.y
	}
}

impl<C: CurveParams> Eq for AffinePoint<C> {}

impl<C: CurveParams> core::fmt::Debug for AffinePoint<C> {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		write!(f, "({:?}, {:?})", self.x, self.y)
	}
}

impl<C: CurveParams> AffinePoint<C> {
	#[must_use]
	pub const fn new(x: FieldElement<C>, y: FieldElement<C>) -> Self {
		Self { x, y }
	}

	/// Create the point from residue values; both must be below the field
	/// prime.
	#[must_use]
	pub const fn from_values(x: U256, y: U256) -> Self {
		Self::new(FieldElement::new(x), FieldElement::new(y))
	}

	#[must_use]
	pub const fn infinity() -> Self {
		Self::new(FieldElement::zero(), FieldElement::zero())
	}

	#[must_use]
	pub const fn is_infinity(&self) -> bool {
		self.x.is_zero() && self.y.is_zero()
	}

	/// `x || y` as 64 big-endian bytes.
	#[must_use]
	pub fn to_bytes(&self) -> [u8; 64] {
		let mut out = [0u8; 64];
		self.x.value().to_be_bytes(&mut out[..32]);
		self.y.value().to_be_bytes(&mut out[32..]);
		out
	}
}

impl<C: CurveParams> core::ops::Neg for AffinePoint<C> {
	type Output = Self;

	fn neg(self) -> Self {
		if self.is_infinity() {
			return self;
		}
		Self::new(self.x, -self.y)
	}
}

/// Elliptic curve point in Jacobian coordinates `(X, Y, Z)` representing
/// the affine point `(X/Z², Y/Z³)`; `Z == 0` is the point at infinity.
pub struct JacobianPoint<C: CurveParams> {
	pub x: FieldElement<C>,
	pub y: FieldElement<C>,
	pub z: FieldElement<C>,
}

impl<C: CurveParams> Clone for JacobianPoint<C> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<C: CurveParams> Copy for JacobianPoint<C> {}

impl<C: CurveParams> JacobianPoint<C> {
	#[must_use]
	pub fn infinity() -> Self {
		Self {
			x: FieldElement::zero(),
			y: FieldElement::one(),
			z: FieldElement::zero(),
		}
	}

	#[must_use]
	pub fn from_affine(p: &AffinePoint<C>) -> Self {
		Self {
			x: p.x,
			y: p.y,
			z: FieldElement::one(),
		}
	}

	#[must_use]
	pub const fn is_infinity(&self) -> bool {
		self.z.is_zero()
	}
}

impl<C: CurveParams> PartialEq for JacobianPoint<C> {
	fn eq(&self, other: &Self) -> bool {
		let z1z1 = self.z * self.z;
		let z1z1z1 = z1z1 * self.z;
		let z2z2 = other.z * other.z;
		let z2z2z2 = z2z2 * other.z;
		self.x * z2z2 == other.x * z1z1 && self.y * z2z2z2 == other.y * z1z1z1
	}
}

impl<C: CurveParams> Eq for JacobianPoint<C> {}

impl<C: CurveParams> core::fmt::Debug for JacobianPoint<C> {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		write!(f, "({:?}, {:?}, {:?})", self.x, self.y, self.z)
	}
}

/// Converts a Jacobian point to an affine point.
///
/// Works for the point at infinity as well: `z == 0` makes the inversion
/// yield 0, which produces the affine infinity encoding.
#[must_use]
pub fn to_affine<C: CurveParams>(p: &JacobianPoint<C>) -> AffinePoint<C> {
	let z_inv = p.z.inv();
	let zz_inv = z_inv * z_inv;
	let zzz_inv = zz_inv * z_inv;
	AffinePoint::new(p.x * zz_inv, p.y * zzz_inv)
}

/// Point addition in affine coordinates by the classic chord-and-tangent
/// formula, returning infinity for opposite points.
#[must_use]
pub fn add_affine<C: CurveParams>(p: &AffinePoint<C>, q: &AffinePoint<C>) -> AffinePoint<C> {
	if p.is_infinity() {
		return *q;
	}
	if q.is_infinity() {
		return *p;
	}

	let mut dx = q.x - p.x;
	let mut dy = q.y - p.y;
	if dx.is_zero() {
		if !dy.is_zero() {
			// Opposite points.
			return AffinePoint::infinity();
		}

		// Coincident points: the slope of the tangent line is
		// (3x² + A) / 2y.
		let xx = p.x * p.x;
		dy = xx + xx + xx;
		if C::A_IS_MINUS_3 {
			let one = FieldElement::one();
			dy = dy - (one + one + one);
		}
		dx = p.y + p.y;
	}
	let slope = dy * dx.inv();

	let xr = slope * slope - p.x - q.x;
	let yr = slope * (p.x - xr) - p.y;
	AffinePoint::new(xr, yr)
}

/// Point addition in Jacobian coordinates, by the "add-1998-cmo-2"
/// formula (12M + 4S). Handles infinities and the doubling case.
#[must_use]
pub fn add_jacobian<C: CurveParams>(p: &JacobianPoint<C>, q: &JacobianPoint<C>) -> JacobianPoint<C> {
	if p.is_infinity() {
		return *q;
	}
	if q.is_infinity() {
		return *p;
	}

	let z1z1 = p.z * p.z;
	let z2z2 = q.z * q.z;
	let u1 = p.x * z2z2;
	let u2 = q.x * z1z1;
	let z1z1z1 = p.z * z1z1;
	let z2z2z2 = q.z * z2z2;
	let s1 = p.y * z2z2z2;
	let s2 = q.y * z1z1z1;
	let h = u2 - u1;
	let r = s2 - s1;

	// p == q exactly when u1 == u2 and s1 == s2.
	if h.is_zero() && r.is_zero() {
		return dbl(p);
	}

	let hh = h * h;
	let hhh = h * hh;
	let v = u1 * hh;
	let t2 = r * r;
	let t3 = v + v;
	let t4 = t2 - hhh;
	let x3 = t4 - t3;
	let t5 = v - x3;
	let t6 = s1 * hhh;
	let t7 = r * t5;
	let y3 = t7 - t6;
	let t8 = q.z * h;
	let z3 = p.z * t8;

	JacobianPoint { x: x3, y: y3, z: z3 }
}

/// Mixed addition: a Jacobian point plus an affine point, by the "madd"
/// formula modified to support adding the same point.
#[must_use]
pub fn add_mixed<C: CurveParams>(p: &JacobianPoint<C>, q: &AffinePoint<C>) -> JacobianPoint<C> {
	if q.is_infinity() {
		return *p;
	}
	if p.is_infinity() {
		return JacobianPoint::from_affine(q);
	}

	let z1z1 = p.z * p.z;
	let u2 = q.x * z1z1;
	let z1z1z1 = p.z * z1z1;
	let s2 = q.y * z1z1z1;
	let h = u2 - p.x;
	let t1 = h + h;
	let i = t1 * t1;
	let j = h * i;
	let t2 = s2 - p.y;

	// p == q (in Jacobian coordinates) iff x1 == x2 * z1² and y1 == y2 * z1³.
	if h.is_zero() && t2.is_zero() {
		return dbl(p);
	}

	let r = t2 + t2;
	let v = p.x * i;
	let t3 = r * r;
	let t4 = v + v;
	let t5 = t3 - j;
	let x3 = t5 - t4;
	let t6 = v - x3;
	let t7 = p.y * j;
	let t8 = t7 + t7;
	let t9 = r * t6;
	let y3 = t9 - t8;
	let t10 = p.z * h;
	let z3 = t10 + t10;

	JacobianPoint { x: x3, y: y3, z: z3 }
}

/// Point doubling in Jacobian coordinates: "dbl-2009-l" for `A == 0`
/// curves and "dbl-2001-b" for `A == FIELD_PRIME - 3` curves.
#[must_use]
pub fn dbl<C: CurveParams>(p: &JacobianPoint<C>) -> JacobianPoint<C> {
	let x1 = p.x;
	let y1 = p.y;
	let z1 = p.z;

	if C::A_IS_MINUS_3 {
		let zz = z1 * z1;
		let yy = y1 * y1;
		let xyy = x1 * yy;
		let t0 = x1 - zz;
		let t1 = x1 + zz;
		let t2 = t0 * t1;
		let alpha = t2 + t2 + t2;
		let t3 = alpha * alpha;
		let t4 = xyy + xyy + xyy + xyy + xyy + xyy + xyy + xyy;
		let x3 = t3 - t4;
		let t5 = y1 + z1;
		let t6 = t5 * t5;
		let t7 = t6 - yy;
		let z3 = t7 - zz;
		let t8 = xyy + xyy + xyy + xyy;
		let t9 = t8 - x3;
		let t10 = yy * yy;
		let t11 = t10 + t10 + t10 + t10 + t10 + t10 + t10 + t10;
		let t12 = alpha * t9;
		let y3 = t12 - t11;
		JacobianPoint { x: x3, y: y3, z: z3 }
	} else {
		let xx = x1 * x1;
		let yy = y1 * y1;
		let yyyy = yy * yy;
		let t0 = x1 + yy;
		let t1 = t0 * t0;
		let t2 = t1 - xx;
		let t3 = t2 - yyyy;
		let d = t3 + t3;
		let e = xx + xx + xx;
		let f = e * e;
		let t4 = d + d;
		let x3 = f - t4;
		let t6 = d - x3;
		let t8 = yyyy + yyyy + yyyy + yyyy + yyyy + yyyy + yyyy + yyyy;
		let t9 = e * t6;
		let y3 = t9 - t8;
		let t10 = y1 * z1;
		let z3 = t10 + t10;
		JacobianPoint { x: x3, y: y3, z: z3 }
	}
}

/// Scalar multiplication `[c]P` by left-to-right double-and-add.
///
/// The scalar is first reduced by the curve group order, so the mixed
/// addition in the loop can never hit the doubling branch.
#[must_use]
pub fn scalar_mul<C: CurveParams>(p: &AffinePoint<C>, c: &U256) -> JacobianPoint<C> {
	let c = c.rem(&C::ORDER);

	let mut r = JacobianPoint::infinity();
	let mut i = c.bit_width();
	while i != 0 {
		r = dbl(&r);
		if c.bit(i - 1) {
			r = add_mixed(&r, p);
		}
		i -= 1;
	}
	r
}

/// Multi-scalar multiplication `[u]P + [v]Q` by the Straus–Shamir trick:
/// one doubling per bit and a single mixed addition selected from
/// `{P, Q, P + Q}`. Both scalars must be below the curve group order.
#[must_use]
pub fn msm<C: CurveParams>(
	u: &U256,
	p: &AffinePoint<C>,
	v: &U256,
	q: &AffinePoint<C>,
) -> JacobianPoint<C> {
	let mut r = JacobianPoint::infinity();

	let w = *u | *v;
	let bit_width = w.bit_width();
	if bit_width == 0 {
		return r;
	}

	// Precompute affine P + Q; correct for P == Q as well.
	let h = add_affine(p, q);
	let points = [p, q, &h];

	let mut i = bit_width;
	while i != 0 {
		r = dbl(&r);

		let u_bit = u.bit(i - 1) as usize;
		let v_bit = v.bit(i - 1) as usize;
		let index = 2 * v_bit + u_bit;
		if index != 0 {
			r = add_mixed(&r, points[index - 1]);
		}
		i -= 1;
	}

	r
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::secp256k1::{Secp256k1, G};

	type Jac = JacobianPoint<Secp256k1>;

	#[test]
	fn jacobian_addition_against_affine() {
		let g2 = add_affine(&G, &G);
		let g3 = add_affine(&g2, &G);

		let jg = Jac::from_affine(&G);
		let jg2 = Jac::from_affine(&g2);

		assert_eq!(to_affine(&add_jacobian(&jg, &jg2)), g3);
		assert_eq!(to_affine(&add_mixed(&jg2, &G)), g3);
		assert_eq!(to_affine(&dbl(&jg)), g2);

		// The doubling branch of the full addition formulas.
		assert_eq!(to_affine(&add_jacobian(&jg, &jg)), g2);
		assert_eq!(to_affine(&add_mixed(&jg, &G)), g2);
	}

	#[test]
	fn infinity_handling() {
		let inf = Jac::infinity();
		let jg = Jac::from_affine(&G);

		assert_eq!(to_affine(&add_jacobian(&inf, &jg)), G);
		assert_eq!(to_affine(&add_jacobian(&jg, &inf)), G);
		assert!(add_jacobian(&inf, &inf).is_infinity());
		assert!(dbl(&inf).is_infinity());
		assert_eq!(to_affine(&add_mixed(&inf, &G)), G);
		assert!(add_mixed(&jg, &AffinePoint::infinity()) == jg);

		// P + (-P) collapses to infinity.
		let minus_g = -G;
		assert!(to_affine(&add_mixed(&jg, &minus_g)).is_infinity());
	}

	#[test]
	fn msm_against_two_scalar_muls() {
		let p = to_affine(&scalar_mul(&G, &U256::from_u64(5)));
		let q = to_affine(&scalar_mul(&G, &U256::from_u64(11)));
		let u = U256::from_u64(0x1f);
		let v = U256::from_u64(0x2d);

		// 0x1f * 5 + 0x2d * 11 = 650 copies of G.
		let expected = to_affine(&scalar_mul(&G, &U256::from_u64(650)));
		assert_eq!(to_affine(&msm(&u, &p, &v, &q)), expected);

		assert!(msm(&U256::ZERO, &p, &U256::ZERO, &q).is_infinity());
	}
}
