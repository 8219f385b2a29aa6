use alloc::vec::Vec;

use basalt_evmmax::bn254::{self, AffinePoint};
use basalt_evmmax::uint::U256 as MaxU256;
use basalt_interpreter::{ExitException, ExitResult, ExitSucceed, Fork};
use primitive_types::U256;

use crate::{GasMutState, PurePrecompile};

/// Copy bytes from input to target, zero-filling past the input end.
fn read_input(source: &[u8], target: &mut [u8], offset: usize) {
	if source.len() <= offset {
		return;
	}

	let len = core::cmp::min(target.len(), source.len() - offset);
	target[..len].copy_from_slice(&source[offset..][..len]);
}

/// Read an affine bn254 G1 point, validating field ranges and curve
/// membership.
fn read_point(input: &[u8], start: usize) -> Result<AffinePoint, ExitException> {
	let mut px_buf = [0u8; 32];
	let mut py_buf = [0u8; 32];
	read_input(input, &mut px_buf, start);
	read_input(input, &mut py_buf, start + 32);

	let px = MaxU256::from_be_slice(&px_buf);
	let py = MaxU256::from_be_slice(&py_buf);
	if px.ge(&bn254::FIELD_PRIME) || py.ge(&bn254::FIELD_PRIME) {
		return Err(ExitException::PrecompileFailure);
	}

	let point = AffinePoint::from_values(px, py);
	if !bn254::validate(&point) {
		return Err(ExitException::PrecompileFailure);
	}
	Ok(point)
}

fn point_to_bytes(point: &AffinePoint) -> Vec<u8> {
	point.to_bytes().to_vec()
}

/// The bn254 curve point addition precompile.
pub struct Bn254Add {
	gas_cost: u64,
}

impl Bn254Add {
	#[must_use]
	pub fn for_fork(fork: Fork) -> Self {
		// https://eips.ethereum.org/EIPS/eip-1108
		Self {
			gas_cost: if fork >= Fork::ISTANBUL { 150 } else { 500 },
		}
	}
}

impl<G: GasMutState> PurePrecompile<G> for Bn254Add {
	fn execute(&self, input: &[u8], gasometer: &mut G) -> (ExitResult, Vec<u8>) {
		try_some!(gasometer.record_gas(U256::from(self.gas_cost)));

		let p1 = try_some!(read_point(input, 0));
		let p2 = try_some!(read_point(input, 64));

		let sum = basalt_evmmax::ecc::add_affine(&p1, &p2);
		(ExitSucceed::Returned.into(), point_to_bytes(&sum))
	}
}

/// The bn254 scalar multiplication precompile.
pub struct Bn254Mul {
	gas_cost: u64,
}

impl Bn254Mul {
	#[must_use]
	pub fn for_fork(fork: Fork) -> Self {
		// https://eips.ethereum.org/EIPS/eip-1108
		Self {
			gas_cost: if fork >= Fork::ISTANBUL { 6_000 } else { 40_000 },
		}
	}
}

impl<G: GasMutState> PurePrecompile<G> for Bn254Mul {
	fn execute(&self, input: &[u8], gasometer: &mut G) -> (ExitResult, Vec<u8>) {
		try_some!(gasometer.record_gas(U256::from(self.gas_cost)));

		let point = try_some!(read_point(input, 0));
		let mut scalar_buf = [0u8; 32];
		read_input(input, &mut scalar_buf, 64);
		let scalar = MaxU256::from_be_slice(&scalar_buf);

		let product = bn254::mul(&point, &scalar);
		(ExitSucceed::Returned.into(), point_to_bytes(&product))
	}
}

/// The bn254 pairing check precompile.
pub struct Bn254Pairing {
	base_gas_cost: u64,
	per_pair_gas_cost: u64,
}

impl Bn254Pairing {
	#[must_use]
	pub fn for_fork(fork: Fork) -> Self {
		// https://eips.ethereum.org/EIPS/eip-1108
		if fork >= Fork::ISTANBUL {
			Self {
				base_gas_cost: 45_000,
				per_pair_gas_cost: 34_000,
			}
		} else {
			Self {
				base_gas_cost: 100_000,
				per_pair_gas_cost: 80_000,
			}
		}
	}
}

impl<G: GasMutState> PurePrecompile<G> for Bn254Pairing {
	fn execute(&self, input: &[u8], gasometer: &mut G) -> (ExitResult, Vec<u8>) {
		use bn::{pairing_batch, AffineG1, AffineG2, Fq, Fq2, Group, Gt, G1, G2};

		// An empty sequence of pairs evaluates to 1 (accepted).
		let accepted = if input.is_empty() {
			try_some!(gasometer.record_gas(U256::from(self.base_gas_cost)));
			true
		} else {
			if input.len() % 192 != 0 {
				try_some!(Err(ExitException::PrecompileFailure));
			}

			let pairs = input.len() / 192;
			let gas_cost = self.base_gas_cost + pairs as u64 * self.per_pair_gas_cost;
			try_some!(gasometer.record_gas(U256::from(gas_cost)));

			let mut vals = Vec::new();
			for idx in 0..pairs {
				let pair = &input[idx * 192..idx * 192 + 192];

				let a_x = try_some!(
					Fq::from_slice(&pair[0..32]).map_err(|_| ExitException::PrecompileFailure)
				);
				let a_y = try_some!(
					Fq::from_slice(&pair[32..64]).map_err(|_| ExitException::PrecompileFailure)
				);

				// The ABI puts the imaginary part of each G2 coordinate
				// first.
				let b_a_y = try_some!(
					Fq::from_slice(&pair[64..96]).map_err(|_| ExitException::PrecompileFailure)
				);
				let b_a_x = try_some!(
					Fq::from_slice(&pair[96..128]).map_err(|_| ExitException::PrecompileFailure)
				);
				let b_b_y = try_some!(
					Fq::from_slice(&pair[128..160]).map_err(|_| ExitException::PrecompileFailure)
				);
				let b_b_x = try_some!(
					Fq::from_slice(&pair[160..192]).map_err(|_| ExitException::PrecompileFailure)
				);

				let b_a = Fq2::new(b_a_x, b_a_y);
				let b_b = Fq2::new(b_b_x, b_b_y);
				let b = if b_a.is_zero() && b_b.is_zero() {
					G2::zero()
				} else {
					G2::from(try_some!(AffineG2::new(b_a, b_b)
						.map_err(|_| ExitException::PrecompileFailure)))
				};
				let a = if a_x.is_zero() && a_y.is_zero() {
					G1::zero()
				} else {
					G1::from(try_some!(AffineG1::new(a_x, a_y)
						.map_err(|_| ExitException::PrecompileFailure)))
				};
				vals.push((a, b));
			}

			pairing_batch(&vals) == Gt::one()
		};

		let mut output = [0u8; 32];
		if accepted {
			output[31] = 1;
		}
		(ExitSucceed::Returned.into(), output.to_vec())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Gasometer;

	fn run<P: PurePrecompile<Gasometer>>(p: P, input: &[u8], gas: i64) -> (ExitResult, Vec<u8>, i64) {
		let mut gasometer = Gasometer::new(gas);
		let (result, output) = p.execute(input, &mut gasometer);
		(result, output, gas - gasometer.gas_left())
	}

	#[test]
	fn add_two_generator_multiples() {
		// 2G + 9G == 11G.
		let input = hex::decode(concat!(
			"030644e72e131a029b85045b68181585d97816a916871ca8d3c208c16d87cfd3",
			"15ed738c0e0a7c92e7845f96b2ae9c0a68a6a449e3538fc7ff3ebf7a5a18a2c4",
			"039730ea8dff1254c0fee9c0ea777d29a9c710b7e616683f194f18c43b43b869",
			"073a5ffcc6fc7a28c30723d6e58ce577356982d65b833a5a5c15bf9024b43d98"
		))
		.unwrap();
		let (result, output, consumed) = run(Bn254Add::for_fork(Fork::LATEST), &input, 10_000);
		assert_eq!(result, Ok(ExitSucceed::Returned));
		assert_eq!(
			hex::encode(&output),
			concat!(
				"2a14705537b009189da8808651eecdb82482477fe92ac12ca8b71f80fc3d49ef",
				"2df7ee7f243ea8b38e1ddf14029258877a618c779fd4717db6177e19ea67ec38"
			)
		);
		assert_eq!(consumed, 150);
	}

	#[test]
	fn add_with_infinity_and_short_input() {
		// G + infinity == G; the zero bytes are implicit.
		let input = hex::decode(concat!(
			"0000000000000000000000000000000000000000000000000000000000000001",
			"0000000000000000000000000000000000000000000000000000000000000002"
		))
		.unwrap();
		let (result, output, _) = run(Bn254Add::for_fork(Fork::LATEST), &input, 10_000);
		assert_eq!(result, Ok(ExitSucceed::Returned));
		assert_eq!(
			hex::encode(&output),
			concat!(
				"0000000000000000000000000000000000000000000000000000000000000001",
				"0000000000000000000000000000000000000000000000000000000000000002"
			)
		);
	}

	#[test]
	fn add_rejects_off_curve_point() {
		let input = hex::decode(concat!(
			"0000000000000000000000000000000000000000000000000000000000000001",
			"0000000000000000000000000000000000000000000000000000000000000001",
			"0000000000000000000000000000000000000000000000000000000000000000",
			"0000000000000000000000000000000000000000000000000000000000000000"
		))
		.unwrap();
		let (result, output, _) = run(Bn254Add::for_fork(Fork::LATEST), &input, 10_000);
		assert!(result.is_err());
		assert!(output.is_empty());
	}

	#[test]
	fn mul_generator() {
		// G * 9.
		let input = hex::decode(concat!(
			"0000000000000000000000000000000000000000000000000000000000000001",
			"0000000000000000000000000000000000000000000000000000000000000002",
			"0000000000000000000000000000000000000000000000000000000000000009"
		))
		.unwrap();
		let (result, output, consumed) = run(Bn254Mul::for_fork(Fork::LATEST), &input, 10_000);
		assert_eq!(result, Ok(ExitSucceed::Returned));
		assert_eq!(
			hex::encode(&output),
			concat!(
				"039730ea8dff1254c0fee9c0ea777d29a9c710b7e616683f194f18c43b43b869",
				"073a5ffcc6fc7a28c30723d6e58ce577356982d65b833a5a5c15bf9024b43d98"
			)
		);
		assert_eq!(consumed, 6_000);

		// Byzantium pricing.
		let (_, _, consumed) = run(Bn254Mul::for_fork(Fork::BYZANTIUM), &input, 100_000);
		assert_eq!(consumed, 40_000);
	}

	#[test]
	fn mul_by_zero_gives_infinity() {
		let input = hex::decode(concat!(
			"0000000000000000000000000000000000000000000000000000000000000001",
			"0000000000000000000000000000000000000000000000000000000000000002",
			"0000000000000000000000000000000000000000000000000000000000000000"
		))
		.unwrap();
		let (result, output, _) = run(Bn254Mul::for_fork(Fork::LATEST), &input, 10_000);
		assert_eq!(result, Ok(ExitSucceed::Returned));
		assert_eq!(output, vec![0u8; 64]);
	}

	#[test]
	fn pairing_of_empty_input_accepts() {
		let (result, output, consumed) = run(Bn254Pairing::for_fork(Fork::LATEST), &[], 100_000);
		assert_eq!(result, Ok(ExitSucceed::Returned));
		assert_eq!(
			hex::encode(&output),
			"0000000000000000000000000000000000000000000000000000000000000001"
		);
		assert_eq!(consumed, 45_000);
	}

	#[test]
	fn pairing_of_null_pairs_accepts() {
		for pairs in 1..=5usize {
			let input = vec![0u8; 192 * pairs];
			let (result, output, consumed) =
				run(Bn254Pairing::for_fork(Fork::LATEST), &input, 1_000_000);
			assert_eq!(result, Ok(ExitSucceed::Returned));
			assert_eq!(
				hex::encode(&output),
				"0000000000000000000000000000000000000000000000000000000000000001"
			);
			assert_eq!(consumed, 45_000 + 34_000 * pairs as i64);
		}
	}

	#[test]
	fn pairing_rejects_ragged_input() {
		let input = vec![0u8; 191];
		let (result, output, _) = run(Bn254Pairing::for_fork(Fork::LATEST), &input, 1_000_000);
		assert!(result.is_err());
		assert!(output.is_empty());
	}
}
