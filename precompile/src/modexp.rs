use alloc::vec;
use alloc::vec::Vec;
use core::cmp::max;

use basalt_evmmax::modexp::{modexp, MAX_INPUT_SIZE};
use basalt_interpreter::{ExitException, ExitResult, ExitSucceed, Fork};
use primitive_types::U256;

use crate::{GasMutState, PurePrecompile};

/// The MODEXP precompile: `base^exp % mod` over length-prefixed big-endian
/// byte fields, with the gas schedule of the active fork.
pub struct Modexp {
	berlin_pricing: bool,
}

impl Modexp {
	#[must_use]
	pub fn for_fork(fork: Fork) -> Self {
		Self {
			berlin_pricing: fork >= Fork::BERLIN,
		}
	}
}

/// Copy bytes from input to target, zero-filling past the input end, and
/// advance the running offset.
fn read_input(source: &[u8], target: &mut [u8], source_offset: &mut usize) {
	let offset = *source_offset;
	*source_offset += target.len();

	if source.len() <= offset {
		return;
	}

	let len = core::cmp::min(target.len(), source.len() - offset);
	target[..len].copy_from_slice(&source[offset..][..len]);
}

/// Bit length of the exponent counted by the EIP-198/2565 rules: only the
/// first 32 exponent bytes contribute bits, longer exponents contribute
/// 8 gas-bits per extra byte.
fn adjusted_exponent_bits(exp_head: &U256, exp_len: u64) -> u64 {
	let head_bits = exp_head.bits() as u64;
	if exp_len <= 32 {
		head_bits.saturating_sub(1)
	} else {
		8 * (exp_len - 32) + head_bits.saturating_sub(1)
	}
}

fn multiplication_complexity_berlin(max_len: u64) -> u64 {
	let words = (max_len + 7) / 8;
	words * words
}

fn multiplication_complexity_byzantium(x: u64) -> u64 {
	if x <= 64 {
		x * x
	} else if x <= 1024 {
		x * x / 4 + 96 * x - 3072
	} else {
		x * x / 16 + 480 * x - 199_680
	}
}

fn gas_cost(berlin: bool, base_len: u64, exp_len: u64, mod_len: u64, exp_head: &U256) -> u64 {
	let max_len = max(base_len, mod_len);
	let iterations = max(adjusted_exponent_bits(exp_head, exp_len), 1);

	if berlin {
		// https://eips.ethereum.org/EIPS/eip-2565
		const MIN_GAS_COST: u64 = 200;
		let complexity = multiplication_complexity_berlin(max_len);
		max(MIN_GAS_COST, complexity * iterations / 3)
	} else {
		// https://eips.ethereum.org/EIPS/eip-198
		multiplication_complexity_byzantium(max_len) * iterations / 20
	}
}

impl<G: GasMutState> PurePrecompile<G> for Modexp {
	fn execute(&self, input: &[u8], gasometer: &mut G) -> (ExitResult, Vec<u8>) {
		let mut input_offset = 0;

		// Missing input bytes read as zero.
		let mut base_len_buf = [0u8; 32];
		read_input(input, &mut base_len_buf, &mut input_offset);
		let mut exp_len_buf = [0u8; 32];
		read_input(input, &mut exp_len_buf, &mut input_offset);
		let mut mod_len_buf = [0u8; 32];
		read_input(input, &mut mod_len_buf, &mut input_offset);

		let max_size = U256::from(MAX_INPUT_SIZE);
		let base_len_big = U256::from_big_endian(&base_len_buf);
		let exp_len_big = U256::from_big_endian(&exp_len_buf);
		let mod_len_big = U256::from_big_endian(&mod_len_buf);
		if base_len_big > max_size || exp_len_big > max_size || mod_len_big > max_size {
			try_some!(Err(ExitException::PrecompileFailure));
		}

		let base_len = base_len_big.as_usize();
		let exp_len = exp_len_big.as_usize();
		let mod_len = mod_len_big.as_usize();

		// The gas formula needs the leading 32 bytes of the exponent.
		let mut exp_head_buf = [0u8; 32];
		let mut head_offset = input_offset + base_len;
		let head_len = core::cmp::min(exp_len, 32);
		read_input(input, &mut exp_head_buf[32 - head_len..], &mut head_offset);
		let exp_head = U256::from_big_endian(&exp_head_buf);

		try_some!(gasometer.record_gas(U256::from(gas_cost(
			self.berlin_pricing,
			base_len as u64,
			exp_len as u64,
			mod_len as u64,
			&exp_head,
		))));

		// An absent modulus produces an empty output.
		if mod_len == 0 {
			return (ExitSucceed::Returned.into(), Vec::new());
		}

		let mut base_buf = vec![0u8; base_len];
		read_input(input, &mut base_buf, &mut input_offset);
		let mut exp_buf = vec![0u8; exp_len];
		read_input(input, &mut exp_buf, &mut input_offset);
		let mut mod_buf = vec![0u8; mod_len];
		read_input(input, &mut mod_buf, &mut input_offset);

		let mut output = vec![0u8; mod_len];
		// A zero modulus short-circuits to a zero-filled output.
		if mod_buf.iter().any(|b| *b != 0) {
			modexp(&base_buf, &exp_buf, &mod_buf, &mut output);
		}

		(ExitSucceed::Returned.into(), output)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Gasometer;

	fn run(input: &str, gas: i64, fork: Fork) -> (ExitResult, Vec<u8>, i64) {
		let input = hex::decode(input).unwrap();
		let mut gasometer = Gasometer::new(gas);
		let (result, output) = Modexp::for_fork(fork).execute(&input, &mut gasometer);
		(result, output, gas - gasometer.gas_left())
	}

	#[test]
	fn two_pow_ten_mod_seven() {
		let input = concat!(
			"0000000000000000000000000000000000000000000000000000000000000001",
			"0000000000000000000000000000000000000000000000000000000000000001",
			"0000000000000000000000000000000000000000000000000000000000000001",
			"02",
			"0a",
			"07"
		);
		let (result, output, consumed) = run(input, 10_000, Fork::LATEST);
		assert_eq!(result, Ok(ExitSucceed::Returned));
		assert_eq!(output, vec![0x02]);
		assert_eq!(consumed, 200); // EIP-2565 floor
	}

	#[test]
	fn wide_exponent_pricing() {
		let input = concat!(
			"0000000000000000000000000000000000000000000000000000000000000001",
			"0000000000000000000000000000000000000000000000000000000000000020",
			"0000000000000000000000000000000000000000000000000000000000000020",
			"03",
			"fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffe",
			"fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f"
		);
		let (result, output, consumed) = run(input, 100_000, Fork::BERLIN);
		assert_eq!(result, Ok(ExitSucceed::Returned));
		assert_eq!(
			hex::encode(&output),
			"9e60ee8e21ef8ca28764dff6ac54ac4eca4430ab537594f5782852683b0a6db8"
		);
		// words(32)² = 16, iterations = 255, 16 * 255 / 3 = 1360.
		assert_eq!(consumed, 1360);
	}

	#[test]
	fn byzantium_pricing() {
		let input = concat!(
			"0000000000000000000000000000000000000000000000000000000000000001",
			"0000000000000000000000000000000000000000000000000000000000000001",
			"0000000000000000000000000000000000000000000000000000000000000001",
			"02",
			"0a",
			"07"
		);
		// mult_complexity(1) = 1, adjusted bits = 3, 1 * 3 / 20 = 0.
		let (result, output, consumed) = run(input, 10_000, Fork::BYZANTIUM);
		assert_eq!(result, Ok(ExitSucceed::Returned));
		assert_eq!(output, vec![0x02]);
		assert_eq!(consumed, 0);
	}

	#[test]
	fn zero_exponent_cases() {
		// exp == 0, mod > 1: result 1.
		let input = concat!(
			"0000000000000000000000000000000000000000000000000000000000000001",
			"0000000000000000000000000000000000000000000000000000000000000001",
			"0000000000000000000000000000000000000000000000000000000000000001",
			"05",
			"00",
			"09"
		);
		let (_, output, _) = run(input, 10_000, Fork::LATEST);
		assert_eq!(output, vec![0x01]);

		// exp == 0, mod == 1: result 0.
		let input = concat!(
			"0000000000000000000000000000000000000000000000000000000000000001",
			"0000000000000000000000000000000000000000000000000000000000000001",
			"0000000000000000000000000000000000000000000000000000000000000001",
			"05",
			"00",
			"01"
		);
		let (_, output, _) = run(input, 10_000, Fork::LATEST);
		assert_eq!(output, vec![0x00]);
	}

	#[test]
	fn zero_modulus_length_returns_empty() {
		let input = concat!(
			"0000000000000000000000000000000000000000000000000000000000000001",
			"0000000000000000000000000000000000000000000000000000000000000001",
			"0000000000000000000000000000000000000000000000000000000000000000",
			"02",
			"0a"
		);
		let (result, output, _) = run(input, 10_000, Fork::LATEST);
		assert_eq!(result, Ok(ExitSucceed::Returned));
		assert!(output.is_empty());
	}

	#[test]
	fn zero_valued_modulus_returns_zeros() {
		let input = concat!(
			"0000000000000000000000000000000000000000000000000000000000000001",
			"0000000000000000000000000000000000000000000000000000000000000001",
			"0000000000000000000000000000000000000000000000000000000000000002",
			"02",
			"0a",
			"0000"
		);
		let (result, output, _) = run(input, 10_000, Fork::LATEST);
		assert_eq!(result, Ok(ExitSucceed::Returned));
		assert_eq!(output, vec![0x00, 0x00]);
	}

	#[test]
	fn oversized_length_fails() {
		// base_len = 2^255.
		let input = concat!(
			"8000000000000000000000000000000000000000000000000000000000000000",
			"0000000000000000000000000000000000000000000000000000000000000001",
			"0000000000000000000000000000000000000000000000000000000000000001"
		);
		let (result, output, _) = run(input, 10_000, Fork::LATEST);
		assert!(result.is_err());
		assert!(output.is_empty());
	}

	#[test]
	fn truncated_input_reads_zeros() {
		// Only the length fields: base, exp and mod all read as zero-filled.
		let input = concat!(
			"0000000000000000000000000000000000000000000000000000000000000001",
			"0000000000000000000000000000000000000000000000000000000000000001",
			"0000000000000000000000000000000000000000000000000000000000000001"
		);
		let (result, output, _) = run(input, 10_000, Fork::LATEST);
		assert_eq!(result, Ok(ExitSucceed::Returned));
		// 0^0 mod 0 -> modulus is zero -> zero output.
		assert_eq!(output, vec![0x00]);
	}
}
