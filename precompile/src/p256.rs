use alloc::vec::Vec;

use basalt_evmmax::secp256r1;
use basalt_evmmax::uint::U256 as MaxU256;
use basalt_interpreter::{ExitException, ExitResult, ExitSucceed};
use primitive_types::U256;

use crate::{GasMutState, PurePrecompile};

/// The secp256r1 signature verification precompile (EIP-7951).
pub struct P256Verify;

impl P256Verify {
	const GAS_COST: u64 = 6900;
}

impl<G: GasMutState> PurePrecompile<G> for P256Verify {
	fn execute(&self, input: &[u8], gasometer: &mut G) -> (ExitResult, Vec<u8>) {
		try_some!(gasometer.record_gas(U256::from(P256Verify::GAS_COST)));

		// hash || r || s || qx || qy, each 32 bytes, nothing implicit.
		if input.len() != 160 {
			return (ExitException::PrecompileFailure.into(), Vec::new());
		}

		let hash: [u8; 32] = input[0..32].try_into().expect("slice length checked");
		let r = MaxU256::from_be_slice(&input[32..64]);
		let s = MaxU256::from_be_slice(&input[64..96]);
		let qx = MaxU256::from_be_slice(&input[96..128]);
		let qy = MaxU256::from_be_slice(&input[128..160]);

		if !secp256r1::verify(&hash, &r, &s, &qx, &qy) {
			return (ExitException::PrecompileFailure.into(), Vec::new());
		}

		let mut output = [0u8; 32];
		output[31] = 1;
		(ExitSucceed::Returned.into(), output.to_vec())
	}
}
