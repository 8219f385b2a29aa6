use alloc::vec::Vec;
use core::cmp::min;

use basalt_interpreter::{ExitResult, ExitSucceed};
use primitive_types::U256;
use sha3::{Digest, Keccak256};

use crate::{linear_cost, GasMutState, PurePrecompile};

pub struct ECRecover;

/// Recover the signer address with the native curve engine.
#[cfg(not(feature = "k256-recover"))]
fn recover_address(msg: &[u8; 32], sig: &[u8; 128]) -> Option<[u8; 32]> {
	use basalt_evmmax::secp256k1;

	let y_parity_odd = sig[63] == 28;
	let r: &[u8; 32] = sig[64..96].try_into().ok()?;
	let s: &[u8; 32] = sig[96..128].try_into().ok()?;

	let point = secp256k1::ecdsa_recover(msg, r, s, y_parity_odd)?;

	let mut address = [0u8; 32];
	address[12..].copy_from_slice(&Keccak256::digest(point.to_bytes())[12..]);
	Some(address)
}

/// Recover the signer address by delegating to the k256 backend. Produces
/// bit-identical output to the native path.
#[cfg(feature = "k256-recover")]
fn recover_address(msg: &[u8; 32], sig: &[u8; 128]) -> Option<[u8; 32]> {
	use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

	let mut raw_recid = sig[63] - 27;
	let mut signature = Signature::from_slice(&sig[64..128]).ok()?;
	if let Some(normalized) = signature.normalize_s() {
		signature = normalized;
		raw_recid ^= 1;
	}
	let recid = RecoveryId::from_byte(raw_recid)?;

	let pubkey = VerifyingKey::recover_from_prehash(&msg[..], &signature, recid).ok()?;

	let mut address = [0u8; 32];
	address[12..].copy_from_slice(
		&Keccak256::digest(&pubkey.to_encoded_point(false).as_bytes()[1..])[12..],
	);
	Some(address)
}

impl<G: GasMutState> PurePrecompile<G> for ECRecover {
	fn execute(&self, i: &[u8], gasometer: &mut G) -> (ExitResult, Vec<u8>) {
		const COST_BASE: u64 = 3000;
		const COST_WORD: u64 = 0;
		try_some!(gasometer.record_gas(U256::from(try_some!(linear_cost(
			i.len() as u64,
			COST_BASE,
			COST_WORD
		)))));

		let mut input = [0u8; 128];
		input[..min(i.len(), 128)].copy_from_slice(&i[..min(i.len(), 128)]);

		// v is validated on the full 32-byte field and must be 27 or 28.
		if input[32..63] != [0u8; 31] || ![27, 28].contains(&input[63]) {
			return (ExitSucceed::Returned.into(), Vec::new());
		}

		let mut msg = [0u8; 32];
		msg.copy_from_slice(&input[..32]);

		// Invalid signatures produce an empty output with success status.
		match recover_address(&msg, &input) {
			Some(address) => (ExitSucceed::Returned.into(), address.to_vec()),
			None => (ExitSucceed::Returned.into(), Vec::new()),
		}
	}
}

pub struct Sha256;

impl<G: GasMutState> PurePrecompile<G> for Sha256 {
	fn execute(&self, input: &[u8], gasometer: &mut G) -> (ExitResult, Vec<u8>) {
		const COST_BASE: u64 = 60;
		const COST_WORD: u64 = 12;
		try_some!(gasometer.record_gas(U256::from(try_some!(linear_cost(
			input.len() as u64,
			COST_BASE,
			COST_WORD
		)))));

		let mut ret = [0u8; 32];
		let hash = sha2::Sha256::digest(input);
		ret[0..32].copy_from_slice(&hash);

		(ExitSucceed::Returned.into(), ret.to_vec())
	}
}

pub struct Ripemd160;

impl<G: GasMutState> PurePrecompile<G> for Ripemd160 {
	fn execute(&self, input: &[u8], gasometer: &mut G) -> (ExitResult, Vec<u8>) {
		const COST_BASE: u64 = 600;
		const COST_WORD: u64 = 120;
		try_some!(gasometer.record_gas(U256::from(try_some!(linear_cost(
			input.len() as u64,
			COST_BASE,
			COST_WORD
		)))));

		let mut ret = [0u8; 32];
		let hash = ripemd::Ripemd160::digest(input);
		ret[12..32].copy_from_slice(&hash);

		(ExitSucceed::Returned.into(), ret.to_vec())
	}
}

pub struct Identity;

impl<G: GasMutState> PurePrecompile<G> for Identity {
	fn execute(&self, input: &[u8], gasometer: &mut G) -> (ExitResult, Vec<u8>) {
		const COST_BASE: u64 = 15;
		const COST_WORD: u64 = 3;
		try_some!(gasometer.record_gas(U256::from(try_some!(linear_cost(
			input.len() as u64,
			COST_BASE,
			COST_WORD
		)))));

		(ExitSucceed::Returned.into(), input.to_vec())
	}
}
